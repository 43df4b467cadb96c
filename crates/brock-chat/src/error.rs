use brock_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// Rejected input; nothing was stored or sent
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] PersistError),

    #[error("Model error: {0}")]
    Model(#[from] anyhow::Error),

    /// The event consumer went away mid-turn
    #[error("Event stream closed by consumer")]
    Disconnected,

    /// The model answered with nothing usable
    #[error("Model returned an empty {0}")]
    EmptyOutput(&'static str),
}

impl ChatError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
