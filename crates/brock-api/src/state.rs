use std::sync::Arc;

use brock_chat::{
    ChatOrchestrator, CheckinScheduler, HttpPushSender, LogPushSender, ProactiveGenerator,
    PushSender,
};
use brock_context::ContextAssembler;
use brock_llm::{ChatClient, ClientFactory, ProviderConfig};
use brock_persist::{MemoryPersistenceClient, PersistenceClient};
use brock_tools::{Clock, SystemClock, ToolRegistry};

use crate::config::{Config, StorageBackend};
use crate::error::{ApiError, ApiResult};

/// Shared application state passed to all handlers
///
/// Everything is built once at startup and shared behind `Arc`; a chat turn
/// clones only the orchestrator handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn PersistenceClient>,
    pub context: Arc<ContextAssembler>,
    pub orchestrator: ChatOrchestrator,
    pub proactive: Arc<ProactiveGenerator>,
    pub scheduler: Arc<CheckinScheduler>,
}

impl AppState {
    /// Wire the services over already-built collaborators
    pub fn from_parts(
        config: Config,
        store: Arc<dyn PersistenceClient>,
        llm: Arc<dyn ChatClient>,
        push: Arc<dyn PushSender>,
        clock: Arc<dyn Clock>,
    ) -> ApiResult<Self> {
        let offset = config
            .utc_offset()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let tools = Arc::new(ToolRegistry::with_default_tools(
            store.clone(),
            clock,
            offset,
            config.checkin.timezone.clone(),
        ));
        let context = Arc::new(ContextAssembler::new(
            store.clone(),
            llm.clone(),
            config.profile.clone(),
            config.summary_llm(),
        ));
        let orchestrator = ChatOrchestrator::new(
            llm.clone(),
            store.clone(),
            tools,
            context.clone(),
            config.chat_config(),
        );
        let proactive = Arc::new(ProactiveGenerator::new(
            llm,
            store.clone(),
            context.clone(),
            push,
            config.proactive_config(),
        ));
        let scheduler = Arc::new(CheckinScheduler::new(
            store.clone(),
            proactive.clone(),
            offset,
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            context,
            orchestrator,
            proactive,
            scheduler,
        })
    }

    /// Connect the configured store, model client and push gateway
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let store = connect_store(&config).await?;

        tracing::info!(model = %config.llm.model, "Initializing LLM client");
        let mut provider = ProviderConfig::openai(config.openai_api_key.clone());
        if let Some(base_url) = &config.llm.base_url {
            provider = provider.with_base_url(base_url.clone());
        }
        let llm = ClientFactory::create_chat_client(provider)?;

        let push: Arc<dyn PushSender> = match &config.push.gateway_url {
            Some(url) => {
                tracing::info!(gateway = %url, "Push gateway configured");
                Arc::new(HttpPushSender::new(url.clone()))
            }
            None => Arc::new(LogPushSender),
        };

        Ok(Self::from_parts(config, store, llm, push, Arc::new(SystemClock))?)
    }
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn PersistenceClient>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryPersistenceClient::new()))
        }
        #[cfg(feature = "mongodb")]
        StorageBackend::Mongodb => {
            let uri = config
                .mongodb_uri
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("MONGODB_URI is required for the mongodb backend"))?;
            tracing::info!(database = %config.storage.database, "Connecting to MongoDB");
            let client =
                brock_persist::MongoPersistenceClient::connect(uri, &config.storage.database)
                    .await?;
            tracing::info!("MongoDB connected");
            Ok(Arc::new(client))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageBackend::Mongodb => {
            anyhow::bail!("mongodb backend requested but brock-api was built without the mongodb feature")
        }
    }
}
