//! Thread flag maintenance shared by the check-in flow and the HTTP layer.

use brock_persist::{
    NewThread, PersistenceClient, Thread, ThreadFlags, ThreadUpdate, GENERAL_CHECKIN_FLAG,
};
use serde_json::Value;
use tracing::info;

use crate::error::Result;

pub const CHECKIN_THREAD_TITLE: &str = "Daily Check-ins";
pub const CHECKIN_THREAD_TOPIC: &str = "Daily accountability and progress check-ins";
pub const CHECKIN_THREAD_SUMMARY: &str = "Thread for proactive daily check-ins from Brock";

/// How new flags combine with the stored ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagMode {
    #[default]
    Merge,
    Replace,
}

/// Change a thread's flags.
///
/// Keys in `remove` are dropped after `flags` is applied. Setting the
/// general check-in flag clears it on every other thread first, so at most
/// one thread holds it.
pub async fn update_thread_flags(
    store: &dyn PersistenceClient,
    thread_id: &str,
    flags: ThreadFlags,
    mode: FlagMode,
    remove: &[String],
) -> Result<Thread> {
    let current = store
        .get_thread(thread_id)
        .await?
        .ok_or_else(|| brock_persist::PersistError::ThreadNotFound(thread_id.to_string()))?;

    let mut next = match mode {
        FlagMode::Merge => current.flags.clone(),
        FlagMode::Replace => ThreadFlags::new(),
    };
    next.extend(flags);
    for key in remove {
        next.remove(key);
    }

    if next.get(GENERAL_CHECKIN_FLAG) == Some(&Value::Bool(true)) {
        clear_general_checkin(store, Some(thread_id)).await?;
    }

    Ok(store.update_thread(thread_id, ThreadUpdate::flags(next)).await?)
}

/// Remove the general check-in flag from every thread except `keep`
async fn clear_general_checkin(store: &dyn PersistenceClient, keep: Option<&str>) -> Result<()> {
    let holders = store
        .find_threads_by_flag(GENERAL_CHECKIN_FLAG, &Value::Bool(true))
        .await?;
    for thread in holders {
        if Some(thread.id.as_str()) == keep {
            continue;
        }
        let mut flags = thread.flags;
        flags.remove(GENERAL_CHECKIN_FLAG);
        store.update_thread(&thread.id, ThreadUpdate::flags(flags)).await?;
        info!(thread_id = %thread.id, "Cleared general check-in flag");
    }
    Ok(())
}

/// The general check-in thread, if one exists
pub async fn find_general_checkin_thread(store: &dyn PersistenceClient) -> Result<Option<Thread>> {
    let holders = store
        .find_threads_by_flag(GENERAL_CHECKIN_FLAG, &Value::Bool(true))
        .await?;
    Ok(holders.into_iter().max_by_key(|t| t.updated_at))
}

/// Find the general check-in thread or create it
pub async fn find_or_create_general_checkin_thread(store: &dyn PersistenceClient) -> Result<Thread> {
    if let Some(thread) = find_general_checkin_thread(store).await? {
        return Ok(thread);
    }

    let thread = store
        .create_thread(
            NewThread::titled(CHECKIN_THREAD_TITLE)
                .with_topic(CHECKIN_THREAD_TOPIC)
                .with_summary(CHECKIN_THREAD_SUMMARY)
                .with_flag(GENERAL_CHECKIN_FLAG, true)
                .with_flag("icon", "clock.badge.checkmark")
                .with_flag("icon_color", "green"),
        )
        .await?;
    info!(thread_id = %thread.id, "Created general check-in thread");
    Ok(thread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brock_persist::MemoryPersistenceClient;
    use serde_json::json;

    fn flags(value: Value) -> ThreadFlags {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let store = MemoryPersistenceClient::new();

        let first = find_or_create_general_checkin_thread(&store).await.unwrap();
        let second = find_or_create_general_checkin_thread(&store).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.title, CHECKIN_THREAD_TITLE);
        assert_eq!(first.flag("icon"), Some(&json!("clock.badge.checkmark")));
        assert!(first.is_general_checkin());
        assert_eq!(store.list_threads(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_merge_replace_and_remove() {
        let store = MemoryPersistenceClient::new();
        let thread = store
            .create_thread(NewThread::titled("Runs").with_flag("icon", "figure.run"))
            .await
            .unwrap();

        let merged = update_thread_flags(
            &store,
            &thread.id,
            flags(json!({"pinned": true})),
            FlagMode::Merge,
            &[],
        )
        .await
        .unwrap();
        assert_eq!(merged.flags, flags(json!({"icon": "figure.run", "pinned": true})));

        let removed =
            update_thread_flags(&store, &thread.id, ThreadFlags::new(), FlagMode::Merge, &["icon".to_string()])
                .await
                .unwrap();
        assert_eq!(removed.flags, flags(json!({"pinned": true})));

        let replaced = update_thread_flags(
            &store,
            &thread.id,
            flags(json!({"color": "blue"})),
            FlagMode::Replace,
            &[],
        )
        .await
        .unwrap();
        assert_eq!(replaced.flags, flags(json!({"color": "blue"})));
    }

    #[tokio::test]
    async fn test_general_checkin_flag_is_exclusive() {
        let store = MemoryPersistenceClient::new();
        let old = find_or_create_general_checkin_thread(&store).await.unwrap();
        let other = store.create_thread(NewThread::titled("Mine")).await.unwrap();

        update_thread_flags(
            &store,
            &other.id,
            flags(json!({"is_general_checkin": true})),
            FlagMode::Merge,
            &[],
        )
        .await
        .unwrap();

        let holders = store
            .find_threads_by_flag(GENERAL_CHECKIN_FLAG, &json!(true))
            .await
            .unwrap();
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].id, other.id);

        let old = store.get_thread(&old.id).await.unwrap().unwrap();
        assert!(!old.is_general_checkin());
        assert_eq!(old.flag("icon_color"), Some(&json!("green")));
    }

    #[tokio::test]
    async fn test_unknown_thread_is_not_found() {
        let store = MemoryPersistenceClient::new();
        let err = update_thread_flags(&store, "nope", ThreadFlags::new(), FlagMode::Merge, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, crate::ChatError::Store(ref e) if e.is_not_found()));
    }
}
