use std::sync::Arc;

use brock_context::{
    build_system_prompt, ContextAssembler, Profile, SUMMARY_EMPTY_THREAD, SUMMARY_FALLBACK,
    UNKNOWN_THREAD_TITLE,
};
use brock_llm::testing::{CallKind, ScriptedChatClient};
use brock_llm::Message;
use brock_persist::{DBMessage, MemoryPersistenceClient, NewThread, PersistenceClient};
use brock_types::LLMConfig;

fn assembler(
    store: Arc<MemoryPersistenceClient>,
    llm: Arc<ScriptedChatClient>,
) -> ContextAssembler {
    ContextAssembler::new(store, llm, Profile::default(), LLMConfig::summary())
}

async fn seeded_thread(store: &MemoryPersistenceClient, messages: usize) -> String {
    let thread = store
        .create_thread(NewThread::titled("Leg day").with_topic("strength"))
        .await
        .unwrap();
    for i in 0..messages {
        let message = if i % 2 == 0 {
            DBMessage::user(&thread.id, format!("question {}", i))
        } else {
            DBMessage::assistant(&thread.id, format!("answer {}", i))
        };
        store.save_message(message).await.unwrap();
    }
    thread.id
}

#[tokio::test]
async fn test_thread_context_is_chronological_and_limited() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let thread_id = seeded_thread(&store, 14).await;
    let assembler = assembler(store, Arc::new(ScriptedChatClient::new()));

    let context = assembler.thread_context(&thread_id, 10).await;

    assert_eq!(context.title, "Leg day");
    assert_eq!(context.topic.as_deref(), Some("strength"));
    assert_eq!(context.recent_messages.len(), 10);
    assert_eq!(context.recent_messages[0].content, "question 4");
    assert_eq!(context.recent_messages[9].content, "answer 13");
}

#[tokio::test]
async fn test_history_messages_map_senders_to_roles() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let thread_id = seeded_thread(&store, 2).await;
    let assembler = assembler(store, Arc::new(ScriptedChatClient::new()));

    let context = assembler.thread_context(&thread_id, 10).await;
    let history = assembler.history_messages(&context);

    assert_eq!(history, vec![Message::human("question 0"), Message::ai("answer 1")]);
}

#[tokio::test]
async fn test_unknown_thread_degrades() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let assembler = assembler(store, Arc::new(ScriptedChatClient::new()));

    let context = assembler.thread_context("missing", 10).await;

    assert_eq!(context.thread_id, "missing");
    assert_eq!(context.title, UNKNOWN_THREAD_TITLE);
    assert!(context.recent_messages.is_empty());
}

#[tokio::test]
async fn test_store_failure_degrades() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let thread_id = seeded_thread(&store, 3).await;
    store.set_offline(true);
    let assembler = assembler(store, Arc::new(ScriptedChatClient::new()));

    let context = assembler.thread_context(&thread_id, 10).await;

    assert_eq!(context.title, UNKNOWN_THREAD_TITLE);
    assert!(context.recent_messages.is_empty());

    let prompt = build_system_prompt(assembler.profile(), &context);
    assert!(prompt.contains("\"Unknown Thread\""));
}

#[tokio::test]
async fn test_summary_of_empty_thread_skips_model() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let thread_id = seeded_thread(&store, 0).await;
    let llm = Arc::new(ScriptedChatClient::new());
    let assembler = assembler(store, llm.clone());

    assert_eq!(assembler.generate_thread_summary(&thread_id).await, SUMMARY_EMPTY_THREAD);
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn test_summary_uses_last_twenty_messages() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let thread_id = seeded_thread(&store, 25).await;
    let llm = Arc::new(ScriptedChatClient::new().push_reply("  Planning leg workouts.  "));
    let assembler = assembler(store, llm.clone());

    let summary = assembler.generate_thread_summary(&thread_id).await;
    assert_eq!(summary, "Planning leg workouts.");

    let requests = llm.requests_of(CallKind::Chat);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "gpt-4o-mini");
    let transcript = requests[0].messages[1].text().unwrap();
    assert!(transcript.starts_with("brock: answer 5"));
    assert!(transcript.ends_with("user: question 24"));
    assert!(!transcript.contains("question 4\n"));
}

#[tokio::test]
async fn test_summary_falls_back_on_model_failure() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let thread_id = seeded_thread(&store, 2).await;
    let llm = Arc::new(ScriptedChatClient::new().push_reply_failure("rate limited"));
    let assembler = assembler(store, llm);

    assert_eq!(assembler.generate_thread_summary(&thread_id).await, SUMMARY_FALLBACK);
}

#[tokio::test]
async fn test_summary_falls_back_on_blank_reply() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let thread_id = seeded_thread(&store, 2).await;
    let llm = Arc::new(ScriptedChatClient::new().push_reply("   "));
    let assembler = assembler(store, llm);

    assert_eq!(assembler.generate_thread_summary(&thread_id).await, SUMMARY_FALLBACK);
}

#[tokio::test]
async fn test_refresh_thread_summary_stores_result() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let thread_id = seeded_thread(&store, 2).await;
    let llm = Arc::new(ScriptedChatClient::new().push_reply("Squat technique check."));
    let assembler = assembler(store.clone(), llm);

    assembler.refresh_thread_summary(&thread_id).await;

    let thread = store.get_thread(&thread_id).await.unwrap().unwrap();
    assert_eq!(thread.summary.as_deref(), Some("Squat technique check."));
}

#[tokio::test]
async fn test_refresh_unknown_thread_is_swallowed() {
    let store = Arc::new(MemoryPersistenceClient::new());
    let assembler = assembler(store, Arc::new(ScriptedChatClient::new()));

    // Empty thread summary, then ThreadNotFound on update; logged only
    assembler.refresh_thread_summary("missing").await;
}
