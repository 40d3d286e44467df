//! End-to-end runs of the parse -> intercept -> execute lifecycle.

use std::sync::Arc;
use std::time::Duration;

use parley::command::InboundMessage;
use parley::core::{channel, run_worker, BotState, Registry};
use parley::discussion::Queue;
use parley::{CommandKind, RecordingSession, Reply, SendError, Snowflake};

fn registry() -> Registry {
    Registry::builder()
        .with_discussion_queue()
        .with_meme_stash()
        .build()
}

fn msg(content: &str) -> InboundMessage {
    InboundMessage::new("100", "erin", "555", content)
}

async fn run(registry: &mut Registry, session: &RecordingSession, content: &str) {
    let mut cmd = registry.parse(&msg(content)).expect("tokenizes");
    let _ = registry.process(session, &mut cmd).await;
}

#[tokio::test]
async fn add_then_next_replies_with_topic() {
    let mut registry = registry();
    let session = RecordingSession::new();

    run(&mut registry, &session, "&dq add foo bar").await;
    run(&mut registry, &session, "&dq next").await;

    let sent = session.sent().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|s| s.channel == Snowflake(555)));
    match &sent[1].reply {
        Reply::Rich(rich) => {
            assert_eq!(rich.title(), Some("foo"));
            assert_eq!(rich.description(), Some("bar"));
            assert_eq!(rich.footer(), Some("Proposed by erin"));
        }
        other => panic!("expected rich reply, got {:?}", other),
    }
}

#[tokio::test]
async fn quoted_topic_names() {
    let mut registry = registry();
    let session = RecordingSession::new();

    run(&mut registry, &session, r#"&dq add "release plan" 'for next week'"#).await;
    let topic = registry.state().queue.get("release plan").expect("added");
    assert_eq!(topic.description.as_deref(), Some("for next week"));
}

#[tokio::test]
async fn bot_authors_get_no_reply() {
    let mut registry = registry();
    let session = RecordingSession::new();

    let mut cmd = registry.parse(&msg("&help").by_bot()).unwrap();
    assert_eq!(cmd.kind, CommandKind::None);
    registry.process(&session, &mut cmd).await.unwrap();

    assert!(session.sent().await.is_empty());
}

#[tokio::test]
async fn unknown_command_is_not_understood() {
    let mut registry = registry();
    let session = RecordingSession::new();

    run(&mut registry, &session, "&dance now").await;
    let sent = session.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].reply.to_text().contains("not understood"));
}

#[tokio::test]
async fn plain_chat_is_ignored() {
    let mut registry = registry();
    let session = RecordingSession::new();

    run(&mut registry, &session, "dq add foo").await;
    run(&mut registry, &session, "just chatting").await;

    assert!(session.sent().await.is_empty());
    assert!(registry.state().queue.is_empty());
}

#[tokio::test]
async fn malformed_ids_become_error_commands() {
    let registry = registry();
    let cmd = registry
        .parse(&InboundMessage::new("not-a-number", "erin", "555", "&help"))
        .unwrap();
    assert_eq!(cmd.kind, CommandKind::Error);
    assert!(cmd.source.is_none());
}

#[tokio::test]
async fn multiline_quote_is_rejected() {
    let registry = registry();
    assert!(registry.parse(&msg("&dq add \"two\nlines\"")).is_err());
}

#[tokio::test]
async fn queue_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let session = RecordingSession::new();

    let mut first = Registry::builder()
        .with_discussion_queue()
        .state(BotState::load(dir.path()).unwrap())
        .build();
    run(&mut first, &session, "&dq add one").await;
    run(&mut first, &session, "&dq add two").await;
    run(&mut first, &session, "&dq skip one").await;
    drop(first);

    let restored = Queue::load(dir.path()).unwrap();
    let names: Vec<&str> = restored.list().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["two", "one"]);
}

#[tokio::test]
async fn save_failure_is_still_answered() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut registry = Registry::builder()
        .with_discussion_queue()
        .state(BotState::default().with_data_dir(file.path()))
        .build();
    let session = RecordingSession::new();

    let mut cmd = registry.parse(&msg("&dq add foo")).unwrap();
    assert!(registry.process(&session, &mut cmd).await.is_err());
    assert_eq!(registry.state().queue.len(), 1);

    let sent = session.sent().await;
    assert_eq!(sent.len(), 1);
    match &sent[0].reply {
        Reply::Rich(rich) => assert_eq!(rich.title(), Some("Not Saved")),
        other => panic!("expected rich reply, got {:?}", other),
    }
}

#[tokio::test]
async fn send_failure_does_not_stop_the_worker() {
    let registry = registry();
    let parser = registry.parser();
    let session = Arc::new(RecordingSession::failing(SendError::Unavailable(
        "offline".to_string(),
    )));
    let (tx, rx) = channel(4);
    let worker = tokio::spawn(run_worker(rx, registry, session.clone()));

    for content in ["&help", "&dq add kept", "&dq add also-kept"] {
        tx.submit(parser.parse(&msg(content)).unwrap()).await.unwrap();
    }
    drop(tx);

    let registry = worker.await.unwrap();
    assert_eq!(registry.state().queue.len(), 2);
    assert!(session.sent().await.is_empty());
}

#[tokio::test]
async fn full_buffer_applies_backpressure() {
    let registry = registry();
    let parser = registry.parser();
    let session = Arc::new(RecordingSession::new().with_delay(Duration::from_millis(200)));
    let (tx, rx) = channel(1);
    let worker = tokio::spawn(run_worker(rx, registry, session.clone()));

    let cmd = |content: &str| parser.parse(&msg(content)).unwrap();

    // The worker takes the first command and stalls on the slow send.
    tx.submit(cmd("&dq add topic0")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The second fills the only slot; the third cannot get in.
    tx.submit(cmd("&dq add topic1")).await.unwrap();
    let err = tx.try_submit(cmd("&dq add topic2")).unwrap_err();
    assert_eq!(err.to_string(), "command buffer full");

    // While the worker is stalled a blocking submit stays pending.
    let pending = tokio::time::timeout(Duration::from_millis(20), tx.submit(cmd("&dq add topic2"))).await;
    assert!(pending.is_err(), "submit returned while the buffer was full");

    // Once the worker drains, the same submit goes through and nothing is dropped.
    tx.submit(cmd("&dq add topic2")).await.unwrap();
    drop(tx);

    let registry = worker.await.unwrap();
    let names: Vec<&str> = registry.state().queue.list().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["topic0", "topic1", "topic2"]);
    assert_eq!(session.sent().await.len(), 3);
}
