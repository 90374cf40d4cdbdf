//! Cancellation and concurrency tests for the turn controller.

mod common;

use std::time::Duration;

use common::*;
use searchstream::adapters::mock::ScriptedTransport;
use searchstream::error::{StreamError, TurnError};
use searchstream::turn::{ControllerPhase, TurnStatus, INTERRUPTED_NOTICE};

/// Wait until the controller has published a snapshot satisfying `pred`.
async fn wait_for<F>(rx: &mut tokio::sync::mpsc::UnboundedReceiver<searchstream::turn::TurnSnapshot>, pred: F)
where
    F: Fn(&searchstream::turn::TurnState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(snapshot) = rx.recv().await {
            if pred(&snapshot) {
                return;
            }
        }
        panic!("snapshot channel closed");
    })
    .await
    .expect("timed out waiting for snapshot");
}

#[tokio::test]
async fn test_cancel_mid_stream_preserves_content() {
    let transport = ScriptedTransport::new()
        .with_chunks([frame("answer_chunk", "\"Hello\"")])
        .holding_open();
    let controller = controller(transport);
    let mut rx = controller.subscribe();

    let handle = controller.start("q").unwrap();
    wait_for(&mut rx, |s| s.chat() == "Hello").await;
    assert_eq!(controller.phase(), ControllerPhase::Streaming);

    assert!(controller.cancel());
    let snapshot = handle.join().await.unwrap();

    assert_eq!(snapshot.status(), TurnStatus::Cancelled);
    assert_eq!(snapshot.chat(), format!("Hello{}", INTERRUPTED_NOTICE));
    assert_eq!(snapshot.failure(), Some(&StreamError::Cancelled));
    assert_eq!(controller.phase(), ControllerPhase::Cancelled);
}

#[tokio::test]
async fn test_cancel_through_handle() {
    let transport = ScriptedTransport::new().holding_open();
    let controller = controller(transport);
    let mut rx = controller.subscribe();

    let handle = controller.start("q").unwrap();
    wait_for(&mut rx, |s| !s.is_terminal()).await;
    handle.cancel();

    let snapshot = handle.join().await.unwrap();
    assert_eq!(snapshot.status(), TurnStatus::Cancelled);
    assert_eq!(snapshot.chat(), INTERRUPTED_NOTICE.trim_start());
}

#[tokio::test]
async fn test_cancel_while_sending() {
    let transport = ScriptedTransport::new()
        .with_open_delay(Duration::from_secs(30))
        .with_chunks([frame("answer_chunk", "\"late\"")]);
    let controller = controller(transport);

    let handle = controller.start("q").unwrap();
    tokio::task::yield_now().await;
    assert!(controller.is_active());
    assert!(controller.cancel());

    let snapshot = tokio::time::timeout(Duration::from_secs(5), handle.join())
        .await
        .expect("cancel should not wait for the transport")
        .unwrap();
    assert_eq!(snapshot.status(), TurnStatus::Cancelled);
    assert!(!snapshot.chat().contains("late"));
}

#[tokio::test]
async fn test_second_start_is_refused() {
    let controller = controller(ScriptedTransport::new().holding_open());
    let handle = controller.start("first").unwrap();

    assert_eq!(controller.start("second").unwrap_err(), TurnError::AlreadyActive);
    assert_eq!(controller.run("third").await.unwrap_err(), TurnError::AlreadyActive);

    handle.cancel();
    handle.join().await.unwrap();

    // A finished controller accepts the next turn
    let handle = controller.start("fourth").unwrap();
    handle.cancel();
    assert_eq!(
        handle.join().await.unwrap().query(),
        "fourth"
    );
}

#[tokio::test]
async fn test_cancel_after_completion_is_noop() {
    let controller = controller(ScriptedTransport::new().with_chunks([frame("done", "{}")]));
    let snapshot = controller.run("q").await.unwrap();

    assert!(!controller.cancel());
    assert_eq!(controller.latest(), Some(snapshot.clone()));
    assert_eq!(snapshot.status(), TurnStatus::Completed);
}

#[tokio::test]
async fn test_dropped_run_future_releases_controller() {
    let controller = controller(ScriptedTransport::new().holding_open());

    let run = controller.run("q");
    let _ = tokio::time::timeout(Duration::from_millis(50), run).await;

    assert!(!controller.is_active());
    assert!(controller.start("again").is_ok());
}

#[tokio::test]
async fn test_slow_stream_delivers_incrementally() {
    let transport = ScriptedTransport::new()
        .with_chunks([
            frame("answer_chunk", "\"one \""),
            frame("answer_chunk", "\"two\""),
        ])
        .with_chunk_delay(Duration::from_millis(5));
    let controller = controller(transport);
    let mut rx = controller.subscribe();

    let handle = controller.start("q").unwrap();
    wait_for(&mut rx, |s| s.chat() == "one ").await;
    let snapshot = handle.join().await.unwrap();
    assert_eq!(snapshot.chat(), "one two");
    assert_eq!(snapshot.status(), TurnStatus::Completed);
}
