//! One viewer's observer serving rollouts to another viewer's HTTP
//! repository, over a real loopback socket.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use survivor_core::config::{ObserverConfig, PlaybackConfig};
use survivor_core::playback::PlaybackController;
use survivor_observer::{AppState, spawn_observer};
use survivor_rollouts::http::HttpRepository;
use survivor_rollouts::memory::MemoryRepository;
use survivor_rollouts::{RepositoryError, RolloutRepository, SelectionBridge};
use survivor_types::{Event, EventKind, EventLog, PlayerId, WinnerParams};

fn winner_log() -> EventLog {
    EventLog::new(vec![Event::new(
        0,
        EventKind::Winner(WinnerParams {
            winner_player_id: PlayerId(7),
            message: Some(String::from("gg")),
        }),
    )])
    .unwrap()
}

async fn serve(repo: MemoryRepository) -> (HttpRepository, tokio::task::JoinHandle<()>) {
    let controller = PlaybackController::new(&PlaybackConfig::default()).unwrap();
    let bridge = SelectionBridge::new(
        Arc::new(RolloutRepository::from(repo)),
        Arc::new(controller),
    );
    let config = ObserverConfig {
        port: 0,
        ..ObserverConfig::default()
    };
    let handle = spawn_observer(&config, Arc::new(AppState::new(Arc::new(bridge))))
        .await
        .unwrap();
    let client = HttpRepository::new(&format!("http://{}", handle.addr), Duration::from_secs(5))
        .unwrap();
    (client, handle.task)
}

#[tokio::test]
async fn http_repository_reads_observer_passthrough() {
    let (client, task) = serve(MemoryRepository::new().with_rollout("final", winner_log())).await;

    assert_eq!(client.list().await.unwrap(), vec!["final"]);
    let log = client.fetch("final").await.unwrap();
    assert_eq!(*log, winner_log());

    task.abort();
}

#[tokio::test]
async fn missing_remote_rollout_is_not_found() {
    let (client, task) = serve(MemoryRepository::new()).await;

    let err = client.fetch("absent").await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(id) if id == "absent"));

    task.abort();
}

#[tokio::test]
async fn failing_remote_listing_is_a_status_error() {
    let (client, task) = serve(MemoryRepository::new().with_listing_unavailable()).await;

    let err = client.list().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Status { status: 502, .. }));

    task.abort();
}
