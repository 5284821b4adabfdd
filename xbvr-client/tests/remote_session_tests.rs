//! Remote session synchronizer tests

mod common;

use std::sync::Arc;

use serde_json::json;
use xbvr_client::{HttpMethod, RemoteSession, SyncError, SyncOutcome};
use xbvr_model::{FileID, RemoteStatus, SceneID, SceneKey};

use common::{scene_json, stub, wait_for_calls};

fn serve_scenes(stub: &xbvr_client::infra::testing::TestApiService, ids: &[u64]) {
    for id in ids {
        stub.respond_json(HttpMethod::Get, &format!("/api/scene/{id}"), scene_json(*id));
    }
}

#[tokio::test]
async fn transitions_archive_the_previous_scene() {
    let (stub, api) = stub();
    serve_scenes(&stub, &[7, 9]);
    let session = RemoteSession::new(api);
    assert!(session.state().is_idle());

    let first = session.process_event(RemoteStatus::scene(SceneID(7))).await.unwrap();
    assert_eq!(
        first,
        SyncOutcome::Transitioned {
            from: SceneID::UNSET,
            to: SceneID(7)
        }
    );
    assert!(session.history().is_empty());
    let seven = session.current_scene().expect("scene 7 installed");

    session.process_event(RemoteStatus::scene(SceneID(9))).await.unwrap();

    let state = session.state();
    assert_eq!(state.current_scene_id, SceneID(9));
    assert_eq!(
        state.current_scene.as_ref().map(|s| s.scene_id.clone()),
        Some(SceneKey::new("site-9"))
    );
    assert_eq!(session.history(), vec![seven]);
}

#[tokio::test]
async fn sparse_status_leaves_other_fields_alone() {
    let (stub, api) = stub();
    serve_scenes(&stub, &[7]);
    let session = RemoteSession::new(api);
    session
        .process_event(RemoteStatus {
            connected: Some(true),
            current_file_id: Some(FileID(70)),
            current_position: Some(12.5),
            current_scene_id: Some(SceneID(7)),
            ..RemoteStatus::default()
        })
        .await
        .unwrap();
    let before = session.state();

    let outcome = session.process_event(RemoteStatus::playing(true)).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Merged);

    let mut after = session.state();
    assert!(after.is_playing);
    after.is_playing = before.is_playing;
    assert_eq!(after, before);
    // no extra scene fetch
    assert_eq!(stub.calls().len(), 1);
}

#[tokio::test]
async fn repeated_scene_id_does_not_refetch() {
    let (stub, api) = stub();
    serve_scenes(&stub, &[7]);
    let session = RemoteSession::new(api);

    session.process_event(RemoteStatus::scene(SceneID(7))).await.unwrap();
    let again = session.process_event(RemoteStatus::scene(SceneID(7))).await.unwrap();

    assert_eq!(again, SyncOutcome::Merged);
    assert_eq!(stub.calls_to(HttpMethod::Get, "/api/scene/7").len(), 1);
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn failed_fetch_keeps_the_current_scene() {
    let (stub, api) = stub();
    serve_scenes(&stub, &[7]);
    stub.fail(HttpMethod::Get, "/api/scene/9", 500);
    let session = RemoteSession::new(api);
    session.process_event(RemoteStatus::scene(SceneID(7))).await.unwrap();
    let before = session.state();

    let err = session
        .process_event(RemoteStatus {
            is_playing: Some(true),
            current_scene_id: Some(SceneID(9)),
            ..RemoteStatus::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::SceneFetch {
            scene_id: SceneID(9),
            ..
        }
    ));

    let after = session.state();
    assert_eq!(after.current_scene_id, SceneID(7));
    assert_eq!(after.current_scene, before.current_scene);
    assert!(after.history.is_empty());
    // sparse fields still apply
    assert!(after.is_playing);

    // the same id is retried on the next event
    serve_scenes(&stub, &[9]);
    let retried = session.process_event(RemoteStatus::scene(SceneID(9))).await.unwrap();
    assert!(matches!(retried, SyncOutcome::Transitioned { .. }));
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn undecodable_scene_is_reported() {
    let (stub, api) = stub();
    stub.respond_json(HttpMethod::Get, "/api/scene/5", json!({ "id": "five" }));
    let session = RemoteSession::new(api);

    let err = session.process_event(RemoteStatus::scene(SceneID(5))).await.unwrap_err();
    assert!(matches!(err, SyncError::SceneDecode { .. }));
    assert!(session.state().is_idle());
}

#[tokio::test]
async fn history_is_bounded() {
    let (stub, api) = stub();
    serve_scenes(&stub, &[1, 2, 3, 4]);
    let session = RemoteSession::new(api).with_history_limit(Some(2));

    for id in 1..=4 {
        session.process_event(RemoteStatus::scene(SceneID(id))).await.unwrap();
    }

    let kept: Vec<SceneID> = session.history().iter().map(|s| s.id).collect();
    assert_eq!(kept, vec![SceneID(2), SceneID(3)]);

    session.clear_history();
    assert!(session.history().is_empty());
    assert_eq!(session.state().current_scene_id, SceneID(4));
}

#[tokio::test]
async fn zero_scene_id_goes_idle() {
    let (stub, api) = stub();
    serve_scenes(&stub, &[7]);
    let session = RemoteSession::new(api);
    session.process_event(RemoteStatus::scene(SceneID(7))).await.unwrap();

    let outcome = session.process_event(RemoteStatus::scene(SceneID::UNSET)).await.unwrap();
    assert_eq!(outcome, SyncOutcome::WentIdle);

    let state = session.state();
    assert!(state.is_idle());
    assert_eq!(state.current_scene, None);
    assert_eq!(state.history.len(), 1);
    assert_eq!(stub.calls().len(), 1);
}

#[tokio::test]
async fn newer_transition_supersedes_a_slow_fetch() {
    let (stub, api) = stub();
    serve_scenes(&stub, &[7, 9]);
    let session = Arc::new(RemoteSession::new(api));

    let gate = stub.hold_next(HttpMethod::Get, "/api/scene/7");
    let slow = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.process_event(RemoteStatus::scene(SceneID(7))).await }
    });
    wait_for_calls(&stub, HttpMethod::Get, "/api/scene/7", 1).await;

    session.process_event(RemoteStatus::scene(SceneID(9))).await.unwrap();
    gate.release();
    assert_eq!(slow.await.unwrap().unwrap(), SyncOutcome::Superseded);

    let state = session.state();
    assert_eq!(state.current_scene_id, SceneID(9));
    assert!(state.history.is_empty());
}

#[tokio::test]
async fn raw_feed_messages_are_processed() {
    let (stub, api) = stub();
    serve_scenes(&stub, &[3]);
    let session = RemoteSession::new(api);

    session
        .process_message(&json!({
            "connected": true,
            "deovrHost": "10.0.0.4",
            "isPlaying": true,
            "currentPosition": 42.0,
            "currentFileID": 30,
            "currentSceneID": 3
        }))
        .await
        .unwrap();

    let state = session.state();
    assert!(state.connected);
    assert_eq!(state.deovr_host, "10.0.0.4");
    assert_eq!(state.current_file_id, FileID(30));
    assert_eq!(state.current_scene_id, SceneID(3));

    let err = session.process_message(&json!("garbage")).await.unwrap_err();
    assert!(matches!(err, SyncError::MalformedStatus(_)));
}

#[tokio::test]
async fn drive_processes_events_in_order() {
    let (stub, api) = stub();
    serve_scenes(&stub, &[7, 9]);
    stub.fail(HttpMethod::Get, "/api/scene/8", 502);
    let session = RemoteSession::new(api);

    let events = futures::stream::iter(vec![
        RemoteStatus::scene(SceneID(7)),
        RemoteStatus::playing(true),
        RemoteStatus::scene(SceneID(8)),
        RemoteStatus::scene(SceneID(9)),
        RemoteStatus::playing(false),
    ]);
    let processed = session.drive(events).await;
    assert_eq!(processed, 5);

    let state = session.state();
    assert_eq!(state.current_scene_id, SceneID(9));
    assert!(!state.is_playing);
    let history: Vec<SceneID> = state.history.iter().map(|s| s.id).collect();
    assert_eq!(history, vec![SceneID(7)]);
}
