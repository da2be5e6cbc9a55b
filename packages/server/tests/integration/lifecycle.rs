use ::common::{EventStatus, InferenceKind, UploadPicture};
use chrono::Duration;

use tryon_server::{ResultsView, TryOnError};

use crate::common::{ACCOUNT, TestApp, hairstyle, hairstyles, picture};

mod create {
    use super::*;

    #[tokio::test]
    async fn new_event_has_no_facts() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;

        let event = app.event(&event_id).await;
        assert_eq!(event.account_id, ACCOUNT);
        assert!(event.uploaded_picture.is_none());
        assert!(event.hairstyles.is_none());
        assert!(event.embedding.is_none());
        assert!(event.blendings.is_empty());
        assert!(event.finished_at.is_none());
        assert_eq!(event.deadline - event.created_at, Duration::hours(1));
    }

    #[tokio::test]
    async fn event_ids_are_unique() {
        let app = TestApp::spawn();
        let first = app.create_event().await;
        let second = app.create_event().await;
        assert_ne!(first, second);
        assert_eq!(app.store.len(), 2);
    }
}

mod facts {
    use super::*;

    #[tokio::test]
    async fn photo_is_set_once() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;

        app.manager
            .set_photo(ACCOUNT, &event_id, picture())
            .await
            .unwrap();
        let second = UploadPicture {
            file_location: "p2".into(),
            bbox: [1, 1, 5, 5].into(),
        };
        let err = app
            .manager
            .set_photo(ACCOUNT, &event_id, second)
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::AlreadyExists(_)));

        let event = app.event(&event_id).await;
        assert_eq!(event.uploaded_picture, Some(picture()));
        assert!(event.picture_uploaded_at.is_some());
    }

    #[tokio::test]
    async fn photo_starts_embedding() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;
        app.manager
            .set_photo(ACCOUNT, &event_id, picture())
            .await
            .unwrap();

        let event = app.event(&event_id).await;
        let embedding = event.embedding.expect("embedding should be queued");
        assert!(embedding.queued_at.is_some());
        assert!(embedding.result.is_none());

        let jobs = app.dispatcher.jobs_of(InferenceKind::Embedding).await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_id, embedding.inference_id);
        assert_eq!(jobs[0].event_id, event_id);
    }

    #[tokio::test]
    async fn hairstyles_are_set_once() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;

        app.manager
            .set_hairstyles(ACCOUNT, &event_id, hairstyles(&[1, 2]))
            .await
            .unwrap();
        let err = app
            .manager
            .set_hairstyles(ACCOUNT, &event_id, hairstyles(&[3]))
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::AlreadyExists(_)));

        let picked = app.event(&event_id).await.hairstyles.unwrap();
        assert_eq!(picked, hairstyles(&[1, 2]));
    }

    #[tokio::test]
    async fn empty_hairstyle_list_is_rejected() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;

        let err = app
            .manager
            .set_hairstyles(ACCOUNT, &event_id, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::InvalidInput(_)));
        assert!(app.event(&event_id).await.hairstyles.is_none());
    }

    #[tokio::test]
    async fn duplicate_hairstyle_is_rejected() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;

        let err = app
            .manager
            .set_hairstyles(ACCOUNT, &event_id, vec![hairstyle(1), hairstyle(2), hairstyle(1)])
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::InvalidInput(_)));

        // The rejected submission does not count as the one allowed pick.
        app.manager
            .set_hairstyles(ACCOUNT, &event_id, hairstyles(&[1, 2]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn malformed_photo_is_rejected() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;

        let bad = UploadPicture {
            file_location: "p1".into(),
            bbox: [10, 10, 0, 0].into(),
        };
        let err = app
            .manager
            .set_photo(ACCOUNT, &event_id, bad)
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::InvalidInput(_)));
        assert!(app.dispatcher.jobs().await.is_empty());

        app.manager
            .set_photo(ACCOUNT, &event_id, picture())
            .await
            .unwrap();
    }
}

mod ownership {
    use super::*;

    #[tokio::test]
    async fn other_account_sees_not_found() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;

        let err = app
            .manager
            .set_photo("intruder", &event_id, picture())
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)));

        let err = app
            .manager
            .set_hairstyles("intruder", &event_id, hairstyles(&[1]))
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)));

        let err = app
            .manager
            .get_results("intruder", &event_id)
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)));

        let event = app.event(&event_id).await;
        assert!(event.uploaded_picture.is_none());
        assert!(event.hairstyles.is_none());
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let app = TestApp::spawn();
        let err = app
            .manager
            .get_results(ACCOUNT, "0000-missing")
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)));

        let err = app
            .manager
            .status(ACCOUNT, "0000-missing")
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)));
    }
}

mod expiry {
    use super::*;

    #[tokio::test]
    async fn setting_facts_after_deadline_fails() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;
        app.expire(&event_id).await;

        let err = app
            .manager
            .set_photo(ACCOUNT, &event_id, picture())
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::Expired(_)));

        let err = app
            .manager
            .set_hairstyles(ACCOUNT, &event_id, hairstyles(&[1]))
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::Expired(_)));

        let event = app.event(&event_id).await;
        assert!(event.errored);
        assert!(event.expired_at.is_some());
        assert!(event.uploaded_picture.is_none());
        assert!(app.dispatcher.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn polling_after_deadline_times_out() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;
        app.manager
            .set_photo(ACCOUNT, &event_id, picture())
            .await
            .unwrap();
        app.expire(&event_id).await;

        let view = app.manager.get_results(ACCOUNT, &event_id).await.unwrap();
        assert_eq!(view, ResultsView::TimedOut);

        let expired_at = app.event(&event_id).await.expired_at;
        assert!(expired_at.is_some());

        // The side-effect is applied once.
        app.manager.get_results(ACCOUNT, &event_id).await.unwrap();
        assert_eq!(app.event(&event_id).await.expired_at, expired_at);
    }
}

mod status {
    use super::*;

    #[tokio::test]
    async fn status_tracks_progress() {
        let app = TestApp::spawn();
        let event_id = app.create_event().await;
        assert_eq!(app.manager.status(ACCOUNT, &event_id).await.unwrap(), EventStatus::AwaitingInput);

        app.manager
            .set_photo(ACCOUNT, &event_id, picture())
            .await
            .unwrap();
        assert_eq!(app.manager.status(ACCOUNT, &event_id).await.unwrap(), EventStatus::Embedding);

        app.manager
            .set_hairstyles(ACCOUNT, &event_id, hairstyles(&[1]))
            .await
            .unwrap();
        app.finish_embedding(&event_id).await;
        assert_eq!(app.manager.status(ACCOUNT, &event_id).await.unwrap(), EventStatus::Blending);

        app.finish_blendings(&event_id).await;
        assert_eq!(app.manager.status(ACCOUNT, &event_id).await.unwrap(), EventStatus::Completed);

        app.expire(&event_id).await;
        assert_eq!(app.manager.status(ACCOUNT, &event_id).await.unwrap(), EventStatus::Expired);
        assert!(app.event(&event_id).await.errored);
    }
}

mod malformed_ids {
    use std::sync::Arc;

    use ::common::{BlendingResult, EmbeddingResult, InferenceResult};
    use tryon_server::AppState;
    use tryon_server::config::EventConfig;
    use tryon_server::consumers::handle_inference_result;
    use tryon_server::dispatch::MemoryDispatcher;
    use tryon_server::store::FilesystemEventStore;

    use super::*;

    /// Cannot be a storage key, so no event can exist under it.
    const BAD_ID: &str = "no/such";

    async fn filesystem_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemEventStore::new(dir.path().join("events"))
            .await
            .unwrap();
        let state = AppState::new(
            Arc::new(store),
            Arc::new(MemoryDispatcher::new()),
            &EventConfig { timeout_secs: 3600 },
        );
        (state, dir)
    }

    fn embedding_result() -> EmbeddingResult {
        EmbeddingResult {
            inference_id: "inf".into(),
            event_id: BAD_ID.into(),
            embedded_file_location: "e".into(),
            segmentation_file_location: "s".into(),
            errored: false,
        }
    }

    fn blending_result() -> BlendingResult {
        BlendingResult {
            inference_id: "inf".into(),
            event_id: BAD_ID.into(),
            result_img_location: "x.png".into(),
            errored: false,
        }
    }

    #[tokio::test]
    async fn client_calls_report_not_found() {
        let (state, _dir) = filesystem_state().await;

        let err = state.events.get_results(ACCOUNT, BAD_ID).await.unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)), "{err:?}");

        let err = state
            .events
            .set_photo(ACCOUNT, BAD_ID, picture())
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)), "{err:?}");

        let err = state
            .events
            .set_hairstyles(ACCOUNT, BAD_ID, hairstyles(&[1]))
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)), "{err:?}");

        let err = state.events.status(ACCOUNT, BAD_ID).await.unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn worker_results_report_not_found() {
        let (state, _dir) = filesystem_state().await;

        let err = state
            .orchestrator
            .ingest_embedding_result(embedding_result())
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)), "{err:?}");

        let err = state
            .orchestrator
            .ingest_blending_result(blending_result())
            .await
            .unwrap_err();
        assert!(matches!(err, TryOnError::NotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn consumer_acknowledges_results() {
        let (state, _dir) = filesystem_state().await;

        handle_inference_result(
            &state.orchestrator,
            InferenceResult::Embedding(embedding_result()),
        )
        .await
        .unwrap();
        handle_inference_result(
            &state.orchestrator,
            InferenceResult::Blending(blending_result()),
        )
        .await
        .unwrap();
    }
}
