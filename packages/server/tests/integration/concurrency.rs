use std::sync::Arc;

use ::common::InferenceKind;

use tryon_server::TryOnError;

use crate::common::{ACCOUNT, TestApp, hairstyles, picture};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_triggers_dispatch_blending_once() {
    let app = Arc::new(TestApp::spawn());
    let event_id = app.create_event().await;
    app.manager
        .set_photo(ACCOUNT, &event_id, picture())
        .await
        .unwrap();
    app.manager
        .set_hairstyles(ACCOUNT, &event_id, hairstyles(&[1, 2, 3]))
        .await
        .unwrap();
    let result = app.embedding_result(&app.event(&event_id).await);

    let mut tasks = Vec::new();
    for i in 0..16 {
        let app = Arc::clone(&app);
        let event_id = event_id.clone();
        let result = result.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                match app.orchestrator.ingest_embedding_result(result).await {
                    Ok(()) | Err(TryOnError::AlreadyExists(_)) => {}
                    Err(e) => panic!("unexpected ingest error: {e}"),
                }
            } else {
                match app.orchestrator.start_blending(&event_id).await {
                    Ok(())
                    | Err(TryOnError::AlreadyExists(_))
                    | Err(TryOnError::EmbeddingNotFinished) => {}
                    Err(e) => panic!("unexpected blending error: {e}"),
                }
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(
        app.dispatcher.jobs_of(InferenceKind::Blending).await.len(),
        3
    );
    let event = app.event(&event_id).await;
    assert_eq!(event.blendings.len(), 3);
    assert!(app.orchestrator.locks().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_blending_results_all_land() {
    let app = Arc::new(TestApp::spawn());
    let event_id = app.create_event().await;
    app.manager
        .set_photo(ACCOUNT, &event_id, picture())
        .await
        .unwrap();
    app.manager
        .set_hairstyles(ACCOUNT, &event_id, hairstyles(&[1, 2, 3, 4, 5, 6]))
        .await
        .unwrap();
    app.finish_embedding(&event_id).await;

    let mut tasks = Vec::new();
    for result in app.blending_results(&event_id).await {
        let app = Arc::clone(&app);
        tasks.push(tokio::spawn(async move {
            app.orchestrator.ingest_blending_result(result).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let event = app.event(&event_id).await;
    assert!(event.blendings.iter().all(|b| b.inference.is_finished()));
    assert!(event.finished_at.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_photo_uploads_keep_one() {
    let app = Arc::new(TestApp::spawn());
    let event_id = app.create_event().await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let app = Arc::clone(&app);
        let event_id = event_id.clone();
        tasks.push(tokio::spawn(async move {
            let mut upload = picture();
            upload.file_location = format!("p{i}");
            app.manager.set_photo(ACCOUNT, &event_id, upload).await
        }));
    }

    let mut accepted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => accepted += 1,
            Err(TryOnError::AlreadyExists(_)) => {}
            Err(e) => panic!("unexpected upload error: {e}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(
        app.dispatcher.jobs_of(InferenceKind::Embedding).await.len(),
        1
    );
}
