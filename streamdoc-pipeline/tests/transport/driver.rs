use crate::common::{frame, frames_of, markdown_texts, REPORT};
use futures::stream;
use std::io;
use std::sync::Arc;
use streamdoc_pipeline::driver::{self, spawn};
use streamdoc_pipeline::{build_document, Document, PipelineOptions, Stage, StreamHandle};
use tokio::sync::watch;

async fn wait_finished(snapshots: &mut watch::Receiver<Arc<Document>>) -> Arc<Document> {
    let doc = snapshots
        .wait_for(|doc| doc.finished)
        .await
        .expect("driver still running");
    Arc::clone(&doc)
}

fn start() -> StreamHandle {
    let (handle, _task) = spawn(&PipelineOptions::default());
    handle
}

#[tokio::test]
async fn test_chunks_are_published() {
    let handle = start();
    let mut snapshots = handle.snapshots();

    let epoch = handle.begin();
    assert!(handle.send_chunk(epoch, frame("Hello")));
    assert!(handle.send_chunk(epoch, frame(" there")));
    assert!(handle.close(epoch, Ok(())));

    let doc = wait_finished(&mut snapshots).await;
    assert_eq!(markdown_texts(&doc), vec!["Hello there"]);
    assert_eq!(handle.latest(), doc);
}

#[tokio::test]
async fn test_queued_chunks_are_built_once() {
    let handle = start();
    let mut snapshots = handle.snapshots();

    let epoch = handle.begin();
    for delta in ["a", "b", "c"] {
        handle.send_chunk(epoch, frame(delta));
    }

    // the driver has not run yet; everything above is drained into one rebuild
    snapshots.changed().await.expect("driver still running");
    let doc = Arc::clone(&snapshots.borrow_and_update());
    assert_eq!(markdown_texts(&doc), vec!["abc"]);
    assert!(!snapshots.has_changed().expect("driver still running"));
}

#[tokio::test]
async fn test_late_chunks_of_a_cancelled_request_are_ignored() {
    let handle = start();
    let mut snapshots = handle.snapshots();

    let old = handle.begin();
    handle.send_chunk(old, frame("Old"));
    let new = handle.begin();
    assert_eq!(handle.current_epoch(), new);
    handle.send_chunk(old, frame(" late"));
    handle.close(old, Ok(()));
    handle.send_chunk(new, frame("New"));
    handle.close(new, Ok(()));

    let doc = wait_finished(&mut snapshots).await;
    assert_eq!(markdown_texts(&doc), vec!["New"]);
    assert!(doc.errors.is_empty());
}

#[tokio::test]
async fn test_pumped_stream_builds_the_whole_response() {
    let handle = start();
    let mut snapshots = handle.snapshots();

    let bytes = frames_of(REPORT, 11);
    let chunks: Vec<Result<Vec<u8>, io::Error>> =
        bytes.chunks(64).map(|chunk| Ok(chunk.to_vec())).collect();

    let epoch = handle.begin();
    handle
        .pump(epoch, stream::iter(chunks))
        .await
        .expect("pump task");

    let doc = wait_finished(&mut snapshots).await;
    assert_eq!(*doc, build_document(REPORT, &PipelineOptions::default()));
}

#[tokio::test]
async fn test_transport_failure_finishes_the_document() {
    let handle = start();
    let mut snapshots = handle.snapshots();

    let chunks = vec![
        Ok(frame("Partial")),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")),
        Ok(frame(" never seen")),
    ];
    let epoch = handle.begin();
    handle
        .pump(epoch, stream::iter(chunks))
        .await
        .expect("pump task");

    let doc = wait_finished(&mut snapshots).await;
    assert_eq!(markdown_texts(&doc), vec!["Partial"]);
    assert_eq!(doc.errors.len(), 1);
    assert_eq!(doc.errors[0].stage, Stage::Transport);
    assert!(doc.errors[0].to_string().contains("reset by peer"));
}

#[tokio::test]
async fn test_begin_aborts_the_pumped_transport() {
    let handle = start();

    let old = handle.begin();
    let transport = handle.pump(old, stream::pending::<Result<Vec<u8>, io::Error>>());
    handle.begin();

    let result = transport.await;
    assert!(result.expect_err("transport aborted").is_cancelled());
}

#[tokio::test]
async fn test_pump_for_a_stale_epoch_does_not_run() {
    let handle = start();
    let mut snapshots = handle.snapshots();

    let stale = handle.begin();
    let current = handle.begin();
    let transport = handle.pump(stale, stream::iter(vec![Ok::<_, io::Error>(frame("stale"))]));
    assert!(transport.await.expect_err("transport aborted").is_cancelled());

    handle.send_chunk(current, frame("current"));
    handle.close(current, Ok(()));
    let doc = wait_finished(&mut snapshots).await;
    assert_eq!(markdown_texts(&doc), vec!["current"]);
}

#[tokio::test]
async fn test_driver_stops_when_handles_are_dropped() {
    let (driver, handle) = driver::channel(&PipelineOptions::default());
    let task = tokio::spawn(driver.run());
    let clone = handle.clone();
    drop(handle);

    let epoch = clone.begin();
    assert!(clone.send_chunk(epoch, frame("x")));
    drop(clone);
    task.await.expect("driver task");
}
