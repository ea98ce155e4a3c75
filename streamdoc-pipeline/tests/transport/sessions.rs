use crate::common::{
    done_frame, error_frame, finish_frame, frame, frames_of, kinds, markdown_texts, REPORT,
};
use proptest::prelude::*;
use streamdoc_pipeline::{
    build_document, ErrorKind, PipelineError, PipelineOptions, Stage, StreamSession,
};

#[test]
fn test_deltas_accumulate() {
    let mut session = StreamSession::default();
    let epoch = session.begin();
    session.receive(epoch, &frame("Hello"));
    let doc = session.receive(epoch, &frame(", world")).expect("snapshot");
    assert_eq!(markdown_texts(&doc), vec!["Hello, world"]);
    assert!(!doc.finished);
}

#[test]
fn test_late_chunks_of_a_cancelled_request_are_ignored() {
    let mut session = StreamSession::default();
    let old = session.begin();
    session.receive(old, &frame("Old answer"));

    let new = session.begin();
    assert_ne!(old, new);
    assert!(session.text().is_empty());

    assert!(session.receive(old, &frame(" late")).is_none());
    assert!(session.complete(old).is_none());
    assert!(session
        .fail(old, PipelineError::transport("aborted"))
        .is_none());

    let doc = session.receive(new, &frame("New answer")).expect("snapshot");
    assert_eq!(markdown_texts(&doc), vec!["New answer"]);
    assert!(doc.errors.is_empty());
    assert!(!doc.finished);
}

#[test]
fn test_begin_discards_a_pending_frame() {
    let mut session = StreamSession::default();
    let old = session.begin();
    let bytes = frame("never finished");
    session.receive(old, &bytes[..bytes.len() / 2]);

    let new = session.begin();
    let doc = session.receive(new, &frame("fresh")).expect("snapshot");
    assert_eq!(markdown_texts(&doc), vec!["fresh"]);
    assert!(doc.errors.is_empty());
}

#[test]
fn test_transport_error_finishes_with_the_text_so_far() {
    let mut session = StreamSession::default();
    let epoch = session.begin();
    session.receive(epoch, &frame("Partial answer\n<ai-question>Which"));

    let doc = session
        .fail(epoch, PipelineError::transport("connection reset"))
        .expect("final snapshot");
    assert!(doc.finished);
    assert_eq!(markdown_texts(&doc), vec!["Partial answer"]);
    assert_eq!(doc.errors, vec![PipelineError::transport("connection reset")]);

    assert!(session.is_finished());
    assert!(session.receive(epoch, &frame("more")).is_none());
}

#[test]
fn test_remote_error_finishes_the_stream() {
    let mut session = StreamSession::default();
    let epoch = session.begin();
    let mut bytes = frame("Some text");
    bytes.extend(error_frame(429, "RESOURCE_EXHAUSTED", "quota exceeded"));
    bytes.extend(frame("ignored"));

    let doc = session.receive(epoch, &bytes).expect("snapshot");
    assert!(doc.finished);
    assert_eq!(markdown_texts(&doc), vec!["Some text"]);
    assert_eq!(doc.errors.len(), 1);
    assert_eq!(doc.errors[0].stage, Stage::Transport);
    assert_eq!(
        doc.errors[0].kind,
        ErrorKind::Remote {
            code: 429,
            status: "RESOURCE_EXHAUSTED".to_string(),
            message: "quota exceeded".to_string(),
        }
    );
}

#[test]
fn test_malformed_frame_is_skipped() {
    let mut session = StreamSession::default();
    let epoch = session.begin();
    let mut bytes = b"data: {not json\n\n".to_vec();
    bytes.extend(frame("still here"));

    let doc = session.receive(epoch, &bytes).expect("snapshot");
    assert!(!doc.finished);
    assert_eq!(markdown_texts(&doc), vec!["still here"]);
    assert_eq!(doc.errors.len(), 1);
    assert_eq!(doc.errors[0].stage, Stage::Frame);
    assert!(matches!(doc.errors[0].kind, ErrorKind::FrameJson { .. }));
}

#[test]
fn test_session_errors_come_before_build_errors() {
    let mut session = StreamSession::default();
    let epoch = session.begin();
    let mut bytes = frame("<ai-viz name=\"PIE\">{}</ai-viz>");
    bytes.extend(b"data: nope\n\n");

    let doc = session.receive(epoch, &bytes).expect("snapshot");
    let stages: Vec<_> = doc.errors.iter().map(|e| e.stage).collect();
    assert_eq!(stages, vec![Stage::Frame, Stage::Widget]);
}

#[test]
fn test_abnormal_finish_reason_keeps_the_text() {
    let mut session = StreamSession::default();
    let epoch = session.begin();
    session.receive(epoch, &frame("Cut off "));
    let doc = session
        .receive(epoch, &finish_frame("mid sentence", "MAX_TOKENS"))
        .expect("snapshot");
    assert_eq!(markdown_texts(&doc), vec!["Cut off mid sentence"]);
    assert!(doc.errors.is_empty());

    let doc = session.complete(epoch).expect("final snapshot");
    assert!(doc.finished);
}

#[test]
fn test_done_sentinel_produces_the_final_document() {
    let mut session = StreamSession::default();
    let epoch = session.begin();
    let mut bytes = frames_of(REPORT, 7);
    bytes.extend(done_frame());

    let doc = session.receive(epoch, &bytes).expect("snapshot");
    assert!(doc.finished);
    assert_eq!(
        kinds(&doc),
        vec!["markdown-text", "markdown-table", "container", "question-group"]
    );
    assert_eq!(doc, build_document(REPORT, &PipelineOptions::default()));
}

#[test]
fn test_close_flushes_an_unterminated_last_frame() {
    let mut session = StreamSession::default();
    let epoch = session.begin();
    let mut bytes = frame("First ");
    let last = frame("and last");
    bytes.extend_from_slice(&last[..last.len() - 2]);

    let doc = session.receive(epoch, &bytes).expect("snapshot");
    assert_eq!(markdown_texts(&doc), vec!["First "]);

    let doc = session.complete(epoch).expect("final snapshot");
    assert!(doc.finished);
    assert_eq!(markdown_texts(&doc), vec!["First and last"]);
}

#[test]
fn test_multibyte_text_split_across_chunks() {
    let mut session = StreamSession::default();
    let epoch = session.begin();
    let bytes = frame("Prévisions à la hausse");
    let split = bytes
        .iter()
        .position(|b| *b >= 0x80)
        .expect("non-ascii byte")
        + 1;

    assert!(session.receive(epoch, &bytes[..split]).is_none());
    let doc = session.receive(epoch, &bytes[split..]).expect("snapshot");
    assert_eq!(markdown_texts(&doc), vec!["Prévisions à la hausse"]);
    assert!(doc.errors.is_empty());
}

proptest! {
    #[test]
    fn test_chunk_boundaries_do_not_matter(
        chars_per_delta in 1usize..40,
        cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..12),
    ) {
        let bytes = frames_of(REPORT, chars_per_delta);
        let mut cuts: Vec<usize> = cuts.iter().map(|index| index.index(bytes.len())).collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut session = StreamSession::default();
        let epoch = session.begin();
        let mut start = 0;
        for cut in cuts.into_iter().chain(std::iter::once(bytes.len())) {
            session.ingest(epoch, &bytes[start..cut]);
            start = cut;
        }
        let doc = session.complete(epoch).expect("final snapshot");
        prop_assert_eq!(doc, build_document(REPORT, &PipelineOptions::default()));
    }
}
