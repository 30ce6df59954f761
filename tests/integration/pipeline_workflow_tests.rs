/*!
 * End-to-end pipeline runs against the mock provider.
 *
 * Every run goes through segmentation, the retrying invoker and the state
 * machine exactly as the command line does, with only the transport replaced.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use contextual_translator::errors::{ConfigurationError, PipelineError, ProviderError};
use contextual_translator::providers::PromptKind;
use contextual_translator::providers::mock::MockProvider;
use contextual_translator::translation::export;
use contextual_translator::translation::pipeline::{
    CallbackObserver, PipelineEvent, RunOutcome, SegmentStatus,
};
use contextual_translator::translation::SegmentationStrategy;
use tokio::sync::mpsc;

use crate::common::{self, SAMPLE_ESSAY, SAMPLE_POEM};

#[tokio::test]
async fn test_run_paragraphs_shouldTranslateEverySegmentInOrder() {
    common::init_logging();
    let provider = MockProvider::working();
    let (mut orchestrator, _sleeper) = common::orchestrator_with(&provider);

    let run = orchestrator
        .run(SAMPLE_ESSAY, &common::run_config(SegmentationStrategy::Paragraphs))
        .await
        .unwrap();

    assert_eq!(run.outcome, Some(RunOutcome::Completed));
    assert_eq!(run.segments.len(), 3);
    for (ordinal, segment) in run.segments.iter().enumerate() {
        assert_eq!(segment.ordinal, ordinal);
        assert_eq!(segment.status, SegmentStatus::Completed);
        assert_eq!(
            segment.translated.as_deref(),
            Some(format!("[TRANSLATED] {}", segment.original).as_str())
        );
        assert!(segment.back_translated.as_deref().unwrap().starts_with("[BACK] [TRANSLATED]"));
        assert!(segment.evaluation.is_none());
    }
    assert_eq!(
        run.accumulated_translation,
        "[TRANSLATED] The river rose overnight.\n[TRANSLATED] By morning the bridge was gone.\n[TRANSLATED] Nobody in the village was surprised."
    );
    assert_eq!(provider.call_count(), 6);
}

#[tokio::test]
async fn test_run_shouldUseVerificationModelForChecks() {
    let provider = MockProvider::working();
    let (mut orchestrator, _sleeper) = common::orchestrator_with(&provider);
    let config = common::run_config(SegmentationStrategy::Lines).with_evaluation(true);

    orchestrator.run(SAMPLE_POEM, &config).await.unwrap();

    assert!(provider.requests_of(PromptKind::Translate).iter().all(|r| r.model == "translate-model"));
    assert!(provider.requests_of(PromptKind::BackTranslate).iter().all(|r| r.model == "verify-model"));
    assert_eq!(provider.requests_of(PromptKind::Evaluate).len(), 2);
    assert!(provider.requests_of(PromptKind::Evaluate).iter().all(|r| r.model == "verify-model"));
}

#[tokio::test]
async fn test_run_rateLimitedProvider_shouldBackOffThenSucceed() {
    let provider = MockProvider::rate_limited(2);
    let (mut orchestrator, sleeper) = common::orchestrator_with(&provider);

    let run = orchestrator
        .run(SAMPLE_POEM, &common::run_config(SegmentationStrategy::Lines))
        .await
        .unwrap();

    assert_eq!(run.summary().completed, 2);
    assert_eq!(sleeper.waits(), vec![Duration::from_millis(2000), Duration::from_millis(4000)]);
    // Two throttled attempts, then two stages for each of the two lines
    assert_eq!(provider.call_count(), 6);
}

#[tokio::test]
async fn test_run_persistentRateLimit_shouldFailSegmentAfterThreeAttempts() {
    let provider = MockProvider::rate_limited(usize::MAX);
    let (mut orchestrator, sleeper) = common::orchestrator_with(&provider);

    let run = orchestrator
        .run(SAMPLE_POEM, &common::run_config(SegmentationStrategy::Lines))
        .await
        .unwrap();

    let summary = run.summary();
    assert_eq!(summary.failed, 2);
    assert!(run.segments[0].error.as_deref().unwrap().contains("Rate limited after 3 attempts"));
    assert_eq!(provider.call_count(), 6);
    assert_eq!(sleeper.total(), Duration::from_millis(12_000));
}

#[tokio::test]
async fn test_run_events_shouldArriveInTransitionOrder() {
    let provider = MockProvider::working();
    let (orchestrator, _sleeper) = common::orchestrator_with(&provider);
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let mut orchestrator = orchestrator.with_observer(sender);

    orchestrator
        .run(SAMPLE_POEM, &common::run_config(SegmentationStrategy::Lines))
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }

    assert!(matches!(&events[0], PipelineEvent::RunStarted { segments } if segments.len() == 2));
    assert!(matches!(
        events.last(),
        Some(PipelineEvent::RunFinished { outcome: RunOutcome::Completed, .. })
    ));

    let statuses: Vec<(usize, SegmentStatus)> = events
        .iter()
        .filter_map(|event| match event {
            PipelineEvent::SegmentTransitioned { segment, .. } => Some((segment.ordinal, segment.status)),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            (0, SegmentStatus::Translating),
            (0, SegmentStatus::Verifying),
            (0, SegmentStatus::Completed),
            (1, SegmentStatus::Translating),
            (1, SegmentStatus::Verifying),
            (1, SegmentStatus::Completed),
        ]
    );
}

#[tokio::test]
async fn test_run_cancelAfterFirstSegment_shouldLeaveRestIdle() {
    let provider = MockProvider::working();
    let (orchestrator, _sleeper) = common::orchestrator_with(&provider);
    let handle = orchestrator.cancellation_handle();
    let mut orchestrator = orchestrator.with_observer(CallbackObserver(move |event: &PipelineEvent| {
        if let PipelineEvent::SegmentTransitioned { segment, .. } = event {
            if segment.ordinal == 0 && segment.status == SegmentStatus::Completed {
                handle.cancel();
            }
        }
    }));

    let run = orchestrator
        .run(SAMPLE_ESSAY, &common::run_config(SegmentationStrategy::Paragraphs))
        .await
        .unwrap();

    assert_eq!(run.outcome, Some(RunOutcome::Cancelled));
    let summary = run.summary();
    assert_eq!((summary.completed, summary.idle), (1, 2));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_run_oneSegmentFails_shouldContinueWithTheRest() {
    let provider = MockProvider::with_responder(|request, _| {
        if request.kind == PromptKind::Translate && request.prompt.ends_with("By morning the bridge was gone.\n\"\"\"") {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "model overloaded".to_string(),
            });
        }
        Ok(MockProvider::echo(request))
    });
    let (mut orchestrator, sleeper) = common::orchestrator_with(&provider);

    let run = orchestrator
        .run(SAMPLE_ESSAY, &common::run_config(SegmentationStrategy::Paragraphs))
        .await
        .unwrap();

    let statuses: Vec<SegmentStatus> = run.segments.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![SegmentStatus::Completed, SegmentStatus::Error, SegmentStatus::Completed]
    );
    assert!(run.segments[1].error.as_deref().unwrap().contains("model overloaded"));
    assert!(run.segments[1].translated.is_none());
    // A failed segment adds nothing to the context of the next one
    assert!(!run.accumulated_translation.contains("bridge"));
    // Non-throttling failures are not retried
    assert!(sleeper.waits().is_empty());
}

#[tokio::test]
async fn test_run_secondSegment_shouldSeeFirstTranslationInPrompt() {
    let seen_history = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen_history);
    let provider = MockProvider::with_responder(move |request, _| {
        if request.kind == PromptKind::Translate && request.prompt.contains("Translation So Far:") {
            assert!(request.prompt.contains("[TRANSLATED] Quiet falls the evening snow"));
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Ok(MockProvider::echo(request))
    });
    let (mut orchestrator, _sleeper) = common::orchestrator_with(&provider);

    orchestrator
        .run(SAMPLE_POEM, &common::run_config(SegmentationStrategy::Lines))
        .await
        .unwrap();

    assert_eq!(seen_history.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_overCeilingWithoutCredential_shouldRefuseBeforeAnyRequest() {
    let provider = MockProvider::working();
    let (orchestrator, _sleeper) = common::orchestrator_with(&provider);
    let mut orchestrator = orchestrator.with_token_ceiling(200);
    let document = "A fairly ordinary sentence for the test.\n".repeat(40);

    let result = orchestrator
        .run(&document, &common::run_config(SegmentationStrategy::Lines))
        .await;

    assert!(matches!(
        result,
        Err(PipelineError::Configuration(ConfigurationError::QuotaExceeded { ceiling: 200, .. }))
    ));
    assert_eq!(provider.call_count(), 0);

    let with_key = common::run_config(SegmentationStrategy::Lines).with_credential(Some("user-key"));
    let run = orchestrator.run(&document, &with_key).await.unwrap();
    assert_eq!(run.summary().completed, 40);
    assert!(provider.requests().iter().all(|r| r.credential.as_deref() == Some("user-key")));
}

#[tokio::test]
async fn test_run_results_shouldExportToCsvAndJson() {
    let provider = MockProvider::working();
    let (mut orchestrator, _sleeper) = common::orchestrator_with(&provider);

    let run = orchestrator
        .run(SAMPLE_POEM, &common::run_config(SegmentationStrategy::Lines))
        .await
        .unwrap();

    let csv = export::segments_to_csv(&run.segments).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("ID,Original,Translated,Back Translated,Status"));
    let first = lines.next().unwrap();
    assert!(first.starts_with(&run.segments[0].id));
    assert!(first.ends_with(",completed"));

    let restored = export::segments_from_json(&export::segments_to_json(&run.segments).unwrap()).unwrap();
    assert_eq!(restored, run.segments);
}
