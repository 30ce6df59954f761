/*!
 * Controller runs that read a document from disk and write results back.
 */

use std::fs;
use std::sync::Arc;

use contextual_translator::app_config::Config;
use contextual_translator::app_controller::{Controller, ProgressObserver, TranslateOptions};
use contextual_translator::providers::mock::MockProvider;
use contextual_translator::translation::SegmentationStrategy;
use contextual_translator::translation::export;
use contextual_translator::translation::pipeline::{
    PipelineEvent, PipelineObserver, RunOutcome, RunSummary, Segment, SegmentStatus,
};

use crate::common::{self, SAMPLE_ESSAY};

fn english_to_french() -> Config {
    Config {
        source_language: "en".to_string(),
        target_language: "fr".to_string(),
        ..Config::default()
    }
}

#[test]
fn test_withConfig_invalidConfig_shouldFail() {
    let config = Config {
        target_language: String::new(),
        ..Config::default()
    };
    assert!(Controller::with_config(config).is_err());
    assert!(Controller::new_for_test().is_ok());
}

#[test]
fn test_segment_shouldUseConfiguredStrategy() {
    let mut config = english_to_french();
    config.pipeline.segmentation = SegmentationStrategy::Sentences;
    let controller = Controller::with_config(config).unwrap();

    assert_eq!(controller.segment("One. Two! Three?").len(), 3);
}

#[test]
fn test_estimate_shouldReportGateDecision() {
    let mut config = english_to_french();
    config.translation.common.token_ceiling = 300;
    let controller = Controller::with_config(config).unwrap();

    let small = controller.estimate("Short.");
    assert!(small.fits_without_credential);
    assert_eq!(small.ceiling, 300);

    let large = controller.estimate(&"Paragraph of text.\n\n".repeat(50));
    assert!(!large.fits_without_credential);
    assert_eq!(large.estimate.segment_count, 50);
}

#[tokio::test]
async fn test_runWithProvider_shouldWriteJsonNextToInput() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "essay.txt", SAMPLE_ESSAY).unwrap();
    let controller = Controller::with_config(english_to_french()).unwrap();
    let provider = MockProvider::working();

    let run = controller
        .run_with_provider(
            TranslateOptions {
                input_file: input,
                ..TranslateOptions::default()
            },
            Arc::new(provider.clone()),
        )
        .await
        .unwrap();

    assert_eq!(run.summary().completed, 3);
    let output = dir.path().join("essay.fr.json");
    let saved = export::segments_from_json(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(saved, run.segments);
    assert_eq!(provider.call_count(), 6);
}

#[tokio::test]
async fn test_runWithProvider_withCsv_shouldWriteBothFiles() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "essay.txt", SAMPLE_ESSAY).unwrap();
    let json_path = dir.path().join("out/result.json");
    let csv_path = dir.path().join("out/result.csv");
    let controller = Controller::with_config(english_to_french()).unwrap();

    controller
        .run_with_provider(
            TranslateOptions {
                input_file: input,
                output_file: Some(json_path.clone()),
                csv_file: Some(csv_path.clone()),
                ..TranslateOptions::default()
            },
            Arc::new(MockProvider::working()),
        )
        .await
        .unwrap();

    assert!(json_path.exists());
    let csv = fs::read_to_string(csv_path).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains("[TRANSLATED] The river rose overnight."));
}

#[tokio::test]
async fn test_runWithProvider_existingOutput_shouldFailBeforeAnyRequest() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "essay.txt", SAMPLE_ESSAY).unwrap();
    let existing = common::create_test_file(dir.path(), "essay.fr.json", "[]").unwrap();
    let controller = Controller::with_config(english_to_french()).unwrap();
    let provider = MockProvider::working();

    let result = controller
        .run_with_provider(
            TranslateOptions {
                input_file: input.clone(),
                ..TranslateOptions::default()
            },
            Arc::new(provider.clone()),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(provider.call_count(), 0);
    assert_eq!(fs::read_to_string(&existing).unwrap(), "[]");

    controller
        .run_with_provider(
            TranslateOptions {
                input_file: input,
                force_overwrite: true,
                ..TranslateOptions::default()
            },
            Arc::new(provider.clone()),
        )
        .await
        .unwrap();
    assert_ne!(fs::read_to_string(&existing).unwrap(), "[]");
}

#[test]
fn test_runWithProvider_emptyDocument_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "blank.txt", "  \n\n ").unwrap();
    let controller = Controller::with_config(english_to_french()).unwrap();

    let result = tokio_test::block_on(async {
        controller
            .run_with_provider(
                TranslateOptions {
                    input_file: input,
                    ..TranslateOptions::default()
                },
                Arc::new(MockProvider::working()),
            )
            .await
    });

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("The document is empty"), "{}", message);
}

#[tokio::test]
async fn test_runWithProvider_providerWithoutKey_shouldNeedCredential() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "essay.txt", SAMPLE_ESSAY).unwrap();
    let controller = Controller::with_config(english_to_french()).unwrap();
    let provider = MockProvider::working().without_configured_key();

    let refused = controller
        .run_with_provider(
            TranslateOptions {
                input_file: input.clone(),
                ..TranslateOptions::default()
            },
            Arc::new(provider.clone()),
        )
        .await;
    assert!(refused.is_err());

    let run = controller
        .run_with_provider(
            TranslateOptions {
                input_file: input,
                credential: Some("user-key".to_string()),
                ..TranslateOptions::default()
            },
            Arc::new(provider),
        )
        .await
        .unwrap();
    assert_eq!(run.summary().completed, 3);
}

#[test]
fn test_progressObserver_shouldCountTerminalSegments() {
    let mut observer = ProgressObserver::new(false);
    let segments = vec![Segment::new(0, "a"), Segment::new(1, "b")];
    observer.on_event(&PipelineEvent::RunStarted {
        segments: segments.clone(),
    });

    let mut done = segments[0].clone();
    done.status = SegmentStatus::Completed;
    let mut failed = segments[1].clone();
    failed.status = SegmentStatus::Error;
    let mut working = segments[1].clone();
    working.status = SegmentStatus::Translating;

    for (segment, from) in [
        (working, SegmentStatus::Idle),
        (done, SegmentStatus::Evaluating),
        (failed, SegmentStatus::Translating),
    ] {
        observer.on_event(&PipelineEvent::SegmentTransitioned {
            segment,
            from,
            accumulated_translation: String::new(),
        });
    }
    observer.on_event(&PipelineEvent::RunFinished {
        outcome: RunOutcome::Completed,
        summary: RunSummary::default(),
    });

    assert_eq!(observer.position(), 2);
}
