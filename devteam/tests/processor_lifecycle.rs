//! Lifecycle tests for full processor runs.
//!
//! These tests drive `SequentialRequirementProcessor::run` over scripted
//! collaborators and check counters, artifact names, ordering, shared
//! conversation history, and failure propagation.

use devteam::core::queue::RequirementQueue;
use devteam::core::types::{Counters, GenerationStep, Phase};
use devteam::errors::{GenerationFailure, InvalidInputError, PersistenceFailure};
use devteam::io::requirements::default_requirements;
use devteam::team::{ProcessorEvent, ProcessorOptions, SequentialRequirementProcessor};
use devteam::test_support::{RecordingWriter, ScriptedGenerator};
use serde_json::json;

fn expected_names(n: u32) -> Vec<String> {
    (1..=n)
        .flat_map(|i| [format!("app_code_{i}"), format!("test_code_{i}")])
        .collect()
}

/// Single requirement: one artifact pair, both counters at 1, terminated.
#[test]
fn single_requirement_produces_one_pair() {
    let generator = ScriptedGenerator::echo();
    let writer = RecordingWriter::default();
    let mut processor = SequentialRequirementProcessor::new(
        RequirementQueue::new(["Create endpoint /hello returning 'Hello, World!'"]),
        &generator,
        &writer,
        ProcessorOptions::default(),
    )
    .expect("processor");

    let summary = processor.run(|_| {}).expect("run");

    assert_eq!(processor.phase(), Phase::Terminated);
    assert_eq!(
        summary.counters,
        Counters {
            story_count: 1,
            testing_rounds: 1
        }
    );
    assert_eq!(writer.names(), expected_names(1));
    assert_eq!(summary.stories.len(), 1);
    assert_eq!(summary.stories[0].app_code, "app_code_1");
}

/// Empty input: no artifacts, "no requirements" reported, immediate termination.
#[test]
fn empty_input_reports_no_requirements() {
    let generator = ScriptedGenerator::echo();
    let writer = RecordingWriter::default();
    let mut processor = SequentialRequirementProcessor::from_value(
        &json!([]),
        &generator,
        &writer,
        ProcessorOptions::default(),
    )
    .expect("processor");

    let mut lines = Vec::new();
    let summary = processor.run(|event| lines.push(event.to_string())).expect("run");

    assert_eq!(lines, vec!["No requirements to process.", "Processing complete."]);
    assert_eq!(summary.counters, Counters::default());
    assert_eq!(processor.phase(), Phase::Terminated);
    assert!(generator.calls().is_empty());
    assert!(writer.writes().is_empty());
}

/// Built-in three requirements: six artifacts, strictly in list order.
#[test]
fn three_requirements_processed_in_order() {
    let generator = ScriptedGenerator::echo();
    let writer = RecordingWriter::default();
    let mut processor = SequentialRequirementProcessor::new(
        default_requirements(),
        &generator,
        &writer,
        ProcessorOptions::default(),
    )
    .expect("processor");

    let mut started = Vec::new();
    let summary = processor
        .run(|event| {
            if let ProcessorEvent::StoryStarted { story, requirement } = event {
                started.push((*story, requirement.clone()));
            }
        })
        .expect("run");

    assert_eq!(summary.counters.story_count, 3);
    assert_eq!(summary.counters.testing_rounds, 3);
    assert_eq!(writer.names(), expected_names(3));
    let stories: Vec<u32> = started.iter().map(|(story, _)| *story).collect();
    assert_eq!(stories, vec![1, 2, 3]);
    assert!(started[0].1.contains("/hello"));
    assert!(started[1].1.contains("/goodbye"));
    assert!(started[2].1.contains("undefined routes"));

    // Code generation uses the raw requirement text, tests use the generated code.
    let calls = generator.calls();
    assert_eq!(calls.len(), 6);
    assert!(calls[0].prompt.contains("/hello"));
    assert_eq!(calls[0].step, GenerationStep::AppCode);
    assert_eq!(calls[1].step, GenerationStep::TestCode);
    assert!(calls[1].prompt.contains("echo[app_code#1]"));
    assert!(calls.iter().all(|c| c.step != GenerationStep::Requirements));
}

/// Code-generation failure on item two: only the first pair exists and the error propagates.
#[test]
fn generation_failure_on_second_item_stops_the_run() {
    let generator = ScriptedGenerator::echo().failing_at(GenerationStep::AppCode, 2);
    let writer = RecordingWriter::default();
    let mut processor = SequentialRequirementProcessor::new(
        default_requirements(),
        &generator,
        &writer,
        ProcessorOptions::default(),
    )
    .expect("processor");

    let err = processor.run(|_| {}).unwrap_err();

    let failure = err
        .downcast_ref::<GenerationFailure>()
        .expect("generation failure");
    assert_eq!(failure.step, GenerationStep::AppCode);
    assert_eq!(failure.story, 2);
    assert_eq!(writer.names(), expected_names(1));
    assert_eq!(
        processor.counters(),
        Counters {
            story_count: 2,
            testing_rounds: 1
        }
    );
    assert_ne!(processor.phase(), Phase::Terminated);
    assert_eq!(processor.remaining(), 1);
}

/// Persistence failure is not caught: no test generation happens for that item.
#[test]
fn persistence_failure_propagates() {
    let generator = ScriptedGenerator::echo();
    let writer = RecordingWriter::failing_on("app_code_1");
    let mut processor = SequentialRequirementProcessor::new(
        RequirementQueue::new(["a", "b"]),
        &generator,
        &writer,
        ProcessorOptions::default(),
    )
    .expect("processor");

    let err = processor.run(|_| {}).unwrap_err();

    assert!(err.downcast_ref::<PersistenceFailure>().is_some());
    assert_eq!(generator.calls().len(), 1);
    assert!(writer.writes().is_empty());
    assert_eq!(processor.counters().testing_rounds, 0);
}

/// Non-sequence inputs fail before any collaborator call.
#[test]
fn non_sequence_inputs_are_rejected() {
    for value in [json!("Create endpoint /hello"), json!({"a": "b"}), json!(42)] {
        let generator = ScriptedGenerator::echo();
        let writer = RecordingWriter::default();
        let result = SequentialRequirementProcessor::from_value(
            &value,
            &generator,
            &writer,
            ProcessorOptions::default(),
        );
        let err = result.err().expect("invalid input");
        assert!(
            err.downcast_ref::<InvalidInputError>().is_some(),
            "{value} should be invalid input"
        );
        assert!(generator.calls().is_empty());
        assert!(writer.writes().is_empty());
    }
}

/// Every generation call sees the whole history of the run, not only its own item.
#[test]
fn history_grows_across_items() {
    let generator = ScriptedGenerator::echo();
    let writer = RecordingWriter::default();
    let mut processor = SequentialRequirementProcessor::new(
        RequirementQueue::new(["a", "b", "c"]),
        &generator,
        &writer,
        ProcessorOptions::default(),
    )
    .expect("processor");

    processor.run(|_| {}).expect("run");

    let history: Vec<usize> = generator.calls().iter().map(|c| c.history_len).collect();
    assert_eq!(history, vec![0, 2, 4, 6, 8, 10]);
    assert_eq!(processor.memory().len(), 12);
    // Item three's output differs from item one's only because of accumulated history.
    assert_eq!(
        writer.contents("app_code_3").as_deref(),
        Some("echo[app_code#3] after 8 turns")
    );
}

/// Counters stay consistent for any queue length.
#[test]
fn counters_match_queue_length() {
    for n in 0..=5u32 {
        let generator = ScriptedGenerator::echo();
        let writer = RecordingWriter::default();
        let items: Vec<String> = (0..n).map(|i| format!("requirement {i}")).collect();
        let mut processor = SequentialRequirementProcessor::new(
            RequirementQueue::new(items),
            &generator,
            &writer,
            ProcessorOptions::default(),
        )
        .expect("processor");

        let summary = processor.run(|_| {}).expect("run");

        assert_eq!(summary.counters.story_count, n);
        assert_eq!(summary.counters.testing_rounds, n);
        assert_eq!(writer.names(), expected_names(n));
    }
}
