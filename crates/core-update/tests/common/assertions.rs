//! Custom assertions for update tests

use core_update::{UpdateError, UpdateProgress, UpdateStage};

/// Assert that an error message contains the expected text
pub fn assert_error_contains(err: &UpdateError, expected: &str) {
    let message = err.to_string();
    assert!(
        message.contains(expected),
        "Error message '{}' does not contain '{}'",
        message,
        expected
    );
}

/// Collapse consecutive events of the same stage
pub fn stage_sequence(events: &[UpdateProgress]) -> Vec<UpdateStage> {
    let mut stages: Vec<UpdateStage> = events.iter().map(|e| e.stage).collect();
    stages.dedup();
    stages
}

/// Assert the distinct stages seen, in order
pub fn assert_stage_sequence(events: &[UpdateProgress], expected: &[UpdateStage]) {
    assert_eq!(
        stage_sequence(events),
        expected,
        "unexpected stage sequence in {:?}",
        events
    );
}

/// Assert the invariants every progress stream must satisfy
///
/// Percent stays within 0..=100 and never decreases while downloading,
/// byte counts never exceed a known total, and a terminal stage is last.
pub fn assert_progress_invariants(events: &[UpdateProgress]) {
    let mut last_percent = 0u8;

    for (i, event) in events.iter().enumerate() {
        assert!(event.percent <= 100, "percent out of range: {:?}", event);

        if event.stage == UpdateStage::Downloading {
            assert!(
                event.percent >= last_percent,
                "percent decreased at event {}: {:?}",
                i,
                events
            );
            last_percent = event.percent;

            if event.bytes_total > 0 {
                assert!(event.bytes_done <= event.bytes_total, "{:?}", event);
            }
        }

        if event.stage.is_terminal() {
            assert_eq!(i, events.len() - 1, "terminal stage is not last: {:?}", events);
        }
    }

    let failures = events
        .iter()
        .filter(|e| e.stage == UpdateStage::Failed)
        .count();
    assert!(failures <= 1, "more than one failed event: {:?}", events);
}
