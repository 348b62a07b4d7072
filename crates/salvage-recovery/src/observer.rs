//! Diagnostic hook for the recovery cascade
//!
//! The recoverer reports what it is doing through a [`RecoveryObserver`]
//! instead of writing to the console. [`TracingObserver`] forwards events to
//! `tracing`; [`NoopObserver`] discards them. Any `Fn(&RecoveryEvent)` closure
//! is also an observer.

use crate::recover::Strategy;
use crate::repair::RepairStage;
use tracing::{debug, info, warn};

/// Something noteworthy that happened during recovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryEvent {
    /// The working text was narrowed to a fenced code block
    FenceUnwrapped,
    /// No `[` was found after the direct parse failed
    NoArrayStart,
    /// The first array is closed but another array follows it
    MultipleArraysDetected,
    /// The first `[` has no matching `]`
    IncompleteArray,
    /// A complete array was found but could not be repaired
    RepairFailed,
    /// Complete objects were collected for reconstruction
    ObjectsCollected {
        /// Number of complete `{...}` spans found
        objects: usize,
    },
    /// Parsed array elements that were not objects were dropped
    NonObjectsDropped {
        /// Number of elements dropped
        count: usize,
    },
    /// A strategy produced records
    Recovered {
        /// The strategy that succeeded
        strategy: Strategy,
        /// The repair stage that made the text parse, if repair was involved
        stage: Option<RepairStage>,
        /// Number of records recovered
        records: usize,
    },
    /// Every strategy failed
    Exhausted,
}

/// Receives diagnostic events from the recoverer
pub trait RecoveryObserver {
    /// Handle one event
    fn observe(&self, event: &RecoveryEvent);
}

impl<F> RecoveryObserver for F
where
    F: Fn(&RecoveryEvent),
{
    fn observe(&self, event: &RecoveryEvent) {
        self(event)
    }
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RecoveryObserver for TracingObserver {
    fn observe(&self, event: &RecoveryEvent) {
        match event {
            RecoveryEvent::FenceUnwrapped => debug!("Found JSON in code block, extracting content"),
            RecoveryEvent::NoArrayStart => debug!("No JSON array start found in text"),
            RecoveryEvent::MultipleArraysDetected => debug!("Multiple arrays detected, merging"),
            RecoveryEvent::IncompleteArray => {
                debug!("Found incomplete JSON array, attempting to extract complete objects")
            }
            RecoveryEvent::RepairFailed => {
                debug!("Found JSON-like structure but repair failed, trying object extraction")
            }
            RecoveryEvent::ObjectsCollected { objects } => {
                debug!(objects, "Collected complete objects for reconstruction")
            }
            RecoveryEvent::NonObjectsDropped { count } => {
                debug!(count, "Dropped non-object array elements")
            }
            RecoveryEvent::Recovered {
                strategy,
                stage,
                records,
            } => info!(
                strategy = %strategy,
                stage = stage.map(RepairStage::name).unwrap_or("none"),
                records,
                "Recovered records"
            ),
            RecoveryEvent::Exhausted => warn!("No complete JSON array could be extracted"),
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RecoveryObserver for NoopObserver {
    fn observe(&self, _event: &RecoveryEvent) {}
}
