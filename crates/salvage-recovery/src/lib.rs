//! Salvage Recovery
//!
//! Reconstructs arrays of subject-predicate-object records from raw, often
//! malformed, language-model output.
//!
//! # Overview
//!
//! Model responses are adversarial in practice: truncated arrays, missing
//! commas, prose around the JSON, several arrays glued together, raw control
//! characters inside strings. This crate turns such text into records without
//! ever surfacing a parse error, degrading through a fixed cascade of
//! strategies instead.
//!
//! # Architecture
//!
//! ```text
//! Raw text → fence unwrap → Strategy cascade → Vec<Record>
//!                               │
//!                               └─ Structural repairer (ordered repair stages)
//! ```
//!
//! - [`repair`]: the Structural Repairer, five cumulative textual repair stages
//! - [`ArrayRecoverer`]: locates array content and runs the [`Strategy`] cascade
//! - [`scanner`]: string-literal-aware bracket and brace matching shared by both
//! - [`RecoveryObserver`]: injectable diagnostic hook, `tracing` by default
//!
//! Everything here is synchronous and pure. Concurrent calls share no state.
//!
//! # Example
//!
//! ```
//! use salvage_recovery::{recover_records, RecoveryError};
//!
//! let response = r#"Sure! Here are the facts:
//! [{"subject": "aspirin", "predicate": "treats", "object": "headache"}
//!  {"subject": "aspirin", "predicate": "is a", "object": "NSAID"},]"#;
//!
//! let records = recover_records(response).unwrap();
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1]["object"], "NSAID");
//!
//! assert_eq!(
//!     recover_records("Sorry, I cannot help with that."),
//!     Err(RecoveryError::NoJsonFound)
//! );
//! ```

#![warn(missing_docs)]

mod error;
mod observer;
mod recover;
mod repair;
pub mod scanner;

pub use error::RecoveryError;
pub use observer::{NoopObserver, RecoveryEvent, RecoveryObserver, TracingObserver};
pub use recover::{
    recover_records, unwrap_code_fence, ArrayRecoverer, Attempt, Located, Record, Recovery,
    Strategy,
};
pub use repair::{repair, repair_json, RepairStage, Repaired};
