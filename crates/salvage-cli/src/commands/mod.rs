//! Command implementations.

pub mod extract;
pub mod recover;
pub mod retry;
pub mod status;

pub use self::extract::execute_extract;
pub use self::recover::execute_recover;
pub use self::retry::execute_retry;
pub use self::status::execute_status;

use crate::error::{CliError, Result};
use crate::files::read_json;
use salvage_extractor::PageSet;
use std::path::Path;

/// How a command finished, as seen by a driving shell loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Nothing left to do
    Success,
    /// More work remains, or the input could not be recovered
    Incomplete,
}

impl ExitStatus {
    /// Process exit code: 0 or 1. Fatal errors exit with 2.
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Incomplete => 1,
        }
    }
}

/// Load the input pages.
pub fn load_pages(path: &Path) -> Result<PageSet> {
    read_json(path)?.ok_or_else(|| {
        CliError::InvalidInput(format!("Input file {} does not exist", path.display()))
    })
}
