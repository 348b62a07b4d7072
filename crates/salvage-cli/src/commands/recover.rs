//! Recover command implementation.

use super::ExitStatus;
use crate::cli::RecoverArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use salvage_recovery::{ArrayRecoverer, Recovery, RecoveryError};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Execute the recover command.
///
/// Records go to stdout as JSON; the strategy report goes to stderr so the
/// output can be piped.
pub fn execute_recover(args: RecoverArgs, formatter: &Formatter) -> Result<ExitStatus> {
    let text = match args.file.as_deref() {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).map_err(CliError::file(path))?
        }
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    match recover_text(&text, args.compact) {
        Ok((recovery, json)) => {
            println!("{}", json);
            eprintln!("{}", formatter.success(&summary(&recovery)));
            Ok(ExitStatus::Success)
        }
        Err(RecoveryOutcome::Failed(e)) => {
            eprintln!("{}", formatter.error(&e.to_string()));
            Ok(ExitStatus::Incomplete)
        }
        Err(RecoveryOutcome::Json(e)) => Err(e.into()),
    }
}

enum RecoveryOutcome {
    Failed(RecoveryError),
    Json(serde_json::Error),
}

/// Recover records from `text` and render them as a JSON array.
fn recover_text(
    text: &str,
    compact: bool,
) -> std::result::Result<(Recovery, String), RecoveryOutcome> {
    let recovery = ArrayRecoverer::new()
        .recover(text)
        .map_err(RecoveryOutcome::Failed)?;

    let records = Value::Array(recovery.records.iter().cloned().map(Value::Object).collect());
    let json = if compact {
        serde_json::to_string(&records)
    } else {
        serde_json::to_string_pretty(&records)
    }
    .map_err(RecoveryOutcome::Json)?;

    Ok((recovery, json))
}

fn summary(recovery: &Recovery) -> String {
    let mut summary = format!(
        "Recovered {} record(s) via {}",
        recovery.records.len(),
        recovery.strategy
    );
    if let Some(stage) = recovery.stage {
        summary.push_str(&format!(" after {} repair", stage));
    }
    if recovery.fence_unwrapped {
        summary.push_str(" (code fence unwrapped)");
    }
    summary
}
