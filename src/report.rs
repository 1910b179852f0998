//! Boundary rendering of a [`TransferReport`].
//!
//! Success goes to `out`, failures to `err`. Nothing here touches the
//! network or the process; `main.rs` passes stdout/stderr and turns
//! [`TransferReport::exit_code`] into the process exit status.

use std::io::{self, Write};

use crate::blockchain::{ClassifiedError, SubmissionResult};
use crate::pipeline::TransferReport;

/// Write the human-readable outcome of a run.
pub fn render<O: Write, E: Write>(report: &TransferReport, out: &mut O, err: &mut E) -> io::Result<()> {
    match &report.result {
        SubmissionResult::Success { signature } => {
            if let Some(payer) = report.payer {
                writeln!(out, "Payer public key: {}", payer)?;
            }
            if let Some(request) = report.request {
                writeln!(
                    out,
                    "Sent {} lamports to {}",
                    request.lamports, request.to
                )?;
            }
            writeln!(out, "Success! Transaction signature: {}", signature)?;
            if let Some(url) = &report.explorer_url {
                writeln!(out, "View on explorer: {}", url)?;
            }
        }
        SubmissionResult::Failure(classified) => {
            if let Some(payer) = report.payer {
                writeln!(err, "Payer public key: {}", payer)?;
            }
            render_failure(classified, err)?;
        }
    }
    Ok(())
}

/// Write a classified failure and its hint.
pub fn render_failure<E: Write>(classified: &ClassifiedError, err: &mut E) -> io::Result<()> {
    writeln!(
        err,
        "Failed to send transaction [{}]: {}",
        classified.category, classified.message
    )?;
    if let Some(hint) = &classified.hint {
        writeln!(err, "Tip: {}", hint)?;
    }
    Ok(())
}
