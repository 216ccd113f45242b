//! Workflow commands - submit, approve, reject

pub mod approve;
pub mod reject;
pub mod submit;

use miette::{IntoDiagnostic, Result};
use std::io::{self, BufRead};

/// Expand the id arguments, reading from stdin when "-" is given
pub(crate) fn collect_ids(ids: &[String]) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for id in ids {
        if id == "-" {
            for line in io::stdin().lock().lines() {
                let line = line.into_diagnostic()?;
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
        } else {
            out.push(id.clone());
        }
    }
    Ok(out)
}
