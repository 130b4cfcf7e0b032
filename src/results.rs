// src/results.rs

//! Reader for experiment result logs.
//!
//! A results log has one line per experiment; a line mentioning `PASS`
//! counts as a pass, anything else as a failure. No log yet simply means no
//! results.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentResult {
    pub pass: bool,
    /// The raw log line.
    pub note: String,
}

impl ExperimentResult {
    pub fn from_line(line: &str) -> Self {
        Self {
            pass: line.contains("PASS"),
            note: line.to_string(),
        }
    }
}

/// Pass / fail totals over a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// Load every result recorded in `path`.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<ExperimentResult>> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading results");

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no results file");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("opening results file {:?}", path))
                .into());
        }
    };

    let mut results = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("reading results file {:?}", path))?;
        results.push(ExperimentResult::from_line(&line));
    }
    Ok(results)
}

pub fn summarize(results: &[ExperimentResult]) -> Summary {
    results.iter().fold(Summary::default(), |mut acc, r| {
        if r.pass {
            acc.passed += 1;
        } else {
            acc.failed += 1;
        }
        acc
    })
}
