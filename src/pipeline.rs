//! End-to-end pruning over in-memory sources.
//!
//! Chains key collection, usage detection and entry extraction. Nothing in
//! here touches the filesystem; see [`crate::sources`] for that.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bibtex::collect_keys;
use crate::extract::{extract_entries, ExtractError};
use crate::usage::{detect_usage, Manuscript, UsageError, UsageRecord};

/// Errors that can occur while pruning.
#[derive(Error, Debug)]
pub enum PruneError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Result of a pruning run.
#[derive(Debug, Clone, PartialEq)]
pub struct PruneOutcome {
    /// Every key found in the bibliographies, sorted.
    pub keys: BTreeSet<String>,
    /// Whether each key is cited.
    pub usage: UsageRecord,
    /// The pruned bibliography text.
    pub output: String,
}

impl PruneOutcome {
    /// Keys whose entries made it into the output, sorted.
    pub fn kept(&self) -> impl Iterator<Item = &str> {
        self.usage
            .iter()
            .filter(|(_, used)| **used)
            .map(|(key, _)| key.as_str())
    }

    /// Keys that no manuscript cites, sorted.
    pub fn dropped(&self) -> impl Iterator<Item = &str> {
        self.usage
            .iter()
            .filter(|(_, used)| !**used)
            .map(|(key, _)| key.as_str())
    }

    pub fn report(&self) -> UsageReport {
        UsageReport {
            kept: self.kept().map(str::to_string).collect(),
            dropped: self.dropped().map(str::to_string).collect(),
        }
    }
}

/// Serializable summary of which entries were kept and which were dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub kept: Vec<String>,
    pub dropped: Vec<String>,
}

/// Prunes `bibliographies` down to the entries cited by `manuscripts`.
///
/// # Examples
///
/// ```
/// use bib_prune::{prune, Manuscript};
///
/// let bib = "@article{a2020,\n  title={A}\n}\n@book{b2021,\n  title={B}\n}\n";
/// let paper = Manuscript::new("paper.tex", r"\cite{a2020}");
///
/// let outcome = prune(&[bib], &[paper]).unwrap();
/// assert_eq!(outcome.output, "@article{a2020,\n  title={A}\n}\n\n");
/// assert_eq!(outcome.dropped().collect::<Vec<_>>(), ["b2021"]);
/// ```
pub fn prune<S: AsRef<str>>(
    bibliographies: &[S],
    manuscripts: &[Manuscript],
) -> Result<PruneOutcome, PruneError> {
    let collected = collect_keys(bibliographies);
    log::debug!(
        "collected {} key(s) from {} bibliography source(s)",
        collected.keys.len(),
        bibliographies.len()
    );

    let usage = detect_usage(manuscripts, &collected.keys)?;
    let output = extract_entries(&collected.text, &collected.keys, &usage)?;

    let outcome = PruneOutcome {
        keys: collected.keys,
        usage,
        output,
    };
    log::info!(
        "keeping {} of {} entries",
        outcome.kept().count(),
        outcome.keys.len()
    );

    Ok(outcome)
}
