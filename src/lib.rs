//! bib-prune: shrink BibTeX databases to the entries a manuscript cites.
//!
//! This library provides functionality to:
//! - Collect citation keys from one or more BibTeX sources
//! - Detect which keys are cited by LaTeX (`\cite{...}`) or Markdown (`@key`) sources
//! - Isolate the cited entries by brace matching and assemble a pruned bibliography

pub mod bibtex;
pub mod extract;
pub mod pipeline;
pub mod sources;
pub mod usage;

pub use bibtex::{collect_keys, KeyCollection};
pub use extract::{extract_entries, isolate_entry, string_macro_lines, ExtractError};
pub use pipeline::{prune, PruneError, PruneOutcome, UsageReport};
pub use sources::{read_bibliographies, read_manuscripts, write_output, SourceError};
pub use usage::{detect_usage, Manuscript, ManuscriptFormat, UsageError, UsageRecord};
