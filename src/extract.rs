//! Entry isolation and pruned bibliography assembly.
//!
//! An entry is the span from its `@type{key,` header to the brace that
//! balances the header's opening brace. Fields are never parsed; nested
//! braces inside values are simply counted.

use std::collections::BTreeSet;
use std::ops::Range;

use regex::Regex;
use thiserror::Error;

use crate::usage::UsageRecord;

/// Errors that can occur while extracting used entries.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Citation key '{0}' is marked as used but its entry header is missing from the bibliography text")]
    EntryNotFound(String),

    #[error("Invalid entry header pattern for key '{key}': {source}")]
    Pattern {
        key: String,
        #[source]
        source: regex::Error,
    },
}

/// Returns the byte range of the brace-balanced entry starting at `start`.
///
/// The walk counts `{` and `}` from `start` and stops right after the brace
/// that brings the depth back to zero once the first `{` has been seen.
/// Escaped braces and braces inside quoted values are counted like any other.
/// If the braces never balance, the range runs to the end of `text`.
///
/// `start` must be on a character boundary of `text`.
///
/// # Examples
///
/// ```
/// use bib_prune::isolate_entry;
///
/// let bib = "@article{k1, title={A {B} C}, year=2020}@book{k2, title={D}}";
/// let span = isolate_entry(bib, 0);
/// assert_eq!(&bib[span], "@article{k1, title={A {B} C}, year=2020}");
/// ```
pub fn isolate_entry(text: &str, start: usize) -> Range<usize> {
    scan_entry(text, start).0
}

/// Brace walk behind [`isolate_entry`]. The flag is false when the text
/// ran out before the entry closed.
fn scan_entry(text: &str, start: usize) -> (Range<usize>, bool) {
    let start = start.min(text.len());
    let mut depth: i64 = 0;
    let mut opened = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => {
                depth += 1;
                opened = true;
            }
            b'}' => depth -= 1,
            _ => continue,
        }

        if opened && depth <= 0 {
            return (start..start + offset + 1, true);
        }
    }

    (start..text.len(), false)
}

/// Collects every `@string{` macro line of `text`, in source order.
///
/// Lines keep their original indentation and terminator. A final line
/// without a terminator gets `\n` so whatever follows starts on a new line.
/// The match is case-sensitive: `@String{` lines are not kept.
pub fn string_macro_lines(text: &str) -> String {
    let mut macros = String::new();

    for line in text.split_inclusive('\n') {
        if line.trim().starts_with("@string{") {
            macros.push_str(line);
            if !line.ends_with('\n') {
                macros.push('\n');
            }
        }
    }

    macros
}

/// Finds the offset of the first `@type{key,` header for `key` in `text`.
pub fn find_entry_header(text: &str, key: &str) -> Result<Option<usize>, ExtractError> {
    let header = Regex::new(&format!(r"@\w*\{{{},", regex::escape(key))).map_err(|source| {
        ExtractError::Pattern {
            key: key.to_string(),
            source,
        }
    })?;

    Ok(header.find(text).map(|m| m.start()))
}

/// Builds the pruned bibliography: all `@string{` lines, then the entry of
/// every used key in `keys` order, each followed by a blank line.
///
/// When the same key has several entries (e.g. in two concatenated files),
/// only the first one is extracted.
///
/// # Errors
///
/// Returns [`ExtractError::EntryNotFound`] if a used key has no header in
/// `text`. Keys produced by [`crate::collect_keys`] over the same text
/// always have one.
pub fn extract_entries(
    text: &str,
    keys: &BTreeSet<String>,
    usage: &UsageRecord,
) -> Result<String, ExtractError> {
    let mut output = string_macro_lines(text);

    for key in keys {
        if !usage.get(key).copied().unwrap_or(false) {
            continue;
        }

        let start = find_entry_header(text, key)?
            .ok_or_else(|| ExtractError::EntryNotFound(key.clone()))?;
        let (span, closed) = scan_entry(text, start);
        if !closed {
            log::warn!(
                "entry '{}' has unbalanced braces, copying everything up to the end of the bibliography",
                key
            );
        }

        output.push_str(&text[span]);
        output.push_str("\n\n");
    }

    Ok(output)
}
