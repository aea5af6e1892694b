//! BibTeX key collection.
//!
//! Finds every entry header (`@type{key,`) in one or more bibliography
//! sources and merges their citation keys into one sorted set. Entries are
//! never parsed into fields: the key is whatever sits between the opening
//! brace and the first comma on the header line.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Entry header up to its first comma. Group 1 is the raw citation key.
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w*\{([^,\n]*),").expect("entry header pattern is valid"));

/// Keys and raw text gathered from every bibliography source of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyCollection {
    /// Every citation key found, sorted and deduplicated across sources.
    pub keys: BTreeSet<String>,
    /// All sources concatenated in input order, with no separator added.
    pub text: String,
}

/// Collects the citation keys of one or more BibTeX sources.
///
/// Each source is scanned on its own, so a header can never straddle two
/// files. The returned text is the plain concatenation of the sources and
/// is what [`crate::extract::extract_entries`] later searches.
///
/// # Examples
///
/// ```
/// use bib_prune::collect_keys;
///
/// let first = "@article{smith2020,\n  title={A}\n}\n";
/// let second = "@book{jones2019,\n  title={B}\n}\n@article{smith2020,\n}\n";
/// let collected = collect_keys(&[first, second]);
///
/// let keys: Vec<&str> = collected.keys.iter().map(String::as_str).collect();
/// assert_eq!(keys, ["jones2019", "smith2020"]);
/// assert_eq!(collected.text, format!("{first}{second}"));
/// ```
pub fn collect_keys<S: AsRef<str>>(sources: &[S]) -> KeyCollection {
    let mut collection = KeyCollection::default();

    for source in sources {
        let source = source.as_ref();
        collection.text.push_str(source);
        collection
            .keys
            .extend(citation_keys(source).map(str::to_string));
    }

    collection
}

/// Yields the raw citation key of every entry header in `bib`, in source order.
///
/// Keys are not trimmed: `@article{ key ,` yields `" key "`. A key that
/// contains a comma is cut at that comma.
pub fn citation_keys(bib: &str) -> impl Iterator<Item = &str> + '_ {
    HEADER_RE
        .captures_iter(bib)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
}
