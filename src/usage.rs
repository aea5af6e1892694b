//! Citation usage detection.
//!
//! Decides, for every collected key, whether any manuscript cites it.
//! Markdown sources cite with `@key`, LaTeX sources with any `\cite...{...}`
//! command whose braces contain the key.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use regex::Regex;
use thiserror::Error;

/// Errors that can occur while building citation matchers.
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("Invalid citation pattern for key '{key}': {source}")]
    Pattern {
        key: String,
        #[source]
        source: regex::Error,
    },
}

/// Citation syntax of a manuscript, decided by its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManuscriptFormat {
    /// `.tex`: `\cite{key}`, `\citep{a, key}`, `\citeauthor[p. 2]{key}`...
    Latex,
    /// `.md`: `@key` anywhere in the text
    Markdown,
    /// Any other extension. Never cites anything.
    Unsupported,
}

impl ManuscriptFormat {
    /// Infers the format from a file name. The suffix check is case-sensitive.
    pub fn from_name(name: &str) -> Self {
        if name.ends_with(".md") {
            ManuscriptFormat::Markdown
        } else if name.ends_with(".tex") {
            ManuscriptFormat::Latex
        } else {
            ManuscriptFormat::Unsupported
        }
    }
}

/// A manuscript read into memory, tagged with its citation syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct Manuscript {
    pub name: String,
    pub text: String,
    pub format: ManuscriptFormat,
}

impl Manuscript {
    /// Creates a manuscript whose format is inferred from `name`.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        let format = ManuscriptFormat::from_name(&name);
        Manuscript {
            name,
            text: text.into(),
            format,
        }
    }

    /// Creates a manuscript named after `path`.
    pub fn from_path(path: &Path, text: impl Into<String>) -> Self {
        Manuscript::new(path.to_string_lossy(), text)
    }
}

/// Whether each citation key is cited anywhere. Iterates in sorted key order.
pub type UsageRecord = BTreeMap<String, bool>;

/// Matches one citation key against manuscripts of either syntax.
#[derive(Debug, Clone)]
pub struct CitationMatcher {
    markdown: String,
    latex: Regex,
}

impl CitationMatcher {
    /// Builds the Markdown needle and the LaTeX pattern for `key`.
    ///
    /// The key is regex-escaped, so `a.b` does not match `axb`.
    pub fn new(key: &str) -> Result<Self, UsageError> {
        let latex = Regex::new(&format!(r"\\cite.*\{{.*{}.*\}}", regex::escape(key))).map_err(
            |source| UsageError::Pattern {
                key: key.to_string(),
                source,
            },
        )?;

        Ok(CitationMatcher {
            markdown: format!("@{}", key),
            latex,
        })
    }

    /// Returns true if `manuscript` cites the key under its own syntax.
    ///
    /// Neither check is word-boundary aware: `@smith2020` also counts as a
    /// citation of `smith202`.
    pub fn is_cited_in(&self, manuscript: &Manuscript) -> bool {
        match manuscript.format {
            ManuscriptFormat::Markdown => manuscript.text.contains(&self.markdown),
            ManuscriptFormat::Latex => self.latex.is_match(&manuscript.text),
            ManuscriptFormat::Unsupported => false,
        }
    }
}

/// Determines which keys are cited by at least one manuscript.
///
/// Every key gets an explicit entry; a key found in any source stays used
/// even if later sources never mention it.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use bib_prune::{detect_usage, Manuscript};
///
/// let keys: BTreeSet<String> = ["foo2020", "unused"].iter().map(|k| k.to_string()).collect();
/// let paper = Manuscript::new("paper.tex", r"As shown by \citet{foo2020}.");
///
/// let usage = detect_usage(&[paper], &keys).unwrap();
/// assert_eq!(usage["foo2020"], true);
/// assert_eq!(usage["unused"], false);
/// ```
pub fn detect_usage(
    manuscripts: &[Manuscript],
    keys: &BTreeSet<String>,
) -> Result<UsageRecord, UsageError> {
    let matchers = keys
        .iter()
        .map(|key| CitationMatcher::new(key).map(|matcher| (key, matcher)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut usage: UsageRecord = keys.iter().map(|key| (key.clone(), false)).collect();

    for manuscript in manuscripts {
        if manuscript.format == ManuscriptFormat::Unsupported {
            log::warn!(
                "'{}' is neither .tex nor .md, it cannot cite any entry",
                manuscript.name
            );
            continue;
        }

        let mut found = 0;
        for (key, matcher) in &matchers {
            if matcher.is_cited_in(manuscript) {
                found += 1;
                usage.insert((*key).clone(), true);
            }
        }
        log::debug!("'{}' cites {} key(s)", manuscript.name, found);
    }

    Ok(usage)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_set(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    // --- ManuscriptFormat ---

    #[test]
    fn test_format_from_name() {
        assert_eq!(ManuscriptFormat::from_name("paper.md"), ManuscriptFormat::Markdown);
        assert_eq!(ManuscriptFormat::from_name("dir/paper.tex"), ManuscriptFormat::Latex);
        assert_eq!(ManuscriptFormat::from_name("paper.txt"), ManuscriptFormat::Unsupported);
        assert_eq!(ManuscriptFormat::from_name("paper.TEX"), ManuscriptFormat::Unsupported);
        assert_eq!(ManuscriptFormat::from_name("paper"), ManuscriptFormat::Unsupported);
    }

    // --- Markdown ---

    #[test]
    fn test_markdown_citation() {
        // Given: Markdown text citing a key
        let paper = Manuscript::new("paper.md", "Some text @mykey2020 more text");

        // When: we detect usage
        let usage = detect_usage(&[paper], &key_set(&["mykey2020"])).unwrap();

        // Then: the key is used
        assert!(usage["mykey2020"]);
    }

    #[test]
    fn test_markdown_prefix_key_also_matches() {
        // Given: a key that is a prefix of the cited one
        let paper = Manuscript::new("paper.md", "Some text @mykey2020 more text");

        // When: we detect usage for the prefix
        let usage = detect_usage(&[paper], &key_set(&["mykey202", "mykey2020"])).unwrap();

        // Then: plain substring matching marks the prefix as used too
        assert!(usage["mykey202"]);
        assert!(usage["mykey2020"]);
    }

    #[test]
    fn test_markdown_requires_at_sign() {
        let paper = Manuscript::new("paper.md", "mykey2020 without the marker");

        let usage = detect_usage(&[paper], &key_set(&["mykey2020"])).unwrap();

        assert!(!usage["mykey2020"]);
    }

    #[test]
    fn test_markdown_bracketed_citation() {
        let paper = Manuscript::new("paper.md", "As shown [@a; @b, p. 4].");

        let usage = detect_usage(&[paper], &key_set(&["a", "b", "c"])).unwrap();

        assert!(usage["a"]);
        assert!(usage["b"]);
        assert!(!usage["c"]);
    }

    // --- LaTeX ---

    #[test]
    fn test_latex_citep_with_several_keys() {
        // Given: a natbib citation listing two keys
        let paper = Manuscript::new("paper.tex", r"Prior work \citep{foo2020, bar2021}.");

        // When: we detect usage
        let usage = detect_usage(&[paper], &key_set(&["bar2021", "foo2020"])).unwrap();

        // Then: both keys are used
        assert!(usage["foo2020"]);
        assert!(usage["bar2021"]);
    }

    #[test]
    fn test_latex_cite_variants() {
        let paper = Manuscript::new(
            "paper.tex",
            "\\citeauthor{one} and \\cite[p.~3]{two} and \\citealt{x,three,y}",
        );

        let usage = detect_usage(&[paper], &key_set(&["one", "three", "two"])).unwrap();

        assert!(usage.values().all(|used| *used));
    }

    #[test]
    fn test_latex_requires_cite_command() {
        // Given: the key appears in prose and in a non-cite command
        let paper = Manuscript::new("paper.tex", "smith2020 is great \\ref{smith2020}");

        // When: we detect usage
        let usage = detect_usage(&[paper], &key_set(&["smith2020"])).unwrap();

        // Then: it is not cited
        assert!(!usage["smith2020"]);
    }

    #[test]
    fn test_latex_at_sign_is_not_a_citation() {
        let paper = Manuscript::new("paper.tex", "email me @smith2020");

        let usage = detect_usage(&[paper], &key_set(&["smith2020"])).unwrap();

        assert!(!usage["smith2020"]);
    }

    #[test]
    fn test_latex_key_is_regex_escaped() {
        // Given: a key containing regex metacharacters
        let paper = Manuscript::new("paper.tex", r"\cite{axb}");

        // When: we detect usage for "a.b"
        let usage = detect_usage(&[paper], &key_set(&["a.b", "axb"])).unwrap();

        // Then: the dot is literal
        assert!(!usage["a.b"]);
        assert!(usage["axb"]);
    }

    #[test]
    fn test_latex_special_characters_in_key() {
        let paper = Manuscript::new("paper.tex", r"\cite{c++(2020)}");

        let usage = detect_usage(&[paper], &key_set(&["c++(2020)"])).unwrap();

        assert!(usage["c++(2020)"]);
    }

    #[test]
    fn test_latex_match_does_not_cross_lines() {
        // Given: a citation whose closing brace is on the next line
        let paper = Manuscript::new("paper.tex", "\\cite{first,\nsecond}");

        // When: we detect usage
        let usage = detect_usage(&[paper], &key_set(&["first", "second"])).unwrap();

        // Then: neither key is seen
        assert!(!usage["first"]);
        assert!(!usage["second"]);
    }

    // --- Combination rules ---

    #[test]
    fn test_usage_is_or_across_sources() {
        // Given: two manuscripts each citing a different key
        let tex = Manuscript::new("intro.tex", r"\cite{a}");
        let md = Manuscript::new("notes.md", "see @b");
        let empty = Manuscript::new("empty.tex", "");

        // When: we detect usage over all of them
        let usage = detect_usage(&[tex, md, empty], &key_set(&["a", "b", "c"])).unwrap();

        // Then: a later source never resets an earlier hit
        assert!(usage["a"]);
        assert!(usage["b"]);
        assert!(!usage["c"]);
    }

    #[test]
    fn test_unsupported_source_is_inert() {
        let paper = Manuscript::new("paper.txt", "@a \\cite{a}");

        let usage = detect_usage(&[paper], &key_set(&["a"])).unwrap();

        assert_eq!(usage.get("a"), Some(&false));
    }

    #[test]
    fn test_every_key_has_an_entry() {
        let usage = detect_usage(&[], &key_set(&["a", "b"])).unwrap();

        let entries: Vec<(&str, bool)> = usage.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(entries, [("a", false), ("b", false)]);
    }

    #[test]
    fn test_from_path_infers_format() {
        let paper = Manuscript::from_path(Path::new("/tmp/paper.md"), "");

        assert_eq!(paper.format, ManuscriptFormat::Markdown);
        assert_eq!(paper.name, "/tmp/paper.md");
    }
}
