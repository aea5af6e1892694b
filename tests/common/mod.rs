//! Shared test constants and helpers for integration tests.

/// Bibliography with a string macro and three entries:
/// `a2020` (nested braces), `b2021` and `c2022`.
pub const SAMPLE_BIB: &str = r#"@string{shortjournal = "J. Test"}

@article{a2020,
  title = {Alpha {with} nested {braces}},
  journal = shortjournal,
  year = 2020
}

@book{b2021,
  title = {Beta},
  year = 2021
}

@misc{c2022,
  title = {Gamma},
  year = 2022
}
"#;

/// Build a BibTeX entry of the given type and key with a `Title {key}` field.
pub fn entry(kind: &str, key: &str) -> String {
    format!("@{}{{{},\n  title = {{Title {}}}\n}}", kind, key, key)
}

/// Build a bibliography from a list of keys, one `@article` per key,
/// separated by blank lines.
pub fn build_bib(keys: &[&str]) -> String {
    let entries: Vec<String> = keys.iter().map(|key| entry("article", key)).collect();
    format!("{}\n", entries.join("\n\n"))
}
