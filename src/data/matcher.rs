use glob::Pattern;

use super::loader::exact_case;
use super::model::LocationTable;
use crate::error::{MergeError, Result};

/// Find the height for a sample id.
///
/// Every location key is normalized (whitespace removed, lower-cased) and
/// tested against the lower-cased sample id used as a glob pattern, so
/// `*`, `?` and `[...]` inside a sample id act as wildcards. The id is read
/// with fnmatch rules, see [`fnmatch_to_glob`].
///
/// Returns `Ok(None)` when nothing matches and [`MergeError::AmbiguousMatch`]
/// when more than one key does.
pub fn match_location<'t>(sample_id: &str, table: &'t LocationTable) -> Result<Option<&'t str>> {
    let needle = sample_id.to_lowercase();
    let pattern = Pattern::new(&fnmatch_to_glob(&needle)).unwrap_or_else(|_| {
        Pattern::new(&Pattern::escape(&needle)).expect("escaped pattern is valid")
    });

    let hits: Vec<_> = table
        .records()
        .iter()
        .filter(|r| pattern.matches_with(&r.normalized_key(), exact_case()))
        .collect();

    match hits.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(only.height.as_str())),
        _ => Err(MergeError::AmbiguousMatch {
            sample_id: sample_id.to_string(),
            keys: hits.iter().map(|r| r.identifier.clone()).collect(),
        }),
    }
}

/// Rewrite an fnmatch pattern into one `glob::Pattern` accepts with the
/// same meaning: runs of `*` collapse to one `*`, and a `[` without a
/// closing `]` stands for itself.
fn fnmatch_to_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end;
                }
                None => out.push_str("[[]"),
            },
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// Index of the `]` closing the class opened at `start`. A leading `!` and
/// a `]` right after the opening (or after the `!`) belong to the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}
