//! Glob helpers for the path table.
//!
//! The `glob` crate has no `{a,b,c}` alternation, so patterns with one brace
//! group are expanded into plain patterns before matching. Matching is the
//! only ordering the pipeline relies on: `glob` yields entries in sorted
//! order, which keeps task output deterministic.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;

/// Expand one `{a,b,c}` group into plain glob patterns.
///
/// Patterns without braces are returned unchanged. Nested groups are not
/// supported (the path table never needs them).
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|i| open + i) else {
        return vec![pattern.to_string()];
    };

    let (head, rest) = (&pattern[..open], &pattern[close + 1..]);
    pattern[open + 1..close]
        .split(',')
        .map(|alt| format!("{head}{}{rest}", alt.trim()))
        .collect()
}

/// Compile a path-table pattern into matchers, expanding braces.
pub fn compile_pattern(pattern: &str) -> Result<Vec<Pattern>, glob::PatternError> {
    expand_braces(pattern)
        .iter()
        .map(|p| Pattern::new(p))
        .collect()
}

/// Check a path against a (possibly braced) pattern.
pub fn matches(patterns: &[Pattern], path: &Path) -> bool {
    patterns.iter().any(|p| p.matches_path(path))
}

/// All files matching a path-table pattern, sorted.
///
/// Directories are filtered out; unreadable entries are skipped.
pub fn matching_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for expanded in expand_braces(pattern) {
        let paths = glob::glob(&expanded)
            .with_context(|| format!("invalid glob pattern '{expanded}'"))?;
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => crate::debug!("glob"; "skipping unreadable entry: {}", e),
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Static directory prefix of a pattern: components up to the first one
/// containing a glob metacharacter.
///
/// `app/images/**/*.png` → `app/images`; `app/*.html` → `app`.
pub fn static_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    for component in Path::new(pattern).components() {
        match component {
            Component::Normal(part) => {
                let part_str = part.to_string_lossy();
                if part_str.contains(['*', '?', '[', '{']) {
                    break;
                }
                prefix.push(part);
            }
            other => prefix.push(other),
        }
    }
    prefix
}

/// Whether a pattern reaches into subdirectories (contains `**`).
pub fn is_recursive(pattern: &str) -> bool {
    pattern.contains("**")
}
