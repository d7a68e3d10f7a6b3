//! Ignore patterns.
//!
//! Patterns are shell globs matched against the whole path, the way
//! `fnmatch(3)` does it with no flags: `*` and `?` happily cross `/` and
//! match leading dots, and matching is case-sensitive. Any match excludes
//! the directory; order doesn't matter.
//!
//! Matching is done by `globset` after a small syntax translation.

use crate::error::{Result, WatchError};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Immutable set of compiled ignore patterns.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    patterns: GlobSet,
}

impl IgnoreFilter {
    /// Compiles the given patterns. A malformed pattern is a configuration
    /// error and is reported before any watching starts.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(&fnmatch_syntax(pattern))
                .literal_separator(false)
                .case_insensitive(false)
                .backslash_escape(true)
                .build()
                .map_err(|source| WatchError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
            builder.add(glob);
        }

        Ok(Self {
            patterns: builder.build().map_err(WatchError::IgnoreSet)?,
        })
    }

    /// Loads patterns from an ignore file, one per line.
    ///
    /// A missing file means no patterns. Blank lines are skipped and a
    /// leading `~` or `~/` expands to `home`; without a home such a pattern
    /// is an error.
    pub fn load(path: &Path, home: Option<&Path>) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ignore file at {}", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(WatchError::IgnoreFile {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let patterns = contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| expand_home(line, home))
            .collect::<Result<Vec<_>>>()?;
        Self::new(patterns)
    }

    /// Returns true if any pattern matches the full path. Paths are matched
    /// as raw bytes, so non-UTF-8 names are no exception.
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.patterns.is_match(path)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for IgnoreFilter {
    fn default() -> Self {
        Self {
            patterns: GlobSet::empty(),
        }
    }
}

fn expand_home(pattern: &str, home: Option<&Path>) -> Result<String> {
    match pattern.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            let home = home.ok_or(WatchError::HomeNotSet)?;
            Ok(format!("{}{}", home.display(), rest))
        }
        _ => Ok(pattern.to_string()),
    }
}

/// Rewrites an fnmatch pattern into globset syntax with the same meaning.
///
/// Runs of `*` collapse to one, since without `FNM_PATHNAME` a star already
/// crosses `/`. Braces are literal in fnmatch and get wrapped in a class.
/// Bracket expressions are copied untouched.
fn fnmatch_syntax(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '*' => {
                out.push('*');
                while chars.next_if_eq(&'*').is_some() {}
            }
            '{' | '}' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            '[' => {
                out.push('[');
                if let Some(negate) = chars.next_if(|&c| c == '!' || c == '^') {
                    out.push(negate);
                }
                if let Some(bracket) = chars.next_if_eq(&']') {
                    out.push(bracket);
                }
                for c in chars.by_ref() {
                    out.push(c);
                    if c == ']' {
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_matches_whole_path() {
        let filter = IgnoreFilter::new(["*/.git", "/tmp/secret"]).unwrap();

        assert!(filter.is_ignored(Path::new("/home/u/proj/.git")));
        assert!(filter.is_ignored(Path::new("/tmp/secret")));
        assert!(!filter.is_ignored(Path::new("/home/u/proj/src")));
        // No implicit prefix matching
        assert!(!filter.is_ignored(Path::new("/tmp/secret/inner")));
    }

    #[test]
    fn test_star_crosses_separators() {
        let filter = IgnoreFilter::new(["/home/*/cache"]).unwrap();
        assert!(filter.is_ignored(Path::new("/home/u/deep/cache")));
    }

    #[test]
    fn test_brackets_and_case() {
        let filter = IgnoreFilter::new(["/data/[ab]?", "/data/[!x]z"]).unwrap();

        assert!(filter.is_ignored(Path::new("/data/a1")));
        assert!(filter.is_ignored(Path::new("/data/yz")));
        assert!(!filter.is_ignored(Path::new("/data/c1")));
        assert!(!filter.is_ignored(Path::new("/data/xz")));
        assert!(!filter.is_ignored(Path::new("/data/A1")));
    }

    #[test]
    fn test_malformed_pattern_is_rejected() {
        let err = IgnoreFilter::new(["/ok", "/bad/[unclosed"]).unwrap_err();
        assert!(matches!(err, WatchError::InvalidPattern { ref pattern, .. } if pattern == "/bad/[unclosed"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let filter = IgnoreFilter::load(&dir.path().join("nope"), None).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_load_expands_home_and_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("ignore");
        fs::write(&file, "~/Mail\n\n*/.svn\n~user/x\n").unwrap();

        let filter = IgnoreFilter::load(&file, Some(Path::new("/home/u"))).unwrap();

        assert_eq!(filter.len(), 3);
        assert!(filter.is_ignored(Path::new("/home/u/Mail")));
        assert!(filter.is_ignored(Path::new("/srv/repo/.svn")));
        // `~user` isn't ours to expand
        assert!(filter.is_ignored(Path::new("~user/x")));
    }

    #[test]
    fn test_home_pattern_without_home_is_fatal() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("ignore");

        fs::write(&file, "*/.svn\n~/Mail\n").unwrap();
        let err = IgnoreFilter::load(&file, None).unwrap_err();
        assert!(matches!(err, WatchError::HomeNotSet));

        fs::write(&file, "~\n").unwrap();
        let err = IgnoreFilter::load(&file, None).unwrap_err();
        assert!(matches!(err, WatchError::HomeNotSet));

        fs::write(&file, "~user/x\n").unwrap();
        assert_eq!(IgnoreFilter::load(&file, None).unwrap().len(), 1);
    }

    #[test]
    fn test_non_utf8_paths_match() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let filter = IgnoreFilter::new(["*/.git", "/data/caf?"]).unwrap();

        assert!(filter.is_ignored(Path::new(OsStr::from_bytes(b"/data/caf\xe9/.git"))));
        assert!(filter.is_ignored(Path::new(OsStr::from_bytes(b"/data/caf\xe9"))));
        assert!(!filter.is_ignored(Path::new(OsStr::from_bytes(b"/data/caf\xe9/src"))));
    }

    #[test]
    fn test_double_star_is_a_plain_star() {
        let filter = IgnoreFilter::new(["/data/a**", "/srv/**"]).unwrap();

        assert!(filter.is_ignored(Path::new("/data/a")));
        assert!(filter.is_ignored(Path::new("/data/abc/deep")));
        assert!(filter.is_ignored(Path::new("/srv/x")));
        // Needs the slash, like fnmatch
        assert!(!filter.is_ignored(Path::new("/srv")));
    }

    #[test]
    fn test_braces_and_escapes_are_literal() {
        let filter = IgnoreFilter::new(["/data/{a,b}", "/data/\\*star"]).unwrap();

        assert!(filter.is_ignored(Path::new("/data/{a,b}")));
        assert!(!filter.is_ignored(Path::new("/data/a")));
        assert!(filter.is_ignored(Path::new("/data/*star")));
        assert!(!filter.is_ignored(Path::new("/data/xstar")));
    }
}
