//! Hierarchical test paths.
//!
//! A path such as `/Suite/t1` or `Suite/t1/DISABLE` is the unique registry key of a
//! testcase and the source of its suite, its name and its disabled flag.
//!
//! ```
//! use unitprobe::path::resolve;
//!
//! let resolved = resolve("/Math/div/DISABLE");
//! assert_eq!(resolved.suite, "Math");
//! assert_eq!(resolved.name, "div");
//! assert!(resolved.disabled);
//! ```

/// Literal trailing segment that marks a testcase as disabled.
pub const DISABLE_MARKER: &str = "/DISABLE";

/// Suite used when a path carries no suite segment.
pub const DEFAULT_SUITE: &str = "default";

/// The identity extracted from a hierarchical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath {
    pub suite: String,
    pub name: String,
    pub disabled: bool,
    /// `/DISABLE` occurred somewhere other than the end of the path and was ignored.
    pub misplaced_marker: bool,
}

/// Splits a hierarchical path into suite, testcase name and disabled flag.
///
/// Total and side-effect free apart from a warning for a misplaced disable marker.
pub fn resolve(path: &str) -> ResolvedPath {
    let (stripped, disabled, misplaced_marker) = strip_disable_marker(path);
    if misplaced_marker {
        tracing::warn!(
            path,
            "{} NOT at end of <{}>, so NOT disabled",
            DISABLE_MARKER,
            path
        );
    }
    let (suite, name) = split_suite(stripped);

    ResolvedPath {
        suite: suite.to_string(),
        name: name.to_string(),
        disabled,
        misplaced_marker,
    }
}

/// Returns `(remaining, disabled, misplaced)`. Only the first marker occurrence counts.
fn strip_disable_marker(path: &str) -> (&str, bool, bool) {
    let Some(pos) = path.find(DISABLE_MARKER) else {
        return (path, false, false);
    };

    if pos == path.len() - DISABLE_MARKER.len() {
        (&path[..pos], true, false)
    } else {
        (path, false, true)
    }
}

fn split_suite(path: &str) -> (&str, &str) {
    let Some(pos) = path.find('/') else {
        return (DEFAULT_SUITE, path);
    };

    if pos != 0 {
        return (&path[..pos], &path[pos + 1..]);
    }

    // leading '/': the suite is the next segment, if there is a second '/'
    match path[1..].find('/') {
        Some(next) => (&path[1..next + 1], &path[next + 2..]),
        None => (DEFAULT_SUITE, &path[1..]),
    }
}
