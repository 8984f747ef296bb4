//! Probes: the descriptors a test suite registers, one per testcase.
//!
//! A probe carries its source location, hierarchical path, description and body. The name
//! is resolved when the probe is built; registering it is an explicit call on the
//! [`Registry`](crate::registry::Registry), made from a registration pass that runs before
//! execution begins.
//!
//! ```
//! use unitprobe::{is_equal, test_case, Registry};
//!
//! let mut registry = Registry::new();
//! registry
//!     .subscribe(test_case!("/Math/add", "2 + 2 => 4", |t| {
//!         is_equal!(t, 2 + 2, 4);
//!         Ok(())
//!     }))
//!     .unwrap();
//! ```

use std::fmt;

use crate::checker::Checker;
use crate::exception::Raised;
use crate::path::{resolve, ResolvedPath};

/// Where a probe was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// What a test body returns. `Err` means the body itself raised.
pub type BodyResult = Result<(), Raised>;

/// A test body. It receives the assertion surface of its testcase.
pub type TestBody = Box<dyn Fn(&mut Checker<'_>) -> BodyResult>;

pub struct Probe {
    pub location: SourceLocation,
    pub path: String,
    pub description: String,
    pub body: TestBody,
    resolved: ResolvedPath,
}

impl Probe {
    pub fn new<F>(
        location: SourceLocation,
        path: impl Into<String>,
        description: impl Into<String>,
        body: F,
    ) -> Self
    where
        F: Fn(&mut Checker<'_>) -> BodyResult + 'static,
    {
        let path = path.into();
        let resolved = resolve(&path);
        Self {
            location,
            path,
            description: description.into(),
            body: Box::new(body),
            resolved,
        }
    }

    pub fn suite(&self) -> &str {
        &self.resolved.suite
    }

    pub fn name(&self) -> &str {
        &self.resolved.name
    }

    /// Disabled by a trailing `/DISABLE` marker.
    pub fn is_disabled(&self) -> bool {
        self.resolved.disabled
    }

    pub fn resolved(&self) -> &ResolvedPath {
        &self.resolved
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("location", &self.location)
            .field("path", &self.path)
            .field("description", &self.description)
            .field("suite", &self.resolved.suite)
            .field("name", &self.resolved.name)
            .field("disabled", &self.resolved.disabled)
            .finish_non_exhaustive()
    }
}

/// Out-of-band instructions that travel through the registration pass instead of a testcase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetTitle(String),
}

impl Command {
    /// Parses a command string. Unknown commands are reported and yield `None`.
    pub fn parse(cmd: &str, data: &str) -> Option<Self> {
        match cmd {
            "setTitle" => Some(Command::SetTitle(data.to_string())),
            _ => {
                tracing::error!(cmd, "invalid cmd found: <{}> (ignored)", cmd);
                None
            }
        }
    }
}

/// Builds a [`Probe`] at the call site.
///
/// `test_case!(path, description, |t| { ...; Ok(()) })`
#[macro_export]
macro_rules! test_case {
    ($path:expr, $desc:expr, $body:expr $(,)?) => {
        $crate::probe::Probe::new(
            $crate::probe::SourceLocation::new(file!(), line!()),
            $path,
            $desc,
            $body,
        )
    };
}
