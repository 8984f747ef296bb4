//! The recognized error family for test bodies and the classifier that names raised errors.
//!
//! A test body or an assertion expression "raises" by returning an `Err` (boxed into
//! [`Raised`]) or by panicking. Anything that is a [`TestError`] is recognized and
//! classified by its [`ErrorKind`]; everything else is classified as
//! [`ExceptionClass::Unknown`] and reported under the [`UNKNOWN_TYPE`] sentinel.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// Type name reported for errors outside the recognized family.
pub const UNKNOWN_TYPE: &str = "(UNKNOWN)";

/// Any error escaping a test body or an assertion expression.
pub type Raised = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed set of recognized error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    Runtime,
    Logic,
    Range,
    Domain,
    InvalidArgument,
    Length,
    OutOfRange,
    Overflow,
    Underflow,
    DivideByZero,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 10] = [
        ErrorKind::Runtime,
        ErrorKind::Logic,
        ErrorKind::Range,
        ErrorKind::Domain,
        ErrorKind::InvalidArgument,
        ErrorKind::Length,
        ErrorKind::OutOfRange,
        ErrorKind::Overflow,
        ErrorKind::Underflow,
        ErrorKind::DivideByZero,
    ];

    /// Canonical type name used in expectations and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::Logic => "LogicError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Domain => "DomainError",
            ErrorKind::InvalidArgument => "InvalidArgumentError",
            ErrorKind::Length => "LengthError",
            ErrorKind::OutOfRange => "OutOfRangeError",
            ErrorKind::Overflow => "OverflowError",
            ErrorKind::Underflow => "UnderflowError",
            ErrorKind::DivideByZero => "DivideByZeroError",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The recognized error family. Test code raises these to get a named classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TestError {
    pub kind: ErrorKind,
    pub message: String,
}

impl TestError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    pub fn logic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Logic, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfRange, message)
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Overflow, message)
    }

    pub fn divide_by_zero(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DivideByZero, message)
    }
}

/// Classification of a raised error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionClass {
    Known(ErrorKind),
    Unknown,
}

impl ExceptionClass {
    pub fn type_name(&self) -> &'static str {
        match self {
            ExceptionClass::Known(kind) => kind.as_str(),
            ExceptionClass::Unknown => UNKNOWN_TYPE,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ExceptionClass::Unknown)
    }
}

impl fmt::Display for ExceptionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A classified raise together with its detail text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub class: ExceptionClass,
    pub what: String,
}

impl Classified {
    pub fn type_name(&self) -> &'static str {
        self.class.type_name()
    }
}

/// Classifies an error returned from a test body or an assertion expression.
pub fn classify(error: &Raised) -> Classified {
    let class = match error.downcast_ref::<TestError>() {
        Some(e) => ExceptionClass::Known(e.kind),
        None => ExceptionClass::Unknown,
    };
    Classified {
        class,
        what: error.to_string(),
    }
}

/// Classifies the payload of a caught panic.
///
/// `std::panic::panic_any(TestError)` is recognized; plain `panic!` messages are not.
pub fn classify_panic(payload: &(dyn Any + Send)) -> Classified {
    if let Some(e) = payload.downcast_ref::<TestError>() {
        return Classified {
            class: ExceptionClass::Known(e.kind),
            what: e.message.clone(),
        };
    }

    let what = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::new()
    };

    Classified {
        class: ExceptionClass::Unknown,
        what,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_error_is_named_by_kind() {
        let raised: Raised = Box::new(TestError::divide_by_zero("division by zero"));
        let c = classify(&raised);
        assert_eq!(c.class, ExceptionClass::Known(ErrorKind::DivideByZero));
        assert_eq!(c.type_name(), "DivideByZeroError");
        assert_eq!(c.what, "division by zero");
    }

    #[test]
    fn foreign_error_is_unknown() {
        let raised: Raised = Box::new(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        let c = classify(&raised);
        assert_eq!(c.class, ExceptionClass::Unknown);
        assert_eq!(c.type_name(), UNKNOWN_TYPE);
        assert_eq!(c.what, "disk");
    }

    #[test]
    fn string_errors_are_unknown() {
        let raised: Raised = "plain message".into();
        assert!(classify(&raised).class.is_unknown());
    }

    #[test]
    fn panic_payloads() {
        let typed = std::panic::catch_unwind(|| {
            std::panic::panic_any(TestError::range("can't handle 42"))
        })
        .unwrap_err();
        let c = classify_panic(typed.as_ref());
        assert_eq!(c.type_name(), "RangeError");
        assert_eq!(c.what, "can't handle 42");

        let plain = std::panic::catch_unwind(|| panic!("boom {}", 42)).unwrap_err();
        let c = classify_panic(plain.as_ref());
        assert!(c.class.is_unknown());
        assert_eq!(c.what, "boom 42");

        let int = std::panic::catch_unwind(|| std::panic::panic_any(42_i32)).unwrap_err();
        let c = classify_panic(int.as_ref());
        assert!(c.class.is_unknown());
        assert_eq!(c.what, "");
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ErrorKind::from_name("std::runtime_error"), None);
    }

    #[test]
    fn classification_is_deterministic() {
        let raised: Raised = Box::new(TestError::logic("x"));
        assert_eq!(classify(&raised), classify(&raised));
    }
}
