//! Exception signaling - tagged error values over native unwinding
//!
//! Design: A closed set of error kinds with a two-level catch hierarchy
//! (family tags match their leaf members), raised through the host's
//! unwinding mechanism and consumed by the nearest matching handler or a
//! top-level printer that terminates the process.
//!
//! Raising entry points exposed over FFI are `extern "C-unwind"`; a
//! plain `extern "C"` boundary may not unwind.

use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

use crate::builtins::str::Str;

/// Exception kinds with stable wire tags.
///
/// `Exception`, `ArithmeticError`, `LookupError`, `OSError` and
/// `ImportError` are family tags a handler can register to catch a group
/// of leaf kinds; see [`ExcKind::matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum ExcKind {
    None = 0,
    Exception = 1,
    StopIteration = 2,
    ValueError = 3,
    TypeError = 4,
    KeyError = 5,
    RuntimeError = 6,
    ZeroDivisionError = 7,
    OverflowError = 8,
    IndexError = 9,
    AttributeError = 10,
    NotImplementedError = 11,
    NameError = 12,
    ArithmeticError = 13,
    LookupError = 14,
    AssertionError = 15,
    ImportError = 16,
    ModuleNotFoundError = 17,
    FileNotFoundError = 18,
    PermissionError = 19,
    OsError = 20,
}

impl ExcKind {
    /// Wire tag for this kind
    #[inline]
    pub const fn tag(self) -> i64 {
        self as i64
    }

    /// Resolve a wire tag; unknown tags map to the base `Exception`
    pub fn from_tag(tag: i64) -> ExcKind {
        match tag {
            0 => ExcKind::None,
            1 => ExcKind::Exception,
            2 => ExcKind::StopIteration,
            3 => ExcKind::ValueError,
            4 => ExcKind::TypeError,
            5 => ExcKind::KeyError,
            6 => ExcKind::RuntimeError,
            7 => ExcKind::ZeroDivisionError,
            8 => ExcKind::OverflowError,
            9 => ExcKind::IndexError,
            10 => ExcKind::AttributeError,
            11 => ExcKind::NotImplementedError,
            12 => ExcKind::NameError,
            13 => ExcKind::ArithmeticError,
            14 => ExcKind::LookupError,
            15 => ExcKind::AssertionError,
            16 => ExcKind::ImportError,
            17 => ExcKind::ModuleNotFoundError,
            18 => ExcKind::FileNotFoundError,
            19 => ExcKind::PermissionError,
            20 => ExcKind::OsError,
            _ => ExcKind::Exception,
        }
    }

    /// Display name as the language spells it
    pub const fn name(self) -> &'static str {
        match self {
            ExcKind::None => "None",
            ExcKind::Exception => "Exception",
            ExcKind::StopIteration => "StopIteration",
            ExcKind::ValueError => "ValueError",
            ExcKind::TypeError => "TypeError",
            ExcKind::KeyError => "KeyError",
            ExcKind::RuntimeError => "RuntimeError",
            ExcKind::ZeroDivisionError => "ZeroDivisionError",
            ExcKind::OverflowError => "OverflowError",
            ExcKind::IndexError => "IndexError",
            ExcKind::AttributeError => "AttributeError",
            ExcKind::NotImplementedError => "NotImplementedError",
            ExcKind::NameError => "NameError",
            ExcKind::ArithmeticError => "ArithmeticError",
            ExcKind::LookupError => "LookupError",
            ExcKind::AssertionError => "AssertionError",
            ExcKind::ImportError => "ImportError",
            ExcKind::ModuleNotFoundError => "ModuleNotFoundError",
            ExcKind::FileNotFoundError => "FileNotFoundError",
            ExcKind::PermissionError => "PermissionError",
            ExcKind::OsError => "OSError",
        }
    }

    /// Hierarchy-aware catch predicate: does an exception of kind `self`
    /// match a handler registered for `query`?
    ///
    /// `Exception` matches every non-`None` kind; a family tag matches
    /// itself and its leaf members; otherwise exact equality is required.
    pub fn matches(self, query: ExcKind) -> bool {
        if query == ExcKind::Exception {
            return self != ExcKind::None;
        }
        if self == query {
            return true;
        }
        match query {
            ExcKind::ArithmeticError => {
                matches!(self, ExcKind::ZeroDivisionError | ExcKind::OverflowError)
            }
            ExcKind::LookupError => {
                matches!(self, ExcKind::KeyError | ExcKind::IndexError)
            }
            ExcKind::OsError => {
                matches!(self, ExcKind::FileNotFoundError | ExcKind::PermissionError)
            }
            ExcKind::ImportError => self == ExcKind::ModuleNotFoundError,
            _ => false,
        }
    }
}

/// Exception value: kind tag plus optional message.
#[derive(Debug, Clone)]
pub struct Exc {
    pub kind: ExcKind,
    pub message: Option<String>,
}

impl Exc {
    pub fn new(kind: ExcKind, message: impl Into<String>) -> Self {
        Exc { kind, message: Some(message.into()) }
    }

    /// See [`ExcKind::matches`]
    #[inline]
    pub fn matches(&self, query: ExcKind) -> bool {
        self.kind.matches(query)
    }
}

/// Raise an exception: construct the value and unwind to the nearest
/// enclosing handler. Never returns.
pub fn raise(kind: ExcKind, message: impl Into<String>) -> ! {
    let exc = Exc::new(kind, message);
    tracing::debug!(event = "raise", kind = exc.kind.name(), message = exc.message.as_deref(), "exception raised");
    std::panic::panic_any(exc)
}

/// Run `f`, catching any exception raised inside it.
///
/// The nearest-handler primitive: panics that are not runtime exceptions
/// (foreign panics, assertion failures in tests) are propagated
/// unchanged.
pub fn catch<R>(f: impl FnOnce() -> R) -> Result<R, Exc> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(v) => Ok(v),
        Err(payload) => match payload.downcast::<Exc>() {
            Ok(exc) => Err(*exc),
            Err(other) => resume_unwind(other),
        },
    }
}

/// Report an unhandled exception and terminate with status 1.
///
/// Format: "<Kind>: <message>", or "Unhandled <Kind>" without a message.
pub fn print_unhandled(exc: &Exc) -> ! {
    match &exc.message {
        Some(msg) => eprintln!("{}: {}", exc.kind.name(), msg),
        None => eprintln!("Unhandled {}", exc.kind.name()),
    }
    std::process::exit(1);
}

/// Run a compiled program's entry point under the top-level handler.
pub fn guard<R>(f: impl FnOnce() -> R) -> R {
    match catch(f) {
        Ok(v) => v,
        Err(exc) => print_unhandled(&exc),
    }
}

fn message_from_str(message: *mut Str) -> Option<String> {
    if message.is_null() {
        None
    } else {
        Some(unsafe { (*message).as_str().to_owned() })
    }
}

/// C FFI exports
#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_raise(tag: i64, message: *mut Str) -> ! {
    let exc = Exc { kind: ExcKind::from_tag(tag), message: message_from_str(message) };
    tracing::debug!(event = "raise", kind = exc.kind.name(), "exception raised");
    std::panic::panic_any(exc)
}

#[no_mangle]
pub extern "C" fn vesper_exc_matches(caught_tag: i64, query_tag: i64) -> i64 {
    ExcKind::from_tag(caught_tag).matches(ExcKind::from_tag(query_tag)) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_print_unhandled(tag: i64, message: *mut Str) -> ! {
    let exc = Exc { kind: ExcKind::from_tag(tag), message: message_from_str(message) };
    print_unhandled(&exc)
}

/// Run `entry` under the top-level handler; unhandled exceptions print
/// and exit(1). Returns 0 on clean completion.
#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_guard(entry: extern "C-unwind" fn()) -> i64 {
    guard(|| entry());
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_returns_value() {
        assert_eq!(catch(|| 42).unwrap(), 42);
    }

    #[test]
    fn test_raise_is_caught() {
        let err = catch(|| -> i64 { raise(ExcKind::KeyError, "key not found") }).unwrap_err();
        assert_eq!(err.kind, ExcKind::KeyError);
        assert_eq!(err.message.as_deref(), Some("key not found"));
    }

    #[test]
    fn test_exception_matches_everything_but_none() {
        assert!(ExcKind::KeyError.matches(ExcKind::Exception));
        assert!(ExcKind::OsError.matches(ExcKind::Exception));
        assert!(!ExcKind::None.matches(ExcKind::Exception));
    }

    #[test]
    fn test_family_matching() {
        assert!(ExcKind::KeyError.matches(ExcKind::LookupError));
        assert!(ExcKind::IndexError.matches(ExcKind::LookupError));
        assert!(!ExcKind::ValueError.matches(ExcKind::LookupError));

        assert!(ExcKind::ZeroDivisionError.matches(ExcKind::ArithmeticError));
        assert!(ExcKind::OverflowError.matches(ExcKind::ArithmeticError));

        assert!(ExcKind::FileNotFoundError.matches(ExcKind::OsError));
        assert!(ExcKind::PermissionError.matches(ExcKind::OsError));
        assert!(ExcKind::ModuleNotFoundError.matches(ExcKind::ImportError));
    }

    #[test]
    fn test_exact_matching_for_leaves() {
        assert!(ExcKind::ValueError.matches(ExcKind::ValueError));
        assert!(!ExcKind::KeyError.matches(ExcKind::IndexError));
        // Leaf never matches a sibling family
        assert!(!ExcKind::KeyError.matches(ExcKind::ArithmeticError));
    }

    #[test]
    fn test_tag_roundtrip() {
        for tag in 0..=20 {
            assert_eq!(ExcKind::from_tag(tag).tag(), tag);
        }
        assert_eq!(ExcKind::from_tag(999), ExcKind::Exception);
    }
}
