//! Vesper Runtime - container core for compiled Vesper programs
//!
//! This crate provides the built-in container types (list, dict, set,
//! string, bytes, bytearray, tuple) statically linked into compiled
//! Vesper programs, plus the exception channel and allocator facade
//! they sit on.
//!
//! Elements are opaque 64-bit slots; type-specific behavior reaches the
//! generic containers through operation tables constructed by the
//! compiler (see [`ops`]).

#![allow(dead_code)]
#![allow(clippy::missing_safety_doc)]

pub mod buffer;
pub mod builtins;
pub mod exc;
pub mod logging;
pub mod mem;
pub mod ops;
pub mod slot;

// Re-export core types
pub use builtins::{ByteArray, Bytes, Dict, List, Set, Str, Tuple};
pub use exc::{Exc, ExcKind};
pub use ops::{OpsRef, OpsTable};
pub use slot::Slot;

/// Runtime initialization
#[no_mangle]
pub extern "C" fn vesper_runtime_init() {
    logging::init();
    logging::log_runtime_init();
}

/// Runtime shutdown
#[no_mangle]
pub extern "C" fn vesper_runtime_shutdown() {
    logging::log_runtime_shutdown();
}
