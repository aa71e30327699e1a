//! Built-in container types - the user-visible surface of the runtime
//!
//! Design: One focused module per type, each exposing both a safe Rust
//! API and the C FFI entry points compiled code links against. The
//! list/bytearray pair and the str/bytes/tuple trio share storage
//! layouts through the buffer primitives.

pub mod bytes;
pub mod dict;
pub mod list;
pub mod set;
pub mod str;
pub mod tuple;

pub use bytes::{ByteArray, Bytes};
pub use dict::Dict;
pub use list::List;
pub use set::Set;
pub use str::Str;
pub use tuple::Tuple;
