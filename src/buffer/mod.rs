//! Buffer primitives - the two storage shapes behind every container
//!
//! Design: One growable and one immutable primitive, shared through
//! layout compatibility across the user-visible types:
//! - [`GrowBuf`] (len/capacity/data) backs lists and bytearrays
//! - [`InlineBuf`] (len + inline elements, single allocation) backs
//!   strings, bytes and tuples
//!
//! Both obtain storage exclusively through the allocator facade and
//! release superseded backing arrays themselves so either collector
//! strategy works unmodified.

mod grow;
mod inline;

pub use grow::GrowBuf;
pub use inline::InlineBuf;
