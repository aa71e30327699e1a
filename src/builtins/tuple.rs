//! Tuple type - immutable fixed-length sequences of slots
//!
//! Stored inline after the header like strings; the main consumer is
//! the dict, whose items()/popitem() hand out key-value pairs.

use crate::buffer::InlineBuf;
use crate::exc::{raise, ExcKind};
use crate::slot::Slot;

/// Immutable slot sequence over an inline buffer.
#[repr(transparent)]
pub struct Tuple {
    raw: InlineBuf<Slot>,
}

impl Tuple {
    pub fn new(items: &[Slot]) -> *mut Tuple {
        InlineBuf::create_traced(items) as *mut Tuple
    }

    /// Two-element tuple, the dict entry shape.
    pub fn pair(a: Slot, b: Slot) -> *mut Tuple {
        Tuple::new(&[a, b])
    }

    #[inline]
    pub fn len(&self) -> i64 {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Slot] {
        self.raw.as_slice()
    }

    /// Element at `index` (negative counts from the end).
    pub fn get(&self, index: i64) -> Slot {
        let mut i = index;
        if i < 0 {
            i += self.len();
        }
        if i < 0 || i >= self.len() {
            raise(ExcKind::IndexError, "tuple index out of range");
        }
        self.as_slice()[i as usize]
    }

    /// Slot-wise equality.
    pub fn eq_shallow(&self, other: &Tuple) -> bool {
        self.raw.eq(&other.raw)
    }
}

/// C FFI exports
#[no_mangle]
pub unsafe extern "C" fn vesper_tuple_new(data: *const Slot, len: i64) -> *mut Tuple {
    if data.is_null() || len <= 0 {
        return Tuple::new(&[]);
    }
    Tuple::new(core::slice::from_raw_parts(data, len as usize))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_tuple_len(t: *const Tuple) -> i64 {
    (*t).len()
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_tuple_get(t: *const Tuple, index: i64) -> Slot {
    (*t).get(index)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_tuple_eq(a: *const Tuple, b: *const Tuple) -> i64 {
    (*a).eq_shallow(&*b) as i64
}
