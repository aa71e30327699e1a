//! Operation tables - run-time polymorphism over opaque slots
//!
//! Design: The compiler constructs one fixed-shape table of callable
//! operations per concrete element type and passes its address as an
//! integer handle into the generic container entry points. Containers
//! assume nothing about slot contents beyond what the table reveals.
//!
//! Contract trusted, not verified: `hash` must be consistent with `eq`
//! (equal elements hash identically).

use crate::builtins::bytes::Bytes;
use crate::builtins::str::{self, Str};
use crate::slot::Slot;

pub type EqFn = extern "C" fn(Slot, Slot) -> i64;
pub type LtFn = extern "C" fn(Slot, Slot) -> i64;
pub type HashFn = extern "C" fn(Slot) -> i64;
pub type StrFn = extern "C" fn(Slot) -> *mut Str;

/// Fixed-shape dispatch record for one concrete element type.
///
/// Process-wide static data; containers hold only transient references
/// during a call, never ownership.
#[repr(C)]
pub struct OpsTable {
    pub eq: EqFn,
    pub lt: LtFn,
    pub hash: HashFn,
    pub str_: StrFn,
}

/// Resolved operation-table handle.
#[derive(Clone, Copy)]
pub struct OpsRef(&'static OpsTable);

impl OpsRef {
    /// Resolve an opaque handle. Zero means "use raw equality/hash"
    /// where the API documents that fallback, so it resolves to None.
    ///
    /// # Safety
    /// A non-zero handle must be the address of a live `OpsTable`
    /// (process-wide static, per the compiler's calling convention).
    #[inline]
    pub unsafe fn from_handle(handle: i64) -> Option<OpsRef> {
        if handle == 0 {
            None
        } else {
            Some(OpsRef(&*(handle as *const OpsTable)))
        }
    }

    /// Handle value for a static table.
    #[inline]
    pub fn handle(table: &'static OpsTable) -> i64 {
        table as *const OpsTable as i64
    }

    #[inline]
    pub fn eq(self, a: Slot, b: Slot) -> bool {
        (self.0.eq)(a, b) != 0
    }

    #[inline]
    pub fn lt(self, a: Slot, b: Slot) -> bool {
        (self.0.lt)(a, b) != 0
    }

    #[inline]
    pub fn hash(self, v: Slot) -> i64 {
        (self.0.hash)(v)
    }

    #[inline]
    pub fn stringify(self, v: Slot) -> *mut Str {
        (self.0.str_)(v)
    }
}

/// Raw-path equality: the slot word is its own equality key.
#[inline]
pub fn raw_eq(a: Slot, b: Slot) -> bool {
    a == b
}

/// Raw-path hash: the slot word is its own hash (identity hash).
#[inline]
pub fn raw_hash(v: Slot) -> i64 {
    v.raw()
}

/* ── built-in tables for the primitive element types ─────────────── */

extern "C" fn int_eq(a: Slot, b: Slot) -> i64 {
    (a.as_int() == b.as_int()) as i64
}

extern "C" fn int_lt(a: Slot, b: Slot) -> i64 {
    (a.as_int() < b.as_int()) as i64
}

extern "C" fn int_hash(v: Slot) -> i64 {
    v.raw()
}

extern "C" fn int_str(v: Slot) -> *mut Str {
    str::from_int(v.as_int())
}

extern "C" fn float_eq(a: Slot, b: Slot) -> i64 {
    (a.as_f64() == b.as_f64()) as i64
}

extern "C" fn float_lt(a: Slot, b: Slot) -> i64 {
    (a.as_f64() < b.as_f64()) as i64
}

extern "C" fn float_hash(v: Slot) -> i64 {
    // +0.0 and -0.0 compare equal, so normalize before hashing bits
    let f = v.as_f64();
    if f == 0.0 {
        0
    } else {
        v.raw()
    }
}

extern "C" fn float_str(v: Slot) -> *mut Str {
    str::from_float(v.as_f64())
}

extern "C" fn str_eq(a: Slot, b: Slot) -> i64 {
    let (a, b) = unsafe { (&*a.as_ptr::<Str>(), &*b.as_ptr::<Str>()) };
    a.eq(b) as i64
}

extern "C" fn str_lt(a: Slot, b: Slot) -> i64 {
    let (a, b) = unsafe { (&*a.as_ptr::<Str>(), &*b.as_ptr::<Str>()) };
    (a.cmp(b) < 0) as i64
}

extern "C" fn str_hash(v: Slot) -> i64 {
    unsafe { (*v.as_ptr::<Str>()).hash() }
}

extern "C" fn str_str(v: Slot) -> *mut Str {
    v.as_ptr::<Str>()
}

extern "C" fn bytes_eq(a: Slot, b: Slot) -> i64 {
    let (a, b) = unsafe { (&*a.as_ptr::<Bytes>(), &*b.as_ptr::<Bytes>()) };
    a.eq(b) as i64
}

extern "C" fn bytes_lt(a: Slot, b: Slot) -> i64 {
    let (a, b) = unsafe { (&*a.as_ptr::<Bytes>(), &*b.as_ptr::<Bytes>()) };
    (a.cmp(b) < 0) as i64
}

extern "C" fn bytes_hash(v: Slot) -> i64 {
    let b = unsafe { &*v.as_ptr::<Bytes>() };
    let mut h: u64 = 0xcbf29ce484222325;
    for &byte in b.as_slice() {
        h ^= byte as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h as i64
}

extern "C" fn bytes_str(v: Slot) -> *mut Str {
    let b = unsafe { &*v.as_ptr::<Bytes>() };
    let mut out = String::from("b'");
    for &byte in b.as_slice() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\x{byte:02x}")),
        }
    }
    out.push('\'');
    Str::from_rust(&out)
}

pub static INT_OPS: OpsTable = OpsTable { eq: int_eq, lt: int_lt, hash: int_hash, str_: int_str };
pub static FLOAT_OPS: OpsTable =
    OpsTable { eq: float_eq, lt: float_lt, hash: float_hash, str_: float_str };
pub static STR_OPS: OpsTable = OpsTable { eq: str_eq, lt: str_lt, hash: str_hash, str_: str_str };
pub static BYTES_OPS: OpsTable =
    OpsTable { eq: bytes_eq, lt: bytes_lt, hash: bytes_hash, str_: bytes_str };

/// C FFI exports
#[no_mangle]
pub extern "C" fn vesper_int_ops() -> i64 {
    OpsRef::handle(&INT_OPS)
}

#[no_mangle]
pub extern "C" fn vesper_float_ops() -> i64 {
    OpsRef::handle(&FLOAT_OPS)
}

#[no_mangle]
pub extern "C" fn vesper_str_ops() -> i64 {
    OpsRef::handle(&STR_OPS)
}

#[no_mangle]
pub extern "C" fn vesper_bytes_ops() -> i64 {
    OpsRef::handle(&BYTES_OPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_zero_is_raw() {
        assert!(unsafe { OpsRef::from_handle(0) }.is_none());
    }

    #[test]
    fn test_handle_roundtrip() {
        let handle = OpsRef::handle(&INT_OPS);
        let ops = unsafe { OpsRef::from_handle(handle) }.unwrap();
        assert!(ops.eq(Slot::from_int(3), Slot::from_int(3)));
        assert!(ops.lt(Slot::from_int(2), Slot::from_int(3)));
        assert_eq!(ops.hash(Slot::from_int(42)), 42);
    }

    #[test]
    fn test_float_ops() {
        let ops = unsafe { OpsRef::from_handle(OpsRef::handle(&FLOAT_OPS)) }.unwrap();
        assert!(ops.eq(Slot::from_f64(1.5), Slot::from_f64(1.5)));
        assert!(ops.lt(Slot::from_f64(-2.0), Slot::from_f64(0.5)));
        // Hash consistent with eq across zero signs
        assert_eq!(ops.hash(Slot::from_f64(0.0)), ops.hash(Slot::from_f64(-0.0)));
    }

    #[test]
    fn test_str_ops() {
        let a = Slot::from_ptr(Str::from_rust("apple"));
        let b = Slot::from_ptr(Str::from_rust("banana"));
        let a2 = Slot::from_ptr(Str::from_rust("apple"));
        let ops = unsafe { OpsRef::from_handle(OpsRef::handle(&STR_OPS)) }.unwrap();
        assert!(ops.eq(a, a2));
        assert!(!ops.eq(a, b));
        assert!(ops.lt(a, b));
        assert_eq!(ops.hash(a), ops.hash(a2));
    }

    #[test]
    fn test_bytes_stringify() {
        let b = Slot::from_ptr(Bytes::new(b"a\n\x01"));
        let ops = unsafe { OpsRef::from_handle(OpsRef::handle(&BYTES_OPS)) }.unwrap();
        let s = unsafe { &*ops.stringify(b) };
        assert_eq!(s.as_str(), "b'a\\n\\x01'");
    }
}
