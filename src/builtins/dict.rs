//! Dict type - insertion-ordered association table
//!
//! Design: Two growable slot arrays kept in lockstep (`keys[i]` maps to
//! `values[i]`), searched linearly. Entries are appended, so insertion
//! order is preserved; deletion shifts the tail left. The raw path is
//! rarely hot enough to justify hashing it, so the O(n) scan is the
//! contract.
//!
//! Every lookup-style operation comes in a fast variant (raw slot
//! equality) and a by-tag variant (equality from an operation table).

use crate::buffer::GrowBuf;
use crate::builtins::str::Str;
use crate::builtins::tuple::Tuple;
use crate::exc::{raise, ExcKind};
use crate::mem;
use crate::ops::OpsRef;
use crate::slot::Slot;

use super::list::List;

/// Insertion-ordered key/value table over paired growable buffers.
#[repr(C)]
pub struct Dict {
    keys: GrowBuf<Slot>,
    values: GrowBuf<Slot>,
}

impl Dict {
    pub fn empty() -> *mut Dict {
        mem::alloc_value(Dict { keys: GrowBuf::empty(), values: GrowBuf::empty() }).as_ptr()
    }

    #[inline]
    pub fn len(&self) -> i64 {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn find_key(&self, key: Slot, ops: Option<OpsRef>) -> Option<i64> {
        let keys = self.keys.as_slice();
        match ops {
            None => keys.iter().position(|k| *k == key),
            Some(ops) => keys.iter().position(|k| ops.eq(*k, key)),
        }
        .map(|i| i as i64)
    }

    /* ── lookup ──────────────────────────────────────────────────── */

    pub fn get(&self, key: Slot, ops: Option<OpsRef>) -> Slot {
        match self.find_key(key, ops) {
            Some(idx) => self.values.get(idx),
            None => raise(ExcKind::KeyError, "key not found"),
        }
    }

    /// Never raises: a missing key yields the supplied default.
    pub fn get_default(&self, key: Slot, default: Slot, ops: Option<OpsRef>) -> Slot {
        match self.find_key(key, ops) {
            Some(idx) => self.values.get(idx),
            None => default,
        }
    }

    pub fn contains(&self, key: Slot, ops: Option<OpsRef>) -> bool {
        self.find_key(key, ops).is_some()
    }

    /* ── mutation ────────────────────────────────────────────────── */

    /// Existing key: overwrite the value in place, insertion position
    /// untouched. New key: append.
    pub fn set(&mut self, key: Slot, value: Slot, ops: Option<OpsRef>) {
        match self.find_key(key, ops) {
            Some(idx) => self.values.set(idx, value),
            None => {
                self.keys.push(key);
                self.values.push(value);
            }
        }
    }

    /// Insert only if the key is absent; returns the value now present.
    pub fn setdefault(&mut self, key: Slot, default: Slot, ops: Option<OpsRef>) -> Slot {
        match self.find_key(key, ops) {
            Some(idx) => self.values.get(idx),
            None => {
                self.keys.push(key);
                self.values.push(default);
                default
            }
        }
    }

    fn remove_at(&mut self, idx: i64) -> Slot {
        self.keys.remove_at(idx);
        self.values.remove_at(idx)
    }

    pub fn pop(&mut self, key: Slot, ops: Option<OpsRef>) -> Slot {
        match self.find_key(key, ops) {
            Some(idx) => self.remove_at(idx),
            None => raise(ExcKind::KeyError, "key not found"),
        }
    }

    /// Never raises: a missing key yields the supplied default.
    pub fn pop_default(&mut self, key: Slot, default: Slot, ops: Option<OpsRef>) -> Slot {
        match self.find_key(key, ops) {
            Some(idx) => self.remove_at(idx),
            None => default,
        }
    }

    pub fn del(&mut self, key: Slot, ops: Option<OpsRef>) {
        match self.find_key(key, ops) {
            Some(idx) => {
                self.remove_at(idx);
            }
            None => raise(ExcKind::KeyError, "key not found"),
        }
    }

    /// Remove and return the last inserted-and-still-present entry as a
    /// key/value pair (LIFO).
    pub fn popitem(&mut self) -> *mut Tuple {
        if self.is_empty() {
            raise(ExcKind::KeyError, "popitem(): dictionary is empty");
        }
        let key = self.keys.pop_back();
        let value = self.values.pop_back();
        Tuple::pair(key, value)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    /* ── views ───────────────────────────────────────────────────── */

    /// Freshly materialized key list in insertion order.
    pub fn keys(&self) -> *mut List {
        List::new(self.keys.as_slice())
    }

    /// Freshly materialized value list in insertion order.
    pub fn values(&self) -> *mut List {
        List::new(self.values.as_slice())
    }

    /// Freshly materialized list of key/value pairs in insertion order.
    pub fn items(&self) -> *mut List {
        let out = List::empty();
        for (k, v) in self.keys.as_slice().iter().zip(self.values.as_slice()) {
            unsafe { (*out).append(Slot::from_ptr(Tuple::pair(*k, *v))) };
        }
        out
    }

    /* ── bulk operations ─────────────────────────────────────────── */

    /// Merge `src` into `dst`: later entries overwrite on collision,
    /// destination-first ordering, new keys appended. Raw pointers so a
    /// self-aliased merge (`d |= d`) can be detected and short-circuited
    /// instead of mutating under iteration.
    pub fn update(dst: *mut Dict, src: *const Dict, ops: Option<OpsRef>) {
        if core::ptr::eq(dst as *const Dict, src) {
            return;
        }
        unsafe {
            let src = &*src;
            for (k, v) in src.keys.as_slice().iter().zip(src.values.as_slice()) {
                (*dst).set(*k, *v, ops);
            }
        }
    }

    /// Build a dict assigning `value` to every key in the sequence;
    /// duplicate keys simply overwrite with the same value.
    pub fn fromkeys(keys: &List, value: Slot, ops: Option<OpsRef>) -> *mut Dict {
        let out = Dict::empty();
        for k in keys.as_slice() {
            unsafe { (*out).set(*k, value, ops) };
        }
        out
    }

    /// Independent key/value storage; values themselves are not
    /// recursively copied.
    pub fn copy(&self) -> *mut Dict {
        mem::alloc_value(Dict { keys: self.keys.copy(), values: self.values.copy() }).as_ptr()
    }

    /* ── equality ────────────────────────────────────────────────── */

    /// Unordered equality: same size and every key of one maps to an
    /// equal value in the other, found by scanning.
    pub fn eq(&self, other: &Dict, ops: Option<OpsRef>) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }
        for (k, v) in self.keys.as_slice().iter().zip(self.values.as_slice()) {
            match other.find_key(*k, ops) {
                Some(idx) => {
                    let ov = other.values.get(idx);
                    let equal = match ops {
                        None => *v == ov,
                        Some(ops) => ops.eq(*v, ov),
                    };
                    if !equal {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }

    /* ── stringification ─────────────────────────────────────────── */

    /// "{k1: v1, k2: v2}" with keys and values rendered through their
    /// respective tables.
    pub fn to_str(&self, key_ops: OpsRef, val_ops: OpsRef) -> *mut Str {
        let mut out = String::from("{");
        for (i, (k, v)) in self.keys.as_slice().iter().zip(self.values.as_slice()).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(unsafe { (*key_ops.stringify(*k)).as_str() });
            out.push_str(": ");
            out.push_str(unsafe { (*val_ops.stringify(*v)).as_str() });
        }
        out.push('}');
        Str::from_rust(&out)
    }
}

unsafe fn ops_of(handle: i64) -> Option<OpsRef> {
    OpsRef::from_handle(handle)
}

/// C FFI exports
#[no_mangle]
pub extern "C" fn vesper_dict_empty() -> *mut Dict {
    Dict::empty()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_len(d: *const Dict) -> i64 {
    (*d).len()
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_dict_get(d: *const Dict, key: Slot) -> Slot {
    (*d).get(key, None)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_dict_get_by_tag(d: *const Dict, key: Slot, ops: i64) -> Slot {
    (*d).get(key, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_get_default(d: *const Dict, key: Slot, default: Slot) -> Slot {
    (*d).get_default(key, default, None)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_get_default_by_tag(
    d: *const Dict,
    key: Slot,
    default: Slot,
    ops: i64,
) -> Slot {
    (*d).get_default(key, default, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_set(d: *mut Dict, key: Slot, value: Slot) {
    (*d).set(key, value, None)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_set_by_tag(d: *mut Dict, key: Slot, value: Slot, ops: i64) {
    (*d).set(key, value, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_setdefault(d: *mut Dict, key: Slot, default: Slot) -> Slot {
    (*d).setdefault(key, default, None)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_setdefault_by_tag(
    d: *mut Dict,
    key: Slot,
    default: Slot,
    ops: i64,
) -> Slot {
    (*d).setdefault(key, default, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_contains(d: *const Dict, key: Slot) -> i64 {
    (*d).contains(key, None) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_contains_by_tag(d: *const Dict, key: Slot, ops: i64) -> i64 {
    (*d).contains(key, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_dict_pop(d: *mut Dict, key: Slot) -> Slot {
    (*d).pop(key, None)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_dict_pop_by_tag(d: *mut Dict, key: Slot, ops: i64) -> Slot {
    (*d).pop(key, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_pop_default(d: *mut Dict, key: Slot, default: Slot) -> Slot {
    (*d).pop_default(key, default, None)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_pop_default_by_tag(
    d: *mut Dict,
    key: Slot,
    default: Slot,
    ops: i64,
) -> Slot {
    (*d).pop_default(key, default, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_dict_del(d: *mut Dict, key: Slot) {
    (*d).del(key, None)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_dict_del_by_tag(d: *mut Dict, key: Slot, ops: i64) {
    (*d).del(key, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_dict_popitem(d: *mut Dict) -> *mut Tuple {
    (*d).popitem()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_clear(d: *mut Dict) {
    (*d).clear()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_keys(d: *const Dict) -> *mut List {
    (*d).keys()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_values(d: *const Dict) -> *mut List {
    (*d).values()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_items(d: *const Dict) -> *mut List {
    (*d).items()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_update(d: *mut Dict, src: *const Dict) {
    Dict::update(d, src, None)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_update_by_tag(d: *mut Dict, src: *const Dict, ops: i64) {
    Dict::update(d, src, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_merge(a: *const Dict, b: *const Dict) -> *mut Dict {
    let out = (*a).copy();
    Dict::update(out, b, None);
    out
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_fromkeys(keys: *const List, value: Slot) -> *mut Dict {
    Dict::fromkeys(&*keys, value, None)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_copy(d: *const Dict) -> *mut Dict {
    (*d).copy()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_eq(a: *const Dict, b: *const Dict) -> i64 {
    (*a).eq(&*b, None) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_eq_by_tag(a: *const Dict, b: *const Dict, ops: i64) -> i64 {
    (*a).eq(&*b, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_dict_str_by_tag(d: *const Dict, key_ops: i64, val_ops: i64) -> *mut Str {
    match (ops_of(key_ops), ops_of(val_ops)) {
        (Some(k), Some(v)) => (*d).to_str(k, v),
        _ => Str::from_rust("{...}"),
    }
}
