//! List type - growable arrays of opaque slots
//!
//! Design: A thin layer over the shared growable buffer that adds the
//! language-visible semantics:
//! - negative-index resolution, raising on out-of-range access
//! - silent-clamp insertion and full-clamp slicing (never raise)
//! - typed sort fast paths plus a table-driven generic path
//! - self-alias-aware in-place `+=` / `*=`

use crate::buffer::GrowBuf;
use crate::builtins::bytes::{ByteArray, Bytes};
use crate::builtins::str::Str;
use crate::exc::{raise, ExcKind};
use crate::mem;
use crate::ops::OpsRef;
use crate::slot::Slot;

fn resolve_index(len: i64, index: i64) -> i64 {
    let mut i = index;
    if i < 0 {
        i += len;
    }
    if i < 0 || i >= len {
        raise(ExcKind::IndexError, "list index out of range");
    }
    i
}

/// Growable slot array over the shared growable primitive.
#[repr(transparent)]
pub struct List {
    raw: GrowBuf<Slot>,
}

impl List {
    pub fn new(items: &[Slot]) -> *mut List {
        mem::alloc_value(List { raw: GrowBuf::create(items) }).as_ptr()
    }

    pub fn empty() -> *mut List {
        Self::new(&[])
    }

    fn wrap(raw: GrowBuf<Slot>) -> *mut List {
        mem::alloc_value(List { raw }).as_ptr()
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
    pub fn capacity(&self) -> i64 {
        self.raw.capacity()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Slot] {
        self.raw.as_slice()
    }

    /* ── element access ──────────────────────────────────────────── */

    pub fn get(&self, index: i64) -> Slot {
        self.raw.get(resolve_index(self.len(), index))
    }

    pub fn set(&mut self, index: i64, value: Slot) {
        let idx = resolve_index(self.len(), index);
        self.raw.set(idx, value);
    }

    pub fn append(&mut self, value: Slot) {
        self.raw.push(value);
    }

    pub fn pop(&mut self) -> Slot {
        if self.is_empty() {
            raise(ExcKind::IndexError, "pop from empty list");
        }
        self.raw.pop_back()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Insert with the silent-clamp index policy.
    pub fn insert(&mut self, index: i64, value: Slot) {
        self.raw.insert_at(index, value);
    }

    /* ── queries ─────────────────────────────────────────────────── */

    pub fn contains(&self, value: Slot) -> bool {
        self.raw.contains(value)
    }

    pub fn contains_by_tag(&self, value: Slot, ops: OpsRef) -> bool {
        self.as_slice().iter().any(|v| ops.eq(*v, value))
    }

    pub fn index(&self, value: Slot) -> i64 {
        let idx = self.raw.index_of(value);
        if idx < 0 {
            raise(ExcKind::ValueError, "x not in list");
        }
        idx
    }

    pub fn index_by_tag(&self, value: Slot, ops: OpsRef) -> i64 {
        match self.as_slice().iter().position(|v| ops.eq(*v, value)) {
            Some(i) => i as i64,
            None => raise(ExcKind::ValueError, "x not in list"),
        }
    }

    pub fn count(&self, value: Slot) -> i64 {
        self.raw.count_of(value)
    }

    pub fn count_by_tag(&self, value: Slot, ops: OpsRef) -> i64 {
        self.as_slice().iter().filter(|v| ops.eq(**v, value)).count() as i64
    }

    /* ── mutation ────────────────────────────────────────────────── */

    pub fn remove(&mut self, value: Slot) {
        if !self.raw.remove_first(value) {
            raise(ExcKind::ValueError, "list.remove(x): x not in list");
        }
    }

    pub fn remove_by_tag(&mut self, value: Slot, ops: OpsRef) {
        match self.as_slice().iter().position(|v| ops.eq(*v, value)) {
            Some(i) => {
                self.raw.remove_at(i as i64);
            }
            None => raise(ExcKind::ValueError, "list.remove(x): x not in list"),
        }
    }

    pub fn reverse(&mut self) {
        self.raw.reverse();
    }

    /// In-place `+=`. A self-aliased right-hand side appends a snapshot
    /// of the original contents instead of iterating while mutating.
    pub fn extend(dst: *mut List, src: *const List) {
        unsafe {
            if core::ptr::eq(dst as *const List, src) {
                (*dst).raw.extend_self();
            } else {
                (*dst).raw.extend_from((*src).as_slice());
            }
        }
    }

    /// In-place `*=`: `n <= 0` clears, `n == 1` is a no-op, otherwise
    /// the pre-expansion region is block-copied into each subsequent
    /// block (one grow, no reads from a moving region).
    pub fn imul(&mut self, n: i64) {
        self.raw.repeat_in_place(n);
    }

    /* ── slicing / copying ───────────────────────────────────────── */

    /// `[start:stop]` with the language's clamping rules: negative
    /// bounds resolve from the end, everything clamps into range, and
    /// `stop < start` yields an empty list. Never raises.
    pub fn slice(&self, start: i64, stop: i64) -> *mut List {
        let len = self.len();
        let mut s = start;
        let mut e = stop;
        if s < 0 {
            s += len;
        }
        if e < 0 {
            e += len;
        }
        s = s.clamp(0, len);
        e = e.clamp(0, len);
        if e < s {
            e = s;
        }
        Self::new(&self.as_slice()[s as usize..e as usize])
    }

    pub fn copy(&self) -> *mut List {
        Self::wrap(self.raw.copy())
    }

    pub fn concat(&self, other: &List) -> *mut List {
        Self::wrap(self.raw.concat(&other.raw))
    }

    pub fn repeat(&self, n: i64) -> *mut List {
        Self::wrap(self.raw.repeat(n))
    }

    /* ── sorting ─────────────────────────────────────────────────── */
    // Fast paths are unstable sorts; the generic path is an insertion
    // sort driven by the table's `lt`. No stability is promised.

    pub fn sort_int(&mut self) {
        self.raw.sort_by(|a, b| a.as_int().cmp(&b.as_int()));
    }

    pub fn sort_float(&mut self) {
        self.raw
            .sort_by(|a, b| a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(core::cmp::Ordering::Equal));
    }

    pub fn sort_str(&mut self) {
        self.raw.sort_by(|a, b| {
            let (sa, sb) = unsafe { (&*a.as_ptr::<Str>(), &*b.as_ptr::<Str>()) };
            sa.cmp(sb).cmp(&0)
        });
    }

    pub fn sort_bytes(&mut self) {
        self.raw.sort_by(|a, b| {
            let (ba, bb) = unsafe { (&*a.as_ptr::<Bytes>(), &*b.as_ptr::<Bytes>()) };
            ba.cmp(bb).cmp(&0)
        });
    }

    pub fn sort_bytearray(&mut self) {
        self.raw.sort_by(|a, b| {
            let (ba, bb) = unsafe { (&*a.as_ptr::<ByteArray>(), &*b.as_ptr::<ByteArray>()) };
            ba.cmp(bb).cmp(&0)
        });
    }

    /// Generic sort through the table's `lt`.
    pub fn sort_by_tag(&mut self, ops: OpsRef) {
        let items = self.raw.as_mut_slice();
        for i in 1..items.len() {
            let key = items[i];
            let mut j = i;
            while j > 0 && ops.lt(key, items[j - 1]) {
                items[j] = items[j - 1];
                j -= 1;
            }
            items[j] = key;
        }
    }

    /* ── equality ────────────────────────────────────────────────── */

    pub fn eq_shallow(&self, other: &List) -> bool {
        self.raw.eq(&other.raw)
    }

    /// Element equality through nested list pointers down to `depth`.
    pub fn eq_deep(&self, other: &List, depth: i64) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }
        if depth <= 0 {
            return self.eq_shallow(other);
        }
        self.as_slice().iter().zip(other.as_slice()).all(|(a, b)| {
            let (la, lb) = unsafe { (&*a.as_ptr::<List>(), &*b.as_ptr::<List>()) };
            la.eq_deep(lb, depth - 1)
        })
    }

    pub fn eq_by_tag(&self, other: &List, ops: OpsRef) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        self.len() == other.len()
            && self.as_slice().iter().zip(other.as_slice()).all(|(a, b)| ops.eq(*a, *b))
    }

    /* ── stringification ─────────────────────────────────────────── */

    /// "[e1, e2, ...]" with elements rendered through the table.
    pub fn to_str(&self, ops: OpsRef) -> *mut Str {
        let mut out = String::from("[");
        for (i, slot) in self.as_slice().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(unsafe { (*ops.stringify(*slot)).as_str() });
        }
        out.push(']');
        Str::from_rust(&out)
    }
}

/* ── range(...) builtins ─────────────────────────────────────────── */

fn range_impl(start: i64, stop: i64, step: i64) -> *mut List {
    if step == 0 {
        raise(ExcKind::ValueError, "range() arg 3 must not be zero");
    }
    let mut out = GrowBuf::empty();
    if step > 0 {
        let mut i = start;
        while i < stop {
            out.push(Slot::from_int(i));
            i += step;
        }
    } else {
        let mut i = start;
        while i > stop {
            out.push(Slot::from_int(i));
            i += step;
        }
    }
    List::wrap(out)
}

pub fn range_1(stop: i64) -> *mut List {
    range_impl(0, stop, 1)
}

pub fn range_2(start: i64, stop: i64) -> *mut List {
    range_impl(start, stop, 1)
}

pub fn range_3(start: i64, stop: i64, step: i64) -> *mut List {
    range_impl(start, stop, step)
}

/* ── aggregate builtins ──────────────────────────────────────────── */

pub fn sum_int(lst: &List) -> i64 {
    if lst.is_empty() {
        raise(ExcKind::ValueError, "sum() of empty sequence");
    }
    lst.as_slice().iter().map(|s| s.as_int()).sum()
}

pub fn sum_float(lst: &List) -> f64 {
    if lst.is_empty() {
        raise(ExcKind::ValueError, "sum() of empty sequence");
    }
    lst.as_slice().iter().map(|s| s.as_f64()).sum()
}

pub fn sum_int_start(lst: &List, start: i64) -> i64 {
    start + lst.as_slice().iter().map(|s| s.as_int()).sum::<i64>()
}

pub fn sum_float_start(lst: &List, start: f64) -> f64 {
    start + lst.as_slice().iter().map(|s| s.as_f64()).sum::<f64>()
}

pub fn all(lst: &List) -> bool {
    lst.as_slice().iter().all(|s| s.as_bool())
}

pub fn any(lst: &List) -> bool {
    lst.as_slice().iter().any(|s| s.as_bool())
}

pub fn max_int(lst: &List) -> i64 {
    if lst.is_empty() {
        raise(ExcKind::ValueError, "max() arg is an empty sequence");
    }
    lst.as_slice().iter().map(|s| s.as_int()).max().unwrap_or(0)
}

pub fn max_float(lst: &List) -> f64 {
    if lst.is_empty() {
        raise(ExcKind::ValueError, "max() arg is an empty sequence");
    }
    let mut m = lst.as_slice()[0].as_f64();
    for s in &lst.as_slice()[1..] {
        let v = s.as_f64();
        if v > m {
            m = v;
        }
    }
    m
}

/// Largest element under the table's `lt`.
pub fn max_by_tag(lst: &List, ops: OpsRef) -> Slot {
    if lst.is_empty() {
        raise(ExcKind::ValueError, "max() arg is an empty sequence");
    }
    let mut m = lst.as_slice()[0];
    for s in &lst.as_slice()[1..] {
        if ops.lt(m, *s) {
            m = *s;
        }
    }
    m
}

/// C FFI exports
#[no_mangle]
pub unsafe extern "C" fn vesper_list_new(data: *const Slot, len: i64) -> *mut List {
    if data.is_null() || len <= 0 {
        return List::empty();
    }
    List::new(core::slice::from_raw_parts(data, len as usize))
}

#[no_mangle]
pub extern "C" fn vesper_list_empty() -> *mut List {
    List::empty()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_len(lst: *const List) -> i64 {
    (*lst).len()
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_list_get(lst: *const List, index: i64) -> Slot {
    (*lst).get(index)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_list_set(lst: *mut List, index: i64, value: Slot) {
    (*lst).set(index, value)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_append(lst: *mut List, value: Slot) {
    (*lst).append(value)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_list_pop(lst: *mut List) -> Slot {
    (*lst).pop()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_clear(lst: *mut List) {
    (*lst).clear()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_insert(lst: *mut List, index: i64, value: Slot) {
    (*lst).insert(index, value)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_list_remove(lst: *mut List, value: Slot) {
    (*lst).remove(value)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_list_remove_by_tag(lst: *mut List, value: Slot, ops: i64) {
    match OpsRef::from_handle(ops) {
        Some(ops) => (*lst).remove_by_tag(value, ops),
        None => (*lst).remove(value),
    }
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_contains(lst: *const List, value: Slot) -> i64 {
    (*lst).contains(value) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_contains_by_tag(lst: *const List, value: Slot, ops: i64) -> i64 {
    match OpsRef::from_handle(ops) {
        Some(ops) => (*lst).contains_by_tag(value, ops) as i64,
        None => (*lst).contains(value) as i64,
    }
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_list_index(lst: *const List, value: Slot) -> i64 {
    (*lst).index(value)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_list_index_by_tag(lst: *const List, value: Slot, ops: i64) -> i64 {
    match OpsRef::from_handle(ops) {
        Some(ops) => (*lst).index_by_tag(value, ops),
        None => (*lst).index(value),
    }
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_count(lst: *const List, value: Slot) -> i64 {
    (*lst).count(value)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_count_by_tag(lst: *const List, value: Slot, ops: i64) -> i64 {
    match OpsRef::from_handle(ops) {
        Some(ops) => (*lst).count_by_tag(value, ops),
        None => (*lst).count(value),
    }
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_slice(lst: *const List, start: i64, stop: i64) -> *mut List {
    (*lst).slice(start, stop)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_reverse(lst: *mut List) {
    (*lst).reverse()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_copy(lst: *const List) -> *mut List {
    (*lst).copy()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_concat(a: *const List, b: *const List) -> *mut List {
    (*a).concat(&*b)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_repeat(lst: *const List, n: i64) -> *mut List {
    (*lst).repeat(n)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_extend(dst: *mut List, src: *const List) {
    List::extend(dst, src)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_iadd(dst: *mut List, src: *const List) {
    List::extend(dst, src)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_imul(lst: *mut List, n: i64) {
    (*lst).imul(n)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_sort_int(lst: *mut List) {
    (*lst).sort_int()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_sort_float(lst: *mut List) {
    (*lst).sort_float()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_sort_str(lst: *mut List) {
    (*lst).sort_str()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_sort_bytes(lst: *mut List) {
    (*lst).sort_bytes()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_sort_bytearray(lst: *mut List) {
    (*lst).sort_bytearray()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_sort_by_tag(lst: *mut List, ops: i64) {
    if let Some(ops) = OpsRef::from_handle(ops) {
        (*lst).sort_by_tag(ops)
    }
}

#[no_mangle]
pub unsafe extern "C" fn vesper_sorted_int(lst: *const List) -> *mut List {
    let out = (*lst).copy();
    (*out).sort_int();
    out
}

#[no_mangle]
pub unsafe extern "C" fn vesper_sorted_float(lst: *const List) -> *mut List {
    let out = (*lst).copy();
    (*out).sort_float();
    out
}

#[no_mangle]
pub unsafe extern "C" fn vesper_sorted_str(lst: *const List) -> *mut List {
    let out = (*lst).copy();
    (*out).sort_str();
    out
}

#[no_mangle]
pub unsafe extern "C" fn vesper_sorted_bytes(lst: *const List) -> *mut List {
    let out = (*lst).copy();
    (*out).sort_bytes();
    out
}

#[no_mangle]
pub unsafe extern "C" fn vesper_sorted_bytearray(lst: *const List) -> *mut List {
    let out = (*lst).copy();
    (*out).sort_bytearray();
    out
}

#[no_mangle]
pub unsafe extern "C" fn vesper_sorted_by_tag(lst: *const List, ops: i64) -> *mut List {
    let out = (*lst).copy();
    if let Some(ops) = OpsRef::from_handle(ops) {
        (*out).sort_by_tag(ops)
    }
    out
}

#[no_mangle]
pub unsafe extern "C" fn vesper_reversed_list(lst: *const List) -> *mut List {
    let out = (*lst).copy();
    (*out).reverse();
    out
}

#[no_mangle]
pub extern "C-unwind" fn vesper_range_1(stop: i64) -> *mut List {
    range_1(stop)
}

#[no_mangle]
pub extern "C-unwind" fn vesper_range_2(start: i64, stop: i64) -> *mut List {
    range_2(start, stop)
}

#[no_mangle]
pub extern "C-unwind" fn vesper_range_3(start: i64, stop: i64, step: i64) -> *mut List {
    range_3(start, stop, step)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_sum_int(lst: *const List) -> i64 {
    sum_int(&*lst)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_sum_float(lst: *const List) -> f64 {
    sum_float(&*lst)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_sum_int_start(lst: *const List, start: i64) -> i64 {
    sum_int_start(&*lst, start)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_sum_float_start(lst: *const List, start: f64) -> f64 {
    sum_float_start(&*lst, start)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_all_list(lst: *const List) -> i64 {
    all(&*lst) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_any_list(lst: *const List) -> i64 {
    any(&*lst) as i64
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_max_list_int(lst: *const List) -> i64 {
    max_int(&*lst)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_max_list_float(lst: *const List) -> f64 {
    max_float(&*lst)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_max_list_by_tag(lst: *const List, ops: i64) -> Slot {
    match OpsRef::from_handle(ops) {
        Some(ops) => max_by_tag(&*lst, ops),
        None => Slot::from_int(max_int(&*lst)),
    }
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_eq_shallow(a: *const List, b: *const List) -> i64 {
    (*a).eq_shallow(&*b) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_eq_deep(a: *const List, b: *const List, depth: i64) -> i64 {
    (*a).eq_deep(&*b, depth) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_eq_by_tag(a: *const List, b: *const List, ops: i64) -> i64 {
    match OpsRef::from_handle(ops) {
        Some(ops) => (*a).eq_by_tag(&*b, ops) as i64,
        None => (*a).eq_shallow(&*b) as i64,
    }
}

#[no_mangle]
pub unsafe extern "C" fn vesper_list_str_by_tag(lst: *const List, ops: i64) -> *mut Str {
    match OpsRef::from_handle(ops) {
        Some(ops) => (*lst).to_str(ops),
        None => Str::from_rust("[...]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exc::{catch, ExcKind};
    use crate::ops::{OpsRef, INT_OPS, STR_OPS};

    fn ints(values: &[i64]) -> &'static mut List {
        let slots: Vec<Slot> = values.iter().map(|v| Slot::from_int(*v)).collect();
        unsafe { &mut *List::new(&slots) }
    }

    fn int_values(lst: &List) -> Vec<i64> {
        lst.as_slice().iter().map(|s| s.as_int()).collect()
    }

    fn int_ops() -> OpsRef {
        unsafe { OpsRef::from_handle(OpsRef::handle(&INT_OPS)) }.unwrap()
    }

    #[test]
    fn test_get_set_negative_index() {
        let lst = ints(&[1, 2, 3]);
        assert_eq!(lst.get(0).as_int(), 1);
        assert_eq!(lst.get(-1).as_int(), 3);
        lst.set(-2, Slot::from_int(9));
        assert_eq!(int_values(lst), vec![1, 9, 3]);
    }

    #[test]
    fn test_out_of_range_raises() {
        let lst = ints(&[1]);
        assert_eq!(catch(|| lst.get(1)).unwrap_err().kind, ExcKind::IndexError);
        assert_eq!(catch(|| lst.get(-2)).unwrap_err().kind, ExcKind::IndexError);
    }

    #[test]
    fn test_pop_on_empty_raises() {
        let lst = ints(&[7]);
        assert_eq!(lst.pop().as_int(), 7);
        let err = catch(|| lst.pop()).unwrap_err();
        assert_eq!(err.kind, ExcKind::IndexError);
        assert_eq!(err.message.as_deref(), Some("pop from empty list"));
    }

    #[test]
    fn test_insert_clamps_never_raises() {
        let lst = ints(&[1, 2]);
        lst.insert(-100, Slot::from_int(0));
        lst.insert(100, Slot::from_int(3));
        assert_eq!(int_values(lst), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_remove_and_index() {
        let lst = ints(&[5, 6, 5]);
        lst.remove(Slot::from_int(5));
        assert_eq!(int_values(lst), vec![6, 5]);
        assert_eq!(lst.index(Slot::from_int(5)), 1);
        assert_eq!(catch(|| lst.index(Slot::from_int(42))).unwrap_err().kind, ExcKind::ValueError);
        assert_eq!(catch(|| lst.remove(Slot::from_int(42))).unwrap_err().kind, ExcKind::ValueError);
    }

    #[test]
    fn test_by_tag_variants() {
        let lst = ints(&[1, 2, 2, 3]);
        let ops = int_ops();
        assert!(lst.contains_by_tag(Slot::from_int(3), ops));
        assert_eq!(lst.count_by_tag(Slot::from_int(2), ops), 2);
        assert_eq!(lst.index_by_tag(Slot::from_int(2), ops), 1);
        lst.remove_by_tag(Slot::from_int(2), ops);
        assert_eq!(int_values(lst), vec![1, 2, 3]);
    }

    #[test]
    fn test_slice_clamping() {
        let lst = ints(&[0, 1, 2, 3, 4]);
        assert_eq!(int_values(unsafe { &*lst.slice(1, 3) }), vec![1, 2]);
        assert_eq!(int_values(unsafe { &*lst.slice(-2, 100) }), vec![3, 4]);
        assert_eq!(int_values(unsafe { &*lst.slice(-100, -3) }), vec![0, 1]);
        assert_eq!(unsafe { &*lst.slice(3, 1) }.len(), 0);
        assert_eq!(unsafe { &*lst.slice(100, 200) }.len(), 0);
    }

    #[test]
    fn test_self_aliased_iadd_doubles() {
        let lst = ints(&[1, 2, 3]);
        let p = lst as *mut List;
        List::extend(p, p);
        assert_eq!(int_values(lst), vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_extend_distinct() {
        let a = ints(&[1]);
        let b = ints(&[2, 3]);
        List::extend(a, b);
        assert_eq!(int_values(a), vec![1, 2, 3]);
        assert_eq!(int_values(b), vec![2, 3]);
    }

    #[test]
    fn test_imul() {
        let lst = ints(&[1, 2]);
        lst.imul(3);
        assert_eq!(int_values(lst), vec![1, 2, 1, 2, 1, 2]);
        lst.imul(1);
        assert_eq!(lst.len(), 6);
        lst.imul(0);
        assert_eq!(lst.len(), 0);
        let neg = ints(&[9]);
        neg.imul(-2);
        assert_eq!(neg.len(), 0);
    }

    #[test]
    fn test_sort_fast_paths() {
        let lst = ints(&[3, 1, 2]);
        lst.sort_int();
        assert_eq!(int_values(lst), vec![1, 2, 3]);

        let floats = unsafe {
            &mut *List::new(&[Slot::from_f64(2.5), Slot::from_f64(-1.0), Slot::from_f64(0.25)])
        };
        floats.sort_float();
        let vals: Vec<f64> = floats.as_slice().iter().map(|s| s.as_f64()).collect();
        assert_eq!(vals, vec![-1.0, 0.25, 2.5]);

        let strs = unsafe {
            &mut *List::new(&[
                Slot::from_ptr(Str::from_rust("pear")),
                Slot::from_ptr(Str::from_rust("apple")),
                Slot::from_ptr(Str::from_rust("fig")),
            ])
        };
        strs.sort_str();
        let texts: Vec<&str> =
            strs.as_slice().iter().map(|s| unsafe { (*s.as_ptr::<Str>()).as_str() }).collect();
        assert_eq!(texts, vec!["apple", "fig", "pear"]);
    }

    #[test]
    fn test_sort_by_tag_insertion() {
        let lst = ints(&[4, 1, 3, 1, 2]);
        lst.sort_by_tag(int_ops());
        assert_eq!(int_values(lst), vec![1, 1, 2, 3, 4]);
    }

    #[test]
    fn test_range() {
        assert_eq!(int_values(unsafe { &*range_1(5) }), vec![0, 1, 2, 3, 4]);
        assert_eq!(int_values(unsafe { &*range_2(2, 5) }), vec![2, 3, 4]);
        assert_eq!(int_values(unsafe { &*range_3(5, 0, -2) }), vec![5, 3, 1]);
        assert_eq!(unsafe { &*range_3(0, 5, -1) }.len(), 0);
        let err = catch(|| range_3(0, 5, 0)).unwrap_err();
        assert_eq!(err.kind, ExcKind::ValueError);
    }

    #[test]
    fn test_aggregates() {
        let lst = ints(&[1, 2, 3]);
        assert_eq!(sum_int(lst), 6);
        assert_eq!(sum_int_start(lst, 10), 16);
        assert_eq!(max_int(lst), 3);
        assert!(all(lst));
        assert!(any(lst));

        let with_zero = ints(&[0, 1]);
        assert!(!all(with_zero));
        assert!(any(with_zero));

        let empty = ints(&[]);
        assert_eq!(catch(|| sum_int(empty)).unwrap_err().kind, ExcKind::ValueError);
        assert_eq!(catch(|| max_int(empty)).unwrap_err().kind, ExcKind::ValueError);
        assert_eq!(sum_int_start(empty, 4), 4);
        assert!(all(empty));
        assert!(!any(empty));
    }

    #[test]
    fn test_max_by_tag() {
        let lst = ints(&[2, 9, 4]);
        assert_eq!(max_by_tag(lst, int_ops()).as_int(), 9);
    }

    #[test]
    fn test_copy_is_independent() {
        let lst = ints(&[1, 2]);
        let copy = unsafe { &mut *lst.copy() };
        copy.append(Slot::from_int(3));
        copy.set(0, Slot::from_int(0));
        assert_eq!(int_values(lst), vec![1, 2]);
        assert_eq!(int_values(copy), vec![0, 2, 3]);
    }

    #[test]
    fn test_eq_deep() {
        let inner_a = ints(&[1, 2]);
        let inner_b = ints(&[1, 2]);
        let outer_a = unsafe { &*List::new(&[Slot::from_ptr(inner_a as *mut List)]) };
        let outer_b = unsafe { &*List::new(&[Slot::from_ptr(inner_b as *mut List)]) };
        assert!(!outer_a.eq_shallow(outer_b));
        assert!(outer_a.eq_deep(outer_b, 1));
    }

    #[test]
    fn test_to_str() {
        let lst = ints(&[1, 2, 3]);
        assert_eq!(unsafe { (*lst.to_str(int_ops())).as_str() }, "[1, 2, 3]");
        assert_eq!(unsafe { (*ints(&[]).to_str(int_ops())).as_str() }, "[]");

        let strs = unsafe {
            &*List::new(&[Slot::from_ptr(Str::from_rust("a")), Slot::from_ptr(Str::from_rust("b"))])
        };
        let str_ops = unsafe { OpsRef::from_handle(OpsRef::handle(&STR_OPS)) }.unwrap();
        assert_eq!(unsafe { (*strs.to_str(str_ops)).as_str() }, "[a, b]");
    }
}
