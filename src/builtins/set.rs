//! Set type - open-addressing hash table with tombstone deletion
//!
//! Design: One table array of power-of-two capacity so index masking
//! replaces modulo. Each table slot is EMPTY (never occupied), DELETED
//! (tombstone: formerly occupied, skipped by lookups but not
//! probe-terminating) or LIVE.
//!
//! - lookup probes linearly from `hash & (capacity - 1)` until an EMPTY
//!   slot (absent) or an equal LIVE slot (present)
//! - insertion reuses the first DELETED/EMPTY slot seen on the probe
//!   path, so long-lived tables do not strand capacity behind tombstone
//!   clusters
//! - the table doubles and rehashes at 75% load, which also evicts all
//!   tombstones and bounds worst-case probe length
//!
//! Elements hash/compare either as raw 64-bit words or through an
//! operation table (strings, tuples, user hashables); a zero table
//! handle on the by-tag entry points means raw.

use core::ptr;

use crate::builtins::str::Str;
use crate::exc::{raise, ExcKind};
use crate::mem;
use crate::ops::OpsRef;
use crate::slot::Slot;

use super::list::List;

const EMPTY: u8 = 0;
const DELETED: u8 = 1;
const LIVE: u8 = 2;

const INITIAL_CAPACITY: i64 = 16;

/// One table slot: element word plus occupancy state.
#[repr(C)]
#[derive(Clone, Copy)]
struct TableSlot {
    value: Slot,
    state: u8,
}

/// Hash set over one open-addressed table array.
///
/// Invariants: `len` counts LIVE slots; `capacity` is 0 or a power of
/// two; rehash triggers when `len * 4 >= capacity * 3`.
#[repr(C)]
pub struct Set {
    len: i64,
    capacity: i64,
    table: *mut TableSlot,
}

enum Probe {
    /// Equal LIVE element at this table index
    Found(i64),
    /// Absent; best insertion index on the probe path
    Missing(i64),
}

impl Set {
    pub fn empty() -> *mut Set {
        mem::alloc_value(Set { len: 0, capacity: 0, table: ptr::null_mut() }).as_ptr()
    }

    #[inline]
    pub fn len(&self) -> i64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn slot_at(&self, idx: i64) -> &TableSlot {
        unsafe { &*self.table.add(idx as usize) }
    }

    #[inline]
    fn slot_at_mut(&mut self, idx: i64) -> &mut TableSlot {
        unsafe { &mut *self.table.add(idx as usize) }
    }

    fn hash_of(value: Slot, ops: Option<OpsRef>) -> i64 {
        match ops {
            None => crate::ops::raw_hash(value),
            Some(ops) => ops.hash(value),
        }
    }

    fn values_equal(a: Slot, b: Slot, ops: Option<OpsRef>) -> bool {
        match ops {
            None => crate::ops::raw_eq(a, b),
            Some(ops) => ops.eq(a, b),
        }
    }

    /// Linear probe from the hash slot. DELETED slots are skipped for
    /// lookup but the first one seen is remembered as the insertion
    /// point. The walk is bounded by `capacity` so a table with no
    /// EMPTY slot (all LIVE/DELETED) still terminates.
    fn probe(&self, value: Slot, ops: Option<OpsRef>) -> Probe {
        debug_assert!(self.capacity > 0);
        let mask = self.capacity - 1;
        let mut idx = Self::hash_of(value, ops) & mask;
        let mut first_tombstone: Option<i64> = None;

        for _ in 0..self.capacity {
            let slot = self.slot_at(idx);
            match slot.state {
                EMPTY => return Probe::Missing(first_tombstone.unwrap_or(idx)),
                DELETED => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(idx);
                    }
                }
                _ => {
                    if Self::values_equal(slot.value, value, ops) {
                        return Probe::Found(idx);
                    }
                }
            }
            idx = (idx + 1) & mask;
        }
        Probe::Missing(first_tombstone.unwrap_or(0))
    }

    fn alloc_table(capacity: i64) -> *mut TableSlot {
        // Zeroed allocation: state 0 is EMPTY
        mem::alloc_zeroed(capacity * core::mem::size_of::<TableSlot>() as i64).as_ptr()
            as *mut TableSlot
    }

    /// Double the table (or create the initial one) and reinsert every
    /// LIVE element. Tombstones do not survive a rehash; the old array
    /// goes back through the facade.
    fn rehash(&mut self, new_capacity: i64, ops: Option<OpsRef>) {
        debug_assert!(new_capacity.count_ones() == 1);
        let old_table = self.table;
        let old_capacity = self.capacity;

        self.table = Self::alloc_table(new_capacity);
        self.capacity = new_capacity;

        let mask = new_capacity - 1;
        for i in 0..old_capacity {
            let slot = unsafe { &*old_table.add(i as usize) };
            if slot.state != LIVE {
                continue;
            }
            // Fresh table has no tombstones: walk to the first EMPTY
            let mut idx = Self::hash_of(slot.value, ops) & mask;
            while self.slot_at(idx).state == LIVE {
                idx = (idx + 1) & mask;
            }
            *self.slot_at_mut(idx) = TableSlot { value: slot.value, state: LIVE };
        }

        unsafe { mem::release(old_table as *mut u8) };
    }

    /// Growth policy, applied before any insertion that might increase
    /// `len`: capacity 0 initializes to 16; at 75% load the table
    /// doubles.
    fn ensure_room(&mut self, ops: Option<OpsRef>) {
        if self.capacity == 0 {
            self.table = Self::alloc_table(INITIAL_CAPACITY);
            self.capacity = INITIAL_CAPACITY;
        } else if self.len * 4 >= self.capacity * 3 {
            self.rehash(self.capacity * 2, ops);
        }
    }

    /* ── core operations ─────────────────────────────────────────── */

    pub fn add(&mut self, value: Slot, ops: Option<OpsRef>) {
        self.ensure_room(ops);
        match self.probe(value, ops) {
            Probe::Found(_) => {}
            Probe::Missing(idx) => {
                *self.slot_at_mut(idx) = TableSlot { value, state: LIVE };
                self.len += 1;
            }
        }
    }

    pub fn contains(&self, value: Slot, ops: Option<OpsRef>) -> bool {
        if self.capacity == 0 {
            return false;
        }
        matches!(self.probe(value, ops), Probe::Found(_))
    }

    /// Remove; raises KeyError when the value is absent.
    pub fn remove(&mut self, value: Slot, ops: Option<OpsRef>) {
        if !self.discard(value, ops) {
            raise(ExcKind::KeyError, "value not found");
        }
    }

    /// Remove if present; never raises. Returns whether a removal
    /// happened. The slot becomes a tombstone; no rehash.
    pub fn discard(&mut self, value: Slot, ops: Option<OpsRef>) -> bool {
        if self.capacity == 0 {
            return false;
        }
        match self.probe(value, ops) {
            Probe::Found(idx) => {
                self.slot_at_mut(idx).state = DELETED;
                self.len -= 1;
                true
            }
            Probe::Missing(_) => false,
        }
    }

    /// Remove and return an arbitrary element: the first LIVE slot in
    /// table order. Raises KeyError on an empty set.
    pub fn pop(&mut self) -> Slot {
        if self.len == 0 {
            raise(ExcKind::KeyError, "pop from empty set");
        }
        for idx in 0..self.capacity {
            if self.slot_at(idx).state == LIVE {
                let out = self.slot_at(idx).value;
                self.slot_at_mut(idx).state = DELETED;
                self.len -= 1;
                return out;
            }
        }
        unreachable!("len > 0 with no live slot");
    }

    pub fn clear(&mut self) {
        for idx in 0..self.capacity {
            self.slot_at_mut(idx).state = EMPTY;
        }
        self.len = 0;
    }

    /// Visit every LIVE element in table-slot order.
    pub fn iter(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.capacity).filter_map(|idx| {
            let slot = self.slot_at(idx);
            (slot.state == LIVE).then_some(slot.value)
        })
    }

    /// Materialize the LIVE elements in table-slot order.
    pub fn to_list(&self) -> *mut List {
        let out = List::empty();
        for v in self.iter() {
            unsafe { (*out).append(v) };
        }
        out
    }

    /// Fresh set with the same elements (rebuilt, so tombstones are
    /// not carried over).
    pub fn copy(&self, ops: Option<OpsRef>) -> *mut Set {
        let out = Set::empty();
        for v in self.iter() {
            unsafe { (*out).add(v, ops) };
        }
        out
    }

    /* ── algebra ─────────────────────────────────────────────────── */

    pub fn union(&self, other: &Set, ops: Option<OpsRef>) -> *mut Set {
        let out = self.copy(ops);
        for v in other.iter() {
            unsafe { (*out).add(v, ops) };
        }
        out
    }

    pub fn intersection(&self, other: &Set, ops: Option<OpsRef>) -> *mut Set {
        let out = Set::empty();
        for v in self.iter() {
            if other.contains(v, ops) {
                unsafe { (*out).add(v, ops) };
            }
        }
        out
    }

    pub fn difference(&self, other: &Set, ops: Option<OpsRef>) -> *mut Set {
        let out = Set::empty();
        for v in self.iter() {
            if !other.contains(v, ops) {
                unsafe { (*out).add(v, ops) };
            }
        }
        out
    }

    pub fn symmetric_difference(&self, other: &Set, ops: Option<OpsRef>) -> *mut Set {
        let out = self.difference(other, ops);
        for v in other.iter() {
            if !self.contains(v, ops) {
                unsafe { (*out).add(v, ops) };
            }
        }
        out
    }

    /// Swap in a freshly built table, releasing the replaced array.
    fn replace_with(&mut self, new: *mut Set) {
        unsafe {
            mem::release(self.table as *mut u8);
            self.len = (*new).len;
            self.capacity = (*new).capacity;
            self.table = (*new).table;
        }
    }

    // The in-place variants take raw pointers: a self-aliased update
    // (`s |= s` and friends) must be detected before iterating a table
    // that the mutation side may be rehashing.

    /// In-place union. Self-aliased update is a no-op.
    pub fn update(dst: *mut Set, src: *const Set, ops: Option<OpsRef>) {
        if ptr::eq(dst as *const Set, src) {
            return;
        }
        unsafe {
            for v in (*src).iter() {
                (*dst).add(v, ops);
            }
        }
    }

    /// In-place intersection. Self-aliased update is a no-op.
    pub fn intersection_update(dst: *mut Set, src: *const Set, ops: Option<OpsRef>) {
        if ptr::eq(dst as *const Set, src) {
            return;
        }
        unsafe {
            let fresh = (*dst).intersection(&*src, ops);
            (*dst).replace_with(fresh);
        }
    }

    /// In-place difference. Self-aliased update empties the set.
    pub fn difference_update(dst: *mut Set, src: *const Set, ops: Option<OpsRef>) {
        unsafe {
            if ptr::eq(dst as *const Set, src) {
                (*dst).clear();
                return;
            }
            let fresh = (*dst).difference(&*src, ops);
            (*dst).replace_with(fresh);
        }
    }

    /// In-place symmetric difference. Self-aliased update empties the
    /// set.
    pub fn symmetric_difference_update(dst: *mut Set, src: *const Set, ops: Option<OpsRef>) {
        unsafe {
            if ptr::eq(dst as *const Set, src) {
                (*dst).clear();
                return;
            }
            let fresh = (*dst).symmetric_difference(&*src, ops);
            (*dst).replace_with(fresh);
        }
    }

    /* ── relational tests ────────────────────────────────────────── */

    pub fn isdisjoint(&self, other: &Set, ops: Option<OpsRef>) -> bool {
        // Scan the smaller operand against the larger
        let (small, large) = if self.len <= other.len { (self, other) } else { (other, self) };
        small.iter().all(|v| !large.contains(v, ops))
    }

    pub fn issubset(&self, other: &Set, ops: Option<OpsRef>) -> bool {
        self.iter().all(|v| other.contains(v, ops))
    }

    pub fn issuperset(&self, other: &Set, ops: Option<OpsRef>) -> bool {
        other.issubset(self, ops)
    }

    pub fn eq(&self, other: &Set, ops: Option<OpsRef>) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        self.len == other.len && self.issubset(other, ops)
    }

    /// Strict subset: proper containment requires both a smaller
    /// cardinality and subset membership.
    pub fn lt(&self, other: &Set, ops: Option<OpsRef>) -> bool {
        self.len < other.len && self.issubset(other, ops)
    }

    pub fn le(&self, other: &Set, ops: Option<OpsRef>) -> bool {
        self.issubset(other, ops)
    }

    pub fn gt(&self, other: &Set, ops: Option<OpsRef>) -> bool {
        other.lt(self, ops)
    }

    pub fn ge(&self, other: &Set, ops: Option<OpsRef>) -> bool {
        other.issubset(self, ops)
    }

    /* ── stringification ─────────────────────────────────────────── */

    /// "{e1, e2}" with elements rendered through the table; the empty
    /// set prints as "set()".
    pub fn to_str(&self, ops: OpsRef) -> *mut Str {
        if self.is_empty() {
            return Str::from_rust("set()");
        }
        let mut out = String::from("{");
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(unsafe { (*ops.stringify(v)).as_str() });
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
pub extern "C" fn vesper_set_empty() -> *mut Set {
    Set::empty()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_len(s: *const Set) -> i64 {
    (*s).len()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_add(s: *mut Set, value: Slot) {
    (*s).add(value, None)
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_add_by_tag(s: *mut Set, value: Slot, ops: i64) {
    (*s).add(value, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_contains(s: *const Set, value: Slot) -> i64 {
    (*s).contains(value, None) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_contains_by_tag(s: *const Set, value: Slot, ops: i64) -> i64 {
    (*s).contains(value, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_set_remove(s: *mut Set, value: Slot) {
    (*s).remove(value, None)
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_set_remove_by_tag(s: *mut Set, value: Slot, ops: i64) {
    (*s).remove(value, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_discard(s: *mut Set, value: Slot) {
    (*s).discard(value, None);
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_discard_by_tag(s: *mut Set, value: Slot, ops: i64) {
    (*s).discard(value, ops_of(ops));
}

#[no_mangle]
pub unsafe extern "C-unwind" fn vesper_set_pop(s: *mut Set) -> Slot {
    (*s).pop()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_clear(s: *mut Set) {
    (*s).clear()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_copy(s: *const Set, ops: i64) -> *mut Set {
    (*s).copy(ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_to_list(s: *const Set) -> *mut List {
    (*s).to_list()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_eq(a: *const Set, b: *const Set, ops: i64) -> i64 {
    (*a).eq(&*b, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_union(a: *const Set, b: *const Set, ops: i64) -> *mut Set {
    (*a).union(&*b, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_intersection(a: *const Set, b: *const Set, ops: i64) -> *mut Set {
    (*a).intersection(&*b, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_difference(a: *const Set, b: *const Set, ops: i64) -> *mut Set {
    (*a).difference(&*b, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_symmetric_difference(
    a: *const Set,
    b: *const Set,
    ops: i64,
) -> *mut Set {
    (*a).symmetric_difference(&*b, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_update(dst: *mut Set, src: *const Set, ops: i64) {
    Set::update(dst, src, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_intersection_update(dst: *mut Set, src: *const Set, ops: i64) {
    Set::intersection_update(dst, src, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_difference_update(dst: *mut Set, src: *const Set, ops: i64) {
    Set::difference_update(dst, src, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_symmetric_difference_update(
    dst: *mut Set,
    src: *const Set,
    ops: i64,
) {
    Set::symmetric_difference_update(dst, src, ops_of(ops))
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_isdisjoint(a: *const Set, b: *const Set, ops: i64) -> i64 {
    (*a).isdisjoint(&*b, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_issubset(a: *const Set, b: *const Set, ops: i64) -> i64 {
    (*a).issubset(&*b, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_issuperset(a: *const Set, b: *const Set, ops: i64) -> i64 {
    (*a).issuperset(&*b, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_lt(a: *const Set, b: *const Set, ops: i64) -> i64 {
    (*a).lt(&*b, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_le(a: *const Set, b: *const Set, ops: i64) -> i64 {
    (*a).le(&*b, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_gt(a: *const Set, b: *const Set, ops: i64) -> i64 {
    (*a).gt(&*b, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_ge(a: *const Set, b: *const Set, ops: i64) -> i64 {
    (*a).ge(&*b, ops_of(ops)) as i64
}

#[no_mangle]
pub unsafe extern "C" fn vesper_set_str_by_tag(s: *const Set, ops: i64) -> *mut Str {
    match ops_of(ops) {
        Some(ops) => (*s).to_str(ops),
        None => Str::from_rust("{...}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exc::{catch, ExcKind};
    use crate::ops::{OpsRef, STR_OPS};

    fn set_of(values: &[i64]) -> &'static mut Set {
        let s = unsafe { &mut *Set::empty() };
        for v in values {
            s.add(Slot::from_int(*v), None);
        }
        s
    }

    fn sorted_values(s: &Set) -> Vec<i64> {
        let mut out: Vec<i64> = s.iter().map(|v| v.as_int()).collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn test_add_contains_len() {
        let s = set_of(&[1, 2, 3, 2]);
        assert_eq!(s.len(), 3);
        assert!(s.contains(Slot::from_int(2), None));
        assert!(!s.contains(Slot::from_int(4), None));
    }

    #[test]
    fn test_empty_set_contains_nothing() {
        let s = unsafe { &*Set::empty() };
        assert!(!s.contains(Slot::from_int(0), None));
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn test_initial_capacity_is_16() {
        let s = set_of(&[1]);
        assert_eq!(s.capacity, 16);
    }

    #[test]
    fn test_growth_keeps_capacity_power_of_two() {
        let s = unsafe { &mut *Set::empty() };
        for i in 0..1000 {
            s.add(Slot::from_int(i), None);
        }
        assert_eq!(s.len(), 1000);
        assert_eq!(s.capacity.count_ones(), 1);
        // 75% load bound holds after the growth check ran
        assert!(s.len * 4 <= s.capacity * 3);
        for i in 0..1000 {
            assert!(s.contains(Slot::from_int(i), None));
        }
    }

    #[test]
    fn test_remove_and_discard() {
        let s = set_of(&[1, 2]);
        s.remove(Slot::from_int(1), None);
        assert_eq!(s.len(), 1);
        let err = catch(|| s.remove(Slot::from_int(1), None)).unwrap_err();
        assert_eq!(err.kind, ExcKind::KeyError);
        assert!(err.matches(ExcKind::LookupError));

        // discard never raises
        assert!(!s.discard(Slot::from_int(1), None));
        assert!(s.discard(Slot::from_int(2), None));
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn test_pop() {
        let s = set_of(&[42]);
        assert_eq!(s.pop().as_int(), 42);
        let err = catch(|| s.pop()).unwrap_err();
        assert_eq!(err.kind, ExcKind::KeyError);
    }

    #[test]
    fn test_tombstone_churn() {
        // Insert N, remove all, insert N different: originals absent,
        // replacements present, regardless of tombstone bookkeeping.
        let s = unsafe { &mut *Set::empty() };
        for i in 0..100 {
            s.add(Slot::from_int(i), None);
        }
        for i in 0..100 {
            s.remove(Slot::from_int(i), None);
        }
        assert_eq!(s.len(), 0);
        for i in 100..200 {
            s.add(Slot::from_int(i), None);
        }
        assert_eq!(s.len(), 100);
        for i in 0..100 {
            assert!(!s.contains(Slot::from_int(i), None));
        }
        for i in 100..200 {
            assert!(s.contains(Slot::from_int(i), None));
        }
    }

    #[test]
    fn test_tombstone_reuse_on_insert() {
        let s = set_of(&[7]);
        s.remove(Slot::from_int(7), None);
        // Re-adding lands on the tombstone, not behind it
        s.add(Slot::from_int(7), None);
        assert_eq!(s.len(), 1);
        assert!(s.contains(Slot::from_int(7), None));
    }

    #[test]
    fn test_copy_is_independent() {
        let s = set_of(&[1, 2]);
        let c = unsafe { &mut *s.copy(None) };
        c.add(Slot::from_int(3), None);
        c.remove(Slot::from_int(1), None);
        assert_eq!(sorted_values(s), vec![1, 2]);
        assert_eq!(sorted_values(c), vec![2, 3]);
    }

    #[test]
    fn test_algebra() {
        let a = set_of(&[1, 2, 3]);
        let b = set_of(&[2]);
        assert_eq!(sorted_values(unsafe { &*a.difference(b, None) }), vec![1, 3]);
        assert_eq!(sorted_values(unsafe { &*a.intersection(b, None) }), vec![2]);
        assert_eq!(sorted_values(unsafe { &*b.union(set_of(&[4]), None) }), vec![2, 4]);
        assert_eq!(
            sorted_values(unsafe { &*a.symmetric_difference(set_of(&[3, 4]), None) }),
            vec![1, 2, 4]
        );
    }

    #[test]
    fn test_relational() {
        let small = set_of(&[1, 2]);
        let big = set_of(&[1, 2, 3]);
        assert!(small.issubset(big, None));
        assert!(big.issuperset(small, None));
        assert!(small.lt(big, None));
        assert!(!big.lt(small, None));
        assert!(small.le(small, None));
        // Strict subset needs a strictly smaller cardinality
        assert!(!small.lt(small, None));
        assert!(big.gt(small, None));
        assert!(big.ge(big, None));

        assert!(set_of(&[1, 2]).isdisjoint(set_of(&[3, 4]), None));
        assert!(!set_of(&[1, 2]).isdisjoint(set_of(&[2, 3]), None));
    }

    #[test]
    fn test_eq_ignores_insertion_history() {
        let a = set_of(&[1, 2, 3]);
        let b = set_of(&[3, 2, 1]);
        assert!(a.eq(b, None));
        b.remove(Slot::from_int(1), None);
        assert!(!a.eq(b, None));
    }

    #[test]
    fn test_in_place_updates() {
        let s = set_of(&[1, 2, 3]);
        Set::difference_update(s, set_of(&[2]), None);
        assert_eq!(sorted_values(s), vec![1, 3]);

        Set::update(s, set_of(&[5]), None);
        assert_eq!(sorted_values(s), vec![1, 3, 5]);

        Set::intersection_update(s, set_of(&[3, 5, 9]), None);
        assert_eq!(sorted_values(s), vec![3, 5]);

        Set::symmetric_difference_update(s, set_of(&[5, 7]), None);
        assert_eq!(sorted_values(s), vec![3, 7]);
    }

    #[test]
    fn test_self_aliased_updates() {
        let s = set_of(&[1, 2]);
        let p = s as *mut Set;
        Set::update(p, p, None);
        assert_eq!(s.len(), 2);
        Set::intersection_update(p, p, None);
        assert_eq!(s.len(), 2);
        Set::difference_update(p, p, None);
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn test_by_tag_strings() {
        let ops = unsafe { OpsRef::from_handle(OpsRef::handle(&STR_OPS)) };
        let s = unsafe { &mut *Set::empty() };
        s.add(Slot::from_ptr(Str::from_rust("spam")), ops);
        s.add(Slot::from_ptr(Str::from_rust("spam")), ops);
        s.add(Slot::from_ptr(Str::from_rust("eggs")), ops);
        assert_eq!(s.len(), 2);
        assert!(s.contains(Slot::from_ptr(Str::from_rust("spam")), ops));
        assert!(!s.contains(Slot::from_ptr(Str::from_rust("ham")), ops));
        s.remove(Slot::from_ptr(Str::from_rust("spam")), ops);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_to_str() {
        let int_ops = unsafe { OpsRef::from_handle(OpsRef::handle(&crate::ops::INT_OPS)) }.unwrap();
        let empty = unsafe { &*Set::empty() };
        assert_eq!(unsafe { (*empty.to_str(int_ops)).as_str() }, "set()");

        let s = set_of(&[5]);
        assert_eq!(unsafe { (*s.to_str(int_ops)).as_str() }, "{5}");
    }
}
