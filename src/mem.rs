//! Allocator facade - single gateway between containers and the collector
//!
//! Design: The runtime's memory strategy (tracing collector vs. batch
//! freeing) lives behind this facade and must stay opaque to containers:
//! - `alloc` for pointer-carrying regions, `alloc_atomic` for pointer-free
//! - `release` is always safe to call, even when the strategy ignores it
//! - allocation failure is fatal, never a catchable error
//!
//! Containers call `alloc`/`release` symmetrically around their own
//! resizing (freeing the old backing array after a grow/rehash) so that
//! both collector strategies work unmodified.

use core::ptr::NonNull;
use std::alloc::Layout;
use std::sync::atomic::{AtomicU64, Ordering};

/// Block header prefixed before every facade allocation (16 bytes).
///
/// Records the full layout so `release` can reconstruct it without the
/// caller carrying a size around.
#[repr(C, align(8))]
struct BlockHeader {
    size: u64,
    atomic: u64,
}

const HEADER_SIZE: usize = core::mem::size_of::<BlockHeader>();
const BLOCK_ALIGN: usize = 8;

static ALLOCATED_BYTES: AtomicU64 = AtomicU64::new(0);
static LIVE_BLOCKS: AtomicU64 = AtomicU64::new(0);
static RELEASED_BLOCKS: AtomicU64 = AtomicU64::new(0);

fn oom(size: i64) -> ! {
    // Not raised through the exception channel: a runtime that cannot
    // obtain memory cannot safely continue in any state.
    eprintln!("MemoryError: allocation failed ({size} bytes)");
    std::process::exit(1);
}

fn alloc_block(size: i64, atomic: bool, zeroed: bool) -> NonNull<u8> {
    let payload = if size > 0 { size as usize } else { 1 };
    let layout = match Layout::from_size_align(HEADER_SIZE + payload, BLOCK_ALIGN) {
        Ok(l) => l,
        Err(_) => oom(size),
    };

    let base = unsafe {
        if zeroed {
            std::alloc::alloc_zeroed(layout)
        } else {
            std::alloc::alloc(layout)
        }
    };
    if base.is_null() {
        oom(size);
    }

    unsafe {
        (base as *mut BlockHeader).write(BlockHeader {
            size: layout.size() as u64,
            atomic: atomic as u64,
        });
    }

    ALLOCATED_BYTES.fetch_add(layout.size() as u64, Ordering::Relaxed);
    LIVE_BLOCKS.fetch_add(1, Ordering::Relaxed);
    tracing::trace!(event = "allocation", size_bytes = size, atomic, "memory allocated");

    // Data starts right after the header
    unsafe { NonNull::new_unchecked(base.add(HEADER_SIZE)) }
}

/// Allocate `size` bytes of collector-managed memory.
///
/// Never returns null: failure terminates the process with a fatal
/// out-of-memory diagnostic.
pub fn alloc(size: i64) -> NonNull<u8> {
    alloc_block(size, false, false)
}

/// Allocate `size` bytes known to hold no pointers (strings, bytes).
///
/// Same contract as [`alloc`]; the pointer-free hint lets a scanning
/// collector skip the region.
pub fn alloc_atomic(size: i64) -> NonNull<u8> {
    alloc_block(size, true, false)
}

/// Allocate `size` zero-initialized bytes.
pub fn alloc_zeroed(size: i64) -> NonNull<u8> {
    alloc_block(size, false, true)
}

/// Heap-allocate a single value through the facade.
pub fn alloc_value<T>(value: T) -> NonNull<T> {
    let ptr = alloc(core::mem::size_of::<T>() as i64).cast::<T>();
    unsafe { ptr.as_ptr().write(value) };
    ptr
}

/// Return a facade allocation to the strategy.
///
/// Safe to call under strategies that reclaim automatically (where it
/// degrades to bookkeeping). Null is tolerated.
///
/// # Safety
/// `ptr` must have come from this facade and not have been released yet.
pub unsafe fn release(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    let base = ptr.sub(HEADER_SIZE);
    let header = &*(base as *const BlockHeader);
    let layout = Layout::from_size_align_unchecked(header.size as usize, BLOCK_ALIGN);

    LIVE_BLOCKS.fetch_sub(1, Ordering::Relaxed);
    RELEASED_BLOCKS.fetch_add(1, Ordering::Relaxed);
    tracing::trace!(event = "release", size_bytes = header.size, "memory released");

    std::alloc::dealloc(base, layout);
}

/// Facade statistics for diagnostics and tests.
#[derive(Debug, Clone, Copy)]
pub struct MemStats {
    pub allocated_bytes: u64,
    pub live_blocks: u64,
    pub released_blocks: u64,
}

/// Snapshot the running allocation counters.
pub fn stats() -> MemStats {
    MemStats {
        allocated_bytes: ALLOCATED_BYTES.load(Ordering::Relaxed),
        live_blocks: LIVE_BLOCKS.load(Ordering::Relaxed),
        released_blocks: RELEASED_BLOCKS.load(Ordering::Relaxed),
    }
}

/// C FFI exports
#[no_mangle]
pub extern "C" fn vesper_alloc(size: i64) -> *mut u8 {
    alloc(size).as_ptr()
}

#[no_mangle]
pub extern "C" fn vesper_alloc_atomic(size: i64) -> *mut u8 {
    alloc_atomic(size).as_ptr()
}

#[no_mangle]
pub unsafe extern "C" fn vesper_release(ptr: *mut u8) {
    release(ptr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_release_roundtrip() {
        let ptr = alloc(64);
        assert!(stats().live_blocks >= 1);
        unsafe {
            ptr.as_ptr().write_bytes(0xAB, 64);
            release(ptr.as_ptr());
        }
    }

    #[test]
    fn test_zero_size_alloc_is_valid() {
        let ptr = alloc(0);
        unsafe { release(ptr.as_ptr()) };
    }

    #[test]
    fn test_alloc_zeroed() {
        let ptr = alloc_zeroed(32);
        unsafe {
            let slice = core::slice::from_raw_parts(ptr.as_ptr(), 32);
            assert!(slice.iter().all(|&b| b == 0));
            release(ptr.as_ptr());
        }
    }

    #[test]
    fn test_release_null_is_noop() {
        unsafe { release(core::ptr::null_mut()) };
    }

    #[test]
    fn test_alignment() {
        let ptr = alloc_atomic(24);
        assert_eq!(ptr.as_ptr() as usize % 8, 0);
        unsafe { release(ptr.as_ptr()) };
    }
}
