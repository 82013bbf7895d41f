//! Per-thread allocation accounting through a wrapping global allocator.
//!
//! Install [`CountingAllocator`] as the `#[global_allocator]` of the final
//! binary; the harness then reads the calling thread's counters around the
//! measured loop. Counting per thread keeps parallel test threads from
//! polluting each other.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

static INSTALLED: AtomicBool = AtomicBool::new(false);

struct Counters {
    allocations: Cell<u64>,
    bytes: Cell<u64>,
}

thread_local! {
    static COUNTERS: Counters = const {
        Counters {
            allocations: Cell::new(0),
            bytes: Cell::new(0),
        }
    };
}

fn record(size: usize) {
    // try_with fails only while the thread is being torn down
    let _ = COUNTERS.try_with(|c| {
        c.allocations.set(c.allocations.get() + 1);
        c.bytes.set(c.bytes.get() + size as u64);
    });
}

pub struct CountingAllocator<A = System> {
    inner: A,
}

impl CountingAllocator<System> {
    pub const fn system() -> Self {
        CountingAllocator { inner: System }
    }
}

impl<A> CountingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        CountingAllocator { inner }
    }
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for CountingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        INSTALLED.store(true, Ordering::Relaxed);
        record(layout.size());
        unsafe { self.inner.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        INSTALLED.store(true, Ordering::Relaxed);
        record(layout.size());
        unsafe { self.inner.alloc_zeroed(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { self.inner.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record(new_size);
        unsafe { self.inner.realloc(ptr, layout, new_size) }
    }
}

/// Returns true once a [`CountingAllocator`] has served an allocation in this
/// process, i.e. it is installed as the global allocator.
pub fn is_active() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

/// Cumulative allocation counters of the current thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocSnapshot {
    pub allocations: u64,
    pub bytes: u64,
}

impl AllocSnapshot {
    pub fn now() -> Self {
        COUNTERS
            .try_with(|c| AllocSnapshot {
                allocations: c.allocations.get(),
                bytes: c.bytes.get(),
            })
            .unwrap_or_default()
    }

    pub fn since(&self, earlier: &AllocSnapshot) -> AllocSnapshot {
        AllocSnapshot {
            allocations: self.allocations.saturating_sub(earlier.allocations),
            bytes: self.bytes.saturating_sub(earlier.bytes),
        }
    }

    /// Integer average over `n` operations, zero when `n` is zero.
    pub fn per_op(&self, n: u64) -> AllocSnapshot {
        if n == 0 {
            return AllocSnapshot::default();
        }
        AllocSnapshot {
            allocations: self.allocations / n,
            bytes: self.bytes / n,
        }
    }
}

/// Runs `f` and returns its result with the allocations it made on this thread.
pub fn count<F, R>(f: F) -> (R, AllocSnapshot)
where
    F: FnOnce() -> R,
{
    let before = AllocSnapshot::now();
    let result = f();
    let delta = AllocSnapshot::now().since(&before);
    (result, delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The unit-test build installs CountingAllocator in lib.rs.

    #[test]
    fn test_installed_in_test_build() {
        let _v: Vec<u8> = Vec::with_capacity(16);
        assert!(is_active());
    }

    #[test]
    fn test_count_single_allocation() {
        let (v, delta) = count(|| Vec::<u64>::with_capacity(4));
        assert_eq!(delta.allocations, 1);
        assert_eq!(delta.bytes, 32);
        drop(v);
    }

    #[test]
    fn test_count_nothing() {
        let ((), delta) = count(|| {
            let x = std::hint::black_box(1 + 1);
            assert_eq!(x, 2);
        });
        assert_eq!(delta, AllocSnapshot::default());
    }

    #[test]
    fn test_realloc_counts() {
        let mut v: Vec<u8> = Vec::with_capacity(1);
        let ((), delta) = count(|| v.reserve_exact(1024));
        assert_eq!(delta.allocations, 1);
        assert!(delta.bytes >= 1024);
    }

    #[test]
    fn test_per_op() {
        let total = AllocSnapshot {
            allocations: 30,
            bytes: 1000,
        };
        assert_eq!(
            total.per_op(10),
            AllocSnapshot {
                allocations: 3,
                bytes: 100
            }
        );
        assert_eq!(total.per_op(0), AllocSnapshot::default());
    }
}
