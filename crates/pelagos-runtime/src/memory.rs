//! Growable linear memory: `LinearMemory<const MAX_PAGES: u32>`.
//!
//! The region is a `Vec<u8>` whose length is the committed region,
//! `pages * PAGE_SIZE` bytes. Headroom lives in the vector's spare capacity,
//! reserved `capacity * PAGE_SIZE` bytes at a time, so most `memory.grow`
//! calls neither reallocate nor touch bytes outside the newly committed range.
//!
//! Capacity grows by `capacity / 2 + 8` pages per step until the request
//! fits, then is capped at `MAX_PAGES`. The ceiling check happens before any
//! allocation, and counters are written only after the storage resize has
//! succeeded, so a refused grow leaves the region untouched.
//!
//! Growth uses the **outline pattern**: the generic wrapper delegates
//! to the non-generic [`memory_grow`], which also serves translated code that
//! keeps the (storage, pages, capacity) triple in its own fields.

use alloc::vec::Vec;
use core::fmt;

use crate::access::{self, Unaligned};
use crate::{AccessError, ConstructionError, GrowError, GROW_FAILED, PAGE_CEILING, PAGE_SIZE};

/// Linear memory for a single translated module instance.
///
/// `MAX_PAGES` is the module's declared maximum, at most (and by default)
/// the 65536-page ceiling of a 32-bit address space.
#[derive(Clone)]
pub struct LinearMemory<const MAX_PAGES: u32 = PAGE_CEILING> {
    /// Backing storage; `storage.len() == pages * PAGE_SIZE` and the
    /// vector's allocation covers `capacity` pages.
    storage: Vec<u8>,
    /// Committed pages. Accesses beyond `pages * PAGE_SIZE` are outside
    /// the region.
    pages: u32,
    /// Allocated pages. Never decreases.
    capacity: u32,
}

impl<const MAX_PAGES: u32> LinearMemory<MAX_PAGES> {
    const MAX_PAGES_IN_RANGE: () = assert!(
        MAX_PAGES <= PAGE_CEILING,
        "MAX_PAGES exceeds the 65536-page address space"
    );

    /// An empty region: zero pages committed, nothing allocated.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::MAX_PAGES_IN_RANGE;
        Self {
            storage: Vec::new(),
            pages: 0,
            capacity: 0,
        }
    }

    /// Create a region with `initial_pages` committed and zeroed.
    ///
    /// # Errors
    /// - `MemoryInitialPagesExceedsMax` if `initial_pages > MAX_PAGES`.
    /// - `OutOfMemory` if the storage cannot be allocated.
    #[inline(never)]
    pub fn try_new(initial_pages: u32) -> Result<Self, ConstructionError> {
        let mut memory = Self::new();
        if initial_pages > MAX_PAGES {
            return Err(ConstructionError::MemoryInitialPagesExceedsMax {
                initial: initial_pages,
                max: MAX_PAGES,
            });
        }
        reserve_pages(&mut memory.storage, initial_pages).map_err(|_| {
            ConstructionError::OutOfMemory {
                pages: initial_pages,
            }
        })?;
        memory.storage.resize(initial_pages as usize * PAGE_SIZE, 0);
        memory.pages = initial_pages;
        memory.capacity = initial_pages;
        Ok(memory)
    }

    /// Current number of committed pages.
    #[inline(always)]
    pub fn page_count(&self) -> u32 {
        self.pages
    }

    /// Current number of allocated pages (`>= page_count()`).
    #[inline(always)]
    pub fn capacity_pages(&self) -> u32 {
        self.capacity
    }

    /// Current committed size in bytes.
    #[inline(always)]
    pub fn active_size(&self) -> usize {
        self.pages as usize * PAGE_SIZE
    }

    /// `memory.size`: current page count.
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.pages
    }

    /// `memory.grow`: returns the previous page count, or [`GROW_FAILED`].
    #[inline(always)]
    pub fn grow(&mut self, delta: u32) -> u32 {
        memory_grow(
            &mut self.storage,
            &mut self.pages,
            &mut self.capacity,
            delta,
            MAX_PAGES,
        )
    }

    /// `memory.grow` with the reason for a refusal.
    #[inline(always)]
    pub fn try_grow(&mut self, delta: u32) -> Result<u32, GrowError> {
        grow_inner(
            &mut self.storage,
            &mut self.pages,
            &mut self.capacity,
            delta,
            MAX_PAGES,
        )
    }

    /// Read-only access to the committed region.
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage
    }

    /// Mutable access to the committed region.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage
    }

    /// Unaligned native-endian load from the committed region.
    ///
    /// # Panics
    /// If `offset + T::WIDTH` exceeds `active_size()`.
    #[inline(always)]
    pub fn load<T: Unaligned>(&self, offset: usize) -> T {
        access::load(self.as_slice(), offset)
    }

    /// Unaligned native-endian store into the committed region.
    ///
    /// # Panics
    /// If `offset + T::WIDTH` exceeds `active_size()`.
    #[inline(always)]
    pub fn store<T: Unaligned>(&mut self, offset: usize, value: T) {
        access::store(self.as_mut_slice(), offset, value)
    }

    /// Copy a data segment into the committed region at `offset`.
    ///
    /// # Errors
    /// Returns `AccessError::OutOfBounds` if `offset + data.len()` exceeds
    /// `active_size()`.
    #[inline(always)]
    pub fn init_data(&mut self, offset: usize, data: &[u8]) -> Result<(), AccessError> {
        let active = self.active_size();
        init_data_inner(&mut self.storage, active, offset, data)
    }
}

impl<const MAX_PAGES: u32> Default for LinearMemory<MAX_PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MAX_PAGES: u32> fmt::Debug for LinearMemory<MAX_PAGES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearMemory")
            .field("pages", &self.pages)
            .field("capacity", &self.capacity)
            .field("max_pages", &MAX_PAGES)
            .finish()
    }
}

/// Capacity policy: grow `capacity` by `capacity / 2 + 8` pages until it
/// covers `required`, then cap at `max`.
///
/// Returns `capacity` unchanged (capped) when it already covers `required`.
/// The result is `>= required` whenever `required <= max`.
pub const fn next_capacity(capacity: u32, required: u32, max: u32) -> u32 {
    let mut cap = capacity as u64;
    while cap < required as u64 {
        cap += cap / 2 + 8;
    }
    if cap > max as u64 {
        max
    } else {
        cap as u32
    }
}

/// `memory.grow` over a caller-held (storage, pages, capacity) triple.
///
/// On success returns the previous page count, with `pages` advanced by
/// `delta` and the newly committed bytes zeroed. On failure returns
/// [`GROW_FAILED`] and leaves all three untouched.
///
/// `storage.len()` must equal `pages * PAGE_SIZE`; [`LinearMemory`]
/// maintains this. The vector's spare capacity is the headroom.
pub fn memory_grow(
    storage: &mut Vec<u8>,
    pages: &mut u32,
    capacity: &mut u32,
    delta: u32,
    max_pages: u32,
) -> u32 {
    grow_inner(storage, pages, capacity, delta, max_pages).unwrap_or_else(u32::from)
}

// ── Non-generic inner functions ─────────────────

#[inline(never)]
fn grow_inner(
    storage: &mut Vec<u8>,
    pages: &mut u32,
    capacity: &mut u32,
    delta: u32,
    max_pages: u32,
) -> Result<u32, GrowError> {
    let max_pages = max_pages.min(PAGE_CEILING);
    let old = *pages;
    let requested = old as u64 + delta as u64;
    if requested > max_pages as u64 {
        return Err(GrowError::ExceedsCeiling {
            requested,
            max: max_pages,
        });
    }
    let new_pages = requested as u32;

    let new_capacity = if *capacity < new_pages {
        next_capacity(*capacity, new_pages, max_pages)
    } else {
        *capacity
    };
    // No-op when the allocation already covers `new_capacity` pages.
    reserve_pages(storage, new_capacity)?;

    // Within the reservation: zeroes exactly the new range, never reallocates.
    storage.truncate(old as usize * PAGE_SIZE);
    storage.resize(new_pages as usize * PAGE_SIZE, 0);
    *capacity = new_capacity;
    *pages = new_pages;
    Ok(old)
}

/// Ensure the allocation behind `storage` holds `pages * PAGE_SIZE` bytes
/// without changing its length or contents. On failure `storage` is
/// unchanged.
fn reserve_pages(storage: &mut Vec<u8>, pages: u32) -> Result<(), GrowError> {
    let oom = GrowError::OutOfMemory { pages };
    let bytes = (pages as usize).checked_mul(PAGE_SIZE).ok_or(oom)?;
    let additional = bytes.saturating_sub(storage.len());
    storage.try_reserve_exact(additional).map_err(|_| oom)
}

#[inline(never)]
fn init_data_inner(
    storage: &mut [u8],
    active_bytes: usize,
    offset: usize,
    data: &[u8],
) -> Result<(), AccessError> {
    let end = offset
        .checked_add(data.len())
        .ok_or(AccessError::OutOfBounds)?;
    if end > active_bytes {
        return Err(AccessError::OutOfBounds);
    }
    storage
        .get_mut(offset..end)
        .ok_or(AccessError::OutOfBounds)?
        .copy_from_slice(data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Small ceilings keep test allocations to a few pages.
    type Mem = LinearMemory<4>;

    #[test]
    fn new_is_empty() {
        let mem = LinearMemory::<PAGE_CEILING>::new();
        assert_eq!(mem.page_count(), 0);
        assert_eq!(mem.capacity_pages(), 0);
        assert!(mem.as_slice().is_empty());
    }

    #[test]
    fn try_new_initializes_to_zero() {
        let mem = Mem::try_new(1).unwrap();
        assert_eq!(mem.page_count(), 1);
        assert_eq!(mem.capacity_pages(), 1);
        assert_eq!(mem.active_size(), PAGE_SIZE);
        assert!(mem.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn try_new_fails_if_initial_exceeds_max() {
        let result = Mem::try_new(5);
        assert!(matches!(
            result,
            Err(ConstructionError::MemoryInitialPagesExceedsMax { initial: 5, max: 4 })
        ));
    }

    // ── next_capacity ──

    #[test]
    fn capacity_grows_by_half_plus_eight() {
        assert_eq!(next_capacity(0, 1, PAGE_CEILING), 8);
        assert_eq!(next_capacity(8, 9, PAGE_CEILING), 20);
        assert_eq!(next_capacity(20, 21, PAGE_CEILING), 38);
        // Repeats until the request fits: 38 → 65 → 105.
        assert_eq!(next_capacity(38, 100, PAGE_CEILING), 105);
    }

    #[test]
    fn capacity_is_capped_at_max() {
        assert_eq!(next_capacity(0, 1, 4), 4);
        assert_eq!(next_capacity(60000, 65536, PAGE_CEILING), PAGE_CEILING);
    }

    #[test]
    fn capacity_already_sufficient_is_kept() {
        assert_eq!(next_capacity(10, 3, PAGE_CEILING), 10);
    }

    // ── grow ──

    #[test]
    fn grow_empty_by_one_page() {
        let mut mem = LinearMemory::<16>::new();
        assert_eq!(mem.grow(1), 0);
        assert_eq!(mem.page_count(), 1);
        // 0 → 8 pages of headroom
        assert_eq!(mem.capacity_pages(), 8);
        assert_eq!(mem.as_slice().len(), PAGE_SIZE);
        assert!(mem.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn grow_success_returns_old_size() {
        let mut mem = Mem::try_new(1).unwrap();
        assert_eq!(mem.grow(2), 1);
        assert_eq!(mem.page_count(), 3);
    }

    #[test]
    fn grow_to_max() {
        let mut mem = Mem::try_new(1).unwrap();
        assert_eq!(mem.grow(3), 1);
        assert_eq!(mem.page_count(), 4);
        assert_eq!(mem.capacity_pages(), 4);
    }

    #[test]
    fn grow_beyond_max_fails() {
        let mut mem = Mem::try_new(1).unwrap();
        mem.store::<u32>(0, 0xDEAD_BEEF);
        let base = mem.as_slice().as_ptr();
        assert_eq!(mem.grow(4), GROW_FAILED); // would be 5 pages > 4
        assert_eq!(mem.page_count(), 1);
        assert_eq!(mem.capacity_pages(), 1);
        assert_eq!(mem.as_slice().len(), PAGE_SIZE);
        assert_eq!(mem.as_slice().as_ptr(), base);
        assert_eq!(mem.load::<u32>(0), 0xDEAD_BEEF);
    }

    #[test]
    fn grow_beyond_ceiling_fails_without_allocating() {
        let mut mem = LinearMemory::<PAGE_CEILING>::new();
        assert_eq!(
            mem.try_grow(PAGE_CEILING + 1),
            Err(GrowError::ExceedsCeiling {
                requested: 65537,
                max: PAGE_CEILING
            })
        );
        assert_eq!(mem.capacity_pages(), 0);
        assert_eq!(mem.grow(u32::MAX), GROW_FAILED);
        assert_eq!(mem.page_count(), 0);
    }

    #[test]
    fn grow_zero_is_noop() {
        let mut mem = Mem::try_new(1).unwrap();
        assert_eq!(mem.grow(0), 1);
        assert_eq!(mem.page_count(), 1);
        assert_eq!(mem.capacity_pages(), 1);
    }

    #[test]
    fn grow_within_capacity_does_not_reallocate() {
        let mut mem = LinearMemory::<16>::new();
        mem.grow(1);
        let before = mem.as_slice().as_ptr();
        assert_eq!(mem.grow(6), 1);
        assert_eq!(mem.capacity_pages(), 8);
        assert_eq!(mem.as_slice().as_ptr(), before);
    }

    #[test]
    fn grow_commits_only_the_requested_bytes() {
        let mut mem = LinearMemory::<16>::new();
        assert_eq!(mem.grow(1), 0);
        assert_eq!(mem.storage.len(), PAGE_SIZE);
        assert!(mem.storage.capacity() >= 8 * PAGE_SIZE);
        assert_eq!(mem.grow(2), 1);
        assert_eq!(mem.storage.len(), 3 * PAGE_SIZE);
    }

    #[test]
    fn cloned_region_grows_within_reported_capacity() {
        let mut mem = LinearMemory::<16>::new();
        mem.grow(1);
        mem.store::<u16>(8, 0x1234);
        let mut copy = mem.clone();
        assert_eq!(copy.capacity_pages(), 8);
        assert_eq!(copy.grow(7), 1);
        assert_eq!(copy.page_count(), 8);
        assert!(copy.storage.capacity() >= 8 * PAGE_SIZE);
        assert_eq!(copy.load::<u16>(8), 0x1234);
        assert_eq!(mem.page_count(), 1);
    }

    #[test]
    fn grow_preserves_contents() {
        let mut mem = LinearMemory::<16>::try_new(1).unwrap();
        mem.store::<u32>(PAGE_SIZE - 4, 0xDEAD_BEEF);
        assert_eq!(mem.grow(2), 1); // reallocates 1 → 9
        assert_eq!(mem.capacity_pages(), 9);
        assert_eq!(mem.load::<u32>(PAGE_SIZE - 4), 0xDEAD_BEEF);
    }

    #[test]
    fn grow_zeroes_new_pages() {
        let mut mem = Mem::try_new(1).unwrap();
        mem.as_mut_slice().fill(0xAB);
        assert_eq!(mem.grow(1), 1);
        let flat = mem.as_slice();
        assert!(flat[..PAGE_SIZE].iter().all(|&b| b == 0xAB));
        assert!(flat[PAGE_SIZE..2 * PAGE_SIZE].iter().all(|&b| b == 0));
    }

    #[test]
    fn free_function_updates_triple_in_place() {
        let mut storage = Vec::new();
        let mut pages = 0;
        let mut capacity = 0;
        assert_eq!(memory_grow(&mut storage, &mut pages, &mut capacity, 2, 16), 0);
        assert_eq!((pages, capacity), (2, 8));
        assert_eq!(storage.len(), 2 * PAGE_SIZE);
        assert!(storage.capacity() >= 8 * PAGE_SIZE);
        assert_eq!(
            memory_grow(&mut storage, &mut pages, &mut capacity, 15, 16),
            GROW_FAILED
        );
        assert_eq!((pages, capacity), (2, 8));
    }

    #[test]
    fn max_pages_above_ceiling_is_clamped_in_free_function() {
        let mut storage = Vec::new();
        let mut pages = 0;
        let mut capacity = 0;
        assert_eq!(
            memory_grow(&mut storage, &mut pages, &mut capacity, 70000, u32::MAX),
            GROW_FAILED
        );
        assert!(storage.is_empty());
    }

    #[test]
    fn size_returns_page_count() {
        let mem = Mem::try_new(2).unwrap();
        assert_eq!(mem.size(), 2);
    }

    // ── load/store ──

    #[test]
    fn store_load_roundtrip() {
        let mut mem = Mem::try_new(1).unwrap();
        mem.store::<u64>(101, 0x0102_0304_0506_0708);
        assert_eq!(mem.load::<u64>(101), 0x0102_0304_0506_0708);
        mem.store::<u16>(PAGE_SIZE - 2, 0xBEEF);
        assert_eq!(mem.load::<u16>(PAGE_SIZE - 2), 0xBEEF);
    }

    #[test]
    #[should_panic]
    fn load_beyond_committed_panics() {
        let mem = LinearMemory::<16>::try_new(1).unwrap();
        let _ = mem.load::<u32>(PAGE_SIZE - 3);
    }

    // ── init_data ──

    #[test]
    fn init_data_writes_bytes() {
        let mut mem = Mem::try_new(1).unwrap();
        mem.init_data(10, &[1u8, 2, 3, 4]).unwrap();
        assert_eq!(&mem.as_slice()[10..14], &[1, 2, 3, 4]);
    }

    #[test]
    fn init_data_empty_slice_is_noop() {
        let mut mem = Mem::try_new(1).unwrap();
        assert!(mem.init_data(0, &[]).is_ok());
    }

    #[test]
    fn init_data_out_of_bounds() {
        let mut mem = Mem::try_new(1).unwrap();
        let data = [0u8; 10];
        assert_eq!(
            mem.init_data(PAGE_SIZE - 5, &data),
            Err(AccessError::OutOfBounds)
        );
        assert_eq!(mem.init_data(usize::MAX, &data), Err(AccessError::OutOfBounds));
    }

    #[test]
    fn init_data_respects_committed_not_capacity() {
        let mut mem = LinearMemory::<16>::new();
        mem.grow(1); // capacity 8, committed 1
        assert_eq!(mem.init_data(PAGE_SIZE, &[1]), Err(AccessError::OutOfBounds));
        assert!(mem.init_data(PAGE_SIZE - 1, &[1]).is_ok());
    }
}

// ── Kani Formal Verification Proofs ──────────────────────────────────────

#[cfg(kani)]
mod proofs {
    use super::*;

    /// Proof: the capacity policy covers every in-range request, never
    /// exceeds the ceiling, and never shrinks.
    #[kani::proof]
    #[kani::unwind(40)]
    fn next_capacity_covers_request() {
        let capacity: u32 = kani::any();
        let required: u32 = kani::any();
        kani::assume(capacity <= PAGE_CEILING);
        kani::assume(required <= PAGE_CEILING);
        let next = next_capacity(capacity, required, PAGE_CEILING);
        kani::assert(next >= required, "capacity covers the request");
        kani::assert(next >= capacity, "capacity never shrinks");
        kani::assert(next <= PAGE_CEILING, "capacity respects the ceiling");
    }

    /// Proof: a refused grow leaves the triple unchanged.
    #[kani::proof]
    #[kani::unwind(2)]
    fn grow_beyond_max_is_noop() {
        let mut storage = Vec::new();
        let mut pages = 0;
        let mut capacity = 0;
        let delta: u32 = kani::any();
        kani::assume(delta > 2);
        let result = memory_grow(&mut storage, &mut pages, &mut capacity, delta, 2);
        kani::assert(result == GROW_FAILED, "grow beyond max returns the sentinel");
        kani::assert(pages == 0 && capacity == 0, "failed grow leaves counters unchanged");
        kani::assert(storage.is_empty(), "failed grow leaves storage unchanged");
    }
}
