//! Contract tests for both arena variants
//!
//! Exercises the allocation discipline both variants promise: monotonic
//! non-overlapping allocations, padded accounting across growth boundaries,
//! flush-time memory reuse, and alignment guarantees.

use linear_arena::{
    ArenaAllocate, ArenaConfig, BufferArena, MemoryUsage, RegionArena,
};

#[test]
fn buffer_arena_pointers_are_monotonic_and_disjoint() {
    let arena = BufferArena::with_capacity(1024).expect("failed to create arena");

    let mut previous_end = 0usize;
    for size in [16usize, 8, 32, 64, 4] {
        let offset = arena.alloc(size).unwrap();
        assert!(offset.get() >= previous_end, "allocations must not overlap");
        previous_end = offset.get() + size;
    }
    assert_eq!(arena.used(), 16 + 8 + 32 + 64 + 4);
}

#[test]
fn region_arena_pointers_are_monotonic_and_disjoint() {
    let arena = RegionArena::with_capacity(1024).expect("failed to create arena");

    let mut previous_end = 0usize;
    for size in [16usize, 8, 32, 64, 4] {
        let ptr = arena.alloc(size).unwrap().as_ptr() as usize;
        assert!(ptr >= previous_end, "allocations must not overlap");
        previous_end = ptr + size;
    }
    assert_eq!(arena.total(), 16 + 8 + 32 + 64 + 4);
}

#[test]
fn counters_hold_across_growth_boundaries() {
    let config = ArenaConfig::default().with_initial_size(128);
    let arena = BufferArena::with_config(config).unwrap();

    let mut expected = 0usize;
    for size in [100usize, 100, 100, 500] {
        let _ = arena.alloc(size).unwrap();
        expected += size;
    }
    assert_eq!(arena.used(), expected);
    assert!(arena.capacity() >= expected);

    let config = ArenaConfig::default()
        .with_initial_size(128)
        .with_min_region_size(128);
    let arena = RegionArena::with_config(config).unwrap();

    let mut expected = 0usize;
    for size in [100usize, 100, 100, 500] {
        let _ = arena.alloc(size).unwrap();
        expected += size;
    }
    assert_eq!(arena.total(), expected);
    assert!(arena.region_count() > 1);
}

#[test]
fn aligned_addresses_are_always_aligned() {
    let buffer = BufferArena::with_capacity(4096).unwrap();
    let regions = RegionArena::with_capacity(4096).unwrap();

    // Odd-size prefix so the cursors start misaligned
    let _ = buffer.alloc(1).unwrap();
    let _ = regions.alloc(1).unwrap();

    for align in [1usize, 2, 4, 8, 16, 32, 64, 128] {
        let offset = buffer.alloc_aligned(5, align).unwrap();
        assert_eq!(buffer.ptr_at(offset).as_ptr() as usize % align, 0);

        let ptr = regions.alloc_aligned(5, align).unwrap();
        assert_eq!(ptr.as_ptr() as usize % align, 0);
    }
}

#[test]
fn buffer_growth_increases_capacity_and_preserves_bytes() {
    let arena = BufferArena::with_capacity(256).unwrap();

    let offset = arena.alloc(256).unwrap();
    let payload: Vec<u8> = (0..=255).collect();
    // SAFETY: the offset addresses 256 freshly allocated bytes.
    unsafe {
        std::ptr::copy_nonoverlapping(payload.as_ptr(), arena.ptr_at(offset).as_ptr(), 256);
    }

    let capacity_before = arena.capacity();
    let _ = arena.alloc(1024).unwrap();
    assert!(arena.capacity() > capacity_before);

    let data = arena.ptr_at(offset).as_ptr();
    for (i, expected) in payload.iter().enumerate() {
        // SAFETY: re-reading the bytes written above through the
        // re-resolved offset.
        unsafe {
            assert_eq!(*data.add(i), *expected, "byte {i} changed across growth");
        }
    }
}

#[test]
fn region_chaining_preserves_existing_pointers() {
    let config = ArenaConfig::default()
        .with_initial_size(256)
        .with_min_region_size(256);
    let arena = RegionArena::with_config(config).unwrap();

    let early = arena.alloc(64).unwrap();
    // SAFETY: early addresses 64 freshly allocated bytes.
    unsafe {
        std::ptr::write_bytes(early.as_ptr(), 0x77, 64);
    }

    let regions_before = arena.region_count();
    let _ = arena.alloc(512).unwrap();
    assert_eq!(arena.region_count(), regions_before + 1, "exactly one region appended");

    // SAFETY: early is still valid, regions never relocate.
    unsafe {
        assert_eq!(*early.as_ptr(), 0x77);
        assert_eq!(*early.as_ptr().add(63), 0x77);
    }

    // A later small request still fits in the first region
    let small = arena.alloc(16).unwrap();
    assert_eq!(small.as_ptr() as usize, early.as_ptr() as usize + 64);
}

/// Walkthrough: two ints, then an aligned block, then flush and reuse.
#[test]
fn int_pair_aligned_block_flush_walkthrough() {
    let mut arena = BufferArena::with_capacity(1024).unwrap();
    let base = arena.ptr_at(arena.alloc(0).unwrap()).as_ptr() as usize;

    let a = arena.alloc(4).unwrap();
    assert_eq!(a.get(), 0);
    let b = arena.alloc(4).unwrap();
    assert_eq!(b.get(), 4);
    assert_eq!(arena.used(), 8);

    let block = arena.alloc_aligned(32, 16).unwrap();
    let shift = (16 - (base + 8) % 16) % 16;
    assert_eq!(block.get(), 8 + shift);
    assert_eq!(arena.used(), 8 + shift + 32);
    assert_eq!(arena.ptr_at(block).as_ptr() as usize % 16, 0);

    arena.flush();
    assert_eq!(arena.used(), 0);

    let again = arena.alloc(4).unwrap();
    assert_eq!(again, a, "post-flush allocation reuses the first address");
    assert_eq!(arena.ptr_at(again).as_ptr() as usize, base);
}

#[test]
fn concrete_scenario_region_variant() {
    let mut arena = RegionArena::with_capacity(1024).unwrap();

    let a = arena.alloc(4).unwrap();
    let first_addr = a.as_ptr() as usize;
    let b = arena.alloc(4).unwrap();
    assert_eq!(b.as_ptr() as usize, first_addr + 4);

    let block = arena.alloc_aligned(32, 16).unwrap();
    assert_eq!(block.as_ptr() as usize % 16, 0);
    let shift = block.as_ptr() as usize - (first_addr + 8);
    assert_eq!(arena.total(), 8 + shift + 32);
    assert_eq!(arena.region_count(), 1, "everything fits in the root region");

    arena.flush();
    assert_eq!(arena.total(), 0);

    let again = arena.alloc(4).unwrap();
    assert_eq!(again.as_ptr() as usize, first_addr);
}

#[test]
fn flush_acquires_no_new_backing_memory() {
    let mut buffer = BufferArena::with_config(
        ArenaConfig::default().with_initial_size(512).with_stats(true),
    )
    .unwrap();
    let _ = buffer.alloc(100).unwrap();
    let blocks = buffer.stats().blocks_acquired();
    buffer.flush();
    let _ = buffer.alloc(100).unwrap();
    assert_eq!(buffer.stats().blocks_acquired(), blocks);

    let mut regions = RegionArena::with_config(
        ArenaConfig::default().with_initial_size(512).with_stats(true),
    )
    .unwrap();
    let _ = regions.alloc(100).unwrap();
    let blocks = regions.stats().blocks_acquired();
    regions.flush();
    let _ = regions.alloc(100).unwrap();
    assert_eq!(regions.stats().blocks_acquired(), blocks);
}

#[test]
fn shared_interface_serves_both_variants() {
    fn exercise<A: ArenaAllocate>(arena: &mut A) {
        // SAFETY: the bytes are written before any read and the pointer is
        // used before the next allocation.
        unsafe {
            let ptr = arena.alloc_bytes(16, 8).unwrap();
            std::ptr::write_bytes(ptr.as_ptr(), 0x11, 16);
            assert_eq!(*ptr.as_ptr(), 0x11);
        }
        assert!(arena.used() >= 16);
        assert!(arena.capacity() >= arena.used());
        arena.flush();
        assert_eq!(arena.used(), 0);
    }

    let mut buffer = BufferArena::with_capacity(256).unwrap();
    let mut regions = RegionArena::with_capacity(256).unwrap();
    exercise(&mut buffer);
    exercise(&mut regions);
}

#[test]
fn memory_usage_reporting() {
    let arena = BufferArena::with_capacity(1000).unwrap();
    let _ = arena.alloc(250).unwrap();

    assert_eq!(arena.used_memory(), 250);
    assert_eq!(arena.available_memory(), Some(750));
    assert_eq!(arena.total_memory(), Some(1000));
    assert_eq!(arena.memory_usage_percent(), Some(25.0));
}

#[test]
fn stats_track_padding_as_waste() {
    let config = ArenaConfig::default()
        .with_initial_size(1024)
        .with_stats(true);
    let arena = RegionArena::with_config(config).unwrap();

    let _ = arena.alloc(1).unwrap();
    let _ = arena.alloc_aligned(64, 64).unwrap();

    let snapshot = arena.stats().snapshot();
    assert_eq!(snapshot.allocations, 2);
    assert_eq!(snapshot.bytes_used, arena.total());
    assert_eq!(
        snapshot.bytes_wasted,
        arena.total() - 65,
        "everything beyond the payload bytes is padding"
    );
}
