//! End-to-end consolidation against a simulated 16 MiB physical address space.

use boot_info::memory::MemoryType::{
    AcpiNvs, AcpiReclaimable, BadMemory, DriverImage, KernelImage, Reserved, Unknown,
    UsableAfterBoot, UsableRam,
};
use boot_info::memory::{MemoryRegion, MemoryType};
use boot_mmap::{
    MemoryMap, MemoryMapError, PhysWindow, SlabWindow, consolidate, consolidate_with_scratch,
    scratch_bytes, scratch_slots,
};

const MIB: u64 = 1 << 20;
const PHYSICAL_SIZE: u64 = 16 * MIB;

/// Pattern the simulated memory is filled with before each run.
const SENTINEL: MemoryRegion =
    MemoryRegion::new(0xDFDF_DFDF_DFDF_DFDF, 0xDFDF_DFDF_DFDF_DFDF, BadMemory);

fn r(base: u64, size: u64, ty: MemoryType) -> MemoryRegion {
    MemoryRegion::new(base, size, ty)
}

fn physical_memory() -> Vec<MemoryRegion> {
    vec![SENTINEL; usize::try_from(PHYSICAL_SIZE.div_ceil(24)).unwrap()]
}

/// Copies `input` into an array with `capacity` slots.
fn entries(input: &[MemoryRegion], capacity: usize) -> Vec<MemoryRegion> {
    let mut entries = vec![MemoryRegion::EMPTY; capacity];
    entries[..input.len()].copy_from_slice(input);
    entries
}

fn expect_unmodified(window: &SlabWindow<'_>, base: u64, size: u64) {
    let slots = window.slot_range(base, size);
    assert!(
        window.slab()[slots.clone()].iter().all(|s| *s == SENTINEL),
        "physical range 0x{base:X}+0x{size:X} (slots {slots:?}) was written"
    );
}

fn expect_modified(window: &SlabWindow<'_>, base: u64, size: u64) {
    let slots = window.slot_range(base, size);
    assert!(
        window.slab()[slots.clone()].iter().any(|s| *s != SENTINEL),
        "physical range 0x{base:X}+0x{size:X} (slots {slots:?}) was not used"
    );
}

/// Runs consolidation through the scratch locator and returns the map.
fn run_in(
    window: &mut SlabWindow<'_>,
    input: &[MemoryRegion],
    capacity: usize,
) -> Vec<MemoryRegion> {
    let mut entries = entries(input, capacity);
    let count = consolidate(&mut entries, input.len(), window).expect("consolidates");
    entries.truncate(count);
    entries
}

#[test]
fn simple_map_is_unchanged() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let input = [
        r(0, 0xA0000, UsableRam),
        r(0xA0000, 0x60000, Reserved),
        r(0x100000, 0xF00000, UsableRam),
    ];

    assert_eq!(run_in(&mut window, &input, 8), input);
    expect_unmodified(&window, 0, 0x100000);
    expect_modified(&window, 0x100000, 0xF00000);
}

#[test]
fn unordered_map_is_sorted() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let input = [
        r(0xFFF000, 0x1000, Reserved),
        r(0xA0000, 0x60000, Reserved),
        r(0x100000, 0xEFF000, UsableRam),
        r(0, 0xA0000, UsableRam),
    ];

    assert_eq!(
        run_in(&mut window, &input, 8),
        [
            r(0, 0xA0000, UsableRam),
            r(0xA0000, 0x60000, Reserved),
            r(0x100000, 0xEFF000, UsableRam),
            r(0xFFF000, 0x1000, Reserved),
        ]
    );
    expect_unmodified(&window, 0, 0x100000);
    expect_modified(&window, 0x100000, 0xEFF000);
    expect_unmodified(&window, 0xFFF000, 0x1000);
}

#[test]
fn bochs_map_with_loader_regions() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let input = [
        // Reported by the loader stub.
        r(0, 0x10000, UsableAfterBoot),
        r(0x98400, 0x6C00, UsableAfterBoot),
        // Reported by the firmware.
        r(0, 0x9F000, UsableRam),
        r(0x9F000, 0x1000, Reserved),
        r(0xE8000, 0x18000, Reserved),
        r(0x100000, 0xEF0000, UsableRam),
        r(0xFF0000, 0x10000, AcpiReclaimable),
        r(0xFFFC_0000, 0x40000, Reserved),
        // Protected mode loader image.
        r(0x100000, 0x3000, UsableAfterBoot),
    ];

    assert_eq!(
        run_in(&mut window, &input, 17),
        [
            r(0, 0x10000, UsableAfterBoot),
            r(0x10000, 0x88400, UsableRam),
            r(0x98400, 0x6C00, UsableAfterBoot),
            r(0x9F000, 0x1000, Reserved),
            r(0xE8000, 0x18000, Reserved),
            r(0x100000, 0x3000, UsableAfterBoot),
            r(0x103000, 0xEED000, UsableRam),
            r(0xFF0000, 0x10000, AcpiReclaimable),
            r(0xFFFC_0000, 0x40000, Reserved),
        ]
    );

    // Scratch starts at the first slot boundary past the loader image.
    expect_unmodified(&window, 0, 0x103000);
    expect_modified(&window, 0x103008, scratch_bytes(input.len()));
    expect_unmodified(&window, 0xFF0000, 0x10000);
}

#[test]
fn consecutive_reserved_regions_merge() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let input = [
        r(0xFFF000, 0x1000, Reserved),
        r(0xA0000, 0x20000, Reserved),
        r(0x100000, 0xEFF000, UsableRam),
        r(0xC0000, 0x40000, Reserved),
        r(0, 0xA0000, UsableRam),
    ];

    let mut entries = entries(&input, 9);
    let count = consolidate(&mut entries, input.len(), &mut window).expect("consolidates");

    assert_eq!(count, 4);
    assert_eq!(
        entries[..count],
        [
            r(0, 0xA0000, UsableRam),
            r(0xA0000, 0x60000, Reserved),
            r(0x100000, 0xEFF000, UsableRam),
            r(0xFFF000, 0x1000, Reserved),
        ]
    );
    assert_eq!(entries[4], MemoryRegion::EMPTY, "stale slot cleared");
    expect_unmodified(&window, 0, 0x100000);
    expect_modified(&window, 0x100000, 0xEFF000);
}

#[test]
fn region_inside_ram_splits_it_in_three() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let input = [
        r(0x100000, 0xF00000, UsableRam),
        r(0x400000, 0x20000, UsableAfterBoot),
    ];

    assert_eq!(
        run_in(&mut window, &input, 4),
        [
            r(0x100000, 0x300000, UsableRam),
            r(0x400000, 0x20000, UsableAfterBoot),
            r(0x420000, 0xBE0000, UsableRam),
        ]
    );
}

#[test]
fn nested_regions_sharing_a_base() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let input = [
        r(0x200000, 0x1000, Reserved),
        r(0x200000, 0x8000, DriverImage),
        r(0x200000, 0x20000, KernelImage),
        r(0x100000, 0xF00000, UsableRam),
    ];

    // Same base sorts biggest first; each smaller region then only overrides
    // the front of the one before it.
    assert_eq!(
        run_in(&mut window, &input, 8),
        [
            r(0x100000, 0x100000, UsableRam),
            r(0x200000, 0x1000, Reserved),
            r(0x201000, 0x1F000, KernelImage),
            r(0x220000, 0xDE0000, UsableRam),
        ]
    );
}

#[test]
fn no_usable_ram_exhausts_scratch() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let mut entries = entries(&[r(0, 0x100000, Reserved), r(0x100000, 0x1000, AcpiNvs)], 4);

    assert_eq!(
        consolidate(&mut entries, 2, &mut window),
        Err(MemoryMapError::ScratchExhausted {
            required: scratch_bytes(2),
        })
    );
}

#[test]
fn ram_outside_the_window_is_not_used_for_scratch() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let mut entries = entries(&[r(PHYSICAL_SIZE, 64 * MIB, UsableRam)], 2);

    assert_eq!(
        consolidate(&mut entries, 1, &mut window),
        Err(MemoryMapError::ScratchExhausted {
            required: scratch_bytes(1),
        })
    );
}

#[test]
fn window_refusing_scratch_is_reported() {
    struct Readonly;

    impl PhysWindow for Readonly {
        fn is_addressable(&self, _region: &MemoryRegion) -> bool {
            true
        }

        fn scratch(&mut self, _base: u64, _slots: usize) -> Option<&mut [MemoryRegion]> {
            None
        }
    }

    let mut entries = entries(&[r(0x1000, 0x10000, UsableRam)], 2);
    assert_eq!(
        consolidate(&mut entries, 1, &mut Readonly),
        Err(MemoryMapError::ScratchUnmapped {
            base: 0x1008,
            slots: 2,
        })
    );
}

#[test]
fn count_beyond_capacity_is_rejected() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let mut entries = [r(0, MIB, UsableRam)];

    assert_eq!(
        consolidate(&mut entries, 2, &mut window),
        Err(MemoryMapError::CountExceedsCapacity {
            count: 2,
            capacity: 1,
        })
    );
}

#[test]
fn split_map_larger_than_the_array_is_rejected() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let mut entries = [
        r(0x100000, 0xF00000, UsableRam),
        r(0x400000, 0x20000, UsableAfterBoot),
    ];

    assert_eq!(
        consolidate(&mut entries, 2, &mut window),
        Err(MemoryMapError::OutputExceedsCapacity {
            required: 3,
            capacity: 2,
        })
    );
}

#[test]
fn empty_map_needs_no_scratch() {
    let mut memory = physical_memory();
    let mut window = SlabWindow::new(&mut memory);
    let mut entries = [MemoryRegion::EMPTY; 4];

    assert_eq!(consolidate(&mut entries, 0, &mut window), Ok(0));
    assert!(window.slab().iter().all(|s| *s == SENTINEL));
}

#[test]
fn memory_map_reports_addressability_per_region() {
    let mut memory = physical_memory();
    let mut input = entries(
        &[
            r(0, 0x9F000, UsableRam),
            r(0x100000, 0xF00000, UsableRam),
            r(0xFFFC_0000, 0x40000, Reserved),
        ],
        6,
    );
    let first_slot = input.as_ptr();

    let mut map = MemoryMap::new(SlabWindow::new(&mut memory));
    map.initialize(&mut input, 3).expect("consolidates");

    assert_eq!(map.len(), 3);
    assert!(map.is_region_addressable(0));
    assert!(map.is_region_addressable(1));
    assert!(!map.is_region_addressable(2));
    assert!(!map.is_region_addressable(3));
    assert_eq!(map.as_ptr(), first_slot);
}

/// Small xorshift generator; the sequences only need to be reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

const TYPES: [MemoryType; 9] = [
    Unknown,
    UsableRam,
    Reserved,
    AcpiReclaimable,
    AcpiNvs,
    BadMemory,
    UsableAfterBoot,
    KernelImage,
    DriverImage,
];

/// First byte of the last 64 pages of the address space.
const TOP_WINDOW: u64 = 0u64.wrapping_sub(64 * 0x1000);

/// Up to 24 regions within 64 pages. Every third map is placed flush against
/// the top of the address space, so some of its regions end at 2^64.
fn random_map(rng: &mut XorShift) -> Vec<MemoryRegion> {
    let origin = if rng.below(3) == 0 { TOP_WINDOW } else { 0 };
    let count = 1 + rng.below(24);
    (0..count)
        .map(|_| {
            let page = rng.below(64);
            let pages = rng.below(16).min(64 - page);
            let ty = TYPES[usize::try_from(rng.below(9)).unwrap()];
            r(origin + page * 0x1000, pages * 0x1000, ty)
        })
        .collect()
}

/// Exclusive bounds, wide enough to hold 2^64.
fn span(region: &MemoryRegion) -> (u128, u128) {
    let base = u128::from(region.base_address);
    (base, base + u128::from(region.size))
}

/// Brute force: cut at every input boundary, resolve each piece over all
/// covering inputs, then join touching pieces of one type.
fn reference(input: &[MemoryRegion]) -> Vec<MemoryRegion> {
    let mut bounds: Vec<u128> = input
        .iter()
        .filter(|i| !i.is_empty())
        .flat_map(|i| {
            let (start, end) = span(i);
            [start, end]
        })
        .collect();
    bounds.sort_unstable();
    bounds.dedup();

    let mut out: Vec<(u128, u128, MemoryType)> = Vec::new();
    for piece in bounds.windows(2) {
        let (start, end) = (piece[0], piece[1]);
        let resolved = input
            .iter()
            .filter(|i| !i.is_empty() && span(i).0 <= start && span(i).1 >= end)
            .map(|i| i.region_type)
            .reduce(MemoryType::combine);

        let Some(ty) = resolved else { continue };
        match out.last_mut() {
            Some(last) if last.1 == start && last.2 == ty => last.1 = end,
            _ => out.push((start, end, ty)),
        }
    }

    out.into_iter()
        .map(|(start, end, ty)| {
            r(
                u64::try_from(start).unwrap(),
                u64::try_from(end - start).unwrap(),
                ty,
            )
        })
        .collect()
}

fn consolidate_random(input: &[MemoryRegion]) -> Vec<MemoryRegion> {
    let mut entries = entries(input, 2 * input.len());
    let mut scratch = vec![MemoryRegion::EMPTY; scratch_slots(input.len())];
    let count = consolidate_with_scratch(&mut entries, input.len(), &mut scratch)
        .unwrap_or_else(|e| panic!("{e} for {input:?}"));
    entries.truncate(count);
    entries
}

#[test]
fn random_maps_match_reference_model() {
    let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);

    for _ in 0..500 {
        let input = random_map(&mut rng);
        let output = consolidate_random(&input);

        assert_eq!(output, reference(&input), "input: {input:?}");

        for pair in output.windows(2) {
            assert!(pair[0].end() <= pair[1].base_address, "overlap in {output:?}");
            assert!(
                pair[0].end() != pair[1].base_address
                    || pair[0].region_type != pair[1].region_type,
                "unmerged neighbours in {output:?}"
            );
        }
        assert!(output.iter().all(|o| !o.is_empty()));
    }
}

#[test]
fn consolidation_is_idempotent() {
    let mut rng = XorShift(0x0123_4567_89AB_CDEF);

    for _ in 0..200 {
        let once = consolidate_random(&random_map(&mut rng));
        let twice = consolidate_random(&once);
        assert_eq!(once, twice);
    }
}

#[test]
fn overlap_takes_the_restrictive_type() {
    for &a in &TYPES {
        for &b in &TYPES {
            let output = consolidate_random(&[r(0, 0x2000, a), r(0x1000, 0x2000, b)]);
            let overlap = output
                .iter()
                .find(|o| o.contains(0x1000))
                .expect("overlap covered")
                .region_type;

            let expected = if a == b || b == UsableRam {
                a
            } else if a == UsableRam {
                b
            } else if a.as_raw() < b.as_raw() {
                a
            } else {
                b
            };
            assert_eq!(overlap, expected, "{a:?} over {b:?}");
        }
    }
}
