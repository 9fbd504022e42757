// tga-core/tests/idgen.rs
// ============================================================================
// Module: Time-Ordered Identifier Tests
// Description: Tests for the 128-bit time-ordered id generator.
// Dependencies: tga-core
// ============================================================================
//! ## Overview
//! Validates the generated id's version nibble, variant bits, lexicographic
//! time-ordering, and uniqueness under rapid generation.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::HashSet;

use tga_core::FixedClock;
use tga_core::core::idgen::generate;
use tga_core::core::idgen::is_time_ordered_id;

#[test]
fn generated_id_has_version_and_variant_bits() {
    let clock = FixedClock::new(1_700_000_000_000);
    let id = generate(&clock);
    assert!(is_time_ordered_id(&id), "generated id {id} failed shape check");
}

#[test]
fn ids_from_a_later_instant_sort_after_earlier_ones() {
    let earlier = FixedClock::new(1_700_000_000_000);
    let later = FixedClock::new(1_700_000_000_001);
    let earlier_id = generate(&earlier);
    let later_id = generate(&later);
    assert!(earlier_id < later_id);
}

#[test]
fn rapid_generation_does_not_collide() {
    let clock = FixedClock::new(1_700_000_000_000);
    let mut seen = HashSet::new();
    for _ in 0..256 {
        let id = generate(&clock);
        assert!(seen.insert(id), "duplicate id generated under a fixed clock");
    }
}
