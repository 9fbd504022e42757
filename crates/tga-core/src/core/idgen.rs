// tga-core/src/core/idgen.rs
// ============================================================================
// Module: Time-Ordered Identifier Generation
// Description: 128-bit time-ordered ids rendered as 8-4-4-4-12 lowercase hex.
// Purpose: Produce trace/plan/session/tool-call/idempotency identifiers.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! Identifiers encode 48 bits of wall-clock milliseconds in the high field, a
//! version nibble of `7`, 12 random bits, the variant bits `10`, and 62
//! random bits — the same layout a UUIDv7 draft describes. The clock is
//! injected so id generation, like capability validation, never reads
//! wall-clock time on its own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::RngCore;
use rand::rngs::OsRng;

use crate::core::time::Clock;

// ============================================================================
// SECTION: Generation
// ============================================================================

/// Generates a time-ordered 128-bit identifier using `clock` for the
/// millisecond timestamp and the operating system's CSPRNG for the random
/// bits.
#[must_use]
pub fn generate(clock: &dyn Clock) -> String {
    let millis = clock.now_unix_millis().max(0) as u64;
    let mut rng = OsRng;
    let rand_a = u128::from(rng.next_u32() & 0x0FFF);
    let rand_b = u128::from(rng.next_u64() & 0x3FFF_FFFF_FFFF_FFFF);

    let value = ((u128::from(millis) & 0xFFFF_FFFF_FFFF) << 80)
        | (0x7u128 << 76)
        | (rand_a << 64)
        | (0x2u128 << 62)
        | rand_b;

    render(value)
}

/// Renders a 128-bit integer as the canonical 8-4-4-4-12 lowercase hex form.
fn render(value: u128) -> String {
    let hex = format!("{value:032x}");
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Returns whether `value` has the exact shape a time-ordered id produces:
/// 8-4-4-4-12 lowercase hex groups, version nibble `7`, and variant bits
/// `10` in the top two bits of the third group.
#[must_use]
pub fn is_time_ordered_id(value: &str) -> bool {
    if !super::identifiers::has_id_shape(value) {
        return false;
    }
    let groups: Vec<&str> = value.split('-').collect();
    let Some(version_nibble) = groups[2].as_bytes().first() else {
        return false;
    };
    let Some(variant_byte) = groups[3].as_bytes().first() else {
        return false;
    };
    if *version_nibble != b'7' {
        return false;
    }
    matches!(variant_byte, b'8' | b'9' | b'a' | b'b')
}
