// tga-core/tests/state.rs
// ============================================================================
// Module: Moore Machine Transition Tests
// Description: Tests for the execution lifecycle's allowed transitions.
// Dependencies: tga-core
// ============================================================================
//! ## Overview
//! Exercises every legal edge of the Moore machine plus the genesis
//! self-loop exception, and confirms illegal edges and out-of-place
//! self-loops are rejected.

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

use tga_core::ExecutionStateValue::Authorized;
use tga_core::ExecutionStateValue::Completed;
use tga_core::ExecutionStateValue::Denied;
use tga_core::ExecutionStateValue::Executing;
use tga_core::ExecutionStateValue::Failed;
use tga_core::ExecutionStateValue::Pending;
use tga_core::is_allowed_transition;

#[test]
fn genesis_self_loop_is_legal_only_at_sequence_one() {
    assert!(is_allowed_transition(Pending, Pending, 1));
    assert!(!is_allowed_transition(Pending, Pending, 2));
}

#[test]
fn every_documented_edge_is_allowed() {
    assert!(is_allowed_transition(Pending, Authorized, 2));
    assert!(is_allowed_transition(Pending, Denied, 2));
    assert!(is_allowed_transition(Authorized, Executing, 3));
    assert!(is_allowed_transition(Executing, Completed, 4));
    assert!(is_allowed_transition(Executing, Failed, 4));
}

#[test]
fn edges_outside_the_allowed_set_are_rejected() {
    assert!(!is_allowed_transition(Pending, Executing, 2));
    assert!(!is_allowed_transition(Pending, Completed, 2));
    assert!(!is_allowed_transition(Authorized, Completed, 3));
    assert!(!is_allowed_transition(Completed, Executing, 5));
    assert!(!is_allowed_transition(Denied, Authorized, 3));
}

#[test]
fn terminal_states_are_flagged() {
    assert!(Completed.is_terminal());
    assert!(Failed.is_terminal());
    assert!(Denied.is_terminal());
    assert!(!Pending.is_terminal());
    assert!(!Authorized.is_terminal());
    assert!(!Executing.is_terminal());
}
