//! # Engine Module
//!
//! This module implements the valence-saturation and bond-order-deduction engine:
//! checking atoms against their reference atom types and assigning concrete orders
//! to bonds that were left undecided.
//!
//! ## Overview
//!
//! Everything is built around [`saturation::SaturationChecker`], which borrows an
//! atom-type source and provides the saturation predicate and the fill algorithms.
//! [`decider::BondOrderDecider`] sits on top of it and resolves single-or-double
//! bonds with a rotation search. The engine mutates the caller's graph in place
//! and runs synchronously on the calling thread.
//!
//! ## Architecture
//!
//! - **Saturation** ([`saturation`]) - Saturation predicate, headroom and greedy forward fill
//! - **Backtracking** ([`backtrack`]) - Exhaustive recursive assignment over a bond list
//! - **Ring Isolation** ([`rings`]) - Greedy fill run per fused-ring system
//! - **Hydrogens** ([`hydrogens`]) - Implicit hydrogen counts from atom types
//! - **Decision** ([`decider`]) - Rotation search with best-guess fallback
//! - **Configuration** ([`config`]) - Strategy selection and search limits
//! - **State Tracking** ([`state`]) - Sweep states, outcomes and tie-break verdicts
//! - **Progress Monitoring** ([`progress`]) - Optional progress callbacks
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! ## Key Capabilities
//!
//! - **Pluggable reference data** through the `AtomTypeSource` trait
//! - **Scoped hydrogen overrides** that are always restored, even on error or panic
//! - **Degraded success** reporting the best partial assignment instead of failing

pub mod backtrack;
pub mod config;
pub mod decider;
pub mod error;
pub mod hydrogens;
pub mod progress;
pub mod rings;
pub mod saturation;
pub mod state;
pub(crate) mod transaction;
