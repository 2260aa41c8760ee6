//! # kekule Core Library
//!
//! Valence saturation and bond-order deduction for molecular graphs: given atoms
//! with known types and bonds whose order may still be undecided, assign concrete
//! orders so that every atom matches one of its reference atom types.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture so that each concern can be used
//! and tested on its own.
//!
//! - **[`core`]: The Foundation.** Plain data models (`MolecularGraph`, `Atom`,
//!   `Bond`), atom-type reference data behind the `AtomTypeSource` trait, ring-system
//!   detection and file I/O.
//!
//! - **[`engine`]: The Logic Core.** The `SaturationChecker` with its predicate and
//!   fill algorithms (greedy, ring-isolated, backtracking), implicit hydrogen
//!   counting, and the `BondOrderDecider` rotation search with best-guess fallback.
//!
//! - **[`workflows`]: The Public API.** Loads reference data, runs the configured
//!   strategy on a graph and reports the resulting saturation state.

pub mod core;
pub mod engine;
pub mod workflows;
