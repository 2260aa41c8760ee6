//! # Core Models Module
//!
//! This module contains the data structures used to represent molecular graphs in
//! kekule: atoms with their valence bookkeeping, bonds with their (possibly
//! undecided) orders, and the graph that owns both.
//!
//! ## Key Components
//!
//! - [`atom`] - Atom representation with symbol, charge, hydrogens and typing data
//! - [`topology`] - Bond orders, bond order helpers and the two-atom bond
//! - [`graph`] - The molecular graph with adjacency caching and bond-order sums
//! - [`ids`] - Unique identifier type for atoms
//!
//! ## Usage
//!
//! ```ignore
//! use kekule::core::models::{atom::Atom, graph::MolecularGraph};
//!
//! let mut graph = MolecularGraph::new();
//! let c1 = graph.add_atom(Atom::new("C").with_hydrogens(2));
//! let c2 = graph.add_atom(Atom::new("C").with_hydrogens(2));
//! graph.add_ambiguous_bond(c1, c2)?;
//! ```

pub mod atom;
pub mod graph;
pub mod ids;
pub mod topology;
