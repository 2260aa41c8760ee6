//! # Core Module
//!
//! This module provides the data structures and reference data the saturation
//! engine works on.
//!
//! ## Overview
//!
//! The core layer is stateless with respect to bond-order decisions. It describes
//! molecules as graphs, supplies the atom-type reference data the engine checks
//! valences against, detects ring systems, and reads and writes graphs from disk.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, bond orders and the molecular graph
//! - **Reference Data** ([`atomtypes`]) - Atom-type candidates, the lookup trait and library loaders
//! - **Graph Topology** ([`topology`]) - Ring-bond detection and fused-ring partitioning
//! - **File I/O** ([`io`]) - The TOML molecule format and the common file trait

pub mod atomtypes;
pub mod io;
pub mod models;
pub mod topology;
