//! # Topology Module
//!
//! Graph-topology analysis needed by the saturation engine.
//!
//! ## Overview
//!
//! Ring-isolated saturation works on one fused-ring system at a time. This module
//! finds those systems: ring bonds are detected as the non-bridge bonds of the
//! graph and grouped by shared atoms, so fused, bridged and spiro rings end up in
//! the same system while rings joined only through acyclic linkers stay apart.
//!
//! ## Key Components
//!
//! - [`rings`] - Ring-bond detection, the [`rings::RingSystemFinder`] trait and its
//!   default implementation
//!
//! ## Usage
//!
//! ```ignore
//! use kekule::core::topology::rings::{FusedRingPartitioner, RingSystemFinder};
//!
//! let systems = FusedRingPartitioner.find_fused_ring_systems(&graph);
//! ```

pub mod rings;
