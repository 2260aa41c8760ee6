//! # Workflows Module
//!
//! High-level entry points that tie the atom-type library, the engine and the
//! molecular graph together.
//!
//! ## Overview
//!
//! A workflow loads reference data, runs the configured saturation strategy on a
//! caller-owned graph and returns a report describing the result. Callers that
//! only need to inspect a graph can do so without running any strategy.
//!
//! ## Architecture
//!
//! - **Assignment Workflow** ([`assign`]) - Library loading, strategy dispatch and
//!   saturation reporting.

pub mod assign;
