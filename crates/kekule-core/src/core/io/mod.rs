//! Provides input/output functionality for molecule files.
//!
//! The engine itself never touches files; this module exists so that graphs can be
//! prepared, stored and inspected outside of Rust code. Formats implement the
//! [`traits::MolecularFile`] trait.

pub mod toml_graph;
pub mod traits;
