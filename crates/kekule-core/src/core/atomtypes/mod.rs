//! # Atom Types Module
//!
//! Reference valence data consumed by the saturation engine.
//!
//! Every element symbol maps to zero or more [`library::AtomTypeCandidate`]s, each
//! giving an expected bond-order budget and the highest order a single bond to that
//! atom may carry. The engine only ever reads this data through the
//! [`library::AtomTypeSource`] trait, so callers can plug in their own tables.
//!
//! ## Key Components
//!
//! - [`library`] - The candidate type, the lookup trait and the TOML/CSV-backed library
//! - [`defaults`] - The static table behind [`library::AtomTypeLibrary::builtin`]
//!
//! ## Usage
//!
//! ```ignore
//! use kekule::core::atomtypes::library::{AtomTypeLibrary, AtomTypeSource};
//!
//! let library = AtomTypeLibrary::load(Path::new("atom_types.toml"))?;
//! let carbon = library.candidates("C");
//! ```

pub mod defaults;
pub mod library;
