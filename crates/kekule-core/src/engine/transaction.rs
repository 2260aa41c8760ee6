use super::error::EngineError;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use std::ops::{Deref, DerefMut};

/// Scoped rewrite of implicit-hydrogen counts.
///
/// Every count changed through [`HydrogenOverride::set`] is written back when the
/// guard is dropped, whether the scope ends normally, through `?` or by unwinding.
pub struct HydrogenOverride<'g> {
    graph: &'g mut MolecularGraph,
    saved: Vec<(AtomId, Option<i32>)>,
}

impl<'g> HydrogenOverride<'g> {
    pub fn new(graph: &'g mut MolecularGraph) -> Self {
        Self {
            graph,
            saved: Vec::new(),
        }
    }

    /// Overrides the implicit-hydrogen count of `atom_id` for the guard's lifetime.
    ///
    /// Only the first override of an atom records its original value.
    pub fn set(&mut self, atom_id: AtomId, count: i32) -> Result<(), EngineError> {
        let atom = self
            .graph
            .atom_mut(atom_id)
            .ok_or(EngineError::AtomNotFound(atom_id))?;
        if !self.saved.iter().any(|&(id, _)| id == atom_id) {
            self.saved.push((atom_id, atom.implicit_hydrogens));
        }
        atom.implicit_hydrogens = Some(count);
        Ok(())
    }
}

impl Deref for HydrogenOverride<'_> {
    type Target = MolecularGraph;

    fn deref(&self) -> &Self::Target {
        self.graph
    }
}

impl DerefMut for HydrogenOverride<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.graph
    }
}

impl Drop for HydrogenOverride<'_> {
    fn drop(&mut self) {
        for (atom_id, original) in self.saved.drain(..).rev() {
            if let Some(atom) = self.graph.atom_mut(atom_id) {
                atom.implicit_hydrogens = original;
            }
        }
    }
}
