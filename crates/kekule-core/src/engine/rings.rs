use super::error::EngineError;
use super::saturation::{SaturationChecker, Scope};
use super::transaction::HydrogenOverride;
use crate::core::atomtypes::library::AtomTypeSource;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::topology::rings::RingSystemFinder;
use slotmap::SecondaryMap;
use tracing::{debug, info, instrument};

impl<L: AtomTypeSource + ?Sized> SaturationChecker<'_, L> {
    /// Runs the greedy fill separately on every fused-ring system of the graph.
    ///
    /// While a system is processed, each of its atoms carries the implicit-hydrogen
    /// count `graph degree - in-system degree - original count`, and only the
    /// system's own bonds are visible to the fill. A bond is only raised while both
    /// of its atoms stay within their real, graph-wide valence. Original counts are
    /// restored before the next system starts, and on every error path.
    #[instrument(skip_all, name = "ring_system_fill")]
    pub fn saturate_ring_systems<F>(
        &self,
        graph: &mut MolecularGraph,
        finder: &F,
    ) -> Result<(), EngineError>
    where
        F: RingSystemFinder + ?Sized,
    {
        let systems = finder.find_fused_ring_systems(graph);
        info!(systems = systems.len(), "Saturating fused ring systems.");

        for (index, system) in systems.iter().enumerate() {
            let mut guard = HydrogenOverride::new(graph);
            let mut originals: SecondaryMap<AtomId, i32> = SecondaryMap::new();
            for &atom_id in &system.atoms {
                let original = guard
                    .atom(atom_id)
                    .ok_or(EngineError::AtomNotFound(atom_id))?
                    .hydrogens();
                let outside = guard.degree(atom_id) as i32;
                let inside = system.degree_within(&guard, atom_id) as i32;
                guard.set(atom_id, outside - inside - original)?;
                originals.insert(atom_id, original);
            }

            debug!(
                system = index,
                atoms = system.atoms.len(),
                bonds = system.bonds.len(),
                "Filling isolated ring system."
            );
            self.saturate_in(
                &mut guard,
                Scope::Fragment {
                    system,
                    hydrogens: &originals,
                },
            )?;
        }

        Ok(())
    }
}
