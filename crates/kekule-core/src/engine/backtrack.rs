use super::error::{ConfigurationError, EngineError};
use super::saturation::{Saturation, SaturationChecker};
use crate::core::atomtypes::library::{AtomTypeCandidate, AtomTypeSource};
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use std::collections::HashSet;
use tracing::{debug, instrument};

impl<L: AtomTypeSource + ?Sized> SaturationChecker<'_, L> {
    /// Exhaustive backtracking assignment of the orders of `bonds`.
    ///
    /// Returns `Ok(true)` when every atom touched by `bonds` ends up saturated. A
    /// `false` result leaves the graph in whatever state the last attempt reached.
    ///
    /// # Errors
    ///
    /// * [`EngineError::SearchLimitExceeded`] if `bonds` is longer than the checker's
    ///   backtracking limit; the graph is not touched.
    /// * [`ConfigurationError::NoAtomType`] if a bond that has to be raised joins an
    ///   atom without atom-type candidates.
    #[instrument(skip_all, name = "backtracking_fill", fields(bonds = bonds.len()))]
    pub fn new_saturate(
        &self,
        bonds: &[usize],
        graph: &mut MolecularGraph,
    ) -> Result<bool, EngineError> {
        if bonds.len() > self.max_backtrack_bonds() {
            return Err(EngineError::SearchLimitExceeded {
                bonds: bonds.len(),
                limit: self.max_backtrack_bonds(),
            });
        }

        if !self.backtrack(bonds, graph)? {
            debug!("Backtracking found no complete assignment.");
            return Ok(false);
        }

        let mut touched = HashSet::new();
        for &bond_index in bonds {
            if let Some(bond) = graph.bond(bond_index) {
                touched.extend(bond.atoms());
            }
        }
        for atom_id in touched {
            if !self.is_saturated(atom_id, graph)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn backtrack(&self, bonds: &[usize], graph: &mut MolecularGraph) -> Result<bool, EngineError> {
        let Some((&bond_index, rest)) = bonds.split_first() else {
            return Ok(true);
        };

        if self.is_bond_unsaturated(bond_index, graph)? {
            let snapshot = graph.bond_orders();
            if self.backtrack(rest, graph)? && !self.is_bond_unsaturated(bond_index, graph)? {
                return Ok(true);
            }
            graph.restore_bond_orders(&snapshot);

            if self.raise_to_capacity(bond_index, graph)? {
                return self.backtrack(rest, graph);
            }
            Ok(false)
        } else if self.is_bond_saturated(bond_index, graph)? {
            self.backtrack(rest, graph)
        } else {
            Ok(self.backtrack(rest, graph)? && !self.is_bond_unsaturated(bond_index, graph)?)
        }
    }

    /// Raises one bond step by step while some pair of endpoint candidates still
    /// admits a higher order. Returns whether the bond ended up saturated.
    fn raise_to_capacity(
        &self,
        bond_index: usize,
        graph: &mut MolecularGraph,
    ) -> Result<bool, EngineError> {
        let Some(bond) = graph.bond(bond_index) else {
            return Ok(false);
        };
        let [begin, end] = bond.atoms();
        let begin_types = self.candidates_of(begin, graph)?;
        let end_types = self.candidates_of(end, graph)?;

        let mut increased = true;
        while increased && !self.is_bond_saturated(bond_index, graph)? {
            increased = false;
            'search: for first in begin_types {
                if !self.could_match_atom_type(begin, first, graph)? {
                    continue;
                }
                for second in end_types {
                    if !self.could_match_atom_type(end, second, graph)? {
                        continue;
                    }
                    let Some(bond) = graph.bond_mut(bond_index) else {
                        return Ok(false);
                    };
                    if bond.order.is_lower_than(first.max_bond_order)
                        && bond.order.is_lower_than(second.max_bond_order)
                    {
                        if let Some(next) = bond.order.increment() {
                            bond.order = next;
                            increased = true;
                            break 'search;
                        }
                    }
                }
            }
        }

        self.is_bond_saturated(bond_index, graph)
    }

    fn candidates_of(
        &self,
        atom_id: AtomId,
        graph: &MolecularGraph,
    ) -> Result<&[AtomTypeCandidate], EngineError> {
        let atom = graph
            .atom(atom_id)
            .ok_or(EngineError::AtomNotFound(atom_id))?;
        let candidates = self.candidates(&atom.symbol);
        if candidates.is_empty() {
            return Err(ConfigurationError::NoAtomType {
                symbol: atom.symbol.clone(),
            }
            .into());
        }
        Ok(candidates)
    }
}
