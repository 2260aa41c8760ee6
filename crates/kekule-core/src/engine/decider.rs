use super::error::{ConfigurationError, EngineError};
use super::progress::{Progress, ProgressReporter};
use super::saturation::{Saturation, SaturationChecker};
use super::state::{DecisionOutcome, RaiseDecision, SweepState};
use crate::core::atomtypes::library::AtomTypeSource;
use crate::core::models::atom::Atom;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::BondOrder;
use slotmap::SecondaryMap;
use tracing::{debug, info, instrument, trace, warn};

/// Resolves ambiguous (single-or-double) bonds by trying every sweep start index
/// and keeping the assignment that saturates the most atoms.
///
/// Endpoint headroom during a sweep is judged against each atom's own valency
/// when it has one, falling back to its first atom-type candidate. The final
/// score of a sweep always comes from the [`SaturationChecker`].
pub struct BondOrderDecider<'a, L: AtomTypeSource + ?Sized> {
    checker: SaturationChecker<'a, L>,
}

impl<'a, L: AtomTypeSource + ?Sized> BondOrderDecider<'a, L> {
    pub fn new(checker: SaturationChecker<'a, L>) -> Self {
        Self { checker }
    }

    pub fn checker(&self) -> &SaturationChecker<'a, L> {
        &self.checker
    }

    /// Assigns concrete orders to every ambiguous bond of `graph`.
    ///
    /// With `require_fully_saturated` set, every start index is tried and the
    /// search stops at the first that saturates all atoms. Otherwise a single
    /// sweep from index 0 is accepted as is.
    ///
    /// # Errors
    ///
    /// * [`EngineError::Unsatisfiable`] if no start index saturates a single atom.
    /// * [`EngineError::Configuration`] if an atom has no usable valence data.
    pub fn decide_bond_order(
        &self,
        graph: &mut MolecularGraph,
        require_fully_saturated: bool,
    ) -> Result<DecisionOutcome, EngineError> {
        self.decide_bond_order_with_progress(
            graph,
            require_fully_saturated,
            &ProgressReporter::new(),
        )
    }

    #[instrument(skip_all, name = "bond_order_decision", fields(require_fully_saturated))]
    pub fn decide_bond_order_with_progress(
        &self,
        graph: &mut MolecularGraph,
        require_fully_saturated: bool,
        reporter: &ProgressReporter,
    ) -> Result<DecisionOutcome, EngineError> {
        let total = graph.atom_count();
        let bond_count = graph.bond_count();

        if !graph.has_ambiguous_bonds() {
            debug!("No ambiguous bonds; nothing to decide.");
            return Ok(DecisionOutcome::Solved);
        }

        self.check_hydrogen_estimates(graph)?;

        let ambiguous = graph.bonds().iter().filter(|b| b.ambiguous).count();
        info!(
            atoms = total,
            bonds = bond_count,
            ambiguous,
            "Deciding bond orders."
        );

        let total_sweeps = if require_fully_saturated {
            bond_count as u64 + 1
        } else {
            1
        };
        reporter.report(Progress::SearchStarted { total_sweeps });

        if !require_fully_saturated {
            let saturated = self.sweep(graph, 0, reporter)?;
            return Ok(if saturated == total {
                DecisionOutcome::Solved
            } else {
                DecisionOutcome::BestGuess {
                    start_index: 0,
                    saturated_atoms: saturated,
                    total_atoms: total,
                }
            });
        }

        let mut best: Option<(usize, usize)> = None;
        let mut state = SweepState::Sweeping(0);

        loop {
            match state {
                SweepState::Sweeping(start) => {
                    let saturated = self.sweep(graph, start, reporter)?;
                    if saturated == total {
                        state = SweepState::Solved;
                        continue;
                    }
                    if best.is_none_or(|(_, count)| saturated > count) {
                        best = Some((start, saturated));
                    }
                    state = if start < bond_count {
                        SweepState::Sweeping(start + 1)
                    } else if best.is_some_and(|(_, count)| count > 0) {
                        SweepState::BestGuessSelected
                    } else {
                        SweepState::Failed
                    };
                }
                SweepState::Solved => {
                    info!("All atoms saturated.");
                    return Ok(DecisionOutcome::Solved);
                }
                SweepState::BestGuessSelected => {
                    let Some((start, _)) = best else {
                        state = SweepState::Failed;
                        continue;
                    };
                    let saturated = self.sweep(graph, start, reporter)?;
                    let outcome = DecisionOutcome::BestGuess {
                        start_index: start,
                        saturated_atoms: saturated,
                        total_atoms: total,
                    };
                    let percentage = outcome.saturation_percentage();
                    warn!(
                        start,
                        saturated,
                        total,
                        "Could not saturate every atom; keeping best assignment ({:.1}% saturated).",
                        percentage
                    );
                    reporter.report(Progress::BestGuessSelected { start, percentage });
                    return Ok(outcome);
                }
                SweepState::Failed => {
                    return Err(EngineError::Unsatisfiable {
                        attempts: bond_count + 1,
                    });
                }
            }
        }
    }

    /// Tie-break for raising one ambiguous bond during a sweep.
    ///
    /// `previous` is the bond visited just before this one in the current walk.
    pub fn bond_order_can_be_increased(
        &self,
        graph: &MolecularGraph,
        bond_index: usize,
        previous: Option<usize>,
    ) -> Result<RaiseDecision, EngineError> {
        let Some(bond) = graph.bond(bond_index) else {
            return Ok(RaiseDecision::Keep);
        };
        if bond.order.increment().is_none() {
            return Ok(RaiseDecision::Keep);
        }

        let begin_open = self.has_headroom(bond.begin, graph)?;
        let end_open = self.has_headroom(bond.end, graph)?;

        if begin_open == end_open {
            return Ok(if begin_open {
                RaiseDecision::Raise
            } else {
                RaiseDecision::Keep
            });
        }

        let Some(before) = previous.and_then(|i| graph.bond(i)) else {
            return Ok(RaiseDecision::Keep);
        };
        if before.order == BondOrder::Double {
            return Ok(RaiseDecision::Keep);
        }
        match graph.bond(0) {
            Some(first) if bond.shares_atom_with(first) => Ok(RaiseDecision::Abort),
            _ => Ok(RaiseDecision::Keep),
        }
    }

    /// One attempt: reset, walk from `start` to the end and then back down from
    /// `start - 1`, and count saturated atoms.
    fn sweep(
        &self,
        graph: &mut MolecularGraph,
        start: usize,
        reporter: &ProgressReporter,
    ) -> Result<usize, EngineError> {
        reporter.report(Progress::SweepStarted { start });
        let bond_count = graph.bond_count();

        for index in 0..bond_count {
            if let Some(bond) = graph.bond_mut(index) {
                if bond.ambiguous {
                    bond.order = BondOrder::Single;
                }
            }
        }

        let mut previous = None;
        for index in (start..bond_count).chain((0..start.min(bond_count)).rev()) {
            let ambiguous = graph.bond(index).is_some_and(|b| b.ambiguous);
            if ambiguous {
                match self.bond_order_can_be_increased(graph, index, previous)? {
                    RaiseDecision::Raise => {
                        if let Some(bond) = graph.bond_mut(index) {
                            if let Some(next) = bond.order.increment() {
                                bond.order = next;
                            }
                        }
                    }
                    RaiseDecision::Keep => {}
                    RaiseDecision::Abort => {
                        trace!(start, bond = index, "Local conflict next to bond 0; sweep aborted.");
                        break;
                    }
                }
            }
            previous = Some(index);
        }

        let saturated = self.count_saturated(graph)?;
        debug!(start, saturated, total = graph.atom_count(), "Sweep finished.");
        reporter.report(Progress::SweepFinished {
            start,
            saturated,
            total: graph.atom_count(),
        });
        Ok(saturated)
    }

    fn count_saturated(&self, graph: &MolecularGraph) -> Result<usize, EngineError> {
        let mut count = 0;
        for (atom_id, _) in graph.atoms_iter() {
            if self.checker.is_saturated(atom_id, graph)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn has_headroom(&self, atom_id: AtomId, graph: &MolecularGraph) -> Result<bool, EngineError> {
        let atom = graph
            .atom(atom_id)
            .ok_or(EngineError::AtomNotFound(atom_id))?;
        Ok(self.used_valence(atom, atom_id, graph)? < self.budget(atom)?)
    }

    fn budget(&self, atom: &Atom) -> Result<f64, EngineError> {
        if let Some(valency) = atom.valency {
            return Ok(f64::from(valency));
        }
        self.checker
            .candidates(&atom.symbol)
            .first()
            .map(|c| c.bond_order_sum)
            .ok_or_else(|| {
                ConfigurationError::NoAtomType {
                    symbol: atom.symbol.clone(),
                }
                .into()
            })
    }

    fn used_valence(
        &self,
        atom: &Atom,
        atom_id: AtomId,
        graph: &MolecularGraph,
    ) -> Result<f64, EngineError> {
        let hydrogens = match atom.implicit_hydrogens {
            Some(count) => count,
            None => {
                let estimate = estimated_hydrogens(atom)?;
                trace!(symbol = %atom.symbol, estimate, "Using estimated hydrogen count.");
                estimate
            }
        };

        Ok(f64::from(graph.bond_order_sum(atom_id)) - f64::from(atom.charge())
            + f64::from(hydrogens))
    }

    /// Warns once for every ambiguous-bond atom whose hydrogen count has to be
    /// estimated, and fails early when the estimate is impossible.
    fn check_hydrogen_estimates(&self, graph: &MolecularGraph) -> Result<(), EngineError> {
        let mut seen: SecondaryMap<AtomId, ()> = SecondaryMap::new();
        for bond in graph.bonds().iter().filter(|b| b.ambiguous) {
            for atom_id in bond.atoms() {
                if seen.insert(atom_id, ()).is_some() {
                    continue;
                }
                let atom = graph
                    .atom(atom_id)
                    .ok_or(EngineError::AtomNotFound(atom_id))?;
                if atom.implicit_hydrogens.is_none() {
                    let estimate = estimated_hydrogens(atom)?;
                    warn!(
                        symbol = %atom.symbol,
                        estimate,
                        "Implicit hydrogen count unset; estimating from valency and neighbour count."
                    );
                }
            }
        }
        Ok(())
    }
}

/// `(8 - valency) - formal neighbour count`, for atoms without a hydrogen count.
fn estimated_hydrogens(atom: &Atom) -> Result<i32, EngineError> {
    let valency = atom
        .valency
        .ok_or_else(|| ConfigurationError::MissingValency {
            symbol: atom.symbol.clone(),
        })?;
    let neighbours = atom.formal_neighbour_count.ok_or_else(|| {
        ConfigurationError::MissingFormalNeighbourCount {
            symbol: atom.symbol.clone(),
        }
    })?;
    Ok((8 - valency as i32) - neighbours as i32)
}
