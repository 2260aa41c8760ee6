use super::config::DEFAULT_MAX_BACKTRACK_BONDS;
use super::error::EngineError;
use crate::core::atomtypes::library::{AtomTypeCandidate, AtomTypeSource};
use crate::core::models::atom::Atom;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::BondOrder;
use crate::core::topology::rings::RingSystem;
use slotmap::SecondaryMap;
use tracing::{debug, instrument, trace};

/// Tolerance used when comparing realised bond-order sums with fractional budgets.
pub const SATURATION_TOLERANCE: f64 = 1e-6;

/// Narrow view of saturation state for components that only need the predicate
/// and the greedy fill.
pub trait Saturation {
    /// Whether the atom's realised bonding matches one of its atom-type candidates.
    fn is_saturated(&self, atom_id: AtomId, graph: &MolecularGraph) -> Result<bool, EngineError>;

    /// Whether every atom in the graph is saturated.
    fn is_graph_saturated(&self, graph: &MolecularGraph) -> Result<bool, EngineError>;

    /// Greedy forward fill of bond orders, lowest-degree atoms first.
    fn saturate(&self, graph: &mut MolecularGraph) -> Result<(), EngineError>;
}

/// The set of bonds an operation may read and modify.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'s> {
    Graph,
    /// One ring system whose atoms carry overridden hydrogen counts; `hydrogens`
    /// holds the counts they had before the override.
    Fragment {
        system: &'s RingSystem,
        hydrogens: &'s SecondaryMap<AtomId, i32>,
    },
}

impl Scope<'_> {
    fn includes(self, bond_index: usize) -> bool {
        match self {
            Scope::Graph => true,
            Scope::Fragment { system, .. } => system.contains_bond(bond_index),
        }
    }

    fn incident_bonds(self, graph: &MolecularGraph, atom_id: AtomId) -> Vec<usize> {
        graph
            .bonds_of(atom_id)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|&i| self.includes(i))
            .collect()
    }

    fn atoms(self, graph: &MolecularGraph) -> Vec<AtomId> {
        match self {
            Scope::Graph => graph.atom_ids(),
            Scope::Fragment { system, .. } => system.atoms.clone(),
        }
    }

    fn bond_order_sum(self, graph: &MolecularGraph, atom_id: AtomId) -> u32 {
        self.incident_bonds(graph, atom_id)
            .into_iter()
            .filter_map(|i| graph.bond(i))
            .map(|b| u32::from(b.order.weight()))
            .sum()
    }

    /// Implicit hydrogens the atom really carries, ignoring any override.
    fn real_hydrogens(self, atom_id: AtomId, atom: &Atom) -> i32 {
        match self {
            Scope::Graph => atom.hydrogens(),
            Scope::Fragment { hydrogens, .. } => hydrogens
                .get(atom_id)
                .copied()
                .unwrap_or_else(|| atom.hydrogens()),
        }
    }
}

/// Checks and fills atom valences against an atom-type library.
///
/// The checker borrows its library and holds no other state, so it is cheap to copy
/// into every component that needs it.
pub struct SaturationChecker<'a, L: AtomTypeSource + ?Sized> {
    library: &'a L,
    max_backtrack_bonds: usize,
}

impl<L: AtomTypeSource + ?Sized> Clone for SaturationChecker<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: AtomTypeSource + ?Sized> Copy for SaturationChecker<'_, L> {}

impl<'a, L: AtomTypeSource + ?Sized> SaturationChecker<'a, L> {
    pub fn new(library: &'a L) -> Self {
        Self {
            library,
            max_backtrack_bonds: DEFAULT_MAX_BACKTRACK_BONDS,
        }
    }

    /// Caps the number of bonds [`Self::new_saturate`] accepts in one call.
    pub fn with_max_backtrack_bonds(mut self, limit: usize) -> Self {
        self.max_backtrack_bonds = limit;
        self
    }

    pub fn max_backtrack_bonds(&self) -> usize {
        self.max_backtrack_bonds
    }

    pub fn library(&self) -> &'a L {
        self.library
    }

    #[inline]
    pub fn candidates(&self, symbol: &str) -> &'a [AtomTypeCandidate] {
        self.library.candidates(symbol)
    }

    /// Remaining bond-order headroom of an atom.
    ///
    /// The largest `budget - (bond order sum + implicit H)` over all candidates,
    /// never below zero. Atoms without candidates have no headroom.
    pub fn current_max_bond_order(
        &self,
        atom_id: AtomId,
        graph: &MolecularGraph,
    ) -> Result<f64, EngineError> {
        let atom = graph
            .atom(atom_id)
            .ok_or(EngineError::AtomNotFound(atom_id))?;
        let used = f64::from(graph.bond_order_sum(atom_id)) + f64::from(atom.hydrogens());
        Ok(self
            .candidates(&atom.symbol)
            .iter()
            .map(|c| c.bond_order_sum - used)
            .fold(0.0, f64::max))
    }

    /// Whether the atom could still grow into `candidate`: same charge, spare
    /// budget and no bond already above the candidate's maximum order.
    pub fn could_match_atom_type(
        &self,
        atom_id: AtomId,
        candidate: &AtomTypeCandidate,
        graph: &MolecularGraph,
    ) -> Result<bool, EngineError> {
        let atom = graph
            .atom(atom_id)
            .ok_or(EngineError::AtomNotFound(atom_id))?;
        let used = f64::from(graph.bond_order_sum(atom_id)) + f64::from(atom.hydrogens());
        Ok(atom.charge() == candidate.formal_charge
            && used < candidate.bond_order_sum
            && !graph
                .max_bond_order(atom_id)
                .is_higher_than(candidate.max_bond_order))
    }

    /// A bond is saturated when both of its atoms are.
    pub fn is_bond_saturated(
        &self,
        bond_index: usize,
        graph: &MolecularGraph,
    ) -> Result<bool, EngineError> {
        let Some(bond) = graph.bond(bond_index) else {
            return Ok(true);
        };
        let [begin, end] = bond.atoms();
        Ok(self.is_saturated(begin, graph)? && self.is_saturated(end, graph)?)
    }

    /// A bond is unsaturated when neither of its atoms is saturated.
    pub fn is_bond_unsaturated(
        &self,
        bond_index: usize,
        graph: &MolecularGraph,
    ) -> Result<bool, EngineError> {
        let Some(bond) = graph.bond(bond_index) else {
            return Ok(false);
        };
        let [begin, end] = bond.atoms();
        Ok(!self.is_saturated(begin, graph)? && !self.is_saturated(end, graph)?)
    }

    /// Under-saturation as seen by the greedy fill: the bond-order sum inside
    /// `scope` is below the first candidate's budget minus the implicit hydrogens.
    /// Atoms without candidates never count as under-saturated.
    fn is_under_saturated(
        &self,
        atom_id: AtomId,
        graph: &MolecularGraph,
        scope: Scope<'_>,
    ) -> Result<bool, EngineError> {
        let atom = graph
            .atom(atom_id)
            .ok_or(EngineError::AtomNotFound(atom_id))?;
        let Some(first) = self.candidates(&atom.symbol).first() else {
            return Ok(false);
        };
        let sum = f64::from(scope.bond_order_sum(graph, atom_id));
        Ok(sum < first.bond_order_sum - f64::from(atom.hydrogens()))
    }

    /// Whether raising one of the atom's bonds to `next` keeps it inside its real
    /// valence: no candidate may be exceeded in order, and the graph-wide sum
    /// `bond orders - charge + real H` must stay within the first candidate's budget.
    fn fits_raise(
        &self,
        atom_id: AtomId,
        next: BondOrder,
        graph: &MolecularGraph,
        scope: Scope<'_>,
    ) -> Result<bool, EngineError> {
        let atom = graph
            .atom(atom_id)
            .ok_or(EngineError::AtomNotFound(atom_id))?;
        let candidates = self.candidates(&atom.symbol);
        let Some(first) = candidates.first() else {
            return Ok(false);
        };
        if candidates
            .iter()
            .all(|c| next.is_higher_than(c.max_bond_order))
        {
            return Ok(false);
        }
        let realised = f64::from(graph.bond_order_sum(atom_id) + 1) - f64::from(atom.charge())
            + f64::from(scope.real_hydrogens(atom_id, atom));
        Ok(realised <= first.bond_order_sum + SATURATION_TOLERANCE)
    }

    /// First bond of `atom_id` inside `scope` whose partner is under-saturated and
    /// which both endpoints can take one order higher.
    fn find_raisable_bond(
        &self,
        atom_id: AtomId,
        graph: &MolecularGraph,
        scope: Scope<'_>,
        aromatic_only: bool,
    ) -> Result<Option<usize>, EngineError> {
        for bond_index in scope.incident_bonds(graph, atom_id) {
            let Some(bond) = graph.bond(bond_index) else {
                continue;
            };
            if aromatic_only && !bond.aromatic {
                continue;
            }
            let Some(next) = bond.order.increment() else {
                continue;
            };
            let Some(partner) = bond.partner(atom_id) else {
                continue;
            };
            if self.is_under_saturated(partner, graph, scope)?
                && self.fits_raise(atom_id, next, graph, scope)?
                && self.fits_raise(partner, next, graph, scope)?
            {
                return Ok(Some(bond_index));
            }
        }
        Ok(None)
    }

    fn raise(graph: &mut MolecularGraph, bond_index: usize) {
        if let Some(bond) = graph.bond_mut(bond_index) {
            if let Some(next) = bond.order.increment() {
                trace!(bond = bond_index, from = %bond.order, to = %next, "Raising bond order.");
                bond.order = next;
            }
        }
    }

    #[instrument(skip_all, name = "heuristic_fill")]
    pub(crate) fn saturate_in(
        &self,
        graph: &mut MolecularGraph,
        scope: Scope<'_>,
    ) -> Result<(), EngineError> {
        let atom_ids = scope.atoms(graph);

        for threshold in 1..=3 {
            for &atom_id in &atom_ids {
                if scope.incident_bonds(graph, atom_id).len() != threshold {
                    continue;
                }
                let atom = graph
                    .atom(atom_id)
                    .ok_or(EngineError::AtomNotFound(atom_id))?;
                if self.candidates(&atom.symbol).is_empty() {
                    continue;
                }

                if atom.aromatic && self.is_under_saturated(atom_id, graph, scope)? {
                    if let Some(bond_index) = self.find_raisable_bond(atom_id, graph, scope, true)? {
                        Self::raise(graph, bond_index);
                    }
                }

                if self.is_under_saturated(atom_id, graph, scope)? {
                    if let Some(bond_index) =
                        self.find_raisable_bond(atom_id, graph, scope, false)?
                    {
                        Self::raise(graph, bond_index);
                    }
                }
            }
        }

        debug!(atoms = atom_ids.len(), "Heuristic fill pass finished.");
        Ok(())
    }
}

impl<L: AtomTypeSource + ?Sized> Saturation for SaturationChecker<'_, L> {
    fn is_saturated(&self, atom_id: AtomId, graph: &MolecularGraph) -> Result<bool, EngineError> {
        let atom = graph
            .atom(atom_id)
            .ok_or(EngineError::AtomNotFound(atom_id))?;
        let candidates = self.candidates(&atom.symbol);
        if candidates.is_empty() {
            return Ok(true);
        }

        let realised = f64::from(graph.bond_order_sum(atom_id)) - f64::from(atom.charge())
            + f64::from(atom.hydrogens());
        let max_order = graph.max_bond_order(atom_id);

        Ok(candidates.iter().any(|c| {
            (realised - c.bond_order_sum).abs() < SATURATION_TOLERANCE
                && !max_order.is_higher_than(c.max_bond_order)
        }))
    }

    fn is_graph_saturated(&self, graph: &MolecularGraph) -> Result<bool, EngineError> {
        for (atom_id, _) in graph.atoms_iter() {
            if !self.is_saturated(atom_id, graph)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn saturate(&self, graph: &mut MolecularGraph) -> Result<(), EngineError> {
        self.saturate_in(graph, Scope::Graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::atomtypes::library::AtomTypeLibrary;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::{Bond, BondOrder};

    fn chain(graph: &mut MolecularGraph, atoms: &[Atom]) -> Vec<AtomId> {
        let ids: Vec<AtomId> = atoms.iter().map(|a| graph.add_atom(a.clone())).collect();
        for pair in ids.windows(2) {
            graph.add_bond(pair[0], pair[1], BondOrder::Single).unwrap();
        }
        ids
    }

    #[test]
    fn atom_without_candidates_is_trivially_saturated() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        let ids = chain(&mut graph, &[Atom::new("Xx"), Atom::new("C").with_hydrogens(3)]);

        assert!(checker.is_saturated(ids[0], &graph).unwrap());
        assert_eq!(checker.current_max_bond_order(ids[0], &graph).unwrap(), 0.0);
    }

    #[test]
    fn ethane_is_saturated_and_ethene_skeleton_is_not() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);

        let mut ethane = MolecularGraph::new();
        chain(
            &mut ethane,
            &[Atom::new("C").with_hydrogens(3), Atom::new("C").with_hydrogens(3)],
        );
        assert!(checker.is_graph_saturated(&ethane).unwrap());

        let mut ethene = MolecularGraph::new();
        let ids = chain(
            &mut ethene,
            &[Atom::new("C").with_hydrogens(2), Atom::new("C").with_hydrogens(2)],
        );
        assert!(!checker.is_saturated(ids[0], &ethene).unwrap());
        assert!(!checker.is_graph_saturated(&ethene).unwrap());
        assert_eq!(checker.current_max_bond_order(ids[0], &ethene).unwrap(), 1.0);
    }

    #[test]
    fn max_order_above_candidate_limit_is_not_saturated() {
        // Budget matches C.sp3 but the double bond exceeds its single-bond limit,
        // and no other carbon type allows only single bonds with this sum.
        let library = AtomTypeLibrary::from_entries(vec![(
            "C".to_string(),
            AtomTypeCandidate::new("C.sp3", 4.0, BondOrder::Single),
        )]);
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        let c1 = graph.add_atom(Atom::new("C").with_hydrogens(2));
        let c2 = graph.add_atom(Atom::new("C").with_hydrogens(2));
        graph.add_bond(c1, c2, BondOrder::Double).unwrap();

        assert!(!checker.is_saturated(c1, &graph).unwrap());
    }

    #[test]
    fn formal_charge_shifts_the_realised_sum() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        let ids = chain(
            &mut graph,
            &[
                Atom::new("C").with_hydrogens(3),
                Atom::new("O").with_charge(-1),
            ],
        );
        assert!(checker.is_saturated(ids[1], &graph).unwrap());
    }

    #[test]
    fn is_saturated_is_deterministic() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        let ids = chain(
            &mut graph,
            &[Atom::new("C").with_hydrogens(2), Atom::new("O")],
        );
        let orders = graph.bond_orders();

        for &id in &ids {
            let first = checker.is_saturated(id, &graph).unwrap();
            let second = checker.is_saturated(id, &graph).unwrap();
            assert_eq!(first, second);
        }
        assert_eq!(graph.bond_orders(), orders);
    }

    #[test]
    fn fractional_budgets_use_tolerance() {
        let library = AtomTypeLibrary::from_entries(vec![(
            "C".to_string(),
            AtomTypeCandidate::new("C.ar", 4.0 + 1e-9, BondOrder::Double),
        )]);
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        let ids = chain(
            &mut graph,
            &[Atom::new("C").with_hydrogens(3), Atom::new("C").with_hydrogens(3)],
        );
        assert!(checker.is_saturated(ids[0], &graph).unwrap());
    }

    #[test]
    fn unknown_atom_is_reported() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let graph = MolecularGraph::new();
        let mut other = MolecularGraph::new();
        let foreign = other.add_atom(Atom::new("C"));

        assert!(matches!(
            checker.is_saturated(foreign, &graph),
            Err(EngineError::AtomNotFound(id)) if id == foreign
        ));
    }

    #[test]
    fn could_match_atom_type_checks_charge_budget_and_max_order() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        let ids = chain(
            &mut graph,
            &[Atom::new("C").with_hydrogens(2), Atom::new("C").with_hydrogens(2)],
        );
        let sp3 = &library.candidates("C")[0];
        let sp2 = &library.candidates("C")[1];
        let charged = AtomTypeCandidate::new("C.plus", 4.0, BondOrder::Double).with_formal_charge(1);

        assert!(checker.could_match_atom_type(ids[0], sp3, &graph).unwrap());
        assert!(checker.could_match_atom_type(ids[0], sp2, &graph).unwrap());
        assert!(!checker.could_match_atom_type(ids[0], &charged, &graph).unwrap());

        graph.bond_mut(0).unwrap().order = BondOrder::Double;
        assert!(!checker.could_match_atom_type(ids[0], sp3, &graph).unwrap());
        assert!(!checker.could_match_atom_type(ids[0], sp2, &graph).unwrap());
    }

    #[test]
    fn bond_saturation_requires_both_or_neither_atom() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        chain(
            &mut graph,
            &[
                Atom::new("C").with_hydrogens(3),
                Atom::new("C").with_hydrogens(1),
                Atom::new("C").with_hydrogens(2),
            ],
        );

        // CH3 is saturated, the CH is not: mixed bond.
        assert!(!checker.is_bond_saturated(0, &graph).unwrap());
        assert!(!checker.is_bond_unsaturated(0, &graph).unwrap());
        // CH and CH2 both lack a bond: unsaturated.
        assert!(checker.is_bond_unsaturated(1, &graph).unwrap());
    }

    #[test]
    fn saturate_fills_double_and_triple_bonds_in_chains() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);

        let mut ethene = MolecularGraph::new();
        chain(
            &mut ethene,
            &[Atom::new("C").with_hydrogens(2), Atom::new("C").with_hydrogens(2)],
        );
        checker.saturate(&mut ethene).unwrap();
        assert_eq!(ethene.bond_orders(), vec![BondOrder::Double]);
        assert!(checker.is_graph_saturated(&ethene).unwrap());

        let mut ethyne = MolecularGraph::new();
        chain(
            &mut ethyne,
            &[Atom::new("C").with_hydrogens(1), Atom::new("C").with_hydrogens(1)],
        );
        checker.saturate(&mut ethyne).unwrap();
        assert_eq!(ethyne.bond_orders(), vec![BondOrder::Triple]);
        assert!(checker.is_graph_saturated(&ethyne).unwrap());
    }

    #[test]
    fn saturate_builds_a_carbonyl() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        chain(
            &mut graph,
            &[
                Atom::new("C").with_hydrogens(3),
                Atom::new("C").with_hydrogens(1),
                Atom::new("O"),
            ],
        );

        checker.saturate(&mut graph).unwrap();
        assert_eq!(graph.bond_orders(), vec![BondOrder::Single, BondOrder::Double]);
        assert!(checker.is_graph_saturated(&graph).unwrap());
    }

    #[test]
    fn saturate_leaves_saturated_graph_untouched() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        chain(
            &mut graph,
            &[
                Atom::new("C").with_hydrogens(3),
                Atom::new("O").with_hydrogens(1),
            ],
        );
        checker.saturate(&mut graph).unwrap();
        assert_eq!(graph.bond_orders(), vec![BondOrder::Single]);
    }

    #[test]
    fn saturate_keeps_charged_atoms_within_their_budget() {
        // O- already realises 1 - (-1) = 2; a double bond would push it to 3.
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        chain(
            &mut graph,
            &[
                Atom::new("C").with_hydrogens(2),
                Atom::new("O").with_charge(-1),
            ],
        );

        checker.saturate(&mut graph).unwrap();
        assert_eq!(graph.bond_orders(), vec![BondOrder::Single]);
    }

    #[test]
    fn saturate_skips_partners_without_candidates() {
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        chain(
            &mut graph,
            &[Atom::new("C").with_hydrogens(2), Atom::new("Xx")],
        );
        checker.saturate(&mut graph).unwrap();
        assert_eq!(graph.bond_orders(), vec![BondOrder::Single]);
    }

    #[test]
    fn saturate_is_a_known_limitation_on_pyrrole_like_rings() {
        // The greedy pass closes the first C=C it meets, which strands the two
        // carbons next to nitrogen without a partner for their second double bond.
        let library = AtomTypeLibrary::builtin();
        let checker = SaturationChecker::new(&library);
        let mut graph = MolecularGraph::new();
        let c2 = graph.add_atom(Atom::new("C").with_hydrogens(1).aromatic());
        let c3 = graph.add_atom(Atom::new("C").with_hydrogens(1).aromatic());
        let c1 = graph.add_atom(Atom::new("C").with_hydrogens(1).aromatic());
        let c4 = graph.add_atom(Atom::new("C").with_hydrogens(1).aromatic());
        let n = graph.add_atom(Atom::new("N").with_hydrogens(1).aromatic());
        for (a, b) in [(c2, c3), (c3, c4), (c4, n), (n, c1), (c1, c2)] {
            let mut bond = Bond::new(a, b, BondOrder::Single);
            bond.aromatic = true;
            graph.insert_bond(bond).unwrap();
        }

        checker.saturate(&mut graph).unwrap();

        assert_eq!(graph.bond(0).unwrap().order, BondOrder::Double);
        assert!(!checker.is_saturated(c1, &graph).unwrap());
        assert!(!checker.is_saturated(c4, &graph).unwrap());
        assert!(!checker.is_graph_saturated(&graph).unwrap());

        // A second pass terminates and makes no further progress.
        let before = graph.bond_orders();
        checker.saturate(&mut graph).unwrap();
        assert_eq!(graph.bond_orders(), before);
    }
}
