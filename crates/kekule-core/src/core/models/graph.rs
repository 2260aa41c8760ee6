use super::atom::Atom;
use super::ids::AtomId;
use super::topology::{Bond, BondOrder};
use slotmap::{SecondaryMap, SlotMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Atom {0:?} does not belong to this graph")]
    UnknownAtom(AtomId),
    #[error("A bond must join two distinct atoms, got {0:?} twice")]
    SelfBond(AtomId),
}

/// Represents a molecular graph: an ordered collection of atoms and bonds.
///
/// Atoms are stored in a slot map and referenced by [`AtomId`]; iteration follows
/// insertion order. Bonds are stored in declaration order and their position in
/// that list is the stable bond index used by the bond-order search.
#[derive(Debug, Clone, Default)]
pub struct MolecularGraph {
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// All bonds, in declaration order.
    bonds: Vec<Bond>,
    /// Cached incident bond indices, keyed by atom ID.
    bond_adjacency: SecondaryMap<AtomId, Vec<usize>>,
}

impl MolecularGraph {
    /// Creates a new, empty molecular graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to an atom by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The atom ID to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&Atom)` if the atom exists, otherwise `None`.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The atom ID to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&mut Atom)` if the atom exists, otherwise `None`.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns an iterator over all atoms in insertion order.
    ///
    /// # Return
    ///
    /// An iterator yielding `(AtomId, &Atom)` pairs.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    /// Returns the IDs of all atoms in insertion order.
    pub fn atom_ids(&self) -> Vec<AtomId> {
        self.atoms.keys().collect()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Returns a slice of all bonds in declaration order.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn bond(&self, index: usize) -> Option<&Bond> {
        self.bonds.get(index)
    }

    pub fn bond_mut(&mut self, index: usize) -> Option<&mut Bond> {
        self.bonds.get_mut(index)
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Adds an atom to the graph.
    ///
    /// # Arguments
    ///
    /// * `atom` - The atom to add.
    ///
    /// # Return
    ///
    /// The ID assigned to the new atom.
    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        let atom_id = self.atoms.insert(atom);
        self.bond_adjacency.insert(atom_id, Vec::new());
        atom_id
    }

    /// Adds a bond between two atoms with a fixed order.
    ///
    /// This method is idempotent; adding a bond between two atoms that are already
    /// bonded returns the index of the existing bond without creating a duplicate.
    ///
    /// # Arguments
    ///
    /// * `begin` - ID of the first atom.
    /// * `end` - ID of the second atom.
    /// * `order` - The order of the bond.
    ///
    /// # Return
    ///
    /// The declaration index of the bond.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if either atom is unknown or both IDs are the same.
    pub fn add_bond(
        &mut self,
        begin: AtomId,
        end: AtomId,
        order: BondOrder,
    ) -> Result<usize, GraphError> {
        self.insert_bond(Bond::new(begin, end, order))
    }

    /// Adds a single-or-double bond whose order is left for the engine to decide.
    pub fn add_ambiguous_bond(&mut self, begin: AtomId, end: AtomId) -> Result<usize, GraphError> {
        self.insert_bond(Bond::ambiguous(begin, end))
    }

    /// Inserts a fully specified bond and updates the adjacency cache.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if either atom is unknown or both IDs are the same.
    pub fn insert_bond(&mut self, bond: Bond) -> Result<usize, GraphError> {
        for atom_id in bond.atoms() {
            if !self.atoms.contains_key(atom_id) {
                return Err(GraphError::UnknownAtom(atom_id));
            }
        }
        if bond.begin == bond.end {
            return Err(GraphError::SelfBond(bond.begin));
        }

        if let Some(existing) = self.bond_between(bond.begin, bond.end) {
            return Ok(existing);
        }

        let index = self.bonds.len();
        self.bonds.push(bond);
        self.bond_adjacency[bond.begin].push(index);
        self.bond_adjacency[bond.end].push(index);
        Ok(index)
    }

    /// Returns the indices of the bonds incident to an atom.
    ///
    /// # Return
    ///
    /// Returns `Some(&[usize])` if the atom exists, otherwise `None`.
    pub fn bonds_of(&self, atom_id: AtomId) -> Option<&[usize]> {
        self.bond_adjacency.get(atom_id).map(|v| v.as_slice())
    }

    /// Retrieves the bonded neighbours of an atom, in bond declaration order.
    pub fn bonded_neighbors(&self, atom_id: AtomId) -> Vec<AtomId> {
        self.bonds_of(atom_id)
            .unwrap_or_default()
            .iter()
            .filter_map(|&i| self.bonds[i].partner(atom_id))
            .collect()
    }

    /// Number of explicit bonds on the atom; zero for unknown atoms.
    pub fn degree(&self, atom_id: AtomId) -> usize {
        self.bonds_of(atom_id).map_or(0, |b| b.len())
    }

    /// Index of the bond joining two atoms, if any.
    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<usize> {
        self.bonds_of(a)?
            .iter()
            .copied()
            .find(|&i| self.bonds[i].contains(b))
    }

    /// Sum of the order weights of all bonds incident to the atom.
    pub fn bond_order_sum(&self, atom_id: AtomId) -> u32 {
        self.bonds_of(atom_id)
            .unwrap_or_default()
            .iter()
            .map(|&i| u32::from(self.bonds[i].order.weight()))
            .sum()
    }

    /// Highest order among the bonds incident to the atom; `Unset` when it has none.
    pub fn max_bond_order(&self, atom_id: AtomId) -> BondOrder {
        self.bonds_of(atom_id)
            .unwrap_or_default()
            .iter()
            .map(|&i| self.bonds[i].order)
            .max()
            .unwrap_or_default()
    }

    /// Snapshot of every bond order, indexed like [`Self::bonds`].
    pub fn bond_orders(&self) -> Vec<BondOrder> {
        self.bonds.iter().map(|b| b.order).collect()
    }

    /// Writes back orders previously taken with [`Self::bond_orders`].
    pub fn restore_bond_orders(&mut self, orders: &[BondOrder]) {
        for (bond, &order) in self.bonds.iter_mut().zip(orders) {
            bond.order = order;
        }
    }

    pub fn has_ambiguous_bonds(&self) -> bool {
        self.bonds.iter().any(|b| b.ambiguous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRefs {
        c1: AtomId,
        c2: AtomId,
        o: AtomId,
    }

    fn create_acetaldehyde_skeleton() -> (MolecularGraph, TestRefs) {
        let mut graph = MolecularGraph::new();
        let c1 = graph.add_atom(Atom::new("C").with_hydrogens(3));
        let c2 = graph.add_atom(Atom::new("C").with_hydrogens(1));
        let o = graph.add_atom(Atom::new("O"));
        graph.add_bond(c1, c2, BondOrder::Single).unwrap();
        graph.add_bond(c2, o, BondOrder::Double).unwrap();
        (graph, TestRefs { c1, c2, o })
    }

    #[test]
    fn graph_creation_and_access() {
        let (graph, refs) = create_acetaldehyde_skeleton();

        assert_eq!(graph.atom_count(), 3);
        assert_eq!(graph.bond_count(), 2);
        assert_eq!(graph.atom(refs.o).unwrap().symbol, "O");
        assert_eq!(graph.atom_ids(), vec![refs.c1, refs.c2, refs.o]);
        assert_eq!(graph.bond(1).unwrap().order, BondOrder::Double);
        assert!(graph.bond(2).is_none());
    }

    #[test]
    fn adjacency_and_degree_are_tracked() {
        let (graph, refs) = create_acetaldehyde_skeleton();

        assert_eq!(graph.degree(refs.c1), 1);
        assert_eq!(graph.degree(refs.c2), 2);
        assert_eq!(graph.bonds_of(refs.c2).unwrap(), &[0, 1]);
        assert_eq!(graph.bonded_neighbors(refs.c2), vec![refs.c1, refs.o]);
        assert_eq!(graph.bond_between(refs.o, refs.c2), Some(1));
        assert_eq!(graph.bond_between(refs.c1, refs.o), None);
    }

    #[test]
    fn bond_order_sum_and_max_order_reflect_incident_bonds() {
        let (graph, refs) = create_acetaldehyde_skeleton();

        assert_eq!(graph.bond_order_sum(refs.c1), 1);
        assert_eq!(graph.bond_order_sum(refs.c2), 3);
        assert_eq!(graph.bond_order_sum(refs.o), 2);
        assert_eq!(graph.max_bond_order(refs.c1), BondOrder::Single);
        assert_eq!(graph.max_bond_order(refs.c2), BondOrder::Double);
    }

    #[test]
    fn isolated_atom_has_unset_max_order_and_zero_sum() {
        let mut graph = MolecularGraph::new();
        let na = graph.add_atom(Atom::new("Na"));
        assert_eq!(graph.bond_order_sum(na), 0);
        assert_eq!(graph.max_bond_order(na), BondOrder::Unset);
        assert!(graph.bonded_neighbors(na).is_empty());
    }

    #[test]
    fn add_bond_is_idempotent() {
        let (mut graph, refs) = create_acetaldehyde_skeleton();
        let index = graph.add_bond(refs.c2, refs.c1, BondOrder::Triple).unwrap();
        assert_eq!(index, 0);
        assert_eq!(graph.bond_count(), 2);
        assert_eq!(graph.bond(0).unwrap().order, BondOrder::Single);
    }

    #[test]
    fn add_bond_rejects_self_bonds_and_foreign_atoms() {
        let (mut graph, refs) = create_acetaldehyde_skeleton();
        assert_eq!(
            graph.add_bond(refs.c1, refs.c1, BondOrder::Single),
            Err(GraphError::SelfBond(refs.c1))
        );

        let mut other = MolecularGraph::new();
        other.add_atom(Atom::new("C"));
        other.add_atom(Atom::new("C"));
        other.add_atom(Atom::new("C"));
        let foreign = other.add_atom(Atom::new("N"));
        assert_eq!(
            graph.add_bond(refs.c1, foreign, BondOrder::Single),
            Err(GraphError::UnknownAtom(foreign))
        );
    }

    #[test]
    fn ambiguous_bonds_are_reported() {
        let (mut graph, refs) = create_acetaldehyde_skeleton();
        assert!(!graph.has_ambiguous_bonds());

        let n = graph.add_atom(Atom::new("N"));
        let index = graph.add_ambiguous_bond(refs.c1, n).unwrap();
        assert!(graph.has_ambiguous_bonds());
        assert!(graph.bond(index).unwrap().ambiguous);
    }

    #[test]
    fn bond_order_snapshot_can_be_restored() {
        let (mut graph, _) = create_acetaldehyde_skeleton();
        let snapshot = graph.bond_orders();

        graph.bond_mut(0).unwrap().order = BondOrder::Triple;
        graph.bond_mut(1).unwrap().order = BondOrder::Single;
        graph.restore_bond_orders(&snapshot);

        assert_eq!(graph.bond_orders(), vec![BondOrder::Single, BondOrder::Double]);
    }
}
