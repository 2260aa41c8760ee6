use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use slotmap::SecondaryMap;
use std::collections::{HashSet, VecDeque};

/// A fused ring system: every ring bond reachable from another through shared atoms.
///
/// Atoms are listed in graph insertion order, bonds by ascending declaration index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingSystem {
    pub atoms: Vec<AtomId>,
    pub bonds: Vec<usize>,
}

impl RingSystem {
    pub fn contains_atom(&self, atom_id: AtomId) -> bool {
        self.atoms.contains(&atom_id)
    }

    pub fn contains_bond(&self, bond_index: usize) -> bool {
        self.bonds.binary_search(&bond_index).is_ok()
    }

    /// Number of this system's bonds incident to `atom_id`.
    pub fn degree_within(&self, graph: &MolecularGraph, atom_id: AtomId) -> usize {
        graph
            .bonds_of(atom_id)
            .unwrap_or_default()
            .iter()
            .filter(|&&i| self.contains_bond(i))
            .count()
    }
}

/// Partitions a molecular graph into independent fused-ring systems.
pub trait RingSystemFinder {
    fn find_fused_ring_systems(&self, graph: &MolecularGraph) -> Vec<RingSystem>;
}

/// Default ring partitioner.
///
/// A bond lies on a ring iff it is not a bridge of the graph. Ring bonds that share
/// an atom belong to the same system, which groups fused, bridged and spiro rings
/// together. Systems are returned ordered by their lowest bond index.
#[derive(Debug, Clone, Copy, Default)]
pub struct FusedRingPartitioner;

impl FusedRingPartitioner {
    pub fn new() -> Self {
        Self
    }
}

impl RingSystemFinder for FusedRingPartitioner {
    fn find_fused_ring_systems(&self, graph: &MolecularGraph) -> Vec<RingSystem> {
        let ring_bonds = find_ring_bonds(graph);
        let bonds = graph.bonds();

        let mut insertion_rank: SecondaryMap<AtomId, usize> = SecondaryMap::new();
        for (rank, atom_id) in graph.atom_ids().into_iter().enumerate() {
            insertion_rank.insert(atom_id, rank);
        }

        let mut assigned = vec![false; bonds.len()];
        let mut systems = Vec::new();

        for start in 0..bonds.len() {
            if !ring_bonds[start] || assigned[start] {
                continue;
            }

            let mut system = RingSystem::default();
            let mut seen_atoms = HashSet::new();
            let mut queue = VecDeque::from([start]);
            assigned[start] = true;

            while let Some(bond_index) = queue.pop_front() {
                system.bonds.push(bond_index);
                for atom_id in bonds[bond_index].atoms() {
                    if seen_atoms.insert(atom_id) {
                        system.atoms.push(atom_id);
                    }
                    for &next in graph.bonds_of(atom_id).unwrap_or_default() {
                        if ring_bonds[next] && !assigned[next] {
                            assigned[next] = true;
                            queue.push_back(next);
                        }
                    }
                }
            }

            system.bonds.sort_unstable();
            system
                .atoms
                .sort_by_key(|&id| insertion_rank.get(id).copied().unwrap_or(usize::MAX));
            systems.push(system);
        }

        systems
    }
}

/// Flags every bond that lies on at least one cycle.
///
/// Iterative Tarjan low-link search; a bond is a ring bond iff it is not a bridge.
pub fn find_ring_bonds(graph: &MolecularGraph) -> Vec<bool> {
    let bonds = graph.bonds();
    let mut is_bridge = vec![false; bonds.len()];
    let mut discovery: SecondaryMap<AtomId, usize> = SecondaryMap::new();
    let mut low: SecondaryMap<AtomId, usize> = SecondaryMap::new();
    let mut timer = 0usize;

    for root in graph.atom_ids() {
        if discovery.contains_key(root) {
            continue;
        }
        discovery.insert(root, timer);
        low.insert(root, timer);
        timer += 1;

        // (atom, bond used to reach it, next incident bond position)
        let mut stack: Vec<(AtomId, Option<usize>, usize)> = vec![(root, None, 0)];

        while let Some(frame) = stack.last_mut() {
            let (atom_id, parent_bond) = (frame.0, frame.1);
            let incident = graph.bonds_of(atom_id).unwrap_or_default();

            if frame.2 < incident.len() {
                let bond_index = incident[frame.2];
                frame.2 += 1;
                if Some(bond_index) == parent_bond {
                    continue;
                }
                let Some(next) = bonds[bond_index].partner(atom_id) else {
                    continue;
                };
                if let Some(&seen_at) = discovery.get(next) {
                    low[atom_id] = low[atom_id].min(seen_at);
                } else {
                    discovery.insert(next, timer);
                    low.insert(next, timer);
                    timer += 1;
                    stack.push((next, Some(bond_index), 0));
                }
            } else {
                stack.pop();
                if let (Some(bond_index), Some(parent)) = (parent_bond, stack.last()) {
                    let parent_id = parent.0;
                    low[parent_id] = low[parent_id].min(low[atom_id]);
                    if low[atom_id] > discovery[parent_id] {
                        is_bridge[bond_index] = true;
                    }
                }
            }
        }
    }

    is_bridge.into_iter().map(|bridge| !bridge).collect()
}
