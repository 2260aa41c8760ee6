use super::error::{ConfigurationError, EngineError};
use super::saturation::SaturationChecker;
use crate::core::atomtypes::library::AtomTypeSource;
use crate::core::models::atom::Atom;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::{Bond, BondOrder};
use tracing::warn;

impl<L: AtomTypeSource + ?Sized> SaturationChecker<'_, L> {
    /// Number of implicit hydrogens an atom needs to fill its first atom type.
    ///
    /// Hydrogen atoms use `1 - bond order sum - single electrons - charge`. Every
    /// other element uses `budget - bond order sum - single electrons + charge`,
    /// truncated, minus one more for an aromatic atom none of whose bonds is double
    /// or aromatic.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoAtomType`] when `strict` is set and the
    /// element has no candidates. Without `strict` such atoms get zero hydrogens.
    pub fn calculate_number_of_implicit_hydrogens(
        &self,
        atom: &Atom,
        bond_order_sum: f64,
        single_electron_sum: u32,
        connected_bonds: &[Bond],
        strict: bool,
    ) -> Result<i32, EngineError> {
        let single_electrons = f64::from(single_electron_sum);
        let charge = f64::from(atom.charge());

        if atom.is_hydrogen() {
            return Ok((1.0 - bond_order_sum - single_electrons - charge) as i32);
        }

        let Some(first) = self.candidates(&atom.symbol).first() else {
            if strict {
                return Err(ConfigurationError::NoAtomType {
                    symbol: atom.symbol.clone(),
                }
                .into());
            }
            warn!(symbol = %atom.symbol, "No atom type for element; assuming no implicit hydrogens.");
            return Ok(0);
        };

        let mut missing =
            (first.bond_order_sum - bond_order_sum - single_electrons + charge) as i32;

        if atom.aromatic
            && !connected_bonds
                .iter()
                .any(|b| b.order == BondOrder::Double || b.aromatic)
        {
            missing -= 1;
        }

        Ok(missing)
    }

    /// [`Self::calculate_number_of_implicit_hydrogens`] with the sums taken from
    /// the atom's bonds in `graph`.
    pub fn implicit_hydrogens_for(
        &self,
        atom_id: AtomId,
        graph: &MolecularGraph,
        strict: bool,
    ) -> Result<i32, EngineError> {
        let atom = graph
            .atom(atom_id)
            .ok_or(EngineError::AtomNotFound(atom_id))?;
        let connected: Vec<Bond> = graph
            .bonds_of(atom_id)
            .unwrap_or_default()
            .iter()
            .filter_map(|&i| graph.bond(i).copied())
            .collect();

        self.calculate_number_of_implicit_hydrogens(
            atom,
            f64::from(graph.bond_order_sum(atom_id)),
            atom.single_electrons,
            &connected,
            strict,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::atomtypes::library::AtomTypeLibrary;

    fn checker_fixture(library: &AtomTypeLibrary) -> SaturationChecker<'_, AtomTypeLibrary> {
        SaturationChecker::new(library)
    }

    #[test]
    fn hydrogen_uses_its_direct_formula() {
        let library = AtomTypeLibrary::builtin();
        let checker = checker_fixture(&library);

        let h = Atom::new("H");
        assert_eq!(
            checker
                .calculate_number_of_implicit_hydrogens(&h, 0.0, 0, &[], true)
                .unwrap(),
            1
        );
        assert_eq!(
            checker
                .calculate_number_of_implicit_hydrogens(&h, 1.0, 0, &[], true)
                .unwrap(),
            0
        );

        let hydride = Atom::new("H").with_charge(-1);
        assert_eq!(
            checker
                .calculate_number_of_implicit_hydrogens(&hydride, 0.0, 0, &[], true)
                .unwrap(),
            2
        );
    }

    #[test]
    fn heavy_atoms_fill_their_first_candidate() {
        let library = AtomTypeLibrary::builtin();
        let checker = checker_fixture(&library);

        let carbon = Atom::new("C");
        assert_eq!(
            checker
                .calculate_number_of_implicit_hydrogens(&carbon, 1.0, 0, &[], false)
                .unwrap(),
            3
        );
        assert_eq!(
            checker
                .calculate_number_of_implicit_hydrogens(&carbon, 2.0, 1, &[], false)
                .unwrap(),
            1
        );

        let ammonium = Atom::new("N").with_charge(1);
        assert_eq!(
            checker
                .calculate_number_of_implicit_hydrogens(&ammonium, 0.0, 0, &[], false)
                .unwrap(),
            4
        );
    }

    #[test]
    fn aromatic_atom_without_double_or_aromatic_bond_loses_one() {
        let library = AtomTypeLibrary::builtin();
        let checker = checker_fixture(&library);
        let mut graph = MolecularGraph::new();
        let c1 = graph.add_atom(Atom::new("C").aromatic());
        let c2 = graph.add_atom(Atom::new("C"));
        let c3 = graph.add_atom(Atom::new("C"));
        graph.add_bond(c1, c2, BondOrder::Single).unwrap();
        graph.add_bond(c1, c3, BondOrder::Single).unwrap();

        assert_eq!(checker.implicit_hydrogens_for(c1, &graph, false).unwrap(), 1);

        graph.bond_mut(0).unwrap().aromatic = true;
        assert_eq!(checker.implicit_hydrogens_for(c1, &graph, false).unwrap(), 2);

        graph.bond_mut(0).unwrap().aromatic = false;
        graph.bond_mut(1).unwrap().order = BondOrder::Double;
        assert_eq!(checker.implicit_hydrogens_for(c1, &graph, false).unwrap(), 1);
    }

    #[test]
    fn unknown_element_depends_on_strictness() {
        let library = AtomTypeLibrary::builtin();
        let checker = checker_fixture(&library);
        let atom = Atom::new("Xx");

        assert_eq!(
            checker
                .calculate_number_of_implicit_hydrogens(&atom, 1.0, 0, &[], false)
                .unwrap(),
            0
        );
        assert!(matches!(
            checker.calculate_number_of_implicit_hydrogens(&atom, 1.0, 0, &[], true),
            Err(EngineError::Configuration(ConfigurationError::NoAtomType { ref symbol })) if symbol == "Xx"
        ));
    }

    #[test]
    fn graph_sums_include_single_electrons() {
        let library = AtomTypeLibrary::builtin();
        let checker = checker_fixture(&library);
        let mut graph = MolecularGraph::new();
        let mut radical = Atom::new("C");
        radical.single_electrons = 1;
        let c = graph.add_atom(radical);
        let o = graph.add_atom(Atom::new("O"));
        graph.add_bond(c, o, BondOrder::Single).unwrap();

        assert_eq!(checker.implicit_hydrogens_for(c, &graph, true).unwrap(), 2);
        assert_eq!(checker.implicit_hydrogens_for(o, &graph, true).unwrap(), 1);
    }
}
