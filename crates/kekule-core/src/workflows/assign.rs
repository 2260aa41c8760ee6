use crate::core::atomtypes::library::{AtomTypeLibrary, AtomTypeSource};
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::BondOrder;
use crate::core::topology::rings::FusedRingPartitioner;
use crate::engine::config::{DecisionConfig, SaturationStrategy};
use crate::engine::decider::BondOrderDecider;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::saturation::{Saturation, SaturationChecker};
use crate::engine::state::DecisionOutcome;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Summary of a graph's saturation state after (or without) an assignment run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentReport {
    pub strategy: SaturationStrategy,
    /// Set only by the rotation search.
    pub outcome: Option<DecisionOutcome>,
    pub saturated_atoms: usize,
    pub total_atoms: usize,
    pub unsaturated: Vec<AtomId>,
    pub bond_orders: Vec<BondOrder>,
    pub implicit_hydrogens: Vec<(AtomId, i32)>,
}

impl AssignmentReport {
    pub fn is_fully_saturated(&self) -> bool {
        self.saturated_atoms == self.total_atoms
    }

    pub fn saturation_percentage(&self) -> f64 {
        if self.total_atoms == 0 {
            100.0
        } else {
            self.saturated_atoms as f64 * 100.0 / self.total_atoms as f64
        }
    }
}

/// Loads the configured atom-type library, or the built-in one when none is set.
///
/// Files ending in `.csv` are read as CSV, everything else as TOML.
pub fn load_library(config: &DecisionConfig) -> Result<AtomTypeLibrary, EngineError> {
    match &config.atom_types_path {
        Some(path) => {
            info!(path = %path.display(), "Loading atom-type library.");
            let library = if is_csv(path) {
                AtomTypeLibrary::load_csv(path)?
            } else {
                AtomTypeLibrary::load(path)?
            };
            Ok(library)
        }
        None => Ok(AtomTypeLibrary::builtin()),
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Assigns bond orders to `graph` with the configured strategy and library.
#[instrument(skip_all, name = "assignment_workflow", fields(strategy = ?config.strategy))]
pub fn run(
    graph: &mut MolecularGraph,
    config: &DecisionConfig,
    reporter: &ProgressReporter,
) -> Result<AssignmentReport, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Loading atom types",
    });
    let library = load_library(config)?;
    reporter.report(Progress::PhaseFinish);

    run_with_library(graph, config, &library, reporter)
}

/// Same as [`run`] with a caller-supplied atom-type source.
pub fn run_with_library<L>(
    graph: &mut MolecularGraph,
    config: &DecisionConfig,
    library: &L,
    reporter: &ProgressReporter,
) -> Result<AssignmentReport, EngineError>
where
    L: AtomTypeSource + ?Sized,
{
    let checker =
        SaturationChecker::new(library).with_max_backtrack_bonds(config.max_backtrack_bonds);

    reporter.report(Progress::PhaseStart {
        name: "Assigning bond orders",
    });
    let outcome = match config.strategy {
        SaturationStrategy::Decide => {
            let decider = BondOrderDecider::new(checker);
            Some(decider.decide_bond_order_with_progress(
                graph,
                config.require_fully_saturated,
                reporter,
            )?)
        }
        SaturationStrategy::Greedy => {
            checker.saturate(graph)?;
            None
        }
        SaturationStrategy::RingSystems => {
            checker.saturate_ring_systems(graph, &FusedRingPartitioner::new())?;
            None
        }
        SaturationStrategy::Exhaustive => {
            let bonds: Vec<usize> = (0..graph.bond_count()).collect();
            if !checker.new_saturate(&bonds, graph)? {
                warn!("Backtracking could not saturate every bonded atom.");
            }
            None
        }
    };
    reporter.report(Progress::PhaseFinish);

    let mut report = inspect_with_library(graph, library, config.strict_hydrogens)?;
    report.strategy = config.strategy;
    report.outcome = outcome;

    info!(
        saturated = report.saturated_atoms,
        total = report.total_atoms,
        "Assignment complete ({:.1}% saturated).",
        report.saturation_percentage()
    );
    Ok(report)
}

/// Reports the saturation state of `graph` without changing it.
pub fn inspect(graph: &MolecularGraph, config: &DecisionConfig) -> Result<AssignmentReport, EngineError> {
    let library = load_library(config)?;
    let mut report = inspect_with_library(graph, &library, config.strict_hydrogens)?;
    report.strategy = config.strategy;
    Ok(report)
}

pub fn inspect_with_library<L>(
    graph: &MolecularGraph,
    library: &L,
    strict_hydrogens: bool,
) -> Result<AssignmentReport, EngineError>
where
    L: AtomTypeSource + ?Sized,
{
    let checker = SaturationChecker::new(library);
    let mut unsaturated = Vec::new();
    let mut implicit_hydrogens = Vec::with_capacity(graph.atom_count());

    for (atom_id, _) in graph.atoms_iter() {
        if !checker.is_saturated(atom_id, graph)? {
            unsaturated.push(atom_id);
        }
        implicit_hydrogens.push((
            atom_id,
            checker.implicit_hydrogens_for(atom_id, graph, strict_hydrogens)?,
        ));
    }

    let total_atoms = graph.atom_count();
    Ok(AssignmentReport {
        strategy: SaturationStrategy::default(),
        outcome: None,
        saturated_atoms: total_atoms - unsaturated.len(),
        total_atoms,
        unsaturated,
        bond_orders: graph.bond_orders(),
        implicit_hydrogens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::Bond;
    use crate::engine::config::DecisionConfigBuilder;
    use crate::engine::error::ConfigurationError;
    use std::fs;
    use tempfile::tempdir;

    fn benzene() -> MolecularGraph {
        let mut graph = MolecularGraph::new();
        let ids: Vec<AtomId> = (0..6)
            .map(|_| {
                graph.add_atom(
                    Atom::new("C")
                        .with_hydrogens(1)
                        .with_valency(4)
                        .aromatic(),
                )
            })
            .collect();
        for i in 0..6 {
            let mut bond = Bond::ambiguous(ids[i], ids[(i + 1) % 6]);
            bond.aromatic = true;
            graph.insert_bond(bond).unwrap();
        }
        graph
    }

    fn config(strategy: SaturationStrategy) -> DecisionConfig {
        DecisionConfigBuilder::new().strategy(strategy).build()
    }

    fn double_count(report: &AssignmentReport) -> usize {
        report
            .bond_orders
            .iter()
            .filter(|&&o| o == BondOrder::Double)
            .count()
    }

    #[test]
    fn decide_strategy_solves_benzene_and_reports_hydrogens() {
        let mut graph = benzene();
        let report = run(
            &mut graph,
            &config(SaturationStrategy::Decide),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(report.outcome, Some(DecisionOutcome::Solved));
        assert!(report.is_fully_saturated());
        assert!(report.unsaturated.is_empty());
        assert_eq!(double_count(&report), 3);
        assert!(report.implicit_hydrogens.iter().all(|&(_, h)| h == 1));
    }

    #[test]
    fn greedy_and_exhaustive_strategies_also_kekulise_benzene() {
        for strategy in [SaturationStrategy::Greedy, SaturationStrategy::Exhaustive] {
            let mut graph = benzene();
            let report = run(&mut graph, &config(strategy), &ProgressReporter::new()).unwrap();
            assert_eq!(report.strategy, strategy);
            assert_eq!(report.outcome, None);
            assert!(report.is_fully_saturated(), "{:?} left atoms unsaturated", strategy);
            assert_eq!(double_count(&report), 3);
        }
    }

    #[test]
    fn ring_systems_strategy_restores_hydrogen_counts() {
        let mut graph = benzene();
        let before: Vec<_> = graph.atoms_iter().map(|(_, a)| a.implicit_hydrogens).collect();

        run(
            &mut graph,
            &config(SaturationStrategy::RingSystems),
            &ProgressReporter::new(),
        )
        .unwrap();

        let after: Vec<_> = graph.atoms_iter().map(|(_, a)| a.implicit_hydrogens).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn exhaustive_strategy_honours_backtracking_limit() {
        let mut graph = benzene();
        let config = DecisionConfigBuilder::new()
            .strategy(SaturationStrategy::Exhaustive)
            .max_backtrack_bonds(4)
            .build();
        let result = run(&mut graph, &config, &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(EngineError::SearchLimitExceeded { bonds: 6, limit: 4 })
        ));
    }

    #[test]
    fn library_is_loaded_from_configured_toml_and_csv_files() {
        let dir = tempdir().unwrap();
        let toml_path = dir.path().join("types.toml");
        fs::write(
            &toml_path,
            "[[C]]\nname = \"C.sp2\"\nbond-order-sum = 4.0\nmax-bond-order = \"double\"\n",
        )
        .unwrap();
        let csv_path = dir.path().join("types.CSV");
        fs::write(
            &csv_path,
            "symbol,name,bond_order_sum,max_bond_order,formal_charge\nC,C.sp2,4.0,double,0\n",
        )
        .unwrap();

        for path in [toml_path, csv_path] {
            let config = DecisionConfigBuilder::new().atom_types_path(path).build();
            let library = load_library(&config).unwrap();
            assert_eq!(library.candidates("C").len(), 1);
            assert!(library.candidates("N").is_empty());
        }
    }

    #[test]
    fn missing_library_file_is_an_atom_types_error() {
        let dir = tempdir().unwrap();
        let config = DecisionConfigBuilder::new()
            .atom_types_path(dir.path().join("absent.toml"))
            .build();
        let mut graph = benzene();
        let result = run(&mut graph, &config, &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::AtomTypes { .. })));
    }

    #[test]
    fn inspect_reports_unsaturated_atoms_without_mutating() {
        let mut graph = MolecularGraph::new();
        let c1 = graph.add_atom(Atom::new("C").with_hydrogens(2));
        let c2 = graph.add_atom(Atom::new("C").with_hydrogens(3));
        let c3 = graph.add_atom(Atom::new("C").with_hydrogens(2));
        graph.add_bond(c1, c2, BondOrder::Single).unwrap();
        graph.add_bond(c2, c3, BondOrder::Single).unwrap();

        let report = inspect(&graph, &DecisionConfig::default()).unwrap();
        assert_eq!(report.unsaturated, vec![c1, c2, c3]);
        assert_eq!(report.saturated_atoms, 0);
        assert_eq!(report.bond_orders, vec![BondOrder::Single, BondOrder::Single]);
        assert_eq!(report.saturation_percentage(), 0.0);
    }

    #[test]
    fn strict_hydrogens_fail_on_unknown_elements() {
        let mut graph = MolecularGraph::new();
        let x = graph.add_atom(Atom::new("Xx"));
        let c = graph.add_atom(Atom::new("C").with_hydrogens(3));
        graph.add_bond(x, c, BondOrder::Single).unwrap();

        let lenient = inspect(&graph, &DecisionConfig::default()).unwrap();
        assert!(lenient.is_fully_saturated());

        let strict = DecisionConfigBuilder::new().strict_hydrogens(true).build();
        assert!(matches!(
            inspect(&graph, &strict),
            Err(EngineError::Configuration(ConfigurationError::NoAtomType { .. }))
        ));
    }
}
