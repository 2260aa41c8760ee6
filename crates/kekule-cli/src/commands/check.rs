use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use kekule::{
    core::io::{toml_graph::TomlGraphFile, traits::MolecularFile},
    core::models::{graph::MolecularGraph, ids::AtomId},
    engine::config::DecisionConfigBuilder,
    workflows::{self, assign::AssignmentReport},
};
use std::collections::HashSet;
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    let mut builder = DecisionConfigBuilder::new().strict_hydrogens(args.strict_hydrogens);
    if let Some(path) = &args.atom_types {
        builder = builder.atom_types_path(path.clone());
    }
    let config = builder.build();

    info!("Loading molecule from {:?}", &args.input);
    let (graph, _) =
        TomlGraphFile::read_from_path(&args.input).map_err(|e| CliError::GraphFile {
            path: args.input.clone(),
            source: e,
        })?;

    let report = workflows::assign::inspect(&graph, &config)?;

    for line in unsaturated_lines(&graph, &report) {
        println!("{}", line);
    }
    info!(
        saturated = report.saturated_atoms,
        total = report.total_atoms,
        "Saturation check finished."
    );

    if report.is_fully_saturated() {
        println!(
            "✓ All {} atoms match a reference atom type.",
            report.total_atoms
        );
        Ok(())
    } else {
        Err(CliError::Unsaturated {
            count: report.unsaturated.len(),
            total: report.total_atoms,
        })
    }
}

/// One line per unsaturated atom, in file order.
fn unsaturated_lines(graph: &MolecularGraph, report: &AssignmentReport) -> Vec<String> {
    let unsaturated: HashSet<AtomId> = report.unsaturated.iter().copied().collect();
    graph
        .atoms_iter()
        .enumerate()
        .filter(|(_, (atom_id, _))| unsaturated.contains(atom_id))
        .map(|(position, (atom_id, atom))| {
            format!(
                "  atom {:>4} {:<2} bond order sum {}, {} implicit H: not saturated",
                position,
                atom.symbol,
                graph.bond_order_sum(atom_id),
                atom.hydrogens()
            )
        })
        .collect()
}
