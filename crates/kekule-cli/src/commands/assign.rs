use crate::cli::AssignArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use anyhow::Context;
use kekule::{
    core::io::{toml_graph::TomlGraphFile, traits::MolecularFile},
    engine::{
        config::{DecisionConfig, DecisionConfigBuilder},
        progress::ProgressReporter,
        state::DecisionOutcome,
    },
    workflows,
};
use tracing::{info, warn};

pub fn run(args: AssignArgs) -> Result<()> {
    let config = build_config(&args)?;

    info!("Loading input molecule from {:?}", &args.input);
    let (mut graph, metadata) =
        TomlGraphFile::read_from_path(&args.input).map_err(|e| CliError::GraphFile {
            path: args.input.clone(),
            source: e,
        })?;
    info!(
        atoms = graph.atom_count(),
        bonds = graph.bond_count(),
        "Molecule loaded."
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Assigning bond orders with the '{}' strategy...", config.strategy);
    let report = workflows::assign::run(&mut graph, &config, &reporter)?;

    match report.outcome {
        Some(DecisionOutcome::BestGuess {
            start_index,
            saturated_atoms,
            total_atoms,
        }) => {
            warn!(
                start_index,
                "No sweep saturated every atom; keeping the best guess."
            );
            println!(
                "Warning: best guess from start index {} saturates {} of {} atoms.",
                start_index, saturated_atoms, total_atoms
            );
        }
        _ if !report.is_fully_saturated() => {
            println!(
                "Warning: {} of {} atoms remain unsaturated.",
                report.unsaturated.len(),
                report.total_atoms
            );
        }
        _ => {}
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    info!("Writing result to {:?}", &args.output);
    TomlGraphFile::write_to_path(&graph, &metadata, &args.output).map_err(|e| {
        CliError::GraphFile {
            path: args.output.clone(),
            source: e,
        }
    })?;

    println!(
        "✓ {:.1}% of atoms saturated; result written to: {}",
        report.saturation_percentage(),
        args.output.display()
    );
    Ok(())
}

fn build_config(args: &AssignArgs) -> Result<DecisionConfig> {
    let mut builder = DecisionConfigBuilder::new()
        .strategy(args.strategy)
        .require_fully_saturated(!args.best_effort)
        .strict_hydrogens(args.strict_hydrogens);

    if let Some(limit) = args.max_backtrack_bonds {
        if limit == 0 {
            return Err(CliError::Argument(
                "--max-backtrack-bonds must be at least 1".to_string(),
            ));
        }
        builder = builder.max_backtrack_bonds(limit);
    }
    if let Some(path) = &args.atom_types {
        builder = builder.atom_types_path(path.clone());
    }
    Ok(builder.build())
}
