use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::graph::{GraphError, MolecularGraph};
use crate::core::models::ids::AtomId;
use crate::core::models::topology::{Bond, BondOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphMetadata {
    pub title: Option<String>,
}

#[derive(Debug, Error)]
pub enum GraphFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Bond {bond}: invalid bond order '{value}'")]
    InvalidBondOrder { bond: usize, value: String },
    #[error("Bond {bond} lists {count} atoms; exactly two are required")]
    BondArity { bond: usize, count: usize },
    #[error("Bond {bond} refers to atom {atom}, but only {atom_count} atoms are defined")]
    AtomIndex {
        bond: usize,
        atom: usize,
        atom_count: usize,
    },
    #[error("Bond {bond} joins atom {atom} to itself")]
    SelfBond { bond: usize, atom: usize },
    #[error("Bond {bond} repeats the atom pair of bond {first}")]
    DuplicateBond { bond: usize, first: usize },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MoleculeHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct AtomRecord {
    symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hydrogens: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    charge: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    neighbours: Option<u32>,
    #[serde(default, skip_serializing_if = "is_zero")]
    single_electrons: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    aromatic: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct BondRecord {
    atoms: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    ambiguous: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    aromatic: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphDocument {
    #[serde(default)]
    molecule: MoleculeHeader,
    #[serde(default)]
    atoms: Vec<AtomRecord>,
    #[serde(default)]
    bonds: Vec<BondRecord>,
}

impl From<AtomRecord> for Atom {
    fn from(record: AtomRecord) -> Self {
        Self {
            symbol: record.symbol,
            formal_charge: record.charge,
            implicit_hydrogens: record.hydrogens,
            valency: record.valency,
            formal_neighbour_count: record.neighbours,
            single_electrons: record.single_electrons,
            aromatic: record.aromatic,
        }
    }
}

impl From<&Atom> for AtomRecord {
    fn from(atom: &Atom) -> Self {
        Self {
            symbol: atom.symbol.clone(),
            hydrogens: atom.implicit_hydrogens,
            charge: atom.formal_charge,
            valency: atom.valency,
            neighbours: atom.formal_neighbour_count,
            single_electrons: atom.single_electrons,
            aromatic: atom.aromatic,
        }
    }
}

/// TOML molecule format: a `[molecule]` header followed by `[[atoms]]` and
/// `[[bonds]]` arrays. Bonds refer to atoms by their 0-based position.
pub struct TomlGraphFile;

impl TomlGraphFile {
    pub fn from_toml_str(content: &str) -> Result<(MolecularGraph, GraphMetadata), GraphFileError> {
        let document: GraphDocument = toml::from_str(content)?;
        build_graph(document)
    }

    pub fn to_toml_string(
        graph: &MolecularGraph,
        metadata: &GraphMetadata,
    ) -> Result<String, GraphFileError> {
        let index_of: HashMap<AtomId, usize> = graph
            .atom_ids()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();

        let document = GraphDocument {
            molecule: MoleculeHeader {
                title: metadata.title.clone(),
            },
            atoms: graph.atoms_iter().map(|(_, atom)| atom.into()).collect(),
            bonds: graph
                .bonds()
                .iter()
                .map(|bond| BondRecord {
                    atoms: vec![index_of[&bond.begin], index_of[&bond.end]],
                    order: Some(bond.order.to_string().to_lowercase()),
                    ambiguous: bond.ambiguous,
                    aromatic: bond.aromatic,
                })
                .collect(),
        };
        Ok(toml::to_string(&document)?)
    }
}

fn build_graph(document: GraphDocument) -> Result<(MolecularGraph, GraphMetadata), GraphFileError> {
    let mut graph = MolecularGraph::new();
    let atom_ids: Vec<AtomId> = document
        .atoms
        .into_iter()
        .map(|record| graph.add_atom(record.into()))
        .collect();

    for (bond_number, record) in document.bonds.into_iter().enumerate() {
        let &[first, second] = record.atoms.as_slice() else {
            return Err(GraphFileError::BondArity {
                bond: bond_number,
                count: record.atoms.len(),
            });
        };

        let lookup = |atom: usize| {
            atom_ids
                .get(atom)
                .copied()
                .ok_or(GraphFileError::AtomIndex {
                    bond: bond_number,
                    atom,
                    atom_count: atom_ids.len(),
                })
        };
        let (begin, end) = (lookup(first)?, lookup(second)?);
        if first == second {
            return Err(GraphFileError::SelfBond {
                bond: bond_number,
                atom: first,
            });
        }

        if let Some(first) = graph.bond_between(begin, end) {
            return Err(GraphFileError::DuplicateBond {
                bond: bond_number,
                first,
            });
        }

        let order = match record.order.as_deref() {
            Some(value) => value
                .parse::<BondOrder>()
                .map_err(|_| GraphFileError::InvalidBondOrder {
                    bond: bond_number,
                    value: value.to_string(),
                })?,
            None => BondOrder::Single,
        };

        let bond = Bond {
            begin,
            end,
            order,
            ambiguous: record.ambiguous,
            aromatic: record.aromatic,
        };
        graph.insert_bond(bond)?;
    }

    let metadata = GraphMetadata {
        title: document.molecule.title,
    };
    Ok((graph, metadata))
}

impl MolecularFile for TomlGraphFile {
    type Metadata = GraphMetadata;
    type Error = GraphFileError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularGraph, Self::Metadata), Self::Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_toml_str(&content)
    }

    fn write_to(
        graph: &MolecularGraph,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let content = Self::to_toml_string(graph, metadata)?;
        writer.write_all(content.as_bytes())?;
        Ok(())
    }
}
