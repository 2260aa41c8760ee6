use super::defaults::BUILTIN_ATOM_TYPES;
use crate::core::models::topology::BondOrder;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Reference valence data for one atom type of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomTypeCandidate {
    /// Identifier of the atom type (e.g., "C.sp2").
    pub name: String,
    /// Expected total bond-order budget; fractional values model delocalisation.
    pub bond_order_sum: f64,
    /// Highest order any single bond to this atom type may have.
    pub max_bond_order: BondOrder,
    /// Formal charge this atom type applies to.
    pub formal_charge: i32,
}

impl AtomTypeCandidate {
    pub fn new(name: &str, bond_order_sum: f64, max_bond_order: BondOrder) -> Self {
        Self {
            name: name.to_string(),
            bond_order_sum,
            max_bond_order,
            formal_charge: 0,
        }
    }

    pub fn with_formal_charge(mut self, charge: i32) -> Self {
        self.formal_charge = charge;
        self
    }
}

/// Lookup of atom-type candidates by element symbol.
///
/// This is the seam through which the saturation engine reads reference data, so
/// tests and callers can supply their own tables.
pub trait AtomTypeSource {
    /// Returns the candidates for `symbol`, in preference order. May be empty.
    fn candidates(&self, symbol: &str) -> &[AtomTypeCandidate];
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct TomlCandidate {
    name: String,
    bond_order_sum: f64,
    #[serde(default = "default_max_bond_order")]
    max_bond_order: String,
    #[serde(default)]
    formal_charge: i32,
}

#[derive(Debug, Deserialize)]
struct CsvCandidate {
    symbol: String,
    name: String,
    bond_order_sum: f64,
    max_bond_order: String,
    #[serde(default)]
    formal_charge: i32,
}

fn default_max_bond_order() -> String {
    "single".to_string()
}

#[derive(Debug, Error)]
pub enum AtomTypeLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid maximum bond order '{value}' for atom type '{name}'")]
    InvalidBondOrder { name: String, value: String },
}

/// Atom-type candidates keyed by element symbol.
#[derive(Debug, Clone, Default)]
pub struct AtomTypeLibrary {
    registry: HashMap<String, Vec<AtomTypeCandidate>>,
}

impl AtomTypeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the library from the static table of common organic atom types.
    pub fn builtin() -> Self {
        let registry = BUILTIN_ATOM_TYPES
            .entries()
            .map(|(symbol, candidates)| {
                let candidates = candidates
                    .iter()
                    .map(|c| AtomTypeCandidate {
                        name: c.name.to_string(),
                        bond_order_sum: c.bond_order_sum,
                        max_bond_order: c.max_bond_order,
                        formal_charge: c.formal_charge,
                    })
                    .collect();
                (symbol.to_string(), candidates)
            })
            .collect();
        Self { registry }
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, AtomTypeCandidate)>,
    {
        let mut library = Self::new();
        for (symbol, candidate) in entries {
            library.insert(&symbol, candidate);
        }
        library
    }

    /// Appends a candidate after any existing ones for the symbol.
    pub fn insert(&mut self, symbol: &str, candidate: AtomTypeCandidate) {
        self.registry
            .entry(symbol.to_string())
            .or_default()
            .push(candidate);
    }

    /// Loads a library from a TOML file whose top-level keys are element symbols.
    pub fn load(path: &Path) -> Result<Self, AtomTypeLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| AtomTypeLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AtomTypeLoadError::Toml { source, .. } => AtomTypeLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, AtomTypeLoadError> {
        let raw: HashMap<String, Vec<TomlCandidate>> =
            toml::from_str(content).map_err(|e| AtomTypeLoadError::Toml {
                path: "<string>".to_string(),
                source: e,
            })?;

        let mut registry = HashMap::with_capacity(raw.len());
        for (symbol, candidates) in raw {
            let mut converted = Vec::with_capacity(candidates.len());
            for c in candidates {
                let max_bond_order = parse_max_order(&c.name, &c.max_bond_order)?;
                converted.push(AtomTypeCandidate {
                    name: c.name,
                    bond_order_sum: c.bond_order_sum,
                    max_bond_order,
                    formal_charge: c.formal_charge,
                });
            }
            registry.insert(symbol, converted);
        }
        Ok(Self { registry })
    }

    /// Loads a library from a CSV file with the header
    /// `symbol,name,bond_order_sum,max_bond_order,formal_charge`.
    ///
    /// Row order is preserved per symbol, so the first row of a symbol is its
    /// preferred candidate.
    pub fn load_csv(path: &Path) -> Result<Self, AtomTypeLoadError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| AtomTypeLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut library = Self::new();
        for result in reader.deserialize::<CsvCandidate>() {
            let record = result.map_err(|e| AtomTypeLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            let max_bond_order = parse_max_order(&record.name, &record.max_bond_order)?;
            library.insert(
                &record.symbol,
                AtomTypeCandidate {
                    name: record.name,
                    bond_order_sum: record.bond_order_sum,
                    max_bond_order,
                    formal_charge: record.formal_charge,
                },
            );
        }
        Ok(library)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl AtomTypeSource for AtomTypeLibrary {
    fn candidates(&self, symbol: &str) -> &[AtomTypeCandidate] {
        self.registry.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn parse_max_order(name: &str, value: &str) -> Result<BondOrder, AtomTypeLoadError> {
    value
        .trim()
        .parse()
        .map_err(|_| AtomTypeLoadError::InvalidBondOrder {
            name: name.to_string(),
            value: value.to_string(),
        })
}
