use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MAX_BACKTRACK_BONDS: usize = 256;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unknown saturation strategy '{0}' (expected decide, greedy, ring-systems or exhaustive)")]
pub struct ParseStrategyError(pub String);

/// Which algorithm resolves bond orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SaturationStrategy {
    /// Rotation search over ambiguous bonds with best-guess fallback.
    #[default]
    Decide,
    /// Single greedy forward fill by ascending atom degree.
    Greedy,
    /// Greedy fill run separately on every fused-ring system.
    RingSystems,
    /// Recursive backtracking over all bonds.
    Exhaustive,
}

impl FromStr for SaturationStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "decide" => Ok(Self::Decide),
            "greedy" => Ok(Self::Greedy),
            "ring-systems" | "ring_systems" | "rings" => Ok(Self::RingSystems),
            "exhaustive" | "backtrack" => Ok(Self::Exhaustive),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

impl fmt::Display for SaturationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decide => "decide",
            Self::Greedy => "greedy",
            Self::RingSystems => "ring-systems",
            Self::Exhaustive => "exhaustive",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionConfig {
    pub strategy: SaturationStrategy,
    pub require_fully_saturated: bool,
    pub strict_hydrogens: bool,
    pub max_backtrack_bonds: usize,
    /// Atom-type library to load; the built-in table is used when `None`.
    pub atom_types_path: Option<PathBuf>,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            strategy: SaturationStrategy::default(),
            require_fully_saturated: true,
            strict_hydrogens: false,
            max_backtrack_bonds: DEFAULT_MAX_BACKTRACK_BONDS,
            atom_types_path: None,
        }
    }
}

#[derive(Default)]
pub struct DecisionConfigBuilder {
    strategy: Option<SaturationStrategy>,
    require_fully_saturated: Option<bool>,
    strict_hydrogens: Option<bool>,
    max_backtrack_bonds: Option<usize>,
    atom_types_path: Option<PathBuf>,
}

impl DecisionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: SaturationStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
    pub fn require_fully_saturated(mut self, required: bool) -> Self {
        self.require_fully_saturated = Some(required);
        self
    }
    pub fn strict_hydrogens(mut self, strict: bool) -> Self {
        self.strict_hydrogens = Some(strict);
        self
    }
    pub fn max_backtrack_bonds(mut self, limit: usize) -> Self {
        self.max_backtrack_bonds = Some(limit);
        self
    }
    pub fn atom_types_path(mut self, path: PathBuf) -> Self {
        self.atom_types_path = Some(path);
        self
    }

    pub fn build(self) -> DecisionConfig {
        let defaults = DecisionConfig::default();
        DecisionConfig {
            strategy: self.strategy.unwrap_or(defaults.strategy),
            require_fully_saturated: self
                .require_fully_saturated
                .unwrap_or(defaults.require_fully_saturated),
            strict_hydrogens: self.strict_hydrogens.unwrap_or(defaults.strict_hydrogens),
            max_backtrack_bonds: self
                .max_backtrack_bonds
                .unwrap_or(defaults.max_backtrack_bonds),
            atom_types_path: self.atom_types_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_without_overrides_matches_defaults() {
        let config = DecisionConfigBuilder::new().build();
        assert_eq!(config, DecisionConfig::default());
        assert_eq!(config.strategy, SaturationStrategy::Decide);
        assert!(config.require_fully_saturated);
        assert!(!config.strict_hydrogens);
        assert_eq!(config.max_backtrack_bonds, DEFAULT_MAX_BACKTRACK_BONDS);
        assert!(config.atom_types_path.is_none());
    }

    #[test]
    fn builder_applies_every_override() {
        let config = DecisionConfigBuilder::new()
            .strategy(SaturationStrategy::Exhaustive)
            .require_fully_saturated(false)
            .strict_hydrogens(true)
            .max_backtrack_bonds(12)
            .atom_types_path(PathBuf::from("types.toml"))
            .build();

        assert_eq!(config.strategy, SaturationStrategy::Exhaustive);
        assert!(!config.require_fully_saturated);
        assert!(config.strict_hydrogens);
        assert_eq!(config.max_backtrack_bonds, 12);
        assert_eq!(config.atom_types_path, Some(PathBuf::from("types.toml")));
    }

    #[test]
    fn strategy_parses_names_and_aliases() {
        assert_eq!("decide".parse(), Ok(SaturationStrategy::Decide));
        assert_eq!("Greedy".parse(), Ok(SaturationStrategy::Greedy));
        assert_eq!("ring-systems".parse(), Ok(SaturationStrategy::RingSystems));
        assert_eq!("rings".parse(), Ok(SaturationStrategy::RingSystems));
        assert_eq!("exhaustive".parse(), Ok(SaturationStrategy::Exhaustive));
        assert_eq!("backtrack".parse(), Ok(SaturationStrategy::Exhaustive));
    }

    #[test]
    fn strategy_display_uses_canonical_names() {
        assert_eq!(SaturationStrategy::RingSystems.to_string(), "ring-systems");
        assert_eq!(
            SaturationStrategy::Exhaustive.to_string().parse(),
            Ok(SaturationStrategy::Exhaustive)
        );
    }

    #[test]
    fn strategy_rejects_unknown_names() {
        assert_eq!(
            "random".parse::<SaturationStrategy>(),
            Err(ParseStrategyError("random".to_string()))
        );
    }
}
