use super::ids::AtomId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Unset,
    Single,
    Double,
    Triple,
    Quadruple,
}

impl BondOrder {
    /// Numeric weight of the order, as summed into an atom's bond-order sum.
    #[inline]
    pub fn weight(self) -> u8 {
        self as u8
    }

    pub fn from_weight(weight: u8) -> Option<Self> {
        match weight {
            0 => Some(Self::Unset),
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            4 => Some(Self::Quadruple),
            _ => None,
        }
    }

    /// The next higher order, or `None` for `Quadruple`.
    pub fn increment(self) -> Option<Self> {
        Self::from_weight(self.weight() + 1)
    }

    /// The next lower order, or `None` for `Unset`.
    pub fn decrement(self) -> Option<Self> {
        self.weight().checked_sub(1).and_then(Self::from_weight)
    }

    #[inline]
    pub fn is_lower_than(self, other: Self) -> bool {
        self < other
    }

    #[inline]
    pub fn is_higher_than(self, other: Self) -> bool {
        self > other
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "0" | "unset" => Ok(Self::Unset),
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "4" | "q" | "quadruple" => Ok(Self::Quadruple),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Unset => "Unset",
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Quadruple => "Quadruple",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub begin: AtomId,
    pub end: AtomId,
    pub order: BondOrder,
    /// Order not decided yet (single-or-double).
    pub ambiguous: bool,
    pub aromatic: bool,
}

impl Bond {
    pub fn new(begin: AtomId, end: AtomId, order: BondOrder) -> Self {
        Self {
            begin,
            end,
            order,
            ambiguous: false,
            aromatic: false,
        }
    }

    /// Creates a single-or-double bond pending resolution.
    pub fn ambiguous(begin: AtomId, end: AtomId) -> Self {
        Self {
            begin,
            end,
            order: BondOrder::Single,
            ambiguous: true,
            aromatic: false,
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.begin == atom_id || self.end == atom_id
    }

    /// Returns the atom at the other end of the bond, if `atom_id` belongs to it.
    pub fn partner(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.begin == atom_id {
            Some(self.end)
        } else if self.end == atom_id {
            Some(self.begin)
        } else {
            None
        }
    }

    /// Whether the two bonds have at least one atom in common.
    pub fn shares_atom_with(&self, other: &Bond) -> bool {
        self.contains(other.begin) || self.contains(other.end)
    }

    pub fn atoms(&self) -> [AtomId; 2] {
        [self.begin, self.end]
    }
}
