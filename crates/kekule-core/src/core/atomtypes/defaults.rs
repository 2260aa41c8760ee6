use crate::core::models::topology::BondOrder;
use phf::{Map, phf_map};

/// Static form of an atom-type candidate, used to seed the built-in library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltinCandidate {
    pub name: &'static str,
    pub bond_order_sum: f64,
    pub max_bond_order: BondOrder,
    pub formal_charge: i32,
}

const fn candidate(
    name: &'static str,
    bond_order_sum: f64,
    max_bond_order: BondOrder,
    formal_charge: i32,
) -> BuiltinCandidate {
    BuiltinCandidate {
        name,
        bond_order_sum,
        max_bond_order,
        formal_charge,
    }
}

use BondOrder::{Double, Single, Triple};

// The first candidate of every symbol is its neutral ground valence; the heuristic
// fill and the hydrogen calculation only read that one.
#[rustfmt::skip]
pub static BUILTIN_ATOM_TYPES: Map<&'static str, &'static [BuiltinCandidate]> = phf_map! {
    "H"  => &[candidate("H", 1.0, Single, 0)],
    "B"  => &[candidate("B", 3.0, Double, 0)],
    "C"  => &[
        candidate("C.sp3", 4.0, Single, 0),
        candidate("C.sp2", 4.0, Double, 0),
        candidate("C.sp", 4.0, Triple, 0),
    ],
    "N"  => &[
        candidate("N.sp3", 3.0, Single, 0),
        candidate("N.sp2", 3.0, Double, 0),
        candidate("N.sp", 3.0, Triple, 0),
        candidate("N.plus", 4.0, Double, 1),
    ],
    "O"  => &[
        candidate("O.sp3", 2.0, Single, 0),
        candidate("O.sp2", 2.0, Double, 0),
        candidate("O.minus", 1.0, Single, -1),
        candidate("O.plus", 3.0, Double, 1),
    ],
    "F"  => &[candidate("F", 1.0, Single, 0)],
    "Si" => &[candidate("Si", 4.0, Single, 0)],
    "P"  => &[
        candidate("P.ine", 3.0, Single, 0),
        candidate("P.sp2", 3.0, Double, 0),
        candidate("P.ate", 5.0, Double, 0),
    ],
    "S"  => &[
        candidate("S.sp3", 2.0, Single, 0),
        candidate("S.sp2", 2.0, Double, 0),
        candidate("S.onyl", 4.0, Double, 0),
        candidate("S.onyl2", 6.0, Double, 0),
    ],
    "Cl" => &[candidate("Cl", 1.0, Single, 0)],
    "Se" => &[candidate("Se", 2.0, Double, 0)],
    "Br" => &[candidate("Br", 1.0, Single, 0)],
    "I"  => &[candidate("I", 1.0, Single, 0)],
};
