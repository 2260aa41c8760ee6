/// Represents an atom of a molecular graph together with the valence bookkeeping
/// the saturation engine reads.
///
/// Only the element symbol is required. Everything else is optional reference data
/// supplied by upstream perception steps (charge assignment, hydrogen counting,
/// atom typing). Unset fields are treated as zero where a neutral value exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    /// The element symbol (e.g., "C", "N", "Cl").
    pub symbol: String,
    /// The formal charge in elementary charge units, if known.
    pub formal_charge: Option<i32>,
    /// The number of implicit hydrogens attached to this atom, if known.
    ///
    /// Signed because ring-isolated saturation writes transient, possibly negative,
    /// counts while it runs. Stable graphs never hold a negative value.
    pub implicit_hydrogens: Option<i32>,
    /// The expected total bond-order budget of this atom, if typed.
    pub valency: Option<u32>,
    /// The formal number of neighbours assigned by atom typing, if typed.
    pub formal_neighbour_count: Option<u32>,
    /// Number of unpaired electrons (radical centres).
    pub single_electrons: u32,
    /// Whether the atom is part of an aromatic system.
    pub aromatic: bool,
}

impl Atom {
    /// Creates a new `Atom` with the given element symbol and no optional data.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The element symbol of the atom.
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            formal_charge: None,
            implicit_hydrogens: None,
            valency: None,
            formal_neighbour_count: None,
            single_electrons: 0,
            aromatic: false,
        }
    }

    pub fn with_hydrogens(mut self, count: i32) -> Self {
        self.implicit_hydrogens = Some(count);
        self
    }

    pub fn with_charge(mut self, charge: i32) -> Self {
        self.formal_charge = Some(charge);
        self
    }

    pub fn with_valency(mut self, valency: u32) -> Self {
        self.valency = Some(valency);
        self
    }

    pub fn with_formal_neighbour_count(mut self, count: u32) -> Self {
        self.formal_neighbour_count = Some(count);
        self
    }

    pub fn aromatic(mut self) -> Self {
        self.aromatic = true;
        self
    }

    /// The formal charge, or zero when unset.
    #[inline]
    pub fn charge(&self) -> i32 {
        self.formal_charge.unwrap_or(0)
    }

    /// The implicit hydrogen count, or zero when unset.
    #[inline]
    pub fn hydrogens(&self) -> i32 {
        self.implicit_hydrogens.unwrap_or(0)
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.symbol == "H"
    }
}
