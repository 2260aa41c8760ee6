/// Position of the rotation search in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Sweeping(usize),
    BestGuessSelected,
    Solved,
    Failed,
}

/// Successful result of a bond-order decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Every atom is saturated.
    Solved,
    /// No start index saturated every atom; the graph holds the best partial
    /// assignment found, which came from `start_index`.
    BestGuess {
        start_index: usize,
        saturated_atoms: usize,
        total_atoms: usize,
    },
}

impl DecisionOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, DecisionOutcome::Solved)
    }

    /// Share of saturated atoms in percent; 100 for [`DecisionOutcome::Solved`].
    pub fn saturation_percentage(&self) -> f64 {
        match *self {
            DecisionOutcome::Solved => 100.0,
            DecisionOutcome::BestGuess {
                saturated_atoms,
                total_atoms,
                ..
            } => {
                if total_atoms == 0 {
                    100.0
                } else {
                    saturated_atoms as f64 * 100.0 / total_atoms as f64
                }
            }
        }
    }
}

/// Verdict of the tie-break on a single ambiguous bond during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaiseDecision {
    /// Raise the bond by one order.
    Raise,
    /// Leave the bond at its current order and continue the sweep.
    Keep,
    /// Local conflict next to bond 0; stop this sweep attempt.
    Abort,
}
