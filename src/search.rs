/*!
The family of search procedures and the state they share.
*/

use rand::rngs::StdRng;

use crate::formula::{Assignment, Cnf, Model};
use crate::occurrence::OccurrenceTable;

mod anneal;
mod descent;
mod grasp;
mod greedy;
mod ils;
mod tabu;

pub use anneal::Annealing;
pub use descent::{descend, Descent};
pub use grasp::{Grasp, RclPolicy};
pub use greedy::construct;
pub use ils::Ils;
pub use tabu::Tabu;

#[cfg(test)]
pub(crate) use tabu::select_move;

/// Read-only per-formula template shared by every procedure of a run.
///
/// Workers clone the occurrence table before mutating it, so concurrent runs
/// over the same instance never observe each other's counters.
#[derive(Debug)]
pub struct Instance {
    cnf: Cnf,
    occurrences: OccurrenceTable,
}

impl Instance {
    pub fn new(cnf: Cnf) -> Self {
        let occurrences = OccurrenceTable::from_cnf(&cnf);
        Instance { cnf, occurrences }
    }

    pub fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    /// The pristine occurrence counts built at parse time.
    pub fn occurrences(&self) -> &OccurrenceTable {
        &self.occurrences
    }
}

/// Best solution found so far in a run, tracked independently of the current
/// working solution. Every procedure reports its incumbent, never its final
/// working state.
#[derive(Debug, Clone)]
pub struct Incumbent {
    assignment: Assignment,
    cost: usize,
}

impl Incumbent {
    pub fn from_parts(assignment: Assignment, cost: usize) -> Self {
        Incumbent { assignment, cost }
    }

    pub fn evaluated(cnf: &Cnf, assignment: Assignment) -> Self {
        let cost = cnf.cost(&assignment);
        Incumbent { assignment, cost }
    }

    pub fn cost(&self) -> usize {
        self.cost
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Replaces the incumbent when `cost` is a strict improvement.
    /// Returns whether the candidate was adopted.
    pub fn offer(&mut self, candidate: &Assignment, cost: usize) -> bool {
        if cost < self.cost {
            self.assignment = candidate.clone();
            self.cost = cost;
            true
        } else {
            false
        }
    }

    pub fn into_model(self) -> Model {
        Model::new(&self.assignment, self.cost)
    }
}

/// A search procedure refining a complete starting assignment.
///
/// Implementations return the best assignment observed over their whole
/// trajectory, so the result never costs more than `start`.
pub trait Metaheuristic {
    fn refine(&self, instance: &Instance, start: Assignment, rng: &mut StdRng) -> Incumbent;
}
