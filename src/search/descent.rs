//! First-improvement hill climbing over single-variable flips.

use rand::rngs::StdRng;

use crate::formula::{Assignment, ClauseStatus, Cnf, Variable};
use crate::search::{Incumbent, Instance, Metaheuristic};

/// Descends to a local optimum with respect to single flips of variables
/// appearing in currently falsified clauses. Returns the final cost.
///
/// Each accepted flip strictly decreases the cost, so successive calls never
/// increase it and the loop terminates.
pub fn descend(cnf: &Cnf, assignment: &mut Assignment) -> usize {
    let mut cost = cnf.cost(assignment);

    loop {
        let mut candidates: Vec<Variable> = Vec::new();
        for clause in cnf.clauses().iter() {
            if clause.status(assignment) == ClauseStatus::Falsified {
                candidates.extend(clause.iter().map(|literal| literal.variable()));
            }
        }
        candidates.sort_unstable();
        candidates.dedup();

        let mut improved = false;
        for &variable in &candidates {
            assignment.flip(variable);
            let flipped = cnf.cost(assignment);
            if flipped < cost {
                // First improvement: keep the flip and rescan.
                cost = flipped;
                improved = true;
                break;
            }
            assignment.flip(variable);
        }

        if !improved {
            return cost;
        }
    }
}

/// Hill climbing as a procedure of its own, for the benchmark table.
pub struct Descent;

impl Metaheuristic for Descent {
    fn refine(&self, instance: &Instance, mut start: Assignment, _rng: &mut StdRng) -> Incumbent {
        let cost = descend(instance.cnf(), &mut start);
        Incumbent::from_parts(start, cost)
    }
}
