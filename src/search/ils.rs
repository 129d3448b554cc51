//! Iterated local search: perturb the incumbent, re-optimize, keep strict
//! improvements only.

use rand::{rngs::StdRng, Rng};

use crate::formula::{Assignment, Variable};
use crate::search::{descent, Incumbent, Instance, Metaheuristic};

pub struct Ils {
    pub iterations: usize,
    /// Fraction of variables flipped by each perturbation.
    pub perturbation: f64,
}

impl Default for Ils {
    fn default() -> Self {
        Ils {
            iterations: 20,
            perturbation: 0.05,
        }
    }
}

impl Metaheuristic for Ils {
    fn refine(&self, instance: &Instance, start: Assignment, rng: &mut StdRng) -> Incumbent {
        let cnf = instance.cnf();
        let mut incumbent = Incumbent::evaluated(cnf, start);

        let num_variables = cnf.num_variables();
        if num_variables == 0 {
            return incumbent;
        }

        // Random k-flip kick, at least one variable.
        let kicks = ((num_variables as f64 * self.perturbation).ceil() as usize).max(1);

        for round in 0..self.iterations {
            let mut candidate = incumbent.assignment().clone();
            for _ in 0..kicks {
                let variable = Variable::from_index(rng.gen_range(0..num_variables)).unwrap();
                candidate.flip(variable);
            }

            let cost = descent::descend(cnf, &mut candidate);
            if incumbent.offer(&candidate, cost) {
                debug!("ils: round {} lowered the incumbent to {}", round, cost);
            }
        }

        incumbent
    }
}
