//! Simulated annealing: random single flips with Metropolis acceptance of
//! worsening moves and geometric cooling.

use rand::{rngs::StdRng, Rng};

use crate::formula::{Assignment, Variable};
use crate::search::{Incumbent, Instance, Metaheuristic};

pub struct Annealing {
    pub initial_temperature: f64,
    /// Geometric cooling factor in (0, 1).
    pub cooling: f64,
    /// Candidate moves evaluated per temperature level.
    pub moves_per_level: usize,
    /// The run stops once the temperature falls to this threshold.
    pub floor_temperature: f64,
}

impl Default for Annealing {
    fn default() -> Self {
        Annealing {
            initial_temperature: 10.0,
            cooling: 0.98,
            moves_per_level: 100,
            floor_temperature: 0.01,
        }
    }
}

/// Move counters of one annealing run.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct AnnealTrace {
    pub proposed: usize,
    pub accepted_worsening: usize,
}

impl Annealing {
    pub(crate) fn refine_traced(
        &self,
        instance: &Instance,
        start: Assignment,
        rng: &mut StdRng,
    ) -> (Incumbent, AnnealTrace) {
        let cnf = instance.cnf();
        let num_variables = cnf.num_variables();

        let mut current = start;
        let mut cost = cnf.cost(&current);
        let mut incumbent = Incumbent::from_parts(current.clone(), cost);
        let mut trace = AnnealTrace::default();

        if num_variables == 0 {
            return (incumbent, trace);
        }

        let mut temperature = self.initial_temperature;
        while temperature > self.floor_temperature {
            for _ in 0..self.moves_per_level {
                let variable = Variable::from_index(rng.gen_range(0..num_variables)).unwrap();
                current.flip(variable);
                let flipped = cnf.cost(&current);
                trace.proposed += 1;

                if flipped < cost {
                    cost = flipped;
                    incumbent.offer(&current, cost);
                } else {
                    // Metropolis criterion: accept with probability
                    // exp(-delta / T), otherwise revert the flip.
                    let delta = flipped - cost;
                    if rng.gen::<f64>() < (-(delta as f64) / temperature).exp() {
                        cost = flipped;
                        if delta > 0 {
                            trace.accepted_worsening += 1;
                        }
                    } else {
                        current.flip(variable);
                    }
                }
            }
            temperature *= self.cooling;
        }

        (incumbent, trace)
    }
}

impl Metaheuristic for Annealing {
    fn refine(&self, instance: &Instance, start: Assignment, rng: &mut StdRng) -> Incumbent {
        self.refine_traced(instance, start, rng).0
    }
}
