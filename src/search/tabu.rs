//! Tabu search: best-of-neighborhood moves with a short-term memory
//! forbidding recently flipped variables, overridden by aspiration.

use rand::{rngs::StdRng, Rng};

use crate::formula::{Assignment, Cnf, Variable};
use crate::search::{Incumbent, Instance, Metaheuristic};

pub struct Tabu {
    pub iterations: usize,
    /// Iterations a flipped variable stays forbidden.
    pub tenure: usize,
    /// Upper bound of the random addition to the tenure.
    pub jitter: usize,
}

impl Tabu {
    /// The benchmark's parameters, with the tenure proportional to the
    /// formula size.
    pub fn scaled_to(num_variables: usize) -> Self {
        Tabu {
            iterations: 100,
            tenure: 7 + num_variables / 10,
            jitter: 5,
        }
    }
}

/// Evaluates the full 1-flip neighborhood and picks the eligible move with
/// the minimum cost delta. A tabu move is eligible only if it would beat
/// `best_cost` (aspiration). Returns `None` when no move is eligible.
pub(crate) fn select_move(
    cnf: &Cnf,
    assignment: &mut Assignment,
    tabu_until: &[usize],
    iteration: usize,
    current_cost: usize,
    best_cost: usize,
) -> Option<(Variable, i64)> {
    let mut best: Option<(Variable, i64)> = None;

    for index in 0..assignment.num_variables() {
        let variable = Variable::from_index(index).unwrap();

        assignment.flip(variable);
        let flipped = cnf.cost(assignment);
        assignment.flip(variable);

        let is_tabu = iteration < tabu_until[index];
        let aspires = flipped < best_cost;
        if is_tabu && !aspires {
            continue;
        }

        let delta = flipped as i64 - current_cost as i64;
        if best.map_or(true, |(_, known)| delta < known) {
            best = Some((variable, delta));
        }
    }

    best
}

impl Metaheuristic for Tabu {
    fn refine(&self, instance: &Instance, start: Assignment, rng: &mut StdRng) -> Incumbent {
        let cnf = instance.cnf();
        let mut current = start;
        let mut cost = cnf.cost(&current);
        let mut incumbent = Incumbent::from_parts(current.clone(), cost);

        let mut tabu_until = vec![0usize; cnf.num_variables()];

        for iteration in 1..=self.iterations {
            let (variable, delta) = match select_move(
                cnf,
                &mut current,
                &tabu_until,
                iteration,
                cost,
                incumbent.cost(),
            ) {
                Some(chosen) => chosen,
                // Every move is tabu this iteration; tenures expire as the
                // iteration count advances.
                None => continue,
            };

            // The best move is executed even when it worsens the cost; this
            // is how the search leaves local optima.
            current.flip(variable);
            cost = (cost as i64 + delta) as usize;
            tabu_until[variable.as_index()] =
                iteration + self.tenure + rng.gen_range(0..=self.jitter);
            trace!(
                "tabu: iteration {} flips {} (delta {})",
                iteration,
                variable,
                delta
            );

            incumbent.offer(&current, cost);
        }

        incumbent
    }
}
