//! GRASP: greedy randomized construction through a restricted candidate
//! list, followed by local search, repeated over independent restarts.

use rand::{rngs::StdRng, Rng};

use crate::formula::{Assignment, Cnf, Variable};
use crate::occurrence::OccurrenceTable;
use crate::search::{descent, Incumbent, Instance, Metaheuristic};

/// How the restricted candidate list is cut from the ranked candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RclPolicy {
    /// Candidates whose benefit reaches `max - alpha * (max - min)`.
    ByValue,
    /// The best `k` candidates regardless of benefit spread.
    BySize(usize),
}

pub struct Grasp {
    pub restarts: usize,
    /// Greediness in [0, 1]: 0 is fully greedy, 1 fully random.
    pub alpha: f64,
    pub policy: RclPolicy,
}

impl Default for Grasp {
    fn default() -> Self {
        Grasp {
            restarts: 20,
            alpha: 0.2,
            policy: RclPolicy::ByValue,
        }
    }
}

impl Grasp {
    /// One randomized-greedy construction pass over a fresh counter copy.
    fn build(&self, cnf: &Cnf, mut counts: OccurrenceTable, rng: &mut StdRng) -> Assignment {
        let num_variables = cnf.num_variables();
        let mut assignment = Assignment::unassigned(num_variables);

        for _ in 0..num_variables {
            let mut lowest = i32::MAX;
            let mut highest = i32::MIN;
            let mut undecided: Vec<(Variable, i32)> = Vec::new();

            for index in 0..num_variables {
                let variable = Variable::from_index(index).unwrap();
                if assignment.value(variable).is_some() {
                    continue;
                }
                let benefit = counts.count(variable).benefit();
                lowest = lowest.min(benefit);
                highest = highest.max(benefit);
                undecided.push((variable, benefit));
            }

            let chosen = match self.policy {
                RclPolicy::ByValue => {
                    let threshold = highest as f64 - self.alpha * (highest - lowest) as f64;
                    let rcl: Vec<Variable> = undecided
                        .iter()
                        .filter(|(_, benefit)| *benefit as f64 >= threshold)
                        .map(|(variable, _)| *variable)
                        .collect();
                    // The maximum-benefit candidate always meets the
                    // threshold it defines.
                    debug_assert!(!rcl.is_empty(), "restricted candidate list is empty");
                    rcl[rng.gen_range(0..rcl.len())]
                }
                RclPolicy::BySize(width) => {
                    undecided.sort_by(|a, b| b.1.cmp(&a.1));
                    undecided.truncate(width.max(1));
                    undecided[rng.gen_range(0..undecided.len())].0
                }
            };

            assignment.assign(chosen, counts.count(chosen).majority());
            counts.retire(chosen);
        }

        assignment
    }
}

impl Metaheuristic for Grasp {
    /// The starting assignment is ignored: every restart constructs its own
    /// solution from an all-unassigned state and the pristine counters.
    fn refine(&self, instance: &Instance, _start: Assignment, rng: &mut StdRng) -> Incumbent {
        let cnf = instance.cnf();
        let mut incumbent: Option<Incumbent> = None;

        for restart in 0..self.restarts.max(1) {
            let mut candidate = self.build(cnf, instance.occurrences().clone(), rng);
            let cost = descent::descend(cnf, &mut candidate);

            match incumbent {
                Some(ref mut known) => {
                    if known.offer(&candidate, cost) {
                        debug!("grasp: restart {} lowered the incumbent to {}", restart, cost);
                    }
                }
                None => incumbent = Some(Incumbent::from_parts(candidate, cost)),
            }
        }

        incumbent.expect("at least one restart runs")
    }
}
