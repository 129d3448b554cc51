/*!
Per-variable polarity occurrence counts used to rank variables by influence.
*/

use crate::formula::{Clause, Cnf, Variable};

/// Sentinel installed when a variable is fixed. Half of `i32::MIN` so later
/// discounts cannot wrap and a retired variable can never win a maximum.
const RETIRED: i32 = i32::MIN / 2;

/// Occurrence counts of one variable, split by polarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolarityCount {
    pub positive: i32,
    pub negative: i32,
}

impl PolarityCount {
    pub fn total(&self) -> i32 {
        self.positive + self.negative
    }

    /// Greedy benefit of fixing the variable: the larger polarity count.
    pub fn benefit(&self) -> i32 {
        self.positive.max(self.negative)
    }

    /// Polarity that satisfies the most clauses. Ties prefer true.
    pub fn majority(&self) -> bool {
        self.positive >= self.negative
    }
}

/// Occurrence counts for every variable of a formula.
///
/// Built once per formula as a template; each run that mutates the table
/// works on its own clone so runs never alias each other's counters.
#[derive(Debug, Clone)]
pub struct OccurrenceTable {
    counts: Vec<PolarityCount>,
}

impl OccurrenceTable {
    pub fn from_cnf(cnf: &Cnf) -> Self {
        let mut counts = vec![PolarityCount::default(); cnf.num_variables()];

        for clause in cnf.clauses().iter() {
            for literal in clause.iter() {
                let count = &mut counts[literal.variable().as_index()];
                if literal.positive() {
                    count.positive += 1;
                } else {
                    count.negative += 1;
                }
            }
        }

        OccurrenceTable { counts }
    }

    pub fn num_variables(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, variable: Variable) -> PolarityCount {
        self.counts[variable.as_index()]
    }

    /// Variable with the maximum total occurrence count. The first variable
    /// achieving the maximum wins, so the scan order is stable.
    pub fn most_frequent(&self) -> Option<Variable> {
        let mut best: Option<(usize, i32)> = None;
        for (index, count) in self.counts.iter().enumerate() {
            let total = count.total();
            if best.map_or(true, |(_, known)| total > known) {
                best = Some((index, total));
            }
        }

        best.and_then(|(index, _)| Variable::from_index(index))
    }

    /// Takes a fixed variable out of contention permanently.
    pub fn retire(&mut self, variable: Variable) {
        self.counts[variable.as_index()] = PolarityCount {
            positive: RETIRED,
            negative: RETIRED,
        };
    }

    /// Discounts every literal of a clause that just became decided: the
    /// clause no longer needs its literals, so they lose influence.
    pub fn discount(&mut self, clause: &Clause) {
        for literal in clause.iter() {
            let count = &mut self.counts[literal.variable().as_index()];
            if literal.positive() {
                count.positive -= 1;
            } else {
                count.negative -= 1;
            }
        }
    }
}
