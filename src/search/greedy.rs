//! Constructive heuristic: fix variables one at a time by descending total
//! occurrence count, satisfying as many clauses as possible early.

use typed_index_collections::TiVec;

use crate::formula::{Assignment, ClauseIdx, ClauseStatus, Cnf};
use crate::occurrence::OccurrenceTable;
use crate::search::Instance;

/// Builds a complete assignment for the instance from scratch.
/// Deterministic: the same instance always produces the same assignment.
pub fn construct(instance: &Instance) -> Assignment {
    build_from(instance.cnf(), instance.occurrences().clone())
}

fn build_from(cnf: &Cnf, mut counts: OccurrenceTable) -> Assignment {
    let num_variables = cnf.num_variables();
    let mut assignment = Assignment::unassigned(num_variables);

    // Clause decidedness is tracked locally for this pass only; it is a
    // cache over `Clause::status`, not shared state.
    let mut decided: TiVec<ClauseIdx, bool> = cnf.clauses().iter().map(|_| false).collect();

    for _ in 0..num_variables {
        let variable = match counts.most_frequent() {
            Some(variable) => variable,
            None => break,
        };
        let count = counts.count(variable);
        if count.positive <= 0 && count.negative <= 0 {
            // Remaining variables no longer influence any undecided clause.
            break;
        }

        assignment.assign(variable, count.majority());
        counts.retire(variable);

        for (idx, clause) in cnf.clauses().iter_enumerated() {
            if decided[idx] || !clause.mentions(variable) {
                continue;
            }
            // A clause decided in either direction stops needing its
            // literals, so their counts are discounted.
            if clause.status(&assignment) != ClauseStatus::Unresolved {
                decided[idx] = true;
                counts.discount(clause);
            }
        }
    }

    assignment.complete_with(false);
    assignment
}
