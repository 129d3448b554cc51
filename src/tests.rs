use paste::paste;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    bench,
    formula::{Assignment, Clause, Cnf, Literal, Variable},
    occurrence::{OccurrenceTable, PolarityCount},
    parser::{self, parse_file},
    search::{
        construct, descend, select_move, Annealing, Descent, Grasp, Ils, Incumbent, Instance,
        Metaheuristic, Tabu,
    },
};

fn var(index: usize) -> Variable {
    Variable::from_index(index).unwrap()
}

fn build_cnf(num_variables: usize, clauses: &[&[i64]]) -> Cnf {
    let mut cnf = Cnf::new(num_variables);
    for literals in clauses {
        cnf.add_clause(Clause::new(
            literals
                .iter()
                .map(|&raw| Literal::from_dimacs(raw).unwrap())
                .collect(),
        ));
    }
    cnf
}

fn all_set(num_variables: usize, value: bool) -> Assignment {
    let mut assignment = Assignment::unassigned(num_variables);
    assignment.complete_with(value);
    assignment
}

/// Runs every refinement procedure once with its own seeded generator.
/// GRASP receives a fresh unassigned start; the others start from `baseline`.
fn refine_all(instance: &Instance, baseline: &Assignment) -> Vec<(&'static str, usize)> {
    let num_variables = instance.cnf().num_variables();
    let procedures: Vec<(&'static str, Box<dyn Metaheuristic>)> = vec![
        ("descent", Box::new(Descent)),
        ("ils", Box::new(Ils::default())),
        ("tabu", Box::new(Tabu::scaled_to(num_variables))),
        ("anneal", Box::new(Annealing::default())),
        ("grasp", Box::new(Grasp::default())),
    ];

    procedures
        .into_iter()
        .enumerate()
        .map(|(slot, (label, procedure))| {
            let mut rng = StdRng::seed_from_u64(slot as u64);
            let start = if label == "grasp" {
                Assignment::unassigned(num_variables)
            } else {
                baseline.clone()
            };
            (label, procedure.refine(instance, start, &mut rng).cost())
        })
        .collect()
}

macro_rules! zero_cost_testcase {
    ($dir:ident, $name:ident) => {
        paste! {
            #[test]
            fn [< zero_cost_ $dir _ $name >]() {
                let cnf = parse_file(
                    concat!("testcases/", stringify!($dir), "/", stringify!($name), ".cnf")
                ).unwrap();
                let instance = Instance::new(cnf);
                let baseline = construct(&instance);
                assert!(baseline.is_complete());
                assert_eq!(instance.cnf().cost(&baseline), 0);
                for (label, cost) in refine_all(&instance, &baseline) {
                    assert_eq!(cost, 0, "procedure {} missed the optimum", label);
                }
            }
        }
    };
}

macro_rules! refinement_testcase {
    ($dir:ident, $name:ident) => {
        paste! {
            #[test]
            fn [< refinement_ $dir _ $name >]() {
                let cnf = parse_file(
                    concat!("testcases/", stringify!($dir), "/", stringify!($name), ".cnf")
                ).unwrap();
                let instance = Instance::new(cnf);
                let baseline = construct(&instance);
                assert!(baseline.is_complete());
                let baseline_cost = instance.cnf().cost(&baseline);
                assert!(baseline_cost <= instance.cnf().num_clauses());
                for (label, cost) in refine_all(&instance, &baseline) {
                    assert!(cost <= instance.cnf().num_clauses());
                    if label != "grasp" {
                        // Every incumbent starts from the seed, so the
                        // result never costs more than the baseline.
                        assert!(cost <= baseline_cost, "{} regressed past its seed", label);
                    }
                }
            }
        }
    };
}

zero_cost_testcase!(smoke, unit);
zero_cost_testcase!(smoke, pair);
zero_cost_testcase!(smoke, chain);

refinement_testcase!(smoke, conflict);
refinement_testcase!(craft, mixed);
refinement_testcase!(craft, dense10);

#[test]
fn dimacs_zero_is_not_a_literal() {
    assert!(Literal::from_dimacs(0).is_none());
    assert!("0".parse::<Literal>().is_err());

    let literal = Literal::from_dimacs(-3).unwrap();
    assert_eq!(literal.variable().as_index(), 2);
    assert!(!literal.positive());
    assert!((!literal).positive());
}

#[test]
fn pending_clauses_are_not_counted() {
    let cnf = build_cnf(2, &[&[1, 2]]);

    let mut assignment = Assignment::unassigned(2);
    assignment.assign(var(0), false);
    // x2 is still pending, the clause is not yet falsifiable.
    assert_eq!(cnf.cost(&assignment), 0);

    assignment.assign(var(1), false);
    assert_eq!(cnf.cost(&assignment), 1);
}

#[test]
fn cost_stays_within_clause_count() {
    let cnf = parse_file("testcases/craft/dense10.cnf").unwrap();
    for value in &[false, true] {
        let assignment = all_set(cnf.num_variables(), *value);
        assert!(cnf.cost(&assignment) <= cnf.num_clauses());
    }
}

#[test]
fn occurrence_counts_split_by_polarity() {
    let cnf = build_cnf(3, &[&[1, -2], &[1, 2, -3], &[-1, 3]]);
    let table = OccurrenceTable::from_cnf(&cnf);

    assert_eq!(
        table.count(var(0)),
        PolarityCount {
            positive: 2,
            negative: 1
        }
    );
    assert_eq!(
        table.count(var(1)),
        PolarityCount {
            positive: 1,
            negative: 1
        }
    );
    assert_eq!(
        table.count(var(2)),
        PolarityCount {
            positive: 1,
            negative: 1
        }
    );
}

#[test]
fn retired_variables_never_win_again() {
    let cnf = build_cnf(2, &[&[1], &[1], &[-2]]);
    let mut table = OccurrenceTable::from_cnf(&cnf);

    assert_eq!(table.most_frequent(), Some(var(0)));
    table.retire(var(0));
    assert_eq!(table.most_frequent(), Some(var(1)));
    table.retire(var(1));

    // With every variable retired the maximum is a sentinel entry; the
    // constructive loop stops on its non-positive counts.
    let count = table.count(table.most_frequent().unwrap());
    assert!(count.positive <= 0 && count.negative <= 0);
}

#[test]
fn frequency_ties_prefer_the_first_variable() {
    let cnf = build_cnf(2, &[&[1, 2]]);
    let table = OccurrenceTable::from_cnf(&cnf);
    assert_eq!(table.most_frequent(), Some(var(0)));
}

#[test]
fn discount_lowers_every_literal_of_the_clause() {
    let cnf = build_cnf(2, &[&[1, -2], &[1]]);
    let mut table = OccurrenceTable::from_cnf(&cnf);

    table.discount(cnf.clauses().first().unwrap());
    assert_eq!(
        table.count(var(0)),
        PolarityCount {
            positive: 1,
            negative: 0
        }
    );
    assert_eq!(
        table.count(var(1)),
        PolarityCount {
            positive: 0,
            negative: 0
        }
    );
}

#[test]
fn constructive_completes_the_example_formula() {
    // The `p cnf 3 2` scenario: (x1 ∨ x2) ∧ (¬x1 ∨ ¬x2 ∨ ¬x3).
    let cnf = build_cnf(3, &[&[1, 2], &[-1, -2, -3]]);
    let instance = Instance::new(cnf);

    let assignment = construct(&instance);
    assert!(assignment.is_complete());
    assert!(instance.cnf().cost(&assignment) <= 1);
}

#[test]
fn constructive_is_idempotent() {
    let instance = Instance::new(parse_file("testcases/craft/mixed.cnf").unwrap());
    let first = construct(&instance);
    let second = construct(&instance);
    assert_eq!(first, second);
    assert_eq!(instance.cnf().cost(&first), instance.cnf().cost(&second));
}

#[test]
fn descent_reaches_a_fixed_point() {
    let instance = Instance::new(parse_file("testcases/craft/dense10.cnf").unwrap());
    let mut assignment = construct(&instance);
    let baseline_cost = instance.cnf().cost(&assignment);

    let first = descend(instance.cnf(), &mut assignment);
    let second = descend(instance.cnf(), &mut assignment);
    assert!(first <= baseline_cost);
    assert_eq!(first, second);
}

#[test]
fn unsatisfiable_pair_settles_at_one() {
    let instance = Instance::new(build_cnf(1, &[&[1], &[-1]]));
    let baseline = construct(&instance);
    assert_eq!(instance.cnf().cost(&baseline), 1);
    for (label, cost) in refine_all(&instance, &baseline) {
        assert_eq!(cost, 1, "procedure {} reported an impossible cost", label);
    }
}

#[test]
fn empty_formula_costs_nothing_everywhere() {
    let instance = Instance::new(Cnf::new(0));
    let baseline = construct(&instance);
    assert!(baseline.is_complete());
    assert_eq!(instance.cnf().cost(&baseline), 0);
    for (label, cost) in refine_all(&instance, &baseline) {
        assert_eq!(cost, 0, "procedure {} invented work", label);
    }
}

#[test]
fn incumbent_adopts_strict_improvements_only() {
    let mut incumbent = Incumbent::from_parts(all_set(1, false), 1);

    assert!(!incumbent.offer(&all_set(1, true), 1));
    assert_eq!(incumbent.cost(), 1);

    assert!(incumbent.offer(&all_set(1, true), 0));
    assert_eq!(incumbent.cost(), 0);

    assert!(!incumbent.offer(&all_set(1, false), 0));
}

#[test]
fn tabu_skips_tabu_move_without_aspiration() {
    // One clause over two variables, both currently false: flipping either
    // variable repairs it. With x1 tabu and no room for aspiration, the
    // search must pick x2.
    let cnf = build_cnf(2, &[&[1, 2]]);
    let mut assignment = all_set(2, false);

    let tabu_until = [10, 0];
    let (variable, delta) = select_move(&cnf, &mut assignment, &tabu_until, 1, 1, 0).unwrap();
    assert_eq!(variable, var(1));
    assert_eq!(delta, -1);
}

#[test]
fn tabu_aspiration_overrides_tenure() {
    let cnf = build_cnf(2, &[&[1, 2]]);
    let mut assignment = all_set(2, false);

    // Both variables are tabu, but flipping beats the best-ever cost.
    let tabu_until = [10, 10];
    let (variable, delta) = select_move(&cnf, &mut assignment, &tabu_until, 1, 1, 1).unwrap();
    assert_eq!(variable, var(0));
    assert_eq!(delta, -1);
}

#[test]
fn tabu_without_eligible_moves_stalls() {
    let cnf = build_cnf(2, &[&[1, 2]]);
    let mut assignment = all_set(2, false);

    let tabu_until = [10, 10];
    assert!(select_move(&cnf, &mut assignment, &tabu_until, 1, 1, 0).is_none());
}

#[test]
fn tabu_result_never_exceeds_its_seed() {
    let instance = Instance::new(parse_file("testcases/craft/dense10.cnf").unwrap());
    let baseline = construct(&instance);
    let baseline_cost = instance.cnf().cost(&baseline);

    let mut rng = StdRng::seed_from_u64(99);
    let incumbent =
        Tabu::scaled_to(instance.cnf().num_variables()).refine(&instance, baseline, &mut rng);
    assert!(incumbent.cost() <= baseline_cost);
}

#[test]
fn cold_annealing_rarely_accepts_worsening_moves() {
    let instance = Instance::new(parse_file("testcases/craft/dense10.cnf").unwrap());
    let baseline = construct(&instance);

    // Barely above the floor: one level runs, with the Metropolis
    // probability for any worsening move at essentially zero.
    let annealing = Annealing {
        initial_temperature: 0.0101,
        cooling: 0.5,
        moves_per_level: 200,
        floor_temperature: 0.01,
    };

    let mut proposed = 0;
    let mut worsened = 0;
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (_, trace) = annealing.refine_traced(&instance, baseline.clone(), &mut rng);
        proposed += trace.proposed;
        worsened += trace.accepted_worsening;
    }

    assert!(proposed > 0);
    assert!((worsened as f64) < 0.01 * proposed as f64);
}

#[test]
fn parses_the_declared_shape() {
    let cnf = parse_file("testcases/smoke/pair.cnf").unwrap();
    assert_eq!(cnf.num_variables(), 3);
    assert_eq!(cnf.num_clauses(), 2);

    let widths: Vec<usize> = cnf
        .clauses()
        .iter()
        .map(|clause| clause.num_literals())
        .collect();
    assert_eq!(widths, vec![2, 3]);
}

#[test]
fn rejects_clause_without_terminator() {
    assert!(matches!(
        parse_file("testcases/bad/no_terminator.cnf"),
        Err(parser::Error::MalformedClause { .. })
    ));
}

#[test]
fn rejects_out_of_range_variables() {
    assert!(matches!(
        parse_file("testcases/bad/out_of_range.cnf"),
        Err(parser::Error::VariableOutOfRange { .. })
    ));
}

#[test]
fn rejects_missing_problem_line() {
    assert!(matches!(
        parse_file("testcases/bad/no_preamble.cnf"),
        Err(parser::Error::MalformedProblemDefinition { .. })
    ));
}

#[test]
fn rejects_clause_count_mismatch() {
    assert!(matches!(
        parse_file("testcases/bad/count_mismatch.cnf"),
        Err(parser::Error::ClauseCountMismatch { .. })
    ));
}

#[test]
fn summary_of_two_samples() {
    let summary = bench::Summary::of(&[2.0, 4.0]);
    assert!((summary.mean - 3.0).abs() < 1e-12);
    assert!((summary.deviation - 2f64.sqrt()).abs() < 1e-12);

    let empty = bench::Summary::of(&[]);
    assert_eq!(empty.mean, 0.0);
    assert_eq!(empty.deviation, 0.0);
}

#[test]
fn concise_measure_notation() {
    assert_eq!(bench::format_measure(12.34, 0.056), "12.34(6)");
    assert_eq!(bench::format_measure(1234.0, 12.0), "1230(1)");
    assert_eq!(bench::format_measure(0.5, 0.099), "0.5(1)");
    assert_eq!(bench::format_measure(5.0, 0.0), "5(0)");
}

#[test]
fn long_paths_are_shortened_to_their_tail() {
    assert_eq!(bench::shorten_label("short.cnf"), "short.cnf");

    let long = format!("benchmarks/{}.cnf", "x".repeat(40));
    let label = bench::shorten_label(&long);
    assert!(label.starts_with("..."));
    assert_eq!(label.len(), 33);
}

#[test]
fn bench_collects_every_procedure() {
    let instance = Instance::new(parse_file("testcases/smoke/pair.cnf").unwrap());
    let mut rng = StdRng::seed_from_u64(7);

    let table = bench::bench_instance(&instance, 2, &mut rng);
    assert_eq!(table.len(), bench::PROCEDURE_LABELS.len());
    for stats in &table {
        assert!(stats.cost_summary().mean <= instance.cnf().num_clauses() as f64);
    }
}
