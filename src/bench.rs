/*!
Run-repetition bookkeeping and the comparative report format.

Each repetition takes a fresh constructive baseline, feeds clones of it to
every refinement procedure independently, and records the resulting cost and
wall-clock time. GRASP builds its own solutions and starts from an
all-unassigned state instead.
*/

use std::time::{Duration, Instant};

use rand::rngs::StdRng;

use crate::formula::Assignment;
use crate::search::{construct, Annealing, Descent, Grasp, Ils, Instance, Metaheuristic, Tabu};

pub const DEFAULT_REPETITIONS: usize = 30;

/// Column labels in report order. The constructive baseline comes first.
pub const PROCEDURE_LABELS: [&str; 6] = ["Greedy", "LS", "ILS", "TS", "SA", "GRASP"];

/// Cost and runtime samples of one procedure across repetitions.
#[derive(Debug)]
pub struct ProcedureStats {
    label: &'static str,
    costs: Vec<f64>,
    seconds: Vec<f64>,
}

impl ProcedureStats {
    fn new(label: &'static str) -> Self {
        ProcedureStats {
            label,
            costs: Vec::new(),
            seconds: Vec::new(),
        }
    }

    fn record(&mut self, cost: usize, elapsed: Duration) {
        self.costs.push(cost as f64);
        self.seconds.push(elapsed.as_secs_f64());
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn cost_summary(&self) -> Summary {
        Summary::of(&self.costs)
    }

    pub fn time_summary(&self) -> Summary {
        Summary::of(&self.seconds)
    }
}

/// Mean and sample standard deviation of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub deviation: f64,
}

impl Summary {
    pub fn of(samples: &[f64]) -> Self {
        let mean = mean(samples);
        Summary {
            mean,
            deviation: deviation(samples, mean),
        }
    }
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

fn deviation(samples: &[f64], mean: f64) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let squares = samples
        .iter()
        .map(|sample| (sample - mean).powi(2))
        .sum::<f64>();
    (squares / (samples.len() - 1) as f64).sqrt()
}

/// Formats `mean(d)` where `d` is the first significant digit of the
/// deviation and the mean is rounded to that digit's decimal place.
pub fn format_measure(mean: f64, deviation: f64) -> String {
    if deviation <= 0.0 {
        return format!("{}(0)", mean);
    }

    let mut exponent = deviation.log10().floor() as i32;
    let mut digit = (deviation / 10f64.powi(exponent)).round() as i64;
    // Rounding can carry over, e.g. 0.099 -> 0.1.
    if digit == 10 {
        digit = 1;
        exponent += 1;
    }

    if exponent < 0 {
        format!("{:.*}({})", (-exponent) as usize, mean, digit)
    } else {
        let factor = 10f64.powi(exponent);
        format!("{:.0}({})", (mean / factor).round() * factor, digit)
    }
}

/// Runs the whole procedure family `repetitions` times over the instance.
/// Returns one stats entry per procedure, in `PROCEDURE_LABELS` order.
pub fn bench_instance(
    instance: &Instance,
    repetitions: usize,
    rng: &mut StdRng,
) -> Vec<ProcedureStats> {
    let num_variables = instance.cnf().num_variables();
    let mut table: Vec<ProcedureStats> = PROCEDURE_LABELS
        .iter()
        .map(|&label| ProcedureStats::new(label))
        .collect();

    let ils = Ils::default();
    let tabu = Tabu::scaled_to(num_variables);
    let annealing = Annealing::default();
    let grasp = Grasp::default();

    for _ in 0..repetitions {
        let started = Instant::now();
        let baseline = construct(instance);
        let elapsed = started.elapsed();
        table[0].record(instance.cnf().cost(&baseline), elapsed);

        let mut run = |slot: usize, procedure: &dyn Metaheuristic, start: Assignment, rng: &mut StdRng| {
            let started = Instant::now();
            let incumbent = procedure.refine(instance, start, rng);
            table[slot].record(incumbent.cost(), started.elapsed());
        };

        run(1, &Descent, baseline.clone(), rng);
        run(2, &ils, baseline.clone(), rng);
        run(3, &tabu, baseline.clone(), rng);
        run(4, &annealing, baseline.clone(), rng);
        run(5, &grasp, Assignment::unassigned(num_variables), rng);
    }

    table
}

pub fn table_rule() -> String {
    "=".repeat(178)
}

pub fn table_title(repetitions: usize) -> String {
    format!(
        " COMPARATIVE REPORT, {} REPETITIONS: constructive heuristic vs LS / ILS / TS / SA / GRASP",
        repetitions
    )
}

pub fn table_header() -> String {
    let mut header = format!("{:<35}", "File");
    for label in &PROCEDURE_LABELS {
        header.push_str(&format!("| {:<11}", format!("Cost {}", label)));
        header.push_str(&format!("| {:<11}", format!("T. {}(s)", label)));
    }
    header.push_str("| Gap H-I%");
    header
}

/// Shortens long file paths to their tail so the label column stays fixed.
pub fn shorten_label(path: &str) -> String {
    if path.len() > 33 {
        let tail: String = path.chars().skip(path.chars().count() - 30).collect();
        format!("...{}", tail)
    } else {
        path.to_owned()
    }
}

/// Builds one complete report row. The row is emitted in a single write so
/// concurrent workers never interleave within a line.
pub fn format_row(label: &str, table: &[ProcedureStats]) -> String {
    let mut row = format!("{:<35}", label);
    for stats in table {
        let cost = stats.cost_summary();
        let time = stats.time_summary();
        row.push_str(&format!("| {:<11}", format_measure(cost.mean, cost.deviation)));
        row.push_str(&format!("| {:<11}", format_measure(time.mean, time.deviation)));
    }

    // Mean improvement of ILS over the constructive baseline.
    let baseline = table[0].cost_summary().mean;
    let ils = table[2].cost_summary().mean;
    let gap = if baseline > 0.0 {
        (baseline - ils) / baseline * 100.0
    } else {
        0.0
    };
    row.push_str(&format!("| {:.1}%", gap));

    row
}
