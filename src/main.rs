use std::{
    collections::hash_map::DefaultHasher,
    env::args,
    hash::{Hash, Hasher},
    sync::Mutex,
};

use pretty_env_logger::formatted_builder;
use rand::{rngs::StdRng, SeedableRng};
use satlab::{
    bench,
    parser::{self, parse_file},
    prelude::*,
    report::Report,
    search::{construct, Annealing, Descent, Grasp, Ils, Incumbent, Instance, Metaheuristic, Tabu},
};

fn usage_string() -> String {
    format!(
        "Usage: {} <command>

command:
    bench <file.cnf> [more.cnf ...] - comparative report over all procedures,
                                      one worker per file
    solve <procedure> <file.cnf>    - run one procedure once and print the result

procedure: greedy, descent, ils, tabu, anneal, grasp",
        args().next().unwrap()
    )
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unknown procedure '{}'\n\n{}", name, usage_string()))]
    UnknownProcedure { name: String },
    #[snafu(display("Unknown command '{}'\n\n{}", name, usage_string()))]
    UnknownCommand { name: String },
    #[snafu(display("Failed to parse CNF"))]
    ParserError { source: parser::Error },
    #[snafu(display("Required argument does not exist\n\n{}", usage_string()))]
    MissingArgument,
}

/// Seed for a worker's private generator, derived from the file identity and
/// the worker index so parallel workers never share generator state.
fn worker_seed(path: &str, worker: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    hasher.finish().wrapping_add(worker as u64)
}

fn bench_one(path: &str, worker: usize) -> Result<String, Error> {
    let cnf = parse_file(path).context(ParserError)?;
    let instance = Instance::new(cnf);
    let mut rng = StdRng::seed_from_u64(worker_seed(path, worker));
    let table = bench::bench_instance(&instance, bench::DEFAULT_REPETITIONS, &mut rng);

    Ok(bench::format_row(&bench::shorten_label(path), &table))
}

fn bench_command(paths: &[String]) -> Result<(), Error> {
    ensure!(!paths.is_empty(), MissingArgument);

    println!("{}", bench::table_rule());
    println!("{}", bench::table_title(bench::DEFAULT_REPETITIONS));
    println!("{}", bench::table_rule());
    println!("{}", bench::table_header());

    // Rows are built in full by each worker and emitted under this lock, so
    // output lines from different workers never interleave.
    let sink = Mutex::new(());

    crossbeam::thread::scope(|scope| {
        for (worker, path) in paths.iter().enumerate() {
            let sink = &sink;
            scope.spawn(move |_| {
                let row = match bench_one(path, worker) {
                    Ok(row) => row,
                    Err(error) => format!("{:<35}| {}", bench::shorten_label(path), error),
                };
                let _guard = sink.lock().expect("report sink poisoned");
                println!("{}", row);
            });
        }
    })
    .expect("benchmark worker panicked");

    println!("{}", bench::table_rule());
    Ok(())
}

fn solve_command(name: &str, path: &str) -> Result<(), Error> {
    let cnf = parse_file(path).context(ParserError)?;
    let instance = Instance::new(cnf);
    let mut rng = StdRng::seed_from_u64(worker_seed(path, 0));

    let baseline = construct(&instance);
    let incumbent = match name {
        "greedy" => Incumbent::evaluated(instance.cnf(), baseline),
        "descent" => Descent.refine(&instance, baseline, &mut rng),
        "ils" => Ils::default().refine(&instance, baseline, &mut rng),
        "tabu" => Tabu::scaled_to(instance.cnf().num_variables()).refine(
            &instance,
            baseline,
            &mut rng,
        ),
        "anneal" => Annealing::default().refine(&instance, baseline, &mut rng),
        "grasp" => Grasp::default().refine(&instance, baseline, &mut rng),
        _ => {
            return UnknownProcedure {
                name: name.to_owned(),
            }
            .fail()
        }
    };

    println!("{}", incumbent.into_model());
    Ok(())
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else {
        if cfg!(debug_assertions) {
            builder.parse_filters("satlab=debug");
        } else {
            builder.parse_filters("satlab=warn");
        }
    }

    builder.try_init().expect("Failed to initialize the logger");
}

fn main() -> Result<(), Report> {
    init_logger();

    let mut args = args();

    // drop arg[0]
    args.next();

    let command = args.next();
    let remaining: Vec<_> = args.collect();

    match command.as_deref() {
        Some("bench") => bench_command(&remaining)?,
        Some("solve") => {
            let name = remaining.get(0).context(MissingArgument)?;
            let path = remaining.get(1).context(MissingArgument)?;
            solve_command(name, path)?;
        }
        Some(name) => UnknownCommand {
            name: name.to_owned(),
        }
        .fail()?,
        None => {
            println!("{}", usage_string());
        }
    }

    Ok(())
}
