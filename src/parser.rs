use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::formula::{Clause, Cnf, Literal, LiteralParseError};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("I/O error occurred while parsing CNF file '{}'", path.display()))]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse line '{}' as clause", clause))]
    MalformedClause { clause: String },
    #[snafu(display("Invalid literal found in clause '{}'", clause))]
    MalformedLiteral {
        clause: String,
        source: LiteralParseError,
    },
    #[snafu(display(
        "Variable of literal {} exceeds the declared variable count {}",
        literal,
        declared,
    ))]
    VariableOutOfRange { literal: i64, declared: usize },
    #[snafu(display("Problem line 'p cnf <num_variables> <num_clauses>' is not found"))]
    MalformedProblemDefinition,
    #[snafu(display(
        "The number of clauses ({}) does not match the clauses number in the problem definition ({})",
        found,
        expected,
    ))]
    ClauseCountMismatch { expected: usize, found: usize },
}

/// Parse a line to a clause
fn parse_line(line: &str, num_variables: usize) -> Result<Clause, Error> {
    let mut literals = Vec::new();

    let splitted = line.split_whitespace().collect::<Vec<_>>();

    ensure!(
        !splitted.is_empty() && splitted[splitted.len() - 1] == "0",
        MalformedClause {
            clause: line.to_owned(),
        }
    );

    for s in &splitted[..splitted.len() - 1] {
        let literal = s.parse::<Literal>().with_context(|| MalformedLiteral {
            clause: line.to_owned(),
        })?;
        ensure!(
            literal.variable().as_index() < num_variables,
            VariableOutOfRange {
                literal: s.parse::<i64>().unwrap_or(0),
                declared: num_variables,
            }
        );
        literals.push(literal);
    }

    Ok(Clause::new(literals))
}

/// Is the line the start of a clause rather than a comment or footer?
fn is_clause_line(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_digit() || c == '-')
}

/// Parses a CNF formula from a file in DIMACS format.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf, Error> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path).context(IoError {
        path: path.to_owned(),
    })?);

    // skip until we find the problem definition
    let mut lines = file
        .lines()
        .map(|line| line.unwrap())
        .skip_while(|line| !line.starts_with('p'));

    let prob_line = lines
        .next()
        .ok_or_else(|| MalformedProblemDefinition.build())?;

    let splitted = prob_line.trim().split_whitespace().collect::<Vec<_>>();

    // We only support CNF DIMACS format
    ensure!(
        splitted.len() == 4 && splitted[0] == "p" && splitted[1] == "cnf",
        MalformedProblemDefinition
    );

    let (num_variables, num_clauses) =
        match (splitted[2].parse::<usize>(), splitted[3].parse::<usize>()) {
            (Ok(num_variables), Ok(num_clauses)) => (num_variables, num_clauses),
            _ => return MalformedProblemDefinition.fail(),
        };

    let mut cnf = Cnf::new(num_variables);

    for line in lines {
        let trimmed = line.trim();
        if !is_clause_line(trimmed) {
            // empty line, comment, or footer such as '%'
            continue;
        }
        if trimmed == "0" {
            // bare terminator produced by some generators
            continue;
        }
        cnf.add_clause(parse_line(&trimmed, num_variables)?);
    }

    ensure!(
        cnf.num_clauses() + cnf.empty_clause_count() == num_clauses,
        ClauseCountMismatch {
            found: cnf.num_clauses(),
            expected: num_clauses,
        }
    );

    Ok(cnf)
}
