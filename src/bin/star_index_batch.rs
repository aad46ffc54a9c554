use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use star_precolor::{
    ilp::is_scn_at_most,
    parser::{parse_graph6, to_graph6},
    solver::{select_solver, IlpSolver, SolverError},
    Graph,
};
use std::io::{self, BufRead};

/// Star chromatic index screen over candidate graphs read from stdin.
///
/// Reads graph6 lines (e.g. the output of `geng -C -d2 -D3 <n>`), keeps those
/// whose position is `res` modulo `mod`, and checks the line graph of each
/// for star 5- and 6-colorability.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Expected number of vertices
    n: usize,

    /// Residue of the candidates handled by this run
    res: usize,

    /// Modulus used to shard the candidates
    #[arg(value_name = "MOD")]
    modulus: usize,
}

/// What happened to one candidate
#[derive(Debug)]
enum Screen {
    /// A degree-2 vertex whose neighbors all have degree 2
    Nonminimal,
    /// Line graph is star 5-colorable
    AtMostFive,
    /// Needs 6 colors
    Six,
    /// Needs more than 6 colors
    MoreThanSix,
    SolverFailed(SolverError),
}

/// True if some degree-2 vertex has only degree-2 neighbors
fn is_nonminimal(g: &Graph) -> bool {
    g.vertices()
        .filter(|&v| g.degree(v) == 2)
        .any(|v| g.neighbors(v).all(|u| g.degree(u) == 2))
}

fn screen(g: &Graph, solver: &dyn IlpSolver) -> Screen {
    if is_nonminimal(g) {
        return Screen::Nonminimal;
    }
    let l = g.line_graph();
    let result = is_scn_at_most(&l, 5, solver).and_then(|five| {
        if five {
            return Ok(Screen::AtMostFive);
        }
        Ok(if is_scn_at_most(&l, 6, solver)? {
            Screen::Six
        } else {
            Screen::MoreThanSix
        })
    });
    result.unwrap_or_else(Screen::SolverFailed)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    anyhow::ensure!(args.modulus > 0, "mod must be positive");

    println!("==> Starting to check n={} res={} mod={}", args.n, args.res, args.modulus);
    let solver = select_solver();

    let mut candidates = Vec::new();
    let stdin = io::stdin();
    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() || index % args.modulus != args.res {
            continue;
        }
        let g = parse_graph6(line)
            .with_context(|| format!("candidate on input line {}", index + 1))?;
        if g.num_vertices() != args.n {
            log::warn!("skipping {}: {} vertices, expected {}", line, g.num_vertices(), args.n);
            continue;
        }
        candidates.push(g);
    }

    let results: Vec<Screen> = candidates.par_iter().map(|g| screen(g, solver.as_ref())).collect();

    let mut nonminimal_count = 0;
    let mut solver_failures = 0;
    for (count, (g, result)) in candidates.iter().zip(&results).enumerate() {
        if count % 100 == 0 {
            println!("   --- Count is {}", count);
        }
        match result {
            Screen::Nonminimal => {
                nonminimal_count += 1;
                println!("nonminimal example {} {}", nonminimal_count, to_graph6(g)?);
            }
            Screen::AtMostFive => {}
            Screen::Six => {
                println!(">5: n={} count={}", args.n, count);
                println!("GRAPH: {}", to_graph6(g)?);
            }
            Screen::MoreThanSix => {
                println!(">5: n={} count={}", args.n, count);
                println!(">6: n={} count={} COUNTEREXAMPLE", args.n, count);
                println!("GRAPH: {}", to_graph6(g)?);
            }
            Screen::SolverFailed(e) => {
                solver_failures += 1;
                println!("SOLVER ERROR: n={} count={} {}: {}", args.n, count, to_graph6(g)?, e);
            }
        }
    }

    println!("    Done with n={}, total count={}", args.n, candidates.len());
    if solver_failures > 0 {
        println!("    {} candidates could not be decided", solver_failures);
        std::process::exit(2);
    }
    Ok(())
}
