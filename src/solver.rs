//! Back ends that decide feasibility of a [`BinaryProgram`].

use crate::ilp::{BinaryProgram, Sense};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feasibility {
    /// Feasible, with the assignment when the back end reports one
    Feasible(Option<Vec<bool>>),
    Infeasible,
}

/// A solver that could not answer. Never to be read as infeasibility.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("could not run {solver}: {source}")]
    Launch {
        solver: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{solver} gave no feasibility status (exit status {status}): {output}")]
    UnknownStatus {
        solver: String,
        status: String,
        output: String,
    },

    #[error("{solver} stopped after exploring {nodes} nodes")]
    NodeLimit { solver: String, nodes: usize },

    #[error("cannot write model file {path:?}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait IlpSolver: Send + Sync {
    fn name(&self) -> &str;

    fn solve(&self, program: &BinaryProgram) -> Result<Feasibility, SolverError>;
}

// ============================================================================
// Built-in branching solver
// ============================================================================

/// Depth-first 0/1 search with activity bounds per constraint.
#[derive(Debug, Clone, Default)]
pub struct BranchingSolver {
    /// Give up after this many branching nodes
    pub node_limit: Option<usize>,
}

/// Running bounds of one constraint's left-hand side
#[derive(Debug, Clone, Copy, Default)]
struct Activity {
    fixed: i64,
    free_pos: i64,
    free_neg: i64,
}

struct Branching<'a> {
    program: &'a BinaryProgram,
    /// Constraints mentioning each variable
    rows_of: Vec<Vec<(usize, i64)>>,
    activity: Vec<Activity>,
    values: Vec<bool>,
    nodes: usize,
    node_limit: Option<usize>,
}

impl<'a> Branching<'a> {
    fn new(program: &'a BinaryProgram, node_limit: Option<usize>) -> Self {
        let mut rows_of = vec![Vec::new(); program.num_variables()];
        let mut activity = vec![Activity::default(); program.constraints().len()];
        for (row, c) in program.constraints().iter().enumerate() {
            for &(var, coef) in &c.terms {
                rows_of[var].push((row, coef));
                if coef > 0 {
                    activity[row].free_pos += coef;
                } else {
                    activity[row].free_neg += coef;
                }
            }
        }
        Branching {
            program,
            rows_of,
            activity,
            values: vec![false; program.num_variables()],
            nodes: 0,
            node_limit,
        }
    }

    fn row_feasible(&self, row: usize) -> bool {
        let c = &self.program.constraints()[row];
        let a = self.activity[row];
        let min = a.fixed + a.free_neg;
        let max = a.fixed + a.free_pos;
        match c.sense {
            Sense::Le => min <= c.rhs,
            Sense::Ge => max >= c.rhs,
            Sense::Eq => min <= c.rhs && c.rhs <= max,
        }
    }

    fn set(&mut self, var: usize, value: bool) -> bool {
        self.values[var] = value;
        let mut ok = true;
        for i in 0..self.rows_of[var].len() {
            let (row, coef) = self.rows_of[var][i];
            let a = &mut self.activity[row];
            if coef > 0 {
                a.free_pos -= coef;
            } else {
                a.free_neg -= coef;
            }
            if value {
                a.fixed += coef;
            }
            ok &= self.row_feasible(row);
        }
        ok
    }

    fn unset(&mut self, var: usize) {
        let value = self.values[var];
        for &(row, coef) in &self.rows_of[var] {
            let a = &mut self.activity[row];
            if coef > 0 {
                a.free_pos += coef;
            } else {
                a.free_neg += coef;
            }
            if value {
                a.fixed -= coef;
            }
        }
        self.values[var] = false;
    }

    fn search(&mut self, var: usize) -> Result<bool, SolverError> {
        if var == self.values.len() {
            return Ok(true);
        }
        self.nodes += 1;
        if let Some(limit) = self.node_limit {
            if self.nodes > limit {
                return Err(SolverError::NodeLimit {
                    solver: "branching".into(),
                    nodes: limit,
                });
            }
        }

        for value in [true, false] {
            let ok = self.set(var, value);
            if ok && self.search(var + 1)? {
                return Ok(true);
            }
            self.unset(var);
        }
        Ok(false)
    }
}

impl IlpSolver for BranchingSolver {
    fn name(&self) -> &str {
        "branching"
    }

    fn solve(&self, program: &BinaryProgram) -> Result<Feasibility, SolverError> {
        let mut b = Branching::new(program, self.node_limit);
        if !(0..program.constraints().len()).all(|row| b.row_feasible(row)) {
            return Ok(Feasibility::Infeasible);
        }
        let found = b.search(0)?;
        debug!("branching solver explored {} nodes", b.nodes);
        Ok(if found {
            Feasibility::Feasible(Some(b.values))
        } else {
            Feasibility::Infeasible
        })
    }
}

// ============================================================================
// External solvers
// ============================================================================

static MODEL_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Write `program` to a fresh LP file in the temp directory
fn write_model(program: &BinaryProgram) -> Result<PathBuf, SolverError> {
    let id = MODEL_COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("star-precolor-{}-{}.lp", std::process::id(), id));
    std::fs::write(&path, program.to_lp_format()).map_err(|source| SolverError::Model {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn run_external(
    solver: &str,
    mut command: Command,
    model: &Path,
) -> Result<(String, String), SolverError> {
    let result = command.output();
    if let Err(e) = std::fs::remove_file(model) {
        warn!("could not remove {:?}: {}", model, e);
    }
    let output = result.map_err(|source| SolverError::Launch {
        solver: solver.to_string(),
        source,
    })?;
    Ok((
        String::from_utf8_lossy(&output.stdout).into_owned(),
        output.status.to_string(),
    ))
}

/// Interpret the terminal report of `glpsol`
pub fn glpk_status(stdout: &str, exit_status: &str) -> Result<Feasibility, SolverError> {
    if stdout.contains("INTEGER OPTIMAL SOLUTION FOUND") {
        Ok(Feasibility::Feasible(None))
    } else if stdout.contains("PROBLEM HAS NO PRIMAL FEASIBLE SOLUTION")
        || stdout.contains("PROBLEM HAS NO INTEGER FEASIBLE SOLUTION")
    {
        Ok(Feasibility::Infeasible)
    } else {
        Err(SolverError::UnknownStatus {
            solver: "glpsol".into(),
            status: exit_status.to_string(),
            output: stdout.lines().last().unwrap_or_default().to_string(),
        })
    }
}

/// Interpret the terminal report of the CPLEX interactive optimizer
pub fn cplex_status(stdout: &str, exit_status: &str) -> Result<Feasibility, SolverError> {
    if stdout.contains("Integer infeasible") {
        Ok(Feasibility::Infeasible)
    } else if stdout.contains("Integer optimal") || stdout.contains("Integer feasible") {
        Ok(Feasibility::Feasible(None))
    } else {
        Err(SolverError::UnknownStatus {
            solver: "cplex".into(),
            status: exit_status.to_string(),
            output: stdout.lines().last().unwrap_or_default().to_string(),
        })
    }
}

/// GLPK through the `glpsol` command
#[derive(Debug, Clone)]
pub struct GlpkSolver {
    pub binary: PathBuf,
}

impl IlpSolver for GlpkSolver {
    fn name(&self) -> &str {
        "GLPK"
    }

    fn solve(&self, program: &BinaryProgram) -> Result<Feasibility, SolverError> {
        let model = write_model(program)?;
        let mut command = Command::new(&self.binary);
        command.arg("--lp").arg(&model);
        let (stdout, status) = run_external("glpsol", command, &model)?;
        glpk_status(&stdout, &status)
    }
}

/// CPLEX through its interactive optimizer in batch mode
#[derive(Debug, Clone)]
pub struct CplexSolver {
    pub binary: PathBuf,
}

impl IlpSolver for CplexSolver {
    fn name(&self) -> &str {
        "CPLEX"
    }

    fn solve(&self, program: &BinaryProgram) -> Result<Feasibility, SolverError> {
        let model = write_model(program)?;
        let mut command = Command::new(&self.binary);
        command
            .arg("-c")
            .arg(format!("read {}", model.display()))
            .arg("mipopt")
            .arg("quit");
        let (stdout, status) = run_external("cplex", command, &model)?;
        cplex_status(&stdout, &status)
    }
}

/// Locate an executable on `PATH`
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// CPLEX if installed, else GLPK, else the built-in branching solver.
pub fn select_solver() -> Box<dyn IlpSolver> {
    let solver: Box<dyn IlpSolver> = if let Some(binary) = find_on_path("cplex") {
        Box::new(CplexSolver { binary })
    } else if let Some(binary) = find_on_path("glpsol") {
        Box::new(GlpkSolver { binary })
    } else {
        Box::new(BranchingSolver::default())
    };
    info!("Using IP solver {}", solver.name());
    solver
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branching_finds_assignment() {
        let mut p = BinaryProgram::new();
        let a = p.add_variable("a");
        let b = p.add_variable("b");
        let c = p.add_variable("c");
        p.add_constraint(vec![(a, 1), (b, 1), (c, 1)], Sense::Eq, 2);
        p.add_constraint(vec![(a, 1), (b, 1)], Sense::Le, 1);
        let result = BranchingSolver::default().solve(&p).unwrap();
        match result {
            Feasibility::Feasible(Some(values)) => {
                assert!(p.is_satisfied_by(&values));
                assert!(values[c]);
            }
            other => panic!("expected a feasible assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_branching_proves_infeasibility() {
        let mut p = BinaryProgram::new();
        let a = p.add_variable("a");
        let b = p.add_variable("b");
        p.add_constraint(vec![(a, 1), (b, 1)], Sense::Ge, 2);
        p.add_constraint(vec![(a, 1), (b, -1)], Sense::Eq, 1);
        assert_eq!(BranchingSolver::default().solve(&p).unwrap(), Feasibility::Infeasible);
    }

    #[test]
    fn test_node_limit_is_an_error_not_infeasible() {
        let mut p = BinaryProgram::new();
        for i in 0..6 {
            p.add_variable(format!("v{}", i));
        }
        // sum = 7 over six binaries: infeasible, but only after branching
        p.add_constraint((0..6).map(|v| (v, 2)).collect(), Sense::Eq, 7);
        let solver = BranchingSolver { node_limit: Some(3) };
        assert!(matches!(solver.solve(&p), Err(SolverError::NodeLimit { .. })));
    }

    #[test]
    fn test_glpk_status_lines() {
        let optimal = "...\nINTEGER OPTIMAL SOLUTION FOUND\nTime used: 0.0 secs\n";
        assert_eq!(
            glpk_status(optimal, "exit status: 0").unwrap(),
            Feasibility::Feasible(None)
        );
        assert_eq!(
            glpk_status("PROBLEM HAS NO INTEGER FEASIBLE SOLUTION\n", "exit status: 0").unwrap(),
            Feasibility::Infeasible
        );
        assert!(glpk_status("glpsol: license error\n", "exit status: 1").is_err());
    }

    #[test]
    fn test_cplex_status_lines() {
        assert_eq!(
            cplex_status("MIP - Integer infeasible.\n", "exit status: 0").unwrap(),
            Feasibility::Infeasible
        );
        let optimal = "MIP - Integer optimal solution:  Objective =  0.0000000000e+00\n";
        assert_eq!(
            cplex_status(optimal, "exit status: 0").unwrap(),
            Feasibility::Feasible(None)
        );
        assert!(cplex_status("", "signal: 9").is_err());
    }
}
