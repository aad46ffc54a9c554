//! 0/1 linear-programming formulation of k-star-colorability.
//!
//! `x[v,c] = 1` iff vertex `v` gets color `c`. Every vertex takes exactly one
//! color, adjacent vertices never share one, and for every induced P4/C4 and
//! every pair of colors at most three of its four vertices use that pair.
//! One edge is pinned to colors 0 and 1 to cut color permutations.

use crate::{
    solver::{Feasibility, IlpSolver, SolverError},
    star::induced_four_sets,
    Graph,
};
use itertools::Itertools;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Le,
    Eq,
    Ge,
}

/// `sum(coef * x[var]) <sense> rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub terms: Vec<(usize, i64)>,
    pub sense: Sense,
    pub rhs: i64,
}

impl LinearConstraint {
    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        let lhs: i64 = self
            .terms
            .iter()
            .map(|&(var, coef)| if values[var] { coef } else { 0 })
            .sum();
        match self.sense {
            Sense::Le => lhs <= self.rhs,
            Sense::Eq => lhs == self.rhs,
            Sense::Ge => lhs >= self.rhs,
        }
    }
}

/// A feasibility problem over binary variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryProgram {
    names: Vec<String>,
    constraints: Vec<LinearConstraint>,
}

impl BinaryProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, name: impl Into<String>) -> usize {
        self.names.push(name.into());
        self.names.len() - 1
    }

    pub fn add_constraint(&mut self, terms: Vec<(usize, i64)>, sense: Sense, rhs: i64) {
        self.constraints.push(LinearConstraint { terms, sense, rhs });
    }

    pub fn num_variables(&self) -> usize {
        self.names.len()
    }

    pub fn variable_name(&self, var: usize) -> &str {
        &self.names[var]
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        values.len() == self.num_variables()
            && self.constraints.iter().all(|c| c.is_satisfied_by(values))
    }

    /// Render in CPLEX LP format (read by both CPLEX and GLPK).
    pub fn to_lp_format(&self) -> String {
        let mut out = String::from("Minimize\n obj:");
        if let Some(first) = self.names.first() {
            out.push_str(&format!(" 0 {}", first));
        }
        out.push_str("\nSubject To\n");

        for (i, c) in self.constraints.iter().enumerate() {
            out.push_str(&format!(" c{}:", i));
            for (j, &(var, coef)) in c.terms.iter().enumerate() {
                let sign = if coef < 0 { "-" } else if j > 0 { "+" } else { "" };
                let magnitude = coef.unsigned_abs();
                if magnitude == 1 {
                    out.push_str(&format!(" {} {}", sign, self.names[var]));
                } else {
                    out.push_str(&format!(" {} {} {}", sign, magnitude, self.names[var]));
                }
            }
            let sense = match c.sense {
                Sense::Le => "<=",
                Sense::Eq => "=",
                Sense::Ge => ">=",
            };
            out.push_str(&format!(" {} {}\n", sense, c.rhs));
        }

        out.push_str("Binary\n");
        for name in &self.names {
            out.push_str(&format!(" {}\n", name));
        }
        out.push_str("End\n");
        out
    }
}

/// The star-coloring program of a graph for `k` colors
#[derive(Debug, Clone)]
pub struct StarColoringProgram {
    pub program: BinaryProgram,
    n: usize,
    k: usize,
}

impl StarColoringProgram {
    pub fn build(graph: &Graph, k: usize) -> Self {
        let n = graph.num_vertices();
        let mut program = BinaryProgram::new();
        for v in graph.vertices() {
            for c in 0..k {
                program.add_variable(format!("x_{}_{}", v, c));
            }
        }
        let x = |v: usize, c: usize| v * k + c;

        for v in graph.vertices() {
            program.add_constraint((0..k).map(|c| (x(v, c), 1)).collect(), Sense::Eq, 1);
        }

        for (u, v) in graph.edges() {
            for c in 0..k {
                program.add_constraint(vec![(x(u, c), 1), (x(v, c), 1)], Sense::Le, 1);
            }
        }

        let four_sets: Vec<Vec<usize>> = induced_four_sets(graph).collect();
        for s in &four_sets {
            for (c1, c2) in (0..k).tuple_combinations() {
                let terms = s.iter().flat_map(|&v| [(x(v, c1), 1), (x(v, c2), 1)]).collect();
                program.add_constraint(terms, Sense::Le, 3);
            }
        }

        if k >= 2 {
            if let Some((u, v)) = graph.edges().next() {
                program.add_constraint(vec![(x(u, 0), 1)], Sense::Eq, 1);
                program.add_constraint(vec![(x(v, 1), 1)], Sense::Eq, 1);
            }
        }

        debug!(
            "star coloring program: {} vertices, {} colors, {} induced P4/C4, {} constraints",
            n,
            k,
            four_sets.len(),
            program.constraints().len()
        );
        StarColoringProgram { program, n, k }
    }

    /// Read the coloring back out of a solution vector
    pub fn decode(&self, values: &[bool]) -> Option<Vec<usize>> {
        (0..self.n)
            .map(|v| (0..self.k).find(|&c| values[v * self.k + c]))
            .collect()
    }
}

/// Whether the star chromatic number of `graph` is at most `k`.
///
/// Solver faults are returned as errors, never as `false`.
pub fn is_scn_at_most(
    graph: &Graph,
    k: usize,
    solver: &dyn IlpSolver,
) -> Result<bool, SolverError> {
    Ok(star_coloring_via_ilp(graph, k, solver)?.is_some())
}

/// Like [`is_scn_at_most`], also returning the coloring when the solver provides one.
///
/// `Ok(Some(vec![]))` means feasible without a reported assignment.
pub fn star_coloring_via_ilp(
    graph: &Graph,
    k: usize,
    solver: &dyn IlpSolver,
) -> Result<Option<Vec<usize>>, SolverError> {
    if graph.num_vertices() > 0 && k == 0 {
        return Ok(None);
    }
    if k < 2 && graph.num_edges() > 0 {
        return Ok(None);
    }

    let model = StarColoringProgram::build(graph, k);
    match solver.solve(&model.program)? {
        Feasibility::Infeasible => Ok(None),
        Feasibility::Feasible(Some(values)) => Ok(Some(model.decode(&values).unwrap_or_default())),
        Feasibility::Feasible(None) => Ok(Some(Vec::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::BranchingSolver;
    use crate::star::is_star_coloring;

    fn cycle(n: usize) -> Graph {
        let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        Graph::from_edges(n, &edges)
    }

    #[test]
    fn test_program_shape_for_four_cycle() {
        let model = StarColoringProgram::build(&cycle(4), 3);
        assert_eq!(model.program.num_variables(), 12);
        // 4 exactly-one + 4 edges * 3 colors + 1 four-set * 3 pairs + 2 pins
        assert_eq!(model.program.constraints().len(), 4 + 12 + 3 + 2);
        assert_eq!(model.program.variable_name(5), "x_1_2");
    }

    #[test]
    fn test_alternating_coloring_violates_program() {
        let model = StarColoringProgram::build(&cycle(4), 3);
        let mut values = vec![false; 12];
        for (v, c) in [(0, 0), (1, 1), (2, 0), (3, 1)] {
            values[v * 3 + c] = true;
        }
        assert!(!model.program.is_satisfied_by(&values));
        values[3 * 3 + 1] = false;
        values[3 * 3 + 2] = true;
        assert!(model.program.is_satisfied_by(&values));
        assert_eq!(model.decode(&values), Some(vec![0, 1, 0, 2]));
    }

    #[test]
    fn test_lp_format() {
        let mut p = BinaryProgram::new();
        let a = p.add_variable("a");
        let b = p.add_variable("b");
        p.add_constraint(vec![(a, 1), (b, -2)], Sense::Le, 1);
        let lp = p.to_lp_format();
        assert!(lp.starts_with("Minimize\n obj: 0 a\nSubject To\n"));
        assert!(lp.contains(" c0:  a - 2 b <= 1\n"));
        assert!(lp.ends_with("Binary\n a\n b\nEnd\n"));
    }

    #[test]
    fn test_is_scn_at_most_on_cycles() {
        let solver = BranchingSolver::default();
        assert!(!is_scn_at_most(&cycle(4), 2, &solver).unwrap());
        assert!(is_scn_at_most(&cycle(4), 3, &solver).unwrap());
        assert!(!is_scn_at_most(&cycle(5), 3, &solver).unwrap());
        assert!(is_scn_at_most(&cycle(5), 4, &solver).unwrap());
    }

    #[test]
    fn test_returned_coloring_is_a_star_coloring() {
        let solver = BranchingSolver::default();
        let g = cycle(6);
        let coloring = star_coloring_via_ilp(&g, 3, &solver).unwrap().unwrap();
        assert!(is_star_coloring(&g, &coloring));
        assert_eq!(coloring[0], 0);
        assert_eq!(coloring[1], 1);
    }

    #[test]
    fn test_degenerate_color_counts() {
        let solver = BranchingSolver::default();
        let edge = Graph::from_edges(2, &[(0, 1)]);
        assert!(!is_scn_at_most(&edge, 1, &solver).unwrap());
        assert!(is_scn_at_most(&Graph::new(3), 1, &solver).unwrap());
        assert!(!is_scn_at_most(&Graph::new(3), 0, &solver).unwrap());
        assert!(is_scn_at_most(&Graph::new(0), 0, &solver).unwrap());
    }
}
