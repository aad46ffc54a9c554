/// Represents a simple undirected graph with adjacency matrix
///
/// Vertices are the dense range `0..n`. The search relies on that ordering:
/// adjacency checks only look at lower-indexed neighbors, and every induced
/// 4-vertex set is owned by its highest-indexed vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    /// Number of vertices
    pub n: usize,
    /// Adjacency matrix: adj[i][j] is true iff {i, j} is an edge
    pub adj: Vec<Vec<bool>>,
}

impl Graph {
    pub fn new(n: usize) -> Self {
        Graph {
            n,
            adj: vec![vec![false; n]; n],
        }
    }

    /// Build from an undirected edge list. Self-loops are ignored.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut g = Graph::new(n);
        for &(u, v) in edges {
            g.add_edge(u, v);
        }
        g
    }

    pub fn from_adjacency_matrix(adj: Vec<Vec<bool>>) -> Self {
        let n = adj.len();
        Graph { n, adj }
    }

    pub fn add_edge(&mut self, u: usize, v: usize) {
        if u == v {
            return;
        }
        self.adj[u][v] = true;
        self.adj[v][u] = true;
    }

    pub fn num_vertices(&self) -> usize {
        self.n
    }

    pub fn vertices(&self) -> std::ops::Range<usize> {
        0..self.n
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adj[u][v]
    }

    /// Neighbors of `v` in increasing order
    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.adj[v]
            .iter()
            .enumerate()
            .filter_map(|(u, &edge)| edge.then_some(u))
    }

    pub fn degree(&self, v: usize) -> usize {
        self.adj[v].iter().filter(|&&edge| edge).count()
    }

    /// Edges as `(u, v)` with `u < v`, sorted lexicographically
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.n).flat_map(move |u| {
            ((u + 1)..self.n).filter_map(move |v| self.adj[u][v].then_some((u, v)))
        })
    }

    pub fn num_edges(&self) -> usize {
        self.edges().count()
    }

    /// Degrees sorted in non-increasing order
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut degrees: Vec<usize> = self.vertices().map(|v| self.degree(v)).collect();
        degrees.sort_unstable_by(|a, b| b.cmp(a));
        degrees
    }

    /// Subgraph induced on `vertices`; vertex `i` of the result is `vertices[i]`.
    pub fn induced_subgraph(&self, vertices: &[usize]) -> Graph {
        let k = vertices.len();
        let mut h = Graph::new(k);
        for i in 0..k {
            for j in (i + 1)..k {
                if self.adj[vertices[i]][vertices[j]] {
                    h.add_edge(i, j);
                }
            }
        }
        h
    }

    /// Line graph: one vertex per edge (in `edges()` order), adjacent iff the
    /// edges share an endpoint.
    pub fn line_graph(&self) -> Graph {
        let edges: Vec<(usize, usize)> = self.edges().collect();
        let mut l = Graph::new(edges.len());
        for i in 0..edges.len() {
            for j in (i + 1)..edges.len() {
                let (a, b) = edges[i];
                let (c, d) = edges[j];
                if a == c || a == d || b == c || b == d {
                    l.add_edge(i, j);
                }
            }
        }
        l
    }
}

/// A (partial) color assignment, indexed by vertex
pub type Coloring = Vec<Option<usize>>;

// Module declarations
pub mod config;
pub mod error;
pub mod ilp;
pub mod parser;
pub mod partition;
pub mod report;
pub mod search;
pub mod solver;
pub mod star;
pub mod utils;

pub use config::{CompletionPolicy, ExtensionConfig, Instance};
pub use error::StarError;
pub use partition::Partition;
pub use report::{SearchEvent, SearchObserver, SearchOutcome, Verdict};
pub use search::{check_precoloring_extension, run_search};

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(n: usize) -> Graph {
        let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        Graph::from_edges(n, &edges)
    }

    #[test]
    fn test_graph_creation() {
        let g = Graph::new(3);
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 0);
        assert!(!g.has_edge(0, 1));
    }

    #[test]
    fn test_edges_are_symmetric_and_sorted() {
        let g = Graph::from_edges(4, &[(3, 0), (1, 2), (2, 1), (0, 0)]);
        assert!(g.has_edge(0, 3) && g.has_edge(3, 0));
        assert_eq!(g.edges().collect::<Vec<_>>(), vec![(0, 3), (1, 2)]);
        assert_eq!(g.neighbors(0).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_degree_sequence_of_path() {
        let p4 = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(p4.degree_sequence(), vec![2, 2, 1, 1]);
        assert_eq!(cycle(4).degree_sequence(), vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_induced_subgraph_relabels() {
        let g = cycle(5);
        let h = g.induced_subgraph(&[0, 1, 2, 4]);
        // 0-1, 1-2, 4-0 survive; 2-3 and 3-4 do not
        assert_eq!(h.num_edges(), 3);
        assert!(h.has_edge(0, 1) && h.has_edge(1, 2) && h.has_edge(0, 3));
        assert_eq!(h.degree_sequence(), vec![2, 2, 1, 1]);
    }

    #[test]
    fn test_line_graph_of_star_and_cycle() {
        let claw = Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3)]);
        let l = claw.line_graph();
        assert_eq!(l.num_vertices(), 3);
        assert_eq!(l.num_edges(), 3);

        let l4 = cycle(4).line_graph();
        assert_eq!(l4.num_vertices(), 4);
        assert_eq!(l4.degree_sequence(), vec![2, 2, 2, 2]);
    }
}
