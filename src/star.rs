//! Star-coloring constraint index.
//!
//! A proper coloring is a star coloring when no induced path or cycle on four
//! vertices is colored with two alternating colors. Each induced P4/C4 is
//! owned by its highest-indexed vertex, and is stored there as a
//! [`ConflictTriple`] so the search can police it in constant time when the
//! owner receives a color.

use crate::{utils::num_combinations, Graph};
use itertools::Itertools;
use log::debug;

/// Forbidden pattern owned by some vertex `cur`:
/// the coloring is invalid if `c[u] == c[v]` and `c[cur] == c[other]`.
///
/// All three vertices are strictly smaller than the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictTriple {
    pub u: usize,
    pub v: usize,
    pub other: usize,
}

impl ConflictTriple {
    /// True if coloring `owner_color` at the owner completes a bichromatic P4/C4
    #[inline]
    pub fn is_violated(&self, colors: &[Option<usize>], owner_color: usize) -> bool {
        colors[self.other] == Some(owner_color)
            && colors[self.u].is_some()
            && colors[self.u] == colors[self.v]
    }
}

/// Returns true if `h` (a graph on exactly four vertices) is a path or a cycle.
pub fn is_p4_or_c4(h: &Graph) -> bool {
    match h.num_edges() {
        4 => h.degree_sequence() == [2, 2, 2, 2],
        3 => h.degree_sequence() == [2, 2, 1, 1],
        _ => false,
    }
}

/// Every 4-vertex subset (ascending) of `graph` that induces a P4 or a C4
pub fn induced_four_sets(graph: &Graph) -> impl Iterator<Item = Vec<usize>> + '_ {
    graph
        .vertices()
        .combinations(4)
        .filter(|s| is_p4_or_c4(&graph.induced_subgraph(s)))
}

/// Conflict triples for every vertex, keyed by owner
#[derive(Debug, Clone, Default)]
pub struct StarIndex {
    triples: Vec<Vec<ConflictTriple>>,
}

impl StarIndex {
    /// Index every induced P4/C4 of `graph`.
    pub fn build(graph: &Graph) -> Self {
        Self::build_with_roles(graph, &[], &[])
    }

    /// Index every induced P4/C4 of `graph`, skipping 4-sets that meet both
    /// `recolor_verts` and `extend_verts`.
    pub fn build_with_roles(
        graph: &Graph,
        recolor_verts: &[usize],
        extend_verts: &[usize],
    ) -> Self {
        let n = graph.num_vertices();
        let mut triples = vec![Vec::new(); n];
        let mut skipped = 0usize;

        for s in graph.vertices().combinations(4) {
            let meets_recolor = s.iter().any(|x| recolor_verts.contains(x));
            let meets_extend = s.iter().any(|x| extend_verts.contains(x));
            if meets_recolor && meets_extend {
                skipped += 1;
                continue;
            }

            let h = graph.induced_subgraph(&s);
            if !is_p4_or_c4(&h) {
                continue;
            }

            // `combinations` yields ascending subsets, so the owner is local vertex 3.
            let cur = 3;
            let mut far: Vec<usize> = h.neighbors(cur).collect();
            if far.len() == 1 {
                far.extend((0..cur).filter(|&x| h.degree(x) == 1));
            }
            let Some(other) = (0..cur).find(|x| !far.contains(x)) else {
                continue;
            };

            triples[s[cur]].push(ConflictTriple {
                u: s[far[0]],
                v: s[far[1]],
                other: s[other],
            });
        }

        let index = StarIndex { triples };
        debug!(
            "star index: {} of {} 4-sets constrain the coloring ({} skipped by role)",
            index.len(),
            num_combinations(n, 4),
            skipped
        );
        index
    }

    /// Triples owned by `cur`
    pub fn triples(&self, cur: usize) -> &[ConflictTriple] {
        &self.triples[cur]
    }

    /// Total number of triples
    pub fn len(&self) -> usize {
        self.triples.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Checks a complete coloring: adjacent vertices differ and no induced P4/C4
/// uses only two colors.
pub fn is_star_coloring(graph: &Graph, colors: &[usize]) -> bool {
    if colors.len() != graph.num_vertices() {
        return false;
    }
    if graph.edges().any(|(u, v)| colors[u] == colors[v]) {
        return false;
    }
    induced_four_sets(graph).all(|s| s.iter().map(|&x| colors[x]).unique().count() > 2)
}
