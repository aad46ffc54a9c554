//! Backtracking search for star-coloring extensions of a precolored prefix.
//!
//! Vertices are colored in index order. Vertices `0..p` (the prefix) are
//! enumerated like every other vertex; each time the search completes a prefix
//! it tries to extend it to the whole graph. A retreat from vertex `p` back
//! into the prefix means the current prefix has no extension.
//!
//! The control flow is a small state machine:
//!
//! - `Descending`: try the next admissible color at `cur`, then arrive at
//!   `cur + 1` (or `Success` past the last vertex); `Retreating` once the
//!   colors run out.
//! - `Retreating`: `Failure` if `cur == p`, `Finished` if `cur == 0`, else
//!   `Descending` at `cur - 1`.
//! - `Success`: count the coloring, then `Finished` or `Descending` at `p - 1`.
//! - `Failure`: count the failure and check the budget, then `Finished` or
//!   `Descending` at `p - 1`.

use crate::{
    config::{CompletionPolicy, ExtensionConfig},
    error::StarError,
    report::{LogObserver, SearchEvent, SearchObserver, SearchOutcome, Verdict},
    star::StarIndex,
    Coloring, Graph,
};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Descending,
    Retreating,
    Success,
    Failure,
    Finished,
}

/// Mutable state of one search call
struct Search<'a, O: SearchObserver + ?Sized> {
    config: &'a ExtensionConfig,
    n: usize,
    index: StarIndex,
    /// Neighbors of each vertex with a smaller index
    lower_neighbors: Vec<Vec<usize>>,
    observer: &'a mut O,

    cur: usize,
    /// Assigned color per vertex
    colors: Coloring,
    /// Next candidate color per vertex
    cursor: Vec<usize>,

    failures: usize,
    extensions: usize,
    partition_counter: usize,
    aborted: bool,
    witness: Option<Vec<usize>>,
}

impl<'a, O: SearchObserver + ?Sized> Search<'a, O> {
    fn new(graph: &Graph, config: &'a ExtensionConfig, observer: &'a mut O) -> Self {
        let n = graph.num_vertices();
        let lower_neighbors: Vec<Vec<usize>> = graph
            .vertices()
            .map(|v| graph.neighbors(v).take_while(|&u| u < v).collect())
            .collect();

        Search {
            config,
            n,
            index: StarIndex::build_with_roles(graph, &config.recolor_verts, &config.extend_verts),
            lower_neighbors,
            observer,
            cur: 0,
            colors: vec![None; n],
            cursor: vec![0; n],
            failures: 0,
            extensions: 0,
            partition_counter: 0,
            aborted: false,
            witness: None,
        }
    }

    fn run(mut self) -> SearchOutcome {
        let mut state = self.arrive(0);
        while state != State::Finished {
            state = match state {
                State::Descending => self.descend(),
                State::Retreating => self.retreat(),
                State::Success => self.succeed(),
                State::Failure => self.fail(),
                State::Finished => State::Finished,
            };
        }
        self.outcome()
    }

    /// Enter vertex `v` with no color tried yet.
    fn arrive(&mut self, v: usize) -> State {
        if v == self.n {
            return State::Success;
        }
        self.cur = v;
        self.colors[v] = None;
        self.cursor[v] = 0;

        let partition = self.config.partition;
        if v == partition.depth {
            self.partition_counter += 1;
            if !partition.admits(self.partition_counter) {
                self.observer.on_event(&SearchEvent::PartitionSkip {
                    counter: self.partition_counter,
                });
                // Another job owns this subtree; it is not a failure of this prefix.
                return if v == 0 {
                    State::Finished
                } else {
                    self.cur = v - 1;
                    State::Descending
                };
            }
        }
        State::Descending
    }

    /// Find the next admissible color for `cur`, or give up on it.
    fn descend(&mut self) -> State {
        let cur = self.cur;
        if self.config.progress_depth.is_some_and(|d| cur <= d) {
            self.observer.on_event(&SearchEvent::Progress {
                cur,
                colors: &self.colors,
            });
        }

        loop {
            let color = self.cursor[cur];
            self.cursor[cur] += 1;
            // A vertex never needs a color label above its own index.
            if color >= self.config.num_colors || color > cur {
                self.colors[cur] = None;
                return State::Retreating;
            }
            if self.admissible(cur, color) {
                self.colors[cur] = Some(color);
                return self.arrive(cur + 1);
            }
        }
    }

    fn admissible(&self, cur: usize, color: usize) -> bool {
        if self.lower_neighbors[cur].iter().any(|&v| self.colors[v] == Some(color)) {
            return false;
        }
        !self
            .index
            .triples(cur)
            .iter()
            .any(|t| t.is_violated(&self.colors, color))
    }

    fn retreat(&mut self) -> State {
        if self.cur == self.config.num_precolored_verts {
            return State::Failure;
        }
        if self.cur == 0 {
            return State::Finished;
        }
        self.cur -= 1;
        State::Descending
    }

    /// Every vertex is colored.
    fn succeed(&mut self) -> State {
        self.extensions += 1;
        if self.witness.is_none() {
            self.witness = Some(self.colors.iter().flatten().copied().collect());
        }
        self.observer.on_event(&SearchEvent::Extension {
            count: self.extensions,
            colors: &self.colors,
        });

        if self.config.completion == CompletionPolicy::StopAtFirst {
            return State::Finished;
        }
        self.resume_after_prefix()
    }

    /// The current prefix has no extension.
    fn fail(&mut self) -> State {
        self.failures += 1;
        self.observer.on_event(&SearchEvent::Failure {
            failures: self.failures,
            colors: &self.colors,
        });

        if self.config.num_precolored_verts == 0 {
            // The empty prefix failing means the whole tree is exhausted.
            return State::Finished;
        }
        if self.failures >= self.config.failure_budget {
            self.aborted = true;
            self.observer.on_event(&SearchEvent::Aborted {
                failures: self.failures,
            });
            return State::Finished;
        }
        self.resume_after_prefix()
    }

    /// Drop everything past the prefix and move to the prefix's next coloring.
    fn resume_after_prefix(&mut self) -> State {
        let p = self.config.num_precolored_verts;
        for v in p..self.n {
            self.colors[v] = None;
            self.cursor[v] = 0;
        }
        if p == 0 {
            return State::Finished;
        }
        self.cur = p - 1;
        State::Descending
    }

    fn outcome(self) -> SearchOutcome {
        let extendable = match self.config.completion {
            CompletionPolicy::StopAtFirst => self.extensions > 0,
            CompletionPolicy::EnumerateAll => self.failures == 0,
        };
        SearchOutcome {
            verdict: if extendable {
                Verdict::Extendable
            } else {
                Verdict::NotExtendable
            },
            failures: self.failures,
            extensions: self.extensions,
            partition_nodes: self.partition_counter,
            aborted: self.aborted,
            witness: self.witness,
        }
    }
}

/// Run one search, reporting diagnostics to `observer`.
pub fn run_search<O>(
    graph: &Graph,
    config: &ExtensionConfig,
    observer: &mut O,
) -> Result<SearchOutcome, StarError>
where
    O: SearchObserver + ?Sized,
{
    config.validate(graph)?;
    let outcome = Search::new(graph, config, observer).run();

    if !outcome.aborted {
        info!(
            "search finished: num_precolorings={} failures={} partition_nodes={}",
            outcome.extensions, outcome.failures, outcome.partition_nodes
        );
    }
    Ok(outcome)
}

/// Whether every precoloring of the first `config.num_precolored_verts`
/// vertices extends to a star coloring with `config.num_colors` colors.
///
/// Diagnostics go to the `log` facade.
pub fn check_precoloring_extension(
    graph: &Graph,
    config: &ExtensionConfig,
) -> Result<bool, StarError> {
    let mut observer = LogObserver::new(&config.precolor_verts);
    Ok(run_search(graph, config, &mut observer)?.is_extendable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Partition;

    fn cycle(n: usize) -> Graph {
        let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        Graph::from_edges(n, &edges)
    }

    fn quiet(config: ExtensionConfig) -> ExtensionConfig {
        config.with_progress_depth(None)
    }

    #[test]
    fn test_four_cycle_two_colors_fails() {
        let config = ExtensionConfig::simple(0, 2);
        assert!(!check_precoloring_extension(&cycle(4), &config).unwrap());
    }

    #[test]
    fn test_four_cycle_three_colors_succeeds() {
        let config = ExtensionConfig::simple(0, 3);
        let outcome = run_search(&cycle(4), &config, &mut LogObserver::default()).unwrap();
        assert!(outcome.is_extendable());
        let witness = outcome.witness.unwrap();
        assert_eq!(witness, vec![0, 1, 0, 2]);
        assert!(crate::star::is_star_coloring(&cycle(4), &witness));
    }

    #[test]
    fn test_single_edge_succeeds() {
        let edge = Graph::from_edges(2, &[(0, 1)]);
        assert!(check_precoloring_extension(&edge, &ExtensionConfig::simple(0, 2)).unwrap());
    }

    #[test]
    fn test_empty_graph_is_trivially_extendable() {
        let config = ExtensionConfig::simple(0, 1);
        let outcome = run_search(&Graph::new(0), &config, &mut LogObserver::default()).unwrap();
        assert!(outcome.is_extendable());
        assert_eq!(outcome.extensions, 1);
    }

    #[test]
    fn test_every_prefix_is_visited() {
        // Path 0-1-2 with 0 and 1 precolored: the canonical prefixes are (0,1) only.
        let p3 = Graph::from_edges(3, &[(0, 1), (1, 2)]);
        let config = quiet(ExtensionConfig::exploratory(2, 3));
        let outcome = run_search(&p3, &config, &mut LogObserver::default()).unwrap();
        assert_eq!(outcome.extensions, 1);
        assert_eq!(outcome.failures, 0);
        assert!(outcome.is_extendable());
    }

    #[test]
    fn test_stop_at_first_reports_single_extension() {
        let config =
            quiet(ExtensionConfig::simple(0, 3)).with_completion(CompletionPolicy::StopAtFirst);
        let outcome = run_search(&cycle(6), &config, &mut LogObserver::default()).unwrap();
        assert!(outcome.is_extendable());
        assert_eq!(outcome.extensions, 1);
    }

    #[test]
    fn test_five_cycle_needs_four_colors() {
        let three = quiet(ExtensionConfig::simple(0, 3));
        let four = quiet(ExtensionConfig::simple(0, 4));
        assert!(!check_precoloring_extension(&cycle(5), &three).unwrap());
        assert!(check_precoloring_extension(&cycle(5), &four).unwrap());
    }

    #[test]
    fn test_progress_events_stop_at_progress_depth() {
        let mut deepest = 0;
        let mut observer = |e: &SearchEvent<'_>| {
            if let SearchEvent::Progress { cur, .. } = e {
                deepest = deepest.max(*cur);
            }
        };
        let config = ExtensionConfig::simple(0, 3).with_progress_depth(Some(2));
        run_search(&cycle(6), &config, &mut observer).unwrap();
        assert_eq!(deepest, 2);
    }

    #[test]
    fn test_count_only_run_skips_everything() {
        let config = quiet(ExtensionConfig::simple(1, 3)).with_partition(Partition::count_only(1));
        let outcome = run_search(&cycle(4), &config, &mut LogObserver::default()).unwrap();
        // Vertex 0 only ever takes color 0, so exactly one node exists at depth 1.
        assert_eq!(outcome.partition_nodes, 1);
        assert_eq!(outcome.extensions, 0);
        assert_eq!(outcome.failures, 0);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let config = ExtensionConfig::simple(7, 3);
        assert!(matches!(
            check_precoloring_extension(&cycle(4), &config),
            Err(StarError::Config(_))
        ));
    }
}
