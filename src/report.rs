use crate::utils::format_coloring;
use log::{debug, error, trace, warn};
use std::fmt;

/// Answer to "does every precoloring of the prefix extend?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Extendable,
    NotExtendable,
}

/// Result of one search call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub verdict: Verdict,
    /// Retreats through the precolored boundary
    pub failures: usize,
    /// Complete colorings found (`num_precolorings` in reports)
    pub extensions: usize,
    /// Nodes seen at the partition depth, admitted or not
    pub partition_nodes: usize,
    /// The failure budget ran out before the tree was exhausted
    pub aborted: bool,
    /// First complete coloring found, if any
    pub witness: Option<Vec<usize>>,
}

impl SearchOutcome {
    pub fn is_extendable(&self) -> bool {
        self.verdict == Verdict::Extendable
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verdict {
            Verdict::Extendable => write!(f, "every precoloring extends")?,
            Verdict::NotExtendable if self.aborted => {
                write!(f, "gave up after {} failures", self.failures)?
            }
            Verdict::NotExtendable => write!(f, "{} precolorings do not extend", self.failures)?,
        }
        write!(
            f,
            " (num_precolorings={}, partition_nodes={})",
            self.extensions, self.partition_nodes
        )
    }
}

/// Diagnostics emitted while the search runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent<'a> {
    /// About to pick the next color for a shallow vertex
    Progress { cur: usize, colors: &'a [Option<usize>] },
    /// A prefix could not be extended
    Failure { failures: usize, colors: &'a [Option<usize>] },
    /// A complete coloring was found
    Extension { count: usize, colors: &'a [Option<usize>] },
    /// A subtree at the partition depth belongs to another job
    PartitionSkip { counter: usize },
    /// The failure budget is used up
    Aborted { failures: usize },
}

pub trait SearchObserver {
    fn on_event(&mut self, event: &SearchEvent<'_>);
}

impl<F> SearchObserver for F
where
    F: FnMut(&SearchEvent<'_>),
{
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        self(event)
    }
}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Default)]
pub struct LogObserver {
    /// Labels of the precolored positions, used when reporting failures
    precolor_labels: Vec<usize>,
}

impl LogObserver {
    pub fn new(precolor_labels: &[usize]) -> Self {
        LogObserver {
            precolor_labels: precolor_labels.to_vec(),
        }
    }

    fn labelled_prefix(&self, colors: &[Option<usize>]) -> String {
        let pairs: Vec<String> = self
            .precolor_labels
            .iter()
            .zip(colors)
            .map(|(label, color)| match color {
                Some(c) => format!("{}:{}", label, c),
                None => format!("{}:-", label),
            })
            .collect();
        pairs.join(" ")
    }
}

impl SearchObserver for LogObserver {
    fn on_event(&mut self, event: &SearchEvent<'_>) {
        match *event {
            SearchEvent::Progress { cur, colors } => {
                debug!("{} {}", cur, format_coloring(colors));
            }
            SearchEvent::Failure { failures, colors } => {
                if self.precolor_labels.is_empty() {
                    warn!("Failure #{} {}", failures, format_coloring(colors));
                } else {
                    warn!(
                        "Failure #{} {} (precolored {})",
                        failures,
                        format_coloring(colors),
                        self.labelled_prefix(colors)
                    );
                }
            }
            SearchEvent::Extension { count, colors } => {
                trace!("extension #{} {}", count, format_coloring(colors));
            }
            SearchEvent::PartitionSkip { counter } => {
                trace!("skipping partition node {}", counter);
            }
            SearchEvent::Aborted { failures } => {
                error!("giving up after {} failures", failures);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_observer_receives_events() {
        let mut seen = Vec::new();
        let mut observer = |e: &SearchEvent<'_>| {
            if let SearchEvent::PartitionSkip { counter } = e {
                seen.push(*counter);
            }
        };
        observer.on_event(&SearchEvent::PartitionSkip { counter: 3 });
        observer.on_event(&SearchEvent::Aborted { failures: 1 });
        assert_eq!(seen, vec![3]);
    }

    #[test]
    fn test_outcome_display() {
        let outcome = SearchOutcome {
            verdict: Verdict::NotExtendable,
            failures: 3,
            extensions: 1,
            partition_nodes: 1,
            aborted: true,
            witness: None,
        };
        assert_eq!(
            outcome.to_string(),
            "gave up after 3 failures (num_precolorings=1, partition_nodes=1)"
        );
    }

    #[test]
    fn test_labelled_prefix() {
        let observer = LogObserver::new(&[4, 6]);
        let colors = [Some(0), Some(1), Some(2)];
        assert_eq!(observer.labelled_prefix(&colors), "4:0 6:1");
    }
}
