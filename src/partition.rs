//! Static sharding of the search tree.
//!
//! Every time the search arrives at the partition depth it draws the next
//! counter value; job `j` of `m` only explores the nodes whose counter is
//! congruent to `j` modulo `m`. Jobs share nothing, so they can run as
//! separate processes and be combined afterwards with [`ShardSummary`].

use crate::{
    config::{CompletionPolicy, ExtensionConfig},
    error::StarError,
    report::{LogObserver, SearchOutcome, Verdict},
    search::run_search,
    Graph,
};
use log::info;
use rayon::prelude::*;

/// Which slice of the search tree a run explores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub job_number: usize,
    pub num_jobs: usize,
    /// Vertex index at which nodes are dealt out to jobs
    pub depth: usize,
}

impl Default for Partition {
    fn default() -> Self {
        Partition {
            job_number: 0,
            num_jobs: 1,
            depth: 0,
        }
    }
}

impl Partition {
    pub fn new(job_number: usize, num_jobs: usize, depth: usize) -> Self {
        Partition {
            job_number,
            num_jobs,
            depth,
        }
    }

    /// A run that skips every node and only reports how many exist at `depth`
    pub fn count_only(depth: usize) -> Self {
        Partition::new(1, 1, depth)
    }

    pub fn is_count_only(&self) -> bool {
        self.job_number >= self.num_jobs
    }

    /// Whether the node that drew `counter` belongs to this job
    #[inline]
    pub fn admits(&self, counter: usize) -> bool {
        counter % self.num_jobs == self.job_number
    }

    pub fn validate(&self) -> Result<(), StarError> {
        if self.num_jobs == 0 {
            return Err(StarError::Config("parallel_num_jobs must be at least 1".into()));
        }
        Ok(())
    }
}

/// Combined result of every job of a partitioned run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSummary {
    /// Policy every job ran under
    pub completion: CompletionPolicy,
    /// One outcome per job number, in job order
    pub jobs: Vec<SearchOutcome>,
}

impl ShardSummary {
    /// Combined answer of all jobs.
    ///
    /// Under `EnumerateAll` a single job with a non-extendable prefix decides
    /// the run. Under `StopAtFirst` a single job with a coloring does.
    pub fn verdict(&self) -> Verdict {
        let extendable = match self.completion {
            CompletionPolicy::EnumerateAll => self.jobs.iter().all(SearchOutcome::is_extendable),
            CompletionPolicy::StopAtFirst => self.jobs.iter().any(SearchOutcome::is_extendable),
        };
        if extendable {
            Verdict::Extendable
        } else {
            Verdict::NotExtendable
        }
    }

    pub fn failures(&self) -> usize {
        self.jobs.iter().map(|o| o.failures).sum()
    }

    pub fn extensions(&self) -> usize {
        self.jobs.iter().map(|o| o.extensions).sum()
    }

    /// Nodes at the partition depth; every job sees all of them
    pub fn partition_nodes(&self) -> usize {
        self.jobs.iter().map(|o| o.partition_nodes).max().unwrap_or(0)
    }
}

/// Run all `num_jobs` shards of `config` in this process and combine them.
///
/// `config.partition.job_number` is ignored; each shard gets its own.
pub fn run_all_jobs(
    graph: &Graph,
    config: &ExtensionConfig,
    num_jobs: usize,
) -> Result<ShardSummary, StarError> {
    let depth = config.partition.depth;
    info!("running {} jobs at depth {}", num_jobs, depth);

    let jobs = (0..num_jobs)
        .into_par_iter()
        .map(|job_number| {
            let shard = config
                .clone()
                .with_partition(Partition::new(job_number, num_jobs, depth));
            let mut observer = LogObserver::new(&shard.precolor_verts);
            run_search(graph, &shard, &mut observer)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ShardSummary {
        completion: config.completion,
        jobs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_round_robin() {
        let p = Partition::new(1, 3, 2);
        let admitted: Vec<usize> = (1..=9).filter(|&c| p.admits(c)).collect();
        assert_eq!(admitted, vec![1, 4, 7]);
    }

    #[test]
    fn test_count_only_admits_nothing() {
        let p = Partition::count_only(4);
        assert!(p.is_count_only());
        assert!((0..100).all(|c| !p.admits(c)));
        assert!(!Partition::default().is_count_only());
    }

    fn outcome(verdict: Verdict, extensions: usize, failures: usize) -> SearchOutcome {
        SearchOutcome {
            verdict,
            failures,
            extensions,
            partition_nodes: 3,
            aborted: false,
            witness: None,
        }
    }

    #[test]
    fn test_summary_verdict_follows_completion_policy() {
        let jobs = vec![
            outcome(Verdict::NotExtendable, 0, 0),
            outcome(Verdict::Extendable, 1, 0),
            outcome(Verdict::NotExtendable, 0, 4),
        ];
        let first = ShardSummary {
            completion: CompletionPolicy::StopAtFirst,
            jobs: jobs.clone(),
        };
        assert_eq!(first.verdict(), Verdict::Extendable);
        let all = ShardSummary {
            completion: CompletionPolicy::EnumerateAll,
            jobs,
        };
        assert_eq!(all.verdict(), Verdict::NotExtendable);
        assert_eq!(all.failures(), 4);
        assert_eq!(all.partition_nodes(), 3);
    }

    #[test]
    fn test_zero_jobs_is_rejected() {
        assert!(Partition::new(0, 0, 3).validate().is_err());
        assert!(Partition::new(0, 1, 3).validate().is_ok());
    }
}
