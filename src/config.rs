use crate::{error::StarError, partition::Partition, Graph};
use log::warn;

/// Failures tolerated by the exploratory search before it gives up
pub const DEFAULT_FAILURE_BUDGET: usize = 100;

/// Vertices up to this index report progress by default
pub const DEFAULT_PROGRESS_DEPTH: usize = 6;

/// What to do once a complete coloring is found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    /// Return as soon as any complete coloring exists
    StopAtFirst,
    /// Move on to the next precoloring of the prefix and keep going
    #[default]
    EnumerateAll,
}

/// Parameters of one precoloring-extension search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionConfig {
    /// Vertices `0..num_precolored_verts` form the precolored prefix
    pub num_precolored_verts: usize,
    pub num_colors: usize,
    /// Labels of the precolored positions (empty, or one per prefix vertex)
    pub precolor_verts: Vec<usize>,
    /// Vertices whose 4-sets must not be mixed with `extend_verts`
    pub recolor_verts: Vec<usize>,
    pub extend_verts: Vec<usize>,
    pub partition: Partition,
    pub completion: CompletionPolicy,
    /// Stop after this many non-extendable prefixes
    pub failure_budget: usize,
    /// Emit progress for vertices with index <= this
    pub progress_depth: Option<usize>,
}

impl ExtensionConfig {
    /// Stops at the first prefix that does not extend.
    pub fn simple(num_precolored_verts: usize, num_colors: usize) -> Self {
        ExtensionConfig {
            num_precolored_verts,
            num_colors,
            precolor_verts: Vec::new(),
            recolor_verts: Vec::new(),
            extend_verts: Vec::new(),
            partition: Partition::default(),
            completion: CompletionPolicy::EnumerateAll,
            failure_budget: 1,
            progress_depth: Some(DEFAULT_PROGRESS_DEPTH),
        }
    }

    /// Collects up to [`DEFAULT_FAILURE_BUDGET`] non-extendable prefixes.
    pub fn exploratory(num_precolored_verts: usize, num_colors: usize) -> Self {
        ExtensionConfig {
            failure_budget: DEFAULT_FAILURE_BUDGET,
            ..Self::simple(num_precolored_verts, num_colors)
        }
    }

    pub fn with_roles(
        mut self,
        precolor_verts: &[usize],
        recolor_verts: &[usize],
        extend_verts: &[usize],
    ) -> Self {
        self.precolor_verts = precolor_verts.to_vec();
        self.recolor_verts = recolor_verts.to_vec();
        self.extend_verts = extend_verts.to_vec();
        self
    }

    pub fn with_partition(mut self, partition: Partition) -> Self {
        self.partition = partition;
        self
    }

    pub fn with_completion(mut self, completion: CompletionPolicy) -> Self {
        self.completion = completion;
        self
    }

    pub fn with_failure_budget(mut self, failure_budget: usize) -> Self {
        self.failure_budget = failure_budget;
        self
    }

    pub fn with_progress_depth(mut self, progress_depth: Option<usize>) -> Self {
        self.progress_depth = progress_depth;
        self
    }

    /// Check the configuration against the graph it will search.
    pub fn validate(&self, graph: &Graph) -> Result<(), StarError> {
        let n = graph.num_vertices();
        if self.num_precolored_verts > n {
            return Err(StarError::Config(format!(
                "num_precolored_verts = {} exceeds the {} vertices of the graph",
                self.num_precolored_verts, n
            )));
        }
        if self.failure_budget == 0 {
            return Err(StarError::Config("failure_budget must be at least 1".into()));
        }
        self.partition.validate()?;
        if self.partition.num_jobs > 1 && self.partition.depth >= n {
            return Err(StarError::Config(format!(
                "parallel_depth = {} has no nodes in a graph with {} vertices",
                self.partition.depth, n
            )));
        }

        for (name, set) in [
            ("precolor_verts", &self.precolor_verts),
            ("recolor_verts", &self.recolor_verts),
            ("extend_verts", &self.extend_verts),
        ] {
            if let Some(v) = set.iter().find(|&&v| v >= n) {
                return Err(StarError::Config(format!("{} contains vertex {} >= {}", name, v, n)));
            }
        }
        if !self.precolor_verts.is_empty()
            && self.precolor_verts.len() != self.num_precolored_verts
        {
            return Err(StarError::Config(format!(
                "precolor_verts has {} labels for {} precolored vertices",
                self.precolor_verts.len(),
                self.num_precolored_verts
            )));
        }
        if let Some(v) = self.recolor_verts.iter().find(|&v| self.extend_verts.contains(v)) {
            return Err(StarError::Config(format!(
                "vertex {} is in both recolor_verts and extend_verts",
                v
            )));
        }

        if self.partition.num_jobs > 1 && self.partition.depth > self.num_precolored_verts {
            warn!(
                "parallel_depth {} lies past the precolored prefix ({} vertices); \
                 shard verdicts may not combine into the single-job answer",
                self.partition.depth, self.num_precolored_verts
            );
        }
        Ok(())
    }
}

/// A search problem as stored in an instance file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub graph: Graph,
    pub num_colors: usize,
    pub num_precolored_verts: usize,
    pub precolor_verts: Vec<usize>,
    pub recolor_verts: Vec<usize>,
    pub extend_verts: Vec<usize>,
    pub parallel_depth: Option<usize>,
}

impl Instance {
    /// Exploratory configuration for this instance, run as one shard of `partition`.
    pub fn to_config(&self, partition: Partition) -> ExtensionConfig {
        ExtensionConfig::exploratory(self.num_precolored_verts, self.num_colors)
            .with_roles(&self.precolor_verts, &self.recolor_verts, &self.extend_verts)
            .with_partition(partition)
    }
}
