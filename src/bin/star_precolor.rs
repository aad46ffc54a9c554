use anyhow::{bail, Context, Result};
use clap::Parser;
use star_precolor::{
    config::CompletionPolicy,
    parser::parse_instance_file,
    partition::{run_all_jobs, Partition},
    report::LogObserver,
    run_search, Verdict,
};
use std::path::PathBuf;

/// Star precoloring extension for an instance file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Instance file (n=, num_colors=, num_precolored_verts=, G=, ...)
    file_input: PathBuf,

    /// Shard of the search tree to explore
    parallel_job_number: usize,

    /// Number of shards the tree is dealt into
    parallel_num_jobs: usize,

    /// Vertex index at which nodes are dealt out
    parallel_depth: usize,

    /// Run every shard in this process and combine the results
    #[arg(long)]
    all_jobs: bool,

    /// Stop after this many precolorings fail to extend
    #[arg(long)]
    failure_budget: Option<usize>,

    /// Stop at the first complete coloring
    #[arg(long)]
    stop_at_first: bool,
}

/// Final line of the report; `whole_tree` is false for a single shard of a split run
fn verdict_message(
    completion: CompletionPolicy,
    verdict: Verdict,
    whole_tree: bool,
) -> &'static str {
    match (completion, verdict) {
        (CompletionPolicy::EnumerateAll, Verdict::Extendable) => "Every precoloring extends.",
        (CompletionPolicy::EnumerateAll, Verdict::NotExtendable) => {
            "Failure: some precoloring does not extend."
        }
        (CompletionPolicy::StopAtFirst, Verdict::Extendable) => "Found a coloring.",
        (CompletionPolicy::StopAtFirst, Verdict::NotExtendable) if whole_tree => {
            "No coloring exists."
        }
        (CompletionPolicy::StopAtFirst, Verdict::NotExtendable) => "No coloring in this shard.",
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!(
        "Reading file {}, job={}, num_jobs={}, depth={}",
        args.file_input.display(),
        args.parallel_job_number,
        args.parallel_num_jobs,
        args.parallel_depth
    );

    let instance = parse_instance_file(&args.file_input)
        .with_context(|| format!("reading instance {}", args.file_input.display()))?;
    println!(
        "n={} num_colors={} num_precolored_verts={} edges={}",
        instance.graph.num_vertices(),
        instance.num_colors,
        instance.num_precolored_verts,
        instance.graph.num_edges()
    );
    if let Some(depth) = instance.parallel_depth {
        if depth != args.parallel_depth {
            println!("note: instance suggests parallel_depth={}", depth);
        }
    }

    let mut config = instance.to_config(Partition::new(
        args.parallel_job_number,
        args.parallel_num_jobs,
        args.parallel_depth,
    ));
    if let Some(budget) = args.failure_budget {
        config = config.with_failure_budget(budget);
    }
    if args.stop_at_first {
        config = config.with_completion(CompletionPolicy::StopAtFirst);
    }

    let start_time = std::time::Instant::now();
    let verdict = if args.all_jobs {
        if args.parallel_num_jobs == 0 {
            bail!("--all-jobs needs parallel_num_jobs >= 1");
        }
        let summary = run_all_jobs(&instance.graph, &config, args.parallel_num_jobs)?;
        for (job, outcome) in summary.jobs.iter().enumerate() {
            println!("  job {}: {}", job, outcome);
        }
        println!(
            "Combined: failures={} num_precolorings={} partition_nodes={}",
            summary.failures(),
            summary.extensions(),
            summary.partition_nodes()
        );
        summary.verdict()
    } else {
        let mut observer = LogObserver::new(&config.precolor_verts);
        let outcome = run_search(&instance.graph, &config, &mut observer)?;
        println!("Result: {}", outcome);
        if config.partition.is_count_only() {
            println!("Nodes at depth {}: {}", args.parallel_depth, outcome.partition_nodes);
            return Ok(());
        }
        outcome.verdict
    };
    println!("Computation time: {:.3}s", start_time.elapsed().as_secs_f64());

    let whole_tree = args.all_jobs || args.parallel_num_jobs == 1;
    println!("{}", verdict_message(config.completion, verdict, whole_tree));
    if verdict == Verdict::NotExtendable {
        std::process::exit(1);
    }
    Ok(())
}
