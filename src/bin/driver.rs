use anyhow::{Context, Result};
use clap::Parser;
use star_precolor::{
    parser::parse_graph6, partition::Partition, report::LogObserver, run_search, ExtensionConfig,
};

/// Graph whose precolorings of vertices 0..9 must extend to vertex 9
const DRIVER_GRAPH: &str = "IxKOgGDA_";
const NUM_PRECOLORED_VERTS: usize = 9;
const NUM_COLORS: usize = 6;
const PRECOLOR_VERTS: [usize; 9] = [4, 6, 3, 2, 5, 8, 7, 1, 0];
const EXTEND_VERTS: [usize; 1] = [9];
const PARALLEL_NUM_JOBS: usize = 1;
const PARALLEL_DEPTH: usize = 6;

/// Star precoloring extension check for the built-in instance.
///
/// Pass a job number >= the job count to only count the nodes at the
/// partition depth.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which shard of the search tree to explore
    parallel_job_number: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("driver running with parallel_job_number={}", args.parallel_job_number);

    let graph = parse_graph6(DRIVER_GRAPH).context("decoding the built-in graph")?;
    let config = ExtensionConfig::exploratory(NUM_PRECOLORED_VERTS, NUM_COLORS)
        .with_roles(&PRECOLOR_VERTS, &[], &EXTEND_VERTS)
        .with_partition(Partition::new(
            args.parallel_job_number,
            PARALLEL_NUM_JOBS,
            PARALLEL_DEPTH,
        ));

    let start_time = std::time::Instant::now();
    let mut observer = LogObserver::new(&config.precolor_verts);
    let outcome = run_search(&graph, &config, &mut observer)?;

    println!("Result: {}", outcome);
    println!("Computation time: {:.3}s", start_time.elapsed().as_secs_f64());
    if config.partition.is_count_only() {
        println!("Nodes at depth {}: {}", PARALLEL_DEPTH, outcome.partition_nodes);
    }
    if !outcome.is_extendable() {
        std::process::exit(1);
    }
    Ok(())
}
