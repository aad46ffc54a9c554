use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use star_precolor::{parser::format_instance, Graph, Instance};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Input Generator for star precoloring extension instances.
///
/// Writes an instance file in the format read by `star-precolor`:
///
/// n=<vertices>
/// num_colors=<colors>
/// num_precolored_verts=<prefix length>
/// G=<graph6>
/// precolor_verts=..., recolor_verts=..., extend_verts=...
///
/// The graph is random with a bounded maximum degree, which keeps the
/// star chromatic number small and the search non-trivial. The last
/// `n - num_precolored` vertices become the extension vertices.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate random instances for star precoloring extension"
)]
struct Args {
    /// Number of vertices
    #[arg(long)]
    n: usize,

    /// Probability of proposing each vertex pair as an edge
    #[arg(long, default_value_t = 0.35)]
    density: f64,

    /// Maximum degree; proposed edges that would exceed it are dropped
    #[arg(long, default_value_t = 3)]
    max_degree: usize,

    /// Number of colors available to the search
    #[arg(long, default_value_t = 5)]
    num_colors: usize,

    /// Length of the precolored prefix
    #[arg(long)]
    num_precolored: usize,

    /// Suggested partition depth to record in the instance
    #[arg(long)]
    parallel_depth: Option<usize>,

    /// Random seed (if omitted, one is drawn and printed)
    #[arg(long)]
    seed: Option<u64>,

    /// Output file path to write the instance (mandatory)
    #[arg(long)]
    output: PathBuf,
}

/// Random graph with maximum degree `max_degree`; pairs are proposed in random order
fn generate_graph<R: Rng>(n: usize, density: f64, max_degree: usize, rng: &mut R) -> Graph {
    let mut pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|u| ((u + 1)..n).map(move |v| (u, v)))
        .collect();
    pairs.shuffle(rng);

    let mut g = Graph::new(n);
    let mut degree = vec![0usize; n];
    for (u, v) in pairs {
        if rng.gen::<f64>() >= density {
            continue;
        }
        if degree[u] < max_degree && degree[v] < max_degree {
            g.add_edge(u, v);
            degree[u] += 1;
            degree[v] += 1;
        }
    }
    g
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.n == 0 {
        bail!("n must be positive");
    }
    if args.num_precolored > args.n {
        bail!("num_precolored must be at most n");
    }
    if !(0.0..=1.0).contains(&args.density) {
        bail!("density must be in [0,1]");
    }

    // Draw a seed from system entropy when none is given, so the run can be repeated
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);

    let graph = generate_graph(args.n, args.density, args.max_degree, &mut rng);
    let instance = Instance {
        num_colors: args.num_colors,
        num_precolored_verts: args.num_precolored,
        precolor_verts: (0..args.num_precolored).collect(),
        recolor_verts: Vec::new(),
        extend_verts: (args.num_precolored..args.n).collect(),
        parallel_depth: args.parallel_depth,
        graph,
    };

    println!("Generated instance:");
    println!("  n = {}", args.n);
    println!("  edges = {}", instance.graph.num_edges());
    println!("  max_degree = {}", args.max_degree);
    println!("  num_colors = {}", args.num_colors);
    println!("  num_precolored = {}", args.num_precolored);
    println!("  seed = {}", seed);
    println!("  output file: {:?}", args.output);

    let mut writer =
        File::create(&args.output).with_context(|| format!("creating {:?}", args.output))?;
    writer.write_all(format_instance(&instance)?.as_bytes())?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_graph_respects_degree_bound() {
        let mut rng = StdRng::seed_from_u64(7);
        let g = generate_graph(12, 0.8, 3, &mut rng);
        assert!(g.vertices().all(|v| g.degree(v) <= 3));
        assert!(g.num_edges() > 0);
    }

    #[test]
    fn test_same_seed_same_graph() {
        let a = generate_graph(10, 0.5, 4, &mut StdRng::seed_from_u64(42));
        let b = generate_graph(10, 0.5, 4, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
