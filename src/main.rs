use anyhow::Context;
use clap::{ArgGroup, Parser};
use kbnpath::{
    get_groups_of_k_best_nodes, random_nodes, read_nodes, CategoricalRatioConfig,
    CategoricalRatioConstraint, ConstraintSet, GraphConfig, GroupSearchConfig, InitStrategy,
    SpatialGraph, WindowConfig, WindowShape,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Select groups of high-value, contiguous nodes from a spatial graph
#[derive(Parser, Debug)]
#[command(name = "kbnpath")]
#[command(about = "Spatial k-best-node chain selection", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["nodes", "random"])))]
struct Args {
    /// JSON file holding an array of node records
    #[arg(short, long)]
    nodes: Option<PathBuf>,

    /// Generate this many random nodes in the unit square instead
    #[arg(long, value_name = "N")]
    random: Option<usize>,

    /// Seed for --random
    #[arg(long)]
    seed: Option<u64>,

    /// Give random nodes `cat` and `num` properties
    #[arg(long)]
    with_properties: bool,

    /// Edge cost function (euclidean, manhattan, haversine)
    #[arg(long, default_value = "euclidean")]
    distance: String,

    /// Link two nodes only when their cost is below this value
    #[arg(long)]
    max_cost: Option<f64>,

    /// Fixed amount added to every edge cost
    #[arg(long, default_value_t = 0.0)]
    edge_cost_offset: f64,

    /// Total number of nodes to select
    #[arg(short = 'k', long, default_value_t = 10)]
    total_k: usize,

    /// Number of groups to split the selection into
    #[arg(short, long, default_value_t = 5)]
    groups: usize,

    /// Maximum number of region attempts (default: 3 x groups)
    #[arg(long)]
    max_iter: Option<usize>,

    /// Start each chain at the node closest to this x coordinate
    #[arg(long, requires = "start_y", allow_hyphen_values = true)]
    start_x: Option<f64>,

    /// Start each chain at the node closest to this y coordinate
    #[arg(long, requires = "start_x", allow_hyphen_values = true)]
    start_y: Option<f64>,

    /// Convolution window size (derived from node density when omitted)
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    window: Option<Vec<f64>>,

    /// Share of a window kept in the next one
    #[arg(long, default_value_t = 0.75)]
    overlap: f64,

    /// Node property tracked by the category ratio constraint
    #[arg(long, requires = "ratio")]
    constraint_property: Option<String>,

    /// Target share of a category, as CATEGORY=RATIO (repeatable)
    #[arg(long, value_parser = parse_ratio, requires = "constraint_property")]
    ratio: Vec<(String, f64)>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_ratio(value: &str) -> Result<(String, f64), String> {
    let (category, ratio) = value
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=RATIO, got '{}'", value))?;
    let ratio: f64 = ratio
        .trim()
        .parse()
        .map_err(|e| format!("invalid ratio '{}': {}", ratio, e))?;
    Ok((category.trim().to_string(), ratio))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting kbnpath v{}", env!("CARGO_PKG_VERSION"));

    let nodes = match (&args.nodes, args.random) {
        (Some(path), _) => read_nodes(path)
            .with_context(|| format!("failed to load nodes from {}", path.display()))?,
        (None, Some(n)) => random_nodes(n, args.with_properties, args.seed),
        (None, None) => anyhow::bail!("either --nodes or --random is required"),
    };
    info!("Loaded {} nodes", nodes.len());

    let graph_config = GraphConfig {
        distance: args.distance.clone(),
        max_cost: args.max_cost,
        edge_cost_offset: args.edge_cost_offset,
    };
    let mut graph = SpatialGraph::build(nodes, &graph_config)?;
    info!(
        "Graph built: {} nodes, {} edges, max cost {}",
        graph.node_count(),
        graph.edge_count(),
        graph.max_cost()
    );

    let mut constraints = ConstraintSet::new();
    if let Some(property) = &args.constraint_property {
        let objectives: BTreeMap<String, f64> = args.ratio.iter().cloned().collect();
        let constraint = CategoricalRatioConstraint::new(
            CategoricalRatioConfig {
                property: property.clone(),
                objectives,
                k: args.total_k,
            },
            &graph,
        )?;
        info!("Category means for '{}': {:?}", property, constraint.category_means());
        constraints.push(Box::new(constraint));
    }

    let init = match (args.start_x, args.start_y) {
        (Some(x), Some(y)) => InitStrategy::ClosestTo { x, y },
        _ => InitStrategy::MaxScore,
    };
    let window = WindowConfig {
        shape: match args.window.as_deref() {
            Some(&[width, height]) => Some(WindowShape::new(width, height)),
            _ => None,
        },
        overlap: args.overlap,
        ..Default::default()
    };
    let config = GroupSearchConfig {
        total_k: args.total_k,
        n_groups: args.groups,
        max_iter: args.max_iter,
        init,
        window,
    };

    let groups = get_groups_of_k_best_nodes(&mut graph, &config, &mut constraints)?;
    info!("Selected {} of {} groups", groups.len(), config.n_groups);

    let output = serde_json::json!({
        "requested_groups": config.n_groups,
        "found_groups": groups.len(),
        "groups": groups,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
