use clap::Parser;
use tracing::info;

use affinity_net::analysis::{communities, CommunityAlgorithm, NetworkSummary};
use affinity_net::observation::Chronicle;
use affinity_net::{SimRng, SimulationConfig, Simulator};

#[derive(Parser, Debug)]
#[command(name = "affinity-net")]
#[command(about = "A generational social network simulation driven by attribute affinity")]
struct Args {
    /// Number of people to generate
    #[arg(short, long, default_value = "100")]
    people: usize,

    /// Number of generations to run
    #[arg(short, long, default_value = "50")]
    generations: usize,

    /// Save a snapshot every N generations (0 disables)
    #[arg(long)]
    checkpoint: Option<usize>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Output directory for chronicles and snapshots
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Community detection for the final report: label, between or components
    #[arg(long, default_value = "label")]
    communities: String,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let algorithm: CommunityAlgorithm = args.communities.parse()?;

    // Initialize logging
    let filter = match args.verbose {
        0 => "affinity_net=info",
        1 => "affinity_net=debug",
        _ => "affinity_net=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("affinity-net v{}", env!("CARGO_PKG_VERSION"));

    // Load or create configuration
    let mut config = match args.config {
        Some(path) => SimulationConfig::from_file(&path)?,
        None => SimulationConfig::default_with(args.people, args.generations, args.seed),
    };
    if let Some(interval) = args.checkpoint {
        config.simulation.checkpoint_interval = interval;
    }
    info!(
        "Initializing simulation with {} people for {} generations",
        config.population_size(),
        config.simulation.generations
    );

    let mut simulator = Simulator::from_config(config)?;
    simulator.add_observer(Box::new(Chronicle::new(&args.output)?));
    simulator.run()?;

    let snapshot = simulator.snapshot();
    for line in NetworkSummary::from_snapshot(&snapshot).to_string().lines() {
        info!("{}", line);
    }
    let groups = communities(&snapshot, algorithm, &mut SimRng::new(args.seed));
    info!("{} communities by {}", groups.len(), algorithm);
    info!("Simulation complete. Chronicle written to {}/chronicle.md", args.output);
    Ok(())
}
