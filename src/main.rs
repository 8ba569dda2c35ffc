use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mixsyn_flow::{MixedSynthesis, RunConfigBuilder, Session};
use mixsyn_ml::{extract_features, Label};
use mixsyn_net::{Design, PartitionId, Region, SubNetwork};
use std::path::PathBuf;
use tracing::info;

/// mixsyn - Mixed AIG/MIG synthesis over partitioned networks
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a partitioned design
    Optimize(OptimizeArgs),

    /// Print network and partition statistics
    Stats {
        /// Design file (JSON)
        design: PathBuf,
    },
}

#[derive(Args)]
struct OptimizeArgs {
    /// Design file (JSON) holding the network and its partitioning
    design: PathBuf,

    /// Write the resulting network (.v or .blif)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save the resulting network as a design file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Run configuration (TOML); flags below take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Heuristic strategy: 0 area-delay, 1 area, 2 delay, 3 delay threshold
    #[arg(short, long)]
    strategy: Option<u32>,

    /// Delay ceiling in logic levels for strategy 3
    #[arg(short, long)]
    threshold: Option<u32>,

    /// Classification model (JSON)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Optimize every partition with the AIG engine
    #[arg(short = 'a', long)]
    aig: bool,

    /// Optimize every partition with the MIG engine
    #[arg(short = 'g', long)]
    mig: bool,

    /// Merge adjacent partitions with the same label
    #[arg(short, long)]
    combine: bool,

    /// Omit outputs driven directly by inputs when writing
    #[arg(long)]
    skip_feedthrough: bool,

    /// Partitions forced to AIG optimization
    #[arg(long, value_delimiter = ',')]
    aig_partitions: Vec<u32>,

    /// Partitions forced to MIG optimization
    #[arg(long, value_delimiter = ',')]
    mig_partitions: Vec<u32>,

    /// Partitions forced to MIG depth optimization
    #[arg(long, value_delimiter = ',')]
    depth_partitions: Vec<u32>,

    /// Partitions forced to AIG area optimization
    #[arg(long, value_delimiter = ',')]
    area_partitions: Vec<u32>,

    /// Partitions left untouched
    #[arg(long, value_delimiter = ',')]
    skip_partitions: Vec<u32>,
}

impl OptimizeArgs {
    /// Layer command-line options over the configuration file, if any
    fn config_builder(&self) -> Result<RunConfigBuilder> {
        let mut builder = match &self.config {
            Some(path) => RunConfigBuilder::load(path)
                .with_context(|| format!("Failed to load configuration {:?}", path))?,
            None => RunConfigBuilder::new(),
        };

        if let Some(strategy) = self.strategy {
            builder = builder.strategy(strategy);
        }
        if let Some(threshold) = self.threshold {
            builder = builder.threshold(threshold);
        }
        if let Some(model) = &self.model {
            builder = builder.model_path(model.clone());
        }
        if self.aig {
            builder = builder.global_aig(true);
        }
        if self.mig {
            builder = builder.global_mig(true);
        }
        if self.combine {
            builder = builder.combine(true);
        }
        if self.skip_feedthrough {
            builder = builder.skip_feedthrough(true);
        }

        let forced = [
            (Label::Aig, &self.aig_partitions),
            (Label::Mig, &self.mig_partitions),
            (Label::Depth, &self.depth_partitions),
            (Label::Area, &self.area_partitions),
            (Label::Skip, &self.skip_partitions),
        ];
        for (label, ids) in forced {
            builder = builder.force(label, ids.iter().copied().map(PartitionId));
        }
        Ok(builder)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Optimize(args) => optimize(&args)?,
        Commands::Stats { design } => show_stats(&design)?,
    }

    Ok(())
}

fn optimize(args: &OptimizeArgs) -> Result<()> {
    let config = args.config_builder()?.build()?;

    info!("Loading design from {:?}", args.design);
    let session = Session::load(&args.design)
        .with_context(|| format!("Failed to load design {:?}", args.design))?;

    let report = MixedSynthesis::new().run(&session, &config)?;
    println!("{}", report.outcome);

    if let Some(path) = &args.save {
        if report.changed() {
            Design::new(report.network.clone())
                .save(path)
                .with_context(|| format!("Failed to save design {:?}", path))?;
            println!("✅ Design saved to {}", path.display());
        }
    }

    if let Some(output) = &args.output {
        if report.write(output, &config)?.is_some() {
            println!("Resulting network written to {}", output.display());
        }
    }

    Ok(())
}

fn show_stats(path: &PathBuf) -> Result<()> {
    let session =
        Session::load(path).with_context(|| format!("Failed to load design {:?}", path))?;
    let network = session.network()?;
    println!("{}", network.compute_stats());

    let Ok((network, partitions)) = session.partitioned() else {
        println!("Network not partitioned yet");
        return Ok(());
    };
    let view = partitions.view(network)?;
    println!("Partitions: {}", view.len());
    for id in view.partition_ids() {
        let info = view.info(id)?;
        let sub = SubNetwork::extract(network, &view, &Region::single(id))?;
        let features = extract_features(&sub.network);
        let adjacent: Vec<String> = info.adjacent.iter().map(|p| p.to_string()).collect();
        println!(
            "  {}: {} gates, {} inputs, {} outputs, depth {}, adjacent [{}]",
            id,
            features.gate_count,
            info.inputs.len(),
            info.outputs.len(),
            features.depth,
            adjacent.join(", ")
        );
    }
    Ok(())
}
