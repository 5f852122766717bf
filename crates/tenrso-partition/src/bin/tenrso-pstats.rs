//! Statistics over a sparse tensor and an optional fiber partitioning.
//!
//! ```text
//! tenrso-pstats nell-2.tns
//! tenrso-pstats nell-2.tns --kind hparts --parts nell-2.part --mode 1
//! ```

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tenrso_partition::tracing_support::{init_tracing, TracingConfig};
use tenrso_partition::{run_stats, PartitionUnit, StatsConfig, StatsKind};
use tenrso_sparse::io::read_tns_file;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tenrso-pstats")]
#[command(about = "Tensor and partition quality statistics", long_about = None)]
struct Args {
    /// Coordinate tensor file (.tns)
    #[arg(value_name = "TENSOR")]
    tensor: PathBuf,

    /// Analysis to run: basic or hparts
    #[arg(short, long, default_value = "basic")]
    kind: String,

    /// Primary mode of the fiber structure
    #[arg(short, long, default_value_t = 0)]
    mode: usize,

    /// Partition label file, one label per unit
    #[arg(short, long, value_name = "FILE", env = "TENRSO_PARTITION_FILE")]
    parts: Option<PathBuf>,

    /// Number of partitions (inferred from the labels by default)
    #[arg(short, long)]
    nparts: Option<usize>,

    /// What each label refers to: fiber or nonzero
    #[arg(short, long, default_value = "fiber")]
    unit: PartitionUnit,

    /// Emit the result as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args) -> Result<()> {
    // kind is validated before the tensor is loaded
    let kind: StatsKind = args.kind.parse()?;
    let config = StatsConfig {
        kind,
        mode: args.mode,
        partition_file: args.parts,
        nparts: args.nparts,
        unit: args.unit,
    };

    let tensor = read_tns_file::<f64, _>(&args.tensor, None)
        .with_context(|| format!("reading tensor {}", args.tensor.display()))?;
    info!(
        file = %args.tensor.display(),
        nnz = tensor.nnz(),
        dims = ?tensor.shape(),
        "tensor loaded"
    );

    let name = args.tensor.display().to_string();
    let output = run_stats(&config, &tensor, Some(&name))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", output);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(err) = init_tracing(TracingConfig::default().with_verbosity(args.verbose)) {
        eprintln!("tenrso-pstats: warning: logging disabled: {:#}", err);
    }

    if let Err(err) = run(args) {
        eprintln!("tenrso-pstats: error: {:#}", err);
        process::exit(1);
    }
}
