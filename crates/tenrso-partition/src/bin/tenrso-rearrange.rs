//! Redistribute a tensor across MPI ranks by the index of one mode.
//!
//! Every rank reads the tensor, keeps an even block of it and sends each
//! non-zero to rank `index % P` of the chosen mode.
//!
//! ```text
//! mpirun -n 4 tenrso-rearrange nell-2.tns --mode 1
//! ```

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tenrso_partition::tracing_support::{init_tracing, TracingConfig};
use tenrso_partition::{block_distribute, global_nnz, redistribute, Communicator, MpiComm};
use tenrso_sparse::io::read_tns_file;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tenrso-rearrange")]
#[command(about = "Move non-zeros to ranks by mode index", long_about = None)]
struct Args {
    /// Coordinate tensor file (.tns)
    #[arg(value_name = "TENSOR")]
    tensor: PathBuf,

    /// Mode whose index picks the target rank
    #[arg(short, long, default_value_t = 0)]
    mode: usize,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args, comm: &MpiComm) -> Result<()> {
    let tensor = read_tns_file::<f64, _>(&args.tensor, None)
        .with_context(|| format!("reading tensor {}", args.tensor.display()))?;
    if args.mode >= tensor.nmodes() {
        bail!("mode {} out of range for a {}-mode tensor", args.mode, tensor.nmodes());
    }

    let local = block_distribute(&tensor, comm);
    let target: Vec<usize> = local
        .ind(args.mode)
        .iter()
        .map(|&i| i % comm.size())
        .collect();
    let local = redistribute(local, &target, comm)?;

    let total = global_nnz(&local, comm)?;
    if total != tensor.nnz() as u64 {
        bail!("{} non-zeros after redistribution, expected {}", total, tensor.nnz());
    }
    info!(
        rank = comm.rank(),
        nnz = local.nnz(),
        stats = ?comm.stats(),
        "fragment received"
    );
    println!("rank {}: {} non-zeros", comm.rank(), local.nnz());
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(err) = init_tracing(TracingConfig::default().with_verbosity(args.verbose)) {
        eprintln!("tenrso-rearrange: warning: logging disabled: {:#}", err);
    }

    let Some(universe) = mpi::initialize() else {
        eprintln!("tenrso-rearrange: error: MPI is already initialized");
        process::exit(1);
    };
    let comm = MpiComm::world(&universe);

    if let Err(err) = run(args, &comm) {
        eprintln!("tenrso-rearrange: error: {:#}", err);
        process::exit(1);
    }
}
