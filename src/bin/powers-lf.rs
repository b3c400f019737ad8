use anyhow::Result;
use clap::Parser;
use powers_lf::{load_network, runpf, write_report, LogProgress, PFOpt, ProgressMonitor, VoltageInit};
use spsolve::rlu::RLU;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Newton-Raphson load flow.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Bus data CSV: id, p, q[, vm, va[, type]]
    #[arg(required = true)]
    bus: PathBuf,

    /// Line data CSV: from, to, r, x
    #[arg(required = true)]
    line: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Termination tolerance on per unit P & Q mismatch.
    #[arg(long)]
    tol: Option<f64>,

    /// Maximum number of iterations.
    #[arg(long)]
    max_it: Option<usize>,

    /// Initial voltage.
    #[arg(long, value_enum, default_value_t = VoltageInit::Case)]
    init: VoltageInit,

    /// Log the mismatch of every iteration.
    #[arg(long, default_value_t = false)]
    progress: bool,
}

fn main() {
    env_logger::Builder::from_default_env()
        .format_level(false)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match execute(&cli) {
        Ok(_) => {
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(2);
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let network = load_network(&cli.bus, &cli.line)?;

    let mut opt = PFOpt::default().init(cli.init);
    if let Some(tol) = cli.tol {
        opt.tolerance = tol;
    }
    if let Some(max_it) = cli.max_it {
        opt.max_it = max_it;
    }

    let solver = RLU::default();
    let progress = LogProgress {};
    let progress: Option<&dyn ProgressMonitor> = if cli.progress {
        Some(&progress as &dyn ProgressMonitor)
    } else {
        None
    };

    let soln = runpf(&network, &opt, &solver, progress)?;

    match &cli.output {
        Some(out_path) => {
            let mut w = BufWriter::new(File::create(out_path)?);
            write_report(&mut w, &soln)?;
            w.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            write_report(&mut stdout.lock(), &soln)?;
        }
    }

    if !soln.converged() {
        return Err(anyhow::anyhow!("power flow did not converge"));
    }
    Ok(())
}
