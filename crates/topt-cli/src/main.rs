//! topt command-line interface.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{ArgAction, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{check, gadgetise, resynth, version};

/// T-count preserving rewrites for Clifford+T circuits
#[derive(Parser)]
#[command(name = "topt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace internal Hadamards with measurement-based gadgets
    Gadgetise {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,

        /// Output file (defaults to <input>_gadgetised.json)
        #[arg(short, long)]
        output: Option<String>,

        /// Collect CNOT and diagonal runs into phase-polynomial boxes first
        #[arg(long)]
        compose: bool,

        /// Check Clifford+T angles before rewriting
        #[arg(long)]
        verify: bool,

        /// Transform settings (YAML or JSON)
        #[arg(short, long, env = "TOPT_CONFIG")]
        config: Option<String>,
    },

    /// Synthesise the Clifford correction U† P U for a phase-polynomial block
    Resynth {
        /// Phase-polynomial block, or a CNOT + diagonal circuit (JSON)
        #[arg(short, long)]
        input: String,

        /// Wire carrying the X of the correction Pauli
        #[arg(long, conflicts_with = "pauli")]
        x_index: Option<u32>,

        /// Dense Pauli string such as "XIZ", wire 0 first
        #[arg(long)]
        pauli: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Compare the result against the dense unitary of U ; P ; U†
        #[arg(long)]
        verify: bool,

        /// Transform settings (YAML or JSON)
        #[arg(short, long, env = "TOPT_CONFIG")]
        config: Option<String>,
    },

    /// Report gate-set, angle and Hadamard statistics for a circuit
    Check {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Gadgetise {
            input,
            output,
            compose,
            verify,
            config,
        } => gadgetise::execute(&input, output.as_deref(), compose, verify, config.as_deref()),

        Commands::Resynth {
            input,
            x_index,
            pauli,
            output,
            verify,
            config,
        } => resynth::execute(
            &input,
            x_index,
            pauli.as_deref(),
            output.as_deref(),
            verify,
            config.as_deref(),
        ),

        Commands::Check { input } => check::execute(&input),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
