//! kinefem CLI: scenario runs, benchmarks and config validation.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kinefem")]
#[command(version, about = "kinefem: finite elements and bilateral joints in one implicit step")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario and print a step summary.
    Simulate {
        /// Scenario name (differential, revolute_translational, tet_column, phase_drift).
        #[arg(short, long, default_value = "revolute_translational")]
        scenario: String,

        /// Stepper config (TOML) replacing the scenario default.
        #[arg(short, long)]
        config: Option<String>,

        /// Number of steps; defaults to the scenario's own.
        #[arg(short = 'n', long)]
        steps: Option<u32>,

        /// Collect step events and report the worst constraint drift.
        #[arg(long)]
        telemetry: bool,
    },

    /// Run the benchmark suite.
    Benchmark {
        /// Which scenario to run (a scenario name, or all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Output file path (CSV, or JSON when it ends in .json).
        #[arg(short, long)]
        output: Option<String>,

        /// Solid material preset for mesh scenarios.
        #[arg(short, long)]
        material: Option<String>,
    },

    /// List the scenarios and material presets.
    List,

    /// Validate a stepper config file.
    Validate {
        /// Path to config file (TOML).
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            scenario,
            config,
            steps,
            telemetry,
        } => commands::simulate(&scenario, config.as_deref(), steps, telemetry),
        Commands::Benchmark {
            scenario,
            output,
            material,
        } => commands::benchmark(&scenario, output.as_deref(), material.as_deref()),
        Commands::List => commands::list(),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
