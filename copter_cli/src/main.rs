use std::{error::Error, fs, path::PathBuf};

use clap::{Parser, Subcommand};
use log::info;

mod scenario;
use scenario::Scenario;

#[derive(Debug, Parser)]
#[command(version, about = "Quadrotor rigid body simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a scenario and write telemetry as CSV
    Run {
        #[arg(short, long)]
        scenario: PathBuf,
        #[arg(short, long, default_value = "telemetry.csv")]
        output: PathBuf,
    },
    /// Write a demo scenario to start from
    Init {
        #[arg(short, long, default_value = "scenario.ron")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { scenario, output } => {
            let loaded = Scenario::from_file(&scenario)?;
            info!("loaded scenario {}", scenario.display());
            let mut writer = csv::Writer::from_path(&output)?;
            let rows = loaded.run(&mut writer)?;
            info!("wrote {rows} rows to {}", output.display());
        }
        Commands::Init { output } => {
            fs::write(&output, Scenario::demo().to_ron_string()?)?;
            info!("wrote demo scenario to {}", output.display());
        }
    }
    Ok(())
}
