//! Slabfield command-line interface.
//!
//! Apply a sawtooth field to a slab described in a TOML job file:
//! ```sh
//! slabfield-cli run job.toml
//! slabfield-cli validate job.toml
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use slabfield_core::{FieldState, SpinChannels};
use slabfield_geometry::GridPartition;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slabfield-cli")]
#[command(about = "Slabfield: sawtooth electric field and slab dipole correction")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one field step from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running the field step.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Slabfield");
            println!("=========");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_field(&job)?;
            println!();
            println!("{}", result.report);
            println!();
            println!("Forces (Ry/Bohr):");
            for (iat, row) in result.forces.rows().into_iter().enumerate() {
                println!("  {:>4}  {:>16.8e} {:>16.8e} {:>16.8e}", iat + 1, row[0], row[1], row[2]);
            }

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_profile {
                runner::write_profile_csv(&result, &out_dir.join("profile.csv"), &job)?;
            }
            if job.output.save_json {
                runner::write_field_json(&result, &out_dir.join("field.json"))?;
            }

            println!("Field step complete.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            FieldState::configure(&job.efield)?;
            SpinChannels::try_from(job.spin.nspin)?;
            GridPartition::split(job.grid.dims, job.grid.partitions)?;
            let cell = job.cell.build()?;
            println!("Configuration is valid: {}", config.display());
            println!("  {} atoms, omega = {:.4} Bohr^3", cell.n_atoms(), cell.omega());
            Ok(())
        }
    }
}
