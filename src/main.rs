// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotnet_core_sdk::context::{BUILDPACK_DIR_ENV, STACK_ID_ENV};
use dotnet_core_sdk::{BuildContext, BuildpackPlan, Environment, RollForwardPolicy};
use std::fs;
use std::path::PathBuf;
use strum::IntoEnumIterator;
use tracing::info;

#[derive(Parser)]
#[command(name = "dotnet-core-sdk")]
#[command(author, version, about = "Resolve the .NET Core SDK version for a buildpack build", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the build plan for an application
    Detect {
        /// Application directory
        #[arg(short, long, default_value = ".")]
        working_dir: PathBuf,
        /// Write the plan here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Resolve and select the SDK for an application
    Build {
        /// Application directory
        #[arg(short, long, default_value = ".")]
        working_dir: PathBuf,
        /// Buildpack directory containing buildpack.toml
        #[arg(short, long, env = BUILDPACK_DIR_ENV)]
        buildpack_dir: PathBuf,
        /// Stack the SDK must support
        #[arg(short, long, env = STACK_ID_ENV)]
        stack: String,
        /// Buildpack plan TOML with the requirements from detection
        #[arg(short, long)]
        plan: Option<PathBuf>,
        /// Checksum recorded on the cached SDK layer
        #[arg(long)]
        cached_checksum: Option<String>,
    },
    /// List the roll-forward policies accepted in global.json
    Policies,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            working_dir,
            output,
        } => {
            let plan = dotnet_core_sdk::detect(&working_dir, &Environment::capture())?;
            let rendered = plan.to_toml().context("failed to render build plan")?;
            match output {
                Some(path) => {
                    fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("Wrote build plan to {}", path.display());
                }
                None => print!("{}", rendered),
            }
        }
        Commands::Build {
            working_dir,
            buildpack_dir,
            stack,
            plan,
            cached_checksum,
        } => {
            let requirements = match plan {
                Some(path) => BuildpackPlan::load(&path)
                    .with_context(|| format!("failed to read plan {}", path.display()))?
                    .requirements(),
                None => Vec::new(),
            };

            let ctx = BuildContext::new(working_dir, buildpack_dir, stack, Environment::capture());
            let result = dotnet_core_sdk::build(&ctx, requirements, cached_checksum.as_deref())?;

            info!("Layer decision: {}", result.decision);
            println!("{}", serde_json::to_string_pretty(&result.bom)?);
        }
        Commands::Policies => {
            for policy in RollForwardPolicy::iter() {
                println!("{}", policy);
            }
        }
    }

    Ok(())
}
