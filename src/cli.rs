//! CLI Surface
//!
//! Argument parsing and command execution. Commands return the text printed
//! to stdout; errors bubble up as [`AppError`] and the binary maps them to a
//! message and a non-zero exit status.

use crate::catalog::Catalog;
use crate::config::RotorConfig;
use crate::error::{AppError, NotifyError};
use crate::generate::{Generator, Rotation};
use crate::notify::WebhookNotifier;
use crate::output;
use crate::plan::SlotPlan;
use crate::policy::SeparationPolicy;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{info, warn};

/// Rotor CLI - constrained random map rotation generator
#[derive(Parser)]
#[command(name = "rotor")]
#[command(about = "Generates randomized, rule-constrained map rotations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (default: ./rotation.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable logging output
    #[arg(long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a rotation and write it to the output file
    Generate {
        /// Catalog JSON file (overrides the configured path)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output file (overrides the configured path)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Webhook URL (overrides the configured URL)
        #[arg(long)]
        webhook_url: Option<String>,

        /// Seed for reproducible rotations
        #[arg(long)]
        seed: Option<u64>,

        /// Print the rotation without writing the file or notifying
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate the configuration against the catalog without generating
    Check {
        /// Catalog JSON file (overrides the configured path)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

/// Execute a parsed command, returning the text to print on stdout.
pub fn execute(cli: &Cli, config: &RotorConfig) -> Result<String, AppError> {
    match &cli.command {
        Commands::Generate {
            catalog,
            output,
            webhook_url,
            seed,
            dry_run,
        } => generate(
            config,
            catalog.clone(),
            output.clone(),
            webhook_url.clone(),
            *seed,
            *dry_run,
        ),
        Commands::Check { catalog } => check(config, catalog.clone()),
    }
}

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &AppError) -> String {
    e.to_string()
}

fn build_generator(config: &RotorConfig) -> Result<(SlotPlan, Generator), AppError> {
    let plan = SlotPlan::build(
        config.rotation.starting.clone(),
        config.rotation.regular.clone(),
        config.rotation.repeats,
    )?;
    let generator = Generator::new(SeparationPolicy::new(config.rotation.min_distance))
        .with_max_attempts(config.rotation.max_attempts);
    Ok((plan, generator))
}

fn generate(
    config: &RotorConfig,
    catalog_override: Option<PathBuf>,
    output_override: Option<PathBuf>,
    webhook_override: Option<String>,
    seed: Option<u64>,
    dry_run: bool,
) -> Result<String, AppError> {
    let catalog_path = catalog_override.unwrap_or_else(|| config.paths.catalog.clone());
    let output_path = output_override.unwrap_or_else(|| config.paths.output.clone());

    let catalog = Catalog::load(&catalog_path)?;
    info!(layers = catalog.len(), path = %catalog_path.display(), "catalog loaded");

    let (plan, generator) = build_generator(config)?;
    let rotation = match seed {
        Some(seed) => {
            info!(seed, "using seeded randomness");
            let mut rng = StdRng::seed_from_u64(seed);
            generator.generate(&plan, &catalog, &mut rng)?
        }
        None => generator.generate(&plan, &catalog, &mut rand::thread_rng())?,
    };

    if dry_run {
        info!("dry run; skipping output file and notification");
        return Ok(render_rotation(&rotation));
    }

    output::write_rotation(&rotation, &output_path)?;

    let webhook_url = webhook_override.or_else(|| config.notify.webhook_url.clone());
    if let Some(url) = webhook_url {
        let notifier = WebhookNotifier::new(url)?;
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| NotifyError::Client(format!("failed to create runtime: {}", e)))?;
        rt.block_on(notifier.post_rotation(&rotation))?;
    }

    let mut rendered = render_rotation(&rotation);
    let _ = write!(
        rendered,
        "\n\n{} layers written to {}",
        rotation.len(),
        output_path.display()
    );
    Ok(rendered)
}

fn check(config: &RotorConfig, catalog_override: Option<PathBuf>) -> Result<String, AppError> {
    let catalog_path = catalog_override.unwrap_or_else(|| config.paths.catalog.clone());
    let catalog = Catalog::load(&catalog_path)?;

    let (plan, _) = build_generator(config)?;
    plan.check_attributes(&catalog)?;

    let mut out = format!(
        "configuration OK: {} slots ({} starting + {} x {} regular), {} layers in catalog",
        plan.len(),
        plan.starting_len(),
        config.rotation.repeats,
        config.rotation.regular.len(),
        catalog.len(),
    );
    for (position, filter) in plan.slots().iter().enumerate() {
        let candidates = catalog
            .layers()
            .iter()
            .filter(|layer| !layer.bugged && filter.matches(layer))
            .count();
        let _ = write!(
            out,
            "\n slot {:>2} [{}]: {} candidates",
            position,
            filter.description().join(", "),
            candidates
        );
        if candidates == 0 {
            warn!(position, "slot matches no layers; generation cannot succeed");
            let _ = write!(out, "  <- matches no layers");
        }
    }
    Ok(out)
}

/// Render the chosen rotation with slot annotations.
fn render_rotation(rotation: &Rotation) -> String {
    rotation
        .entries()
        .iter()
        .map(|entry| {
            format!(
                "{:>3}. {} ({})",
                entry.slot + 1,
                entry.layer.name,
                entry.description.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
