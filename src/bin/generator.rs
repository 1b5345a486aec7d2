//! generator reads the JSON schemas produced by proto2schema (Stage 1) and
//! emits per-cloud Rust modules of input parsers for OpenMCF cloud
//! resources, plus a kind dispatch table.
//!
//! Usage:
//!
//!     generator --schemas-dir codegen/schemas --output-dir src/gen/cloudresource

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use openmcf_codegen::generate::{GeneratorConfig, TypeGenerator};

#[derive(Parser)]
#[command(name = "generator")]
#[command(about = "Generate input parsers from OpenMCF provider schemas")]
#[command(version)]
struct Cli {
    /// Path to the schemas directory written by proto2schema
    #[arg(long, default_value = "codegen/schemas")]
    schemas_dir: PathBuf,

    /// Path to the output directory for the generated module tree
    #[arg(long, default_value = "src/gen/cloudresource")]
    output_dir: PathBuf,

    /// Rust module path the generated tree is mounted at
    #[arg(long, default_value = "crate::gen::cloudresource")]
    module: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let generator = TypeGenerator::new(GeneratorConfig {
        schemas_dir: cli.schemas_dir,
        output_dir: cli.output_dir.clone(),
        module: cli.module,
    });

    let summary = generator.run().context("generation failed")?;
    info!(
        "Done: {} parsers across {} clouds in {}",
        summary.providers,
        summary.clouds,
        cli.output_dir.display()
    );

    Ok(())
}

fn init_logging(level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();
}
