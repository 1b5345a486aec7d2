//! proto2schema converts OpenMCF provider Protocol Buffer descriptors to
//! JSON schemas for code generation and MCP resource template discovery.
//!
//! This is Stage 1 of the two-stage codegen pipeline. Stage 2 (`generator`)
//! consumes these schemas to produce input parsers for the gateway.
//!
//! Usage:
//!
//!     proto2schema --all
//!     proto2schema --provider aws/eks-cluster

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use openmcf_codegen::descriptor::DescriptorIndex;
use openmcf_codegen::extract::SchemaExtractor;
use openmcf_codegen::output;
use openmcf_codegen::DESCRIPTOR_IMAGE_FILE;

#[derive(Parser)]
#[command(name = "proto2schema")]
#[command(about = "Generate JSON schemas from OpenMCF provider protos")]
#[command(version)]
struct Cli {
    /// Generate schemas for all providers
    #[arg(long)]
    all: bool,

    /// Generate schema for a single provider (e.g., aws/eks-cluster)
    #[arg(long)]
    provider: Option<String>,

    /// Path to the openmcf/apis directory
    /// (default: $SCM_ROOT/github.com/plantonhq/openmcf/apis)
    #[arg(long)]
    openmcf_apis_dir: Option<PathBuf>,

    /// Path to the compiled descriptor image
    /// (default: {openmcf-apis-dir}/descriptor.binpb)
    #[arg(long)]
    descriptor_set: Option<PathBuf>,

    /// Output directory for generated schemas
    #[arg(long, default_value = "codegen/schemas")]
    output_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if !cli.all && cli.provider.is_none() {
        eprintln!("Usage:");
        eprintln!("  proto2schema --all [--openmcf-apis-dir <dir>] [--output-dir <dir>]");
        eprintln!("  proto2schema --provider aws/eks-cluster [--openmcf-apis-dir <dir>] [--output-dir <dir>]");
        std::process::exit(1);
    }

    let apis_dir = match cli.openmcf_apis_dir {
        Some(dir) => dir,
        None => default_openmcf_apis_dir()?,
    };
    if !apis_dir.exists() {
        bail!(
            "OpenMCF APIs directory not found: {}\n\
             Ensure the openmcf repo is cloned, or set SCM_ROOT / --openmcf-apis-dir.",
            apis_dir.display()
        );
    }

    let image_path = cli
        .descriptor_set
        .unwrap_or_else(|| apis_dir.join(DESCRIPTOR_IMAGE_FILE));
    if !image_path.exists() {
        bail!(
            "descriptor image not found: {}\n\
             Build it with: buf build --include-imports --include-source-info -o {}",
            image_path.display(),
            DESCRIPTOR_IMAGE_FILE
        );
    }

    let index = DescriptorIndex::load(&image_path)
        .with_context(|| format!("loading descriptor image {}", image_path.display()))?;
    let extractor = SchemaExtractor::new(&index).context("extractor init failed")?;

    if cli.all {
        run_all(&extractor, &cli.output_dir);
    } else if let Some(provider) = cli.provider {
        run_single(&extractor, &provider, &cli.output_dir)?;
    }

    Ok(())
}

/// Discover all providers in the image and generate schemas for each.
/// Per-provider failures are collected and summarized; they never abort the
/// remaining providers.
fn run_all(extractor: &SchemaExtractor<'_>, output_dir: &Path) {
    let providers = extractor.discover_providers();

    let mut schemas = Vec::new();
    let mut parse_errors = Vec::new();

    for (cloud, resource) in providers {
        match extractor.parse_provider(&cloud, &resource) {
            Ok(schema) => {
                info!("  {}/{} -> {}", cloud, resource, schema.kind);
                schemas.push(schema);
            }
            Err(e) => parse_errors.push(format!("{}/{}: {}", cloud, resource, e)),
        }
    }

    output::sort_schemas_by_kind(&mut schemas);

    for schema in &schemas {
        if let Err(e) = output::write_provider_schema(schema, output_dir) {
            error!("Error writing schema for {}: {}", schema.kind, e);
        }
    }

    if let Err(e) = output::write_registry(&schemas, output_dir) {
        error!("Error writing registry: {}", e);
    }

    match extractor.parse_metadata() {
        Ok(metadata) => {
            if let Err(e) = output::write_metadata_schema(&metadata, output_dir) {
                error!("Error writing metadata schema: {}", e);
            }
        }
        Err(e) => error!("Error parsing metadata: {}", e),
    }

    info!(
        "Generated {} provider schemas in {}",
        schemas.len(),
        output_dir.join("providers").display()
    );
    if !parse_errors.is_empty() {
        warn!("Errors ({}):", parse_errors.len());
        for e in &parse_errors {
            warn!("  - {}", e);
        }
    }
}

/// Generate a schema for a single provider specified as `cloud/resource`.
/// Any failure here is fatal since there is nothing else to process.
fn run_single(extractor: &SchemaExtractor<'_>, provider: &str, output_dir: &Path) -> Result<()> {
    let Some((cloud, resource)) = provider.split_once('/') else {
        bail!(
            "invalid provider format: {:?} (expected cloud/resource, e.g., aws/eks-cluster)",
            provider
        );
    };

    let schema = extractor
        .parse_provider(cloud, resource)
        .with_context(|| format!("parsing provider {}", provider))?;
    let path = output::write_provider_schema(&schema, output_dir).context("writing schema")?;

    info!("Generated schema: {}", path.display());
    Ok(())
}

/// Default openmcf/apis location following the SCM_ROOT convention
/// (`$HOME/scm/github.com/{org}/{repo}/apis`).
fn default_openmcf_apis_dir() -> Result<PathBuf> {
    let scm_root = match std::env::var_os("SCM_ROOT") {
        Some(root) => PathBuf::from(root),
        None => dirs::home_dir()
            .context("cannot determine home directory")?
            .join("scm"),
    };
    Ok(scm_root
        .join("github.com")
        .join("plantonhq")
        .join("openmcf")
        .join("apis"))
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
