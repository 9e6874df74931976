//! Chartify CLI - base/overlay Kubernetes manifests to a conditional Helm chart

use clap::{ArgAction, Parser};
use miette::Result;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod convert;
mod error;

#[derive(Parser)]
#[command(name = "chartify")]
#[command(version)]
#[command(about = "Convert two sets of Kubernetes manifests into a Helm chart with conditionals")]
#[command(after_help = "\
Examples:
  chartify base.yaml overlay.yaml --condition enableFeature
  chartify manifests/base manifests/overlay --condition production --output ./my-chart --chart-name my-app
  chartify base.yaml overlay.yaml --condition enableFeature --debug")]
struct Cli {
    /// Base manifest file or directory (rendered when the condition is false)
    base: PathBuf,

    /// Overlay manifest file or directory (rendered when the condition is true)
    overlay: PathBuf,

    /// Condition key for templating (creates .Values.KEY in templates)
    #[arg(long)]
    condition: String,

    /// Output chart directory
    #[arg(short, long, default_value = "./chart")]
    output: PathBuf,

    /// Chart name (default: derived from output directory)
    #[arg(long)]
    chart_name: Option<String>,

    /// Default value of the condition in values.yaml (bare flag means true)
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    default_condition: bool,

    /// Chart version to set in Chart.yaml
    #[arg(long, default_value = "0.1.0")]
    chart_version: String,

    /// Chart appVersion to set in Chart.yaml
    #[arg(long, default_value = "1.0.0")]
    chart_app_version: String,

    /// Base values.yaml file to extend (the condition is added to it)
    #[arg(long)]
    values_file: Option<PathBuf>,

    /// Show what would be generated without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Show detailed processing information
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();

    if cli.debug {
        // SAFETY: We're the only thread at this point (start of main)
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }

    init_tracing(cli.debug);

    let args = convert::Args {
        base: cli.base,
        overlay: cli.overlay,
        condition: cli.condition,
        output: cli.output,
        chart_name: cli.chart_name,
        default_condition: cli.default_condition,
        chart_version: cli.chart_version,
        app_version: cli.chart_app_version,
        values_file: cli.values_file,
        dry_run: cli.dry_run,
    };

    convert::run(args)?;
    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `--debug`
fn init_tracing(debug: bool) {
    let default_level = if debug { "info" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
