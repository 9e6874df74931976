//! Convert command - build the chart and report what was generated

use chartify_convert::{ConversionResult, ConvertOptions, OutputFolder, convert_with_options};
use chartify_core::DiffKind;
use console::style;
use std::path::PathBuf;

use crate::error::Result;

/// Parsed command line, decoupled from clap
pub struct Args {
    pub base: PathBuf,
    pub overlay: PathBuf,
    pub condition: String,
    pub output: PathBuf,
    pub chart_name: Option<String>,
    pub default_condition: bool,
    pub chart_version: String,
    pub app_version: String,
    pub values_file: Option<PathBuf>,
    pub dry_run: bool,
}

pub fn run(args: Args) -> Result<()> {
    print_header(&args);

    let options = ConvertOptions {
        condition: args.condition.clone(),
        chart_name: args.chart_name,
        default_condition: args.default_condition,
        chart_version: args.chart_version,
        app_version: args.app_version,
        values_file: args.values_file,
        dry_run: args.dry_run,
    };

    let result = convert_with_options(&args.base, &args.overlay, &args.output, options)?;

    print_templates(&result);
    print_collisions(&result);
    print_summary(&result);
    print_footer(&result, &args.condition, args.default_condition);

    Ok(())
}

fn print_header(args: &Args) {
    println!();
    println!(
        "  {} {} {}",
        style("Chartify").bold().cyan(),
        style("─").dim(),
        style("manifests → Helm").dim()
    );
    println!();
    println!(
        "  {} {} {}",
        style("Base:").dim(),
        style(args.base.display()).cyan(),
        style("(condition off)").dim()
    );
    println!(
        "  {} {} {}",
        style("Overlay:").dim(),
        style(args.overlay.display()).cyan(),
        style("(condition on)").dim()
    );
    println!(
        "  {} {}",
        style("Target:").dim(),
        style(args.output.display()).green()
    );
    println!();
}

fn print_templates(result: &ConversionResult) {
    let title = if result.dry_run {
        "Templates (dry run)"
    } else {
        "Generated Templates"
    };
    println!("  {}", style(title).bold());
    println!("  {}", style("─".repeat(title.chars().count())).dim());

    for written in &result.templates {
        let template = &written.template;
        let marker = match template.kind {
            DiffKind::Added => style("+").green().bold(),
            DiffKind::Removed => style("-").red().bold(),
            DiffKind::Modified => style("~").yellow().bold(),
            DiffKind::Unchanged => style("=").dim(),
        };
        let folder = match template.folder {
            OutputFolder::Crds => style(template.folder.as_str()).magenta(),
            OutputFolder::Templates => style(template.folder.as_str()).dim(),
        };

        println!(
            "  {} {}/{} {}",
            marker,
            folder,
            template.filename,
            style(format!("({})", template.kind)).dim()
        );
    }

    println!();
}

fn print_collisions(result: &ConversionResult) {
    if result.collisions.is_empty() {
        return;
    }

    println!("  {}", style("Duplicate Resources").bold().yellow());
    println!("  {}", style("───────────────────").dim());
    for collision in &result.collisions {
        println!(
            "  {} {} {}",
            style("⚠").yellow(),
            collision.key,
            style(format!("appears more than once in {}; last one kept", collision.side)).dim()
        );
    }
    println!();
}

fn print_summary(result: &ConversionResult) {
    println!("  {}", style("Summary").bold());
    println!("  {}", style("───────").dim());

    for kind in [
        DiffKind::Added,
        DiffKind::Removed,
        DiffKind::Modified,
        DiffKind::Unchanged,
    ] {
        let count = result.summary.count(kind);
        if count == 0 {
            continue;
        }
        let number = format!("{count:>3}");
        let number = match kind {
            DiffKind::Added => style(number).green().bold(),
            DiffKind::Removed => style(number).red().bold(),
            DiffKind::Modified => style(number).yellow().bold(),
            DiffKind::Unchanged => style(number).blue().bold(),
        };
        println!(
            "  {} {} {}",
            number,
            style(if count == 1 { "resource" } else { "resources" }).dim(),
            kind
        );
    }

    println!();
}

fn print_footer(result: &ConversionResult, condition: &str, default_condition: bool) {
    if result.dry_run {
        println!(
            "  {} {}",
            style("ℹ").cyan(),
            style("Dry run mode - no files were written").dim()
        );
        println!();
        return;
    }

    println!("Helm chart generated successfully!");
    println!("Chart: {}", result.chart_name);
    println!("Output: {}", result.output.display());
    println!("Condition: .Values.{condition} (default: {default_condition})");
}
