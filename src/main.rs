use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::Path;

use surveydash::cli::{parse_args, Cli, Commands, DashboardArgs};
use surveydash::config::{load_config, load_config_from, write_default_config, SurveydashConfig};
use surveydash::dashboard::{
    fetch_snapshot, register_exports, run_snapshot, DashboardContext, DashboardDefinition,
    DashboardReport,
};
use surveydash::errors::Error;
use surveydash::export::ExportRegistry;
use surveydash::formatting::{ColorMode, FormattingConfig};
use surveydash::output::{format_for_path, output_report};
use surveydash::source::InMemorySource;

fn main() {
    let cli = parse_args();
    init_logging(cli.verbosity);

    if let Err(e) = run(cli) {
        // Library errors carry a user-facing hint (credentials vs retry).
        match e.downcast_ref::<Error>() {
            Some(err) => eprintln!("Error: {}", err.user_message()),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config(),
    };

    match cli.command {
        Commands::Report {
            dashboard,
            format,
            output,
            plain,
            color,
        } => {
            let report = build_report(&dashboard, &config)?;
            let format = format.unwrap_or_else(|| format_for_path(output.as_deref()));
            output_report(
                &report,
                format,
                output.as_deref(),
                config.display.decimals,
                create_formatting_config(plain, color),
            )
        }
        Commands::Export { dashboard, output } => {
            let compact = dashboard.compact || config.display.compact;
            let report = build_report(&dashboard, &config)?;
            export_report(&report, &config, compact, &output)
        }
        Commands::Init { force } => {
            let dir = std::env::current_dir().context("cannot determine working directory")?;
            let path = write_default_config(&dir, force)?;
            println!("Created {}", path.display());
            Ok(())
        }
    }
}

fn create_formatting_config(plain: bool, color: Option<ColorMode>) -> FormattingConfig {
    if plain {
        return FormattingConfig::plain();
    }
    let mut config = FormattingConfig::from_env();
    if let Some(color) = color {
        config.color = color;
    }
    config
}

fn build_report(args: &DashboardArgs, config: &SurveydashConfig) -> Result<DashboardReport> {
    let definition = DashboardDefinition::load(&args.dashboard)?;

    let mut ctx = DashboardContext::from_config(config);
    ctx.set_variant(args.variant);
    for (key, value) in &args.filters {
        ctx.apply_filter(key.clone(), value.clone())?;
    }

    let source = InMemorySource::from_json_path(&args.records)?;
    let snapshot = fetch_snapshot(&source, &ctx, &definition.tables.zips, &config.source)?;

    let compact = args.compact || config.display.compact;
    let report = run_snapshot(&snapshot, &ctx, &definition, compact);
    for chart in report.empty_charts() {
        log::warn!("{}: no valid responses for the current filters", chart.id);
    }
    Ok(report)
}

fn export_report(
    report: &DashboardReport,
    config: &SurveydashConfig,
    compact: bool,
    output: &Path,
) -> Result<()> {
    let mut registry = ExportRegistry::new();
    register_exports(report, &mut registry, compact);
    let outcome = registry.export_all(&report.title, &config.export, Utc::now());

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(output)
        .with_context(|| format!("cannot create {}", output.display()))?;
    outcome.document.write_json(&mut file)?;

    println!(
        "Exported {}/{} charts on {} page(s) to {}",
        outcome.summary.succeeded,
        outcome.summary.attempted,
        outcome.document.pages.len(),
        output.display()
    );
    for failure in &outcome.summary.failures {
        eprintln!("  skipped {}: {}", failure.id, failure.reason);
    }
    Ok(())
}
