use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use sf_app::{AppError, AppResult, RunReport, project_service, query, run_service};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(about = "StormFlow CLI - storm sewer sizing and routing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Size and route the network of a project
    Run {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Write the full run report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a project and export one discharge series as CSV
    ExportSeries {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Series kind: node, link or subcatchment
        kind: String,
        /// Node, link or subcatchment ID
        entity_id: String,
        /// Scenario number (design storms count from 1)
        #[arg(short, long, default_value_t = 1)]
        scenario: u32,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Run {
            project_path,
            output,
        } => cmd_run(&project_path, output.as_deref()),
        Commands::ExportSeries {
            project_path,
            kind,
            entity_id,
            scenario,
            output,
        } => cmd_export_series(&project_path, &kind, &entity_id, scenario, output.as_deref()),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    let summary = project_service::summarize(&project);
    println!("✓ Project is valid");
    println!(
        "  {} nodes, {} links, {} subcatchments ({:.2} ha)",
        summary.node_count,
        summary.link_count,
        summary.subcatchment_count,
        summary.total_area_m2 / 10_000.0
    );
    Ok(())
}

fn run(project_path: &Path) -> AppResult<RunReport> {
    let project = project_service::load_project(project_path)?;
    run_service::run_project(&project)
}

fn cmd_run(project_path: &Path, output: Option<&Path>) -> AppResult<()> {
    println!("Running project: {}", project_path.display());
    let started = Instant::now();
    let report = run(project_path)?;
    println!(
        "✓ Simulation completed in {:.2} s ({} scenarios)",
        started.elapsed().as_secs_f64(),
        report.scenarios.len()
    );

    println!(
        "\n{:<8} {:>10} {:>9} {:>9} {:>8} {:>9} {:>9}",
        "link", "Q (m3/s)", "Di (mm)", "De (mm)", "slope", "up (m)", "down (m)"
    );
    for link in &report.links {
        println!(
            "{:<8} {:>10.4} {:>9.1} {:>9.1} {:>8.4} {:>9.3} {:>9.3}{}",
            link.id,
            link.peak_discharge_m3_per_s,
            link.inner_diameter_mm,
            link.outer_diameter_mm,
            link.slope,
            link.upstream_invert_elevation_m,
            link.downstream_invert_elevation_m,
            if link.min_slope_enforced { "  (min slope)" } else { "" }
        );
    }

    if let Some(path) = output {
        run_service::save_report_json(path, &report)?;
        println!("\n✓ Report written to {}", path.display());
    }
    Ok(())
}

fn cmd_export_series(
    project_path: &Path,
    kind: &str,
    entity_id: &str,
    scenario: u32,
    output: Option<&Path>,
) -> AppResult<()> {
    let kind = query::parse_series_kind(kind)?;
    let report = run(project_path)?;
    let csv = query::export_series_csv(&report, kind, entity_id, scenario)?;

    // Write to file or stdout
    if let Some(path) = output {
        std::fs::write(path, &csv).map_err(|e| AppError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        println!(
            "✓ Exported {} data points to {}",
            csv.lines().count().saturating_sub(1),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
