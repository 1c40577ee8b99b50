use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use labtrend::models::AnalyteGroup;
use labtrend::{
    compare_groups, parse_file, supported_laboratories, ComparisonReport, ParseError, ParseResult,
};

#[derive(Parser, Debug)]
#[command(name = "labtrend")]
#[command(about = "Parse Romanian lab reports and compare results across visits", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse one report and print its analytes
    Parse {
        /// Report file (extracted report text)
        file: PathBuf,

        /// Laboratory format key; omit to auto-detect
        #[arg(long, default_value = "universal")]
        lab: String,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare two reports from different visits
    Compare {
        /// Earlier visit's report file
        earlier: PathBuf,

        /// Later visit's report file
        later: PathBuf,

        /// Laboratory format key applied to both files; omit to auto-detect
        #[arg(long, default_value = "universal")]
        lab: String,

        /// Print the full comparison as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the supported laboratory formats
    Labs {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Document(String),
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Eroare: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Parse { file, lab, json } => {
            let result = parse_file(&file, &lab)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            if !result.success {
                let message = result
                    .error
                    .unwrap_or_else(|| "Document imposibil de interpretat".to_string());
                return Err(CliError::Document(message));
            }
            if !json {
                print_parse_summary(&result);
            }
            Ok(())
        }
        Commands::Compare {
            earlier,
            later,
            lab,
            json,
        } => {
            let earlier_group = load_group(&earlier, &lab)?;
            let later_group = load_group(&later, &lab)?;
            let report = compare_groups(&earlier_group, &later_group);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_comparison(&report);
            }
            Ok(())
        }
        Commands::Labs { json } => {
            let catalog = supported_laboratories();
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                for info in &catalog {
                    println!("{:<14} {:<16} {}", info.key, info.display_name, info.description);
                }
            }
            Ok(())
        }
    }
}

/// Parse one file into a comparison-ready group, failing on unusable documents.
fn load_group(path: &Path, lab: &str) -> Result<AnalyteGroup, CliError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    let result = parse_file(path, lab)?;
    if !result.success {
        let message = result
            .error
            .unwrap_or_else(|| "Document imposibil de interpretat".to_string());
        return Err(CliError::Document(format!("{file_name}: {message}")));
    }
    Ok(AnalyteGroup {
        document_date: result.collection_date,
        document_name: file_name,
        analytes: result.analytes,
    })
}

fn print_parse_summary(result: &ParseResult) {
    if let Some(laboratory) = &result.laboratory {
        println!("Laborator: {laboratory}");
    }
    if let Some(date) = result.collection_date {
        println!("Data recoltării: {}", date.format("%d.%m.%Y"));
    }
    if let Some(number) = &result.report_number {
        println!("Buletin: {number}");
    }
    println!(
        "Analize: {} ({} în afara limitelor)",
        result.total_count, result.abnormal_count
    );

    let mut current_category: Option<&str> = None;
    for record in &result.analytes {
        let category = record.category.as_deref();
        if category != current_category {
            match category {
                Some(name) => println!("\n[{name}]"),
                None => println!(),
            }
            current_category = category;
        }
        let marker = if record.abnormal { "*" } else { " " };
        let unit = record.unit.as_deref().unwrap_or("");
        let range = record
            .reference_range_text
            .as_deref()
            .map(|r| format!("  ({r})"))
            .unwrap_or_default();
        println!(
            "{marker} {:<34} {:>10} {unit}{range}",
            record.name, record.value_text
        );
    }

    for warning in &result.warnings {
        println!("\nAtenție: {warning}");
    }
}

fn print_comparison(report: &ComparisonReport) {
    let earlier = date_or_name(report.earlier_date, &report.earlier_document_name);
    let later = date_or_name(report.later_date, &report.later_document_name);
    println!("Comparație: {earlier} → {later}");

    let new_count = report.entries.iter().filter(|e| e.is_new()).count();
    let gone_count = report.entries.iter().filter(|e| e.is_discontinued()).count();
    println!(
        "Analize: {} ({} noi, {} întrerupte)",
        report.entries.len(),
        new_count,
        gone_count
    );

    let mut current_category: Option<&str> = None;
    for entry in &report.entries {
        let category = entry.category.as_deref();
        if category != current_category {
            match category {
                Some(name) => println!("\n[{name}]"),
                None => println!(),
            }
            current_category = category;
        }
        let earlier_value = entry.earlier_value.as_deref().unwrap_or("-");
        let later_value = entry.later_value.as_deref().unwrap_or("-");
        println!(
            "  {:<34} {:>10} → {:<10} {}",
            entry.name, earlier_value, later_value, entry.message
        );
    }
}

fn date_or_name(date: Option<chrono::NaiveDate>, name: &str) -> String {
    date.map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| name.to_string())
}
