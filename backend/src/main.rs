//! adexport CLI - Campaign JSON to Google Ads Editor import CSV
//!
//! # Main Commands
//!
//! ```bash
//! adexport serve                    # Start HTTP server (port 3000)
//! adexport generate campaigns.json  # Campaign JSON to import CSV
//! adexport validate campaigns.json  # Validation report only
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! adexport flatten campaigns.json   # Flattened rows as JSON
//! adexport ingest external.csv      # Normalize an external CSV to rows
//! adexport headers                  # Print the required header catalogue
//! ```

use adexport::{check, flatten_ordered, generate, ingest_file, Campaign, REQUIRED_HEADERS};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "adexport")]
#[command(about = "Generate Google Ads Editor import CSVs from campaign JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: campaign JSON → validated, ordered import CSV
    Generate {
        /// Input JSON file (array of campaigns)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate campaign JSON and print the report
    Validate {
        /// Input JSON file (array of campaigns)
        input: PathBuf,
    },

    /// Flatten campaign JSON to rows without serializing
    Flatten {
        /// Input JSON file (array of campaigns)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ingest an externally authored CSV and normalize it to rows
    Ingest {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the required header catalogue
    Headers,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { input, output } => cmd_generate(&input, output.as_deref()),
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Flatten { input, output } => cmd_flatten(&input, output.as_deref()),
        Commands::Ingest { input, output } => cmd_ingest(&input, output.as_deref()),
        Commands::Headers => cmd_headers(),
        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn read_campaigns(input: &Path) -> Result<Vec<Campaign>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(input)?;
    Ok(serde_json::from_str(&content)?)
}

fn cmd_generate(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Generating import CSV from: {}", input.display());

    let campaigns = read_campaigns(input)?;
    match generate(&campaigns) {
        Ok(result) => {
            write_output(&result.csv, output)?;
            eprintln!(
                "✅ {} rows, {} warning(s)",
                result.row_count,
                result.validation.warning_count()
            );
            Ok(())
        }
        Err(adexport::ExportError::ValidationFailed { report }) => {
            eprintln!("\n❌ Export blocked by {} fatal error(s):", report.fatal_errors.len());
            for fatal in report.fatal_errors.iter().take(10) {
                match fatal.row_index {
                    Some(i) => eprintln!("   Row {}:", i),
                    None => eprintln!("   Batch:"),
                }
                for err in fatal.errors.iter().take(3) {
                    eprintln!("     - {}", err);
                }
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let campaigns = read_campaigns(input)?;
    let report = check(&campaigns);

    for warning in &report.warnings {
        match warning.row_index {
            Some(i) => eprintln!("   ⚠️  Row {}: {}", i, warning.message),
            None => eprintln!("   ⚠️  {}", warning.message),
        }
    }
    for fatal in &report.fatal_errors {
        match fatal.row_index {
            Some(i) => eprintln!("   ❌ Row {}:", i),
            None => eprintln!("   ❌ Batch:"),
        }
        for err in &fatal.errors {
            eprintln!("      - {}", err);
        }
    }

    eprintln!(
        "\n📊 Results: {} fatal, {} warning(s)",
        report.fatal_errors.len(),
        report.warning_count()
    );

    if report.is_fatal() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_flatten(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Flattening: {}", input.display());

    let campaigns = read_campaigns(input)?;
    let rows = flatten_ordered(&campaigns);
    eprintln!("   {} rows", rows.len());

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)?;
    Ok(())
}

fn cmd_ingest(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Ingesting CSV: {}", input.display());

    let result = ingest_file(input)?;
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'",
        match result.delimiter {
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        }
    );
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Ingested {} rows", result.rows.len());
    for warning in &result.warnings {
        match warning.row_index {
            Some(i) => eprintln!("   ⚠️  Row {}: {}", i, warning.message),
            None => eprintln!("   ⚠️  {}", warning.message),
        }
    }

    let json = serde_json::to_string_pretty(&result.rows)?;
    write_output(&json, output)?;
    Ok(())
}

fn cmd_headers() -> Result<(), Box<dyn std::error::Error>> {
    for header in REQUIRED_HEADERS {
        println!("{}", header);
    }
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    adexport::server::start_server(port).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
