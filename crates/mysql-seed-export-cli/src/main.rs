//! mysql-seed-export CLI - Export MySQL tables as Laravel seeders.

use clap::{Parser, Subcommand};
use mysql_seed_export::{
    Config, ExportError, Exporter, MysqlReader, SchemaIntrospector, Timestamp,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "mysql-seed-export")]
#[command(about = "Export MySQL tables as Laravel seeder classes")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export tables as seeder files
    Export {
        /// Comma-separated tables to export (default: all tables)
        #[arg(long, value_delimiter = ',')]
        tables: Option<Vec<String>>,

        /// Override the output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Timestamp used for backfilled values, as "YYYY-MM-DD HH:MM:SS"
        #[arg(long)]
        now: Option<String>,
    },

    /// List the tables of the source database
    Tables,

    /// List the columns of a table with their types
    Columns {
        /// Table name (without prefix/suffix)
        table: String,
    },

    /// Test the database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ExportError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Export {
            tables,
            output_dir,
            now,
        } => {
            // Apply overrides
            if let Some(tables) = tables {
                config.export.tables = Some(tables);
            }
            if let Some(dir) = output_dir {
                config.export.output_dir = dir;
            }
            let now = match now {
                Some(s) => Timestamp::parse(&s)?,
                None => config.export.now()?,
            };
            config.validate()?;

            let cancel_token = setup_signal_handler();
            let exporter = Exporter::connect(config).await?;
            let result = exporter.run_at(now, cancel_token).await;
            exporter.source().close().await;
            let result = result?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                println!("\nExport completed!");
                println!("  Run ID: {}", result.run_id);
                println!("  Timestamp: {}", result.now);
                println!("  Duration: {:.2}s", result.duration_seconds);
                println!("  Tables: {}/{}", result.tables_success, result.tables_total);
                println!("  Rows: {}", result.rows_exported);
                for file in &result.files {
                    println!("  Wrote {}", file.display());
                }
                for failed in &result.failed_tables {
                    println!("  Failed {}: {}", failed.table, failed.error);
                }
            }
        }

        Commands::Tables => {
            let reader = MysqlReader::new(&config.source).await?;
            let tables = reader.table_names().await;
            reader.close().await;
            let tables = tables?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                for table in tables {
                    println!("{}", table);
                }
            }
        }

        Commands::Columns { table } => {
            let reader = MysqlReader::new(&config.source).await?;
            let columns = reader.column_types(&table).await;
            reader.close().await;
            let columns = columns?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&columns)?);
            } else {
                for (name, column_type) in columns {
                    println!("{}\t{}", name, column_type);
                }
            }
        }

        Commands::HealthCheck => {
            let reader = MysqlReader::new(&config.source).await?;
            let latency = reader.health_check().await;
            reader.close().await;
            let latency = latency?;

            if cli.output_json {
                let report = serde_json::json!({
                    "healthy": true,
                    "latency_ms": latency.as_millis() as u64,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Health Check Results:");
                println!("  Source (MySQL): OK ({}ms)", latency.as_millis());
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Cancel the export between tables on SIGINT or SIGTERM.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    for kind in [SignalKind::interrupt(), SignalKind::terminate()] {
        let token = cancel_token.clone();
        tokio::spawn(async move {
            match signal(kind) {
                Ok(mut stream) => {
                    stream.recv().await;
                    eprintln!("\nReceived signal. Stopping after the current table...");
                    token.cancel();
                }
                Err(e) => eprintln!("Failed to setup signal handler: {}", e),
            }
        });
    }

    cancel_token
}

/// Setup signal handler for Windows (only Ctrl-C)
#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nReceived Ctrl-C. Stopping after the current table...");
            token.cancel();
        }
    });

    cancel_token
}
