//! Conference CLI - manage conference records kept in sync with their search index

use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use conference_core::api::{ApiError, ApiResponse, ConferenceResource, StatusCode};
use conference_core::config::Config;
use conference_core::domain::conference::{Conference, ConferencePatch, ConferenceService};
use conference_core::storage::Database;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "conference")]
#[command(author, version, about = "Conference records with full-text search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a conference
    Create {
        #[arg(short, long)]
        name: String,
        /// RFC 3339 timestamp or YYYY-MM-DD
        #[arg(short, long)]
        date: String,
    },

    /// Replace a conference
    Update {
        id: i64,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        date: String,
    },

    /// Change some fields of a conference
    Patch {
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show one conference
    Get { id: i64 },

    /// List all conferences
    List,

    /// Delete a conference
    Delete { id: i64 },

    /// Full-text search, e.g. `name:rustconf` or `id:3`
    Search { query: String },

    /// Rebuild the search index from the primary store
    Reindex,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all configuration values
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("conference=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let out = Output {
        format: cli.format,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Create { name, date } => {
            let conference = Conference::new(name, parse_date(&date)?);
            let resource = open_resource().await?;
            let result = resource.create(conference).await;
            out.conference(result)
        }

        Commands::Update { id, name, date } => {
            let conference = Conference::new(name, parse_date(&date)?).with_id(id);
            let resource = open_resource().await?;
            let result = resource.update(id, conference).await;
            out.conference(result)
        }

        Commands::Patch { id, name, date } => {
            let patch = ConferencePatch {
                id: Some(id),
                name,
                date: date.as_deref().map(parse_date).transpose()?,
            };
            let resource = open_resource().await?;
            let result = resource.partial_update(id, patch).await;
            out.conference(result)
        }

        Commands::Get { id } => {
            let resource = open_resource().await?;
            let result = resource.get(id).await;
            out.conference(result)
        }

        Commands::List => {
            let resource = open_resource().await?;
            let result = resource.list().await;
            out.conferences(result)
        }

        Commands::Delete { id } => {
            let resource = open_resource().await?;
            let result = resource.delete(id).await;
            out.render(result, |_| {})?;
            if out.format == OutputFormat::Text && !out.quiet {
                println!("Deleted conference {}", id);
            }
            Ok(())
        }

        Commands::Search { query } => {
            let resource = open_resource().await?;
            let result = resource.search(&query).await;
            out.conferences(result)
        }

        Commands::Reindex => {
            let resource = open_resource().await?;
            let result = resource.reindex().await;
            out.render(result, |report| {
                println!("Indexed {} conferences ({} failed)", report.indexed, report.failed);
            })
        }

        Commands::Config { action } => cmd_config(action, &out),
    }
}

/// Open both databases and wire the resource over them
async fn open_resource() -> anyhow::Result<ConferenceResource> {
    let config = Config::load()?;
    tracing::debug!(
        primary = %config.database.resolved_path().display(),
        index = %config.search.resolved_path().display(),
        "Opening conference stores"
    );

    let primary = Database::new(config.database.database_config())
        .await
        .context("Failed to open primary store")?;
    let index = Database::new(config.search.database_config())
        .await
        .context("Failed to open search index")?;

    let service = ConferenceService::from_databases(&primary, &index);
    Ok(ConferenceResource::new(service, config.api))
}

/// Accept an RFC 3339 timestamp or a calendar date (midnight UTC)
fn parse_date(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use RFC 3339 or YYYY-MM-DD", value))?;
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| anyhow!("Invalid date '{}'", value))
}

fn cmd_config(action: ConfigAction, out: &Output) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            if out.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                for key in Config::keys() {
                    println!("{} = {}", key, config.get(key)?);
                }
            }
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !out.quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    fn conference(&self, result: Result<ApiResponse<Conference>, ApiError>) -> anyhow::Result<()> {
        self.render(result, print_conference)
    }

    fn conferences(
        &self,
        result: Result<ApiResponse<Vec<Conference>>, ApiError>,
    ) -> anyhow::Result<()> {
        self.render(result, |conferences| {
            if conferences.is_empty() {
                println!("No conferences found.");
            }
            conferences.iter().for_each(print_conference);
        })
    }

    /// Print a response, or print the error and fail
    fn render<T: Serialize>(
        &self,
        result: Result<ApiResponse<T>, ApiError>,
        text: impl FnOnce(&T),
    ) -> anyhow::Result<()> {
        let response = match result {
            Ok(response) => response,
            Err(error) => {
                if self.format == OutputFormat::Json {
                    println!("{}", serde_json::to_string_pretty(&error)?);
                }
                return Err(error.into());
            }
        };

        if let Some(warning) = &response.index_warning {
            eprintln!("warning: {}", warning);
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            OutputFormat::Text => {
                if !self.quiet {
                    println!("{}", status_line(response.status));
                    if let Some(location) = &response.location {
                        println!("Location: {}", location);
                    }
                }
                if let Some(body) = &response.body {
                    text(body);
                }
            }
        }
        Ok(())
    }
}

fn print_conference(conference: &Conference) {
    let id = conference
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("{}\t{}\t{}", id, conference.name, conference.date.to_rfc3339());
}

/// `201 Created`, or just the code when it has no standard reason phrase
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
