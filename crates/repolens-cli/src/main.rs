//! Repolens - Artifact Repository Query
//!
//! Usage:
//!   repolens query            # Run the configured query and print the entries
//!   repolens query -i         # Pick entries interactively, print the submission
//!   repolens test-connection  # Check that the server answers with repositories
//!   repolens validate         # Report configuration problems
//!   repolens init             # Write a sample configuration

mod interactive;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repolens_core::config::{
    DisplayOptions, QueryConfig, QueryOptions, RepolensConfig, ServerConfig, Severity,
    ValidationIssue, parse_config, resolve_config_path, to_toml, validate,
};
use repolens_core::credentials::{CredentialEntry, CredentialProvider, CredentialStore};
use repolens_core::http::SystemProxy;
use repolens_core::query::{ConnectionStatus, CuratedResult, ParameterQuery, test_connection};

use crate::interactive::SelectionFlow;

#[derive(Parser)]
#[command(name = "repolens")]
#[command(about = "Artifact Repository Query", long_about = None)]
struct Cli {
    /// Path to repolens.toml (defaults to the user config directory)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Ignore HTTPS_PROXY/HTTP_PROXY/NO_PROXY from the environment
    #[arg(long, global = true)]
    no_system_proxy: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured query and print the curated entries
    Query {
        /// Override the query mode (path, version, repository, test)
        #[arg(long, short)]
        mode: Option<String>,

        /// Override the artifact name
        #[arg(long, short)]
        artifact: Option<String>,

        /// Override the repository the search is restricted to
        #[arg(long, short)]
        repo: Option<String>,

        /// Pick entries interactively and print the submitted value
        #[arg(long, short)]
        interactive: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Check that the server is reachable and accepts the credentials
    #[command(alias = "test")]
    TestConnection {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Validate the configuration file
    Validate {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Write a sample configuration file
    Init {
        /// Backend type (artifactory or nexus)
        #[arg(long, short = 't', default_value = "nexus", value_parser = ["artifactory", "nexus"])]
        server_type: String,

        /// Base URL of the server
        #[arg(long, short)]
        url: String,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// Only the submitted value (query) or nothing but the exit code
    Quiet,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repolens=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let code = run_cli(cli)?;
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

fn run_cli(cli: Cli) -> Result<i32> {
    let config_path = resolve_config_path(cli.config.as_deref())?;
    let system_proxy = if cli.no_system_proxy {
        None
    } else {
        SystemProxy::from_env()
    };

    match cli.command {
        Commands::Query {
            mode,
            artifact,
            repo,
            interactive,
            format,
        } => {
            let (mut query, credentials) = load(&config_path)?;
            apply_overrides(&mut query, mode, artifact, repo);
            run_query(query, credentials, system_proxy, interactive, format)
        }
        Commands::TestConnection { format } => {
            let (query, credentials) = load(&config_path)?;
            run_test_connection(query.server, credentials, system_proxy, format)
        }
        Commands::Validate { format } => {
            let (query, _) = load(&config_path)?;
            run_validate(&config_path, &query, format)
        }
        Commands::Init {
            server_type,
            url,
            force,
        } => {
            run_init(&config_path, &server_type, &url, force)?;
            Ok(0)
        }
    }
}

fn load(path: &Path) -> Result<(QueryConfig, Arc<dyn CredentialProvider>)> {
    let config = parse_config(path)?;
    let store = CredentialStore::from_entries(&config.credentials);
    tracing::debug!(path = %path.display(), credentials = store.len(), "Loaded configuration");
    Ok((config.query, Arc::new(store)))
}

fn apply_overrides(
    query: &mut QueryConfig,
    mode: Option<String>,
    artifact: Option<String>,
    repo: Option<String>,
) {
    if let Some(mode) = mode {
        query.query.mode = mode.trim().to_string();
    }
    if let Some(artifact) = artifact {
        query.query.artifact_name = artifact.trim().to_string();
    }
    if let Some(repo) = repo {
        query.query.repo_name = repo.trim().to_string();
    }
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

fn run_query(
    query: QueryConfig,
    credentials: Arc<dyn CredentialProvider>,
    system_proxy: Option<SystemProxy>,
    interactive: bool,
    format: OutputFormat,
) -> Result<i32> {
    let blocking: Vec<_> = validate(&query)
        .into_iter()
        .filter(ValidationIssue::is_error)
        .collect();
    if !blocking.is_empty() {
        print_issues(&blocking);
        anyhow::bail!("Configuration has {} error(s); run `repolens validate`", blocking.len());
    }

    let multi = query.multi_select();
    let parameter = ParameterQuery::new(query, credentials).with_system_proxy(system_proxy);
    let result = block_on(parameter.result())?;

    if interactive {
        let submission = SelectionFlow::new(&result, multi).choose()?;
        if let Some(submission) = submission {
            println!("{submission}");
        }
    } else {
        match format {
            OutputFormat::Table => print_entries_table(&result),
            OutputFormat::Json => print_entries_json(&result)?,
            OutputFormat::Quiet => {
                let submission = result.submission();
                if !submission.is_empty() {
                    println!("{submission}");
                }
            }
        }
    }

    Ok(if result.error_occurred { 1 } else { 0 })
}

fn run_test_connection(
    server: ServerConfig,
    credentials: Arc<dyn CredentialProvider>,
    system_proxy: Option<SystemProxy>,
    format: OutputFormat,
) -> Result<i32> {
    let url = server.url.clone();
    let status = block_on(test_connection(server, credentials, system_proxy))?;

    match format {
        OutputFormat::Table => match &status {
            ConnectionStatus::Success { repositories } => println!(
                "{} Connected to {} ({} repositories)",
                style("✓").green(),
                url,
                repositories
            ),
            ConnectionStatus::Failed { reason } => {
                println!("{} Connection to {} failed: {}", style("✗").red(), url, reason)
            }
        },
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Quiet => {}
    }

    Ok(if status.is_success() { 0 } else { 1 })
}

fn run_validate(path: &Path, query: &QueryConfig, format: OutputFormat) -> Result<i32> {
    let issues = validate(query);
    let errors = issues.iter().filter(|issue| issue.is_error()).count();

    match format {
        OutputFormat::Table => {
            if issues.is_empty() {
                println!("{} {} is valid", style("✓").green(), path.display());
            } else {
                print_issues(&issues);
            }
        }
        OutputFormat::Json => {
            let output: Vec<_> = issues
                .iter()
                .map(|issue| {
                    serde_json::json!({
                        "field": issue.field,
                        "severity": severity_str(issue.severity),
                        "message": issue.message,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {}
    }

    Ok(if errors > 0 { 1 } else { 0 })
}

fn run_init(path: &Path, server_type: &str, url: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite",
            path.display()
        );
    }

    let content = to_toml(&sample_config(server_type, url))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    println!("{} Wrote {}", style("✓").green(), path.display());
    Ok(())
}

fn sample_config(server_type: &str, url: &str) -> RepolensConfig {
    let credentials_id = format!("{server_type}-ci");
    let server = ServerConfig {
        r#type: server_type.to_string(),
        url: url.trim().to_string(),
        credentials_id: credentials_id.clone(),
        ignore_certificate: false,
        proxy: None,
    };

    let query = QueryConfig {
        server,
        query: QueryOptions {
            mode: "repository".to_string(),
            ..QueryOptions::default()
        },
        display: DisplayOptions::default(),
    };

    let mut credentials = std::collections::HashMap::new();
    credentials.insert(
        credentials_id,
        CredentialEntry {
            username: "ci".to_string(),
            password: None,
            password_env: Some("REPOLENS_PASSWORD".to_string()),
        },
    );

    RepolensConfig { query, credentials }
}

fn print_entries_table(result: &CuratedResult) {
    if result.error_occurred {
        println!("{} Query failed, see log output", style("✗").red());
    }
    if result.entries.is_empty() {
        println!("No entries.");
        return;
    }

    let width = result
        .entries
        .iter()
        .map(|entry| entry.key().chars().count())
        .max()
        .unwrap_or(0)
        .clamp(8, 40);

    println!("  {:<width$} Value", "Key");
    println!("{}", "-".repeat(width + 40));
    for entry in &result.entries {
        let marker = if entry.is_selected() { "*" } else { " " };
        println!(
            "{} {:<width$} {}",
            marker,
            truncate(entry.key(), width),
            entry.value()
        );
    }
}

fn print_entries_json(result: &CuratedResult) -> Result<()> {
    let output = serde_json::json!({
        "entries": result.entries,
        "error_occurred": result.error_occurred,
        "submission": result.submission(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_issues(issues: &[ValidationIssue]) {
    for issue in issues {
        let marker = match issue.severity {
            Severity::Error => style("error").red().bold(),
            Severity::Warning => style("warning").yellow().bold(),
        };
        println!("{marker}: {}: {}", issue.field, issue.message);
    }
}

fn severity_str(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
