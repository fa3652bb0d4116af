//! mavensearch CLI - search Maven repositories from the terminal
//!
//! This binary provides the command-line interface for the mavensearch system.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mavensearch::{render_json, render_snippets, render_table, sha1_file, OutputFormat};
use mavensearch_backends::create_search_backend;
use mavensearch_core::config::Config;
use mavensearch_core::{Artifact, BuildTool, SearchOutcome, SearchRequest};
use mavensearch_paged_search::{
    cancel_after, CancellationToken, SearchHandle, SearchSession, SearchSettings,
};
use std::path::PathBuf;
use std::process::ExitCode;
use strum::IntoEnumIterator;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

/// Exit status after an interrupted search, as shells report SIGINT
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(name = "mavensearch")]
#[command(about = "Search Maven Central and Nexus repositories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Most result pages fetched per search
    #[arg(long, value_name = "N", global = true)]
    max_pages: Option<u32>,

    /// Cancel the search after this many seconds
    #[arg(long, value_name = "SECS", global = true)]
    timeout: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// Print the dependency snippet for a build tool (repeatable)
    #[arg(long = "snippet", value_name = "TOOL", global = true)]
    snippets: Vec<BuildTool>,

    /// Print snippets for every supported build tool
    #[arg(long, global = true)]
    all_snippets: bool,

    /// Result row (1-based) the snippets are generated for
    #[arg(long, value_name = "N", default_value_t = 1, global = true)]
    select: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Free text search
    Keyword {
        /// Search terms
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Fetch only this zero-based page
        #[arg(long)]
        page: Option<u32>,
    },
    /// Find the artifact a file or checksum belongs to
    Sha1 {
        /// Hex SHA-1 checksum
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        hash: Option<String>,
        /// Compute the checksum of a local file instead
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// Search by group, artifact and optionally version
    #[command(disable_version_flag = true)]
    Gav {
        #[arg(short, long)]
        group: String,
        #[arg(short, long)]
        artifact: String,
        #[arg(long)]
        version: Option<String>,
        /// Fetch only this zero-based page
        #[arg(long)]
        page: Option<u32>,
    },
    /// Find artifacts containing a class
    Class {
        /// Simple or fully qualified class name
        name: String,
        /// Treat the name as fully qualified
        #[arg(long)]
        fully_qualified: bool,
        /// Fetch only this zero-based page
        #[arg(long)]
        page: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging system
///
/// Logs go to stderr so results on stdout stay machine readable.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mavensearch={level},mavensearch_core={level},mavensearch_backends={level},mavensearch_paged_search={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(max_pages) = cli.max_pages {
        config.search.max_pages = max_pages;
    }
    if let Some(timeout) = cli.timeout {
        config.search.timeout_secs = Some(timeout);
    }
    config.validate()?;
    debug!("Configuration: {config:?}");

    let request = build_request(&cli.command)?;
    let backend = create_search_backend(&config)?;
    let mut session = SearchSession::new(backend, SearchSettings::from(&config.search));
    let handle = session.start(request)?;

    if let Some(timeout) = config.search.timeout() {
        cancel_after(&handle.cancellation_token(), timeout);
    }

    match watch(handle).await {
        SearchOutcome::Completed(artifacts) => {
            print_results(&cli, &artifacts)?;
            Ok(ExitCode::SUCCESS)
        }
        SearchOutcome::Cancelled => {
            eprintln!("Search cancelled");
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
        SearchOutcome::Failed(e) => Err(anyhow!(e).context("Search failed")),
    }
}

fn build_request(command: &Commands) -> Result<SearchRequest> {
    let with_page = |request: SearchRequest, page: Option<u32>| match page {
        Some(page) => request.with_page(page),
        None => request,
    };

    let request = match command {
        Commands::Keyword { text, page } => with_page(SearchRequest::keyword(text.join(" ")), *page),
        Commands::Sha1 { hash, file } => match (hash, file) {
            (_, Some(path)) => {
                let sha1 = sha1_file(path)?;
                eprintln!("SHA-1 of {}: {sha1}", path.display());
                SearchRequest::sha1(sha1)
            }
            (Some(hash), None) => SearchRequest::sha1(hash),
            (None, None) => bail!("Either a checksum or --file is required"),
        },
        Commands::Gav {
            group,
            artifact,
            version,
            page,
        } => with_page(
            SearchRequest::coordinates(group, artifact, version.as_deref()),
            *page,
        ),
        Commands::Class {
            name,
            fully_qualified,
            page,
        } => with_page(SearchRequest::class_name(name, *fully_qualified), *page),
    };
    Ok(request)
}

/// Show progress until the search ends, cancelling it on Ctrl-C
async fn watch(mut handle: SearchHandle) -> SearchOutcome {
    let pb = create_progress_bar();
    let cancel = handle.cancellation_token();
    let mut listen_for_ctrl_c = true;

    loop {
        tokio::select! {
            event = handle.next_progress() => match event {
                Some(event) => {
                    pb.set_position(u64::from(event.percent));
                    pb.set_message(event.note);
                }
                None => break,
            },
            signal = tokio::signal::ctrl_c(), if listen_for_ctrl_c => {
                listen_for_ctrl_c = on_ctrl_c(signal, &cancel);
            }
        }
    }

    pb.finish_and_clear();
    handle.outcome().await
}

/// Cancel on a delivered Ctrl-C; returns whether the listener is still usable
fn on_ctrl_c(signal: std::io::Result<()>, cancel: &CancellationToken) -> bool {
    match signal {
        Ok(()) => {
            warn!("Interrupted, cancelling search");
            cancel.cancel();
            true
        }
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {e}");
            false
        }
    }
}

fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}")
            .map_err(|e| error!("Failed to set progress bar style: {}", e))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}

fn selected_tools(cli: &Cli) -> Vec<BuildTool> {
    if cli.all_snippets {
        BuildTool::iter().collect()
    } else {
        cli.snippets.clone()
    }
}

fn select_artifact<'a>(cli: &Cli, artifacts: &'a [Artifact]) -> Result<Option<&'a Artifact>> {
    if selected_tools(cli).is_empty() || artifacts.is_empty() {
        return Ok(None);
    }
    cli.select
        .checked_sub(1)
        .and_then(|index| artifacts.get(index))
        .map(Some)
        .ok_or_else(|| {
            anyhow!(
                "--select {} is out of range, the search returned {} artifacts",
                cli.select,
                artifacts.len()
            )
        })
}

fn print_results(cli: &Cli, artifacts: &[Artifact]) -> Result<()> {
    let tools = selected_tools(cli);
    let selected = select_artifact(cli, artifacts)?;

    match cli.format {
        OutputFormat::Json => println!("{}", render_json(artifacts, selected, &tools)?),
        OutputFormat::Table => {
            print!("{}", render_table(artifacts));
            if let Some(artifact) = selected {
                println!();
                print!("{}", render_snippets(artifact, &tools));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use mavensearch_core::SearchQuery;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_keyword_terms_are_joined() {
        let cli = Cli::parse_from(["mavensearch", "keyword", "spring", "boot", "--page", "2"]);
        let request = build_request(&cli.command).unwrap();
        assert_eq!(
            request.query(),
            &SearchQuery::Keyword {
                keyword: "spring boot".to_string()
            }
        );
        assert_eq!(request.page(), Some(2));
    }

    #[test]
    fn test_gav_version_flag() {
        let cli = Cli::parse_from([
            "mavensearch",
            "gav",
            "-g",
            "org.slf4j",
            "-a",
            "slf4j-api",
            "--version",
            "2.0.9",
        ]);
        let request = build_request(&cli.command).unwrap();
        assert_eq!(
            request.query(),
            &SearchQuery::Coordinates {
                group_id: "org.slf4j".to_string(),
                artifact_id: "slf4j-api".to_string(),
                version: Some("2.0.9".to_string()),
            }
        );
    }

    #[test]
    fn test_sha1_requires_hash_or_file() {
        assert!(Cli::try_parse_from(["mavensearch", "sha1"]).is_err());
        assert!(Cli::try_parse_from(["mavensearch", "sha1", "abc", "--file", "x.jar"]).is_err());
    }

    #[test]
    fn test_snippet_options() {
        let cli = Cli::parse_from([
            "mavensearch",
            "--snippet",
            "maven",
            "--snippet",
            "LEIN",
            "keyword",
            "junit",
        ]);
        assert_eq!(
            selected_tools(&cli),
            vec![BuildTool::Maven, BuildTool::Leiningen]
        );

        let cli = Cli::parse_from(["mavensearch", "--all-snippets", "keyword", "junit"]);
        assert_eq!(selected_tools(&cli).len(), BuildTool::iter().count());
    }

    #[test]
    fn test_ctrl_c_cancels_search() {
        let cancel = CancellationToken::new();
        assert!(on_ctrl_c(Ok(()), &cancel));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_ctrl_c_listener_failure_leaves_search_running() {
        let cancel = CancellationToken::new();
        let failure = std::io::Error::other("no signal driver");
        assert!(!on_ctrl_c(Err(failure), &cancel));
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_select_out_of_range() {
        let cli = Cli::parse_from([
            "mavensearch",
            "--snippet",
            "maven",
            "--select",
            "3",
            "keyword",
            "junit",
        ]);
        let artifacts = vec![Artifact::new("junit", "junit", "4.13.2")];
        assert!(select_artifact(&cli, &artifacts).is_err());

        let cli = Cli::parse_from(["mavensearch", "--snippet", "maven", "keyword", "junit"]);
        let selected = select_artifact(&cli, &artifacts).unwrap();
        assert_eq!(selected.map(Artifact::coordinates).as_deref(), Some("junit:junit:4.13.2"));
    }
}
