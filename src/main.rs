use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use release_check::config::{self, CheckConfig};
use release_check::{UpdateChecker, VersionCheckResult};

#[derive(Parser)]
#[command(name = "release-check")]
#[command(version, about = "Check GitHub for a newer release")]
struct Cli {
    /// Repository (owner/repo, https://github.com/owner/repo, git@github.com:owner/repo.git)
    repository: Option<String>,

    /// Version currently installed
    current_version: Option<String>,

    /// JSON config file; arguments override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// GitHub API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Run the check on a background thread and wait for its callback
    #[arg(long)]
    background: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write logs to a file instead of stderr (defaults to the data directory)
    #[arg(long)]
    log_file: Option<Option<PathBuf>>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli)?;

    let config = build_config(&cli)?;
    let checker = UpdateChecker::new(config);

    let result = if cli.background {
        let (tx, rx) = mpsc::channel();
        checker.check_for_updates(move |result| {
            let _ = tx.send(result);
        });
        rx.recv()?
    } else {
        checker.get_latest_version()
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    Ok(if result.is_error() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

fn build_config(cli: &Cli) -> anyhow::Result<CheckConfig> {
    let mut config = match &cli.config {
        Some(path) => CheckConfig::from_file(path)?,
        None => CheckConfig::default(),
    };

    if let Some(repository) = &cli.repository {
        config.repository = repository.clone();
    }
    if let Some(current_version) = &cli.current_version {
        config.current_version = current_version.clone();
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout_secs(timeout);
    }
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_base_url(api_url.clone());
    }

    if config.repository.is_empty() {
        anyhow::bail!("no repository given (pass it as an argument or in --config)");
    }

    Ok(config)
}

fn print_summary(result: &VersionCheckResult) {
    if let Some(message) = result.error_message() {
        eprintln!("Update check failed: {}", message);
        return;
    }

    if result.has_update() {
        println!(
            "Update available: {} -> {}",
            result.current_version(),
            result.latest_version()
        );
        if !result.download_url().is_empty() {
            println!("Download: {}", result.download_url());
        }
        if !result.published_date().is_empty() {
            println!("Published: {}", result.published_date());
        }
        if !result.release_notes().is_empty() {
            println!("\n{}", result.release_notes());
        }
    } else {
        println!(
            "Up to date: {} (latest release {})",
            result.current_version(),
            result.latest_version()
        );
    }
}

fn init_tracing(
    cli: &Cli,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info,release_check=debug",
        _ => "debug,release_check=trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let Some(log_file) = &cli.log_file else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    };

    let path = log_file.clone().unwrap_or_else(config::log_path);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("invalid log file path: {}", path.display()))?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_writer(writer))
        .init();

    Ok(Some(guard))
}
