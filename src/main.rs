// LogLens - main.rs
//
// Command-line host. Handles:
// 1. CLI argument parsing
// 2. Host settings (config.toml) and logging initialisation
// 3. Rendering a log file through the enhancer into a standalone page
// 4. Driving the background service against the JSON store

use clap::{Parser, Subcommand};
use loglens::app::enhancer::ScanReport;
use loglens::app::memory::MemoryDocument;
use loglens::app::messaging::{Background, Request};
use loglens::app::page::PageSession;
use loglens::app::store::{ConfigStore, JsonFileStore};
use loglens::core::markup::escape_text;
use loglens::core::model::{Config, ElementSpec, Platform};
use loglens::core::stats::BlockStats;
use loglens::platform::config::{load_settings, AppSettings, PlatformPaths};
use loglens::platform::fs::read_file_lossy;
use loglens::ui::theme::page_document;
use loglens::util::error::{LogLensError, StoreError};
use loglens::util;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// LogLens - render CI/CD logs with colours, error markers and controls.
#[derive(Parser, Debug)]
#[command(name = "loglens", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Directory holding config.toml (defaults to the platform config dir).
    #[arg(long = "config-dir", global = true)]
    config_dir: Option<PathBuf>,

    /// Store file (overrides config.toml and the platform default).
    #[arg(long = "store", global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enhance a log file and write a standalone HTML page.
    Render {
        file: PathBuf,

        /// Output file (stdout if omitted).
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Container shape to wrap the log in.
        #[arg(short = 'p', long = "platform", default_value = "generic")]
        platform: Platform,
    },

    /// Print line, error and warning counts for a log file.
    Stats {
        file: PathBuf,

        /// Print JSON instead of the controls-bar summary.
        #[arg(long)]
        json: bool,
    },

    /// Inspect or change the stored configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the stored config and Pro status as JSON.
    Show,
    /// Set one config field, e.g. `set foldEnabled false`.
    Set { field: String, value: String },
    /// Activate Pro features.
    ActivatePro,
    /// Print the store and config.toml locations.
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut paths = PlatformPaths::resolve();
    if let Some(dir) = cli.config_dir.clone() {
        paths.config_dir = dir;
    }
    let (settings, warnings) = load_settings(&paths.config_dir);

    util::logging::init(cli.debug, settings.log_level.as_deref());
    for warning in &warnings {
        tracing::warn!(warning = %warning, "config.toml warning");
    }
    tracing::debug!(
        version = util::constants::APP_VERSION,
        command = ?cli.command,
        "LogLens starting"
    );

    let store_path = cli
        .store
        .clone()
        .or_else(|| settings.store_file.clone())
        .unwrap_or_else(|| paths.store_path());

    let result = match cli.command {
        Command::Render {
            file,
            output,
            platform,
        } => render(&file, output.as_deref(), platform, &settings, &store_path),
        Command::Stats { file, json } => stats(&file, json),
        Command::Config { action } => config(action, &store_path, &paths.config_file()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn read_log(path: &Path) -> Result<String, LogLensError> {
    read_file_lossy(path).map_err(|e| LogLensError::Io {
        path: path.to_path_buf(),
        operation: "read log",
        source: e,
    })
}

/// Build a document holding `text` inside the container shape `platform`
/// pages use for their logs.
fn log_document(text: &str, platform: Platform) -> MemoryDocument {
    let inner = escape_text(text);
    let mut doc = MemoryDocument::new();
    match platform {
        Platform::Github => {
            doc.append(
                None,
                ElementSpec::new("pre")
                    .attr("data-filterable-for", "job-logs-filter")
                    .inner(inner),
            );
        }
        Platform::Gitlab => {
            doc.append(None, ElementSpec::new("pre").class("build-trace").inner(inner));
        }
        Platform::Jenkins => {
            let panel = doc.append(None, ElementSpec::new("div").id("main-panel"));
            doc.append(Some(panel), ElementSpec::new("pre").inner(inner));
        }
        Platform::Generic => {
            doc.append(None, ElementSpec::new("pre").inner(inner));
        }
    }
    doc
}

fn render(
    file: &Path,
    output: Option<&Path>,
    platform: Platform,
    settings: &AppSettings,
    store_path: &Path,
) -> Result<(), LogLensError> {
    let text = read_log(file)?;
    let data = JsonFileStore::new(store_path).load()?;
    let config: Config = data.config_or_default();
    let theme = config.theme;

    let mut session = PageSession::new(log_document(&text, platform), config, data.is_pro(), settings);
    let ScanReport {
        candidates,
        enhanced,
        ..
    } = session.start();
    if enhanced.is_empty() {
        tracing::warn!(
            file = %file.display(),
            candidates,
            "Nothing to enhance; writing the log unchanged"
        );
    }

    let title = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let page = page_document(&title, theme, &session.into_host().render_html());

    match output {
        Some(path) => {
            std::fs::write(path, page).map_err(|e| LogLensError::Io {
                path: path.to_path_buf(),
                operation: "write page",
                source: e,
            })?;
            tracing::info!(output = %path.display(), "Page written");
        }
        None => print!("{page}"),
    }
    Ok(())
}

fn stats(file: &Path, json: bool) -> Result<(), LogLensError> {
    let stats = BlockStats::compute(&read_log(file)?);
    if json {
        let out = serde_json::to_string(&stats)
            .map_err(|e| LogLensError::Store(StoreError::Serialise { source: e }))?;
        println!("{out}");
    } else {
        println!("{stats}");
    }
    Ok(())
}

fn config(action: ConfigCommand, store_path: &Path, config_file: &Path) -> Result<(), LogLensError> {
    let mut background = Background::new(JsonFileStore::new(store_path));
    background.install()?;

    match action {
        ConfigCommand::Show => {
            let data = background.store().load()?;
            let shown = serde_json::json!({
                "config": data.config_or_default(),
                "isPro": data.is_pro(),
                "proActivatedAt": data.pro_activated_at,
            });
            println!("{shown:#}");
        }
        ConfigCommand::Set { field, value } => {
            let mut config = background.store().load()?.config_or_default();
            config.set_field(&field, &value)?;
            background.handle(Request::SaveConfig { config })?;
            println!("{field} = {value}");
        }
        ConfigCommand::ActivatePro => {
            let config = background.store().load()?.config_or_default();
            background.handle(Request::ActivatePro { config })?;
            println!("Pro features activated");
        }
        ConfigCommand::Path => {
            println!("store:  {}", store_path.display());
            println!("config: {}", config_file.display());
        }
    }
    Ok(())
}
