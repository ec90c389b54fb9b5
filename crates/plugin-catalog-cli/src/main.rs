use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing::debug;

use plugin_catalog_core::config::{CatalogPaths, Config};
use plugin_catalog_core::version::{is_compatible, pick_newest};
use plugin_catalog_core::{
    http, update_ides, CatalogError, FileDiff, MarketplaceClient, NixHasher, Result,
    UpdateOptions, Updater,
};

mod args;
use args::{Cli, Commands, ConfigAction, Shell};

mod telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.verbose, cli.quiet);

    let root = resolve_root(cli.root);
    debug!(root = %root.display(), "using catalog root");

    let result = match cli.command {
        Some(Commands::UpdatePlugins {
            refetch_all,
            with_build,
        }) => handle_update_plugins(&root, refetch_all, with_build).await,
        Some(Commands::UpdateIdes) => handle_update_ides(&root).await,
        Some(Commands::Add { ids, channel }) => handle_add(&root, &ids, channel.as_deref()).await,
        Some(Commands::Newest { a, b }) => {
            handle_newest(&a, &b);
            Ok(())
        }
        Some(Commands::Compat {
            build,
            since,
            until,
        }) => match handle_compat(&build, since.as_deref(), until.as_deref()) {
            Ok(true) => Ok(()),
            Ok(false) => return ExitCode::FAILURE,
            Err(e) => Err(e),
        },
        Some(Commands::Config { action }) => handle_config(action, &root),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "plugin-catalog", &mut io::stdout());
}

fn resolve_root(cli_root: Option<PathBuf>) -> PathBuf {
    if let Some(root) = cli_root {
        return root;
    }

    if let Ok(root) = std::env::var("PLUGIN_CATALOG_ROOT") {
        return PathBuf::from(root);
    }

    PathBuf::from(".")
}

fn build_updater(root: &Path) -> Result<Updater> {
    let config = Config::load(root)?;
    debug!(
        marketplace = %config.marketplace.base_url,
        concurrency = config.update.concurrency,
        chunk_size = config.update.chunk_size,
        "loaded config"
    );
    let api = MarketplaceClient::new(&config.marketplace.base_url)?;
    Ok(Updater::new(
        Arc::new(api),
        Arc::new(NixHasher::new()),
        CatalogPaths::new(root),
        &config,
    ))
}

async fn handle_update_plugins(
    root: &Path,
    refetch_all: bool,
    extra_builds: Vec<String>,
) -> Result<()> {
    let updater = build_updater(root)?;
    let options = UpdateOptions {
        refetch_all,
        extra_builds,
    };

    let summary = updater.update_plugins(&options).await?;

    print_file_diff(&summary.diff);
    println!(
        "{} {} of {} plugins resolved, {} files hashed",
        "Updated:".green(),
        summary.resolved,
        summary.plugins,
        summary.hashed
    );
    if summary.hash_failures > 0 {
        println!(
            "{} {} files could not be hashed",
            "Warning:".yellow(),
            summary.hash_failures
        );
    }
    println!("{}", updater.paths().plugins_latest.display());

    Ok(())
}

fn print_file_diff(diff: &FileDiff) {
    if !diff.removed.is_empty() {
        println!();
        println!("{}", "Removed:".red());
        for file in &diff.removed {
            println!(" - {}", file);
        }
        println!();
    }

    if !diff.added.is_empty() {
        println!();
        println!("{}", "Added:".green());
        for file in &diff.added {
            println!(" + {}", file);
        }
        println!();
    }
}

async fn handle_update_ides(root: &Path) -> Result<()> {
    let config = Config::load(root)?;
    let paths = CatalogPaths::new(root);
    let client = http::build_client()?;

    let added = update_ides(&client, &config, &paths).await?;
    println!(
        "{} {} new builds in {}",
        "Updated:".green(),
        added,
        paths.ide_versions.display()
    );

    Ok(())
}

async fn handle_add(root: &Path, ids: &[u64], channel: Option<&str>) -> Result<()> {
    let updater = build_updater(root)?;
    let summary = updater.add_plugins(ids, channel).await?;

    for id in &summary.added {
        println!("{} {}", "Added:".green(), id);
    }
    for id in &summary.already_present {
        println!("{} {} (already in catalog)", "Skipped:".yellow(), id);
    }
    for id in &summary.failed {
        println!("{} {}", "Failed:".red(), id);
    }

    Ok(())
}

fn handle_newest(a: &str, b: &str) {
    if let Some(newest) = pick_newest(Some(a), Some(b)) {
        println!("{}", newest);
    }
}

fn handle_compat(build: &str, since: Option<&str>, until: Option<&str>) -> Result<bool> {
    let compatible = is_compatible(build, since, until)?;
    let window = format!(
        "({}, {})",
        since.filter(|s| !s.is_empty()).unwrap_or("-"),
        until.filter(|s| !s.is_empty()).unwrap_or("-")
    );

    if compatible {
        println!("{} {} is inside {}", "Compatible:".green(), build, window);
    } else {
        println!("{} {} is outside {}", "Incompatible:".red(), build, window);
    }

    Ok(compatible)
}

fn handle_config(action: ConfigAction, root: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(root)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(CatalogError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(root)?;
            config.set(&key, &value)?;
            config.save(root)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(root)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(root);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(root)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
