use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use gdman_core::{
    Activation, EntryState, GithubClient, HttpDownloader, LatestCheck, ListEntry, ManagerError,
    ManagerEvent, ReleaseApi, ReleaseSource, Settings, Store, UninstallOutcome, VersionManager,
};
use gdman_platform::AppPaths;

use crate::prompt::{TerminalConfirm, ask};
use crate::settings::AppSettings;

#[derive(Debug, Parser)]
#[command(name = "gdman", version, about = "Manage installed Godot engine versions")]
pub struct Cli {
    /// Write a debug log next to the download cache
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show installed, downloading and available versions
    List {
        /// Skip the first-load fetch and the periodic update check
        #[arg(long)]
        offline: bool,
    },
    /// Ask the release source for its latest release
    Check {
        /// Install the new release if one is found
        #[arg(long)]
        install: bool,
        #[arg(long)]
        mono: bool,
    },
    /// Download and install a release by name
    Install {
        name: String,
        #[arg(long)]
        mono: bool,
    },
    /// Remove an installed version by id or name
    Uninstall {
        version: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Make an installed version the default engine
    Default { version: String },
    /// Register an engine build already on disk
    Add {
        tag: String,
        path: PathBuf,
        #[arg(long)]
        mono: bool,
    },
    /// Show or change settings
    Settings {
        #[arg(long)]
        check_updates: Option<bool>,
        #[arg(long)]
        interval_hours: Option<u64>,
        #[arg(long)]
        use_mono: Option<bool>,
        #[arg(long, value_enum)]
        source: Option<SourceArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Github,
    Mirror,
}

impl From<SourceArg> for ReleaseSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Github => ReleaseSource::Github,
            SourceArg::Mirror => ReleaseSource::Mirror,
        }
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn release_api(settings: &AppSettings) -> Box<dyn ReleaseApi> {
    match (settings.download_source, &settings.mirror_api_url) {
        (ReleaseSource::Mirror, Some(url)) => Box::new(GithubClient::mirror(url)),
        (ReleaseSource::Mirror, None) => {
            log::warn!("Mirror source selected without mirror_api_url, using GitHub");
            Box::new(GithubClient::new())
        }
        (ReleaseSource::Github, _) => Box::new(GithubClient::new()),
    }
}

async fn build_manager(
    paths: &AppPaths,
    settings: &AppSettings,
    assume_yes: bool,
) -> Result<VersionManager, ManagerError> {
    paths.ensure_dirs()?;
    let store = Store::load(&paths.database_file()).await?;
    let downloader = HttpDownloader::new(paths.versions_dir(), paths.downloads_dir());

    let manager = VersionManager::new(
        store,
        release_api(settings),
        Arc::new(downloader),
        Arc::new(TerminalConfirm::new(assume_yes)),
    )
    .with_use_mono(settings.use_mono);
    manager.refresh_list().await;
    Ok(manager)
}

/// Prints byte progress and alerts until the manager is dropped.
fn spawn_event_printer(manager: &VersionManager) -> tokio::task::JoinHandle<()> {
    let mut events = manager.subscribe();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ManagerEvent::Progress { bytes } => {
                    eprint!("\r  {} received", format_size(bytes));
                }
                ManagerEvent::Alert { title, message } => {
                    eprintln!("\n{}: {}", title, message);
                }
                ManagerEvent::UpdateAvailable { version, release } => {
                    println!("\nNew release available: {}", version.name);
                    if let Some(url) = release.html_url {
                        println!("  {}", url);
                    }
                }
                ManagerEvent::ListChanged => {}
            }
        }
    })
}

/// Updates the stored check policy. Without any change the database is only
/// read.
async fn apply_check_policy(
    store: &Store,
    check_updates: Option<bool>,
    interval_hours: Option<u64>,
) -> Result<Settings, ManagerError> {
    if check_updates.is_none() && interval_hours.is_none() {
        return Ok(store.read(|db| db.settings.clone()).await);
    }

    store
        .write(|db| {
            if let Some(enabled) = check_updates {
                db.settings.check_for_updates = enabled;
            }
            if let Some(hours) = interval_hours {
                db.settings.check_interval_secs = hours.saturating_mul(3600);
            }
            Ok(db.settings.clone())
        })
        .await
}

async fn resolve_id(manager: &VersionManager, key: &str) -> Result<Uuid, ManagerError> {
    manager
        .store()
        .read(|db| db.find_installed(key).map(|v| v.id))
        .await
        .ok_or_else(|| ManagerError::VersionNotFound(key.to_string()))
}

fn entry_line(entry: &ListEntry) -> String {
    let marker = if entry.is_default { "*" } else { " " };
    let id = entry
        .installed_id()
        .map(|id| id.to_string())
        .unwrap_or_default();
    match entry.state {
        EntryState::Downloading => format!("{} {} (downloading)", marker, entry.label()),
        EntryState::Uninstalling => format!("{} {} (removing)", marker, entry.label()),
        _ if id.is_empty() => format!("{} {}", marker, entry.label()),
        _ => format!("{} {}  [{}]", marker, entry.label(), id),
    }
}

fn print_list(manager: &VersionManager) {
    let list = manager.list();

    println!("Installed:");
    for entry in list.installed() {
        println!("  {}", entry_line(entry));
    }
    if !list.downloading().is_empty() {
        println!("Downloading:");
        for entry in list.downloading() {
            println!("  {}", entry_line(entry));
        }
    }
    println!("Available:");
    for entry in list.visible_available() {
        if entry.downloadable() {
            println!("  {}", entry_line(entry));
        }
    }
}

pub async fn run(cli: Cli, paths: &AppPaths, mut settings: AppSettings) -> Result<(), ManagerError> {
    let assume_yes = matches!(cli.command, Command::Uninstall { yes: true, .. });
    let manager = build_manager(paths, &settings, assume_yes).await?;
    let printer = spawn_event_printer(&manager);
    debug!("Running {:?}", cli.command);

    let result = match cli.command {
        Command::List { offline } => {
            if !offline {
                match manager.activate().await? {
                    Activation::FirstLoad { fetched } => {
                        eprintln!();
                        info!("Fetched {} releases", fetched);
                    }
                    Activation::Checked(_) => eprintln!(),
                    Activation::Idle => {}
                }
            }
            print_list(&manager);
            Ok(())
        }
        Command::Check { install, mono } => match manager.check_for_updates().await? {
            LatestCheck::UpToDate(latest) => {
                println!("\nUp to date, latest release is {}", latest.name);
                Ok(())
            }
            LatestCheck::UpdateAvailable { version, .. } => {
                let accepted = install
                    || ask(format!("Install {}?", version.display_name(mono))).await;
                if accepted {
                    let installed = manager.install_update(&version.name, mono).await?;
                    println!("\nInstalled {}", installed.display_name());
                }
                Ok(())
            }
        },
        Command::Install { name, mono } => {
            let installed = manager.install(&name, mono).await?;
            println!("\nInstalled {} at {}", installed.display_name(), installed.location.display());
            Ok(())
        }
        Command::Uninstall { version, .. } => {
            let id = resolve_id(&manager, &version).await?;
            match manager.uninstall(id).await? {
                UninstallOutcome::Declined => println!("Nothing removed"),
                UninstallOutcome::Removed {
                    detached_projects,
                    removal_failures,
                } => {
                    println!("Removed {}", version);
                    if detached_projects > 0 {
                        println!("{} project(s) no longer have an engine", detached_projects);
                    }
                    for failure in removal_failures {
                        eprintln!("  {}", failure);
                    }
                }
            }
            Ok(())
        }
        Command::Default { version } => {
            let id = resolve_id(&manager, &version).await?;
            if manager.set_default(id).await? {
                println!("{} is now the default engine", version);
            } else {
                println!("{} is already the default engine", version);
            }
            Ok(())
        }
        Command::Add { tag, path, mono } => {
            let added = manager.add_custom(&tag, path, mono).await?;
            println!("Added {}  [{}]", added.display_name(), added.id);
            Ok(())
        }
        Command::Settings {
            check_updates,
            interval_hours,
            use_mono,
            source,
        } => {
            let db_settings =
                apply_check_policy(manager.store(), check_updates, interval_hours).await?;

            if use_mono.is_some() || source.is_some() {
                if let Some(use_mono) = use_mono {
                    settings.use_mono = use_mono;
                }
                if let Some(source) = source {
                    settings.download_source = source.into();
                }
                settings.save(paths)?;
            }

            println!("check_for_updates = {}", db_settings.check_for_updates);
            println!(
                "interval_hours    = {}",
                db_settings.check_interval_secs / 3600
            );
            match db_settings.last_check {
                Some(at) => println!("last_check        = {}", at.to_rfc3339()),
                None => println!("last_check        = never"),
            }
            println!("use_mono          = {}", settings.use_mono);
            println!("download_source   = {}", settings.download_source);
            Ok(())
        }
    };

    drop(manager);
    let _ = printer.await;
    result
}
