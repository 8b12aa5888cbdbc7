mod frontend;
mod logging;
mod probe;
mod sampler;
mod supervisor;
mod ui;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::signal::unix::{SignalKind, signal};

use tvdeck_core::config::{ConfigError, LauncherConfig};
use tvdeck_core::model::TelemetrySnapshot;
use tvdeck_core::scheduler::{LocalClock, Menu, Scheduler, Tick};
use tvdeck_core::telemetry::{self, TelemetryCollector};

use frontend::TerminalFrontend;
use probe::SystemLoad;
use sampler::spawn_sampler;
use supervisor::ProcessSupervisor;
use ui::assets::Assets;
use ui::theme::Theme;

type Launcher = Scheduler<TerminalFrontend, ProcessSupervisor, LocalClock>;

#[derive(Parser)]
#[command(name = "tvdeck")]
#[command(about = "Fullscreen media-center launcher for TV kiosks", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: search the standard locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Append logs to this file (overrides log_file from the config)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Wallpaper image (overrides wallpaper from the config)
    #[arg(long, global = true)]
    wallpaper: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the launcher (default)
    Run,
    /// Sample system load and print it
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as YAML
    Config,
}

fn load_config(cli: &Cli) -> Result<(Option<PathBuf>, LauncherConfig), ConfigError> {
    let (source, mut config) = match &cli.config {
        Some(path) => (Some(path.clone()), LauncherConfig::load(path)?),
        None => LauncherConfig::discover(&LauncherConfig::search_paths())?,
    };

    if let Some(wallpaper) = &cli.wallpaper {
        config.wallpaper = Some(wallpaper.clone());
    }
    if let Some(log_file) = &cli.log_file {
        config.log_file = Some(log_file.clone());
    }

    Ok((source, config))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (source, config) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(config.log_file.as_deref()) {
        eprintln!("Warning: cannot open log file, logging disabled: {}", e);
    }
    match &source {
        Some(path) => tracing::info!(path = %path.display(), "config loaded"),
        None => tracing::info!("no config file found, using built-in menu"),
    }

    match cli.command {
        Some(Commands::Stats { json }) => run_stats(&config, json).await,
        Some(Commands::Config) => print_config(&config),
        Some(Commands::Run) | None => run_launcher(&config).await,
    }
}

// --- Launcher ---

/// Put the terminal back before the default hook prints the panic.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        frontend::reset_terminal();
        default_hook(info);
    }));
}

async fn run_launcher(config: &LauncherConfig) -> ExitCode {
    let (publisher, feed) = telemetry::channel();
    let sampler = spawn_sampler(
        SystemLoad::new(&config.thermal_zone),
        publisher,
        config.sample_interval(),
    );

    let assets = Assets::build(config, Theme::default());
    if assets.backdrop.is_gradient() {
        tracing::debug!("drawing generated gradient backdrop");
    }

    install_panic_hook();
    let frontend = match TerminalFrontend::new(assets, config.apps.len()) {
        Ok(frontend) => frontend,
        Err(e) => {
            frontend::reset_terminal();
            sampler.stop().await;
            eprintln!("Error: failed to set up terminal: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut scheduler = Scheduler::new(
        Menu::from_config(config),
        frontend,
        ProcessSupervisor::new(),
        LocalClock,
        feed,
    );
    tracing::info!(apps = config.apps.len(), "launcher started");

    let outcome = drive(&mut scheduler).await;

    let restored = scheduler.into_frontend().restore();
    sampler.stop().await;

    if let Err(e) = restored {
        eprintln!("Error: failed to restore terminal: {}", e);
    }
    match outcome {
        Ok(()) => {
            tracing::info!("launcher stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "launcher loop failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Tick the scheduler until it asks to quit or a termination signal arrives.
async fn drive(scheduler: &mut Launcher) -> io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    loop {
        let wait = match scheduler.tick()? {
            Tick::Quit => {
                tracing::info!("quit requested");
                return Ok(());
            }
            Tick::Idle(wait) => wait,
        };

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = sigterm.recv() => {
                tracing::info!("SIGTERM received");
                return Ok(());
            }
            _ = sigint.recv() => {
                tracing::info!("SIGINT received");
                return Ok(());
            }
            _ = sighup.recv() => {
                tracing::info!("SIGHUP received");
                return Ok(());
            }
        }
    }
}

// --- Subcommands ---

async fn run_stats(config: &LauncherConfig, json: bool) -> ExitCode {
    let mut collector = TelemetryCollector::new(SystemLoad::new(&config.thermal_zone));
    // CPU usage needs two readings one interval apart
    collector.sample();
    tokio::time::sleep(config.sample_interval()).await;
    let snapshot = collector.sample();

    if json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", format_stats(&snapshot));
    }
    ExitCode::SUCCESS
}

fn format_stats(s: &TelemetrySnapshot) -> String {
    format!(
        "CPU   {:>3}%\nRAM   {:>3}%\nTEMP  {:>3}°C\nDISK  {:>3}%\n",
        s.cpu_percent, s.mem_percent, s.temp_celsius, s.disk_percent
    )
}

fn print_config(config: &LauncherConfig) -> ExitCode {
    match serde_yaml::to_string(config) {
        Ok(out) => {
            print!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flag_overrides() {
        let dir = std::env::temp_dir().join(format!("tvdeck-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(
            &path,
            "apps:\n  - name: Kodi\n    command: kodi\nwallpaper: /srv/a.png\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "tvdeck",
            "--config",
            path.to_str().unwrap(),
            "--wallpaper",
            "/srv/b.png",
            "stats",
            "--json",
        ]);
        let (source, config) = load_config(&cli).unwrap();
        assert_eq!(source.as_deref(), Some(path.as_path()));
        assert_eq!(config.wallpaper, Some(PathBuf::from("/srv/b.png")));
        assert_eq!(config.apps.len(), 1);
        assert!(matches!(cli.command, Some(Commands::Stats { json: true })));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let cli = Cli::parse_from(["tvdeck", "--config", "/nonexistent/tvdeck.yaml"]);
        assert!(matches!(load_config(&cli), Err(ConfigError::Io(_))));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_plain_stats_output() {
        let out = format_stats(&TelemetrySnapshot {
            cpu_percent: 7,
            mem_percent: 41,
            temp_celsius: 52,
            disk_percent: 100,
        });
        assert_eq!(out, "CPU     7%\nRAM    41%\nTEMP   52°C\nDISK  100%\n");
    }
}
