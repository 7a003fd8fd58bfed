//! Keystate Tracker - command line front end
//!
//! `list` and `listdevs` show input devices, `input` follows the keys held on
//! one device until the exit key is long-pressed.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, error, info};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use keystate_tracker::config::{self, Config};
use keystate_tracker::keyboard::{DeviceInfo, InputDeviceSource, SearchCriteria};

#[cfg(target_os = "linux")]
use keystate_tracker::keyboard::{
    sort_by_path, ActiveKeys, DeviceCatalog, EvdevEnumerator, KeyState, KeyStateEngine, LoopExit,
};
#[cfg(target_os = "linux")]
use keystate_tracker::monitor::{select_single_device, KeyMonitor};

/// Follow the keys held on a Linux input device
#[derive(Parser, Debug)]
#[command(name = "keystate")]
#[command(version)]
#[command(about = "Follow the keys held on a Linux input device", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List key-capable devices whose name contains every keyword
    List {
        keywords: Vec<String>,

        /// Print JSON records instead of text
        #[arg(long)]
        json: bool,
    },
    /// List every input device, key-capable or not
    Listdevs,
    /// Print key transitions of the single device matching the keywords
    Input {
        keywords: Vec<String>,

        /// Show repeat
        #[arg(short, long)]
        repeat: bool,
    },
    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    };
    init_logging(args.debug, &config);
    debug!("args={:?}", args);

    if let Err(e) = ctrlc::set_handler(|| {
        info!("interrupted");
        process::exit(130);
    }) {
        debug!("cannot install Ctrl-C handler: {}", e);
    }

    if let Err(e) = run(args, config) {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Config::load().context("Failed to load config"),
    }
}

fn init_logging(debug: bool, config: &Config) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    );
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn run(args: Args, config: Config) -> Result<()> {
    match args.command {
        Command::InitConfig { force } => {
            let path = match args.config {
                Some(path) => path,
                None => config::config_path()?,
            };
            init_config(&path, force)
        }
        Command::List { keywords, json } => list(&config, keywords, json),
        Command::Listdevs => listdevs(&config),
        Command::Input { keywords, repeat } => input(&config, keywords, repeat),
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default()
        .save_to(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn criteria_for(config: &Config, keywords: Vec<String>) -> SearchCriteria {
    if keywords.is_empty() {
        SearchCriteria::new(config.devices.default_keywords.iter().cloned())
    } else {
        SearchCriteria::new(keywords)
    }
}

fn print_devices<D: InputDeviceSource>(devices: &[D], json: bool) -> Result<()> {
    let infos: Vec<DeviceInfo> = devices.iter().map(DeviceInfo::from_source).collect();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &infos)?;
        writeln!(out)?;
    } else {
        for info in &infos {
            writeln!(out, "{}", info)?;
        }
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn catalog(config: &Config) -> DeviceCatalog<EvdevEnumerator> {
    DeviceCatalog::new(EvdevEnumerator::new(&config.devices.input_dir))
}

#[cfg(target_os = "linux")]
fn list(config: &Config, keywords: Vec<String>, json: bool) -> Result<()> {
    let criteria = criteria_for(config, keywords);
    let mut devices = catalog(config).search_devices(&criteria)?;
    sort_by_path(&mut devices);
    print_devices(&devices, json)
}

#[cfg(target_os = "linux")]
fn listdevs(config: &Config) -> Result<()> {
    let mut devices = catalog(config).list_input_devices()?;
    sort_by_path(&mut devices);
    print_devices(&devices, false)
}

#[cfg(target_os = "linux")]
fn input(config: &Config, keywords: Vec<String>, repeat: bool) -> Result<()> {
    let criteria = criteria_for(config, keywords);
    if criteria.is_empty() {
        bail!("no search keywords");
    }

    let devices = catalog(config).search_devices(&criteria)?;
    let mut device = match select_single_device(devices, &criteria) {
        Ok(device) => device,
        Err(e) => {
            // Nothing to read from; not a failure of the tool itself
            error!("{}", e);
            eprintln!("{}", e);
            return Ok(());
        }
    };

    println!("input_dev: {}", DeviceInfo::from_source(&device));
    let stdout = io::stdout();
    let mut monitor = KeyMonitor::new(stdout.lock(), &config.monitor)
        .with_repeat(repeat || config.monitor.show_repeat);
    println!("{}", monitor.exit_hint());

    let mut engine = KeyStateEngine::new();
    let exit = engine
        .run_read_loop(
            &mut device,
            Some(|name: &str, state: KeyState, keys: &ActiveKeys| {
                monitor.on_key_event(name, state, keys)
            }),
        )
        .with_context(|| format!("Reading {} failed", device.path().display()))?;

    match exit {
        LoopExit::EndOfStream => info!("{}: end of stream", device.path().display()),
        LoopExit::Stopped | LoopExit::NoCallback => debug!("read loop ended: {:?}", exit),
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn list(_config: &Config, _keywords: Vec<String>, _json: bool) -> Result<()> {
    bail!("input devices are only supported on Linux")
}

#[cfg(not(target_os = "linux"))]
fn listdevs(_config: &Config) -> Result<()> {
    bail!("input devices are only supported on Linux")
}

#[cfg(not(target_os = "linux"))]
fn input(_config: &Config, _keywords: Vec<String>, _repeat: bool) -> Result<()> {
    bail!("input devices are only supported on Linux")
}
