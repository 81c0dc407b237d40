use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use quorum_client::node::NodeClient;
use quorum_client::poller::Poller;
use quorum_client::session::Session;
use quorum_core::settings::SettingKey;
use quorum_core::settings::SettingsStore;
use quorum_core::settings::ALL_SETTING_KEYS;
use quorum_core::state::DashState;
use quorum_core::state::DEFAULT_POLL_INTERVAL_SECS;

mod settings;
mod ui;

use settings::FileSettings;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("quorum {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "logout" => logout(),
        "run" => {
            let options = parse_run_args(args.collect::<Vec<_>>())?;
            run_dashboard(options)
        }
        _ => {
            print_help();
            Err(format!("unknown command: {command}").into())
        }
    }
}

struct RunOptions {
    node_url: Option<String>,
    token: Option<String>,
    poll_interval: Duration,
}

fn parse_run_args(args: Vec<String>) -> Result<RunOptions, Box<dyn std::error::Error>> {
    let mut node_url = None;
    let mut token = None;
    let mut poll_interval = Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS);
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--node" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--node requires a url".into());
                };
                node_url = Some(value.clone());
                i += 2;
            }
            "--token" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--token requires a value".into());
                };
                token = Some(value.clone());
                i += 2;
            }
            "--interval-secs" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--interval-secs requires a number".into());
                };
                let secs: u64 = value
                    .parse()
                    .map_err(|_| format!("invalid interval: {value}"))?;
                poll_interval = Duration::from_secs(secs.max(1));
                i += 2;
            }
            other => {
                return Err(format!("unsupported argument: {other}").into());
            }
        }
    }
    Ok(RunOptions {
        node_url,
        token,
        poll_interval,
    })
}

fn logout() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = FileSettings::open(settings_path()?)?;
    for key in ALL_SETTING_KEYS {
        settings.clear(key)?;
    }
    println!("cleared saved connection settings");
    Ok(())
}

fn run_dashboard(options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let mut settings = FileSettings::open(settings_path()?)?;

    let node_url = options
        .node_url
        .or_else(|| settings.get(SettingKey::NodeUrl))
        .ok_or("no node url: pass --node or log in once")?;
    let token = options
        .token
        .or_else(|| env::var("QUORUM_TOKEN").ok())
        .ok_or("no access token: pass --token or set QUORUM_TOKEN")?;

    let session = Session::from_token(&token)?;
    settings.set(SettingKey::NodeUrl, &node_url)?;
    settings.set(SettingKey::ContextId, session.context_id())?;
    info!(context_id = session.context_id(), "session established");

    let state = DashState::new(session.identity());
    let client = NodeClient::new(&node_url, session)?;

    let (events_tx, events_rx) = mpsc::channel();
    let (selection_tx, selection_rx) = watch::channel(None);
    let (commands_tx, commands_rx) = tokio::sync::mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();

    let worker = {
        let client = client.clone();
        let shutdown = shutdown.clone();
        let poll_events = events_tx.clone();
        let poll_interval = options.poll_interval;
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            runtime.block_on(async move {
                let poller = Poller::new(
                    client.clone(),
                    poll_interval,
                    selection_rx,
                    shutdown.clone(),
                );
                let polling = tokio::spawn(poller.run(poll_events.clone()));
                let commanding = tokio::spawn(quorum_client::commands::run_commands(
                    client,
                    commands_rx,
                    poll_events,
                    shutdown,
                ));
                let _ = polling.await;
                let _ = commanding.await;
            });
        })
    };
    drop(events_tx);

    let result = ui::run(state, node_url, events_rx, selection_tx, commands_tx);

    shutdown.cancel();
    let _ = worker.join();
    result
}

fn settings_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base = dirs::config_dir().ok_or("no config directory on this platform")?;
    Ok(base.join("quorum").join("settings.toml"))
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    // The terminal belongs to the dashboard, so logs go to a file.
    let base = dirs::config_dir().ok_or("no config directory on this platform")?;
    let dir = base.join("quorum");
    fs::create_dir_all(&dir)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("quorum.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quorum_client=debug".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn print_help() {
    println!("quorum - terminal dashboard for context governance proposals");
    println!();
    println!("USAGE:");
    println!("  quorum run [--node URL] [--token JWT] [--interval-secs N]");
    println!("  quorum logout");
    println!("  quorum help");
    println!("  quorum version");
    println!();
    println!("The access token may also be supplied via QUORUM_TOKEN.");
    println!("Node url and context id are remembered between runs.");
}
