//! WanderWise — supervisor entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags and load config
//!   3. Init logger at the effective level
//!   4. Register planner, chat and management on the supervisor bus
//!   5. Start comms channels and wait for shutdown

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;
use tracing::info;

use wanderwise::config::{self, Config};
use wanderwise::error::AppError;
use wanderwise::logger;
use wanderwise::subsystems::chat::ChatSubsystem;
use wanderwise::subsystems::comms;
use wanderwise::subsystems::events::EventHub;
use wanderwise::subsystems::management::{ManagementInfo, ManagementSubsystem};
use wanderwise::subsystems::planner::PlannerSubsystem;
use wanderwise::supervisor;
use wanderwise::supervisor::bus::SupervisorBus;
use wanderwise::supervisor::component_info::ComponentInfo;
use wanderwise::supervisor::control::SupervisorControl;
use wanderwise::supervisor::dispatch::BusHandler;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;

    if !args.interactive {
        config.comms.pty.enabled = false;
    }

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    let force_cli_level = args.log_level.is_some();

    logger::init(effective_log_level, force_cli_level, config.log_file.as_deref())?;

    info!(
        app_name = %config.app_name,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        interactive = %args.interactive,
        "config loaded"
    );

    let shutdown = CancellationToken::new();
    let events = Arc::new(EventHub::new());

    let bus = SupervisorBus::new(64);
    let control = SupervisorControl::new(32);

    let bus_handle = bus.handle.clone();
    let control_handle = control.handle.clone();

    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let comms_info: Arc<OnceLock<ComponentInfo>> = Arc::new(OnceLock::new());

    let handlers: Vec<Box<dyn BusHandler>> = vec![
        Box::new(ManagementSubsystem::new(
            control_handle,
            ManagementInfo {
                app_name: config.app_name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                map_configured: config.map_api_key.is_some(),
            },
        )),
        Box::new(PlannerSubsystem::from_config(&config, events.clone())),
        Box::new(ChatSubsystem::from_config(&config, bus_handle.clone(), events.clone())),
    ];

    let sup_token = shutdown.clone();
    let sup_info = comms_info.clone();
    let sup_handle = tokio::spawn(async move {
        supervisor::run(bus, control, sup_token, handlers, sup_info).await;
    });

    print_startup_summary(&config, args.interactive);

    let any_channel = config.comms_pty_should_load() || config.comms_http_should_load();
    let comms = comms::start(&config, bus_handle, events, shutdown.clone(), comms_info);
    if !any_channel {
        shutdown.cancelled().await;
    }
    let comms_result = comms.join().await;

    shutdown.cancel();
    sup_handle.await.ok();

    if args.interactive {
        use std::io::Write as _;
        println!("\nBye :) ...");
        let _ = std::io::stdout().flush();
    }

    comms_result
}

fn print_startup_summary(config: &Config, interactive: bool) {
    let mode = if interactive { "interactive" } else { "daemon" };
    let http = if config.comms_http_should_load() {
        format!("http://{}/api", config.comms.http.bind)
    } else {
        "disabled".to_string()
    };
    let map = if config.map_api_key.is_some() { "key configured" } else { "no key (text route only)" };

    println!("┌─ {} ─ pid {} ─ {mode}", config.app_name, std::process::id());
    println!("│ http      {http}");
    println!("│ map       {map}");
    println!(
        "│ delays    reply {} ms, plan update {} ms",
        config.chat.reply_delay_ms, config.planner.update_delay_ms
    );
    println!("└─");
}

// ── CLI ───────────────────────────────────────────────────────────────────────

struct CliArgs {
    log_level: Option<&'static str>,
    interactive: bool,
    config_path: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut interactive = false;
    let mut config_path = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: wanderwise [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -i, --interactive          Run with the console channel");
                println!("  -f, --config <PATH>        Configuration file (default: config/default.toml)");
                println!("  -v, -vv, -vvv              Increase logging verbosity");
                std::process::exit(0);
            }
            "-i" | "--interactive" => interactive = true,
            "-f" | "--config" => {
                if let Some(path) = iter.next() {
                    config_path = Some(path);
                } else {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    CliArgs {
        log_level: logger::verbosity_level(verbosity),
        interactive,
        config_path,
    }
}
