//! PTY (console) comms channel.
//!
//! Free text is a chat turn; lines starting with `/` are commands. Agent
//! replies, toasts and itinerary updates are printed as they arrive on the
//! event hub. All supervisor communication goes through [`CommsState`].

use std::fmt::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{CommsEvent, CommsState};
use crate::error::AppError;
use crate::subsystems::chat::Sender;
use crate::subsystems::events::ShellEvent;
use crate::subsystems::planner::map::MapView;
use crate::subsystems::planner::model::TravelFilters;
use crate::subsystems::planner::store::ItinerarySnapshot;
use crate::subsystems::runtime::{Component, ComponentFuture};

const HELP: &str = "\
commands:
  /regenerate             shuffle the itinerary
  /itinerary              show the current plan
  /map                    show markers and route
  /select <name>          show one location
  /filters [key=value…]   show or change filters (budget, adventure, culture, luxury, date)
  /export                 download the itinerary as PDF
  /status                 health summary
  /help                   this text
  /quit                   exit
anything else is sent to the travel assistant";

// ── Commands ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PtyCommand {
    Chat(String),
    Regenerate,
    Itinerary,
    Map,
    Select(String),
    Filters(Vec<(String, String)>),
    Export,
    Status,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Option<PtyCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Some(PtyCommand::Chat(line.to_string()));
    };
    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let args = args.trim();
    let cmd = match name {
        "regenerate" => PtyCommand::Regenerate,
        "itinerary" => PtyCommand::Itinerary,
        "map" => PtyCommand::Map,
        "select" if !args.is_empty() => PtyCommand::Select(args.to_string()),
        "filters" => PtyCommand::Filters(
            args.split_whitespace()
                .map(|pair| match pair.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (pair.to_string(), String::new()),
                })
                .collect(),
        ),
        "export" => PtyCommand::Export,
        "status" => PtyCommand::Status,
        "help" => PtyCommand::Help,
        "quit" | "exit" => PtyCommand::Quit,
        _ => PtyCommand::Unknown(trimmed.to_string()),
    };
    Some(cmd)
}

// ── Rendering ────────────────────────────────────────────────────────────────

pub fn render_itinerary(snapshot: &ItinerarySnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Your Sri Lanka itinerary (revision {})", snapshot.generation);
    for item in &snapshot.itinerary {
        let _ = writeln!(
            out,
            "  Day {}  {} [{}/{}]",
            item.day,
            item.location,
            item.category,
            item.category.colour()
        );
        let _ = writeln!(out, "    activities: {}", item.activities.join(", "));
        let _ = writeln!(out, "    stay: {} ({})", item.accommodation, item.duration);
    }
    if !snapshot.preferences.is_empty() {
        let _ = writeln!(out, "  preferences: {}", snapshot.preferences.join(" | "));
    }
    out
}

pub fn render_map(view: &MapView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Map centred on {:.4}, {:.4}", view.center.lat, view.center.lng);
    if !view.has_api_key {
        let _ = writeln!(out, "  (no MAP_API_KEY set; showing the route as text)");
    }
    for m in &view.markers {
        let _ = writeln!(out, "  {}. {} ({:.4}, {:.4})", m.day, m.name, m.position.lat, m.position.lng);
    }
    let _ = writeln!(out, "  {} route segment(s)", view.route.len());
    out
}

fn render_filters(f: &TravelFilters) -> String {
    let date = f.date.map(|d| d.to_string()).unwrap_or_else(|| "any".to_string());
    format!(
        "budget ${}/day, adventure {}/5, culture {}, luxury {}, date {}",
        f.budget,
        f.adventure_level,
        if f.cultural_interest { "on" } else { "off" },
        if f.luxury_travel { "on" } else { "off" },
        date
    )
}

/// Line(s) printed for a hub event, or `None` for events the console
/// already showed (the user's own messages).
pub fn render_event(event: &ShellEvent) -> Option<String> {
    match event {
        ShellEvent::ChatMessage(m) if m.sender == Sender::Agent => Some(format!("wanderwise: {}", m.text)),
        ShellEvent::ChatMessage(_) => None,
        ShellEvent::Notification(n) => Some(format!("[{}] {}", n.title, n.description)),
        ShellEvent::ItineraryUpdated(snapshot) => Some(render_itinerary(snapshot)),
    }
}

// ── PtyChannel ───────────────────────────────────────────────────────────────

pub struct PtyChannel {
    channel_id: String,
    state: Arc<CommsState>,
}

impl PtyChannel {
    pub fn new(channel_id: impl Into<String>, state: Arc<CommsState>) -> Self {
        Self { channel_id: channel_id.into(), state }
    }
}

impl Component for PtyChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_pty(self.channel_id, self.state, shutdown))
    }
}

// ── run_pty ──────────────────────────────────────────────────────────────────

async fn execute(
    channel_id: &str,
    state: &CommsState,
    cmd: PtyCommand,
    shutdown: &CancellationToken,
) -> Result<(), AppError> {
    match cmd {
        PtyCommand::Chat(text) => {
            // The reply and the plan refresh arrive later on the event hub.
            if state.send_chat(channel_id, text).await?.is_some() {
                println!("(thinking…)");
            }
        }
        PtyCommand::Regenerate => {
            state.regenerate().await?;
        }
        PtyCommand::Itinerary => print!("{}", render_itinerary(&state.itinerary().await?)),
        PtyCommand::Map => print!("{}", render_map(&state.map_view().await?)),
        PtyCommand::Select(name) => match state.select_location(&name).await? {
            Some(loc) => println!(
                "{} (day {}) at {:.4}, {:.4}",
                loc.name,
                loc.day.map(|d| d.to_string()).unwrap_or_else(|| "?".into()),
                loc.lat,
                loc.lng
            ),
            None => println!("no location named {name:?} on the map"),
        },
        PtyCommand::Filters(pairs) => {
            let mut filters = state.filters().await?;
            if !pairs.is_empty() {
                for (k, v) in &pairs {
                    if let Err(e) = filters.apply_pair(k, v) {
                        println!("{e}");
                        return Ok(());
                    }
                }
                filters = state.set_filters(filters).await?;
            }
            println!("{}", render_filters(&filters));
        }
        PtyCommand::Export => {
            state.export().await?;
        }
        PtyCommand::Status => println!("{}", state.management_health().await?),
        PtyCommand::Help => println!("{HELP}"),
        PtyCommand::Quit => {
            info!(%channel_id, "quit requested from console");
            shutdown.cancel();
        }
        PtyCommand::Unknown(line) => println!("unknown command: {line} (try /help)"),
    }
    Ok(())
}

async fn run_pty(channel_id: String, state: Arc<CommsState>, shutdown: CancellationToken) -> Result<(), AppError> {
    info!(%channel_id, "pty channel started");
    println!("─────────────────────────────────────────");
    println!(" WanderWise, Sri Lanka  (/help, Ctrl-C to quit)");
    println!("─────────────────────────────────────────");

    let mut events = state.subscribe_events();
    if let Ok((messages, _)) = state.transcript().await {
        for m in messages {
            println!("wanderwise: {}", m.text);
        }
    }
    state.report_event(CommsEvent::SessionStarted { channel_id: channel_id.clone() });

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("pty channel shutting down");
                break;
            }

            event = events.recv() => {
                match event {
                    Ok(seq) => {
                        if let Some(text) = render_event(&seq.event) {
                            println!("{text}");
                        }
                    }
                    Err(RecvError::Lagged(n)) => warn!(skipped = n, "pty fell behind on shell events"),
                    Err(RecvError::Closed) => {
                        debug!("event hub closed");
                        break;
                    }
                }
            }

            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("pty read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("pty stdin closed");
                        break;
                    }
                    Ok(Some(input)) => {
                        let Some(cmd) = parse_command(&input) else { continue };
                        debug!(?cmd, "pty command");
                        if let Err(e) = execute(&channel_id, &state, cmd, &shutdown).await {
                            warn!("pty command failed: {e}");
                            println!("error: {e}");
                        }
                    }
                }
            }
        }
    }

    state.report_event(CommsEvent::ChannelShutdown { channel_id });
    Ok(())
}
