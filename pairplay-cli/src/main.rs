use clap::{Parser, Subcommand};
use pairplay_cli::{
    ClientConfig, LinkStatus, LogConfig, Result, SessionEvent, SessionHandle,
    SessionRuntime, WebSocketTransport,
};
use pairplay_core::{CallEvent, RoomCode, RoomEvent};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "pairplay")]
#[command(version, about = "PairPlay relay client - rooms, calls and game sync from the terminal")]
struct Cli {
    /// Relay server URL
    #[arg(short = 's', long, global = true, env = "PAIRPLAY_SERVER", default_value = "ws://localhost:3001")]
    server: String,

    /// WebSocket path on the relay
    #[arg(long, global = true, default_value = "/ws")]
    path: String,

    /// Heartbeat interval in seconds
    #[arg(long, global = true, default_value_t = 25)]
    heartbeat_secs: u64,

    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Write a Chrome trace (needs the `chrome-trace` feature)
    #[arg(long, global = true)]
    chrome_trace: bool,

    /// Print room, call and game events as JSON on stdout
    #[arg(long, global = true)]
    json_events: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new room as host
    Create {
        /// Display name
        #[arg(short = 'n', long, default_value = "Host")]
        name: String,

        #[arg(long)]
        avatar: Option<String>,
    },

    /// Join an existing room
    Join {
        /// Room code to join
        #[arg(short = 'c', long)]
        code: String,

        /// Display name
        #[arg(short = 'n', long, default_value = "Guest")]
        name: String,

        #[arg(long)]
        avatar: Option<String>,
    },

    /// Register for calls and optionally call someone
    Call {
        /// Character to register as
        #[arg(long)]
        character: String,

        /// Display name
        #[arg(short = 'n', long, default_value = "Caller")]
        name: String,

        /// Character to call
        #[arg(short = 't', long)]
        target: Option<String>,

        /// Accept incoming calls automatically
        #[arg(long)]
        auto_accept: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = ClientConfig::new(cli.server.clone())
        .with_path(cli.path.clone())
        .with_heartbeat_interval(Duration::from_secs(cli.heartbeat_secs));
    config.validate()?;

    let runtime = SessionRuntime::spawn(WebSocketTransport, config);
    let handle = runtime.handle();
    let events = handle.subscribe();

    info!("Connecting to {}", cli.server);
    handle.connect().await?;
    info!("✓ Connected");

    let auto_accept = match &cli.command {
        Commands::Create { name, avatar } => {
            handle.create_room(name.clone(), avatar.clone())?;
            false
        }
        Commands::Join { code, name, avatar } => {
            handle.join_room(RoomCode::new(code.as_str()), name.clone(), avatar.clone())?;
            false
        }
        Commands::Call {
            character,
            name,
            target,
            auto_accept,
        } => {
            handle.register_call(character.clone(), name.clone()).await?;
            info!("📇 Registered as {}", character);
            if let Some(target) = target {
                handle.initiate_call(target.clone()).await?;
            }
            *auto_accept
        }
    };

    info!("Press Ctrl+C to exit");
    let outcome = run_event_loop(&handle, events, auto_accept, cli.json_events).await;

    info!("Shutting down...");
    runtime.shutdown().await;
    outcome
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut log = if cli.verbose {
        LogConfig::dev()
    } else {
        LogConfig::default()
    };
    if cli.json_logs {
        log = log.with_json();
    }
    if cli.chrome_trace {
        log = log.with_chrome_trace();
    }
    log.init()
}

async fn run_event_loop(
    handle: &SessionHandle,
    mut events: broadcast::Receiver<SessionEvent>,
    auto_accept: bool,
    json_events: bool,
) -> Result<()> {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if json_events {
                        print_json(&event)?;
                    }
                    if !handle_event(handle, event, auto_accept).await? {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

/// Returns false once the session is over
async fn handle_event(handle: &SessionHandle, event: SessionEvent, auto_accept: bool) -> Result<bool> {
    match event {
        SessionEvent::Link(LinkStatus::Opened { rejoined }) => {
            info!("🟢 Link open{}", if rejoined { " (rejoining room)" } else { "" });
        }
        SessionEvent::Link(LinkStatus::Reconnecting { attempt, delay }) => {
            warn!("🟡 Link lost, attempt {} in {:?}", attempt, delay);
        }
        SessionEvent::Link(LinkStatus::Closed { code }) => {
            info!("🔴 Link closed ({:?})", code);
        }
        SessionEvent::Link(LinkStatus::GaveUp) => {
            warn!("🔴 Relay unreachable, giving up");
            return Ok(false);
        }
        SessionEvent::Room(RoomEvent::Created { room_code, .. }) => {
            info!("📋 Room code: {}", room_code);
            info!("Share this command with your partner:");
            info!("  pairplay join --code {}", room_code);
        }
        SessionEvent::Room(RoomEvent::RosterChanged { players }) => {
            let names: Vec<_> = players.iter().map(|p| p.display_name.as_str()).collect();
            info!("👥 Players: {}", names.join(", "));
        }
        SessionEvent::Room(RoomEvent::PlayerLeft {
            player_name,
            local: true,
            ..
        }) => {
            warn!("👋 {} left the room", player_name.unwrap_or_default());
            return Ok(false);
        }
        SessionEvent::Room(RoomEvent::Error { message }) => {
            warn!("⚠️ Room error: {}", message);
        }
        SessionEvent::Room(event) => info!("🏠 {:?}", event),
        SessionEvent::Call(CallEvent::Incoming { from, from_name }) => {
            info!("📞 Incoming call from {} ({:?})", from, from_name);
            if auto_accept {
                handle.accept_call().await?;
            }
        }
        SessionEvent::Call(event) => info!("📞 {:?}", event),
        SessionEvent::Rtc(message) => info!("🎥 {}", message.tag()),
        SessionEvent::Game(event) => info!("🎲 {:?}", event),
    }
    Ok(true)
}

fn print_json(event: &SessionEvent) -> Result<()> {
    let value = match event {
        SessionEvent::Room(event) => serde_json::to_value(event)?,
        SessionEvent::Call(event) => serde_json::to_value(event)?,
        SessionEvent::Game(event) => serde_json::to_value(event)?,
        SessionEvent::Rtc(message) => serde_json::to_value(message)?,
        SessionEvent::Link(status) => serde_json::json!({ "link": format!("{:?}", status) }),
    };
    println!("{}", value);
    Ok(())
}
