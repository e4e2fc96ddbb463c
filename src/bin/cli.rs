//! GLS CLI Client
//!
//! Command-line interface for talking to a GLS server.

use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use glsclient::{
    PollEvent, Position, PositionPoller, Session, SessionConfig, SharedSession, Waypoint,
};
use tracing_subscriber::{fmt, EnvFilter};

/// GLS CLI
#[derive(Parser, Debug)]
#[command(name = "gls-cli")]
#[command(about = "CLI for the GPS Location Sharing server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "47757")]
    port: u16,

    /// Login name
    #[arg(short, long, default_value = "CathodioN")]
    user: String,

    /// Login password (omit to log in without one)
    #[arg(short = 's', long)]
    password: Option<String>,

    /// Device name to register
    #[arg(short, long, default_value = "DummyDevice")]
    device: String,

    /// Group used by `join` without an argument and by `watch`
    #[arg(short, long, default_value = "OpenMoko")]
    group: String,

    /// Protocol version to negotiate
    #[arg(long, default_value = glsclient::PROTOCOL_VERSION)]
    protocol_version: String,

    /// Socket read/write timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the server answers
    Ping,

    /// List the available groups
    Groups,

    /// Join a group
    Join {
        /// Group to join (defaults to --group)
        group: Option<String>,
    },

    /// Publish a position
    SendPosition {
        latitude: f64,
        longitude: f64,
        altitude: f64,
        speed: f64,
        bearing: f64,
    },

    /// Publish a waypoint
    SendWaypoint {
        latitude: f64,
        longitude: f64,
        altitude: f64,
        name: String,
    },

    /// Show the positions of the other group members
    Positions,

    /// Show the waypoints of the other group members
    Waypoints,

    /// Poll positions periodically
    Watch {
        /// Seconds between two polls
        #[arg(short, long, default_value = "5")]
        interval_secs: u64,

        /// Number of polls (0 = until interrupted)
        #[arg(short, long, default_value = "0")]
        count: usize,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,glsclient=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = SessionConfig::builder()
        .host(&args.host)
        .port(args.port)
        .protocol_version(&args.protocol_version)
        .client_name(&args.user)
        .password(args.password.clone())
        .device_name(&args.device)
        .group_name(&args.group)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    tracing::debug!("Session config: {:?}", config);

    let session = match Session::new(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(session, args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(mut session: Session, command: Commands) -> glsclient::Result<()> {
    match command {
        Commands::Ping => {
            session.test_connection()?;
            println!(
                "OK (server version: {})",
                session.server_version().unwrap_or("unknown")
            );
        }
        Commands::Groups => {
            for group in session.request_groups()? {
                println!("{}", group);
            }
        }
        Commands::Join { group } => {
            match group {
                Some(group) => session.join_group(&group)?,
                None => session.join_configured_group()?,
            }
            println!("OK");
        }
        Commands::SendPosition {
            latitude,
            longitude,
            altitude,
            speed,
            bearing,
        } => {
            session.join_configured_group()?;
            session.send_position(&Position::new(latitude, longitude, altitude, speed, bearing))?;
            println!("OK");
        }
        Commands::SendWaypoint {
            latitude,
            longitude,
            altitude,
            name,
        } => {
            session.join_configured_group()?;
            session.send_waypoint(&Waypoint::new(latitude, longitude, altitude, name))?;
            println!("OK");
        }
        Commands::Positions => {
            session.join_configured_group()?;
            let mut positions: Vec<_> = session.request_positions()?.into_iter().collect();
            positions.sort_by(|a, b| a.0.cmp(&b.0));
            for (owner, position) in positions {
                println!("{}: {}", owner, position);
            }
        }
        Commands::Waypoints => {
            session.join_configured_group()?;
            let mut waypoints: Vec<_> = session.request_waypoints()?.into_iter().collect();
            waypoints.sort_by(|a, b| a.0.cmp(&b.0));
            for (owner, waypoint) in waypoints {
                println!("{}: {}", owner, waypoint);
            }
        }
        Commands::Watch {
            interval_secs,
            count,
        } => {
            let shared = SharedSession::new(session);
            let (mut poller, events) =
                PositionPoller::spawn(shared, Duration::from_secs(interval_secs.max(1)))?;

            let mut seen = 0;
            for event in events.iter() {
                match event {
                    PollEvent::Positions(positions) => {
                        println!("{} participant(s)", positions.len());
                        for (owner, position) in &positions {
                            println!("  {}: {}", owner, position);
                        }
                    }
                    PollEvent::Failed(e) => tracing::warn!("Poll failed: {}", e),
                }

                seen += 1;
                if count > 0 && seen >= count {
                    break;
                }
            }
            poller.stop();
        }
    }

    Ok(())
}
