//! GLS Dummy Walker
//!
//! A fake GPS device: joins a group and keeps publishing a position that
//! wanders around a fixed starting point.

use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;
use glsclient::{Position, Session, SessionConfig};
use tracing_subscriber::{fmt, EnvFilter};

const START_LATITUDE: f64 = 23.4545;
const START_LONGITUDE: f64 = 25.345345;
const ALTITUDE: f64 = 1234.34;
const SPEED: f64 = 89.63;
const BEARING: f64 = 180.0;

/// Largest move per update, in degrees
const MAX_STEP: f64 = 2.0;

/// GLS dummy GPS device
#[derive(Parser, Debug)]
#[command(name = "gls-walker")]
#[command(about = "Dummy GPS device walking around and reporting to a GLS server")]
#[command(version)]
struct Args {
    /// Group to join
    #[arg(short, long, default_value = "OpenMoko")]
    group: String,

    /// Login name
    #[arg(short, long, default_value = "CathodioN")]
    user: String,

    /// Login password ("None" logs in without one)
    #[arg(short = 's', long, default_value = "test")]
    password: String,

    /// Server host
    #[arg(short = 'H', long, default_value = "localhost")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "47757")]
    port: u16,

    /// Device name to register
    #[arg(long, default_value = "DummyDevice")]
    device: String,

    /// Seconds between two updates
    #[arg(short, long, default_value = "5")]
    delay: u64,

    /// Number of updates (0 = infinite)
    #[arg(short, long, default_value = "0")]
    loops: u64,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,glsclient=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    let password = (args.password != "None").then(|| args.password.clone());

    tracing::info!(
        "Connection parameters: {}@{}:{} [group:{}]",
        args.user,
        args.host,
        args.port,
        args.group
    );
    tracing::info!(
        "Doing {} updates with {} seconds delay in between 2 updates",
        args.loops,
        args.delay
    );

    let config = SessionConfig::builder()
        .host(&args.host)
        .port(args.port)
        .client_name(&args.user)
        .password(password)
        .device_name(&args.device)
        .group_name(&args.group)
        .build();

    let mut session = match Session::new(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = walk(&mut session, args.loops, Duration::from_secs(args.delay)) {
        tracing::error!("Connection error: {}", e);
        process::exit(1);
    }
}

fn walk(session: &mut Session, loops: u64, delay: Duration) -> glsclient::Result<()> {
    tracing::info!("Joining group {}", session.config().group_name);
    session.join_configured_group()?;

    let mut current = 0;
    while loops == 0 || current < loops {
        let (delta_lat, delta_lon) = step(current);
        tracing::info!("Moving {:.6} / {:.6}", delta_lat, delta_lon);

        let position = Position::new(
            START_LATITUDE + delta_lat,
            START_LONGITUDE + delta_lon,
            ALTITUDE,
            SPEED,
            BEARING,
        );
        tracing::info!("Sending my position: {}", position);
        session.send_position(&position)?;

        current += 1;
        thread::sleep(delay);
    }

    session.close();
    Ok(())
}

/// Offset from the start point after `n` updates
///
/// A Lissajous curve: never leaves a `MAX_STEP` box around the start and
/// does not repeat for a long time.
fn step(n: u64) -> (f64, f64) {
    let t = n as f64;
    (MAX_STEP * (t * 0.7).sin(), MAX_STEP * (t * 0.43).cos())
}
