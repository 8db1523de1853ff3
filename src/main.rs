use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::io::BufRead;

mod client;
mod config;
mod error;
mod models;
mod notification;
mod playlist;
mod scheduler;
mod services;

#[cfg(test)]
mod scheduler_tests;

use crate::client::{SpotifyClient, parse_authorization_code};
use crate::config::load_config;
use crate::notification::NotificationService;
use crate::playlist::PlaylistConfig;
use crate::scheduler::RitualScheduler;

#[derive(Parser)]
#[command(name = "ritual-playlist")]
#[command(about = "Builds a daily phase-structured Ritual playlist from your Spotify liked songs")]
#[command(version)]
struct Args {
    /// Run the Spotify authorization flow and print the tokens to store in .env
    #[arg(long = "auth")]
    auth: bool,

    /// Generate one playlist and exit instead of running the daily schedule
    #[arg(short = 'o', long = "once")]
    once: bool,

    /// Hour of the day (local time) for the scheduled run
    #[arg(long = "hour", default_value_t = 6)]
    hour: u32,

    /// Minute of the hour for the scheduled run
    #[arg(long = "minute", default_value_t = 0)]
    minute: u32,

    /// Path to a playlist configuration JSON file (defaults to the built-in ritual)
    #[arg(short = 'c', long = "config")]
    config_file: Option<String>,

    /// Enable debug mode - print playlist details to stdout instead of uploading
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Seed the random source for a reproducible selection
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Quiet mode - reduce output verbosity
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Load configuration from .env
    let config = load_config()?;

    if args.auth {
        return run_auth_flow(SpotifyClient::new(config));
    }

    let notifier = NotificationService::new(config.resend.clone());
    if !notifier.is_enabled() {
        info!("Email notifications are not configured");
    }

    let client = SpotifyClient::new(config);
    client.authenticate()?;

    let playlist_config = PlaylistConfig::load_or_default(args.config_file.as_deref());
    info!(
        "Using playlist '{}' with {} phases, target {} ms",
        playlist_config.name,
        playlist_config.phases.len(),
        playlist_config.total_duration_ms
    );

    let scheduler = RitualScheduler::new(&client, &client, &notifier, playlist_config)
        .with_debug(args.debug);

    let mut rng: Box<dyn RngCore> = match args.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };

    if args.once || args.debug {
        if let Err(e) = scheduler.run_once(&mut *rng) {
            error!("Failed to create ritual playlist: {e:#}");
            return Err(e);
        }
        return Ok(());
    }

    info!("Ritual Playlist Generator is running... Press Ctrl+C to stop");
    scheduler.run_daily(args.hour, args.minute, &mut *rng)
}

/// Print the authorization URL, read back the redirect and exchange the code
fn run_auth_flow(client: SpotifyClient) -> Result<()> {
    println!("Starting Spotify authentication...");
    println!("\nPlease visit this URL to authorize the application:");
    println!("\n{}\n", client.auth_url());
    println!("After authorizing, paste the full redirect URL (or just the code) here:");

    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read authorization response")?;

    let code = parse_authorization_code(&input)?;
    let tokens = client.exchange_code_for_tokens(&code)?;

    println!("\nAuthentication successful!");
    println!("\nAdd these to your .env file:");
    println!("SPOTIFY_ACCESS_TOKEN={}", tokens.access_token);
    if let Some(refresh_token) = &tokens.refresh_token {
        println!("SPOTIFY_REFRESH_TOKEN={refresh_token}");
    }
    println!("\nThen run the app again with --once or start the scheduler.");

    Ok(())
}
