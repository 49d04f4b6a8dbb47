// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand, ValueEnum};
use simplecam::CameraFacing;
use uuid::Uuid;

mod cli;

#[derive(Parser)]
#[command(name = "simplecam")]
#[command(about = "Camera capture sessions with an on-device media catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a photo
    Photo {
        /// Use the front (selfie) camera
        #[arg(short, long)]
        front: bool,
    },

    /// Record a video
    Record {
        /// Recording duration in seconds
        #[arg(short, long, default_value = "10")]
        duration: u64,

        /// Use the front (selfie) camera
        #[arg(short, long)]
        front: bool,
    },

    /// Browse the media catalog
    Gallery {
        #[command(subcommand)]
        command: GalleryCommands,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum GalleryCommands {
    /// List captured media, newest first
    List,

    /// Delete a record by id
    Delete {
        /// Record id (from 'simplecam gallery list')
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the active configuration
    Show,

    /// Set the default lens facing
    SetFacing {
        /// Lens used when no command-line flag overrides it
        facing: FacingArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FacingArg {
    Front,
    Back,
}

impl From<FacingArg> for CameraFacing {
    fn from(arg: FacingArg) -> Self {
        match arg {
            FacingArg::Front => CameraFacing::Front,
            FacingArg::Back => CameraFacing::Back,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=simplecam=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Photo { front } => cli::take_photo(front).await,
        Commands::Record { duration, front } => cli::record_video(duration, front).await,
        Commands::Gallery { command } => match command {
            GalleryCommands::List => cli::gallery_list().await,
            GalleryCommands::Delete { id } => cli::gallery_delete(id).await,
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config_show(),
            ConfigCommands::SetFacing { facing } => cli::config_set_facing(facing.into()),
        },
    }
}
