// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for capture operations
//!
//! Runs the session controller against the synthetic camera backend, so the
//! capture, recording, and catalog paths work end to end on machines without
//! camera hardware.

use simplecam::backends::synthetic::SyntheticCamera;
use simplecam::{
    CameraFacing, CaptureMode, CatalogGateway, Config, GrantAll, JsonCatalog, MediaKind,
    PreviewSurface, SessionController, SessionEvent, storage,
};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

type Controller = SessionController<SyntheticCamera, GrantAll>;

fn build_session() -> Result<
    (Controller, UnboundedReceiver<SessionEvent>, Config),
    Box<dyn std::error::Error>,
> {
    let config = Config::load();
    let photo_dir = storage::media_dir(MediaKind::Photo)?;
    let video_dir = storage::media_dir(MediaKind::Video)?;

    // Structured-store references materialize relative to the home dir, so
    // `Pictures/<app>` lines up with the direct-file photo dir
    let store_root = dirs::home_dir().unwrap_or_else(|| photo_dir.clone());
    let camera = SyntheticCamera::new(store_root);

    let (controller, events) = SessionController::new(
        camera,
        PreviewSurface::new("cli"),
        GrantAll,
        config.sink_policy,
        photo_dir,
        video_dir,
    );
    Ok((controller, events, config))
}

/// Lens to use: `--front` overrides the configured default facing
fn facing_for(front: bool, config: &Config) -> CameraFacing {
    if front {
        CameraFacing::Front
    } else {
        config.default_facing
    }
}

/// Drain events, cataloging saved artifacts and printing results
async fn drain_events(
    events: &mut UnboundedReceiver<SessionEvent>,
    catalog: &JsonCatalog,
) -> Result<(), Box<dyn std::error::Error>> {
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::PhotoSaved(artifact) | SessionEvent::VideoSaved(artifact) => {
                match &artifact.output_ref {
                    Some(reference) => println!("Saved: {}", reference),
                    None => println!("Saved, but the output reference could not be determined"),
                }
                if artifact.output_ref.is_some() {
                    catalog.insert(artifact).await?;
                }
            }
            SessionEvent::Error(e) => eprintln!("Error: {}", e),
            SessionEvent::CameraBound { fallback: true } => {
                eprintln!("Warning: running with fallback camera configuration (preview only)");
            }
            _ => {}
        }
    }
    Ok(())
}

/// Take a photo
pub async fn take_photo(front: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (mut session, mut events, config) = build_session()?;
    let catalog = JsonCatalog::open_default()?;

    session.start(facing_for(front, &config)).await?;
    session.capture_photo().await?;
    session.release().await;

    drain_events(&mut events, &catalog).await
}

/// Record a video for `duration` seconds
pub async fn record_video(duration: u64, front: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (mut session, mut events, config) = build_session()?;
    let catalog = JsonCatalog::open_default()?;

    session.start(facing_for(front, &config)).await?;
    session.set_mode(CaptureMode::Video).await?;

    session.toggle_recording().await?;
    println!("Recording for {} seconds...", duration);
    tokio::time::sleep(Duration::from_secs(duration)).await;
    session.toggle_recording().await?;
    session.release().await;

    drain_events(&mut events, &catalog).await
}

/// List cataloged media, newest first
pub async fn gallery_list() -> Result<(), Box<dyn std::error::Error>> {
    let catalog = JsonCatalog::open_default()?;
    let records = catalog.query_all().await?;

    if records.is_empty() {
        println!("No captured media.");
        return Ok(());
    }

    for record in records {
        let stamp = chrono::DateTime::from_timestamp_millis(record.created_at_ms)
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "?".to_string());
        let kind = match record.kind {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        };
        let duration = record
            .duration_ms
            .map(|ms| format!(" ({:.1}s)", ms as f64 / 1000.0))
            .unwrap_or_default();
        println!(
            "{}  {}  {}{}  {}",
            record.id,
            stamp,
            kind,
            duration,
            record.output_ref.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Delete one cataloged record by id
pub async fn gallery_delete(id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = JsonCatalog::open_default()?;
    if catalog.delete(id).await? {
        println!("Deleted {}", id);
    } else {
        eprintln!("No record with id {}", id);
    }
    Ok(())
}

/// Print the active configuration
pub fn config_show() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    println!("sink policy:    {:?}", config.sink_policy);
    println!("default facing: {}", config.default_facing);
    Ok(())
}

/// Persist a new default lens facing
pub fn config_set_facing(facing: CameraFacing) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    config.default_facing = facing;
    config.save()?;
    println!("Default facing set to {}", facing);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simplecam::SinkPolicy;

    #[test]
    fn configured_default_facing_applies_unless_overridden() {
        let config = Config {
            sink_policy: SinkPolicy::DirectFile,
            default_facing: CameraFacing::Front,
        };
        assert_eq!(facing_for(false, &config), CameraFacing::Front);
        assert_eq!(facing_for(true, &config), CameraFacing::Front);

        let back = Config {
            default_facing: CameraFacing::Back,
            ..config
        };
        assert_eq!(facing_for(false, &back), CameraFacing::Back);
        assert_eq!(facing_for(true, &back), CameraFacing::Front);
    }
}
