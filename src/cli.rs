// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for booth operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Composing a strip from image files
//! - Emailing an existing strip through the relay

use photobooth::backends::camera::{device_formats, enumerate_cameras};
use photobooth::config::BoothConfig;
use photobooth::constants::SHOT_COUNT;
use photobooth::delivery::RelayClient;
use photobooth::errors::{AppError, AppResult};
use photobooth::pipelines::photo::Shot;
use photobooth::pipelines::strip::StripCompositor;
use photobooth::storage;
use std::path::{Path, PathBuf};

/// List all available cameras
pub fn list_cameras() -> AppResult<()> {
    let cameras = enumerate_cameras()?;

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);

        // Show top 3 resolutions
        let formats = device_formats(camera);
        if !formats.is_empty() {
            let res_strs: Vec<String> = formats.iter().take(3).map(|f| f.to_string()).collect();
            println!("      Formats: {}", res_strs.join(", "));
        }
        println!();
    }

    Ok(())
}

/// Compose a strip from up to three image files
pub fn compose(
    inputs: &[PathBuf],
    output: Option<PathBuf>,
    config: &BoothConfig,
) -> AppResult<()> {
    if inputs.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one input image is required".to_string(),
        ));
    }
    if inputs.len() > SHOT_COUNT {
        return Err(AppError::InvalidInput(format!(
            "At most {} input images are supported",
            SHOT_COUNT
        )));
    }

    let compositor = load_compositor(config)?;

    let mut shots: Vec<Option<Shot>> = Vec::with_capacity(inputs.len());
    for path in inputs {
        let data = std::fs::read(path)
            .map_err(|e| AppError::InvalidInput(format!("Failed to read {}: {}", path.display(), e)))?;
        let shot = Shot::from_encoded(data).map_err(|e| {
            AppError::InvalidInput(format!("Unsupported image {}: {}", path.display(), e))
        })?;
        println!("  {} ({}x{})", path.display(), shot.width, shot.height);
        shots.push(Some(shot));
    }

    let png = compositor.compose_png(&shots)?;

    let output_path = match output {
        Some(path) => path,
        None => {
            let dir = config.output_dir();
            std::fs::create_dir_all(&dir)?;
            dir.join(storage::strip_file_name())
        }
    };
    std::fs::write(&output_path, &png)?;

    println!("Strip saved: {}", output_path.display());
    Ok(())
}

/// Email an existing strip file through the relay
pub fn send(
    email: &str,
    strip: &Path,
    relay_url: &str,
    config: &BoothConfig,
) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Email address is required".to_string(),
        ));
    }
    let png = std::fs::read(strip)
        .map_err(|e| AppError::InvalidInput(format!("Failed to read {}: {}", strip.display(), e)))?;

    let client = RelayClient::new(relay_url, config.retry_policy())?;
    println!("Sending {} to {} via {}", strip.display(), email, client.endpoint());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(client.send_strip(email, &png))?;

    println!("Email sent!");
    Ok(())
}

fn load_compositor(config: &BoothConfig) -> AppResult<StripCompositor> {
    let compositor = match &config.template_path {
        Some(path) => StripCompositor::from_path(path)?,
        None => StripCompositor::canonical()?,
    };
    Ok(compositor)
}
