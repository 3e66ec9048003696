//! services/api/src/bin/animal_watch.rs
//!
//! Samples frames from a recorded farm video, asks a vision model whether an
//! animal is in each one, and alerts the farm owner by SMS and phone call the
//! first time each new animal shows up.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use krushi_api::{
    adapters::{
        twilio::TwilioCredentials, CsvDetectionLog, OpenAiVisionAdapter, TwilioAlertAdapter,
    },
    config::Config,
    error::ApiError,
    startup,
};
use krushi_core::{AnimalWatcher, FrameOutcome, RetryPolicy};
use tokio::process::Command;
use tracing::{info, warn};
use uuid::Uuid;

/// Command-line arguments for the animal watch.
#[derive(Parser, Debug)]
#[command(name = "animal-watch")]
#[command(about = "Detect animals in farm video and alert the owner")]
#[command(version)]
struct Args {
    /// Video file to scan
    #[arg(long)]
    video: PathBuf,

    /// Where frames with a new animal are kept
    #[arg(long, default_value = "detected_frames")]
    frames_dir: PathBuf,

    /// Detection CSV log (defaults to DETECTION_LOG)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Seconds of video between sampled frames
    #[arg(long, default_value_t = 1)]
    every_secs: u32,

    /// Attempts per frame when the vision API is rate limited
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,

    /// First backoff delay; doubles on every retry
    #[arg(long, default_value_t = 2)]
    base_delay_secs: u64,

    #[arg(long, env = "TWILIO_ACCOUNT_SID")]
    twilio_account_sid: String,

    #[arg(long, env = "TWILIO_AUTH_TOKEN", hide_env_values = true)]
    twilio_auth_token: String,

    /// Number the alerts are sent from
    #[arg(long, env = "TWILIO_FROM_NUMBER")]
    from_number: String,

    /// Number the alerts are sent to
    #[arg(long, env = "FARM_OWNER_NUMBER")]
    owner_number: String,

    #[arg(long, env = "TWILIO_API_BASE", default_value = "https://api.twilio.com")]
    twilio_api_base: String,
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let args = Args::parse();
    let config = Config::from_env()?;
    startup::init_tracing(&config);
    info!(video = ?args.video, every_secs = args.every_secs, "Starting animal watch");

    if args.every_secs == 0 || args.max_attempts == 0 {
        return Err(ApiError::InvalidInput(
            "--every-secs and --max-attempts must be at least 1".to_string(),
        ));
    }

    // --- 1. Sample Frames ---
    tokio::fs::create_dir_all(&args.frames_dir).await?;
    let run_id = new_run_id();
    let staging = args.frames_dir.join(format!(".staging-{run_id}"));
    tokio::fs::create_dir_all(&staging).await?;
    extract_frames(&args.video, &staging, args.every_secs).await?;
    let frames = sampled_frames(&staging)?;
    info!(frames = frames.len(), "Frames extracted");

    // --- 2. Wire the Watcher ---
    let inspector = Arc::new(OpenAiVisionAdapter::new(
        startup::generative_client(&config),
        config.advisor_model.clone(),
    ));
    let alerts = Arc::new(TwilioAlertAdapter::new(
        startup::http_client()?,
        args.twilio_api_base.clone(),
        TwilioCredentials {
            account_sid: args.twilio_account_sid.clone(),
            auth_token: args.twilio_auth_token.clone(),
            from_number: args.from_number.clone(),
            owner_number: args.owner_number.clone(),
        },
    ));
    let log_path = args.log.clone().unwrap_or_else(|| config.detection_log.clone());
    let log = Arc::new(CsvDetectionLog::new(log_path));
    let retry = RetryPolicy {
        max_attempts: args.max_attempts,
        base_delay: Duration::from_secs(args.base_delay_secs),
    };
    let mut watcher = AnimalWatcher::new(inspector, alerts, log, retry);

    // --- 3. Inspect Frames in Order ---
    let mut detected = 0usize;
    for (_, path) in &frames {
        let name = kept_name(&run_id, &file_name(path));
        let jpeg = match tokio::fs::read(path).await {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!(frame = %name, error = %e, "Skipping unreadable frame");
                continue;
            }
        };
        let outcome = watcher.process_frame(&name, &jpeg).await;

        if outcome.keeps_frame() {
            detected += 1;
            settle_frame(path, Some(args.frames_dir.join(&name).as_path())).await;
        } else {
            if let FrameOutcome::Duplicate(animal) = &outcome {
                info!(frame = %name, animal = %animal, "Dropping duplicate frame");
            }
            settle_frame(path, None).await;
        }
    }

    if let Err(e) = tokio::fs::remove_dir_all(&staging).await {
        warn!(error = %e, "Failed to remove staging directory");
    }
    info!(
        inspected = frames.len(),
        detected,
        frames_dir = ?args.frames_dir,
        "Animal watch finished"
    );
    Ok(())
}

/// Writes one JPEG per `every_secs` of video as `frame_<n>.jpg`, counting from 0.
async fn extract_frames(video: &Path, out_dir: &Path, every_secs: u32) -> Result<(), ApiError> {
    let pattern = out_dir.join("frame_%d.jpg");
    let output = Command::new("ffmpeg")
        .arg("-hide_banner")
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(video)
        .arg("-vf")
        .arg(format!("fps=1/{every_secs}"))
        .arg("-start_number")
        .arg("0")
        .arg(&pattern)
        .output()
        .await
        .map_err(|e| ApiError::Internal(format!("Could not run ffmpeg: {e}")))?;

    if !output.status.success() {
        return Err(ApiError::Internal(format!(
            "ffmpeg exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

/// `<utc timestamp>-<8 hex>`, distinct for every run.
fn new_run_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().format("%Y%m%dT%H%M%SZ"), &suffix[..8])
}

/// Name a frame is kept and logged under. Every run samples from `frame_0`,
/// so the run id keeps earlier runs' frames from being replaced.
fn kept_name(run_id: &str, frame: &str) -> String {
    format!("{run_id}_{frame}")
}

/// Moves a staged frame to `keep_as`, or deletes it. File errors are logged
/// and the run goes on.
async fn settle_frame(path: &Path, keep_as: Option<&Path>) {
    let result = match keep_as {
        Some(target) => tokio::fs::rename(path, target).await,
        None => tokio::fs::remove_file(path).await,
    };
    if let Err(e) = result {
        warn!(frame = ?path, error = %e, "Failed to settle frame file");
    }
}

/// Sampled frames in index order (`frame_2` before `frame_10`).
fn sampled_frames(dir: &Path) -> std::io::Result<Vec<(u32, PathBuf)>> {
    let mut frames: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| frame_index(&path).map(|index| (index, path)))
        .collect();
    frames.sort_by_key(|(index, _)| *index);
    Ok(frames)
}

fn frame_index(path: &Path) -> Option<u32> {
    path.file_name()?
        .to_str()?
        .strip_prefix("frame_")?
        .strip_suffix(".jpg")?
        .parse()
        .ok()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
