//! facetrack smoke tool.
//!
//! Wires the full identification stack to an in-memory remote store
//! and a synthetic vision model, enrolls a few identities, then drives
//! the frame loop and prints each annotation. Useful for eyeballing
//! the pipeline without a camera or a real backend.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;

use facetrack_embedding::Embedding;
use facetrack_enroll::{EnrollOutcome, EnrollPrompt, Resolution};
use facetrack_pipeline::{FaceVision, Frame, FrameLabel, VisionError};
use facetrack_registry::{IdentityRecord, Thresholds};
use facetrack_session::{Session, SessionConfig};
use facetrack_sync::MemoryRemote;

/// Smoke tool for the face identification pipeline.
#[derive(Parser)]
#[command(name = "facetrack")]
#[command(about = "Drive the identification pipeline against an in-memory store")]
#[command(version)]
struct Cli {
    /// Embedding dimension of the synthetic vision model.
    #[arg(long, default_value_t = 128)]
    dim: usize,

    /// Number of identities to enroll before the frame loop.
    #[arg(long, default_value_t = 3)]
    people: usize,

    /// Number of synthetic frames to process.
    #[arg(long, default_value_t = 10)]
    frames: usize,

    /// Live identification threshold.
    #[arg(long, default_value_t = 0.5)]
    live_threshold: f32,

    /// Enrollment duplicate-detection threshold.
    #[arg(long, default_value_t = 0.8)]
    enroll_threshold: f32,

    /// Verbose output.
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Synthetic vision model: the first frame byte selects a person
/// (basis direction plus a small offset), 0xFF means no face.
struct SyntheticVision {
    dim: usize,
}

impl SyntheticVision {
    fn embedding_for(&self, person: usize) -> Embedding {
        let mut values = vec![0.0f32; self.dim];
        values[person % self.dim] = 1.0;
        values[(person + 1) % self.dim] = 0.08;
        Embedding::new(values).expect("synthetic embedding is valid")
    }
}

impl FaceVision for SyntheticVision {
    fn extract(&self, frame: &Frame) -> Result<Option<Embedding>, VisionError> {
        let Some(&tag) = frame.data.first() else {
            return Ok(None);
        };
        if tag == 0xFF {
            return Ok(None);
        }
        Ok(Some(self.embedding_for(tag as usize)))
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

/// Non-interactive enrollment prompt with a fixed name.
struct AutoPrompt {
    name: String,
}

#[async_trait]
impl EnrollPrompt for AutoPrompt {
    async fn on_duplicate(&self, _existing: &IdentityRecord) -> Resolution {
        Resolution::Cancel
    }

    async fn request_name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    async fn on_name_collision(&self, _existing: &IdentityRecord) -> Resolution {
        Resolution::UpdateExisting
    }
}

fn synthetic_frame(tag: u8) -> Frame {
    Frame {
        width: 640,
        height: 480,
        data: vec![tag],
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    }

    let store = Arc::new(MemoryRemote::new());
    let vision = Arc::new(SyntheticVision { dim: cli.dim });

    let session = Session::start(SessionConfig {
        store,
        vision: Arc::clone(&vision) as Arc<dyn FaceVision>,
        metric: None,
        thresholds: Thresholds {
            live: cli.live_threshold,
            enroll: cli.enroll_threshold,
        },
    })
    .await?;

    for person in 0..cli.people {
        let name = format!("person-{person}");
        let outcome = session
            .enroll(vision.embedding_for(person), &AutoPrompt { name: name.clone() })
            .await?;
        match outcome {
            EnrollOutcome::Committed { id, name } => println!("enrolled {name} ({id})"),
            EnrollOutcome::Cancelled => println!("enrollment of {name} cancelled"),
        }
    }

    // The registry converges through the change feed; wait for it.
    wait_for_identities(&session, cli.people)
        .await
        .context("registry did not converge after enrollment")?;

    println!("registry: {} identities", session.list_identities().len());

    for n in 0..cli.frames {
        // Cycle enrolled people, and every fourth frame has no face.
        let tag = if n % 4 == 3 {
            0xFF
        } else {
            (n % cli.people.max(1)) as u8
        };
        let annotation = session.process_frame(&synthetic_frame(tag));
        let label = match annotation.label {
            Some(FrameLabel::Known { name, score }) => format!("{name} (score {score:.3})"),
            Some(FrameLabel::Unknown) => "unknown".to_string(),
            None => "no face".to_string(),
        };
        println!(
            "frame {n:>3}: {label} [{} us]",
            annotation.elapsed.as_micros()
        );
    }

    session.close().await;
    Ok(())
}

async fn wait_for_identities(session: &Session, expected: usize) -> Result<()> {
    for _ in 0..200 {
        if session.list_identities().len() >= expected {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    anyhow::bail!("expected {expected} identities, have {}", session.list_identities().len());
}
