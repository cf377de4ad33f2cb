//! IdeaScore CLI - binary entry point.
//!
//! # Architecture
//!
//! The CLI wires [`ideascore_config`] settings into an
//! [`ideascore_engine::SubmissionCoordinator`] backed by the HTTP scoring
//! client and the session's result store, then drives it from a small
//! event loop.
//!
//! ```text
//! main() -> Cli::parse() -> evaluate | show | reset
//!                               |
//!                               v
//!         capture -> submit -> select!{ next_event, ctrl_c, redraw } -> report
//! ```
//!
//! This build has no camera, microphone, or on-device recognizers. Text
//! files upload directly; image, PDF, and audio uploads fail extraction.

mod args;
mod render;

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    pin::pin,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::{signal, time};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ideascore_config::{IdeaScoreConfig, ScoringSettings, SessionSettings, Settings};
use ideascore_engine::{
    BusinessIdea, CaptureAdapter, CaptureLimits, CaptureSource, CoordinatorSettings, JobStatus,
    ResultStore, SubmissionCoordinator, SubmitError, present,
};
use ideascore_providers::{HttpScoringClient, RetryConfig, ScoringClientConfig};

use crate::args::{Cli, Command, EvaluateArgs, IdeaInput};

/// How often the progress line is refreshed while waiting.
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than mixing logs into command output.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => warnings.push(format!(
                "Failed to open log file {}: {e}",
                candidate.display()
            )),
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.ideascore/logs/ideascore.log
    if let Some(dir) = ideascore_config::data_dir() {
        candidates.push(dir.join("logs").join("ideascore.log"));
    }

    // Fallback: ./.ideascore/logs/ideascore.log
    candidates.push(PathBuf::from(".ideascore").join("logs").join("ideascore.log"));

    candidates
}

fn load_settings() -> Result<Settings> {
    let config = IdeaScoreConfig::load()?.unwrap_or_default();
    Ok(config.resolve()?)
}

fn open_store(session: &SessionSettings) -> ResultStore {
    match ideascore_config::data_dir() {
        Some(dir) => ResultStore::open(&ResultStore::session_dir(&dir, &session.name)),
        None => {
            tracing::warn!("No home directory; results will not be persisted");
            ResultStore::in_memory()
        }
    }
}

fn client_config(scoring: &ScoringSettings) -> ScoringClientConfig {
    let mut config = ScoringClientConfig::new(scoring.base_url.clone());
    config.api_key.clone_from(&scoring.api_key);
    config.request_timeout = scoring.request_timeout;
    config.retry = RetryConfig {
        max_retries: scoring.max_retries,
        initial_delay: scoring.initial_backoff,
        max_delay: scoring.max_backoff,
        ..RetryConfig::default()
    };
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    match Cli::parse().command {
        Command::Show => show(),
        Command::Reset => reset(),
        Command::Evaluate(args) => evaluate(args).await,
    }
}

fn show() -> Result<()> {
    let settings = load_settings()?;
    match open_store(&settings.session).get_result() {
        Some(result) => print!("{}", render::score_report(&present(&result))),
        None => println!("No evaluation stored for session '{}'.", settings.session.name),
    }
    Ok(())
}

fn reset() -> Result<()> {
    let settings = load_settings()?;
    let store = open_store(&settings.session);
    store
        .clear_result()
        .context("failed to clear stored result")?;
    match store.path() {
        Some(path) => println!(
            "Cleared session '{}' ({}).",
            settings.session.name,
            path.display()
        ),
        None => println!("Cleared session '{}'.", settings.session.name),
    }
    Ok(())
}

enum Wake {
    Event(bool),
    Interrupt,
    Redraw,
}

async fn evaluate(args: EvaluateArgs) -> Result<()> {
    let settings = load_settings()?;
    let client = HttpScoringClient::new(client_config(&settings.scoring))
        .context("failed to build HTTP client")?;
    let mut coordinator = SubmissionCoordinator::new(
        Arc::new(client),
        open_store(&settings.session),
        CoordinatorSettings::from_settings(&settings),
    );

    let idea = match args.input() {
        IdeaInput::File(path) => {
            let adapter = CaptureAdapter::new(CaptureLimits::from(&settings.capture));
            let capture = match coordinator
                .capture(&adapter, CaptureSource::Upload(path))
                .await
            {
                Ok(capture) => capture,
                Err(err) => return report_submit_error(&err),
            };
            BusinessIdea::from_capture(&capture, args.title, args.industry)
        }
        IdeaInput::Text(text) => BusinessIdea::new(args.title, text, args.industry),
    };
    let idea = idea
        .with_target_market(args.target_market.unwrap_or_default())
        .with_language(
            args.language
                .unwrap_or_else(|| settings.session.language.clone()),
        );

    if let Err(err) = coordinator.submit(&idea) {
        return report_submit_error(&err);
    }

    let mut interrupt = pin!(signal::ctrl_c());
    let mut last_line = None;
    loop {
        let wake = tokio::select! {
            more = coordinator.next_event() => Wake::Event(more),
            _ = &mut interrupt => Wake::Interrupt,
            () = time::sleep(REDRAW_INTERVAL) => Wake::Redraw,
        };

        match wake {
            Wake::Event(false) => break,
            Wake::Interrupt => {
                coordinator.cancel();
                break;
            }
            Wake::Event(true) | Wake::Redraw => {
                let line = render::progress_line(&coordinator.progress());
                if line.is_some() && line != last_line {
                    if let Some(text) = &line {
                        println!("{text}");
                    }
                    last_line = line;
                }
            }
        }
    }

    match coordinator.status() {
        JobStatus::Succeeded => {
            if let Some(result) = coordinator.store().get_result() {
                print!("\n{}", render::score_report(&present(&result)));
            }
            Ok(())
        }
        JobStatus::Cancelled => Ok(()),
        status => {
            let message = coordinator
                .job()
                .and_then(|job| job.error())
                .map_or_else(|| format!("evaluation ended in state {status}"), |e| {
                    let hint = if e.kind.is_retryable() {
                        " (you can try again)"
                    } else {
                        ""
                    };
                    format!("{}{hint}", e.message)
                });
            bail!(message)
        }
    }
}

fn report_submit_error(err: &SubmitError) -> Result<()> {
    match err {
        SubmitError::Validation(validation) => {
            for field in &validation.fields {
                eprintln!("{}: {}", field.field, field.message);
            }
            bail!("idea is not valid")
        }
        SubmitError::Capture(capture) if capture.kind().is_silent() => Ok(()),
        other => bail!("{other}"),
    }
}
