//! # vigil
//!
//! Proctoring monitor CLI — connects to an exam backend, follows the roster,
//! and logs roll-up statistics until interrupted.

#![deny(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vigil_core::{Credential, ExamId};
use vigil_monitor::{Monitor, MonitorConfig, StaticExamMetadata};

/// Live exam-proctoring monitor.
#[derive(Parser, Debug)]
#[command(name = "vigil", about = "Live exam-proctoring monitor")]
struct Cli {
    /// WebSocket endpoint of the exam backend (ws:// or wss://).
    #[arg(long, default_value = "ws://127.0.0.1:4310")]
    endpoint: String,

    /// Exam to monitor.
    #[arg(long)]
    exam_id: String,

    /// Bearer credential for the monitoring connections.
    #[arg(long, env = "VIGIL_TOKEN")]
    token: String,

    /// Total questions in the exam (normally supplied by the exam backend).
    #[arg(long, default_value = "0")]
    total_questions: u32,

    /// Seconds between summary log lines.
    #[arg(long, default_value = "10")]
    summary_interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = MonitorConfig::new(
        cli.endpoint,
        ExamId::from(cli.exam_id.as_str()),
        Credential::new(cli.token),
    );
    let metadata = Arc::new(StaticExamMetadata::new(cli.total_questions));

    let monitor = Monitor::start(config, metadata)
        .await
        .context("failed to start monitor")?;

    let mut summary_interval = tokio::time::interval(Duration::from_secs(cli.summary_interval.max(1)));
    loop {
        tokio::select! {
            _ = summary_interval.tick() => {
                let summary = monitor.summary();
                info!(
                    students = summary.total_students,
                    examming = summary.examming,
                    offline = summary.offline,
                    submitted = summary.submitted,
                    violations = summary.total_violations,
                    critical = summary.critical_violations,
                    avg_progress = format!("{:.1}%", summary.average_progress_percent),
                    connections = monitor.active_connection_count(),
                    dropped_frames = monitor.parse_error_count(),
                    "monitor summary"
                );
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for ctrl-c")?;
                break;
            }
        }
    }

    info!("interrupt received; tearing down");
    monitor.shutdown().await;
    Ok(())
}
