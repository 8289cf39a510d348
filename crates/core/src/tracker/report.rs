//! Human-readable run reports.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::job::{Job, JobId, JobStatus};

/// Short fingerprint of a plan: the job ids in plan order, hashed.
///
/// Two runs over the same configuration produce the same digest.
pub fn plan_digest(jobs: &[Job]) -> String {
    let mut hasher = Sha256::new();
    for job in jobs {
        hasher.update(job.id.as_str().as_bytes());
        hasher.update(b"\n");
    }
    hasher
        .finalize()
        .iter()
        .take(8)
        .fold(String::with_capacity(16), |mut acc, byte| {
            let _ = write!(acc, "{:02x}", byte);
            acc
        })
}

/// One job line of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    pub job_id: JobId,
    pub status: JobStatus,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

/// Summary of a run, one line per job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub usecase: String,
    pub plan_digest: String,
    pub generated_at: DateTime<Utc>,
    pub done: usize,
    pub failed: usize,
    pub pending: usize,
    pub lines: Vec<ReportLine>,
}

impl RunReport {
    pub fn from_jobs(run_id: &str, usecase: &str, jobs: &[Job]) -> Self {
        let lines: Vec<ReportLine> = jobs
            .iter()
            .map(|job| ReportLine {
                job_id: job.id.clone(),
                status: job.status,
                attempts: job.attempts,
                log_path: job.log_path.clone(),
            })
            .collect();

        let count = |status: JobStatus| lines.iter().filter(|l| l.status == status).count();
        let done = count(JobStatus::Done);
        let failed = count(JobStatus::Failed);

        Self {
            run_id: run_id.to_string(),
            usecase: usecase.to_string(),
            plan_digest: plan_digest(jobs),
            generated_at: Utc::now(),
            done,
            failed,
            pending: lines.len() - done - failed,
            lines,
        }
    }

    /// Conventional report file: `<log_dir>/<usecase>.report`.
    pub fn path_for(log_dir: &Path, usecase: &str) -> PathBuf {
        log_dir.join(format!("{}.report", usecase))
    }

    pub fn total(&self) -> usize {
        self.lines.len()
    }

    /// Whether every job is terminal, and none failed unless tolerated.
    pub fn is_complete(&self, tolerate_failures: bool) -> bool {
        self.pending == 0 && (tolerate_failures || self.failed == 0)
    }

    /// Renders the report as plain text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "usecase   {}", self.usecase);
        let _ = writeln!(out, "run       {}", self.run_id);
        let _ = writeln!(out, "plan      {}", self.plan_digest);
        let _ = writeln!(
            out,
            "generated {}",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let _ = writeln!(
            out,
            "jobs      {} total, {} done, {} failed, {} pending",
            self.total(),
            self.done,
            self.failed,
            self.pending
        );
        out.push('\n');

        for line in &self.lines {
            let log = line
                .log_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "{:<8} {:>2} {} {}",
                line.status.as_str(),
                line.attempts,
                line.job_id,
                log
            );
        }
        out
    }

    /// Writes the rendered report, replacing any previous one.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render())
    }
}
