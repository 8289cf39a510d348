//! Job types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::period::Period;
use crate::planner::TimeSlot;
use crate::sensor::{Sensor, SensorPair};

/// Lifecycle of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    /// Done and Failed are terminal for a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "done" => Ok(JobStatus::Done),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

/// Kind of processing a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Ingestion,
    Matchup,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Ingestion => f.write_str("ingestion"),
            JobKind::Matchup => f.write_str("matchup"),
        }
    }
}

/// What a job processes within its slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobTarget {
    /// Ingest one sensor.
    Ingestion { sensor: Sensor },
    /// Match one sensor pair.
    Matchup { pair: SensorPair },
}

impl JobTarget {
    pub fn kind(&self) -> JobKind {
        match self {
            JobTarget::Ingestion { .. } => JobKind::Ingestion,
            JobTarget::Matchup { .. } => JobKind::Matchup,
        }
    }

    fn key(&self) -> String {
        match self {
            JobTarget::Ingestion { sensor } => sensor.name().to_string(),
            JobTarget::Matchup { pair } => pair.key(),
        }
    }
}

impl From<SensorPair> for JobTarget {
    fn from(pair: SensorPair) -> Self {
        JobTarget::Matchup { pair }
    }
}

impl From<Sensor> for JobTarget {
    fn from(sensor: Sensor) -> Self {
        JobTarget::Ingestion { sensor }
    }
}

/// Stable job identity: `kind/target/slot-start/slot-end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(slot: &Period, target: &JobTarget) -> Self {
        Self(format!(
            "{}/{}/{}/{}",
            target.kind(),
            target.key(),
            slot.start(),
            slot.end()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id with path separators replaced, usable as a file name stem.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | ' ' => '_',
                other => other,
            })
            .collect()
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of schedulable work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub slot: Period,
    pub target: JobTarget,
    pub status: JobStatus,
    /// Execution attempts made during the current run.
    pub attempts: u32,
    /// Log artifact of the latest attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl Job {
    pub fn new(slot: Period, target: JobTarget) -> Self {
        Self {
            id: JobId::new(&slot, &target),
            slot,
            target,
            status: JobStatus::Pending,
            attempts: 0,
            log_path: None,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.target.kind()
    }

    /// The sensor pair of a matchup job.
    pub fn pair(&self) -> Option<&SensorPair> {
        match &self.target {
            JobTarget::Matchup { pair } => Some(pair),
            JobTarget::Ingestion { .. } => None,
        }
    }

    /// The sensor of an ingestion job.
    pub fn sensor(&self) -> Option<&Sensor> {
        match &self.target {
            JobTarget::Ingestion { sensor } => Some(sensor),
            JobTarget::Matchup { .. } => None,
        }
    }
}

/// One job per (slot, target) combination, slot-major, all pending.
///
/// Ingestion passes a single sensor target and gets one job per slot.
pub fn build_jobs(slots: &[TimeSlot], targets: &[JobTarget]) -> Vec<Job> {
    slots
        .iter()
        .flat_map(|slot| {
            targets
                .iter()
                .map(move |target| Job::new(*slot.period(), target.clone()))
        })
        .collect()
}

/// Matchup jobs over a shared slot grid, slot-major, all pending.
///
/// Each slot is clipped to the pair's overlap. A pair gets no job in slots
/// outside its overlap.
pub fn build_pair_jobs(slots: &[TimeSlot], pairs: &[SensorPair]) -> Vec<Job> {
    slots
        .iter()
        .flat_map(|slot| {
            pairs.iter().filter_map(move |pair| {
                slot.period()
                    .intersection(pair.overlap())
                    .map(|clipped| Job::new(clipped, JobTarget::from(pair.clone())))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::time_slots;

    fn sensor(name: &str, start: &str, end: &str) -> Sensor {
        Sensor::new(name, Period::parse(start, end).unwrap())
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Done,
            JobStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>(), Ok(status));
        }
        assert!("finished".parse::<JobStatus>().is_err());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn test_ingestion_jobs_one_per_slot() {
        let sensor = sensor("mhs-n19", "2009-04-01", "2009-04-30");
        let slots: Vec<_> = time_slots(sensor.period(), 7).collect();
        let jobs = build_jobs(&slots, &[sensor.clone().into()]);

        assert_eq!(jobs.len(), slots.len());
        assert!(jobs.iter().all(|j| j.status == JobStatus::Pending && j.attempts == 0));
        assert_eq!(jobs[0].id.as_str(), "ingestion/mhs-n19/2009-04-01/2009-04-07");
        assert_eq!(jobs[0].sensor(), Some(&sensor));
        assert!(jobs[0].pair().is_none());
    }

    #[test]
    fn test_matchup_jobs_clipped_to_pair_overlap() {
        let family = vec![
            sensor("avhrr.n12", "1991-09-16", "1998-12-14"),
            sensor("avhrr.n11", "1988-11-08", "1994-12-31"),
            sensor("avhrr.n10", "1986-11-17", "1991-09-16"),
        ];
        let pairs = crate::sensor::compute_pairs(&family, &family);
        assert_eq!(pairs.len(), 2);
        let window = Period::parse("1991-09-01", "1991-09-30").unwrap();
        let slots: Vec<_> = time_slots(&window, 10).collect();
        assert_eq!(slots.len(), 3);

        let jobs = build_pair_jobs(&slots, &pairs);
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "matchup/avhrr.n11+avhrr.n10/1991-09-01/1991-09-10",
                "matchup/avhrr.n12+avhrr.n11/1991-09-16/1991-09-20",
                "matchup/avhrr.n11+avhrr.n10/1991-09-11/1991-09-16",
                "matchup/avhrr.n12+avhrr.n11/1991-09-21/1991-09-30",
            ]
        );
        assert!(jobs.iter().all(|j| j.kind() == JobKind::Matchup));
        assert!(jobs
            .iter()
            .all(|j| j.pair().is_some_and(|p| p.overlap().contains(&j.slot))));
    }

    #[test]
    fn test_job_id_is_stable() {
        let sensor = sensor("mhs-n19", "2009-04-01", "2016-03-04");
        let slot = Period::parse("2009-04-01", "2009-04-07").unwrap();
        let a = Job::new(slot, sensor.clone().into());
        let b = Job::new(slot, sensor.into());
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.file_stem(), "ingestion_mhs-n19_2009-04-01_2009-04-07");
    }
}
