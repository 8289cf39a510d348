//! Configuration for the command executor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::job::JobKind;

/// A program plus leading arguments placed before the job arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Configuration of the external programs that execute jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Program run for ingestion jobs.
    #[serde(default)]
    pub ingestion: Option<CommandSpec>,

    /// Program run for matchup jobs.
    #[serde(default)]
    pub matchup: Option<CommandSpec>,

    /// Kill a job after this many seconds. No limit when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ExecutorConfig {
    pub fn command_for(&self, kind: JobKind) -> Option<&CommandSpec> {
        match kind {
            JobKind::Ingestion => self.ingestion.as_ref(),
            JobKind::Matchup => self.matchup.as_ref(),
        }
    }

    pub fn with_ingestion(mut self, spec: CommandSpec) -> Self {
        self.ingestion = Some(spec);
        self
    }

    pub fn with_matchup(mut self, spec: CommandSpec) -> Self {
        self.matchup = Some(spec);
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}
