//! Wall-clock statistics of a run.
//!
//! [`Stats`] is a [`ProgressSink`]: it timestamps every stage it is told
//! about. Each later stage is clamped to be no earlier than the stage
//! before it, so a signal that arrives without its predecessors still
//! yields non-negative intervals.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::progress::{ProgressSink, Stage};

#[derive(Debug, Clone)]
pub struct Stats {
    start: Instant,
    begin: Instant,
    tabulation: Instant,
    integration: Instant,
    threads: usize,
}

/// Serialized form of [`Stats`], in seconds.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsReport {
    pub threads: usize,
    #[serde(rename = "setup wtime [s]")]
    pub setup: f64,
    #[serde(rename = "tabulation wtime [s]")]
    pub tabulation: f64,
    #[serde(rename = "integration wtime [s]")]
    pub integration: f64,
    #[serde(rename = "total wtime [s]")]
    pub total: f64,
}

impl Stats {
    /// Start the clock.
    pub fn new() -> Self {
        let start = Instant::now();
        Self {
            start,
            begin: start,
            tabulation: start,
            integration: start,
            threads: 1,
        }
    }

    pub fn set_threads(&mut self, threads: usize) {
        self.threads = threads;
    }

    pub fn setup_time(&self) -> Duration {
        self.begin - self.start
    }

    pub fn tabulation_time(&self) -> Duration {
        self.tabulation - self.begin
    }

    pub fn integration_time(&self) -> Duration {
        self.integration - self.tabulation
    }

    pub fn total_time(&self) -> Duration {
        self.integration - self.start
    }

    pub fn report(&self) -> StatsReport {
        StatsReport {
            threads: self.threads,
            setup: self.setup_time().as_secs_f64(),
            tabulation: self.tabulation_time().as_secs_f64(),
            integration: self.integration_time().as_secs_f64(),
            total: self.total_time().as_secs_f64(),
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for Stats {
    fn signal(&mut self, stage: Stage) {
        let now = Instant::now();
        match stage {
            Stage::BeginComputation => {
                self.begin = now;
                self.tabulation = now;
                self.integration = now;
            }
            Stage::FinishTabulation => {
                self.tabulation = now;
                self.integration = now;
            }
            Stage::FinishIntegration => {
                self.integration = now;
            }
        }
    }
}
