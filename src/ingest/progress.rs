//! Progress reporting and cancellation for ingest runs

use crate::types::RecordCounts;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Pipeline phase a progress notification belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPhase {
    Parsing,
    Resolving,
}

impl ProgressPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::Resolving => "resolving",
        }
    }
}

/// Payload handed to progress callbacks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseProgress {
    /// 0 to 100
    pub percent: u8,
    pub phase: ProgressPhase,
    /// Records completed so far
    pub counts: RecordCounts,
    pub bytes_consumed: u64,
}

/// Decides when a new progress notification is due
///
/// Percentages are floored; a notification fires once the percentage has
/// advanced by at least `step` points since the last one, and once more on
/// reaching 100.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    step: u8,
    last: Option<u8>,
}

impl ProgressThrottle {
    pub fn new(step: u8) -> Self {
        Self {
            step: step.max(1),
            last: None,
        }
    }

    pub fn percent(consumed: u64, total: u64) -> u8 {
        if total == 0 {
            return 100;
        }
        let pct = (consumed as u128 * 100) / total as u128;
        pct.min(100) as u8
    }

    /// Returns the percentage to report, if one is due.
    pub fn advance(&mut self, consumed: u64, total: u64) -> Option<u8> {
        let pct = Self::percent(consumed, total);
        let due = match self.last {
            None => pct >= self.step,
            Some(last) => pct >= last.saturating_add(self.step) || (pct == 100 && last < 100),
        };
        if due {
            self.last = Some(pct);
            Some(pct)
        } else {
            None
        }
    }
}

/// Cloneable, advisory cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Terminal progress bar driven by [`ParseProgress`] notifications
#[derive(Clone)]
pub struct ProgressDisplay {
    /// None in quiet mode
    progress_bar: Option<ProgressBar>,
    start_time: Instant,
}

impl ProgressDisplay {
    pub fn new(quiet: bool) -> Self {
        let progress_bar = if !quiet {
            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        Self {
            progress_bar,
            start_time: Instant::now(),
        }
    }

    pub fn update(&self, progress: &ParseProgress) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(progress.percent as u64);
            pb.set_message(format!(
                "{} | {} records | {:.1} MB",
                progress.phase.as_str(),
                progress.counts.total(),
                progress.bytes_consumed as f64 / 1_000_000.0
            ));
        }
    }

    pub fn cancel(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.abandon_with_message("Cancelled");
        }
    }

    pub fn finish(&self, counts: &RecordCounts) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(format!(
                "Done! {} records in {:.1}s",
                counts.total(),
                self.start_time.elapsed().as_secs_f64()
            ));
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}
