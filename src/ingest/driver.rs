//! Chunk driver
//!
//! Pulls chunks from a [`ChunkSource`], feeds them to a [`LegendsParser`],
//! reports progress and hands the finished drafts to the resolution pass.
//! Each chunk is parsed to completion before control returns to the runtime;
//! cancellation is only observed between chunks.

use super::parser::LegendsParser;
use super::progress::{CancelFlag, ParseProgress, ProgressPhase, ProgressThrottle};
use super::source::{ChunkSource, IngestError};
use crate::config::IngestConfig;
use crate::resolve::resolve;
use crate::types::LegendsDataset;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Progress notification callback; must not block
pub type ProgressCallback = Box<dyn FnMut(&ParseProgress) + Send>;

/// Runs one ingest from source to resolved dataset
pub struct ChunkDriver {
    config: IngestConfig,
    on_progress: Option<ProgressCallback>,
    cancel: CancelFlag,
}

impl ChunkDriver {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            on_progress: None,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_progress(mut self, callback: impl FnMut(&ParseProgress) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    /// Flag that stops this run at the next chunk boundary
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    fn notify(&mut self, progress: ParseProgress) {
        if let Some(callback) = self.on_progress.as_mut() {
            callback(&progress);
        }
    }

    /// Parse and resolve the whole source.
    ///
    /// Fails only if the source cannot be read or the run is cancelled; in
    /// both cases no partial dataset is produced.
    pub async fn run<S: ChunkSource>(mut self, mut source: S) -> Result<LegendsDataset, IngestError> {
        let start = Instant::now();
        let total = source.total_bytes().filter(|t| *t > 0);
        info!(
            source = source.source_name(),
            total_bytes = ?total,
            "Starting Legends ingest"
        );

        let mut parser = LegendsParser::new();
        let mut throttle = ProgressThrottle::new(self.config.progress_step);
        let mut chunks = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                info!(chunks, "Ingest cancelled");
                return Err(IngestError::Cancelled);
            }

            let Some(chunk) = source.next_chunk()? else { break };
            parser.feed(chunk);
            chunks += 1;

            let consumed = source.byte_position();
            if let Some(total) = total {
                if let Some(percent) = throttle.advance(consumed, total) {
                    trace!(percent, consumed, "Parse progress");
                    let counts = parser.counts();
                    self.notify(ParseProgress {
                        percent,
                        phase: ProgressPhase::Parsing,
                        counts,
                        bytes_consumed: consumed,
                    });
                }
            }

            if self.config.yield_between_chunks {
                tokio::task::yield_now().await;
            }
        }

        if self.cancel.is_cancelled() {
            info!(chunks, "Ingest cancelled");
            return Err(IngestError::Cancelled);
        }

        let bytes_consumed = source.byte_position();
        let counts = parser.counts();
        let drafts = parser.finish();
        debug!(
            chunks,
            bytes_consumed,
            dropped = drafts.dropped,
            "Parsing complete"
        );

        self.notify(ParseProgress {
            percent: 100,
            phase: ProgressPhase::Resolving,
            counts,
            bytes_consumed,
        });

        let dataset = resolve(drafts);
        info!(
            world = %dataset.world_name,
            records = dataset.counts().total(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Legends ingest complete"
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{IterSource, MemorySource};
    use std::sync::{Arc, Mutex};

    const DOC: &str = "<df_world><name>Test World</name>\
        <regions><region><id>0</id><name>plain</name></region></regions>\
        <historical_events><historical_event><id>1</id><year>12</year><type>masterpiece item</type></historical_event></historical_events>\
        </df_world>";

    #[tokio::test]
    async fn test_run_reports_progress_then_resolving() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let driver = ChunkDriver::new(IngestConfig::default())
            .with_progress(move |p: &ParseProgress| sink.lock().unwrap().push(p.clone()));

        let dataset = driver.run(MemorySource::new(DOC, 7)).await.unwrap();
        assert_eq!(dataset.world_name, "Test World");
        assert_eq!(dataset.current_year, Some(12));

        let seen = seen.lock().unwrap();
        let parsing: Vec<u8> = seen
            .iter()
            .filter(|p| p.phase == ProgressPhase::Parsing)
            .map(|p| p.percent)
            .collect();
        assert!(!parsing.is_empty());
        assert!(parsing.windows(2).all(|w| w[1] >= w[0] + 5 || w[1] == 100));
        assert_eq!(parsing.last(), Some(&100));

        let last = seen.last().unwrap();
        assert_eq!(last.phase, ProgressPhase::Resolving);
        assert_eq!(last.counts.regions, 1);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let flag = CancelFlag::new();
        flag.cancel();
        let driver = ChunkDriver::new(IngestConfig::default()).with_cancel_flag(flag);
        let err = driver.run(MemorySource::new(DOC, 16)).await.unwrap_err();
        assert!(matches!(err, IngestError::Cancelled));
    }

    #[tokio::test]
    async fn test_unknown_total_skips_parse_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let chunks: Vec<std::io::Result<Vec<u8>>> = vec![Ok(DOC.as_bytes().to_vec())];
        let driver = ChunkDriver::new(IngestConfig::default())
            .with_progress(move |p: &ParseProgress| sink.lock().unwrap().push(p.phase));

        driver.run(IterSource::new(chunks.into_iter(), None)).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![ProgressPhase::Resolving]);
    }
}
