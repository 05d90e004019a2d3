//! Ingest pipeline configuration

use serde::{Deserialize, Serialize};

/// Default bytes read per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Default percentage points between progress notifications
pub const DEFAULT_PROGRESS_STEP: u8 = 5;

/// Chunk driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Bytes read from the source per chunk
    pub chunk_size: usize,
    /// Percentage points the parse must advance between progress callbacks
    pub progress_step: u8,
    /// Return control to the runtime between chunks
    pub yield_between_chunks: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_step: DEFAULT_PROGRESS_STEP,
            yield_between_chunks: true,
        }
    }
}

impl IngestConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_progress_step(mut self, step: u8) -> Self {
        self.progress_step = step;
        self
    }

    /// Problems with this section, one message each
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.chunk_size == 0 {
            errors.push("ingest.chunk_size must be positive".to_string());
        }
        if self.progress_step == 0 || self.progress_step > 100 {
            errors.push("ingest.progress_step must be between 1 and 100".to_string());
        }
        errors
    }
}
