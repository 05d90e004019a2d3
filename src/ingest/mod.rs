//! Streaming ingestion of Legends exports
//!
//! A Legends export is a single XML document that can run to hundreds of
//! megabytes. This module reads it in arbitrarily cut byte chunks without
//! ever building a document tree, and turns it into typed records for nine
//! record kinds.
//!
//! # Example Usage
//!
//! ```no_run
//! use legends_ingest::config::IngestConfig;
//! use legends_ingest::ingest::{ChunkDriver, FileSource};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IngestConfig::default();
//! let source = FileSource::open("region1-00250-01-01-legends.xml.bz2", config.chunk_size)?;
//! let dataset = ChunkDriver::new(config)
//!     .with_progress(|p| println!("{}% {}", p.percent, p.phase.as_str()))
//!     .run(source)
//!     .await?;
//! println!("{} figures", dataset.historical_figures.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           Chunk Driver                              │
//! │             (progress, cancellation, cooperative yield)             │
//! └─────────────────────────────────────────────────────────────────────┘
//!          │ bytes                                          │ drafts
//!          ▼                                                ▼
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────────┐
//! │   ChunkSource   │    │   TagLexer      │    │   Resolution Pass   │
//! │                 │───▶│                 │    │                     │
//! │ - FileSource    │    │ - byte carry    │    │ - dedup by id       │
//! │ - MemorySource  │    │ - attributes    │    │ - kills, provenance │
//! │ - IterSource    │    │   discarded     │    │ - membership, ages  │
//! └─────────────────┘    └─────────────────┘    └─────────────────────┘
//!                                 │ tags                    ▲
//!                                 ▼                         │
//!                        ┌─────────────────┐    ┌─────────────────────┐
//!                        │  ContextStack   │───▶│   Draft Builders    │
//!                        │ (scope per tag) │    │ (one per kind)      │
//!                        └─────────────────┘    └─────────────────────┘
//! ```

pub mod drafts;
pub mod driver;
pub mod lexer;
pub mod parser;
pub mod progress;
pub mod scope;
pub mod source;

pub use driver::{ChunkDriver, ProgressCallback};
pub use lexer::{Tag, TagLexer};
pub use parser::{LegendsParser, ParsedDrafts};
pub use progress::{CancelFlag, ParseProgress, ProgressDisplay, ProgressPhase, ProgressThrottle};
pub use scope::{ContextStack, RecordKind, Scope};
pub use source::{ChunkSource, FileSource, IngestError, IterSource, MemorySource};
