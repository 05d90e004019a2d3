//! Legends ingest: streaming parser and resolver for world-history exports
//!
//! Turns a Legends XML export into a cross-referenced, in-memory dataset:
//! - Resumable byte-level tag lexer that tolerates arbitrary chunk cuts
//! - Scope stack that resolves reused tag names by context
//! - Per-kind draft builders that validate records at their closing tag
//! - Async chunk driver with throttled progress and cooperative cancellation
//! - Resolution pass deriving kills, artifact provenance, membership and ages

pub mod config;
pub mod ingest;
pub mod resolve;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;

/// Parse and resolve a complete in-memory document synchronously.
pub fn parse_document(bytes: &[u8]) -> LegendsDataset {
    let mut parser = ingest::LegendsParser::new();
    parser.feed(bytes);
    resolve::resolve(parser.finish())
}
