//! Score ingestion: Standard MIDI Files to absolute-time note timelines.

pub mod timeline;
