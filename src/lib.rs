//! `crawld`: a content-addressed crawl engine.
//!
//! Discovers objects as they're announced to a gateway's provider log,
//! fetches them through the local gateway, classifies them by magic bytes,
//! extracts searchable text from HTML, and persists the result. See
//! `SPEC_FULL.md` for the full module breakdown.

pub mod cli;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod queue;
pub mod sink;
pub mod types;
