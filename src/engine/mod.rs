//! Crawl Engine (§4.5): wires the gateway client, dedup filter, extractor,
//! and sink together behind a producer/worker-pool/supervisor pipeline.

mod producer;
mod supervisor;
mod worker;

pub use supervisor::Supervisor;
