//! Structured call tracing.
//!
//! Provides [`JsonlTraceLogger`], an append-only JSONL writer that implements
//! the [`TraceLogger`](deliberation_application::TraceLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlTraceLogger;
