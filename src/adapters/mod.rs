// Adapters layer: concrete record stores and notification sinks.

pub mod json_store;
pub mod log_sink;
pub mod memory_store;
pub mod smtp_sink;
pub mod webhook_sink;

pub use json_store::JsonFileStore;
pub use log_sink::LogSink;
pub use memory_store::MemoryStore;
pub use smtp_sink::SmtpSink;
pub use webhook_sink::WebhookSink;
