//! Spell card library entry points.
//!
//! This crate validates spell data, renders it into card images through a
//! registry of pluggable formatters, and runs background generation jobs
//! with optional HTTP callbacks or streamed progress. Transports (HTTP
//! service, MCP server, CLI) should only depend on the items exported here
//! instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod callback;
pub mod error;
pub mod formatter;
pub mod jobs;
pub mod output;
pub mod registry;
pub mod spell;

pub use callback::{
    parse_callback_url, CallbackNotifier, CallbackPayload, HttpCallbackNotifier, NotifyFuture,
    Url, DEFAULT_CALLBACK_TIMEOUT,
};
pub use error::{Error, Result};
pub use formatter::{
    synthesize_progress, Formatter, PlainFormatter, ProgressEvent, ProgressStream,
    TornioDuvaFormatter, CHECKPOINTS, IMAGE_MIME_TYPE,
};
pub use jobs::{Dispatcher, GenerationJob, JobHandle, JobStatus, ProgressReceiver};
pub use output::{card_filename, slugify_title, CardOutput, CardStore};
pub use registry::{FormatterRegistry, DEFAULT_GENERATOR};
pub use spell::{School, SpellData, SpellRecord, MAX_LEVEL};
