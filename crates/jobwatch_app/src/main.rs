//! Background worker host for the RAG extension.
//!
//! Speaks newline-delimited JSON with the extension UI over stdin/stdout and
//! HTTP with the remote backend. The parent process owns this host's
//! lifetime; tracked jobs survive a restart through the persisted mirror.
mod badge;
mod config;
mod effects;
mod logging;
mod persistence;
mod protocol;
mod worker;

fn main() -> anyhow::Result<()> {
    // stdout carries the protocol; logs must go to the file only.
    logging::initialize(logging::LogDestination::File);
    let paths = config::WorkerPaths::from_env();
    worker::run(paths)
}
