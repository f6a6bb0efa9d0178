//! Neuvo is a terminal chat client for a campus student-advisor backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation transcript, configuration, and the
//!   streaming pipeline: frame splitting ([`core::sse`]), delta
//!   accumulation ([`core::accumulator`]), and the stream driver
//!   ([`core::chat_stream`]) that publishes message snapshots.
//! - [`api`] defines the request/response payloads for the advisor
//!   endpoints and the non-streaming document-analysis exchange.
//! - [`cli`] parses arguments and runs the interactive loop that
//!   subscribes to streamed snapshots and renders them.
//! - [`utils`] holds URL construction and transcript logging.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
