//! # simtrain - Training Chat Client Library
//!
//! A small, pragmatic Rust client for the social-worker simulation
//! training backend: scenario listing, session lifecycle, and chat turns
//! delivered either as a single reply or as an incrementally streamed one.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - One shared Server-Sent-Events decoder for every streaming call site,
//!   tolerant of chunk boundaries, doubled `data:` prefixes, and
//!   malformed payloads
//! - Ordered fragment delivery with a single completion signal per
//!   session, on every success and failure path
//! - Automatic one-shot fallback to the non-streaming endpoint when the
//!   stream cannot be opened or fails mid-flight
//! - Explicit credential injection, no ambient token store
//!
//! ## Example
//! ```no_run
//! use simtrain::client::TrainingClient;
//! use simtrain::model::{ChatRequest, Turn};
//! use simtrain::options::TransportOptions;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = TransportOptions::new("http://localhost:8080/api/social-worker/simulation")
//!         .with_credential("token-123");
//!     let client = TrainingClient::new(options)?;
//!
//!     let request = ChatRequest::new(
//!         5,
//!         "你今天过得怎么样？",
//!         vec![Turn::user("你好"), Turn::ai("……嗯。")],
//!     );
//!
//!     client
//!         .send_stream(
//!             request,
//!             |fragment| print!("{}", fragment),
//!             || println!(),
//!         )
//!         .await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod model;
pub mod options;
mod session;
pub mod sse;

// Re-exports for convenience
pub use client::{ChatExchange, ClientError, TrainingClient};
pub use model::{ChatRequest, Role, TrainingReply, Turn};
pub use options::{SecretString, TransportOptions};
