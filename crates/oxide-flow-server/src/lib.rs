//! # oxide-flow-server
//!
//! Serves an [`oxide_flow::Router`] over HTTP/1.1.
//!
//! This crate provides:
//! - A hyper-based transport that turns each request into an
//!   [`oxide_flow::Request`] and calls [`Router::handle`](oxide_flow::Router::handle)
//! - Listen address parsing (`"8080"`, `":8080"`, `"127.0.0.1:8080"`)
//! - Graceful shutdown on Ctrl-C with a bounded grace period
//! - The `oxide-flow-demo` binary
//!
//! ## Quick Start
//!
//! ```no_run
//! use oxide_flow::{Flow, FlowContext};
//! use oxide_flow_server::{serve, ListenAddr, ServerConfig};
//!
//! # async fn run() -> oxide_flow_server::Result<()> {
//! let flow = Flow::new();
//! flow.stream("GET", "/", [], |mut ctx: FlowContext| async move {
//!     ctx.text(200, "hello");
//!     ctx
//! })?;
//!
//! let config = ServerConfig::new(ListenAddr::parse(":8080")?);
//! serve(flow.into_router(), &config).await
//! # }
//! ```

mod config;
pub mod demo;
mod error;
mod server;

pub use config::{ListenAddr, ServerConfig};
pub use error::{Result, ServerError};
pub use server::{serve, serve_with_shutdown};
