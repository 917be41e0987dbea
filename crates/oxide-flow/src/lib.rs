//! # oxide-flow
//!
//! An HTTP request router with composable steps (middleware) and path
//! parameter extraction.
//!
//! This crate provides:
//! - Path templates with `:name` segments and a trailing `*` wildcard
//! - A two-tier route table: exact static paths first, then dynamic
//!   patterns in registration order
//! - Branches that nest path prefixes and inherit steps
//! - Steps that run before and after the rest of the chain, or short-circuit
//! - A per-request context with a local store and extracted parameters
//!
//! ## Quick Start
//!
//! ```
//! use oxide_flow::{Flow, FlowContext, Request};
//!
//! # tokio_test::block_on(async {
//! let flow = Flow::new();
//! flow.stream("GET", "/user/:id", [], |mut ctx: FlowContext| async move {
//!     let id = ctx.param("id").to_string();
//!     ctx.json(200, &serde_json::json!({ "id": id }));
//!     ctx
//! })
//! .unwrap();
//!
//! let router = flow.into_router();
//! let response = router.handle(Request::get("/user/42")).await;
//! assert_eq!(response.body_string(), Some(r#"{"id":"42"}"#.to_string()));
//! # });
//! ```
//!
//! ## Branches and Steps
//!
//! A step receives the rest of the chain as [`Next`]. Steps registered on a
//! branch are inherited by everything forked from it, outermost first.
//!
//! ```
//! use oxide_flow::{step, Flow, FlowContext, Next, Logger, Step};
//!
//! let flow = Flow::new();
//! let root = flow.fork("/", [Logger.boxed()]);
//! let api = root.fork("/api", [step(|next: Next, mut ctx: FlowContext| async move {
//!     ctx.set("version", "v1");
//!     next.run(ctx).await
//! })]);
//!
//! // Runs Logger, then the version step, then the handler
//! api.get("/ping", [], |ctx: FlowContext| async move { ctx }).unwrap();
//!
//! // Starts over with no inherited steps
//! let plain = api.fork("/plain", []).clear_steps();
//! plain.get("/ping", [], |ctx: FlowContext| async move { ctx }).unwrap();
//! ```
//!
//! ## Matching Rules
//!
//! - Static paths are matched exactly and always win over patterns.
//! - Patterns are tried in the order they were registered; register more
//!   specific patterns before more general ones.
//! - Whether a route is a pattern is decided by the sub-path given to
//!   [`Branch::stream`], not by the branch prefix.

mod branch;
mod chain;
mod context;
mod error;
mod path;
mod request;
mod response;
mod router;
mod steps;
mod table;

pub use branch::{Branch, Flow};
pub use chain::{compose, sink, step, BoxFuture, BoxedSink, BoxedStep, Next, Sink, Step};
pub use context::FlowContext;
pub use error::{Result, RouterError};
pub use path::{is_dynamic, CompiledPattern};
pub use request::{Method, PathParams, Request};
pub use response::Response;
pub use router::Router;
pub use steps::{Cors, Logger, RequireHeader, SetHeader, Timing};
pub use table::{Resolved, RouteEntry, RouteGroup, RouteTable};
