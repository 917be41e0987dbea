//! Built-in steps.

use std::time::Instant;

use tracing::{debug, info, info_span, Instrument};

use crate::chain::{BoxFuture, Next, Step};
use crate::context::FlowContext;

/// Step that logs each request inside a tracing span.
///
/// The span covers the rest of the chain, so anything the inner steps and
/// the handler log is attributed to the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger;

impl Step for Logger {
    fn run<'a>(&'a self, next: Next, ctx: FlowContext) -> BoxFuture<'a, FlowContext> {
        let span = info_span!(
            "request",
            method = %ctx.request.method,
            path = %ctx.request.path,
        );

        Box::pin(
            async move {
                let start = Instant::now();
                debug!("started");
                let ctx = next.run(ctx).await;
                info!(
                    status = ctx.response.status,
                    elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
                    "completed"
                );
                ctx
            }
            .instrument(span),
        )
    }
}

/// Step that sets a response header before the rest of the chain runs.
#[derive(Debug, Clone)]
pub struct SetHeader {
    name: String,
    value: String,
}

impl SetHeader {
    /// Creates a step that sets `name: value`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Step for SetHeader {
    fn run<'a>(&'a self, next: Next, mut ctx: FlowContext) -> BoxFuture<'a, FlowContext> {
        Box::pin(async move {
            ctx.set_header(self.name.as_str(), self.value.as_str());
            next.run(ctx).await
        })
    }
}

/// Step that rejects requests missing a header.
///
/// Rejected requests get a `401` JSON error and the chain stops there.
#[derive(Debug, Clone)]
pub struct RequireHeader {
    name: String,
    expected: Option<String>,
}

impl RequireHeader {
    /// Requires `name` to be present with any value.
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: None,
        }
    }

    /// Requires `name` to be present with exactly `value`.
    pub fn equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected: Some(value.into()),
        }
    }

    fn accepts(&self, ctx: &FlowContext) -> bool {
        match (ctx.request.get_header(&self.name), &self.expected) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

impl Step for RequireHeader {
    fn run<'a>(&'a self, next: Next, mut ctx: FlowContext) -> BoxFuture<'a, FlowContext> {
        Box::pin(async move {
            if !self.accepts(&ctx) {
                debug!(header = %self.name, "rejecting request");
                ctx.json(401, &serde_json::json!({"error": "unauthorized"}));
                return ctx;
            }
            next.run(ctx).await
        })
    }
}

/// Step that adds CORS headers to every response.
#[derive(Debug, Clone)]
pub struct Cors {
    allowed_origins: Vec<String>,
    allowed_methods: Vec<String>,
    allowed_headers: Vec<String>,
}

impl Cors {
    /// Allows all origins.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string()],
            allowed_headers: vec!["*".to_string()],
        }
    }

    /// Allows the given origins.
    #[must_use]
    pub fn new(origins: &[&str]) -> Self {
        Self {
            allowed_origins: origins.iter().map(|s| (*s).to_string()).collect(),
            allowed_methods: vec!["GET".to_string(), "POST".to_string()],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
        }
    }
}

impl Step for Cors {
    fn run<'a>(&'a self, next: Next, ctx: FlowContext) -> BoxFuture<'a, FlowContext> {
        Box::pin(async move {
            let mut ctx = next.run(ctx).await;
            ctx.set_header("Access-Control-Allow-Origin", self.allowed_origins.join(", "));
            ctx.set_header(
                "Access-Control-Allow-Methods",
                self.allowed_methods.join(", "),
            );
            ctx.set_header(
                "Access-Control-Allow-Headers",
                self.allowed_headers.join(", "),
            );
            ctx
        })
    }
}

/// Step that reports how long the inner chain took in a response header.
#[derive(Debug, Clone)]
pub struct Timing {
    header: String,
}

impl Timing {
    /// Writes the elapsed time to `header`.
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new("X-Response-Time")
    }
}

impl Step for Timing {
    fn run<'a>(&'a self, next: Next, ctx: FlowContext) -> BoxFuture<'a, FlowContext> {
        Box::pin(async move {
            let start = Instant::now();
            let mut ctx = next.run(ctx).await;
            ctx.set_header(self.header.as_str(), format!("{}us", start.elapsed().as_micros()));
            ctx
        })
    }
}
