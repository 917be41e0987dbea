//! Steps, sinks, and chain composition.
//!
//! A [`Sink`] is the terminal handler of a route. A [`Step`] wraps the rest
//! of the chain: it receives a [`Next`] handle and the request context and
//! decides whether, when, and how often to run what comes after it.
//!
//! The context is passed by value and handed back on return, so every
//! callable in the chain owns it exclusively while it runs.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::FlowContext;

/// A boxed future for async steps and sinks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased sink.
pub type BoxedSink = Arc<dyn Sink>;

/// A type-erased step.
pub type BoxedStep = Arc<dyn Step>;

/// Terminal request-handling logic.
pub trait Sink: Send + Sync + 'static {
    /// Handles the request and returns the context.
    fn call<'a>(&'a self, ctx: FlowContext) -> BoxFuture<'a, FlowContext>;
}

impl<F, Fut> Sink for F
where
    F: Fn(FlowContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FlowContext> + Send + 'static,
{
    fn call<'a>(&'a self, ctx: FlowContext) -> BoxFuture<'a, FlowContext> {
        Box::pin(self(ctx))
    }
}

/// A request interceptor.
///
/// Steps can:
/// - Run logic before and after the rest of the chain
/// - Short-circuit by returning without calling `next`
/// - Call `next` more than once
///
/// # Example
///
/// ```
/// use oxide_flow::{step, FlowContext, Next};
///
/// let auth = step(|next: Next, mut ctx: FlowContext| async move {
///     if ctx.request.get_header("X-Auth") != Some("secret") {
///         ctx.json(401, &serde_json::json!({"error": "unauthorized"}));
///         return ctx;
///     }
///     next.run(ctx).await
/// });
/// # let _ = auth;
/// ```
pub trait Step: Send + Sync + 'static {
    /// Runs this step around the rest of the chain.
    fn run<'a>(&'a self, next: Next, ctx: FlowContext) -> BoxFuture<'a, FlowContext>;

    /// Erases this step into a [`BoxedStep`].
    fn boxed(self) -> BoxedStep
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

impl<F, Fut> Step for F
where
    F: Fn(Next, FlowContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FlowContext> + Send + 'static,
{
    fn run<'a>(&'a self, next: Next, ctx: FlowContext) -> BoxFuture<'a, FlowContext> {
        Box::pin(self(next, ctx))
    }
}

/// Handle to the remainder of a chain.
#[derive(Clone)]
pub struct Next {
    inner: BoxedSink,
}

impl Next {
    /// Runs the rest of the chain.
    pub async fn run(&self, ctx: FlowContext) -> FlowContext {
        self.inner.call(ctx).await
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Wraps a `(next, ctx)` closure into a step.
pub fn step<F, Fut>(f: F) -> BoxedStep
where
    F: Fn(Next, FlowContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FlowContext> + Send + 'static,
{
    Arc::new(f)
}

/// Wraps a `ctx` closure into a sink.
pub fn sink<F, Fut>(f: F) -> BoxedSink
where
    F: Fn(FlowContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = FlowContext> + Send + 'static,
{
    Arc::new(f)
}

/// One step bound to the chain it wraps.
struct Layer {
    step: BoxedStep,
    next: Next,
}

impl Sink for Layer {
    fn call<'a>(&'a self, ctx: FlowContext) -> BoxFuture<'a, FlowContext> {
        self.step.run(self.next.clone(), ctx)
    }
}

/// Composes a sink and its steps into a single callable.
///
/// The first step is the outermost wrapper: it runs first on the way in and
/// last on the way out.
#[must_use]
pub fn compose(sink: BoxedSink, steps: &[BoxedStep]) -> BoxedSink {
    steps.iter().rev().fold(sink, |inner, step| {
        Arc::new(Layer {
            step: Arc::clone(step),
            next: Next { inner },
        })
    })
}
