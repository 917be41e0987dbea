//! Route registration through nested branches.

use std::cell::RefCell;
use std::future::Future;

use crate::chain::{sink, BoxedStep};
use crate::context::FlowContext;
use crate::error::{Result, RouterError};
use crate::path::is_dynamic;
use crate::request::Method;
use crate::router::Router;
use crate::table::RouteTable;

/// The top-level route builder.
///
/// A `Flow` owns the route table while routes are being registered.
/// Registration goes through [`Branch`]es, which borrow the flow; once every
/// branch is gone, [`Flow::into_router`] freezes the table into a
/// [`Router`] that can serve requests.
#[derive(Debug, Default)]
pub struct Flow {
    table: RefCell<RouteTable>,
}

impl Flow {
    /// Creates an empty flow.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the root branch: no prefix and no steps.
    #[must_use]
    pub const fn root(&self) -> Branch<'_> {
        Branch {
            path: String::new(),
            steps: Vec::new(),
            flow: self,
        }
    }

    /// Forks a branch from the root.
    pub fn fork(&self, prefix: &str, steps: impl IntoIterator<Item = BoxedStep>) -> Branch<'_> {
        self.root().fork(prefix, steps)
    }

    /// Registers a route on the root branch.
    ///
    /// # Errors
    ///
    /// See [`Branch::stream`].
    pub fn stream<F, Fut>(
        &self,
        method: &str,
        path: &str,
        steps: impl IntoIterator<Item = BoxedStep>,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(FlowContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FlowContext> + Send + 'static,
    {
        self.root().stream(method, path, steps, handler)
    }

    /// Finishes registration and returns the router.
    #[must_use]
    pub fn into_router(self) -> Router {
        Router::new(self.table.into_inner())
    }
}

/// A URL-prefix scope with inherited steps.
///
/// Forking copies the parent's prefix and steps and extends them; a branch
/// never changes its ancestors.
#[derive(Clone)]
pub struct Branch<'f> {
    path: String,
    steps: Vec<BoxedStep>,
    flow: &'f Flow,
}

impl<'f> Branch<'f> {
    /// Creates a child branch.
    ///
    /// The child's path is this branch's path followed by `prefix` (a bare
    /// `"/"` adds nothing), and its steps are this branch's steps followed by
    /// `steps`.
    #[must_use]
    pub fn fork(&self, prefix: &str, steps: impl IntoIterator<Item = BoxedStep>) -> Branch<'f> {
        let prefix = if prefix == "/" { "" } else { prefix };
        let mut inherited = self.steps.clone();
        inherited.extend(steps);

        Branch {
            path: format!("{}{}", self.path, prefix),
            steps: inherited,
            flow: self.flow,
        }
    }

    /// Drops every step this branch has accumulated.
    ///
    /// Routes already registered through this branch keep their steps.
    #[must_use]
    pub fn clear_steps(mut self) -> Self {
        self.steps.clear();
        self
    }

    /// Registers a handler for `method` at this branch's path followed by `path`.
    ///
    /// The route runs this branch's steps, then `steps`, then `handler`.
    /// Whether the route is matched by pattern is decided by `path` alone:
    /// a prefix containing `:` or `*` does not make a static sub-path dynamic.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::UnsupportedMethod`] unless `method` is exactly
    /// `"GET"` or `"POST"`, and [`RouterError::DuplicateParam`] or
    /// [`RouterError::InvalidPattern`] if the path does not compile. All are
    /// configuration errors and should stop application startup.
    pub fn stream<F, Fut>(
        &self,
        method: &str,
        path: &str,
        steps: impl IntoIterator<Item = BoxedStep>,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(FlowContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FlowContext> + Send + 'static,
    {
        let method = match method {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => return Err(RouterError::UnsupportedMethod(other.to_string())),
        };
        self.register(method, path, steps, handler)
    }

    /// Registers a GET handler.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateParam`] or
    /// [`RouterError::InvalidPattern`] if the path does not compile.
    pub fn get<F, Fut>(
        &self,
        path: &str,
        steps: impl IntoIterator<Item = BoxedStep>,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(FlowContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FlowContext> + Send + 'static,
    {
        self.register(Method::Get, path, steps, handler)
    }

    /// Registers a POST handler.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateParam`] or
    /// [`RouterError::InvalidPattern`] if the path does not compile.
    pub fn post<F, Fut>(
        &self,
        path: &str,
        steps: impl IntoIterator<Item = BoxedStep>,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(FlowContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FlowContext> + Send + 'static,
    {
        self.register(Method::Post, path, steps, handler)
    }

    fn register<F, Fut>(
        &self,
        method: Method,
        path: &str,
        steps: impl IntoIterator<Item = BoxedStep>,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(FlowContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FlowContext> + Send + 'static,
    {
        let full_path = format!("{}{}", self.path, path);
        let mut final_steps = self.steps.clone();
        final_steps.extend(steps);

        self.flow.table.borrow_mut().register(
            &full_path,
            method,
            &final_steps,
            sink(handler),
            is_dynamic(path),
        )
    }

    /// Returns this branch's accumulated path prefix.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns this branch's accumulated steps, outermost first.
    #[must_use]
    pub fn steps(&self) -> &[BoxedStep] {
        &self.steps
    }
}

impl std::fmt::Debug for Branch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Branch")
            .field("path", &self.path)
            .field("steps", &self.steps.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{step, Next};

    fn passthrough() -> BoxedStep {
        step(|next: Next, ctx: FlowContext| async move { next.run(ctx).await })
    }

    async fn ok(ctx: FlowContext) -> FlowContext {
        ctx
    }

    #[test]
    fn test_fork_concatenates_path_and_steps() {
        let flow = Flow::new();
        let root = flow.fork("/", [passthrough()]);
        let api = root.fork("/api", [passthrough()]);
        let v1 = api.fork("/v1", Vec::new());

        assert_eq!(root.path(), "");
        assert_eq!(api.path(), "/api");
        assert_eq!(v1.path(), "/api/v1");
        assert_eq!(root.steps().len(), 1);
        assert_eq!(api.steps().len(), 2);
        assert_eq!(v1.steps().len(), 2);
    }

    #[test]
    fn test_fork_does_not_touch_parent() {
        let flow = Flow::new();
        let root = flow.fork("/", [passthrough()]);
        let _child = root.fork("/child", [passthrough(), passthrough()]);
        assert_eq!(root.steps().len(), 1);
    }

    #[test]
    fn test_clear_steps_only_affects_this_branch() {
        let flow = Flow::new();
        let root = flow.fork("/", [passthrough()]);
        let plain = root.fork("/plain", [passthrough()]).clear_steps();

        assert!(plain.steps().is_empty());
        assert_eq!(plain.path(), "/plain");
        assert_eq!(root.steps().len(), 1);
    }

    #[test]
    fn test_unsupported_method() {
        let flow = Flow::new();
        let err = flow.stream("DELETE", "/x", Vec::new(), ok).unwrap_err();
        assert!(matches!(err, RouterError::UnsupportedMethod(m) if m == "DELETE"));

        // Method names are matched exactly
        let err = flow.stream("get", "/x", Vec::new(), ok).unwrap_err();
        assert!(matches!(err, RouterError::UnsupportedMethod(_)));
    }

    #[test]
    fn test_dynamic_classification_uses_sub_path() {
        let flow = Flow::new();
        {
            let tenant = flow.fork("/:tenant", Vec::new());
            tenant.get("/home", Vec::new(), ok).unwrap();

            let files = flow.fork("/files", Vec::new());
            files.get("/*", Vec::new(), ok).unwrap();
        }

        let router = flow.into_router();
        assert_eq!(router.table().static_len(), 1);
        assert_eq!(router.table().dynamic_len(), 1);

        // The prefixed template was stored literally
        assert!(router.resolve("/acme/home").is_none());
        assert!(router.resolve("/:tenant/home").is_some());
        assert!(router.resolve("/files/a/b").is_some());
    }
}
