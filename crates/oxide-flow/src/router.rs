//! Request dispatch.

use tracing::debug;

use crate::context::FlowContext;
use crate::error::{Result, RouterError};
use crate::request::Request;
use crate::response::Response;
use crate::table::{Resolved, RouteTable};

/// A frozen route table that serves requests.
///
/// Built by [`Flow::into_router`](crate::Flow::into_router). The table is
/// read-only from here on, so a `Router` can be shared across threads and
/// dispatch concurrently without locking.
#[derive(Debug)]
pub struct Router {
    table: RouteTable,
}

impl Router {
    pub(crate) const fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// Returns the underlying route table.
    #[must_use]
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolves a path without running anything.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<Resolved<'_>> {
        self.table.resolve(path)
    }

    /// Dispatches a request through its route's chain.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::NotFound`] when no route matches the path and
    /// [`RouterError::MethodNotAllowed`] when a route matches but has no
    /// entry for the request method.
    pub async fn dispatch(&self, request: Request) -> Result<Response> {
        let Some(resolved) = self.table.resolve(&request.path) else {
            debug!(method = %request.method, path = %request.path, "no route matched");
            return Err(RouterError::NotFound {
                method: request.method.to_string(),
                path: request.path,
            });
        };

        let Some(entry) = resolved.group.entry(request.method) else {
            debug!(
                method = %request.method,
                path = %request.path,
                route = resolved.route,
                "method not allowed"
            );
            return Err(RouterError::MethodNotAllowed {
                method: request.method.to_string(),
                path: request.path,
                allowed: resolved
                    .group
                    .allowed_methods()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            });
        };

        debug!(
            method = %request.method,
            path = %request.path,
            route = resolved.route,
            params = resolved.params.len(),
            "dispatching"
        );

        let ctx = FlowContext::new(request, resolved.params);
        let ctx = entry.chain().call(ctx).await;
        Ok(ctx.into_response())
    }

    /// Dispatches a request and turns resolution failures into responses.
    ///
    /// This is the entry point a transport calls for every request.
    pub async fn handle(&self, request: Request) -> Response {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(RouterError::NotFound { .. }) => Response::not_found(),
            Err(RouterError::MethodNotAllowed { allowed, .. }) => {
                Response::method_not_allowed().header("Allow", allowed.join(", "))
            }
            Err(_) => Response::internal_server_error(),
        }
    }
}
