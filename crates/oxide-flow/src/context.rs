//! Per-request context.

use std::any::Any;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::request::{PathParams, Request};
use crate::response::Response;

/// State carried through a chain for a single request.
///
/// A context is created fresh for every dispatch and is owned by whichever
/// step or sink is currently running. It holds the inbound request, the
/// response being written, extracted path parameters, and a local store
/// steps use to hand values down the chain.
pub struct FlowContext {
    /// The inbound request.
    pub request: Request,
    /// The response being written.
    pub response: Response,
    local: HashMap<String, Box<dyn Any + Send + Sync>>,
    params: PathParams,
}

impl FlowContext {
    /// Creates a context for a request with its extracted parameters.
    #[must_use]
    pub fn new(request: Request, params: PathParams) -> Self {
        Self {
            request,
            response: Response::ok(),
            local: HashMap::new(),
            params,
        }
    }

    /// Stores a local value, replacing any previous value under `key`.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.local.insert(key.into(), Box::new(value));
    }

    /// Gets a local value.
    ///
    /// Returns `None` if nothing is stored under `key` or the stored value
    /// is not a `T`.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.local.get(key).and_then(|v| (**v).downcast_ref::<T>())
    }

    /// Gets a mutable reference to a local value.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.local.get_mut(key).and_then(|v| (**v).downcast_mut::<T>())
    }

    /// Removes a local value.
    pub fn delete(&mut self, key: &str) {
        self.local.remove(key);
    }

    /// Returns true if a local value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.local.contains_key(key)
    }

    /// Returns a path parameter, or an empty string if it was not captured.
    #[must_use]
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).unwrap_or("")
    }

    /// Returns all captured path parameters.
    #[must_use]
    pub const fn params(&self) -> &PathParams {
        &self.params
    }

    /// Sets the response status.
    pub fn status(&mut self, status: u16) {
        self.response.status = status;
    }

    /// Sets a response header.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.response.set_header(key, value);
    }

    /// Writes a JSON response.
    ///
    /// Headers already set on the response are kept.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: u16, data: &T) {
        self.response.set_header("Content-Type", "application/json");
        match serde_json::to_vec(data) {
            Ok(body) => {
                self.response.status = status;
                self.response.body = body;
            }
            Err(err) => {
                warn!(error = %err, "failed to encode JSON response");
                self.response.status = 500;
                self.response.body = br#"{"error": "failed to encode JSON"}"#.to_vec();
            }
        }
    }

    /// Writes a plain text response.
    pub fn text(&mut self, status: u16, body: impl Into<String>) {
        self.response
            .set_header("Content-Type", "text/plain; charset=utf-8");
        self.response.status = status;
        self.response.body = body.into().into_bytes();
    }

    /// Parses the request body as JSON.
    ///
    /// # Errors
    ///
    /// On a malformed body a 400 response is written and
    /// [`RouterError::InvalidBody`](crate::RouterError::InvalidBody) is
    /// returned; the caller should stop handling the request.
    pub fn bind_json<T: DeserializeOwned>(&mut self) -> Result<T> {
        match serde_json::from_slice(&self.request.body) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.text(400, "invalid JSON");
                Err(err.into())
            }
        }
    }

    /// Consumes the context and returns the response.
    #[must_use]
    pub fn into_response(self) -> Response {
        self.response
    }
}

impl std::fmt::Debug for FlowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowContext")
            .field("request", &self.request)
            .field("response", &self.response)
            .field("local", &self.local.keys().collect::<Vec<_>>())
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::error::RouterError;

    fn ctx() -> FlowContext {
        let mut params = PathParams::new();
        params.insert("id", "42");
        FlowContext::new(Request::post("/users/42"), params)
    }

    #[test]
    fn test_local_store() {
        let mut ctx = ctx();
        ctx.set("appName", "demo".to_string());
        ctx.set("count", 3_u32);

        assert_eq!(ctx.get::<String>("appName").map(String::as_str), Some("demo"));
        assert_eq!(ctx.get::<u32>("count"), Some(&3));
        assert!(ctx.contains("count"));

        ctx.delete("count");
        assert_eq!(ctx.get::<u32>("count"), None);
        assert!(!ctx.contains("count"));
    }

    #[test]
    fn test_get_with_wrong_type_is_absent() {
        let mut ctx = ctx();
        ctx.set("flag", true);
        assert_eq!(ctx.get::<String>("flag"), None);
        assert_eq!(ctx.get::<bool>("flag"), Some(&true));
    }

    #[test]
    fn test_get_mut() {
        let mut ctx = ctx();
        ctx.set("hits", 1_u64);
        if let Some(hits) = ctx.get_mut::<u64>("hits") {
            *hits += 1;
        }
        assert_eq!(ctx.get::<u64>("hits"), Some(&2));
    }

    #[test]
    fn test_param() {
        let ctx = ctx();
        assert_eq!(ctx.param("id"), "42");
        assert_eq!(ctx.param("missing"), "");
    }

    #[test]
    fn test_json_keeps_existing_headers() {
        let mut ctx = ctx();
        ctx.set_header("X-App", "oxide-flow");
        ctx.json(201, &serde_json::json!({"ok": true}));

        let res = ctx.into_response();
        assert_eq!(res.status, 201);
        assert_eq!(res.get_header("X-App"), Some("oxide-flow"));
        assert_eq!(res.get_header("Content-Type"), Some("application/json"));
        assert_eq!(res.body_string(), Some(r#"{"ok":true}"#.to_string()));
    }

    #[derive(Debug, Deserialize)]
    struct Login {
        username: String,
    }

    #[test]
    fn test_bind_json() {
        let mut ctx = FlowContext::new(
            Request::post("/login").body(r#"{"username":"alice"}"#),
            PathParams::new(),
        );
        let login: Login = ctx.bind_json().unwrap();
        assert_eq!(login.username, "alice");
        assert_eq!(ctx.response.status, 200);
    }

    #[test]
    fn test_bind_json_failure_writes_bad_request() {
        let mut ctx = FlowContext::new(Request::post("/login").body("{nope"), PathParams::new());
        let err = ctx.bind_json::<Login>().unwrap_err();

        assert!(matches!(err, RouterError::InvalidBody(_)));
        assert_eq!(ctx.response.status, 400);
        assert_eq!(ctx.response.body_string(), Some("invalid JSON".to_string()));
    }
}
