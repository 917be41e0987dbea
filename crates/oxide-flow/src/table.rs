//! Two-tier route table.
//!
//! Static paths live in an exact-match map and are checked first. Paths
//! registered as dynamic are compiled into patterns and scanned in
//! registration order; the first pattern that matches wins, so more specific
//! patterns must be registered before more general ones.
//!
//! The two tiers are independent. A path string can have both a static and
//! a dynamic entry; the static one shadows the dynamic one for requests that
//! match the string literally.

use std::collections::HashMap;

use tracing::debug;

use crate::chain::{compose, BoxedSink, BoxedStep};
use crate::error::{Result, RouterError};
use crate::path::CompiledPattern;
use crate::request::{Method, PathParams};

/// A handler wrapped in its steps for one method.
pub struct RouteEntry {
    method: Method,
    /// Composed once at registration.
    chain: BoxedSink,
}

impl RouteEntry {
    /// Creates an entry by wrapping `sink` in `steps`, outermost first.
    #[must_use]
    pub fn new(method: Method, steps: &[BoxedStep], sink: BoxedSink) -> Self {
        Self {
            method,
            chain: compose(sink, steps),
        }
    }

    /// Returns the method this entry serves.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Returns the composed chain.
    #[must_use]
    pub const fn chain(&self) -> &BoxedSink {
        &self.chain
    }
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Per-method entries registered for one path.
#[derive(Debug, Default)]
pub struct RouteGroup {
    get: Option<RouteEntry>,
    post: Option<RouteEntry>,
}

impl RouteGroup {
    /// Returns the entry for a method, if one was registered.
    #[must_use]
    pub const fn entry(&self, method: Method) -> Option<&RouteEntry> {
        match method {
            Method::Get => self.get.as_ref(),
            Method::Post => self.post.as_ref(),
            _ => None,
        }
    }

    /// Returns the methods this group accepts.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        [&self.get, &self.post]
            .into_iter()
            .flatten()
            .map(RouteEntry::method)
            .collect()
    }

    fn insert(&mut self, entry: RouteEntry) -> Result<()> {
        let method = entry.method;
        match method {
            Method::Get => self.get = Some(entry),
            Method::Post => self.post = Some(entry),
            other => return Err(RouterError::UnsupportedMethod(other.to_string())),
        }
        Ok(())
    }
}

/// A dynamic route: a compiled pattern and the group it resolves to.
#[derive(Debug)]
struct DynamicRoute {
    pattern: CompiledPattern,
    group: RouteGroup,
}

/// The result of resolving a path.
#[derive(Debug)]
pub struct Resolved<'a> {
    /// The path string or template the group was registered under.
    pub route: &'a str,
    /// The matched group.
    pub group: &'a RouteGroup,
    /// Extracted parameters; empty for static and wildcard-only routes.
    pub params: PathParams,
}

/// Static and dynamic routes for one router.
#[derive(Debug, Default)]
pub struct RouteTable {
    statics: HashMap<String, RouteGroup>,
    dynamics: Vec<DynamicRoute>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or updates the group for `full_path`.
    ///
    /// With `dynamic` set, `full_path` is compiled into a pattern. A second
    /// dynamic registration of the same template updates the existing
    /// group; a new template is appended after all earlier ones. Otherwise
    /// the static entry for `full_path` is written. Neither tier touches
    /// the other.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::UnsupportedMethod`] for methods other than GET
    /// and POST, and [`RouterError::DuplicateParam`] or
    /// [`RouterError::InvalidPattern`] if the template does not compile.
    pub fn register(
        &mut self,
        full_path: &str,
        method: Method,
        steps: &[BoxedStep],
        sink: BoxedSink,
        dynamic: bool,
    ) -> Result<()> {
        if !method.is_routable() {
            return Err(RouterError::UnsupportedMethod(method.to_string()));
        }

        let entry = RouteEntry::new(method, steps, sink);

        if dynamic {
            if let Some(existing) = self
                .dynamics
                .iter_mut()
                .find(|d| d.pattern.template() == full_path)
            {
                existing.group.insert(entry)?;
            } else {
                let pattern = CompiledPattern::compile(full_path)?;
                let mut group = RouteGroup::default();
                group.insert(entry)?;
                self.dynamics.push(DynamicRoute { pattern, group });
            }
        } else {
            self.statics
                .entry(full_path.to_string())
                .or_default()
                .insert(entry)?;
        }

        debug!(
            method = %method,
            path = full_path,
            dynamic,
            steps = steps.len(),
            "registered route"
        );
        Ok(())
    }

    /// Resolves a path to its route group.
    ///
    /// Static routes are checked first by exact match. Dynamic routes are
    /// then tried in registration order.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<Resolved<'_>> {
        if let Some((route, group)) = self.statics.get_key_value(path) {
            return Some(Resolved {
                route,
                group,
                params: PathParams::new(),
            });
        }

        self.dynamics.iter().find_map(|d| {
            d.pattern.captures(path).map(|params| Resolved {
                route: d.pattern.template(),
                group: &d.group,
                params,
            })
        })
    }

    /// Returns the number of static paths.
    #[must_use]
    pub fn static_len(&self) -> usize {
        self.statics.len()
    }

    /// Returns the number of dynamic patterns.
    #[must_use]
    pub fn dynamic_len(&self) -> usize {
        self.dynamics.len()
    }
}
