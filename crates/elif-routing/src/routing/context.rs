//! Request and link generation contexts, and the handler contract

use crate::routing::entry::InboundRouteEntry;
use crate::routing::values::RouteValues;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// What a handler did with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The request was handled; routing stops
    Handled,
    /// The handler passed; routing continues with the next candidate
    Declined,
}

/// Target of an inbound route
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn route(&self, context: &mut RouteContext) -> Dispatch;
}

/// Handler built from a synchronous closure
pub struct FnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHandler")
    }
}

#[async_trait]
impl<F> RouteHandler for FnHandler<F>
where
    F: Fn(&mut RouteContext) -> Dispatch + Send + Sync,
{
    async fn route(&self, context: &mut RouteContext) -> Dispatch {
        (self.f)(context)
    }
}

/// Wrap a closure as a route handler
pub fn handler_fn<F>(f: F) -> Arc<dyn RouteHandler>
where
    F: Fn(&mut RouteContext) -> Dispatch + Send + Sync + 'static,
{
    Arc::new(FnHandler { f })
}

/// State of one inbound routing attempt.
///
/// `values` starts out as the caller's ambient values. While a handler runs it
/// holds the values bound for that handler's route, and `data_tokens` holds the
/// route's data tokens.
#[derive(Debug, Clone, Default)]
pub struct RouteContext {
    path: String,
    pub values: RouteValues,
    pub data_tokens: RouteValues,
}

impl RouteContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            values: RouteValues::new(),
            data_tokens: RouteValues::new(),
        }
    }

    pub fn with_values(mut self, values: RouteValues) -> Self {
        self.values = values;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A route selected for a request
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub entry: Arc<InboundRouteEntry>,
    pub values: RouteValues,
    pub data_tokens: RouteValues,
}

impl RouteMatch {
    pub fn route_name(&self) -> Option<&str> {
        self.entry.name()
    }

    pub fn template(&self) -> &str {
        self.entry.template().text()
    }
}

/// Result of [`TreeRouter::route`](crate::routing::TreeRouter::route)
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    Handled(RouteMatch),
    NoMatch,
}

impl RouteOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, RouteOutcome::Handled(_))
    }

    pub fn into_match(self) -> Option<RouteMatch> {
        match self {
            RouteOutcome::Handled(route_match) => Some(route_match),
            RouteOutcome::NoMatch => None,
        }
    }
}

/// Input for link generation
#[derive(Debug, Clone, Default)]
pub struct VirtualPathContext {
    pub route_name: Option<String>,
    pub values: RouteValues,
    pub ambient_values: RouteValues,
}

impl VirtualPathContext {
    pub fn new(values: RouteValues, ambient_values: RouteValues) -> Self {
        Self {
            route_name: None,
            values,
            ambient_values,
        }
    }

    pub fn with_route_name(mut self, name: impl Into<String>) -> Self {
        self.route_name = Some(name.into());
        self
    }
}

/// A generated link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPathData {
    pub path: String,
    pub data_tokens: RouteValues,
    pub route_name: Option<String>,
}
