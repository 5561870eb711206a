//! # elif-routing
//!
//! Tree-based URL routing for the elif.rs web framework.
//!
//! This crate provides:
//! - Route templates with literals, parameters, inline constraints, defaults,
//!   optional parameters, complex segments and catch-alls
//! - Deterministic precedence for both request matching and link generation
//! - A prefix-tree matcher with handler backtracking
//! - A decision-tree link generator driven by required and ambient values
//!
//! ```ignore
//! use elif_routing::{handler_fn, Dispatch, RouteContext, RouteValues, TreeRouteBuilder};
//!
//! let mut builder = TreeRouteBuilder::new();
//! builder.map_inbound(handler_fn(|_| Dispatch::Handled), "products/{id:int}", None, 0)?;
//! let required = RouteValues::from([("controller", "Products")]);
//! builder.map_outbound("products/{id}", required, Some("product"), 0)?;
//! let router = builder.build()?;
//!
//! let mut context = RouteContext::new("/products/42");
//! let outcome = router.route(&mut context).await;
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod logging;
pub mod routing;

pub use config::{ConfigError, RouterOptions, RoutingDefaults};
pub use errors::{ConstraintError, ParsePrecedenceError, RouteBuildError, TemplateError};
pub use logging::{init_logging, LoggingConfig};

// Re-export routing types
pub use routing::{
    handler_fn,
    ConstraintResolver,
    Dispatch,
    InboundRouteEntry,
    OutboundRouteEntry,
    Precedence,
    RouteConstraint,
    RouteContext,
    RouteDiagnostics,
    RouteDirection,
    RouteHandler,
    RouteMatch,
    RouteOutcome,
    RouteTemplate,
    RouteValues,
    TreeRouteBuilder,
    TreeRouter,
    VirtualPathContext,
    VirtualPathData,
};
