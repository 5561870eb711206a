//! Tree-based routing engine for elif.rs
//!
//! This module provides:
//! - Route template parsing with parameters, constraints, defaults and catch-alls
//! - Prefix-tree matching of request paths with deterministic precedence
//! - Handler dispatch with backtracking when a handler declines
//! - Link generation driven by required values and ambient request values
//! - Route table diagnostics

pub mod binder;
pub mod builder;
pub mod constraints;
pub mod context;
pub mod diagnostics;
pub mod entry;
pub mod link_generation;
pub mod matcher;
pub mod precedence;
pub mod router;
pub mod template;
pub mod tokenizer;
pub mod tree;
pub mod values;

pub use binder::{BoundUrl, TemplateBinder, TemplateValuesResult};
pub use builder::TreeRouteBuilder;
pub use constraints::{
    BuiltinConstraint, ConstraintResolver, OptionalRouteConstraint, RouteConstraint,
    RouteConstraints, RouteDirection,
};
pub use context::{
    handler_fn, Dispatch, FnHandler, RouteContext, RouteHandler, RouteMatch, RouteOutcome,
    VirtualPathContext, VirtualPathData,
};
pub use diagnostics::{RouteDescriptor, RouteDiagnostics, RouteKind};
pub use entry::{InboundRouteEntry, OutboundRouteEntry};
pub use link_generation::{LinkGenerationDecisionTree, OutboundMatch, OutboundMatchResult};
pub use matcher::TemplateMatcher;
pub use precedence::Precedence;
pub use router::{MatchCandidates, TreeRouter};
pub use template::{
    InlineConstraint, ParameterKind, ParameterPart, RouteTemplate, TemplatePart, TemplateSegment,
};
pub use tokenizer::PathTokens;
pub use tree::{build_trees, InboundMatch, TreeWalker, UrlMatchingNode, UrlMatchingTree};
pub use values::RouteValues;
