//! Route table construction
//!
//! [`TreeRouteBuilder`] collects inbound and outbound entries, resolves inline
//! constraints and, on [`build`](TreeRouteBuilder::build), produces an
//! immutable [`TreeRouter`].

use crate::config::RouterOptions;
use crate::errors::RouteBuildError;
use crate::routing::constraints::{ConstraintResolver, RouteConstraint};
use crate::routing::context::RouteHandler;
use crate::routing::entry::{InboundRouteEntry, OutboundRouteEntry};
use crate::routing::link_generation::{LinkGenerationDecisionTree, OutboundMatch};
use crate::routing::router::TreeRouter;
use crate::routing::template::RouteTemplate;
use crate::routing::tree::build_trees;
use crate::routing::values::{fold, RouteValues};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Builder for a [`TreeRouter`]
#[derive(Debug)]
pub struct TreeRouteBuilder {
    options: RouterOptions,
    resolver: ConstraintResolver,
    inbound: Vec<InboundRouteEntry>,
    outbound: Vec<OutboundRouteEntry>,
}

impl TreeRouteBuilder {
    /// Create a builder with default options and the built-in constraints
    pub fn new() -> Self {
        Self {
            options: RouterOptions::default(),
            resolver: ConstraintResolver::new(),
            inbound: Vec::new(),
            outbound: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: RouterOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a custom resolver for inline constraints
    pub fn with_resolver(mut self, resolver: ConstraintResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Register a route used to match request paths
    pub fn map_inbound(
        &mut self,
        handler: Arc<dyn RouteHandler>,
        template: &str,
        name: Option<&str>,
        order: i32,
    ) -> Result<&mut InboundRouteEntry, RouteBuildError> {
        check_name(name)?;
        let template = RouteTemplate::parse(template)?;
        let inline = self.resolve_inline(&template)?;

        let mut entry = InboundRouteEntry::new(handler, template, name, order);
        for (parameter, constraint) in inline {
            entry.with_constraint(&parameter, constraint);
        }

        let index = self.inbound.len();
        self.inbound.push(entry);
        Ok(&mut self.inbound[index])
    }

    /// Register a route used to generate links
    pub fn map_outbound(
        &mut self,
        template: &str,
        required_link_values: RouteValues,
        name: Option<&str>,
        order: i32,
    ) -> Result<&mut OutboundRouteEntry, RouteBuildError> {
        check_name(name)?;
        let template = RouteTemplate::parse(template)?;
        let inline = self.resolve_inline(&template)?;

        let mut entry = OutboundRouteEntry::new(template, required_link_values, name, order);
        for (parameter, constraint) in inline {
            entry.with_constraint(&parameter, constraint);
        }

        let index = self.outbound.len();
        self.outbound.push(entry);
        Ok(&mut self.outbound[index])
    }

    pub fn inbound_entries(&self) -> &[InboundRouteEntry] {
        &self.inbound
    }

    pub fn outbound_entries(&self) -> &[OutboundRouteEntry] {
        &self.outbound
    }

    /// Remove all registered entries
    pub fn clear(&mut self) {
        self.inbound.clear();
        self.outbound.clear();
    }

    /// Build the router from the registered entries.
    ///
    /// The builder is left untouched and can be used to build again.
    pub fn build(&self) -> Result<TreeRouter, RouteBuildError> {
        self.options.validate()?;

        check_duplicate_names(self.inbound.iter().map(|entry| (entry.name(), entry.template())))?;
        check_duplicate_names(self.outbound.iter().map(|entry| (entry.name(), entry.template())))?;

        let inbound: Vec<Arc<InboundRouteEntry>> =
            self.inbound.iter().cloned().map(Arc::new).collect();
        let trees = build_trees(&inbound);

        let outbound: Vec<Arc<OutboundMatch>> = self
            .outbound
            .iter()
            .cloned()
            .map(|entry| Arc::new(OutboundMatch::new(Arc::new(entry))))
            .collect();

        let mut named = HashMap::new();
        for outbound_match in &outbound {
            if let Some(name) = outbound_match.entry.name() {
                // entries sharing a name have the same template, the first one wins
                named.entry(fold(name)).or_insert_with(|| Arc::clone(outbound_match));
            }
        }

        let link_tree = LinkGenerationDecisionTree::new(&outbound);

        info!(
            "Built tree router with {} inbound routes in {} trees and {} outbound routes ({} named)",
            inbound.len(),
            trees.len(),
            outbound.len(),
            named.len()
        );

        Ok(TreeRouter::new(
            trees,
            inbound,
            outbound,
            named,
            link_tree,
            self.options.clone(),
        ))
    }

    fn resolve_inline(
        &self,
        template: &RouteTemplate,
    ) -> Result<Vec<(String, Arc<dyn RouteConstraint>)>, RouteBuildError> {
        let mut resolved = Vec::new();
        for parameter in template.parameters() {
            for inline in parameter.inline_constraints() {
                let constraint = self
                    .resolver
                    .resolve(&inline.text)
                    .map_err(|source| RouteBuildError::Constraint {
                        parameter: parameter.name().to_string(),
                        source,
                    })?;
                resolved.push((parameter.name().to_string(), constraint));
            }
        }
        Ok(resolved)
    }
}

impl Default for TreeRouteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_name(name: Option<&str>) -> Result<(), RouteBuildError> {
    match name {
        Some(name) if name.trim().is_empty() => Err(RouteBuildError::invalid_argument(
            "A route name cannot be empty; pass None for an unnamed route",
        )),
        _ => Ok(()),
    }
}

fn check_duplicate_names<'a>(
    entries: impl Iterator<Item = (Option<&'a str>, &'a RouteTemplate)>,
) -> Result<(), RouteBuildError> {
    let mut seen: HashMap<String, &RouteTemplate> = HashMap::new();
    for (name, template) in entries {
        let Some(name) = name else { continue };
        match seen.get(&fold(name)) {
            Some(existing) if !existing.text().eq_ignore_ascii_case(template.text()) => {
                return Err(RouteBuildError::DuplicateRouteName {
                    name: name.to_string(),
                    existing: existing.text().to_string(),
                    new: template.text().to_string(),
                });
            }
            Some(_) => {}
            None => {
                seen.insert(fold(name), template);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ConstraintError, TemplateError};
    use crate::routing::context::{handler_fn, Dispatch};

    fn handled() -> Arc<dyn RouteHandler> {
        handler_fn(|_| Dispatch::Handled)
    }

    #[test]
    fn test_inline_constraints_are_resolved() {
        let mut builder = TreeRouteBuilder::new();
        let entry = builder.map_inbound(handled(), "products/{id:int:min(1)}", None, 0).unwrap();
        assert_eq!(entry.constraints().get("id").map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_unknown_constraint_names_the_parameter() {
        let mut builder = TreeRouteBuilder::new();
        let error = builder.map_inbound(handled(), "products/{id:nope}", None, 0).unwrap_err();
        match error {
            RouteBuildError::Constraint { parameter, source } => {
                assert_eq!(parameter, "id");
                assert_eq!(source, ConstraintError::Unknown("nope".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let mut builder = TreeRouteBuilder::new();
        let error = builder.map_outbound("a//b", RouteValues::new(), None, 0).unwrap_err();
        assert!(matches!(error, RouteBuildError::Template(TemplateError::EmptySegment { .. })));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut builder = TreeRouteBuilder::new();
        let error = builder.map_inbound(handled(), "a", Some(" "), 0).unwrap_err();
        assert!(matches!(error, RouteBuildError::InvalidArgument(_)));
    }

    #[test]
    fn test_duplicate_names_with_different_templates_fail() {
        let mut builder = TreeRouteBuilder::new();
        builder.map_outbound("home/index", RouteValues::new(), Some("home"), 0).unwrap();
        builder.map_outbound("home/{id}", RouteValues::new(), Some("HOME"), 0).unwrap();
        let error = builder.build().unwrap_err();
        assert!(matches!(error, RouteBuildError::DuplicateRouteName { .. }));
    }

    #[test]
    fn test_duplicate_names_with_the_same_template_are_allowed() {
        let mut builder = TreeRouteBuilder::new();
        builder.map_outbound("home/index", RouteValues::new(), Some("home"), 0).unwrap();
        builder.map_outbound("Home/Index", RouteValues::new(), Some("home"), 1).unwrap();
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_inbound_duplicate_names_are_checked_separately() {
        let mut builder = TreeRouteBuilder::new();
        builder.map_inbound(handled(), "a", Some("route"), 0).unwrap();
        builder.map_outbound("b", RouteValues::new(), Some("route"), 0).unwrap();
        assert!(builder.build().is_ok());

        builder.map_inbound(handled(), "c", Some("route"), 0).unwrap();
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_invalid_options_fail_the_build() {
        let options = RouterOptions {
            max_path_segments: Some(0),
            ..RouterOptions::default()
        };
        let builder = TreeRouteBuilder::new().with_options(options);
        assert!(matches!(builder.build(), Err(RouteBuildError::Config(_))));
    }

    #[test]
    fn test_clear_removes_entries() {
        let mut builder = TreeRouteBuilder::default();
        builder.map_inbound(handled(), "a", None, 0).unwrap();
        builder.map_outbound("a", RouteValues::new(), None, 0).unwrap();
        builder.clear();
        assert!(builder.inbound_entries().is_empty());
        assert!(builder.outbound_entries().is_empty());
    }
}
