//! Route table entries
//!
//! Entries are created through [`TreeRouteBuilder`](crate::routing::TreeRouteBuilder)
//! and configured with the chained `with_*` methods before the router is built.

use crate::errors::{RouteBuildError, TemplateError};
use crate::routing::constraints::{OptionalRouteConstraint, RouteConstraint, RouteConstraints};
use crate::routing::context::RouteHandler;
use crate::routing::precedence::Precedence;
use crate::routing::template::RouteTemplate;
use crate::routing::values::RouteValues;
use std::fmt;
use std::sync::Arc;

/// Settings shared by inbound and outbound entries
#[derive(Debug, Clone)]
struct EntryCore {
    template: Arc<RouteTemplate>,
    order: i32,
    precedence: Precedence,
    explicit_precedence: bool,
    name: Option<String>,
    constraints: RouteConstraints,
    defaults: RouteValues,
    data_tokens: RouteValues,
}

impl EntryCore {
    fn new(template: RouteTemplate, name: Option<&str>, order: i32) -> Self {
        let mut defaults = RouteValues::new();
        for parameter in template.parameters() {
            if let Some(default) = parameter.default_value() {
                defaults.insert(parameter.name(), default);
            }
        }
        Self {
            template: Arc::new(template),
            order,
            precedence: Precedence::default(),
            explicit_precedence: false,
            name: name.map(str::to_string),
            constraints: RouteConstraints::new(),
            defaults,
            data_tokens: RouteValues::new(),
        }
    }

    fn add_default(&mut self, key: &str, value: &str) -> Result<(), RouteBuildError> {
        if let Some(parameter) = self.template.parameter(key) {
            if parameter.is_optional() {
                return Err(TemplateError::OptionalWithDefault {
                    template: self.template.text().to_string(),
                    name: parameter.name().to_string(),
                }
                .into());
            }
            if parameter.default_value().is_some() {
                return Err(RouteBuildError::invalid_argument(format!(
                    "The parameter '{}' of route '{}' has both an inline and an explicit default value",
                    parameter.name(),
                    self.template.text()
                )));
            }
        }
        self.defaults.insert(key, value);
        Ok(())
    }

    fn add_constraint(&mut self, parameter: &str, constraint: Arc<dyn RouteConstraint>) {
        let constraint: Arc<dyn RouteConstraint> = match self.template.parameter(parameter) {
            Some(part) if part.is_optional() => Arc::new(OptionalRouteConstraint::new(constraint)),
            _ => constraint,
        };
        self.constraints.add(parameter, constraint);
    }
}

/// An entry used to match incoming request paths
#[derive(Clone)]
pub struct InboundRouteEntry {
    core: EntryCore,
    handler: Arc<dyn RouteHandler>,
}

impl InboundRouteEntry {
    pub(crate) fn new(
        handler: Arc<dyn RouteHandler>,
        template: RouteTemplate,
        name: Option<&str>,
        order: i32,
    ) -> Self {
        let mut core = EntryCore::new(template, name, order);
        core.precedence = Precedence::compute_inbound_with(&core.template, &core.constraints);
        Self { core, handler }
    }

    /// Override the computed precedence
    pub fn with_precedence(&mut self, precedence: Precedence) -> &mut Self {
        self.core.precedence = precedence;
        self.core.explicit_precedence = true;
        self
    }

    /// Add a default value; parameters may not have both an inline and an explicit default
    pub fn with_default(&mut self, key: &str, value: &str) -> Result<&mut Self, RouteBuildError> {
        self.core.add_default(key, value)?;
        Ok(self)
    }

    /// Append a constraint for `parameter`, evaluated after its inline constraints
    pub fn with_constraint(
        &mut self,
        parameter: &str,
        constraint: Arc<dyn RouteConstraint>,
    ) -> &mut Self {
        self.core.add_constraint(parameter, constraint);
        if !self.core.explicit_precedence {
            self.core.precedence =
                Precedence::compute_inbound_with(&self.core.template, &self.core.constraints);
        }
        self
    }

    pub fn with_data_token(&mut self, key: &str, value: &str) -> &mut Self {
        self.core.data_tokens.insert(key, value);
        self
    }

    pub fn template(&self) -> &RouteTemplate {
        &self.core.template
    }

    pub(crate) fn shared_template(&self) -> Arc<RouteTemplate> {
        Arc::clone(&self.core.template)
    }

    pub fn handler(&self) -> &Arc<dyn RouteHandler> {
        &self.handler
    }

    pub fn order(&self) -> i32 {
        self.core.order
    }

    pub fn precedence(&self) -> &Precedence {
        &self.core.precedence
    }

    pub fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    pub fn constraints(&self) -> &RouteConstraints {
        &self.core.constraints
    }

    pub fn defaults(&self) -> &RouteValues {
        &self.core.defaults
    }

    pub fn data_tokens(&self) -> &RouteValues {
        &self.core.data_tokens
    }
}

impl fmt::Debug for InboundRouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundRouteEntry")
            .field("template", &self.core.template.text())
            .field("order", &self.core.order)
            .field("precedence", &self.core.precedence)
            .field("name", &self.core.name)
            .field("defaults", &self.core.defaults)
            .finish_non_exhaustive()
    }
}

/// An entry used to generate links
#[derive(Debug, Clone)]
pub struct OutboundRouteEntry {
    core: EntryCore,
    required_link_values: RouteValues,
}

impl OutboundRouteEntry {
    pub(crate) fn new(
        template: RouteTemplate,
        required_link_values: RouteValues,
        name: Option<&str>,
        order: i32,
    ) -> Self {
        let mut core = EntryCore::new(template, name, order);
        core.precedence = Precedence::compute_outbound_with(&core.template, &core.constraints);
        Self {
            core,
            required_link_values,
        }
    }

    pub fn with_precedence(&mut self, precedence: Precedence) -> &mut Self {
        self.core.precedence = precedence;
        self.core.explicit_precedence = true;
        self
    }

    pub fn with_default(&mut self, key: &str, value: &str) -> Result<&mut Self, RouteBuildError> {
        self.core.add_default(key, value)?;
        Ok(self)
    }

    pub fn with_constraint(
        &mut self,
        parameter: &str,
        constraint: Arc<dyn RouteConstraint>,
    ) -> &mut Self {
        self.core.add_constraint(parameter, constraint);
        if !self.core.explicit_precedence {
            self.core.precedence =
                Precedence::compute_outbound_with(&self.core.template, &self.core.constraints);
        }
        self
    }

    pub fn with_data_token(&mut self, key: &str, value: &str) -> &mut Self {
        self.core.data_tokens.insert(key, value);
        self
    }

    pub fn template(&self) -> &RouteTemplate {
        &self.core.template
    }

    pub(crate) fn shared_template(&self) -> Arc<RouteTemplate> {
        Arc::clone(&self.core.template)
    }

    pub fn order(&self) -> i32 {
        self.core.order
    }

    pub fn precedence(&self) -> &Precedence {
        &self.core.precedence
    }

    pub fn name(&self) -> Option<&str> {
        self.core.name.as_deref()
    }

    pub fn constraints(&self) -> &RouteConstraints {
        &self.core.constraints
    }

    pub fn defaults(&self) -> &RouteValues {
        &self.core.defaults
    }

    pub fn data_tokens(&self) -> &RouteValues {
        &self.core.data_tokens
    }

    /// Values that must be present (or absent, when empty) to select this entry
    pub fn required_link_values(&self) -> &RouteValues {
        &self.required_link_values
    }
}
