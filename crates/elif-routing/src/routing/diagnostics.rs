//! Route table diagnostics for development and debugging
//!
//! Produces a serializable description of every registered route, a text
//! report of the route table, and a dump of the matching trees showing the
//! order in which branches are tried.

use crate::routing::entry::{InboundRouteEntry, OutboundRouteEntry};
use crate::routing::precedence::Precedence;
use crate::routing::router::TreeRouter;
use crate::routing::tree::{UrlMatchingNode, UrlMatchingTree};
use crate::routing::values::RouteValues;
use serde::Serialize;

/// Which table a route belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Inbound,
    Outbound,
}

/// Serializable summary of one route entry
#[derive(Debug, Clone, Serialize)]
pub struct RouteDescriptor {
    pub kind: RouteKind,
    pub template: String,
    pub name: Option<String>,
    pub order: i32,
    pub precedence: Precedence,
    pub defaults: RouteValues,
    /// Parameters that carry at least one constraint
    pub constrained_parameters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_link_values: Option<RouteValues>,
}

impl RouteDescriptor {
    pub fn inbound(entry: &InboundRouteEntry) -> Self {
        Self {
            kind: RouteKind::Inbound,
            template: entry.template().text().to_string(),
            name: entry.name().map(str::to_string),
            order: entry.order(),
            precedence: entry.precedence().clone(),
            defaults: entry.defaults().clone(),
            constrained_parameters: entry
                .constraints()
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
            required_link_values: None,
        }
    }

    pub fn outbound(entry: &OutboundRouteEntry) -> Self {
        Self {
            kind: RouteKind::Outbound,
            template: entry.template().text().to_string(),
            name: entry.name().map(str::to_string),
            order: entry.order(),
            precedence: entry.precedence().clone(),
            defaults: entry.defaults().clone(),
            constrained_parameters: entry
                .constraints()
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
            required_link_values: Some(entry.required_link_values().clone()),
        }
    }
}

/// Text and JSON reports over a built router
#[derive(Debug)]
pub struct RouteDiagnostics {
    /// Maximum width for formatted output
    max_width: usize,
}

impl RouteDiagnostics {
    pub fn new() -> Self {
        Self { max_width: 80 }
    }

    /// Set maximum output width
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Route table grouped by direction, in matching order
    pub fn format_route_table(&self, router: &TreeRouter) -> String {
        let mut descriptors = router.describe();
        descriptors.sort_by(|a, b| {
            let precedence = match a.kind {
                RouteKind::Inbound => a.precedence.cmp(&b.precedence),
                RouteKind::Outbound => b.precedence.cmp(&a.precedence),
            };
            (a.kind as u8)
                .cmp(&(b.kind as u8))
                .then(a.order.cmp(&b.order))
                .then(precedence)
                .then_with(|| a.template.cmp(&b.template))
        });

        let mut output = String::new();
        output.push_str(&self.format_header("Route Table"));
        output.push('\n');

        for kind in [RouteKind::Inbound, RouteKind::Outbound] {
            let routes: Vec<&RouteDescriptor> =
                descriptors.iter().filter(|d| d.kind == kind).collect();
            let title = match kind {
                RouteKind::Inbound => "Inbound",
                RouteKind::Outbound => "Outbound",
            };
            output.push_str(&format!("{} routes ({})\n", title, routes.len()));

            for route in routes {
                output.push_str(&format!(
                    "   [{}] {:<8} {}",
                    route.order, route.precedence, route.template
                ));
                if let Some(name) = &route.name {
                    output.push_str(&format!("  (name: {})", name));
                }
                output.push('\n');

                if !route.constrained_parameters.is_empty() {
                    let constrained = route.constrained_parameters.join(", ");
                    output.push_str(&format!("      Constrained: {}\n", constrained));
                }
                let required = route.required_link_values.as_ref().filter(|r| !r.is_empty());
                if let Some(required) = required {
                    let pairs: Vec<String> =
                        required.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                    output.push_str(&format!("      Requires: {}\n", pairs.join(", ")));
                }
            }
            output.push('\n');
        }

        output
    }

    /// Indented dump of every matching tree
    pub fn format_matching_trees(&self, router: &TreeRouter) -> String {
        let mut output = String::new();
        output.push_str(&self.format_header("Matching Trees"));
        output.push('\n');

        for tree in router.matching_trees() {
            output.push_str(&self.format_tree(tree));
        }
        output
    }

    pub fn format_tree(&self, tree: &UrlMatchingTree) -> String {
        let mut output = format!("Order {}\n", tree.order());
        format_node(tree.root(), "/", 1, &mut output);
        output
    }

    /// Route descriptors as pretty-printed JSON
    pub fn to_json(&self, router: &TreeRouter) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&router.describe())
    }

    fn format_header(&self, title: &str) -> String {
        let border = "═".repeat(self.max_width);
        format!("{}\n{:^width$}\n{}", border, title, border, width = self.max_width)
    }
}

impl Default for RouteDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

fn format_node(node: &UrlMatchingNode, label: &str, indent: usize, output: &mut String) {
    let padding = "   ".repeat(indent);
    output.push_str(&format!("{}{}", padding, label));
    if !node.matches().is_empty() {
        let templates: Vec<&str> =
            node.matches().iter().map(|m| m.entry.template().text()).collect();
        output.push_str(&format!("  => {}", templates.join(" | ")));
    }
    output.push('\n');

    let mut literals: Vec<(&String, &UrlMatchingNode)> = node.literals().iter().collect();
    literals.sort_by(|a, b| a.0.cmp(b.0));
    for (text, child) in literals {
        format_node(child, text, indent + 1, output);
    }

    let branches = [
        ("{constrained}", node.constrained_parameters()),
        ("{parameter}", node.parameters()),
        ("{*constrained}", node.constrained_catch_alls()),
        ("{*catch-all}", node.catch_alls()),
    ];
    for (label, child) in branches {
        if let Some(child) = child {
            format_node(child, label, indent + 1, output);
        }
    }
}
