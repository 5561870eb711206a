//! The built router: request matching, dispatch and link generation

use crate::config::RouterOptions;
use crate::routing::constraints::RouteDirection;
use crate::routing::context::{
    Dispatch, RouteContext, RouteMatch, RouteOutcome, VirtualPathContext, VirtualPathData,
};
use crate::routing::diagnostics::RouteDescriptor;
use crate::routing::entry::{InboundRouteEntry, OutboundRouteEntry};
use crate::routing::link_generation::{LinkGenerationDecisionTree, OutboundMatch};
use crate::routing::tokenizer::PathTokens;
use crate::routing::tree::{InboundMatch, TreeWalker, UrlMatchingTree};
use crate::routing::values::{fold, route_parts_equal, RouteValues};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Immutable route table produced by
/// [`TreeRouteBuilder::build`](crate::routing::TreeRouteBuilder::build).
///
/// The router holds no interior mutability and can be shared between tasks
/// behind an `Arc`.
#[derive(Debug)]
pub struct TreeRouter {
    trees: Vec<UrlMatchingTree>,
    inbound: Vec<Arc<InboundRouteEntry>>,
    outbound: Vec<Arc<OutboundMatch>>,
    named: HashMap<String, Arc<OutboundMatch>>,
    link_tree: LinkGenerationDecisionTree,
    options: RouterOptions,
}

impl TreeRouter {
    pub(crate) fn new(
        trees: Vec<UrlMatchingTree>,
        inbound: Vec<Arc<InboundRouteEntry>>,
        outbound: Vec<Arc<OutboundMatch>>,
        named: HashMap<String, Arc<OutboundMatch>>,
        link_tree: LinkGenerationDecisionTree,
        options: RouterOptions,
    ) -> Self {
        Self {
            trees,
            inbound,
            outbound,
            named,
            link_tree,
            options,
        }
    }

    /// Match the context path and dispatch to the first handler that accepts it.
    ///
    /// Each candidate sees the context values merged with its bound values and
    /// its data tokens. A handler that declines gets the context restored
    /// before the next candidate runs.
    pub async fn route(&self, context: &mut RouteContext) -> RouteOutcome {
        let path = context.path().to_string();
        let tokens = PathTokens::new(&path);
        let snapshot_values = context.values.clone();
        let snapshot_tokens = context.data_tokens.clone();

        for candidate in self.candidates(&tokens, &snapshot_values) {
            let mut data_tokens = snapshot_tokens.clone();
            data_tokens.merge(&candidate.data_tokens);
            context.values = candidate.values;
            context.data_tokens = data_tokens;

            debug!("Dispatching '{}' to route '{}'", path, candidate.entry.template());
            match candidate.entry.handler().route(context).await {
                Dispatch::Handled => {
                    return RouteOutcome::Handled(RouteMatch {
                        entry: candidate.entry,
                        values: context.values.clone(),
                        data_tokens: context.data_tokens.clone(),
                    });
                }
                Dispatch::Declined => {
                    debug!("Route '{}' declined '{}'", candidate.entry.template(), path);
                    context.values = snapshot_values.clone();
                    context.data_tokens = snapshot_tokens.clone();
                }
            }
        }

        debug!("No route matched '{}'", path);
        RouteOutcome::NoMatch
    }

    /// First route whose template and constraints accept `path`, without dispatching
    pub fn match_path(&self, path: &str, ambient: &RouteValues) -> Option<RouteMatch> {
        let tokens = PathTokens::new(path);
        self.candidates(&tokens, ambient).next()
    }

    /// Lazily enumerate every route accepting the tokenized path, best first
    pub fn candidates<'a>(
        &'a self,
        tokens: &'a PathTokens<'a>,
        ambient: &'a RouteValues,
    ) -> MatchCandidates<'a> {
        let trees: &'a [UrlMatchingTree] = match self.options.max_path_segments {
            Some(max) if tokens.len() > max => {
                debug!(
                    "Path has {} segments, more than the configured maximum of {}",
                    tokens.len(),
                    max
                );
                &[]
            }
            _ => &self.trees,
        };

        let no_matches: &'a [Arc<InboundMatch>] = &[];
        MatchCandidates {
            trees: trees.iter(),
            walker: None,
            node_matches: no_matches.iter(),
            tokens,
            ambient,
        }
    }

    /// Generate a link for the given values.
    ///
    /// A route name selects that route directly. Without one, candidates come
    /// from the decision tree over required link values and the first one that
    /// binds wins.
    pub fn generate_virtual_path(&self, context: &VirtualPathContext) -> Option<VirtualPathData> {
        if let Some(name) = &context.route_name {
            return match self.named.get(&fold(name)) {
                Some(outbound) => self.generate_with(outbound, context),
                None => {
                    debug!("No outbound route is named '{}'", name);
                    None
                }
            };
        }

        self.link_tree
            .get_matches(&context.values, &context.ambient_values)
            .into_iter()
            .find_map(|result| self.generate_with(&result.outbound, context))
    }

    fn generate_with(
        &self,
        outbound: &OutboundMatch,
        context: &VirtualPathContext,
    ) -> Option<VirtualPathData> {
        let entry = &outbound.entry;
        let template = entry.template();
        let required = entry.required_link_values();

        // required values that are not parameters selected the route; they are not link values
        let mut values = RouteValues::with_capacity(context.values.len());
        for (key, value) in context.values.iter() {
            if required.contains_key(key) && template.parameter(key).is_none() {
                continue;
            }
            values.insert(key, value);
        }

        let reuse_ambient = required.keys().all(|key| {
            template.parameter(key).is_some()
                || match context.values.get(key) {
                    Some(explicit) => {
                        route_parts_equal(Some(explicit), context.ambient_values.get(key))
                    }
                    None => true,
                }
        });
        let ambient = reuse_ambient.then_some(&context.ambient_values);

        let result = outbound.binder.get_values(ambient, &values)?;
        if !entry
            .constraints()
            .matches(template.text(), &result.combined_values, RouteDirection::UrlGeneration)
        {
            return None;
        }

        let bound = outbound.binder.bind_values(&result.accepted_values)?;
        Some(VirtualPathData {
            path: bound.render(&self.options),
            data_tokens: entry.data_tokens().clone(),
            route_name: entry.name().map(str::to_string),
        })
    }

    /// Matching trees, one per order, ascending
    pub fn matching_trees(&self) -> &[UrlMatchingTree] {
        &self.trees
    }

    pub fn inbound_entries(&self) -> &[Arc<InboundRouteEntry>] {
        &self.inbound
    }

    pub fn outbound_entries(&self) -> impl Iterator<Item = &OutboundRouteEntry> {
        self.outbound.iter().map(|outbound| outbound.entry.as_ref())
    }

    /// Outbound route registered under `name`
    pub fn named_route(&self, name: &str) -> Option<&OutboundRouteEntry> {
        self.named.get(&fold(name)).map(|outbound| outbound.entry.as_ref())
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Describe every registered route
    pub fn describe(&self) -> Vec<RouteDescriptor> {
        let inbound = self.inbound.iter().map(|entry| RouteDescriptor::inbound(entry));
        let outbound = self.outbound_entries().map(RouteDescriptor::outbound);
        inbound.chain(outbound).collect()
    }
}

/// Iterator returned by [`TreeRouter::candidates`]
pub struct MatchCandidates<'a> {
    trees: std::slice::Iter<'a, UrlMatchingTree>,
    walker: Option<TreeWalker<'a>>,
    node_matches: std::slice::Iter<'a, Arc<InboundMatch>>,
    tokens: &'a PathTokens<'a>,
    ambient: &'a RouteValues,
}

impl<'a> MatchCandidates<'a> {
    fn evaluate(&self, inbound: &InboundMatch) -> Option<RouteMatch> {
        let extracted = inbound.matcher.try_match(self.tokens)?;

        let mut values = self.ambient.clone();
        values.merge(&extracted);

        let entry = &inbound.entry;
        if !entry
            .constraints()
            .matches(entry.template().text(), &values, RouteDirection::IncomingRequest)
        {
            return None;
        }

        Some(RouteMatch {
            entry: Arc::clone(entry),
            values,
            data_tokens: entry.data_tokens().clone(),
        })
    }
}

impl<'a> Iterator for MatchCandidates<'a> {
    type Item = RouteMatch;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(inbound) = self.node_matches.next() {
                match self.evaluate(inbound) {
                    Some(candidate) => return Some(candidate),
                    None => continue,
                }
            }

            if let Some(node) = self.walker.as_mut().and_then(Iterator::next) {
                self.node_matches = node.matches().iter();
                continue;
            }

            let tree = self.trees.next()?;
            self.walker = Some(tree.walk(self.tokens));
        }
    }
}
