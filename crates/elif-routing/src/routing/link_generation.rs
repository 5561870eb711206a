//! Decision tree over required link values
//!
//! Outbound entries are selected by the values that must be present for them,
//! for example `controller = Store, action = Index`. The tree branches on each
//! required key so that a lookup only visits entries whose requirements can be
//! satisfied by the explicit or ambient values.

use crate::routing::binder::TemplateBinder;
use crate::routing::entry::OutboundRouteEntry;
use crate::routing::values::{fold, RouteValues};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// An outbound entry together with its binder
#[derive(Debug)]
pub struct OutboundMatch {
    pub entry: Arc<OutboundRouteEntry>,
    pub binder: TemplateBinder,
}

impl OutboundMatch {
    pub fn new(entry: Arc<OutboundRouteEntry>) -> Self {
        let binder = TemplateBinder::new(entry.shared_template(), entry.defaults().clone());
        Self { entry, binder }
    }
}

/// A candidate produced by [`LinkGenerationDecisionTree::get_matches`]
#[derive(Debug, Clone)]
pub struct OutboundMatchResult {
    pub outbound: Arc<OutboundMatch>,
    /// Reached only because an absent value satisfied an empty requirement
    pub is_fallback_match: bool,
}

#[derive(Debug, Default)]
struct DecisionNode {
    matches: Vec<Arc<OutboundMatch>>,
    criteria: Vec<DecisionCriterion>,
}

#[derive(Debug)]
struct DecisionCriterion {
    key: String,
    branches: HashMap<String, DecisionNode>,
}

/// Entry plus its folded required values
struct Item {
    outbound: Arc<OutboundMatch>,
    required: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct LinkGenerationDecisionTree {
    root: DecisionNode,
}

impl LinkGenerationDecisionTree {
    pub fn new(matches: &[Arc<OutboundMatch>]) -> Self {
        let items: Vec<Item> = matches
            .iter()
            .map(|outbound| Item {
                outbound: Arc::clone(outbound),
                required: outbound
                    .entry
                    .required_link_values()
                    .iter()
                    .map(|(key, value)| (fold(key), fold(value)))
                    .collect(),
            })
            .collect();
        let refs: Vec<&Item> = items.iter().collect();
        Self {
            root: build_node(&refs, &mut Vec::new()),
        }
    }

    /// Candidates for the given values, best first
    pub fn get_matches(
        &self,
        values: &RouteValues,
        ambient: &RouteValues,
    ) -> Vec<OutboundMatchResult> {
        let mut results = Vec::new();
        walk(&self.root, values, ambient, false, &mut results);
        results.sort_by(|a, b| {
            let (left, right) = (&a.outbound.entry, &b.outbound.entry);
            left.order()
                .cmp(&right.order())
                .then_with(|| right.precedence().cmp(left.precedence()))
                .then_with(|| a.is_fallback_match.cmp(&b.is_fallback_match))
                .then_with(|| left.template().text().cmp(right.template().text()))
        });
        results
    }
}

fn build_node(items: &[&Item], used: &mut Vec<String>) -> DecisionNode {
    let mut node = DecisionNode::default();
    let mut criteria: BTreeMap<&str, BTreeMap<&str, Vec<usize>>> = BTreeMap::new();

    for (index, item) in items.iter().enumerate() {
        let mut satisfied = true;
        for (key, value) in &item.required {
            if used.contains(key) {
                continue;
            }
            satisfied = false;
            criteria
                .entry(key.as_str())
                .or_default()
                .entry(value.as_str())
                .or_default()
                .push(index);
        }
        if satisfied {
            node.matches.push(Arc::clone(&item.outbound));
        }
    }

    // keys that split the items the most come first
    let mut ordered: Vec<(&str, BTreeMap<&str, Vec<usize>>)> = criteria.into_iter().collect();
    ordered.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

    let mut placed: HashSet<usize> = HashSet::new();
    for (key, branches) in ordered {
        let mut criterion = DecisionCriterion {
            key: key.to_string(),
            branches: HashMap::new(),
        };
        let mut newly_placed = Vec::new();

        used.push(key.to_string());
        for (value, indexes) in branches {
            let branch_items: Vec<&Item> = indexes
                .iter()
                .filter(|index| !placed.contains(*index))
                .map(|index| items[*index])
                .collect();
            if branch_items.is_empty() {
                continue;
            }
            newly_placed.extend(indexes.iter().copied());
            criterion.branches.insert(value.to_string(), build_node(&branch_items, used));
        }
        used.pop();

        placed.extend(newly_placed);
        if !criterion.branches.is_empty() {
            node.criteria.push(criterion);
        }
    }

    node
}

fn walk(
    node: &DecisionNode,
    values: &RouteValues,
    ambient: &RouteValues,
    is_fallback: bool,
    results: &mut Vec<OutboundMatchResult>,
) {
    results.extend(node.matches.iter().map(|outbound| OutboundMatchResult {
        outbound: Arc::clone(outbound),
        is_fallback_match: is_fallback,
    }));

    for criterion in &node.criteria {
        match values.get(&criterion.key) {
            Some(value) => {
                if let Some(branch) = criterion.branches.get(&fold(value)) {
                    walk(branch, values, ambient, is_fallback, results);
                }
            }
            None => {
                let current = ambient.get(&criterion.key).filter(|current| !current.is_empty());
                if let Some(current) = current {
                    if let Some(branch) = criterion.branches.get(&fold(current)) {
                        walk(branch, values, ambient, is_fallback, results);
                    }
                }
                // an absent value also satisfies a requirement of "no value"
                if let Some(branch) = criterion.branches.get("") {
                    walk(branch, values, ambient, true, results);
                }
            }
        }
    }
}
