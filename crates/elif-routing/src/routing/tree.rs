//! Prefix tree of inbound routes
//!
//! Each tree holds the routes of one `order`. Nodes branch on literal text,
//! constrained and unconstrained parameters, and catch-alls. Walking a tree
//! for a path yields candidate nodes with the most specific branches first.

use crate::routing::entry::InboundRouteEntry;
use crate::routing::matcher::TemplateMatcher;
use crate::routing::template::TemplatePart;
use crate::routing::tokenizer::PathTokens;
use crate::routing::values::fold;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// An inbound entry together with its path matcher
#[derive(Debug)]
pub struct InboundMatch {
    pub entry: Arc<InboundRouteEntry>,
    pub matcher: TemplateMatcher,
}

impl InboundMatch {
    pub fn new(entry: Arc<InboundRouteEntry>) -> Self {
        let matcher = TemplateMatcher::new(entry.shared_template(), entry.defaults().clone());
        Self { entry, matcher }
    }
}

#[derive(Debug, Default)]
pub struct UrlMatchingNode {
    depth: usize,
    is_catch_all: bool,
    matches: Vec<Arc<InboundMatch>>,
    literals: HashMap<String, UrlMatchingNode>,
    parameters: Option<Box<UrlMatchingNode>>,
    constrained_parameters: Option<Box<UrlMatchingNode>>,
    catch_alls: Option<Box<UrlMatchingNode>>,
    constrained_catch_alls: Option<Box<UrlMatchingNode>>,
}

impl UrlMatchingNode {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    fn catch_all(depth: usize) -> Self {
        Self {
            depth,
            is_catch_all: true,
            ..Self::default()
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_catch_all(&self) -> bool {
        self.is_catch_all
    }

    /// Matches ending at this node, most specific first
    pub fn matches(&self) -> &[Arc<InboundMatch>] {
        &self.matches
    }

    pub fn literals(&self) -> &HashMap<String, UrlMatchingNode> {
        &self.literals
    }

    pub fn parameters(&self) -> Option<&UrlMatchingNode> {
        self.parameters.as_deref()
    }

    pub fn constrained_parameters(&self) -> Option<&UrlMatchingNode> {
        self.constrained_parameters.as_deref()
    }

    pub fn catch_alls(&self) -> Option<&UrlMatchingNode> {
        self.catch_alls.as_deref()
    }

    pub fn constrained_catch_alls(&self) -> Option<&UrlMatchingNode> {
        self.constrained_catch_alls.as_deref()
    }

    fn add_match(&mut self, inbound: Arc<InboundMatch>) {
        self.matches.push(inbound);
        self.matches.sort_by(|a, b| {
            a.entry
                .precedence()
                .cmp(b.entry.precedence())
                .then_with(|| a.entry.template().text().cmp(b.entry.template().text()))
        });
    }
}

/// Matching tree for all entries sharing one order
#[derive(Debug)]
pub struct UrlMatchingTree {
    order: i32,
    root: UrlMatchingNode,
}

impl UrlMatchingTree {
    pub fn new(order: i32) -> Self {
        Self {
            order,
            root: UrlMatchingNode::new(0),
        }
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn root(&self) -> &UrlMatchingNode {
        &self.root
    }

    /// Add an entry to the tree
    pub fn insert(&mut self, inbound: Arc<InboundMatch>) {
        let entry = Arc::clone(&inbound.entry);
        let mut current = &mut self.root;

        for (index, segment) in entry.template().segments().iter().enumerate() {
            let depth = index + 1;
            let part = match segment.simple_part() {
                Some(part) => part,
                None => {
                    current =
                        child(&mut current.constrained_parameters, || UrlMatchingNode::new(depth));
                    continue;
                }
            };

            let parameter = match part {
                TemplatePart::Literal(text) => {
                    current = current
                        .literals
                        .entry(fold(text))
                        .or_insert_with(|| UrlMatchingNode::new(depth));
                    continue;
                }
                TemplatePart::Parameter(parameter) => parameter,
            };

            // the route also matches a path ending before this segment
            if parameter.is_optional()
                || parameter.is_catch_all()
                || entry.defaults().contains_key(parameter.name())
            {
                current.add_match(Arc::clone(&inbound));
            }

            let constrained = !parameter.inline_constraints().is_empty()
                || entry.constraints().contains(parameter.name());
            let slot = match (constrained, parameter.is_catch_all()) {
                (true, false) => &mut current.constrained_parameters,
                (false, false) => &mut current.parameters,
                (true, true) => &mut current.constrained_catch_alls,
                (false, true) => &mut current.catch_alls,
            };
            current = if parameter.is_catch_all() {
                child(slot, || UrlMatchingNode::catch_all(depth))
            } else {
                child(slot, || UrlMatchingNode::new(depth))
            };
        }

        current.add_match(inbound);
    }

    /// Walk the tree for a tokenized path
    pub fn walk<'a>(&'a self, tokens: &'a PathTokens<'a>) -> TreeWalker<'a> {
        TreeWalker::new(&self.root, tokens.as_slice())
    }
}

fn child(
    slot: &mut Option<Box<UrlMatchingNode>>,
    make: impl FnOnce() -> UrlMatchingNode,
) -> &mut UrlMatchingNode {
    slot.get_or_insert_with(|| Box::new(make()))
}

/// Group entries into one tree per order, ascending
pub fn build_trees(entries: &[Arc<InboundRouteEntry>]) -> Vec<UrlMatchingTree> {
    let mut trees: BTreeMap<i32, UrlMatchingTree> = BTreeMap::new();
    for entry in entries {
        trees
            .entry(entry.order())
            .or_insert_with(|| UrlMatchingTree::new(entry.order()))
            .insert(Arc::new(InboundMatch::new(Arc::clone(entry))));
    }
    trees.into_values().collect()
}

/// Depth-first walk yielding nodes whose matches may bind the path.
///
/// Children are pushed from least to most specific, so literal branches are
/// visited first and catch-alls last.
#[derive(Debug)]
pub struct TreeWalker<'a> {
    stack: Vec<&'a UrlMatchingNode>,
    tokens: &'a [&'a str],
}

impl<'a> TreeWalker<'a> {
    pub fn new(root: &'a UrlMatchingNode, tokens: &'a [&'a str]) -> Self {
        Self {
            stack: vec![root],
            tokens,
        }
    }
}

impl<'a> Iterator for TreeWalker<'a> {
    type Item = &'a UrlMatchingNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.is_catch_all && !node.matches.is_empty() {
                return Some(node);
            }
            if node.depth >= self.tokens.len() {
                if node.matches.is_empty() {
                    continue;
                }
                return Some(node);
            }

            let children = [
                &node.catch_alls,
                &node.constrained_catch_alls,
                &node.parameters,
                &node.constrained_parameters,
            ];
            self.stack.extend(children.into_iter().filter_map(|child| child.as_deref()));
            if let Some(literal) = node.literals.get(&fold(self.tokens[node.depth])) {
                self.stack.push(literal);
            }
        }
        None
    }
}
