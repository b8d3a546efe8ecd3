//! Route-matching trie
//!
//! One trie per HTTP method. Nodes are keyed by path segment: literal text,
//! or the sentinel keys `:param` and `*splat` — so each node holds at most
//! one parameter child and one splat child. Parameter and splat *names*
//! live on the child node, not the key; two routes that disagree on a name
//! at the same position resolve last-write-wins.
//!
//! Registration builds the trie during setup; matching walks it without
//! ever mutating structure, which is what makes concurrent dispatch safe.

use crate::middleware::{Handler, Middleware};
use crate::params::Params;
use crate::pattern::Segment;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

/// Reserved child key for named-parameter segments
pub(crate) const PARAM_KEY: &str = ":param";
/// Reserved child key for splat segments
pub(crate) const SPLAT_KEY: &str = "*splat";

/// One trie of routes for a single HTTP method
#[derive(Default)]
pub struct Trie {
    root: TrieNode,
}

/// A node of the route trie
///
/// A node without a handler is a pass-through prefix shared by longer
/// routes, not a route of its own.
#[derive(Default)]
pub struct TrieNode {
    children: HashMap<String, TrieNode>,
    handler: Option<Handler>,
    validator: Option<Regex>,
    /// Name bound when this node is reached via the `:param` key
    param_name: Option<String>,
    /// Name bound when this node is reached via the `*splat` key
    splat_name: Option<String>,
    middlewares: Vec<Middleware>,
}

impl TrieNode {
    /// Terminal handler, if this node is a registered route
    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Advisory full-path validator stored at registration
    pub fn validator(&self) -> Option<&Regex> {
        self.validator.as_ref()
    }

    /// Route-scoped middlewares, in registration order
    pub fn middlewares(&self) -> &[Middleware] {
        &self.middlewares
    }

    fn store_terminal(
        &mut self,
        handler: &Handler,
        validator: &Option<Regex>,
        middlewares: &[Middleware],
    ) {
        if self.handler.is_some() {
            // Last write wins; duplicate registration is not an error
            warn!("route re-registered at the same position, overwriting previous handler");
        }
        self.handler = Some(handler.clone());
        self.validator = validator.clone();
        self.middlewares = middlewares.to_vec();
    }
}

impl Trie {
    /// Creates an empty trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route under its compiled segments
    ///
    /// Parameter segments map to the `:param` key, splats to `*splat`.
    /// A splat terminates the registration's effect on matching below it.
    /// Optional trailing groups register two terminals — with and without
    /// the group — sharing the same handler, validator, and middlewares.
    pub fn register(
        &mut self,
        segments: &[Segment],
        handler: Handler,
        validator: Option<Regex>,
        middlewares: Vec<Middleware>,
    ) {
        insert(&mut self.root, segments, &handler, &validator, &middlewares);
    }

    /// Walks the trie for a request path, in priority order: literal
    /// child, then parameter child, then splat child
    ///
    /// The splat binds the joined remainder of the path and stops
    /// consumption. Returns the terminal node plus the extracted path
    /// parameters; a handler-less landing node is not a route.
    pub fn find(&self, segments: &[&str]) -> Option<(&TrieNode, Params)> {
        let mut node = &self.root;
        let mut params = Params::new();

        let mut index = 0;
        while index < segments.len() {
            let segment = segments[index];

            if let Some(child) = node.children.get(segment) {
                node = child;
                index += 1;
            } else if let Some(child) = node.children.get(PARAM_KEY) {
                if let Some(name) = &child.param_name {
                    params.insert(name.clone(), segment);
                }
                node = child;
                index += 1;
            } else if let Some(child) = node.children.get(SPLAT_KEY) {
                if let Some(name) = &child.splat_name {
                    params.insert(name.clone(), segments[index..].join("/"));
                }
                node = child;
                break;
            } else {
                return None;
            }
        }

        // Prefix nodes are not routes
        node.handler.as_ref()?;
        Some((node, params))
    }
}

fn insert(
    node: &mut TrieNode,
    segments: &[Segment],
    handler: &Handler,
    validator: &Option<Regex>,
    middlewares: &[Middleware],
) {
    let Some((segment, rest)) = segments.split_first() else {
        node.store_terminal(handler, validator, middlewares);
        return;
    };

    match segment {
        Segment::Literal(text) => {
            let child = node.children.entry(text.clone()).or_default();
            insert(child, rest, handler, validator, middlewares);
        }
        Segment::Param(name) => {
            let child = node.children.entry(PARAM_KEY.to_string()).or_default();
            if let Some(previous) = &child.param_name {
                if previous != name {
                    warn!(
                        %previous,
                        replacement = %name,
                        "conflicting parameter names at the same trie position"
                    );
                }
            }
            child.param_name = Some(name.clone());
            insert(child, rest, handler, validator, middlewares);
        }
        Segment::Splat(name) => {
            let child = node.children.entry(SPLAT_KEY.to_string()).or_default();
            if let Some(previous) = &child.splat_name {
                if previous != name {
                    warn!(
                        %previous,
                        replacement = %name,
                        "conflicting splat names at the same trie position"
                    );
                }
            }
            child.splat_name = Some(name.clone());
            if !rest.is_empty() {
                warn!("segments after a splat are unreachable");
            }
            // A splat always matches to the end of the path
            child.store_terminal(handler, validator, middlewares);
        }
        Segment::OptionalGroup(inner) => {
            // Trailing group: terminal both without and with the suffix
            node.store_terminal(handler, validator, middlewares);
            let mut expanded = inner.clone();
            expanded.extend_from_slice(rest);
            insert(node, &expanded, handler, validator, middlewares);
        }
    }
}
