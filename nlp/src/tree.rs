//! The shared matching tree.
//!
//! All nodes live in one arena and every edge is a [`NodeId`], including the
//! self-loops of wildcard and variable nodes and the bypass edges that let a
//! zero-or-more wildcard match nothing. Each node keeps a single structural
//! parent; loop and bypass edges only appear in child lists.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rule::{ConditionalOutput, RuleId};
use crate::word::{Quantifier, Word, WordKind};

/// Index of a node in a [`PatternTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies which rule phrase attached an output list to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputKey {
    pub rule_id: RuleId,
    pub input_index: usize,
}

impl fmt::Display for OutputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rule_id, self.input_index)
    }
}

/// What a node matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Word(Word),
    Wildcard(Quantifier),
    Variable(String),
}

impl NodeKind {
    /// Loop kinds consume any number of tokens through a self edge.
    pub fn is_loop(&self) -> bool {
        matches!(self, NodeKind::Wildcard(_) | NodeKind::Variable(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Root => f.write_str("<root>"),
            NodeKind::Word(w) => write!(f, "{w}"),
            NodeKind::Wildcard(q) => f.write_str(q.marker()),
            NodeKind::Variable(name) => write!(f, "[{name}]"),
        }
    }
}

/// Output lists attached to a node, in key order.
pub type OutputMap = BTreeMap<OutputKey, Arc<[ConditionalOutput]>>;

/// A node of the matching tree.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    outputs: OutputMap,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Structural parent; `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Outgoing edges in insertion order, loops and bypasses included.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn outputs(&self) -> &OutputMap {
        &self.outputs
    }

    /// Name of the variable this node binds, if any.
    pub fn var_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Variable(name) => Some(name),
            _ => None,
        }
    }
}

/// Arena-backed word tree shared by all compiled rules.
#[derive(Debug, Clone)]
pub struct PatternTree {
    nodes: Vec<Node>,
}

impl Default for PatternTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternTree {
    const ROOT: NodeId = NodeId(0);

    /// Creates a tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                outputs: OutputMap::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Returns the node for `id`.
    ///
    /// Ids are only handed out by this tree, so they are always in range.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing besides the root was inserted.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Returns the child of `parent` for `word`, inserting it if needed.
    ///
    /// Literal words reuse an equal word child and wildcards reuse the existing
    /// wildcard child, demoting `+` to `*` when a `*` is inserted over it.
    /// Variables always get a fresh node.
    pub(crate) fn add_node(&mut self, word: &Word, parent: NodeId) -> NodeId {
        match &word.kind {
            WordKind::Literal | WordKind::Symbol => {
                if let Some(id) = self.find_child(parent, |kind| {
                    matches!(kind, NodeKind::Word(w) if w.same_literal(word))
                }) {
                    return id;
                }
            }
            WordKind::Wildcard(quantifier) => {
                if let Some(id) =
                    self.find_child(parent, |kind| matches!(kind, NodeKind::Wildcard(_)))
                {
                    if *quantifier == Quantifier::ZeroOrMore {
                        self.demote(id);
                    }
                    return id;
                }
            }
            WordKind::Variable(_) => {}
        }

        let kind = match &word.kind {
            WordKind::Wildcard(q) => NodeKind::Wildcard(*q),
            WordKind::Variable(name) => NodeKind::Variable(name.clone()),
            WordKind::Literal | WordKind::Symbol => NodeKind::Word(word.clone()),
        };

        let id = NodeId(self.nodes.len());
        let is_loop = kind.is_loop();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            outputs: OutputMap::new(),
        });
        if is_loop {
            self.nodes[id.0].children.push(id);
        }
        self.nodes[parent.0].children.push(id);

        // A `*` parent may match nothing: its own parent can skip straight here
        if let NodeKind::Wildcard(Quantifier::ZeroOrMore) = self.nodes[parent.0].kind {
            if let Some(grandparent) = self.nodes[parent.0].parent {
                self.add_edge(grandparent, id);
            }
        }

        debug!(
            "tree: added node {} {} with parent {} {}",
            id, self.nodes[id.0].kind, parent, self.nodes[parent.0].kind
        );
        id
    }

    /// Attaches an output list to `node` under `key`, replacing any previous list.
    pub(crate) fn attach_outputs(
        &mut self,
        node: NodeId,
        key: OutputKey,
        outputs: Arc<[ConditionalOutput]>,
    ) {
        self.nodes[node.0].outputs.insert(key, outputs);
    }

    fn find_child(&self, parent: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|&c| pred(&self.nodes[c.0].kind))
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId) {
        if !self.nodes[from.0].children.contains(&to) {
            self.nodes[from.0].children.push(to);
        }
    }

    /// Turns a `+` node into `*` and gives its existing children bypass edges.
    fn demote(&mut self, id: NodeId) {
        if self.nodes[id.0].kind != NodeKind::Wildcard(Quantifier::OneOrMore) {
            return;
        }
        self.nodes[id.0].kind = NodeKind::Wildcard(Quantifier::ZeroOrMore);
        debug!("tree: demoted wildcard {} to zero-or-more", id);

        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        let children: Vec<NodeId> = self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|&c| c != id)
            .collect();
        for child in children {
            self.add_edge(parent, child);
        }
    }

    /// Visits structural edges depth first, skipping loop and bypass edges.
    pub fn walk<F>(&self, mut f: F)
    where
        F: FnMut(usize, NodeId, &Node),
    {
        self.walk_internal(Self::ROOT, 0, &mut f);
    }

    fn walk_internal<F>(&self, id: NodeId, depth: usize, f: &mut F)
    where
        F: FnMut(usize, NodeId, &Node),
    {
        f(depth, id, &self.nodes[id.0]);
        for &child in &self.nodes[id.0].children {
            if child != id && self.nodes[child.0].parent == Some(id) {
                self.walk_internal(child, depth + 1, f);
            }
        }
    }
}

impl fmt::Display for PatternTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        self.walk(|depth, id, node| {
            let mut line = format!("{}{} {}", "  ".repeat(depth), id, node.kind);
            if node.children.contains(&id) {
                line.push_str(" (loop)");
            }
            let bypass: Vec<String> = node
                .children
                .iter()
                .filter(|&&c| c != id && self.nodes[c.0].parent != Some(id))
                .map(|c| c.to_string())
                .collect();
            if !bypass.is_empty() {
                line.push_str(&format!(" (bypass {})", bypass.join(", ")));
            }
            if !node.outputs.is_empty() {
                let keys: Vec<String> = node.outputs.keys().map(|k| k.to_string()).collect();
                line.push_str(&format!(" => {}", keys.join(", ")));
            }
            lines.push(line);
        });
        write!(f, "{}", lines.join("\n"))
    }
}
