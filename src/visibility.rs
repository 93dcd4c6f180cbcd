//! Display tree model and the gate that tells waiting widgets when they may
//! have become renderable.
//!
//! The tree holds documents and elements. A frame element embeds a child
//! document, and display checks cross those frame boundaries.

/// Index of a node in a [`DisplayTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    /// Root element of a document; `owner` is the frame embedding it
    Document { owner: Option<NodeId> },
    Element,
    Frame { content: NodeId },
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    hidden: bool,
}

#[derive(Debug, Clone)]
pub struct DisplayTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for DisplayTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayTree {
    /// Tree containing only the top-level document
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.push(NodeKind::Document { owner: None });
        tree
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            hidden: false,
        });
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Top-level document
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// New element, not yet attached anywhere
    pub fn create_element(&mut self) -> NodeId {
        self.push(NodeKind::Element)
    }

    /// New frame element together with the document it embeds
    pub fn create_frame(&mut self) -> (NodeId, NodeId) {
        let content = self.push(NodeKind::Document { owner: None });
        let frame = self.push(NodeKind::Frame { content });
        self.node_mut(content).kind = NodeKind::Document { owner: Some(frame) };
        (frame, content)
    }

    /// Document embedded by `frame`, if it is a frame element
    pub fn frame_content(&self, frame: NodeId) -> Option<NodeId> {
        match self.node(frame).kind {
            NodeKind::Frame { content } => Some(content),
            _ => None,
        }
    }

    /// Move `child` (and its subtree) under `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Detach `node` from its parent; the subtree stays intact
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.node_mut(node).parent.take() {
            self.node_mut(parent).children.retain(|&child| child != node);
        }
    }

    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        self.node_mut(node).hidden = hidden;
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.node(node).hidden
    }

    /// Parent element, or for a document the frame embedding it
    fn composed_parent(&self, node: NodeId) -> Option<NodeId> {
        let node = self.node(node);
        match node.kind {
            NodeKind::Document { owner } => owner,
            _ => node.parent,
        }
    }

    /// Whether `node` reaches the top-level document through parents and frames
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.composed_parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Whether no ancestor of `node`, across frame boundaries, is hidden
    pub fn are_ancestors_displayed(&self, node: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = self.composed_parent(current) {
            if self.is_hidden(parent) {
                return false;
            }
            current = parent;
        }
        matches!(self.node(current).kind, NodeKind::Document { .. })
    }

    /// Connected, with every ancestor and the node itself displayed
    pub fn is_renderable(&self, node: NodeId) -> bool {
        self.is_connected(node) && self.are_ancestors_displayed(node) && !self.is_hidden(node)
    }

    fn has_ancestor_in(&self, node: NodeId, candidates: &[NodeId]) -> bool {
        let mut current = node;
        while let Some(parent) = self.composed_parent(current) {
            if candidates.contains(&parent) {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Displayed nodes of the subtree rooted at `node`, depth first
    fn collect_displayed(&self, node: NodeId, visited: &mut Vec<NodeId>) {
        let entry = self.node(node);
        if entry.hidden {
            return;
        }
        visited.push(node);
        for &child in &entry.children {
            self.collect_displayed(child, visited);
        }
        if let NodeKind::Frame { content } = entry.kind {
            self.collect_displayed(content, visited);
        }
    }
}

/// Coalesces display changes into one renderability re-check per host turn
#[derive(Debug, Default)]
pub struct VisibilityGate {
    candidates: Vec<NodeId>,
    candidate_all: bool,
}

impl VisibilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// An element was appended somewhere
    pub fn candidate_element(&mut self, node: NodeId) {
        if !self.candidate_all && !self.candidates.contains(&node) {
            self.candidates.push(node);
        }
    }

    /// Some element stopped being hidden; everything must be re-checked
    pub fn candidate_all(&mut self) {
        self.candidates.clear();
        self.candidate_all = true;
    }

    /// Whether a flush has work to do
    pub fn is_pending(&self) -> bool {
        self.candidate_all || !self.candidates.is_empty()
    }

    /// Re-check the candidates and return the nodes that should receive the
    /// animation-start signal, in traversal order
    pub fn flush(&mut self, tree: &DisplayTree) -> Vec<NodeId> {
        let mut visited = Vec::new();
        if self.candidate_all {
            self.candidate_all = false;
            tree.collect_displayed(tree.root(), &mut visited);
            return visited;
        }

        let mut candidates = std::mem::take(&mut self.candidates);
        let mut index = 0;
        while index < candidates.len() {
            let candidate = candidates[index];
            if !tree.is_connected(candidate)
                || tree.has_ancestor_in(candidate, &candidates)
                || !tree.are_ancestors_displayed(candidate)
            {
                candidates.remove(index);
            } else {
                tree.collect_displayed(candidate, &mut visited);
                index += 1;
            }
        }
        visited
    }
}
