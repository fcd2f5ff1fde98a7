use std::collections::HashMap;

use crate::patternset::anchored_segments;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(pub(crate) usize);

pub(crate) struct Node {
    pub(crate) children: HashMap<String, NodeId>,
    pub(crate) paths: Vec<String>,
}

impl Node {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            paths: Vec::new(),
        }
    }
}

/// A trie of anchored path segments. Lets a batch of changed paths be matched
/// while stepping through shared parent directories only once.
pub(crate) struct PathTree {
    nodes: Vec<Node>,
}

impl PathTree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
        }
    }

    pub(crate) fn root_id() -> NodeId {
        NodeId(0)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn insert(&mut self, path: &str) {
        let mut current_node = Self::root_id();
        for segment in anchored_segments(path) {
            let child = self.nodes[current_node.0].children.get(segment);
            if let Some(&node_id) = child {
                current_node = node_id;
            } else {
                let node_id = NodeId(self.nodes.len());
                self.nodes.push(Node::new());
                self.nodes[current_node.0]
                    .children
                    .insert(segment.to_owned(), node_id);
                current_node = node_id;
            }
        }
        self.nodes[current_node.0].paths.push(path.to_owned());
    }
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}
