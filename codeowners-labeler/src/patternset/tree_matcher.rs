use std::collections::HashMap;

use crate::path_tree::PathTree;

use super::nfa::Nfa;

/// Matches a batch of paths by walking a tree of their segments, so states
/// for a shared parent directory are computed once for all of its children.
pub(crate) struct TreeMatcher<'a> {
    nfa: &'a Nfa,
}

impl<'a> TreeMatcher<'a> {
    pub(crate) fn new(nfa: &'a Nfa) -> TreeMatcher<'a> {
        Self { nfa }
    }

    /// Match many paths against the globs in the set. Returns a map of paths
    /// to a vec of pattern ids that match the path.
    pub(crate) fn matches_for_paths(
        &self,
        paths: &[impl AsRef<str>],
    ) -> HashMap<String, Vec<usize>> {
        let mut tree = PathTree::new();
        for path in paths {
            tree.insert(path.as_ref());
        }

        let mut queue = vec![(self.nfa.initial_states(), PathTree::root_id())];
        let mut matches: HashMap<String, Vec<usize>> = HashMap::new();
        while let Some((states, node_id)) = queue.pop() {
            let node = tree.node(node_id);
            if !node.paths.is_empty() {
                // We've reached a path node. Check if any of the states are
                // accepting.
                for &id in &states {
                    let state = self.nfa.state(id);
                    if state.is_terminal() {
                        for path in &node.paths {
                            matches
                                .entry(path.to_owned())
                                .or_default()
                                .extend(state.terminal_for_patterns.iter().copied());
                        }
                    }
                }
            }

            for (segment, child_id) in &node.children {
                let next_states = self.nfa.step(&states, segment);
                if !next_states.is_empty() {
                    queue.push((next_states, *child_id));
                }
            }
        }
        matches
    }
}
