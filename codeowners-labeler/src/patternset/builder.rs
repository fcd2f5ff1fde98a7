use super::{
    nfa::{Nfa, StateId, Transition},
    Matcher,
};

/// Builder for a patternset [`Matcher`]. Calling [`Builder::build`] will
/// consume the builder.
#[derive(Clone)]
pub struct Builder {
    nfa: Nfa,
    next_pattern_id: usize,
}

impl Builder {
    /// Create a new `Builder`.
    pub fn new() -> Self {
        Self {
            nfa: Nfa::new(),
            next_pattern_id: 0,
        }
    }

    /// Build the `Matcher` from the patterns added to the builder. This will
    /// consume the builder.
    pub fn build(self) -> Matcher {
        Matcher::new(self.nfa)
    }

    /// Add a glob to the builder and return its pattern id. Ids are assigned
    /// sequentially from zero in the order globs are added.
    ///
    /// Globs are matched segment by segment against paths that have been
    /// anchored with a leading `/`, so `/docs/**` only matches under the root
    /// `docs` directory while `**/docs/**` matches at any depth.
    pub fn add(&mut self, glob: &str) -> usize {
        let pattern_id = self.next_pattern_id;
        self.next_pattern_id += 1;

        // Globs use Unix path separators.
        let end_state_id = glob
            .split('/')
            .fold(Nfa::START_STATE, |from_id, segment| match segment {
                "**" => self.add_epsilon_transition(from_id),
                _ => self.add_transition(from_id, segment),
            });

        self.nfa.state_mut(end_state_id).mark_as_terminal(pattern_id);

        pattern_id
    }

    // Add a regular (non-epsilon) transition from a given state via the
    // provided path segment. Patterns sharing a prefix share states.
    fn add_transition(&mut self, from_id: StateId, segment: &str) -> StateId {
        let existing_transition = self
            .nfa
            .transitions_from(from_id)
            .find(|t| t.path_segment == segment && t.target != from_id);
        if let Some(t) = existing_transition {
            t.target
        } else {
            let state_id = self.nfa.add_state();
            self.nfa
                .state_mut(from_id)
                .add_transition(Transition::new(segment.to_owned(), state_id));
            state_id
        }
    }

    // Add an epsilon transition from a given state to a new state with a
    // self loop, which is how `**` matches zero or more segments. If an
    // epsilon transition already exists, return its target.
    fn add_epsilon_transition(&mut self, from_id: StateId) -> StateId {
        // `**/**` matches the same paths as `**`, so a globstar state never
        // needs a second globstar after it.
        let has_self_loop = self
            .nfa
            .transitions_from(from_id)
            .any(|t| t.path_segment == "*" && t.target == from_id);
        if has_self_loop {
            return from_id;
        }

        match self.nfa.state(from_id).epsilon_transition {
            Some(to_id) => to_id,
            None => {
                let state_id = self.nfa.add_state();
                self.nfa
                    .state_mut(state_id)
                    .add_transition(Transition::new("*".to_owned(), state_id));
                self.nfa.state_mut(from_id).epsilon_transition = Some(state_id);
                state_id
            }
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
