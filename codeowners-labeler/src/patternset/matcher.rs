use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use super::{anchored_segments, nfa::Nfa, nfa::StateId, TreeMatcher};

// Upper bound on cached directory prefixes. The cache is emptied once it
// fills up, so a long-lived matcher stays bounded.
const MAX_CACHED_PREFIXES: usize = 4096;

/// Matches paths against a set of globs. Includes a thread-safe transition
/// cache to speed up subsequent lookups of paths sharing a parent directory.
/// The cache holds at most a few thousand directory prefixes and never
/// changes the result of a lookup. Created using a [`super::Builder`].
#[derive(Clone)]
pub struct Matcher {
    nfa: Nfa,
    transition_cache: Arc<RwLock<HashMap<String, Vec<StateId>>>>,
}

impl Matcher {
    pub(crate) fn new(nfa: Nfa) -> Matcher {
        Self {
            nfa,
            transition_cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Match a path against the globs in the set. Returns the ids of every
    /// glob that matches, in no particular order. Ids correspond to the order
    /// in which globs were added to the builder.
    pub fn matching_patterns(&self, path: &str) -> Vec<usize> {
        let segments = anchored_segments(path).collect::<Vec<_>>();
        let final_states = self.next_states(&segments);

        let mut matches = Vec::new();
        for state_id in final_states {
            matches.extend(
                self.nfa
                    .state(state_id)
                    .terminal_for_patterns
                    .iter()
                    .copied(),
            );
        }
        matches
    }

    /// Match many paths against the globs in the set. Returns a map of paths
    /// to the ids of the globs that match them. Paths matching nothing are
    /// absent from the map.
    pub fn matches_for_paths(&self, paths: &[impl AsRef<str>]) -> HashMap<String, Vec<usize>> {
        TreeMatcher::new(&self.nfa).matches_for_paths(paths)
    }

    // Given a slice of path segments, return the set of states we're in after
    // stepping through the NFA. Calls itself recursively on the parent path
    // until the slice is empty, caching the states for every prefix.
    fn next_states(&self, path_segments: &[&str]) -> Vec<StateId> {
        let Some((&segment, subpath_segments)) = path_segments.split_last() else {
            return self.nfa.initial_states();
        };
        // `[]` and `[""]` both join to "", so the root is never cached
        if subpath_segments.is_empty() {
            return self.nfa.step(&self.nfa.initial_states(), segment);
        }

        let subpath = subpath_segments.join("/");
        let states = match self.get_cached_states_for(&subpath) {
            Some(states) => states,
            None => {
                let states = self.next_states(subpath_segments);
                self.set_cached_states_for(subpath, states.clone());
                states
            }
        };

        self.nfa.step(&states, segment)
    }

    fn get_cached_states_for(&self, path: &str) -> Option<Vec<StateId>> {
        // A poisoned lock only means another thread panicked mid-insert; the
        // map itself is still usable.
        let cache = self
            .transition_cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get(path).cloned()
    }

    fn set_cached_states_for(&self, path: String, states: Vec<StateId>) {
        let mut cache = self
            .transition_cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if cache.len() >= MAX_CACHED_PREFIXES {
            cache.clear();
        }
        cache.insert(path, states);
    }

    #[cfg(test)]
    fn cached_prefixes(&self) -> usize {
        self.transition_cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::patternset::Builder;

    use super::*;

    #[test]
    fn test_transition_cache_is_bounded() {
        let patterns = ["/dir-*/**"];
        let matcher = matcher_for_patterns(&patterns);

        for i in 0..MAX_CACHED_PREFIXES + 10 {
            let path = format!("dir-{}/file.txt", i);
            assert_eq!(matcher.matching_patterns(&path), vec![0]);
            assert!(matcher.cached_prefixes() <= MAX_CACHED_PREFIXES);
        }
        assert!(matcher.cached_prefixes() < MAX_CACHED_PREFIXES);
        assert_eq!(matcher.matching_patterns("dir-1/file.txt"), vec![0]);
    }

    #[test]
    fn test_literals() {
        let patterns = [
            "/src/parser/mod.rs",
            "/lib/parser/parse.rs",
            "/bin/parser/mod.rs",
            "**/mod.rs",
        ];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "src/parser/mod.rs", &patterns, &[0, 3]);
        assert_matches(&matcher, "lib/parser/parse.rs", &patterns, &[1]);
        assert_matches(&matcher, "lib/parser/mod.rs", &patterns, &[3]);
        assert_matches(&matcher, "lib/parser/util.rs", &patterns, &[]);
        assert_matches(&matcher, "src/lexer/mod.rs", &patterns, &[3]);
        assert_matches(&matcher, "src/parser/mod.go", &patterns, &[]);
        assert_matches(&matcher, "mod.rs", &patterns, &[3]);
    }

    #[test]
    fn test_directories() {
        let patterns = ["/src/**", "/src/parser/**", "**/parser/**"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "src/parser/mod.rs", &patterns, &[0, 1, 2]);
        assert_matches(&matcher, "src/lexer/mod.rs", &patterns, &[0]);
        assert_matches(&matcher, "foo/src/parser/mod.rs", &patterns, &[2]);
        assert_matches(&matcher, "srcs/main.rs", &patterns, &[]);
    }

    #[test]
    fn test_anchoring() {
        // Without a leading `/` or `**`, the anchoring separator can't be
        // consumed, so the glob never matches.
        let patterns = ["/script/foo", "script/foo", "**/script/foo"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "script/foo", &patterns, &[0, 2]);
        assert_matches(&matcher, "bar/script/foo", &patterns, &[2]);
    }

    #[test]
    fn test_wildcards() {
        let patterns = ["/src/*/mod.rs", "/src/parser/*", "/*/*/mod.rs", "**/*.rs"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "src/parser/mod.rs", &patterns, &[0, 1, 2, 3]);
        assert_matches(&matcher, "src/lexer/mod.rs", &patterns, &[0, 2, 3]);
        assert_matches(&matcher, "src/parser/parser.rs", &patterns, &[1, 3]);
        assert_matches(&matcher, "test/lexer/mod.rs", &patterns, &[2, 3]);
        assert_matches(&matcher, "src/parser/subdir/thing.go", &patterns, &[]);
    }

    #[test]
    fn test_question_marks_and_classes() {
        let patterns = ["/docs/v?/**", "**/[A-Z]*.md", "/img/[!.]*"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "docs/v1/index.md", &patterns, &[0]);
        assert_matches(&matcher, "docs/v10/index.md", &patterns, &[]);
        assert_matches(&matcher, "docs/v2/README.md", &patterns, &[0, 1]);
        assert_matches(&matcher, "img/logo.png", &patterns, &[2]);
        assert_matches(&matcher, "img/.hidden", &patterns, &[]);
    }

    #[test]
    fn test_leading_double_stars() {
        let patterns = ["**/baz", "/**/bar/baz"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "x/y/baz", &patterns, &[0]);
        assert_matches(&matcher, "x/bar/baz", &patterns, &[0, 1]);
        assert_matches(&matcher, "baz", &patterns, &[0]);
        assert_matches(&matcher, "bar/baz", &patterns, &[0, 1]);
    }

    #[test]
    fn test_infix_double_stars() {
        let patterns = ["/foo/**/qux", "/foo/qux"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "foo/qux", &patterns, &[0, 1]);
        assert_matches(&matcher, "foo/bar/qux", &patterns, &[0]);
        assert_matches(&matcher, "foo/bar/baz/qux", &patterns, &[0]);
        assert_matches(&matcher, "foo/bar", &patterns, &[]);
        assert_matches(&matcher, "bar/qux", &patterns, &[]);
    }

    #[test]
    fn test_trailing_double_stars() {
        let patterns = ["/foo/**", "**"];
        let matcher = matcher_for_patterns(&patterns);

        assert_matches(&matcher, "bar", &patterns, &[1]);
        assert_matches(&matcher, "x/y/baz", &patterns, &[1]);
        assert_matches(&matcher, "foo/bar/baz", &patterns, &[0, 1]);
    }

    #[test]
    fn test_cache_is_consistent_across_siblings() {
        let patterns = ["/a/b/**", "/a/*/c.txt"];
        let matcher = matcher_for_patterns(&patterns);

        for _ in 0..2 {
            assert_matches(&matcher, "a/b/c.txt", &patterns, &[0, 1]);
            assert_matches(&matcher, "a/b/d.txt", &patterns, &[0]);
            assert_matches(&matcher, "a/x/c.txt", &patterns, &[1]);
        }
    }

    fn assert_matches(matcher: &Matcher, path: &str, patterns: &[&str], expected: &[usize]) {
        assert_eq!(
            HashSet::<usize>::from_iter(matcher.matching_patterns(path)),
            HashSet::from_iter(expected.iter().copied()),
            "expected {:?} to match {:?}",
            path,
            expected.iter().map(|&i| patterns[i]).collect::<Vec<_>>(),
        );
    }

    fn matcher_for_patterns(patterns: &[&str]) -> Matcher {
        let mut builder = Builder::new();
        for pattern in patterns {
            builder.add(pattern);
        }
        builder.build()
    }
}
