//! Matching many globs against many paths at once.
//!
//! Every glob added to a [`Builder`] becomes a path through a shared NFA whose
//! transitions each consume one path segment. `**` segments become epsilon
//! edges into a state with a self loop, so they match zero or more segments.

mod builder;
mod matcher;
mod nfa;
mod tree_matcher;

pub use self::builder::Builder;
pub use self::matcher::Matcher;
pub(crate) use self::tree_matcher::TreeMatcher;

// Split a path into the segments the NFA consumes. Paths are anchored with a
// leading separator before matching, which shows up as an empty first
// segment; globs starting with `/` begin with the same empty segment.
pub(crate) fn anchored_segments(path: &str) -> impl Iterator<Item = &str> {
    std::iter::once("").chain(path.split('/'))
}
