//! Resolve pull request labels from a CODEOWNERS file.
//!
//! A CODEOWNERS file is parsed into ordered [`Rule`]s whose patterns are
//! normalized into globs. Each changed path is owned by the last rule whose
//! glob matches it, and the owners of those rules are turned into labels
//! through a [`LabelMap`], optionally falling back to a label derived from the
//! owner's name.
//!
//! ```
//! use codeowners_labeler::{parse, LabelMap, Resolver};
//!
//! let rules = parse("/docs/ @org/docs\n*.rs @org/rust\n").into_ruleset();
//! let map: LabelMap = [("@org/rust", "lang: rust")].into_iter().collect();
//! let resolver = Resolver::new(map).with_default_labels(true);
//!
//! let labels = resolver.labels_for(&rules, &["docs/intro.md", "src/lib.rs"]);
//! assert_eq!(labels.into_vec(), vec!["docs", "lang: rust"]);
//! ```

pub mod error;
pub mod labeler;
mod labels;
mod normalize;
pub mod observer;
pub mod parser;
mod path_tree;
pub mod patternset;
mod ruleset;

pub use error::{LabelMapError, ProviderError};
pub use labeler::{
    ChangeRequest, LabelOutcome, LabelWriter, Labeler, RepositoryProvider, SkipReason, MAX_LABELS,
};
pub use labels::{default_label, resolve_labels, LabelMap, LabelSet, Resolver};
pub use normalize::normalize;
pub use observer::{LabelSource, NoopObserver, Observer, TracingObserver};
pub use parser::{parse, parse_file, ParseResult, ParseWarning};
pub use ruleset::{Rule, RuleSet, Winner};
