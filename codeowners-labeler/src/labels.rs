use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::{
    error::LabelMapError,
    observer::{LabelSource, NoopObserver, Observer},
    parser::parse_with_observer,
    ruleset::{RuleSet, Winner},
};

/// Maps owner tokens to label names. Lookups are exact and case-sensitive;
/// owners without an entry are expected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    labels: HashMap<String, String>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, owner: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(owner.into(), label.into());
    }

    pub fn get(&self, owner: &str) -> Option<&str> {
        self.labels.get(owner).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Parse a JSON object keyed by label, whose values are the owner (or an
    /// array of owners) that should receive the label:
    ///
    /// ```json
    /// { "frontend": "@org/web", "infra": ["@org/sre", "@alice"] }
    /// ```
    ///
    /// If an owner appears under several labels, the last one wins.
    pub fn from_labels_to_owners_json(json: &str) -> Result<Self, LabelMapError> {
        let Value::Object(entries) = serde_json::from_str::<Value>(json)? else {
            return Err(LabelMapError::NotAnObject);
        };

        let mut map = LabelMap::new();
        for (label, owners) in entries {
            match owners {
                Value::String(owner) => map.insert(owner, label),
                Value::Array(owners) => {
                    for owner in owners {
                        let Value::String(owner) = owner else {
                            return Err(LabelMapError::InvalidOwners { label });
                        };
                        map.insert(owner, label.clone());
                    }
                }
                _ => return Err(LabelMapError::InvalidOwners { label }),
            }
        }
        Ok(map)
    }
}

impl<O: Into<String>, L: Into<String>> FromIterator<(O, L)> for LabelMap {
    /// Collect `(owner, label)` pairs.
    fn from_iter<I: IntoIterator<Item = (O, L)>>(iter: I) -> Self {
        let mut map = LabelMap::new();
        for (owner, label) in iter {
            map.insert(owner, label);
        }
        map
    }
}

/// An insertion-ordered set of labels. Inserting a label that is already
/// present leaves it at its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
    seen: HashSet<String>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label, returning `false` if it was already present.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.seen.contains(&label) {
            return false;
        }
        self.seen.insert(label.clone());
        self.labels.push(label);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.seen.contains(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn into_vec(self) -> Vec<String> {
        self.labels
    }
}

impl<S: Into<String>> Extend<S> for LabelSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for label in iter {
            self.insert(label);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for LabelSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.into_iter()
    }
}

/// Derive a label from an owner token: the part after the last `/`, without
/// a leading `@`. `@org/web-team` becomes `web-team` and `@alice` becomes
/// `alice`. Returns `None` if nothing is left.
pub fn default_label(owner: &str) -> Option<&str> {
    let name = owner.rsplit('/').next().unwrap_or(owner);
    let name = name.strip_prefix('@').unwrap_or(name);
    (!name.is_empty()).then_some(name)
}

/// Turn winning rules into labels.
///
/// Paths are visited in the order given, and each winning rule's owners in
/// the order they were declared. An owner with an entry in `label_map` emits
/// that label; otherwise, if `use_default_labels` is set, it emits
/// [`default_label`]. Labels are deduplicated by value, keeping the position
/// of their first occurrence.
pub fn resolve_labels(
    winners: &[Winner<'_>],
    label_map: &LabelMap,
    use_default_labels: bool,
    observer: &dyn Observer,
) -> LabelSet {
    let mut labels = LabelSet::new();
    for winner in winners {
        for owner in &winner.rule.owners {
            if let Some(label) = label_map.get(owner) {
                observer.label_emitted(owner, label, LabelSource::Mapped);
                labels.insert(label);
            } else if use_default_labels {
                if let Some(label) = default_label(owner) {
                    observer.label_emitted(owner, label, LabelSource::Derived);
                    labels.insert(label);
                }
            }
        }
    }
    labels
}

/// Resolves labels for batches of changed paths with a fixed label map and
/// observer.
pub struct Resolver {
    label_map: LabelMap,
    use_default_labels: bool,
    observer: Box<dyn Observer + Send + Sync>,
}

impl Resolver {
    pub fn new(label_map: LabelMap) -> Self {
        Self {
            label_map,
            use_default_labels: false,
            observer: Box::new(NoopObserver),
        }
    }

    /// Derive labels for owners missing from the label map.
    pub fn with_default_labels(mut self, enabled: bool) -> Self {
        self.use_default_labels = enabled;
        self
    }

    pub fn with_observer(mut self, observer: impl Observer + Send + Sync + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn label_map(&self) -> &LabelMap {
        &self.label_map
    }

    pub fn use_default_labels(&self) -> bool {
        self.use_default_labels
    }

    /// Parse a CODEOWNERS file, reporting rules and warnings to the observer.
    pub fn parse(&self, source: &str) -> RuleSet {
        parse_with_observer(source, self.observer.as_ref()).into_ruleset()
    }

    /// The labels owed to `paths` under `rules`.
    pub fn labels_for(&self, rules: &RuleSet, paths: &[impl AsRef<str>]) -> LabelSet {
        let winners = rules.winning_rules(paths);
        if winners.len() < paths.len() {
            let matched = winners.iter().map(|w| w.path).collect::<HashSet<_>>();
            for path in paths {
                let path: &str = path.as_ref();
                if !matched.contains(path) {
                    self.observer.path_unmatched(path);
                }
            }
        }
        for winner in &winners {
            self.observer.glob_matched(winner.path, winner.rule);
        }
        resolve_labels(
            &winners,
            &self.label_map,
            self.use_default_labels,
            self.observer.as_ref(),
        )
    }
}
