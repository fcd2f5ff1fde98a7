use crate::{
    normalize::normalize,
    patternset::{Builder, Matcher},
};

/// A single CODEOWNERS rule: a pattern and the owners responsible for the
/// paths it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The pattern as written in the CODEOWNERS file.
    pub pattern: String,
    /// The normalized glob that paths are matched against.
    pub glob: String,
    pub owners: Vec<String>,
    /// 1-based line number the rule was declared on.
    pub line: usize,
}

impl Rule {
    /// Create a rule, normalizing `pattern` into its glob form.
    pub fn new(pattern: impl Into<String>, owners: Vec<String>, line: usize) -> Rule {
        let pattern = pattern.into();
        let glob = normalize(&pattern);
        Rule {
            pattern,
            glob,
            owners,
            line,
        }
    }
}

/// The rule that owns a changed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Winner<'a> {
    pub path: &'a str,
    /// Position of the rule in declaration order.
    pub index: usize,
    pub rule: &'a Rule,
}

/// An ordered collection of rules, compiled for matching.
///
/// When several rules match a path, the one declared last wins, just like in
/// a CODEOWNERS file. The rules themselves are never reordered.
#[derive(Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    matcher: Matcher,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut builder = Builder::new();
        for rule in &rules {
            builder.add(&rule.glob);
        }
        Self {
            rules,
            matcher: builder.build(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every rule matching `path`, in declaration order.
    pub fn all_matching_rules(&self, path: &str) -> Vec<(usize, &Rule)> {
        let mut ids = self.matcher.matching_patterns(path);
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter().map(|idx| (idx, &self.rules[idx])).collect()
    }

    /// The last-declared rule matching `path`, if any.
    pub fn winning_rule(&self, path: &str) -> Option<(usize, &Rule)> {
        self.matcher
            .matching_patterns(path)
            .into_iter()
            .max()
            .map(|idx| (idx, &self.rules[idx]))
    }

    /// The owners of `path`, or `None` if no rule matches or the winning rule
    /// has no owners.
    pub fn owners(&self, path: &str) -> Option<&[String]> {
        self.winning_rule(path)
            .map(|(_, rule)| rule.owners.as_slice())
            .filter(|owners| !owners.is_empty())
    }

    /// The winning rule for each path, in the order the paths were given.
    /// Paths that no rule matches are left out.
    pub fn winning_rules<'a>(&'a self, paths: &'a [impl AsRef<str>]) -> Vec<Winner<'a>> {
        let matches = self.matcher.matches_for_paths(paths);
        paths
            .iter()
            .filter_map(|path| {
                let path: &str = path.as_ref();
                let index = *matches.get(path)?.iter().max()?;
                Some(Winner {
                    path,
                    index,
                    rule: &self.rules[index],
                })
            })
            .collect()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
