use crate::{parser::ParseWarning, ruleset::Rule};

/// Where an emitted label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// The owner had an entry in the label map.
    Mapped,
    /// The label was derived from the owner token itself.
    Derived,
}

/// Hooks invoked at well-defined points while parsing, matching and resolving
/// labels. Every method has an empty default so implementations only need to
/// override what they care about.
pub trait Observer {
    fn rule_parsed(&self, _rule: &Rule) {}

    fn parse_warning(&self, _warning: &ParseWarning) {}

    fn glob_matched(&self, _path: &str, _rule: &Rule) {}

    fn path_unmatched(&self, _path: &str) {}

    fn label_emitted(&self, _owner: &str, _label: &str, _source: LabelSource) {}
}

/// An observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// An observer that forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn rule_parsed(&self, rule: &Rule) {
        tracing::debug!(
            line = rule.line,
            pattern = %rule.pattern,
            glob = %rule.glob,
            owners = ?rule.owners,
            "parsed rule"
        );
    }

    fn parse_warning(&self, warning: &ParseWarning) {
        tracing::warn!(line = warning.line, "{}", warning.message);
    }

    fn glob_matched(&self, path: &str, rule: &Rule) {
        tracing::debug!(path, glob = %rule.glob, owners = ?rule.owners, "matched glob");
    }

    fn path_unmatched(&self, path: &str) {
        tracing::debug!(path, "no matching rule");
    }

    fn label_emitted(&self, owner: &str, label: &str, source: LabelSource) {
        match source {
            LabelSource::Mapped => tracing::debug!(owner, label, "adding label"),
            LabelSource::Derived => tracing::debug!(owner, label, "adding default label"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Records every event as a string so tests can assert on call order.
    #[derive(Default)]
    pub(crate) struct RecordingObserver {
        pub(crate) events: RefCell<Vec<String>>,
    }

    impl Observer for RecordingObserver {
        fn rule_parsed(&self, rule: &Rule) {
            self.events
                .borrow_mut()
                .push(format!("parsed {}", rule.pattern));
        }

        fn parse_warning(&self, warning: &ParseWarning) {
            self.events
                .borrow_mut()
                .push(format!("warning line {}", warning.line));
        }

        fn glob_matched(&self, path: &str, rule: &Rule) {
            self.events
                .borrow_mut()
                .push(format!("matched {} {}", path, rule.glob));
        }

        fn path_unmatched(&self, path: &str) {
            self.events.borrow_mut().push(format!("unmatched {}", path));
        }

        fn label_emitted(&self, owner: &str, label: &str, source: LabelSource) {
            self.events
                .borrow_mut()
                .push(format!("label {} {} {:?}", owner, label, source));
        }
    }
}
