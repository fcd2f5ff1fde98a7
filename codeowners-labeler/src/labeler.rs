//! Labelling a change request end to end.
//!
//! The resolution logic in this crate is pure; fetching repository data and
//! applying labels are left to implementations of [`RepositoryProvider`] and
//! [`LabelWriter`]. [`Labeler`] runs one pass against them.

use tracing::{debug, warn};

use crate::{error::ProviderError, labels::LabelSet, labels::Resolver};

/// Hosts such as GitHub reject more labels than this on a single issue.
pub const MAX_LABELS: usize = 100;

/// A pull or merge request, as far as labelling is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRequest {
    pub id: u64,
    /// Repository-relative paths touched by the change request.
    pub changed_paths: Vec<String>,
    /// Labels already applied to the change request.
    pub labels: Vec<String>,
}

/// Supplies repository data. Missing data (no such file, no such change
/// request) is reported as `Ok(None)`, not as an error.
pub trait RepositoryProvider {
    fn change_request(&self, id: u64) -> Result<Option<ChangeRequest>, ProviderError>;

    fn ownership_file(&self, path: &str) -> Result<Option<String>, ProviderError>;
}

/// Applies the final label list to a change request, replacing whatever was
/// there.
pub trait LabelWriter {
    fn set_labels(&mut self, id: u64, labels: &[String]) -> Result<(), ProviderError>;
}

/// Why a labelling pass stopped before resolving labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ChangeRequestNotFound,
    NoChangedPaths,
    OwnershipFileNotFound,
    NoRules,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    Skipped(SkipReason),
    /// The resolved labels were already present, so nothing was written.
    Unchanged { all_labels: Vec<String> },
    Applied {
        new_labels: Vec<String>,
        all_labels: Vec<String>,
    },
}

pub struct Labeler<P, W> {
    provider: P,
    writer: W,
    resolver: Resolver,
}

impl<P: RepositoryProvider, W: LabelWriter> Labeler<P, W> {
    pub fn new(provider: P, writer: W, resolver: Resolver) -> Self {
        Self {
            provider,
            writer,
            resolver,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Label change request `id` using the ownership file at
    /// `ownership_path`.
    ///
    /// Labels already on the change request keep their position and the
    /// resolved labels are appended after them, up to [`MAX_LABELS`] in
    /// total. Nothing is written if that leaves the label list unchanged.
    pub fn run(&mut self, id: u64, ownership_path: &str) -> Result<LabelOutcome, ProviderError> {
        let Some(change_request) = self.provider.change_request(id)? else {
            warn!(id, "could not find change request, skipping");
            return Ok(LabelOutcome::Skipped(SkipReason::ChangeRequestNotFound));
        };
        if change_request.changed_paths.is_empty() {
            warn!(id, "change request has no changed files, skipping");
            return Ok(LabelOutcome::Skipped(SkipReason::NoChangedPaths));
        }
        debug!(id, count = change_request.changed_paths.len(), "found changed files");

        let Some(source) = self.provider.ownership_file(ownership_path)? else {
            warn!(id, path = ownership_path, "could not find ownership file, skipping");
            return Ok(LabelOutcome::Skipped(SkipReason::OwnershipFileNotFound));
        };
        let rules = self.resolver.parse(&source);
        if rules.is_empty() {
            warn!(id, path = ownership_path, "ownership file has no rules");
            return Ok(LabelOutcome::Skipped(SkipReason::NoRules));
        }

        let resolved = self
            .resolver
            .labels_for(&rules, &change_request.changed_paths);

        let mut all_labels = change_request.labels.iter().collect::<LabelSet>();
        all_labels.extend(resolved);
        let mut all_labels = all_labels.into_vec();
        all_labels.truncate(MAX_LABELS);

        if all_labels == change_request.labels {
            debug!(id, "labels unchanged");
            return Ok(LabelOutcome::Unchanged { all_labels });
        }

        self.writer.set_labels(id, &all_labels)?;
        let new_labels = all_labels
            .iter()
            .filter(|label| !change_request.labels.contains(label))
            .cloned()
            .collect();
        Ok(LabelOutcome::Applied {
            new_labels,
            all_labels,
        })
    }
}
