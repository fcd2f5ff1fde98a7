use std::{
    fs, io,
    path::{Path, PathBuf},
};

use codeowners_labeler::{ChangeRequest, LabelWriter, ProviderError, RepositoryProvider};

/// Serves a single change request described on the command line, and reads
/// ownership files from the local checkout.
pub struct LocalProvider {
    root: PathBuf,
    change_request: ChangeRequest,
}

impl LocalProvider {
    pub fn new(root: impl Into<PathBuf>, change_request: ChangeRequest) -> Self {
        Self {
            root: root.into(),
            change_request,
        }
    }
}

impl RepositoryProvider for LocalProvider {
    fn change_request(&self, id: u64) -> Result<Option<ChangeRequest>, ProviderError> {
        Ok((id == self.change_request.id).then(|| self.change_request.clone()))
    }

    fn ownership_file(&self, path: &str) -> Result<Option<String>, ProviderError> {
        match fs::read_to_string(self.root.join(path)) {
            Ok(source) => Ok(Some(source)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => Err(
                ProviderError::Unavailable(format!("{} is not valid UTF-8", path)),
            ),
            Err(err) => Err(err.into()),
        }
    }
}

/// Logs the labels that would be applied instead of sending them anywhere.
/// The final list is printed by the caller.
#[derive(Default)]
pub struct LogWriter;

impl LabelWriter for LogWriter {
    fn set_labels(&mut self, id: u64, labels: &[String]) -> Result<(), ProviderError> {
        tracing::info!(id, labels = ?labels, "setting labels");
        Ok(())
    }
}

/// Read newline-separated paths from a file, or from stdin if `path` is `-`.
pub fn read_paths(path: &Path) -> io::Result<Vec<String>> {
    let contents = if path == Path::new("-") {
        io::read_to_string(io::stdin())?
    } else {
        fs::read_to_string(path)?
    };
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}
