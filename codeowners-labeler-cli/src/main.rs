use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use codeowners_labeler::{
    parse_file, ChangeRequest, LabelMap, LabelOutcome, Labeler, ProviderError, Resolver,
    RuleSet, TracingObserver,
};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod local;

use local::{LocalProvider, LogWriter};

// Changed paths given on the command line all belong to one change request.
const LOCAL_CHANGE_REQUEST: u64 = 0;

/// Resolve pull request labels from a CODEOWNERS file and a list of changed
/// paths.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Changed paths, relative to the repository root
    paths: Vec<String>,

    /// CODEOWNERS file to read
    #[arg(
        short = 'f',
        long = "file",
        env = "CODEOWNERS_FILE",
        default_value = "CODEOWNERS"
    )]
    codeowners_file: PathBuf,

    /// JSON object mapping label names to the owner (or owners) they label
    #[arg(long, env = "LABELS_TO_OWNERS", conflicts_with = "labels_file")]
    labels_to_owners: Option<String>,

    /// File containing the labels-to-owners JSON object
    #[arg(long)]
    labels_file: Option<PathBuf>,

    /// Label owners missing from the label map with their own name
    #[arg(long, env = "ENABLE_DEFAULT_LABELS")]
    enable_default_labels: bool,

    /// Label already applied to the change request (repeatable)
    #[arg(long = "existing-label", value_name = "LABEL")]
    existing_labels: Vec<String>,

    /// Read newline-separated changed paths from a file, or stdin for `-`
    #[arg(long, value_name = "PATH")]
    changed_files: Option<PathBuf>,

    /// Print the owners of each path instead of labels. Walks the working
    /// tree when no paths are given.
    #[arg(long)]
    owners: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CODEOWNERS_LABELER_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn changed_paths(&self) -> Result<Vec<String>> {
        let mut paths = self.paths.clone();
        if let Some(file) = &self.changed_files {
            let from_file = local::read_paths(file)
                .with_context(|| format!("reading changed paths from {}", file.display()))?;
            paths.extend(from_file);
        }
        Ok(paths)
    }

    fn label_map(&self) -> Result<LabelMap> {
        let json = match (&self.labels_to_owners, &self.labels_file) {
            (Some(json), _) => json.clone(),
            (None, Some(file)) => std::fs::read_to_string(file)
                .with_context(|| format!("reading label map from {}", file.display()))?,
            (None, None) => return Ok(LabelMap::new()),
        };
        LabelMap::from_labels_to_owners_json(&json).context("parsing labels-to-owners")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let paths = cli.changed_paths()?;
    let resolver = Resolver::new(cli.label_map()?)
        .with_default_labels(cli.enable_default_labels)
        .with_observer(TracingObserver);

    if cli.owners {
        let parsed = parse_file(&cli.codeowners_file)
            .with_context(|| format!("reading {}", cli.codeowners_file.display()))?;
        for warning in &parsed.warnings {
            tracing::warn!(line = warning.line, "{}", warning.message);
        }
        let rules = parsed.into_ruleset();
        let paths = if paths.is_empty() {
            walk_files(".")
        } else {
            paths
        };
        print_owners(&rules, &paths);
        return Ok(());
    }

    let provider = LocalProvider::new(
        ".",
        ChangeRequest {
            id: LOCAL_CHANGE_REQUEST,
            changed_paths: paths,
            labels: cli.existing_labels.clone(),
        },
    );
    let mut labeler = Labeler::new(provider, LogWriter, resolver);
    let ownership_path = cli.codeowners_file.to_string_lossy();

    match labeler.run(LOCAL_CHANGE_REQUEST, &ownership_path) {
        Ok(LabelOutcome::Applied {
            new_labels,
            all_labels,
        }) => {
            println!("new-labels={}", new_labels.join(","));
            println!("all-labels={}", all_labels.join(","));
        }
        Ok(LabelOutcome::Unchanged { all_labels }) => {
            println!("new-labels=");
            println!("all-labels={}", all_labels.join(","));
        }
        Ok(LabelOutcome::Skipped(reason)) => {
            tracing::info!(?reason, "no labels resolved");
        }
        Err(ProviderError::PermissionDenied { action }) => {
            anyhow::bail!("missing write permission to {}", action);
        }
        Err(err) => return Err(err).context("labelling change request"),
    }

    Ok(())
}

fn print_owners(rules: &RuleSet, paths: &[String]) {
    #[cfg(feature = "rayon")]
    let lines = paths
        .par_iter()
        .map(|path| owners_line(rules, path))
        .collect::<Vec<_>>();
    #[cfg(not(feature = "rayon"))]
    let lines = paths
        .iter()
        .map(|path| owners_line(rules, path))
        .collect::<Vec<_>>();

    for line in lines {
        println!("{}", line);
    }
}

fn owners_line(rules: &RuleSet, path: &str) -> String {
    match rules.owners(path) {
        Some(owners) => format!("{:<70}  {}", path, owners.join(" ")),
        None => format!("{:<70}  (unowned)", path),
    }
}

fn walk_files(root: impl AsRef<Path>) -> Vec<String> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git")
        .filter_map(|e| e.ok())
        .filter(|entry| !entry.file_type().is_dir())
        .map(|entry| {
            let path = entry.path();
            path.strip_prefix(".")
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}
