//! Purpose: Drive the dual-decode sweep across a directory of JSON data files.
//! Exports: `SweepConfig`, `SweepPolicy`, `Direction`, `FileReport`, `SweepReport`, `run_sweep`.
//! Role: Session orchestration: discovery, dual decode, fallback, bidirectional compare.
//! Invariants: Files are visited in lexical order so sessions are deterministic.
//! Invariants: Candidate decode failures degrade to the reference tree and are logged, never fatal.
//! Invariants: The default policy halts the whole session at the first divergence.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::core::compare::{Divergence, Outcome, compare, format_path};
use crate::core::error::{Error, ErrorKind};
use crate::json::decode;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SweepPolicy {
    FailFast,
    KeepGoing,
}

#[derive(Clone, Debug)]
pub struct SweepConfig {
    pub dir: PathBuf,
    pub extension: String,
    pub policy: SweepPolicy,
}

impl SweepConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: "json".to_string(),
            policy: SweepPolicy::FailFast,
        }
    }
}

/// Which way a comparison ran. The walk is directional, so each file is
/// checked both ways.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    ReferenceToCandidate,
    CandidateToReference,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::ReferenceToCandidate => "reference->candidate",
            Direction::CandidateToReference => "candidate->reference",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FileReport {
    pub file: PathBuf,
    /// The candidate decoder failed and the reference tree stood in for it.
    pub degraded: bool,
    pub forward: Outcome,
    /// Only run when the forward direction matched.
    pub reverse: Option<Outcome>,
}

impl FileReport {
    pub fn divergence(&self) -> Option<(Direction, &Divergence)> {
        if let Some(divergence) = self.forward.divergence() {
            return Some((Direction::ReferenceToCandidate, divergence));
        }
        self.reverse
            .as_ref()
            .and_then(|outcome| outcome.divergence())
            .map(|divergence| (Direction::CandidateToReference, divergence))
    }

    pub fn leaves(&self) -> u64 {
        self.forward.leaves()
            + self
                .reverse
                .as_ref()
                .map(|outcome| outcome.leaves())
                .unwrap_or(0)
    }
}

#[derive(Clone, Debug)]
pub struct SweepReport {
    pub files: Vec<FileReport>,
    pub files_checked: usize,
    pub files_degraded: usize,
    pub files_diverged: usize,
    /// Matched leaves summed across both directions of every file.
    pub leaves_matched: u64,
    pub completed_at: Option<String>,
}

impl SweepReport {
    pub fn clean(&self) -> bool {
        self.files_diverged == 0
    }
}

/// Check every data file in the configured directory: decode it with both
/// backends, fall back to the reference tree when the candidate fails, and
/// compare the two trees in both directions.
pub fn run_sweep(config: &SweepConfig) -> Result<SweepReport, Error> {
    let paths = data_file_paths(&config.dir, &config.extension)?;
    if paths.is_empty() {
        info!(dir = %config.dir.display(), "no data files found");
    }

    let mut files = Vec::new();
    for path in paths {
        let report = check_file(&path)?;
        let diverged = report.divergence().is_some();
        if let Some((direction, divergence)) = report.divergence() {
            warn!(
                file = %path.display(),
                direction = direction.label(),
                path = %format_path(&divergence.path),
                left = %divergence.left,
                right = %divergence.right,
                depth = divergence.depth,
                "structural divergence"
            );
        }
        files.push(report);
        if diverged && config.policy == SweepPolicy::FailFast {
            break;
        }
    }

    let files_checked = files.len();
    let files_degraded = files.iter().filter(|report| report.degraded).count();
    let files_diverged = files
        .iter()
        .filter(|report| report.divergence().is_some())
        .count();
    let leaves_matched = files.iter().map(FileReport::leaves).sum();

    Ok(SweepReport {
        files,
        files_checked,
        files_degraded,
        files_diverged,
        leaves_matched,
        completed_at: rfc3339_now(),
    })
}

fn check_file(path: &Path) -> Result<FileReport, Error> {
    let context = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|err| {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Io,
        };
        Error::new(kind)
            .with_message("failed to read data file")
            .with_path(path)
            .with_source(err)
    })?;

    // The reference decoder is the trusted side; if it cannot produce a tree
    // the fixture itself is unusable and the session stops.
    let reference = decode::reference_tree(&text, &context).map_err(|err| err.with_path(path))?;

    let (candidate, degraded) = match decode::candidate_tree(&text, &context) {
        Ok(tree) => (tree, false),
        Err(err) => {
            warn!(
                file = %context,
                error = %err,
                "candidate decoder failed; substituting the reference tree"
            );
            (
                decode::reference_tree(&text, &context).map_err(|err| err.with_path(path))?,
                true,
            )
        }
    };

    let forward = compare(&reference, &candidate);
    let reverse = match &forward {
        Outcome::Match { leaves } => {
            info!(
                file = %context,
                direction = Direction::ReferenceToCandidate.label(),
                leaves,
                "leaves matched"
            );
            let reverse = compare(&candidate, &reference);
            if let Outcome::Match { leaves } = &reverse {
                info!(
                    file = %context,
                    direction = Direction::CandidateToReference.label(),
                    leaves,
                    "leaves matched"
                );
            }
            Some(reverse)
        }
        Outcome::Divergence(_) => None,
    };

    Ok(FileReport {
        file: path.to_path_buf(),
        degraded,
        forward,
        reverse,
    })
}

fn data_file_paths(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, Error> {
    let entries = fs::read_dir(dir).map_err(|err| {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::Io,
            _ => ErrorKind::Io,
        };
        Error::new(kind)
            .with_message("failed to read data directory")
            .with_path(dir)
            .with_source(err)
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read data directory entry")
                .with_path(dir)
                .with_source(err)
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some(extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn rfc3339_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

#[cfg(test)]
mod tests {
    use super::{SweepConfig, SweepPolicy, run_sweep};
    use crate::core::error::ErrorKind;
    use std::fs;

    fn write_fixture(dir: &std::path::Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).expect("write fixture");
    }

    #[test]
    fn clean_directory_matches_every_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_fixture(temp.path(), "a.json", r#"{"x": 1, "y": [true, null]}"#);
        write_fixture(temp.path(), "b.json", r#"[{"k": "v"}, 2]"#);
        write_fixture(temp.path(), "notes.txt", "not data");

        let report = run_sweep(&SweepConfig::new(temp.path())).expect("sweep");
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.files_diverged, 0);
        assert_eq!(report.files_degraded, 0);
        assert!(report.clean());
        // Three leaves in a.json and two in b.json, counted in both directions.
        assert_eq!(report.leaves_matched, 10);
        assert!(report.completed_at.is_some());
    }

    #[test]
    fn files_are_visited_in_lexical_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_fixture(temp.path(), "b.json", "1");
        write_fixture(temp.path(), "a.json", "2");

        let report = run_sweep(&SweepConfig::new(temp.path())).expect("sweep");
        let names = report
            .files
            .iter()
            .map(|file| file.file.file_name().unwrap().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn candidate_failure_degrades_to_reference_tree() {
        let temp = tempfile::tempdir().expect("tempdir");
        // One past u64::MAX: the reference decoder falls back to a float,
        // the candidate decoder rejects the literal outright.
        write_fixture(temp.path(), "big.json", r#"{"n": 18446744073709551616}"#);

        let report = run_sweep(&SweepConfig::new(temp.path())).expect("sweep");
        assert_eq!(report.files_checked, 1);
        assert_eq!(report.files_degraded, 1);
        assert!(report.clean());
    }

    #[test]
    fn empty_directory_reports_zero_files_checked() {
        let temp = tempfile::tempdir().expect("tempdir");
        let report = run_sweep(&SweepConfig::new(temp.path())).expect("sweep");
        assert_eq!(report.files_checked, 0);
        assert!(report.clean());
        assert_eq!(report.leaves_matched, 0);
    }

    #[test]
    fn missing_directory_is_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = SweepConfig::new(temp.path().join("absent"));
        let err = run_sweep(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unreadable_reference_fixture_is_a_decode_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_fixture(temp.path(), "broken.json", r#"{"a":}"#);

        let config = SweepConfig {
            policy: SweepPolicy::KeepGoing,
            ..SweepConfig::new(temp.path())
        };
        let err = run_sweep(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
