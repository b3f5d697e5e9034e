//! Compiler Invoker — runs external LaTeX compilers with ordered fallback.
//!
//! Candidates are tried in order until one exits successfully AND leaves
//! `resume.pdf` behind. A missing executable, a timeout or a failed run all move
//! on to the next candidate; only exhausting the list is an error.
//!
//! `AppState` carries an `Arc<dyn DocumentCompiler>`, so tests can swap in a fake.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info, warn};

/// File name the composed source is written to inside the scratch directory.
pub const SOURCE_FILE: &str = "resume.tex";
/// File name every candidate is expected to produce.
pub const ARTIFACT_FILE: &str = "resume.pdf";

const INPUT_MARKER: &str = "{input}";
const OUTDIR_MARKER: &str = "{outdir}";
const ALL_FAILED: &str = "All LaTeX compilers failed";

// ────────────────────────────────────────────────────────────────────────────
// Candidates
// ────────────────────────────────────────────────────────────────────────────

/// One external compiler: executable name plus fixed arguments.
///
/// `{input}` and `{outdir}` inside `args` are replaced with the source file path
/// and the scratch directory for each attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCandidate {
    pub program: String,
    pub args: Vec<String>,
}

impl CompilerCandidate {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// A TeX engine invoked the standard way (`pdflatex`, `xelatex`, `lualatex`).
    pub fn tex_engine(program: impl Into<String>) -> Self {
        Self::new(
            program,
            &[
                "-interaction=nonstopmode",
                "-output-directory",
                OUTDIR_MARKER,
                INPUT_MARKER,
            ],
        )
    }

    fn expand_args(&self, input: &Path, outdir: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                INPUT_MARKER => input.as_os_str().to_owned(),
                OUTDIR_MARKER => outdir.as_os_str().to_owned(),
                other => OsString::from(other),
            })
            .collect()
    }
}

pub const DEFAULT_ENGINES: [&str; 3] = ["pdflatex", "xelatex", "lualatex"];

pub fn default_candidates() -> Vec<CompilerCandidate> {
    DEFAULT_ENGINES
        .iter()
        .map(|e| CompilerCandidate::tex_engine(*e))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Failure classification
// ────────────────────────────────────────────────────────────────────────────

/// Best-effort reading of compiler output. Advisory only: the matched strings
/// vary between TeX distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    SpecialCharacter,
    TemplateStructure,
}

impl Diagnosis {
    pub fn classify(output: &str) -> Option<Self> {
        if output.contains("Undefined control sequence") {
            Some(Diagnosis::SpecialCharacter)
        } else if output.contains("Missing") && output.contains("item") {
            Some(Diagnosis::TemplateStructure)
        } else {
            None
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Diagnosis::SpecialCharacter => {
                "LaTeX compilation failed: Special character error. Check for unescaped \
                 characters like &, %, $, #, _, {, }, ~, ^, or \\"
            }
            Diagnosis::TemplateStructure => "LaTeX compilation failed: Template structure error",
        }
    }
}

/// Why a single candidate did not produce a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Executable not found on the host.
    Unavailable,
    TimedOut,
    /// Spawning failed for a reason other than a missing executable.
    LaunchFailed(String),
    /// The process ran but either exited non-zero or left no artifact.
    Failed {
        exit_code: Option<i32>,
        diagnosis: Option<Diagnosis>,
    },
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Unavailable => write!(f, "not installed"),
            AttemptFailure::TimedOut => write!(f, "timed out"),
            AttemptFailure::LaunchFailed(reason) => write!(f, "failed to launch ({reason})"),
            AttemptFailure::Failed {
                exit_code,
                diagnosis,
            } => {
                match exit_code {
                    Some(code) => write!(f, "exited with {code}")?,
                    None => write!(f, "killed by signal")?,
                }
                if let Some(d) = diagnosis {
                    write!(f, ", {d:?}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Failed to stage LaTeX source: {0}")]
    Staging(#[from] std::io::Error),

    #[error("{}", exhausted_message(.diagnosis))]
    Exhausted {
        attempts: Vec<(String, AttemptFailure)>,
        diagnosis: Option<Diagnosis>,
    },
}

fn exhausted_message(diagnosis: &Option<Diagnosis>) -> &'static str {
    (*diagnosis).map(Diagnosis::message).unwrap_or(ALL_FAILED)
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Result of a compiler availability check.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub compiler: String,
    pub available: bool,
    pub version: Option<String>,
}

/// Turns LaTeX source into a PDF inside a caller-owned scratch directory.
#[async_trait]
pub trait DocumentCompiler: Send + Sync {
    /// Returns the path of the produced artifact inside `scratch_dir`.
    async fn compile(&self, source: &str, scratch_dir: &Path) -> Result<PathBuf, CompileError>;

    /// Checks whether the designated compiler can be launched.
    async fn probe(&self) -> ProbeResult;
}

// ────────────────────────────────────────────────────────────────────────────
// LatexCompiler — subprocess implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LatexCompiler {
    candidates: Vec<CompilerCandidate>,
    timeout: Duration,
    probe_timeout: Duration,
}

impl LatexCompiler {
    pub fn new(candidates: Vec<CompilerCandidate>, timeout: Duration, probe_timeout: Duration) -> Self {
        Self {
            candidates,
            timeout,
            probe_timeout,
        }
    }

    pub fn candidates(&self) -> &[CompilerCandidate] {
        &self.candidates
    }

    async fn attempt(
        &self,
        candidate: &CompilerCandidate,
        input: &Path,
        scratch_dir: &Path,
    ) -> Result<PathBuf, AttemptFailure> {
        let name = candidate.program.as_str();
        info!("Trying compiler: {name}");

        let mut command = Command::new(name);
        command
            .args(candidate.expand_args(input, scratch_dir))
            .current_dir(scratch_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => {
                error!("Compiler {name} timed out after {:?}", self.timeout);
                return Err(AttemptFailure::TimedOut);
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Compiler {name} not found");
                return Err(AttemptFailure::Unavailable);
            }
            Ok(Err(e)) => {
                error!("Compiler {name} failed to launch: {e}");
                return Err(AttemptFailure::LaunchFailed(e.to_string()));
            }
            Ok(Ok(output)) => output,
        };

        let exit_code = output.status.code();
        info!("Compiler {name} return code: {exit_code:?}");

        let artifact = scratch_dir.join(ARTIFACT_FILE);
        let artifact_exists = tokio::fs::try_exists(&artifact).await.unwrap_or(false);
        if output.status.success() && artifact_exists {
            info!("Successfully compiled with {name}");
            return Ok(artifact);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{stderr}\n{stdout}");
        let diagnosis = Diagnosis::classify(&combined);

        match diagnosis {
            Some(Diagnosis::SpecialCharacter) => {
                error!("Compiler {name} failed on an undefined control sequence (likely special character issue)");
                error!(
                    "Error details: {}...",
                    combined.trim().chars().take(200).collect::<String>()
                );
            }
            Some(Diagnosis::TemplateStructure) => {
                error!("Compiler {name} failed due to missing item");
            }
            None => {
                warn!(
                    "Compiler {name} failed (exit {exit_code:?}, artifact present: {artifact_exists})"
                );
                warn!("STDOUT: {stdout}");
                warn!("STDERR: {stderr}");
            }
        }

        Err(AttemptFailure::Failed {
            exit_code,
            diagnosis,
        })
    }
}

#[async_trait]
impl DocumentCompiler for LatexCompiler {
    async fn compile(&self, source: &str, scratch_dir: &Path) -> Result<PathBuf, CompileError> {
        let input = scratch_dir.join(SOURCE_FILE);
        tokio::fs::write(&input, source).await?;

        let mut attempts = Vec::with_capacity(self.candidates.len());
        let mut diagnosis = None;

        for candidate in &self.candidates {
            match self.attempt(candidate, &input, scratch_dir).await {
                Ok(artifact) => return Ok(artifact),
                Err(failure) => {
                    if let AttemptFailure::Failed {
                        diagnosis: Some(d), ..
                    } = &failure
                    {
                        diagnosis = Some(*d);
                    }
                    attempts.push((candidate.program.clone(), failure));
                }
            }
        }

        let summary = attempts
            .iter()
            .map(|(program, failure)| format!("{program}: {failure}"))
            .collect::<Vec<_>>()
            .join("; ");
        error!("No compiler produced a PDF ({summary})");

        Err(CompileError::Exhausted {
            attempts,
            diagnosis,
        })
    }

    async fn probe(&self) -> ProbeResult {
        let Some(candidate) = self.candidates.first() else {
            return ProbeResult {
                compiler: String::new(),
                available: false,
                version: None,
            };
        };

        let mut command = Command::new(&candidate.program);
        command
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let (available, version) =
            match tokio::time::timeout(self.probe_timeout, command.output()).await {
                Ok(Ok(output)) if output.status.success() => {
                    let version = String::from_utf8_lossy(&output.stdout)
                        .lines()
                        .next()
                        .map(|l| l.trim().to_string())
                        .filter(|l| !l.is_empty());
                    info!("LaTeX {} is available", candidate.program);
                    (true, version)
                }
                Ok(Ok(output)) => {
                    warn!(
                        "LaTeX check failed: {} exited with {:?}",
                        candidate.program,
                        output.status.code()
                    );
                    (false, None)
                }
                Ok(Err(e)) => {
                    warn!("LaTeX check failed: {e}");
                    (false, None)
                }
                Err(_) => {
                    warn!("LaTeX check failed: {} timed out", candidate.program);
                    (false, None)
                }
            };

        ProbeResult {
            compiler: candidate.program.clone(),
            available,
            version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: Duration = Duration::from_secs(30);

    fn compiler(candidates: Vec<CompilerCandidate>) -> LatexCompiler {
        LatexCompiler::new(candidates, LONG, Duration::from_secs(5))
    }

    fn missing(name: &str) -> CompilerCandidate {
        CompilerCandidate::tex_engine(format!("definitely-not-installed-{name}"))
    }

    #[test]
    fn test_default_candidates_order() {
        let names: Vec<_> = default_candidates().into_iter().map(|c| c.program).collect();
        assert_eq!(names, vec!["pdflatex", "xelatex", "lualatex"]);
    }

    #[test]
    fn test_expand_args_replaces_markers() {
        let args = CompilerCandidate::tex_engine("pdflatex")
            .expand_args(Path::new("/tmp/x/resume.tex"), Path::new("/tmp/x"));
        assert_eq!(
            args,
            vec![
                OsString::from("-interaction=nonstopmode"),
                OsString::from("-output-directory"),
                OsString::from("/tmp/x"),
                OsString::from("/tmp/x/resume.tex"),
            ]
        );
    }

    #[test]
    fn test_classify_special_character() {
        let log = "! Undefined control sequence.\nl.42 Firebase & REST";
        assert_eq!(Diagnosis::classify(log), Some(Diagnosis::SpecialCharacter));
    }

    #[test]
    fn test_classify_template_structure() {
        let log = "! Missing \\item inserted.";
        assert_eq!(Diagnosis::classify(log), Some(Diagnosis::TemplateStructure));
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(Diagnosis::classify("! Emergency stop."), None);
    }

    #[test]
    fn test_attempt_failure_display() {
        assert_eq!(AttemptFailure::Unavailable.to_string(), "not installed");
        let failed = AttemptFailure::Failed {
            exit_code: Some(1),
            diagnosis: Some(Diagnosis::SpecialCharacter),
        };
        assert_eq!(failed.to_string(), "exited with 1, SpecialCharacter");
    }

    #[test]
    fn test_exhausted_message_prefers_diagnosis() {
        let err = CompileError::Exhausted {
            attempts: vec![],
            diagnosis: Some(Diagnosis::TemplateStructure),
        };
        assert_eq!(err.to_string(), "LaTeX compilation failed: Template structure error");

        let err = CompileError::Exhausted {
            attempts: vec![],
            diagnosis: None,
        };
        assert_eq!(err.to_string(), "All LaTeX compilers failed");
    }

    #[tokio::test]
    async fn test_all_missing_compilers_exhaust() {
        let dir = tempfile::tempdir().unwrap();
        let c = compiler(vec![missing("a"), missing("b"), missing("c")]);

        let err = c.compile("\\documentclass{article}", dir.path()).await.unwrap_err();
        match err {
            CompileError::Exhausted {
                attempts,
                diagnosis,
            } => {
                assert_eq!(attempts.len(), 3);
                assert!(attempts
                    .iter()
                    .all(|(_, f)| *f == AttemptFailure::Unavailable));
                assert!(diagnosis.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
        // Source is staged before any attempt.
        assert!(dir.path().join(SOURCE_FILE).exists());
    }

    #[tokio::test]
    async fn test_empty_candidate_list_exhausts() {
        let dir = tempfile::tempdir().unwrap();
        let err = compiler(vec![]).compile("x", dir.path()).await.unwrap_err();
        assert_eq!(err.to_string(), "All LaTeX compilers failed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_zero_without_artifact_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let c = compiler(vec![CompilerCandidate::new("true", &[])]);
        let err = c.compile("x", dir.path()).await.unwrap_err();
        match err {
            CompileError::Exhausted { attempts, .. } => assert_eq!(
                attempts[0].1,
                AttemptFailure::Failed {
                    exit_code: Some(0),
                    diagnosis: None
                }
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_falls_back_and_stops_at_first_success() {
        let dir = tempfile::tempdir().unwrap();
        let c = compiler(vec![
            missing("a"),
            CompilerCandidate::new("false", &[]),
            CompilerCandidate::new("sh", &["-c", "cp \"$1\" resume.pdf", "sh", INPUT_MARKER]),
            CompilerCandidate::new("sh", &["-c", "touch second-ran"]),
        ]);

        let artifact = c.compile("%PDF fake", dir.path()).await.unwrap();
        assert_eq!(artifact, dir.path().join(ARTIFACT_FILE));
        assert_eq!(std::fs::read_to_string(&artifact).unwrap(), "%PDF fake");
        assert!(!dir.path().join("second-ran").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_with_artifact_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let c = compiler(vec![CompilerCandidate::new(
            "sh",
            &["-c", "echo x > resume.pdf; exit 1"],
        )]);
        assert!(c.compile("x", dir.path()).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_classified_failure_continues_and_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let c = compiler(vec![
            CompilerCandidate::new("sh", &["-c", "echo '! Undefined control sequence.'; exit 1"]),
            missing("b"),
        ]);

        let err = c.compile("x", dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Special character error"));
        match err {
            CompileError::Exhausted { attempts, .. } => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[1].1, AttemptFailure::Unavailable);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_moves_to_next_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let c = LatexCompiler::new(
            vec![
                CompilerCandidate::new("sleep", &["10"]),
                CompilerCandidate::new("sh", &["-c", "echo ok > resume.pdf"]),
            ],
            Duration::from_millis(300),
            Duration::from_secs(1),
        );

        let artifact = c.compile("x", dir.path()).await.unwrap();
        assert!(artifact.exists());
    }

    #[tokio::test]
    async fn test_probe_missing_compiler() {
        let probe = compiler(vec![missing("probe")]).probe().await;
        assert!(!probe.available);
        assert!(probe.version.is_none());
    }

    #[tokio::test]
    async fn test_probe_without_candidates() {
        assert!(!compiler(vec![]).probe().await.available);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_available_compiler() {
        let probe = compiler(vec![CompilerCandidate::new("true", &[])]).probe().await;
        assert!(probe.available);
        assert_eq!(probe.compiler, "true");
    }
}
