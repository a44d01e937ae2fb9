//! Structured events for one resolution pass.
//!
//! Events are emitted at `info!` unless noted; they all carry an `event`
//! field so log pipelines can filter on it.

use std::path::Path;

use tracing::info;

/// RAII guard that enters a pass-scoped span for the duration of a run.
///
/// ```ignore
/// let _span = ResolutionSpan::enter(Some("beta"));
/// // every event below is tagged with channel = "beta"
/// ```
pub struct ResolutionSpan {
    _span: tracing::span::EnteredSpan,
}

impl ResolutionSpan {
    pub fn enter(channel: Option<&str>) -> Self {
        let span = tracing::info_span!("swe_version.resolve", channel = channel.unwrap_or(""));
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_resolution_started(repo_dir: &Path) {
    info!(event = "resolution.started", repo_dir = %repo_dir.display());
}

/// Emit event: build id and version code settled, with their source.
pub fn emit_build_id_resolved(build_id: i64, version_code: i64, from_version_file: bool) {
    info!(
        event = "build_id.resolved",
        build_id = build_id,
        version_code = version_code,
        from_version_file = from_version_file,
    );
}

/// Emit event: an artifact was compared against disk.
pub fn emit_artifact(kind: &str, path: &Path, written: bool) {
    info!(
        event = "artifact.checked",
        kind = %kind,
        path = %path.display(),
        written = written,
    );
}

/// Emit event: changelog skipped because no channel entry is eligible.
pub fn emit_changelog_skipped(channel: &str) {
    tracing::debug!(event = "changelog.skipped", channel = %channel);
}

pub fn emit_resolution_finished(swe_version: &str) {
    info!(event = "resolution.finished", swe_version = %swe_version);
}
