//! swe-version core library
//!
//! Resolves the identity of one browser build: the time-based version code,
//! the channel branding, the about-dialog text and the multi-repository
//! changelog. See [`Orchestrator`] for the full pass.

pub mod artifacts;
pub mod build_info;
pub mod changelog;
pub mod channel;
pub mod config;
pub mod environment;
pub mod error;
pub mod fakes;
pub mod obs;
pub mod orchestrator;
pub mod runner;
pub mod telemetry;
pub mod vcs;
pub mod version_code;

pub use artifacts::{contact_block, render_about_xml, render_build_info, write_if_changed};
pub use build_info::{BuildInfo, DependencyHash, SeedVersion};
pub use changelog::{render_changelog, ChangelogConfig};
pub use channel::{ChannelLayout, ChannelSearchResult, MatchPolicy};
pub use config::{DependencyProject, ResolverConfig};
pub use environment::{Clock, EnvironmentSnapshot, SystemClock};
pub use error::{Result, SweVersionError};
pub use orchestrator::{Emit, Options, Orchestrator, Outcome};
pub use runner::{CommandRunner, SystemCommandRunner};
pub use telemetry::init_tracing;
pub use vcs::{CommitHash, GitRepository, ManifestEntry};
pub use version_code::{decode, epoch_minutes, version_code, EPOCH_UTC, MAX_VERSION_CODE};

/// swe-version crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
