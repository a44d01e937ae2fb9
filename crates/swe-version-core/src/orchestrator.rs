//! One build-info resolution pass.

use std::path::PathBuf;

use serde::Serialize;

use crate::artifacts::{render_about_xml, render_build_info, write_if_changed};
use crate::build_info::{
    read_seed_file, swe_build_hash, swe_version, BuildInfo, DependencyHash, SeedVersion,
};
use crate::changelog::render_changelog;
use crate::channel::{self, ChannelSearchResult};
use crate::config::ResolverConfig;
use crate::environment::{process_env, Clock, EnvLookup, EnvironmentSnapshot};
use crate::error::Result;
use crate::obs;
use crate::runner::CommandRunner;
use crate::vcs::GitRepository;
use crate::version_code::{epoch_minutes, parse_major, version_code};

/// What to print on stdout once the artifacts are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Emit {
    #[default]
    Nothing,
    VersionCode,
    VersionString,
}

/// Inputs of one pass. Output paths left as `None` are not written.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Directory inside the checkout; all `git` queries run from here.
    pub repo_dir: PathBuf,
    /// Seed `KEY=VALUE` file with `MAJOR`, `MINOR`, `BUILD`, `PATCH`.
    pub input: Option<PathBuf>,
    /// Build-info file.
    pub output: Option<PathBuf>,
    /// Second copy of the build-info file for the resource tree.
    pub res: Option<PathBuf>,
    /// About-dialog string resource.
    pub about: Option<PathBuf>,
    pub changelog: Option<PathBuf>,
    /// Raw comma-separated channel list.
    pub channel: Option<String>,
    pub emit: Emit,
}

/// Result of [`Orchestrator::run`].
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub info: BuildInfo,
    /// Artifacts whose content changed on disk.
    pub written: Vec<PathBuf>,
    /// Text for stdout, if requested.
    pub stdout: Option<String>,
}

pub struct Orchestrator<R, C> {
    runner: R,
    clock: C,
    env: EnvLookup,
    config: ResolverConfig,
}

impl<R: CommandRunner, C: Clock> Orchestrator<R, C> {
    pub fn new(runner: R, clock: C, config: ResolverConfig) -> Self {
        Self {
            runner,
            clock,
            env: process_env(),
            config,
        }
    }

    /// Replace the environment variable lookup.
    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn repository(&self, options: &Options) -> GitRepository<&R> {
        GitRepository::new(
            &self.runner,
            options.repo_dir.clone(),
            self.config.manifest_command.clone(),
        )
    }

    /// Resolve the build record without writing anything.
    pub fn resolve(&self, options: &Options) -> Result<BuildInfo> {
        obs::emit_resolution_started(&options.repo_dir);
        let repo = self.repository(options);

        let environment = EnvironmentSnapshot::capture(&self.runner, &self.clock, &*self.env)?;

        let seed_values = match &options.input {
            Some(path) => read_seed_file(path)?,
            None => Default::default(),
        };
        let seed = SeedVersion::from_values(seed_values)?;

        let last_swe_change = repo.merge_base()?;
        let tip = repo.current_commit_hash()?;

        let ChannelSearchResult {
            version_file,
            branding_file,
            channel_name,
        } = channel::resolve(
            options.channel.as_deref(),
            &self.config.channel_layout(&options.repo_dir),
            self.config.match_policy,
        );

        let minutes = epoch_minutes(repo.commit_timestamp_utc()?);

        let dependency_hashes = self
            .config
            .dependencies
            .iter()
            .map(|dep| -> Result<DependencyHash> {
                Ok(DependencyHash {
                    key: dep.key.clone(),
                    hash: repo.lookup_commit_hash(&dep.path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let (build_id, build_version_code) = match &version_file {
            Some(path) => {
                let id = channel::read_build_id(path)?;
                (id, id)
            }
            None => {
                let major = parse_major(&seed.major)?;
                let code = i64::from(version_code(Some(major), minutes)?);
                (code, code)
            }
        };
        obs::emit_build_id_resolved(build_id, build_version_code, version_file.is_some());

        Ok(BuildInfo {
            swe_version: swe_version(&seed, build_id),
            swe_build_hash: swe_build_hash(tip.short(), &seed.build),
            package_name: channel::package_name(branding_file.as_deref()),
            major: seed.major,
            minor: seed.minor,
            build: seed.build,
            patch: seed.patch,
            build_id,
            build_version_code,
            last_change: tip.to_string(),
            last_swe_change,
            channel: options.channel.clone(),
            branding_channel_name: channel_name,
            environment,
            dependency_hashes,
            extra: seed.extra,
        })
    }

    /// Resolve, write the requested artifacts, and prepare stdout.
    pub fn run(&self, options: &Options) -> Result<Outcome> {
        let _span = obs::ResolutionSpan::enter(options.channel.as_deref());
        let info = self.resolve(options)?;
        let mut written = Vec::new();

        if let Some(path) = &options.about {
            let changed = write_if_changed(path, &render_about_xml(&info))?;
            obs::emit_artifact("about", path, changed);
            if changed {
                written.push(path.clone());
            }
        }

        let build_info_targets = [&options.output, &options.res];
        if build_info_targets.iter().any(|t| t.is_some()) {
            let content = render_build_info(&info)?;
            for path in build_info_targets.into_iter().flatten() {
                let changed = write_if_changed(path, &content)?;
                obs::emit_artifact("build_info", path, changed);
                if changed {
                    written.push(path.clone());
                }
            }
        }

        if let (Some(channel), Some(path)) = (&options.channel, &options.changelog) {
            if self.config.changelog.is_eligible(channel) {
                let repo = self.repository(options);
                let manifest = repo.manifest()?;
                let content =
                    render_changelog(&repo, &manifest, self.config.changelog.commit_count)?;
                let changed = write_if_changed(path, &content)?;
                obs::emit_artifact("changelog", path, changed);
                if changed {
                    written.push(path.clone());
                }
            } else {
                obs::emit_changelog_skipped(channel);
            }
        }

        let stdout = match options.emit {
            Emit::VersionCode => Some(info.build_version_code.to_string()),
            Emit::VersionString => Some(info.swe_version.clone()),
            Emit::Nothing => None,
        };

        obs::emit_resolution_finished(&info.swe_version);
        Ok(Outcome {
            info,
            written,
            stdout,
        })
    }
}
