//! swe-version - build identity metadata for browser releases
//!
//! Resolves the version code, version string, channel branding, about text
//! and changelog for the current checkout, writes whichever artifacts were
//! asked for, and optionally prints the version code or version string.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use swe_version_core::{
    init_tracing, Emit, MatchPolicy, Options, Orchestrator, ResolverConfig, SystemClock,
    SystemCommandRunner,
};

#[derive(Parser, Debug)]
#[command(name = "swe-version")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate version codes, about strings and changelogs for SWE builds", long_about = None)]
struct Cli {
    /// Read base version FILE (MAJOR/MINOR/BUILD/PATCH key=value pairs)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write build info to FILE
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write build info to res FILE
    #[arg(short, long, value_name = "FILE")]
    res: Option<PathBuf>,

    /// Write the multi-repository git log to FILE
    #[arg(short = 'g', long, value_name = "FILE")]
    changelog: Option<PathBuf>,

    /// CHANNEL to read the version code from; may be a comma-separated list
    #[arg(short, long)]
    channel: Option<String>,

    /// Print the version code
    #[arg(long, conflicts_with = "version_string_only")]
    version_code_only: bool,

    /// Print the version string
    #[arg(long)]
    version_string_only: bool,

    /// Write the about page string resource to FILE
    #[arg(long, visible_alias = "about", value_name = "FILE")]
    write_about_string: Option<PathBuf>,

    /// Directory inside the checkout to query
    #[arg(long, default_value = ".", env = "SWE_VERSION_REPO_DIR")]
    repo_dir: PathBuf,

    /// Channel tree (overrides the config file)
    #[arg(long, env = "SWE_VERSION_CHANNELS_DIR")]
    channels_dir: Option<PathBuf>,

    /// JSON resolver config
    #[arg(long, env = "SWE_VERSION_CONFIG")]
    config: Option<PathBuf>,

    /// Use the first matching channel VERSION file instead of the last
    #[arg(long)]
    strict_channel_match: bool,

    /// Print the resolved build record as JSON
    #[arg(long, conflicts_with_all = ["version_code_only", "version_string_only"])]
    dump_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn resolver_config(&self) -> Result<ResolverConfig> {
        let mut config = match &self.config {
            Some(path) => ResolverConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ResolverConfig::default(),
        };
        if let Some(dir) = &self.channels_dir {
            config.channels_dir = dir.clone();
        }
        if self.strict_channel_match {
            config.match_policy = MatchPolicy::FirstMatch;
        }
        Ok(config)
    }

    fn options(&self) -> Options {
        let emit = if self.version_code_only {
            Emit::VersionCode
        } else if self.version_string_only {
            Emit::VersionString
        } else {
            Emit::Nothing
        };
        Options {
            repo_dir: self.repo_dir.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
            res: self.res.clone(),
            about: self.write_about_string.clone(),
            changelog: self.changelog.clone(),
            channel: self.channel.clone(),
            emit,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    init_tracing(cli.json, level);

    let config = cli.resolver_config()?;
    let orchestrator = Orchestrator::new(SystemCommandRunner::new(), SystemClock, config);
    let outcome = orchestrator
        .run(&cli.options())
        .context("Failed to resolve build info")?;

    let mut stdout = std::io::stdout().lock();
    if cli.dump_json {
        serde_json::to_writer_pretty(&mut stdout, &outcome.info)?;
        writeln!(stdout)?;
    } else if let Some(text) = &outcome.stdout {
        write!(stdout, "{text}")?;
    }
    stdout.flush()?;
    Ok(())
}
