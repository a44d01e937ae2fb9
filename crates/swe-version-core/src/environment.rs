//! Snapshot of the machine a build runs on.

use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;

use crate::error::Result;
use crate::runner::CommandRunner;

/// Variable holding the support address shown on the about page.
pub const SUPPORT_CONTACT_VAR: &str = "SWE_APK_SUPPORT";

/// `date(1)` default output, e.g. `Mon Oct 19 14:03:11 +00:00 2026`.
pub const BUILD_DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Z %Y";

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Environment variable lookup, injected so tests never read the process
/// environment.
pub type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Reads the real process environment.
pub fn process_env() -> EnvLookup {
    Box::new(|key| std::env::var(key).ok())
}

/// Facts about the build host, captured once per pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentSnapshot {
    pub build_date: String,
    pub host_name: String,
    pub user_name: String,
    /// Support address from [`SUPPORT_CONTACT_VAR`]; empty values count as
    /// unset.
    pub support_contact: Option<String>,
}

impl EnvironmentSnapshot {
    pub fn capture(
        runner: &dyn CommandRunner,
        clock: &dyn Clock,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            build_date: clock.now().format(BUILD_DATE_FORMAT).to_string(),
            host_name: runner.run(&["hostname"], None)?,
            user_name: runner.run(&["whoami"], None)?,
            support_contact: env(SUPPORT_CONTACT_VAR).filter(|v| !v.is_empty()),
        })
    }
}
