//! Process configuration.
//!
//! Everything is settable from the command line or the environment; a `.env`
//! file is honored when present (loaded by the binary before parsing).

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::tools::forge::ResourceLimits;

/// Command line and environment configuration for the server.
#[derive(Parser, Debug, Clone)]
#[command(name = "toolforge", version, about)]
pub struct Settings {
    /// Path to the tool registry file (ordered JSON array of descriptors).
    #[arg(long, env = "TOOLFORGE_REGISTRY", default_value = "tools/registry.json")]
    pub registry: PathBuf,

    /// Enable the diagnostic side channel on stderr.
    ///
    /// Off by default: stdout belongs to the protocol, and stderr stays
    /// silent unless explicitly requested.
    #[arg(long, env = "TOOLFORGE_DEBUG")]
    pub debug: bool,

    /// Wall-clock budget for a single tool call, in seconds.
    #[arg(long, env = "TOOLFORGE_CALL_TIMEOUT", default_value_t = 30)]
    pub call_timeout_secs: u64,

    /// Fuel budget for a single tool call (CPU metering).
    #[arg(long, env = "TOOLFORGE_CALL_FUEL", default_value_t = 10_000_000)]
    pub call_fuel: u64,
}

impl Settings {
    /// Per-call resource limits derived from the configured budgets.
    pub fn limits(&self) -> ResourceLimits {
        ResourceLimits {
            fuel: self.call_fuel,
            timeout: Duration::from_secs(self.call_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::parse_from(["toolforge"]);
        assert_eq!(settings.registry, PathBuf::from("tools/registry.json"));
        assert!(!settings.debug);
        assert_eq!(settings.limits().timeout, Duration::from_secs(30));
        assert_eq!(settings.limits().fuel, 10_000_000);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::parse_from([
            "toolforge",
            "--registry",
            "/tmp/custom.json",
            "--debug",
            "--call-timeout-secs",
            "5",
        ]);
        assert_eq!(settings.registry, PathBuf::from("/tmp/custom.json"));
        assert!(settings.debug);
        assert_eq!(settings.limits().timeout, Duration::from_secs(5));
    }
}
