//! CLI configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use quest_core::SelectionPolicy;

/// Configuration required to run a scenario from the command line.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub scenario: PathBuf,
    pub seed: u64,
    pub max_ticks: u64,
    pub selection: SelectionPolicy,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from(Self::DEFAULT_SCENARIO),
            seed: 0,
            max_ticks: Self::DEFAULT_MAX_TICKS,
            selection: SelectionPolicy::default(),
            session_id: None,
            log_dir: None,
        }
    }
}

impl CliConfig {
    pub const DEFAULT_SCENARIO: &'static str = "scenarios/my_arm.ron";
    pub const DEFAULT_MAX_TICKS: u64 = 500;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `QUEST_SCENARIO` - Scenario RON file (default: `scenarios/my_arm.ron`)
    /// - `QUEST_SEED` - Base seed for timing jitter (default: 0)
    /// - `QUEST_MAX_TICKS` - Ticks before giving up on the script (default: 500)
    /// - `QUEST_SELECTION` - `in_order` or `nearest` (default: `in_order`)
    /// - `QUEST_SESSION_ID` - Session identifier for log files (default: auto-generated)
    /// - `QUEST_LOG_DIR` - Log directory (default: platform cache dir)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = read("QUEST_SCENARIO") {
            config.scenario = PathBuf::from(path);
        }
        if let Some(seed) = parse(read("QUEST_SEED")) {
            config.seed = seed;
        }
        if let Some(ticks) = parse::<u64>(read("QUEST_MAX_TICKS")) {
            config.max_ticks = ticks.max(1);
        }
        if let Some(selection) = parse(read("QUEST_SELECTION")) {
            config.selection = selection;
        }

        config.session_id = read("QUEST_SESSION_ID");
        config.log_dir = read("QUEST_LOG_DIR").map(PathBuf::from);

        config
    }

    /// First positional argument overrides the scenario path.
    pub fn with_args(mut self, mut args: impl Iterator<Item = String>) -> Self {
        if let Some(path) = args.next() {
            self.scenario = PathBuf::from(path);
        }
        self
    }

    /// Session-independent log root.
    pub fn log_root(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "quester")
            .map(|dirs| dirs.cache_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("/tmp/quester/logs"))
    }
}

fn parse<T>(value: Option<String>) -> Option<T>
where
    T: std::str::FromStr,
{
    value?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> CliConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.scenario, PathBuf::from(CliConfig::DEFAULT_SCENARIO));
        assert_eq!(config.max_ticks, CliConfig::DEFAULT_MAX_TICKS);
        assert_eq!(config.selection, SelectionPolicy::InOrder);
        assert!(config.session_id.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("QUEST_SCENARIO", "fixtures/burntmeat.ron"),
            ("QUEST_SEED", "42"),
            ("QUEST_MAX_TICKS", "80"),
            ("QUEST_SELECTION", "nearest"),
            ("QUEST_SESSION_ID", "demo"),
            ("QUEST_LOG_DIR", "/var/log/quester"),
        ]);
        assert_eq!(config.scenario, PathBuf::from("fixtures/burntmeat.ron"));
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_ticks, 80);
        assert_eq!(config.selection, SelectionPolicy::Nearest);
        assert_eq!(config.session_id.as_deref(), Some("demo"));
        assert_eq!(config.log_root(), PathBuf::from("/var/log/quester"));
    }

    #[test]
    fn ignores_unparseable_values() {
        let config = config_from(&[
            ("QUEST_SEED", "lots"),
            ("QUEST_MAX_TICKS", "0"),
            ("QUEST_SELECTION", "random"),
            ("QUEST_SESSION_ID", "  "),
        ]);
        assert_eq!(config.seed, 0);
        assert_eq!(config.max_ticks, 1);
        assert_eq!(config.selection, SelectionPolicy::InOrder);
        assert!(config.session_id.is_none());
    }

    #[test]
    fn positional_argument_overrides_scenario() {
        let config = config_from(&[("QUEST_SCENARIO", "env.ron")])
            .with_args(["cli.ron".to_string()].into_iter());
        assert_eq!(config.scenario, PathBuf::from("cli.ron"));
    }
}
