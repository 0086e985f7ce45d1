use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use grid_tactics_core::{MoveRange, SetupError, Spacing};
use grid_tactics_system_formation::FormationCatalog;
use serde::Deserialize;

/// Raw match configuration as written in a TOML file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MatchConfig {
    pub(crate) team_size: u32,
    pub(crate) spacing: SpacingConfig,
    pub(crate) default_move_range: i64,
    pub(crate) reconcile_interval_ms: u64,
}

/// `[spacing]` table of the match configuration.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SpacingConfig {
    pub(crate) horizontal: f32,
    pub(crate) vertical: f32,
    pub(crate) team_distance: f32,
    pub(crate) board_height: f32,
}

/// Validated settings a session is started with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MatchSettings {
    pub(crate) team_size: u32,
    pub(crate) spacing: Spacing,
    pub(crate) move_range: MoveRange,
    pub(crate) reconcile_interval: Duration,
}

impl MatchConfig {
    /// Reads and parses a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read match config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load match config at {}", path.display()))
    }

    /// Parses configuration from TOML text. Missing keys keep their defaults.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse match config toml contents")
    }

    /// Converts the raw values into validated settings.
    pub(crate) fn validate(&self, catalog: &FormationCatalog) -> Result<MatchSettings> {
        if self.reconcile_interval_ms == 0 {
            bail!("reconcile_interval_ms must be greater than zero");
        }
        let _ = catalog.layout_for(self.team_size)?;
        let spacing = Spacing::new(
            self.spacing.horizontal,
            self.spacing.vertical,
            self.spacing.team_distance,
            self.spacing.board_height,
        )?;
        let move_range = MoveRange::new(self.default_move_range)?;

        Ok(MatchSettings {
            team_size: self.team_size,
            spacing,
            move_range,
            reconcile_interval: Duration::from_millis(self.reconcile_interval_ms),
        })
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            team_size: 3,
            spacing: SpacingConfig::default(),
            default_move_range: i64::from(MoveRange::default().get()),
            reconcile_interval_ms: 1_000,
        }
    }
}

impl Default for SpacingConfig {
    fn default() -> Self {
        let spacing = Spacing::default();
        Self {
            horizontal: spacing.horizontal(),
            vertical: spacing.vertical(),
            team_distance: spacing.team_distance(),
            board_height: spacing.board_height(),
        }
    }
}

/// Reports whether an error chain bottoms out in a setup error.
pub(crate) fn setup_error(error: &anyhow::Error) -> Option<SetupError> {
    error.chain().find_map(|cause| cause.downcast_ref::<SetupError>().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_standard_match() {
        let settings = MatchConfig::default()
            .validate(&FormationCatalog::standard())
            .expect("defaults are valid");
        assert_eq!(settings.team_size, 3);
        assert_eq!(settings.spacing, Spacing::default());
        assert_eq!(settings.move_range.get(), 2);
        assert_eq!(settings.reconcile_interval, Duration::from_secs(1));
    }

    #[test]
    fn partial_files_keep_defaults() {
        let config = MatchConfig::parse(
            r#"
            team_size = 6

            [spacing]
            horizontal = 3.0
        "#,
        )
        .expect("config should parse");
        assert_eq!(config.team_size, 6);
        assert_eq!(config.spacing.horizontal, 3.0);
        assert_eq!(config.spacing.vertical, 2.0);
        assert_eq!(config.default_move_range, 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = MatchConfig::parse("team_sise = 3");
        assert!(result.is_err(), "misspelt key should fail");
    }

    #[test]
    fn unsupported_team_size_is_a_setup_error() {
        let config = MatchConfig {
            team_size: 4,
            ..MatchConfig::default()
        };
        let error = config
            .validate(&FormationCatalog::standard())
            .expect_err("size 4 has no formation");
        assert_eq!(
            setup_error(&error),
            Some(SetupError::UnknownFormation { team_size: 4 })
        );
    }

    #[test]
    fn non_positive_spacing_is_rejected() {
        let config = MatchConfig::parse(
            r#"
            [spacing]
            vertical = 0.0
        "#,
        )
        .expect("config should parse");
        let error = config
            .validate(&FormationCatalog::standard())
            .expect_err("zero spacing");
        assert_eq!(
            setup_error(&error),
            Some(SetupError::InvalidSpacing {
                field: "vertical",
                value: 0.0,
            })
        );
    }

    #[test]
    fn move_range_outside_interval_is_rejected() {
        let config = MatchConfig {
            default_move_range: 6,
            ..MatchConfig::default()
        };
        assert!(config.validate(&FormationCatalog::standard()).is_err());
    }
}
