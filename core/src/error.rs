//! Setup-time failures surfaced to callers that configure a match.

/// Configuration errors that abort board construction or unit setup.
///
/// Turn denials are never reported through this type; they are expressed as
/// outcomes so callers can keep playing.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum SetupError {
    /// The formation catalog has no layout for the requested team size.
    #[error("no formation registered for team size {team_size}")]
    UnknownFormation {
        /// Team size that failed the lookup.
        team_size: u32,
    },
    /// A spacing value was zero, negative or not finite.
    #[error("spacing `{field}` must be positive and finite (received {value})")]
    InvalidSpacing {
        /// Name of the offending spacing field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// A move range fell outside the permitted interval.
    #[error("move range must lie within 1..=5 (received {value})")]
    InvalidMoveRange {
        /// Value that failed validation.
        value: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::SetupError;

    #[test]
    fn unknown_formation_names_the_team_size() {
        let error = SetupError::UnknownFormation { team_size: 4 };
        assert_eq!(error.to_string(), "no formation registered for team size 4");
    }

    #[test]
    fn invalid_spacing_names_the_field() {
        let error = SetupError::InvalidSpacing {
            field: "horizontal",
            value: -1.0,
        };
        assert!(error.to_string().contains("`horizontal`"));
    }
}
