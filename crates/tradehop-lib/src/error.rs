use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the tradehop library.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
///
/// Configuration errors are raised by up-front validation before any search
/// state exists. Data errors mean the trade data cannot satisfy the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Data,
    Io,
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// An option has an invalid or contradictory value.
    #[error("{message}")]
    InvalidOption { message: String },

    /// A required option was not supplied.
    #[error("missing '{option}'")]
    MissingOption { option: &'static str },

    /// An explicitly named station fails one of the station filters.
    #[error("{role} station {station} does not meet {requirement} requirement{}", format_detail(.detail))]
    StationIneligible {
        role: String,
        station: String,
        requirement: &'static str,
        detail: Option<String>,
    },

    /// The via list has more entries than the route has free stops.
    #[error(
        "route is not long enough for the list of via destinations you gave; \
         reduce the vias or try again with '--hops {suggested_hops}' or greater"
    )]
    ViaTooLong { suggested_hops: usize },

    /// A via entry also appears (directly or through its system) in the avoid list.
    #[error("via {place} conflicts with avoid list")]
    ViaAvoidConflict { place: String },

    /// An explicit endpoint also appears in the via list of a two-hop route.
    #[error("{place} used in {anchor} and --via with only 2 hops")]
    AnchorInVia { place: String, anchor: &'static str },

    /// A unique-station route cannot be satisfied.
    #[error("{message}")]
    UniqueInfeasible { message: String },

    /// Raised when a place name could not be found.
    #[error("unknown place name: {name}{}", format_suggestions(.suggestions))]
    UnknownPlace {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a place name matches more than one station.
    #[error("ambiguous place name {name}: could be {}", .candidates.join(", "))]
    AmbiguousPlace {
        name: String,
        candidates: Vec<String>,
    },

    /// No station survived selection, with a message describing why.
    #[error("{message}")]
    NoData { message: String },

    /// A station that must trade has no price data at all.
    #[error("no price data in local database for {role} station: {station}")]
    NoPriceData { role: String, station: String },

    /// The database holds no profitable trade anywhere, or none matched.
    #[error("{message}")]
    NoProfitableTrades { message: String },

    /// No completed route visited any of the via destinations.
    #[error("no routes were found which matched your 'via' selections")]
    NoViaMatch,

    /// Dataset could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for dataset location")]
    ProjectDirsUnavailable,

    /// Raised when attempting to load a schema that is not supported.
    #[error("unsupported dataset schema; expected System/Station/Item/StationItem tables")]
    UnsupportedSchema,

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error as configuration, data or I/O.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidOption { .. }
            | Error::MissingOption { .. }
            | Error::StationIneligible { .. }
            | Error::ViaTooLong { .. }
            | Error::ViaAvoidConflict { .. }
            | Error::AnchorInVia { .. }
            | Error::UniqueInfeasible { .. }
            | Error::UnknownPlace { .. }
            | Error::AmbiguousPlace { .. } => ErrorKind::Configuration,
            Error::NoData { .. }
            | Error::NoPriceData { .. }
            | Error::NoProfitableTrades { .. }
            | Error::NoViaMatch
            | Error::UnsupportedSchema => ErrorKind::Data,
            Error::DatasetNotFound { .. }
            | Error::ProjectDirsUnavailable
            | Error::Sqlite(_)
            | Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidOption {
            message: message.into(),
        }
    }
}

fn format_detail(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(" ({detail})"),
        None => String::new(),
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_place_lists_suggestions() {
        let err = Error::UnknownPlace {
            name: "Lave Stn".to_string(),
            suggestions: vec!["Lave Station".to_string(), "Leesti".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("Did you mean one of: 'Lave Station', 'Leesti'?"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn pad_size_rejection_names_the_requirement() {
        let err = Error::StationIneligible {
            role: "--from".to_string(),
            station: "LAVE/Lave Station".to_string(),
            requirement: "pad-size",
            detail: Some("you specified: L, current data for station: M".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("does not meet pad-size requirement"));
        assert!(message.contains("current data for station: M"));
    }

    #[test]
    fn data_errors_are_classified() {
        assert_eq!(Error::NoViaMatch.kind(), ErrorKind::Data);
        assert_eq!(
            Error::NoData {
                message: "nothing".into()
            }
            .kind(),
            ErrorKind::Data
        );
    }
}
