use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid date string: {0}")]
    InvalidDate(String),

    #[error("Invalid nite label: {0}")]
    InvalidNite(String),

    #[error("Invalid sexagesimal value: {0}")]
    InvalidSexagesimal(String),

    #[error("Unknown scoring mode: {0}")]
    UnknownScoringMode(String),

    #[error("Unknown dither mode: {0}")]
    UnknownDitherMode(String),

    #[error("Invalid scheduler parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid pointing limit table: {0}")]
    InvalidLimitTable(String),

    #[error("Missing column {column} in {file}")]
    MissingColumn { file: String, column: String },

    #[error("Observation window ends before it starts: {start} -- {end}")]
    InvalidWindow { start: String, end: String },

    #[error("Run stop time {tstop} precedes start time {tstart}")]
    InvalidInterval { tstart: String, tstop: String },

    #[error("No admissible field at {date}")]
    NoAdmissibleField { date: String },

    #[error("No {event} found within the search horizon after {after}")]
    NoSunEvent { event: &'static str, after: String },

    #[error("Refusing to overwrite write-protected file: {0}")]
    WriteProtected(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration file error: {0}")]
    ConfigError(#[from] toml::de::Error),
}

impl PartialEq for SchedulerError {
    fn eq(&self, other: &Self) -> bool {
        use SchedulerError::*;
        match (self, other) {
            (InvalidDate(a), InvalidDate(b)) => a == b,
            (InvalidNite(a), InvalidNite(b)) => a == b,
            (InvalidSexagesimal(a), InvalidSexagesimal(b)) => a == b,
            (UnknownScoringMode(a), UnknownScoringMode(b)) => a == b,
            (UnknownDitherMode(a), UnknownDitherMode(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (InvalidLimitTable(a), InvalidLimitTable(b)) => a == b,
            (WriteProtected(a), WriteProtected(b)) => a == b,
            (
                MissingColumn {
                    file: fa,
                    column: ca,
                },
                MissingColumn {
                    file: fb,
                    column: cb,
                },
            ) => fa == fb && ca == cb,
            (
                InvalidWindow {
                    start: sa,
                    end: ea,
                },
                InvalidWindow {
                    start: sb,
                    end: eb,
                },
            ) => sa == sb && ea == eb,
            (
                InvalidInterval {
                    tstart: sa,
                    tstop: ea,
                },
                InvalidInterval {
                    tstart: sb,
                    tstop: eb,
                },
            ) => sa == sb && ea == eb,
            (NoAdmissibleField { date: a }, NoAdmissibleField { date: b }) => a == b,
            (
                NoSunEvent {
                    event: ea,
                    after: aa,
                },
                NoSunEvent {
                    event: eb,
                    after: ab,
                },
            ) => ea == eb && aa == ab,

            // Wrapped foreign errors are not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            (ConfigError(_), ConfigError(_)) => true,

            _ => false,
        }
    }
}
