use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Record has no usable coordinates")]
    NotLocatable,
    #[error("No destination given")]
    NoDestination,
    #[error("No open facility found")]
    NoOpenFacility,
    #[error("Rate information unavailable for {0}")]
    UnknownFacility(String),
    #[error("Invalid stay: {0}")]
    InvalidStay(String),
    #[error("Invalid tariff: {0}")]
    InvalidTariff(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

impl Error {
    /// Stable machine-readable name of the condition.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotLocatable => "not_locatable",
            Error::NoDestination => "no_destination",
            Error::NoOpenFacility => "no_open_facility",
            Error::UnknownFacility(_) => "unknown_facility",
            Error::InvalidStay(_) => "invalid_stay",
            Error::InvalidTariff(_) => "invalid_tariff",
            Error::InvalidData(_)
            | Error::CsvError(_)
            | Error::JsonError(_)
            | Error::GeoJsonError(_) => "invalid_data",
            Error::IoError(_) => "io_error",
        }
    }

    /// Conditions a caller is expected to render around instead of aborting on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NotLocatable
                | Error::NoDestination
                | Error::NoOpenFacility
                | Error::UnknownFacility(_)
        )
    }
}
