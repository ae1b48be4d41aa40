use thiserror::Error;

use crate::constants::{JulianDay, Planet};

#[derive(Error, Debug)]
pub enum AstrocartaError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Ephemeris error: {0}")]
    Ephemeris(String),

    #[error("Ephemeris returned non-finite data for {planet} at JD {jd}")]
    NonFiniteEphemeris { planet: Planet, jd: JulianDay },

    #[error("Unknown planet name: {0}")]
    UnknownPlanet(String),

    #[error("Invalid chart snapshot: {0}")]
    SnapshotFormat(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Computation cancelled")]
    Cancelled,

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PartialEq for AstrocartaError {
    fn eq(&self, other: &Self) -> bool {
        use AstrocartaError::*;
        match (self, other) {
            (InvalidInput(a), InvalidInput(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (Ephemeris(a), Ephemeris(b)) => a == b,
            (
                NonFiniteEphemeris {
                    planet: p1,
                    jd: jd1,
                },
                NonFiniteEphemeris {
                    planet: p2,
                    jd: jd2,
                },
            ) => p1 == p2 && jd1 == jd2,
            (UnknownPlanet(a), UnknownPlanet(b)) => a == b,
            (SnapshotFormat(a), SnapshotFormat(b)) => a == b,
            (InvalidDate(a), InvalidDate(b)) => a == b,
            (Cancelled, Cancelled) => true,

            // Wrapped errors are not comparable: equal iff same variant
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            _ => false,
        }
    }
}
