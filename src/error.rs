use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Fitting was requested around a sample index that cannot host a
    /// complete window. Internal misuse, never a data condition: series
    /// too short to fit are dropped (and reported), not raised.
    #[error("center index outside fit interval")]
    OutsideFitInterval,

    /// A window whose sample span is zero on one axis cannot be
    /// rescaled. The fitter skips such windows and reports them.
    #[error("degenerate window: zero sample span")]
    DegenerateWindow,

    /// Query batches are row-aligned: one vehicle per instant.
    #[error("query batch length mismatch: {0} vehicles, {1} instants")]
    BatchLengthMismatch(usize, usize),

    /// Calendar days are "YYYYDDD" with a 1..=366 day of year.
    #[error("invalid calendar day \"{0}\"")]
    InvalidDay(String),

    /// A persisted orbit record names a vehicle we cannot interpret.
    #[error("invalid vehicle \"{0}\" in orbit record")]
    RecordSv(String),

    /// Orbit record storage I/O failure.
    #[error("orbit record i/o error: {0}")]
    RecordIo(#[from] std::io::Error),

    /// Orbit record encoding/decoding failure.
    #[error("orbit record format error: {0}")]
    RecordFormat(#[from] serde_json::Error),
}
