//! Orbit product acquisition: quality tiers, the provider seam and
//! the built-in SP3 archive fetcher.
use crate::{sample::OrbitSample, time::GpsDay};

use thiserror::Error;

pub mod fetch;
pub mod sp3;

/// Precise orbit product quality tier.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ProductTier {
    /// Final combined product: best accuracy, about two weeks of
    /// latency, all constellations.
    #[default]
    Final,
    /// Rapid product: about one day of latency, all constellations.
    Rapid,
    /// Ultra rapid product: lowest latency, GPS + GLONASS only.
    /// Callers must tolerate the reduced vehicle coverage.
    Ultra,
}

impl ProductTier {
    /// Acquisition priority: best quality first, falling through on
    /// failure. A failed attempt is definite, a tier is never retried.
    pub const DOWNGRADE: [ProductTier; 3] = [Self::Final, Self::Rapid, Self::Ultra];
}

impl std::fmt::Display for ProductTier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Final => f.write_str("final"),
            Self::Rapid => f.write_str("rapid"),
            Self::Ultra => f.write_str("ultra"),
        }
    }
}

impl std::str::FromStr for ProductTier {
    type Err = FetchError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "final" => Ok(Self::Final),
            "rapid" => Ok(Self::Rapid),
            "ultra" => Ok(Self::Ultra),
            _ => Err(FetchError::UnknownTier(s.to_string())),
        }
    }
}

/// Failure of one (day, tier) acquisition attempt. Non fatal by
/// design: the model updater downgrades to the next tier and, with
/// every tier exhausted, leaves the day unbuilt.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unknown product tier \"{0}\"")]
    UnknownTier(String),
    #[error("product not available: {0}")]
    Unavailable(String),
    #[error("transfer error: {0}")]
    Transfer(#[from] reqwest::Error),
    #[error("archive i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("product parsing error: {0}")]
    Parsing(#[from] sp3::ParsingError),
}

/// Orbit product providers implement [ProductSource] to feed the
/// model updater: the full tabular sample stream covering one
/// calendar day, at one quality tier.
///
/// The updater calls serially, at most once per (day, tier) and
/// process: implementations do not need to deduplicate requests,
/// though caching raw products across processes (as
/// [fetch::Sp3Fetcher] does) avoids repeated transfers.
pub trait ProductSource {
    fn acquire(&self, day: GpsDay, tier: ProductTier) -> Result<Vec<OrbitSample>, FetchError>;
}
