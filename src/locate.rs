//! Position queries against the orbit store.
use crate::{error::Error, fit::SvWindows, store::OrbitStore, time::GpsDay};

use itertools::Itertools;
use log::warn;
use nalgebra::Vector3;

use gnss::prelude::SV;

/// Why one query row could not be resolved.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Unavailability {
    /// No model exists for this day (never requested, or every
    /// product tier failed when it was).
    NoModel,
    /// The day model exists but does not track this vehicle.
    NoSatellite,
    /// The vehicle is tracked, but no window is valid at this instant.
    OutOfBounds,
}

/// Outcome of one position query row. Degradation is part of the
/// result, not an error: a batch always resolves row per row.
#[derive(Debug, Clone, PartialEq)]
pub enum SvCoordinates {
    /// Geocentric ECEF position, in meters
    Position(Vector3<f64>),
    /// No position at this instant, with the cause
    Unavailable(Unavailability),
}

impl SvCoordinates {
    /// Resolved position, if any.
    pub fn position(&self) -> Option<Vector3<f64>> {
        match self {
            Self::Position(p) => Some(*p),
            Self::Unavailable(_) => None,
        }
    }

    /// Projects to an (x, y, z) meter triple, NaN when unavailable:
    /// the tabular form of this outcome.
    pub fn to_xyz(&self) -> (f64, f64, f64) {
        match self {
            Self::Position(p) => (p.x, p.y, p.z),
            Self::Unavailable(_) => (f64::NAN, f64::NAN, f64::NAN),
        }
    }
}

/// Resolves a batch of (day, time of day, vehicle) rows against the
/// store. Output order matches input order; unavailable rows are a
/// valid outcome. Rows are grouped per distinct (day, vehicle) pair so
/// model lookups happen once per group.
///
/// Mismatched input lengths are a contract violation and abort the
/// whole batch.
pub fn locate(
    store: &OrbitStore,
    days: &[GpsDay],
    times_ns: &[i64],
    svs: &[SV],
) -> Result<Vec<SvCoordinates>, Error> {
    if days.len() != times_ns.len() || days.len() != svs.len() {
        return Err(Error::BatchLengthMismatch(svs.len(), times_ns.len()));
    }

    let mut results = vec![SvCoordinates::Unavailable(Unavailability::NoModel); days.len()];

    let pairs = days
        .iter()
        .copied()
        .zip(svs.iter().copied())
        .unique()
        .collect::<Vec<_>>();

    for (day, sv) in pairs {
        let windows = match store.get(day) {
            None => Err(Unavailability::NoModel),
            Some(model) if model.is_empty() => Err(Unavailability::NoModel),
            Some(model) => model.windows(sv).ok_or(Unavailability::NoSatellite),
        };

        match windows {
            Err(cause) => {
                warn!("{} ({}) orbits are not available: {:?}", day, sv, cause);
                for i in 0..days.len() {
                    if days[i] == day && svs[i] == sv {
                        results[i] = SvCoordinates::Unavailable(cause);
                    }
                }
            },
            Ok(windows) => {
                for i in 0..days.len() {
                    if days[i] == day && svs[i] == sv {
                        results[i] = locate_one(windows, times_ns[i], day, sv);
                    }
                }
            },
        }
    }

    Ok(results)
}

/// Resolves one instant against one vehicle window map: nearest
/// midpoint first, then the validity bounds of that window.
fn locate_one(windows: &SvWindows, t_ns: i64, day: GpsDay, sv: SV) -> SvCoordinates {
    let below = windows.range(..t_ns).next_back();
    let above = windows.range(t_ns..).next();

    let window = match (below, above) {
        (Some((t_b, below)), Some((t_a, above))) => {
            // equidistant instants resolve to the later window
            if (t_ns - t_b).abs() < (t_a - t_ns).abs() {
                below
            } else {
                above
            }
        },
        (Some((_, below)), None) => below,
        (None, Some((_, above))) => above,
        (None, None) => {
            // empty maps never reach the store
            return SvCoordinates::Unavailable(Unavailability::NoSatellite);
        },
    };

    if !window.contains(t_ns) {
        warn!(
            "{} ({}) is tracked, but no window is valid at {} ns",
            day, sv, t_ns
        );
        return SvCoordinates::Unavailable(Unavailability::OutOfBounds);
    }

    SvCoordinates::Position(window.evaluate(t_ns))
}
