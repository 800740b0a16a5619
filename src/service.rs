//! Orbit session: model updating and the public query surface.
use crate::{
    error::Error,
    fit::fit_day,
    locate::{locate, SvCoordinates},
    products::{ProductSource, ProductTier},
    sample::OrbitSample,
    store::{DayOrbits, OrbitStore},
    time::{day_and_offset, GpsDay},
};

use log::{info, warn};

use std::collections::HashSet;

use gnss::prelude::SV;
use hifitime::Epoch;

/// One [PreciseOrbits::locate_satellites] result row, joined back on
/// the caller identifiers. Unavailable rows carry NaN coordinates;
/// query through [PreciseOrbits::locate] to branch on the cause
/// instead.
#[derive(Debug, Clone, PartialEq)]
pub struct SvPosition {
    /// Vehicle, as queried
    pub sv: SV,
    /// Instant, as queried
    pub epoch: Epoch,
    /// Geocentric ECEF x, in meters (NaN when unavailable)
    pub x_m: f64,
    /// Geocentric ECEF y, in meters (NaN when unavailable)
    pub y_m: f64,
    /// Geocentric ECEF z, in meters (NaN when unavailable)
    pub z_m: f64,
}

/// Precise orbit session: owns the [OrbitStore] and one product
/// source. Build one per process and keep it around: days accumulate
/// in memory for its lifetime and are never re-acquired.
pub struct PreciseOrbits<S: ProductSource> {
    /// Model store
    pub store: OrbitStore,
    /// Orbit product provider
    source: S,
}

impl<S: ProductSource> PreciseOrbits<S> {
    pub fn new(store: OrbitStore, source: S) -> Self {
        Self { store, source }
    }

    /// Makes sure every requested day is represented in memory.
    /// Previously persisted days are loaded; unknown days are acquired
    /// (final, then rapid, then ultra), fitted and persisted. A day
    /// where every tier fails stays in memory as an empty model:
    /// its queries degrade to unavailable, and this process will not
    /// attempt the transfer again.
    pub fn ensure_days(&mut self, days: &HashSet<GpsDay>) -> Result<(), Error> {
        let persisted = self.store.persisted_days();

        let mut missing = days.difference(&persisted).copied().collect::<Vec<_>>();
        missing.sort();

        for day in missing {
            if self.store.contains(day) {
                // already attempted (and possibly failed) this run
                continue;
            }
            let Some(samples) = self.acquire_with_fallback(day) else {
                continue;
            };
            info!("creating {} orbit", day);
            let model = fit_day(day, &samples)?;
            self.store.persist(day, &model)?;
        }

        for &day in days {
            if self.store.contains(day) {
                continue;
            }
            match self.store.load_persisted(day)? {
                Some(model) => self.store.insert(day, model),
                None => {
                    // unbuildable day, cached empty on purpose
                    self.store.insert(day, DayOrbits::default());
                },
            }
        }

        Ok(())
    }

    /// One acquisition pass for one day, downgrading through the
    /// product tiers. Every failed tier gets one warning; exhausting
    /// them all is non fatal and leaves the day unbuilt.
    fn acquire_with_fallback(&self, day: GpsDay) -> Option<Vec<OrbitSample>> {
        for tier in ProductTier::DOWNGRADE {
            match self.source.acquire(day, tier) {
                Ok(samples) => {
                    info!("{} ({}) product: {} samples", day, tier, samples.len());
                    return Some(samples);
                },
                Err(e) => {
                    warn!("{} ({}) product not available: {}", day, tier, e);
                },
            }
        }
        warn!("{} orbits cannot be built: all products failed", day);
        None
    }

    /// Vehicles tracked on each instant's calendar day (the tracked
    /// set is considered static over a day).
    pub fn name_satellites(&mut self, times: &[Epoch]) -> Result<Vec<Vec<SV>>, Error> {
        let days = times
            .iter()
            .map(|t| day_and_offset(*t).0)
            .collect::<Vec<_>>();

        self.ensure_days(&days.iter().copied().collect())?;

        Ok(days
            .iter()
            .map(|day| {
                self.store
                    .get(*day)
                    .map(|model| model.sv().collect())
                    .unwrap_or_default()
            })
            .collect())
    }

    /// Typed batch query: one (vehicle, instant) per row, one
    /// [SvCoordinates] per row, in row order. Ensures every referenced
    /// day first. Mismatched input lengths abort the batch.
    pub fn locate(&mut self, svs: &[SV], times: &[Epoch]) -> Result<Vec<SvCoordinates>, Error> {
        if svs.len() != times.len() {
            return Err(Error::BatchLengthMismatch(svs.len(), times.len()));
        }

        let mut days = Vec::with_capacity(times.len());
        let mut times_ns = Vec::with_capacity(times.len());
        for t in times {
            let (day, offset) = day_and_offset(*t);
            days.push(day);
            times_ns.push(offset);
        }

        self.ensure_days(&days.iter().copied().collect())?;
        locate(&self.store, &days, &times_ns, svs)
    }

    /// Geocentric WGS84 position for each (vehicle, instant) row,
    /// joined back on the caller identifiers. Unavailable rows come
    /// back as NaN, never as an error.
    pub fn locate_satellites(
        &mut self,
        svs: &[SV],
        times: &[Epoch],
    ) -> Result<Vec<SvPosition>, Error> {
        let outcomes = self.locate(svs, times)?;

        Ok(outcomes
            .iter()
            .zip(svs.iter().zip(times.iter()))
            .map(|(outcome, (sv, epoch))| {
                let (x_m, y_m, z_m) = outcome.to_xyz();
                SvPosition {
                    sv: *sv,
                    epoch: *epoch,
                    x_m,
                    y_m,
                    z_m,
                }
            })
            .collect())
    }
}
