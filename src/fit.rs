//! Piecewise polynomial orbit model construction.
use crate::{
    error::Error,
    sample::OrbitSample,
    store::DayOrbits,
    time::{GpsDay, NANOS_PER_DAY},
};

use log::warn;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

use gnss::prelude::SV;

/// Number of consecutive samples one window is built from.
pub(crate) const WINDOW_LEN: usize = 8;

/// Offset of the centering sample within a window.
const MID: usize = 3;

/// Natural spacing between window centers, in samples. Adjacent
/// windows therefore share half of their samples.
const CENTER_STEP: usize = 4;

/// Ordered window map of one vehicle: midpoint time of day (ns,
/// ascending) to the window fit around it. Nearest window search
/// relies on this ordering.
pub type SvWindows = BTreeMap<i64, OrbitWindow>;

/// One time ordered row of a vehicle daily series:
/// (time ns, x m, y m, z m), time relative to the fitted day start.
pub type SeriesRow = (i64, f64, f64, f64);

/// One interpolation window: a degree 7 polynomial per coordinate,
/// exact through [WINDOW_LEN] consecutive product samples, valid over
/// the inclusive `[lower_ns, upper_ns]` interval.
///
/// Polynomials are fit in affinely rescaled time and position space
/// (`(v - midpoint) / scale`): raw day timestamps are large integers
/// and would condition the fit poorly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitWindow {
    /// Start of validity, in nanoseconds of day
    #[serde(rename = "lb")]
    pub lower_ns: i64,
    /// End of validity, in nanoseconds of day
    #[serde(rename = "ub")]
    pub upper_ns: i64,
    /// `[t, x, y, z]` centering point of the rescaling
    #[serde(rename = "mid")]
    pub midpoint: [f64; 4],
    /// `[t, x, y, z]` span of the rescaling, all nonzero
    pub scale: [f64; 4],
    /// X axis coefficients, degree 0..=7 ascending, in scaled space
    pub x: [f64; 8],
    /// Y axis coefficients, degree 0..=7 ascending, in scaled space
    pub y: [f64; 8],
    /// Z axis coefficients, degree 0..=7 ascending, in scaled space
    pub z: [f64; 8],
}

impl OrbitWindow {
    /// True if this instant (ns of day) lies inside the validity interval.
    pub fn contains(&self, t_ns: i64) -> bool {
        (self.lower_ns..=self.upper_ns).contains(&t_ns)
    }

    /// Evaluates the three coordinate polynomials at this instant
    /// (ns of day) and undoes the rescaling. Meaningless outside the
    /// validity interval: check [Self::contains] first.
    pub fn evaluate(&self, t_ns: i64) -> Vector3<f64> {
        let t = (t_ns as f64 - self.midpoint[0]) / self.scale[0];
        Vector3::new(
            polyval(&self.x, t) * self.scale[1] + self.midpoint[1],
            polyval(&self.y, t) * self.scale[2] + self.midpoint[2],
            polyval(&self.z, t) * self.scale[3] + self.midpoint[3],
        )
    }
}

/// Evaluates a polynomial with ascending coefficients (Horner form).
fn polyval(coefs: &[f64; 8], t: f64) -> f64 {
    coefs.iter().rev().fold(0.0_f64, |acc, c| acc * t + c)
}

/// Coefficients (ascending) of the unique degree 7 polynomial through
/// the 8 (time, value) pairs, by expansion of the Lagrange basis.
fn lagrange_coefficients(times: &[f64; 8], values: &[f64; 8]) -> [f64; 8] {
    let mut coefs = [0.0_f64; 8];
    for i in 0..WINDOW_LEN {
        // numerator of the i-th basis polynomial: product of (t - t_j)
        let mut basis = [0.0_f64; 8];
        basis[0] = 1.0;
        let mut degree = 0;
        let mut denom = 1.0_f64;
        for j in 0..WINDOW_LEN {
            if j == i {
                continue;
            }
            denom *= times[i] - times[j];
            degree += 1;
            for k in (1..=degree).rev() {
                basis[k] = basis[k - 1] - times[j] * basis[k];
            }
            basis[0] *= -times[j];
        }
        let weight = values[i] / denom;
        for k in 0..WINDOW_LEN {
            coefs[k] += weight * basis[k];
        }
    }
    coefs
}

/// Fits one [OrbitWindow] around `center` and returns it keyed by its
/// midpoint timestamp. `series` must be time sorted.
///
/// The window is built from the 8 samples at `[center-3, center+5)`:
/// bounds are the first and last of them, the rescaling midpoint is
/// the `center` sample and the span their componentwise difference.
/// A `center` that cannot host a complete window is a contract
/// violation ([Error::OutsideFitInterval]); a zero span on any axis is
/// reported as [Error::DegenerateWindow].
pub fn fit_window(series: &[SeriesRow], center: usize) -> Result<(i64, OrbitWindow), Error> {
    if center < MID || center + WINDOW_LEN - MID > series.len() {
        return Err(Error::OutsideFitInterval);
    }

    let rows = &series[center - MID..center + WINDOW_LEN - MID];
    let (first, last) = (rows[0], rows[WINDOW_LEN - 1]);

    let midpoint = [rows[MID].0 as f64, rows[MID].1, rows[MID].2, rows[MID].3];
    let scale = [
        (last.0 - first.0) as f64,
        last.1 - first.1,
        last.2 - first.2,
        last.3 - first.3,
    ];

    if scale.iter().any(|s| *s == 0.0) {
        return Err(Error::DegenerateWindow);
    }

    let mut times = [0.0_f64; 8];
    let mut axes = [[0.0_f64; 8]; 3];
    for (k, row) in rows.iter().enumerate() {
        times[k] = (row.0 as f64 - midpoint[0]) / scale[0];
        axes[0][k] = (row.1 - midpoint[1]) / scale[1];
        axes[1][k] = (row.2 - midpoint[2]) / scale[2];
        axes[2][k] = (row.3 - midpoint[3]) / scale[3];
    }

    Ok((
        rows[MID].0,
        OrbitWindow {
            midpoint,
            scale,
            lower_ns: first.0,
            upper_ns: last.0,
            x: lagrange_coefficients(&times, &axes[0]),
            y: lagrange_coefficients(&times, &axes[1]),
            z: lagrange_coefficients(&times, &axes[2]),
        },
    ))
}

/// Fits one calendar day of product samples into a [DayOrbits] model.
///
/// Samples are separated per vehicle, time sorted and deduplicated.
/// Sample timestamps are taken relative to `base` day start, so
/// products running past midnight stay monotonic. Window centers are
/// every [CENTER_STEP]-th sample, plus a final window forced onto the
/// last valid center so the tail of the day is always covered.
///
/// A vehicle with fewer than [WINDOW_LEN] samples cannot host a single
/// window: it is dropped from the model with a warning.
pub fn fit_day(base: GpsDay, samples: &[OrbitSample]) -> Result<DayOrbits, Error> {
    let mut per_sv = BTreeMap::<SV, BTreeMap<i64, (f64, f64, f64)>>::new();
    for s in samples {
        let tm = s.day.days_since(base) * NANOS_PER_DAY + s.time_of_day_ns;
        per_sv
            .entry(s.sv)
            .or_default()
            .insert(tm, (s.x_m, s.y_m, s.z_m));
    }

    let mut model = DayOrbits::default();

    for (sv, rows) in per_sv {
        let series = rows
            .into_iter()
            .map(|(t, (x, y, z))| (t, x, y, z))
            .collect::<Vec<SeriesRow>>();

        if series.len() < WINDOW_LEN {
            warn!(
                "{} ({}) dropped: {} sample(s) cannot host a window",
                base,
                sv,
                series.len()
            );
            continue;
        }

        let last_center = series.len() - (WINDOW_LEN - MID);
        let mut centers = (MID..=last_center)
            .step_by(CENTER_STEP)
            .collect::<Vec<usize>>();
        if centers.last() != Some(&last_center) {
            // force the tail window so the day end is covered
            centers.push(last_center);
        }

        let mut windows = SvWindows::new();
        for center in centers {
            match fit_window(&series, center) {
                Ok((key, window)) => {
                    windows.insert(key, window);
                },
                Err(Error::DegenerateWindow) => {
                    warn!("{} ({}) window around sample #{} has a zero span", base, sv, center);
                },
                Err(e) => return Err(e),
            }
        }

        if !windows.is_empty() {
            model.satellites.insert(sv, windows);
        }
    }

    Ok(model)
}
