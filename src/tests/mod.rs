mod locate;

use crate::prelude::{GpsDay, OrbitSample, OrbitStore, SV};

use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

pub fn day42() -> GpsDay {
    GpsDay::new(2020, 42).unwrap()
}

pub fn sv(name: &str) -> SV {
    SV::from_str(name).unwrap()
}

/// Private scratch directory for one test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("gnss-orbits-tests")
        .join(format!("{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

pub fn scratch_store(name: &str) -> OrbitStore {
    OrbitStore::new(scratch_dir(name)).unwrap()
}

/// Evenly spaced synthetic series: smooth but not polynomial, so
/// overlapping windows produce close but distinct fits.
pub fn sine_series(day: GpsDay, sv: SV, len: usize, step_ns: i64) -> Vec<OrbitSample> {
    (0..len)
        .map(|i| {
            let t_ns = i as i64 * step_ns;
            let s = t_ns as f64 / (step_ns as f64 * 11.0);
            OrbitSample {
                epoch_index: i + 1,
                day,
                time_of_day_ns: t_ns,
                sv,
                x_m: 26.5E6 * (1.3 * s).sin(),
                y_m: 26.5E6 * (0.9 * s).cos(),
                z_m: 12.0E6 * (1.7 * s).sin() + 1.0E6,
                clock_us: Some(219.0),
            }
        })
        .collect()
}
