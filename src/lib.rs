#![doc = include_str!("../README.md")]

extern crate gnss_rs as gnss;

// private modules
mod error;
mod fit;
mod locate;
mod sample;
mod service;
mod store;
mod time;

pub mod products;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::fit::{fit_day, fit_window, OrbitWindow, SeriesRow, SvWindows};
    pub use crate::locate::{locate, SvCoordinates, Unavailability};
    pub use crate::products::{
        fetch::{FetchConfig, Sp3Fetcher},
        FetchError, ProductSource, ProductTier,
    };
    pub use crate::sample::OrbitSample;
    pub use crate::service::{PreciseOrbits, SvPosition};
    pub use crate::store::{DayOrbits, OrbitStore};
    pub use crate::time::{day_and_offset, GpsDay};
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}
