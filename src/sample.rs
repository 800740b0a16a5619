use crate::time::GpsDay;

use gnss::prelude::SV;

/// One tabulated product sample: the position of one vehicle at one
/// product epoch. This is what [crate::products::ProductSource]
/// implementations feed the fitter with.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitSample {
    /// Product epoch counter, 1 for the first epoch of the product
    pub epoch_index: usize,
    /// Calendar day this sample belongs to
    pub day: GpsDay,
    /// Time of day, in nanoseconds
    pub time_of_day_ns: i64,
    /// Vehicle
    pub sv: SV,
    /// ECEF x coordinate, in meters
    pub x_m: f64,
    /// ECEF y coordinate, in meters
    pub y_m: f64,
    /// ECEF z coordinate, in meters
    pub z_m: f64,
    /// Clock offset in microseconds, when the product publishes one
    pub clock_us: Option<f64>,
}
