//! SP3 precise orbit text parsing, into the tabular sample stream.
use crate::{sample::OrbitSample, time::GpsDay};

use thiserror::Error;

use std::str::FromStr;

use gnss::prelude::SV;

#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("failed to parse epoch from \"{0}\"")]
    Epoch(String),
    #[error("failed to parse sv from \"{0}\"")]
    SV(String),
    #[error("failed to parse (x, y or z) coordinate from \"{0}\"")]
    Coordinates(String),
    #[error("failed to parse clock data from \"{0}\"")]
    Clock(String),
    #[error("position record before any epoch header")]
    OrphanPosition,
}

fn end_of_file(content: &str) -> bool {
    content.eq("EOF")
}

fn new_epoch(content: &str) -> bool {
    content.starts_with('*')
}

fn position_entry(content: &str) -> bool {
    content.starts_with('P')
}

/// Parses an epoch header ("* yyyy mm dd hh mm ss.ssssssss", leading
/// "*  " stripped) into the calendar day and nanoseconds of day.
fn parse_epoch(content: &str) -> Result<(GpsDay, i64), ParsingError> {
    if content.len() < 17 {
        return Err(ParsingError::Epoch(content.to_string()));
    }

    let y = i32::from_str(content[0..4].trim())
        .or(Err(ParsingError::Epoch(content[0..4].to_string())))?;

    let m = u8::from_str(content[4..7].trim())
        .or(Err(ParsingError::Epoch(content[4..7].to_string())))?;

    let d = u8::from_str(content[7..10].trim())
        .or(Err(ParsingError::Epoch(content[7..10].to_string())))?;

    let hh = i64::from_str(content[10..13].trim())
        .or(Err(ParsingError::Epoch(content[10..13].to_string())))?;

    let mm = i64::from_str(content[13..16].trim())
        .or(Err(ParsingError::Epoch(content[13..16].to_string())))?;

    let ss = f64::from_str(content[16..].trim())
        .or(Err(ParsingError::Epoch(content[16..].to_string())))?;

    let time_of_day_ns = (hh * 3600 + mm * 60) * 1_000_000_000 + (ss * 1.0E9).round() as i64;
    Ok((GpsDay::from_ymd(y, m, d), time_of_day_ns))
}

/// Parses SP3 content into [OrbitSample]s, in product order.
///
/// Epoch headers set the day and time of the following position
/// records. Position records shorter than the mandatory 46 columns
/// are tolerated (skipped), as are zeroed (missing) positions. The
/// "999999." clock field means no clock is published. Velocity
/// records and header lines are ignored.
pub fn parse(content: &str) -> Result<Vec<OrbitSample>, ParsingError> {
    let mut samples = Vec::new();
    let mut current = Option::<(GpsDay, i64)>::None;
    let mut epoch_index = 0;

    for line in content.lines() {
        let line = line.trim_end();
        if end_of_file(line) {
            break;
        }
        if new_epoch(line) {
            let fields = line.get(3..).ok_or(ParsingError::Epoch(line.to_string()))?;
            current = Some(parse_epoch(fields)?);
            epoch_index += 1;
        }
        if position_entry(line) {
            if line.len() < 46 {
                continue; // tolerates malformed positions
            }
            let (day, time_of_day_ns) = current.ok_or(ParsingError::OrphanPosition)?;

            let sv = SV::from_str(line[1..4].trim())
                .or(Err(ParsingError::SV(line[1..4].to_string())))?;

            let x_km = f64::from_str(line[4..18].trim())
                .or(Err(ParsingError::Coordinates(line[4..18].to_string())))?;

            let y_km = f64::from_str(line[18..32].trim())
                .or(Err(ParsingError::Coordinates(line[18..32].to_string())))?;

            let z_km = f64::from_str(line[32..46].trim())
                .or(Err(ParsingError::Coordinates(line[32..46].to_string())))?;

            let mut clock_us = Option::<f64>::None;
            if line.len() >= 60 {
                let field = line[46..60].trim();
                // "999999." encodes an unknown clock
                if !field.starts_with("999999.") {
                    let clk =
                        f64::from_str(field).or(Err(ParsingError::Clock(field.to_string())))?;
                    clock_us = Some(clk);
                }
            }

            // zeroed positions encode missing data
            if x_km != 0.0_f64 && y_km != 0.0_f64 && z_km != 0.0_f64 {
                samples.push(OrbitSample {
                    epoch_index,
                    day,
                    time_of_day_ns,
                    sv,
                    clock_us,
                    x_m: x_km * 1.0E3,
                    y_m: y_km * 1.0E3,
                    z_m: z_km * 1.0E3,
                });
            }
        }
    }

    Ok(samples)
}
