//! Sample log export
//!
//! Two formats are supported: JSON lines (one sparse [`SampleRecord`] per
//! line, lossless) and CSV (flat, for spreadsheets and plotting).

use std::fmt::Write as _;

use crate::core::types::{FixSource, SampleRecord, SensorSample};
use crate::core::units::{Speed, SpeedUnit};
use crate::validation::error::{FusionError, FusionResult};

const CSV_HEADER: &str = concat!(
    "timestamp,kind,latitude,longitude,speed_mps,course_deg,",
    "accel_x,accel_y,accel_z,accel_unit,heading_deg"
);

/// Converts logged samples to and from export formats
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleExporter;

impl SampleExporter {
    pub fn new() -> Self {
        SampleExporter
    }

    /// One JSON object per line, absent payloads omitted
    pub fn to_json_lines(&self, records: &[SampleRecord]) -> FusionResult<String> {
        let mut out = String::new();
        for (index, record) in records.iter().enumerate() {
            let line = serde_json::to_string(record).map_err(|source| FusionError::Export {
                line: index + 1,
                source,
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse JSON lines back into samples, skipping blank lines
    pub fn from_json_lines(&self, text: &str) -> FusionResult<Vec<SensorSample>> {
        let mut samples = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: SampleRecord =
                serde_json::from_str(line).map_err(|source| FusionError::Export {
                    line: index + 1,
                    source,
                })?;
            samples.push(SensorSample::try_from(record)?);
        }
        Ok(samples)
    }

    /// Flat CSV with empty cells for absent fields
    pub fn to_csv(&self, records: &[SampleRecord]) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');

        for record in records {
            let kind = match (record.location.is_some(), record.acceleration.is_some()) {
                (true, _) => match record.source {
                    Some(FixSource::DeadReckoning) => "dead_reckoning",
                    _ => "gps",
                },
                (false, true) => "acceleration",
                (false, false) => "heading",
            };

            let mut cells: Vec<String> = vec![record.timestamp.to_string(), kind.to_string()];

            match &record.location {
                Some(c) => {
                    cells.push(c.latitude.to_string());
                    cells.push(c.longitude.to_string());
                    cells.push(opt(c.speed.map(|s| s.value_in(SpeedUnit::MetersPerSecond))));
                    cells.push(opt(c.course));
                }
                None => cells.extend(std::iter::repeat(String::new()).take(4)),
            }

            match &record.acceleration {
                Some(a) => {
                    cells.extend(a.components().iter().map(|v| v.to_string()));
                    cells.push(format!("{:?}", a.unit()));
                }
                None => cells.extend(std::iter::repeat(String::new()).take(4)),
            }

            cells.push(opt(record.heading));

            let _ = writeln!(out, "{}", cells.join(","));
        }
        out
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Human-readable speed in `unit`, e.g. "12.6 km/h"
pub fn format_speed(speed: &Speed, unit: SpeedUnit, precision: usize) -> String {
    format!("{:.*}", precision, speed.converted(unit))
}
