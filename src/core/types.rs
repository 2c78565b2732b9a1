//! Core data types for the fusion pipeline

use serde::{Deserialize, Serialize};

use crate::core::units::{AccelerationUnit, Speed};
use crate::core::vector::Vector3;
use crate::validation::error::FusionError;

/// Geodetic position with motion attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Ground speed, `None` when unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Speed>,
    /// Direction of travel in degrees clockwise from true north, `None` when unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<f64>,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64, timestamp: f64) -> Self {
        Self {
            latitude,
            longitude,
            speed: None,
            course: None,
            timestamp,
        }
    }

    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_course(mut self, course_deg: f64) -> Self {
        self.course = Some(course_deg);
        self
    }
}

/// Origin of a position stored in the sample log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixSource {
    Gps,
    DeadReckoning,
}

/// The single payload carried by a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplePayload {
    Location {
        coordinate: Coordinate,
        source: FixSource,
    },
    /// Earth-frame acceleration recorded before any position baseline existed
    Acceleration(Vector3<AccelerationUnit>),
    /// True heading in degrees
    Heading(f64),
}

/// Timestamped entry of the sample log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "SampleRecord", try_from = "SampleRecord")]
pub struct SensorSample {
    pub timestamp: f64,
    pub payload: SamplePayload,
}

impl SensorSample {
    pub fn location(timestamp: f64, coordinate: Coordinate, source: FixSource) -> Self {
        Self {
            timestamp,
            payload: SamplePayload::Location { coordinate, source },
        }
    }

    pub fn acceleration(timestamp: f64, acceleration: Vector3<AccelerationUnit>) -> Self {
        Self {
            timestamp,
            payload: SamplePayload::Acceleration(acceleration),
        }
    }

    pub fn heading(timestamp: f64, heading_deg: f64) -> Self {
        Self {
            timestamp,
            payload: SamplePayload::Heading(heading_deg),
        }
    }

    pub fn coordinate(&self) -> Option<&Coordinate> {
        match &self.payload {
            SamplePayload::Location { coordinate, .. } => Some(coordinate),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.payload {
            SamplePayload::Location { source: FixSource::Gps, .. } => "gps",
            SamplePayload::Location { source: FixSource::DeadReckoning, .. } => "dead_reckoning",
            SamplePayload::Acceleration(_) => "acceleration",
            SamplePayload::Heading(_) => "heading",
        }
    }
}

/// Sparse export form of a [`SensorSample`].
///
/// Absent payloads are omitted when written and read back as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FixSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<Vector3<AccelerationUnit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

impl From<SensorSample> for SampleRecord {
    fn from(sample: SensorSample) -> Self {
        let mut record = SampleRecord {
            timestamp: sample.timestamp,
            location: None,
            source: None,
            acceleration: None,
            heading: None,
        };
        match sample.payload {
            SamplePayload::Location { coordinate, source } => {
                record.location = Some(coordinate);
                record.source = Some(source);
            }
            SamplePayload::Acceleration(accel) => record.acceleration = Some(accel),
            SamplePayload::Heading(heading) => record.heading = Some(heading),
        }
        record
    }
}

impl TryFrom<SampleRecord> for SensorSample {
    type Error = FusionError;

    fn try_from(record: SampleRecord) -> Result<Self, Self::Error> {
        let populated = [
            record.location.is_some(),
            record.acceleration.is_some(),
            record.heading.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        let payload = match (record.location, record.acceleration, record.heading) {
            (Some(coordinate), None, None) => SamplePayload::Location {
                coordinate,
                // Records written without a source predate the tag; only GPS wrote bare locations
                source: record.source.unwrap_or(FixSource::Gps),
            },
            (None, Some(accel), None) => SamplePayload::Acceleration(accel),
            (None, None, Some(heading)) => SamplePayload::Heading(heading),
            _ => return Err(FusionError::MalformedRecord { populated }),
        };

        Ok(SensorSample {
            timestamp: record.timestamp,
            payload,
        })
    }
}

/// Device attitude in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// One device-motion update from the motion sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceMotion {
    /// Row-major body-to-earth rotation, earth X toward true north and Z vertical
    pub rotation_matrix: [[f64; 3]; 3],
    /// Gravity-free acceleration in the body frame
    pub user_acceleration: Vector3<AccelerationUnit>,
    pub attitude: Attitude,
    pub timestamp: f64,
}

/// Raw GPS fix as delivered by a location provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// m/s, negative when unknown
    pub speed: f64,
    /// Degrees from north, negative when unknown
    pub course: f64,
    pub timestamp: f64,
}

impl LocationFix {
    /// Map the provider's negative sentinels onto absent values
    pub fn to_coordinate(&self) -> Coordinate {
        let speed = (self.speed >= 0.0).then(|| Speed::meters_per_second(self.speed));
        let course = (self.course >= 0.0).then_some(self.course);

        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
            speed,
            course,
            timestamp: self.timestamp,
        }
    }
}

/// Compass heading update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingFix {
    /// Degrees clockwise from true north
    pub true_heading: f64,
    pub timestamp: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_fix_sentinels_become_absent() {
        let fix = LocationFix {
            latitude: 24.7,
            longitude: 46.7,
            speed: -1.0,
            course: -1.0,
            timestamp: 10.0,
        };
        let coordinate = fix.to_coordinate();
        assert!(coordinate.speed.is_none());
        assert!(coordinate.course.is_none());

        let moving = LocationFix { speed: 3.0, course: 90.0, ..fix }.to_coordinate();
        assert_eq!(moving.speed, Some(Speed::meters_per_second(3.0)));
        assert_eq!(moving.course, Some(90.0));
    }

    #[test]
    fn test_heading_sample_round_trip_is_sparse() {
        let sample = SensorSample::heading(12.5, 270.0);
        let json = serde_json::to_string(&sample).unwrap();
        assert!(!json.contains("location"));
        assert!(!json.contains("acceleration"));

        let record: SampleRecord = serde_json::from_str(&json).unwrap();
        assert!(record.location.is_none());
        assert!(record.acceleration.is_none());
        assert_eq!(record.heading, Some(270.0));

        let restored: SensorSample = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, sample);
    }

    #[test]
    fn test_location_sample_keeps_source() {
        let coordinate = Coordinate::new(1.0, 2.0, 3.0).with_course(45.0);
        let sample = SensorSample::location(3.0, coordinate, FixSource::DeadReckoning);
        let json = serde_json::to_string(&sample).unwrap();
        let restored: SensorSample = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, sample);
        assert_eq!(restored.kind(), "dead_reckoning");
    }

    #[test]
    fn test_record_with_two_payloads_is_rejected() {
        let json = r#"{"timestamp":1.0,"heading":10.0,"acceleration":{"x":0.0,"y":0.0,"z":0.0,"unit":"meters_per_second_squared"}}"#;
        let result: Result<SensorSample, _> = serde_json::from_str(json);
        assert!(result.is_err());

        let record: SampleRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(
            SensorSample::try_from(record),
            Err(FusionError::MalformedRecord { populated: 2 })
        ));
    }

    #[test]
    fn test_empty_record_is_rejected() {
        let record = SampleRecord {
            timestamp: 0.0,
            location: None,
            source: None,
            acceleration: None,
            heading: None,
        };
        assert!(matches!(
            SensorSample::try_from(record),
            Err(FusionError::MalformedRecord { populated: 0 })
        ));
    }
}
