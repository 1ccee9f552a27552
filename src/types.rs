//! Records served by the metrics API.

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// Kind of day an hourly aggregate was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Weekday,
    Weekend,
    Today,
    Yesterday,
}

impl DayType {
    pub fn name(&self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
            DayType::Today => "today",
            DayType::Yesterday => "yesterday",
        }
    }
}

/// Metric columns of an [`HourlyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    AvgAqi,
    AvgDelayRatio,
    AvgDrivingTime,
    AvgTransitTime,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::AvgAqi => "avg_aqi",
            Metric::AvgDelayRatio => "avg_delay_ratio",
            Metric::AvgDrivingTime => "avg_driving_time",
            Metric::AvgTransitTime => "avg_transit_time",
        }
    }

    pub fn value(&self, rec: &HourlyRecord) -> f64 {
        match self {
            Metric::AvgAqi => rec.avg_aqi,
            Metric::AvgDelayRatio => rec.avg_delay_ratio,
            Metric::AvgDrivingTime => rec.avg_driving_time,
            Metric::AvgTransitTime => rec.avg_transit_time,
        }
    }
}

/// Time offset between the delay ratio and aqi samples of a correlation series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
    /// Both samples taken in the same minute.
    SameMinute,
    /// Aqi sampled one hour (±20 min) after the delay ratio.
    PlusOneHour,
    /// Aqi sampled two hours (±20 min) after the delay ratio.
    PlusTwoHours,
}

impl CorrelationKind {
    pub const ALL: [CorrelationKind; 3] = [
        CorrelationKind::SameMinute,
        CorrelationKind::PlusOneHour,
        CorrelationKind::PlusTwoHours,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CorrelationKind::SameMinute => "same_minute",
            CorrelationKind::PlusOneHour => "plus_one_hour",
            CorrelationKind::PlusTwoHours => "plus_two_hours",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Per-hour averages of one route over one kind of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub hour: u8,
    #[serde(deserialize_with = "route_id")]
    pub route_id: u32,
    pub day_type: DayType,
    pub avg_aqi: f64,
    pub avg_delay_ratio: f64,
    pub avg_driving_time: f64,
    pub avg_transit_time: f64,
}

/// Index-aligned delay ratio and aqi samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSeries {
    pub delay_ratio: Vec<f64>,
    pub aqi: Vec<f64>,
}

/// Latest measurement of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelUpdate {
    pub timestamp: String,
    #[serde(deserialize_with = "route_id")]
    pub route_id: u32,
    pub aqi: f64,
    pub delay_ratio: f64,
    pub driving_travel_time: f64,
    pub transit_travel_time: f64,
    pub start_location: String,
    pub end_location: String,
}

/// Route ids are served either as numbers or as numeric strings.
fn route_id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(u32),
        Str(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Num(id) => Ok(id),
        RawId::Str(id) => id.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hourly_record_from_json() {
        let json = r#"{
            "hour": 8, "route_id": "3", "day_type": "weekend",
            "avg_aqi": 41.5, "avg_delay_ratio": 1.8,
            "avg_driving_time": 22, "avg_transit_time": 39.5
        }"#;
        let rec: HourlyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.route_id, 3);
        assert_eq!(rec.day_type, DayType::Weekend);
        assert_eq!(Metric::AvgDrivingTime.value(&rec), 22.0);
        assert_eq!(Metric::AvgTransitTime.value(&rec), 39.5);
    }

    #[test]
    fn invalid_route_id_is_rejected() {
        let json = r#"{
            "timestamp": "2025-05-01T08:00:00", "route_id": "r7",
            "aqi": 40, "delay_ratio": 1.2,
            "driving_travel_time": 20, "transit_travel_time": 24,
            "start_location": "Athens", "end_location": "Piraeus"
        }"#;
        assert!(serde_json::from_str::<TravelUpdate>(json).is_err());
    }

    #[test]
    fn correlation_kind_names() {
        for kind in CorrelationKind::ALL {
            assert_eq!(CorrelationKind::from_name(kind.name()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
        assert_eq!(CorrelationKind::from_name("plus_three_hours"), None);
    }

    #[test]
    fn names_match_serialized_values() {
        let day = serde_json::to_string(&DayType::Yesterday).unwrap();
        assert_eq!(day, format!("\"{}\"", DayType::Yesterday.name()));
        let metric = serde_json::to_string(&Metric::AvgTransitTime).unwrap();
        assert_eq!(metric, format!("\"{}\"", Metric::AvgTransitTime.name()));
    }
}
