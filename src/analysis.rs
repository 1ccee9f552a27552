use crate::error::StatsError;
use crate::stats::{hourly_average, linear_fit, mean, pearson_correlation};
use crate::types::{CorrelationKind, DayType, HourlyRecord, Metric, TravelUpdate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scatter plot of delay ratio against aqi with its trend line and correlation.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub start_location: String,
    pub kind: CorrelationKind,
    pub n_samples: usize,
    pub points: Vec<[f64; 2]>,
    pub trend: Option<[[f64; 2]; 2]>,
    pub r: Option<f64>,
    pub r2: Option<f64>,
}

/// Bar chart of one metric per hour with its average as reference line.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct HourlyReport {
    pub route_id: u32,
    pub day_type: DayType,
    pub metric: Metric,
    pub bars: Vec<HourlyBar>,
    pub average: Option<f64>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct HourlyBar {
    pub hour: u8,
    pub value: f64,
}

/// Averages over the latest update of every route.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub n_updates: usize,
    pub avg_aqi: Option<f64>,
    pub avg_delay_ratio: Option<f64>,
    pub avg_driving_time: Option<f64>,
    pub avg_transit_time: Option<f64>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutesReport {
    pub options: Vec<RouteOption>,
    pub start_locations: Vec<StartLocation>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteOption {
    pub route_id: u32,
    pub label: String,
}

/// Routes leaving one start location, as shown on the map.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct StartLocation {
    pub name: String,
    pub routes: Vec<RouteSnapshot>,
    pub avg_aqi: Option<f64>,
    pub avg_delay_ratio: Option<f64>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub route_id: u32,
    pub end_location: String,
    pub driving_travel_time: f64,
    pub transit_travel_time: f64,
    pub aqi: f64,
    pub delay_ratio: f64,
}

/// Builds display reports, rounding every value to a fixed number of decimals.
///
/// A failed statistic only drops the overlay it feeds; the rest of the report
/// is still produced.
pub struct Analyzer {
    decimals: u32,
}

impl Analyzer {
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    pub fn correlation(
        &self,
        start_location: &str,
        kind: CorrelationKind,
        delay_ratio: &[f64],
        aqi: &[f64],
    ) -> CorrelationReport {
        let points = delay_ratio
            .iter()
            .zip(aqi)
            .map(|(&x, &y)| [self.round(x), self.round(y)])
            .collect();

        let trend = overlay("trend line", linear_fit(delay_ratio, aqi)).map(|fit| {
            let [(x0, y0), (x1, y1)] = fit.endpoints();
            [
                [self.round(x0), self.round(y0)],
                [self.round(x1), self.round(y1)],
            ]
        });

        let corr = overlay("correlation", pearson_correlation(delay_ratio, aqi));

        CorrelationReport {
            start_location: start_location.to_string(),
            kind,
            n_samples: delay_ratio.len().min(aqi.len()),
            points,
            trend,
            r: corr.map(|corr| self.round(corr.r)),
            r2: corr.map(|corr| self.round(corr.r2)),
        }
    }

    pub fn hourly(
        &self,
        records: &[HourlyRecord],
        route_id: u32,
        day_type: DayType,
        metric: Metric,
    ) -> HourlyReport {
        let mut series: Vec<_> = records
            .iter()
            .filter(|rec| rec.route_id == route_id && rec.day_type == day_type)
            .cloned()
            .collect();
        series.sort_by_key(|rec| rec.hour);

        let bars = series
            .iter()
            .map(|rec| HourlyBar {
                hour: rec.hour,
                value: self.round(metric.value(rec)),
            })
            .collect();

        let average = overlay("reference line", hourly_average(&series, metric));

        HourlyReport {
            route_id,
            day_type,
            metric,
            bars,
            average: average.map(|avg| self.round(avg)),
        }
    }

    pub fn summary(&self, updates: &[TravelUpdate]) -> SummaryReport {
        let avg = |what: &str, field: fn(&TravelUpdate) -> f64| {
            let vals: Vec<_> = updates.iter().map(field).collect();
            overlay(what, mean(&vals)).map(|avg| self.round(avg))
        };

        SummaryReport {
            n_updates: updates.len(),
            avg_aqi: avg("average aqi", |upd| upd.aqi),
            avg_delay_ratio: avg("average delay ratio", |upd| upd.delay_ratio),
            avg_driving_time: avg("average driving time", |upd| upd.driving_travel_time),
            avg_transit_time: avg("average transit time", |upd| upd.transit_travel_time),
        }
    }

    pub fn routes(&self, updates: &[TravelUpdate]) -> RoutesReport {
        let mut labels = BTreeMap::new();
        let mut groups: BTreeMap<&str, Vec<&TravelUpdate>> = BTreeMap::new();
        for upd in updates {
            labels.insert(
                upd.route_id,
                format!("{} - {}", upd.start_location, upd.end_location),
            );
            groups.entry(upd.start_location.as_str()).or_default().push(upd);
        }

        let options = labels
            .into_iter()
            .map(|(route_id, label)| RouteOption {
                route_id,
                label: format!("Route {route_id}: {label}"),
            })
            .collect();

        let start_locations = groups
            .into_iter()
            .map(|(name, group)| {
                let aqi: Vec<_> = group.iter().map(|upd| upd.aqi).collect();
                let delay_ratio: Vec<_> = group.iter().map(|upd| upd.delay_ratio).collect();
                StartLocation {
                    name: name.to_string(),
                    routes: group.iter().map(|upd| self.snapshot(upd)).collect(),
                    avg_aqi: mean(&aqi).ok().map(|avg| self.round(avg)),
                    avg_delay_ratio: mean(&delay_ratio).ok().map(|avg| self.round(avg)),
                }
            })
            .collect();

        RoutesReport {
            options,
            start_locations,
        }
    }

    fn snapshot(&self, upd: &TravelUpdate) -> RouteSnapshot {
        RouteSnapshot {
            route_id: upd.route_id,
            end_location: upd.end_location.clone(),
            driving_travel_time: self.round(upd.driving_travel_time),
            transit_travel_time: self.round(upd.transit_travel_time),
            aqi: self.round(upd.aqi),
            delay_ratio: self.round(upd.delay_ratio),
        }
    }

    fn round(&self, val: f64) -> f64 {
        let scale = 10f64.powi(self.decimals as i32);
        let scaled = val * scale;
        if !scaled.is_finite() {
            // too large to carry any decimals anyway
            return val;
        }
        scaled.round() / scale
    }
}

fn overlay<T>(what: &str, result: Result<T, StatsError>) -> Option<T> {
    match result {
        Ok(val) => Some(val),
        Err(error) => {
            log::warn!("skipping {what}: {error}");
            None
        }
    }
}
