use crate::analysis::Analyzer;
use crate::config::Config;
use crate::types::{
    CorrelationKind, CorrelationSeries, DayType, HourlyRecord, Metric, TravelUpdate,
};
use anyhow::{Context, Result, bail};
use glob::{Pattern, glob};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Runs reports over the API snapshots stored in a data directory.
pub struct Manager {
    data_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        let config_file = data_dir.join("config.toml");
        let cfg = if config_file.exists() {
            Config::from_file(&config_file).context("failed to construct cfg")?
        } else {
            log::info!("{config_file:?} not found, using default config");
            Config::default()
        };
        log::info!("{cfg:#?}");

        Ok(Self { data_dir, cfg })
    }

    pub fn correlate(&self, start_location: &str, kind: CorrelationKind) -> Result<()> {
        check_start_location(start_location).context("invalid start location")?;

        let series: CorrelationSeries = self
            .load(self.correlation_file(start_location, kind))
            .context("failed to load correlation series")?;

        let report =
            self.analyzer()
                .correlation(start_location, kind, &series.delay_ratio, &series.aqi);
        log::info!(
            "correlated {} samples from {start_location}, r = {:?}",
            report.n_samples,
            report.r
        );

        self.save(
            &report,
            &format!("correlation-{start_location}-{}", kind.name()),
        )
        .context("failed to save correlation report")
    }

    pub fn hourly(&self, route_id: u32, day_type: DayType, metric: Metric) -> Result<()> {
        let records: Vec<HourlyRecord> = self
            .load(self.data_dir.join(&self.cfg.input.hourly_file))
            .context("failed to load hourly records")?;

        let report = self.analyzer().hourly(&records, route_id, day_type, metric);
        log::info!(
            "selected {} of {} hourly records",
            report.bars.len(),
            records.len()
        );

        let name = format!("hourly-{route_id}-{}-{}", day_type.name(), metric.name());
        self.save(&report, &name)
            .context("failed to save hourly report")
    }

    pub fn summary(&self) -> Result<()> {
        let updates = self.load_updates()?;
        let report = self.analyzer().summary(&updates);
        self.save(&report, "summary")
            .context("failed to save summary report")
    }

    pub fn routes(&self) -> Result<()> {
        let updates = self.load_updates()?;
        let report = self.analyzer().routes(&updates);
        self.save(&report, "routes")
            .context("failed to save routes report")
    }

    /// Produce the summary, the routes and every correlation report found.
    pub fn analyze(&self) -> Result<()> {
        self.summary()?;
        self.routes()?;

        let prefix = format!("{}-", self.cfg.input.correlation_prefix);
        let files = self
            .glob_files(&prefix)
            .context("failed to glob correlation files")?;
        for file in files {
            // <prefix>-<start location>-<kind>.json
            let parsed = file
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.strip_prefix(&prefix))
                .and_then(|stem| stem.rsplit_once('-'))
                .and_then(|(start_location, kind)| {
                    let kind = CorrelationKind::from_name(kind)?;
                    Some((start_location.to_string(), kind))
                });
            match parsed {
                Some((start_location, kind)) => self.correlate(&start_location, kind)?,
                None => log::warn!("skipping {file:?}, unknown correlation kind"),
            }
        }

        Ok(())
    }

    /// Remove every saved report.
    pub fn clean(&self) -> Result<()> {
        let files = self
            .glob_files("results-")
            .context("failed to glob results files")?;
        for file in files {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }
        Ok(())
    }

    /// JSON files in the data directory whose name starts with `prefix`.
    fn glob_files(&self, prefix: &str) -> Result<Vec<PathBuf>> {
        let data_dir = self.data_dir.to_str().context("data dir is not valid UTF-8")?;
        let pattern = Path::new(&Pattern::escape(data_dir))
            .join(format!("{}*.json", Pattern::escape(prefix)));
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let files = glob(pattern)
            .context("failed to parse pattern")?
            .filter_map(Result::ok)
            .collect();
        Ok(files)
    }

    fn analyzer(&self) -> Analyzer {
        Analyzer::new(self.cfg.output.decimals)
    }

    fn load_updates(&self) -> Result<Vec<TravelUpdate>> {
        self.load(self.data_dir.join(&self.cfg.input.latest_file))
            .context("failed to load latest updates")
    }

    fn load<T: DeserializeOwned>(&self, file: PathBuf) -> Result<T> {
        let reader = File::open(&file).with_context(|| format!("failed to open {file:?}"))?;
        let reader = BufReader::new(reader);
        serde_json::from_reader(reader).with_context(|| format!("failed to deserialize {file:?}"))
    }

    fn save<T: Serialize>(&self, report: &T, name: &str) -> Result<()> {
        let file = self.results_file(name);
        let writer = File::create(&file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(writer);

        serde_json::to_writer_pretty(&mut writer, report).context("failed to serialize report")?;
        writer.flush().context("failed to flush writer stream")?;

        log::info!("saved {file:?}");
        Ok(())
    }

    fn correlation_file(&self, start_location: &str, kind: CorrelationKind) -> PathBuf {
        self.data_dir.join(format!(
            "{}-{start_location}-{}.json",
            self.cfg.input.correlation_prefix,
            kind.name()
        ))
    }

    fn results_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("results-{name}.json"))
    }
}

fn check_start_location(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("start location must not be empty");
    }
    if name.contains(['/', '\\']) || name.starts_with('.') {
        bail!("start location must be a plain file name component, but is {name:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_location_names() {
        assert!(check_start_location("Nea Smyrni").is_ok());
        assert!(check_start_location("Agia-Paraskevi").is_ok());
        assert!(check_start_location("").is_err());
        assert!(check_start_location("../Athens").is_err());
        assert!(check_start_location("a\\b").is_err());
    }
}
