use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Report configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Names of the API snapshot files inside the data directory.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Hourly averages of every route and day type.
    pub hourly_file: String,
    /// Latest update of every route.
    pub latest_file: String,
    /// Prefix of the correlation files, which are named
    /// `<prefix>-<start location>-<kind>.json`.
    pub correlation_prefix: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            hourly_file: "hourly_averages.json".to_string(),
            latest_file: "latest.json".to_string(),
            correlation_prefix: "correlation".to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Number of decimals reported values are rounded to.
    pub decimals: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// Missing sections and fields take their default values.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_file_name(&self.input.hourly_file).context("invalid hourly file")?;
        check_file_name(&self.input.latest_file).context("invalid latest file")?;
        check_file_name(&self.input.correlation_prefix).context("invalid correlation prefix")?;

        check_num(self.output.decimals, 0..=12).context("invalid number of decimals")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_file_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("file name must not be empty");
    }
    // Inputs must stay inside the data directory.
    if name.contains(['/', '\\']) || name == ".." {
        bail!("file name must not contain path separators, but is {name:?}");
    }
    Ok(())
}
