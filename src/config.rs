//! Configuration handling for chartscope

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};

/// Output format for inspection results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

/// A memory size such as `4g` or `512m`, stored in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const KIB: u64 = 1024;
    pub const MIB: u64 = 1024 * 1024;
    pub const GIB: u64 = 1024 * 1024 * 1024;
    pub const TIB: u64 = 1024 * 1024 * 1024 * 1024;

    pub const fn bytes(n: u64) -> Self {
        Self(n)
    }

    pub const fn gib(n: u64) -> Self {
        Self(n * Self::GIB)
    }

    pub const fn mib(n: u64) -> Self {
        Self(n * Self::MIB)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Zero means "no limit"
    pub fn is_unlimited(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for ByteSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().to_ascii_lowercase();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);

        if digits.is_empty() {
            return Err(Error::config(format!("invalid size: {:?}", s)));
        }
        let n: u64 = digits
            .parse()
            .map_err(|_| Error::config(format!("invalid size: {:?}", s)))?;

        let multiplier = match unit {
            "" | "b" => 1,
            "k" | "kb" => Self::KIB,
            "m" | "mb" => Self::MIB,
            "g" | "gb" => Self::GIB,
            "t" | "tb" => Self::TIB,
            other => {
                return Err(Error::config(format!(
                    "invalid size unit {:?} in {:?}",
                    other, s
                )))
            }
        };

        n.checked_mul(multiplier)
            .map(ByteSize)
            .ok_or_else(|| Error::config(format!("size out of range: {:?}", s)))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = [
            (Self::TIB, "t"),
            (Self::GIB, "g"),
            (Self::MIB, "m"),
            (Self::KIB, "k"),
        ];
        for (size, suffix) in units {
            if self.0 != 0 && self.0 % size == 0 {
                return write!(f, "{}{}", self.0 / size, suffix);
            }
        }
        write!(f, "{}b", self.0)
    }
}

/// Settings a session is built with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Application name, used in log lines
    pub app_name: String,
    /// Upper bound for the in-memory size of a loaded dataset
    pub driver_memory: ByteSize,
    /// Upper bound for rows returned by inspection calls (0 = unlimited)
    pub max_result_size: ByteSize,
    /// Every setting as it was passed in, in insertion order
    pub settings: IndexMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_name: "chartscope".to_string(),
            driver_memory: ByteSize::gib(1),
            max_result_size: ByteSize::gib(1),
            settings: IndexMap::new(),
        }
    }
}

impl SessionConfig {
    /// Apply one `key = value` setting
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let short = key.strip_prefix("spark.").unwrap_or(key);
        match short {
            "app.name" => self.app_name = value.to_string(),
            "driver.memory" => self.driver_memory = value.parse()?,
            "driver.maxResultSize" => self.max_result_size = value.parse()?,
            _ => return Err(Error::config(format!("unknown session setting: {}", key))),
        }
        self.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Settings in `requested` whose parsed value differs from this config
    pub fn conflicts<'a>(&self, requested: &'a SessionConfig) -> Vec<(&'a str, &'a str)> {
        requested
            .settings
            .iter()
            .filter(|(key, _)| {
                match key.strip_prefix("spark.").unwrap_or(key.as_str()) {
                    "app.name" => self.app_name != requested.app_name,
                    "driver.memory" => self.driver_memory != requested.driver_memory,
                    "driver.maxResultSize" => self.max_result_size != requested.max_result_size,
                    _ => true,
                }
            })
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn with_driver_memory(mut self, size: ByteSize) -> Self {
        self.driver_memory = size;
        self
    }

    pub fn with_max_result_size(mut self, size: ByteSize) -> Self {
        self.max_result_size = size;
        self
    }
}

/// How rows with the wrong number of fields are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Fail the whole load
    #[default]
    FailFast,
    /// Pad short rows with nulls and truncate long ones
    Permissive,
    /// Skip the row
    DropMalformed,
}

impl FromStr for ParseMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "failfast" => Ok(ParseMode::FailFast),
            "permissive" => Ok(ParseMode::Permissive),
            "dropmalformed" => Ok(ParseMode::DropMalformed),
            _ => Err(Error::config(format!("unknown parse mode: {}", s))),
        }
    }
}

/// Options controlling how a CSV file is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Treat the first line as column names
    pub header: bool,
    /// Scan the input to infer column types
    pub infer_schema: bool,
    pub delimiter: u8,
    pub quote: u8,
    /// Cell text treated as null
    pub null_value: String,
    /// chrono format for date cells
    pub date_format: String,
    /// chrono format for timestamp cells
    pub timestamp_format: String,
    pub mode: ParseMode,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            header: false,
            infer_schema: false,
            delimiter: b',',
            quote: b'"',
            null_value: String::new(),
            date_format: "%Y-%m-%d".to_string(),
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            mode: ParseMode::default(),
        }
    }
}

impl ReadOptions {
    /// Apply one reader option by name (names are case-insensitive)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key.to_ascii_lowercase().as_str() {
            "header" => self.header = parse_bool(key, value)?,
            "inferschema" => self.infer_schema = parse_bool(key, value)?,
            "sep" | "delimiter" => self.delimiter = parse_byte(key, value)?,
            "quote" => self.quote = parse_byte(key, value)?,
            "nullvalue" => self.null_value = value.to_string(),
            "dateformat" => self.date_format = value.to_string(),
            "timestampformat" => self.timestamp_format = value.to_string(),
            "mode" => self.mode = value.parse()?,
            _ => return Err(Error::config(format!("unknown read option: {}", key))),
        }
        Ok(())
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn with_infer_schema(mut self, infer: bool) -> Self {
        self.infer_schema = infer;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_null_value(mut self, null_value: impl Into<String>) -> Self {
        self.null_value = null_value.into();
        self
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::config(format!(
            "option {} expects true or false, got {:?}",
            key, value
        ))),
    }
}

fn parse_byte(key: &str, value: &str) -> Result<u8> {
    match value.as_bytes() {
        [b] => Ok(*b),
        b"\\t" => Ok(b'\t'),
        _ => Err(Error::config(format!(
            "option {} expects a single byte, got {:?}",
            key, value
        ))),
    }
}
