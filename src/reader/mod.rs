//! Reader layer: loading delimited files into datasets

mod csv;
mod infer;

use std::path::Path;

use log::info;

use crate::config::{ParseMode, ReadOptions};
use crate::error::{Error, Result};
use crate::model::Dataset;
use crate::session::Session;

use self::csv::{read_csv, LoadLimits};

/// Builder for a CSV load, optionally bound to a session's limits.
///
/// Option errors are kept until `csv` is called so calls can be chained.
pub struct DataFrameReader<'a> {
    session: Option<&'a Session>,
    options: ReadOptions,
    error: Option<Error>,
}

impl Default for DataFrameReader<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DataFrameReader<'a> {
    /// A reader with no memory or result-size limits
    pub fn new() -> Self {
        Self {
            session: None,
            options: ReadOptions::default(),
            error: None,
        }
    }

    pub(crate) fn for_session(session: &'a Session) -> Self {
        Self {
            session: Some(session),
            ..Self::new()
        }
    }

    /// Set a reader option by name, e.g. `header` or `inferSchema`
    pub fn option(mut self, key: &str, value: impl AsRef<str>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.options.set(key, value.as_ref()) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Replace all options at once
    pub fn options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn header(mut self, header: bool) -> Self {
        self.options.header = header;
        self
    }

    pub fn infer_schema(mut self, infer: bool) -> Self {
        self.options.infer_schema = infer;
        self
    }

    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.options.mode = mode;
        self
    }

    /// Load the file at `path`
    pub fn csv(self, path: impl AsRef<Path>) -> Result<Dataset> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let limits = match self.session {
            Some(session) => {
                if session.is_stopped() {
                    return Err(Error::SessionStopped);
                }
                let config = session.config();
                LoadLimits {
                    driver_memory: Some(config.driver_memory),
                    max_result_size: Some(config.max_result_size),
                }
            }
            None => LoadLimits::default(),
        };

        let path = path.as_ref();
        let dataset = read_csv(path, &self.options, limits)?;
        info!(
            "loaded {} ({} rows, {} columns)",
            path.display(),
            dataset.count(),
            dataset.schema().len()
        );
        Ok(dataset)
    }
}

/// Load a CSV file with no session limits
pub fn load_dataset(path: impl AsRef<Path>, infer_schema: bool, has_header: bool) -> Result<Dataset> {
    DataFrameReader::new()
        .header(has_header)
        .infer_schema(infer_schema)
        .csv(path)
}
