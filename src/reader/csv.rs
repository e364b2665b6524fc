//! CSV file reader with schema inference

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, warn};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{ByteSize, ParseMode, ReadOptions};
use crate::error::{Error, Result};
use crate::model::{DataType, Dataset, Field, Row, Schema};

use super::infer::CellParser;

/// Resource limits applied while loading
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LoadLimits {
    pub driver_memory: Option<ByteSize>,
    pub max_result_size: Option<ByteSize>,
}

/// A data record as read from disk, before typing
struct RawRecord {
    line: u64,
    record: csv::StringRecord,
}

/// Read a CSV file into a dataset
pub(crate) fn read_csv(path: &Path, options: &ReadOptions, limits: LoadLimits) -> Result<Dataset> {
    let file = open(path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .quote(options.quote)
        .from_reader(BufReader::new(file));

    let mut records = csv_reader.records();

    let header = if options.header {
        records.next().transpose()?
    } else {
        None
    };

    let mut raw = Vec::new();
    let mut width = header.as_ref().map(|h| h.len());
    let mut dropped = 0usize;

    for result in records {
        let mut record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let expected = *width.get_or_insert(record.len());

        if record.len() != expected {
            match options.mode {
                ParseMode::FailFast => {
                    return Err(Error::Parse {
                        line,
                        expected,
                        found: record.len(),
                    })
                }
                ParseMode::DropMalformed => {
                    dropped += 1;
                    continue;
                }
                ParseMode::Permissive => {
                    record.truncate(expected);
                    while record.len() < expected {
                        // An empty cell reads back as null
                        record.push_field("");
                    }
                }
            }
        }

        raw.push(RawRecord { line, record });
    }

    if dropped > 0 {
        warn!("{}: dropped {} malformed rows", path.display(), dropped);
    }

    let width = width.unwrap_or(0);
    let names = column_names(header.as_ref(), width);
    let parser = CellParser::new(options);

    let types: Vec<DataType> = if options.infer_schema {
        (0..width)
            .into_par_iter()
            .map(|col| infer_column(&raw, col, &parser))
            .collect()
    } else {
        vec![DataType::String; width]
    };

    let rows: Vec<Row> = raw
        .par_iter()
        .map(|r| {
            let values = types
                .iter()
                .enumerate()
                .map(|(col, &t)| parser.convert(r.record.get(col).unwrap_or(""), t))
                .collect();
            Row::new(values, r.line)
        })
        .collect();

    let fields = names
        .into_iter()
        .zip(&types)
        .enumerate()
        .map(|(col, (name, &t))| {
            let nullable = rows.iter().any(|row| row.values[col].is_null());
            Field::new(name, t).with_nullable(nullable || rows.is_empty())
        })
        .collect();

    let dataset = Dataset::new(Schema::new(fields), rows);

    if let Some(limit) = limits.driver_memory.filter(|l| !l.is_unlimited()) {
        let estimated = dataset.estimated_size();
        if estimated > limit.as_u64() {
            return Err(Error::MemoryLimit {
                estimated,
                limit: limit.as_u64(),
            });
        }
    }

    debug!(
        "{}: loaded {} rows x {} columns",
        path.display(),
        dataset.count(),
        width
    );

    Ok(match limits.max_result_size {
        Some(size) => dataset.with_max_result_size(size),
        None => dataset,
    })
}

fn open(path: &Path) -> Result<File> {
    let access_error = |source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(access_error)?;
    if metadata.is_dir() {
        return Err(access_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "is a directory",
        )));
    }
    File::open(path).map_err(access_error)
}

/// Widest type over every cell of one column
fn infer_column(raw: &[RawRecord], col: usize, parser: &CellParser<'_>) -> DataType {
    let mut inferred = DataType::Null;
    for r in raw {
        let cell = r.record.get(col).unwrap_or("");
        inferred = inferred.widen(parser.infer(cell));
        if inferred == DataType::String {
            break;
        }
    }
    inferred.finalize()
}

/// Column names from the header, or `_c{i}` when there is none.
///
/// Blank names fall back to `_c{i}`; names that occur more than once get
/// their position appended, plus `_{n}` if that still clashes with
/// another column.
fn column_names(header: Option<&csv::StringRecord>, width: usize) -> Vec<String> {
    let Some(header) = header else {
        return (0..width).map(|i| format!("_c{}", i)).collect();
    };

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim();
            if name.is_empty() {
                format!("_c{}", i)
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut occurrences: FxHashMap<&str, usize> = FxHashMap::default();
    for name in &names {
        *occurrences.entry(name.as_str()).or_default() += 1;
    }

    // Names that are already unique keep their spelling
    let mut taken: FxHashSet<String> = names
        .iter()
        .filter(|name| occurrences[name.as_str()] == 1)
        .cloned()
        .collect();

    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if occurrences[name.as_str()] == 1 {
                return name.clone();
            }
            let base = format!("{}{}", name, i);
            let mut candidate = base.clone();
            let mut n = 1;
            while taken.contains(&candidate) {
                candidate = format!("{}_{}", base, n);
                n += 1;
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}
