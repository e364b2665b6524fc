use std::io::Write;

use chartscope::config::ParseMode;
use chartscope::{load_dataset, DataFrameReader, DataType, Error, Value};
use tempfile::NamedTempFile;

const CHARTS: &str = "\
title,rank,date,artist,streams,trend
Chantaje,1,2017-01-01,Shakira,253019.5,SAME_POSITION
Vente Pa' Ca,2,2017-01-01,Ricky Martin,223988,MOVE_UP
Reggaetón Lento,3,2017-01-01,CNCO,,MOVE_DOWN
";

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn counts_data_rows_under_header() {
    let file = csv_file(CHARTS);
    let ds = load_dataset(file.path(), true, true).unwrap();
    assert_eq!(ds.count(), 3);
    assert_eq!(
        ds.columns(),
        vec!["title", "rank", "date", "artist", "streams", "trend"]
    );
}

#[test]
fn infers_integer_and_double_columns() {
    let file = csv_file(CHARTS);
    let ds = load_dataset(file.path(), true, true).unwrap();

    assert_eq!(
        ds.dtypes(),
        vec![
            ("title", "string"),
            ("rank", "bigint"),
            ("date", "date"),
            ("artist", "string"),
            ("streams", "double"),
            ("trend", "string"),
        ]
    );

    let streams: Vec<&Value> = ds.column("streams").unwrap().collect();
    assert_eq!(
        streams,
        vec![&Value::Double(253019.5), &Value::Double(223988.0), &Value::Null]
    );
    assert!(ds.schema().field("streams").unwrap().nullable);
    assert!(!ds.schema().field("rank").unwrap().nullable);
}

#[test]
fn missing_file_is_a_file_access_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("charts.csv");
    let err = load_dataset(&missing, true, true).unwrap_err();
    match err {
        Error::FileAccess { path, .. } => assert_eq!(path, missing),
        other => panic!("expected FileAccess, got {other:?}"),
    }
}

#[test]
fn directory_is_a_file_access_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_dataset(dir.path(), false, true).unwrap_err();
    assert!(matches!(err, Error::FileAccess { .. }));
}

#[test]
fn inconsistent_field_count_is_a_parse_error() {
    let file = csv_file("a,b,c\n1,2,3\n4,5\n");
    let err = load_dataset(file.path(), true, true).unwrap_err();
    match err {
        Error::Parse {
            line,
            expected,
            found,
        } => {
            assert_eq!(line, 3);
            assert_eq!(expected, 3);
            assert_eq!(found, 2);
        }
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn without_inference_every_column_is_string() {
    let file = csv_file(CHARTS);
    let ds = load_dataset(file.path(), false, true).unwrap();
    assert!(ds
        .schema()
        .fields
        .iter()
        .all(|f| f.data_type == DataType::String));
    let first = ds.first().unwrap().unwrap();
    assert_eq!(first.get(1), Some(&Value::String("1".to_string())));
    assert_eq!(ds.rows()[2].get(4), Some(&Value::Null));
}

#[test]
fn without_header_first_line_is_data() {
    let file = csv_file("1,x\n2,y\n");
    let ds = load_dataset(file.path(), true, false).unwrap();
    assert_eq!(ds.count(), 2);
    assert_eq!(ds.columns(), vec!["_c0", "_c1"]);
    assert_eq!(ds.schema().fields[0].data_type, DataType::Integer);
    assert_eq!(ds.rows()[0].source_line, 1);
}

#[test]
fn header_only_file_has_no_rows() {
    let file = csv_file("title,rank\n");
    let ds = load_dataset(file.path(), true, true).unwrap();
    assert!(ds.is_empty());
    assert_eq!(ds.dtypes(), vec![("title", "string"), ("rank", "string")]);
}

#[test]
fn empty_file_has_no_columns() {
    let file = csv_file("");
    let ds = load_dataset(file.path(), true, true).unwrap();
    assert_eq!(ds.count(), 0);
    assert!(ds.schema().is_empty());
}

#[test]
fn mixed_column_falls_back_to_string() {
    let file = csv_file("v\n1\n2.5\nn/a\n");
    let ds = load_dataset(file.path(), true, true).unwrap();
    assert_eq!(ds.schema().fields[0].data_type, DataType::String);
    assert_eq!(ds.rows()[0].get(0), Some(&Value::String("1".to_string())));
}

#[test]
fn quoted_fields_keep_delimiters() {
    let file = csv_file("title,artist\n\"Hello, World\",\"A \"\"B\"\"\"\n");
    let ds = load_dataset(file.path(), true, true).unwrap();
    let row = &ds.rows()[0];
    assert_eq!(row.get(0).and_then(Value::as_str), Some("Hello, World"));
    assert_eq!(row.get(1).and_then(Value::as_str), Some("A \"B\""));
}

#[test]
fn reader_options_by_name() {
    let file = csv_file("rank;streams\n1;NA\n2;10.5\n");
    let ds = DataFrameReader::new()
        .option("header", "true")
        .option("inferSchema", "true")
        .option("sep", ";")
        .option("nullValue", "NA")
        .csv(file.path())
        .unwrap();
    assert_eq!(ds.dtypes(), vec![("rank", "bigint"), ("streams", "double")]);
    assert!(ds.rows()[0].get(1).unwrap().is_null());
}

#[test]
fn unknown_option_is_reported_at_load() {
    let file = csv_file(CHARTS);
    let err = DataFrameReader::new()
        .option("compression", "gzip")
        .csv(file.path())
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn permissive_mode_pads_and_truncates() {
    let file = csv_file("a,b,c\n1,2\n3,4,5,6\n");
    let ds = DataFrameReader::new()
        .header(true)
        .infer_schema(true)
        .mode(ParseMode::Permissive)
        .csv(file.path())
        .unwrap();
    assert_eq!(ds.count(), 2);
    assert_eq!(ds.rows()[0].get(2), Some(&Value::Null));
    assert_eq!(ds.rows()[1].values.len(), 3);
    assert_eq!(ds.rows()[1].get(2), Some(&Value::Integer(5)));
}

#[test]
fn drop_malformed_mode_skips_rows() {
    let file = csv_file("a,b\n1,2\n3\n4,5\n");
    let ds = DataFrameReader::new()
        .header(true)
        .infer_schema(true)
        .mode(ParseMode::DropMalformed)
        .csv(file.path())
        .unwrap();
    assert_eq!(ds.count(), 2);
    assert_eq!(ds.rows()[1].source_line, 4);
}

#[test]
fn timestamps_and_booleans_are_inferred() {
    let file = csv_file("at,flag\n2017-01-01 08:00:00,true\n2017-01-02,FALSE\n");
    let ds = load_dataset(file.path(), true, true).unwrap();
    assert_eq!(ds.dtypes(), vec![("at", "timestamp"), ("flag", "boolean")]);
    assert_eq!(ds.rows()[1].get(1), Some(&Value::Boolean(false)));
}

#[test]
fn exports_to_arrow() {
    let file = csv_file(CHARTS);
    let ds = load_dataset(file.path(), true, true).unwrap();
    let batch = ds.to_record_batch().unwrap();
    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.num_columns(), 6);
}

#[test]
fn duplicate_header_names_stay_distinct() {
    let file = csv_file("a,a,a0\n1,2,3\n");
    let ds = load_dataset(file.path(), true, true).unwrap();
    assert_eq!(ds.columns(), vec!["a0_1", "a1", "a0"]);

    let row = ds.first().unwrap().unwrap();
    let map = row.to_map(ds.schema());
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("a0"), Some(&&Value::Integer(3)));
}
