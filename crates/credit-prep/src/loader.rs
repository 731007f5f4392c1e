//! CSV loading.

use crate::error::{PreprocessingError, Result, ResultExt};
use polars::io::csv::read::{CsvReadOptions, NullValues};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Rows scanned to infer column types. Large enough that sparse nulls in
/// the first rows do not decide a column's dtype.
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Cell texts read as missing, alongside empty fields.
const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn null_values() -> Option<NullValues> {
    Some(NullValues::AllColumns(
        NULL_TOKENS.iter().map(|token| (*token).into()).collect(),
    ))
}

/// Load a delimited file with a header row into a table.
///
/// Tries standard double-quote handling first and falls back to a reader
/// without quote handling. Markers such as `NA`, `NaN` or `null` load as
/// missing values so a numeric column stays numeric.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PreprocessingError::InputNotFound(path.to_path_buf()));
    }

    info!("Loading dataset from: {}", path.display());

    let quoted = CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(null_values()),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish();

    let df = match quoted {
        Ok(df) => df,
        Err(e) => {
            debug!("Standard loading failed: {}", e);
            CsvReadOptions::default()
                .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
                .with_has_header(true)
                .with_parse_options(
                    CsvParseOptions::default()
                        .with_quote_char(None)
                        .with_null_values(null_values()),
                )
                .try_into_reader_with_file_path(Some(path.to_path_buf()))?
                .finish()
                .context(format!("Failed to parse {}", path.display()))?
        }
    };

    info!("Dataset loaded: {:?}", df.shape());
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::is_numeric_dtype;
    use std::fs;

    fn temp_csv(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}_{}.csv", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_csv_reads_header_and_nulls() {
        let path = temp_csv(
            "credit_prep_loader",
            "ID,LIMIT_BAL,SEX\n1,20000,2\n2,,1\n3,90000,\n",
        );

        let df = load_csv(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(df.shape(), (3, 3));
        assert_eq!(df.column("LIMIT_BAL").unwrap().null_count(), 1);
        assert_eq!(df.column("SEX").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_csv_missing_markers_stay_numeric() {
        let path = temp_csv(
            "credit_prep_loader_markers",
            "ID,LIMIT_BAL,BILL_AMT1\n1,20000,NaN\n2,NA,100\n3,N/A,null\n4,50000,300\n",
        );

        let df = load_csv(&path).unwrap();
        fs::remove_file(&path).unwrap();

        for name in ["LIMIT_BAL", "BILL_AMT1"] {
            let column = df.column(name).unwrap();
            assert!(is_numeric_dtype(column.dtype()), "{} is {}", name, column.dtype());
            assert_eq!(column.null_count(), 2);
        }
    }

    #[test]
    fn test_load_csv_unparsable_keeps_polars_code() {
        let path = temp_csv("credit_prep_loader_bad", "ID,LIMIT_BAL\n1,2,3,4\n\"5,6\n");

        let result = load_csv(&path);
        fs::remove_file(&path).unwrap();

        if let Err(err) = result {
            assert_eq!(err.error_code(), "POLARS_ERROR");
        }
    }

    #[test]
    fn test_load_csv_missing_file() {
        let result = load_csv("/definitely/not/here.csv");

        assert!(matches!(result, Err(PreprocessingError::InputNotFound(_))));
    }
}
