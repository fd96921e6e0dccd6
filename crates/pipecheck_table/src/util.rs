//! Stateless helper utilities shared by the reader, writer and checks.

use std::collections::BTreeSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use polars::prelude::{AnyValue, Column, DataFrame, IpcReader, SerReader};

use crate::conf::{
    C_DATESTAMP_FORMAT, C_FILE_URI_SCHEME, C_MISSING_DISPLAY, C_REVISED_SUFFIX,
    C_UNNAMED_COLUMN_PREFIX,
};
use crate::spec::{EnumCellValue, TableError};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Normalize one frame cell. Float `NaN` counts as missing.
pub fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int128(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) if val.is_nan() => EnumCellValue::None,
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) if val.is_nan() => EnumCellValue::None,
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

/// Row-wise equality: same kind and same value; missing never equals anything.
pub fn is_cell_value_equal(left: &EnumCellValue, right: &EnumCellValue) -> bool {
    match (left, right) {
        (EnumCellValue::Number(x), EnumCellValue::Number(y)) => x == y,
        (EnumCellValue::String(x), EnumCellValue::String(y)) => x == y,
        (EnumCellValue::Boolean(x), EnumCellValue::Boolean(y)) => x == y,
        _ => false,
    }
}

/// Console text of one frame cell.
pub fn derive_display_text(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => C_MISSING_DISPLAY.to_string(),
        AnyValue::Boolean(val) => (if val { "True" } else { "False" }).to_string(),
        AnyValue::String(val) => val.to_string(),
        AnyValue::StringOwned(val) => val.to_string(),
        AnyValue::Float32(val) => derive_float_display_text(val as f64),
        AnyValue::Float64(val) => derive_float_display_text(val),
        _ => value.to_string(),
    }
}

fn derive_float_display_text(x: f64) -> String {
    if x.is_nan() {
        return C_MISSING_DISPLAY.to_string();
    }
    if x.is_finite() && x.fract() == 0.0 {
        return format!("{x:.1}");
    }
    x.to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataFrameLikeUtils

/// Look up a column by name; absent names are a not-found error.
pub fn select_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, TableError> {
    df.get_column_index(name)
        .map(|n_idx| &df.get_columns()[n_idx])
        .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
}

/// Validate that every name in `columns` exists in `df`.
pub fn validate_columns_exist(df: &DataFrame, columns: &[String]) -> Result<(), TableError> {
    for c_name in columns {
        select_column(df, c_name)?;
    }
    Ok(())
}

/// Per-row missing flags of one column.
pub fn derive_missing_mask(col: &Column) -> Result<Vec<bool>, TableError> {
    if col.null_count() == 0 && !col.dtype().is_float() {
        return Ok(vec![false; col.len()]);
    }
    (0..col.len())
        .map(|n_idx_row| -> Result<bool, TableError> {
            Ok(derive_cell_value_from_any_value(col.get(n_idx_row)?).is_missing())
        })
        .collect()
}

/// Rename blank headers to `Unnamed: {idx}` and suffix duplicates with `.1`, `.2`, ...
pub fn normalize_header_names(l_names_raw: &[Option<String>]) -> Vec<String> {
    let mut set_used = BTreeSet::new();
    let mut l_names = Vec::with_capacity(l_names_raw.len());

    for (n_idx, name_raw) in l_names_raw.iter().enumerate() {
        let c_base = match name_raw {
            Some(c_name) if !c_name.trim().is_empty() => c_name.clone(),
            _ => format!("{C_UNNAMED_COLUMN_PREFIX}{n_idx}"),
        };

        let mut c_name = c_base.clone();
        let mut n_dup = 1usize;
        while set_used.contains(&c_name) {
            c_name = format!("{c_base}.{n_dup}");
            n_dup += 1;
        }
        set_used.insert(c_name.clone());
        l_names.push(c_name);
    }

    l_names
}

/// Render selected rows (all columns) as an aligned text table with a row-index column.
pub fn render_rows(df: &DataFrame, rows_idx: &[usize]) -> Result<String, TableError> {
    let l_cols = df.get_columns();

    let mut l_grid: Vec<Vec<String>> = Vec::with_capacity(rows_idx.len() + 1);
    let mut l_header = vec![String::new()];
    l_header.extend(l_cols.iter().map(|col| col.name().to_string()));
    l_grid.push(l_header);

    for n_idx_row in rows_idx {
        let mut l_row = Vec::with_capacity(l_cols.len() + 1);
        l_row.push(n_idx_row.to_string());
        for col in l_cols {
            l_row.push(derive_display_text(col.get(*n_idx_row)?));
        }
        l_grid.push(l_row);
    }

    let n_width_grid = l_cols.len() + 1;
    let mut l_widths = vec![0usize; n_width_grid];
    for row in &l_grid {
        for (n_idx_col, cell) in row.iter().enumerate() {
            l_widths[n_idx_col] = usize::max(l_widths[n_idx_col], cell.chars().count());
        }
    }

    let l_lines = l_grid
        .iter()
        .map(|row| {
            let mut c_line = format!("{:<width$}", row[0], width = l_widths[0]);
            for (n_idx_col, cell) in row.iter().enumerate().skip(1) {
                c_line.push_str(&format!("  {:>width$}", cell, width = l_widths[n_idx_col]));
            }
            c_line.trim_end().to_string()
        })
        .collect::<Vec<_>>();

    Ok(l_lines.join("\n"))
}

/// Read a frame from Polars IPC bytes.
pub fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<DataFrame, TableError> {
    Ok(IpcReader::new(Cursor::new(v_ipc_df)).finish()?)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RevisedPathUtils

/// Today's date on the local clock.
pub fn derive_date_today() -> NaiveDate {
    Local::now().date_naive()
}

/// `{stem}_revised{YYYYMMDD}{.ext}` next to `path_file_in`.
pub fn derive_revised_path(path_file_in: &Path, date: NaiveDate) -> PathBuf {
    let c_datestamp = date.format(C_DATESTAMP_FORMAT).to_string();

    let mut c_name = path_file_in
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_default();
    c_name.push(C_REVISED_SUFFIX);
    c_name.push(&c_datestamp);
    if let Some(ext) = path_file_in.extension() {
        c_name.push(".");
        c_name.push(ext);
    }

    path_file_in.with_file_name(c_name)
}

/// `file://` link for a local path.
pub fn derive_file_uri(path: &Path) -> String {
    format!("{C_FILE_URI_SCHEME}{}", path.display())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use chrono::NaiveDate;
    use polars::df;
    use polars::prelude::AnyValue;

    use super::{
        derive_cell_value_from_any_value, derive_file_uri, derive_missing_mask,
        derive_revised_path, is_cell_value_equal, normalize_header_names, render_rows,
        select_column,
    };
    use crate::spec::{EnumCellValue, TableError};

    fn date_fixed() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).expect("valid date")
    }

    #[test]
    fn revised_path_inserts_suffix_before_extension() {
        assert_eq!(
            derive_revised_path(Path::new("data/people.xlsx"), date_fixed()),
            PathBuf::from("data/people_revised20240105.xlsx")
        );
        assert_eq!(
            derive_revised_path(Path::new("archive.tar.xlsx"), date_fixed()),
            PathBuf::from("archive.tar_revised20240105.xlsx")
        );
        assert_eq!(
            derive_revised_path(Path::new("noext"), date_fixed()),
            PathBuf::from("noext_revised20240105")
        );
    }

    #[test]
    fn file_uri_prefixes_scheme() {
        assert_eq!(
            derive_file_uri(Path::new("/tmp/a_revised20240105.xlsx")),
            "file:///tmp/a_revised20240105.xlsx"
        );
    }

    #[test]
    fn nan_and_null_are_missing() {
        assert!(derive_cell_value_from_any_value(AnyValue::Null).is_missing());
        assert!(derive_cell_value_from_any_value(AnyValue::Float64(f64::NAN)).is_missing());
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Int64(3)),
            EnumCellValue::Number(3.0)
        );
    }

    #[test]
    fn every_integer_width_is_a_number() {
        for value in [
            AnyValue::UInt8(7),
            AnyValue::UInt16(7),
            AnyValue::UInt32(7),
            AnyValue::UInt64(7),
            AnyValue::Int8(7),
            AnyValue::Int16(7),
            AnyValue::Int32(7),
            AnyValue::Int64(7),
            AnyValue::Int128(7),
        ] {
            assert_eq!(
                derive_cell_value_from_any_value(value),
                EnumCellValue::Number(7.0)
            );
        }
        assert_eq!(
            derive_cell_value_from_any_value(AnyValue::Boolean(true)),
            EnumCellValue::Boolean(true)
        );
    }

    #[test]
    fn cell_equality_never_matches_missing() {
        assert!(!is_cell_value_equal(&EnumCellValue::None, &EnumCellValue::None));
        assert!(is_cell_value_equal(
            &EnumCellValue::Number(1.0),
            &EnumCellValue::Number(1.0)
        ));
        assert!(!is_cell_value_equal(
            &EnumCellValue::Number(1.0),
            &EnumCellValue::String("1".to_string())
        ));
    }

    #[test]
    fn header_names_fill_blanks_and_dedupe() {
        let l_names = normalize_header_names(&[
            Some("a".to_string()),
            None,
            Some("a".to_string()),
            Some(" ".to_string()),
            Some("a".to_string()),
        ]);
        assert_eq!(l_names, vec!["a", "Unnamed: 1", "a.1", "Unnamed: 3", "a.2"]);
    }

    #[test]
    fn missing_mask_flags_nulls_and_nan() {
        let df = df!(
            "x" => [Some(1.0), None, Some(f64::NAN)],
            "y" => [1i64, 2, 3]
        )
        .expect("frame");
        let col_x = select_column(&df, "x").expect("x");
        let col_y = select_column(&df, "y").expect("y");
        assert_eq!(derive_missing_mask(col_x).expect("mask"), vec![false, true, true]);
        assert_eq!(derive_missing_mask(col_y).expect("mask"), vec![false; 3]);
    }

    #[test]
    fn select_column_reports_absent_name() {
        let df = df!("x" => [1i64]).expect("frame");
        let err = select_column(&df, "nope").expect_err("absent");
        assert!(matches!(err, TableError::ColumnNotFound(name) if name == "nope"));
    }

    #[test]
    fn render_rows_aligns_with_index_column() {
        let df = df!(
            "Name" => ["Ann", "Bob", "Cy"],
            "Age" => [Some(30.0), None, Some(41.5)]
        )
        .expect("frame");
        let txt = render_rows(&df, &[1]).expect("render");
        assert_eq!(txt, "   Name  Age\n1   Bob  NaN");
    }
}
