//! Validation checks run before a frame enters processing.

use std::path::Path;

use polars::prelude::DataFrame;
use tracing::{info, warn};

use crate::conf::{C_MSG_NO_MISSING, C_MSG_WARN_MISSING};
use crate::reader::read_sheet;
use crate::spec::{ReportMissing, SpecMissingColumn, SpecValidateMissingOptions, TableError};
use crate::util::{
    derive_cell_value_from_any_value, derive_date_today, derive_file_uri, derive_missing_mask,
    derive_revised_path, is_cell_value_equal, render_rows, select_column,
    validate_columns_exist,
};
use crate::writer::write_dataframe_to_xlsx;

/// Row-wise equality mask of two columns.
///
/// Element `i` is true iff both row-`i` values are present, of the same kind
/// and equal. Integer and float values compare numerically (`1 == 1.0`). A
/// missing value never equals anything, another missing value included.
pub fn compare_columns(df: &DataFrame, col1: &str, col2: &str) -> Result<Vec<bool>, TableError> {
    let c_col1 = select_column(df, col1)?;
    let c_col2 = select_column(df, col2)?;

    (0..df.height())
        .map(|n_idx_row| -> Result<bool, TableError> {
            let value1 = derive_cell_value_from_any_value(c_col1.get(n_idx_row)?);
            let value2 = derive_cell_value_from_any_value(c_col2.get(n_idx_row)?);
            Ok(is_cell_value_equal(&value1, &value2))
        })
        .collect()
}

/// Scan one workbook sheet for missing values.
///
/// Steps:
/// 1. Fail with [`TableError::FileNotFound`] unless `path_file_in` is a file.
/// 2. Load the selected sheet; fail with [`TableError::ColumnNotFound`] for any
///    requested column that is absent.
/// 3. Count missing values per requested column.
/// 4. Clean: log the confirmation and return without writing anything.
/// 5. Otherwise: collect the offending rows, record and log the warning, and
///    (unless disabled) write the loaded sheet to
///    `{stem}_revised{YYYYMMDD}{ext}` next to the input, overwriting.
///
/// The returned report renders the console text through `Display`.
pub fn validate_missing(
    path_file_in: impl AsRef<Path>,
    options: &SpecValidateMissingOptions,
) -> Result<ReportMissing, TableError> {
    let path_file_in = path_file_in.as_ref();
    if !path_file_in.is_file() {
        return Err(TableError::FileNotFound(path_file_in.to_path_buf()));
    }

    let sheet_loaded = read_sheet(path_file_in, &options.sheet)?;
    let df = &sheet_loaded.df;

    let l_columns = match &options.columns {
        Some(l_columns) => {
            validate_columns_exist(df, l_columns)?;
            l_columns.clone()
        }
        None => df
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect(),
    };

    let mut l_missing_counts = Vec::new();
    let mut l_mask_any = vec![false; df.height()];
    for c_name in &l_columns {
        let l_mask = derive_missing_mask(select_column(df, c_name)?)?;
        let n_missing = l_mask.iter().filter(|if_missing| **if_missing).count();
        if n_missing == 0 {
            continue;
        }
        for (if_any, if_missing) in l_mask_any.iter_mut().zip(&l_mask) {
            *if_any |= *if_missing;
        }
        l_missing_counts.push(SpecMissingColumn {
            name: c_name.clone(),
            n_missing,
        });
    }

    let mut report = ReportMissing {
        path_file_in: path_file_in.to_path_buf(),
        sheet_name: sheet_loaded.sheet_name.clone(),
        n_rows: df.height(),
        columns_checked: l_columns,
        ..ReportMissing::default()
    };

    if l_missing_counts.is_empty() {
        info!(path = %path_file_in.display(), sheet = %report.sheet_name, "{C_MSG_NO_MISSING}");
        return Ok(report);
    }

    report.rows_idx_missing = l_mask_any
        .iter()
        .enumerate()
        .filter_map(|(n_idx_row, if_any)| if *if_any { Some(n_idx_row) } else { None })
        .collect();
    report.rows_missing_text = render_rows(df, &report.rows_idx_missing)?;
    report.missing_counts = l_missing_counts;

    warn!(
        path = %path_file_in.display(),
        sheet = %report.sheet_name,
        columns = ?report.offending_columns(),
        rows = report.rows_idx_missing.len(),
        "{C_MSG_WARN_MISSING}"
    );
    report.warn(C_MSG_WARN_MISSING);

    if options.if_write_revised {
        let path_file_revised = derive_revised_path(path_file_in, derive_date_today());
        write_dataframe_to_xlsx(df, &path_file_revised, &sheet_loaded.sheet_name)?;
        let path_file_revised = std::path::absolute(&path_file_revised)?;
        info!(
            path = %path_file_revised.display(),
            uri = %derive_file_uri(&path_file_revised),
            "revised file saved"
        );
        report.path_file_revised = Some(path_file_revised);
    }

    Ok(report)
}
