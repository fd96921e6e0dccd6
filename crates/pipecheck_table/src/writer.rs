//! XLSX writer that persists a DataFrame as one worksheet.

use std::path::Path;

use polars::prelude::DataFrame;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::conf::{
    C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumCellValue, TableError};
use crate::util::derive_cell_value_from_any_value;

/// Write `df` to `path_file_out` as a single sheet: header row, then body rows.
///
/// No row-index column is added. Missing cells stay blank. An existing file at
/// `path_file_out` is overwritten.
pub fn write_dataframe_to_xlsx(
    df: &DataFrame,
    path_file_out: &Path,
    sheet_name: &str,
) -> Result<(), TableError> {
    validate_excel_limits(df.height(), df.width())?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(derive_worksheet_name(sheet_name))?;

    let fmt_header = Format::new().set_bold();
    for (n_idx_col, col) in df.get_columns().iter().enumerate() {
        let n_col = cast_col_num(n_idx_col)?;
        worksheet.write_string_with_format(0, n_col, col.name().as_str(), &fmt_header)?;

        for n_idx_row in 0..df.height() {
            let value = derive_cell_value_from_any_value(col.get(n_idx_row)?);
            write_cell(worksheet, cast_row_num(n_idx_row + 1)?, n_col, &value)?;
        }
    }

    workbook.save(path_file_out)?;
    debug!(
        path = %path_file_out.display(),
        height = df.height(),
        width = df.width(),
        "wrote sheet"
    );
    Ok(())
}

/// Validate that a `height` x `width` body plus one header row fits one worksheet.
pub fn validate_excel_limits(height: usize, width: usize) -> Result<(), TableError> {
    if height + 1 > N_NROWS_EXCEL_MAX {
        return Err(TableError::ExcelLimitExceeded(format!(
            "{height} data rows plus header exceed {N_NROWS_EXCEL_MAX} rows."
        )));
    }
    if width > N_NCOLS_EXCEL_MAX {
        return Err(TableError::ExcelLimitExceeded(format!(
            "{width} columns exceed {N_NCOLS_EXCEL_MAX} columns."
        )));
    }
    Ok(())
}

/// Worksheet name for a sheet loaded from any workbook format.
///
/// Other formats (ods, xls) accept names xlsx rejects: illegal characters
/// become `_`, edge apostrophes are dropped and the result is cut to 31 chars.
pub fn derive_worksheet_name(sheet_name: &str) -> String {
    let c_name = sheet_name
        .chars()
        .map(|ch| if TUP_EXCEL_ILLEGAL.contains(&ch) { '_' } else { ch })
        .collect::<String>();
    let c_name = c_name.trim().trim_matches('\'');
    if c_name.is_empty() {
        return C_SHEET_NAME_DEFAULT.to_string();
    }
    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

fn write_cell(
    worksheet: &mut Worksheet,
    n_row: u32,
    n_col: u16,
    value: &EnumCellValue,
) -> Result<(), XlsxError> {
    match value {
        EnumCellValue::None => {}
        EnumCellValue::String(val) => {
            worksheet.write_string(n_row, n_col, val)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number(n_row, n_col, *val)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean(n_row, n_col, *val)?;
        }
    }
    Ok(())
}

fn cast_row_num(value: usize) -> Result<u32, TableError> {
    u32::try_from(value)
        .map_err(|_| TableError::ExcelLimitExceeded(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, TableError> {
    u16::try_from(value)
        .map_err(|_| TableError::ExcelLimitExceeded(format!("column index overflow: {value}")))
}
