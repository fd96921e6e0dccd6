//! Workbook sheet loader that converts a calamine range into a DataFrame.

use std::path::Path;

use calamine::{Data, DataType, Range, Reader, open_workbook_auto};
use polars::prelude::{Column, DataFrame};
use tracing::debug;

use crate::conf::TUP_NA_VALUES;
use crate::spec::{EnumCellValue, EnumSheetSelector, SpecLoadedSheet, TableError};
use crate::util::normalize_header_names;

/// Load one sheet of the workbook at `path_file_in`.
///
/// The first sheet row becomes the column names. Empty cells, error cells and
/// the usual NA spellings (`NA`, `N/A`, `NaN`, ...) load as nulls.
pub fn read_sheet(
    path_file_in: &Path,
    sheet: &EnumSheetSelector,
) -> Result<SpecLoadedSheet, TableError> {
    if !path_file_in.is_file() {
        return Err(TableError::FileNotFound(path_file_in.to_path_buf()));
    }

    let mut workbook =
        open_workbook_auto(path_file_in).map_err(|err| TableError::Workbook {
            path: path_file_in.to_path_buf(),
            message: err.to_string(),
        })?;

    let l_sheet_names = workbook.sheet_names().to_owned();
    let sheet_name = resolve_sheet_name(&l_sheet_names, sheet)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|err| TableError::Workbook {
            path: path_file_in.to_path_buf(),
            message: err.to_string(),
        })?;
    let df = derive_dataframe_from_range(&range)?;

    debug!(
        path = %path_file_in.display(),
        sheet = %sheet_name,
        height = df.height(),
        width = df.width(),
        "loaded sheet"
    );
    Ok(SpecLoadedSheet { sheet_name, df })
}

/// Resolve a selector against the workbook's sheet names.
pub fn resolve_sheet_name(
    l_sheet_names: &[String],
    sheet: &EnumSheetSelector,
) -> Result<String, TableError> {
    let name_found = match sheet {
        EnumSheetSelector::Index(n_idx) => l_sheet_names.get(*n_idx),
        EnumSheetSelector::Name(name) => l_sheet_names.iter().find(|c_name| *c_name == name),
    };
    name_found.cloned().ok_or_else(|| TableError::SheetNotFound {
        selector: sheet.to_string(),
        available: l_sheet_names.to_vec(),
    })
}

/// Convert a sheet range (header row first) into a typed frame.
pub fn derive_dataframe_from_range(range: &Range<Data>) -> Result<DataFrame, TableError> {
    let mut rows = range.rows();
    let Some(l_header_cells) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let l_names_raw = l_header_cells
        .iter()
        .map(|cell| match derive_cell_value_from_data(cell) {
            EnumCellValue::None => None,
            EnumCellValue::String(val) => Some(val),
            EnumCellValue::Number(val) => Some(val.to_string()),
            EnumCellValue::Boolean(val) => Some((if val { "True" } else { "False" }).to_string()),
        })
        .collect::<Vec<_>>();
    let l_colnames = normalize_header_names(&l_names_raw);

    let mut l_cells_by_col: Vec<Vec<EnumCellValue>> = vec![Vec::new(); l_colnames.len()];
    for row in rows {
        for (n_idx_col, l_cells) in l_cells_by_col.iter_mut().enumerate() {
            l_cells.push(
                row.get(n_idx_col)
                    .map_or(EnumCellValue::None, derive_cell_value_from_data),
            );
        }
    }

    let l_cols = l_colnames
        .iter()
        .zip(l_cells_by_col)
        .map(|(name, l_cells)| derive_typed_column(name, l_cells))
        .collect::<Vec<_>>();

    Ok(DataFrame::new(l_cols)?)
}

/// Normalize one raw workbook cell.
pub fn derive_cell_value_from_data(cell: &Data) -> EnumCellValue {
    match cell {
        Data::Empty | Data::Error(_) => EnumCellValue::None,
        Data::String(val) if TUP_NA_VALUES.contains(&val.as_str()) => EnumCellValue::None,
        Data::String(val) => EnumCellValue::String(val.clone()),
        Data::Float(val) if val.is_nan() => EnumCellValue::None,
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Bool(val) => EnumCellValue::Boolean(*val),
        other => match other.as_datetime() {
            Some(val) => EnumCellValue::String(val.to_string()),
            None => EnumCellValue::String(other.to_string()),
        },
    }
}

/// Infer one column type from its cells.
///
/// - all whole numbers, nothing missing -> `Int64`
/// - all numbers (or nothing present)   -> `Float64`
/// - all booleans                       -> `Boolean`
/// - anything else                      -> `String`
fn derive_typed_column(name: &str, l_cells: Vec<EnumCellValue>) -> Column {
    let mut if_all_numeric = true;
    let mut if_all_integer = true;
    let mut if_all_boolean = true;
    let mut n_present = 0usize;

    for cell in &l_cells {
        match cell {
            EnumCellValue::None => continue,
            EnumCellValue::Number(val) => {
                if_all_boolean = false;
                if !is_whole_number(*val) {
                    if_all_integer = false;
                }
            }
            EnumCellValue::Boolean(_) => {
                if_all_numeric = false;
                if_all_integer = false;
            }
            EnumCellValue::String(_) => {
                if_all_numeric = false;
                if_all_integer = false;
                if_all_boolean = false;
            }
        }
        n_present += 1;
    }

    if n_present > 0 && if_all_integer && n_present == l_cells.len() {
        let l_vals = l_cells
            .iter()
            .map(|cell| match cell {
                EnumCellValue::Number(val) => Some(*val as i64),
                _ => None,
            })
            .collect::<Vec<_>>();
        return Column::new(name.into(), l_vals);
    }
    if if_all_numeric {
        let l_vals = l_cells
            .iter()
            .map(|cell| match cell {
                EnumCellValue::Number(val) => Some(*val),
                _ => None,
            })
            .collect::<Vec<_>>();
        return Column::new(name.into(), l_vals);
    }
    if if_all_boolean {
        let l_vals = l_cells
            .iter()
            .map(|cell| match cell {
                EnumCellValue::Boolean(val) => Some(*val),
                _ => None,
            })
            .collect::<Vec<_>>();
        return Column::new(name.into(), l_vals);
    }

    let l_vals = l_cells
        .into_iter()
        .map(|cell| match cell {
            EnumCellValue::None => None,
            EnumCellValue::String(val) => Some(val),
            EnumCellValue::Number(val) => Some(val.to_string()),
            EnumCellValue::Boolean(val) => Some((if val { "True" } else { "False" }).to_string()),
        })
        .collect::<Vec<_>>();
    Column::new(name.into(), l_vals)
}

fn is_whole_number(x: f64) -> bool {
    x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64
}

#[cfg(test)]
mod tests {
    use calamine::{Data, Range};
    use polars::prelude::DataType;

    use super::{derive_cell_value_from_data, derive_dataframe_from_range, resolve_sheet_name};
    use crate::spec::{EnumCellValue, EnumSheetSelector, TableError};

    fn build_range(l_rows: Vec<Vec<Data>>) -> Range<Data> {
        let n_height = l_rows.len() as u32;
        let n_width = l_rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (n_height - 1, n_width - 1));
        for (n_idx_row, row) in l_rows.into_iter().enumerate() {
            for (n_idx_col, cell) in row.into_iter().enumerate() {
                range.set_value((n_idx_row as u32, n_idx_col as u32), cell);
            }
        }
        range
    }

    #[test]
    fn range_to_frame_infers_types() {
        let range = build_range(vec![
            vec![
                Data::String("Name".to_string()),
                Data::String("Age".to_string()),
                Data::String("Score".to_string()),
                Data::String("Active".to_string()),
            ],
            vec![
                Data::String("Ann".to_string()),
                Data::Float(30.0),
                Data::Float(1.5),
                Data::Bool(true),
            ],
            vec![
                Data::String("Bob".to_string()),
                Data::Empty,
                Data::Int(2),
                Data::Bool(false),
            ],
            vec![
                Data::String("Cy".to_string()),
                Data::Float(41.0),
                Data::Float(3.0),
                Data::Bool(true),
            ],
        ]);

        let df = derive_dataframe_from_range(&range).expect("frame");
        assert_eq!(df.height(), 3);
        assert_eq!(
            df.get_column_names_str(),
            vec!["Name", "Age", "Score", "Active"]
        );
        assert_eq!(df.column("Name").expect("Name").dtype(), &DataType::String);
        assert_eq!(df.column("Age").expect("Age").dtype(), &DataType::Float64);
        assert_eq!(df.column("Age").expect("Age").null_count(), 1);
        assert_eq!(df.column("Score").expect("Score").dtype(), &DataType::Float64);
        assert_eq!(df.column("Active").expect("Active").dtype(), &DataType::Boolean);
    }

    #[test]
    fn whole_numbers_without_gaps_load_as_integers() {
        let range = build_range(vec![
            vec![Data::String("n".to_string())],
            vec![Data::Float(1.0)],
            vec![Data::Float(2.0)],
        ]);
        let df = derive_dataframe_from_range(&range).expect("frame");
        assert_eq!(df.column("n").expect("n").dtype(), &DataType::Int64);
    }

    #[test]
    fn na_spellings_and_errors_load_as_missing() {
        assert_eq!(
            derive_cell_value_from_data(&Data::String("N/A".to_string())),
            EnumCellValue::None
        );
        assert_eq!(
            derive_cell_value_from_data(&Data::String(String::new())),
            EnumCellValue::None
        );
        assert_eq!(
            derive_cell_value_from_data(&Data::Error(calamine::CellErrorType::NA)),
            EnumCellValue::None
        );
        assert_eq!(
            derive_cell_value_from_data(&Data::String("ok".to_string())),
            EnumCellValue::String("ok".to_string())
        );
    }

    #[test]
    fn sheet_selector_by_index_and_name() {
        let l_names = vec!["Data".to_string(), "Notes".to_string()];
        assert_eq!(
            resolve_sheet_name(&l_names, &EnumSheetSelector::Index(1)).expect("idx"),
            "Notes"
        );
        assert_eq!(
            resolve_sheet_name(&l_names, &EnumSheetSelector::Name("Data".to_string()))
                .expect("name"),
            "Data"
        );
        let err = resolve_sheet_name(&l_names, &EnumSheetSelector::Index(5)).expect_err("oob");
        assert!(matches!(err, TableError::SheetNotFound { .. }));
    }
}
