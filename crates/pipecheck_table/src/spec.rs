//! Shared table-check specification models, report and errors.

use std::fmt;
use std::path::PathBuf;

use polars::prelude::{DataFrame, PolarsError};
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use crate::conf::{C_MSG_NO_MISSING, N_IDX_SHEET_DEFAULT};
use crate::util::derive_file_uri;

////////////////////////////////////////////////////////////////////////////////
// #region SelectorsAndValues

/// Sheet selector reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumSheetSelector {
    /// Select by sheet name.
    Name(String),
    /// Select by zero-based sheet position.
    Index(usize),
}

impl Default for EnumSheetSelector {
    fn default() -> Self {
        Self::Index(N_IDX_SHEET_DEFAULT)
    }
}

impl fmt::Display for EnumSheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name:?}"),
            Self::Index(idx) => write!(f, "#{idx}"),
        }
    }
}

/// Normalized cell value shared by load, compare and write.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl EnumCellValue {
    /// Whether the cell holds the missing marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::None)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Per-call options of [`crate::validate::validate_missing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecValidateMissingOptions {
    /// Sheet to load; defaults to the first sheet.
    pub sheet: EnumSheetSelector,
    /// Columns to check; `None` checks all columns.
    pub columns: Option<Vec<String>>,
    /// Persist the dated revised copy when missing values are found.
    pub if_write_revised: bool,
}

impl Default for SpecValidateMissingOptions {
    fn default() -> Self {
        Self {
            sheet: EnumSheetSelector::default(),
            columns: None,
            if_write_revised: true,
        }
    }
}

/// One sheet loaded from a workbook.
#[derive(Debug, Clone)]
pub struct SpecLoadedSheet {
    /// Resolved sheet name in the source workbook.
    pub sheet_name: String,
    /// Sheet body; first workbook row became the column names.
    pub df: DataFrame,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Missing-value count of one offending column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMissingColumn {
    /// Column name.
    pub name: String,
    /// Number of missing cells.
    pub n_missing: usize,
}

/// Outcome of one `validate_missing` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportMissing {
    /// Input workbook path as given by the caller.
    pub path_file_in: PathBuf,
    /// Resolved sheet name.
    pub sheet_name: String,
    /// Number of body rows in the loaded sheet.
    pub n_rows: usize,
    /// Columns that were inspected, in request order.
    pub columns_checked: Vec<String>,
    /// Offending columns with their counts, in request order.
    pub missing_counts: Vec<SpecMissingColumn>,
    /// Zero-based body rows where any offending column is missing.
    pub rows_idx_missing: Vec<usize>,
    /// Console rendering of the offending rows (all columns).
    pub rows_missing_text: String,
    /// Absolute path of the revised copy, when one was written.
    pub path_file_revised: Option<PathBuf>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl ReportMissing {
    /// Whether any inspected column holds a missing value.
    pub fn has_missing(&self) -> bool {
        !self.missing_counts.is_empty()
    }

    /// Names of offending columns.
    pub fn offending_columns(&self) -> Vec<&str> {
        self.missing_counts
            .iter()
            .map(|col| col.name.as_str())
            .collect()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Human-readable console report.
    pub fn format(&self) -> String {
        if !self.has_missing() {
            return C_MSG_NO_MISSING.to_string();
        }

        let c_cols = self
            .offending_columns()
            .iter()
            .map(|name| format!("'{name}'"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut l_lines = vec![
            format!("Warning: Missing values found in columns: [{c_cols}]"),
            "Rows with missing values:".to_string(),
            self.rows_missing_text.clone(),
        ];
        if let Some(path) = &self.path_file_revised {
            l_lines.push(format!("Revised file saved: {}", path.display()));
            l_lines.push(format!("Click here to open: {}", derive_file_uri(path)));
        }
        l_lines.join("\n")
    }
}

impl fmt::Display for ReportMissing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// "Top-level call failed" errors.
#[derive(Debug, Error)]
pub enum TableError {
    /// Input path does not resolve to an existing file.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// Requested sheet is not in the workbook.
    #[error("Sheet not found: {selector}; available sheets: {available:?}")]
    SheetNotFound {
        /// Display form of the requested selector.
        selector: String,
        /// Sheet names present in the workbook.
        available: Vec<String>,
    },
    /// Column name absent from the table.
    #[error("Column '{0}' not found in DataFrame.")]
    ColumnNotFound(String),
    /// Mean requested on a non-numeric column.
    #[error("Column '{0}' must be numeric.")]
    ColumnNotNumeric(String),
    /// Workbook open/parse failure.
    #[error("Failed to read workbook {}: {message}", path.display())]
    Workbook {
        /// Workbook path.
        path: PathBuf,
        /// Underlying reader error text.
        message: String,
    },
    /// Table does not fit one worksheet.
    #[error("Excel limit exceeded: {0}")]
    ExcelLimitExceeded(String),
    /// Frame operation failure.
    #[error(transparent)]
    Polars(#[from] PolarsError),
    /// Workbook write failure.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
