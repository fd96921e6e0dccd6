//! `pipecheck_table` v1:
//! Rust-side spreadsheet table checks.
//!
//! Architecture mirrors the Python-facing `pipecheck.table` package:
//! - `conf`     : constants and default presets
//! - `spec`     : options/report/error models
//! - `util`     : pure helper functions
//! - `reader`   : workbook sheet -> DataFrame
//! - `writer`   : DataFrame -> single-sheet workbook
//! - `process`  : column statistics
//! - `validate` : column comparison and missing-value scan
pub mod conf;
pub mod process;
pub mod reader;
pub mod spec;
pub mod util;
pub mod validate;
pub mod writer;

pub use conf::{
    C_DATESTAMP_FORMAT, C_MSG_NO_MISSING, C_MSG_WARN_MISSING, C_REVISED_SUFFIX,
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_NA_VALUES,
    derive_default_validate_missing_options,
};
pub use process::column_mean;
pub use reader::read_sheet;
pub use spec::{
    EnumCellValue, EnumSheetSelector, ReportMissing, SpecLoadedSheet, SpecMissingColumn,
    SpecValidateMissingOptions, TableError,
};
pub use util::{derive_dataframe_from_ipc_bytes, derive_file_uri, derive_revised_path};
pub use validate::{compare_columns, validate_missing};
pub use writer::{derive_worksheet_name, write_dataframe_to_xlsx};
