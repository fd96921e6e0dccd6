//! Table-check constants and default preset factories.

use crate::spec::SpecValidateMissingOptions;

/// Excel worksheet maximum row count (header row included).
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];
/// Fallback sheet name when nothing valid remains of the source name.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";

/// Default sheet position when no selector is given.
pub const N_IDX_SHEET_DEFAULT: usize = 0;

/// Literal inserted between file stem and datestamp of a revised copy.
pub const C_REVISED_SUFFIX: &str = "_revised";
/// `chrono` format of the revised-copy datestamp.
pub const C_DATESTAMP_FORMAT: &str = "%Y%m%d";
/// Scheme prefix of the clickable revised-file link.
pub const C_FILE_URI_SCHEME: &str = "file://";

/// Text cells treated as missing on load.
pub const TUP_NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Placeholder rendered for missing cells in console row dumps.
pub const C_MISSING_DISPLAY: &str = "NaN";
/// Header prefix for blank header cells (`Unnamed: {idx}`).
pub const C_UNNAMED_COLUMN_PREFIX: &str = "Unnamed: ";

/// Confirmation line for a sheet without missing values.
pub const C_MSG_NO_MISSING: &str = "No missing values found. Data is valid.";
/// Non-fatal warning raised when missing values are present.
pub const C_MSG_WARN_MISSING: &str = "Data contains missing values. Please review the output above.";

/// Build default validate-missing options (first sheet, all columns, write revised copy).
pub fn derive_default_validate_missing_options() -> SpecValidateMissingOptions {
    SpecValidateMissingOptions::default()
}
