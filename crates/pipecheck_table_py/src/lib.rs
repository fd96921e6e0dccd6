use std::collections::BTreeMap;
use std::ffi::CString;
use std::path::PathBuf;

use pipecheck_table::{
    EnumSheetSelector, ReportMissing, TableError, column_mean, compare_columns,
    derive_dataframe_from_ipc_bytes, derive_default_validate_missing_options, validate_missing,
};
use pyo3::exceptions::{
    PyFileNotFoundError, PyKeyError, PyOSError, PyRuntimeError, PyTypeError, PyUserWarning,
    PyValueError,
};
use pyo3::prelude::*;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "pipecheck.table.v1";
const C_BRIDGE_TRANSPORT: &str = "polars_ipc";

#[pyclass(name = "ReportMissing")]
#[derive(Debug, Clone)]
struct PyReportMissing {
    #[pyo3(get)]
    file_in: String,
    #[pyo3(get)]
    sheet_name: String,
    #[pyo3(get)]
    n_rows: usize,
    #[pyo3(get)]
    columns_checked: Vec<String>,
    #[pyo3(get)]
    rows_idx_missing: Vec<usize>,
    #[pyo3(get)]
    file_revised: Option<String>,
    #[pyo3(get)]
    warnings: Vec<String>,
    dict_missing_counts: BTreeMap<String, usize>,
    c_text: String,
}

impl From<ReportMissing> for PyReportMissing {
    fn from(report: ReportMissing) -> Self {
        let c_text = report.to_string();
        Self {
            file_in: report.path_file_in.to_string_lossy().to_string(),
            sheet_name: report.sheet_name,
            n_rows: report.n_rows,
            columns_checked: report.columns_checked,
            rows_idx_missing: report.rows_idx_missing,
            file_revised: report
                .path_file_revised
                .map(|path| path.to_string_lossy().to_string()),
            warnings: report.warnings,
            dict_missing_counts: report
                .missing_counts
                .into_iter()
                .map(|col| (col.name, col.n_missing))
                .collect(),
            c_text,
        }
    }
}

#[pymethods]
impl PyReportMissing {
    #[getter]
    fn has_missing(&self) -> bool {
        !self.dict_missing_counts.is_empty()
    }

    #[getter]
    fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    fn missing_counts(&self) -> BTreeMap<String, usize> {
        self.dict_missing_counts.clone()
    }

    fn __str__(&self) -> String {
        self.c_text.clone()
    }
}

fn map_table_error(exception: TableError) -> PyErr {
    match exception {
        TableError::FileNotFound(_) => PyFileNotFoundError::new_err(exception.to_string()),
        TableError::ColumnNotFound(_) => PyKeyError::new_err(exception.to_string()),
        TableError::ColumnNotNumeric(_) => PyTypeError::new_err(exception.to_string()),
        TableError::SheetNotFound { .. } => PyValueError::new_err(exception.to_string()),
        TableError::Io(_) => PyOSError::new_err(exception.to_string()),
        _ => PyRuntimeError::new_err(exception.to_string()),
    }
}

fn parse_sheet_selector(sheet_name: Option<&Bound<'_, PyAny>>) -> PyResult<EnumSheetSelector> {
    let Some(obj) = sheet_name else {
        return Ok(EnumSheetSelector::default());
    };
    if obj.is_none() {
        return Ok(EnumSheetSelector::default());
    }
    if let Ok(n_idx) = obj.extract::<usize>() {
        return Ok(EnumSheetSelector::Index(n_idx));
    }
    if let Ok(c_name) = obj.extract::<String>() {
        return Ok(EnumSheetSelector::Name(c_name));
    }
    Err(PyTypeError::new_err(
        "sheet_name must be a non-negative int, str, or None.",
    ))
}

fn convert_to_polars_dataframe<'py>(
    py: Python<'py>,
    df: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let module_polars = py.import("polars")?;
    let cls_dataframe = module_polars.getattr("DataFrame")?;

    if df.is_instance(&cls_dataframe)? {
        return Ok(df.clone());
    }

    cls_dataframe.call1((df,))
}

fn derive_ipc_bytes_from_any_dataframe(py: Python<'_>, df: &Bound<'_, PyAny>) -> PyResult<Vec<u8>> {
    let df_polars = convert_to_polars_dataframe(py, df)?;
    let obj_buffer = df_polars.call_method1("write_ipc", (py.None(),))?;
    obj_buffer.call_method0("getvalue")?.extract::<Vec<u8>>()
}

#[pyfunction(name = "calculate_column_mean")]
#[pyo3(signature = (df, column))]
fn column_mean_py(py: Python<'_>, df: &Bound<'_, PyAny>, column: &str) -> PyResult<f64> {
    let v_ipc_df = derive_ipc_bytes_from_any_dataframe(py, df)?;
    let df_data = derive_dataframe_from_ipc_bytes(&v_ipc_df).map_err(map_table_error)?;
    column_mean(&df_data, column).map_err(map_table_error)
}

#[pyfunction(name = "compare_columns")]
#[pyo3(signature = (df, col1, col2))]
fn compare_columns_py(
    py: Python<'_>,
    df: &Bound<'_, PyAny>,
    col1: &str,
    col2: &str,
) -> PyResult<Vec<bool>> {
    let v_ipc_df = derive_ipc_bytes_from_any_dataframe(py, df)?;
    let df_data = derive_dataframe_from_ipc_bytes(&v_ipc_df).map_err(map_table_error)?;
    compare_columns(&df_data, col1, col2).map_err(map_table_error)
}

#[pyfunction(name = "validate_and_warn_missing")]
#[pyo3(signature = (file_in, sheet_name = None, columns = None, if_write_revised = true))]
fn validate_missing_py(
    py: Python<'_>,
    file_in: PathBuf,
    sheet_name: Option<&Bound<'_, PyAny>>,
    columns: Option<Vec<String>>,
    if_write_revised: bool,
) -> PyResult<PyReportMissing> {
    let mut spec_options = derive_default_validate_missing_options();
    spec_options.sheet = parse_sheet_selector(sheet_name)?;
    spec_options.columns = columns;
    spec_options.if_write_revised = if_write_revised;

    let report = py.allow_threads(|| validate_missing(&file_in, &spec_options));
    let report = report.map_err(map_table_error)?;

    py.import("builtins")?
        .getattr("print")?
        .call1((report.to_string(),))?;

    for c_warning in &report.warnings {
        let c_msg = CString::new(c_warning.as_str())
            .map_err(|err| PyValueError::new_err(format!("Invalid warning text: {err}")))?;
        PyErr::warn(py, &py.get_type::<PyUserWarning>(), &c_msg, 1)?;
    }

    Ok(PyReportMissing::from(report))
}

#[pymodule]
fn _pipecheck_table_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyReportMissing>()?;
    module.add_function(wrap_pyfunction!(column_mean_py, module)?)?;
    module.add_function(wrap_pyfunction!(compare_columns_py, module)?)?;
    module.add_function(wrap_pyfunction!(validate_missing_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
