//! Processing steps applied to already-validated frames.

use polars::prelude::{DataFrame, DataType};

use crate::spec::TableError;
use crate::util::select_column;

/// Mean of the non-missing values of a numeric column.
///
/// Nulls and `NaN` are skipped. A column with no non-missing values yields
/// `NaN`. Booleans count as 1/0, so their mean is the share of `true`.
/// Fails with [`TableError::ColumnNotFound`] for an absent column and
/// [`TableError::ColumnNotNumeric`] for any other dtype.
pub fn column_mean(df: &DataFrame, column: &str) -> Result<f64, TableError> {
    let col = select_column(df, column)?;
    if !(col.dtype().is_numeric() || col.dtype() == &DataType::Boolean) {
        return Err(TableError::ColumnNotNumeric(column.to_string()));
    }

    let series = col.as_materialized_series().cast(&DataType::Float64)?;
    let (n_sum, n_count) = series
        .f64()?
        .into_iter()
        .flatten()
        .filter(|val| !val.is_nan())
        .fold((0.0f64, 0usize), |(n_sum, n_count), val| {
            (n_sum + val, n_count + 1)
        });

    if n_count == 0 {
        return Ok(f64::NAN);
    }
    Ok(n_sum / n_count as f64)
}

#[cfg(test)]
mod tests {
    use polars::df;

    use super::column_mean;
    use crate::spec::TableError;

    #[test]
    fn mean_skips_missing_values() {
        let df = df!(
            "a" => [Some(1.0), None, Some(5.0), Some(f64::NAN)],
            "b" => [2i64, 4, 6, 8]
        )
        .expect("frame");

        assert_eq!(column_mean(&df, "a").expect("mean a"), 3.0);
        assert_eq!(column_mean(&df, "b").expect("mean b"), 5.0);
    }

    #[test]
    fn mean_of_all_missing_is_nan() {
        let df = df!("a" => [None::<f64>, None]).expect("frame");
        assert!(column_mean(&df, "a").expect("mean").is_nan());
    }

    #[test]
    fn mean_of_small_ints_and_booleans() {
        let df = df!(
            "n" => [1i16, 2, 6, 3],
            "flag" => [Some(true), Some(false), Some(true), Some(true)]
        )
        .expect("frame");
        assert_eq!(column_mean(&df, "n").expect("mean n"), 3.0);
        assert_eq!(column_mean(&df, "flag").expect("mean flag"), 0.75);

        let df = df!("flag" => [Some(true), None, Some(false)]).expect("frame");
        assert_eq!(column_mean(&df, "flag").expect("mean flag"), 0.5);
    }

    #[test]
    fn mean_rejects_absent_and_text_columns() {
        let df = df!(
            "name" => ["x", "y"],
            "flag" => [true, false]
        )
        .expect("frame");

        assert!(matches!(
            column_mean(&df, "missing"),
            Err(TableError::ColumnNotFound(name)) if name == "missing"
        ));
        assert!(matches!(
            column_mean(&df, "name"),
            Err(TableError::ColumnNotNumeric(name)) if name == "name"
        ));
        assert_eq!(column_mean(&df, "flag").expect("mean flag"), 0.5);
    }
}
