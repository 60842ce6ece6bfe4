//! Projection schema contract
//!
//! Every non-empty dataset must expose the two numeric projection columns;
//! the helpers here check that contract and read coordinate values without
//! caring which concrete numeric type the source produced.

use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::DataError;

/// Column holding the X principal-component value.
pub const X_COLUMN: &str = "Xpca";
/// Column holding the Y principal-component value.
pub const Y_COLUMN: &str = "Ypca";

/// Numeric types accepted for the projection columns.
pub fn is_numeric(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Float64 | DataType::Float32 | DataType::Int64 | DataType::Int32
    )
}

/// Check that a non-empty batch carries numeric `Xpca` and `Ypca` columns.
///
/// Empty batches pass: there is nothing to plot or filter, and the empty
/// dataset is also what a failed fetch degrades to.
pub fn validate_projection_schema(batch: &RecordBatch) -> Result<(), DataError> {
    if batch.num_rows() == 0 {
        return Ok(());
    }

    let schema = batch.schema();
    let has_column = |name: &str| {
        schema
            .column_with_name(name)
            .map(|(_, field)| is_numeric(field.data_type()))
            .unwrap_or(false)
    };

    if has_column(X_COLUMN) && has_column(Y_COLUMN) {
        Ok(())
    } else {
        Err(missing_projection(batch))
    }
}

/// The schema error for a batch violating the projection contract.
pub fn missing_projection(batch: &RecordBatch) -> DataError {
    DataError::MissingProjection {
        available: batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect(),
    }
}

/// Numeric value at `row`, if the array is a supported numeric type and the
/// slot is non-null.
pub fn numeric_value(array: &dyn Array, row: usize) -> Option<f64> {
    if array.is_null(row) {
        return None;
    }

    if let Some(float_array) = array.as_any().downcast_ref::<Float64Array>() {
        Some(float_array.value(row))
    } else if let Some(int_array) = array.as_any().downcast_ref::<Int64Array>() {
        Some(int_array.value(row) as f64)
    } else if let Some(int_array) = array.as_any().downcast_ref::<Int32Array>() {
        Some(int_array.value(row) as f64)
    } else if let Some(float_array) = array.as_any().downcast_ref::<Float32Array>() {
        Some(float_array.value(row) as f64)
    } else {
        None
    }
}

/// Coordinate pairs for plotting: every row where both projections are
/// present, in batch order.
pub fn projection_points(batch: &RecordBatch) -> Result<Vec<(f64, f64)>, DataError> {
    if batch.num_rows() == 0 {
        return Ok(Vec::new());
    }

    let x_array = batch
        .column_by_name(X_COLUMN)
        .ok_or_else(|| missing_projection(batch))?;
    let y_array = batch
        .column_by_name(Y_COLUMN)
        .ok_or_else(|| missing_projection(batch))?;

    let mut points = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        if let (Some(x), Some(y)) = (
            numeric_value(x_array.as_ref(), row),
            numeric_value(y_array.as_ref(), row),
        ) {
            points.push((x, y));
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn projection_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new(X_COLUMN, DataType::Float64, true),
            Field::new(Y_COLUMN, DataType::Float64, true),
            Field::new("label", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![Some(1.0), None, Some(3.0)])),
                Arc::new(Float64Array::from(vec![Some(2.0), Some(5.0), Some(6.0)])),
                Arc::new(StringArray::from(vec!["a", "b", "c"])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn valid_projection_schema_passes() {
        assert!(validate_projection_schema(&projection_batch()).is_ok());
    }

    #[test]
    fn missing_column_reports_available_fields() {
        let schema = Arc::new(Schema::new(vec![Field::new("label", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["a"])) as arrow::array::ArrayRef],
        )
        .unwrap();

        match validate_projection_schema(&batch) {
            Err(DataError::MissingProjection { available }) => {
                assert_eq!(available, vec!["label".to_string()]);
            }
            other => panic!("expected MissingProjection, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_projection_column_fails() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(X_COLUMN, DataType::Utf8, true),
            Field::new(Y_COLUMN, DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["1.0"])) as arrow::array::ArrayRef,
                Arc::new(Float64Array::from(vec![2.0])),
            ],
        )
        .unwrap();
        assert!(validate_projection_schema(&batch).is_err());
    }

    #[test]
    fn empty_batch_passes_validation() {
        let schema = Arc::new(Schema::new(vec![Field::new("label", DataType::Utf8, true)]));
        let batch = RecordBatch::new_empty(schema);
        assert!(validate_projection_schema(&batch).is_ok());
    }

    #[test]
    fn projection_points_skip_null_coordinates() {
        let points = projection_points(&projection_batch()).unwrap();
        assert_eq!(points, vec![(1.0, 2.0), (3.0, 6.0)]);
    }
}
