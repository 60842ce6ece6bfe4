//! Range and search filtering over record batches
//!
//! Both filters are pure: they return a new batch of the surviving rows in
//! their original order and never touch the input.

use arrow::array::{Array, ArrayRef, StringArray, UInt32Array};
use arrow::compute::take;
use arrow::record_batch::RecordBatch;

use pv_core::SelectionRange;

use crate::schema::{missing_projection, numeric_value, X_COLUMN, Y_COLUMN};
use crate::DataError;

/// Keep the records whose projection coordinates fall inside `range`,
/// bounds inclusive. An unset range is the identity.
///
/// Rows with a null coordinate are excluded by a set range: they have no
/// position inside it.
pub fn filter_by_range(
    batch: &RecordBatch,
    range: Option<&SelectionRange>,
) -> Result<RecordBatch, DataError> {
    let range = match range {
        Some(range) => range,
        None => return Ok(batch.clone()),
    };

    if batch.num_rows() == 0 {
        return Ok(batch.clone());
    }

    let x_array = batch
        .column_by_name(X_COLUMN)
        .ok_or_else(|| missing_projection(batch))?;
    let y_array = batch
        .column_by_name(Y_COLUMN)
        .ok_or_else(|| missing_projection(batch))?;

    let mut indices = Vec::new();
    for row in 0..batch.num_rows() {
        if let (Some(x), Some(y)) = (
            numeric_value(x_array.as_ref(), row),
            numeric_value(y_array.as_ref(), row),
        ) {
            if range.contains(x, y) {
                indices.push(row as u32);
            }
        }
    }

    take_rows(batch, &indices)
}

/// Keep the records where any string-typed field contains `term` as a
/// case-insensitive substring. An empty term is the identity.
///
/// Null cells never match; records with zero string fields never match a
/// non-empty term.
pub fn filter_by_search(batch: &RecordBatch, term: &str) -> Result<RecordBatch, DataError> {
    if term.is_empty() {
        return Ok(batch.clone());
    }

    let needle = term.to_lowercase();
    let string_columns: Vec<&StringArray> = batch
        .columns()
        .iter()
        .filter_map(|column| column.as_any().downcast_ref::<StringArray>())
        .collect();

    let mut indices = Vec::new();
    for row in 0..batch.num_rows() {
        let matched = string_columns.iter().any(|column| {
            !column.is_null(row) && column.value(row).to_lowercase().contains(&needle)
        });
        if matched {
            indices.push(row as u32);
        }
    }

    take_rows(batch, &indices)
}

/// Materialize the given row indices as a new batch, preserving order.
fn take_rows(batch: &RecordBatch, indices: &[u32]) -> Result<RecordBatch, DataError> {
    let indices = UInt32Array::from(indices.to_vec());
    let columns = batch
        .columns()
        .iter()
        .map(|column| take(column.as_ref(), &indices, None))
        .collect::<Result<Vec<ArrayRef>, _>>()?;

    RecordBatch::try_new(batch.schema(), columns).map_err(DataError::Arrow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn batch(rows: &[(f64, f64, &str)]) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new(X_COLUMN, DataType::Float64, true),
            Field::new(Y_COLUMN, DataType::Float64, true),
            Field::new("label", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(
                    rows.iter().map(|r| r.0).collect::<Vec<_>>(),
                )),
                Arc::new(Float64Array::from(
                    rows.iter().map(|r| r.1).collect::<Vec<_>>(),
                )),
                Arc::new(StringArray::from(
                    rows.iter().map(|r| r.2).collect::<Vec<_>>(),
                )),
            ],
        )
        .unwrap()
    }

    fn labels(batch: &RecordBatch) -> Vec<String> {
        let column = batch
            .column_by_name("label")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        (0..column.len()).map(|i| column.value(i).to_string()).collect()
    }

    fn range(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> SelectionRange {
        SelectionRange {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    #[test]
    fn unset_range_is_identity() {
        let input = batch(&[(0.0, 0.0, "a"), (10.0, 10.0, "b")]);
        let output = filter_by_range(&input, None).unwrap();
        assert_eq!(output.num_rows(), input.num_rows());
        assert_eq!(labels(&output), labels(&input));
    }

    #[test]
    fn range_filter_is_inclusive_and_order_preserving() {
        let input = batch(&[
            (0.0, 0.0, "a"),
            (5.0, 5.0, "b"),
            (2.5, 2.5, "c"),
            (5.0, 5.1, "d"),
            (-0.1, 0.0, "e"),
        ]);
        let output = filter_by_range(&input, Some(&range(0.0, 5.0, 0.0, 5.0))).unwrap();
        assert_eq!(labels(&output), vec!["a", "b", "c"]);
    }

    #[test]
    fn degenerate_range_matches_exact_coordinates() {
        let input = batch(&[(1.0, 2.0, "a"), (1.0, 3.0, "b")]);
        let output = filter_by_range(&input, Some(&range(1.0, 1.0, 2.0, 2.0))).unwrap();
        assert_eq!(labels(&output), vec!["a"]);
    }

    #[test]
    fn null_coordinates_are_excluded_by_a_set_range() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(X_COLUMN, DataType::Float64, true),
            Field::new(Y_COLUMN, DataType::Float64, true),
            Field::new("label", DataType::Utf8, true),
        ]));
        let input = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![Some(1.0), None])),
                Arc::new(Float64Array::from(vec![Some(1.0), Some(1.0)])),
                Arc::new(StringArray::from(vec!["a", "b"])),
            ],
        )
        .unwrap();

        let output = filter_by_range(&input, Some(&range(0.0, 2.0, 0.0, 2.0))).unwrap();
        assert_eq!(labels(&output), vec!["a"]);
    }

    #[test]
    fn empty_search_term_is_identity() {
        let input = batch(&[(0.0, 0.0, "a"), (1.0, 1.0, "b")]);
        let output = filter_by_search(&input, "").unwrap();
        assert_eq!(labels(&output), labels(&input));
    }

    #[test]
    fn search_is_case_insensitive_and_idempotent() {
        let input = batch(&[
            (0.0, 0.0, "Alpha"),
            (1.0, 1.0, "beta"),
            (2.0, 2.0, "ALPHABET"),
        ]);
        let once = filter_by_search(&input, "alpha").unwrap();
        assert_eq!(labels(&once), vec!["Alpha", "ALPHABET"]);

        let twice = filter_by_search(&once, "alpha").unwrap();
        assert_eq!(labels(&twice), labels(&once));
    }

    #[test]
    fn search_without_match_returns_empty_set() {
        let input = batch(&[(0.0, 0.0, "a"), (1.0, 1.0, "b")]);
        let output = filter_by_search(&input, "zzz").unwrap();
        assert_eq!(output.num_rows(), 0);
    }

    #[test]
    fn numeric_only_records_never_match_a_term() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(X_COLUMN, DataType::Float64, true),
            Field::new(Y_COLUMN, DataType::Float64, true),
        ]));
        let input = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![1.0])) as ArrayRef,
                Arc::new(Float64Array::from(vec![2.0])),
            ],
        )
        .unwrap();

        // "1" appears in the stringified number, but numeric fields are not
        // searched.
        let output = filter_by_search(&input, "1").unwrap();
        assert_eq!(output.num_rows(), 0);
    }

    #[test]
    fn select_then_search_chain() {
        let input = batch(&[(0.0, 0.0, "a"), (10.0, 10.0, "b")]);

        let in_range = filter_by_range(&input, Some(&range(0.0, 5.0, 0.0, 5.0))).unwrap();
        assert_eq!(labels(&in_range), vec!["a"]);

        let searched = filter_by_search(&in_range, "b").unwrap();
        assert_eq!(searched.num_rows(), 0);
    }
}
