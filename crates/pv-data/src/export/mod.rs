//! CSV export of the displayed record subset

use arrow::array::{Array, ArrayRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;

use crate::DataError;

/// Download filename for an export of `rows` records.
pub fn export_file_name(rows: usize) -> String {
    format!("pca_data_filtered_{}_records.csv", rows)
}

/// Serialize the chosen columns of a batch as CSV bytes, header row first.
/// Null cells become empty fields.
pub fn write_csv(batch: &RecordBatch, columns: &[String]) -> Result<Vec<u8>, DataError> {
    let arrays = columns
        .iter()
        .map(|name| {
            batch
                .column_by_name(name)
                .cloned()
                .ok_or_else(|| DataError::Other(format!("export column '{}' not found", name)))
        })
        .collect::<Result<Vec<ArrayRef>, _>>()?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;

    for row in 0..batch.num_rows() {
        let mut record = Vec::with_capacity(arrays.len());
        for array in &arrays {
            if array.is_null(row) {
                record.push(String::new());
            } else {
                record.push(array_value_to_string(array, row).map_err(DataError::Arrow)?);
            }
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| DataError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Xpca", DataType::Float64, true),
            Field::new("Ypca", DataType::Float64, true),
            Field::new("label", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![Some(1.5), Some(2.0)])),
                Arc::new(Float64Array::from(vec![Some(-3.0), Some(4.25)])),
                Arc::new(StringArray::from(vec![Some("alpha"), None])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn writes_header_and_rows_for_chosen_columns() {
        let bytes = write_csv(&batch(), &["Xpca".into(), "label".into()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Xpca,label");
        assert_eq!(lines[1], "1.5,alpha");
        assert_eq!(lines[2], "2.0,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn unknown_column_is_an_error() {
        let result = write_csv(&batch(), &["nope".into()]);
        assert!(result.is_err());
    }

    #[test]
    fn file_name_encodes_the_record_count() {
        assert_eq!(export_file_name(42), "pca_data_filtered_42_records.csv");
    }
}
