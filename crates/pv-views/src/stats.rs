//! Summary metrics for the displayed subset

use arrow::record_batch::RecordBatch;
use egui::Ui;

use pv_data::schema::{numeric_value, X_COLUMN, Y_COLUMN};

/// Headline numbers shown under the table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSummary {
    pub rows: usize,
    pub mean_x: Option<f64>,
    pub mean_y: Option<f64>,
}

/// Record count plus per-axis means over the non-null coordinates.
pub fn summary_stats(batch: &RecordBatch) -> ProjectionSummary {
    ProjectionSummary {
        rows: batch.num_rows(),
        mean_x: column_mean(batch, X_COLUMN),
        mean_y: column_mean(batch, Y_COLUMN),
    }
}

fn column_mean(batch: &RecordBatch, name: &str) -> Option<f64> {
    let array = batch.column_by_name(name)?;

    let mut sum = 0.0;
    let mut count = 0usize;
    for row in 0..batch.num_rows() {
        if let Some(value) = numeric_value(array.as_ref(), row) {
            sum += value;
            count += 1;
        }
    }

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Three-metric strip: filtered record count, average X, average Y.
pub fn summary_strip(ui: &mut Ui, summary: &ProjectionSummary) {
    ui.horizontal(|ui| {
        metric(ui, "Filtered Records", summary.rows.to_string());
        if let Some(mean_x) = summary.mean_x {
            metric(ui, "Avg X", format!("{:.2}", mean_x));
        }
        if let Some(mean_y) = summary.mean_y {
            metric(ui, "Avg Y", format!("{:.2}", mean_y));
        }
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui| {
        ui.strong(value);
        ui.weak(label);
    });
    ui.add_space(24.0);
}
