//! Record table view
//!
//! Displays the filtered record subset with a column picker. Column choices
//! are reported as `SetDisplayColumns` events; the view renders whatever
//! column set the app passes back in.

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use egui::Ui;

use pv_core::DashboardEvent;
use pv_data::schema::{numeric_value, X_COLUMN, Y_COLUMN};

/// Identifier column hidden from the default column set.
const ID_COLUMN: &str = "id";

/// How many columns the default set may hold.
const DEFAULT_COLUMN_CAP: usize = 7;

/// Configuration for the table view
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub show_row_numbers: bool,
    pub striped_rows: bool,
    pub max_rows_displayed: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            show_row_numbers: true,
            striped_rows: true,
            max_rows_displayed: 1000,
        }
    }
}

/// The default column set: both projections first, then the remaining
/// fields (minus the identifier) up to the cap.
pub fn default_display_columns(batch: &RecordBatch) -> Vec<String> {
    let schema = batch.schema();
    let mut columns = Vec::new();

    for name in [X_COLUMN, Y_COLUMN] {
        if schema.column_with_name(name).is_some() {
            columns.push(name.to_string());
        }
    }

    for field in schema.fields() {
        if columns.len() >= DEFAULT_COLUMN_CAP {
            break;
        }
        let name = field.name();
        if name != X_COLUMN && name != Y_COLUMN && name != ID_COLUMN {
            columns.push(name.clone());
        }
    }

    columns
}

/// Table over the displayed record subset
pub struct TableView {
    pub config: TableConfig,
}

impl TableView {
    pub fn new() -> Self {
        Self {
            config: TableConfig::default(),
        }
    }

    /// Draw the column picker and table. Returns a `SetDisplayColumns`
    /// event when the user changes the column set.
    pub fn ui(
        &mut self,
        ui: &mut Ui,
        batch: &RecordBatch,
        display_columns: &[String],
    ) -> Option<DashboardEvent> {
        let event = self.column_picker(ui, batch, display_columns);

        if display_columns.is_empty() {
            ui.colored_label(
                ui.visuals().warn_fg_color,
                "Please select at least one column to display.",
            );
            return event;
        }

        if batch.num_rows() == 0 {
            ui.colored_label(
                ui.visuals().warn_fg_color,
                "No records found with current filters.",
            );
            return event;
        }

        self.render_table(ui, batch, display_columns);
        event
    }

    fn column_picker(
        &mut self,
        ui: &mut Ui,
        batch: &RecordBatch,
        display_columns: &[String],
    ) -> Option<DashboardEvent> {
        let schema = batch.schema();
        let mut changed = false;
        let mut selected: Vec<String> = display_columns.to_vec();

        ui.horizontal(|ui| {
            ui.menu_button("Columns", |ui| {
                for field in schema.fields() {
                    let name = field.name();
                    let mut shown = selected.iter().any(|c| c == name);
                    if ui.checkbox(&mut shown, name).changed() {
                        changed = true;
                        if shown {
                            selected.push(name.clone());
                        } else {
                            selected.retain(|c| c != name);
                        }
                    }
                }
            });
            ui.weak(format!(
                "{} of {} columns shown",
                display_columns.len(),
                schema.fields().len()
            ));
        });

        if changed {
            // Keep the schema's column order regardless of toggle order.
            let ordered: Vec<String> = schema
                .fields()
                .iter()
                .map(|field| field.name().clone())
                .filter(|name| selected.contains(name))
                .collect();
            Some(DashboardEvent::SetDisplayColumns(ordered))
        } else {
            None
        }
    }

    fn render_table(&mut self, ui: &mut Ui, batch: &RecordBatch, display_columns: &[String]) {
        use egui_extras::{Column, TableBuilder};

        let columns: Vec<_> = display_columns
            .iter()
            .filter_map(|name| batch.column_by_name(name).map(|array| (name, array)))
            .collect();

        let row_order = sorted_row_order(batch);
        let num_rows = row_order.len().min(self.config.max_rows_displayed);

        let mut builder = TableBuilder::new(ui)
            .striped(self.config.striped_rows)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .min_scrolled_height(0.0)
            .vscroll(true);

        if self.config.show_row_numbers {
            builder = builder.column(Column::initial(50.0).at_least(40.0));
        }
        for _ in 0..columns.len() {
            builder = builder.column(
                Column::initial(150.0)
                    .at_least(80.0)
                    .at_most(400.0)
                    .clip(true),
            );
        }

        builder
            .header(20.0, |mut header| {
                if self.config.show_row_numbers {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                }
                for &(name, _) in &columns {
                    header.col(|ui| {
                        ui.strong(name.as_str());
                    });
                }
            })
            .body(|mut body| {
                for display_idx in 0..num_rows {
                    let row_idx = row_order[display_idx];
                    body.row(18.0, |mut row| {
                        if self.config.show_row_numbers {
                            row.col(|ui| {
                                ui.weak((display_idx + 1).to_string());
                            });
                        }
                        for &(_, array) in &columns {
                            row.col(|ui| {
                                let text = if array.is_null(row_idx) {
                                    String::new()
                                } else {
                                    array_value_to_string(array, row_idx)
                                        .unwrap_or_default()
                                };
                                ui.label(text);
                            });
                        }
                    });
                }
            });

        if row_order.len() > num_rows {
            ui.weak(format!(
                "Showing first {} of {} records",
                num_rows,
                row_order.len()
            ));
        }
    }
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

/// Row indices ordered by ascending `Xpca`; rows without a coordinate sort
/// last. Falls back to batch order when the column is absent.
fn sorted_row_order(batch: &RecordBatch) -> Vec<usize> {
    let mut order: Vec<usize> = (0..batch.num_rows()).collect();

    if let Some(x_array) = batch.column_by_name(X_COLUMN) {
        order.sort_by(|&a, &b| {
            let xa = numeric_value(x_array.as_ref(), a);
            let xb = numeric_value(x_array.as_ref(), b);
            match (xa, xb) {
                (Some(xa), Some(xb)) => xa.partial_cmp(&xb).unwrap_or(std::cmp::Ordering::Equal),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
    }

    order
}
