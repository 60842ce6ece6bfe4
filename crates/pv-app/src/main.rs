//! Main application entry point

use std::sync::Arc;

use anyhow::Result;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use eframe::egui::{self, Context, RichText, Ui};
use tracing::{error, info, warn};

use pv_core::{DashboardEvent, DataSource, ViewState};
use pv_data::export::{export_file_name, write_csv};
use pv_data::filter::{filter_by_range, filter_by_search};
use pv_data::schema::{projection_points, validate_projection_schema};
use pv_data::{DataError, DatasetCache, SqliteSource, StoreConfig};
use pv_views::{default_display_columns, summary_stats, summary_strip, ScatterView, TableView};

mod sample_db;

/// Main application state
struct PcaDashboardApp {
    /// Tokio runtime driving the store fetches
    runtime: tokio::runtime::Runtime,

    /// Store settings from the environment; absent when unset
    config: Option<StoreConfig>,

    /// The connected store, if any
    source: Option<Arc<SqliteSource>>,

    /// Process-wide dataset cache
    cache: Arc<DatasetCache>,

    /// Session view state (active range + search term)
    view_state: ViewState,

    /// Columns shown in the table; `None` until the user picks, which
    /// means "the schema's defaults"
    display_columns: Option<Vec<String>>,

    /// Search box contents (the applied term lives in `view_state`)
    search_input: String,

    scatter: ScatterView,
    table: TableView,

    /// Events emitted by the widgets this frame, dispatched next pass
    pending_events: Vec<DashboardEvent>,

    /// Data-source fault of the current pass, shown with config hints
    data_error: Option<String>,

    /// Outcome of the last export, shown under the download button
    export_status: Option<String>,
}

impl PcaDashboardApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");

        let (config, data_error) = match StoreConfig::from_env() {
            Ok(config) => (Some(config), None),
            Err(e) => {
                warn!("store configuration incomplete: {}", e);
                (None, Some(e.to_string()))
            }
        };

        let mut app = Self {
            runtime,
            config,
            source: None,
            cache: Arc::new(DatasetCache::new()),
            view_state: ViewState::default(),
            display_columns: None,
            search_input: String::new(),
            scatter: ScatterView::new(),
            table: TableView::new(),
            pending_events: Vec::new(),
            data_error,
            export_status: None,
        };
        app.connect();
        app
    }

    /// Open the store the current configuration points at.
    fn connect(&mut self) {
        let config = match &self.config {
            Some(config) => config.clone(),
            None => return,
        };

        match self.runtime.block_on(SqliteSource::connect(&config)) {
            Ok(source) => {
                info!("connected to {}", source.source_name());
                self.source = Some(Arc::new(source));
                self.data_error = None;
            }
            Err(e) => {
                error!("failed to connect to store: {}", e);
                self.source = None;
                self.data_error = Some(e.to_string());
            }
        }
    }

    /// Apply the events queued by the previous render pass.
    fn dispatch_events(&mut self) {
        let events = std::mem::take(&mut self.pending_events);
        for event in events {
            match &event {
                DashboardEvent::RefreshData => {
                    self.cache.invalidate();
                    if self.source.is_none() {
                        self.connect();
                    }
                }
                DashboardEvent::SetDisplayColumns(columns) => {
                    self.display_columns = Some(columns.clone());
                }
                _ => {}
            }
            self.view_state = self.view_state.apply(&event);
        }
    }

    /// The dataset for this pass: cached, freshly fetched, or empty after
    /// a fault.
    fn load_dataset(&mut self) -> RecordBatch {
        let source = match &self.source {
            Some(source) => source.clone(),
            None => return empty_batch(),
        };

        match self.runtime.block_on(self.cache.get_or_load(source.as_ref())) {
            Ok(batch) => {
                self.data_error = None;
                batch
            }
            Err(e) => {
                error!("failed to fetch records: {}", e);
                self.data_error = Some(e.to_string());
                empty_batch()
            }
        }
    }

    fn generate_sample_data(&mut self) {
        let config = self
            .config
            .get_or_insert_with(sample_db::default_config)
            .clone();

        match sample_db::create_sample_database(&config) {
            Ok(rows) => {
                info!("sample database ready ({} rows)", rows);
                self.cache.invalidate();
                self.connect();
            }
            Err(e) => {
                error!("failed to create sample database: {}", e);
                self.data_error = Some(e.to_string());
            }
        }
    }

    fn sidebar(&mut self, ui: &mut Ui) {
        ui.heading("Configuration");
        ui.add_space(4.0);

        if ui.button("Refresh Data").clicked() {
            self.pending_events.push(DashboardEvent::RefreshData);
        }
        if ui.button("Generate Sample Data").clicked() {
            self.generate_sample_data();
        }

        ui.separator();
        ui.strong("Data Summary");
        let total = self.cache.cached().map(|batch| batch.num_rows()).unwrap_or(0);
        ui.label(format!("Total Records: {}", total));

        if let Some(range) = &self.view_state.range {
            ui.separator();
            ui.strong("Current Zoom");
            ui.label(format!("X: {:.2} to {:.2}", range.x_min, range.x_max));
            ui.label(format!("Y: {:.2} to {:.2}", range.y_min, range.y_max));
        }
    }

    /// The error panel for a pass with no usable dataset.
    fn show_connection_error(&self, ui: &mut Ui) {
        ui.colored_label(
            ui.visuals().error_fg_color,
            "No data found or connection failed. Please check your store configuration.",
        );
        if let Some(detail) = &self.data_error {
            ui.label(RichText::new(detail).weak());
        }
        ui.add_space(8.0);
        ui.label("Make sure these environment variables are set (or use a .env file):");
        ui.label(RichText::new(StoreConfig::example()).monospace());
        ui.add_space(8.0);
        ui.label("Or generate demo records with the sidebar's \"Generate Sample Data\" button.");
    }

    fn show_schema_error(&self, ui: &mut Ui, error: &DataError) {
        ui.colored_label(ui.visuals().error_fg_color, error.to_string());
    }

    fn central(&mut self, ui: &mut Ui, batch: &RecordBatch) {
        ui.heading("Advanced PCA Visualization Dashboard");
        ui.add_space(4.0);

        if batch.num_rows() == 0 {
            self.show_connection_error(ui);
            return;
        }

        if let Err(e) = validate_projection_schema(batch) {
            self.show_schema_error(ui, &e);
            return;
        }

        // Scatter section
        ui.strong("Interactive PCA Scatterplot");
        if ui.button("Reset Zoom").clicked() {
            self.pending_events.push(DashboardEvent::ResetZoom);
        }

        let points = match projection_points(batch) {
            Ok(points) => points,
            Err(e) => {
                self.show_schema_error(ui, &e);
                return;
            }
        };

        if let Some(selection) = self.scatter.ui(ui, &points, self.view_state.range.as_ref()) {
            self.pending_events
                .push(DashboardEvent::SelectRegion(selection));
        }

        if let Some(range) = &self.view_state.range {
            ui.label(format!(
                "Active filter: X: {:.2} to {:.2}, Y: {:.2} to {:.2}",
                range.x_min, range.x_max, range.y_min, range.y_max
            ));
        }

        ui.separator();

        // Table section
        let filtered = match filter_by_range(batch, self.view_state.range.as_ref()) {
            Ok(filtered) => filtered,
            Err(e) => {
                self.show_schema_error(ui, &e);
                return;
            }
        };

        if self.view_state.range.is_some() {
            ui.strong(format!(
                "Records in Current Zoom ({} records)",
                filtered.num_rows()
            ));
        } else {
            ui.strong("All Records");
        }

        ui.horizontal(|ui| {
            ui.label("Search records:");
            if ui.text_edit_singleline(&mut self.search_input).changed() {
                self.pending_events
                    .push(DashboardEvent::SetSearchTerm(self.search_input.clone()));
            }
        });

        let displayed = match filter_by_search(&filtered, self.view_state.search_term()) {
            Ok(displayed) => displayed,
            Err(e) => {
                self.show_schema_error(ui, &e);
                return;
            }
        };

        if let Some(term) = &self.view_state.search {
            ui.label(format!(
                "Found {} records matching '{}'",
                displayed.num_rows(),
                term
            ));
        }

        let columns = match &self.display_columns {
            Some(columns) => columns.clone(),
            None => default_display_columns(batch),
        };

        if let Some(event) = self.table.ui(ui, &displayed, &columns) {
            self.pending_events.push(event);
        }

        if columns.len() >= 2 && displayed.num_rows() > 0 {
            ui.add_space(8.0);
            let mut summary = summary_stats(&displayed);
            // Only surface the means for columns the table is showing.
            if !columns.iter().any(|c| c == "Xpca") {
                summary.mean_x = None;
            }
            if !columns.iter().any(|c| c == "Ypca") {
                summary.mean_y = None;
            }
            summary_strip(ui, &summary);
        }

        if !columns.is_empty() {
            ui.add_space(8.0);
            if ui.button("Download filtered data as CSV").clicked() {
                self.export_csv(&displayed, &columns);
            }
            if let Some(status) = &self.export_status {
                ui.weak(status);
            }
        }
    }

    /// Write the displayed subset to a user-chosen file.
    fn export_csv(&mut self, displayed: &RecordBatch, columns: &[String]) {
        let bytes = match write_csv(displayed, columns) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("CSV export failed: {}", e);
                self.export_status = Some(format!("Export failed: {}", e));
                return;
            }
        };

        let suggested = export_file_name(displayed.num_rows());
        let picked = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name(&suggested)
            .save_file();

        if let Some(path) = picked {
            match std::fs::write(&path, bytes) {
                Ok(()) => {
                    info!("exported {} records to {:?}", displayed.num_rows(), path);
                    self.export_status =
                        Some(format!("Saved {} records to {}", displayed.num_rows(), path.display()));
                }
                Err(e) => {
                    error!("failed to write {:?}: {}", path, e);
                    self.export_status = Some(format!("Export failed: {}", e));
                }
            }
        }
    }
}

impl eframe::App for PcaDashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.dispatch_events();
        let batch = self.load_dataset();

        egui::SidePanel::left("sidebar")
            .default_width(220.0)
            .show(ctx, |ui| {
                self.sidebar(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_source("dashboard_scroll")
                .show(ui, |ui| {
                    self.central(ui, &batch);
                });
        });
    }
}

fn empty_batch() -> RecordBatch {
    RecordBatch::new_empty(Arc::new(Schema::empty()))
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting PCA projection dashboard");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        default_theme: eframe::Theme::Dark,
        ..Default::default()
    };

    eframe::run_native(
        "PCA Visualization Dashboard",
        options,
        Box::new(|cc| Box::new(PcaDashboardApp::new(cc))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
