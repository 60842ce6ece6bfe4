//! Interactive scatter view
//!
//! Renders the projection coordinates and captures selection gestures. The
//! view itself holds no filter state: gestures are reported as
//! [`SelectionEvent`]s and the caller dispatches them.

use egui::{Color32, Ui};
use egui_plot::{Legend, Plot, PlotPoints, Points, Polygon};

use pv_core::{SelectionEvent, SelectionRange};

/// Active gesture tool, mirroring the chart toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Navigate only; drag pans, scroll zooms.
    #[default]
    Pan,
    /// Drag a rectangle around points.
    BoxSelect,
    /// Draw a freehand shape around points.
    LassoSelect,
    /// Click individual points.
    PointSelect,
}

impl SelectionMode {
    fn label(&self) -> &'static str {
        match self {
            SelectionMode::Pan => "Pan / Zoom",
            SelectionMode::BoxSelect => "Box Select",
            SelectionMode::LassoSelect => "Lasso Select",
            SelectionMode::PointSelect => "Point Select",
        }
    }
}

/// Configuration for the scatter view
#[derive(Debug, Clone)]
pub struct ScatterConfig {
    /// Base point radius
    pub point_radius: f32,

    /// Radius (in data units) around a click that picks points
    pub pick_radius: f64,

    /// Whether to show grid
    pub show_grid: bool,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            point_radius: 3.0,
            pick_radius: 0.5,
            show_grid: true,
        }
    }
}

/// Scatter view over the projection coordinates
pub struct ScatterView {
    pub config: ScatterConfig,
    mode: SelectionMode,

    // In-flight gesture state, in data coordinates
    drag_start: Option<(f64, f64)>,
    lasso_points: Vec<(f64, f64)>,
}

impl ScatterView {
    pub fn new() -> Self {
        Self {
            config: ScatterConfig::default(),
            mode: SelectionMode::Pan,
            drag_start: None,
            lasso_points: Vec::new(),
        }
    }

    /// Draw the toolbar and plot. `points` are the (Xpca, Ypca) pairs of the
    /// full dataset; `active_range` is highlighted when set. Returns the
    /// selection gesture completed this frame, if any.
    pub fn ui(
        &mut self,
        ui: &mut Ui,
        points: &[(f64, f64)],
        active_range: Option<&SelectionRange>,
    ) -> Option<SelectionEvent> {
        self.toolbar(ui);

        let allow_navigation = self.mode == SelectionMode::Pan;
        let mut completed = None;

        let plot = Plot::new("pca_scatter")
            .legend(Legend::default())
            .show_grid(self.config.show_grid)
            .allow_scroll(allow_navigation)
            .allow_drag(allow_navigation)
            .allow_zoom(allow_navigation)
            .allow_boxed_zoom(allow_navigation)
            .data_aspect(1.0);

        plot.show(ui, |plot_ui| {
            self.draw_points(plot_ui, points, active_range);
            self.draw_hover_highlight(plot_ui, points);

            if let Some(range) = active_range {
                draw_range_outline(plot_ui, range);
            }

            completed = match self.mode {
                SelectionMode::Pan => None,
                SelectionMode::BoxSelect => self.handle_box_drag(plot_ui),
                SelectionMode::LassoSelect => self.handle_lasso_drag(plot_ui),
                SelectionMode::PointSelect => self.handle_point_click(plot_ui, points),
            };
        });

        if let Some(event) = &completed {
            tracing::debug!("completed {} selection gesture", event.kind());
        }
        completed
    }

    fn toolbar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Mode:");
            for mode in [
                SelectionMode::Pan,
                SelectionMode::BoxSelect,
                SelectionMode::LassoSelect,
                SelectionMode::PointSelect,
            ] {
                if ui
                    .selectable_value(&mut self.mode, mode, mode.label())
                    .clicked()
                {
                    // Changing tool cancels any half-finished gesture.
                    self.drag_start = None;
                    self.lasso_points.clear();
                }
            }
        });
    }

    fn draw_points(
        &self,
        plot_ui: &mut egui_plot::PlotUi,
        points: &[(f64, f64)],
        active_range: Option<&SelectionRange>,
    ) {
        let base_color = Color32::from_rgb(31, 119, 180);

        match active_range {
            Some(range) => {
                // Selected points pop; the rest fade, as on the original
                // chart.
                let (inside, outside): (Vec<_>, Vec<_>) = points
                    .iter()
                    .partition(|&&(x, y)| range.contains(x, y));

                let outside: Vec<[f64; 2]> = outside.iter().map(|&&(x, y)| [x, y]).collect();
                if !outside.is_empty() {
                    plot_ui.points(
                        Points::new(PlotPoints::new(outside))
                            .color(base_color.linear_multiply(0.3))
                            .radius(self.config.point_radius * 0.75),
                    );
                }

                let inside: Vec<[f64; 2]> = inside.iter().map(|&&(x, y)| [x, y]).collect();
                if !inside.is_empty() {
                    plot_ui.points(
                        Points::new(PlotPoints::new(inside))
                            .color(base_color)
                            .radius(self.config.point_radius * 1.5)
                            .name("selected"),
                    );
                }
            }
            None => {
                let all: Vec<[f64; 2]> = points.iter().map(|&(x, y)| [x, y]).collect();
                plot_ui.points(
                    Points::new(PlotPoints::new(all))
                        .color(base_color)
                        .radius(self.config.point_radius)
                        .name("Ypca vs Xpca"),
                );
            }
        }
    }

    fn draw_hover_highlight(&self, plot_ui: &mut egui_plot::PlotUi, points: &[(f64, f64)]) {
        let pointer = match plot_ui.pointer_coordinate() {
            Some(pointer) => pointer,
            None => return,
        };

        let near: Vec<[f64; 2]> = points
            .iter()
            .filter(|(x, y)| {
                let dx = x - pointer.x;
                let dy = y - pointer.y;
                (dx * dx + dy * dy).sqrt() < self.config.pick_radius
            })
            .map(|&(x, y)| [x, y])
            .collect();

        if !near.is_empty() {
            plot_ui.points(
                Points::new(PlotPoints::new(near))
                    .color(Color32::from_rgb(255, 127, 14))
                    .radius(self.config.point_radius * 2.0),
            );
        }
    }

    fn handle_box_drag(&mut self, plot_ui: &mut egui_plot::PlotUi) -> Option<SelectionEvent> {
        let pointer = plot_ui.pointer_coordinate().map(|p| (p.x, p.y));
        let response = plot_ui.response().clone();

        if response.drag_started() {
            self.drag_start = pointer;
        }

        if let (Some(start), Some(current)) = (self.drag_start, pointer) {
            if response.dragged() {
                draw_rubber_band(plot_ui, start, current);
            }

            if response.drag_released() {
                let start = self.drag_start.take()?;
                return Some(SelectionEvent::Box {
                    points: vec![
                        start,
                        (start.0, current.1),
                        current,
                        (current.0, start.1),
                    ],
                });
            }
        } else if response.drag_released() {
            // Drag ended outside the plot area; nothing usable.
            self.drag_start = None;
        }

        None
    }

    fn handle_lasso_drag(&mut self, plot_ui: &mut egui_plot::PlotUi) -> Option<SelectionEvent> {
        let pointer = plot_ui.pointer_coordinate().map(|p| (p.x, p.y));
        let response = plot_ui.response().clone();

        if response.drag_started() {
            self.lasso_points.clear();
        }

        if response.dragged() {
            if let Some(point) = pointer {
                if self.lasso_points.last() != Some(&point) {
                    self.lasso_points.push(point);
                }
            }
        }

        if self.lasso_points.len() >= 2 {
            let outline: Vec<[f64; 2]> =
                self.lasso_points.iter().map(|&(x, y)| [x, y]).collect();
            plot_ui.line(
                egui_plot::Line::new(PlotPoints::new(outline))
                    .color(Color32::from_rgb(255, 127, 14))
                    .width(1.5),
            );
        }

        if response.drag_released() {
            let points = std::mem::take(&mut self.lasso_points);
            return Some(SelectionEvent::Lasso { points });
        }

        None
    }

    fn handle_point_click(
        &mut self,
        plot_ui: &mut egui_plot::PlotUi,
        points: &[(f64, f64)],
    ) -> Option<SelectionEvent> {
        let response = plot_ui.response().clone();
        if !(response.clicked() && !response.dragged()) {
            return None;
        }
        let pointer = plot_ui.pointer_coordinate()?;

        let picked: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|&(x, y)| {
                let dx = x - pointer.x;
                let dy = y - pointer.y;
                (dx * dx + dy * dy).sqrt() < self.config.pick_radius
            })
            .collect();

        // A click that hits nothing is noise, not a selection.
        if picked.is_empty() {
            None
        } else {
            Some(SelectionEvent::Points { points: picked })
        }
    }
}

impl Default for ScatterView {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_rubber_band(plot_ui: &mut egui_plot::PlotUi, start: (f64, f64), current: (f64, f64)) {
    let corners = vec![
        [start.0, start.1],
        [start.0, current.1],
        [current.0, current.1],
        [current.0, start.1],
    ];
    plot_ui.polygon(
        Polygon::new(PlotPoints::new(corners))
            .fill_color(Color32::from_rgba_unmultiplied(255, 127, 14, 20))
            .stroke(egui::Stroke::new(1.5, Color32::from_rgb(255, 127, 14))),
    );
}

fn draw_range_outline(plot_ui: &mut egui_plot::PlotUi, range: &SelectionRange) {
    let corners = vec![
        [range.x_min, range.y_min],
        [range.x_min, range.y_max],
        [range.x_max, range.y_max],
        [range.x_max, range.y_min],
    ];
    plot_ui.polygon(
        Polygon::new(PlotPoints::new(corners))
            .fill_color(Color32::from_rgba_unmultiplied(31, 119, 180, 12))
            .stroke(egui::Stroke::new(1.0, Color32::from_rgb(31, 119, 180))),
    );
}
