//! Chart selection events and their reduction to a rectangular range

/// Padding applied on each axis when exactly one point is selected, so the
/// resulting range is non-degenerate and yields a visible filtered set.
pub const SINGLE_POINT_PADDING: f64 = 0.1;

/// A selection gesture on the scatter chart, reported in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// Rectangle selection; the vertices of the drawn box.
    Box { points: Vec<(f64, f64)> },
    /// Freehand selection; the vertices of the drawn polygon.
    Lasso { points: Vec<(f64, f64)> },
    /// Discrete point selection; the coordinates of the picked points.
    Points { points: Vec<(f64, f64)> },
}

impl SelectionEvent {
    /// Human-readable gesture name for status messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SelectionEvent::Box { .. } => "box",
            SelectionEvent::Lasso { .. } => "lasso",
            SelectionEvent::Points { .. } => "point",
        }
    }
}

/// A pair of closed numeric intervals over the projection coordinates.
///
/// Invariant: `x_min <= x_max` and `y_min <= y_max`. Ranges are only built
/// by [`normalize`], held in view state, and replaced rather than mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRange {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl SelectionRange {
    /// Whether a coordinate pair falls inside the range, bounds inclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Axis-aligned bounding box of a vertex list. `None` when empty.
    fn bounding(points: &[(f64, f64)]) -> Option<Self> {
        let (&(x0, y0), rest) = points.split_first()?;
        let mut range = SelectionRange {
            x_min: x0,
            x_max: x0,
            y_min: y0,
            y_max: y0,
        };
        for &(x, y) in rest {
            range.x_min = range.x_min.min(x);
            range.x_max = range.x_max.max(x);
            range.y_min = range.y_min.min(y);
            range.y_max = range.y_max.max(y);
        }
        Some(range)
    }
}

/// Reduce a selection event to its canonical rectangular range.
///
/// Box and lasso selections collapse to the bounding box of their vertices;
/// the lasso polygon interior is not tested point-by-point, so a lasso
/// filters exactly like the rectangle enclosing it. A single-point
/// selection is padded by [`SINGLE_POINT_PADDING`] on each axis.
///
/// Events with no geometry return `None`; the caller treats that as a
/// no-op, not a fault.
pub fn normalize(event: &SelectionEvent) -> Option<SelectionRange> {
    let range = match event {
        SelectionEvent::Box { points } | SelectionEvent::Lasso { points } => {
            SelectionRange::bounding(points)
        }
        SelectionEvent::Points { points } => {
            let mut range = SelectionRange::bounding(points)?;
            if points.len() == 1 {
                range.x_min -= SINGLE_POINT_PADDING;
                range.x_max += SINGLE_POINT_PADDING;
                range.y_min -= SINGLE_POINT_PADDING;
                range.y_max += SINGLE_POINT_PADDING;
            }
            Some(range)
        }
    };

    if range.is_none() {
        tracing::debug!("ignoring {} selection event with empty geometry", event.kind());
    }

    range
}
