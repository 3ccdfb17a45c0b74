//! # Central Map Visualization
//!
//! This module renders the map view showing:
//! - A latitude/longitude graticule
//! - Every record of the loaded sequence as a faint dot
//! - The trail of visited records as a polyline
//! - A marker at the current record with a label
//!
//! ## Coordinate Mapping
//!
//! Coordinates are projected with Web Mercator into a unit square (x grows
//! east, y grows south). The view is fitted to the bounds of the whole
//! sequence with some padding, keeping the aspect ratio of the panel, and
//! mapped to screen pixels with `egui::lerp`.

use std::f64::consts::PI;

use crate::location::GeoBounds;
use crate::ui::AppState;
use eframe::egui;
use egui::Color32;

/// Latitude where the Web Mercator square ends.
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;
/// Smallest view extent in unit-square coordinates (a few km at mid latitudes).
const MIN_VIEW_SPAN: f64 = 1.0e-4;
/// Extra space around the sequence bounds, as a fraction of the extent on each side.
const VIEW_PADDING: f64 = 0.1;
/// Candidate graticule spacings in degrees, smallest first.
const GRATICULE_STEPS: [f64; 15] = [0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0];
const MAX_GRATICULE_LINES: f64 = 10.0;

// Blue at 70% opacity
const TRAIL_COLOR: Color32 = Color32::from_rgba_premultiplied(0, 0, 178, 178);
const TRAIL_WIDTH: f32 = 3.0;
const MARKER_RADIUS: f32 = 7.0;

/// Project degrees to the Web Mercator unit square.
pub fn project(latitude: f64, longitude: f64) -> (f64, f64) {
    let lat = latitude.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE).to_radians();
    let x = (longitude + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

/// Inverse of [`project`], returns `(latitude, longitude)`.
pub fn unproject(x: f64, y: f64) -> (f64, f64) {
    let longitude = x * 360.0 - 180.0;
    let latitude = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    (latitude, longitude)
}

/// Pick a graticule spacing giving at most ten lines over `span_degrees`.
pub fn graticule_step(span_degrees: f64) -> f64 {
    GRATICULE_STEPS
        .iter()
        .copied()
        .find(|step| span_degrees / step <= MAX_GRATICULE_LINES)
        .unwrap_or(GRATICULE_STEPS[GRATICULE_STEPS.len() - 1])
}

/// Visible window of the projected unit square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    min_x: f64,
    min_y: f64,
    span_x: f64,
    span_y: f64,
}

impl MapView {
    /// Fit `bounds` into a view with the given width/height ratio.
    pub fn fit(bounds: &GeoBounds, aspect: f64) -> Self {
        let (x0, y_top) = project(bounds.max_lat, bounds.min_lon);
        let (x1, y_bottom) = project(bounds.min_lat, bounds.max_lon);
        let center_x = (x0 + x1) / 2.0;
        let center_y = (y_top + y_bottom) / 2.0;

        let mut span_x = ((x1 - x0) * (1.0 + 2.0 * VIEW_PADDING)).max(MIN_VIEW_SPAN);
        let mut span_y = ((y_bottom - y_top) * (1.0 + 2.0 * VIEW_PADDING)).max(MIN_VIEW_SPAN);

        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        if span_x / span_y < aspect {
            span_x = span_y * aspect;
        } else {
            span_y = span_x / aspect;
        }

        Self {
            min_x: center_x - span_x / 2.0,
            min_y: center_y - span_y / 2.0,
            span_x,
            span_y,
        }
    }

    pub fn to_screen(&self, rect: egui::Rect, latitude: f64, longitude: f64) -> egui::Pos2 {
        let (x, y) = project(latitude, longitude);
        egui::pos2(
            egui::lerp(rect.left()..=rect.right(), ((x - self.min_x) / self.span_x) as f32),
            egui::lerp(rect.top()..=rect.bottom(), ((y - self.min_y) / self.span_y) as f32),
        )
    }

    /// Screen position back to `(latitude, longitude)`.
    pub fn from_screen(&self, rect: egui::Rect, pos: egui::Pos2) -> (f64, f64) {
        let tx = ((pos.x - rect.left()) / rect.width()) as f64;
        let ty = ((pos.y - rect.top()) / rect.height()) as f64;
        unproject(self.min_x + tx * self.span_x, self.min_y + ty * self.span_y)
    }

    /// Geographic extent of the view.
    pub fn visible_bounds(&self) -> GeoBounds {
        let (max_lat, min_lon) = unproject(self.min_x, self.min_y);
        let (min_lat, max_lon) = unproject(self.min_x + self.span_x, self.min_y + self.span_y);
        GeoBounds {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }
}

/// Render the central map panel.
///
/// # Parameters
///
/// * `ctx` - egui context for rendering
/// * `state` - Application state with the sequence and current index
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Map");
        ui.separator();

        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::hover());
        let painter = ui.painter_at(rect);

        // Draw background
        painter.rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);

        let Some(bounds) = state.bounds else {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Open a CSV file to start playback",
                egui::FontId::proportional(16.0),
                ui.visuals().weak_text_color(),
            );
            return;
        };

        let aspect = if rect.height() > 0.0 { rect.width() / rect.height() } else { 1.0 };
        let view = MapView::fit(&bounds, aspect as f64);

        draw_graticule(&painter, rect, &view, ui);
        draw_route_points(&painter, rect, &view, state);
        draw_trail(&painter, rect, &view, state);
        draw_marker(&painter, rect, &view, state, ui);

        // Coordinate readout under the pointer
        if let Some(pointer) = response.hover_pos() {
            let (lat, lon) = view.from_screen(rect, pointer);
            painter.text(
                rect.left_bottom() + egui::vec2(8.0, -8.0),
                egui::Align2::LEFT_BOTTOM,
                format!("{:.5}, {:.5}", lat, lon),
                egui::FontId::monospace(12.0),
                ui.visuals().text_color(),
            );
        }
    });
}

/// Draw latitude/longitude lines with degree labels.
///
/// Spacing adapts to the visible extent so there are at most ten lines per axis.
fn draw_graticule(painter: &egui::Painter, rect: egui::Rect, view: &MapView, ui: &egui::Ui) {
    let grid_stroke = egui::Stroke::new(1.0, Color32::from_rgb(0, 0, 100));
    let label_color = ui.visuals().weak_text_color();
    let visible = view.visible_bounds();

    let lon_step = graticule_step(visible.max_lon - visible.min_lon);
    let mut lon = (visible.min_lon / lon_step).ceil() * lon_step;
    while lon <= visible.max_lon {
        let x = view.to_screen(rect, 0.0, lon).x;
        painter.line_segment([egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())], grid_stroke);
        painter.text(
            egui::pos2(x + 2.0, rect.top() + 2.0),
            egui::Align2::LEFT_TOP,
            format_degrees(lon, lon_step),
            egui::FontId::monospace(10.0),
            label_color,
        );
        lon += lon_step;
    }

    let lat_step = graticule_step(visible.max_lat - visible.min_lat);
    let mut lat = (visible.min_lat / lat_step).ceil() * lat_step;
    while lat <= visible.max_lat.min(MAX_MERCATOR_LATITUDE) {
        let y = view.to_screen(rect, lat, 0.0).y;
        painter.line_segment([egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)], grid_stroke);
        painter.text(
            egui::pos2(rect.left() + 2.0, y - 2.0),
            egui::Align2::LEFT_BOTTOM,
            format_degrees(lat, lat_step),
            egui::FontId::monospace(10.0),
            label_color,
        );
        lat += lat_step;
    }
}

/// Format a graticule value with as many decimals as its step needs.
fn format_degrees(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 { 0 } else { (-step.log10() - 1e-9).ceil() as usize };
    format!("{:.*}°", decimals, value)
}

fn draw_route_points(painter: &egui::Painter, rect: egui::Rect, view: &MapView, state: &AppState) {
    let color = Color32::from_rgba_unmultiplied(160, 160, 160, 120);
    for record in &state.sequence {
        painter.circle_filled(view.to_screen(rect, record.latitude, record.longitude), 2.0, color);
    }
}

/// Draw the polyline through every visited record.
fn draw_trail(painter: &egui::Painter, rect: egui::Rect, view: &MapView, state: &AppState) {
    let points: Vec<egui::Pos2> = state
        .trail()
        .iter()
        .map(|r| view.to_screen(rect, r.latitude, r.longitude))
        .collect();
    if points.len() >= 2 {
        painter.add(egui::Shape::line(points, egui::Stroke::new(TRAIL_WIDTH, TRAIL_COLOR)));
    }
}

/// Draw the current-position marker and its label.
fn draw_marker(painter: &egui::Painter, rect: egui::Rect, view: &MapView, state: &AppState, ui: &egui::Ui) {
    let Some(record) = state.current_record() else {
        return;
    };
    let pos = view.to_screen(rect, record.latitude, record.longitude);
    painter.circle_filled(pos, MARKER_RADIUS, Color32::from_rgb(220, 40, 40));
    painter.circle_stroke(pos, MARKER_RADIUS, egui::Stroke::new(2.0, Color32::WHITE));
    painter.text(
        egui::pos2(pos.x + MARKER_RADIUS + 4.0, pos.y - MARKER_RADIUS),
        egui::Align2::LEFT_BOTTOM,
        &state.marker_label,
        egui::FontId::proportional(13.0),
        ui.visuals().strong_text_color(),
    );
}
