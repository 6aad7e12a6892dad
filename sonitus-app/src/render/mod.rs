//! PNG figure rendering on a tiny-skia pixmap.
//!
//! ## Design
//!
//! A `Figure` collects line series and is consumed by `save`, which fits
//! the axes over all finite data, rasterizes frame, ticks, series,
//! legend and labels onto a 640x480 white canvas, and writes the PNG in
//! one step. Holding the pixmap only inside `save` keeps figures cheap
//! to build and impossible to half-write.
//!
//! Non-finite magnitudes (a silent frame's spectrum is `-inf` dB across
//! the board) are clamped to the axis edge at draw time and never decide
//! the axis range.

mod chart;
mod font;

use std::path::Path;

use anyhow::{Context, Result};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use chart::{finite_range, nice_ticks, padded, tick_label, ChartLayout};
use font::{char_height, draw_text, draw_text_vertical, text_width};

const FIGURE_WIDTH: u32 = 640;
const FIGURE_HEIGHT: u32 = 480;
const MARGIN_LEFT: f32 = 78.0;
const MARGIN_RIGHT: f32 = 24.0;
const MARGIN_TOP: f32 = 46.0;
const MARGIN_BOTTOM: f32 = 58.0;
const LABEL_PX: f32 = 2.0;
const LEGEND_PX: f32 = 1.5;

/// Color cycle for overlaid series, one entry per model order.
pub fn series_color(index: usize) -> Color {
    match index % 4 {
        0 => Color::from_rgba8(31, 119, 180, 255),
        1 => Color::from_rgba8(255, 127, 14, 255),
        2 => Color::from_rgba8(44, 160, 44, 255),
        _ => Color::from_rgba8(214, 39, 40, 255),
    }
}

struct Series {
    xs: Vec<f64>,
    ys: Vec<f64>,
    color: Color,
    label: Option<String>,
}

/// A single chart: title, axis labels and any number of line series.
pub struct Figure {
    width: u32,
    height: u32,
    title: String,
    x_label: String,
    y_label: String,
    series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            width: FIGURE_WIDTH,
            height: FIGURE_HEIGHT,
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            series: Vec::new(),
        }
    }

    pub fn with_axis_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    /// Add a line series. `label` puts an entry in the legend.
    pub fn line(&mut self, xs: &[f64], ys: &[f64], color: Color, label: Option<&str>) {
        self.series.push(Series {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            color,
            label: label.map(str::to_owned),
        });
    }

    /// Rasterize and write the figure as a PNG at `path`, consuming it.
    pub fn save(self, path: &Path) -> Result<()> {
        let mut pixmap = Pixmap::new(self.width, self.height)
            .context("figure dimensions must be non-zero")?;
        pixmap.fill(Color::WHITE);

        let layout = self.layout();
        self.draw_frame(&mut pixmap, &layout);
        self.draw_ticks(&mut pixmap, &layout);
        for series in &self.series {
            draw_series(&mut pixmap, &layout, series);
        }
        self.draw_legend(&mut pixmap, &layout);
        self.draw_labels(&mut pixmap, &layout);

        pixmap
            .save_png(path)
            .with_context(|| format!("write figure {}", path.display()))?;
        Ok(())
    }

    fn layout(&self) -> ChartLayout {
        let (x_min, x_max) = padded(
            finite_range(self.series.iter().flat_map(|s| s.xs.iter())),
            0.05,
        );
        let (y_min, y_max) = padded(
            finite_range(self.series.iter().flat_map(|s| s.ys.iter())),
            0.05,
        );
        ChartLayout {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            right: self.width as f32 - MARGIN_RIGHT,
            bottom: self.height as f32 - MARGIN_BOTTOM,
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    fn draw_frame(&self, pixmap: &mut Pixmap, layout: &ChartLayout) {
        let Some(rect) = Rect::from_xywh(
            layout.left,
            layout.top,
            layout.right - layout.left,
            layout.bottom - layout.top,
        ) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        pixmap.stroke_path(
            &path,
            &solid_paint(Color::BLACK, false),
            &Stroke::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_ticks(&self, pixmap: &mut Pixmap, layout: &ChartLayout) {
        let text_paint = solid_paint(Color::BLACK, false);
        let mut marks = PathBuilder::new();

        let x_ticks = nice_ticks(layout.x_min, layout.x_max, 6);
        let x_step = tick_step(&x_ticks);
        for &tick in &x_ticks {
            let px = layout.map_x(tick);
            marks.move_to(px, layout.bottom);
            marks.line_to(px, layout.bottom + 5.0);
            let label = tick_label(tick, x_step);
            let w = text_width(&label, LABEL_PX);
            draw_text(pixmap, &label, px - w / 2.0, layout.bottom + 9.0, LABEL_PX, &text_paint);
        }

        let y_ticks = nice_ticks(layout.y_min, layout.y_max, 6);
        let y_step = tick_step(&y_ticks);
        for &tick in &y_ticks {
            let py = layout.map_y(tick);
            marks.move_to(layout.left - 5.0, py);
            marks.line_to(layout.left, py);
            let label = tick_label(tick, y_step);
            let w = text_width(&label, LABEL_PX);
            draw_text(
                pixmap,
                &label,
                layout.left - 9.0 - w,
                py - char_height(LABEL_PX) / 2.0,
                LABEL_PX,
                &text_paint,
            );
        }

        if let Some(path) = marks.finish() {
            pixmap.stroke_path(
                &path,
                &solid_paint(Color::BLACK, false),
                &Stroke::default(),
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_legend(&self, pixmap: &mut Pixmap, layout: &ChartLayout) {
        let entries: Vec<(&str, Color)> = self
            .series
            .iter()
            .filter_map(|s| s.label.as_deref().map(|l| (l, s.color)))
            .collect();
        if entries.is_empty() {
            return;
        }

        let row_height = char_height(LEGEND_PX) + 6.0;
        let text_w = entries
            .iter()
            .map(|(label, _)| text_width(label, LEGEND_PX))
            .fold(0.0, f32::max);
        let box_w = 8.0 + 18.0 + 6.0 + text_w + 8.0;
        let box_h = entries.len() as f32 * row_height + 8.0;
        let bx = layout.right - box_w - 8.0;
        let by = layout.top + 8.0;

        if let Some(rect) = Rect::from_xywh(bx, by, box_w, box_h) {
            let path = PathBuilder::from_rect(rect);
            pixmap.fill_path(
                &path,
                &solid_paint(Color::WHITE, false),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
            pixmap.stroke_path(
                &path,
                &solid_paint(Color::BLACK, false),
                &Stroke::default(),
                Transform::identity(),
                None,
            );
        }

        for (i, (label, color)) in entries.iter().enumerate() {
            let cy = by + 4.0 + i as f32 * row_height + row_height / 2.0;
            let mut swatch = PathBuilder::new();
            swatch.move_to(bx + 8.0, cy);
            swatch.line_to(bx + 26.0, cy);
            if let Some(path) = swatch.finish() {
                let stroke = Stroke {
                    width: 3.0,
                    ..Stroke::default()
                };
                pixmap.stroke_path(
                    &path,
                    &solid_paint(*color, true),
                    &stroke,
                    Transform::identity(),
                    None,
                );
            }
            draw_text(
                pixmap,
                label,
                bx + 32.0,
                cy - char_height(LEGEND_PX) / 2.0,
                LEGEND_PX,
                &solid_paint(Color::BLACK, false),
            );
        }
    }

    fn draw_labels(&self, pixmap: &mut Pixmap, layout: &ChartLayout) {
        let paint = solid_paint(Color::BLACK, false);

        // Long titles drop to the small size rather than run off the canvas.
        let title_px = if text_width(&self.title, LABEL_PX) <= self.width as f32 - 16.0 {
            LABEL_PX
        } else {
            1.0
        };
        let tx = (self.width as f32 - text_width(&self.title, title_px)) / 2.0;
        draw_text(pixmap, &self.title, tx.max(2.0), 12.0, title_px, &paint);

        if !self.x_label.is_empty() {
            let w = text_width(&self.x_label, LABEL_PX);
            let x = layout.left + (layout.right - layout.left - w) / 2.0;
            draw_text(pixmap, &self.x_label, x, self.height as f32 - 22.0, LABEL_PX, &paint);
        }

        if !self.y_label.is_empty() {
            let step = char_height(1.5) + 1.5;
            let total = self.y_label.chars().count() as f32 * step;
            let y = layout.top + (layout.bottom - layout.top - total) / 2.0;
            draw_text_vertical(pixmap, &self.y_label, 6.0, y.max(layout.top), 1.5, &paint);
        }
    }
}

fn draw_series(pixmap: &mut Pixmap, layout: &ChartLayout, series: &Series) {
    let mut pb = PathBuilder::new();
    let mut pen_down = false;
    for (&x, &y) in series.xs.iter().zip(&series.ys) {
        if !x.is_finite() || y.is_nan() {
            // Break the polyline; pick it up again at the next good point
            pen_down = false;
            continue;
        }
        let px = layout.map_x(x);
        let py = layout.map_y(y.clamp(layout.y_min, layout.y_max));
        if pen_down {
            pb.line_to(px, py);
        } else {
            pb.move_to(px, py);
            pen_down = true;
        }
    }
    let Some(path) = pb.finish() else {
        return;
    };
    let stroke = Stroke {
        width: 1.5,
        ..Stroke::default()
    };
    pixmap.stroke_path(
        &path,
        &solid_paint(series.color, true),
        &stroke,
        Transform::identity(),
        None,
    );
}

fn solid_paint(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = anti_alias;
    paint
}

fn tick_step(ticks: &[f64]) -> f64 {
    match ticks {
        [first, second, ..] => second - first,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];

    #[test]
    fn figure_writes_a_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.png");

        let xs: Vec<f64> = (0..200).map(|i| i as f64 / 8000.0).collect();
        let ys: Vec<f64> = (0..200)
            .map(|i| (2.0 * std::f64::consts::PI * 200.0 * i as f64 / 8000.0).sin())
            .collect();
        let mut figure = Figure::new("Waveform of digit 3").with_axis_labels("Time (s)", "Amplitude");
        figure.line(&xs, &ys, series_color(0), None);
        figure.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.len() > PNG_MAGIC.len());
        assert_eq!(&bytes[..4], &PNG_MAGIC);
    }

    #[test]
    fn non_finite_points_do_not_poison_the_figure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.png");

        // A silent frame's spectrum: -inf everywhere, with one NaN thrown in
        let xs: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let mut ys = vec![f64::NEG_INFINITY; 50];
        ys[10] = f64::NAN;
        let mut figure = Figure::new("Magnitude spectrum for voiced 'oo' in digit 2")
            .with_axis_labels("Frequency (Hz)", "Magnitude (dB)");
        figure.line(&xs, &ys, Color::BLACK, None);
        figure.save(&path).unwrap();

        assert_eq!(&std::fs::read(&path).unwrap()[..4], &PNG_MAGIC);
    }

    #[test]
    fn legend_and_overlay_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");

        let xs: Vec<f64> = (0..100).map(|i| i as f64 * 40.0 - 2000.0).collect();
        let flat: Vec<f64> = vec![-20.0; 100];
        let bump: Vec<f64> = xs.iter().map(|x| -(x / 400.0).powi(2)).collect();
        let mut figure = Figure::new("Magnitude spectrum for voiced 'oo' in digit 2 with LPC envelope");
        figure.line(&xs, &flat, Color::BLACK, None);
        figure.line(&xs, &bump, series_color(0), Some("LPC order 12"));
        figure.line(&xs, &flat, series_color(1), Some("LPC order 24"));
        figure.save(&path).unwrap();

        assert_eq!(&std::fs::read(&path).unwrap()[..4], &PNG_MAGIC);
    }

    #[test]
    fn empty_figure_still_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        Figure::new("nothing to see").save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(series_color(0), series_color(4));
        assert_ne!(series_color(0), series_color(1));
    }
}
