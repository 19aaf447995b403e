//! Scene rasterization with tiny-skia.
//!
//! Shapes (polygons, frame, text boxes, legend) are painted into a
//! [`Pixmap`]; glyphs are drawn afterwards with imageproc, so every text box
//! sits under its text.

use std::path::PathBuf;

use alert_common::Color;
use composer::{DrawStep, HAlign, Legend, MapScene, TextAnnotation, VAlign};
use geo::{LineString, MultiPolygon};
use image::RgbaImage;
use tiny_skia::{FillRule, Mask, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::{debug, warn};

use crate::error::RenderError;
use crate::font::FontSet;
use crate::layout::PlotArea;
use crate::png;
use crate::text::{self, TextExtent};

/// Legend frame: white at 80% opacity with a light grey edge.
const LEGEND_FILL: Color = Color::rgba(255, 255, 255, 204);
const LEGEND_EDGE: Color = Color::rgb(204, 204, 204);

/// Plot frame width in points.
const FRAME_WIDTH: f32 = 0.8;

/// Output image settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    pub width: u32,
    pub height: u32,
    /// Pixels per inch; converts point sizes to pixels
    pub dpi: f32,
    pub font_path: Option<PathBuf>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            dpi: 100.0,
            font_path: None,
        }
    }
}

/// Draws [`MapScene`]s into PNG images of a fixed size.
#[derive(Debug)]
pub struct SceneRasterizer {
    options: RasterOptions,
    fonts: FontSet,
}

impl SceneRasterizer {
    /// Create a rasterizer, loading fonts from `options.font_path` or the system.
    pub fn new(options: RasterOptions) -> Self {
        let fonts = FontSet::load(options.font_path.as_deref());
        Self::with_fonts(options, fonts)
    }

    pub fn with_fonts(options: RasterOptions, fonts: FontSet) -> Self {
        if fonts.is_empty() {
            warn!("No usable font found; map text will be left out");
        }
        Self { options, fonts }
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    /// Rasterize and encode `scene` as PNG.
    pub fn render(&self, scene: &MapScene<'_>) -> Result<Vec<u8>, RenderError> {
        let image = self.rasterize(scene)?;
        png::encode(image.as_raw(), image.width(), image.height())
    }

    /// Rasterize `scene` into an opaque RGBA image.
    pub fn rasterize(&self, scene: &MapScene<'_>) -> Result<RgbaImage, RenderError> {
        if !scene.view.is_valid() {
            return Err(RenderError::DegenerateView);
        }

        let plot = PlotArea::fit(self.options.width, self.options.height, scene.view);
        let mut canvas = Canvas::new(self.options.width, self.options.height, plot)?;

        canvas.fill_plot(scene.background);
        for step in &scene.steps {
            canvas.draw_step(step, self.px(1.0));
        }
        canvas.stroke_frame(self.px(FRAME_WIDTH));

        let mut labels = Vec::new();
        if let Some(legend) = &scene.legend {
            labels.extend(self.paint_legend(&mut canvas, legend));
        }
        for annotation in &scene.annotations {
            labels.extend(self.paint_annotation(&mut canvas, annotation, scene.background));
        }

        let mut image = canvas.into_image()?;
        for label in &labels {
            if let Some(font) = self.fonts.face(label.bold) {
                text::draw_block(
                    &mut image,
                    font,
                    &label.text,
                    label.size,
                    label.left,
                    label.top,
                    label.align,
                    label.color,
                );
            }
        }

        debug!(
            hazard = %scene.hazard_name,
            steps = scene.steps.len(),
            labels = labels.len(),
            "Rasterized map"
        );

        Ok(image)
    }

    /// Points to pixels.
    fn px(&self, points: f32) -> f32 {
        points * self.options.dpi / 72.0
    }

    fn measure(&self, text: &str, size: f32, bold: bool) -> TextExtent {
        text::measure(self.fonts.face(bold), text, size)
    }

    /// Paint the annotation's box and return its text for the glyph pass.
    fn paint_annotation(
        &self,
        canvas: &mut Canvas,
        annotation: &TextAnnotation,
        background: Color,
    ) -> Option<PlacedText> {
        let size = self.px(annotation.font_size);
        let extent = self.measure(&annotation.text, size, annotation.bold);
        let (x, y) = canvas.plot.relative(annotation.x, annotation.y);

        let left = match annotation.h_align {
            HAlign::Left => x,
            HAlign::Center => x - extent.width / 2.0,
            HAlign::Right => x - extent.width,
        };
        let top = match annotation.v_align {
            VAlign::Top => y,
            VAlign::Center => y - extent.height / 2.0,
            VAlign::Bottom => y - extent.height,
        };

        let mut under = background;
        if let Some(text_box) = &annotation.text_box {
            let pad = text_box.padding * size;
            let radius = if text_box.rounded { pad } else { 0.0 };
            canvas.draw_box(
                left - pad,
                top - pad,
                extent.width + 2.0 * pad,
                extent.height + 2.0 * pad,
                radius,
                text_box.fill,
                text_box.edge,
                self.px(1.0),
            );
            if !text_box.fill.is_transparent() {
                under = text_box.fill.blend_over(background);
            }
        }

        if annotation.color.is_transparent() {
            return None;
        }

        let color = annotation.color.blend_over(under);
        Some(PlacedText {
            text: annotation.text.clone(),
            size,
            bold: annotation.bold,
            left,
            top,
            align: annotation.h_align,
            color: [color.r, color.g, color.b],
        })
    }

    /// Paint the legend frame and swatches; return title and entry labels.
    fn paint_legend(&self, canvas: &mut Canvas, legend: &Legend) -> Vec<PlacedText> {
        let size = self.px(legend.font_size);
        let title_size = self.px(legend.title_font_size);
        let pad = 0.4 * size;
        let handle_length = 2.0 * size;
        let handle_height = 0.7 * size;
        let handle_gap = 0.8 * size;
        let row_gap = 0.5 * size;

        let title = self.measure(&legend.title, title_size, false);
        let rows: Vec<TextExtent> = legend
            .entries
            .iter()
            .map(|e| self.measure(&e.label, size, false))
            .collect();

        let content_width = rows
            .iter()
            .map(|r| handle_length + handle_gap + r.width)
            .fold(title.width, f32::max);
        let content_height = title.height
            + rows.iter().map(|r| r.height.max(handle_height) + row_gap).sum::<f32>();

        let width = content_width + 2.0 * pad;
        let height = content_height + 2.0 * pad;
        let (left, bottom) = canvas.plot.relative(legend.anchor.0, legend.anchor.1);
        let top = bottom - height;

        canvas.draw_box(
            left,
            top,
            width,
            height,
            0.2 * size,
            LEGEND_FILL,
            Some(LEGEND_EDGE),
            self.px(1.0),
        );

        let mut labels = vec![PlacedText {
            text: legend.title.clone(),
            size: title_size,
            bold: false,
            left: left + (width - title.width) / 2.0,
            top: top + pad,
            align: HAlign::Center,
            color: [0, 0, 0],
        }];

        let mut row_top = top + pad + title.height + row_gap;
        for (entry, extent) in legend.entries.iter().zip(&rows) {
            let row_height = extent.height.max(handle_height);
            canvas.draw_box(
                left + pad,
                row_top + (row_height - handle_height) / 2.0,
                handle_length,
                handle_height,
                0.0,
                entry.color,
                None,
                0.0,
            );
            labels.push(PlacedText {
                text: entry.label.clone(),
                size,
                bold: false,
                left: left + pad + handle_length + handle_gap,
                top: row_top + (row_height - extent.height) / 2.0,
                align: HAlign::Left,
                color: [0, 0, 0],
            });
            row_top += row_height + row_gap;
        }

        labels
    }
}

/// Text waiting for the glyph pass.
#[derive(Debug, Clone)]
struct PlacedText {
    text: String,
    size: f32,
    bold: bool,
    left: f32,
    top: f32,
    align: HAlign,
    color: [u8; 3],
}

/// Per-map drawing surface. Dropped at the end of each render.
struct Canvas {
    pixmap: Pixmap,
    plot: PlotArea,
    clip: Mask,
}

impl Canvas {
    fn new(width: u32, height: u32, plot: PlotArea) -> Result<Self, RenderError> {
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Canvas { width, height })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let mut clip = Mask::new(width, height).ok_or(RenderError::Canvas { width, height })?;
        let rect = plot.rect().ok_or(RenderError::DegenerateView)?;
        clip.fill_path(
            &PathBuilder::from_rect(rect),
            FillRule::Winding,
            false,
            Transform::identity(),
        );

        Ok(Self { pixmap, plot, clip })
    }

    fn fill_plot(&mut self, color: Color) {
        if let Some(rect) = self.plot.rect() {
            self.pixmap
                .fill_rect(rect, &paint(color), Transform::identity(), None);
        }
    }

    fn stroke_frame(&mut self, width: f32) {
        if let Some(rect) = self.plot.rect() {
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(
                &PathBuilder::from_rect(rect),
                &paint(Color::BLACK),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }

    /// Fill then outline every geometry of the step, clipped to the plot.
    fn draw_step(&mut self, step: &DrawStep<'_>, pixels_per_point: f32) {
        let fill = step.style.fill.filter(|c| !c.is_transparent()).map(paint);
        let edge = step
            .style
            .edge
            .filter(|c| !c.is_transparent() && step.style.line_width > 0.0)
            .map(paint);
        let stroke = Stroke {
            width: step.style.line_width * pixels_per_point,
            ..Stroke::default()
        };

        for geometry in &step.geometries {
            let Some(path) = polygon_path(geometry, &self.plot) else {
                continue;
            };
            if let Some(fill) = &fill {
                self.pixmap.fill_path(
                    &path,
                    fill,
                    FillRule::EvenOdd,
                    Transform::identity(),
                    Some(&self.clip),
                );
            }
            if let Some(edge) = &edge {
                self.pixmap
                    .stroke_path(&path, edge, &stroke, Transform::identity(), Some(&self.clip));
            }
        }
    }

    /// A filled, optionally outlined and rounded box. Not clipped.
    #[allow(clippy::too_many_arguments)]
    fn draw_box(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        fill: Color,
        edge: Option<Color>,
        line_width: f32,
    ) {
        let Some(path) = rounded_rect(x, y, width, height, radius) else {
            return;
        };
        if !fill.is_transparent() {
            self.pixmap.fill_path(
                &path,
                &paint(fill),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        if let Some(edge) = edge.filter(|c| !c.is_transparent() && line_width > 0.0) {
            let stroke = Stroke {
                width: line_width,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(edge), &stroke, Transform::identity(), None);
        }
    }

    /// The canvas starts opaque, so premultiplied and straight RGBA agree.
    fn into_image(self) -> Result<RgbaImage, RenderError> {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        RgbaImage::from_raw(width, height, self.pixmap.take())
            .ok_or(RenderError::Canvas { width, height })
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

/// One subpath per ring; holes are cut by the even-odd rule.
fn polygon_path(geometry: &MultiPolygon<f64>, plot: &PlotArea) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for polygon in &geometry.0 {
        push_ring(&mut pb, polygon.exterior(), plot);
        for ring in polygon.interiors() {
            push_ring(&mut pb, ring, plot);
        }
    }
    pb.finish()
}

fn push_ring(pb: &mut PathBuilder, ring: &LineString<f64>, plot: &PlotArea) {
    if ring.0.len() < 3 {
        return;
    }
    let mut points = ring
        .0
        .iter()
        .filter(|c| c.x.is_finite() && c.y.is_finite())
        .map(|c| plot.project(c.x, c.y));

    if let Some((x, y)) = points.next() {
        pb.move_to(x, y);
        for (x, y) in points {
            pb.line_to(x, y);
        }
        pb.close();
    }
}

/// `None` when either side is not positive.
fn rounded_rect(x: f32, y: f32, width: f32, height: f32, radius: f32) -> Option<Path> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }
    let r = radius.min(width / 2.0).min(height / 2.0);
    if r <= 0.0 {
        return Rect::from_xywh(x, y, width, height).map(PathBuilder::from_rect);
    }

    let (right, bottom) = (x + width, y + height);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.quad_to(right, y, right, y + r);
    pb.line_to(right, bottom - r);
    pb.quad_to(right, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.quad_to(x, bottom, x, bottom - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}
