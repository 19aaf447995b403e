//! Text measurement and glyph drawing.

use composer::HAlign;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};

/// Line advance as a multiple of the font size.
const LINE_SPACING: f32 = 1.2;

/// Glyph width estimate used when no font is loaded.
const FALLBACK_ADVANCE: f32 = 0.6;

/// Pixel extent of a (possibly multi-line) text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TextExtent {
    pub width: f32,
    pub height: f32,
}

pub(crate) fn measure(font: Option<&Font<'_>>, text: &str, size: f32) -> TextExtent {
    let lines = text.split('\n').count().max(1);
    let width = text
        .split('\n')
        .map(|line| line_width(font, line, size))
        .fold(0.0f32, f32::max);

    TextExtent {
        width,
        height: size * (1.0 + LINE_SPACING * (lines - 1) as f32),
    }
}

fn line_width(font: Option<&Font<'_>>, line: &str, size: f32) -> f32 {
    let Some(font) = font else {
        return line.chars().count() as f32 * size * FALLBACK_ADVANCE;
    };

    let scale = Scale::uniform(size);
    font.layout(line, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// Draw `text` with its block's top-left corner at (`left`, `top`).
///
/// Lines are aligned inside the block per `align`. `color` must already be
/// opaque; glyph coverage is blended with whatever is on the canvas.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_block(
    image: &mut RgbaImage,
    font: &Font<'_>,
    text: &str,
    size: f32,
    left: f32,
    top: f32,
    align: HAlign,
    color: [u8; 3],
) {
    let block = measure(Some(font), text, size);
    let scale = Scale::uniform(size);
    let pixel = Rgba([color[0], color[1], color[2], 255]);

    for (i, line) in text.split('\n').enumerate() {
        let width = line_width(Some(font), line, size);
        let x = match align {
            HAlign::Left => left,
            HAlign::Center => left + (block.width - width) / 2.0,
            HAlign::Right => left + block.width - width,
        };
        let y = top + i as f32 * size * LINE_SPACING;
        draw_text_mut(image, pixel, x.round() as i32, y.round() as i32, scale, font, line);
    }
}
