use std::io;

use crate::errors::{MapRenderError, Result};

/// Paint style for shapes; text always fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Fill,
    Stroke,
}

/// Drawing attributes. Color is ARGB, one `u32` per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: u32,
    pub stroke_width: f32,
    pub text_size: f32,
    pub style: Style,
}

impl Paint {
    pub fn fill(color: u32) -> Self {
        Self {
            color,
            stroke_width: 0.0,
            text_size: FONT_GLYPH_SIZE as f32,
            style: Style::Fill,
        }
    }

    pub fn stroke(color: u32, stroke_width: f32) -> Self {
        Self {
            color,
            stroke_width,
            text_size: FONT_GLYPH_SIZE as f32,
            style: Style::Stroke,
        }
    }

    pub fn with_text_size(mut self, text_size: f32) -> Self {
        self.text_size = text_size;
        self
    }

    /// Advance width of `text` when drawn with this paint.
    pub fn get_text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.text_size as f64
    }

    pub fn get_text_height(&self) -> f64 {
        self.text_size as f64
    }
}

/// ARGB pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: i32,
    height: i32,
    pixels: Vec<u32>,
}

impl Bitmap {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width.max(0) * height.max(0)) as usize],
        }
    }

    pub fn filled(width: i32, height: i32, color: u32) -> Self {
        let mut bitmap = Self::new(width, height);
        bitmap.pixels.fill(color);
        bitmap
    }

    /// Wraps an existing ARGB pixel buffer; `pixels` must hold
    /// `width * height` entries.
    pub fn from_pixels(width: i32, height: i32, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> u32 {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Encodes the bitmap as an RGBA8 PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, self.width as u32, self.height as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|err| MapRenderError::IoFailure(io::Error::other(err)))?;

        let mut data = Vec::with_capacity(self.pixels.len() * 4);
        for &pixel in &self.pixels {
            data.push((pixel >> 16) as u8);
            data.push((pixel >> 8) as u8);
            data.push(pixel as u8);
            data.push((pixel >> 24) as u8);
        }
        writer
            .write_image_data(&data)
            .map_err(|err| MapRenderError::IoFailure(io::Error::other(err)))?;
        writer
            .finish()
            .map_err(|err| MapRenderError::IoFailure(io::Error::other(err)))?;
        Ok(out)
    }

    /// Decodes an RGBA8 PNG produced by [`Bitmap::encode_png`].
    pub fn decode_png(bytes: &[u8]) -> Result<Self> {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder
            .read_info()
            .map_err(|err| MapRenderError::CacheCorruption(err.to_string()))?;
        let mut data = vec![0; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut data)
            .map_err(|err| MapRenderError::CacheCorruption(err.to_string()))?;
        if info.color_type != png::ColorType::Rgba || info.bit_depth != png::BitDepth::Eight {
            return Err(MapRenderError::CacheCorruption(format!(
                "unexpected pixel format: {:?}/{:?}",
                info.color_type, info.bit_depth
            )));
        }

        let mut pixels = Vec::with_capacity((info.width * info.height) as usize);
        for chunk in data[..info.buffer_size()].chunks_exact(4) {
            pixels.push(
                ((chunk[3] as u32) << 24)
                    | ((chunk[0] as u32) << 16)
                    | ((chunk[1] as u32) << 8)
                    | chunk[2] as u32,
            );
        }
        Ok(Self {
            width: info.width as i32,
            height: info.height as i32,
            pixels,
        })
    }
}

/// Software rasterizer over a [`Bitmap`].
pub struct Canvas {
    bitmap: Bitmap,
}

impl Canvas {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            bitmap: Bitmap::new(width, height),
        }
    }

    pub fn width(&self) -> i32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> i32 {
        self.bitmap.height()
    }

    pub fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }

    pub fn fill_color(&mut self, color: u32) {
        self.bitmap.pixels.fill(color);
    }

    /// Bresenham line with square caps of the paint's stroke width.
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, paint: &Paint) {
        let (mut x, mut y) = (x0.round() as i32, y0.round() as i32);
        let (x1, y1) = (x1.round() as i32, y1.round() as i32);

        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let thickness = (paint.stroke_width.max(1.0) as i32 - 1) / 2;

        loop {
            for oy in -thickness..=thickness {
                for ox in -thickness..=thickness {
                    self.bitmap.set_pixel(x + ox, y + oy, paint.color);
                }
            }

            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                if x == x1 {
                    break;
                }
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                if y == y1 {
                    break;
                }
                err += dx;
                y += sy;
            }
        }
    }

    pub fn draw_polyline(&mut self, points: &[(f64, f64)], paint: &Paint) {
        for window in points.windows(2) {
            self.draw_line(window[0].0, window[0].1, window[1].0, window[1].1, paint);
        }
    }

    /// Even-odd scanline fill.
    pub fn fill_polygon(&mut self, points: &[(f64, f64)], paint: &Paint) {
        if points.len() < 3 {
            return;
        }

        let min_y = points
            .iter()
            .map(|p| p.1)
            .fold(f64::INFINITY, f64::min)
            .floor()
            .max(0.0) as i32;
        let max_y = points
            .iter()
            .map(|p| p.1)
            .fold(f64::NEG_INFINITY, f64::max)
            .ceil()
            .min(self.bitmap.height as f64 - 1.0) as i32;

        let mut nodes = Vec::new();
        for y in min_y..=max_y {
            nodes.clear();
            let scan = y as f64 + 0.5;
            for i in 0..points.len() {
                let (x1, y1) = points[i];
                let (x2, y2) = points[(i + 1) % points.len()];
                if (y1 <= scan && y2 > scan) || (y2 <= scan && y1 > scan) {
                    nodes.push(x1 + (scan - y1) * (x2 - x1) / (y2 - y1));
                }
            }
            nodes.sort_by(|a, b| a.total_cmp(b));

            for pair in nodes.chunks_exact(2) {
                let start_x = pair[0].round().max(0.0) as i32;
                let end_x = pair[1].round().min(self.bitmap.width as f64 - 1.0) as i32;
                for x in start_x..=end_x {
                    self.bitmap.set_pixel(x, y, paint.color);
                }
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, paint: &Paint) {
        let r = radius.ceil() as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                if (dx * dx + dy * dy) as f64 <= radius * radius {
                    self.bitmap
                        .set_pixel(cx.round() as i32 + dx, cy.round() as i32 + dy, paint.color);
                }
            }
        }
    }

    pub fn draw_circle(&mut self, cx: f64, cy: f64, radius: f64, paint: &Paint) {
        let inner = (radius - paint.stroke_width.max(1.0) as f64).max(0.0);
        let r = radius.ceil() as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                let distance_squared = (dx * dx + dy * dy) as f64;
                if distance_squared <= radius * radius && distance_squared >= inner * inner {
                    self.bitmap
                        .set_pixel(cx.round() as i32 + dx, cy.round() as i32 + dy, paint.color);
                }
            }
        }
    }

    /// Blits `symbol` with its top-left corner at `(x, y)`. A non-zero
    /// `rotation` (radians) rotates the symbol about its center using inverse
    /// nearest-neighbor sampling. Fully transparent source pixels are skipped.
    pub fn draw_bitmap(&mut self, symbol: &Bitmap, x: f64, y: f64, rotation: f32) {
        if rotation == 0.0 {
            let (ox, oy) = (x.round() as i32, y.round() as i32);
            for sy in 0..symbol.height() {
                for sx in 0..symbol.width() {
                    let pixel = symbol.get_pixel(sx, sy);
                    if pixel >> 24 != 0 {
                        self.bitmap.set_pixel(ox + sx, oy + sy, pixel);
                    }
                }
            }
            return;
        }

        let (sin, cos) = (rotation as f64).sin_cos();
        let (half_w, half_h) = (symbol.width() as f64 / 2.0, symbol.height() as f64 / 2.0);
        let (center_x, center_y) = (x + half_w, y + half_h);
        let radius = half_w.hypot(half_h).ceil() as i32;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                // Inverse rotation back into the symbol's frame.
                let sx = dx as f64 * cos + dy as f64 * sin + half_w;
                let sy = -(dx as f64) * sin + dy as f64 * cos + half_h;
                if sx < 0.0 || sy < 0.0 {
                    continue;
                }
                let pixel = symbol.get_pixel(sx as i32, sy as i32);
                if pixel >> 24 != 0 {
                    self.bitmap.set_pixel(
                        (center_x + dx as f64).round() as i32,
                        (center_y + dy as f64).round() as i32,
                        pixel,
                    );
                }
            }
        }
    }

    /// Draws `text` with its baseline at `(x, y)`, optionally haloed by
    /// `paint_back`.
    pub fn draw_text(&mut self, text: &str, x: f64, y: f64, paint_front: &Paint, paint_back: Option<&Paint>) {
        if let Some(back) = paint_back {
            for (ox, oy) in [(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)] {
                self.draw_glyph_run(text, x + ox, y + oy, back);
            }
        }
        self.draw_glyph_run(text, x, y, paint_front);
    }

    fn draw_glyph_run(&mut self, text: &str, x: f64, y: f64, paint: &Paint) {
        let scale = paint.text_size as f64 / FONT_GLYPH_SIZE as f64;
        let top = y - paint.get_text_height();
        let mut pen_x = x;
        for character in text.chars() {
            self.draw_glyph(character, pen_x, top, scale, paint.color);
            pen_x += paint.text_size as f64;
        }
    }

    fn draw_glyph(&mut self, character: char, x: f64, y: f64, scale: f64, color: u32) {
        let index = character as usize;
        let glyph = if (0x20..0x80).contains(&index) {
            &FONT_8X8[index - 0x20]
        } else {
            // Everything outside the basic ASCII range renders as a box.
            &FONT_8X8[0x7f - 0x20]
        };

        let size = (FONT_GLYPH_SIZE as f64 * scale).ceil() as i32;
        for py in 0..size {
            let row = glyph[(py as f64 / scale) as usize % FONT_GLYPH_SIZE];
            for px in 0..size {
                let bit = (px as f64 / scale) as usize % FONT_GLYPH_SIZE;
                if row & (1u8 << bit) != 0 {
                    self.bitmap
                        .set_pixel(x.round() as i32 + px, y.round() as i32 + py, color);
                }
            }
        }
    }
}

const FONT_GLYPH_SIZE: usize = 8;

// 8x8 ASCII glyphs (0x20..0x7F), one byte per row, LSB is the leftmost pixel.
static FONT_8X8: [[u8; 8]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x18, 0x3c, 0x3c, 0x18, 0x18, 0x00, 0x18, 0x00], // !
    [0x36, 0x36, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // "
    [0x36, 0x36, 0x7f, 0x36, 0x7f, 0x36, 0x36, 0x00], // #
    [0x0c, 0x3e, 0x03, 0x1e, 0x30, 0x1f, 0x0c, 0x00], // $
    [0x00, 0x63, 0x33, 0x18, 0x0c, 0x66, 0x63, 0x00], // %
    [0x1c, 0x36, 0x1c, 0x6e, 0x3b, 0x33, 0x6e, 0x00], // &
    [0x06, 0x06, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00], // '
    [0x18, 0x0c, 0x06, 0x06, 0x06, 0x0c, 0x18, 0x00], // (
    [0x06, 0x0c, 0x18, 0x18, 0x18, 0x0c, 0x06, 0x00], // )
    [0x00, 0x66, 0x3c, 0xff, 0x3c, 0x66, 0x00, 0x00], // *
    [0x00, 0x0c, 0x0c, 0x3f, 0x0c, 0x0c, 0x00, 0x00], // +
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x0c, 0x06], // ,
    [0x00, 0x00, 0x00, 0x3f, 0x00, 0x00, 0x00, 0x00], // -
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x0c, 0x00], // .
    [0x60, 0x30, 0x18, 0x0c, 0x06, 0x03, 0x01, 0x00], // /
    [0x3e, 0x63, 0x73, 0x7b, 0x6f, 0x67, 0x3e, 0x00], // 0
    [0x0c, 0x0e, 0x0c, 0x0c, 0x0c, 0x0c, 0x3f, 0x00], // 1
    [0x1e, 0x33, 0x30, 0x1c, 0x06, 0x33, 0x3f, 0x00], // 2
    [0x1e, 0x33, 0x30, 0x1c, 0x30, 0x33, 0x1e, 0x00], // 3
    [0x38, 0x3c, 0x36, 0x33, 0x7f, 0x30, 0x78, 0x00], // 4
    [0x3f, 0x03, 0x1f, 0x30, 0x30, 0x33, 0x1e, 0x00], // 5
    [0x1c, 0x06, 0x03, 0x1f, 0x33, 0x33, 0x1e, 0x00], // 6
    [0x3f, 0x33, 0x30, 0x18, 0x0c, 0x0c, 0x0c, 0x00], // 7
    [0x1e, 0x33, 0x33, 0x1e, 0x33, 0x33, 0x1e, 0x00], // 8
    [0x1e, 0x33, 0x33, 0x3e, 0x30, 0x18, 0x0e, 0x00], // 9
    [0x00, 0x0c, 0x0c, 0x00, 0x00, 0x0c, 0x0c, 0x00], // :
    [0x00, 0x0c, 0x0c, 0x00, 0x00, 0x0c, 0x0c, 0x06], // ;
    [0x18, 0x0c, 0x06, 0x03, 0x06, 0x0c, 0x18, 0x00], // <
    [0x00, 0x00, 0x3f, 0x00, 0x00, 0x3f, 0x00, 0x00], // =
    [0x06, 0x0c, 0x18, 0x30, 0x18, 0x0c, 0x06, 0x00], // >
    [0x1e, 0x33, 0x30, 0x18, 0x0c, 0x00, 0x0c, 0x00], // ?
    [0x3e, 0x63, 0x7b, 0x7b, 0x7b, 0x03, 0x1e, 0x00], // @
    [0x0c, 0x1e, 0x33, 0x33, 0x3f, 0x33, 0x33, 0x00], // A
    [0x3f, 0x66, 0x66, 0x3e, 0x66, 0x66, 0x3f, 0x00], // B
    [0x3c, 0x66, 0x03, 0x03, 0x03, 0x66, 0x3c, 0x00], // C
    [0x1f, 0x36, 0x66, 0x66, 0x66, 0x36, 0x1f, 0x00], // D
    [0x7f, 0x46, 0x16, 0x1e, 0x16, 0x46, 0x7f, 0x00], // E
    [0x7f, 0x46, 0x16, 0x1e, 0x16, 0x06, 0x0f, 0x00], // F
    [0x3c, 0x66, 0x03, 0x03, 0x73, 0x66, 0x7c, 0x00], // G
    [0x33, 0x33, 0x33, 0x3f, 0x33, 0x33, 0x33, 0x00], // H
    [0x1e, 0x0c, 0x0c, 0x0c, 0x0c, 0x0c, 0x1e, 0x00], // I
    [0x78, 0x30, 0x30, 0x30, 0x33, 0x33, 0x1e, 0x00], // J
    [0x67, 0x66, 0x36, 0x1e, 0x36, 0x66, 0x67, 0x00], // K
    [0x0f, 0x06, 0x06, 0x06, 0x46, 0x66, 0x7f, 0x00], // L
    [0x63, 0x77, 0x7f, 0x7f, 0x6b, 0x63, 0x63, 0x00], // M
    [0x63, 0x67, 0x6f, 0x7b, 0x73, 0x63, 0x63, 0x00], // N
    [0x1c, 0x36, 0x63, 0x63, 0x63, 0x36, 0x1c, 0x00], // O
    [0x3f, 0x66, 0x66, 0x3e, 0x06, 0x06, 0x0f, 0x00], // P
    [0x1e, 0x33, 0x33, 0x33, 0x3b, 0x1e, 0x38, 0x00], // Q
    [0x3f, 0x66, 0x66, 0x3e, 0x36, 0x66, 0x67, 0x00], // R
    [0x1e, 0x33, 0x07, 0x0e, 0x38, 0x33, 0x1e, 0x00], // S
    [0x3f, 0x2d, 0x0c, 0x0c, 0x0c, 0x0c, 0x1e, 0x00], // T
    [0x33, 0x33, 0x33, 0x33, 0x33, 0x33, 0x3f, 0x00], // U
    [0x33, 0x33, 0x33, 0x33, 0x33, 0x1e, 0x0c, 0x00], // V
    [0x63, 0x63, 0x63, 0x6b, 0x7f, 0x77, 0x63, 0x00], // W
    [0x63, 0x63, 0x36, 0x1c, 0x1c, 0x36, 0x63, 0x00], // X
    [0x33, 0x33, 0x33, 0x1e, 0x0c, 0x0c, 0x1e, 0x00], // Y
    [0x7f, 0x63, 0x31, 0x18, 0x4c, 0x66, 0x7f, 0x00], // Z
    [0x1e, 0x06, 0x06, 0x06, 0x06, 0x06, 0x1e, 0x00], // [
    [0x03, 0x06, 0x0c, 0x18, 0x30, 0x60, 0x40, 0x00], // backslash
    [0x1e, 0x18, 0x18, 0x18, 0x18, 0x18, 0x1e, 0x00], // ]
    [0x08, 0x1c, 0x36, 0x63, 0x00, 0x00, 0x00, 0x00], // ^
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff], // _
    [0x0c, 0x0c, 0x18, 0x00, 0x00, 0x00, 0x00, 0x00], // `
    [0x00, 0x00, 0x1e, 0x30, 0x3e, 0x33, 0x6e, 0x00], // a
    [0x07, 0x06, 0x06, 0x3e, 0x66, 0x66, 0x3b, 0x00], // b
    [0x00, 0x00, 0x1e, 0x33, 0x03, 0x33, 0x1e, 0x00], // c
    [0x38, 0x30, 0x30, 0x3e, 0x33, 0x33, 0x6e, 0x00], // d
    [0x00, 0x00, 0x1e, 0x33, 0x3f, 0x03, 0x1e, 0x00], // e
    [0x1c, 0x36, 0x06, 0x0f, 0x06, 0x06, 0x0f, 0x00], // f
    [0x00, 0x00, 0x6e, 0x33, 0x33, 0x3e, 0x30, 0x1f], // g
    [0x07, 0x06, 0x36, 0x6e, 0x66, 0x66, 0x67, 0x00], // h
    [0x0c, 0x00, 0x0e, 0x0c, 0x0c, 0x0c, 0x1e, 0x00], // i
    [0x30, 0x00, 0x30, 0x30, 0x30, 0x33, 0x33, 0x1e], // j
    [0x07, 0x06, 0x66, 0x36, 0x1e, 0x36, 0x67, 0x00], // k
    [0x0e, 0x0c, 0x0c, 0x0c, 0x0c, 0x0c, 0x1e, 0x00], // l
    [0x00, 0x00, 0x33, 0x7f, 0x7f, 0x6b, 0x63, 0x00], // m
    [0x00, 0x00, 0x1f, 0x33, 0x33, 0x33, 0x33, 0x00], // n
    [0x00, 0x00, 0x1e, 0x33, 0x33, 0x33, 0x1e, 0x00], // o
    [0x00, 0x00, 0x3b, 0x66, 0x66, 0x3e, 0x06, 0x0f], // p
    [0x00, 0x00, 0x6e, 0x33, 0x33, 0x3e, 0x30, 0x78], // q
    [0x00, 0x00, 0x3b, 0x6e, 0x66, 0x06, 0x0f, 0x00], // r
    [0x00, 0x00, 0x3e, 0x03, 0x1e, 0x30, 0x1f, 0x00], // s
    [0x08, 0x0c, 0x3e, 0x0c, 0x0c, 0x2c, 0x18, 0x00], // t
    [0x00, 0x00, 0x33, 0x33, 0x33, 0x33, 0x6e, 0x00], // u
    [0x00, 0x00, 0x33, 0x33, 0x33, 0x1e, 0x0c, 0x00], // v
    [0x00, 0x00, 0x63, 0x6b, 0x7f, 0x7f, 0x36, 0x00], // w
    [0x00, 0x00, 0x63, 0x36, 0x1c, 0x36, 0x63, 0x00], // x
    [0x00, 0x00, 0x33, 0x33, 0x33, 0x3e, 0x30, 0x1f], // y
    [0x00, 0x00, 0x3f, 0x19, 0x0c, 0x26, 0x3f, 0x00], // z
    [0x38, 0x0c, 0x0c, 0x07, 0x0c, 0x0c, 0x38, 0x00], // {
    [0x18, 0x18, 0x18, 0x00, 0x18, 0x18, 0x18, 0x00], // |
    [0x07, 0x0c, 0x0c, 0x38, 0x0c, 0x0c, 0x07, 0x00], // }
    [0x6e, 0x3b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ~
    [0x7e, 0x42, 0x42, 0x42, 0x42, 0x42, 0x7e, 0x00], // replacement box
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trip() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_color(0xff00ff00);
        canvas.draw_line(0.0, 0.0, 3.0, 3.0, &Paint::stroke(0xffff0000, 1.0));
        let bitmap = canvas.into_bitmap();

        let encoded = bitmap.encode_png().unwrap();
        let decoded = Bitmap::decode_png(&encoded).unwrap();
        assert_eq!(decoded, bitmap);
    }

    #[test]
    fn decode_garbage_is_cache_corruption() {
        let result = Bitmap::decode_png(&[0x12, 0x34, 0x56]);
        assert!(matches!(
            result,
            Err(MapRenderError::CacheCorruption(_))
        ));
    }

    #[test]
    fn text_width_scales_with_text_size() {
        let paint = Paint::fill(0xff000000).with_text_size(10.0);
        assert_eq!(paint.get_text_width("abcd"), 40.0);
    }
}
