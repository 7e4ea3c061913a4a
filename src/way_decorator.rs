use std::sync::Arc;

use crate::graphics::{Bitmap, Paint};
use crate::render_elements::{Point, SymbolContainer, WayTextContainer};

// Margin kept from every segment end before a symbol is emitted, and the
// distance into the first segment where emission starts.
const SEGMENT_SAFETY_DISTANCE: f64 = 30.0;
const DISTANCE_BETWEEN_SYMBOLS: f64 = 200.0;
const DISTANCE_BETWEEN_WAY_NAMES: f64 = 500.0;
// A name needs this much spare room on its segment.
const WAY_NAME_PADDING: f64 = 10.0;

/// Emits `symbol` repeatedly along `coordinates`, rotated into the direction
/// of travel. With `repeat` unset only the first position is emitted.
pub fn render_symbol(
    symbol: &Arc<Bitmap>,
    align_center: bool,
    repeat: bool,
    coordinates: &[(f64, f64)],
    way_symbols: &mut Vec<SymbolContainer>,
) {
    let mut distance_into_segment = SEGMENT_SAFETY_DISTANCE;

    for window in coordinates.windows(2) {
        let (x1, y1) = window[0];
        let (x2, y2) = window[1];
        let segment_length = (x2 - x1).hypot(y2 - y1);

        while distance_into_segment <= segment_length - SEGMENT_SAFETY_DISTANCE {
            let fraction = distance_into_segment / segment_length;
            let point = Point::new(x1 + (x2 - x1) * fraction, y1 + (y2 - y1) * fraction);
            let rotation = (y2 - y1).atan2(x2 - x1) as f32;
            way_symbols.push(SymbolContainer::rotated(
                Arc::clone(symbol),
                point,
                align_center,
                rotation,
            ));

            if !repeat {
                return;
            }
            distance_into_segment += DISTANCE_BETWEEN_SYMBOLS;
        }

        distance_into_segment -= segment_length;
        if distance_into_segment < 0.0 {
            distance_into_segment = 0.0;
        }
    }
}

/// Emits a way name on every segment long enough to hold it, skipping ahead
/// after each emission so repeated names stay apart.
pub fn render_text(
    text: &str,
    fill: &Paint,
    stroke: Option<&Paint>,
    coordinates: &[(f64, f64)],
    way_names: &mut Vec<WayTextContainer>,
) {
    let measuring = stroke.unwrap_or(fill);
    let text_width = measuring.get_text_width(text);
    let mut skip = 0.0;

    for window in coordinates.windows(2) {
        let (x1, y1) = window[0];
        let (x2, y2) = window[1];
        let segment_length = (x2 - x1).hypot(y2 - y1);

        if skip > 0.0 {
            skip -= segment_length;
            continue;
        }
        if segment_length >= text_width + WAY_NAME_PADDING {
            // The halo is a second container drawn first.
            if let Some(back) = stroke {
                way_names.push(WayTextContainer::new(text, back.clone(), x1, y1, x2, y2));
            }
            way_names.push(WayTextContainer::new(text, fill.clone(), x1, y1, x2, y2));
            skip = DISTANCE_BETWEEN_WAY_NAMES;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_symbol() -> Arc<Bitmap> {
        Arc::new(Bitmap::filled(8, 8, 0xff000000))
    }

    #[test]
    fn short_segment_emits_nothing() {
        let mut out = Vec::new();
        render_symbol(
            &test_symbol(),
            false,
            true,
            &[(0.0, 0.0), (59.0, 0.0)],
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn long_segment_repeats_every_two_hundred_pixels() {
        let mut out = Vec::new();
        render_symbol(
            &test_symbol(),
            false,
            true,
            &[(0.0, 0.0), (500.0, 0.0)],
            &mut out,
        );
        let positions: Vec<f64> = out.iter().map(|s| s.point.x).collect();
        assert_eq!(positions, vec![30.0, 230.0, 430.0]);
    }

    #[test]
    fn non_repeating_symbol_emits_once() {
        let mut out = Vec::new();
        render_symbol(
            &test_symbol(),
            true,
            false,
            &[(0.0, 0.0), (500.0, 0.0)],
            &mut out,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].point.x, 30.0);
    }

    #[test]
    fn symbol_rotation_follows_direction_of_travel() {
        let mut out = Vec::new();
        render_symbol(
            &test_symbol(),
            true,
            false,
            &[(0.0, 0.0), (0.0, 300.0)],
            &mut out,
        );
        assert!((out[0].rotation - std::f64::consts::FRAC_PI_2 as f32).abs() < 1e-6);
    }

    #[test]
    fn way_name_needs_room_on_its_segment() {
        let paint = Paint::fill(0xff000000).with_text_size(10.0);
        let mut out = Vec::new();
        // "Elm" is 30 px wide; the first segment is too short.
        render_text("Elm", &paint, None, &[(0.0, 0.0), (35.0, 0.0)], &mut out);
        assert!(out.is_empty());
        render_text("Elm", &paint, None, &[(0.0, 0.0), (45.0, 0.0)], &mut out);
        assert_eq!(out.len(), 1);
    }
}
