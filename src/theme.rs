use std::sync::Arc;

use crate::graphics::{Bitmap, Paint};
use crate::types::Tag;

/// The draw calls a theme can issue while matching one map element.
/// Implemented by the renderer's per-job context.
pub trait RenderCallback {
    fn render_area(&mut self, fill: Option<&Paint>, stroke: Option<&Paint>, level: usize);
    fn render_area_caption(
        &mut self,
        text: &str,
        vertical_offset: f32,
        fill: &Paint,
        stroke: Option<&Paint>,
    );
    fn render_area_symbol(&mut self, symbol: &Arc<Bitmap>);
    fn render_point_of_interest_caption(
        &mut self,
        text: &str,
        vertical_offset: f32,
        fill: &Paint,
        stroke: Option<&Paint>,
    );
    fn render_point_of_interest_circle(
        &mut self,
        radius: f32,
        fill: Option<&Paint>,
        stroke: Option<&Paint>,
        level: usize,
    );
    fn render_point_of_interest_symbol(&mut self, symbol: &Arc<Bitmap>);
    fn render_way(&mut self, stroke: &Paint, level: usize);
    fn render_way_symbol(&mut self, symbol: &Arc<Bitmap>, align_center: bool, repeat: bool);
    fn render_way_text(&mut self, text: &str, fill: &Paint, stroke: Option<&Paint>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Any,
    Node,
    Way,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closed {
    Any,
    Yes,
    No,
}

#[derive(Debug)]
enum RenderInstruction {
    Area {
        fill: Option<u32>,
        stroke: Option<(u32, f32)>,
        level: usize,
    },
    Caption {
        text_key: &'static str,
        vertical_offset: f32,
        font_size: f32,
        fill: u32,
        stroke: Option<u32>,
    },
    Circle {
        radius: f32,
        fill: Option<u32>,
        stroke: Option<(u32, f32)>,
        level: usize,
    },
    Line {
        color: u32,
        width: f32,
        level: usize,
    },
    LineSymbol {
        symbol: Arc<Bitmap>,
        align_center: bool,
        repeat: bool,
    },
    PathText {
        text_key: &'static str,
        font_size: f32,
        fill: u32,
        stroke: Option<u32>,
    },
    Symbol {
        symbol: Arc<Bitmap>,
    },
}

#[derive(Debug)]
struct Rule {
    element: Element,
    closed: Closed,
    zoom_min: u8,
    zoom_max: u8,
    keys: &'static [&'static str],
    values: &'static [&'static str],
    instructions: Vec<RenderInstruction>,
}

impl Rule {
    fn matches(&self, element: Element, closed: Closed, zoom_level: u8, tags: &[Tag]) -> bool {
        if self.element != Element::Any && element != Element::Any && self.element != element {
            return false;
        }
        if self.closed != Closed::Any && closed != Closed::Any && self.closed != closed {
            return false;
        }
        if zoom_level < self.zoom_min || zoom_level > self.zoom_max {
            return false;
        }
        tags.iter().any(|tag| {
            (self.keys.contains(&"*") || self.keys.contains(&tag.key.as_str()))
                && (self.values.contains(&"*") || self.values.contains(&tag.value.as_str()))
        })
    }
}

/// A compiled styling rule tree: matchers over element kind, closed-ness,
/// zoom range and tags, each carrying the draw instructions to emit through
/// the [`RenderCallback`].
#[derive(Debug)]
pub struct RenderTheme {
    background: u32,
    water: u32,
    levels: usize,
    rules: Vec<Rule>,
}

impl RenderTheme {
    pub fn background(&self) -> u32 {
        self.background
    }

    /// Fill for tiles the map file marks as pure water.
    pub fn water_background(&self) -> u32 {
        self.water
    }

    /// Number of drawing levels the rules address; the renderer sizes its
    /// buckets from this.
    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn match_way(
        &self,
        callback: &mut dyn RenderCallback,
        tags: &[Tag],
        zoom_level: u8,
        closed: bool,
        stroke_scale: f32,
        text_scale: f32,
    ) {
        let closed = if closed { Closed::Yes } else { Closed::No };
        for rule in &self.rules {
            if rule.matches(Element::Way, closed, zoom_level, tags) {
                for instruction in &rule.instructions {
                    self.execute(
                        instruction,
                        callback,
                        tags,
                        Element::Way,
                        stroke_scale,
                        text_scale,
                    );
                }
            }
        }
    }

    pub fn match_poi(
        &self,
        callback: &mut dyn RenderCallback,
        tags: &[Tag],
        zoom_level: u8,
        stroke_scale: f32,
        text_scale: f32,
    ) {
        for rule in &self.rules {
            if rule.matches(Element::Node, Closed::Any, zoom_level, tags) {
                for instruction in &rule.instructions {
                    self.execute(
                        instruction,
                        callback,
                        tags,
                        Element::Node,
                        stroke_scale,
                        text_scale,
                    );
                }
            }
        }
    }

    fn execute(
        &self,
        instruction: &RenderInstruction,
        callback: &mut dyn RenderCallback,
        tags: &[Tag],
        element: Element,
        stroke_scale: f32,
        text_scale: f32,
    ) {
        match instruction {
            RenderInstruction::Area {
                fill,
                stroke,
                level,
            } => {
                let fill = fill.map(Paint::fill);
                let stroke =
                    stroke.map(|(color, width)| Paint::stroke(color, width * stroke_scale));
                callback.render_area(fill.as_ref(), stroke.as_ref(), *level);
            }
            RenderInstruction::Caption {
                text_key,
                vertical_offset,
                font_size,
                fill,
                stroke,
            } => {
                let Some(text) = tag_value(tags, text_key) else {
                    return;
                };
                let front = Paint::fill(*fill).with_text_size(font_size * text_scale);
                let back =
                    stroke.map(|color| Paint::fill(color).with_text_size(font_size * text_scale));
                if element == Element::Way {
                    callback.render_area_caption(text, *vertical_offset, &front, back.as_ref());
                } else {
                    callback.render_point_of_interest_caption(
                        text,
                        *vertical_offset,
                        &front,
                        back.as_ref(),
                    );
                }
            }
            RenderInstruction::Circle {
                radius,
                fill,
                stroke,
                level,
            } => {
                let fill = fill.map(Paint::fill);
                let stroke =
                    stroke.map(|(color, width)| Paint::stroke(color, width * stroke_scale));
                callback.render_point_of_interest_circle(
                    *radius,
                    fill.as_ref(),
                    stroke.as_ref(),
                    *level,
                );
            }
            RenderInstruction::Line {
                color,
                width,
                level,
            } => {
                callback.render_way(&Paint::stroke(*color, width * stroke_scale), *level);
            }
            RenderInstruction::LineSymbol {
                symbol,
                align_center,
                repeat,
            } => {
                callback.render_way_symbol(symbol, *align_center, *repeat);
            }
            RenderInstruction::PathText {
                text_key,
                font_size,
                fill,
                stroke,
            } => {
                let Some(text) = tag_value(tags, text_key) else {
                    return;
                };
                let front = Paint::fill(*fill).with_text_size(font_size * text_scale);
                let back =
                    stroke.map(|color| Paint::fill(color).with_text_size(font_size * text_scale));
                callback.render_way_text(text, &front, back.as_ref());
            }
            RenderInstruction::Symbol { symbol } => {
                if element == Element::Way {
                    callback.render_area_symbol(symbol);
                } else {
                    callback.render_point_of_interest_symbol(symbol);
                }
            }
        }
    }

    /// The built-in style: a small OSM-flavored rule list covering water,
    /// landuse, buildings, the road hierarchy, railways and a handful of
    /// captioned points.
    pub fn built_in() -> Self {
        let water_icon = circle_icon(14, 0xff3388cc);
        let peak_icon = circle_icon(12, 0xff886644);
        let town_icon = circle_icon(10, 0xffcc4444);
        let oneway_arrow = square_icon(12, 0xff666666);

        let rules = vec![
            Rule {
                element: Element::Way,
                closed: Closed::Yes,
                zoom_min: 0,
                zoom_max: 22,
                keys: &["natural", "waterway"],
                values: &["water", "sea", "riverbank"],
                instructions: vec![RenderInstruction::Area {
                    fill: Some(0xffb3ddff),
                    stroke: None,
                    level: 1,
                }],
            },
            Rule {
                element: Element::Way,
                closed: Closed::Yes,
                zoom_min: 8,
                zoom_max: 22,
                keys: &["landuse", "natural", "leisure"],
                values: &["forest", "wood", "park", "meadow", "grass"],
                instructions: vec![RenderInstruction::Area {
                    fill: Some(0xffc8e0b8),
                    stroke: None,
                    level: 0,
                }],
            },
            Rule {
                element: Element::Way,
                closed: Closed::Yes,
                zoom_min: 13,
                zoom_max: 22,
                keys: &["building"],
                values: &["*"],
                instructions: vec![
                    RenderInstruction::Area {
                        fill: Some(0xffd9d0c9),
                        stroke: Some((0xffb3a396, 1.0)),
                        level: 3,
                    },
                    RenderInstruction::Caption {
                        text_key: "addr:housenumber",
                        vertical_offset: 0.0,
                        font_size: 8.0,
                        fill: 0xff606060,
                        stroke: None,
                    },
                ],
            },
            Rule {
                element: Element::Way,
                closed: Closed::Yes,
                zoom_min: 12,
                zoom_max: 22,
                keys: &["natural", "landuse"],
                values: &["water", "reservoir"],
                instructions: vec![RenderInstruction::Symbol {
                    symbol: Arc::clone(&water_icon),
                }],
            },
            Rule {
                element: Element::Way,
                closed: Closed::No,
                zoom_min: 0,
                zoom_max: 22,
                keys: &["waterway"],
                values: &["river", "stream", "canal"],
                instructions: vec![
                    RenderInstruction::Line {
                        color: 0xff99ccee,
                        width: 2.0,
                        level: 1,
                    },
                    RenderInstruction::PathText {
                        text_key: "name",
                        font_size: 9.0,
                        fill: 0xff3366aa,
                        stroke: Some(0xffffffff),
                    },
                ],
            },
            Rule {
                element: Element::Way,
                closed: Closed::No,
                zoom_min: 0,
                zoom_max: 22,
                keys: &["highway"],
                values: &["motorway", "trunk", "primary"],
                instructions: vec![
                    RenderInstruction::Line {
                        color: 0xffd87a33,
                        width: 2.5,
                        level: 3,
                    },
                    RenderInstruction::Line {
                        color: 0xffffb366,
                        width: 1.5,
                        level: 4,
                    },
                    RenderInstruction::PathText {
                        text_key: "name",
                        font_size: 10.0,
                        fill: 0xff303030,
                        stroke: Some(0xffffffff),
                    },
                ],
            },
            Rule {
                element: Element::Way,
                closed: Closed::No,
                zoom_min: 10,
                zoom_max: 22,
                keys: &["highway"],
                values: &["secondary", "tertiary", "residential", "unclassified"],
                instructions: vec![
                    RenderInstruction::Line {
                        color: 0xff999999,
                        width: 2.0,
                        level: 2,
                    },
                    RenderInstruction::Line {
                        color: 0xffffffff,
                        width: 1.2,
                        level: 3,
                    },
                    RenderInstruction::PathText {
                        text_key: "name",
                        font_size: 9.0,
                        fill: 0xff404040,
                        stroke: Some(0xffffffff),
                    },
                ],
            },
            Rule {
                element: Element::Way,
                closed: Closed::No,
                zoom_min: 14,
                zoom_max: 22,
                keys: &["oneway"],
                values: &["yes", "true", "1"],
                instructions: vec![RenderInstruction::LineSymbol {
                    symbol: Arc::clone(&oneway_arrow),
                    align_center: true,
                    repeat: true,
                }],
            },
            Rule {
                element: Element::Way,
                closed: Closed::No,
                zoom_min: 8,
                zoom_max: 22,
                keys: &["railway"],
                values: &["rail"],
                instructions: vec![RenderInstruction::Line {
                    color: 0xff555555,
                    width: 1.5,
                    level: 5,
                }],
            },
            Rule {
                element: Element::Node,
                closed: Closed::Any,
                zoom_min: 6,
                zoom_max: 22,
                keys: &["place"],
                values: &["city", "town", "village"],
                instructions: vec![
                    RenderInstruction::Symbol {
                        symbol: Arc::clone(&town_icon),
                    },
                    RenderInstruction::Caption {
                        text_key: "name",
                        vertical_offset: 0.0,
                        font_size: 11.0,
                        fill: 0xff202020,
                        stroke: Some(0xffffffff),
                    },
                ],
            },
            Rule {
                element: Element::Node,
                closed: Closed::Any,
                zoom_min: 12,
                zoom_max: 22,
                keys: &["natural"],
                values: &["peak"],
                instructions: vec![
                    RenderInstruction::Symbol {
                        symbol: Arc::clone(&peak_icon),
                    },
                    RenderInstruction::Circle {
                        radius: 3.0,
                        fill: Some(0xff886644),
                        stroke: None,
                        level: 5,
                    },
                    RenderInstruction::Caption {
                        text_key: "name",
                        vertical_offset: 0.0,
                        font_size: 9.0,
                        fill: 0xff553311,
                        stroke: Some(0xffffffff),
                    },
                ],
            },
            Rule {
                element: Element::Node,
                closed: Closed::Any,
                zoom_min: 14,
                zoom_max: 22,
                keys: &["amenity", "tourism", "shop"],
                values: &["*"],
                instructions: vec![RenderInstruction::Caption {
                    text_key: "name",
                    vertical_offset: 0.0,
                    font_size: 9.0,
                    fill: 0xff404040,
                    stroke: Some(0xffffffff),
                }],
            },
        ];

        Self {
            background: 0xfff4f1e9,
            water: 0xffb3ddff,
            levels: 6,
            rules,
        }
    }
}

fn tag_value<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.key == key)
        .map(|tag| tag.value.as_str())
}

fn circle_icon(size: i32, color: u32) -> Arc<Bitmap> {
    let mut pixels = vec![0u32; (size * size) as usize];
    let radius = size as f64 / 2.0 - 0.5;
    let center = size as f64 / 2.0 - 0.5;
    for y in 0..size {
        for x in 0..size {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            if dx * dx + dy * dy <= radius * radius {
                pixels[(y * size + x) as usize] = color;
            }
        }
    }
    Arc::new(Bitmap::from_pixels(size, size, pixels))
}

fn square_icon(size: i32, color: u32) -> Arc<Bitmap> {
    Arc::new(Bitmap::filled(size, size, color))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingCallback {
        ways: usize,
        captions: usize,
        circles: usize,
        symbols: usize,
        path_texts: usize,
        areas: usize,
    }

    impl CountingCallback {
        fn new() -> Self {
            Self {
                ways: 0,
                captions: 0,
                circles: 0,
                symbols: 0,
                path_texts: 0,
                areas: 0,
            }
        }
    }

    impl RenderCallback for CountingCallback {
        fn render_area(&mut self, _: Option<&Paint>, _: Option<&Paint>, _: usize) {
            self.areas += 1;
        }
        fn render_area_caption(&mut self, _: &str, _: f32, _: &Paint, _: Option<&Paint>) {
            self.captions += 1;
        }
        fn render_area_symbol(&mut self, _: &Arc<Bitmap>) {
            self.symbols += 1;
        }
        fn render_point_of_interest_caption(&mut self, _: &str, _: f32, _: &Paint, _: Option<&Paint>) {
            self.captions += 1;
        }
        fn render_point_of_interest_circle(
            &mut self,
            _: f32,
            _: Option<&Paint>,
            _: Option<&Paint>,
            _: usize,
        ) {
            self.circles += 1;
        }
        fn render_point_of_interest_symbol(&mut self, _: &Arc<Bitmap>) {
            self.symbols += 1;
        }
        fn render_way(&mut self, _: &Paint, _: usize) {
            self.ways += 1;
        }
        fn render_way_symbol(&mut self, _: &Arc<Bitmap>, _: bool, _: bool) {
            self.symbols += 1;
        }
        fn render_way_text(&mut self, _: &str, _: &Paint, _: Option<&Paint>) {
            self.path_texts += 1;
        }
    }

    #[test]
    fn primary_road_emits_casing_core_and_name() {
        let theme = RenderTheme::built_in();
        let mut callback = CountingCallback::new();
        let tags = vec![Tag::new("highway", "primary"), Tag::new("name", "High Street")];
        theme.match_way(&mut callback, &tags, 14, false, 1.0, 1.0);
        assert_eq!(callback.ways, 2);
        assert_eq!(callback.path_texts, 1);
    }

    #[test]
    fn zoom_range_gates_rules() {
        let theme = RenderTheme::built_in();
        let mut callback = CountingCallback::new();
        let tags = vec![Tag::new("building", "yes")];
        theme.match_way(&mut callback, &tags, 10, true, 1.0, 1.0);
        assert_eq!(callback.areas, 0);
        theme.match_way(&mut callback, &tags, 15, true, 1.0, 1.0);
        assert_eq!(callback.areas, 1);
    }

    #[test]
    fn town_poi_gets_symbol_and_caption() {
        let theme = RenderTheme::built_in();
        let mut callback = CountingCallback::new();
        let tags = vec![Tag::new("place", "town"), Tag::new("name", "Weimar")];
        theme.match_poi(&mut callback, &tags, 12, 1.0, 1.0);
        assert_eq!(callback.symbols, 1);
        assert_eq!(callback.captions, 1);
    }

    #[test]
    fn peak_emits_symbol_circle_and_caption() {
        let theme = RenderTheme::built_in();
        let mut callback = CountingCallback::new();
        let tags = vec![Tag::new("natural", "peak"), Tag::new("name", "Brocken")];
        theme.match_poi(&mut callback, &tags, 14, 1.0, 1.0);
        assert_eq!(callback.circles, 1);
        assert_eq!(callback.symbols, 1);
        assert_eq!(callback.captions, 1);
    }

    #[test]
    fn caption_without_text_tag_is_silent() {
        let theme = RenderTheme::built_in();
        let mut callback = CountingCallback::new();
        let tags = vec![Tag::new("place", "town")];
        theme.match_poi(&mut callback, &tags, 12, 1.0, 1.0);
        assert_eq!(callback.captions, 0);
    }
}
