use std::path::PathBuf;

use maprender::{MapFile, MapFileInfo, MapRenderError, SubFileParameter};

const MAGIC: &[u8] = b"mapsforge binary OSM";
const FILE_VERSION: i32 = 3;
const MAP_DATE: i64 = 1335871456973;
const TILE_PIXEL_SIZE: i16 = 256;
const PROJECTION: &str = "Mercator";

fn write_vbe_u(value: u32, out: &mut Vec<u8>) {
    let mut value = value;
    while value > 0x7f {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn write_string(text: &str, out: &mut Vec<u8>) {
    write_vbe_u(text.len() as u32, out);
    out.extend_from_slice(text.as_bytes());
}

#[derive(Clone)]
struct OptionalSpec {
    start_position: Option<(i32, i32)>,
    start_zoom_level: Option<u8>,
    language_preference: Option<&'static str>,
    comment: Option<&'static str>,
    created_by: Option<&'static str>,
}

impl OptionalSpec {
    fn none() -> Self {
        Self {
            start_position: None,
            start_zoom_level: None,
            language_preference: None,
            comment: None,
            created_by: None,
        }
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.start_position.is_some() {
            flags |= 0x40;
        }
        if self.start_zoom_level.is_some() {
            flags |= 0x20;
        }
        if self.language_preference.is_some() {
            flags |= 0x10;
        }
        if self.comment.is_some() {
            flags |= 0x08;
        }
        if self.created_by.is_some() {
            flags |= 0x04;
        }
        flags
    }
}

/// Serializes a complete header. The declared file size is patched to the
/// actual byte count unless `declared_file_size` overrides it.
fn build_header(
    optional: &OptionalSpec,
    poi_tags: &[&str],
    way_tags: &[&str],
    sub_files: &[(u8, u8, u8, i64, i64)],
    declared_file_size: Option<i64>,
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&FILE_VERSION.to_be_bytes());
    let file_size_offset = body.len();
    body.extend_from_slice(&0i64.to_be_bytes());
    body.extend_from_slice(&MAP_DATE.to_be_bytes());
    for microdegrees in [0i32, 0, 100_000, 100_000] {
        body.extend_from_slice(&microdegrees.to_be_bytes());
    }
    body.extend_from_slice(&TILE_PIXEL_SIZE.to_be_bytes());
    write_string(PROJECTION, &mut body);

    body.push(optional.flags());
    if let Some((latitude, longitude)) = optional.start_position {
        body.extend_from_slice(&latitude.to_be_bytes());
        body.extend_from_slice(&longitude.to_be_bytes());
    }
    if let Some(zoom) = optional.start_zoom_level {
        body.push(zoom);
    }
    if let Some(language) = optional.language_preference {
        write_string(language, &mut body);
    }
    if let Some(comment) = optional.comment {
        write_string(comment, &mut body);
    }
    if let Some(created_by) = optional.created_by {
        write_string(created_by, &mut body);
    }

    body.extend_from_slice(&(poi_tags.len() as i16).to_be_bytes());
    for tag in poi_tags {
        write_string(tag, &mut body);
    }
    body.extend_from_slice(&(way_tags.len() as i16).to_be_bytes());
    for tag in way_tags {
        write_string(tag, &mut body);
    }

    body.push(sub_files.len() as u8);
    for (base_zoom, zoom_min, zoom_max, start_address, sub_file_size) in sub_files {
        body.push(*base_zoom);
        body.push(*zoom_min);
        body.push(*zoom_max);
        body.extend_from_slice(&start_address.to_be_bytes());
        body.extend_from_slice(&sub_file_size.to_be_bytes());
    }

    let total = MAGIC.len() + 4 + body.len();
    let file_size = declared_file_size.unwrap_or(total as i64);
    body[file_size_offset..file_size_offset + 8].copy_from_slice(&file_size.to_be_bytes());

    let mut header = Vec::with_capacity(total);
    header.extend_from_slice(MAGIC);
    header.extend_from_slice(&(body.len() as i32).to_be_bytes());
    header.extend_from_slice(&body);
    header
}

fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "maprender-header-{}-{}.map",
        std::process::id(),
        name
    ));
    std::fs::write(&path, bytes).expect("temp file must be writable");
    path
}

fn parse(name: &str, bytes: &[u8]) -> Result<MapFile, MapRenderError> {
    MapFile::new(write_temp(name, bytes))
}

#[test]
fn minimal_header_parses() {
    let bytes = build_header(&OptionalSpec::none(), &[], &[], &[(0, 0, 0, 70, 26)], None);
    let map_file = parse("minimal", &bytes).expect("header should parse");

    let info = map_file.get_map_file_info().expect("info must be present");
    assert_eq!(info.file_version, FILE_VERSION);
    assert_eq!(info.map_date, MAP_DATE);
    assert_eq!(info.tile_pixel_size, TILE_PIXEL_SIZE as i32);
    assert_eq!(info.projection_name, PROJECTION);
    assert_eq!(info.number_of_sub_files, 1);
    assert!(info.poi_tags.is_empty());
    assert!(info.way_tags.is_empty());

    // A query outside the covered zoom range clamps onto it.
    assert_eq!(map_file.header.get_query_zoom_level(5), 0);
}

#[test]
fn declared_file_size_must_match_actual() {
    let bytes = build_header(
        &OptionalSpec::none(),
        &[],
        &[],
        &[(0, 0, 0, 70, 26)],
        Some(999),
    );
    assert!(matches!(
        parse("file-size", &bytes),
        Err(MapRenderError::MalformedInput(_))
    ));
}

#[test]
fn start_zoom_level_out_of_range_is_rejected() {
    let optional = OptionalSpec {
        start_zoom_level: Some(23),
        ..OptionalSpec::none()
    };
    let bytes = build_header(&optional, &[], &[], &[(0, 0, 0, 70, 26)], None);
    assert!(matches!(
        parse("start-zoom", &bytes),
        Err(MapRenderError::MalformedInput(_))
    ));
}

#[test]
fn wrong_magic_is_not_a_map_file() {
    let mut bytes = build_header(&OptionalSpec::none(), &[], &[], &[(0, 0, 0, 70, 26)], None);
    bytes[0..4].copy_from_slice(b"nope");
    assert!(matches!(
        parse("magic", &bytes),
        Err(MapRenderError::NotAMapFile(_))
    ));
}

#[test]
fn unknown_file_version_is_rejected() {
    let mut bytes = build_header(&OptionalSpec::none(), &[], &[], &[(0, 0, 0, 70, 26)], None);
    bytes[MAGIC.len() + 4..MAGIC.len() + 8].copy_from_slice(&99i32.to_be_bytes());
    assert!(matches!(
        parse("version", &bytes),
        Err(MapRenderError::UnsupportedVersion(99))
    ));
}

#[test]
fn language_preference_must_be_two_characters() {
    let optional = OptionalSpec {
        language_preference: Some("deu"),
        ..OptionalSpec::none()
    };
    let bytes = build_header(&optional, &[], &[], &[(0, 0, 0, 70, 26)], None);
    assert!(matches!(
        parse("language", &bytes),
        Err(MapRenderError::MalformedInput(_))
    ));
}

#[test]
fn sub_file_start_address_inside_header_is_rejected() {
    let bytes = build_header(&OptionalSpec::none(), &[], &[], &[(0, 0, 0, 10, 26)], None);
    assert!(matches!(
        parse("start-address", &bytes),
        Err(MapRenderError::MalformedInput(_))
    ));
}

/// Re-serializes a parsed header field by field; for a valid input this must
/// reproduce the original bytes.
fn reserialize(info: &MapFileInfo, sub_files: &[&SubFileParameter]) -> Vec<u8> {
    let optional = OptionalSpec {
        start_position: info.start_position.as_ref().map(|position| {
            (
                (position.latitude * 1_000_000.0).round() as i32,
                (position.longitude * 1_000_000.0).round() as i32,
            )
        }),
        start_zoom_level: info.start_zoom_level,
        language_preference: None,
        comment: None,
        created_by: None,
    };

    let mut body = Vec::new();
    body.extend_from_slice(&info.file_version.to_be_bytes());
    body.extend_from_slice(&info.file_size.to_be_bytes());
    body.extend_from_slice(&info.map_date.to_be_bytes());
    for degrees in [
        info.bounding_box.min_latitude,
        info.bounding_box.min_longitude,
        info.bounding_box.max_latitude,
        info.bounding_box.max_longitude,
    ] {
        body.extend_from_slice(&((degrees * 1_000_000.0).round() as i32).to_be_bytes());
    }
    body.extend_from_slice(&(info.tile_pixel_size as i16).to_be_bytes());
    write_string(&info.projection_name, &mut body);

    body.push(info.flags);
    if let Some((latitude, longitude)) = optional.start_position {
        body.extend_from_slice(&latitude.to_be_bytes());
        body.extend_from_slice(&longitude.to_be_bytes());
    }
    if let Some(zoom) = info.start_zoom_level {
        body.push(zoom);
    }
    if let Some(language) = &info.language_preference {
        write_string(language, &mut body);
    }
    if let Some(comment) = &info.comment {
        write_string(comment, &mut body);
    }
    if let Some(created_by) = &info.created_by {
        write_string(created_by, &mut body);
    }

    body.extend_from_slice(&(info.poi_tags.len() as i16).to_be_bytes());
    for tag in &info.poi_tags {
        write_string(&format!("{}={}", tag.key, tag.value), &mut body);
    }
    body.extend_from_slice(&(info.way_tags.len() as i16).to_be_bytes());
    for tag in &info.way_tags {
        write_string(&format!("{}={}", tag.key, tag.value), &mut body);
    }

    body.push(sub_files.len() as u8);
    for sub_file in sub_files {
        body.push(sub_file.base_zoom_level);
        body.push(sub_file.zoom_level_min);
        body.push(sub_file.zoom_level_max);
        body.extend_from_slice(&sub_file.start_address.to_be_bytes());
        body.extend_from_slice(&sub_file.sub_file_size.to_be_bytes());
    }

    let mut header = Vec::new();
    header.extend_from_slice(MAGIC);
    header.extend_from_slice(&(body.len() as i32).to_be_bytes());
    header.extend_from_slice(&body);
    header
}

#[test]
fn parse_then_reserialize_is_identity() {
    let optional = OptionalSpec {
        start_position: Some((50_000, 50_000)),
        start_zoom_level: Some(16),
        language_preference: Some("en"),
        comment: Some("testcomment"),
        created_by: Some("map-writer-0.3.1"),
    };
    let bytes = build_header(
        &optional,
        &["amenity=cafe", "place=town"],
        &["highway=primary", "natural=water"],
        &[(8, 0, 7, 70, 1000), (14, 8, 21, 100, 2000)],
        None,
    );
    let map_file = parse("round-trip", &bytes).expect("header should parse");
    let info = map_file.get_map_file_info().expect("info must be present");

    let band_low = map_file
        .header
        .get_sub_file_parameter(0)
        .expect("zoom 0 must be covered");
    let band_high = map_file
        .header
        .get_sub_file_parameter(8)
        .expect("zoom 8 must be covered");

    assert_eq!(reserialize(info, &[band_low, band_high]), bytes);
}
