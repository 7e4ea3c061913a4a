use std::io::{Read, Seek};

use crate::errors::{MapRenderError, Result};
use crate::header::MapFileInfoBuilder;
use crate::reader::ReadBuffer;
use crate::types::{BoundingBox, LatLongUtils, Tag};

pub const MAGIC_BYTES: &str = "mapsforge binary OSM";
const HEADER_SIZE_MAX: i32 = 1000000;
pub const HEADER_SIZE_MIN: i32 = 70;
const MERCATOR: &str = "Mercator";
const SUPPORTED_FILE_VERSION_MIN: i32 = 3;
const SUPPORTED_FILE_VERSION_MAX: i32 = 5;

// Any plausible map was written after 2008.
const MAP_DATE_MIN: i64 = 1200000000000;

pub struct RequiredFields;

impl RequiredFields {
    pub fn read_magic_byte<R: Read + Seek>(read_buffer: &mut ReadBuffer<R>) -> Result<()> {
        let magic_byte_length = MAGIC_BYTES.len();

        // The magic prefix plus the remaining-header length field.
        if !read_buffer.read_from_file(magic_byte_length + 4)? {
            return Err(MapRenderError::NotAMapFile(
                "reading magic bytes has failed".to_string(),
            ));
        }

        let magic_byte = read_buffer
            .read_utf8_encoded_string_with_length(magic_byte_length)
            .map_err(|_| MapRenderError::NotAMapFile("invalid magic bytes".to_string()))?;

        if magic_byte != MAGIC_BYTES {
            return Err(MapRenderError::NotAMapFile(format!(
                "invalid magic bytes: {}",
                magic_byte
            )));
        }

        Ok(())
    }

    pub fn read_remaining_header<R: Read + Seek>(read_buffer: &mut ReadBuffer<R>) -> Result<()> {
        let remaining_header_size = read_buffer.read_int()?;
        if !(HEADER_SIZE_MIN..=HEADER_SIZE_MAX).contains(&remaining_header_size) {
            return Err(MapRenderError::malformed(format!(
                "invalid remaining header size: {}",
                remaining_header_size
            )));
        }

        if !read_buffer.read_from_file(remaining_header_size as usize)? {
            return Err(MapRenderError::malformed(format!(
                "reading header data has failed: {}",
                remaining_header_size
            )));
        }

        Ok(())
    }

    pub fn read_file_version<R: Read + Seek>(
        read_buffer: &mut ReadBuffer<R>,
        map_file_info_builder: &mut MapFileInfoBuilder,
    ) -> Result<()> {
        let file_version = read_buffer.read_int()?;
        if !(SUPPORTED_FILE_VERSION_MIN..=SUPPORTED_FILE_VERSION_MAX).contains(&file_version) {
            return Err(MapRenderError::UnsupportedVersion(file_version));
        }
        map_file_info_builder.file_version = file_version;
        Ok(())
    }

    pub fn read_file_size<R: Read + Seek>(
        read_buffer: &mut ReadBuffer<R>,
        file_size: i64,
        map_file_info_builder: &mut MapFileInfoBuilder,
    ) -> Result<()> {
        let header_file_size = read_buffer.read_long()?;
        if header_file_size != file_size {
            return Err(MapRenderError::malformed(format!(
                "invalid file size: {} (actual: {})",
                header_file_size, file_size
            )));
        }
        map_file_info_builder.file_size = file_size;
        Ok(())
    }

    pub fn read_map_date<R: Read + Seek>(
        read_buffer: &mut ReadBuffer<R>,
        map_file_info_builder: &mut MapFileInfoBuilder,
    ) -> Result<()> {
        let map_date = read_buffer.read_long()?;
        if map_date < MAP_DATE_MIN {
            return Err(MapRenderError::malformed(format!(
                "invalid map date: {}",
                map_date
            )));
        }
        map_file_info_builder.map_date = map_date;
        Ok(())
    }

    pub fn read_bounding_box<R: Read + Seek>(
        read_buffer: &mut ReadBuffer<R>,
        map_file_info_builder: &mut MapFileInfoBuilder,
    ) -> Result<()> {
        let min_latitude = LatLongUtils::microdegrees_to_degrees(read_buffer.read_int()?);
        let min_longitude = LatLongUtils::microdegrees_to_degrees(read_buffer.read_int()?);
        let max_latitude = LatLongUtils::microdegrees_to_degrees(read_buffer.read_int()?);
        let max_longitude = LatLongUtils::microdegrees_to_degrees(read_buffer.read_int()?);

        map_file_info_builder.bounding_box = Some(BoundingBox::new(
            min_latitude,
            min_longitude,
            max_latitude,
            max_longitude,
        )?);
        Ok(())
    }

    pub fn read_tile_pixel_size<R: Read + Seek>(
        read_buffer: &mut ReadBuffer<R>,
        map_file_info_builder: &mut MapFileInfoBuilder,
    ) -> Result<()> {
        let tile_pixel_size = read_buffer.read_short()? as i32;
        if tile_pixel_size < 1 {
            return Err(MapRenderError::malformed(format!(
                "invalid tile pixel size: {}",
                tile_pixel_size
            )));
        }
        map_file_info_builder.tile_pixel_size = tile_pixel_size;
        Ok(())
    }

    pub fn read_projection_name<R: Read + Seek>(
        read_buffer: &mut ReadBuffer<R>,
        map_file_info_builder: &mut MapFileInfoBuilder,
    ) -> Result<()> {
        let projection_name = read_buffer.read_utf8_encoded_string()?;
        if projection_name != MERCATOR {
            return Err(MapRenderError::malformed(format!(
                "unsupported projection: {}",
                projection_name
            )));
        }
        map_file_info_builder.projection_name = projection_name;
        Ok(())
    }

    pub fn read_poi_tags<R: Read + Seek>(
        read_buffer: &mut ReadBuffer<R>,
        map_file_info_builder: &mut MapFileInfoBuilder,
    ) -> Result<()> {
        map_file_info_builder.poi_tags = Self::read_tag_table(read_buffer, "POI")?;
        Ok(())
    }

    pub fn read_way_tags<R: Read + Seek>(
        read_buffer: &mut ReadBuffer<R>,
        map_file_info_builder: &mut MapFileInfoBuilder,
    ) -> Result<()> {
        map_file_info_builder.way_tags = Self::read_tag_table(read_buffer, "way")?;
        Ok(())
    }

    fn read_tag_table<R: Read + Seek>(
        read_buffer: &mut ReadBuffer<R>,
        kind: &str,
    ) -> Result<Vec<Tag>> {
        let number_of_tags = read_buffer.read_short()? as i32;
        if number_of_tags < 0 {
            return Err(MapRenderError::malformed(format!(
                "invalid number of {} tags: {}",
                kind, number_of_tags
            )));
        }

        let mut tags = Vec::with_capacity(number_of_tags as usize);
        for _ in 0..number_of_tags {
            tags.push(Tag::from_string(read_buffer.read_utf8_encoded_string()?));
        }
        Ok(tags)
    }
}
