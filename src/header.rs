use std::io::{Read, Seek};

use tracing::debug;

use crate::errors::{MapRenderError, Result};
use crate::mercator::MercatorProjection;
use crate::optional_field::OptionalFields;
use crate::reader::ReadBuffer;
use crate::required_field::{RequiredFields, HEADER_SIZE_MIN};
use crate::types::{BoundingBox, LatLong, Tag};

const BASE_ZOOM_LEVEL_MAX: u8 = 20;
const ZOOM_LEVEL_MAX: u8 = 22;

// A debug map file prefixes each sub-file index with a textual signature.
const SIGNATURE_LENGTH_INDEX: i64 = 16;

/// Geometry of one zoom band of the file, including the derived block grid
/// used to address its index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubFileParameter {
    pub base_zoom_level: u8,
    pub blocks_height: i64,
    pub blocks_width: i64,
    pub boundary_tile_bottom: i64,
    pub boundary_tile_left: i64,
    pub boundary_tile_right: i64,
    pub boundary_tile_top: i64,
    pub index_end_address: i64,
    pub index_start_address: i64,
    pub number_of_blocks: i64,
    pub start_address: i64,
    pub sub_file_size: i64,
    pub zoom_level_max: u8,
    pub zoom_level_min: u8,
}

impl SubFileParameter {
    pub const BYTES_PER_INDEX_ENTRY: u8 = 5;
}

#[derive(Default)]
pub struct SubFileParameterBuilder {
    pub base_zoom_level: u8,
    pub bounding_box: Option<BoundingBox>,
    pub index_start_address: i64,
    pub start_address: i64,
    pub sub_file_size: i64,
    pub zoom_level_max: u8,
    pub zoom_level_min: u8,
}

impl SubFileParameterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> Result<SubFileParameter> {
        let bounding_box = self
            .bounding_box
            .ok_or_else(|| MapRenderError::malformed("bounding box is required"))?;

        let boundary_tile_bottom =
            MercatorProjection::latitude_to_tile_y(bounding_box.min_latitude, self.base_zoom_level);
        let boundary_tile_left = MercatorProjection::longitude_to_tile_x(
            bounding_box.min_longitude,
            self.base_zoom_level,
        );
        let boundary_tile_top =
            MercatorProjection::latitude_to_tile_y(bounding_box.max_latitude, self.base_zoom_level);
        let boundary_tile_right = MercatorProjection::longitude_to_tile_x(
            bounding_box.max_longitude,
            self.base_zoom_level,
        );

        let blocks_width = boundary_tile_right - boundary_tile_left + 1;
        let blocks_height = boundary_tile_bottom - boundary_tile_top + 1;
        let number_of_blocks = blocks_width * blocks_height;

        let index_end_address = self.index_start_address
            + number_of_blocks * SubFileParameter::BYTES_PER_INDEX_ENTRY as i64;

        Ok(SubFileParameter {
            base_zoom_level: self.base_zoom_level,
            blocks_height,
            blocks_width,
            boundary_tile_bottom,
            boundary_tile_left,
            boundary_tile_right,
            boundary_tile_top,
            index_end_address,
            index_start_address: self.index_start_address,
            number_of_blocks,
            start_address: self.start_address,
            sub_file_size: self.sub_file_size,
            zoom_level_max: self.zoom_level_max,
            zoom_level_min: self.zoom_level_min,
        })
    }
}

/// Everything the file prelude declares. Built once on open, never mutated.
#[derive(Debug, Clone)]
pub struct MapFileInfo {
    pub bounding_box: BoundingBox,
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub debug_file: bool,
    pub file_size: i64,
    pub file_version: i32,
    pub flags: u8,
    pub language_preference: Option<String>,
    pub map_date: i64,
    pub number_of_sub_files: u8,
    pub poi_tags: Vec<Tag>,
    pub projection_name: String,
    pub start_position: Option<LatLong>,
    pub start_zoom_level: Option<u8>,
    pub tile_pixel_size: i32,
    pub way_tags: Vec<Tag>,
    pub zoom_level_min: u8,
    pub zoom_level_max: u8,
}

#[derive(Default)]
pub struct MapFileInfoBuilder {
    pub bounding_box: Option<BoundingBox>,
    pub file_size: i64,
    pub file_version: i32,
    pub map_date: i64,
    pub number_of_sub_files: u8,
    pub optional_fields: OptionalFields,
    pub poi_tags: Vec<Tag>,
    pub projection_name: String,
    pub tile_pixel_size: i32,
    pub way_tags: Vec<Tag>,
    pub zoom_level_min: u8,
    pub zoom_level_max: u8,
}

impl MapFileInfoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> Result<MapFileInfo> {
        let bounding_box = self
            .bounding_box
            .ok_or_else(|| MapRenderError::malformed("bounding box is required"))?;
        let flags = self.optional_fields.flags();

        Ok(MapFileInfo {
            bounding_box,
            comment: self.optional_fields.comment,
            created_by: self.optional_fields.created_by,
            debug_file: self.optional_fields.is_debug_file,
            file_size: self.file_size,
            file_version: self.file_version,
            flags,
            language_preference: self.optional_fields.language_preference,
            map_date: self.map_date,
            number_of_sub_files: self.number_of_sub_files,
            poi_tags: self.poi_tags,
            projection_name: self.projection_name,
            start_position: self.optional_fields.start_position,
            start_zoom_level: self.optional_fields.start_zoom_level,
            tile_pixel_size: self.tile_pixel_size,
            way_tags: self.way_tags,
            zoom_level_min: self.zoom_level_min,
            zoom_level_max: self.zoom_level_max,
        })
    }
}

/// Decoded file prelude plus the per-zoom-level sub-file lookup table.
pub struct MapFileHeader {
    map_file_info: Option<MapFileInfo>,
    sub_file_parameters: Vec<SubFileParameter>,
    zoom_level_maximum: u8,
    zoom_level_minimum: u8,
}

impl MapFileHeader {
    pub fn new() -> Self {
        Self {
            map_file_info: None,
            sub_file_parameters: Vec::new(),
            zoom_level_maximum: 0,
            zoom_level_minimum: u8::MAX,
        }
    }

    pub fn get_map_file_info(&self) -> Option<&MapFileInfo> {
        self.map_file_info.as_ref()
    }

    /// Clamps `zoom_level` into the zoom range the file covers.
    pub fn get_query_zoom_level(&self, zoom_level: u8) -> u8 {
        zoom_level.clamp(self.zoom_level_minimum, self.zoom_level_maximum)
    }

    pub fn get_sub_file_parameter(&self, query_zoom_level: usize) -> Option<&SubFileParameter> {
        self.sub_file_parameters.get(query_zoom_level)
    }

    pub fn read_header<R: Read + Seek>(
        &mut self,
        read_buffer: &mut ReadBuffer<R>,
        file_size: i64,
    ) -> Result<()> {
        RequiredFields::read_magic_byte(read_buffer)?;
        RequiredFields::read_remaining_header(read_buffer)?;

        let mut map_file_info_builder = MapFileInfoBuilder::new();

        RequiredFields::read_file_version(read_buffer, &mut map_file_info_builder)?;
        RequiredFields::read_file_size(read_buffer, file_size, &mut map_file_info_builder)?;
        RequiredFields::read_map_date(read_buffer, &mut map_file_info_builder)?;
        RequiredFields::read_bounding_box(read_buffer, &mut map_file_info_builder)?;
        RequiredFields::read_tile_pixel_size(read_buffer, &mut map_file_info_builder)?;
        RequiredFields::read_projection_name(read_buffer, &mut map_file_info_builder)?;

        let mut optional_fields = OptionalFields::new(read_buffer.read_byte()?);
        optional_fields.read_optional_fields(read_buffer)?;
        map_file_info_builder.optional_fields = optional_fields;

        RequiredFields::read_poi_tags(read_buffer, &mut map_file_info_builder)?;
        RequiredFields::read_way_tags(read_buffer, &mut map_file_info_builder)?;

        self.read_sub_file_parameters(read_buffer, file_size, &mut map_file_info_builder)?;

        self.map_file_info = Some(map_file_info_builder.build()?);
        Ok(())
    }

    fn read_sub_file_parameters<R: Read + Seek>(
        &mut self,
        read_buffer: &mut ReadBuffer<R>,
        file_size: i64,
        map_file_info_builder: &mut MapFileInfoBuilder,
    ) -> Result<()> {
        let number_of_sub_files = read_buffer.read_byte()?;
        if number_of_sub_files < 1 {
            return Err(MapRenderError::malformed(format!(
                "invalid number of sub-files: {}",
                number_of_sub_files
            )));
        }
        map_file_info_builder.number_of_sub_files = number_of_sub_files;

        let mut temp_sub_file_parameters = Vec::with_capacity(number_of_sub_files as usize);

        for _ in 0..number_of_sub_files {
            let mut builder = SubFileParameterBuilder::new();

            let base_zoom_level = read_buffer.read_byte()?;
            if base_zoom_level > BASE_ZOOM_LEVEL_MAX {
                return Err(MapRenderError::malformed(format!(
                    "invalid base zoom level: {}",
                    base_zoom_level
                )));
            }
            builder.base_zoom_level = base_zoom_level;

            let zoom_level_min = read_buffer.read_byte()?;
            if zoom_level_min > ZOOM_LEVEL_MAX {
                return Err(MapRenderError::malformed(format!(
                    "invalid minimum zoom level: {}",
                    zoom_level_min
                )));
            }
            builder.zoom_level_min = zoom_level_min;

            let zoom_level_max = read_buffer.read_byte()?;
            if zoom_level_max > ZOOM_LEVEL_MAX {
                return Err(MapRenderError::malformed(format!(
                    "invalid maximum zoom level: {}",
                    zoom_level_max
                )));
            }
            builder.zoom_level_max = zoom_level_max;

            if zoom_level_min > zoom_level_max {
                return Err(MapRenderError::malformed(format!(
                    "invalid zoom level range: {} {}",
                    zoom_level_min, zoom_level_max
                )));
            }

            let start_address = read_buffer.read_long()?;
            if start_address < HEADER_SIZE_MIN as i64 || start_address >= file_size {
                return Err(MapRenderError::malformed(format!(
                    "invalid start address: {}",
                    start_address
                )));
            }
            builder.start_address = start_address;

            builder.index_start_address = if map_file_info_builder.optional_fields.is_debug_file {
                start_address + SIGNATURE_LENGTH_INDEX
            } else {
                start_address
            };

            let sub_file_size = read_buffer.read_long()?;
            if sub_file_size < 1 {
                return Err(MapRenderError::malformed(format!(
                    "invalid sub-file size: {}",
                    sub_file_size
                )));
            }
            builder.sub_file_size = sub_file_size;

            builder.bounding_box = map_file_info_builder.bounding_box.clone();

            let sub_file_parameter = builder.build()?;

            if self.zoom_level_minimum > zoom_level_min {
                self.zoom_level_minimum = zoom_level_min;
                map_file_info_builder.zoom_level_min = zoom_level_min;
            }
            if self.zoom_level_maximum < zoom_level_max {
                self.zoom_level_maximum = zoom_level_max;
                map_file_info_builder.zoom_level_max = zoom_level_max;
            }

            debug!(
                base_zoom_level,
                zoom_level_min, zoom_level_max, start_address, "read sub-file parameters"
            );
            temp_sub_file_parameters.push(sub_file_parameter);
        }

        // Dense lookup: one slot per zoom level up to the global maximum, each
        // pointing at the sub-file covering it.
        let mut sub_file_parameters = Vec::with_capacity(self.zoom_level_maximum as usize + 1);
        for zoom_level in 0..=self.zoom_level_maximum {
            let covering = temp_sub_file_parameters
                .iter()
                .find(|p| zoom_level >= p.zoom_level_min && zoom_level <= p.zoom_level_max)
                .or_else(|| temp_sub_file_parameters.last())
                .ok_or_else(|| MapRenderError::malformed("no valid sub-file parameters found"))?;
            sub_file_parameters.push(covering.clone());
        }

        self.sub_file_parameters = sub_file_parameters;
        Ok(())
    }
}

impl Default for MapFileHeader {
    fn default() -> Self {
        Self::new()
    }
}
