use std::io::{Read, Seek};

use crate::errors::{MapRenderError, Result};
use crate::reader::ReadBuffer;
use crate::types::{LatLong, LatLongUtils};

const FLAG_DEBUG: u8 = 0x80;
const FLAG_START_POSITION: u8 = 0x40;
const FLAG_START_ZOOM_LEVEL: u8 = 0x20;
const FLAG_LANGUAGE_PREFERENCE: u8 = 0x10;
const FLAG_COMMENT: u8 = 0x08;
const FLAG_CREATED_BY: u8 = 0x04;

const START_ZOOM_LEVEL_MAX: u8 = 22;
const LANGUAGE_PREFERENCE_LENGTH: usize = 2;

/// The conditional tail of the header, gated by the flags byte. Fields are
/// read in the fixed order debug, start position, start zoom, language
/// preference, comment, created-by.
#[derive(Default)]
pub struct OptionalFields {
    pub comment: Option<String>,
    pub created_by: Option<String>,
    pub is_debug_file: bool,
    pub has_start_position: bool,
    pub has_start_zoom_level: bool,
    pub has_language_preference: bool,
    pub has_comment: bool,
    pub has_created_by: bool,
    pub language_preference: Option<String>,
    pub start_position: Option<LatLong>,
    pub start_zoom_level: Option<u8>,
}

impl OptionalFields {
    pub fn new(flags: u8) -> Self {
        Self {
            is_debug_file: flags & FLAG_DEBUG != 0,
            has_start_position: flags & FLAG_START_POSITION != 0,
            has_start_zoom_level: flags & FLAG_START_ZOOM_LEVEL != 0,
            has_language_preference: flags & FLAG_LANGUAGE_PREFERENCE != 0,
            has_comment: flags & FLAG_COMMENT != 0,
            has_created_by: flags & FLAG_CREATED_BY != 0,
            ..Self::default()
        }
    }

    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.is_debug_file {
            flags |= FLAG_DEBUG;
        }
        if self.has_start_position {
            flags |= FLAG_START_POSITION;
        }
        if self.has_start_zoom_level {
            flags |= FLAG_START_ZOOM_LEVEL;
        }
        if self.has_language_preference {
            flags |= FLAG_LANGUAGE_PREFERENCE;
        }
        if self.has_comment {
            flags |= FLAG_COMMENT;
        }
        if self.has_created_by {
            flags |= FLAG_CREATED_BY;
        }
        flags
    }

    pub fn read_optional_fields<R: Read + Seek>(
        &mut self,
        read_buffer: &mut ReadBuffer<R>,
    ) -> Result<()> {
        if self.has_start_position {
            let latitude = LatLongUtils::microdegrees_to_degrees(read_buffer.read_int()?);
            let longitude = LatLongUtils::microdegrees_to_degrees(read_buffer.read_int()?);
            self.start_position = Some(LatLong {
                latitude,
                longitude,
            });
        }

        if self.has_start_zoom_level {
            let zoom_level = read_buffer.read_byte()?;
            if zoom_level > START_ZOOM_LEVEL_MAX {
                return Err(MapRenderError::malformed(format!(
                    "invalid map start zoom level: {}",
                    zoom_level
                )));
            }
            self.start_zoom_level = Some(zoom_level);
        }

        if self.has_language_preference {
            let language = read_buffer.read_utf8_encoded_string()?;
            if language.chars().count() != LANGUAGE_PREFERENCE_LENGTH {
                return Err(MapRenderError::malformed(format!(
                    "invalid language preference: {}",
                    language
                )));
            }
            self.language_preference = Some(language);
        }

        if self.has_comment {
            self.comment = Some(read_buffer.read_utf8_encoded_string()?);
        }

        if self.has_created_by {
            self.created_by = Some(read_buffer.read_utf8_encoded_string()?);
        }

        Ok(())
    }
}
