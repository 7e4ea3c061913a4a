use crate::header::SubFileParameter;
use crate::query_calculations::QueryCalculations;
use crate::tile::Tile;

/// Block range and sub-tile bitmask for one tile query against a sub-file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryParameters {
    pub from_base_tile_x: i64,
    pub from_base_tile_y: i64,
    pub from_block_x: i64,
    pub from_block_y: i64,
    pub query_tile_bitmask: i32,
    pub query_zoom_level: i32,
    pub to_base_tile_x: i64,
    pub to_base_tile_y: i64,
    pub to_block_x: i64,
    pub to_block_y: i64,
    pub use_tile_bitmask: bool,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps the requested tile range onto the sub-file's base zoom level.
    /// Above the base zoom the query narrows to sub-tiles via a bitmask;
    /// below it the range widens to every covered base tile.
    pub fn calculate_base_tiles(
        &mut self,
        upper_left: &Tile,
        lower_right: &Tile,
        sub_file_parameter: &SubFileParameter,
    ) {
        if upper_left.zoom_level < sub_file_parameter.base_zoom_level {
            let zoom_level_difference = sub_file_parameter.base_zoom_level - upper_left.zoom_level;
            self.from_base_tile_x = upper_left.tile_x << zoom_level_difference;
            self.from_base_tile_y = upper_left.tile_y << zoom_level_difference;
            self.to_base_tile_x =
                (lower_right.tile_x << zoom_level_difference) + (1 << zoom_level_difference) - 1;
            self.to_base_tile_y =
                (lower_right.tile_y << zoom_level_difference) + (1 << zoom_level_difference) - 1;
            self.use_tile_bitmask = false;
        } else if upper_left.zoom_level > sub_file_parameter.base_zoom_level {
            let zoom_level_difference = upper_left.zoom_level - sub_file_parameter.base_zoom_level;
            self.from_base_tile_x = upper_left.tile_x >> zoom_level_difference;
            self.from_base_tile_y = upper_left.tile_y >> zoom_level_difference;
            self.to_base_tile_x = lower_right.tile_x >> zoom_level_difference;
            self.to_base_tile_y = lower_right.tile_y >> zoom_level_difference;
            self.use_tile_bitmask = true;
            self.query_tile_bitmask = QueryCalculations::calculate_tile_bitmask_range(
                upper_left,
                lower_right,
                zoom_level_difference,
            );
        } else {
            self.from_base_tile_x = upper_left.tile_x;
            self.from_base_tile_y = upper_left.tile_y;
            self.to_base_tile_x = lower_right.tile_x;
            self.to_base_tile_y = lower_right.tile_y;
            self.use_tile_bitmask = false;
        }
    }

    /// Clamps the base-tile range into the sub-file's block grid.
    pub fn calculate_blocks(&mut self, sub_file_parameter: &SubFileParameter) {
        self.from_block_x =
            (self.from_base_tile_x - sub_file_parameter.boundary_tile_left).max(0);
        self.from_block_y = (self.from_base_tile_y - sub_file_parameter.boundary_tile_top).max(0);
        self.to_block_x = (self.to_base_tile_x - sub_file_parameter.boundary_tile_left)
            .min(sub_file_parameter.blocks_width - 1);
        self.to_block_y = (self.to_base_tile_y - sub_file_parameter.boundary_tile_top)
            .min(sub_file_parameter.blocks_height - 1);
    }
}
