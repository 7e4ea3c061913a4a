use crate::mercator::MercatorProjection;
use crate::types::BoundingBox;

/// Address of one square of the Mercator plane at a given zoom level.
///
/// Neighbor accessors may step outside the world bounds; callers that care
/// (the dependency cache does) check with [`Tile::is_in_bounds`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tile {
    pub tile_x: i64,
    pub tile_y: i64,
    pub zoom_level: u8,
    pub tile_size: i32,
}

impl Tile {
    pub fn new(tile_x: i64, tile_y: i64, zoom_level: u8, tile_size: i32) -> Self {
        Self {
            tile_x,
            tile_y,
            zoom_level,
            tile_size,
        }
    }

    /// Largest valid tile coordinate on either axis at `zoom_level`.
    pub fn max_tile_number(zoom_level: u8) -> i64 {
        (1i64 << zoom_level) - 1
    }

    pub fn is_in_bounds(&self) -> bool {
        let max = Self::max_tile_number(self.zoom_level);
        self.tile_x >= 0 && self.tile_x <= max && self.tile_y >= 0 && self.tile_y <= max
    }

    pub fn translated(&self, dx: i64, dy: i64) -> Tile {
        Tile::new(
            self.tile_x + dx,
            self.tile_y + dy,
            self.zoom_level,
            self.tile_size,
        )
    }

    pub fn left(&self) -> Tile {
        self.translated(-1, 0)
    }

    pub fn right(&self) -> Tile {
        self.translated(1, 0)
    }

    pub fn above(&self) -> Tile {
        self.translated(0, -1)
    }

    pub fn below(&self) -> Tile {
        self.translated(0, 1)
    }

    pub fn above_left(&self) -> Tile {
        self.translated(-1, -1)
    }

    pub fn above_right(&self) -> Tile {
        self.translated(1, -1)
    }

    pub fn below_left(&self) -> Tile {
        self.translated(-1, 1)
    }

    pub fn below_right(&self) -> Tile {
        self.translated(1, 1)
    }

    pub fn get_bounding_box(&self) -> BoundingBox {
        let min_lon = MercatorProjection::tile_x_to_longitude(self.tile_x, self.zoom_level);
        let max_lon = MercatorProjection::tile_x_to_longitude(self.tile_x + 1, self.zoom_level);
        let min_lat = MercatorProjection::tile_y_to_latitude(self.tile_y + 1, self.zoom_level);
        let max_lat = MercatorProjection::tile_y_to_latitude(self.tile_y, self.zoom_level);

        BoundingBox {
            min_latitude: min_lat,
            min_longitude: min_lon,
            max_latitude: max_lat,
            max_longitude: max_lon,
        }
    }

    pub fn get_bounding_box_range(upper_left: &Tile, lower_right: &Tile) -> BoundingBox {
        let min_latitude = MercatorProjection::tile_y_to_latitude(
            lower_right.tile_y.max(upper_left.tile_y) + 1,
            upper_left.zoom_level,
        );
        let max_latitude = MercatorProjection::tile_y_to_latitude(
            lower_right.tile_y.min(upper_left.tile_y),
            upper_left.zoom_level,
        );
        let min_longitude = MercatorProjection::tile_x_to_longitude(
            lower_right.tile_x.min(upper_left.tile_x),
            upper_left.zoom_level,
        );
        let max_longitude = MercatorProjection::tile_x_to_longitude(
            lower_right.tile_x.max(upper_left.tile_x) + 1,
            upper_left.zoom_level,
        );

        BoundingBox {
            min_latitude,
            min_longitude,
            max_latitude,
            max_longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_step_by_one() {
        let tile = Tile::new(10, 10, 5, 256);
        assert_eq!(tile.left().tile_x, 9);
        assert_eq!(tile.above().tile_y, 9);
        assert_eq!(tile.below_right(), Tile::new(11, 11, 5, 256));
    }

    #[test]
    fn world_bounds() {
        assert_eq!(Tile::max_tile_number(5), 31);
        assert!(!Tile::new(-1, 0, 5, 256).is_in_bounds());
        assert!(!Tile::new(0, 32, 5, 256).is_in_bounds());
        assert!(Tile::new(31, 31, 5, 256).is_in_bounds());
    }
}
