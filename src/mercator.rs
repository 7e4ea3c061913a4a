pub struct MercatorProjection;

const LATITUDE_MAX: f64 = 85.05112877980659;
const LATITUDE_MIN: f64 = -LATITUDE_MAX;
const PI: f64 = std::f64::consts::PI;

impl MercatorProjection {
    pub fn tile_x_to_longitude(tile_x: i64, zoom_level: u8) -> f64 {
        let n = 1i64 << zoom_level;
        (tile_x as f64 * 360.0 / n as f64) - 180.0
    }

    pub fn tile_y_to_latitude(tile_y: i64, zoom_level: u8) -> f64 {
        let n = 1i64 << zoom_level;
        let y = 0.5 - (tile_y as f64 / n as f64);
        90.0 - 360.0 * ((-y * (2.0 * PI)).exp().atan()) / PI
    }

    pub fn longitude_to_tile_x(longitude: f64, zoom_level: u8) -> i64 {
        let n = 1i64 << zoom_level;
        ((longitude + 180.0) / 360.0 * n as f64).floor() as i64
    }

    pub fn latitude_to_tile_y(latitude: f64, zoom_level: u8) -> i64 {
        let latitude = latitude.clamp(LATITUDE_MIN, LATITUDE_MAX);
        let n = 1i64 << zoom_level;
        let lat_rad = latitude.to_radians();
        let y = 0.5 - (lat_rad.sin().atanh() / (2.0 * PI));
        ((y * n as f64).floor() as i64).clamp(0, n - 1)
    }

    pub fn latitude_to_pixel_y(latitude: f64, zoom_level: u8, tile_size: i32) -> f64 {
        let map_size = Self::get_map_size(zoom_level, tile_size);
        let sin_latitude = latitude.to_radians().sin();
        let pixel_y = (0.5 - ((1.0 + sin_latitude) / (1.0 - sin_latitude)).ln() / (4.0 * PI))
            * map_size as f64;
        pixel_y.clamp(0.0, map_size as f64)
    }

    pub fn longitude_to_pixel_x(longitude: f64, zoom_level: u8, tile_size: i32) -> f64 {
        let map_size = Self::get_map_size(zoom_level, tile_size);
        (longitude + 180.0) / 360.0 * map_size as f64
    }

    pub fn get_map_size(zoom_level: u8, tile_size: i32) -> i64 {
        (tile_size as i64) << zoom_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_zero_spans_the_world() {
        assert_eq!(MercatorProjection::tile_x_to_longitude(0, 0), -180.0);
        assert_eq!(MercatorProjection::tile_x_to_longitude(1, 0), 180.0);
    }

    #[test]
    fn equator_maps_to_the_middle_tile_row() {
        let tile_y = MercatorProjection::latitude_to_tile_y(0.0, 8);
        assert_eq!(tile_y, 128);
    }

    #[test]
    fn pixel_projection_round_trips_the_origin() {
        let x = MercatorProjection::longitude_to_pixel_x(0.0, 2, 256);
        let y = MercatorProjection::latitude_to_pixel_y(0.0, 2, 256);
        assert_eq!(x, 512.0);
        assert_eq!(y, 512.0);
    }
}
