//! Engine-wide constants: tile geometry, earth model, and Web-Mercator
//! validity bounds. Keeping them in a single place makes it easier to tweak
//! engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Earth equatorial radius in meters (WGS84 semi-major axis).
pub const EARTH_EQUATOR_RADIUS: f64 = 6_378_137.0;

/// Mean earth radius in meters, used by the fast spherical distance.
pub const EARTH_MEAN_RADIUS: f64 = 6_371_008.0;

/// Earth polar radius in meters (WGS84 semi-minor axis).
pub const EARTH_POLAR_RADIUS: f64 = 6_356_752.314245;

/// Web-Mercator latitude validity bound. Latitudes beyond this are clipped,
/// never projected.
pub const MAX_LATITUDE: f64 = 85.05112878;
pub const MIN_LATITUDE: f64 = -MAX_LATITUDE;

pub const MAX_LONGITUDE: f64 = 180.0;
pub const MIN_LONGITUDE: f64 = -MAX_LONGITUDE;

/// Meters per inch, for map-scale computation from screen DPI.
pub const METERS_PER_INCH: f64 = 0.0254;
