//! Named cities swept by the console poller.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("unknown city: {0}")]
pub struct UnknownCity(pub String);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }
}

pub const LOCATIONS: &[Location] = &[
    Location::new("Los Angeles", 34.058032451466175, -118.23595125080323),
    Location::new("San Francisco", 37.77368416198036, -122.41185482459379),
    Location::new("San Diego", 32.71622791446506, -117.16627851159686),
    Location::new("Anchorage", 61.217214806510825, -149.86891662783154),
    Location::new("Honolulu", 21.309463585349853, -157.8570993659206),
    Location::new("Sydney", -33.86955210512373, 151.2079001460676),
    Location::new("Buenos Aires", -34.60449337243565, -58.341978798543366),
    Location::new("Cape Town", -33.92546155535883, 18.432284113203856),
    Location::new("Copenhagen", 55.676326942940015, 12.563113264981702),
    Location::new("Edinburgh", 55.95367676508114, -3.1916086678208706),
    Location::new("Dhaka", 23.971261177497123, 90.37722903083214),
    Location::new("Port Moresby", -9.38938063045734, 147.29739503837453),
    Location::new("Manila", 14.741560348469392, 121.01875424393413),
];

/// Case-insensitive lookup by city name.
pub fn find(name: &str) -> Option<&'static Location> {
    let name = name.trim();
    LOCATIONS.iter().find(|l| l.name.eq_ignore_ascii_case(name))
}

/// Resolve `--city` names. No names selects every location.
pub fn select(names: &[String]) -> Result<Vec<Location>, UnknownCity> {
    if names.is_empty() {
        return Ok(LOCATIONS.to_vec());
    }
    names
        .iter()
        .map(|name| find(name).copied().ok_or_else(|| UnknownCity(name.clone())))
        .collect()
}
