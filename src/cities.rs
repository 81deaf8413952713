//! Bounding regions of the cities sampled for the dataset.
//!
//! Boxes are `(west, south, east, north)` in degrees. Lookup ignores case,
//! underscores and periods so dataset folder names such as `Washington_DC`
//! resolve to the same region as `Washington D.C.`.

use crate::{BoundingBox, CityRegion};

/// `(name, [min_x, min_y, max_x, max_y])`
pub const CITIES: &[(&str, [f64; 4])] = &[
    // Dense ground coverage
    ("Colorado Springs", [-104.985348, 38.6739578, -104.665348, 38.9939578]),
    ("Montpelier", [-72.7351208, 44.1002164, -72.4151208, 44.4202164]),
    // 30cm/px aerial coverage
    ("Portland", [-70.4172642, 43.4992687, -70.0972642, 43.8192687]),
    ("Phoenix", [-112.234141, 33.2884367, -111.914141, 33.6084367]),
    ("Denver", [-105.144862, 39.5792364, -104.824862, 39.8992364]),
    ("Oklahoma City", [-97.830948, 35.290695, -97.124718, 35.6748662]),
    ("Des Moines", [-93.7091411, 41.4796389, -93.4936911, 41.6589106]),
    ("Little Rock", [-92.5215905, 34.6256657, -92.1506554, 34.8218226]),
    ("New Orleans", [-90.1399307, 29.8654809, -89.6251763, 30.1994687]),
    ("Cleveland", [-81.8536772, 41.3396574, -81.5336772, 41.6596574]),
    ("Miami", [-80.35362, 25.6141728, -80.03362, 25.9341728]),
    ("Baltimore", [-76.770759, 39.1308816, -76.450759, 39.4508816]),
    ("Dover", [-71.0339761, 43.0381117, -70.7139761, 43.3581117]),
    ("Jersey City", [-74.1166865, 40.661622, -74.0206386, 40.7689376]),
    ("Hartford", [-72.8508547, 41.604582, -72.5308547, 41.924582]),
    ("Providence", [-71.5728343, 41.6639891, -71.2528343, 41.9839891]),
    ("Boston", [-71.220511, 42.1954334, -70.900511, 42.5154334]),
    ("Burlington", [-73.372906, 44.3161601, -73.052906, 44.6361601]),
    ("Nashua", [-71.6277032, 42.6056251, -71.3077032, 42.9256251]),
    // 60cm/px aerial coverage
    ("Houston", [-95.5276974, 29.5989382, -95.2076974, 29.9189382]),
    ("Seattle", [-122.490062, 47.4438321, -122.170062, 47.7638321]),
    ("Washington D.C.", [-77.1197949, 38.7916303, -76.909366, 38.995968]),
    ("Detroit", [-83.2066403, 42.1715509, -82.8866403, 42.4915509]),
    ("San Francisco", [-122.579906, 37.6190262, -122.259906, 37.9390262]),
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '.')
        .map(|c| if c == '_' { ' ' } else { c.to_ascii_lowercase() })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up a built-in city region by name or dataset folder name.
pub fn lookup(name: &str) -> Option<CityRegion> {
    let wanted = normalize(name);
    CITIES
        .iter()
        .find(|(city, _)| normalize(city) == wanted)
        .map(|(city, b)| CityRegion::new(*city, BoundingBox::new(b[0], b[1], b[2], b[3])))
}

/// All built-in city regions.
pub fn all() -> Vec<CityRegion> {
    CITIES
        .iter()
        .map(|(city, b)| CityRegion::new(*city, BoundingBox::new(b[0], b[1], b[2], b[3])))
        .collect()
}
