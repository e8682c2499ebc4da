//! Built-in table of West Coast tide-pool locations.

use crate::{Coordinates, Location};

fn location(
    name: &str,
    city: &str,
    state: &str,
    primary: (f64, f64),
    station: &str,
    backup: (f64, f64),
) -> Location {
    Location {
        name: name.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        primary: Coordinates {
            lat: primary.0,
            lon: primary.1,
        },
        station: station.to_string(),
        backup: Coordinates {
            lat: backup.0,
            lon: backup.1,
        },
    }
}

/// The default location table, in reporting order.
#[rustfmt::skip]
pub fn builtin() -> Vec<Location> {
    vec![
        location("Point Loma Tide Pools", "San Diego", "CA", (32.6731, -117.2425), "9410170", (32.7157, -117.1611)),
        location("Crystal Cove State Park", "Laguna Beach", "CA", (33.5665, -117.8090), "9410580", (33.5427, -117.7854)),
        location("Leo Carrillo State Park", "Malibu", "CA", (34.0453, -118.9358), "9410230", (34.0259, -118.7798)),
        location("Santa Rosa Island Tide Pools", "Channel Islands National Park", "CA", (33.9950, -120.0805), "9410840", (34.0147, -119.6982)),
        location("Point Lobos State Natural Reserve", "Carmel", "CA", (36.5159, -121.9480), "9413450", (36.5552, -121.9233)),
        location("Cape Perpetua Tide Pools", "Yachats", "OR", (44.2811, -124.1089), "9432780", (44.3118, -124.1037)),
        location("Kalaloch Beach Tide Pools", "Forks", "WA", (47.6136, -124.3740), "9437540", (47.7109, -124.4154)),
        location("Shi Shi Beach Tide Pools", "Neah Bay", "WA", (48.3687, -124.6252), "9443090", (48.3686, -124.6247)),
        location("Ecola State Park Tide Pools", "Cannon Beach", "OR", (45.9273, -123.9788), "9435380", (45.8918, -123.9615)),
        location("Cape Kiwanda Tide Pools", "Pacific City", "OR", (45.2100, -123.9680), "9435385", (45.2028, -123.9624)),
        location("Second Beach Tide Pools", "La Push", "WA", (47.9023, -124.6356), "9444090", (47.9133, -124.6361)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_names_are_unique() {
        let table = builtin();
        let names: HashSet<_> = table.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names.len(), table.len());
    }

    #[test]
    fn test_builtin_coordinates_are_west_coast() {
        for loc in builtin() {
            for c in [loc.primary, loc.backup] {
                assert!((30.0..50.0).contains(&c.lat), "{} lat {}", loc.name, c.lat);
                assert!((-126.0..-116.0).contains(&c.lon), "{} lon {}", loc.name, c.lon);
            }
            assert_eq!(loc.station.len(), 7, "{} station id", loc.name);
        }
    }
}
