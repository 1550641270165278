/*!
Playable map descriptors.

A [`MapConfig`] is plain data: the road graph, buildable blocks, ranked district zones,
water, bridges, parks and landmarks of one city. World generation and elevation read it;
nothing mutates it after construction.

- types: the building blocks of a config (bounds, segments, districts, bridges, ...)
- nyc / tokyo: the two shipped maps
- [`get_map_config`] / [`map_list`]: registry by id
*/

pub mod nyc;
pub mod tokyo;
pub mod types;

use thiserror::Error;

pub use types::{
    Block, Bounds, BridgeColors, BridgeDef, BridgeStyle, Broadway, DistrictConfig, DistrictZone,
    Landmark, ParkZone, RoadWidths, SpawnPoint, StreetKind, StreetSegment, WaterZone,
};

/// Ids of every registered map, in menu order.
pub const MAP_IDS: [&str; 2] = [nyc::MAP_ID, tokyo::MAP_ID];

/// Reasons a map config is refused before generation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapConfigError {
    #[error("map `{map}` has no streets")]
    NoStreets { map: &'static str },
    #[error("map `{map}` has no buildable blocks")]
    NoBlocks { map: &'static str },
    #[error("map `{map}` has no district zones")]
    NoDistrictZones { map: &'static str },
    #[error("map `{map}` has inverted or empty bounds")]
    InvertedBounds { map: &'static str },
    #[error("map `{map}` spawn point ({x}, {z}) is outside the map bounds")]
    SpawnOutOfBounds { map: &'static str, x: f32, z: f32 },
    #[error("map `{map}` bridge `{bridge}` has zero length")]
    ZeroLengthBridge {
        map: &'static str,
        bridge: &'static str,
    },
    #[error("map `{map}` uses id `{id}` more than once")]
    DuplicateId { map: &'static str, id: &'static str },
    #[error("map `{map}` district `{district}` is invalid: {reason}")]
    InvalidDistrict {
        map: &'static str,
        district: &'static str,
        reason: &'static str,
    },
}

/// Immutable description of one playable city.
#[derive(Clone, Debug, PartialEq)]
pub struct MapConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub subtitle: &'static str,
    pub music_track: Option<&'static str>,
    pub spawn: SpawnPoint,
    pub bounds: Bounds,
    pub road_widths: RoadWidths,
    pub sidewalk_width: f32,
    pub streets: Vec<StreetSegment>,
    pub blocks: Vec<Block>,
    /// Checked in order; the first zone containing a point wins.
    pub district_zones: Vec<DistrictZone>,
    /// District used when no zone contains a point.
    pub fallback_district: DistrictConfig,
    pub water_zones: Vec<WaterZone>,
    pub bridges: Vec<BridgeDef>,
    pub parks: Vec<ParkZone>,
    pub broadway: Option<Broadway>,
    pub landmarks: Vec<Landmark>,
}

impl MapConfig {
    /// District at `(x, z)`: the first zone that strictly contains the point, else the fallback.
    ///
    /// `None` means a no-build zone such as a park.
    pub fn district_at(&self, x: f32, z: f32) -> Option<&DistrictConfig> {
        match self.district_zones.iter().find(|zone| zone.bounds.contains(x, z)) {
            Some(zone) => zone.district.as_ref(),
            None => Some(&self.fallback_district),
        }
    }

    /// Fail-fast sanity checks run before world generation.
    pub fn validate(&self) -> Result<(), MapConfigError> {
        let map = self.id;
        if self.bounds.is_inverted() {
            return Err(MapConfigError::InvertedBounds { map });
        }
        if !self.bounds.contains(self.spawn.x, self.spawn.z) {
            return Err(MapConfigError::SpawnOutOfBounds {
                map,
                x: self.spawn.x,
                z: self.spawn.z,
            });
        }
        if self.streets.is_empty() {
            return Err(MapConfigError::NoStreets { map });
        }
        if self.blocks.is_empty() {
            return Err(MapConfigError::NoBlocks { map });
        }
        if self.district_zones.is_empty() {
            return Err(MapConfigError::NoDistrictZones { map });
        }

        for bridge in &self.bridges {
            if bridge.length() <= f32::EPSILON {
                return Err(MapConfigError::ZeroLengthBridge {
                    map,
                    bridge: bridge.id,
                });
            }
        }

        let districts = self
            .district_zones
            .iter()
            .filter_map(|z| z.district.as_ref())
            .chain(std::iter::once(&self.fallback_district));
        for district in districts {
            validate_district(map, district)?;
        }

        let mut ids: Vec<&'static str> = self
            .district_zones
            .iter()
            .map(|z| z.id)
            .chain(self.water_zones.iter().map(|w| w.id))
            .chain(self.bridges.iter().map(|b| b.id))
            .collect();
        ids.sort_unstable();
        if let Some(dup) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(MapConfigError::DuplicateId { map, id: dup[0] });
        }

        Ok(())
    }
}

fn validate_district(map: &'static str, d: &DistrictConfig) -> Result<(), MapConfigError> {
    let fail = |reason| {
        Err(MapConfigError::InvalidDistrict {
            map,
            district: d.name,
            reason,
        })
    };
    if !(d.height_min > 0.0 && d.height_min <= d.height_max) {
        return fail("height range must be positive and ordered");
    }
    let probabilities = [d.density, d.neon_sign_chance, d.window_lit_chance];
    if probabilities.iter().any(|p| !(0.0..=1.0).contains(p)) {
        return fail("probabilities must lie in [0, 1]");
    }
    Ok(())
}

/// Config for `id`; unknown ids fall back to New York.
pub fn get_map_config(id: &str) -> MapConfig {
    match id {
        tokyo::MAP_ID => tokyo::config(),
        nyc::MAP_ID => nyc::config(),
        other => {
            tracing::debug!(id = other, "unknown map id, falling back to nyc");
            nyc::config()
        }
    }
}

/// Every registered map, in menu order.
pub fn map_list() -> Vec<MapConfig> {
    MAP_IDS.iter().map(|id| get_map_config(id)).collect()
}

/// Id of the map after `current` in menu order, wrapping around.
pub fn next_map_id(current: &str) -> &'static str {
    let index = MAP_IDS.iter().position(|id| *id == current).unwrap_or(0);
    MAP_IDS[(index + 1) % MAP_IDS.len()]
}
