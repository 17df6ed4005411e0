use serde::{Deserialize, Serialize};

use super::domain::{HousingUnit, Registration, UnitId, UnitStatus};

/// Housing unit row as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HousingUnitView {
    pub unit_id: UnitId,
    pub name: String,
    pub status: UnitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub blocked_capacity: u32,
    pub population: u32,
    pub available_capacity: u32,
    pub occupancy: Option<u32>,
}

impl From<&HousingUnit> for HousingUnitView {
    fn from(unit: &HousingUnit) -> Self {
        Self {
            unit_id: unit.unit_id.clone(),
            name: unit.name.clone(),
            status: unit.status,
            capacity: unit.capacity,
            blocked_capacity: unit.blocked_capacity.unwrap_or(0),
            population: unit.population.unwrap_or(0),
            available_capacity: unit.available_capacity(),
            occupancy: unit.occupancy(),
        }
    }
}

/// Inclusive occupancy bounds for filtering listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OccupancyRange {
    #[serde(default)]
    pub min_occupancy: Option<u32>,
    #[serde(default)]
    pub max_occupancy: Option<u32>,
}

impl OccupancyRange {
    pub fn is_unbounded(&self) -> bool {
        self.min_occupancy.is_none() && self.max_occupancy.is_none()
    }

    /// Units without a displayable occupancy never match a bounded range.
    pub fn contains(&self, occupancy: Option<u32>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(occupancy) = occupancy else {
            return false;
        };
        self.min_occupancy.map_or(true, |min| occupancy >= min)
            && self.max_occupancy.map_or(true, |max| occupancy <= max)
    }
}

/// Unit the person was most recently registered to, if any.
pub fn current_unit(registrations: &[Registration]) -> Option<UnitId> {
    registrations
        .iter()
        .filter(|registration| !registration.deleted)
        .max_by_key(|registration| registration.registered_on)
        .and_then(|registration| registration.unit_id.clone())
}

/// Units that can be offered for allocation: available ones plus the current unit.
pub fn selectable_units(units: Vec<HousingUnit>, current: Option<&UnitId>) -> Vec<HousingUnit> {
    units
        .into_iter()
        .filter(|unit| {
            unit.status == UnitStatus::Available || Some(&unit.unit_id) == current
        })
        .collect()
}
