use super::domain::HousingUnit;

/// Occupancy of a housing unit in percent.
///
/// Returns `None` when the unit has no known capacity. Blocked capacity is
/// clamped to the total; if the population exceeds what is left, occupied
/// blocked places count as available again, up to the total capacity.
/// A population above the total capacity therefore reports more than 100.
/// Floor rounding keeps 100 reserved for units that are actually full.
pub fn occupancy_percent(
    total_capacity: Option<u32>,
    blocked_capacity: Option<u32>,
    population: Option<u32>,
) -> Option<u32> {
    let total_capacity = total_capacity.filter(|capacity| *capacity > 0)?;
    let blocked_capacity = blocked_capacity.unwrap_or(0).min(total_capacity);
    let population = population.unwrap_or(0);

    let mut available = total_capacity - blocked_capacity;
    if population > available {
        available = total_capacity.min(population);
    }

    if available == 0 {
        return Some(if population > 0 { 100 } else { 0 });
    }

    let rate = u64::from(population) * 100 / u64::from(available);
    Some(rate.min(u64::from(u32::MAX)) as u32)
}

impl HousingUnit {
    pub fn occupancy(&self) -> Option<u32> {
        occupancy_percent(self.capacity, self.blocked_capacity, self.population)
    }

    /// Free places after blocked capacity and current occupants.
    pub fn available_capacity(&self) -> u32 {
        self.capacity
            .unwrap_or(0)
            .saturating_sub(self.blocked_capacity.unwrap_or(0))
            .saturating_sub(self.population.unwrap_or(0))
    }
}
