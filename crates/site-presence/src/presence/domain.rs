use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered persons (clients and staff alike).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonId(pub String);

/// Identifier wrapper for sites (shelters, offices, facilities).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteId(pub String);

/// Identifier wrapper for organisations in the managing hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganisationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlagId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub String);

/// Kind of site, deciding whether clients need a registration record to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteType {
    Shelter,
    Office,
    Facility,
}

impl SiteType {
    pub fn requires_registration(self) -> bool {
        matches!(self, SiteType::Shelter)
    }

    pub fn label(self) -> &'static str {
        match self {
            SiteType::Shelter => "Shelter",
            SiteType::Office => "Office",
            SiteType::Facility => "Facility",
        }
    }
}

/// A site together with its managing organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub site_id: SiteId,
    pub name: String,
    pub site_type: SiteType,
    pub organisation_id: OrganisationId,
}

/// Position of a case in the status workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStatus {
    pub code: String,
    pub workflow_position: u16,
    pub is_closed: bool,
}

impl CaseStatus {
    pub fn open(code: &str, workflow_position: u16) -> Self {
        Self {
            code: code.to_string(),
            workflow_position,
            is_closed: false,
        }
    }

    pub fn closed(code: &str, workflow_position: u16) -> Self {
        Self {
            code: code.to_string(),
            workflow_position,
            is_closed: true,
        }
    }
}

/// A person's engagement with one managing organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: CaseId,
    pub person_id: PersonId,
    pub organisation_id: OrganisationId,
    pub status: CaseStatus,
    pub modified_on: DateTime<Utc>,
    #[serde(default)]
    pub last_seen_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: bool,
}

impl Case {
    pub fn is_closed(&self) -> bool {
        self.status.is_closed
    }
}

/// Policy tag that can be attached to cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFlag {
    pub flag_id: FlagId,
    pub name: String,
    #[serde(default)]
    pub deny_check_in: bool,
    #[serde(default)]
    pub deny_check_out: bool,
    #[serde(default)]
    pub advise_at_check_in: bool,
    #[serde(default)]
    pub advise_at_check_out: bool,
    #[serde(default)]
    pub advise_at_id_check: bool,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

/// Association of a flag with a person's case; soft-deleted on removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagAssignment {
    pub person_id: PersonId,
    pub case_id: CaseId,
    pub flag: CaseFlag,
    #[serde(default)]
    pub deleted: bool,
}

/// Shelter registration lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Planned,
    CheckedIn,
    CheckedOut,
}

/// Registration of a person at a site, optionally allocated to a housing unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub person_id: PersonId,
    pub site_id: SiteId,
    #[serde(default)]
    pub unit_id: Option<UnitId>,
    pub status: RegistrationStatus,
    pub registered_on: DateTime<Utc>,
    #[serde(default)]
    pub deleted: bool,
}

impl Registration {
    pub fn is_active(&self) -> bool {
        !self.deleted && self.status != RegistrationStatus::CheckedOut
    }
}

/// Last known presence of a person at a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceState {
    In,
    Out,
    Unknown,
}

/// Direction of a presence event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Direction implied by the current presence: present persons leave, everyone else enters.
    pub fn toggle_from(state: PresenceState) -> Self {
        match state {
            PresenceState::In => Direction::Out,
            PresenceState::Out | PresenceState::Unknown => Direction::In,
        }
    }
}

/// Recorded check-in or check-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEvent {
    pub person_id: PersonId,
    pub site_id: SiteId,
    pub direction: Direction,
    pub occurred_at: DateTime<Utc>,
    pub recorded_by: PersonId,
}

/// Staff member performing a check, carried explicitly with each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub person_id: PersonId,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Actor {
    pub fn new(person_id: PersonId) -> Self {
        Self {
            person_id,
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.roles.insert(role.to_string());
        self
    }

    pub fn has_any_role(&self, roles: &BTreeSet<String>) -> bool {
        self.roles.iter().any(|role| roles.contains(role))
    }
}

/// Whether a housing unit can currently be allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Available,
    NotAvailable,
}

/// Capacity-bounded sub-location within a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousingUnit {
    pub unit_id: UnitId,
    pub site_id: SiteId,
    pub name: String,
    pub status: UnitStatus,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub blocked_capacity: Option<u32>,
    #[serde(default)]
    pub population: Option<u32>,
}
