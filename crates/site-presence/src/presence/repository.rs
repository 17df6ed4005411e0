use chrono::{DateTime, Utc};

use super::domain::{
    Case, FlagAssignment, HousingUnit, OrganisationId, PersonId, PresenceEvent, PresenceState,
    Registration, Site, SiteId,
};

/// Site lookups and the organisation hierarchy above each managing organisation.
pub trait SiteDirectory: Send + Sync {
    fn site(&self, site_id: &SiteId) -> Result<Option<Site>, RepositoryError>;

    /// All ancestors of the organisation, excluding the organisation itself.
    fn ancestors(
        &self,
        organisation_id: &OrganisationId,
    ) -> Result<Vec<OrganisationId>, RepositoryError>;
}

/// Case files and the flags attached to them.
pub trait CaseRepository: Send + Sync {
    fn cases_for(&self, person_id: &PersonId) -> Result<Vec<Case>, RepositoryError>;
    fn flag_assignments(&self, person_id: &PersonId)
        -> Result<Vec<FlagAssignment>, RepositoryError>;
    fn touch_last_seen(&self, person_id: &PersonId, at: DateTime<Utc>)
        -> Result<(), RepositoryError>;
}

/// Site-specific registrations (shelter check-in records).
pub trait RegistrationRepository: Send + Sync {
    fn registrations(
        &self,
        person_id: &PersonId,
        site_id: &SiteId,
    ) -> Result<Vec<Registration>, RepositoryError>;
}

/// Human resources roster.
pub trait StaffRoster: Send + Sync {
    fn has_active_assignment(
        &self,
        person_id: &PersonId,
        organisation_ids: &[OrganisationId],
    ) -> Result<bool, RepositoryError>;
}

pub trait HousingUnitRepository: Send + Sync {
    fn units(&self, site_id: &SiteId) -> Result<Vec<HousingUnit>, RepositoryError>;
}

/// Lookups the evaluator needs, bundled so services take a single store parameter.
pub trait PresenceStore:
    SiteDirectory + CaseRepository + RegistrationRepository + StaffRoster + HousingUnitRepository
{
}

impl<T> PresenceStore for T where
    T: SiteDirectory
        + CaseRepository
        + RegistrationRepository
        + StaffRoster
        + HousingUnitRepository
{
}

/// Presence log owned by the check-in workflow; the evaluator only reads it.
pub trait PresenceTracker: Send + Sync {
    fn current_status(
        &self,
        person_id: &PersonId,
        site_id: &SiteId,
    ) -> Result<PresenceState, RepositoryError>;

    fn is_present(&self, person_id: &PersonId, site_id: &SiteId) -> Result<bool, RepositoryError> {
        Ok(self.current_status(person_id, site_id)? == PresenceState::In)
    }

    fn record_event(&self, event: PresenceEvent) -> Result<(), RepositoryError>;
}

/// Error enumeration for collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
