//! Site presence: checkpoint evaluation, presence registration and housing unit occupancy.
//!
//! Storage and the presence log are reached through the traits in [`repository`], so the
//! evaluator and the service can be driven by any backend (and by in-memory doubles in tests).

pub mod cases;
pub mod domain;
pub mod evaluation;
pub mod flags;
pub mod occupancy;
pub mod repository;
pub mod router;
pub mod service;
pub mod units;

#[cfg(test)]
mod tests;

pub use cases::CaseRegistry;
pub use domain::{
    Actor, Case, CaseFlag, CaseId, CaseStatus, Direction, FlagAssignment, FlagId, HousingUnit,
    OrganisationId, PersonId, PresenceEvent, PresenceState, Registration, RegistrationStatus,
    Site, SiteId, SiteType, UnitId, UnitStatus,
};
pub use evaluation::{
    Advisory, EvaluationConfig, Passage, SiteAccessEvaluator, SiteAccessVerdict, VerdictError,
};
pub use flags::{assess_flags, FlagAssessment, FlagRules};
pub use occupancy::occupancy_percent;
pub use repository::{
    CaseRepository, HousingUnitRepository, PresenceStore, PresenceTracker,
    RegistrationRepository, RepositoryError, SiteDirectory, StaffRoster,
};
pub use router::{presence_router, StatusCheckRequest};
pub use service::{
    PresenceRegistrationOutcome, PresenceRequest, PresenceService, PresenceServiceError,
    UnitListing,
};
pub use units::{HousingUnitView, OccupancyRange};
