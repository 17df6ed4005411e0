use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::presence::domain::{
    Actor, Case, CaseFlag, CaseId, CaseStatus, Direction, FlagAssignment, FlagId, HousingUnit,
    OrganisationId, PersonId, PresenceEvent, PresenceState, Registration, RegistrationStatus,
    Site, SiteId, SiteType, UnitId, UnitStatus,
};
use crate::presence::repository::{
    CaseRepository, HousingUnitRepository, PresenceTracker, RegistrationRepository,
    RepositoryError, SiteDirectory, StaffRoster,
};
use crate::presence::{presence_router, EvaluationConfig, PresenceService};

pub(super) const SHELTER: &str = "site-shelter";
pub(super) const OFFICE: &str = "site-office";
pub(super) const CLIENT: &str = "person-client";
pub(super) const GUARD: &str = "person-guard";
pub(super) const VISITOR: &str = "person-visitor";

pub(super) fn timestamp(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn site_id(id: &str) -> SiteId {
    SiteId(id.to_string())
}

pub(super) fn person(id: &str) -> PersonId {
    PersonId(id.to_string())
}

pub(super) fn org(id: &str) -> OrganisationId {
    OrganisationId(id.to_string())
}

pub(super) fn open_case(person_id: &str, organisation: &str) -> Case {
    Case {
        case_id: CaseId(format!("case-{person_id}-{organisation}")),
        person_id: person(person_id),
        organisation_id: org(organisation),
        status: CaseStatus::open("OPEN", 2),
        modified_on: timestamp(1, 9),
        last_seen_on: None,
        deleted: false,
    }
}

pub(super) fn registration(person_id: &str, status: RegistrationStatus) -> Registration {
    Registration {
        person_id: person(person_id),
        site_id: site_id(SHELTER),
        unit_id: Some(UnitId("unit-a".to_string())),
        status,
        registered_on: timestamp(1, 10),
        deleted: false,
    }
}

pub(super) fn flag(name: &str) -> CaseFlag {
    CaseFlag {
        flag_id: FlagId(name.to_lowercase()),
        name: name.to_string(),
        deny_check_in: false,
        deny_check_out: false,
        advise_at_check_in: false,
        advise_at_check_out: false,
        advise_at_id_check: false,
        instructions: None,
        deleted: false,
    }
}

pub(super) fn unit(id: &str, status: UnitStatus, capacity: u32, population: u32) -> HousingUnit {
    HousingUnit {
        unit_id: UnitId(id.to_string()),
        site_id: site_id(SHELTER),
        name: format!("Unit {id}"),
        status,
        capacity: Some(capacity),
        blocked_capacity: None,
        population: Some(population),
    }
}

/// Staff member on shift: present at the shelter, holding a security role.
pub(super) fn guard_actor() -> Actor {
    Actor::new(person(GUARD)).with_role("SECURITY")
}

#[derive(Default)]
pub(super) struct MemoryStoreState {
    pub(super) sites: HashMap<SiteId, Site>,
    pub(super) parents: HashMap<OrganisationId, OrganisationId>,
    pub(super) cases: Vec<Case>,
    pub(super) flags: Vec<FlagAssignment>,
    pub(super) registrations: Vec<Registration>,
    pub(super) staff: Vec<(PersonId, OrganisationId)>,
    pub(super) units: Vec<HousingUnit>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) state: Arc<Mutex<MemoryStoreState>>,
}

impl MemoryStore {
    /// Shelter run by `org-shelter` under `org-root`, an office run by `org-root`,
    /// the guard on the shelter organisation's roster.
    pub(super) fn seeded() -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().expect("store mutex poisoned");
            state.sites.insert(
                site_id(SHELTER),
                Site {
                    site_id: site_id(SHELTER),
                    name: "North Shelter".to_string(),
                    site_type: SiteType::Shelter,
                    organisation_id: org("org-shelter"),
                },
            );
            state.sites.insert(
                site_id(OFFICE),
                Site {
                    site_id: site_id(OFFICE),
                    name: "Head Office".to_string(),
                    site_type: SiteType::Office,
                    organisation_id: org("org-root"),
                },
            );
            state.parents.insert(org("org-shelter"), org("org-root"));
            state.staff.push((person(GUARD), org("org-shelter")));
        }
        store
    }

    pub(super) fn with(self, update: impl FnOnce(&mut MemoryStoreState)) -> Self {
        {
            let mut state = self.state.lock().expect("store mutex poisoned");
            update(&mut *state);
        }
        self
    }

    pub(super) fn attach_flag(&self, person_id: &str, flag: CaseFlag) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        let case_id = state
            .cases
            .iter()
            .find(|case| case.person_id.0 == person_id)
            .map(|case| case.case_id.clone())
            .unwrap_or_else(|| CaseId(format!("case-{person_id}")));
        state.flags.push(FlagAssignment {
            person_id: person(person_id),
            case_id,
            flag,
            deleted: false,
        });
    }

    pub(super) fn last_seen(&self, person_id: &str) -> Option<DateTime<Utc>> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .cases
            .iter()
            .find(|case| case.person_id.0 == person_id)
            .and_then(|case| case.last_seen_on)
    }
}

impl SiteDirectory for MemoryStore {
    fn site(&self, site_id: &SiteId) -> Result<Option<Site>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.sites.get(site_id).cloned())
    }

    fn ancestors(
        &self,
        organisation_id: &OrganisationId,
    ) -> Result<Vec<OrganisationId>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        let mut ancestors = Vec::new();
        let mut current = organisation_id;
        while let Some(parent) = state.parents.get(current) {
            if parent == organisation_id || ancestors.contains(parent) {
                break;
            }
            ancestors.push(parent.clone());
            current = parent;
        }
        Ok(ancestors)
    }
}

impl CaseRepository for MemoryStore {
    fn cases_for(&self, person_id: &PersonId) -> Result<Vec<Case>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .cases
            .iter()
            .filter(|case| &case.person_id == person_id)
            .cloned()
            .collect())
    }

    fn flag_assignments(
        &self,
        person_id: &PersonId,
    ) -> Result<Vec<FlagAssignment>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .flags
            .iter()
            .filter(|assignment| &assignment.person_id == person_id)
            .cloned()
            .collect())
    }

    fn touch_last_seen(
        &self,
        person_id: &PersonId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        for case in state
            .cases
            .iter_mut()
            .filter(|case| &case.person_id == person_id && !case.deleted)
        {
            case.last_seen_on = Some(at);
        }
        Ok(())
    }
}

impl RegistrationRepository for MemoryStore {
    fn registrations(
        &self,
        person_id: &PersonId,
        site_id: &SiteId,
    ) -> Result<Vec<Registration>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .registrations
            .iter()
            .filter(|registration| {
                &registration.person_id == person_id && &registration.site_id == site_id
            })
            .cloned()
            .collect())
    }
}

impl StaffRoster for MemoryStore {
    fn has_active_assignment(
        &self,
        person_id: &PersonId,
        organisation_ids: &[OrganisationId],
    ) -> Result<bool, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state.staff.iter().any(|(staff_id, organisation_id)| {
            staff_id == person_id && organisation_ids.contains(organisation_id)
        }))
    }
}

impl HousingUnitRepository for MemoryStore {
    fn units(&self, site_id: &SiteId) -> Result<Vec<HousingUnit>, RepositoryError> {
        let state = self.state.lock().expect("store mutex poisoned");
        Ok(state
            .units
            .iter()
            .filter(|unit| &unit.site_id == site_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryTracker {
    events: Arc<Mutex<Vec<PresenceEvent>>>,
}

impl MemoryTracker {
    /// Tracker where the given people are currently inside the shelter.
    pub(super) fn present(people: &[&str]) -> Self {
        let tracker = Self::default();
        for person_id in people {
            tracker
                .record_event(PresenceEvent {
                    person_id: person(person_id),
                    site_id: site_id(SHELTER),
                    direction: Direction::In,
                    occurred_at: timestamp(1, 7),
                    recorded_by: person(person_id),
                })
                .expect("memory tracker accepts events");
        }
        tracker
    }

    pub(super) fn events(&self) -> Vec<PresenceEvent> {
        self.events.lock().expect("tracker mutex poisoned").clone()
    }
}

impl PresenceTracker for MemoryTracker {
    fn current_status(
        &self,
        person_id: &PersonId,
        site_id: &SiteId,
    ) -> Result<PresenceState, RepositoryError> {
        let events = self.events.lock().expect("tracker mutex poisoned");
        let last = events
            .iter()
            .filter(|event| &event.person_id == person_id && &event.site_id == site_id)
            .last();
        Ok(match last {
            Some(event) => match event.direction {
                Direction::In => PresenceState::In,
                Direction::Out => PresenceState::Out,
            },
            None => PresenceState::Unknown,
        })
    }

    fn record_event(&self, event: PresenceEvent) -> Result<(), RepositoryError> {
        self.events
            .lock()
            .expect("tracker mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl SiteDirectory for UnavailableStore {
    fn site(&self, _site_id: &SiteId) -> Result<Option<Site>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn ancestors(
        &self,
        _organisation_id: &OrganisationId,
    ) -> Result<Vec<OrganisationId>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl CaseRepository for UnavailableStore {
    fn cases_for(&self, _person_id: &PersonId) -> Result<Vec<Case>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn flag_assignments(
        &self,
        _person_id: &PersonId,
    ) -> Result<Vec<FlagAssignment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn touch_last_seen(
        &self,
        _person_id: &PersonId,
        _at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl RegistrationRepository for UnavailableStore {
    fn registrations(
        &self,
        _person_id: &PersonId,
        _site_id: &SiteId,
    ) -> Result<Vec<Registration>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl StaffRoster for UnavailableStore {
    fn has_active_assignment(
        &self,
        _person_id: &PersonId,
        _organisation_ids: &[OrganisationId],
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl HousingUnitRepository for UnavailableStore {
    fn units(&self, _site_id: &SiteId) -> Result<Vec<HousingUnit>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Shelter resident with an open case, a checked-in registration and no flags.
pub(super) fn resident_store() -> MemoryStore {
    MemoryStore::seeded().with(|state| {
        state.cases.push(open_case(CLIENT, "org-shelter"));
        state
            .registrations
            .push(registration(CLIENT, RegistrationStatus::CheckedIn));
        state.units = vec![
            unit("unit-a", UnitStatus::NotAvailable, 4, 4),
            unit("unit-b", UnitStatus::Available, 3, 1),
            unit("unit-c", UnitStatus::Available, 10, 9),
        ];
    })
}

pub(super) fn build_service(
    store: MemoryStore,
    tracker: MemoryTracker,
) -> PresenceService<MemoryStore, MemoryTracker> {
    PresenceService::new(Arc::new(store), Arc::new(tracker), EvaluationConfig::default())
}

pub(super) fn router_with_service(
    service: PresenceService<MemoryStore, MemoryTracker>,
) -> axum::Router {
    presence_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
