use chrono::{DateTime, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use site_presence::presence::{
    Case, CaseFlag, CaseId, CaseRepository, CaseStatus, Direction, FlagAssignment, FlagId,
    HousingUnit, HousingUnitRepository, OrganisationId, PersonId, PresenceEvent, PresenceState,
    PresenceTracker, Registration, RegistrationRepository, RegistrationStatus, RepositoryError,
    Site, SiteDirectory, SiteId, SiteType, StaffRoster, UnitId, UnitStatus,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreState {
    sites: HashMap<SiteId, Site>,
    parents: HashMap<OrganisationId, OrganisationId>,
    cases: Vec<Case>,
    flags: Vec<FlagAssignment>,
    registrations: Vec<Registration>,
    staff: Vec<(PersonId, OrganisationId)>,
    units: Vec<HousingUnit>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPresenceStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryPresenceStore {
    pub(crate) fn add_site(&self, site: Site) {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        guard.sites.insert(site.site_id.clone(), site);
    }

    pub(crate) fn set_parent(&self, organisation_id: OrganisationId, parent: OrganisationId) {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        guard.parents.insert(organisation_id, parent);
    }

    pub(crate) fn add_case(&self, case: Case) {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .cases
            .push(case);
    }

    pub(crate) fn attach_flag(&self, assignment: FlagAssignment) {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .flags
            .push(assignment);
    }

    pub(crate) fn add_registration(&self, registration: Registration) {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .registrations
            .push(registration);
    }

    pub(crate) fn add_staff(&self, person_id: PersonId, organisation_id: OrganisationId) {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .staff
            .push((person_id, organisation_id));
    }

    pub(crate) fn add_unit(&self, unit: HousingUnit) {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .units
            .push(unit);
    }

    pub(crate) fn last_seen(&self, person_id: &PersonId) -> Option<DateTime<Utc>> {
        let guard = self.state.lock().expect("store mutex poisoned");
        guard
            .cases
            .iter()
            .filter(|case| &case.person_id == person_id && !case.deleted)
            .filter_map(|case| case.last_seen_on)
            .max()
    }
}

impl SiteDirectory for InMemoryPresenceStore {
    fn site(&self, site_id: &SiteId) -> Result<Option<Site>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.sites.get(site_id).cloned())
    }

    fn ancestors(
        &self,
        organisation_id: &OrganisationId,
    ) -> Result<Vec<OrganisationId>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        let mut ancestors: Vec<OrganisationId> = Vec::new();
        let mut current = organisation_id;
        while let Some(parent) = guard.parents.get(current) {
            if parent == organisation_id || ancestors.contains(parent) {
                break;
            }
            ancestors.push(parent.clone());
            current = parent;
        }
        Ok(ancestors)
    }
}

impl CaseRepository for InMemoryPresenceStore {
    fn cases_for(&self, person_id: &PersonId) -> Result<Vec<Case>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
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
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
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
        let mut guard = self.state.lock().expect("store mutex poisoned");
        for case in guard
            .cases
            .iter_mut()
            .filter(|case| &case.person_id == person_id && !case.deleted)
        {
            case.last_seen_on = Some(at);
        }
        Ok(())
    }
}

impl RegistrationRepository for InMemoryPresenceStore {
    fn registrations(
        &self,
        person_id: &PersonId,
        site_id: &SiteId,
    ) -> Result<Vec<Registration>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
            .registrations
            .iter()
            .filter(|registration| {
                &registration.person_id == person_id && &registration.site_id == site_id
            })
            .cloned()
            .collect())
    }
}

impl StaffRoster for InMemoryPresenceStore {
    fn has_active_assignment(
        &self,
        person_id: &PersonId,
        organisation_ids: &[OrganisationId],
    ) -> Result<bool, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.staff.iter().any(|(staff_id, organisation_id)| {
            staff_id == person_id && organisation_ids.contains(organisation_id)
        }))
    }
}

impl HousingUnitRepository for InMemoryPresenceStore {
    fn units(&self, site_id: &SiteId) -> Result<Vec<HousingUnit>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
            .units
            .iter()
            .filter(|unit| &unit.site_id == site_id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPresenceTracker {
    events: Arc<Mutex<Vec<PresenceEvent>>>,
}

impl InMemoryPresenceTracker {
    pub(crate) fn events(&self) -> Vec<PresenceEvent> {
        self.events.lock().expect("tracker mutex poisoned").clone()
    }
}

impl PresenceTracker for InMemoryPresenceTracker {
    fn current_status(
        &self,
        person_id: &PersonId,
        site_id: &SiteId,
    ) -> Result<PresenceState, RepositoryError> {
        let guard = self.events.lock().expect("tracker mutex poisoned");
        let state = guard
            .iter()
            .rev()
            .find(|event| &event.person_id == person_id && &event.site_id == site_id)
            .map(|event| match event.direction {
                Direction::In => PresenceState::In,
                Direction::Out => PresenceState::Out,
            })
            .unwrap_or(PresenceState::Unknown);
        Ok(state)
    }

    fn record_event(&self, event: PresenceEvent) -> Result<(), RepositoryError> {
        let mut guard = self.events.lock().expect("tracker mutex poisoned");
        guard.push(event);
        Ok(())
    }
}

pub(crate) const DEMO_SHELTER: &str = "shelter-riverside";
pub(crate) const DEMO_GUARD: &str = "staff-guard";
pub(crate) const DEMO_RESIDENT: &str = "client-amal";
pub(crate) const DEMO_FLAGGED_RESIDENT: &str = "client-jonas";
pub(crate) const DEMO_FORMER_RESIDENT: &str = "client-mira";

fn demo_time(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 4, hour, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn demo_case(person_id: &str, status: CaseStatus) -> Case {
    Case {
        case_id: CaseId(format!("case-{person_id}")),
        person_id: PersonId(person_id.to_string()),
        organisation_id: OrganisationId("org-riverside".to_string()),
        status,
        modified_on: demo_time(6),
        last_seen_on: None,
        deleted: false,
    }
}

fn demo_registration(person_id: &str, unit: &str, status: RegistrationStatus) -> Registration {
    Registration {
        person_id: PersonId(person_id.to_string()),
        site_id: SiteId(DEMO_SHELTER.to_string()),
        unit_id: Some(UnitId(unit.to_string())),
        status,
        registered_on: demo_time(7),
        deleted: false,
    }
}

fn demo_unit(id: &str, status: UnitStatus, capacity: u32, blocked: u32, population: u32) -> HousingUnit {
    HousingUnit {
        unit_id: UnitId(id.to_string()),
        site_id: SiteId(DEMO_SHELTER.to_string()),
        name: format!("Room {id}"),
        status,
        capacity: Some(capacity),
        blocked_capacity: Some(blocked),
        population: Some(population),
    }
}

/// Riverside shelter: one guard on shift, a resident, a resident under supervision,
/// a former resident with a closed case, and three rooms.
pub(crate) fn seed_demo_shelter(store: &InMemoryPresenceStore, tracker: &InMemoryPresenceTracker) {
    store.add_site(Site {
        site_id: SiteId(DEMO_SHELTER.to_string()),
        name: "Riverside Shelter".to_string(),
        site_type: SiteType::Shelter,
        organisation_id: OrganisationId("org-riverside".to_string()),
    });
    store.set_parent(
        OrganisationId("org-riverside".to_string()),
        OrganisationId("org-relief".to_string()),
    );
    store.add_staff(
        PersonId(DEMO_GUARD.to_string()),
        OrganisationId("org-relief".to_string()),
    );

    store.add_case(demo_case(DEMO_RESIDENT, CaseStatus::open("OPEN", 2)));
    store.add_registration(demo_registration(
        DEMO_RESIDENT,
        "101",
        RegistrationStatus::CheckedIn,
    ));

    store.add_case(demo_case(DEMO_FLAGGED_RESIDENT, CaseStatus::open("OPEN", 2)));
    store.add_registration(demo_registration(
        DEMO_FLAGGED_RESIDENT,
        "102",
        RegistrationStatus::CheckedIn,
    ));
    store.attach_flag(FlagAssignment {
        person_id: PersonId(DEMO_FLAGGED_RESIDENT.to_string()),
        case_id: CaseId(format!("case-{DEMO_FLAGGED_RESIDENT}")),
        flag: CaseFlag {
            flag_id: FlagId("flag-supervision".to_string()),
            name: "Supervision".to_string(),
            deny_check_in: false,
            deny_check_out: true,
            advise_at_check_in: false,
            advise_at_check_out: true,
            advise_at_id_check: false,
            instructions: Some("Contact supervisor".to_string()),
            deleted: false,
        },
        deleted: false,
    });

    store.add_case(demo_case(DEMO_FORMER_RESIDENT, CaseStatus::closed("CLOSED", 9)));

    store.add_unit(demo_unit("101", UnitStatus::Available, 4, 0, 3));
    store.add_unit(demo_unit("102", UnitStatus::Available, 2, 1, 2));
    store.add_unit(demo_unit("103", UnitStatus::NotAvailable, 6, 6, 0));

    for (person_id, hour) in [(DEMO_GUARD, 7), (DEMO_FLAGGED_RESIDENT, 8)] {
        tracker
            .record_event(PresenceEvent {
                person_id: PersonId(person_id.to_string()),
                site_id: SiteId(DEMO_SHELTER.to_string()),
                direction: Direction::In,
                occurred_at: demo_time(hour),
                recorded_by: PersonId(DEMO_GUARD.to_string()),
            })
            .expect("seed event recorded");
    }
}
