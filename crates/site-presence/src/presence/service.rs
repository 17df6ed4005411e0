use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::cases::CaseRegistry;
use super::domain::{Actor, Direction, PersonId, PresenceEvent, SiteId};
use super::evaluation::{EvaluationConfig, SiteAccessEvaluator, SiteAccessVerdict};
use super::repository::{PresenceStore, PresenceTracker, RepositoryError};
use super::units::{current_unit, selectable_units, HousingUnitView, OccupancyRange};

/// Check-in/check-out request as submitted by reception staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRequest {
    pub person_id: PersonId,
    #[serde(default)]
    pub direction: Option<Direction>,
    pub occurred_at: DateTime<Utc>,
    /// Trusted as supplied, roles included. Callers behind HTTP must take it from authentication.
    pub actor: Actor,
}

/// Result of a registration attempt; `recorded` is false when the verdict did not permit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceRegistrationOutcome {
    pub verdict: SiteAccessVerdict,
    pub direction: Direction,
    pub recorded: bool,
}

/// Listing options for housing units of a site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitListing {
    /// Restrict to units that can be allocated.
    pub selectable: bool,
    /// Person whose current unit stays selectable even when not available.
    pub person_id: Option<PersonId>,
    pub range: OccupancyRange,
}

/// Service composing the evaluator, the presence log and the case files.
pub struct PresenceService<S, T> {
    store: Arc<S>,
    tracker: Arc<T>,
    evaluator: Arc<SiteAccessEvaluator<S, T>>,
}

impl<S, T> PresenceService<S, T>
where
    S: PresenceStore + 'static,
    T: PresenceTracker + 'static,
{
    pub fn new(store: Arc<S>, tracker: Arc<T>, config: EvaluationConfig) -> Self {
        let evaluator = Arc::new(SiteAccessEvaluator::new(
            store.clone(),
            tracker.clone(),
            config,
        ));
        Self {
            store,
            tracker,
            evaluator,
        }
    }

    /// Evaluate a person at a site checkpoint without recording anything.
    pub fn check(
        &self,
        site_id: &SiteId,
        person_id: &PersonId,
        actor: &Actor,
    ) -> Result<SiteAccessVerdict, PresenceServiceError> {
        Ok(self.evaluator.evaluate(site_id, person_id, actor)?)
    }

    /// Evaluate and, when permitted, record the presence event.
    pub fn register(
        &self,
        site_id: &SiteId,
        request: PresenceRequest,
    ) -> Result<PresenceRegistrationOutcome, PresenceServiceError> {
        let PresenceRequest {
            person_id,
            direction,
            occurred_at,
            actor,
        } = request;

        let verdict = self.evaluator.evaluate(site_id, &person_id, &actor)?;
        let direction = match direction {
            Some(direction) => direction,
            None => Direction::toggle_from(self.tracker.current_status(&person_id, site_id)?),
        };

        if !verdict.permits(direction) {
            return Ok(PresenceRegistrationOutcome {
                verdict,
                direction,
                recorded: false,
            });
        }

        self.tracker.record_event(PresenceEvent {
            person_id: person_id.clone(),
            site_id: site_id.clone(),
            direction,
            occurred_at,
            recorded_by: actor.person_id.clone(),
        })?;

        if CaseRegistry::new(&*self.store).has_any_case(&person_id)? {
            self.store.touch_last_seen(&person_id, occurred_at)?;
        }

        info!(
            site = %site_id.0,
            person = %person_id.0,
            ?direction,
            "presence event recorded"
        );

        Ok(PresenceRegistrationOutcome {
            verdict,
            direction,
            recorded: true,
        })
    }

    /// Housing units of a site with their occupancy.
    pub fn units(
        &self,
        site_id: &SiteId,
        listing: &UnitListing,
    ) -> Result<Vec<HousingUnitView>, PresenceServiceError> {
        let mut units = self.store.units(site_id)?;

        if listing.selectable {
            let current = match &listing.person_id {
                Some(person_id) => current_unit(&self.store.registrations(person_id, site_id)?),
                None => None,
            };
            units = selectable_units(units, current.as_ref());
        }

        Ok(units
            .iter()
            .map(HousingUnitView::from)
            .filter(|view| listing.range.contains(view.occupancy))
            .collect())
    }
}

/// Error raised by the presence service.
#[derive(Debug, thiserror::Error)]
pub enum PresenceServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
