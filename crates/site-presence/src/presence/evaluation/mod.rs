mod config;
mod policy;

pub use config::{EvaluationConfig, DEFAULT_ELEVATED_ROLES};
pub use policy::{Advisory, Passage, SiteAccessVerdict, VerdictError};

#[cfg(test)]
pub(crate) use policy::{ACTOR_NOT_PRESENT, SELF_REGISTRATION_NOT_PERMITTED};

use std::sync::Arc;

use policy::ActorRestriction;
use tracing::debug;

use super::cases::CaseRegistry;
use super::domain::{Actor, Case, OrganisationId, PersonId, Site, SiteId};
use super::flags::{assess_flags, FlagRules};
use super::repository::{PresenceStore, PresenceTracker, RepositoryError};

/// Decides whether a person may be checked in or out at a site.
pub struct SiteAccessEvaluator<S, T> {
    store: Arc<S>,
    tracker: Arc<T>,
    config: EvaluationConfig,
}

impl<S, T> SiteAccessEvaluator<S, T>
where
    S: PresenceStore,
    T: PresenceTracker,
{
    pub fn new(store: Arc<S>, tracker: Arc<T>, config: EvaluationConfig) -> Self {
        Self {
            store,
            tracker,
            config,
        }
    }

    pub fn evaluate(
        &self,
        site_id: &SiteId,
        person_id: &PersonId,
        actor: &Actor,
    ) -> Result<SiteAccessVerdict, RepositoryError> {
        let Some(site) = self.store.site(site_id)? else {
            debug!(site = %site_id.0, "presence check for unknown site");
            return Ok(SiteAccessVerdict::invalid(VerdictError::InvalidSite));
        };

        let organisation_ids = self.organisation_ids(&site)?;
        let registry = CaseRegistry::new(&*self.store);

        let mut verdict = match registry.find_current_case(person_id, &organisation_ids)? {
            Some(case) => self.client_status(&site, person_id, &case)?,
            None => self.staff_status(person_id, &organisation_ids)?,
        };

        if verdict.valid && verdict.error.is_none() {
            if &actor.person_id == person_id {
                if !actor.has_any_role(&self.config.elevated_roles) {
                    verdict.restrict(ActorRestriction::SelfRegistration);
                }
            } else if !self.tracker.is_present(&actor.person_id, site_id)? {
                verdict.restrict(ActorRestriction::ActorNotPresent);
            }
        }

        debug!(
            site = %site_id.0,
            person = %person_id.0,
            outcome = %verdict.summary(),
            "site access evaluated"
        );
        Ok(verdict)
    }

    /// Managing organisation followed by its ancestors, without duplicates.
    fn organisation_ids(&self, site: &Site) -> Result<Vec<OrganisationId>, RepositoryError> {
        let mut organisation_ids = vec![site.organisation_id.clone()];
        for ancestor in self.store.ancestors(&site.organisation_id)? {
            if !organisation_ids.contains(&ancestor) {
                organisation_ids.push(ancestor);
            }
        }
        Ok(organisation_ids)
    }

    fn client_status(
        &self,
        site: &Site,
        person_id: &PersonId,
        case: &Case,
    ) -> Result<SiteAccessVerdict, RepositoryError> {
        if case.is_closed() {
            return Ok(SiteAccessVerdict::invalid(VerdictError::ClosedCase));
        }

        if site.site_type.requires_registration() {
            let registered = self
                .store
                .registrations(person_id, &site.site_id)?
                .iter()
                .any(|registration| registration.is_active());
            if !registered {
                return Ok(SiteAccessVerdict::invalid(
                    VerdictError::NotCurrentlyResident,
                ));
            }
        }

        let presence = self.tracker.current_status(person_id, &site.site_id)?;
        let flags = FlagRules::new(&*self.store).active_flags(person_id)?;
        let assessment = assess_flags(&flags, presence);

        Ok(SiteAccessVerdict::admitted(
            assessment.allowed_in,
            assessment.allowed_out,
            assessment.advisories,
        ))
    }

    fn staff_status(
        &self,
        person_id: &PersonId,
        organisation_ids: &[OrganisationId],
    ) -> Result<SiteAccessVerdict, RepositoryError> {
        if self
            .store
            .has_active_assignment(person_id, organisation_ids)?
        {
            Ok(SiteAccessVerdict::admitted(true, true, Vec::new()))
        } else {
            Ok(SiteAccessVerdict::invalid(VerdictError::InvalidId))
        }
    }
}
