use super::domain::{Case, OrganisationId, PersonId};
use super::repository::{CaseRepository, RepositoryError};

/// Resolves which case file governs a person's access to a site.
pub struct CaseRegistry<'a, C: ?Sized> {
    cases: &'a C,
}

impl<'a, C> CaseRegistry<'a, C>
where
    C: CaseRepository + ?Sized,
{
    pub fn new(cases: &'a C) -> Self {
        Self { cases }
    }

    /// Current case of the person with one of the given organisations.
    ///
    /// Deleted cases are ignored. When several cases qualify, the most recently
    /// modified one wins, with the case id as final tie-break.
    pub fn find_current_case(
        &self,
        person_id: &PersonId,
        organisation_ids: &[OrganisationId],
    ) -> Result<Option<Case>, RepositoryError> {
        let current = self
            .cases
            .cases_for(person_id)?
            .into_iter()
            .filter(|case| !case.deleted && &case.person_id == person_id)
            .filter(|case| organisation_ids.contains(&case.organisation_id))
            .max_by(|a, b| {
                a.modified_on
                    .cmp(&b.modified_on)
                    .then_with(|| a.case_id.cmp(&b.case_id))
            });
        Ok(current)
    }

    /// Whether the person has any case file at all, regardless of organisation.
    pub fn has_any_case(&self, person_id: &PersonId) -> Result<bool, RepositoryError> {
        Ok(self
            .cases
            .cases_for(person_id)?
            .iter()
            .any(|case| !case.deleted))
    }
}
