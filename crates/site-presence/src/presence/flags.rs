use super::domain::{CaseFlag, PersonId, PresenceState};
use super::evaluation::Advisory;
use super::repository::{CaseRepository, RepositoryError};

pub(crate) const NO_FLAG_INSTRUCTIONS: &str = "No instructions for this flag";

/// Reads the case flags attached to a person and folds their policy bits.
pub struct FlagRules<'a, C: ?Sized> {
    cases: &'a C,
}

impl<'a, C> FlagRules<'a, C>
where
    C: CaseRepository + ?Sized,
{
    pub fn new(cases: &'a C) -> Self {
        Self { cases }
    }

    /// Flags attached through live assignments, in storage order.
    pub fn active_flags(&self, person_id: &PersonId) -> Result<Vec<CaseFlag>, RepositoryError> {
        Ok(self
            .cases
            .flag_assignments(person_id)?
            .into_iter()
            .filter(|assignment| !assignment.deleted && !assignment.flag.deleted)
            .map(|assignment| assignment.flag)
            .collect())
    }
}

/// Combined effect of a set of flags for one presence state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagAssessment {
    pub allowed_in: bool,
    pub allowed_out: bool,
    pub advisories: Vec<Advisory>,
}

pub fn assess_flags(flags: &[CaseFlag], presence: PresenceState) -> FlagAssessment {
    let allowed_in = !flags.iter().any(|flag| flag.deny_check_in);
    let allowed_out = !flags.iter().any(|flag| flag.deny_check_out);

    let advisories = flags
        .iter()
        .filter(|flag| should_advise(flag, presence))
        .map(|flag| {
            let text = flag
                .instructions
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .unwrap_or(NO_FLAG_INSTRUCTIONS);
            Advisory {
                heading: Some(flag.name.clone()),
                text: text.to_string(),
            }
        })
        .collect();

    FlagAssessment {
        allowed_in,
        allowed_out,
        advisories,
    }
}

/// A person inside is about to leave, a person outside is about to enter.
fn should_advise(flag: &CaseFlag, presence: PresenceState) -> bool {
    if flag.advise_at_id_check {
        return true;
    }
    match presence {
        PresenceState::In => flag.advise_at_check_out,
        PresenceState::Out => flag.advise_at_check_in,
        PresenceState::Unknown => flag.advise_at_check_in || flag.advise_at_check_out,
    }
}
