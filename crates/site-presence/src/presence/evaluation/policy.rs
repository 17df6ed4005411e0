use serde::{Deserialize, Serialize, Serializer};

use super::super::domain::Direction;

pub(crate) const SELF_REGISTRATION_NOT_PERMITTED: &str =
    "Self-registration not permitted. Please register with authorized staff at the site.";
pub(crate) const ACTOR_NOT_PRESENT: &str =
    "You must be reported as present at the site yourself in order to register the presence of others.";

/// Whether a person may pass in one direction.
///
/// Serialized as `true`, `false` or `null`: `Denied` comes from case flag
/// policy, `Blocked` from a reason unrelated to flags (actor checks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Passage {
    Allowed,
    Denied,
    Blocked,
}

impl Passage {
    pub fn from_policy(allowed: bool) -> Self {
        if allowed {
            Passage::Allowed
        } else {
            Passage::Denied
        }
    }

    pub fn is_allowed(self) -> bool {
        self == Passage::Allowed
    }

    /// Blocks an allowed passage; denials stay denials.
    pub fn suspend(self) -> Self {
        match self {
            Passage::Allowed => Passage::Blocked,
            other => other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Passage::Allowed => "allowed",
            Passage::Denied => "denied",
            Passage::Blocked => "blocked",
        }
    }
}

impl From<Passage> for Option<bool> {
    fn from(value: Passage) -> Self {
        match value {
            Passage::Allowed => Some(true),
            Passage::Denied => Some(false),
            Passage::Blocked => None,
        }
    }
}

impl From<Option<bool>> for Passage {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Passage::Allowed,
            Some(false) => Passage::Denied,
            None => Passage::Blocked,
        }
    }
}

/// Reasons a person cannot be considered for registration at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictError {
    InvalidSite,
    ClosedCase,
    NotCurrentlyResident,
    InvalidId,
}

impl VerdictError {
    pub fn label(self) -> &'static str {
        match self {
            VerdictError::InvalidSite => "Invalid site",
            VerdictError::ClosedCase => "Closed case",
            VerdictError::NotCurrentlyResident => "Not currently a resident",
            VerdictError::InvalidId => "Invalid ID",
        }
    }
}

impl Serialize for VerdictError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Instruction shown to reception staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    pub text: String,
}

/// Restrictions derived from who performs the check rather than who is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActorRestriction {
    SelfRegistration,
    ActorNotPresent,
}

/// Outcome of evaluating a person at a site checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteAccessVerdict {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<VerdictError>,
    pub allowed_in: Passage,
    pub allowed_out: Passage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub info: Vec<Advisory>,
}

impl SiteAccessVerdict {
    pub fn invalid(error: VerdictError) -> Self {
        Self {
            valid: false,
            error: Some(error),
            allowed_in: Passage::Denied,
            allowed_out: Passage::Denied,
            info: Vec::new(),
        }
    }

    pub fn admitted(allowed_in: bool, allowed_out: bool, info: Vec<Advisory>) -> Self {
        Self {
            valid: true,
            error: None,
            allowed_in: Passage::from_policy(allowed_in),
            allowed_out: Passage::from_policy(allowed_out),
            info,
        }
    }

    pub fn passage(&self, direction: Direction) -> Passage {
        match direction {
            Direction::In => self.allowed_in,
            Direction::Out => self.allowed_out,
        }
    }

    pub fn permits(&self, direction: Direction) -> bool {
        self.valid && self.error.is_none() && self.passage(direction).is_allowed()
    }

    pub(crate) fn restrict(&mut self, restriction: ActorRestriction) {
        let instructions = match restriction {
            ActorRestriction::SelfRegistration => {
                self.allowed_in = self.allowed_in.suspend();
                SELF_REGISTRATION_NOT_PERMITTED
            }
            ActorRestriction::ActorNotPresent => {
                self.allowed_in = self.allowed_in.suspend();
                self.allowed_out = self.allowed_out.suspend();
                ACTOR_NOT_PRESENT
            }
        };
        self.info = vec![Advisory {
            heading: None,
            text: instructions.to_string(),
        }];
    }

    pub fn summary(&self) -> String {
        match self.error {
            Some(error) => format!("rejected: {}", error.label()),
            None if !self.valid => "rejected".to_string(),
            None => format!(
                "in {} / out {}",
                self.allowed_in.label(),
                self.allowed_out.label()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn suspend_only_tightens_allowed_passages() {
        assert_eq!(Passage::Allowed.suspend(), Passage::Blocked);
        assert_eq!(Passage::Denied.suspend(), Passage::Denied);
        assert_eq!(Passage::Blocked.suspend(), Passage::Blocked);
    }

    #[test]
    fn self_registration_blocks_entry_only() {
        let mut verdict = SiteAccessVerdict::admitted(true, true, Vec::new());
        verdict.restrict(ActorRestriction::SelfRegistration);
        assert_eq!(verdict.allowed_in, Passage::Blocked);
        assert_eq!(verdict.allowed_out, Passage::Allowed);
        assert_eq!(verdict.info[0].text, SELF_REGISTRATION_NOT_PERMITTED);
    }

    #[test]
    fn absent_actor_keeps_flag_denials() {
        let flagged = vec![Advisory {
            heading: Some("Curfew".to_string()),
            text: "Call night shift".to_string(),
        }];
        let mut verdict = SiteAccessVerdict::admitted(true, false, flagged);
        verdict.restrict(ActorRestriction::ActorNotPresent);
        assert_eq!(verdict.allowed_in, Passage::Blocked);
        assert_eq!(verdict.allowed_out, Passage::Denied);
        assert_eq!(verdict.info.len(), 1);
        assert_eq!(verdict.info[0].text, ACTOR_NOT_PRESENT);
        assert!(!verdict.permits(Direction::In));
    }

    #[test]
    fn serializes_tri_state_passages_and_error_labels() {
        let mut verdict = SiteAccessVerdict::admitted(true, false, Vec::new());
        verdict.allowed_in = Passage::Blocked;
        assert_eq!(
            serde_json::to_value(&verdict).expect("serializes"),
            json!({ "valid": true, "allowed_in": null, "allowed_out": false })
        );

        let invalid = SiteAccessVerdict::invalid(VerdictError::ClosedCase);
        assert_eq!(
            serde_json::to_value(&invalid).expect("serializes"),
            json!({
                "valid": false,
                "error": "Closed case",
                "allowed_in": false,
                "allowed_out": false,
            })
        );
        assert_eq!(invalid.summary(), "rejected: Closed case");
    }
}
