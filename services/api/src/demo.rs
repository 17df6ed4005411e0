use crate::infra::{
    seed_demo_shelter, InMemoryPresenceStore, InMemoryPresenceTracker, DEMO_FLAGGED_RESIDENT,
    DEMO_FORMER_RESIDENT, DEMO_GUARD, DEMO_RESIDENT, DEMO_SHELTER,
};
use chrono::{DateTime, Utc};
use clap::Args;
use site_presence::error::AppError;
use site_presence::presence::{
    Actor, EvaluationConfig, OccupancyRange, PersonId, PresenceRequest, PresenceService,
    PresenceServiceError, Site, SiteAccessVerdict, SiteDirectory, SiteId, UnitListing,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Timestamp for recorded presence events (RFC 3339). Defaults to now.
    #[arg(long)]
    pub(crate) at: Option<DateTime<Utc>>,
    /// Extra roles granted to the checkpoint guard (e.g. ORG_ADMIN)
    #[arg(long = "guard-role")]
    pub(crate) guard_roles: Vec<String>,
    /// Only list units whose occupancy is at least this percentage
    #[arg(long)]
    pub(crate) min_occupancy: Option<u32>,
    /// Skip the housing unit portion of the demo.
    #[arg(long)]
    pub(crate) skip_units: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        at,
        guard_roles,
        min_occupancy,
        skip_units,
    } = args;
    let at = at.unwrap_or_else(Utc::now);

    let store = Arc::new(InMemoryPresenceStore::default());
    let tracker = Arc::new(InMemoryPresenceTracker::default());
    seed_demo_shelter(&store, &tracker);
    let service = PresenceService::new(store.clone(), tracker.clone(), EvaluationConfig::default());

    let site = SiteId(DEMO_SHELTER.to_string());
    let guard = guard_roles.into_iter().fold(
        Actor::new(PersonId(DEMO_GUARD.to_string())).with_role("SECURITY"),
        |actor, role| actor.with_role(&role),
    );

    match store.site(&site).map_err(PresenceServiceError::from)? {
        Some(shelter) => println!("Site presence demo: {}", site_heading(&shelter)),
        None => println!("Site presence demo: {DEMO_SHELTER}"),
    }
    println!("\nCheckpoint status (guard {DEMO_GUARD} on shift)");
    for person in [
        DEMO_RESIDENT,
        DEMO_FLAGGED_RESIDENT,
        DEMO_FORMER_RESIDENT,
        "visitor-unknown",
    ] {
        let verdict = service.check(&site, &PersonId(person.to_string()), &guard)?;
        render_verdict(person, &verdict);
    }

    let resident = PersonId(DEMO_RESIDENT.to_string());
    let self_service = Actor::new(resident.clone());
    let verdict = service.check(&site, &resident, &self_service)?;
    println!("\nSelf check by {DEMO_RESIDENT} without a staff role");
    render_verdict(DEMO_RESIDENT, &verdict);

    println!("\nPresence registration");
    for person in [DEMO_RESIDENT, DEMO_FLAGGED_RESIDENT] {
        let outcome = service.register(
            &site,
            PresenceRequest {
                person_id: PersonId(person.to_string()),
                direction: None,
                occurred_at: at,
                actor: guard.clone(),
            },
        )?;
        println!(
            "- {person}: {:?} {}",
            outcome.direction,
            if outcome.recorded {
                "recorded"
            } else {
                "not permitted"
            }
        );
    }
    if let Some(seen) = store.last_seen(&resident) {
        println!("  {DEMO_RESIDENT} last seen {}", seen.to_rfc3339());
    }
    println!("  {} presence events on file", tracker.events().len());

    if skip_units {
        return Ok(());
    }

    let listing = UnitListing {
        range: OccupancyRange {
            min_occupancy,
            max_occupancy: None,
        },
        ..UnitListing::default()
    };
    println!("\nHousing units");
    for unit in service.units(&site, &listing)? {
        let occupancy = unit
            .occupancy
            .map(|rate| format!("{rate}%"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "- {} ({:?}): {} occupants, {} blocked, {} free | occupancy {}",
            unit.name,
            unit.status,
            unit.population,
            unit.blocked_capacity,
            unit.available_capacity,
            occupancy
        );
    }

    Ok(())
}

fn site_heading(site: &Site) -> String {
    format!("{} ({})", site.name, site.site_type.label())
}

fn render_verdict(person: &str, verdict: &SiteAccessVerdict) {
    println!("- {person}: {}", verdict.summary());
    for advisory in &verdict.info {
        match &advisory.heading {
            Some(heading) => println!("    {heading}: {}", advisory.text),
            None => println!("    {}", advisory.text),
        }
    }
}
