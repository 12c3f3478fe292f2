//! Plain text output.

use core::fmt::Write as _;

use f1_admin_app::{Dashboard, DriverDetails, StoreState};
use f1_admin_model::{Driver, GrandPrix};

pub fn drivers(drivers: &[Driver]) -> String {
    let mut out = String::new();
    for driver in drivers {
        let _ = writeln!(
            out,
            "{:>4} #{:<2} {:<3} {:<24} {:<20} {} races",
            driver.id,
            driver.driver_number,
            driver.acronym,
            driver.full_name(),
            driver.team().unwrap_or("-"),
            driver.race_count(),
        );
    }
    if drivers.is_empty() {
        out.push_str("no drivers\n");
    }
    out
}

pub fn driver_details(details: &DriverDetails) -> String {
    let driver = &details.driver;
    let mut out = format!(
        "{} (#{}, {})\nteam: {}\nraces: {}\n",
        driver.full_name(),
        driver.driver_number,
        driver.acronym,
        driver.team().unwrap_or("-"),
        details.race_count,
    );
    for race in &details.recent_races {
        let _ = writeln!(out, "  {} ({})", race.grand_prix, race.location);
    }
    out
}

pub fn grand_prix(events: &[GrandPrix]) -> String {
    let mut out = String::new();
    for event in events {
        let _ = writeln!(
            out,
            "{:>4} {:<28} {:<20} {:>3} laps {:>7.3} km {} participants",
            event.id,
            event.name,
            event.location,
            event.laps,
            event.length,
            event.participant_count(),
        );
    }
    if events.is_empty() {
        out.push_str("no Grand Prix events\n");
    }
    out
}

pub fn participations(state: &StoreState) -> String {
    let mut out = String::new();
    for participation in &state.participations {
        let _ = writeln!(
            out,
            "{:>4} {} -> {}",
            participation.id,
            participation.driver_label(),
            participation.grand_prix_label(),
        );
    }
    if state.is_empty() {
        out.push_str("no participations\n");
    }
    out
}

pub fn dashboard(dashboard: &Dashboard) -> String {
    let mut out = format!(
        "drivers: {}\nGrand Prix: {}\nparticipations: {}\n",
        dashboard.driver_count(),
        dashboard.grand_prix_count(),
        dashboard.participation_count(),
    );
    for (name, error) in [
        ("drivers", dashboard.drivers.error()),
        ("Grand Prix", dashboard.grand_prix.error()),
        ("participations", dashboard.participations.error()),
    ] {
        if let Some(error) = error {
            let _ = writeln!(out, "warning: {name} unavailable: {error}");
        }
    }

    let teams = dashboard.teams();
    if !teams.is_empty() {
        out.push_str("\nteams\n");
        for team in teams {
            let _ = writeln!(out, "  {:<24} {}", team.team, team.drivers);
        }
    }

    let recent = dashboard.recent_participations();
    if !recent.is_empty() {
        out.push_str("\nrecent participations\n");
        for participation in recent {
            let _ = writeln!(
                out,
                "  {} at {}",
                participation.driver, participation.grand_prix
            );
        }
    }
    out
}
