use crate::core::session::{SessionState, Status};
use crate::core::{Breed, BreedProperty, Candidate, ExclusionSet};
use std::fmt::Write;

pub const HELP: &str = "\
Commands:
  next | n | <enter>        fetch another cat
  ban <property>            ban the shown cat's value (breed, weight, origin, life_span)
  ban <property> <value>    ban an explicit value
  unban <position>          remove an entry from the ban list
  bans                      show the ban list
  show                      show the current cat again
  help                      this text
  quit                      leave
";

fn attribute_line(out: &mut String, breed: &Breed, property: BreedProperty) {
    let value = breed.attribute(property).unwrap_or("N/A");
    let unit = match property {
        BreedProperty::Weight if value != "N/A" => match &breed.weight_metric {
            Some(metric) => format!(" lbs ({} kg)", metric),
            None => " lbs".to_string(),
        },
        BreedProperty::LifeSpan if value != "N/A" => " years".to_string(),
        _ => String::new(),
    };
    let _ = writeln!(out, "  {:<10} {}{}   (ban {})", property.label(), value, unit, property);
}

pub fn candidate(candidate: &Candidate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🐈 {}", candidate.image_url);

    match &candidate.breed {
        Some(breed) => {
            for property in BreedProperty::ALL {
                attribute_line(&mut out, breed, property);
            }
            if let Some(temperament) = &breed.temperament {
                let _ = writeln!(out, "  Temperament: {}", temperament);
            }
        }
        None => out.push_str("  (no breed information)\n"),
    }
    let _ = writeln!(out, "  fetched {}", candidate.fetched_at.format("%H:%M:%S UTC"));
    out
}

pub fn exclusions(set: &ExclusionSet) -> String {
    if set.is_empty() {
        return "Ban list is empty. Use 'ban <property>' on a shown cat to add one.\n".to_string();
    }

    let mut out = String::from("Ban list ('unban <position>' to remove):\n");
    for (index, rule) in set.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, rule);
    }
    out
}

pub fn status(state: &SessionState) -> String {
    match &state.status {
        Status::Idle => String::new(),
        Status::Loading { run_id } => format!("Loading... (request #{})\n", run_id),
        Status::Found { attempts } => format!("Found after {} attempt(s).\n", attempts),
        Status::Exhausted { attempts } => format!(
            "No cat outside the ban list after {} attempts. Try removing a ban.\n",
            attempts
        ),
        Status::Failed {
            message,
            suggestion,
        } => format!("❌ {}\n💡 {}\n", message, suggestion),
    }
}

pub fn state(state: &SessionState) -> String {
    let mut out = status(state);
    if let Some(current) = &state.current {
        out.push_str(&candidate(current));
    }
    out
}
