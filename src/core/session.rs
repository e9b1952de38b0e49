//! Explicit state of one interactive session.
//!
//! The terminal layer never mutates anything directly: it turns input into a
//! [`Command`], turns commands and finished runs into [`SessionEvent`]s, and
//! replaces its [`SessionState`] with `state.reduce(event)`.

use crate::domain::exclusion::ExclusionSet;
use crate::domain::model::{AcquisitionOutcome, BreedProperty, Candidate, ExclusionRule};
use crate::utils::error::{FinderError, Result};
use std::str::FromStr;

/// User request parsed from one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    /// Ban the current candidate's value for a property.
    BanCurrent(BreedProperty),
    Ban(ExclusionRule),
    /// 1-based position as displayed.
    Unban(usize),
    ListBans,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = FinderError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let invalid = |reason: &str| FinderError::InvalidCommandError {
            input: line.to_string(),
            reason: reason.to_string(),
        };

        match verb.to_ascii_lowercase().as_str() {
            "" | "n" | "next" => Ok(Command::Next),
            "ban" => {
                if rest.is_empty() {
                    return Err(invalid("usage: ban <property> [value]"));
                }
                let (property, value) = match rest.split_once(char::is_whitespace) {
                    Some((property, value)) => (property, value.trim()),
                    None => (rest, ""),
                };
                let property = property.parse::<BreedProperty>()?;
                if value.is_empty() {
                    Ok(Command::BanCurrent(property))
                } else {
                    Ok(Command::Ban(ExclusionRule::new(property, value)))
                }
            }
            "unban" => {
                let position = rest
                    .parse::<usize>()
                    .map_err(|_| invalid("usage: unban <position>"))?;
                if position == 0 {
                    return Err(invalid("positions start at 1"));
                }
                Ok(Command::Unban(position))
            }
            "bans" | "list" => Ok(Command::ListBans),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(invalid("unknown command")),
        }
    }
}

/// What the session is currently showing besides the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading { run_id: u64 },
    Found { attempts: usize },
    Exhausted { attempts: usize },
    Failed { message: String, suggestion: String },
}

#[derive(Debug)]
pub enum SessionEvent {
    RuleAdded(ExclusionRule),
    /// 0-based position.
    RuleRemoved(usize),
    RunStarted { run_id: u64 },
    RunFinished { run_id: u64, outcome: AcquisitionOutcome },
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub exclusions: ExclusionSet,
    pub current: Option<Candidate>,
    pub status: Status,
    latest_run: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(ExclusionSet::new())
    }
}

impl SessionState {
    pub fn new(exclusions: ExclusionSet) -> Self {
        Self {
            exclusions,
            current: None,
            status: Status::Idle,
            latest_run: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, Status::Loading { .. })
    }

    pub fn latest_run(&self) -> u64 {
        self.latest_run
    }

    /// Builds the rule a `ban <property>` refers to, from the shown candidate.
    pub fn rule_for_current(&self, property: BreedProperty) -> Result<ExclusionRule> {
        let candidate = self.current.as_ref().ok_or_else(|| FinderError::InvalidCommandError {
            input: format!("ban {}", property),
            reason: "no cat is being shown yet".to_string(),
        })?;

        let value = candidate
            .attribute(property)
            .ok_or_else(|| FinderError::InvalidCommandError {
                input: format!("ban {}", property),
                reason: format!("the current cat has no {}", property.label().to_lowercase()),
            })?;

        Ok(ExclusionRule::new(property, value))
    }

    /// Maps a 1-based displayed position to a removal event.
    pub fn unban_event(&self, position: usize) -> Result<SessionEvent> {
        if position == 0 || position > self.exclusions.len() {
            return Err(FinderError::InvalidCommandError {
                input: format!("unban {}", position),
                reason: format!("there are {} exclusions", self.exclusions.len()),
            });
        }
        Ok(SessionEvent::RuleRemoved(position - 1))
    }

    pub fn reduce(mut self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::RuleAdded(rule) => {
                self.exclusions.insert(rule);
            }
            SessionEvent::RuleRemoved(position) => {
                self.exclusions.remove(position);
            }
            SessionEvent::RunStarted { run_id } => {
                self.latest_run = run_id;
                self.status = Status::Loading { run_id };
            }
            SessionEvent::RunFinished { run_id, outcome } => {
                if run_id != self.latest_run {
                    tracing::debug!(
                        "Discarding outcome of run #{} (latest is #{})",
                        run_id,
                        self.latest_run
                    );
                    return self;
                }
                match outcome {
                    AcquisitionOutcome::Accepted {
                        candidate,
                        attempts,
                    } => {
                        self.current = Some(candidate);
                        self.status = Status::Found { attempts };
                    }
                    AcquisitionOutcome::Exhausted { attempts } => {
                        self.status = Status::Exhausted { attempts };
                    }
                    // 保留上一隻貓，只顯示錯誤
                    AcquisitionOutcome::Failed { error, .. } => {
                        self.status = Status::Failed {
                            message: error.user_friendly_message(),
                            suggestion: error.recovery_suggestion().to_string(),
                        };
                    }
                    AcquisitionOutcome::Superseded { .. } => {}
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Breed;

    fn persian() -> Candidate {
        let mut breed = Breed::named("Persian");
        breed.origin = Some("Iran (Persia)".to_string());
        Candidate::new("p1", "https://cdn.example/p1.jpg", Some(breed))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("".parse::<Command>().unwrap(), Command::Next);
        assert_eq!(" next ".parse::<Command>().unwrap(), Command::Next);
        assert_eq!(
            "ban origin".parse::<Command>().unwrap(),
            Command::BanCurrent(BreedProperty::Origin)
        );
        assert_eq!(
            "ban breed Scottish Fold".parse::<Command>().unwrap(),
            Command::Ban(ExclusionRule::new(BreedProperty::Breed, "Scottish Fold"))
        );
        assert_eq!("unban 2".parse::<Command>().unwrap(), Command::Unban(2));
        assert_eq!("QUIT".parse::<Command>().unwrap(), Command::Quit);

        assert!("unban 0".parse::<Command>().is_err());
        assert!("unban first".parse::<Command>().is_err());
        assert!("ban".parse::<Command>().is_err());
        assert!("ban colour white".parse::<Command>().is_err());
        assert!("meow".parse::<Command>().is_err());
    }

    #[test]
    fn test_latest_run_outcome_is_applied() {
        let state = SessionState::default()
            .reduce(SessionEvent::RunStarted { run_id: 1 })
            .reduce(SessionEvent::RunFinished {
                run_id: 1,
                outcome: AcquisitionOutcome::Accepted {
                    candidate: persian(),
                    attempts: 3,
                },
            });

        assert_eq!(state.status, Status::Found { attempts: 3 });
        assert_eq!(state.current.as_ref().unwrap().id, "p1");
        assert!(!state.is_loading());
    }

    #[test]
    fn test_stale_run_outcome_is_discarded() {
        let state = SessionState::default()
            .reduce(SessionEvent::RunStarted { run_id: 1 })
            .reduce(SessionEvent::RunStarted { run_id: 2 })
            .reduce(SessionEvent::RunFinished {
                run_id: 1,
                outcome: AcquisitionOutcome::Accepted {
                    candidate: persian(),
                    attempts: 1,
                },
            });

        assert!(state.current.is_none());
        assert_eq!(state.status, Status::Loading { run_id: 2 });
    }

    #[test]
    fn test_failure_keeps_last_candidate() {
        let state = SessionState::default()
            .reduce(SessionEvent::RunStarted { run_id: 1 })
            .reduce(SessionEvent::RunFinished {
                run_id: 1,
                outcome: AcquisitionOutcome::Accepted {
                    candidate: persian(),
                    attempts: 1,
                },
            })
            .reduce(SessionEvent::RunStarted { run_id: 2 })
            .reduce(SessionEvent::RunFinished {
                run_id: 2,
                outcome: AcquisitionOutcome::Failed {
                    error: FinderError::AuthError { status: 401 },
                    attempts: 0,
                },
            });

        assert!(matches!(state.status, Status::Failed { .. }));
        assert_eq!(state.current.as_ref().unwrap().id, "p1");
    }

    #[test]
    fn test_rule_for_current() {
        let state = SessionState::default();
        assert!(state.rule_for_current(BreedProperty::Breed).is_err());

        let state = state
            .reduce(SessionEvent::RunStarted { run_id: 1 })
            .reduce(SessionEvent::RunFinished {
                run_id: 1,
                outcome: AcquisitionOutcome::Accepted {
                    candidate: persian(),
                    attempts: 1,
                },
            });

        assert_eq!(
            state.rule_for_current(BreedProperty::Origin).unwrap(),
            ExclusionRule::new(BreedProperty::Origin, "Iran (Persia)")
        );
        assert!(state.rule_for_current(BreedProperty::LifeSpan).is_err());
    }

    #[test]
    fn test_unban_uses_displayed_positions() {
        let state = SessionState::default()
            .reduce(SessionEvent::RuleAdded(ExclusionRule::new(BreedProperty::Breed, "Siamese")))
            .reduce(SessionEvent::RuleAdded(ExclusionRule::new(BreedProperty::Origin, "Egypt")));

        assert!(state.unban_event(0).is_err());
        assert!(state.unban_event(3).is_err());

        let event = state.unban_event(1).unwrap();
        let state = state.reduce(event);
        assert_eq!(
            state.exclusions.rules(),
            &[ExclusionRule::new(BreedProperty::Origin, "Egypt")]
        );
    }
}
