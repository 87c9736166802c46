use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::domain::slot::SpecialistId;
use crate::errors::DomainError;

/// A provider owning a partition of the schedule. The timezone is a stored
/// label only; no offset arithmetic happens anywhere in the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialist {
    pub id: SpecialistId,
    pub name: String,
    pub specialization: String,
    pub timezone: String,
}

/// The recurring weekly template slots are generated from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkTemplate {
    pub working_days: Vec<Weekday>,
    pub start: String,
    pub end: String,
    pub break_minutes: u32,
}

impl WorkTemplate {
    pub fn new(
        working_days: Vec<Weekday>,
        start: impl Into<String>,
        end: impl Into<String>,
        break_minutes: u32,
    ) -> Result<Self, DomainError> {
        let template = Self { working_days, start: start.into(), end: end.into(), break_minutes };
        template.validate()?;
        Ok(template)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for raw in [&self.start, &self.end] {
            if crate::dates::time_to_minutes(raw).is_none() {
                return Err(DomainError::InvariantViolation(format!(
                    "work template time {raw:?} is not HH:MM"
                )));
            }
        }
        Ok(())
    }

    pub fn works_on(&self, weekday: Weekday) -> bool {
        self.working_days.contains(&weekday)
    }
}

/// Accepts the English weekday names and abbreviations ("Monday", "mon"),
/// case-insensitively.
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    raw.trim().parse::<Weekday>().ok()
}

pub fn parse_weekdays(raw: &[String]) -> Result<Vec<Weekday>, DomainError> {
    let mut days = Vec::with_capacity(raw.len());
    for name in raw {
        let day = parse_weekday(name).ok_or_else(|| {
            DomainError::InvariantViolation(format!("unknown weekday name {name:?}"))
        })?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::{parse_weekday, parse_weekdays, WorkTemplate};

    #[test]
    fn weekday_names_parse_case_insensitively() {
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("wed"), Some(Weekday::Wed));
        assert_eq!(parse_weekday("SUNDAY"), Some(Weekday::Sun));
        assert_eq!(parse_weekday("someday"), None);
    }

    #[test]
    fn duplicate_weekdays_collapse() {
        let days = parse_weekdays(&["mon".to_string(), "Monday".to_string(), "wed".to_string()])
            .expect("valid names");
        assert_eq!(days, vec![Weekday::Mon, Weekday::Wed]);
    }

    #[test]
    fn template_rejects_malformed_times() {
        let error = WorkTemplate::new(vec![Weekday::Mon], "10:00", "noonish", 0)
            .expect_err("end time is not HH:MM");
        assert!(matches!(error, crate::errors::DomainError::InvariantViolation(_)));
    }

    #[test]
    fn template_knows_its_working_days() {
        let template =
            WorkTemplate::new(vec![Weekday::Mon, Weekday::Wed], "10:00", "12:00", 0).expect("valid");
        assert!(template.works_on(Weekday::Mon));
        assert!(!template.works_on(Weekday::Tue));
    }
}
