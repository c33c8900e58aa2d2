//! Expansion of a subject's weekly schedule into dated class occurrences.
//!
//! All date arithmetic uses civil dates ([`NaiveDate`]), so the weekday a
//! date falls on never depends on the host time zone. Only presentation
//! converts to local time.

use std::collections::HashSet;

use chrono::{Datelike, Months, NaiveDate, Weekday};

use crate::{
  occurrence::{CalendarOccurrence, OccurrenceSource},
  subject::{ClassDay, ScheduleSlot, Subject},
  time::CalendarTime,
};

/// How far an open-ended schedule (no `end_date`) is expanded past its
/// `start_date`.
pub const OPEN_ENDED_HORIZON_MONTHS: u32 = 6;

/// Stable identifier of the class held by `subject_id` on `date`.
pub fn class_occurrence_id(subject_id: impl std::fmt::Display, date: NaiveDate) -> String {
  format!("class-{subject_id}-{}", date.format("%Y-%m-%d"))
}

/// The weekdays named anywhere in `schedule`. Unrecognised names are
/// skipped.
pub fn target_days(schedule: &[ScheduleSlot]) -> HashSet<Weekday> {
  schedule
    .iter()
    .filter_map(|slot| ClassDay::from_name(&slot.day))
    .map(ClassDay::weekday)
    .collect()
}

/// The last date (inclusive) expanded for `subject`, or `None` when the
/// subject has no start date.
pub fn expansion_end(subject: &Subject) -> Option<NaiveDate> {
  let start = subject.start_date?;
  Some(subject.end_date.unwrap_or_else(|| horizon_from(start)))
}

fn horizon_from(start: NaiveDate) -> NaiveDate {
  start
    .checked_add_months(Months::new(OPEN_ENDED_HORIZON_MONTHS))
    .unwrap_or(NaiveDate::MAX)
}

/// Materialise every class of `subject` between its start and end dates.
///
/// Every occurrence uses the times of the *first* schedule entry; per-day
/// times are not modelled. Returns an empty vec when the schedule is empty,
/// the start date is missing, or the range is inverted.
pub fn expand(subject: &Subject) -> Vec<CalendarOccurrence> {
  let (Some(first), Some(start), Some(end)) = (
    subject.schedule.first(),
    subject.start_date,
    expansion_end(subject),
  ) else {
    return Vec::new();
  };

  let days = target_days(&subject.schedule);
  if days.is_empty() {
    return Vec::new();
  }

  start
    .iter_days()
    .take_while(|date| *date <= end)
    .filter(|date| days.contains(&date.weekday()))
    .map(|date| class_on(subject, first, date))
    .collect()
}

fn class_on(subject: &Subject, slot: &ScheduleSlot, date: NaiveDate) -> CalendarOccurrence {
  let start_time = non_blank(slot.start_time.as_deref());
  let end_time = non_blank(slot.end_time.as_deref());

  let (start, end) = match start_time {
    Some(from) => (
      CalendarTime::on(date, from),
      end_time.map(|until| CalendarTime::on(date, until)),
    ),
    None => (CalendarTime::Date(date), None),
  };

  CalendarOccurrence {
    id: class_occurrence_id(subject.subject_id, date),
    title: subject.name.clone(),
    all_day: start_time.is_none(),
    start,
    end,
    color: subject.color.clone(),
    source: OccurrenceSource::Class {
      subject_id: subject.subject_id,
      year_id:    subject.year_id,
    },
  }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
  value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  fn date(s: &str) -> NaiveDate { NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap() }

  fn subject(schedule: Vec<ScheduleSlot>, start: Option<&str>, end: Option<&str>) -> Subject {
    Subject {
      subject_id: Uuid::new_v4(),
      year_id:    Uuid::new_v4(),
      user_id:    Uuid::new_v4(),
      name:       "Física I".into(),
      professor:  None,
      classroom:  None,
      commission: None,
      schedule,
      start_date: start.map(date),
      end_date:   end.map(date),
      color:      "#3366ff".into(),
      files:      vec![],
      tasks:      vec![],
      notes:      String::new(),
      created_at: Utc::now(),
    }
  }

  fn slot(day: &str) -> ScheduleSlot {
    ScheduleSlot { day: day.into(), start_time: None, end_time: None }
  }

  #[test]
  fn empty_schedule_or_missing_start_yields_nothing() {
    assert!(expand(&subject(vec![], Some("2024-03-04"), None)).is_empty());
    assert!(expand(&subject(vec![slot("Lunes")], None, Some("2024-03-18"))).is_empty());
  }

  #[test]
  fn three_mondays_in_a_two_week_span() {
    let s = subject(vec![slot("Lunes")], Some("2024-03-04"), Some("2024-03-18"));
    let occurrences = expand(&s);

    let starts: Vec<String> = occurrences.iter().map(|o| o.start.to_string()).collect();
    assert_eq!(starts, ["2024-03-04", "2024-03-11", "2024-03-18"]);
    assert!(occurrences.iter().all(|o| o.all_day && o.end.is_none()));
    assert_eq!(
      occurrences[0].id,
      format!("class-{}-2024-03-04", s.subject_id)
    );
  }

  #[test]
  fn timed_single_day_class() {
    let s = subject(
      vec![slot("Martes").with_times("10:00", "12:00")],
      Some("2024-03-05"),
      Some("2024-03-05"),
    );
    let occurrences = expand(&s);

    assert_eq!(occurrences.len(), 1);
    let class = &occurrences[0];
    assert!(!class.all_day);
    assert_eq!(class.start.to_string(), "2024-03-05T10:00");
    assert_eq!(class.end.as_ref().unwrap().to_string(), "2024-03-05T12:00");
    assert_eq!(class.title, "Física I");
  }

  #[test]
  fn single_day_on_a_non_matching_weekday_yields_nothing() {
    let s = subject(vec![slot("Miércoles")], Some("2024-03-05"), Some("2024-03-05"));
    assert!(expand(&s).is_empty());
  }

  #[test]
  fn inverted_range_yields_nothing() {
    let s = subject(vec![slot("Lunes")], Some("2024-03-18"), Some("2024-03-04"));
    assert!(expand(&s).is_empty());
  }

  #[test]
  fn missing_end_time_leaves_the_slot_open() {
    let s = subject(
      vec![ScheduleSlot { day: "Jueves".into(), start_time: Some("18:00".into()), end_time: None }],
      Some("2024-03-07"),
      Some("2024-03-07"),
    );
    let class = &expand(&s)[0];
    assert!(!class.all_day);
    assert_eq!(class.start.to_string(), "2024-03-07T18:00");
    assert!(class.end.is_none());
  }

  #[test]
  fn open_ended_schedule_stops_at_the_horizon() {
    let s = subject(vec![slot("Lunes"), slot("Viernes")], Some("2024-03-04"), None);
    let occurrences = expand(&s);
    let horizon = date("2024-09-04");

    let last = occurrences.last().unwrap().start.date_in(chrono_tz::UTC).unwrap();
    assert!(last <= horizon);
    // 2024-09-02 is the last Monday before the horizon; no Friday fits after it.
    assert_eq!(last, date("2024-09-02"));
  }

  #[test]
  fn every_occurrence_is_on_a_target_day_and_none_are_skipped() {
    let s = subject(
      vec![slot("Lunes"), slot("Miércoles"), slot("Sábado")],
      Some("2024-02-01"),
      Some("2024-06-30"),
    );
    let targets = target_days(&s.schedule);
    let emitted: HashSet<NaiveDate> = expand(&s)
      .iter()
      .map(|o| o.start.date_in(chrono_tz::UTC).unwrap())
      .collect();

    for day in date("2024-02-01").iter_days().take_while(|d| *d <= date("2024-06-30")) {
      assert_eq!(
        emitted.contains(&day),
        targets.contains(&day.weekday()),
        "mismatch on {day}"
      );
    }
  }

  #[test]
  fn sunday_and_unknown_names_are_ignored() {
    let s = subject(vec![slot("Domingo"), slot("Feriado")], Some("2024-03-01"), Some("2024-03-31"));
    assert!(expand(&s).is_empty());
  }

  #[test]
  fn ids_are_stable_across_expansions() {
    let s = subject(vec![slot("Lunes")], Some("2024-03-04"), None);
    let first: Vec<String> = expand(&s).into_iter().map(|o| o.id).collect();
    let second: Vec<String> = expand(&s).into_iter().map(|o| o.id).collect();
    assert_eq!(first, second);
  }
}
