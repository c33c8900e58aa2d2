//! Turning stored events into [`CalendarOccurrence`]s.
//!
//! Timed items get their local start time prepended to the title so the
//! month grid shows it. All-day general events are pinned to a morning slot
//! so they render inside the time grid instead of the all-day row.

use std::collections::HashMap;

use chrono::NaiveTime;
use chrono_tz::Tz;
use uuid::Uuid;

use crate::{
  event::{Event, GeneralEvent},
  occurrence::{CalendarOccurrence, OccurrenceSource},
  time::CalendarTime,
};

/// Local hour an all-day general event is displayed at.
pub const PINNED_ALL_DAY_HOUR: u32 = 6;

/// Title prefix for pinned all-day general events.
pub const ALL_DAY_TITLE_PREFIX: &str = "(Todo el día) ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
  /// Zone used to show instants stored with an explicit offset.
  pub display_tz: Tz,
}

impl Default for NormalizeOptions {
  fn default() -> Self { Self { display_tz: chrono_tz::UTC } }
}

/// `"HH:MM title"` when `start` has a time of day, else `title` unchanged.
pub fn timed_title(title: &str, start: &CalendarTime, tz: Tz) -> String {
  match start.local_in(tz) {
    Some(local) => format!("{} {title}", local.format("%H:%M")),
    None => title.to_owned(),
  }
}

/// Normalise a subject event. `subject_names` maps subject ids to display
/// names; a missing entry leaves the name unset.
pub fn normalize_event(
  event: &Event,
  subject_names: &HashMap<Uuid, String>,
  options: &NormalizeOptions,
) -> CalendarOccurrence {
  CalendarOccurrence {
    id:      event.event_id.to_string(),
    title:   timed_title(&event.title, &event.start, options.display_tz),
    start:   event.start.clone(),
    end:     None,
    all_day: event.all_day,
    color:   event.color.clone(),
    source:  OccurrenceSource::SubjectEvent {
      event_id:     event.event_id,
      subject_id:   event.subject_id,
      year_id:      event.year_id,
      subject_name: subject_names.get(&event.subject_id).cloned(),
    },
  }
}

pub fn normalize_general_event(
  event: &GeneralEvent,
  options: &NormalizeOptions,
) -> CalendarOccurrence {
  let (title, start) = if event.all_day {
    (
      format!("{ALL_DAY_TITLE_PREFIX}{}", event.title),
      pin_to_morning(&event.start, options.display_tz),
    )
  } else {
    (
      timed_title(&event.title, &event.start, options.display_tz),
      event.start.clone(),
    )
  };

  CalendarOccurrence {
    id: event.event_id.to_string(),
    title,
    start,
    end: None,
    all_day: false,
    color: event.color.clone(),
    source: OccurrenceSource::General {
      event_id:       event.event_id,
      marked_all_day: event.all_day,
    },
  }
}

/// Move `start` to [`PINNED_ALL_DAY_HOUR`] on its local date. Values with no
/// recognisable date are returned unchanged.
fn pin_to_morning(start: &CalendarTime, tz: Tz) -> CalendarTime {
  let pinned = NaiveTime::from_hms_opt(PINNED_ALL_DAY_HOUR, 0, 0);
  match (start.date_in(tz), pinned) {
    (Some(date), Some(time)) => CalendarTime::Floating(date.and_time(time)),
    _ => start.clone(),
  }
}
