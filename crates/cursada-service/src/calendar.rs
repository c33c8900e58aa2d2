//! Calendar aggregation: one merged list of everything a user should see.

use std::{collections::HashMap, sync::Arc};

use cursada_core::{
  normalize::{NormalizeOptions, normalize_event, normalize_general_event},
  occurrence::{CalendarOccurrence, OccurrenceSource},
  path::DocumentPath,
  recurrence,
  store::AgendaStore,
  subject::Subject,
  year::Year,
};
use tokio::task::JoinSet;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{DeleteRejection, Error, Result};

/// Load every occurrence for `user_id`: expanded classes, then subject
/// events, then general events. The result is not sorted.
///
/// Subjects are fetched per year concurrently, alongside the user's events
/// and general events. Any failed read fails the whole load.
pub async fn load_all<S>(
  store: &Arc<S>,
  user_id: Uuid,
  options: &NormalizeOptions,
) -> Result<Vec<CalendarOccurrence>>
where
  S: AgendaStore + 'static,
{
  let years = store.list_years(user_id).await.map_err(Error::store)?;
  debug!(%user_id, years = years.len(), "loading calendar");

  let (subjects, events, general) = tokio::try_join!(
    fetch_subjects(store, user_id, &years),
    async { store.list_user_events(user_id).await.map_err(Error::store) },
    async { store.list_general_events(user_id).await.map_err(Error::store) },
  )?;

  let names: HashMap<Uuid, String> = subjects
    .iter()
    .map(|s| (s.subject_id, s.name.clone()))
    .collect();

  let mut occurrences: Vec<CalendarOccurrence> =
    subjects.iter().flat_map(recurrence::expand).collect();
  let classes = occurrences.len();
  occurrences.extend(events.iter().map(|e| normalize_event(e, &names, options)));
  occurrences.extend(general.iter().map(|g| normalize_general_event(g, options)));

  info!(
    %user_id,
    subjects = subjects.len(),
    classes,
    events = events.len(),
    general = general.len(),
    "calendar loaded"
  );
  Ok(occurrences)
}

/// Fetch the subjects of every year concurrently, keeping year order.
async fn fetch_subjects<S>(store: &Arc<S>, user_id: Uuid, years: &[Year]) -> Result<Vec<Subject>>
where
  S: AgendaStore + 'static,
{
  let mut tasks = JoinSet::new();
  for (index, year) in years.iter().enumerate() {
    let store = Arc::clone(store);
    let year_id = year.year_id;
    tasks.spawn(async move {
      let subjects = store.list_subjects(user_id, year_id).await.map_err(Error::store)?;
      Ok::<_, Error>((index, subjects))
    });
  }

  let mut per_year = vec![Vec::new(); years.len()];
  while let Some(joined) = tasks.join_next().await {
    let (index, subjects) = joined??;
    per_year[index] = subjects;
  }
  Ok(per_year.into_iter().flatten().collect())
}

/// Delete the item behind `occurrence`.
///
/// Only subject events can be deleted from the calendar. Classes and general
/// events are rejected with a message pointing at where they are managed.
pub async fn delete_occurrence<S: AgendaStore>(
  store: &S,
  user_id: Uuid,
  occurrence: &CalendarOccurrence,
) -> Result<()> {
  match occurrence.source {
    OccurrenceSource::Class { .. } => Err(Error::Rejected(DeleteRejection::RecurringClass)),
    OccurrenceSource::General { .. } => Err(Error::Rejected(DeleteRejection::GeneralEvent)),
    OccurrenceSource::SubjectEvent { event_id, subject_id, year_id, .. } => {
      let path = DocumentPath::Event { user_id, year_id, subject_id, event_id };
      store.delete(path).await.map_err(Error::store)?;
      info!(%path, "deleted calendar event");
      Ok(())
    }
  }
}

/// The calendar as last shown to a user.
///
/// State only changes after the store confirms: a failed refresh keeps the
/// previous occurrences, and a deletion is reflected locally only once the
/// remote delete succeeded.
pub struct CalendarView<S> {
  store:       Arc<S>,
  user_id:     Uuid,
  options:     NormalizeOptions,
  occurrences: Vec<CalendarOccurrence>,
}

impl<S: AgendaStore + 'static> CalendarView<S> {
  pub fn new(store: Arc<S>, user_id: Uuid, options: NormalizeOptions) -> Self {
    Self { store, user_id, options, occurrences: Vec::new() }
  }

  pub fn occurrences(&self) -> &[CalendarOccurrence] { &self.occurrences }

  pub async fn refresh(&mut self) -> Result<&[CalendarOccurrence]> {
    self.occurrences = load_all(&self.store, self.user_id, &self.options).await?;
    Ok(&self.occurrences)
  }

  pub async fn delete(&mut self, id: &str) -> Result<()> {
    let occurrence = self
      .occurrences
      .iter()
      .find(|o| o.id == id)
      .cloned()
      .ok_or_else(|| Error::NotFound(format!("occurrence {id}")))?;

    delete_occurrence(self.store.as_ref(), self.user_id, &occurrence).await?;
    self.occurrences.retain(|o| o.id != id);
    Ok(())
  }
}
