use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{
  DateTime,
  NaiveDate
};
use chrono_tz::Tz;
use taqvim_shared::{
  MeetingDto,
  TaskDto
};
use tracing::{
  debug,
  warn
};

use crate::day_id::{
  DayId,
  to_day_id
};
use crate::jalali::CalendarSystem;

/// Rank for tasks without a priority.
pub const MISSING_PRIORITY_RANK: u8 = 99;

/// Items grouped by Jalali day, each group
/// in comparator order. Built once, never
/// edited.
#[derive(Debug, Clone)]
pub struct DayBucket<T> {
  days:    BTreeMap<DayId, Vec<T>>,
  skipped: usize
}

impl<T> Default for DayBucket<T> {
  fn default() -> Self {
    Self {
      days:    BTreeMap::new(),
      skipped: 0
    }
  }
}

impl<T> DayBucket<T> {
  #[must_use]
  pub fn get(&self, id: &DayId) -> &[T] {
    self
      .days
      .get(id)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  #[must_use]
  pub fn count(&self, id: &DayId) -> usize {
    self.get(id).len()
  }

  /// Items dropped because their date did
  /// not parse or convert.
  #[must_use]
  pub fn skipped(&self) -> usize {
    self.skipped
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.days.is_empty()
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = (&DayId, &[T])>
  {
    self
      .days
      .iter()
      .map(|(id, items)| (id, items.as_slice()))
  }
}

/// Groups `items` by the Jalali day of the
/// date `date_of` yields, sorting each day
/// with `compare` (stable).
///
/// Items whose date is missing or outside
/// the calendar's range are skipped and
/// counted rather than failing the batch.
#[tracing::instrument(skip_all, fields(items = items.len()))]
pub fn index_by_day<T, D, C>(
  calendar: &dyn CalendarSystem,
  items: &[T],
  date_of: D,
  compare: C
) -> DayBucket<T>
where
  T: Clone,
  D: Fn(&T) -> Option<NaiveDate>,
  C: Fn(&T, &T) -> Ordering
{
  let mut bucket = DayBucket::default();

  for item in items {
    let Some(date) = date_of(item) else {
      bucket.skipped += 1;
      continue;
    };
    match to_day_id(calendar, date) {
      | Ok(id) => {
        bucket
          .days
          .entry(id)
          .or_insert_with(Vec::new)
          .push(item.clone());
      }
      | Err(err) => {
        debug!(%date, error = %err, "item date outside calendar range");
        bucket.skipped += 1;
      }
    }
  }

  for day in bucket.days.values_mut() {
    day.sort_by(&compare);
  }

  if bucket.skipped > 0 {
    warn!(
      skipped = bucket.skipped,
      "skipped items with unusable dates"
    );
  }

  bucket
}

/// Reads a wire `date` field. Plain
/// `YYYY-MM-DD` is taken as-is; an RFC 3339
/// timestamp is projected onto its civil
/// day in `timezone`.
pub fn parse_item_date(
  raw: &str,
  timezone: &Tz
) -> Option<NaiveDate> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      trimmed, "%Y-%m-%d"
    )
  {
    return Some(date);
  }

  DateTime::parse_from_rfc3339(trimmed)
    .ok()
    .map(|dt| {
      dt.with_timezone(timezone)
        .date_naive()
    })
}

#[must_use]
pub fn task_priority_rank(
  task: &TaskDto
) -> u8 {
  task
    .priority
    .map(|p| p.rank())
    .unwrap_or(MISSING_PRIORITY_RANK)
}

/// Priority (HIGH first, missing last),
/// then ascending id.
pub fn task_order(
  a: &TaskDto,
  b: &TaskDto
) -> Ordering {
  task_priority_rank(a)
    .cmp(&task_priority_rank(b))
    .then(a.id.cmp(&b.id))
}

/// All-day first, then start time, then
/// ascending id.
pub fn meeting_order(
  a: &MeetingDto,
  b: &MeetingDto
) -> Ordering {
  b.all_day
    .cmp(&a.all_day)
    .then_with(|| {
      if a.all_day {
        Ordering::Equal
      } else {
        a.start_time
          .as_deref()
          .unwrap_or("")
          .cmp(
            b.start_time
              .as_deref()
              .unwrap_or("")
          )
      }
    })
    .then(
      a.id
        .unwrap_or(i64::MAX)
        .cmp(&b.id.unwrap_or(i64::MAX))
    )
}

pub fn index_tasks(
  calendar: &dyn CalendarSystem,
  tasks: &[TaskDto],
  timezone: &Tz
) -> DayBucket<TaskDto> {
  index_by_day(
    calendar,
    tasks,
    |task| {
      task
        .date
        .as_deref()
        .and_then(|raw| parse_item_date(raw, timezone))
    },
    task_order
  )
}

pub fn index_meetings(
  calendar: &dyn CalendarSystem,
  meetings: &[MeetingDto],
  timezone: &Tz
) -> DayBucket<MeetingDto> {
  index_by_day(
    calendar,
    meetings,
    |meeting| {
      meeting
        .date
        .as_deref()
        .and_then(|raw| parse_item_date(raw, timezone))
    },
    meeting_order
  )
}

#[cfg(test)]
mod tests {
  use taqvim_shared::{
    TaskPriority,
    TaskStatus
  };

  use super::*;
  use crate::jalali::JalaliCalendar;

  fn task(
    id: i64,
    priority: Option<TaskPriority>,
    date: &str
  ) -> TaskDto {
    TaskDto {
      id,
      title: format!("task {id}"),
      status: TaskStatus::Todo,
      priority,
      date: Some(date.to_string()),
      assigned_to_id: None,
      assigned_to_name: None,
      created_by_id: None,
      created_by_name: None,
      follow_up_enabled: None,
      follow_up_at: None
    }
  }

  fn meeting(
    id: i64,
    all_day: bool,
    start: Option<&str>
  ) -> MeetingDto {
    MeetingDto {
      id: Some(id),
      title: format!("meeting {id}"),
      date: Some("2025-09-23".to_string()),
      all_day,
      start_time: start.map(str::to_string),
      end_time: None,
      location: None,
      content: None,
      outcome: None,
      reminder_minutes_before: None,
      alarm_enabled: None
    }
  }

  fn day(raw: &str) -> DayId {
    DayId::parse(&JalaliCalendar, raw)
      .map(|d| DayId::from_day(&d))
      .expect("day id")
  }

  #[test]
  fn high_priority_task_lists_first_regardless_of_input_order()
  {
    let high = task(
      5,
      Some(TaskPriority::High),
      "2025-09-23"
    );
    let medium = task(
      2,
      Some(TaskPriority::Medium),
      "2025-09-23"
    );

    for input in [
      vec![high.clone(), medium.clone()],
      vec![medium.clone(), high.clone()]
    ] {
      let bucket = index_tasks(
        &JalaliCalendar,
        &input,
        &chrono_tz::Asia::Tehran
      );
      let ids = bucket
        .get(&day("14040701"))
        .iter()
        .map(|t| t.id)
        .collect::<Vec<_>>();
      assert_eq!(ids, vec![5, 2]);
    }
  }

  #[test]
  fn task_order_ties_break_on_id_and_missing_priority_sorts_last()
  {
    let tasks = vec![
      task(9, None, "2025-09-23"),
      task(4, Some(TaskPriority::Low), "2025-09-23"),
      task(3, Some(TaskPriority::High), "2025-09-23"),
      task(1, None, "2025-09-23"),
      task(8, Some(TaskPriority::High), "2025-09-23"),
    ];
    let bucket = index_tasks(
      &JalaliCalendar,
      &tasks,
      &chrono_tz::Asia::Tehran
    );
    let ids = bucket
      .get(&day("14040701"))
      .iter()
      .map(|t| t.id)
      .collect::<Vec<_>>();
    assert_eq!(ids, vec![3, 8, 4, 1, 9]);
  }

  #[test]
  fn meetings_all_day_then_start_time_then_id() {
    let meetings = vec![
      meeting(7, false, Some("14:00")),
      meeting(3, false, Some("09:30")),
      meeting(9, true, None),
      meeting(2, false, Some("09:30")),
      meeting(4, true, None),
    ];
    let bucket = index_meetings(
      &JalaliCalendar,
      &meetings,
      &chrono_tz::Asia::Tehran
    );
    let ids = bucket
      .get(&day("14040701"))
      .iter()
      .filter_map(|m| m.id)
      .collect::<Vec<_>>();
    assert_eq!(ids, vec![4, 9, 2, 3, 7]);
  }

  #[test]
  fn unparseable_dates_are_skipped_and_counted() {
    let tasks = vec![
      task(1, None, "2025-09-23"),
      task(2, None, "not a date"),
      task(3, None, ""),
      task(4, None, "2025-02-30"),
      task(5, None, "2025-09-24"),
    ];
    let bucket = index_tasks(
      &JalaliCalendar,
      &tasks,
      &chrono_tz::Asia::Tehran
    );
    assert_eq!(bucket.skipped(), 3);
    assert_eq!(bucket.count(&day("14040701")), 1);
    assert_eq!(bucket.count(&day("14040702")), 1);
    assert_eq!(bucket.iter().count(), 2);
  }

  #[test]
  fn null_dated_items_are_skipped_not_fatal() {
    let mut undated = task(6, None, "");
    undated.date = None;
    let tasks = vec![
      undated,
      task(7, Some(TaskPriority::Low), "2025-09-23"),
    ];
    let bucket = index_tasks(
      &JalaliCalendar,
      &tasks,
      &chrono_tz::Asia::Tehran
    );
    assert_eq!(bucket.skipped(), 1);
    assert_eq!(bucket.count(&day("14040701")), 1);

    let mut floating = meeting(8, true, None);
    floating.date = None;
    let meetings = index_meetings(
      &JalaliCalendar,
      &[floating, meeting(9, true, None)],
      &chrono_tz::Asia::Tehran
    );
    assert_eq!(meetings.skipped(), 1);
    assert_eq!(meetings.count(&day("14040701")), 1);
  }

  #[test]
  fn timestamps_project_onto_configured_timezone() {
    let tehran = chrono_tz::Asia::Tehran;
    assert_eq!(
      parse_item_date(
        "2025-09-22T21:00:00Z",
        &tehran
      ),
      NaiveDate::from_ymd_opt(2025, 9, 23)
    );
    assert_eq!(
      parse_item_date(
        "2025-09-22T21:00:00Z",
        &chrono_tz::UTC
      ),
      NaiveDate::from_ymd_opt(2025, 9, 22)
    );
  }

  #[test]
  fn rebuilding_is_deterministic() {
    let tasks = (0..20)
      .map(|i| {
        let priority = match i % 4 {
          | 0 => Some(TaskPriority::Low),
          | 1 => Some(TaskPriority::High),
          | 2 => None,
          | _ => Some(TaskPriority::Medium)
        };
        task(
          (i * 7) % 20,
          priority,
          if i % 2 == 0 {
            "2025-09-23"
          } else {
            "2025-09-24"
          }
        )
      })
      .collect::<Vec<_>>();
    let tz = chrono_tz::Asia::Tehran;
    let first =
      index_tasks(&JalaliCalendar, &tasks, &tz);
    let second =
      index_tasks(&JalaliCalendar, &tasks, &tz);
    for (id, items) in first.iter() {
      assert_eq!(items, second.get(id));
    }
    assert!(!first.is_empty());
  }
}
