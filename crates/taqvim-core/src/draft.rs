//! Task and meeting drafts created from a
//! selected calendar day.

use std::collections::BTreeSet;

use chrono::NaiveTime;
use taqvim_shared::{
  MeetingCreate,
  TaskCreate,
  TaskPriority,
  UserRef
};

use crate::error::CalendarError;
use crate::jalali::CalendarDay;

/// Reminders further out than a year are
/// dropped.
pub const MAX_REMINDER_MINUTES: u32 =
  365 * 24 * 60;

#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
  pub title:        String,
  pub assignee_id:  Option<i64>,
  pub priority:     Option<TaskPriority>,
  pub follow_up_at: Option<String>
}

impl TaskDraft {
  /// Builds the POST body, carrying the
  /// Gregorian date of `day`.
  pub fn into_create(
    self,
    day: &CalendarDay
  ) -> Result<TaskCreate, CalendarError> {
    let title = self.title.trim();
    if title.is_empty() {
      return Err(
        CalendarError::MissingField {
          field: "title"
        }
      );
    }
    let assignee = self.assignee_id.ok_or(
      CalendarError::MissingField {
        field: "assignee"
      }
    )?;

    let follow_up_at = self
      .follow_up_at
      .map(|raw| raw.trim().to_string())
      .filter(|raw| !raw.is_empty());

    Ok(TaskCreate {
      title: title.to_string(),
      date: day.wire_date(),
      priority: self
        .priority
        .unwrap_or_default(),
      assigned_to: UserRef {
        id: assignee
      },
      follow_up_enabled: follow_up_at
        .is_some(),
      follow_up_at
    })
  }
}

#[derive(Debug, Clone, Default)]
pub struct MeetingDraft {
  pub title:    String,
  pub all_day:  bool,
  pub start:    Option<String>,
  pub end:      Option<String>,
  pub location: Option<String>,
  pub content:  Option<String>,
  pub reminders: Vec<u32>,
  pub alarm:    bool
}

impl MeetingDraft {
  pub fn into_create(
    self,
    day: &CalendarDay
  ) -> Result<MeetingCreate, CalendarError>
  {
    let title = self.title.trim();
    if title.is_empty() {
      return Err(
        CalendarError::MissingField {
          field: "title"
        }
      );
    }

    let (start_time, end_time) =
      if self.all_day {
        (None, None)
      } else {
        let start = non_blank(self.start)
          .ok_or(
            CalendarError::MissingField {
              field: "start time"
            }
          )?;
        let end = non_blank(self.end);
        (
          Some(normalize_time(&start)?),
          end
            .map(|e| normalize_time(&e))
            .transpose()?
        )
      };

    Ok(MeetingCreate {
      title: title.to_string(),
      date: day.wire_date(),
      all_day: self.all_day,
      start_time,
      end_time,
      location: non_blank(self.location),
      content: non_blank(self.content),
      reminder_minutes_before:
        normalize_reminders(&self.reminders),
      alarm_enabled: self.alarm
    })
  }
}

fn non_blank(
  value: Option<String>
) -> Option<String> {
  value
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

/// Validates `H:mm`/`HH:mm` and returns
/// zero-padded `HH:mm`.
pub fn normalize_time(
  raw: &str
) -> Result<String, CalendarError> {
  NaiveTime::parse_from_str(
    raw.trim(),
    "%H:%M"
  )
  .map(|t| t.format("%H:%M").to_string())
  .map_err(|_| CalendarError::InvalidTime {
    raw: raw.trim().to_string()
  })
}

/// Positive, at most a year, deduplicated,
/// largest first.
#[must_use]
pub fn normalize_reminders(
  minutes: &[u32]
) -> Vec<u32> {
  minutes
    .iter()
    .copied()
    .filter(|m| {
      *m > 0 && *m <= MAX_REMINDER_MINUTES
    })
    .collect::<BTreeSet<_>>()
    .into_iter()
    .rev()
    .collect()
}
