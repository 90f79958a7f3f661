//! Wire types exchanged with the team calendar REST API.
//!
//! Every `date` field on the wire is a Gregorian `YYYY-MM-DD` string.
//! Item dates are kept as optional raw strings so one missing or malformed
//! date never fails the whole list.

use serde::{
  Deserialize,
  Serialize
};

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
  Todo,
  Doing,
  Done
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskPriority {
  Low,
  #[default]
  Medium,
  High
}

impl TaskPriority {
  /// Sort rank inside a day bucket; lower sorts first.
  #[must_use]
  pub fn rank(self) -> u8 {
    match self {
      | TaskPriority::High => 1,
      | TaskPriority::Medium => 2,
      | TaskPriority::Low => 3
    }
  }

  pub fn parse(
    raw: &str
  ) -> Option<Self> {
    match raw
      .trim()
      .to_ascii_uppercase()
      .as_str()
    {
      | "HIGH" | "H" => {
        Some(TaskPriority::High)
      }
      | "MEDIUM" | "M" => {
        Some(TaskPriority::Medium)
      }
      | "LOW" | "L" => {
        Some(TaskPriority::Low)
      }
      | _ => None
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
  pub id:                i64,
  #[serde(default)]
  pub title:             String,
  pub status:            TaskStatus,
  #[serde(default)]
  pub priority:          Option<TaskPriority>,
  /// `null` or absent on some records;
  /// such tasks are skipped when grouped
  /// by day.
  #[serde(default)]
  pub date:              Option<String>,
  #[serde(default)]
  pub assigned_to_id:    Option<i64>,
  #[serde(default)]
  pub assigned_to_name:  Option<String>,
  #[serde(default)]
  pub created_by_id:     Option<i64>,
  #[serde(default)]
  pub created_by_name:   Option<String>,
  #[serde(default)]
  pub follow_up_enabled: Option<bool>,
  #[serde(default)]
  pub follow_up_at:      Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct UserRef {
  pub id: i64
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreate {
  pub title:             String,
  pub date:              String,
  pub priority:          TaskPriority,
  pub assigned_to:       UserRef,
  pub follow_up_enabled: bool,
  pub follow_up_at:      Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDto {
  #[serde(default)]
  pub id:         Option<i64>,
  #[serde(default)]
  pub title:      String,
  #[serde(default)]
  pub date:       Option<String>,
  #[serde(default)]
  pub all_day:    bool,
  #[serde(default)]
  pub start_time: Option<String>,
  #[serde(default)]
  pub end_time:   Option<String>,
  #[serde(default)]
  pub location:   Option<String>,
  #[serde(default)]
  pub content:    Option<String>,
  #[serde(default)]
  pub outcome:    Option<String>,
  #[serde(default)]
  pub reminder_minutes_before:
    Option<Vec<u32>>,
  #[serde(default)]
  pub alarm_enabled: Option<bool>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct MeetingCreate {
  pub title:      String,
  pub date:       String,
  pub all_day:    bool,
  pub start_time: Option<String>,
  pub end_time:   Option<String>,
  pub location:   Option<String>,
  pub content:    Option<String>,
  pub reminder_minutes_before:
    Vec<u32>,
  pub alarm_enabled: bool
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct HolidayDto {
  /// Jalali day identifier, e.g.
  /// `14040101`.
  pub day_id:  String,
  #[serde(default)]
  pub holiday: bool,
  #[serde(default)]
  pub cause:   Option<String>,
  #[serde(default)]
  pub events:  Option<Vec<String>>
}
