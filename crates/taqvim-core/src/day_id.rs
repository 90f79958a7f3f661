//! Compact `YYYYMMDD` keys for Jalali days.
//!
//! The year is not padded. String order
//! equals chronological order only while
//! every compared year has the same number
//! of digits, which holds for all current
//! four-digit Jalali years.

use std::fmt;

use chrono::NaiveDate;
use regex::Regex;
use serde::{
  Deserialize,
  Serialize
};

use crate::error::CalendarError;
use crate::jalali::{
  CalendarDay,
  CalendarSystem,
  JalaliDate
};

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct DayId(String);

impl DayId {
  #[must_use]
  pub fn from_jalali(
    date: &JalaliDate
  ) -> Self {
    Self(format!(
      "{}{:02}{:02}",
      date.year(),
      date.month(),
      date.day()
    ))
  }

  #[must_use]
  pub fn from_day(day: &CalendarDay) -> Self {
    Self::from_jalali(&day.jalali())
  }

  /// Parses and validates an identifier
  /// as a real Jalali day.
  pub fn parse(
    calendar: &dyn CalendarSystem,
    raw: &str
  ) -> Result<CalendarDay, CalendarError> {
    let trimmed = raw.trim();
    let invalid = || {
      CalendarError::InvalidDayId {
        raw: trimmed.to_string()
      }
    };
    let re =
      Regex::new(r"^(\d{1,4})(\d{2})(\d{2})$")
        .map_err(|_| invalid())?;
    let caps =
      re.captures(trimmed).ok_or_else(invalid)?;

    let year = caps[1]
      .parse::<i32>()
      .map_err(|_| invalid())?;
    let month = caps[2]
      .parse::<u32>()
      .map_err(|_| invalid())?;
    let day = caps[3]
      .parse::<u32>()
      .map_err(|_| invalid())?;

    calendar.jalali_day(year, month, day)
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for DayId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&CalendarDay> for DayId {
  fn from(day: &CalendarDay) -> Self {
    Self::from_day(day)
  }
}

/// Projects a Gregorian date to the
/// identifier of its Jalali day.
pub fn to_day_id(
  calendar: &dyn CalendarSystem,
  date: NaiveDate
) -> Result<DayId, CalendarError> {
  Ok(DayId::from_jalali(
    &calendar.to_jalali(date)?
  ))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::jalali::JalaliCalendar;

  fn g(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid gregorian")
  }

  #[test]
  fn known_gregorian_day_maps_to_identifier() {
    let id = to_day_id(
      &JalaliCalendar,
      g(2025, 9, 23)
    )
    .expect("day id");
    assert_eq!(id.as_str(), "14040701");
  }

  #[test]
  fn same_jalali_day_has_one_identifier() {
    let cal = JalaliCalendar;
    let via_gregorian =
      to_day_id(&cal, g(2025, 3, 20))
        .expect("day id");
    let via_jalali = DayId::from_day(
      &cal.jalali_day(1403, 12, 30)
        .expect("day")
    );
    let via_arithmetic = DayId::from_day(
      &cal
        .add_days(
          cal.jalali_day(1404, 1, 1)
            .expect("day"),
          -1
        )
        .expect("shift")
    );
    assert_eq!(via_gregorian, via_jalali);
    assert_eq!(via_jalali, via_arithmetic);
    assert_eq!(via_jalali.as_str(), "14031230");
  }

  #[test]
  fn identifiers_sort_chronologically_within_four_digit_years()
  {
    let cal = JalaliCalendar;
    let mut date = g(2024, 1, 1);
    let mut prev =
      to_day_id(&cal, date).expect("day id");
    while date < g(2026, 12, 31) {
      date = date.succ_opt().expect("next");
      let id =
        to_day_id(&cal, date).expect("day id");
      assert!(id > prev, "{id} <= {prev}");
      prev = id;
    }
  }

  #[test]
  fn parse_round_trips_identifier() {
    let cal = JalaliCalendar;
    let day = DayId::parse(&cal, "14040701")
      .expect("parse");
    assert_eq!(day.gregorian(), g(2025, 9, 23));
    assert_eq!(DayId::from_day(&day).as_str(), "14040701");
  }

  #[test]
  fn parse_rejects_malformed_and_impossible_days()
  {
    let cal = JalaliCalendar;
    assert!(matches!(
      DayId::parse(&cal, "1404-07-01"),
      Err(CalendarError::InvalidDayId { .. })
    ));
    assert!(matches!(
      DayId::parse(&cal, "1404"),
      Err(CalendarError::InvalidDayId { .. })
    ));
    assert!(matches!(
      DayId::parse(&cal, "14041230"),
      Err(CalendarError::InvalidDate { .. })
    ));
  }

  #[test]
  fn serializes_as_plain_string() {
    let id = DayId::from_day(
      &JalaliCalendar
        .jalali_day(1404, 1, 13)
        .expect("day")
    );
    assert_eq!(
      serde_json::to_string(&id)
        .expect("encode"),
      "\"14040113\""
    );
  }
}
