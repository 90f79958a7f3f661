use std::fmt;

use chrono::Weekday;
use tracing::debug;

use crate::error::CalendarError;
use crate::jalali::{
  CalendarDay,
  CalendarSystem,
  JalaliMonth
};

pub const GRID_WEEKS: usize = 6;
pub const GRID_CELLS: usize = GRID_WEEKS * 7;

pub const WEEKDAYS_FA: [&str; 7] =
  ["ش", "ی", "د", "س", "چ", "پ", "ج"];

pub const WEEKDAYS_EN: [&str; 7] = [
  "Sha", "Yek", "Dos", "Ses", "Cha", "Pan",
  "Jom"
];

/// Day of week, Iranian order: Saturday=0
/// through Friday=6.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct WeekdayIndex(u8);

impl WeekdayIndex {
  pub const SATURDAY: Self = Self(0);
  pub const FRIDAY: Self = Self(6);

  #[must_use]
  pub fn from_weekday(
    weekday: Weekday
  ) -> Self {
    let sunday_based =
      weekday.num_days_from_sunday() as u8;
    Self((sunday_based + 1) % 7)
  }

  #[must_use]
  pub fn get(self) -> u8 {
    self.0
  }
}

impl fmt::Display for WeekdayIndex {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(
      WEEKDAYS_EN[self.0 as usize]
    )
  }
}

/// Six Saturday-first weeks covering one
/// Jalali month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
  month: JalaliMonth,
  days:  Vec<CalendarDay>
}

impl MonthGrid {
  #[must_use]
  pub fn month(&self) -> JalaliMonth {
    self.month
  }

  #[must_use]
  pub fn days(&self) -> &[CalendarDay] {
    &self.days
  }

  pub fn weeks(
    &self
  ) -> impl Iterator<Item = &[CalendarDay]>
  {
    self.days.chunks(7)
  }

  #[must_use]
  pub fn first(&self) -> CalendarDay {
    self.days[0]
  }

  #[must_use]
  pub fn last(&self) -> CalendarDay {
    self.days[GRID_CELLS - 1]
  }

  #[must_use]
  pub fn contains_month_day(
    &self,
    day: &CalendarDay
  ) -> bool {
    day.jalali().year_month() == self.month
  }
}

#[tracing::instrument(skip(calendar))]
pub fn build_grid(
  calendar: &dyn CalendarSystem,
  month: JalaliMonth
) -> Result<MonthGrid, CalendarError> {
  let month_start =
    calendar.start_of_month(month)?;
  let offset =
    month_start.weekday().get() as i64;
  let grid_start = calendar
    .add_days(month_start, -offset)?;

  let days = (0..GRID_CELLS as i64)
    .map(|i| calendar.add_days(grid_start, i))
    .collect::<Result<Vec<_>, _>>()?;

  debug!(
    %month,
    offset,
    grid_start = %grid_start.jalali(),
    "built month grid"
  );

  Ok(MonthGrid {
    month,
    days
  })
}
