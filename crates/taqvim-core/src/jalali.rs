use std::fmt;

use chrono::{
  Datelike,
  Duration,
  NaiveDate
};
use regex::Regex;

use crate::error::CalendarError;
use crate::grid::WeekdayIndex;

/// Jalali month names, transliterated.
pub const JALALI_MONTHS: [&str; 12] = [
  "Farvardin",
  "Ordibehesht",
  "Khordad",
  "Tir",
  "Mordad",
  "Shahrivar",
  "Mehr",
  "Aban",
  "Azar",
  "Dey",
  "Bahman",
  "Esfand"
];

/// Jalali month names in Persian script.
pub const JALALI_MONTHS_FA: [&str; 12] = [
  "فروردین",
  "اردیبهشت",
  "خرداد",
  "تیر",
  "مرداد",
  "شهریور",
  "مهر",
  "آبان",
  "آذر",
  "دی",
  "بهمن",
  "اسفند"
];

/// Years where the 33-year leap pattern
/// shifts. The algorithm is exact for
/// Jalali years in `[BREAKS[0],
/// BREAKS[last])`.
const BREAKS: [i32; 20] = [
  -61, 9, 38, 199, 426, 686, 756, 818,
  1111, 1181, 1210, 1635, 2060, 2097,
  2192, 2262, 2324, 2394, 2456, 3178
];

pub const MIN_JALALI_YEAR: i32 = BREAKS[0];
pub const MAX_JALALI_YEAR: i32 =
  BREAKS[BREAKS.len() - 1] - 1;

/// A validated Jalali calendar date.
///
/// Field order makes the derived `Ord`
/// chronological.
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
pub struct JalaliDate {
  year:  i32,
  month: u32,
  day:   u32
}

impl JalaliDate {
  #[must_use]
  pub fn year(&self) -> i32 {
    self.year
  }

  #[must_use]
  pub fn month(&self) -> u32 {
    self.month
  }

  #[must_use]
  pub fn day(&self) -> u32 {
    self.day
  }

  #[must_use]
  pub fn year_month(&self) -> JalaliMonth {
    JalaliMonth {
      year:  self.year,
      month: self.month
    }
  }
}

impl fmt::Display for JalaliDate {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{}/{:02}/{:02}",
      self.year, self.month, self.day
    )
  }
}

/// A Jalali (year, month) pair; the cursor
/// of the calendar page.
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
pub struct JalaliMonth {
  year:  i32,
  month: u32
}

impl JalaliMonth {
  pub fn new(
    year: i32,
    month: u32
  ) -> Result<Self, CalendarError> {
    if !(1..=12).contains(&month) {
      return Err(
        CalendarError::invalid_date(
          format!(
            "jalali month {month} is \
             outside 1..=12"
          )
        )
      );
    }
    if !(MIN_JALALI_YEAR
      ..=MAX_JALALI_YEAR)
      .contains(&year)
    {
      return Err(
        CalendarError::invalid_date(
          format!(
            "jalali year {year} is \
             outside the supported range"
          )
        )
      );
    }
    Ok(Self {
      year,
      month
    })
  }

  /// Accepts `YYYY/MM` or `YYYY-MM`.
  pub fn parse(
    raw: &str
  ) -> Result<Self, CalendarError> {
    let re =
      Regex::new(r"^(\d{1,4})[/-](\d{1,2})$")
        .map_err(|e| {
          CalendarError::invalid_date(
            format!(
              "internal regex compile \
               failure: {e}"
            )
          )
        })?;
    let caps = re
      .captures(raw.trim())
      .ok_or_else(|| {
        CalendarError::invalid_date(
          format!(
            "expected YYYY/MM, got \
             `{raw}`"
          )
        )
      })?;
    let year = caps[1]
      .parse::<i32>()
      .map_err(|e| {
        CalendarError::invalid_date(
          e.to_string()
        )
      })?;
    let month = caps[2]
      .parse::<u32>()
      .map_err(|e| {
        CalendarError::invalid_date(
          e.to_string()
        )
      })?;
    Self::new(year, month)
  }

  #[must_use]
  pub fn year(&self) -> i32 {
    self.year
  }

  #[must_use]
  pub fn month(&self) -> u32 {
    self.month
  }

  /// Moves by whole months, crossing year
  /// boundaries. Fails when the target year
  /// leaves the supported range.
  pub fn offset(
    &self,
    months: i32
  ) -> Result<Self, CalendarError> {
    let zero_based = i64::from(self.year) * 12
      + i64::from(self.month)
      - 1
      + i64::from(months);
    let year =
      i32::try_from(zero_based.div_euclid(12))
        .map_err(|_| {
          CalendarError::invalid_date(format!(
            "{} shifted by {months} \
             months overflows",
            self
          ))
        })?;
    let month =
      zero_based.rem_euclid(12) as u32 + 1;
    Self::new(year, month)
  }

  pub fn next(
    &self
  ) -> Result<Self, CalendarError> {
    self.offset(1)
  }

  pub fn prev(
    &self
  ) -> Result<Self, CalendarError> {
    self.offset(-1)
  }

  #[must_use]
  pub fn name(&self) -> &'static str {
    JALALI_MONTHS[self.month as usize - 1]
  }

  #[must_use]
  pub fn name_fa(&self) -> &'static str {
    JALALI_MONTHS_FA
      [self.month as usize - 1]
  }
}

impl fmt::Display for JalaliMonth {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{}/{:02}",
      self.year, self.month
    )
  }
}

/// One civil day seen through both
/// calendars. Date-only: there is no time
/// of day, so no timezone can shift it.
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
pub struct CalendarDay {
  gregorian: NaiveDate,
  jalali:    JalaliDate
}

impl CalendarDay {
  #[must_use]
  pub fn gregorian(&self) -> NaiveDate {
    self.gregorian
  }

  #[must_use]
  pub fn jalali(&self) -> JalaliDate {
    self.jalali
  }

  #[must_use]
  pub fn weekday(&self) -> WeekdayIndex {
    WeekdayIndex::from_weekday(
      self.gregorian.weekday()
    )
  }

  /// Gregorian `YYYY-MM-DD`, the only form
  /// the server accepts.
  #[must_use]
  pub fn wire_date(&self) -> String {
    self
      .gregorian
      .format("%Y-%m-%d")
      .to_string()
  }
}

/// Conversion and month arithmetic between
/// Gregorian storage dates and Jalali
/// display dates.
///
/// Components receive a `&dyn
/// CalendarSystem` instead of consulting
/// any process-wide calendar mode.
pub trait CalendarSystem:
  fmt::Debug + Send + Sync
{
  fn to_jalali(
    &self,
    date: NaiveDate
  ) -> Result<JalaliDate, CalendarError>;

  fn to_gregorian(
    &self,
    year: i32,
    month: u32,
    day: u32
  ) -> Result<NaiveDate, CalendarError>;

  fn is_leap_year(
    &self,
    year: i32
  ) -> Result<bool, CalendarError>;

  fn days_in_month(
    &self,
    year: i32,
    month: u32
  ) -> Result<u32, CalendarError> {
    match month {
      | 1..=6 => Ok(31),
      | 7..=11 => Ok(30),
      | 12 => {
        if self.is_leap_year(year)? {
          Ok(30)
        } else {
          Ok(29)
        }
      }
      | other => {
        Err(CalendarError::invalid_date(
          format!(
            "jalali month {other} is \
             outside 1..=12"
          )
        ))
      }
    }
  }

  fn day(
    &self,
    gregorian: NaiveDate
  ) -> Result<CalendarDay, CalendarError> {
    Ok(CalendarDay {
      gregorian,
      jalali: self.to_jalali(gregorian)?
    })
  }

  fn jalali_day(
    &self,
    year: i32,
    month: u32,
    day: u32
  ) -> Result<CalendarDay, CalendarError> {
    let gregorian =
      self.to_gregorian(year, month, day)?;
    Ok(CalendarDay {
      gregorian,
      jalali: JalaliDate {
        year,
        month,
        day
      }
    })
  }

  fn start_of_month(
    &self,
    month: JalaliMonth
  ) -> Result<CalendarDay, CalendarError> {
    self.jalali_day(
      month.year(),
      month.month(),
      1
    )
  }

  fn end_of_month(
    &self,
    month: JalaliMonth
  ) -> Result<CalendarDay, CalendarError> {
    let last = self.days_in_month(
      month.year(),
      month.month()
    )?;
    self.jalali_day(
      month.year(),
      month.month(),
      last
    )
  }

  fn add_days(
    &self,
    day: CalendarDay,
    days: i64
  ) -> Result<CalendarDay, CalendarError> {
    let shifted = day
      .gregorian()
      .checked_add_signed(Duration::days(
        days
      ))
      .ok_or_else(|| {
        CalendarError::invalid_date(
          format!(
            "{} shifted by {days} days \
             overflows",
            day.gregorian()
          )
        )
      })?;
    self.day(shifted)
  }

  /// Same Jalali day-of-month in the
  /// target month, clamped to its length.
  fn add_months(
    &self,
    day: CalendarDay,
    months: i32
  ) -> Result<CalendarDay, CalendarError> {
    let target = day
      .jalali()
      .year_month()
      .offset(months)?;
    let last = self.days_in_month(
      target.year(),
      target.month()
    )?;
    self.jalali_day(
      target.year(),
      target.month(),
      day.jalali().day().min(last)
    )
  }

  fn is_same_month(
    &self,
    a: &CalendarDay,
    b: &CalendarDay
  ) -> bool {
    a.jalali().year_month()
      == b.jalali().year_month()
  }
}

/// The arithmetic Jalali calendar: break
/// years with 33-year sub-cycles, exact to
/// the day within the supported range.
#[derive(
  Debug, Clone, Copy, Default,
)]
pub struct JalaliCalendar;

struct YearInfo {
  /// Years since the last leap year; 0
  /// means this year is leap.
  leap:  i32,
  /// Gregorian year containing Farvardin 1.
  gy:    i32,
  /// Day of March on which Farvardin 1
  /// falls.
  march: u32
}

fn year_info(
  jy: i32
) -> Result<YearInfo, CalendarError> {
  if !(MIN_JALALI_YEAR..=MAX_JALALI_YEAR)
    .contains(&jy)
  {
    return Err(
      CalendarError::invalid_date(
        format!(
          "jalali year {jy} is outside \
           {MIN_JALALI_YEAR}..=\
           {MAX_JALALI_YEAR}"
        )
      )
    );
  }

  let gy = jy + 621;
  let mut leap_j = -14;
  let mut jp = BREAKS[0];
  let mut jump = 0;
  for &jm in &BREAKS[1..] {
    jump = jm - jp;
    if jy < jm {
      break;
    }
    leap_j +=
      jump / 33 * 8 + (jump % 33) / 4;
    jp = jm;
  }

  let mut n = jy - jp;
  leap_j += n / 33 * 8 + (n % 33 + 3) / 4;
  if jump % 33 == 4 && jump - n == 4 {
    leap_j += 1;
  }

  let leap_g =
    gy / 4 - (gy / 100 + 1) * 3 / 4 - 150;
  let march = 20 + leap_j - leap_g;

  if jump - n < 6 {
    n = n - jump + (jump + 4) / 33 * 33;
  }
  let mut leap = ((n + 1) % 33 - 1) % 4;
  if leap == -1 {
    leap = 4;
  }

  Ok(YearInfo {
    leap,
    gy,
    march: march as u32
  })
}

fn farvardin_first(
  info: &YearInfo
) -> Result<NaiveDate, CalendarError> {
  NaiveDate::from_ymd_opt(
    info.gy, 3, info.march
  )
  .ok_or_else(|| {
    CalendarError::invalid_date(format!(
      "no gregorian date for march \
       {} {}",
      info.march, info.gy
    ))
  })
}

impl CalendarSystem for JalaliCalendar {
  #[tracing::instrument(level = "trace", skip(self))]
  fn to_jalali(
    &self,
    date: NaiveDate
  ) -> Result<JalaliDate, CalendarError> {
    // Farvardin 1 of `gy - 621` falls in
    // March of `gy`; earlier dates belong
    // to the year before.
    let mut jy = date.year() - 621;
    if jy > MAX_JALALI_YEAR
      || (jy >= MIN_JALALI_YEAR
        && date < farvardin_first(&year_info(jy)?)?)
    {
      jy -= 1;
    }
    let info = year_info(jy)?;
    let nowruz = farvardin_first(&info)?;

    let mut k = date.num_days_from_ce()
      - nowruz.num_days_from_ce();
    let year_len = if self.is_leap_year(jy)? {
      366
    } else {
      365
    };
    if !(0..year_len).contains(&k) {
      return Err(
        CalendarError::invalid_date(
          format!(
            "{date} is outside jalali \
             years {MIN_JALALI_YEAR}..=\
             {MAX_JALALI_YEAR}"
          )
        )
      );
    }
    if k <= 185 {
      return Ok(JalaliDate {
        year:  jy,
        month: (1 + k / 31) as u32,
        day:   (k % 31 + 1) as u32
      });
    }
    k -= 186;

    Ok(JalaliDate {
      year:  jy,
      month: (7 + k / 30) as u32,
      day:   (k % 30 + 1) as u32
    })
  }

  #[tracing::instrument(level = "trace", skip(self))]
  fn to_gregorian(
    &self,
    year: i32,
    month: u32,
    day: u32
  ) -> Result<NaiveDate, CalendarError> {
    let last =
      self.days_in_month(year, month)?;
    if day == 0 || day > last {
      return Err(
        CalendarError::invalid_date(
          format!(
            "jalali {year}/{month:02} has \
             {last} days, got day {day}"
          )
        )
      );
    }

    let info = year_info(year)?;
    let nowruz = farvardin_first(&info)?;
    let month = month as i64;
    let offset = (month - 1) * 31
      - (month / 7) * (month - 7)
      + day as i64
      - 1;
    nowruz
      .checked_add_signed(Duration::days(
        offset
      ))
      .ok_or_else(|| {
        CalendarError::invalid_date(
          format!(
            "jalali \
             {year}/{month:02}/{day:02} \
             overflows"
          )
        )
      })
  }

  fn is_leap_year(
    &self,
    year: i32
  ) -> Result<bool, CalendarError> {
    Ok(year_info(year)?.leap == 0)
  }
}

/// Validates a Gregorian (year, month,
/// day) triple.
pub fn gregorian_date(
  year: i32,
  month: u32,
  day: u32
) -> Result<NaiveDate, CalendarError> {
  NaiveDate::from_ymd_opt(year, month, day)
    .ok_or_else(|| {
      CalendarError::invalid_date(format!(
        "gregorian \
         {year}-{month:02}-{day:02} does \
         not exist"
      ))
    })
}

/// Parses a Gregorian `YYYY-MM-DD`.
pub fn parse_gregorian(
  raw: &str
) -> Result<NaiveDate, CalendarError> {
  NaiveDate::parse_from_str(
    raw.trim(),
    "%Y-%m-%d"
  )
  .map_err(|e| {
    CalendarError::invalid_date(format!(
      "`{}` is not a gregorian \
       YYYY-MM-DD date: {e}",
      raw.trim()
    ))
  })
}

/// Parses a Jalali `YYYY/MM/DD` against the
/// given calendar.
pub fn parse_jalali(
  calendar: &dyn CalendarSystem,
  raw: &str
) -> Result<CalendarDay, CalendarError> {
  let re = Regex::new(
    r"^(\d{1,4})/(\d{1,2})/(\d{1,2})$"
  )
  .map_err(|e| {
    CalendarError::invalid_date(format!(
      "internal regex compile failure: \
       {e}"
    ))
  })?;
  let caps = re
    .captures(raw.trim())
    .ok_or_else(|| {
      CalendarError::invalid_date(format!(
        "expected jalali YYYY/MM/DD, got \
         `{}`",
        raw.trim()
      ))
    })?;
  let field = |idx: usize| {
    caps[idx].parse::<u32>().map_err(|e| {
      CalendarError::invalid_date(
        e.to_string()
      )
    })
  };
  calendar.jalali_day(
    field(1)? as i32,
    field(2)?,
    field(3)?
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn g(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid gregorian")
  }

  #[test]
  fn converts_mehr_first_1404() {
    let j = JalaliCalendar
      .to_jalali(g(2025, 9, 23))
      .expect("convert");
    assert_eq!(
      (j.year(), j.month(), j.day()),
      (1404, 7, 1)
    );
  }

  #[test]
  fn converts_nowruz_and_its_eve() {
    let cal = JalaliCalendar;
    let nowruz = cal
      .to_jalali(g(2025, 3, 21))
      .expect("nowruz");
    assert_eq!(nowruz.to_string(), "1404/01/01");
    let eve = cal
      .to_jalali(g(2025, 3, 20))
      .expect("eve");
    assert_eq!(eve.to_string(), "1403/12/30");
  }

  #[test]
  fn converts_known_gregorian_anchors() {
    let cal = JalaliCalendar;
    let cases = [
      (g(1979, 2, 11), "1357/11/22"),
      (g(2000, 1, 1), "1378/10/11"),
      (g(2016, 3, 20), "1395/01/01"),
      (g(2024, 3, 20), "1403/01/01")
    ];
    for (date, expected) in cases {
      let j =
        cal.to_jalali(date).expect("convert");
      assert_eq!(
        j.to_string(),
        expected,
        "{date}"
      );
    }
  }

  #[test]
  fn to_gregorian_inverts_known_dates() {
    let cal = JalaliCalendar;
    assert_eq!(
      cal.to_gregorian(1404, 7, 1)
        .expect("convert"),
      g(2025, 9, 23)
    );
    assert_eq!(
      cal.to_gregorian(1403, 12, 30)
        .expect("convert"),
      g(2025, 3, 20)
    );
  }

  #[test]
  fn leap_years_follow_the_cycle() {
    let cal = JalaliCalendar;
    for year in [1395, 1399, 1403, 1408] {
      assert!(
        cal.is_leap_year(year)
          .expect("leap"),
        "{year} should be leap"
      );
      assert_eq!(
        cal.days_in_month(year, 12)
          .expect("days"),
        30
      );
    }
    for year in [1400, 1401, 1402, 1404] {
      assert!(
        !cal.is_leap_year(year)
          .expect("leap"),
        "{year} should not be leap"
      );
      assert_eq!(
        cal.days_in_month(year, 12)
          .expect("days"),
        29
      );
    }
  }

  #[test]
  fn month_lengths_by_index() {
    let cal = JalaliCalendar;
    for month in 1..=6 {
      assert_eq!(
        cal.days_in_month(1404, month)
          .expect("days"),
        31
      );
    }
    for month in 7..=11 {
      assert_eq!(
        cal.days_in_month(1404, month)
          .expect("days"),
        30
      );
    }
  }

  #[test]
  fn rejects_out_of_range_fields() {
    let cal = JalaliCalendar;
    assert!(matches!(
      cal.to_gregorian(1404, 13, 1),
      Err(CalendarError::InvalidDate { .. })
    ));
    assert!(matches!(
      cal.to_gregorian(1404, 7, 31),
      Err(CalendarError::InvalidDate { .. })
    ));
    assert!(matches!(
      cal.to_gregorian(1404, 12, 30),
      Err(CalendarError::InvalidDate { .. })
    ));
    assert!(matches!(
      cal.to_gregorian(1404, 1, 0),
      Err(CalendarError::InvalidDate { .. })
    ));
    assert!(matches!(
      cal.to_gregorian(
        MAX_JALALI_YEAR + 1,
        1,
        1
      ),
      Err(CalendarError::InvalidDate { .. })
    ));
    assert!(matches!(
      gregorian_date(2025, 2, 30),
      Err(CalendarError::InvalidDate { .. })
    ));
  }

  #[test]
  fn round_trips_every_day_of_five_centuries()
  {
    let cal = JalaliCalendar;
    let mut date = g(1800, 1, 1);
    let end = g(2300, 12, 31);
    while date <= end {
      let j =
        cal.to_jalali(date).expect("to jalali");
      let back = cal
        .to_gregorian(
          j.year(),
          j.month(),
          j.day()
        )
        .expect("to gregorian");
      assert_eq!(back, date);
      date = date
        .succ_opt()
        .expect("next day");
    }
  }

  #[test]
  fn consecutive_days_advance_by_one() {
    let cal = JalaliCalendar;
    let mut prev = cal
      .to_jalali(g(1999, 12, 31))
      .expect("start");
    let mut date = g(2000, 1, 1);
    while date <= g(2040, 12, 31) {
      let j = cal.to_jalali(date).expect("convert");
      assert!(j > prev, "{date}");
      if j.month() == prev.month() {
        assert_eq!(j.day(), prev.day() + 1);
      } else {
        assert_eq!(j.day(), 1);
      }
      prev = j;
      date = date.succ_opt().expect("next day");
    }
  }

  #[test]
  fn month_cursor_crosses_years() {
    let esfand = JalaliMonth::new(1403, 12)
      .expect("month");
    assert_eq!(
      esfand.next().expect("next").to_string(),
      "1404/01"
    );
    let farvardin =
      JalaliMonth::new(1404, 1).expect("month");
    assert_eq!(
      farvardin.prev().expect("prev").to_string(),
      "1403/12"
    );
    assert_eq!(
      farvardin
        .offset(-25)
        .expect("offset")
        .to_string(),
      "1401/12"
    );
    assert_eq!(
      farvardin
        .offset(18)
        .expect("offset")
        .to_string(),
      "1405/07"
    );
  }

  #[test]
  fn extreme_offsets_are_rejected_not_wrapped() {
    let mehr =
      JalaliMonth::new(1404, 7).expect("month");
    for months in [i32::MAX, i32::MIN, 50_000]
    {
      assert!(matches!(
        mehr.offset(months),
        Err(CalendarError::InvalidDate { .. })
      ));
    }
    let last = JalaliMonth::new(
      MAX_JALALI_YEAR,
      12
    )
    .expect("month");
    assert!(last.next().is_err());
    let first = JalaliMonth::new(
      MIN_JALALI_YEAR,
      1
    )
    .expect("month");
    assert!(first.prev().is_err());
  }

  #[test]
  fn parses_month_cursor() {
    let month = JalaliMonth::parse("1404/7")
      .expect("parse");
    assert_eq!(month.name(), "Mehr");
    assert!(JalaliMonth::parse("1404/13").is_err());
    assert!(JalaliMonth::parse("mehr").is_err());
  }

  #[test]
  fn start_and_end_of_month() {
    let cal = JalaliCalendar;
    let month =
      JalaliMonth::new(1403, 12).expect("month");
    let start =
      cal.start_of_month(month).expect("start");
    let end =
      cal.end_of_month(month).expect("end");
    assert_eq!(start.gregorian(), g(2025, 2, 19));
    assert_eq!(end.gregorian(), g(2025, 3, 20));
    assert_eq!(end.jalali().day(), 30);
  }

  #[test]
  fn add_months_clamps_day() {
    let cal = JalaliCalendar;
    let day = cal
      .jalali_day(1404, 6, 31)
      .expect("day");
    let next =
      cal.add_months(day, 1).expect("add");
    assert_eq!(next.jalali().to_string(), "1404/07/30");
    let esfand =
      cal.add_months(day, 6).expect("add");
    assert_eq!(esfand.jalali().to_string(), "1404/12/29");
    let back =
      cal.add_months(day, -12).expect("add");
    assert_eq!(back.jalali().to_string(), "1403/06/31");
  }

  #[test]
  fn add_days_crosses_months() {
    let cal = JalaliCalendar;
    let day = cal
      .jalali_day(1404, 6, 31)
      .expect("day");
    let next = cal.add_days(day, 1).expect("add");
    assert_eq!(next.jalali().to_string(), "1404/07/01");
    assert!(!cal.is_same_month(&day, &next));
    let back = cal.add_days(next, -31).expect("add");
    assert!(cal.is_same_month(&day, &back));
    assert_eq!(back.jalali().day(), 1);
  }

  #[test]
  fn parses_jalali_and_gregorian_inputs() {
    let cal = JalaliCalendar;
    let day = parse_jalali(&cal, "1404/07/01")
      .expect("jalali");
    assert_eq!(day.wire_date(), "2025-09-23");
    assert!(parse_jalali(&cal, "1404/12/30").is_err());
    assert!(parse_gregorian("2025-02-30").is_err());
    assert_eq!(
      parse_gregorian(" 2025-09-23 ")
        .expect("gregorian"),
      g(2025, 9, 23)
    );
  }

  #[test]
  fn last_supported_year_converts_before_nowruz() {
    let cal = JalaliCalendar;
    let jan = cal
      .to_jalali(g(3799, 1, 1))
      .expect("early january");
    assert_eq!(jan.year(), MAX_JALALI_YEAR);
    assert_eq!(jan.month(), 10);
    assert_eq!(
      cal
        .to_gregorian(
          jan.year(),
          jan.month(),
          jan.day()
        )
        .expect("back"),
      g(3799, 1, 1)
    );

    let esfand_last = cal
      .end_of_month(
        JalaliMonth::new(MAX_JALALI_YEAR, 12)
          .expect("month")
      )
      .expect("end");
    assert_eq!(
      cal
        .to_jalali(esfand_last.gregorian())
        .expect("last day"),
      esfand_last.jalali()
    );
    let after = esfand_last
      .gregorian()
      .succ_opt()
      .expect("next day");
    assert!(matches!(
      cal.to_jalali(after),
      Err(CalendarError::InvalidDate { .. })
    ));

    let first = cal
      .jalali_day(MIN_JALALI_YEAR, 1, 1)
      .expect("first day");
    let before = first
      .gregorian()
      .pred_opt()
      .expect("previous day");
    assert!(matches!(
      cal.to_jalali(before),
      Err(CalendarError::InvalidDate { .. })
    ));
  }
}
