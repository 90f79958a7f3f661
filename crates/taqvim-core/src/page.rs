//! The calendar page: a month cursor, the
//! fetched collections for that month, and
//! the grid and day buckets derived from
//! them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{
  NaiveDate,
  Utc
};
use chrono_tz::Tz;
use taqvim_shared::{
  HolidayDto,
  MeetingDto,
  TaskDto
};
use tracing::{
  debug,
  info,
  instrument,
  warn
};

use crate::api::CalendarApi;
use crate::bucket::{
  DayBucket,
  index_meetings,
  index_tasks
};
use crate::day_id::DayId;
use crate::draft::{
  MeetingDraft,
  TaskDraft
};
use crate::error::CalendarError;
use crate::grid::{
  MonthGrid,
  WeekdayIndex,
  build_grid
};
use crate::jalali::{
  CalendarDay,
  CalendarSystem,
  JalaliMonth
};

/// Events listed in a holiday tooltip.
pub const MAX_TOOLTIP_EVENTS: usize = 4;

#[must_use]
pub fn today_in(timezone: &Tz) -> NaiveDate {
  Utc::now()
    .with_timezone(timezone)
    .date_naive()
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FetchCategory {
  Tasks,
  Meetings,
  Holidays
}

impl fmt::Display for FetchCategory {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(match self {
      | FetchCategory::Tasks => "tasks",
      | FetchCategory::Meetings => "meetings",
      | FetchCategory::Holidays => "holidays"
    })
  }
}

/// A fetch that failed and was replaced by
/// an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchNotice {
  pub category: FetchCategory,
  pub message:  String
}

impl fmt::Display for FetchNotice {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "could not load {}: {}",
      self.category, self.message
    )
  }
}

/// First and last day of the cursor month
/// with their identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthRange {
  pub start:    CalendarDay,
  pub end:      CalendarDay,
  pub start_id: DayId,
  pub end_id:   DayId
}

impl MonthRange {
  pub fn of(
    calendar: &dyn CalendarSystem,
    month: JalaliMonth
  ) -> Result<Self, CalendarError> {
    let start = calendar.start_of_month(month)?;
    let end = calendar.end_of_month(month)?;
    Ok(Self {
      start_id: DayId::from_day(&start),
      end_id: DayId::from_day(&end),
      start,
      end
    })
  }
}

/// Handed out when a fetch starts. Results
/// are only applied while the ticket's
/// generation is still the page's current
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
  generation: u64,
  month:      JalaliMonth,
  range:      MonthRange
}

impl FetchTicket {
  #[must_use]
  pub fn generation(&self) -> u64 {
    self.generation
  }

  #[must_use]
  pub fn month(&self) -> JalaliMonth {
    self.month
  }

  #[must_use]
  pub fn range(&self) -> &MonthRange {
    &self.range
  }
}

#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
  pub tasks:    Vec<TaskDto>,
  pub meetings: Vec<MeetingDto>,
  pub holidays: Vec<HolidayDto>,
  pub notices:  Vec<FetchNotice>
}

/// Runs the three fetches for `ticket`
/// concurrently. A failed fetch becomes an
/// empty list plus a notice.
#[instrument(skip(api, ticket), fields(month = %ticket.month, generation = ticket.generation))]
pub async fn fetch_month<A>(
  api: &A,
  ticket: &FetchTicket
) -> FetchOutcome
where
  A: CalendarApi
{
  let range = &ticket.range;
  let (tasks, meetings, holidays) = tokio::join!(
    api.tasks(),
    api.meetings(
      range.start.gregorian(),
      range.end.gregorian()
    ),
    api.holidays(
      &range.start_id,
      &range.end_id
    )
  );

  let mut notices = Vec::new();
  FetchOutcome {
    tasks: settle(
      FetchCategory::Tasks,
      tasks,
      &mut notices
    ),
    meetings: settle(
      FetchCategory::Meetings,
      meetings,
      &mut notices
    ),
    holidays: settle(
      FetchCategory::Holidays,
      holidays,
      &mut notices
    ),
    notices
  }
}

fn settle<T>(
  category: FetchCategory,
  result: anyhow::Result<Vec<T>>,
  notices: &mut Vec<FetchNotice>
) -> Vec<T> {
  match result {
    | Ok(items) => {
      debug!(%category, count = items.len(), "fetched");
      items
    }
    | Err(err) => {
      warn!(%category, error = %format!("{err:#}"), "fetch failed; showing none");
      notices.push(FetchNotice {
        category,
        message: format!("{err:#}")
      });
      Vec::new()
    }
  }
}

/// One of the 42 grid cells, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
  pub day:           CalendarDay,
  pub id:            DayId,
  pub in_month:      bool,
  pub is_friday:     bool,
  pub is_today:      bool,
  /// Set only when the day's entry has
  /// `holiday = true`. An entry with
  /// `holiday = false` is an event, not a
  /// day off.
  pub holiday:       Option<HolidayDto>,
  pub task_count:    usize,
  pub meeting_count: usize
}

impl DayCell {
  #[must_use]
  pub fn is_holiday(&self) -> bool {
    self.holiday.is_some()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayDetail {
  pub day:      CalendarDay,
  pub id:       DayId,
  pub holiday:  Option<HolidayDto>,
  pub tasks:    Vec<TaskDto>,
  pub meetings: Vec<MeetingDto>
}

/// Cause, then up to four events, one per
/// line.
#[must_use]
pub fn holiday_tooltip(
  holiday: &HolidayDto
) -> Option<String> {
  let mut lines = Vec::new();
  if let Some(cause) = holiday
    .cause
    .as_deref()
    .map(str::trim)
    .filter(|c| !c.is_empty())
  {
    lines.push(cause.to_string());
  }
  if let Some(events) = &holiday.events {
    lines.extend(
      events
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .take(MAX_TOOLTIP_EVENTS)
        .map(|e| format!("- {e}"))
    );
  }
  (!lines.is_empty()).then(|| lines.join("\n"))
}

pub struct CalendarPage {
  calendar:  Box<dyn CalendarSystem>,
  timezone:  Tz,
  today:     CalendarDay,
  cursor:    JalaliMonth,
  range:     MonthRange,
  grid:      MonthGrid,
  generation: u64,
  loading:   bool,
  tasks:     Vec<TaskDto>,
  meetings:  Vec<MeetingDto>,
  holidays:  BTreeMap<DayId, HolidayDto>,
  task_days: DayBucket<TaskDto>,
  meeting_days: DayBucket<MeetingDto>,
  notices:   Vec<FetchNotice>
}

impl fmt::Debug for CalendarPage {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.debug_struct("CalendarPage")
      .field("calendar", &self.calendar)
      .field("timezone", &self.timezone)
      .field("cursor", &self.cursor)
      .field("generation", &self.generation)
      .field("loading", &self.loading)
      .field("tasks", &self.tasks.len())
      .field("meetings", &self.meetings.len())
      .field("holidays", &self.holidays.len())
      .finish_non_exhaustive()
  }
}

impl CalendarPage {
  /// Opens on the month containing `today`.
  pub fn new(
    calendar: Box<dyn CalendarSystem>,
    timezone: Tz,
    today: NaiveDate
  ) -> Result<Self, CalendarError> {
    let today = calendar.day(today)?;
    let cursor = today.jalali().year_month();
    let range =
      MonthRange::of(calendar.as_ref(), cursor)?;
    let grid =
      build_grid(calendar.as_ref(), cursor)?;

    Ok(Self {
      calendar,
      timezone,
      today,
      cursor,
      range,
      grid,
      generation: 0,
      loading: false,
      tasks: Vec::new(),
      meetings: Vec::new(),
      holidays: BTreeMap::new(),
      task_days: DayBucket::default(),
      meeting_days: DayBucket::default(),
      notices: Vec::new()
    })
  }

  #[must_use]
  pub fn calendar(&self) -> &dyn CalendarSystem {
    self.calendar.as_ref()
  }

  #[must_use]
  pub fn cursor(&self) -> JalaliMonth {
    self.cursor
  }

  #[must_use]
  pub fn today(&self) -> CalendarDay {
    self.today
  }

  #[must_use]
  pub fn range(&self) -> &MonthRange {
    &self.range
  }

  #[must_use]
  pub fn grid(&self) -> &MonthGrid {
    &self.grid
  }

  #[must_use]
  pub fn is_loading(&self) -> bool {
    self.loading
  }

  #[must_use]
  pub fn notices(&self) -> &[FetchNotice] {
    &self.notices
  }

  #[must_use]
  pub fn tasks(&self) -> &DayBucket<TaskDto> {
    &self.task_days
  }

  #[must_use]
  pub fn meetings(
    &self
  ) -> &DayBucket<MeetingDto> {
    &self.meeting_days
  }

  /// Holidays in the current range, keyed by
  /// day.
  #[must_use]
  pub fn holidays(
    &self
  ) -> &BTreeMap<DayId, HolidayDto> {
    &self.holidays
  }

  /// Moves the cursor and starts a new fetch
  /// generation. Any ticket handed out
  /// earlier becomes stale.
  #[instrument(skip(self), fields(from = %self.cursor))]
  pub fn set_cursor(
    &mut self,
    month: JalaliMonth
  ) -> Result<FetchTicket, CalendarError> {
    let range = MonthRange::of(
      self.calendar.as_ref(),
      month
    )?;
    let grid =
      build_grid(self.calendar.as_ref(), month)?;

    self.cursor = month;
    self.range = range;
    self.grid = grid;
    Ok(self.refresh())
  }

  pub fn next_month(
    &mut self
  ) -> Result<FetchTicket, CalendarError> {
    self.set_cursor(self.cursor.next()?)
  }

  pub fn prev_month(
    &mut self
  ) -> Result<FetchTicket, CalendarError> {
    self.set_cursor(self.cursor.prev()?)
  }

  pub fn go_today(
    &mut self
  ) -> Result<FetchTicket, CalendarError> {
    self.set_cursor(
      self.today.jalali().year_month()
    )
  }

  /// Starts a new fetch generation for the
  /// current cursor.
  pub fn refresh(&mut self) -> FetchTicket {
    self.generation += 1;
    self.loading = true;
    debug!(
      month = %self.cursor,
      generation = self.generation,
      start = %self.range.start_id,
      end = %self.range.end_id,
      "fetch started"
    );
    FetchTicket {
      generation: self.generation,
      month:      self.cursor,
      range:      self.range.clone()
    }
  }

  /// Replaces the collections with
  /// `outcome` unless `ticket` is stale.
  /// Returns whether the outcome was
  /// applied.
  pub fn apply(
    &mut self,
    ticket: &FetchTicket,
    outcome: FetchOutcome
  ) -> bool {
    if ticket.generation != self.generation {
      debug!(
        ticket = ticket.generation,
        current = self.generation,
        month = %ticket.month,
        "dropping stale fetch result"
      );
      return false;
    }

    let FetchOutcome {
      tasks,
      meetings,
      holidays,
      notices
    } = outcome;

    self.task_days = index_tasks(
      self.calendar.as_ref(),
      &tasks,
      &self.timezone
    );
    self.meeting_days = index_meetings(
      self.calendar.as_ref(),
      &meetings,
      &self.timezone
    );
    self.holidays = self.key_holidays(holidays);
    self.tasks = tasks;
    self.meetings = meetings;
    self.notices = notices;
    self.loading = false;

    info!(
      month = %self.cursor,
      tasks = self.tasks.len(),
      meetings = self.meetings.len(),
      holidays = self.holidays.len(),
      notices = self.notices.len(),
      "calendar page updated"
    );
    true
  }

  fn key_holidays(
    &self,
    holidays: Vec<HolidayDto>
  ) -> BTreeMap<DayId, HolidayDto> {
    let mut keyed = BTreeMap::new();
    for holiday in holidays {
      match DayId::parse(
        self.calendar.as_ref(),
        &holiday.day_id
      ) {
        | Ok(day) => {
          keyed
            .insert(DayId::from_day(&day), holiday);
        }
        | Err(err) => {
          warn!(
            day_id = %holiday.day_id,
            error = %err,
            "ignoring holiday with bad day id"
          );
        }
      }
    }
    keyed
  }

  fn marked_holiday(
    &self,
    id: &DayId
  ) -> Option<HolidayDto> {
    self
      .holidays
      .get(id)
      .filter(|h| h.holiday)
      .cloned()
  }

  #[must_use]
  pub fn cells(&self) -> Vec<DayCell> {
    self
      .grid
      .days()
      .iter()
      .map(|day| {
        let id = DayId::from_day(day);
        DayCell {
          day:           *day,
          in_month:      self
            .grid
            .contains_month_day(day),
          is_friday:     day.weekday()
            == WeekdayIndex::FRIDAY,
          is_today:      *day == self.today,
          holiday:       self
            .marked_holiday(&id),
          task_count:    self.task_days.count(&id),
          meeting_count: self
            .meeting_days
            .count(&id),
          id
        }
      })
      .collect()
  }

  /// Looks up everything on the day named by
  /// a `YYYYMMDD` identifier.
  #[instrument(skip(self))]
  pub fn select_day(
    &self,
    raw: &str
  ) -> Result<DayDetail, CalendarError> {
    let day =
      DayId::parse(self.calendar.as_ref(), raw)?;
    let id = DayId::from_day(&day);
    Ok(DayDetail {
      holiday: self.holidays.get(&id).cloned(),
      tasks: self.task_days.get(&id).to_vec(),
      meetings: self
        .meeting_days
        .get(&id)
        .to_vec(),
      day,
      id
    })
  }

  /// Fetches the current month and applies
  /// the result.
  pub async fn load<A>(&mut self, api: &A) -> bool
  where
    A: CalendarApi
  {
    let ticket = self.refresh();
    let outcome = fetch_month(api, &ticket).await;
    self.apply(&ticket, outcome)
  }

  /// Creates a task on the selected day and
  /// refetches the month.
  #[instrument(skip(self, api, draft))]
  pub async fn create_task<A>(
    &mut self,
    api: &A,
    day_id: &str,
    draft: TaskDraft
  ) -> anyhow::Result<TaskDto>
  where
    A: CalendarApi
  {
    let day =
      DayId::parse(self.calendar.as_ref(), day_id)?;
    let create = draft.into_create(&day)?;
    let created = api.create_task(&create).await?;
    info!(
      id = created.id,
      day = %day.jalali(),
      date = %create.date,
      "task created"
    );
    self.load(api).await;
    Ok(created)
  }

  #[instrument(skip(self, api, draft))]
  pub async fn create_meeting<A>(
    &mut self,
    api: &A,
    day_id: &str,
    draft: MeetingDraft
  ) -> anyhow::Result<MeetingDto>
  where
    A: CalendarApi
  {
    let day =
      DayId::parse(self.calendar.as_ref(), day_id)?;
    let create = draft.into_create(&day)?;
    let created =
      api.create_meeting(&create).await?;
    info!(
      id = ?created.id,
      day = %day.jalali(),
      date = %create.date,
      "meeting created"
    );
    self.load(api).await;
    Ok(created)
  }
}
