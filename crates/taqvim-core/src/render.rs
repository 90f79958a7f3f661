use std::io::{self, IsTerminal, Write};

use taqvim_shared::{MeetingDto, TaskDto};
use unicode_width::UnicodeWidthStr;

use crate::config::{Config, Locale};
use crate::day_id::DayId;
use crate::grid::{WEEKDAYS_EN, WEEKDAYS_FA};
use crate::jalali::{CalendarDay, JalaliMonth};
use crate::page::{CalendarPage, DayCell, DayDetail, FetchNotice, holiday_tooltip};

const RED: &str = "31";
const GREEN: &str = "32";
const YELLOW: &str = "33";
const DIM: &str = "2";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    locale: Locale,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: io::stdout().is_terminal(),
            locale: cfg.locale(),
        }
    }

    #[must_use]
    pub fn plain(locale: Locale) -> Self {
        Self {
            color: false,
            locale,
        }
    }

    #[tracing::instrument(skip(self, page))]
    pub fn print_month(&self, page: &CalendarPage) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_month(&mut out, page)
    }

    #[tracing::instrument(skip(self, detail, notices))]
    pub fn print_day(&self, detail: &DayDetail, notices: &[FetchNotice]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_day(&mut out, detail)?;
        self.write_notices(&mut out, notices)
    }

    pub fn print_conversion(&self, day: &CalendarDay) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_conversion(&mut out, day)
    }

    pub fn write_month<W: Write>(&self, mut out: W, page: &CalendarPage) -> anyhow::Result<()> {
        writeln!(out, "{}", self.month_title(page.cursor()))?;
        writeln!(out)?;

        let headers = self.weekday_labels();
        let cells = page.cells();
        let rows = cells
            .chunks(7)
            .map(|week| week.iter().map(|cell| self.cell_text(cell)).collect())
            .collect();
        write_table(&mut out, headers, rows)?;

        let holidays = cells
            .iter()
            .filter(|cell| cell.in_month)
            .filter_map(|cell| cell.holiday.as_ref().map(|h| (cell, h)))
            .collect::<Vec<_>>();
        if !holidays.is_empty() {
            writeln!(out)?;
            for (cell, holiday) in holidays {
                let tooltip = holiday_tooltip(holiday).unwrap_or_default();
                let mut lines = tooltip.lines();
                writeln!(
                    out,
                    "{}  {}",
                    self.paint(&cell.day.jalali().to_string(), RED),
                    lines.next().unwrap_or("holiday")
                )?;
                for line in lines {
                    writeln!(out, "            {line}")?;
                }
            }
        }

        self.write_notices(&mut out, page.notices())
    }

    pub fn write_day<W: Write>(&self, mut out: W, detail: &DayDetail) -> anyhow::Result<()> {
        let jalali = detail.day.jalali();
        let weekday = detail.day.weekday().get() as usize;
        writeln!(
            out,
            "{} {} {}  ({}, {})",
            jalali.day(),
            self.month_name(jalali.year_month()),
            jalali.year(),
            self.weekday_label(weekday),
            detail.day.wire_date()
        )?;
        writeln!(out, "day id    {}", detail.id)?;

        if let Some(holiday) = &detail.holiday {
            let label = if holiday.holiday { "holiday" } else { "events" };
            if let Some(tooltip) = holiday_tooltip(holiday) {
                for (idx, line) in tooltip.lines().enumerate() {
                    let key = if idx == 0 { label } else { "" };
                    writeln!(out, "{key:<9} {}", self.paint(line, RED))?;
                }
            }
        }

        writeln!(out)?;
        if detail.tasks.is_empty() {
            writeln!(out, "No tasks.")?;
        } else {
            write_table(&mut out, task_headers(), self.task_rows(&detail.tasks))?;
        }

        writeln!(out)?;
        if detail.meetings.is_empty() {
            writeln!(out, "No meetings.")?;
        } else {
            write_table(
                &mut out,
                meeting_headers(),
                self.meeting_rows(&detail.meetings),
            )?;
        }

        Ok(())
    }

    pub fn write_conversion<W: Write>(&self, mut out: W, day: &CalendarDay) -> anyhow::Result<()> {
        let jalali = day.jalali();
        let weekday = day.weekday().get() as usize;
        writeln!(out, "gregorian {}", day.wire_date())?;
        writeln!(
            out,
            "jalali    {}  ({} {} {})",
            jalali,
            jalali.day(),
            self.month_name(jalali.year_month()),
            jalali.year()
        )?;
        writeln!(out, "day id    {}", DayId::from_day(day))?;
        writeln!(out, "weekday   {}", self.weekday_label(weekday))?;
        Ok(())
    }

    fn write_notices<W: Write>(&self, mut out: W, notices: &[FetchNotice]) -> anyhow::Result<()> {
        if notices.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        for notice in notices {
            writeln!(out, "{} {notice}", self.paint("!", YELLOW))?;
        }
        Ok(())
    }

    fn cell_text(&self, cell: &DayCell) -> String {
        let mut text = format!("{:>2}", cell.day.jalali().day());
        let items = cell.task_count + cell.meeting_count;
        if items > 0 {
            text.push_str(&format!(" +{items}"));
        }

        if !cell.in_month {
            self.paint(&text, DIM)
        } else if cell.is_today {
            self.paint(&text, GREEN)
        } else if cell.is_holiday() {
            self.paint(&text, RED)
        } else if cell.is_friday {
            self.paint(&text, YELLOW)
        } else {
            text
        }
    }

    fn task_rows(&self, tasks: &[TaskDto]) -> Vec<Vec<String>> {
        tasks
            .iter()
            .map(|task| {
                let priority = task
                    .priority
                    .map(|p| format!("{p:?}").to_ascii_uppercase())
                    .unwrap_or_else(|| "-".to_string());
                vec![
                    self.paint(&task.id.to_string(), YELLOW),
                    priority,
                    format!("{:?}", task.status).to_ascii_uppercase(),
                    task.title.clone(),
                    task.assigned_to_name.clone().unwrap_or_default(),
                ]
            })
            .collect()
    }

    fn meeting_rows(&self, meetings: &[MeetingDto]) -> Vec<Vec<String>> {
        meetings
            .iter()
            .map(|meeting| {
                let id = meeting
                    .id
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let time = if meeting.all_day {
                    "all day".to_string()
                } else {
                    match (&meeting.start_time, &meeting.end_time) {
                        (Some(start), Some(end)) => format!("{start}-{end}"),
                        (Some(start), None) => start.clone(),
                        _ => String::new(),
                    }
                };
                vec![
                    self.paint(&id, YELLOW),
                    time,
                    meeting.title.clone(),
                    meeting.location.clone().unwrap_or_default(),
                ]
            })
            .collect()
    }

    fn month_title(&self, month: JalaliMonth) -> String {
        format!("{} {}  ({month})", self.month_name(month), month.year())
    }

    fn month_name(&self, month: JalaliMonth) -> &'static str {
        match self.locale {
            Locale::En => month.name(),
            Locale::Fa => month.name_fa(),
        }
    }

    fn weekday_label(&self, idx: usize) -> &'static str {
        match self.locale {
            Locale::En => WEEKDAYS_EN[idx % 7],
            Locale::Fa => WEEKDAYS_FA[idx % 7],
        }
    }

    fn weekday_labels(&self) -> Vec<String> {
        (0..7)
            .map(|idx| self.weekday_label(idx).to_string())
            .collect()
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn task_headers() -> Vec<String> {
    ["ID", "Priority", "Status", "Title", "Assignee"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn meeting_headers() -> Vec<String> {
    ["ID", "Time", "Title", "Location"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (idx, header) in headers.iter().enumerate() {
        let padding = widths[idx].saturating_sub(UnicodeWidthStr::width(header.as_str()));
        write!(writer, "{}{} ", header, " ".repeat(padding))?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use taqvim_shared::{HolidayDto, TaskPriority, TaskStatus};

    use super::*;
    use crate::jalali::{CalendarSystem, JalaliCalendar};
    use crate::page::FetchOutcome;

    fn page() -> CalendarPage {
        CalendarPage::new(
            Box::new(JalaliCalendar),
            chrono_tz::Asia::Tehran,
            NaiveDate::from_ymd_opt(2025, 9, 23).expect("date"),
        )
        .expect("page")
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn strip_ansi_removes_color_codes() {
        assert_eq!(strip_ansi("\x1b[31m12\x1b[0m"), "12");
    }

    #[test]
    fn table_pads_by_display_width() {
        let out = render(|buf| {
            write_table(
                buf,
                vec!["ش".to_string(), "ی".to_string()],
                vec![vec!["\x1b[32m 1\x1b[0m".to_string(), " 2".to_string()]],
            )
        });
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "ش  ی  ");
        assert_eq!(lines[1], "-- -- ");
        assert!(lines[2].ends_with(" 2 "));
    }

    #[test]
    fn month_view_has_six_weeks_and_lists_holidays() {
        let mut page = page();
        let ticket = page.refresh();
        page.apply(
            &ticket,
            FetchOutcome {
                tasks: vec![TaskDto {
                    id: 1,
                    title: "Plan".to_string(),
                    status: TaskStatus::Todo,
                    priority: Some(TaskPriority::High),
                    date: Some("2025-09-23".to_string()),
                    assigned_to_id: None,
                    assigned_to_name: None,
                    created_by_id: None,
                    created_by_name: None,
                    follow_up_enabled: None,
                    follow_up_at: None,
                }],
                holidays: vec![HolidayDto {
                    day_id: "14040705".to_string(),
                    holiday: true,
                    cause: Some("Tasua".to_string()),
                    events: None,
                }],
                ..FetchOutcome::default()
            },
        );

        let out = render(|buf| Renderer::plain(Locale::En).write_month(buf, &page));
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Mehr 1404  (1404/07)");
        assert!(lines[2].starts_with("Sha"));
        // title, blank, header, rule, six weeks
        assert!(lines.len() >= 10);
        assert!(lines[4].contains(" 1 +1"));
        assert!(out.contains("1404/07/05  Tasua"));
    }

    #[test]
    fn conversion_lists_both_calendars() {
        let day = JalaliCalendar
            .day(NaiveDate::from_ymd_opt(2025, 9, 23).expect("date"))
            .expect("day");
        let out = render(|buf| Renderer::plain(Locale::En).write_conversion(buf, &day));
        assert!(out.contains("gregorian 2025-09-23"));
        assert!(out.contains("jalali    1404/07/01  (1 Mehr 1404)"));
        assert!(out.contains("day id    14040701"));
        assert!(out.contains("weekday   Ses"));
    }

    #[test]
    fn persian_locale_uses_persian_labels() {
        let out = render(|buf| Renderer::plain(Locale::Fa).write_month(buf, &page()));
        assert!(out.lines().nth(2).is_some_and(|line| line.starts_with("ش")));
    }
}
