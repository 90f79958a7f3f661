use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::api::CalendarApi;
use crate::cli::Command;
use crate::day_id::DayId;
use crate::draft::{MeetingDraft, TaskDraft};
use crate::jalali::{CalendarDay, CalendarSystem, JalaliMonth, parse_gregorian, parse_jalali};
use crate::page::CalendarPage;
use crate::render::Renderer;

pub async fn dispatch<A>(
    api: &A,
    page: &mut CalendarPage,
    renderer: &Renderer,
    command: Command,
) -> anyhow::Result<()>
where
    A: CalendarApi,
{
    debug!(?command, cursor = %page.cursor(), "dispatching command");

    match command {
        Command::Month { month, offset } => cmd_month(api, page, renderer, month, offset).await,
        Command::Day { day_id } => cmd_day(api, page, renderer, &day_id).await,
        Command::Convert { date } => cmd_convert(page.calendar(), renderer, &date),
        Command::AddTask {
            day_id,
            title,
            assignee,
            priority,
            follow_up_at,
        } => {
            let draft = TaskDraft {
                title,
                assignee_id: Some(assignee),
                priority,
                follow_up_at,
            };
            cmd_add_task(api, page, renderer, &day_id, draft).await
        }
        Command::AddMeeting {
            day_id,
            title,
            all_day,
            start,
            end,
            location,
            notes,
            remind,
            alarm,
        } => {
            let draft = MeetingDraft {
                title,
                all_day,
                start,
                end,
                location,
                content: notes,
                reminders: remind,
                alarm,
            };
            cmd_add_meeting(api, page, renderer, &day_id, draft).await
        }
    }
}

#[instrument(skip(api, page, renderer))]
async fn cmd_month<A: CalendarApi>(
    api: &A,
    page: &mut CalendarPage,
    renderer: &Renderer,
    month: Option<String>,
    offset: Option<i32>,
) -> anyhow::Result<()> {
    let target = match (month, offset) {
        (Some(raw), _) => JalaliMonth::parse(&raw)?,
        (None, Some(n)) => page.cursor().offset(n)?,
        (None, None) => page.cursor(),
    };
    page.set_cursor(target)
        .with_context(|| format!("cannot show month {target}"))?;
    page.load(api).await;
    renderer.print_month(page)
}

/// Moves the page to the month containing `day_id`.
fn focus_day(page: &mut CalendarPage, day_id: &str) -> anyhow::Result<()> {
    let day = DayId::parse(page.calendar(), day_id)?;
    page.set_cursor(day.jalali().year_month())?;
    Ok(())
}

#[instrument(skip(api, page, renderer))]
async fn cmd_day<A: CalendarApi>(
    api: &A,
    page: &mut CalendarPage,
    renderer: &Renderer,
    day_id: &str,
) -> anyhow::Result<()> {
    focus_day(page, day_id)?;
    page.load(api).await;
    let detail = page.select_day(day_id)?;
    renderer.print_day(&detail, page.notices())
}

#[instrument(skip(calendar, renderer))]
fn cmd_convert(
    calendar: &dyn CalendarSystem,
    renderer: &Renderer,
    input: &str,
) -> anyhow::Result<()> {
    let day = convert_input(calendar, input)?;
    renderer.print_conversion(&day)
}

/// Reads a Gregorian `YYYY-MM-DD`, a Jalali
/// `YYYY/MM/DD` or a `YYYYMMDD` day id.
pub fn convert_input(
    calendar: &dyn CalendarSystem,
    input: &str,
) -> anyhow::Result<CalendarDay> {
    let trimmed = input.trim();
    let day = if trimmed.contains('-') {
        calendar.day(parse_gregorian(trimmed)?)?
    } else if trimmed.contains('/') {
        parse_jalali(calendar, trimmed)?
    } else {
        DayId::parse(calendar, trimmed)?
    };
    Ok(day)
}

#[instrument(skip(api, page, renderer, draft))]
async fn cmd_add_task<A: CalendarApi>(
    api: &A,
    page: &mut CalendarPage,
    renderer: &Renderer,
    day_id: &str,
    draft: TaskDraft,
) -> anyhow::Result<()> {
    focus_day(page, day_id)?;
    let created = page
        .create_task(api, day_id, draft)
        .await
        .context("failed to create task")?;
    info!(id = created.id, "task added");
    println!("Created task {}.", created.id);

    let detail = page.select_day(day_id)?;
    renderer.print_day(&detail, page.notices())
}

#[instrument(skip(api, page, renderer, draft))]
async fn cmd_add_meeting<A: CalendarApi>(
    api: &A,
    page: &mut CalendarPage,
    renderer: &Renderer,
    day_id: &str,
    draft: MeetingDraft,
) -> anyhow::Result<()> {
    focus_day(page, day_id)?;
    let created = page
        .create_meeting(api, day_id, draft)
        .await
        .context("failed to create meeting")?;
    info!(id = ?created.id, "meeting added");
    match created.id {
        Some(id) => println!("Created meeting {id}."),
        None => println!("Created meeting."),
    }

    let detail = page.select_day(day_id)?;
    renderer.print_day(&detail, page.notices())
}
