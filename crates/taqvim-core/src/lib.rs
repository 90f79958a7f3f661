pub mod api;
pub mod bucket;
pub mod cli;
pub mod commands;
pub mod config;
pub mod day_id;
pub mod draft;
pub mod error;
pub mod grid;
pub mod jalali;
pub mod page;
pub mod render;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use crate::error::CalendarError;
pub use crate::jalali::{
  CalendarDay,
  CalendarSystem,
  JalaliCalendar,
  JalaliDate,
  JalaliMonth
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting taqvim"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  )?;
  debug!(
    config = ?cfg.loaded_from,
    base_url = %cfg.server.base_url,
    timezone = %cfg.calendar.timezone,
    "configuration resolved"
  );

  let timezone = cfg.timezone();
  let mut page = page::CalendarPage::new(
    Box::new(JalaliCalendar),
    timezone,
    page::today_in(&timezone)
  )
  .context(
    "failed to open the calendar on \
     today's month"
  )?;

  let api =
    api::HttpCalendarApi::new(&cfg.server)?;
  let renderer = render::Renderer::new(&cfg);

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;

  runtime.block_on(commands::dispatch(
    &api,
    &mut page,
    &renderer,
    cli.command
  ))?;

  info!("done");
  Ok(())
}
