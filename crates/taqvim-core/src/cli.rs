use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use taqvim_shared::TaskPriority;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

fn parse_priority(s: &str) -> anyhow::Result<TaskPriority> {
    TaskPriority::parse(s).ok_or_else(|| anyhow!("expected LOW, MEDIUM or HIGH, got: {s}"))
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taqvim",
    version,
    about = "Jalali team calendar for tasks and meetings",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Config file, instead of $TAQVIM_CONFIG or the user config dir.
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Override a config value, e.g. --set server.base_url=http://host:8080
    #[arg(
        long = "set",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub overrides: Vec<KeyVal>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show a month grid with task, meeting and holiday markers.
    Month {
        /// Jalali month as YYYY/MM; defaults to the current month.
        month: Option<String>,

        /// Months relative to the current one.
        #[arg(long, allow_negative_numbers = true, conflicts_with = "month")]
        offset: Option<i32>,
    },

    /// Show the tasks, meetings and holiday of one day.
    Day {
        /// Jalali day identifier, e.g. 14040701.
        day_id: String,
    },

    /// Convert between Gregorian YYYY-MM-DD, Jalali YYYY/MM/DD and day identifiers.
    Convert { date: String },

    /// Create a task on a Jalali day.
    AddTask {
        day_id: String,

        #[arg(long)]
        title: String,

        /// User id of the assignee.
        #[arg(long)]
        assignee: i64,

        #[arg(long, value_parser = clap::builder::ValueParser::new(parse_priority))]
        priority: Option<TaskPriority>,

        /// Follow-up timestamp; enables follow-up when given.
        #[arg(long = "follow-up-at")]
        follow_up_at: Option<String>,
    },

    /// Create a meeting on a Jalali day.
    AddMeeting {
        day_id: String,

        #[arg(long)]
        title: String,

        #[arg(long = "all-day")]
        all_day: bool,

        /// Start time, HH:mm. Required unless --all-day.
        #[arg(long)]
        start: Option<String>,

        /// End time, HH:mm.
        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Reminder, in minutes before the meeting. Repeatable.
        #[arg(long = "remind", action = ArgAction::Append)]
        remind: Vec<u32>,

        #[arg(long)]
        alarm: bool,
    },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> GlobalCli {
        GlobalCli::try_parse_from(args).expect("parse")
    }

    #[test]
    fn keyval_splits_on_first_equals() {
        let kv: KeyVal = "server.cookie=SESSION=a; XSRF-TOKEN=b".parse().expect("kv");
        assert_eq!(kv.key, "server.cookie");
        assert_eq!(kv.value, "SESSION=a; XSRF-TOKEN=b");
        assert!("no-equals".parse::<KeyVal>().is_err());
    }

    #[test]
    fn month_accepts_negative_offset() {
        let cli = parse(&["taqvim", "-vv", "month", "--offset", "-2"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Month { month, offset } => {
                assert_eq!(month, None);
                assert_eq!(offset, Some(-2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_task_parses_priority_and_overrides() {
        let cli = parse(&[
            "taqvim",
            "--set",
            "calendar.locale=fa",
            "add-task",
            "14040701",
            "--title",
            "Budget",
            "--assignee",
            "7",
            "--priority",
            "h",
        ]);
        assert_eq!(cli.overrides.len(), 1);
        match cli.command {
            Command::AddTask {
                day_id,
                assignee,
                priority,
                ..
            } => {
                assert_eq!(day_id, "14040701");
                assert_eq!(assignee, 7);
                assert_eq!(priority, Some(TaskPriority::High));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_meeting_collects_reminders() {
        let cli = parse(&[
            "taqvim",
            "add-meeting",
            "14040701",
            "--title",
            "Review",
            "--start",
            "10:00",
            "--remind",
            "15",
            "--remind",
            "60",
        ]);
        match cli.command {
            Command::AddMeeting { remind, all_day, .. } => {
                assert_eq!(remind, vec![15, 60]);
                assert!(!all_day);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_priority() {
        assert!(
            GlobalCli::try_parse_from([
                "taqvim",
                "add-task",
                "14040701",
                "--title",
                "x",
                "--assignee",
                "1",
                "--priority",
                "urgent",
            ])
            .is_err()
        );
    }
}
