mod helpers;
mod log;
mod report;
mod target;

pub(crate) use helpers::{parse_confidence, parse_injury_status, today};
pub(crate) use log::{cmd_log_checkin, cmd_log_food, cmd_log_injury, cmd_log_workout};
pub(crate) use report::{cmd_report_checkins, cmd_report_day, cmd_report_injuries};
pub(crate) use target::cmd_set_targets;
