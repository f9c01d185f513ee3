use chrono::{Local, SecondsFormat};
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, time},
    prelude::*,
};
use yansi::Paint;

use crate::config::Log;

/// Installs the global subscriber. Logs go to stderr so the `check`
/// dashboard on stdout stays clean.
pub fn init(log: &Log) {
    let is_color = log.style.is_color();
    if !is_color {
        yansi::disable();
    }
    let filter: Targets = log.level.parse().unwrap_or_else(|e| {
        let err = format!("log level {:?} is not a valid filter: {}", log.level, e);
        panic!("{}", err.red().bold());
    });
    let format = fmt::layer()
        .with_timer(LocalTime)
        .with_ansi(is_color)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(format)
        .with(filter)
        .init();
}

struct LocalTime;

impl time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now().to_rfc3339_opts(SecondsFormat::Millis, false);
        w.write_str(&now)
    }
}
