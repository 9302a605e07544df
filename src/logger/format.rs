//! Console and file rendering of log lines
//!
//! Console lines are colorized (`[TAG] [LEVEL] message`), file lines are plain
//! text with a full timestamp. Errors and warnings go to stderr so piped
//! command output stays clean.

use super::config::LoggerConfig;
use super::file::write_to_file;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stderr, stdout, ErrorKind, Write};

const TAG_WIDTH: usize = 8;
const LEVEL_WIDTH: usize = 7;

pub fn format_and_log(config: &LoggerConfig, tag: LogTag, level: LogLevel, message: &str) {
    let now = Local::now();

    let prefix = if config.show_time {
        format!("{} ", now.format("%H:%M:%S")).dimmed().to_string()
    } else {
        String::new()
    };

    let console_line = format!(
        "{}[{}] [{}] {}",
        prefix,
        tag.colored(TAG_WIDTH),
        format_level(level),
        message
    );

    match level {
        LogLevel::Error | LogLevel::Warning => write_safe(&mut stderr(), &console_line),
        _ => write_safe(&mut stdout(), &console_line),
    }

    if config.file_path.is_some() {
        write_to_file(&render_plain(
            &now.format("%Y-%m-%d %H:%M:%S").to_string(),
            tag,
            level,
            message,
        ));
    }
}

/// Plain-text form written to the log file
pub fn render_plain(timestamp: &str, tag: LogTag, level: LogLevel, message: &str) -> String {
    format!(
        "{} [{}] [{}] {}",
        timestamp,
        tag.to_plain_string(),
        level.as_str(),
        message
    )
}

fn format_level(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.bright_yellow(),
        LogLevel::Info => label.normal(),
        LogLevel::Debug => label.bright_black(),
        LogLevel::Verbose => label.dimmed(),
    }
}

/// A closed pipe (e.g. `| head`) must not panic the process
fn write_safe<W: Write>(out: &mut W, line: &str) {
    if let Err(e) = writeln!(out, "{}", line) {
        if e.kind() != ErrorKind::BrokenPipe {
            eprintln!("logger write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_has_no_ansi() {
        let line = render_plain("2024-05-01 10:00:00", LogTag::Api, LogLevel::Warning, "slow");
        assert_eq!(line, "2024-05-01 10:00:00 [API] [WARNING] slow");
        assert!(!line.contains('\u{1b}'));
    }
}
