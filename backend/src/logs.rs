//! Pipeline status logging.
//!
//! Status lines go to stderr so that stdout stays free for command output
//! (`salestar parse` prints JSON there).

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
        }
    }
}

/// Render one status line; `indent` nests it under the previous line.
pub fn format_line(level: LogLevel, message: &str, indent: u8) -> String {
    format!("{}{} {}", "   ".repeat(indent as usize), level.prefix(), message)
}

fn log(level: LogLevel, message: impl Into<String>, indent: u8) {
    eprintln!("{}", format_line(level, &message.into(), indent));
}

pub fn log_info(msg: impl Into<String>) {
    log(LogLevel::Info, msg, 0);
}

pub fn log_success(msg: impl Into<String>) {
    log(LogLevel::Success, msg, 0);
}

pub fn log_warning(msg: impl Into<String>) {
    log(LogLevel::Warning, msg, 0);
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    log(LogLevel::Info, msg, indent);
}
