use chrono::Local;
use colored::*;
use std::str::FromStr;

/// Environment variable holding the minimum level to print.
pub const LOG_LEVEL_ENV: &str = "LAUNDRY_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

impl LogLevel {
    fn from_env() -> Self {
        std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(LogLevel::Info)
    }
}

/// Named, colored console logger. Each actor owns one, built with the
/// actor's name and the color its INFO lines are printed in.
#[derive(Debug, Clone)]
pub struct Logger {
    pub name: String,
    pub info_color: Color,
    pub min_level: LogLevel,
}

impl Logger {
    pub fn new(name: impl Into<String>, info_color: Color) -> Self {
        Self {
            name: name.into().to_uppercase(),
            info_color,
            min_level: LogLevel::from_env(),
        }
    }

    /// Logger for a sub-component, e.g. `SERVER` -> `SERVER/127.0.0.1:5000`.
    pub fn child(&self, suffix: impl AsRef<str>) -> Self {
        Self {
            name: format!("{}/{}", self.name, suffix.as_ref().to_uppercase()),
            ..self.clone()
        }
    }

    fn timestamp() -> String {
        Local::now().format("%H:%M:%S").to_string()
    }

    fn header(&self, level: &str) -> String {
        format!("[{}][{}][{}]", Self::timestamp(), level, self.name)
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        if self.enabled(LogLevel::Debug) {
            println!("{} {} {}", self.header("DEBUG").dimmed(), "→".dimmed(), msg.as_ref());
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.enabled(LogLevel::Info) {
            println!(
                "{} {} {}",
                self.header("INFO").bold().color(self.info_color),
                "→".dimmed(),
                msg.as_ref()
            );
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.enabled(LogLevel::Warn) {
            println!(
                "{} {} {}",
                self.header("WARN").bold().yellow(),
                "→".dimmed(),
                msg.as_ref()
            );
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        eprintln!(
            "{} {} {}",
            self.header("ERROR").bold().bright_red(),
            "→".dimmed(),
            msg.as_ref()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        let mut logger = Logger::new("storage", Color::White);
        logger.min_level = LogLevel::Warn;
        assert!(!logger.enabled(LogLevel::Info));
        assert!(logger.enabled(LogLevel::Error));
        assert_eq!(logger.name, "STORAGE");
    }

    #[test]
    fn test_child_names() {
        let logger = Logger::new("server", Color::Cyan).child("peer");
        assert_eq!(logger.name, "SERVER/PEER");
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
    }
}
