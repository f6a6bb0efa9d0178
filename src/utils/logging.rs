//! Optional plain-text transcript logging.
//!
//! Separate from the `tracing` diagnostics: this is the user-facing
//! session log, one timestamped turn per entry, appended to a file the
//! user picked on the command line or in config.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut logging = LoggingState {
            file_path: log_file,
            is_active: false,
        };

        // A file provided at startup enables logging immediately.
        if let Some(path) = logging.file_path.clone() {
            logging.test_file_access(&path)?;
            logging.is_active = true;
        }

        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self) -> Result<String, Box<dyn std::error::Error>> {
        match &self.file_path {
            Some(path) => {
                self.is_active = !self.is_active;
                if self.is_active {
                    Ok(format!("Logging resumed to: {path}"))
                } else {
                    Ok(format!("Logging paused (file: {path})"))
                }
            }
            None => Err("No log file specified. Use /log <filename> to enable logging first.".into()),
        }
    }

    /// Append one conversation turn. Content formatting is preserved
    /// exactly; a blank line separates turns, matching screen display.
    pub fn log_turn(&self, speaker: &str, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active {
            return Ok(());
        }
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{timestamp}] {speaker}:")?;
        for line in content.lines() {
            writeln!(file, "{line}")?;
        }
        writeln!(file)?;

        file.flush()?;
        Ok(())
    }

    pub fn get_status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
            (Some(path), false) => format!(
                "paused ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn logs_turns_with_speaker_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.log");
        let logging =
            LoggingState::new(Some(path.to_string_lossy().into_owned())).unwrap();

        logging.log_turn("You", "How do I open a bank account?").unwrap();
        logging.log_turn("Advisor", "Bring your passport\nand permit.").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("You:\nHow do I open a bank account?\n"));
        assert!(contents.contains("Advisor:\nBring your passport\nand permit.\n"));
    }

    #[test]
    fn inactive_logging_writes_nothing() {
        let mut logging = LoggingState::new(None).unwrap();
        assert_eq!(logging.get_status_string(), "disabled");
        logging.log_turn("You", "hello").unwrap();
        assert!(logging.toggle_logging().is_err());
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.log");
        let mut logging =
            LoggingState::new(Some(path.to_string_lossy().into_owned())).unwrap();

        assert!(logging.get_status_string().starts_with("active"));
        logging.toggle_logging().unwrap();
        assert!(logging.get_status_string().starts_with("paused"));
        logging.log_turn("You", "not recorded").unwrap();
        logging.toggle_logging().unwrap();
        logging.log_turn("You", "recorded").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("not recorded"));
        assert!(contents.contains("recorded"));
    }
}
