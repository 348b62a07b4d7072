//! Output formatting for the CLI.

use colored::{Color, Colorize};

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), Color::Green)
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), Color::Red)
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), Color::Blue)
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), Color::Yellow)
    }

    /// Format a section heading.
    pub fn heading(&self, title: &str) -> String {
        let rule = "=".repeat(50);
        let text = format!("{rule}\n{title}\n{rule}");
        if self.color_enabled {
            text.bold().to_string()
        } else {
            text
        }
    }

    /// Format a `label: value` line.
    pub fn field(&self, label: &str, value: impl std::fmt::Display) -> String {
        format!("{}: {}", self.colorize(label, Color::Cyan), value)
    }

    /// Format a progress line, e.g. `Progress: 12/40 (30.0%)`.
    pub fn progress(&self, done: usize, total: usize) -> String {
        self.field("Progress", format!("{}/{} ({:.1}%)", done, total, percent(done, total)))
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: Color) -> String {
        if self.color_enabled {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}

/// `done` as a percentage of `total`; an empty total counts as done.
pub fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

/// First `max` characters of `text`, marking a cut with `...`.
pub fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.error("test"), "✗ test");
        assert_eq!(formatter.field("Failed", 3), "Failed: 3");
    }

    #[test]
    fn test_progress() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.progress(1, 8), "Progress: 1/8 (12.5%)");
        assert_eq!(formatter.progress(0, 0), "Progress: 0/0 (100.0%)");
    }

    #[test]
    fn test_heading() {
        let formatter = Formatter::new(false);
        let heading = formatter.heading("RETRY SUMMARY");
        assert_eq!(heading.lines().nth(1), Some("RETRY SUMMARY"));
    }

    #[test]
    fn test_shorten_is_char_safe() {
        assert_eq!(shorten("Grippe – Symptome", 8), "Grippe –...");
        assert_eq!(shorten("Flu", 8), "Flu");
    }
}
