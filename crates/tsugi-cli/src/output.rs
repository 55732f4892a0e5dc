use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;

use anime_track_models::{CatalogSnapshot, TrackedEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "✓".green(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "success", "message": msg.as_ref() }));
            }
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors are always shown, even in quiet mode
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "error", "message": msg.as_ref() }));
            }
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "info", "message": msg.as_ref() }));
            }
        }
    }

    pub fn entries(&self, entries: &[TrackedEntry]) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => {
                for entry in entries {
                    println!(
                        "{} ({}) → Ep {} [{}]",
                        entry.title_name.bold(),
                        entry.alias.cyan(),
                        entry.last_watched,
                        entry.status
                    );
                }
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "entries", "entries": entries }));
            }
        }
    }

    pub fn snapshot(&self, snapshot: &CatalogSnapshot) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => {
                println!("{} (#{})", snapshot.title.bold(), snapshot.id);
                if let Some(episodes) = snapshot.episodes {
                    println!("  Episodes: {}", episodes);
                }
                if !snapshot.genres.is_empty() {
                    println!("  Genres: {}", snapshot.genres.join(", "));
                }
                if let Some(description) = &snapshot.description {
                    println!("  {}", description);
                }
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "snapshot", "snapshot": snapshot }));
            }
        }
    }

    fn print_json(&self, value: &serde_json::Value) {
        let rendered = match self.format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(value),
            _ => serde_json::to_string(value),
        };
        match rendered {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to render output: {}", e),
        }
    }
}
