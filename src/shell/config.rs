use crate::error;
use crate::lang::{Error, LineNumber};
use crate::mach::{Flags, POLL_INTERVAL};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Shell settings. Every field has a default so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scripts_directory: PathBuf,
    pub verbose: bool,
    pub optimize_ast: bool,
    pub optimize_peephole: bool,
    pub auto_start: LineNumber,
    pub auto_increment: LineNumber,
    pub background_run: bool,
    pub poll_interval: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scripts_directory: PathBuf::from("."),
            verbose: false,
            optimize_ast: true,
            optimize_peephole: true,
            auto_start: 10,
            auto_increment: 10,
            background_run: false,
            poll_interval: POLL_INTERVAL,
        }
    }
}

impl Config {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Config, Error> {
        let text = std::fs::read_to_string(path)?;
        Config::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Config, Error> {
        serde_json::from_str(text).map_err(|e| error!(SyntaxError; &format!("CONFIG: {}", e)))
    }

    /// Apply `CARTBASIC_*` environment overrides.
    pub fn from_env(self) -> Config {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars<F: Fn(&str) -> Option<String>>(mut self, var: F) -> Config {
        if let Some(dir) = var("CARTBASIC_SCRIPTS") {
            self.scripts_directory = PathBuf::from(dir);
        }
        if let Some(flag) = var("CARTBASIC_VERBOSE").and_then(|s| truthy(&s)) {
            self.verbose = flag;
        }
        if let Some(flag) = var("CARTBASIC_BACKGROUND").and_then(|s| truthy(&s)) {
            self.background_run = flag;
        }
        self
    }

    pub fn flags(&self) -> Flags {
        Flags {
            ast: self.optimize_ast,
            peephole: self.optimize_peephole,
        }
    }
}

fn truthy(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
