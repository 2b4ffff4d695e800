use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::content::DEFAULT_SECTIONS;
use crate::layout::Metadata;
use crate::render::pdf::DEFAULT_JPEG_QUALITY;

/// Institution names printed in the page header. The defaults are blank
/// placeholders for the student to fill in by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Institution {
    pub university: String,
    pub college: String,
    pub department: String,
}

impl Default for Institution {
    fn default() -> Self {
        Self {
            university: "جامعة __________".to_string(),
            college: "كلية __________".to_string(),
            department: "قسم __________".to_string(),
        }
    }
}

impl Institution {
    pub fn metadata(&self, title: &str) -> Metadata {
        Metadata {
            university: self.university.clone(),
            college: self.college.clone(),
            department: self.department.clone(),
            title: title.trim().to_string(),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup on malformed values; everything has a default except the
/// Telegram token, whose absence disables the chat front-end.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub output_dir: PathBuf,
    pub font_path: PathBuf,
    pub header_font_path: PathBuf,
    pub report_sections: usize,
    pub jpeg_quality: u8,
    pub telegram_bot_token: Option<String>,
    pub institution: Institution,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let font_path = PathBuf::from(
            lookup("FONT_PATH").unwrap_or_else(|| "DejaVuSans.ttf".to_string()),
        );
        let header_font_path = lookup("HEADER_FONT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| font_path.clone());

        let defaults = Institution::default();
        let institution = Institution {
            university: lookup("UNIVERSITY_NAME").unwrap_or(defaults.university),
            college: lookup("COLLEGE_NAME").unwrap_or(defaults.college),
            department: lookup("DEPARTMENT_NAME").unwrap_or(defaults.department),
        };

        let jpeg_quality: u8 = parse_or(&lookup, "JPEG_QUALITY", DEFAULT_JPEG_QUALITY)?;
        if !(1..=100).contains(&jpeg_quality) {
            anyhow::bail!("JPEG_QUALITY must be between 1 and 100, got {jpeg_quality}");
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            output_dir: PathBuf::from(
                lookup("OUTPUT_DIR").unwrap_or_else(|| "output".to_string()),
            ),
            font_path,
            header_font_path,
            report_sections: parse_or(&lookup, "REPORT_SECTIONS", DEFAULT_SECTIONS)?,
            jpeg_quality,
            telegram_bot_token: lookup("TELEGRAM_BOT_TOKEN").filter(|t| !t.trim().is_empty()),
            institution,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
