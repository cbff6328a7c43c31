use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse `PATIENT_NUMBER_PREFIXES`.
/// Format: comma-separated digit prefixes, e.g. `39,40`. Non-digit entries are skipped.
fn parse_prefixes(default: &[&str]) -> Vec<String> {
    match env::var("PATIENT_NUMBER_PREFIXES") {
        Ok(val) if !val.trim().is_empty() => val
            .split(',')
            .filter_map(|prefix| {
                let prefix = prefix.trim();
                if prefix.is_empty()
                    || prefix.len() >= 10
                    || !prefix.bytes().all(|b| b.is_ascii_digit())
                {
                    tracing::warn!(
                        "Invalid prefix '{}' in PATIENT_NUMBER_PREFIXES, skipping",
                        prefix
                    );
                    None
                } else {
                    Some(prefix.to_string())
                }
            })
            .collect(),
        _ => default.iter().map(|p| p.to_string()).collect(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// `tesseract` or `none`; `none` starts the service in degraded mode.
    pub engine: String,
    pub languages: String,
    pub datapath: Option<String>,
    /// Upper bound on concurrently running recognition sweeps.
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Leading digits a valid patient number may start with.
    pub known_prefixes: Vec<String>,
    /// Digit run length that ends the recognition sweep early.
    pub acceptance_run_length: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: "tesseract".to_string(),
            languages: "eng".to_string(),
            datapath: None,
            workers: 2,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            known_prefixes: vec!["39".to_string()],
            acceptance_run_length: 8,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let port = match env::var("PORT") {
            Ok(_) => parse_env_or("PORT", 10000),
            Err(_) => parse_env_or("MEDCARD_PORT", 10000),
        };

        Self {
            server: ServerConfig {
                host: env::var("MEDCARD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port,
                max_body_bytes: parse_env_or("MEDCARD_MAX_BODY_BYTES", 20 * 1024 * 1024),
                request_timeout_secs: parse_env_or("MEDCARD_REQUEST_TIMEOUT", 120),
            },
            ocr: OcrConfig {
                engine: env::var("OCR_ENGINE").unwrap_or_else(|_| "tesseract".to_string()),
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                datapath: env::var("TESSDATA_PREFIX").ok(),
                workers: parse_env_or("OCR_WORKERS", 2usize).max(1),
            },
            extraction: ExtractionConfig {
                known_prefixes: parse_prefixes(&["39"]),
                acceptance_run_length: parse_env_or("OCR_ACCEPT_RUN_LENGTH", 8usize).clamp(1, 10),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
