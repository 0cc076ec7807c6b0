use std::path::PathBuf;

use clap::ValueEnum;

/// Terminal color themes shipped with the asciinema-player bundle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    #[default]
    Asciinema,
    Dracula,
    GruvboxDark,
    Monokai,
    SolarizedDark,
    SolarizedLight,
    Tango,
    Nord,
}

impl Theme {
    /// Name understood by `AsciinemaPlayer.create`.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Asciinema => "asciinema",
            Theme::Dracula => "dracula",
            Theme::GruvboxDark => "gruvbox-dark",
            Theme::Monokai => "monokai",
            Theme::SolarizedDark => "solarized-dark",
            Theme::SolarizedLight => "solarized-light",
            Theme::Tango => "tango",
            Theme::Nord => "nord",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options as they arrive from the CLI: dimensions and rates still textual.
#[derive(Clone, Debug)]
pub struct RawOptions {
    pub output: PathBuf,
    pub width: String,
    pub height: String,
    pub theme: Theme,
    pub speed: String,
    pub scale: String,
}

impl Default for RawOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from("output.mp4"),
            width: "800".to_string(),
            height: "600".to_string(),
            theme: Theme::Asciinema,
            speed: "1".to_string(),
            scale: "2".to_string(),
        }
    }
}

/// Normalized options. Numeric fields that fail to parse become `f64::NAN`
/// and flow through to the viewport/encoder configuration unchecked; they are
/// not rejected here.
#[derive(Clone, Debug)]
pub struct ParsedOptions {
    pub output: PathBuf,
    pub width: f64,
    pub height: f64,
    pub theme: Theme,
    pub speed: f64,
    pub scale: f64,
}

impl ParsedOptions {
    pub fn from_raw(raw: &RawOptions) -> Self {
        Self {
            output: raw.output.clone(),
            width: parse_int(&raw.width),
            height: parse_int(&raw.height),
            theme: raw.theme,
            speed: parse_float(&raw.speed),
            scale: parse_float(&raw.scale),
        }
    }
}

/// Base-10 integer parse; non-numeric text yields the NaN sentinel.
fn parse_int(text: &str) -> f64 {
    text.trim()
        .parse::<i64>()
        .map(|v| v as f64)
        .unwrap_or(f64::NAN)
}

/// Float parse; non-numeric text yields the NaN sentinel.
fn parse_float(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_to_documented_values() {
        let parsed = ParsedOptions::from_raw(&RawOptions::default());
        assert_eq!(parsed.width, 800.0);
        assert_eq!(parsed.height, 600.0);
        assert_eq!(parsed.speed, 1.0);
        assert_eq!(parsed.scale, 2.0);
        assert_eq!(parsed.theme, Theme::Asciinema);
        assert_eq!(parsed.output, PathBuf::from("output.mp4"));
    }

    #[test]
    fn numeric_text_round_trips() {
        assert_eq!(parse_int("1024"), 1024.0);
        assert_eq!(parse_int(" 768 "), 768.0);
        assert_eq!(parse_float("1.75"), 1.75);
        assert_eq!(parse_float("0.5"), 0.5);
    }

    #[test]
    fn non_numeric_text_becomes_nan_for_that_field_only() {
        let raw = RawOptions {
            width: "wide".to_string(),
            ..RawOptions::default()
        };
        let parsed = ParsedOptions::from_raw(&raw);
        assert!(parsed.width.is_nan());
        assert_eq!(parsed.height, 600.0);
        assert_eq!(parsed.speed, 1.0);
        assert_eq!(parsed.scale, 2.0);
    }

    #[test]
    fn float_text_is_not_a_valid_integer() {
        // parseInt-style truncation is not emulated; "800.5" is not an int.
        assert!(parse_int("800.5").is_nan());
    }

    #[test]
    fn theme_names_match_player_bundle() {
        assert_eq!(Theme::Asciinema.as_str(), "asciinema");
        assert_eq!(Theme::GruvboxDark.as_str(), "gruvbox-dark");
        assert_eq!(Theme::SolarizedLight.as_str(), "solarized-light");
        assert_eq!(Theme::Nord.to_string(), "nord");
    }
}
