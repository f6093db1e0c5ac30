//! Daemon configuration, resolved once at startup and immutable afterwards.
//!
//! Layering: defaults ← optional TOML file ← `MEDIACHECK_*` environment ←
//! CLI flags (applied by `main`). Each probe reads only the subset relevant
//! to its peripheral.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// ALSA default playback device.
pub const DEFAULT_AUDIO_DEVICE: &str = "default";

/// Resolved configuration. Never mutated after startup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Run the probe sequence before idling.
    pub self_test: bool,
    /// Exit 0/1 after the probe sequence instead of idling.
    pub exit_after_self_test: bool,
    /// Console-like device node to write the status message to.
    pub display_tty: PathBuf,
    /// Status text written/shown during the display probe.
    pub display_message: String,
    /// Full display command line; bypasses every other display strategy.
    pub display_command: Option<String>,
    /// Seconds for the dialog timeout and the synthetic pattern. Unset keeps
    /// the historical per-strategy defaults (10 for the dialog, 3 for the
    /// pattern).
    pub display_duration_secs: Option<u64>,
    /// Full audio command line; bypasses every other audio strategy.
    pub audio_command: Option<String>,
    /// Default audio sample file.
    pub audio_sample: PathBuf,
    /// Request non-terminating playback where supported.
    pub audio_loop: bool,
    /// Target device string passed to playback tools.
    pub audio_device: String,
    /// Frequency for every synthesized-tone fallback.
    pub tone_hz: u32,
    /// Interval of the liveness line while idling.
    pub idle_interval_secs: u64,
    /// Whether a graphical session was detected (`DISPLAY` set and
    /// non-empty). Derived from the environment, not settable from the file.
    #[serde(skip)]
    pub graphical_session: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            self_test: true,
            exit_after_self_test: false,
            display_tty: PathBuf::from("/dev/tty1"),
            display_message: default_display_message(),
            display_command: None,
            display_duration_secs: None,
            audio_command: None,
            audio_sample: PathBuf::from("/usr/share/sounds/alsa/Front_Center.wav"),
            audio_loop: false,
            audio_device: DEFAULT_AUDIO_DEVICE.to_string(),
            tone_hz: 880,
            idle_interval_secs: 10,
            graphical_session: false,
        }
    }
}

fn default_display_message() -> String {
    format!(
        "=== MEDIA SELF-TEST ===\nDisplay output path is alive.\nChecked at: {}\n=======================",
        chrono::Local::now().format("%a %b %e %H:%M:%S %Y")
    )
}

impl Config {
    /// Dialog timeout passed to zenity.
    pub fn dialog_timeout_secs(&self) -> u64 {
        self.display_duration_secs.unwrap_or(10)
    }

    /// Duration of the synthetic video pattern.
    pub fn pattern_duration_secs(&self) -> u64 {
        self.display_duration_secs.unwrap_or(3)
    }

    /// Shell-split display override, if configured. `validate` guarantees a
    /// configured override splits to a non-empty argv.
    pub fn display_override(&self) -> Option<Vec<String>> {
        self.display_command.as_deref().and_then(split_command)
    }

    /// Shell-split audio override, if configured.
    pub fn audio_override(&self) -> Option<Vec<String>> {
        self.audio_command.as_deref().and_then(split_command)
    }

    pub fn validate(&self) -> Result<()> {
        if self.idle_interval_secs == 0 {
            return Err(anyhow!("idle_interval_secs must be > 0"));
        }
        if self.tone_hz == 0 {
            return Err(anyhow!("tone_hz must be > 0"));
        }
        if self.audio_device.trim().is_empty() {
            return Err(anyhow!("audio_device must not be empty"));
        }
        if let Some(raw) = &self.display_command
            && split_command(raw).is_none()
        {
            return Err(anyhow!("display_command does not parse to a command: {raw:?}"));
        }
        if let Some(raw) = &self.audio_command
            && split_command(raw).is_none()
        {
            return Err(anyhow!("audio_command does not parse to a command: {raw:?}"));
        }
        Ok(())
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| env::var(key).ok())
    }

    /// Overlay values from an arbitrary environment lookup (tests inject a
    /// map here instead of mutating the process environment).
    pub fn apply_env_from<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = get("MEDIACHECK_SELF_TEST") {
            self.self_test = parse_bool("MEDIACHECK_SELF_TEST", &raw)?;
        }
        if let Some(raw) = get("MEDIACHECK_SELF_TEST_EXIT") {
            self.exit_after_self_test = parse_bool("MEDIACHECK_SELF_TEST_EXIT", &raw)?;
        }
        if let Some(raw) = get("MEDIACHECK_DISPLAY_TTY") {
            self.display_tty = PathBuf::from(raw);
        }
        if let Some(raw) = get("MEDIACHECK_DISPLAY_MESSAGE") {
            self.display_message = raw;
        }
        if let Some(raw) = get("MEDIACHECK_DISPLAY_COMMAND") {
            self.display_command = Some(raw);
        }
        if let Some(raw) = get("MEDIACHECK_DISPLAY_DURATION") {
            self.display_duration_secs =
                Some(parse_number("MEDIACHECK_DISPLAY_DURATION", &raw)?);
        }
        if let Some(raw) = get("MEDIACHECK_AUDIO_COMMAND") {
            self.audio_command = Some(raw);
        }
        if let Some(raw) = get("MEDIACHECK_AUDIO_SAMPLE") {
            self.audio_sample = PathBuf::from(raw);
        }
        if let Some(raw) = get("MEDIACHECK_AUDIO_LOOP") {
            self.audio_loop = parse_bool("MEDIACHECK_AUDIO_LOOP", &raw)?;
        }
        if let Some(raw) = get("MEDIACHECK_AUDIO_DEVICE") {
            self.audio_device = raw;
        }
        if let Some(raw) = get("MEDIACHECK_AUDIO_TONE") {
            self.tone_hz = parse_number("MEDIACHECK_AUDIO_TONE", &raw)?;
        }
        if let Some(raw) = get("MEDIACHECK_IDLE_INTERVAL") {
            self.idle_interval_secs = parse_number("MEDIACHECK_IDLE_INTERVAL", &raw)?;
        }
        self.graphical_session = get("DISPLAY").is_some_and(|value| !value.is_empty());
        Ok(())
    }
}

/// Load config from a TOML file. A missing file returns defaults.
pub fn load_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

fn split_command(raw: &str) -> Option<Vec<String>> {
    let argv = shlex::split(raw)?;
    if argv.is_empty() { None } else { Some(argv) }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim() {
        "1" | "true" | "True" | "TRUE" => Ok(true),
        "0" | "false" | "False" | "FALSE" => Ok(false),
        other => Err(anyhow!("{key} must be a boolean (1/0/true/false), got {other:?}")),
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("parse {key} {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn defaults_validate() {
        let cfg = Config::default();
        cfg.validate().expect("defaults valid");
        assert!(cfg.self_test);
        assert_eq!(cfg.audio_device, "default");
        assert_eq!(cfg.tone_hz, 880);
        assert_eq!(cfg.dialog_timeout_secs(), 10);
        assert_eq!(cfg.pattern_duration_secs(), 3);
    }

    #[test]
    fn env_overlay_takes_effect() {
        let env = env_of(&[
            ("MEDIACHECK_SELF_TEST", "0"),
            ("MEDIACHECK_SELF_TEST_EXIT", "1"),
            ("MEDIACHECK_DISPLAY_TTY", "/dev/tty7"),
            ("MEDIACHECK_DISPLAY_DURATION", "7"),
            ("MEDIACHECK_AUDIO_LOOP", "true"),
            ("MEDIACHECK_AUDIO_DEVICE", "plughw:1,0"),
            ("MEDIACHECK_AUDIO_TONE", "440"),
            ("MEDIACHECK_IDLE_INTERVAL", "30"),
            ("DISPLAY", ":0"),
        ]);

        let mut cfg = Config::default();
        cfg.apply_env_from(|key| env.get(key).cloned()).expect("overlay");

        assert!(!cfg.self_test);
        assert!(cfg.exit_after_self_test);
        assert_eq!(cfg.display_tty, PathBuf::from("/dev/tty7"));
        assert_eq!(cfg.display_duration_secs, Some(7));
        assert_eq!(cfg.dialog_timeout_secs(), 7);
        assert_eq!(cfg.pattern_duration_secs(), 7);
        assert!(cfg.audio_loop);
        assert_eq!(cfg.audio_device, "plughw:1,0");
        assert_eq!(cfg.tone_hz, 440);
        assert_eq!(cfg.idle_interval_secs, 30);
        assert!(cfg.graphical_session);
    }

    #[test]
    fn empty_display_var_means_no_graphical_session() {
        let env = env_of(&[("DISPLAY", "")]);
        let mut cfg = Config::default();
        cfg.apply_env_from(|key| env.get(key).cloned()).expect("overlay");
        assert!(!cfg.graphical_session);
    }

    #[test]
    fn bad_boolean_is_rejected() {
        let env = env_of(&[("MEDIACHECK_AUDIO_LOOP", "yes")]);
        let mut cfg = Config::default();
        let err = cfg
            .apply_env_from(|key| env.get(key).cloned())
            .unwrap_err();
        assert!(err.to_string().contains("MEDIACHECK_AUDIO_LOOP"));
    }

    #[test]
    fn bad_number_is_rejected() {
        let env = env_of(&[("MEDIACHECK_AUDIO_TONE", "loud")]);
        let mut cfg = Config::default();
        assert!(cfg.apply_env_from(|key| env.get(key).cloned()).is_err());
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_file(&temp.path().join("missing.toml")).expect("load");
        assert!(cfg.self_test);
        assert_eq!(cfg.audio_device, "default");
    }

    #[test]
    fn load_file_overrides_fields() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "tone_hz = 440\naudio_loop = true\naudio_sample = \"/tmp/chime.wav\"\n",
        )
        .expect("write");

        let cfg = load_file(&path).expect("load");
        assert_eq!(cfg.tone_hz, 440);
        assert!(cfg.audio_loop);
        assert_eq!(cfg.audio_sample, PathBuf::from("/tmp/chime.wav"));
        // untouched fields keep their defaults
        assert_eq!(cfg.idle_interval_secs, 10);
    }

    #[test]
    fn load_file_rejects_unknown_keys() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "tone_frequency = 440\n").expect("write");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn overrides_are_shell_split() {
        let cfg = Config {
            display_command: Some("fbi -T 1 \"/tmp/test image.png\"".to_string()),
            ..Config::default()
        };
        assert_eq!(
            cfg.display_override().expect("argv"),
            vec!["fbi", "-T", "1", "/tmp/test image.png"]
        );
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero_tone = Config {
            tone_hz: 0,
            ..Config::default()
        };
        assert!(zero_tone.validate().is_err());

        let empty_device = Config {
            audio_device: " ".to_string(),
            ..Config::default()
        };
        assert!(empty_device.validate().is_err());

        let unsplittable = Config {
            audio_command: Some("aplay \"unclosed".to_string()),
            ..Config::default()
        };
        assert!(unsplittable.validate().is_err());

        let zero_interval = Config {
            idle_interval_secs: 0,
            ..Config::default()
        };
        assert!(zero_interval.validate().is_err());
    }
}
