use serde::{Deserialize, Serialize};

use crate::audio::chain::{clamp_tone, clamp_volume};
use crate::morse::timing::{clamp_eff_speed, MAX_CHAR_SPEED, MIN_CHAR_SPEED};
use crate::morse::TimingConfig;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub morse: MorseSettings,
    #[serde(default)]
    pub practice: PracticeSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

/// Speed and sound of the keyed tone
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MorseSettings {
    /// Character speed in WPM (5-50)
    pub char_speed: f64,
    /// Effective (Farnsworth) speed in WPM, 0 disables stretching
    #[serde(default)]
    pub eff_speed: f64,
    /// Sidetone pitch in Hz (300-1500)
    pub tone_hz: f32,
    /// Output level (0.0 - 1.0)
    pub volume: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PracticeSettings {
    /// Number of Koch characters in the current lesson
    pub koch_level: usize,
    /// Characters per practice group
    pub group_size: usize,
    /// Length of a generated practice run
    pub target_seconds: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    pub font_size: f32,
    #[serde(default = "default_true")]
    pub show_waveform: bool,
    /// Show the dots and dashes of the text being played
    #[serde(default)]
    pub show_code: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MorseSettings {
    fn default() -> Self {
        Self {
            char_speed: 20.0,
            eff_speed: 10.0,
            tone_hz: 600.0,
            volume: 0.7,
        }
    }
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            koch_level: 2,
            group_size: 5,
            target_seconds: 60.0,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            show_waveform: true,
            show_code: false,
        }
    }
}

impl MorseSettings {
    /// Copy with every field pulled into its supported range
    pub fn clamped(&self) -> Self {
        let clamp_f64 = |v: f64, min: f64, max: f64| if v.is_nan() { min } else { v.clamp(min, max) };
        Self {
            char_speed: clamp_f64(self.char_speed, MIN_CHAR_SPEED, MAX_CHAR_SPEED),
            eff_speed: clamp_eff_speed(self.eff_speed),
            tone_hz: clamp_tone(self.tone_hz),
            volume: clamp_volume(self.volume),
        }
    }

    pub fn timing(&self) -> TimingConfig {
        TimingConfig::new(self.char_speed, self.eff_speed)
    }
}

impl PracticeSettings {
    pub const MIN_KOCH_LEVEL: usize = 2;

    pub fn clamped(&self, max_level: usize) -> Self {
        Self {
            koch_level: self.koch_level.clamp(Self::MIN_KOCH_LEVEL, max_level),
            group_size: self.group_size.clamp(1, 10),
            target_seconds: if self.target_seconds.is_nan() {
                60.0
            } else {
                self.target_seconds.clamp(5.0, 600.0)
            },
        }
    }
}

pub struct SettingsLoadResult {
    pub settings: AppSettings,
    pub notice: Option<String>,
}

impl AppSettings {
    /// Get the default config file path
    pub fn config_path() -> std::path::PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("koch_trainer").join("settings.toml")
        } else {
            std::path::PathBuf::from("settings.toml")
        }
    }

    /// Load settings from the default config path, or return defaults if not found
    pub fn load_with_notice() -> SettingsLoadResult {
        let path = Self::config_path();
        match Self::load(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                SettingsLoadResult {
                    settings,
                    notice: None,
                }
            }
            Err(e) => {
                let mut notice = None;
                if path.exists() {
                    log::warn!("Unable to parse {}: {}", path.display(), e);
                    let backup_path = backup_settings_file(&path);
                    if let Some(backup_path) = backup_path {
                        notice = Some(format!(
                            "Settings file was reset due to an incompatible format. Backup saved to {}",
                            backup_path.display()
                        ));
                    } else {
                        notice = Some(
                            "Settings file was reset due to an incompatible format.".to_string(),
                        );
                    }
                }

                log::info!(
                    "Using default settings (unable to load config at {})",
                    path.display()
                );
                SettingsLoadResult {
                    settings: Self::default(),
                    notice,
                }
            }
        }
    }

    pub fn load(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings: Self = toml::from_str(content)?;
        settings.morse = settings.morse.clamped();
        Ok(settings)
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

fn backup_settings_file(path: &std::path::Path) -> Option<std::path::PathBuf> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())?;
    let file_name = path.file_name()?.to_string_lossy();
    let backup_name = format!("{}.bak.{}", file_name, timestamp);
    let backup_path = path.with_file_name(backup_name);
    if std::fs::rename(path, &backup_path).is_ok() {
        Some(backup_path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip_through_toml() {
        let mut settings = AppSettings::default();
        settings.morse.char_speed = 25.0;
        settings.practice.koch_level = 12;
        let text = toml::to_string_pretty(&settings).unwrap();
        let loaded = AppSettings::from_toml(&text).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let loaded = AppSettings::from_toml("[morse]\nchar_speed = 30.0\ntone_hz = 700.0\nvolume = 0.5\n")
            .unwrap();
        assert_eq!(loaded.morse.char_speed, 30.0);
        assert_eq!(loaded.morse.eff_speed, 0.0);
        assert_eq!(loaded.practice, PracticeSettings::default());
        assert_eq!(loaded.ui, UiSettings::default());
    }

    #[test]
    fn test_out_of_range_values_are_clamped_on_load() {
        let loaded = AppSettings::from_toml(
            "[morse]\nchar_speed = 90.0\neff_speed = -2.0\ntone_hz = 50.0\nvolume = 4.0\n",
        )
        .unwrap();
        assert_eq!(loaded.morse.char_speed, 50.0);
        assert_eq!(loaded.morse.eff_speed, 0.0);
        assert_eq!(loaded.morse.tone_hz, 300.0);
        assert_eq!(loaded.morse.volume, 1.0);
    }

    #[test]
    fn test_tiny_eff_speed_is_raised_on_load() {
        let loaded = AppSettings::from_toml(
            "[morse]\nchar_speed = 20.0\neff_speed = 0.001\ntone_hz = 600.0\nvolume = 0.5\n",
        )
        .unwrap();
        assert_eq!(loaded.morse.eff_speed, MIN_CHAR_SPEED);
        assert_eq!(loaded.morse.timing(), TimingConfig::new(20.0, 5.0));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(AppSettings::from_toml("[morse\nchar_speed = ").is_err());
        assert!(AppSettings::from_toml("[morse]\nchar_speed = \"fast\"\n").is_err());
    }

    #[test]
    fn test_practice_clamp() {
        let practice = PracticeSettings {
            koch_level: 99,
            group_size: 0,
            target_seconds: 1.0,
        };
        let clamped = practice.clamped(40);
        assert_eq!(clamped.koch_level, 40);
        assert_eq!(clamped.group_size, 1);
        assert_eq!(clamped.target_seconds, 5.0);
    }
}
