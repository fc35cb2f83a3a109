use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;
use vrkit_ui3d::{KeyboardSettings, ProfileSet};

pub const DEFAULT_CONFIG_PATH: &str = "config/vrkit.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Distance of the pointer indicator in front of the controller.
    pub pointer_z_offset: f32,
    /// Model string reported by the runtime for the controller.
    pub controller_model: String,
    pub profiles: ProfileSet,
    pub keyboard: KeyboardSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pointer_z_offset: 0.05,
            controller_model: "Vive Controller MV".to_string(),
            profiles: ProfileSet::default(),
            keyboard: KeyboardSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    AppConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                AppConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrkit_ui3d::{KeyType, KeyboardLayouts};

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vrkit.toml");
        fs::write(
            &path,
            "pointer_z_offset = 0.1\n\n[keyboard]\nspace_min_width = 0.3\n\n[profiles.panel]\ngrabbable = false\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from_path(&path);
        assert!((cfg.pointer_z_offset - 0.1).abs() < f32::EPSILON);
        assert!((cfg.keyboard.space_min_width - 0.3).abs() < f32::EPSILON);
        assert!((cfg.keyboard.key_min_width - 0.025).abs() < f32::EPSILON);
        assert!(!cfg.profiles.panel.grabbable);
        assert_eq!(cfg.profiles.momentary, ProfileSet::default().momentary);
    }

    #[test]
    fn unreadable_or_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = AppConfig::load_from_path(&dir.path().join("nope.toml"));
        assert_eq!(missing.controller_model, AppConfig::default().controller_model);

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "pointer_z_offset = \"far\"").unwrap();
        let cfg = AppConfig::load_from_path(&broken);
        assert!((cfg.pointer_z_offset - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn custom_lower_case_rows_override_qwerty() {
        let text = r#"
[keyboard.layouts]
lower_case = [[{ type = "character", value = "a" }, { type = "spacer", width = 0.002 }]]
"#;
        let cfg: AppConfig = toml::from_str(text).unwrap();
        let layouts = cfg.keyboard.layouts();
        assert_eq!(layouts.lower_case.len(), 1);
        assert_eq!(layouts.lower_case[0][1].kind, KeyType::Spacer);
        assert_eq!(layouts.number, KeyboardLayouts::qwerty(0.001).number);
    }
}
