use gdman_core::ReleaseSource;
use gdman_platform::AppPaths;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default)]
    pub use_mono: bool,

    #[serde(default)]
    pub download_source: ReleaseSource,

    #[serde(default)]
    pub mirror_api_url: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            use_mono: false,
            download_source: ReleaseSource::Github,
            mirror_api_url: None,
        }
    }
}

impl AppSettings {
    pub fn load(paths: &AppPaths) -> Self {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            match std::fs::read_to_string(&settings_path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Self::default(),
            }
        } else {
            Self::default()
        }
    }

    pub fn save(&self, paths: &AppPaths) -> Result<(), std::io::Error> {
        paths.ensure_dirs()?;

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.settings_file(), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{ "use_mono": true }"#).unwrap();
        assert!(settings.use_mono);
        assert!(!settings.debug_logging);
        assert_eq!(settings.download_source, ReleaseSource::Github);
    }

    #[test]
    fn test_save_and_load() {
        let root = std::env::temp_dir().join(format!("gdman-settings-{}", uuid::Uuid::new_v4()));
        let paths = AppPaths::with_root(&root);
        let settings = AppSettings {
            download_source: ReleaseSource::Mirror,
            mirror_api_url: Some("https://mirror.example.com/api".to_string()),
            ..Default::default()
        };

        settings.save(&paths).unwrap();
        let loaded = AppSettings::load(&paths);

        assert_eq!(loaded.download_source, ReleaseSource::Mirror);
        assert_eq!(loaded.mirror_api_url, settings.mirror_api_url);
        let _ = std::fs::remove_dir_all(root);
    }
}
