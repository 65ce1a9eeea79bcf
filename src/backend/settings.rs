use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub last_list: Option<String>,
    #[serde(default)]
    pub recent_lists: Vec<String>,
    #[serde(default = "default_max_recent")]
    pub max_recent_lists: usize,
}

fn default_max_recent() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_list: None,
            recent_lists: Vec::new(),
            max_recent_lists: 10,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "listings") {
            let config_path = proj_dirs.config_dir().join("config.json");
            if config_path.exists() {
                if let Ok(content) = fs::read_to_string(&config_path) {
                    if let Ok(settings) = serde_json::from_str(&content) {
                        return settings;
                    }
                }
            }
        }
        Self::default()
    }

    /// Moves a selected list id to the head of the recent set. Does not
    /// persist.
    pub fn push_recent(&mut self, id: &str) {
        self.recent_lists.retain(|p| p != id);
        self.recent_lists.insert(0, id.to_string());
        self.recent_lists.truncate(self.max_recent_lists);
        self.last_list = Some(id.to_string());
    }

    /// Records a selected list id and persists the settings.
    pub fn remember_list(&mut self, id: &str) {
        self.push_recent(id);
        self.save();
    }

    pub fn save(&self) {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "listings") {
            let config_dir = proj_dirs.config_dir();
            if !config_dir.exists() {
                let _ = fs::create_dir_all(config_dir);
            }
            if let Ok(content) = serde_json::to_string_pretty(self) {
                let _ = fs::write(config_dir.join("config.json"), content);
            }
        }
    }

    pub fn reset() {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "listings") {
            let config_path = proj_dirs.config_dir().join("config.json");
            if config_path.exists() {
                let _ = fs::remove_file(config_path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_recent_dedupes_and_truncates() {
        let mut settings = Settings {
            max_recent_lists: 3,
            ..Settings::default()
        };
        for id in ["cities", "recyclers", "cities", "landfills", "hubs"] {
            settings.push_recent(id);
        }
        assert_eq!(settings.recent_lists, vec!["hubs", "landfills", "cities"]);
        assert_eq!(settings.last_list.as_deref(), Some("hubs"));
    }
}
