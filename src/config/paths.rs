use std::path::PathBuf;

/// Per-platform config and data directories
///
/// Unix-like systems follow the XDG base directory layout
/// (`$XDG_CONFIG_HOME/{name}`, `$XDG_DATA_HOME/{name}`). Windows uses
/// `%APPDATA%\{name}` for both.
pub struct ProjectPaths {
    name: String,
}

impl ProjectPaths {
    /// Returns None when no home directory can be determined
    pub fn new(name: &str) -> Option<Self> {
        get_home_dir()?;
        Some(ProjectPaths {
            name: name.to_string(),
        })
    }

    pub fn config_dir(&self) -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            get_windows_appdata()
                .map(|p| p.join(&self.name))
                .unwrap_or_else(|| PathBuf::from(format!(".{}", self.name)))
        }

        #[cfg(not(target_os = "windows"))]
        {
            xdg_dir("XDG_CONFIG_HOME", &[".config"]).join(&self.name)
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            get_windows_appdata()
                .map(|p| p.join(&self.name))
                .unwrap_or_else(|| PathBuf::from(format!(".{}", self.name)))
        }

        #[cfg(not(target_os = "windows"))]
        {
            xdg_dir("XDG_DATA_HOME", &[".local", "share"]).join(&self.name)
        }
    }
}

/// Home directory from HOME, falling back to USERPROFILE
fn get_home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}

/// `$var` if set, else `~/<fallback...>`, else the relative fallback
#[cfg(not(target_os = "windows"))]
fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    let relative: PathBuf = fallback.iter().collect();
    std::env::var(var)
        .ok()
        .map(PathBuf::from)
        .or_else(|| get_home_dir().map(|h| h.join(&relative)))
        .unwrap_or(relative)
}

#[cfg(target_os = "windows")]
fn get_windows_appdata() -> Option<PathBuf> {
    std::env::var("APPDATA").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_contain_name() {
        if let Some(paths) = ProjectPaths::new("script-utils") {
            assert!(paths.config_dir().to_string_lossy().contains("script-utils"));
            assert!(paths.data_dir().to_string_lossy().contains("script-utils"));
        }
    }

    #[test]
    #[cfg(not(target_os = "windows"))]
    fn test_xdg_fallback_shape() {
        let dir = xdg_dir("SCRIPT_UTILS_UNSET_TEST_VAR", &[".local", "share"]);
        assert!(dir.ends_with(".local/share"));
    }
}
