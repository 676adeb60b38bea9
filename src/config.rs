use crate::errors::{RoadforgeError, RoadforgeResult};
use crate::profile::ProfileSet;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|mut path| {
            path.push("roadforge");
            fs::create_dir_all(&path).ok()?;
            path.push("profiles.toml");
            Some(path)
        })
        .flatten()
}

/// Load the profile set from the user config directory, falling back to the
/// built-in defaults when no valid file is present.
pub fn load_profiles() -> ProfileSet {
    if let Some(config_path) = get_config_path() {
        if config_path.exists() {
            match load_profiles_from(&config_path) {
                Ok(profiles) => return profiles,
                Err(e) => warn!(
                    "Ignoring profiles at {}: {e}",
                    config_path.display()
                ),
            }
        }
    }
    ProfileSet::default()
}

/// Load and validate a profile set from an explicit TOML file
pub fn load_profiles_from<P: AsRef<Path>>(path: P) -> RoadforgeResult<ProfileSet> {
    let contents = fs::read_to_string(path.as_ref())?;
    let profiles: ProfileSet = toml::from_str(&contents)?;
    profiles.check()?;
    Ok(profiles)
}

/// Save a profile set to the user config directory
pub fn save_profiles(profiles: &ProfileSet) -> RoadforgeResult<()> {
    let config_path = get_config_path().ok_or(RoadforgeError::ConfigDirNotFound)?;
    save_profiles_to(profiles, config_path)
}

/// Save a profile set to an explicit TOML file
pub fn save_profiles_to<P: AsRef<Path>>(profiles: &ProfileSet, path: P) -> RoadforgeResult<()> {
    profiles.check()?;
    let contents = toml::to_string_pretty(profiles)?;
    fs::write(path.as_ref(), contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_toml_round_trip() {
        let path = std::env::temp_dir().join("roadforge_test_profiles.toml");
        let mut profiles = ProfileSet::default();
        profiles.profiles[0].surface_mask_radius = 4;

        save_profiles_to(&profiles, &path).unwrap();
        let loaded = load_profiles_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.profiles[0].surface_mask_radius, 4);
        assert_eq!(loaded.profiles[0].name, "highway");
    }

    #[test]
    fn test_invalid_profile_file_rejected() {
        let path = std::env::temp_dir().join("roadforge_test_bad_profiles.toml");
        std::fs::write(&path, "profiles = 3").unwrap();
        let result = load_profiles_from(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
