//! Credential storage.
//!
//! Reads/writes ~/.config/duudl/auth.json (0600 on Unix). The service uses a
//! shared poll password plus the participant the user acts as.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Login credentials stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Service base URL (e.g., "https://duudl.example")
    pub base_url: String,
    /// Shared password for the service
    pub password: String,
    /// Participant to act as (own row in every grid)
    pub participant_id: i64,
}

impl Credentials {
    pub fn new(base_url: impl Into<String>, password: impl Into<String>, participant_id: i64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            password: password.into(),
            participant_id,
        }
    }
}

/// Returns the path to the credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("duudl/auth.json"))
}

/// Load saved credentials. Returns None if none are saved or the file is invalid.
pub fn load_auth() -> Option<Credentials> {
    load_auth_from(&auth_file_path()?)
}

pub fn load_auth_from(path: &Path) -> Option<Credentials> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save credentials to the default location.
pub fn save_auth(creds: &Credentials) -> Result<(), String> {
    let path = auth_file_path().ok_or("Could not determine config directory")?;
    save_auth_to(&path, creds)
}

/// Save credentials, creating the parent directory. Sets 0600 permissions on Unix.
pub fn save_auth_to(path: &Path, creds: &Credentials) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(creds)
        .map_err(|e| format!("Failed to serialize credentials: {}", e))?;

    std::fs::write(path, &contents)
        .map_err(|e| format!("Failed to write auth file: {}", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions)
            .map_err(|e| format!("Failed to set file permissions: {}", e))?;
    }

    Ok(())
}

/// Delete saved credentials.
pub fn delete_auth() -> Result<(), String> {
    let Some(path) = auth_file_path() else {
        return Ok(());
    };
    if path.exists() {
        std::fs::remove_file(&path)
            .map_err(|e| format!("Failed to delete auth file: {}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let creds = Credentials::new("https://duudl.example/", "pw", 2);
        assert_eq!(creds.base_url, "https://duudl.example");
    }

    #[test]
    fn test_save_and_load_auth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duudl/auth.json");

        let creds = Credentials::new("https://duudl.example", "secret", 4);
        save_auth_to(&path, &creds).unwrap();
        assert_eq!(load_auth_from(&path), Some(creds));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_invalid_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, r#"{"base_url": "x"}"#).unwrap();
        assert!(load_auth_from(&path).is_none());
    }

    #[test]
    fn test_auth_file_path_exists() {
        let path = auth_file_path().unwrap();
        assert!(path.to_string_lossy().contains("duudl"));
        assert!(path.to_string_lossy().contains("auth.json"));
    }
}
