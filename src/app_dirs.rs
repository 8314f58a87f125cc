use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("longpress");
            Some(state_dir.join("longpress.log"))
        } else {
            ProjectDirs::from("", "", "longpress")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("longpress.log"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_is_named_for_the_app() {
        if let Some(path) = AppDirs::log_path() {
            assert_eq!(path.file_name().unwrap(), "longpress.log");
            assert!(path.parent().unwrap().ends_with("longpress"));
        }
    }
}
