//! Sound file lookup
//!
//! Relative paths from the config are searched in the working directory
//! (local override), the user data directory and finally next to the
//! executable (bundled sounds).

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ResourceResolver {
    search_dirs: Vec<PathBuf>,
}

impl ResourceResolver {
    /// Resolver over an explicit list of directories, searched in order.
    /// The first directory is the fallback when nothing matches.
    pub fn with_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// Working directory, `<config dir>/meetclock`, executable directory
    pub fn from_env() -> Self {
        let mut dirs = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            dirs.push(cwd);
        }
        if let Some(data) = dirs::config_dir() {
            dirs.push(data.join("meetclock"));
        }
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            dirs.push(exe_dir);
        }
        Self::with_dirs(dirs)
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Resolve a configured path. The result may not exist.
    pub fn resolve(&self, configured: &str) -> PathBuf {
        let path = Path::new(configured);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        self.search_dirs
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.exists())
            .or_else(|| self.search_dirs.first().map(|dir| dir.join(path)))
            .unwrap_or_else(|| path.to_path_buf())
    }

    /// Resolve and return the path only when the file exists
    pub fn find(&self, configured: &str) -> Option<PathBuf> {
        if configured.trim().is_empty() {
            return None;
        }
        let resolved = self.resolve(configured);
        resolved.is_file().then_some(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_earlier_dir_overrides_later() {
        let local_dir = TempDir::new().unwrap();
        let bundled_dir = TempDir::new().unwrap();
        let (local, bundled) = (local_dir.path(), bundled_dir.path());
        std::fs::create_dir_all(local.join("sounds")).unwrap();
        std::fs::create_dir_all(bundled.join("sounds")).unwrap();
        std::fs::write(local.join("sounds/time.mp3"), b"local").unwrap();
        std::fs::write(bundled.join("sounds/time.mp3"), b"bundled").unwrap();
        std::fs::write(bundled.join("sounds/prompt.wav"), b"bundled").unwrap();

        let resolver = ResourceResolver::with_dirs(vec![local.to_path_buf(), bundled.to_path_buf()]);
        assert_eq!(resolver.resolve("sounds/time.mp3"), local.join("sounds/time.mp3"));
        assert_eq!(resolver.resolve("sounds/prompt.wav"), bundled.join("sounds/prompt.wav"));
    }

    #[test]
    fn test_missing_falls_back_to_first_dir() {
        let resolver = ResourceResolver::with_dirs(vec![PathBuf::from("/nonexistent/a"), PathBuf::from("/nonexistent/b")]);
        assert_eq!(
            resolver.resolve("sounds/none.mp3"),
            PathBuf::from("/nonexistent/a/sounds/none.mp3")
        );
        assert_eq!(resolver.find("sounds/none.mp3"), None);
        assert_eq!(resolver.find("  "), None);
    }

    #[test]
    fn test_absolute_path_is_kept() {
        let absolute = std::env::temp_dir().join("meetclock-abs.mp3");
        let resolver = ResourceResolver::with_dirs(vec![PathBuf::from("/nonexistent")]);
        assert_eq!(resolver.resolve(absolute.to_str().unwrap()), absolute);
    }
}
