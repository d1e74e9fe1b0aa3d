//! MuMu installation and renderer library discovery
//!
//! Resolution order for the install directory: explicit argument, then the
//! registry-style lookup (`MTC_MUMU_PATH`), then a fixed list of
//! conventional install locations. A directory only counts when it carries
//! the uninstaller marker. The renderer library is then looked up under the
//! legacy layout first, then the 12.5+ layout.

use crate::error::{Result, TouchError};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};

const UNINSTALL_MARKER: &str = "uninstall.exe";

/// Pre-12.5 renderer library location
pub const LEGACY_LIBRARY_RELPATH: &str = "shell/sdk/external_renderer_ipc.dll";
/// 12.5+ renderer library location
pub const NX_LIBRARY_RELPATH: &str = "nx_device/12.0/shell/sdk/external_renderer_ipc.dll";

lazy_static! {
    /// Conventional MuMu install locations tried when no path is given
    pub static ref DEFAULT_INSTALL_CANDIDATES: Vec<PathBuf> = vec![
        PathBuf::from(r"C:\Program Files\Netease\MuMu"),
        PathBuf::from(r"C:\Program Files\Netease\MuMuPlayer-12.0"),
        PathBuf::from(r"C:\Program Files (x86)\Netease\MuMuPlayer-12.0"),
        PathBuf::from(r"D:\Program Files\Netease\MuMuPlayer-12.0"),
        PathBuf::from(r"D:\Netease\MuMuPlayer-12.0"),
        PathBuf::from(r"C:\Netease\MuMuPlayer-12.0"),
    ];
}

fn has_marker(path: &Path) -> bool {
    path.join(UNINSTALL_MARKER).is_file()
}

/// Resolve the MuMu install directory.
///
/// An explicit path (argument or registry-style lookup) is used as-is but
/// must carry the uninstaller marker; with no explicit path, the first
/// candidate carrying the marker wins. Exhausting every option is a fatal
/// configuration error.
pub fn resolve_install_path(
    explicit: Option<PathBuf>,
    registry: Option<PathBuf>,
    candidates: &[PathBuf],
) -> Result<PathBuf> {
    let install = match explicit.or(registry) {
        Some(path) => path,
        None => candidates
            .iter()
            .find(|path| has_marker(path))
            .cloned()
            .ok_or_else(|| {
                TouchError::Config(
                    "MuMu install path not found; pass install_path explicitly".to_string(),
                )
            })?,
    };

    if !has_marker(&install) {
        return Err(TouchError::Config(format!(
            "no {} under {}; not a MuMu install directory",
            UNINSTALL_MARKER,
            install.display()
        )));
    }
    Ok(install)
}

/// Resolve the renderer IPC library under an install directory.
///
/// An explicit override is tried first; otherwise (or when the override is
/// absent on disk) the legacy layout is tried, then the 12.5+ layout.
pub fn resolve_library_path(install: &Path, explicit: Option<PathBuf>) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = explicit {
        candidates.push(path);
    }
    candidates.push(install.join(LEGACY_LIBRARY_RELPATH));
    candidates.push(install.join(NX_LIBRARY_RELPATH));

    candidates
        .into_iter()
        .find(|path| path.is_file())
        .ok_or_else(|| {
            TouchError::Config(format!(
                "external_renderer_ipc.dll not found under {}",
                install.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn install_dir(with_marker: bool) -> TempDir {
        let dir = TempDir::new().unwrap();
        if with_marker {
            fs::write(dir.path().join(UNINSTALL_MARKER), b"").unwrap();
        }
        dir
    }

    #[test]
    fn explicit_path_with_marker_wins() {
        let dir = install_dir(true);
        let resolved = resolve_install_path(
            Some(dir.path().to_path_buf()),
            Some(PathBuf::from("/ignored")),
            &[],
        )
        .unwrap();
        assert_eq!(resolved, dir.path());
    }

    #[test]
    fn explicit_path_without_marker_is_config_error() {
        let dir = install_dir(false);
        let err =
            resolve_install_path(Some(dir.path().to_path_buf()), None, &[]).unwrap_err();
        assert!(matches!(err, TouchError::Config(_)));
    }

    #[test]
    fn registry_lookup_used_when_no_explicit_path() {
        let dir = install_dir(true);
        let resolved =
            resolve_install_path(None, Some(dir.path().to_path_buf()), &[]).unwrap();
        assert_eq!(resolved, dir.path());
    }

    #[test]
    fn first_candidate_with_marker_wins() {
        let without = install_dir(false);
        let with = install_dir(true);
        let candidates = vec![
            PathBuf::from("/does/not/exist"),
            without.path().to_path_buf(),
            with.path().to_path_buf(),
        ];
        let resolved = resolve_install_path(None, None, &candidates).unwrap();
        assert_eq!(resolved, with.path());
    }

    #[test]
    fn exhausted_candidates_is_config_error() {
        let err = resolve_install_path(None, None, &[PathBuf::from("/nope")]).unwrap_err();
        assert!(matches!(err, TouchError::Config(_)));
    }

    #[test]
    fn library_prefers_legacy_layout() {
        let dir = install_dir(true);
        let legacy = dir.path().join(LEGACY_LIBRARY_RELPATH);
        let nx = dir.path().join(NX_LIBRARY_RELPATH);
        fs::create_dir_all(legacy.parent().unwrap()).unwrap();
        fs::create_dir_all(nx.parent().unwrap()).unwrap();
        fs::write(&legacy, b"").unwrap();
        fs::write(&nx, b"").unwrap();

        assert_eq!(resolve_library_path(dir.path(), None).unwrap(), legacy);
    }

    #[test]
    fn library_falls_back_to_nx_layout() {
        let dir = install_dir(true);
        let nx = dir.path().join(NX_LIBRARY_RELPATH);
        fs::create_dir_all(nx.parent().unwrap()).unwrap();
        fs::write(&nx, b"").unwrap();

        assert_eq!(resolve_library_path(dir.path(), None).unwrap(), nx);
    }

    #[test]
    fn missing_library_everywhere_is_config_error() {
        let dir = install_dir(true);
        let err = resolve_library_path(dir.path(), None).unwrap_err();
        assert!(matches!(err, TouchError::Config(_)));
    }

    #[test]
    fn stale_library_override_falls_back() {
        let dir = install_dir(true);
        let nx = dir.path().join(NX_LIBRARY_RELPATH);
        fs::create_dir_all(nx.parent().unwrap()).unwrap();
        fs::write(&nx, b"").unwrap();

        let resolved =
            resolve_library_path(dir.path(), Some(PathBuf::from("/stale/override.dll")))
                .unwrap();
        assert_eq!(resolved, nx);
    }
}
