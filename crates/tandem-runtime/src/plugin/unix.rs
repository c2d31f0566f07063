//! `dlopen`-based plugin loading

use std::ffi::{c_int, c_void, CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use tandem_core::{log_debug, LoadError, LookupError, PluginLoader, PluginModule, PluginSymbol};

/// Opens shared libraries with `RTLD_NOW | RTLD_LOCAL`
///
/// `RTLD_NOW` makes unresolved references fail at load time rather than on
/// first call.
#[derive(Debug, Clone, Copy)]
pub struct DlopenLoader {
    flags: c_int,
}

impl DlopenLoader {
    pub fn new() -> Self {
        Self {
            flags: libc::RTLD_NOW | libc::RTLD_LOCAL,
        }
    }
}

impl Default for DlopenLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending `dlerror()` message for this thread, if any
fn last_dl_error() -> Option<String> {
    let msg = unsafe { libc::dlerror() };
    if msg.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned())
    }
}

fn has_dir(path: &Path) -> bool {
    path.parent().is_some_and(|p| !p.as_os_str().is_empty())
}

/// Name handed to `dlopen` for `path`
///
/// A bare file name that exists in the working directory is prefixed with
/// `./`, since `dlopen` only treats names containing a slash as paths.
/// Bare names with no such file still go through the linker search path.
fn dlopen_target(path: &Path) -> PathBuf {
    if !has_dir(path) && !path.as_os_str().is_empty() && path.exists() {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}

impl PluginLoader for DlopenLoader {
    type Module = DynamicModule;

    fn load(&self, path: &Path) -> Result<DynamicModule, LoadError> {
        if has_dir(path) && !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let target = dlopen_target(path);
        let path_c = CString::new(target.as_os_str().as_bytes())
            .map_err(|_| LoadError::InvalidPath(path.to_path_buf()))?;

        let handle = unsafe { libc::dlopen(path_c.as_ptr(), self.flags) };
        let handle = NonNull::new(handle).ok_or_else(|| LoadError::Open {
            path: path.to_path_buf(),
            reason: last_dl_error().unwrap_or_else(|| "dlopen returned null".to_string()),
        })?;

        log_debug!("opened plugin {}", path.display());
        Ok(DynamicModule {
            handle,
            path: path.to_path_buf(),
        })
    }
}

/// An open shared library, closed with `dlclose` on drop
pub struct DynamicModule {
    handle: NonNull<c_void>,
    path: PathBuf,
}

// Safety: dlsym/dlclose are thread-safe and the handle is never mutated
unsafe impl Send for DynamicModule {}
unsafe impl Sync for DynamicModule {}

impl std::fmt::Debug for DynamicModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicModule")
            .field("path", &self.path)
            .field("handle", &self.handle)
            .finish()
    }
}

impl PluginModule for DynamicModule {
    fn path(&self) -> &Path {
        &self.path
    }

    fn lookup(&self, name: &str) -> Result<PluginSymbol<'_>, LookupError> {
        if name.is_empty() {
            return Err(LookupError::InvalidName(name.to_string()));
        }
        let name_c = CString::new(name).map_err(|_| LookupError::InvalidName(name.to_string()))?;

        // Clear any stale error so a null result can be told apart
        let _ = last_dl_error();
        let sym = unsafe { libc::dlsym(self.handle.as_ptr(), name_c.as_ptr()) };
        if sym.is_null() {
            return Err(LookupError::NotFound {
                symbol: name.to_string(),
                reason: last_dl_error().unwrap_or_else(|| "symbol resolved to null".to_string()),
            });
        }

        // Safety: plugins export their entry points as `extern "C" fn()`;
        // the PluginSymbol borrows `self`, so the library outlives it.
        let func = unsafe { std::mem::transmute::<*mut c_void, unsafe extern "C" fn()>(sym) };
        Ok(unsafe { PluginSymbol::new(name, func) })
    }
}

impl Drop for DynamicModule {
    fn drop(&mut self) {
        unsafe {
            libc::dlclose(self.handle.as_ptr());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_nul_path() {
        let path = Path::new("plugin\0.so");
        let err = DlopenLoader::new().load(path).unwrap_err();
        assert_eq!(err, LoadError::InvalidPath(path.to_path_buf()));
    }

    #[test]
    fn test_not_a_library() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        match DlopenLoader::new().load(&path) {
            Err(LoadError::Open { path: p, reason }) => {
                assert_eq!(p, path);
                assert!(!reason.is_empty());
            }
            other => panic!("expected open failure, got {:?}", other),
        }
    }

    #[test]
    fn test_dlopen_target() {
        // Tests run from the package directory
        assert_eq!(dlopen_target(Path::new("Cargo.toml")), Path::new("./Cargo.toml"));
        assert_eq!(dlopen_target(Path::new("libc.so.6")), Path::new("libc.so.6"));
        assert_eq!(dlopen_target(Path::new("src/lib.rs")), Path::new("src/lib.rs"));
    }

    #[test]
    fn test_bare_name_in_working_dir_is_opened_as_file() {
        // Reaches the file itself: rejected as a non-ELF, not as missing
        match DlopenLoader::new().load(Path::new("Cargo.toml")) {
            Err(LoadError::Open { path, reason }) => {
                assert_eq!(path, Path::new("Cargo.toml"));
                assert!(!reason.contains("No such file"), "{}", reason);
            }
            other => panic!("expected open failure, got {:?}", other),
        }
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_bare_name_library_copy_in_working_dir() {
        let candidates = [
            "/lib/x86_64-linux-gnu/libm.so.6",
            "/usr/lib/x86_64-linux-gnu/libm.so.6",
            "/lib/aarch64-linux-gnu/libm.so.6",
            "/usr/lib/aarch64-linux-gnu/libm.so.6",
            "/usr/lib64/libm.so.6",
            "/lib64/libm.so.6",
        ];
        let Some(source) = candidates.iter().map(Path::new).find(|p| p.exists()) else {
            return;
        };

        let name = format!("tandem_libm_copy_{}.so", std::process::id());
        std::fs::copy(source, &name).unwrap();
        let loaded = DlopenLoader::new().load(Path::new(&name));
        std::fs::remove_file(&name).unwrap();

        let module = loaded.unwrap();
        assert_eq!(module.path(), Path::new(&name));
        assert!(module.lookup("cos").is_ok());
    }

    #[test]
    fn test_bare_name_goes_to_linker() {
        let err = DlopenLoader::new()
            .load(Path::new("libtandem_no_such_library.so"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_lookup_in_system_library() {
        let module = DlopenLoader::new().load(Path::new("libc.so.6")).unwrap();
        assert_eq!(module.path(), Path::new("libc.so.6"));

        let sym = module.lookup("getpid").unwrap();
        assert_eq!(sym.name(), "getpid");

        let err = module.lookup("tandem_definitely_not_exported").unwrap_err();
        assert!(matches!(err, LookupError::NotFound { ref symbol, .. } if symbol == "tandem_definitely_not_exported"));

        assert_eq!(module.lookup("").unwrap_err(), LookupError::InvalidName(String::new()));
        assert!(matches!(module.lookup("get\0pid"), Err(LookupError::InvalidName(_))));
    }
}
