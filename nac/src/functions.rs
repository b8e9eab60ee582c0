use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::{
    error::{NacError, Result},
    types::{NacContextFreeFn, NacFreeBufferFn, NacInitFn, NacKeyEstablishmentFn, NacSignFn},
};

/// Environment variable holding an explicit path to the NAC library.
pub const NAC_LIBRARY_PATH_KEY: &str = "NAC_LIBRARY_PATH";

/// Base name of the NAC library, without platform prefix or suffix.
pub const NAC_LIBRARY_NAME: &str = "nac";

/// Finds the NAC library in the system's library search path.
///
/// Looks at `NAC_LIBRARY_PATH` first, then searches every directory listed in
/// `LD_LIBRARY_PATH` and `DYLD_LIBRARY_PATH` for the platform file name
/// (`libnac.so`, `libnac.dylib`, ...).
///
/// # Returns
///
/// * `Option<PathBuf>` - The full path to the library if found, otherwise `None`.
pub fn find_library() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(NAC_LIBRARY_PATH_KEY) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    let file_name = libloading::library_filename(NAC_LIBRARY_NAME);
    ["LD_LIBRARY_PATH", "DYLD_LIBRARY_PATH"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .flat_map(|paths| {
            paths
                .split(':')
                .filter(|dir| !dir.is_empty())
                .map(|dir| Path::new(dir).join(&file_name))
                .collect::<Vec<_>>()
        })
        .find(|candidate| candidate.exists())
}

/// A loaded NAC library together with its resolved entry points.
///
/// The function pointers are only valid while `_library` is alive, which is
/// why they are never handed out on their own. `_library` is `None` only for
/// entry points linked into the current binary.
pub struct NacLibrary {
    pub(crate) init: NacInitFn,
    pub(crate) key_establishment: NacKeyEstablishmentFn,
    pub(crate) sign: NacSignFn,
    pub(crate) free_buffer: NacFreeBufferFn,
    pub(crate) context_free: NacContextFreeFn,
    path: String,
    _library: Option<Library>,
}

impl NacLibrary {
    /// Loads the NAC library and resolves all five entry points.
    ///
    /// With `path == None` the library is located via [`find_library`], falling
    /// back to the dynamic loader's own search for the bare file name.
    ///
    /// # Errors
    ///
    /// * `NacError::LibraryLoad` if the library cannot be opened
    /// * `NacError::SymbolNotFound` if any entry point is missing
    #[tracing::instrument(level = "debug", name = "nac_library_open")]
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(find_library)
            .unwrap_or_else(|| PathBuf::from(libloading::library_filename(NAC_LIBRARY_NAME)));
        let display = path.display().to_string();

        // Safety: loading the library runs its initializers; we trust the
        // configured NAC library to be well behaved.
        let library = unsafe { Library::new(&path) }.map_err(|e| NacError::LibraryLoad {
            path: display.clone(),
            message: e.to_string(),
        })?;

        let nac = Self {
            init: symbol(&library, "nac_init")?,
            key_establishment: symbol(&library, "nac_key_establishment")?,
            sign: symbol(&library, "nac_sign")?,
            free_buffer: symbol(&library, "nac_free_buffer")?,
            context_free: symbol(&library, "nac_context_free")?,
            path: display,
            _library: Some(library),
        };
        tracing::debug!(level = "nac", path = %nac.path, "Loaded NAC library");
        Ok(nac)
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn from_entry_points(
        init: NacInitFn,
        key_establishment: NacKeyEstablishmentFn,
        sign: NacSignFn,
        free_buffer: NacFreeBufferFn,
        context_free: NacContextFreeFn,
    ) -> Self {
        Self {
            init,
            key_establishment,
            sign,
            free_buffer,
            context_free,
            path: "<in-process>".to_string(),
            _library: None,
        }
    }
}

impl std::fmt::Debug for NacLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NacLibrary").field("path", &self.path).finish()
    }
}

/// Copies a function pointer out of the library.
///
/// The caller must pick `T` matching the symbol's C signature.
fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T> {
    let symbol: Symbol<T> =
        unsafe { library.get(name.as_bytes()) }.map_err(|e| NacError::SymbolNotFound {
            symbol: name,
            message: e.to_string(),
        })?;
    Ok(*symbol)
}
