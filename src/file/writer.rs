//! Writing rewritten modules and strong name signing.

use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    file::ModuleFormat,
    metadata::{
        identity::public_key_token,
        module::{AssemblyFlags, ModuleDef, ModuleFlags},
    },
    Error, Result,
};

/// Suffix of the sibling file used while a module replaces itself
const TEMP_SUFFIX: &str = ".rewrite.tmp";

/// A strong name key: the public key blob embedded into signed modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrongNameKey {
    public_key: Vec<u8>,
    token: [u8; 8],
}

impl StrongNameKey {
    /// Use `public_key` as the key blob
    #[must_use]
    pub fn from_bytes(public_key: Vec<u8>) -> Self {
        let token = public_key_token(&public_key);
        StrongNameKey { public_key, token }
    }

    /// Load the key file at `path`.
    ///
    /// A missing key file is not an error: signing is skipped and `None` is returned.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read(path) {
            Ok(data) => Ok(Some(StrongNameKey::from_bytes(data))),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(Error::FileError(error)),
        }
    }

    /// The key blob
    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Public key token of the key, as carried by references to modules it signs
    #[must_use]
    pub fn token(&self) -> [u8; 8] {
        self.token
    }

    /// Embed the key into `module` and mark it as signed
    pub fn sign(&self, module: &mut ModuleDef) {
        module.assembly.public_key = Some(self.public_key.clone());
        module.assembly.flags |= AssemblyFlags::PUBLIC_KEY;
        module.flags |= ModuleFlags::STRONG_NAME_SIGNED;
    }
}

/// Serializes rewritten modules to their destination.
pub struct OutputWriter<'a> {
    format: &'a dyn ModuleFormat,
    key: Option<&'a StrongNameKey>,
}

impl<'a> OutputWriter<'a> {
    /// Create a writer, signing every module with `key` if one is given
    #[must_use]
    pub fn new(format: &'a dyn ModuleFormat, key: Option<&'a StrongNameKey>) -> Self {
        OutputWriter { format, key }
    }

    /// Write `module`, read from `source`, to `destination`.
    ///
    /// When both paths name the same file the module is written to a sibling temporary file
    /// first, the original is deleted and the temporary file moved into its place. A crash
    /// between the delete and the move loses the module.
    ///
    /// # Errors
    /// Returns [`Error::Write`] if any file operation fails, or an encoding error of the
    /// format.
    pub fn write(&self, module: &mut ModuleDef, source: &Path, destination: &Path) -> Result<()> {
        if let Some(key) = self.key {
            key.sign(module);
        }

        let data = self.format.encode(module)?;
        let write_error = |source| Error::Write {
            path: destination.to_path_buf(),
            source,
        };

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        if same_file(source, destination) {
            let temp = temp_path(destination);
            fs::write(&temp, &data).map_err(write_error)?;
            fs::remove_file(destination).map_err(write_error)?;
            fs::rename(&temp, destination).map_err(write_error)?;
        } else {
            fs::write(destination, &data).map_err(write_error)?;
        }
        Ok(())
    }
}

/// `dir/Name.dll` becomes `dir/Name.dll.rewrite.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(OsString::new, |name| name.to_os_string());
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Whether both paths name the same file, following links when both exist
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
