//! Dependency lookup for references outside the rewrite request.

use std::path::{Path, PathBuf};

use crate::{
    file::DEFAULT_EXTENSIONS,
    metadata::{identity::is_framework_token, module::AssemblyRef},
    Error, Result,
};

/// Locates referenced assemblies on disk.
///
/// A reference `Name` is looked for as `Name.<ext>` for every extension in order, first in
/// each search path in order and then next to the module holding the reference. The
/// extensions default to `dll` and `exe`; a rewrite request uses those of its
/// [`crate::file::ModuleFormat`].
#[derive(Debug, Clone)]
pub struct AssemblyResolver {
    search_paths: Vec<PathBuf>,
    extensions: &'static [&'static str],
}

impl Default for AssemblyResolver {
    fn default() -> Self {
        AssemblyResolver::new(Vec::new())
    }
}

impl AssemblyResolver {
    /// Create a resolver over `search_paths`
    #[must_use]
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        AssemblyResolver {
            search_paths,
            extensions: DEFAULT_EXTENSIONS,
        }
    }

    /// Look for dependencies under `extensions` instead
    #[must_use]
    pub fn with_extensions(mut self, extensions: &'static [&'static str]) -> Self {
        self.extensions = extensions;
        self
    }

    /// Candidate locations for `name`, in lookup order
    #[must_use]
    pub fn candidates(&self, name: &str, referrer_dir: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for dir in self.search_paths.iter().map(PathBuf::as_path).chain(referrer_dir) {
            for extension in self.extensions {
                paths.push(dir.join(format!("{name}.{extension}")));
            }
        }
        paths
    }

    /// Resolve `reference`, made by the module at `referrer`.
    ///
    /// Returns `None` for assemblies signed with a framework key, which the runtime provides.
    ///
    /// # Errors
    /// Returns [`Error::Resolution`] if no candidate exists.
    pub fn resolve(&self, reference: &AssemblyRef, referrer: &Path) -> Result<Option<PathBuf>> {
        if reference.public_key_token.as_ref().is_some_and(is_framework_token) {
            return Ok(None);
        }

        self.candidates(&reference.name, referrer.parent())
            .into_iter()
            .find(|path| path.is_file())
            .map(Some)
            .ok_or_else(|| Error::Resolution {
                name: reference.name.clone(),
                referrer: referrer.display().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{identity::FRAMEWORK_TOKENS, module::AssemblyVersion};

    #[test]
    fn test_candidate_order() {
        let resolver = AssemblyResolver::new(vec![PathBuf::from("/libs")]);
        let candidates = resolver.candidates("Dep", Some(Path::new("/app")));

        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/libs/Dep.dll"),
                PathBuf::from("/libs/Dep.exe"),
                PathBuf::from("/app/Dep.dll"),
                PathBuf::from("/app/Dep.exe"),
            ]
        );
    }

    #[test]
    fn test_candidates_follow_extensions() {
        let resolver = AssemblyResolver::new(vec![PathBuf::from("/libs")]).with_extensions(&["json"]);
        assert_eq!(
            resolver.candidates("Dep", Some(Path::new("/app"))),
            vec![PathBuf::from("/libs/Dep.json"), PathBuf::from("/app/Dep.json")]
        );
    }

    #[test]
    fn test_resolve() {
        let libs = tempfile::tempdir().unwrap();
        let app = tempfile::tempdir().unwrap();
        std::fs::write(libs.path().join("Dep.exe"), b"{}").unwrap();
        std::fs::write(app.path().join("Dep.dll"), b"{}").unwrap();

        let resolver = AssemblyResolver::new(vec![libs.path().to_path_buf()]);
        let referrer = app.path().join("App.dll");

        let dep = AssemblyRef::new("Dep", AssemblyVersion::new(1, 0, 0, 0));
        assert_eq!(
            resolver.resolve(&dep, &referrer).unwrap(),
            Some(libs.path().join("Dep.exe"))
        );

        let missing = AssemblyRef::new("Missing", AssemblyVersion::new(1, 0, 0, 0));
        assert!(matches!(
            resolver.resolve(&missing, &referrer),
            Err(Error::Resolution { name, .. }) if name == "Missing"
        ));

        let mut corlib = AssemblyRef::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0));
        corlib.public_key_token = Some(FRAMEWORK_TOKENS[0]);
        assert_eq!(resolver.resolve(&corlib, &referrer).unwrap(), None);
    }
}
