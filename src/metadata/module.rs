//! The module, its assembly manifest and the shared reference tables.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    metadata::{
        customattributes::CustomAttribute,
        members::{MemberRef, MethodSpec},
        token::{AssemblyRefId, MemberRefId, MethodSpecId, TypeDefId, TypeRefId},
        types::{TypeDef, TypeRef},
    },
    Result,
};

bitflags! {
    /// `AssemblyFlags` (ECMA-335 II.23.1.2)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AssemblyFlags: u32 {
        /// The assembly reference holds the full (unhashed) public key
        const PUBLIC_KEY = 0x0001;
        /// The implementation of this assembly used at runtime is not expected to match the
        /// version seen at compile time
        const RETARGETABLE = 0x0100;
        /// Reserved, JIT tracking
        const DISABLE_JIT_COMPILE_OPTIMIZER = 0x4000;
        /// Reserved, JIT tracking
        const ENABLE_JIT_COMPILE_TRACKING = 0x8000;
    }
}

bitflags! {
    /// Runtime flags of the CLI header
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ModuleFlags: u32 {
        /// The image contains only IL
        const IL_ONLY = 0x0000_0001;
        /// The image may only be loaded into a 32-bit process
        const REQUIRED_32BIT = 0x0000_0002;
        /// The image is strong name signed
        const STRONG_NAME_SIGNED = 0x0000_0008;
        /// The entry point is a native function
        const NATIVE_ENTRYPOINT = 0x0000_0010;
        /// The image prefers to run as a 32-bit process
        const PREFERRED_32BIT = 0x0002_0000;
    }
}

/// Four-part assembly version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct AssemblyVersion {
    /// Major version number
    pub major: u16,
    /// Minor version number
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyVersion {
    /// Create a new version
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// The assembly manifest of the module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyDef {
    /// Simple name, the identity of the assembly
    pub name: String,
    /// Assembly version
    pub version: AssemblyVersion,
    /// Culture, `None` for neutral assemblies
    pub culture: Option<String>,
    /// Assembly flags
    pub flags: AssemblyFlags,
    /// Public key blob of a strong named assembly
    pub public_key: Option<Vec<u8>>,
    /// Assembly level custom attributes (title, description, ...)
    pub custom_attributes: Vec<CustomAttribute>,
}

/// A reference to another assembly, a dependency of the module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyRef {
    /// Simple name of the referenced assembly
    pub name: String,
    /// Referenced version
    pub version: AssemblyVersion,
    /// Culture, `None` for neutral assemblies
    pub culture: Option<String>,
    /// Reference flags
    pub flags: AssemblyFlags,
    /// Public key token of a strong named dependency
    pub public_key_token: Option<[u8; 8]>,
}

impl AssemblyRef {
    /// Reference to an unsigned assembly
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        AssemblyRef {
            name: name.into(),
            version,
            ..Default::default()
        }
    }
}

/// A type exported, or forwarded, through the assembly manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedType {
    /// Namespace of the exported type
    pub namespace: String,
    /// Name of the exported type
    pub name: String,
    /// Assembly the type is forwarded to, `None` when defined in another module of this
    /// assembly
    pub forwarded_to: Option<AssemblyRefId>,
}

/// The shared reference tables of a module.
///
/// Entries are aliased: every signature, attribute and instruction mentioning the same
/// external type points at the same [`TypeRef`], so renaming the entry renames every use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct References {
    /// Assembly references (dependencies)
    pub assembly_refs: Vec<AssemblyRef>,
    /// Type references
    pub type_refs: Vec<TypeRef>,
    /// Member references
    pub member_refs: Vec<MemberRef>,
    /// Generic method instantiations
    pub method_specs: Vec<MethodSpec>,
}

impl References {
    /// Append an assembly reference
    pub fn add_assembly_ref(&mut self, assembly_ref: AssemblyRef) -> AssemblyRefId {
        self.assembly_refs.push(assembly_ref);
        AssemblyRefId(self.assembly_refs.len() - 1)
    }

    /// Append a type reference
    pub fn add_type_ref(&mut self, type_ref: TypeRef) -> TypeRefId {
        self.type_refs.push(type_ref);
        TypeRefId(self.type_refs.len() - 1)
    }

    /// Append a member reference
    pub fn add_member_ref(&mut self, member_ref: MemberRef) -> MemberRefId {
        self.member_refs.push(member_ref);
        MemberRefId(self.member_refs.len() - 1)
    }

    /// Append a method specification
    pub fn add_method_spec(&mut self, method_spec: MethodSpec) -> MethodSpecId {
        self.method_specs.push(method_spec);
        MethodSpecId(self.method_specs.len() - 1)
    }

    /// Look up an assembly reference
    ///
    /// # Errors
    /// Returns [`crate::Error::Structural`] if the index is out of range.
    pub fn assembly_ref(&self, id: AssemblyRefId) -> Result<&AssemblyRef> {
        self.assembly_refs
            .get(id.0)
            .ok_or_else(|| structural_error!("AssemblyRef {} does not exist", id))
    }

    /// Look up a type reference
    ///
    /// # Errors
    /// Returns [`crate::Error::Structural`] if the index is out of range.
    pub fn type_ref(&self, id: TypeRefId) -> Result<&TypeRef> {
        self.type_refs
            .get(id.0)
            .ok_or_else(|| structural_error!("TypeRef {} does not exist", id))
    }

    /// Look up a type reference for modification
    ///
    /// # Errors
    /// Returns [`crate::Error::Structural`] if the index is out of range.
    pub fn type_ref_mut(&mut self, id: TypeRefId) -> Result<&mut TypeRef> {
        self.type_refs
            .get_mut(id.0)
            .ok_or_else(|| structural_error!("TypeRef {} does not exist", id))
    }

    /// Look up a member reference
    ///
    /// # Errors
    /// Returns [`crate::Error::Structural`] if the index is out of range.
    pub fn member_ref(&self, id: MemberRefId) -> Result<&MemberRef> {
        self.member_refs
            .get(id.0)
            .ok_or_else(|| structural_error!("MemberRef {} does not exist", id))
    }

    /// Look up a member reference for modification
    ///
    /// # Errors
    /// Returns [`crate::Error::Structural`] if the index is out of range.
    pub fn member_ref_mut(&mut self, id: MemberRefId) -> Result<&mut MemberRef> {
        self.member_refs
            .get_mut(id.0)
            .ok_or_else(|| structural_error!("MemberRef {} does not exist", id))
    }

    /// Look up a method specification
    ///
    /// # Errors
    /// Returns [`crate::Error::Structural`] if the index is out of range.
    pub fn method_spec(&self, id: MethodSpecId) -> Result<&MethodSpec> {
        self.method_specs
            .get(id.0)
            .ok_or_else(|| structural_error!("MethodSpec {} does not exist", id))
    }
}

/// A loaded module: the complete metadata graph of one compiled binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleDef {
    /// Module file name, `Name.dll`
    pub name: String,
    /// CLI header flags
    pub flags: ModuleFlags,
    /// Assembly manifest
    pub assembly: AssemblyDef,
    /// Module level custom attributes
    pub custom_attributes: Vec<CustomAttribute>,
    /// All type definitions, top level and nested
    pub types: Vec<TypeDef>,
    /// Exported and forwarded types
    pub exported_types: Vec<ExportedType>,
    /// Shared reference tables
    pub references: References,
}

impl ModuleDef {
    /// Create an empty IL-only module whose assembly is called `assembly_name`
    pub fn new(name: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        ModuleDef {
            name: name.into(),
            flags: ModuleFlags::IL_ONLY,
            assembly: AssemblyDef {
                name: assembly_name.into(),
                version: AssemblyVersion::new(1, 0, 0, 0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// The identity of the module, the simple name of its assembly
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.assembly.name
    }

    /// Add a top level type
    pub fn add_type(&mut self, type_def: TypeDef) -> TypeDefId {
        self.types.push(type_def);
        TypeDefId(self.types.len() - 1)
    }

    /// Add a type nested inside `parent`
    ///
    /// # Errors
    /// Returns [`crate::Error::Structural`] if `parent` does not exist.
    pub fn add_nested_type(&mut self, parent: TypeDefId, mut type_def: TypeDef) -> Result<TypeDefId> {
        if parent.0 >= self.types.len() {
            return Err(structural_error!("TypeDef {} does not exist", parent));
        }

        type_def.declaring_type = Some(parent);
        let id = self.add_type(type_def);
        self.types[parent.0].nested_types.push(id);
        Ok(id)
    }

    /// Look up a type definition
    ///
    /// # Errors
    /// Returns [`crate::Error::Structural`] if the index is out of range.
    pub fn type_def(&self, id: TypeDefId) -> Result<&TypeDef> {
        self.types
            .get(id.0)
            .ok_or_else(|| structural_error!("TypeDef {} does not exist", id))
    }

    /// Look up a type definition for modification
    ///
    /// # Errors
    /// Returns [`crate::Error::Structural`] if the index is out of range.
    pub fn type_def_mut(&mut self, id: TypeDefId) -> Result<&mut TypeDef> {
        self.types
            .get_mut(id.0)
            .ok_or_else(|| structural_error!("TypeDef {} does not exist", id))
    }

    /// Find a type definition by namespace and name
    #[must_use]
    pub fn find_type(&self, namespace: &str, name: &str) -> Option<TypeDefId> {
        self.types
            .iter()
            .position(|ty| ty.namespace == namespace && ty.name == name)
            .map(TypeDefId)
    }

    /// Ids of all types that are not nested
    pub fn top_level_types(&self) -> impl Iterator<Item = TypeDefId> + '_ {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, ty)| ty.declaring_type.is_none())
            .map(|(index, _)| TypeDefId(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::types::ResolutionScope, Error};

    #[test]
    fn test_nested_types_link_both_ways() {
        let mut module = ModuleDef::new("Orig.dll", "Orig");
        let outer = module.add_type(TypeDef::new("Orig", "Outer"));
        let inner = module.add_nested_type(outer, TypeDef::new("", "Inner")).unwrap();

        assert_eq!(module.types[outer.0].nested_types, vec![inner]);
        assert_eq!(module.types[inner.0].declaring_type, Some(outer));
        assert_eq!(module.top_level_types().collect::<Vec<_>>(), vec![outer]);
    }

    #[test]
    fn test_dangling_indices_are_structural_errors() {
        let mut module = ModuleDef::new("Orig.dll", "Orig");
        assert!(matches!(
            module.add_nested_type(TypeDefId(3), TypeDef::new("", "Inner")),
            Err(Error::Structural { .. })
        ));
        assert!(matches!(
            module.references.type_ref(TypeRefId(0)),
            Err(Error::Structural { .. })
        ));

        let id = module
            .references
            .add_type_ref(TypeRef::new("System", "Object", ResolutionScope::Module));
        assert_eq!(module.references.type_ref(id).unwrap().full_name(), "System.Object");
    }

    #[test]
    fn test_flags_roundtrip_through_json() {
        let mut module = ModuleDef::new("Orig.dll", "Orig");
        module.flags |= ModuleFlags::STRONG_NAME_SIGNED;
        module.assembly.flags = AssemblyFlags::PUBLIC_KEY;

        let json = serde_json::to_string(&module).unwrap();
        let back: ModuleDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, module);
        assert!(back.flags.contains(ModuleFlags::IL_ONLY | ModuleFlags::STRONG_NAME_SIGNED));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(AssemblyVersion::new(4, 0, 0, 0).to_string(), "4.0.0.0");
    }
}
