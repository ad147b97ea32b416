//! End to end rewrite requests over JSON module images.

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
};

use dotrename::{metadata::identity::public_key_token, prelude::*};

/// A library `Lib` exposing `Lib.Widget`
fn lib_module() -> ModuleDef {
    let mut module = ModuleDef::new("Lib.dll", "Lib");
    module.add_type(TypeDef::new("Lib", "Widget"));
    module
}

/// An application `App` holding a field of type `Lib.Widget`
fn app_module() -> ModuleDef {
    let mut module = ModuleDef::new("App.dll", "App");
    let lib = module
        .references
        .add_assembly_ref(AssemblyRef::new("Lib", AssemblyVersion::new(1, 0, 0, 0)));
    let widget = module.references.add_type_ref(TypeRef::new(
        "Lib",
        "Widget",
        ResolutionScope::AssemblyRef(lib),
    ));

    let mut program = TypeDef::new("App", "Program");
    program
        .fields
        .push(FieldDef::new("widget", TypeSig::class(TypeToken::Ref(widget))));
    module.add_type(program);
    module
}

fn write(dir: &Path, file: &str, module: &ModuleDef) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, JsonFormat::default().encode(module).unwrap()).unwrap();
    path
}

fn collect(request: &RewriteRequest) -> (Result<RewriteReport>, Vec<RewriteEvent>) {
    let events = RefCell::new(Vec::new());
    let sink = |event: RewriteEvent| events.borrow_mut().push(event);
    let result = request.run_with_sink(&JsonFormat::default(), &sink);
    (result, events.into_inner())
}

#[test]
fn dependency_is_rewritten_first() {
    let dir = tempfile::tempdir().unwrap();
    let app = write(dir.path(), "App.json", &app_module());
    let lib = write(dir.path(), "Lib.json", &lib_module());
    let out = dir.path().join("out");

    let request = RewriteRequest::new()
        .with_module(&app, out.join("Vendor.App.json"))
        .with_module(&lib, out.join("Vendor.Lib.json"));
    let (result, events) = collect(&request);
    let report = result.unwrap();

    assert_eq!(report.completion_order, vec!["Lib", "App"]);
    assert!(events.contains(&RewriteEvent::DependencyFirst {
        module: "App".into(),
        dependency: "Lib".into(),
    }));
    assert_eq!(report.module("App").unwrap().dependencies_updated, 1);
    assert!(!report.signed);

    let format = JsonFormat::default();
    let app = format.read(&out.join("Vendor.App.json")).unwrap();
    assert_eq!(app.identity(), "Vendor.App");
    assert_eq!(app.name, "Vendor.App.dll");
    assert_eq!(app.references.assembly_refs[0].name, "Vendor.Lib");
    assert_eq!(app.references.type_refs[0].namespace, "Vendor.Lib");
    assert_eq!(app.types[0].namespace, "Vendor.App");

    let lib = format.read(&out.join("Vendor.Lib.json")).unwrap();
    assert_eq!(lib.identity(), "Vendor.Lib");
    assert_eq!(lib.types[0].full_name(), "Vendor.Lib.Widget");
}

#[test]
fn cycle_completes() {
    let dir = tempfile::tempdir().unwrap();
    let mut lib = lib_module();
    lib.references
        .add_assembly_ref(AssemblyRef::new("App", AssemblyVersion::new(1, 0, 0, 0)));
    let lib = write(dir.path(), "Lib.json", &lib);
    let app = write(dir.path(), "App.json", &app_module());

    let request = RewriteRequest::from_pairs(
        vec![app, lib],
        vec![dir.path().join("X.App.json"), dir.path().join("X.Lib.json")],
    )
    .unwrap();
    let (result, events) = collect(&request);
    let report = result.unwrap();

    assert_eq!(report.modules.len(), 2);
    assert_eq!(report.completion_order, vec!["Lib", "App"]);
    assert!(events.contains(&RewriteEvent::DependencyCycle {
        module: "Lib".into(),
        dependency: "App".into(),
    }));

    let lib = JsonFormat::default()
        .read(&dir.path().join("X.Lib.json"))
        .unwrap();
    assert_eq!(lib.references.assembly_refs[0].name, "X.App");
}

#[test]
fn rewrite_in_place_leaves_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let lib = write(dir.path(), "Lib.json", &lib_module());

    let report = RewriteRequest::new()
        .with_module(&lib, &lib)
        .run_with_sink(&JsonFormat::default(), &dotrename::events::NullSink)
        .unwrap();

    assert_eq!(report.module("Lib").unwrap().rewritten, 0);
    let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
    assert_eq!(
        JsonFormat::default().read(&lib).unwrap().identity(),
        "Lib"
    );
}

#[test]
fn signing() {
    let dir = tempfile::tempdir().unwrap();
    let app = write(dir.path(), "App.json", &app_module());
    let lib = write(dir.path(), "Lib.json", &lib_module());
    let key = dir.path().join("vendor.snk");
    fs::write(&key, b"vendor public key").unwrap();
    let token = public_key_token(b"vendor public key");

    let request = RewriteRequest::new()
        .with_module(&app, dir.path().join("out").join("V.App.json"))
        .with_module(&lib, dir.path().join("out").join("V.Lib.json"))
        .with_key_file(&key);
    let (result, events) = collect(&request);
    assert!(result.unwrap().signed);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, RewriteEvent::Signed { .. }))
            .count(),
        2
    );

    let app = JsonFormat::default()
        .read(&dir.path().join("out").join("V.App.json"))
        .unwrap();
    assert_eq!(
        app.assembly.public_key.as_deref(),
        Some(&b"vendor public key"[..])
    );
    assert!(app.assembly.flags.contains(AssemblyFlags::PUBLIC_KEY));
    assert!(app.flags.contains(ModuleFlags::STRONG_NAME_SIGNED));
    assert_eq!(app.references.assembly_refs[0].public_key_token, Some(token));
}

#[test]
fn missing_key_skips_signing() {
    let dir = tempfile::tempdir().unwrap();
    let lib = write(dir.path(), "Lib.json", &lib_module());
    let key = dir.path().join("missing.snk");

    let request = RewriteRequest::new()
        .with_module(&lib, dir.path().join("New.Lib.json"))
        .with_key_file(&key);
    let (result, events) = collect(&request);

    assert!(!result.unwrap().signed);
    assert!(events.contains(&RewriteEvent::SigningSkipped { path: key }));

    let lib = JsonFormat::default()
        .read(&dir.path().join("New.Lib.json"))
        .unwrap();
    assert_eq!(lib.assembly.public_key, None);
    assert!(!lib.flags.contains(ModuleFlags::STRONG_NAME_SIGNED));
}

#[test]
fn unresolved_dependency_fails() {
    let dir = tempfile::tempdir().unwrap();
    let app = write(dir.path(), "App.json", &app_module());

    let (result, _) = collect(&RewriteRequest::new().with_module(&app, dir.path().join("X.json")));
    assert!(matches!(result, Err(Error::Resolution { name, .. }) if name == "Lib"));
    assert!(!dir.path().join("X.json").exists());
}

#[test]
fn dependency_found_in_search_path() {
    let dir = tempfile::tempdir().unwrap();
    let refs = tempfile::tempdir().unwrap();
    fs::write(refs.path().join("Lib.dll"), b"").unwrap();
    let app = write(dir.path(), "App.json", &app_module());

    let request = RewriteRequest::new()
        .with_module(&app, dir.path().join("X.App.json"))
        .with_search_path(refs.path());
    let (result, events) = collect(&request);

    assert_eq!(result.unwrap().module("App").unwrap().dependencies_updated, 0);
    assert!(events.contains(&RewriteEvent::DependencyResolved {
        module: "App".into(),
        dependency: "Lib".into(),
        path: Some(refs.path().join("Lib.dll")),
    }));
}

#[test]
fn request_validation() {
    assert!(matches!(
        RewriteRequest::from_pairs(vec!["A.json"], Vec::<&str>::new()),
        Err(Error::PathCountMismatch { inputs: 1, outputs: 0 })
    ));

    let (result, _) = collect(
        &RewriteRequest::new()
            .with_module("a/A.json", "X.json")
            .with_module("b/B.json", "c/X.json"),
    );
    assert!(matches!(result, Err(Error::DuplicateIdentity(name)) if name == "X"));
}

#[test]
fn unreadable_input_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Broken.json");
    fs::write(&path, b"not json").unwrap();

    let (result, _) = collect(&RewriteRequest::new().with_module(&path, dir.path().join("X.json")));
    assert!(matches!(result, Err(Error::Load { path: p, .. }) if p == path));
}

#[test]
fn chained_identities_are_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = ModuleDef::new("A.dll", "A");
    a.add_type(TypeDef::new("A", "OnlyInA"));
    let mut b = ModuleDef::new("B.dll", "B");
    b.add_type(TypeDef::new("B", "OnlyInB"));
    let a = write(dir.path(), "A.json", &a);
    let b = write(dir.path(), "B.json", &b);

    let request = RewriteRequest::new()
        .with_module(&a, &b)
        .with_module(&b, dir.path().join("C.json"));
    let (result, events) = collect(&request);

    assert!(matches!(result, Err(Error::DuplicateIdentity(name)) if name == "B"));
    assert!(events.is_empty());
    assert!(!dir.path().join("C.json").exists());
    let b = JsonFormat::default().read(&b).unwrap();
    assert_eq!(b.types[0].full_name(), "B.OnlyInB");
}

#[test]
fn json_dependency_found_in_search_path() {
    let dir = tempfile::tempdir().unwrap();
    let refs = tempfile::tempdir().unwrap();
    write(refs.path(), "Lib.json", &lib_module());
    let app = write(dir.path(), "App.json", &app_module());

    let request = RewriteRequest::new()
        .with_module(&app, dir.path().join("X.App.json"))
        .with_search_path(refs.path());
    let (result, events) = collect(&request);

    assert!(result.is_ok());
    assert!(events.contains(&RewriteEvent::DependencyResolved {
        module: "App".into(),
        dependency: "Lib".into(),
        path: Some(refs.path().join("Lib.json")),
    }));
}
