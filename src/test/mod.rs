//! Shared fixtures for unit tests.

use std::cell::RefCell;

use crate::{
    events::{EventSink, RewriteEvent},
    metadata::{
        body::{Instruction, MethodBody, OpCode, Operand},
        customattributes::{AttributeArgument, CustomAttribute},
        members::{FieldDef, FieldRef, MemberRef, MemberSig, MethodDef, MethodRef, MethodSpec, PropertyDef},
        module::{AssemblyRef, AssemblyVersion, ExportedType, ModuleDef},
        signature::{MethodSig, Primitive, TypeSig},
        token::{AssemblyRefId, TypeDefId, TypeToken},
        types::{GenericParam, GenericParamConstraint, InterfaceImpl, ResolutionScope, TypeDef, TypeRef},
        identity::FRAMEWORK_TOKENS,
    },
};

/// Sink recording every event it receives
#[derive(Default)]
pub struct CollectingSink {
    pub events: RefCell<Vec<RewriteEvent>>,
}

impl CollectingSink {
    pub fn take(&self) -> Vec<RewriteEvent> {
        self.events.take()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: RewriteEvent) {
        self.events.borrow_mut().push(event);
    }
}

// Helper function to create a reference to the core library
pub fn add_corlib(module: &mut ModuleDef) -> AssemblyRefId {
    let mut corlib = AssemblyRef::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0));
    corlib.public_key_token = Some(FRAMEWORK_TOKENS[0]);
    module.references.add_assembly_ref(corlib)
}

// Helper function to create a type reference into the core library
pub fn add_corlib_type(module: &mut ModuleDef, corlib: AssemblyRefId, namespace: &str, name: &str) -> TypeSig {
    let id = module
        .references
        .add_type_ref(TypeRef::new(namespace, name, ResolutionScope::AssemblyRef(corlib)));
    TypeSig::class(TypeToken::Ref(id))
}

// Helper function to create a member reference to a constructor
pub fn add_ctor_ref(module: &mut ModuleDef, parent: TypeSig, params: Vec<TypeSig>) -> MethodRef {
    MethodRef::Ref(module.references.add_member_ref(MemberRef {
        parent,
        name: ".ctor".into(),
        signature: MemberSig::Method(MethodSig::instance(TypeSig::Primitive(Primitive::Void), params)),
    }))
}

fn void() -> TypeSig {
    TypeSig::Primitive(Primitive::Void)
}

fn class(id: TypeDefId) -> TypeSig {
    TypeSig::class(TypeToken::Def(id))
}

/// A module named `Orig` touching the identity from every kind of node.
///
/// - `Orig.Bar`, `Orig.Attr` (an attribute), `Orig.IFoo` (an interface)
/// - `Orig.Foo : IFoo` carrying `[Orig.Attr]`, a field and an auto property of type
///   `Orig.Bar`, an explicit implementation `Orig.IFoo.Method`, a generic method
///   `Make<T> where T : Orig.Bar` and a method loading `"Orig.Key"`
/// - a display class `<Orig-Bar>d__0` nested in `Orig.Foo`
/// - a type reference `Orig.Helpers.Extern` reached only through `ldtoken`
/// - `[assembly: AssemblyTitle("Orig")]` and a forwarded type `Orig.Moved`
pub fn orig_module() -> ModuleDef {
    let mut module = ModuleDef::new("Orig.dll", "Orig");
    let corlib = add_corlib(&mut module);
    let object = add_corlib_type(&mut module, corlib, "System", "Object");
    let attribute = add_corlib_type(&mut module, corlib, "System", "Attribute");
    let title = add_corlib_type(&mut module, corlib, "System.Reflection", "AssemblyTitleAttribute");

    let mut bar = TypeDef::new("Orig", "Bar");
    bar.base_type = Some(object.clone());
    let bar = module.add_type(bar);

    let mut attr = TypeDef::new("Orig", "Attr");
    attr.base_type = Some(attribute);
    attr.methods.push(MethodDef::new(".ctor", MethodSig::instance(void(), vec![])));
    let attr = module.add_type(attr);

    let mut ifoo = TypeDef::new("Orig", "IFoo");
    ifoo.methods.push(MethodDef::new("Method", MethodSig::instance(void(), vec![])));
    let ifoo = module.add_type(ifoo);

    let external = module
        .references
        .add_type_ref(TypeRef::new("Orig.Helpers", "Extern", ResolutionScope::Module));

    let mut foo = TypeDef::new("Orig", "Foo");
    foo.base_type = Some(object);
    foo.interfaces.push(InterfaceImpl::new(class(ifoo)));
    foo.custom_attributes
        .push(CustomAttribute::new(MethodRef::Def { owner: attr, index: 0 }));
    foo.fields.push(FieldDef::new("bar", class(bar)));
    foo.fields.push(FieldDef::new("<Orig.Foo>k__BackingField", class(bar)));

    let mut getter = MethodDef::new("get_Bar", MethodSig::instance(class(bar), vec![]));
    getter.body = Some(MethodBody::new(vec![
        Instruction::new(0, OpCode::Ldarg, Operand::Argument(0)),
        Instruction::new(
            1,
            OpCode::Ldfld,
            Operand::Field(FieldRef::Def { owner: TypeDefId(3), index: 1 }),
        ),
        Instruction::new(6, OpCode::Ret, Operand::None),
    ]));
    foo.methods.push(getter);

    let mut explicit = MethodDef::new("Orig.IFoo.Method", MethodSig::instance(void(), vec![]));
    explicit.overrides.push(MethodRef::Def { owner: ifoo, index: 0 });
    foo.methods.push(explicit);

    let mut make = MethodDef::new(
        "Make",
        MethodSig::static_method(TypeSig::MethodGenericParam(0), vec![]),
    );
    make.signature.generic_param_count = 1;
    let mut param = GenericParam::new(0, "T");
    param.constraints.push(GenericParamConstraint {
        constraint: class(bar),
        custom_attributes: Vec::new(),
    });
    make.generic_params.push(param);
    foo.methods.push(make);

    let spec = module.references.add_method_spec(MethodSpec {
        method: MethodRef::Def { owner: TypeDefId(3), index: 2 },
        instantiation: vec![class(bar)],
    });
    foo.methods.push(
        MethodDef::new("Run", MethodSig::static_method(TypeSig::Primitive(Primitive::String), vec![]))
            .with_body(MethodBody::new(vec![
                Instruction::new(0, OpCode::Call, Operand::Method(MethodRef::Spec(spec))),
                Instruction::new(5, OpCode::Pop, Operand::None),
                Instruction::new(
                    6,
                    OpCode::Ldtoken,
                    Operand::Type(TypeSig::class(TypeToken::Ref(external))),
                ),
                Instruction::new(11, OpCode::Pop, Operand::None),
                Instruction::new(12, OpCode::Ldstr, Operand::String("Orig.Key".into())),
                Instruction::new(17, OpCode::Ret, Operand::None),
            ])),
    );

    let mut property = PropertyDef::new("Bar", class(bar));
    property.getter = Some(0);
    foo.properties.push(property);
    let foo = module.add_type(foo);

    module
        .add_nested_type(foo, TypeDef::new("", "<Orig-Bar>d__0"))
        .expect("Foo was just added");

    let title_ctor = add_ctor_ref(&mut module, title, vec![TypeSig::Primitive(Primitive::String)]);
    module
        .assembly
        .custom_attributes
        .push(CustomAttribute::new(title_ctor).with_arg(AttributeArgument::string("Orig")));

    module.exported_types.push(ExportedType {
        namespace: "Orig.Moved".into(),
        name: "Widget".into(),
        forwarded_to: None,
    });

    module
}
