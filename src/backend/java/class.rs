//! Classes for TTCN-3 class types
//!
//! Only members declared by the class itself are emitted; inherited ones come
//! from the Java superclass. Abstract members become abstract accessors.

use super::fragment::*;
use super::GenField;

pub const ROOT_CLASS: &str = "TitanObject";

pub(super) struct ClassShape<'a> {
    pub name: &'a str,
    pub base: Option<String>,
    pub is_abstract: bool,
    pub is_final: bool,
    pub members: &'a [GenField],
}

pub(super) fn generate(module: &mut GeneratedModule, shape: ClassShape<'_>) {
    if shape.base.is_none() {
        module.import(ROOT_CLASS);
    }
    let base = shape.base.clone().unwrap_or_else(|| ROOT_CLASS.to_string());
    let mut class = ClassDef::new(shape.name, &base).documented(format!("Class type `{}'", shape.name));
    if shape.is_abstract {
        class.modifiers.push_str(" abstract");
    } else if shape.is_final {
        class.modifiers.push_str(" final");
    }

    for member in shape.members.iter().filter(|m| !m.is_abstract) {
        let visibility = if member.public { "public" } else { "protected" };
        class.field(visibility, &member.value_type, &member.java, Some(format!("new {}()", member.value_type)));
    }

    class.method(MethodDef::constructor(shape.name).body(vec![line("super();")]));

    for member in shape.members {
        let accessor = if member.is_abstract {
            MethodDef::new("public abstract", &member.value_type, &member.accessor()).abstract_method()
        } else {
            MethodDef::new("public", &member.value_type, &member.accessor())
                .body(vec![line(format!("return {};", member.java))])
        };
        class.method(if member.overrides {
            accessor.annotated("@Override")
        } else {
            accessor
        });
    }
    module.add_class(class);
}
