//! Java names of generated and runtime classes

use crate::frontend::ast::{CompilationUnit, TypeId};
use crate::frontend::Identifier;
use crate::types::{TypeKind, TypeOwner};

/// Suffix of template classes
pub const TEMPLATE_SUFFIX: &str = "_template";

/// Runtime class holding values of a builtin category
pub fn runtime_name(kind: &TypeKind) -> Option<&'static str> {
    match kind {
        TypeKind::Boolean => Some("TitanBoolean"),
        TypeKind::Integer => Some("TitanInteger"),
        TypeKind::Float => Some("TitanFloat"),
        TypeKind::CharString => Some("TitanCharString"),
        TypeKind::UniversalCharString => Some("TitanUniversalCharString"),
        TypeKind::Asn1String(kind) if kind.is_narrow() => Some("TitanCharString"),
        TypeKind::Asn1String(_) => Some("TitanUniversalCharString"),
        TypeKind::Enumerated(_)
        | TypeKind::RecordSet(_)
        | TypeKind::Union(_)
        | TypeKind::Class(_)
        | TypeKind::Port(_)
        | TypeKind::Referenced(_) => None,
    }
}

/// Name of the class generated for `ty`
pub fn gen_name(unit: &CompilationUnit, ty: TypeId) -> String {
    match &unit.ty(ty).owner {
        Some(TypeOwner::Assignment(a)) => unit.assignment(*a).identifier.target_name(),
        Some(TypeOwner::Field { parent, name }) => format!("{}_{}", gen_name(unit, *parent), name.target_name()),
        Some(TypeOwner::Anonymous { parent, index }) => format!("{}_{}", gen_name(unit, *parent), index),
        None => format!("Type_{}", ty.0),
    }
}

/// Whether a class of its own is emitted for `ty`
pub fn generates_class(unit: &CompilationUnit, ty: TypeId) -> bool {
    let node = unit.ty(ty);
    match &node.kind {
        TypeKind::Enumerated(_)
        | TypeKind::RecordSet(_)
        | TypeKind::Union(_)
        | TypeKind::Class(_)
        | TypeKind::Port(_) => true,
        TypeKind::Boolean
        | TypeKind::Integer
        | TypeKind::Float
        | TypeKind::CharString
        | TypeKind::UniversalCharString
        | TypeKind::Asn1String(_)
        | TypeKind::Referenced(_) => matches!(node.owner, Some(TypeOwner::Assignment(_))),
    }
}

/// Java class holding values of `ty`; `None` for an unresolved reference
pub fn value_type_name(unit: &CompilationUnit, ty: TypeId) -> Option<String> {
    if generates_class(unit, ty) {
        return Some(gen_name(unit, ty));
    }
    let node = unit.ty(ty);
    match &node.kind {
        TypeKind::Referenced(r) => r.refd.filter(|target| *target != ty).and_then(|t| value_type_name(unit, t)),
        kind => runtime_name(kind).map(str::to_string),
    }
}

pub fn template_type_name(unit: &CompilationUnit, ty: TypeId) -> Option<String> {
    value_type_name(unit, ty).map(|name| format!("{}{}", name, TEMPLATE_SUFFIX))
}

pub fn accessor(field: &Identifier) -> String {
    format!("get_field_{}", field.target_name())
}

pub fn const_accessor(field: &Identifier) -> String {
    format!("constGet_field_{}", field.target_name())
}

/// Union selector constant of an alternative
pub fn selection_name(field: &Identifier) -> String {
    format!("ALT_{}", field.target_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDescriptor, FieldMap, RecordSetType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_names() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let inner = unit.add_type(TypeKind::Boolean);
        let inner_ref = unit.reference_type("Small");
        let mut fields = FieldMap::new();
        fields.add(FieldDescriptor::new("a", int));
        fields.add(FieldDescriptor::new("class", inner));
        fields.add(FieldDescriptor::new("s", inner_ref));
        let rec = unit.define_type("My-Rec", TypeKind::RecordSet(RecordSetType { is_set: false, fields }));
        unit.define_type("Small", TypeKind::Integer);

        assert_eq!(gen_name(&unit, rec), "My_Rec");
        assert_eq!(gen_name(&unit, inner), "My_Rec_class_");
        assert_eq!(value_type_name(&unit, int).as_deref(), Some("TitanInteger"));
        assert_eq!(template_type_name(&unit, rec).as_deref(), Some("My_Rec_template"));
        // unresolved until checked
        assert_eq!(value_type_name(&unit, inner_ref), None);
        assert_eq!(accessor(&Identifier::new("class")), "get_field_class_");
        assert_eq!(selection_name(&Identifier::new("a-b")), "ALT_a_b");
    }
}
