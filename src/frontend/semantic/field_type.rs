//! Sub-reference navigation

use super::{Expected, TypeChecker};
use crate::frontend::ast::{TypeId, ValueId};
use crate::frontend::{Reference, SubReference, ValueKind};
use crate::types::TypeKind;

/// How a type reacts to sub-references
enum Shape {
    Scalar,
    String,
    Fields,
    Reference,
}

impl<'a> TypeChecker<'a> {
    /// Type reached by following `reference.subrefs[index..]` from `ty`.
    ///
    /// Returns `None` after reporting when a sub-reference does not apply, and
    /// also (silently) when `interrupt_if_optional` is set and an optional
    /// field is crossed.
    pub fn get_field_type(
        &mut self,
        ty: TypeId,
        reference: &Reference,
        index: usize,
        expected: Expected,
        interrupt_if_optional: bool,
    ) -> Option<TypeId> {
        let Some(subref) = reference.subrefs.get(index) else {
            return Some(ty);
        };

        let shape = match &self.unit.ty(ty).kind {
            TypeKind::Boolean | TypeKind::Integer | TypeKind::Float | TypeKind::Enumerated(_) | TypeKind::Port(_) => {
                Shape::Scalar
            }
            TypeKind::CharString | TypeKind::UniversalCharString | TypeKind::Asn1String(_) => Shape::String,
            TypeKind::RecordSet(_) | TypeKind::Union(_) | TypeKind::Class(_) => Shape::Fields,
            TypeKind::Referenced(_) => Shape::Reference,
        };

        match shape {
            Shape::Reference => {
                self.check_type(ty);
                let last = self.type_refd_last(ty)?;
                self.get_field_type(last, reference, index, expected, interrupt_if_optional)
            }
            Shape::Scalar => {
                self.reject_subreference(ty, subref);
                None
            }
            Shape::String => match subref {
                SubReference::Array { index: element, .. } => {
                    if let Some(next) = reference.subrefs.get(index + 1) {
                        self.error(
                            next.location(),
                            "Invalid sub-reference: a string element cannot have further sub-references"
                                .to_string(),
                        );
                        return None;
                    }
                    self.check_string_index(*element, expected);
                    Some(ty)
                }
                _ => {
                    self.reject_subreference(ty, subref);
                    None
                }
            },
            Shape::Fields => match subref {
                SubReference::Field { id } => {
                    if matches!(self.unit.ty(ty).kind, TypeKind::Class(_)) {
                        // inherited members appear after the check
                        self.check_type(ty);
                    }
                    let field = self.unit.ty(ty).fields().and_then(|f| f.get(&id.name)).cloned();
                    let Some(field) = field else {
                        let type_name = self.type_name(ty);
                        self.error(
                            id.location,
                            format!("Reference to a non-existent sub-reference `{}' in type `{}'", id, type_name),
                        );
                        return None;
                    };
                    if interrupt_if_optional && field.optional {
                        return None;
                    }
                    self.get_field_type(field.ty, reference, index + 1, expected, interrupt_if_optional)
                }
                _ => {
                    self.reject_subreference(ty, subref);
                    None
                }
            },
        }
    }

    fn reject_subreference(&mut self, ty: TypeId, subref: &SubReference) {
        let type_name = self.type_name(ty);
        let message = match subref {
            SubReference::Array { .. } => {
                format!("Invalid sub-reference: type `{}' cannot be indexed", type_name)
            }
            SubReference::Field { id } => {
                format!("Invalid sub-reference `{}': type `{}' does not have fields", id, type_name)
            }
            SubReference::Parameterised { id, .. } => {
                format!("Invalid sub-reference `{}': type `{}' cannot be parameterised", id, type_name)
            }
        };
        self.error(subref.location(), message);
    }

    /// Index of a string element: a non-negative integer
    fn check_string_index(&mut self, index: ValueId, expected: Expected) {
        let last = self.value_refd_last(index);
        let location = self.unit.value(index).location;
        match &self.unit.value(last).kind {
            ValueKind::Integer(n) if *n < 0 => {
                let n = *n;
                self.error(
                    location,
                    format!("A non-negative integer value was expected as string index instead of {}", n),
                );
                self.mark_value_erroneous(index);
            }
            ValueKind::Integer(_) => {}
            ValueKind::Expression { .. } | ValueKind::Macro(_) if expected != Expected::Constant => {}
            ValueKind::Referenced(_) | ValueKind::UndefinedLowerIdentifier(_) => {}
            _ if self.unit.value(last).is_erroneous => {}
            other => {
                let found = other.describe();
                self.error(
                    location,
                    format!("An integer value was expected as string index instead of {}", found),
                );
                self.mark_value_erroneous(index);
            }
        }
    }
}
