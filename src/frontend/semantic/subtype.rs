//! Sub-type declarations and the value check against them

use super::TypeChecker;
use crate::frontend::ast::{TypeId, ValueId};
use crate::frontend::ValueKind;
use crate::types::{Restriction, SubTypeConstraint, TypeKind};

/// What a sub-type restriction may apply to
#[derive(Clone, Copy, PartialEq, Eq)]
enum Domain {
    Integer,
    Float,
    /// `true` for universal character strings
    String(bool),
    Other,
}

impl<'a> TypeChecker<'a> {
    fn domain(&mut self, id: TypeId) -> Option<Domain> {
        let last = self.type_refd_last(id)?;
        Some(match &self.unit.ty(last).kind {
            TypeKind::Integer => Domain::Integer,
            TypeKind::Float => Domain::Float,
            TypeKind::CharString => Domain::String(false),
            TypeKind::UniversalCharString => Domain::String(true),
            TypeKind::Asn1String(kind) => Domain::String(!kind.is_narrow()),
            TypeKind::Boolean
            | TypeKind::Enumerated(_)
            | TypeKind::RecordSet(_)
            | TypeKind::Union(_)
            | TypeKind::Class(_)
            | TypeKind::Port(_)
            | TypeKind::Referenced(_) => Domain::Other,
        })
    }

    pub(super) fn check_sub_type_declaration(&mut self, id: TypeId) {
        let Some(constraint) = self.unit.ty(id).sub_type.clone() else {
            return;
        };
        let Some(domain) = self.domain(id) else {
            return;
        };
        let type_name = self.type_name(id);
        let location = constraint.location;
        let mut valid = true;

        for restriction in &constraint.restrictions {
            let message = match (restriction, domain) {
                (Restriction::IntegerRange { min: Some(min), max: Some(max) }, Domain::Integer) if min > max => {
                    Some(format!("lower boundary {} is greater than upper boundary {}", min, max))
                }
                (Restriction::IntegerRange { .. }, Domain::Integer) => None,
                (Restriction::FloatRange { min: Some(min), max: Some(max) }, Domain::Float) if min > max => {
                    Some(format!("lower boundary {:?} is greater than upper boundary {:?}", min, max))
                }
                (Restriction::FloatRange { .. }, Domain::Float) => None,
                (Restriction::CharRange { from, to }, Domain::String(_)) if from > to => {
                    Some(format!("lower boundary \"{}\" is greater than upper boundary \"{}\"", from, to))
                }
                (Restriction::CharRange { from, to }, Domain::String(false)) if !from.is_ascii() || !to.is_ascii() => {
                    Some(format!("character range {} contains characters outside of ISO 646", restriction))
                }
                (Restriction::CharRange { .. }, Domain::String(_)) => None,
                _ => Some(format!("restriction {} is not applicable", restriction)),
            };
            if let Some(message) = message {
                self.error(location, format!("Invalid subtype of type `{}': {}", type_name, message));
                valid = false;
            }
        }

        if let Some(length) = constraint.length {
            if !matches!(domain, Domain::String(_)) {
                self.error(location, format!("Length restriction is not allowed for type `{}'", type_name));
                valid = false;
            } else if length.max.map_or(false, |max| max < length.min) {
                self.error(
                    location,
                    format!(
                        "Invalid subtype of type `{}': the upper boundary of the length restriction is smaller than the lower boundary",
                        type_name
                    ),
                );
                valid = false;
            }
        }

        if !valid {
            self.mark_type_erroneous(id);
        }
    }

    /// Constraints that apply to values of `id`: its own and those of the
    /// types it refers to
    fn effective_constraints(&mut self, id: TypeId) -> Vec<(TypeId, SubTypeConstraint)> {
        let mut constraints = Vec::new();
        let mut current = id;
        let mut visited = Vec::new();
        loop {
            if visited.contains(&current) {
                break;
            }
            visited.push(current);
            if let Some(constraint) = &self.unit.ty(current).sub_type {
                constraints.push((current, constraint.clone()));
            }
            if !matches!(self.unit.ty(current).kind, TypeKind::Referenced(_)) {
                break;
            }
            match self.type_refd(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        constraints
    }

    /// Check the (already kind-checked) `value` against the sub-types of `ty`
    pub(super) fn check_sub_type_value(&mut self, ty: TypeId, value: ValueId) {
        if self.unit.value(value).is_erroneous {
            return;
        }
        let last = self.value_refd_last(value);
        for (owner, constraint) in self.effective_constraints(ty) {
            let (admitted, text) = match &self.unit.value(last).kind {
                ValueKind::Integer(n) => (constraint.admits_integer(*n), n.to_string()),
                ValueKind::Real(r) => (constraint.admits_real(*r), format!("{:?}", r)),
                ValueKind::CharString(s) | ValueKind::UniversalCharString(s) => {
                    (constraint.admits_string(s), format!("\"{}\"", s))
                }
                _ => return,
            };
            if !admitted {
                let type_name = self.type_name(owner);
                let location = self.unit.value(value).location;
                self.error(
                    location,
                    format!(
                        "{} is not a valid value for type `{}' which has subtype {}",
                        text, type_name, constraint
                    ),
                );
                self.mark_value_erroneous(value);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::ValueCheckingOptions;
    use crate::frontend::{AssignmentKind, CompilationUnit, ValueKind};
    use crate::types::{Restriction, SubTypeConstraint, TypeKind};

    #[test]
    fn test_inverted_integer_range() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        unit.ty_mut(int).sub_type = Some(SubTypeConstraint::new(vec![Restriction::IntegerRange {
            min: Some(10),
            max: Some(1),
        }]));
        let (_, diags) = with_checker(&mut unit, |c| c.check_type(int));
        assert!(diags.contains("lower boundary 10 is greater than upper boundary 1"));
        assert!(unit.ty(int).is_erroneous);
    }

    #[test]
    fn test_length_restriction_on_integer() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        unit.ty_mut(int).sub_type = Some(SubTypeConstraint::length(1, Some(2)));
        let (_, diags) = with_checker(&mut unit, |c| c.check_type(int));
        assert!(diags.contains("Length restriction is not allowed for type `I'"));
    }

    #[test]
    fn test_value_outside_subtype_through_alias() {
        let mut unit = CompilationUnit::new("M");
        let base = unit.define_type("Small", TypeKind::Integer);
        unit.ty_mut(base).sub_type = Some(SubTypeConstraint::new(vec![Restriction::IntegerRange {
            min: Some(0),
            max: Some(10),
        }]));
        let alias = unit.reference_type("Small");
        unit.add_assignment("Alias", AssignmentKind::Type(alias));
        let ok = unit.add_value(ValueKind::Integer(3));
        let bad = unit.add_value(ValueKind::Integer(11));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_type(alias);
            c.check_this_value(alias, ok, ValueCheckingOptions::constant(), None);
            c.check_this_value(alias, bad, ValueCheckingOptions::constant(), None);
        });
        assert_eq!(diags.error_count(), 1);
        assert!(diags.contains("11 is not a valid value for type `Small' which has subtype (0..10)"));
        assert!(unit.value(bad).is_erroneous);
    }
}
