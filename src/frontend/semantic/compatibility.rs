//! Type compatibility

use super::TypeChecker;
use crate::frontend::ast::TypeId;
use crate::types::{TypeCategory, TypeKind};

impl<'a> TypeChecker<'a> {
    /// Whether a value of `other` may be used where `ty` is expected.
    ///
    /// Both types are checked first. Anything erroneous or unresolvable is
    /// compatible so one mistake is reported once.
    pub fn is_compatible(&mut self, ty: TypeId, other: TypeId) -> bool {
        self.check_type(ty);
        self.check_type(other);
        if self.unit.ty(ty).is_erroneous || self.unit.ty(other).is_erroneous {
            return true;
        }
        let (Some(this_last), Some(other_last)) = (self.type_refd_last(ty), self.type_refd_last(other)) else {
            return true;
        };
        if self.unit.ty(this_last).is_erroneous || self.unit.ty(other_last).is_erroneous {
            return true;
        }

        let other_category = self.unit.ty(other_last).category();
        match &self.unit.ty(this_last).kind {
            TypeKind::Boolean => other_category == TypeCategory::Boolean,
            TypeKind::Integer => matches!(other_category, TypeCategory::Integer | TypeCategory::IntegerAsn1),
            TypeKind::Float => other_category == TypeCategory::Real,
            TypeKind::CharString => match other_category {
                TypeCategory::CharString => true,
                TypeCategory::Asn1String(kind) => kind.is_narrow(),
                _ => false,
            },
            TypeKind::UniversalCharString => matches!(
                other_category,
                TypeCategory::CharString | TypeCategory::UniversalCharString | TypeCategory::Asn1String(_)
            ),
            TypeKind::Asn1String(kind) => match other_category {
                TypeCategory::Asn1String(other_kind) => {
                    other_kind == *kind || (kind.is_narrow() && other_kind.is_narrow())
                }
                TypeCategory::CharString => kind.is_narrow(),
                TypeCategory::UniversalCharString => true,
                _ => false,
            },
            TypeKind::Enumerated(_)
            | TypeKind::RecordSet(_)
            | TypeKind::Union(_)
            | TypeKind::Class(_)
            | TypeKind::Port(_) => this_last == other_last,
            TypeKind::Referenced(_) => true,
        }
    }
}
