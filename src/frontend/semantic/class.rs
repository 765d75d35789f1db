//! Class checks and inheritance merge

use super::TypeChecker;
use crate::frontend::ast::TypeId;
use crate::frontend::{ChainLink, ReferenceChain};
use crate::types::{FieldDescriptor, TypeKind, Visibility};

impl<'a> TypeChecker<'a> {
    pub(super) fn check_class(&mut self, id: TypeId) {
        let (base, is_abstract, is_final) = match &self.unit.ty(id).kind {
            TypeKind::Class(class) => (class.base, class.is_abstract, class.is_final),
            _ => return,
        };
        let class_name = self.type_name(id);
        let location = self.unit.ty(id).location;

        if is_abstract && is_final {
            self.error(location, format!("Class `{}' cannot be both abstract and final", class_name));
        }

        // a re-check starts from the declared members only
        if let Some(fields) = self.unit.ty_mut(id).fields_mut() {
            fields.remove_inherited();
        }

        let base_class = match base {
            Some(base) => self.check_base_class(id, base),
            None => None,
        };

        self.check_field_types(id, "member");
        let own: Vec<FieldDescriptor> = match self.unit.ty(id).fields() {
            Some(fields) => fields.iter().cloned().collect(),
            None => Vec::new(),
        };
        for member in &own {
            if member.is_abstract && !is_abstract {
                self.error(
                    member.name.location,
                    format!(
                        "Abstract member `{}' can only be declared in an abstract class, `{}' is not abstract",
                        member.name, class_name
                    ),
                );
            }
            if member.visibility == Visibility::Public
                && !matches!(self.unit.ty(member.ty).kind, TypeKind::Referenced(_))
            {
                self.error(
                    member.name.location,
                    format!("Data member `{}' of class `{}' cannot be public", member.name, class_name),
                );
            }
        }

        match base_class {
            Some(base) => self.merge_inherited(id, base, &own),
            None => {
                for member in own.iter().filter(|m| m.is_inherited) {
                    self.error(
                        member.name.location,
                        format!(
                            "Member `{}' is marked as inherited but class `{}' has no base class",
                            member.name, class_name
                        ),
                    );
                }
            }
        }

        if !is_abstract {
            let unimplemented: Vec<(FieldDescriptor, Option<TypeId>)> = match self.unit.ty(id).fields() {
                Some(fields) => fields
                    .iter()
                    .filter(|f| f.is_abstract && f.inherited_from.is_some())
                    .map(|f| (f.clone(), f.inherited_from))
                    .collect(),
                None => Vec::new(),
            };
            for (member, from) in unimplemented {
                let from_name = from.map(|f| self.type_name(f)).unwrap_or_default();
                self.error(
                    location,
                    format!(
                        "Class `{}' must implement abstract member `{}' inherited from `{}'",
                        class_name, member.name, from_name
                    ),
                );
            }
        }
    }

    /// Resolve and validate the base clause; returns the base class to merge
    fn check_base_class(&mut self, id: TypeId, base: TypeId) -> Option<TypeId> {
        let class_name = self.type_name(id);
        let base_location = self.unit.ty(base).location;
        let last = self.type_refd_last(base)?;

        if !matches!(self.unit.ty(last).kind, TypeKind::Class(_)) {
            let base_name = self.type_name(base);
            self.error(
                base_location,
                format!("Class type expected instead of `{}' as the base of class `{}'", base_name, class_name),
            );
            return None;
        }

        if self.has_circular_inheritance(id) {
            self.mark_type_erroneous(id);
            return None;
        }

        self.check_type(last);
        if let TypeKind::Class(parent) = &self.unit.ty(last).kind {
            if parent.is_final {
                let base_name = self.type_name(last);
                self.error(
                    base_location,
                    format!("Class `{}' cannot extend final class `{}'", class_name, base_name),
                );
            }
        }
        Some(last)
    }

    fn has_circular_inheritance(&mut self, id: TypeId) -> bool {
        let mut chain = ReferenceChain::new("Circular class inheritance");
        let location = self.unit.ty(id).location;
        chain.add(ChainLink::Type(id.0), &location, &mut *self.sink);

        let mut current = id;
        loop {
            let base = match &self.unit.ty(current).kind {
                TypeKind::Class(class) => class.base,
                _ => None,
            };
            let Some(base) = base else {
                return false;
            };
            let Some(next) = self.type_refd_last(base) else {
                return false;
            };
            if !chain.add(ChainLink::Type(next.0), &location, &mut *self.sink) {
                return true;
            }
            current = next;
        }
    }

    /// Copy the base class members into the class, after its own members
    fn merge_inherited(&mut self, id: TypeId, base: TypeId, own: &[FieldDescriptor]) {
        let base_name = self.type_name(base);
        let inherited: Vec<FieldDescriptor> = match self.unit.ty(base).fields() {
            Some(fields) => fields.iter().cloned().collect(),
            None => Vec::new(),
        };

        for member in own.iter().filter(|m| m.is_inherited) {
            if !inherited.iter().any(|p| p.name == member.name) {
                self.error(
                    member.name.location,
                    format!(
                        "Member `{}' is marked as inherited but base class `{}' has no such member",
                        member.name, base_name
                    ),
                );
            }
        }

        for parent_member in inherited {
            match own.iter().find(|m| m.name == parent_member.name) {
                None => {
                    if let Some(fields) = self.unit.ty_mut(id).fields_mut() {
                        fields.insert_inherited(parent_member, base);
                    }
                }
                Some(member) if member.is_inherited || parent_member.is_abstract => {}
                Some(member) => {
                    self.error(
                        member.name.location,
                        format!(
                            "Member `{}' shadows inherited member of class `{}'",
                            member.name, base_name
                        ),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::frontend::CompilationUnit;
    use crate::types::{ClassType, FieldDescriptor, FieldMap, TypeKind};
    use crate::frontend::ast::TypeId;
    use pretty_assertions::assert_eq;

    fn class(
        unit: &mut CompilationUnit,
        name: &str,
        base: Option<&str>,
        is_abstract: bool,
        is_final: bool,
        fields: Vec<FieldDescriptor>,
    ) -> TypeId {
        let base = base.map(|b| unit.reference_type(b));
        unit.define_type(
            name,
            TypeKind::Class(ClassType {
                base,
                is_abstract,
                is_final,
                fields: FieldMap::from(fields),
            }),
        )
    }

    fn member_names(unit: &CompilationUnit, id: TypeId) -> Vec<String> {
        unit.ty(id)
            .fields()
            .map(|f| f.names().map(str::to_string).collect())
            .expect("class has members")
    }

    #[test]
    fn test_inherited_members_are_merged_once() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let cs = unit.add_type(TypeKind::CharString);
        class(&mut unit, "Base", None, false, false, vec![FieldDescriptor::new("x", int)]);
        let derived = class(&mut unit, "Derived", Some("Base"), false, false, vec![FieldDescriptor::new("y", cs)]);

        let (_, diags) = with_checker(&mut unit, |c| c.check_type(derived));
        assert!(diags.is_empty(), "{:?}", diags.items());
        assert_eq!(member_names(&unit, derived), vec!["y", "x"]);

        // a newer timestamp merges again without duplicating
        let mut sink = crate::utils::Diagnostics::new();
        let next = ts().next();
        super::super::TypeChecker::new(&mut unit, &mut sink, next).check_type(derived);
        assert_eq!(member_names(&unit, derived), vec!["y", "x"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_shadowing_member_is_an_error() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let int2 = unit.add_type(TypeKind::Integer);
        class(&mut unit, "Base", None, false, false, vec![FieldDescriptor::new("x", int)]);
        let derived = class(&mut unit, "Derived", Some("Base"), false, false, vec![FieldDescriptor::new("x", int2)]);
        let (_, diags) = with_checker(&mut unit, |c| c.check_type(derived));
        assert!(diags.contains("shadows inherited member"));
    }

    #[test]
    fn test_final_and_abstract() {
        let mut unit = CompilationUnit::new("M");
        let c = class(&mut unit, "C", None, true, true, vec![]);
        let (_, diags) = with_checker(&mut unit, |ch| ch.check_type(c));
        assert!(diags.contains("cannot be both abstract and final"));
    }

    #[test]
    fn test_extending_final_and_non_class() {
        let mut unit = CompilationUnit::new("M");
        unit.define_type("I", TypeKind::Integer);
        class(&mut unit, "F", None, false, true, vec![]);
        let a = class(&mut unit, "A", Some("F"), false, false, vec![]);
        let b = class(&mut unit, "B", Some("I"), false, false, vec![]);
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_type(a);
            c.check_type(b);
        });
        assert!(diags.contains("cannot extend final class `F'"));
        assert!(diags.contains("Class type expected instead of `I'"));
    }

    #[test]
    fn test_circular_inheritance() {
        let mut unit = CompilationUnit::new("M");
        let a = class(&mut unit, "A", Some("B"), false, false, vec![]);
        class(&mut unit, "B", Some("A"), false, false, vec![]);
        let (_, diags) = with_checker(&mut unit, |c| c.check_type(a));
        assert!(diags.contains("Circular class inheritance"));
        assert!(unit.ty(a).is_erroneous);
    }

    #[test]
    fn test_abstract_members() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let int2 = unit.add_type(TypeKind::Integer);
        class(&mut unit, "Shape", None, true, false, vec![FieldDescriptor::new("area", int).abstract_member()]);
        let square = class(&mut unit, "Square", Some("Shape"), false, false, vec![]);
        let bad = class(&mut unit, "Bad", None, false, false, vec![FieldDescriptor::new("f", int2).abstract_member()]);
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_type(square);
            c.check_type(bad);
        });
        assert!(diags.contains("must implement abstract member `area' inherited from `Shape'"));
        assert!(diags.contains("can only be declared in an abstract class"));
    }

    #[test]
    fn test_redeclared_abstract_member_is_implemented() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let own = unit.add_type(TypeKind::Integer);
        class(&mut unit, "Shape", None, true, false, vec![FieldDescriptor::new("area", int).abstract_member()]);
        let circle = class(&mut unit, "Circle", Some("Shape"), false, false, vec![FieldDescriptor::new("area", own)]);
        let (_, diags) = with_checker(&mut unit, |c| c.check_type(circle));
        assert!(diags.is_empty(), "{:?}", diags.items());
        assert_eq!(member_names(&unit, circle), vec!["area"]);
        let area = unit.ty(circle).fields().and_then(|f| f.iter().find(|m| m.name.name == "area")).cloned();
        assert_eq!(area.map(|m| (m.is_abstract, m.inherited_from)), Some((false, None)));
    }

    #[test]
    fn test_public_data_member() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let other = unit.reference_type("C");
        let c = class(
            &mut unit,
            "C",
            None,
            false,
            false,
            vec![FieldDescriptor::new("n", int).public(), FieldDescriptor::new("next", other).public()],
        );
        let (_, diags) = with_checker(&mut unit, |ch| ch.check_type(c));
        assert_eq!(diags.error_count(), 1);
        assert!(diags.contains("Data member `n' of class `C' cannot be public"));
    }
}
