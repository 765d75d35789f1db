//! Semantic Analysis
//!
//! Performs, per type node:
//! - the timestamp-gated `check` protocol (attributes, sub-types, structure,
//!   encodings)
//! - value and template checking against a governing type
//! - type compatibility
//! - sub-reference navigation (`getFieldType`)
//!
//! Every operation matches exhaustively on [`TypeKind`](crate::types::TypeKind);
//! adding a category makes the compiler point at each place to extend.
//! Problems are reported to the diagnostic sink and never abort a traversal.

mod check;
mod class;
mod compatibility;
mod encoding;
mod field_type;
mod subtype;
mod templates;
mod values;

use crate::frontend::ast::{AssignmentId, AssignmentKind, CompilationUnit, ScopeId, TemplateId, TypeId, ValueId};
use crate::utils::{CompilationTimestamp, DiagnosticSink, Location};

/// Name of the type assignment that describes the structure of ASN.1 REAL
/// values written as `{ mantissa m, base b, exponent e }`
pub const REAL_ASSOCIATED_TYPE: &str = "REAL";

/// What kind of value the context requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Constant,
    StaticValue,
    DynamicValue,
    Template,
}

#[derive(Debug, Clone, Copy)]
pub struct ValueCheckingOptions {
    pub expected: Expected,
    /// Fields may be left out (modified values)
    pub incomplete_allowed: bool,
    pub omit_allowed: bool,
    /// Run the sub-type check after the kind check
    pub sub_check: bool,
    /// Missing optional fields are implicitly omitted
    pub implicit_omit: bool,
    /// The value is a string element
    pub str_elem: bool,
}

impl ValueCheckingOptions {
    pub fn new(expected: Expected) -> Self {
        Self {
            expected,
            incomplete_allowed: false,
            omit_allowed: false,
            sub_check: true,
            implicit_omit: false,
            str_elem: false,
        }
    }

    pub fn constant() -> Self {
        Self::new(Expected::Constant)
    }

    pub fn omit_allowed(mut self, allowed: bool) -> Self {
        self.omit_allowed = allowed;
        self
    }

    pub fn implicit_omit(mut self, implicit_omit: bool) -> Self {
        self.implicit_omit = implicit_omit;
        self
    }

    pub fn incomplete_allowed(mut self, allowed: bool) -> Self {
        self.incomplete_allowed = allowed;
        self
    }
}

/// Semantic checker over one compilation unit at one timestamp
pub struct TypeChecker<'a> {
    pub unit: &'a mut CompilationUnit,
    sink: &'a mut dyn DiagnosticSink,
    timestamp: CompilationTimestamp,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        unit: &'a mut CompilationUnit,
        sink: &'a mut dyn DiagnosticSink,
        timestamp: CompilationTimestamp,
    ) -> Self {
        Self { unit, sink, timestamp }
    }

    pub fn timestamp(&self) -> CompilationTimestamp {
        self.timestamp
    }

    fn error(&mut self, location: Location, message: String) {
        self.sink.report_semantic_error(&location, message);
    }

    fn warning(&mut self, location: Location, message: String) {
        self.sink.report_semantic_warning(&location, message);
    }

    /// Scope names are resolved in for a node governed by `governor`
    fn governor_scope(&self, governor: Option<TypeId>) -> Option<ScopeId> {
        governor.and_then(|ty| self.unit.ty(ty).scope)
    }

    fn type_name(&self, id: TypeId) -> String {
        self.unit.type_name(id)
    }

    fn mark_type_erroneous(&mut self, id: TypeId) {
        self.unit.ty_mut(id).is_erroneous = true;
    }

    fn mark_value_erroneous(&mut self, id: ValueId) {
        self.unit.value_mut(id).is_erroneous = true;
    }

    fn mark_template_erroneous(&mut self, id: TemplateId) {
        self.unit.template_mut(id).is_erroneous = true;
    }

    /// Check every assignment of the unit: types first, then the values and
    /// templates defined with them.
    pub fn check_unit(&mut self) {
        log::debug!("checking module {} at {}", self.unit.name, self.timestamp);
        let assignments: Vec<AssignmentId> = self.unit.assignment_ids().collect();

        for &id in &assignments {
            if let AssignmentKind::Type(ty) = self.unit.assignment(id).kind {
                self.check_type(ty);
            }
        }

        for &id in &assignments {
            let assignment = self.unit.assignment(id).clone();
            let self_reference = match assignment.kind {
                AssignmentKind::Type(_) => false,
                AssignmentKind::Constant { ty, value } => {
                    self.check_type(ty);
                    self.check_this_value(ty, value, ValueCheckingOptions::constant(), Some(id))
                }
                AssignmentKind::ModulePar { ty, value } => {
                    self.check_type(ty);
                    match value {
                        Some(value) => self.check_this_value(
                            ty,
                            value,
                            ValueCheckingOptions::new(Expected::Constant).implicit_omit(true),
                            Some(id),
                        ),
                        None => false,
                    }
                }
                AssignmentKind::Template { ty, template } => {
                    self.check_type(ty);
                    let is_modified = self.unit.template(template).is_modified;
                    self.check_this_template(ty, template, is_modified, false, Some(id))
                }
            };
            if self_reference {
                self.error(
                    assignment.location,
                    format!(
                        "The {} `{}' refers to itself",
                        assignment.describe(),
                        assignment.identifier
                    ),
                );
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::frontend::{Reference, TemplateKind, ValueKind};
    use crate::types::{FieldDescriptor, TypeKind};

    #[test]
    fn test_check_unit_reports_value_mismatch() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("MyInt", TypeKind::Integer);
        unit.define_constant("c", int, ValueKind::Boolean(true));
        let (_, diags) = with_checker(&mut unit, |c| c.check_unit());
        assert!(diags.contains("integer value was expected"));
    }

    #[test]
    fn test_check_unit_accepts_well_formed_module() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let cs = unit.add_type(TypeKind::CharString);
        let rec = record(
            &mut unit,
            "R",
            vec![FieldDescriptor::new("a", int), FieldDescriptor::new("b", cs).optional()],
        );
        let one = unit.add_value(ValueKind::Integer(1));
        let omit = unit.add_value(ValueKind::Omit);
        unit.define_constant(
            "c",
            rec,
            ValueKind::Sequence(vec![
                crate::frontend::NamedValue { name: "a".into(), value: one },
                crate::frontend::NamedValue { name: "b".into(), value: omit },
            ]),
        );
        unit.define_template("t", rec, TemplateKind::AnyValue);
        let (_, diags) = with_checker(&mut unit, |c| c.check_unit());
        assert!(diags.is_empty(), "{:?}", diags.items());
    }

    #[test]
    fn test_self_referencing_template() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        unit.define_template("t", int, TemplateKind::TemplateRefd(Reference::named("t")));
        let (_, diags) = with_checker(&mut unit, |c| c.check_unit());
        assert!(diags.contains("refers to itself"));
    }
}
