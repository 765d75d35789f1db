//! Value checking against a governing type

use std::collections::HashSet;

use super::{Expected, TypeChecker, ValueCheckingOptions, REAL_ASSOCIATED_TYPE};
use crate::frontend::ast::{AssignmentId, AssignmentKind, ScopeId, TypeId, ValueId};
use crate::frontend::{ChainLink, CharSymbol, MacroKind, Reference, ReferenceChain, SubReference, ValueKind};
use crate::types::{Asn1StringKind, FieldDescriptor, TypeKind};

const REAL_COMPONENTS: [&str; 3] = ["mantissa", "base", "exponent"];

impl<'a> TypeChecker<'a> {
    /// Follow value references to the value they finally denote.
    ///
    /// Unresolvable references are their own last value. A circular chain is
    /// reported and the values on it are marked erroneous.
    pub fn value_refd_last(&mut self, value: ValueId) -> ValueId {
        let mut chain = ReferenceChain::new("Circular reference in value");
        self.value_refd_last_in(value, None, &mut chain)
    }

    /// Names resolve in the scope of each value's governor, falling back to
    /// `scope` for values not checked yet
    fn value_refd_last_in(&mut self, value: ValueId, scope: Option<ScopeId>, chain: &mut ReferenceChain) -> ValueId {
        let mut current = value;
        let mut scope = scope;
        loop {
            let node = self.unit.value(current);
            if node.is_erroneous {
                return current;
            }
            scope = self.governor_scope(node.governor).or(scope);
            let reference = match &node.kind {
                ValueKind::Referenced(reference) => reference.clone(),
                _ => return current,
            };
            let location = node.location;
            if !chain.add(ChainLink::Value(current.0), &location, &mut *self.sink) {
                self.mark_value_erroneous(current);
                self.mark_value_erroneous(value);
                return current;
            }
            match self.referenced_value(&reference, scope, chain) {
                Some(next) => current = next,
                None => return current,
            }
        }
    }

    /// Value of the constant or module parameter `reference` names,
    /// navigated through its field sub-references
    fn referenced_value(
        &mut self,
        reference: &Reference,
        scope: Option<ScopeId>,
        chain: &mut ReferenceChain,
    ) -> Option<ValueId> {
        let name = &reference.id()?.name;
        let assignment = self.unit.resolve(scope, name)?;
        let (mut current, ty) = match self.unit.assignment(assignment).kind {
            AssignmentKind::Constant { value, ty } => (value, ty),
            AssignmentKind::ModulePar { value: Some(value), ty } => (value, ty),
            _ => return None,
        };
        let scope = self.unit.ty(ty).scope.or(scope);
        for subref in &reference.subrefs[1..] {
            let SubReference::Field { id } = subref else {
                return None;
            };
            current = self.value_refd_last_in(current, scope, chain);
            current = match &self.unit.value(current).kind {
                ValueKind::Sequence(items) => items.iter().find(|item| item.name == *id)?.value,
                ValueKind::Choice { alternative, value } if alternative == id => *value,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Turn a bare lower-case identifier into an enumeration item of `ty` or
    /// into a reference
    fn resolve_lower_identifier(&mut self, ty: TypeId, value: ValueId) {
        let ValueKind::UndefinedLowerIdentifier(id) = &self.unit.value(value).kind else {
            return;
        };
        let id = id.clone();
        let is_item = match self.type_refd_last(ty) {
            Some(last) => matches!(&self.unit.ty(last).kind, TypeKind::Enumerated(e) if e.has_item(&id.name)),
            None => false,
        };
        let location = self.unit.value(value).location;
        self.unit.value_mut(value).kind = if is_item {
            ValueKind::Enumerated(id)
        } else {
            ValueKind::Referenced(Reference {
                module: None,
                subrefs: vec![SubReference::Field { id }],
                location,
            })
        };
    }

    /// Check a referenced value: the reference must name a value whose type
    /// is compatible with `ty`. Returns whether it refers to `lhs`.
    pub fn check_this_value_ref(
        &mut self,
        ty: TypeId,
        value: ValueId,
        expected: Expected,
        lhs: Option<AssignmentId>,
    ) -> bool {
        let ValueKind::Referenced(reference) = &self.unit.value(value).kind else {
            return false;
        };
        let reference = reference.clone();
        let location = self.unit.value(value).location;
        let Some(name) = reference.id().map(|id| id.name.clone()) else {
            self.error(location, "Invalid value reference".to_string());
            self.mark_value_erroneous(value);
            return false;
        };
        let scope = self.unit.ty(ty).scope;
        let Some(assignment) = self.unit.resolve(scope, &name) else {
            self.error(location, format!("There is no local or imported definition with name `{}'", name));
            self.mark_value_erroneous(value);
            return false;
        };
        let self_reference = lhs == Some(assignment);

        let refd_type = match self.unit.assignment(assignment).kind {
            AssignmentKind::Constant { ty, .. } => ty,
            AssignmentKind::ModulePar { ty, .. } => {
                if expected == Expected::Constant {
                    self.error(
                        location,
                        format!("Reference to a constant value was expected instead of module parameter `{}'", name),
                    );
                    self.mark_value_erroneous(value);
                    return self_reference;
                }
                ty
            }
            AssignmentKind::Type(_) | AssignmentKind::Template { .. } => {
                let what = self.unit.assignment(assignment).describe();
                self.error(
                    location,
                    format!("Reference to a value was expected instead of {} `{}'", what, name),
                );
                self.mark_value_erroneous(value);
                return self_reference;
            }
        };

        let field_type = if reference.subrefs.len() > 1 {
            self.get_field_type(refd_type, &reference, 1, expected, false)
        } else {
            Some(refd_type)
        };
        match field_type {
            Some(found) => {
                if !self.is_compatible(ty, found) {
                    let expected_name = self.type_name(ty);
                    let found_name = self.type_name(found);
                    self.error(
                        location,
                        format!(
                            "Type mismatch: a value of type `{}' was expected instead of `{}'",
                            expected_name, found_name
                        ),
                    );
                    self.mark_value_erroneous(value);
                }
            }
            None => self.mark_value_erroneous(value),
        }
        self_reference
    }

    /// Check `value` against `ty`. Returns whether the value refers to the
    /// assignment `lhs` being defined.
    pub fn check_this_value(
        &mut self,
        ty: TypeId,
        value: ValueId,
        options: ValueCheckingOptions,
        lhs: Option<AssignmentId>,
    ) -> bool {
        {
            let timestamp = self.timestamp;
            let node = self.unit.value_mut(value);
            if node.governor == Some(ty) && !timestamp.is_newer_than(node.last_checked) {
                return false;
            }
            node.governor = Some(ty);
            node.last_checked = Some(timestamp);
        }
        self.check_type(ty);
        if self.unit.ty(ty).is_erroneous {
            return false;
        }
        self.resolve_lower_identifier(ty, value);

        let location = self.unit.value(value).location;
        let mut self_reference = false;
        match &self.unit.value(value).kind {
            ValueKind::Referenced(_) => {
                self_reference = self.check_this_value_ref(ty, value, options.expected, lhs);
            }
            ValueKind::Omit => {
                if !options.omit_allowed {
                    self.error(location, "`omit' value is not allowed in this context".to_string());
                    self.mark_value_erroneous(value);
                }
                return false;
            }
            ValueKind::NotUsed => {
                if !options.incomplete_allowed {
                    self.error(location, "Not used symbol `-' is not allowed in this context".to_string());
                    self.mark_value_erroneous(value);
                }
                return false;
            }
            _ => {}
        }

        let last = self.value_refd_last(value);
        if self.unit.value(last).is_erroneous || self.unit.value(value).is_erroneous {
            return self_reference;
        }
        if matches!(self.unit.value(value).kind, ValueKind::Referenced(_)) {
            // the definition was checked against its own type
            if options.sub_check {
                self.check_sub_type_value(ty, value);
            }
            return self_reference;
        }

        match &self.unit.ty(ty).kind {
            TypeKind::Boolean => {
                self.expect_kind(value, |k| matches!(k, ValueKind::Boolean(_)), "boolean value was expected");
            }
            TypeKind::Integer => {
                self.expect_kind(
                    value,
                    |k| matches!(k, ValueKind::Integer(_) | ValueKind::Macro(MacroKind::LineNumber)),
                    "integer value was expected",
                );
            }
            TypeKind::Float => self.check_float_value(ty, value),
            TypeKind::CharString => self.check_charstring_value(value, None),
            TypeKind::UniversalCharString => self.check_universal_value(value, None),
            TypeKind::Asn1String(kind) => {
                let kind = *kind;
                if kind.is_narrow() {
                    self.check_charstring_value(value, Some(kind));
                } else {
                    self.check_universal_value(value, Some(kind));
                }
            }
            TypeKind::Enumerated(_) => self.check_enumerated_value(ty, value),
            TypeKind::RecordSet(_) => {
                self_reference |= self.check_record_set_value(ty, value, options, lhs);
            }
            TypeKind::Union(_) => {
                self_reference |= self.check_union_value(ty, value, options, lhs);
            }
            TypeKind::Class(_) => {
                self.expect_kind(value, |_| false, "Reference to an object was expected, class types have no literal values");
            }
            TypeKind::Port(_) => {
                let type_name = self.type_name(ty);
                self.error(location, format!("Port type `{}' cannot have values", type_name));
                self.mark_value_erroneous(value);
            }
            TypeKind::Referenced(_) => {
                if let Some(target) = self.type_refd_last(ty).filter(|target| *target != ty) {
                    let delegated = ValueCheckingOptions { sub_check: false, ..options };
                    self_reference |= self.check_this_value(target, value, delegated, lhs);
                    self.unit.value_mut(value).governor = Some(ty);
                }
            }
        }

        if options.sub_check {
            self.check_sub_type_value(ty, value);
        }
        self_reference
    }

    /// Accept values of the expected kind and expressions; report the rest
    fn expect_kind(&mut self, value: ValueId, accepts: fn(&ValueKind) -> bool, message: &str) {
        let node = self.unit.value(value);
        if accepts(&node.kind) || matches!(node.kind, ValueKind::Expression { .. }) {
            return;
        }
        let location = node.location;
        self.error(location, message.to_string());
        self.mark_value_erroneous(value);
    }

    fn check_float_value(&mut self, ty: TypeId, value: ValueId) {
        let asn1 = self.unit.value(value).asn1 || self.unit.ty(ty).asn1;
        match &self.unit.value(value).kind {
            ValueKind::Real(_) | ValueKind::Expression { .. } => {}
            ValueKind::Integer(i) if asn1 => {
                let real = *i as f64;
                self.unit.value_mut(value).kind = ValueKind::Real(real);
            }
            ValueKind::Sequence(_) if asn1 => {
                self.check_real_sequence(value);
                self.unit.value_mut(value).governor = Some(ty);
            }
            _ => {
                let message = if asn1 { "REAL value was expected" } else { "float value was expected" };
                self.expect_kind(value, |_| false, message);
            }
        }
    }

    /// `{ mantissa m, base b, exponent e }` becomes the real it denotes
    fn check_real_sequence(&mut self, value: ValueId) {
        if let Some(assignment) = self.unit.resolve(None, REAL_ASSOCIATED_TYPE) {
            if let AssignmentKind::Type(real_type) = self.unit.assignment(assignment).kind {
                self.check_this_value(real_type, value, ValueCheckingOptions::constant(), None);
                if self.unit.value(value).is_erroneous {
                    return;
                }
            }
        }

        let ValueKind::Sequence(items) = self.unit.value(value).kind.clone() else {
            return;
        };
        let location = self.unit.value(value).location;
        let mut components: [Option<ValueId>; 3] = [None; 3];
        for item in &items {
            match REAL_COMPONENTS.iter().position(|c| *c == item.name.name) {
                Some(index) => components[index] = Some(item.value),
                None => {
                    self.error(item.name.location, format!("Invalid field `{}' in REAL value", item.name));
                    self.mark_value_erroneous(value);
                }
            }
        }

        let mut numbers = [0i64; 3];
        for (index, component) in components.iter().enumerate() {
            let Some(component) = *component else {
                self.error(
                    location,
                    format!("Field `{}' is missing from REAL value", REAL_COMPONENTS[index]),
                );
                self.mark_value_erroneous(value);
                return;
            };
            let last = self.value_refd_last(component);
            match self.unit.value(last).kind {
                ValueKind::Integer(n) => numbers[index] = n,
                _ => {
                    let component_location = self.unit.value(component).location;
                    self.error(
                        component_location,
                        format!("integer value was expected for the `{}' of a REAL value", REAL_COMPONENTS[index]),
                    );
                    self.mark_value_erroneous(value);
                    return;
                }
            }
        }
        if self.unit.value(value).is_erroneous {
            return;
        }

        let [mantissa, base, exponent] = numbers;
        if base != 2 && base != 10 {
            self.error(location, format!("The base of a REAL value must be 2 or 10, not {}", base));
            self.mark_value_erroneous(value);
            return;
        }
        let exponent = exponent.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let real = mantissa as f64 * (base as f64).powi(exponent);
        self.unit.value_mut(value).kind = ValueKind::Real(real);
    }

    /// ISO 646 strings, optionally of a restricted ASN.1 alphabet
    fn check_charstring_value(&mut self, value: ValueId, kind: Option<Asn1StringKind>) {
        let expected = match kind {
            Some(kind) => format!("{} value was expected", kind.keyword()),
            None => "charstring value was expected".to_string(),
        };
        let location = self.unit.value(value).location;
        let text = match &self.unit.value(value).kind {
            ValueKind::CharString(s) => s.clone(),
            ValueKind::Expression { .. } => return,
            ValueKind::Macro(m) if *m != MacroKind::LineNumber => return,
            ValueKind::UniversalCharString(s) if s.is_ascii() => s.clone(),
            ValueKind::CharSymbols(symbols) => match symbols_to_string(symbols) {
                Ok(s) if s.is_ascii() => s,
                Ok(s) => {
                    let offending = s.chars().find(|c| !c.is_ascii()).map(u32::from).unwrap_or_default();
                    self.error(
                        location,
                        format!("Character with code point {} cannot be used in a charstring value", offending),
                    );
                    self.mark_value_erroneous(value);
                    return;
                }
                Err(code_point) => {
                    self.error(location, format!("Invalid character code point {}", code_point));
                    self.mark_value_erroneous(value);
                    return;
                }
            },
            _ => {
                self.error(location, expected);
                self.mark_value_erroneous(value);
                return;
            }
        };

        if kind == Some(Asn1StringKind::NumericString) && !text.chars().all(|c| c.is_ascii_digit() || c == ' ') {
            self.error(location, "NumericString value can only contain digits and space".to_string());
            self.mark_value_erroneous(value);
            return;
        }
        self.unit.value_mut(value).kind = ValueKind::CharString(text);
    }

    fn check_universal_value(&mut self, value: ValueId, kind: Option<Asn1StringKind>) {
        let location = self.unit.value(value).location;
        let text = match &self.unit.value(value).kind {
            ValueKind::UniversalCharString(_) | ValueKind::Expression { .. } => return,
            ValueKind::Macro(m) if *m != MacroKind::LineNumber => return,
            ValueKind::CharString(s) => s.clone(),
            ValueKind::CharSymbols(symbols) => match symbols_to_string(symbols) {
                Ok(s) => s,
                Err(code_point) => {
                    self.error(location, format!("Invalid character code point {}", code_point));
                    self.mark_value_erroneous(value);
                    return;
                }
            },
            _ => {
                let message = match kind {
                    Some(kind) => format!("{} value was expected", kind.keyword()),
                    None => "universal charstring value was expected".to_string(),
                };
                self.error(location, message);
                self.mark_value_erroneous(value);
                return;
            }
        };
        self.unit.value_mut(value).kind = ValueKind::UniversalCharString(text);
    }

    fn check_enumerated_value(&mut self, ty: TypeId, value: ValueId) {
        let location = self.unit.value(value).location;
        let item = match &self.unit.value(value).kind {
            ValueKind::Enumerated(id) => id.clone(),
            ValueKind::Expression { .. } => return,
            _ => {
                self.error(location, "Enumerated value was expected".to_string());
                self.mark_value_erroneous(value);
                return;
            }
        };
        let known = matches!(&self.unit.ty(ty).kind, TypeKind::Enumerated(e) if e.has_item(&item.name));
        if !known {
            let type_name = self.type_name(ty);
            self.error(
                location,
                format!("`{}' is not a valid enumerated value for type `{}'", item, type_name),
            );
            self.mark_value_erroneous(value);
        }
    }

    fn check_record_set_value(
        &mut self,
        ty: TypeId,
        value: ValueId,
        options: ValueCheckingOptions,
        lhs: Option<AssignmentId>,
    ) -> bool {
        let keyword = self.unit.ty(ty).category().keyword();
        let location = self.unit.value(value).location;
        let items = match &self.unit.value(value).kind {
            ValueKind::Sequence(items) => items.clone(),
            ValueKind::Expression { .. } => return false,
            _ => {
                self.error(location, format!("{} value was expected", keyword));
                self.mark_value_erroneous(value);
                return false;
            }
        };
        let is_set = matches!(&self.unit.ty(ty).kind, TypeKind::RecordSet(r) if r.is_set);
        let fields: Vec<FieldDescriptor> = match self.unit.ty(ty).fields() {
            Some(fields) => fields.iter().cloned().collect(),
            None => Vec::new(),
        };
        let type_name = self.type_name(ty);

        let mut self_reference = false;
        let mut seen: HashSet<String> = HashSet::new();
        let mut previous: Option<usize> = None;
        for item in &items {
            if !seen.insert(item.name.name.clone()) {
                self.error(
                    item.name.location,
                    format!("Duplicate field `{}' in {} value", item.name, keyword),
                );
                continue;
            }
            let Some(index) = fields.iter().position(|f| f.name == item.name) else {
                self.error(
                    item.name.location,
                    format!(
                        "Reference to non-existent field `{}' in {} value for type `{}'",
                        item.name, keyword, type_name
                    ),
                );
                continue;
            };
            if !is_set {
                if let Some(prev) = previous.filter(|prev| index < *prev) {
                    self.error(
                        item.name.location,
                        format!(
                            "Field `{}' cannot appear after field `{}' in {} value",
                            item.name, fields[prev].name, keyword
                        ),
                    );
                }
                previous = Some(previous.map_or(index, |prev| prev.max(index)));
            }
            let field = &fields[index];
            let field_options = ValueCheckingOptions {
                omit_allowed: field.optional,
                str_elem: false,
                ..options
            };
            self_reference |= self.check_this_value(field.ty, item.value, field_options, lhs);
        }

        if !options.incomplete_allowed {
            for field in &fields {
                if seen.contains(&field.name.name) || (field.optional && options.implicit_omit) {
                    continue;
                }
                self.error(location, format!("Field `{}' is missing from {} value", field.name, keyword));
            }
        }
        self_reference
    }

    fn check_union_value(
        &mut self,
        ty: TypeId,
        value: ValueId,
        options: ValueCheckingOptions,
        lhs: Option<AssignmentId>,
    ) -> bool {
        let keyword = self.unit.ty(ty).category().keyword();
        let location = self.unit.value(value).location;
        let (alternative, inner) = match &self.unit.value(value).kind {
            ValueKind::Choice { alternative, value } => (alternative.clone(), *value),
            ValueKind::Sequence(items) if items.len() == 1 => {
                let (alternative, inner) = (items[0].name.clone(), items[0].value);
                self.unit.value_mut(value).kind = ValueKind::Choice {
                    alternative: alternative.clone(),
                    value: inner,
                };
                (alternative, inner)
            }
            ValueKind::Sequence(_) => {
                self.error(
                    location,
                    format!("A {} value must have exactly one selected alternative", keyword),
                );
                self.mark_value_erroneous(value);
                return false;
            }
            ValueKind::Expression { .. } => return false,
            _ => {
                self.error(location, format!("{} value was expected", keyword));
                self.mark_value_erroneous(value);
                return false;
            }
        };

        let field = self.unit.ty(ty).fields().and_then(|f| f.get(&alternative.name)).cloned();
        let Some(field) = field else {
            let type_name = self.type_name(ty);
            self.error(
                alternative.location,
                format!(
                    "Reference to non-existent alternative `{}' in {} value for type `{}'",
                    alternative, keyword, type_name
                ),
            );
            self.mark_value_erroneous(value);
            return false;
        };
        let alternative_options = ValueCheckingOptions {
            omit_allowed: false,
            incomplete_allowed: false,
            ..options
        };
        self.check_this_value(field.ty, inner, alternative_options, lhs)
    }
}

/// Concatenate the pieces of an ASN.1 character string literal; fails with
/// the first code point that is not a character
fn symbols_to_string(symbols: &[CharSymbol]) -> Result<String, u32> {
    let mut text = String::new();
    for symbol in symbols {
        match symbol {
            CharSymbol::Text(s) => text.push_str(s),
            other => {
                let code_point = other.code_point().unwrap_or_default();
                text.push(char::from_u32(code_point).ok_or(code_point)?);
            }
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Expected, ValueCheckingOptions};
    use super::symbols_to_string;
    use crate::frontend::{AssignmentKind, CharSymbol, CompilationUnit, NamedValue, Reference, ValueKind};
    use crate::frontend::Identifier;
    use crate::types::{
        Asn1StringKind, EnumItem, EnumeratedType, FieldDescriptor, Restriction, SubTypeConstraint, TypeKind,
    };
    use pretty_assertions::assert_eq;

    fn named(name: &str, value: crate::frontend::ValueId) -> NamedValue {
        NamedValue { name: Identifier::new(name), value }
    }

    #[test]
    fn test_literal_kind_mismatches() {
        let mut unit = CompilationUnit::new("M");
        let b = unit.define_type("B", TypeKind::Boolean);
        let f = unit.define_type("F", TypeKind::Float);
        let s = unit.define_type("S", TypeKind::CharString);
        let v1 = unit.add_value(ValueKind::Integer(1));
        let v2 = unit.add_value(ValueKind::Integer(1));
        let v3 = unit.add_value(ValueKind::Boolean(true));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(b, v1, ValueCheckingOptions::constant(), None);
            c.check_this_value(f, v2, ValueCheckingOptions::constant(), None);
            c.check_this_value(s, v3, ValueCheckingOptions::constant(), None);
        });
        assert!(diags.contains("boolean value was expected"));
        assert!(diags.contains("float value was expected"));
        assert!(diags.contains("charstring value was expected"));
        assert!(unit.value(v1).is_erroneous);
        assert!(unit.value(v3).is_erroneous);
    }

    #[test]
    fn test_asn1_integer_coerces_to_real() {
        let mut unit = CompilationUnit::new("M");
        unit.asn1 = true;
        let real = unit.define_type("R", TypeKind::Float);
        let v = unit.add_value(ValueKind::Integer(3));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(real, v, ValueCheckingOptions::constant(), None)
        });
        assert!(diags.is_empty());
        assert!(matches!(unit.value(v).kind, ValueKind::Real(r) if r == 3.0));
    }

    #[test]
    fn test_asn1_real_sequence_coercion() {
        let mut unit = CompilationUnit::new("M");
        unit.asn1 = true;
        let real = unit.define_type("R", TypeKind::Float);
        let m = unit.add_value(ValueKind::Integer(5));
        let b = unit.add_value(ValueKind::Integer(10));
        let e = unit.add_value(ValueKind::Integer(2));
        let v = unit.add_value(ValueKind::Sequence(vec![
            named("mantissa", m),
            named("base", b),
            named("exponent", e),
        ]));
        let bad_base = unit.add_value(ValueKind::Integer(3));
        let m2 = unit.add_value(ValueKind::Integer(1));
        let e2 = unit.add_value(ValueKind::Integer(1));
        let w = unit.add_value(ValueKind::Sequence(vec![
            named("mantissa", m2),
            named("base", bad_base),
            named("exponent", e2),
        ]));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(real, v, ValueCheckingOptions::constant(), None);
            c.check_this_value(real, w, ValueCheckingOptions::constant(), None);
        });
        assert!(matches!(unit.value(v).kind, ValueKind::Real(r) if r == 500.0));
        assert_eq!(diags.error_count(), 1);
        assert!(diags.contains("must be 2 or 10"));
    }

    #[test]
    fn test_char_symbols_coercion() {
        let mut unit = CompilationUnit::new("M");
        unit.asn1 = true;
        let ia5 = unit.define_type("A", TypeKind::Asn1String(Asn1StringKind::IA5String));
        let utf8 = unit.define_type("U", TypeKind::Asn1String(Asn1StringKind::Utf8String));
        let narrow = unit.add_value(ValueKind::CharSymbols(vec![
            CharSymbol::Text("ab".into()),
            CharSymbol::Tuple { column: 4, row: 3 },
        ]));
        let wide = unit.add_value(ValueKind::CharSymbols(vec![CharSymbol::Quadruple {
            group: 0,
            plane: 0,
            row: 1,
            cell: 0x11,
        }]));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(ia5, narrow, ValueCheckingOptions::constant(), None);
            c.check_this_value(utf8, wide, ValueCheckingOptions::constant(), None);
        });
        assert!(diags.is_empty(), "{:?}", diags.items());
        assert!(matches!(&unit.value(narrow).kind, ValueKind::CharString(s) if s == "abC"));
        assert!(matches!(&unit.value(wide).kind, ValueKind::UniversalCharString(s) if s == "\u{111}"));
    }

    #[test]
    fn test_charstring_widens_to_universal() {
        let mut unit = CompilationUnit::new("M");
        let ucs = unit.define_type("U", TypeKind::UniversalCharString);
        let v = unit.add_value(ValueKind::CharString("x".into()));
        with_checker(&mut unit, |c| c.check_this_value(ucs, v, ValueCheckingOptions::constant(), None));
        assert!(matches!(&unit.value(v).kind, ValueKind::UniversalCharString(s) if s == "x"));
    }

    #[test]
    fn test_lower_identifier_becomes_enum_item_or_reference() {
        let mut unit = CompilationUnit::new("M");
        let e = unit.define_type(
            "Color",
            TypeKind::Enumerated(EnumeratedType::new(vec![EnumItem::new("red", None), EnumItem::new("blue", None)])),
        );
        let item = unit.add_value(ValueKind::UndefinedLowerIdentifier(Identifier::new("red")));
        let (_, other) = unit.define_constant("green", e, ValueKind::UndefinedLowerIdentifier(Identifier::new("blue")));
        let reference = unit.add_value(ValueKind::UndefinedLowerIdentifier(Identifier::new("green")));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(e, item, ValueCheckingOptions::constant(), None);
            c.check_this_value(e, other, ValueCheckingOptions::constant(), None);
            c.check_this_value(e, reference, ValueCheckingOptions::constant(), None);
        });
        assert!(diags.is_empty(), "{:?}", diags.items());
        assert!(matches!(&unit.value(item).kind, ValueKind::Enumerated(id) if id.name == "red"));
        assert!(matches!(&unit.value(reference).kind, ValueKind::Referenced(_)));
    }

    #[test]
    fn test_reference_type_mismatch() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        let cs = unit.define_type("S", TypeKind::CharString);
        unit.define_constant("text", cs, ValueKind::CharString("a".into()));
        let v = unit.add_value(ValueKind::Referenced(Reference::named("text")));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(int, v, ValueCheckingOptions::constant(), None)
        });
        assert!(diags.contains("Type mismatch: a value of type `I' was expected instead of `S'"));
    }

    #[test]
    fn test_reference_to_field_of_constant() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        let field_ty = unit.reference_type("I");
        let rec = record(&mut unit, "R", vec![FieldDescriptor::new("a", field_ty)]);
        let seven = unit.add_value(ValueKind::Integer(7));
        unit.define_constant("c", rec, ValueKind::Sequence(vec![named("a", seven)]));
        let v = unit.add_value(ValueKind::Referenced(Reference::with_fields("c", &["a"])));
        let (last, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(int, v, ValueCheckingOptions::constant(), None);
            c.value_refd_last(v)
        });
        assert!(diags.is_empty(), "{:?}", diags.items());
        assert_eq!(last, seven);
    }

    #[test]
    fn test_reference_resolves_in_nested_scope() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        unit.ty_mut(int).sub_type = Some(SubTypeConstraint::new(vec![Restriction::IntegerRange {
            min: Some(0),
            max: Some(10),
        }]));
        let (_, hundred) = unit.define_constant("lim", int, ValueKind::Integer(100));
        let inner = nest_in_scope(&mut unit, &["lim"]);
        unit.ty_mut(int).scope = Some(inner);
        assert_eq!(unit.resolve(None, "lim"), None);

        let v = unit.add_value(ValueKind::Referenced(Reference::named("lim")));
        let w = unit.add_value(ValueKind::Referenced(Reference::named("lim")));
        unit.value_mut(w).governor = Some(int);
        let (last, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(int, v, ValueCheckingOptions::constant(), None);
            c.value_refd_last(w)
        });
        assert_eq!(last, hundred);
        assert!(diags.contains("100 is not a valid value for type `I' which has subtype (0..10)"));
        assert!(unit.value(v).is_erroneous);
    }

    #[test]
    fn test_circular_value_reference() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        let (_, a) = unit.define_constant("a", int, ValueKind::Referenced(Reference::named("b")));
        unit.define_constant("b", int, ValueKind::Referenced(Reference::named("a")));
        let (_, diags) = with_checker(&mut unit, |c| c.value_refd_last(a));
        assert!(diags.contains("Circular reference in value"));
        assert!(unit.value(a).is_erroneous);
    }

    #[test]
    fn test_module_parameter_is_not_a_constant() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        unit.add_assignment("par", AssignmentKind::ModulePar { ty: int, value: None });
        let v = unit.add_value(ValueKind::Referenced(Reference::named("par")));
        let w = unit.add_value(ValueKind::Referenced(Reference::named("par")));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(int, v, ValueCheckingOptions::constant(), None);
            c.check_this_value(int, w, ValueCheckingOptions::new(Expected::DynamicValue), None);
        });
        assert_eq!(diags.error_count(), 1);
        assert!(diags.contains("instead of module parameter `par'"));
    }

    #[test]
    fn test_record_value_structure() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let int2 = unit.add_type(TypeKind::Integer);
        let rec = record(
            &mut unit,
            "R",
            vec![FieldDescriptor::new("a", int), FieldDescriptor::new("b", int2).optional()],
        );
        let one = unit.add_value(ValueKind::Integer(1));
        let two = unit.add_value(ValueKind::Integer(2));
        let three = unit.add_value(ValueKind::Integer(3));
        let out_of_order = unit.add_value(ValueKind::Sequence(vec![named("b", one), named("a", two)]));
        let unknown = unit.add_value(ValueKind::Sequence(vec![named("a", three), named("z", three)]));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(rec, out_of_order, ValueCheckingOptions::constant(), None);
            c.check_this_value(rec, unknown, ValueCheckingOptions::constant().implicit_omit(true), None);
        });
        assert!(diags.contains("Field `a' cannot appear after field `b'"));
        assert!(diags.contains("Reference to non-existent field `z'"));
        assert!(!diags.contains("missing"));
    }

    #[test]
    fn test_mandatory_field_cannot_be_omitted() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let rec = record(&mut unit, "R", vec![FieldDescriptor::new("a", int)]);
        let omit = unit.add_value(ValueKind::Omit);
        let v = unit.add_value(ValueKind::Sequence(vec![named("a", omit)]));
        let empty = unit.add_value(ValueKind::Sequence(vec![]));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(rec, v, ValueCheckingOptions::constant(), None);
            c.check_this_value(rec, empty, ValueCheckingOptions::constant(), None);
        });
        assert!(diags.contains("`omit' value is not allowed"));
        assert!(diags.contains("Field `a' is missing from record value"));
    }

    #[test]
    fn test_union_value_alternatives() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let u = union(&mut unit, "U", vec![FieldDescriptor::new("i", int)]);
        let one = unit.add_value(ValueKind::Integer(1));
        let ok = unit.add_value(ValueKind::Sequence(vec![named("i", one)]));
        let bad = unit.add_value(ValueKind::Choice { alternative: Identifier::new("x"), value: one });
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_value(u, ok, ValueCheckingOptions::constant(), None);
            c.check_this_value(u, bad, ValueCheckingOptions::constant(), None);
        });
        assert!(matches!(unit.value(ok).kind, ValueKind::Choice { .. }));
        assert_eq!(diags.error_count(), 1);
        assert!(diags.contains("non-existent alternative `x'"));
    }

    #[test]
    fn test_symbols_to_string_rejects_surrogates() {
        let surrogate = CharSymbol::Quadruple { group: 0, plane: 0, row: 0xD8, cell: 0 };
        assert_eq!(symbols_to_string(&[surrogate]), Err(0xD800));
    }
}
