//! Template checking against a governing type
//!
//! Every category lists the template kinds it accepts in an exhaustive match.
//! Value-shaped kinds (specific values, references, lists, `?`, `*`, `omit`)
//! go through [`TypeChecker::check_generic_template`].

use std::collections::HashSet;

use super::{Expected, TypeChecker, ValueCheckingOptions};
use crate::frontend::ast::{AssignmentId, AssignmentKind, TemplateId, TypeId, ValueId};
use crate::frontend::{
    ChainLink, DecodeMatch, LengthRestriction, NamedTemplate, PatternKind, PatternTemplate, RangeBound, Reference,
    ReferenceChain, TemplateKind, ValueKind, ValueRange,
};
use crate::types::{FieldDescriptor, TypeKind};

/// String encodings a universal charstring `decmatch` may name
pub const STRING_ENCODINGS: &[&str] = &["UTF-8", "UTF-16", "UTF-16LE", "UTF-16BE", "UTF-32", "UTF-32LE", "UTF-32BE"];

/// Checked end of a value range
#[derive(Debug, Clone, Copy, PartialEq)]
enum Boundary {
    Infinite,
    Integer(i64),
    Real(f64),
    Char(char),
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infinite => f.write_str("infinity"),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Real(r) => write!(f, "{:?}", r),
            Self::Char(c) => write!(f, "\"{}\"", c),
        }
    }
}

fn is_inverted(lower: Boundary, upper: Boundary) -> bool {
    match (lower, upper) {
        (Boundary::Integer(l), Boundary::Integer(u)) => l > u,
        (Boundary::Real(l), Boundary::Real(u)) => l > u,
        (Boundary::Char(l), Boundary::Char(u)) => l > u,
        _ => false,
    }
}

fn capitalized(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl<'a> TypeChecker<'a> {
    /// Check `template` against `ty`. Returns whether the template refers to
    /// the assignment `lhs` being defined.
    pub fn check_this_template(
        &mut self,
        ty: TypeId,
        template: TemplateId,
        is_modified: bool,
        implicit_omit: bool,
        lhs: Option<AssignmentId>,
    ) -> bool {
        {
            let timestamp = self.timestamp;
            let node = self.unit.template_mut(template);
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

        let kind = self.unit.template(template).kind.clone();
        match &self.unit.ty(ty).kind {
            TypeKind::Boolean | TypeKind::Enumerated(_) => {
                let self_reference = match &kind {
                    TemplateKind::ValueRange(_)
                    | TemplateKind::Pattern(_)
                    | TemplateKind::DecodeMatch(_)
                    | TemplateKind::NamedTemplateList(_) => {
                        self.template_not_allowed(ty, template, &kind);
                        false
                    }
                    _ => self.check_generic_template(ty, template, &kind, is_modified, implicit_omit, lhs),
                };
                self.check_length_restriction(ty, template, false);
                self_reference
            }
            TypeKind::Integer | TypeKind::Float => {
                let self_reference = match &kind {
                    TemplateKind::ValueRange(range) => self.check_numeric_range(ty, template, range, lhs),
                    TemplateKind::Pattern(_) | TemplateKind::DecodeMatch(_) | TemplateKind::NamedTemplateList(_) => {
                        self.template_not_allowed(ty, template, &kind);
                        false
                    }
                    _ => self.check_generic_template(ty, template, &kind, is_modified, implicit_omit, lhs),
                };
                self.check_length_restriction(ty, template, false);
                self_reference
            }
            TypeKind::CharString => self.check_string_template(ty, template, &kind, false, is_modified, implicit_omit, lhs),
            TypeKind::UniversalCharString => {
                self.check_string_template(ty, template, &kind, true, is_modified, implicit_omit, lhs)
            }
            TypeKind::Asn1String(string_kind) => {
                let universal = !string_kind.is_narrow();
                self.check_string_template(ty, template, &kind, universal, is_modified, implicit_omit, lhs)
            }
            TypeKind::RecordSet(_) => self.check_record_set_template(ty, template, &kind, is_modified, implicit_omit, lhs),
            TypeKind::Union(_) => self.check_union_template(ty, template, &kind, is_modified, implicit_omit, lhs),
            TypeKind::Class(_) => {
                let self_reference = match &kind {
                    TemplateKind::SpecificValue(_)
                    | TemplateKind::TemplateRefd(_)
                    | TemplateKind::AnyValue
                    | TemplateKind::AnyOrOmit
                    | TemplateKind::Omit => {
                        self.check_generic_template(ty, template, &kind, is_modified, implicit_omit, lhs)
                    }
                    TemplateKind::ValueList(_)
                    | TemplateKind::ComplementedList(_)
                    | TemplateKind::ValueRange(_)
                    | TemplateKind::Pattern(_)
                    | TemplateKind::DecodeMatch(_)
                    | TemplateKind::NamedTemplateList(_) => {
                        self.template_not_allowed(ty, template, &kind);
                        false
                    }
                };
                self.check_length_restriction(ty, template, false);
                self_reference
            }
            TypeKind::Port(_) => {
                self.template_not_allowed(ty, template, &kind);
                false
            }
            TypeKind::Referenced(_) => match self.type_refd_last(ty).filter(|target| *target != ty) {
                Some(target) => {
                    let self_reference = self.check_this_template(target, template, is_modified, implicit_omit, lhs);
                    self.unit.template_mut(template).governor = Some(ty);
                    self_reference
                }
                None => false,
            },
        }
    }

    /// Kinds every category except ports accepts the same way
    fn check_generic_template(
        &mut self,
        ty: TypeId,
        template: TemplateId,
        kind: &TemplateKind,
        is_modified: bool,
        implicit_omit: bool,
        lhs: Option<AssignmentId>,
    ) -> bool {
        match kind {
            TemplateKind::SpecificValue(value) => {
                let options = ValueCheckingOptions::new(Expected::Template)
                    .incomplete_allowed(is_modified)
                    .implicit_omit(implicit_omit);
                self.check_this_value(ty, *value, options, lhs)
            }
            TemplateKind::TemplateRefd(reference) => self.check_this_template_ref(ty, template, reference, lhs),
            TemplateKind::ValueList(items) | TemplateKind::ComplementedList(items) => {
                let mut self_reference = false;
                for item in items {
                    self_reference |= self.check_this_template(ty, *item, false, implicit_omit, lhs);
                }
                self_reference
            }
            TemplateKind::AnyValue | TemplateKind::AnyOrOmit | TemplateKind::Omit => false,
            TemplateKind::ValueRange(_)
            | TemplateKind::Pattern(_)
            | TemplateKind::DecodeMatch(_)
            | TemplateKind::NamedTemplateList(_) => {
                self.template_not_allowed(ty, template, kind);
                false
            }
        }
    }

    fn template_not_allowed(&mut self, ty: TypeId, template: TemplateId, kind: &TemplateKind) {
        let type_name = self.type_name(ty);
        let location = self.unit.template(template).location;
        self.error(
            location,
            format!("{} cannot be used for type `{}'", capitalized(kind.describe()), type_name),
        );
        self.mark_template_erroneous(template);
    }

    /// A reference to a template, constant or module parameter of a
    /// compatible type
    fn check_this_template_ref(
        &mut self,
        ty: TypeId,
        template: TemplateId,
        reference: &Reference,
        lhs: Option<AssignmentId>,
    ) -> bool {
        let location = self.unit.template(template).location;
        let Some(name) = reference.id().map(|id| id.name.clone()) else {
            self.error(location, "Invalid template reference".to_string());
            self.mark_template_erroneous(template);
            return false;
        };
        let scope = self.unit.ty(ty).scope;
        let Some(assignment) = self.unit.resolve(scope, &name) else {
            self.error(location, format!("There is no local or imported definition with name `{}'", name));
            self.mark_template_erroneous(template);
            return false;
        };
        let self_reference = lhs == Some(assignment);

        let refd_type = match self.unit.assignment(assignment).kind {
            AssignmentKind::Template { ty, .. }
            | AssignmentKind::Constant { ty, .. }
            | AssignmentKind::ModulePar { ty, .. } => ty,
            AssignmentKind::Type(_) => {
                self.error(
                    location,
                    format!("Reference to a value or template was expected instead of type `{}'", name),
                );
                self.mark_template_erroneous(template);
                return self_reference;
            }
        };
        let field_type = if reference.subrefs.len() > 1 {
            self.get_field_type(refd_type, reference, 1, Expected::Template, false)
        } else {
            Some(refd_type)
        };
        let Some(found) = field_type else {
            self.mark_template_erroneous(template);
            return self_reference;
        };
        if !self.is_compatible(ty, found) {
            let expected_name = self.type_name(ty);
            let found_name = self.type_name(found);
            self.error(
                location,
                format!(
                    "Type mismatch: a value or template of type `{}' was expected instead of `{}'",
                    expected_name, found_name
                ),
            );
            self.mark_template_erroneous(template);
        }
        if !self_reference {
            self.template_refd_last(template);
        }
        self_reference
    }

    /// Follow template references to the template they finally denote
    pub fn template_refd_last(&mut self, template: TemplateId) -> TemplateId {
        let mut chain = ReferenceChain::new("Circular reference in template");
        let mut current = template;
        let mut scope = None;
        loop {
            let node = self.unit.template(current);
            if node.is_erroneous {
                return current;
            }
            scope = self.governor_scope(node.governor).or(scope);
            let TemplateKind::TemplateRefd(reference) = &node.kind else {
                return current;
            };
            let Some(name) = reference.id().map(|id| id.name.clone()) else {
                return current;
            };
            let location = node.location;
            if !chain.add(ChainLink::Template(current.0), &location, &mut *self.sink) {
                self.mark_template_erroneous(current);
                self.mark_template_erroneous(template);
                return current;
            }
            let next = match self.unit.resolve(scope, &name).map(|a| &self.unit.assignment(a).kind) {
                Some(AssignmentKind::Template { template: next, ty }) if reference.subrefs.len() == 1 => (*next, *ty),
                _ => return current,
            };
            scope = self.unit.ty(next.1).scope.or(scope);
            current = next.0;
        }
    }

    // ==================== Ranges ====================

    fn infinite_boundary(&mut self, template: TemplateId, negative: bool, is_lower: bool) -> Option<Boundary> {
        let location = self.unit.template(template).location;
        if is_lower && !negative {
            self.error(location, "`+infinity' cannot be lower boundary".to_string());
        } else if !is_lower && negative {
            self.error(location, "`-infinity' cannot be upper boundary".to_string());
        } else {
            return Some(Boundary::Infinite);
        }
        self.mark_template_erroneous(template);
        None
    }

    fn numeric_boundary(
        &mut self,
        ty: TypeId,
        template: TemplateId,
        bound: &RangeBound,
        is_lower: bool,
        lhs: Option<AssignmentId>,
        self_reference: &mut bool,
    ) -> Option<Boundary> {
        let value = match bound {
            RangeBound::Infinity { negative } => return self.infinite_boundary(template, *negative, is_lower),
            RangeBound::Value(value) => *value,
        };
        let last = self.value_refd_last(value);
        if let ValueKind::Real(r) = self.unit.value(last).kind {
            if r.is_infinite() {
                return self.infinite_boundary(template, r < 0.0, is_lower);
            }
        }
        *self_reference |= self.check_this_value(ty, value, ValueCheckingOptions::new(Expected::DynamicValue), lhs);
        let last = self.value_refd_last(value);
        if self.unit.value(value).is_erroneous || self.unit.value(last).is_erroneous {
            return None;
        }
        match self.unit.value(last).kind {
            ValueKind::Integer(n) => Some(Boundary::Integer(n)),
            ValueKind::Real(r) => Some(Boundary::Real(r)),
            _ => None,
        }
    }

    fn check_numeric_range(
        &mut self,
        ty: TypeId,
        template: TemplateId,
        range: &ValueRange,
        lhs: Option<AssignmentId>,
    ) -> bool {
        let mut self_reference = false;
        let lower = self.numeric_boundary(ty, template, &range.min, true, lhs, &mut self_reference);
        let upper = self.numeric_boundary(ty, template, &range.max, false, lhs, &mut self_reference);
        self.check_range_order(template, lower, upper);
        self_reference
    }

    fn check_range_order(&mut self, template: TemplateId, lower: Option<Boundary>, upper: Option<Boundary>) {
        if let (Some(lower), Some(upper)) = (lower, upper) {
            if is_inverted(lower, upper) {
                let location = self.unit.template(template).location;
                self.error(
                    location,
                    format!(
                        "Value range with incorrect boundaries: the lower boundary ({}) is higher than the upper boundary ({})",
                        lower, upper
                    ),
                );
                self.mark_template_erroneous(template);
            }
        }
    }

    fn char_boundary(
        &mut self,
        ty: TypeId,
        template: TemplateId,
        bound: &RangeBound,
        is_lower: bool,
        lhs: Option<AssignmentId>,
        self_reference: &mut bool,
    ) -> Option<Boundary> {
        let which = if is_lower { "lower" } else { "upper" };
        let location = self.unit.template(template).location;
        let value = match bound {
            RangeBound::Infinity { .. } => {
                self.error(
                    location,
                    format!("The {} boundary of a character string range cannot be infinity", which),
                );
                self.mark_template_erroneous(template);
                return None;
            }
            RangeBound::Value(value) => *value,
        };
        *self_reference |= self.check_this_value(ty, value, ValueCheckingOptions::new(Expected::DynamicValue), lhs);
        let last = self.value_refd_last(value);
        if self.unit.value(value).is_erroneous || self.unit.value(last).is_erroneous {
            return None;
        }
        let text = match &self.unit.value(last).kind {
            ValueKind::CharString(s) | ValueKind::UniversalCharString(s) => s.clone(),
            _ => return None,
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Boundary::Char(c)),
            _ => {
                self.error(
                    location,
                    format!(
                        "The {} boundary of a character string range must be a single character, not \"{}\"",
                        which, text
                    ),
                );
                self.mark_template_erroneous(template);
                None
            }
        }
    }

    // ==================== Strings ====================

    #[allow(clippy::too_many_arguments)]
    fn check_string_template(
        &mut self,
        ty: TypeId,
        template: TemplateId,
        kind: &TemplateKind,
        universal: bool,
        is_modified: bool,
        implicit_omit: bool,
        lhs: Option<AssignmentId>,
    ) -> bool {
        let self_reference = match kind {
            TemplateKind::ValueRange(range) => {
                let mut self_reference = false;
                let lower = self.char_boundary(ty, template, &range.min, true, lhs, &mut self_reference);
                let upper = self.char_boundary(ty, template, &range.max, false, lhs, &mut self_reference);
                self.check_range_order(template, lower, upper);
                self_reference
            }
            TemplateKind::Pattern(pattern) => {
                self.check_pattern(template, pattern, universal);
                false
            }
            TemplateKind::DecodeMatch(decode) => self.check_decode_match(template, decode, universal, lhs),
            TemplateKind::NamedTemplateList(_) => {
                self.template_not_allowed(ty, template, kind);
                false
            }
            TemplateKind::SpecificValue(_)
            | TemplateKind::TemplateRefd(_)
            | TemplateKind::ValueList(_)
            | TemplateKind::ComplementedList(_)
            | TemplateKind::AnyValue
            | TemplateKind::AnyOrOmit
            | TemplateKind::Omit => self.check_generic_template(ty, template, kind, is_modified, implicit_omit, lhs),
        };
        self.check_length_restriction(ty, template, true);
        self_reference
    }

    fn check_pattern(&mut self, template: TemplateId, pattern: &PatternTemplate, universal: bool) {
        if !universal && pattern.text.contains("\\q") {
            let location = self.unit.template(template).location;
            self.error(
                location,
                "Universal character quadruples cannot be used in a charstring pattern".to_string(),
            );
            self.mark_template_erroneous(template);
            return;
        }
        let kind = if universal {
            PatternKind::UniversalCharString
        } else {
            PatternKind::CharString
        };
        if let TemplateKind::Pattern(pattern) = &mut self.unit.template_mut(template).kind {
            pattern.kind = kind;
        }
    }

    fn check_decode_match(
        &mut self,
        template: TemplateId,
        decode: &DecodeMatch,
        universal: bool,
        lhs: Option<AssignmentId>,
    ) -> bool {
        self.check_type(decode.target_type);
        let self_reference = self.check_this_template(decode.target_type, decode.target, false, false, lhs);

        let Some(encoding) = decode.encoding else {
            return self_reference;
        };
        let location = self.unit.value(encoding).location;
        if !universal {
            self.error(
                location,
                "The string encoding parameter can only be used with universal charstring templates".to_string(),
            );
            self.mark_template_erroneous(template);
            return self_reference;
        }
        let last = self.value_refd_last(encoding);
        match &self.unit.value(last).kind {
            ValueKind::CharString(s) if STRING_ENCODINGS.contains(&s.as_str()) => {}
            ValueKind::Expression { .. } | ValueKind::Referenced(_) => {}
            ValueKind::CharString(s) => {
                let message = format!(
                    "`{}' is not a valid string encoding, expected one of {}",
                    s,
                    STRING_ENCODINGS.join(", ")
                );
                self.error(location, message);
                self.mark_template_erroneous(template);
            }
            _ => {
                self.error(location, "charstring value was expected as string encoding".to_string());
                self.mark_template_erroneous(template);
            }
        }
        self_reference
    }

    /// Length restrictions: non-negative integers with ordered bounds, on
    /// types that allow them
    fn check_length_restriction(&mut self, ty: TypeId, template: TemplateId, allowed: bool) {
        let Some(restriction) = self.unit.template(template).length_restriction.clone() else {
            return;
        };
        let location = self.unit.template(template).location;
        if !allowed {
            let type_name = self.type_name(ty);
            self.error(location, format!("Length restriction is not allowed for type `{}'", type_name));
            self.mark_template_erroneous(template);
            return;
        }
        match restriction {
            LengthRestriction::Single(value) => {
                self.length_boundary(template, value);
            }
            LengthRestriction::Range { lower, upper } => {
                let lower = self.length_boundary(template, lower);
                let upper = upper.and_then(|upper| self.length_boundary(template, upper));
                if let (Some(lower), Some(upper)) = (lower, upper) {
                    if upper < lower {
                        self.error(
                            location,
                            format!(
                                "The upper boundary of the length restriction ({}) cannot be smaller than the lower boundary ({})",
                                upper, lower
                            ),
                        );
                        self.mark_template_erroneous(template);
                    }
                }
            }
        }
    }

    fn length_boundary(&mut self, template: TemplateId, value: ValueId) -> Option<i64> {
        let last = self.value_refd_last(value);
        let location = self.unit.value(value).location;
        match self.unit.value(last).kind {
            ValueKind::Integer(n) if n >= 0 => Some(n),
            ValueKind::Integer(n) => {
                self.error(
                    location,
                    format!("A non-negative integer value was expected as length restriction instead of {}", n),
                );
                self.mark_template_erroneous(template);
                None
            }
            ValueKind::Expression { .. } | ValueKind::Referenced(_) => None,
            _ => {
                self.error(location, "integer value was expected as length restriction".to_string());
                self.mark_template_erroneous(template);
                None
            }
        }
    }

    // ==================== Structured types ====================

    fn check_record_set_template(
        &mut self,
        ty: TypeId,
        template: TemplateId,
        kind: &TemplateKind,
        is_modified: bool,
        implicit_omit: bool,
        lhs: Option<AssignmentId>,
    ) -> bool {
        let self_reference = match kind {
            TemplateKind::NamedTemplateList(items) => {
                self.check_record_set_fields(ty, template, items, is_modified, implicit_omit, lhs)
            }
            TemplateKind::ValueRange(_) | TemplateKind::Pattern(_) | TemplateKind::DecodeMatch(_) => {
                self.template_not_allowed(ty, template, kind);
                false
            }
            TemplateKind::SpecificValue(_)
            | TemplateKind::TemplateRefd(_)
            | TemplateKind::ValueList(_)
            | TemplateKind::ComplementedList(_)
            | TemplateKind::AnyValue
            | TemplateKind::AnyOrOmit
            | TemplateKind::Omit => self.check_generic_template(ty, template, kind, is_modified, implicit_omit, lhs),
        };
        self.check_length_restriction(ty, template, false);
        self_reference
    }

    fn check_record_set_fields(
        &mut self,
        ty: TypeId,
        template: TemplateId,
        items: &[NamedTemplate],
        is_modified: bool,
        implicit_omit: bool,
        lhs: Option<AssignmentId>,
    ) -> bool {
        let keyword = self.unit.ty(ty).category().keyword();
        let type_name = self.type_name(ty);
        let is_set = matches!(&self.unit.ty(ty).kind, TypeKind::RecordSet(r) if r.is_set);
        let fields: Vec<FieldDescriptor> = match self.unit.ty(ty).fields() {
            Some(fields) => fields.iter().cloned().collect(),
            None => Vec::new(),
        };

        let mut self_reference = false;
        let mut seen: HashSet<String> = HashSet::new();
        let mut previous: Option<usize> = None;
        for item in items {
            if !seen.insert(item.name.name.clone()) {
                self.error(
                    item.name.location,
                    format!("Duplicate field `{}' in {} template", item.name, keyword),
                );
                continue;
            }
            let Some(index) = fields.iter().position(|f| f.name == item.name) else {
                self.error(
                    item.name.location,
                    format!(
                        "Reference to non-existent field `{}' in {} template for type `{}'",
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
                            "Field `{}' cannot appear after field `{}' in {} template",
                            item.name, fields[prev].name, keyword
                        ),
                    );
                }
                previous = Some(previous.map_or(index, |prev| prev.max(index)));
            }

            let field = &fields[index];
            match self.unit.template(item.template).kind {
                TemplateKind::Omit if !field.optional => {
                    let location = self.unit.template(item.template).location;
                    self.error(
                        location,
                        format!("`omit' cannot be used for mandatory field `{}' of type `{}'", field.name, type_name),
                    );
                    self.mark_template_erroneous(item.template);
                    continue;
                }
                TemplateKind::AnyOrOmit if !field.optional => {
                    let location = self.unit.template(item.template).location;
                    self.warning(
                        location,
                        format!("Using `*' for mandatory field `{}' of type `{}'", field.name, type_name),
                    );
                }
                _ => {}
            }
            self_reference |= self.check_this_template(field.ty, item.template, is_modified, implicit_omit, lhs);
        }

        if !is_modified {
            let location = self.unit.template(template).location;
            for field in &fields {
                if seen.contains(&field.name.name) || (field.optional && implicit_omit) {
                    continue;
                }
                self.error(
                    location,
                    format!("Field `{}' is missing from template for {} type `{}'", field.name, keyword, type_name),
                );
            }
        }
        self_reference
    }

    fn check_union_template(
        &mut self,
        ty: TypeId,
        template: TemplateId,
        kind: &TemplateKind,
        is_modified: bool,
        implicit_omit: bool,
        lhs: Option<AssignmentId>,
    ) -> bool {
        let self_reference = match kind {
            TemplateKind::NamedTemplateList(items) => {
                let type_name = self.type_name(ty);
                let location = self.unit.template(template).location;
                match items.as_slice() {
                    [item] => {
                        let field = self.unit.ty(ty).fields().and_then(|f| f.get(&item.name.name)).cloned();
                        match field {
                            Some(field) => {
                                self.check_this_template(field.ty, item.template, is_modified, implicit_omit, lhs)
                            }
                            None => {
                                self.error(
                                    item.name.location,
                                    format!(
                                        "Reference to non-existent alternative `{}' in union template for type `{}'",
                                        item.name, type_name
                                    ),
                                );
                                self.mark_template_erroneous(template);
                                false
                            }
                        }
                    }
                    _ => {
                        self.error(
                            location,
                            format!(
                                "A template for union type `{}' must contain exactly one selected alternative",
                                type_name
                            ),
                        );
                        self.mark_template_erroneous(template);
                        false
                    }
                }
            }
            TemplateKind::ValueRange(_) | TemplateKind::Pattern(_) | TemplateKind::DecodeMatch(_) => {
                self.template_not_allowed(ty, template, kind);
                false
            }
            TemplateKind::SpecificValue(_)
            | TemplateKind::TemplateRefd(_)
            | TemplateKind::ValueList(_)
            | TemplateKind::ComplementedList(_)
            | TemplateKind::AnyValue
            | TemplateKind::AnyOrOmit
            | TemplateKind::Omit => self.check_generic_template(ty, template, kind, is_modified, implicit_omit, lhs),
        };
        self.check_length_restriction(ty, template, false);
        self_reference
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::frontend::{
        CompilationUnit, DecodeMatch, Identifier, LengthRestriction, NamedTemplate, PatternKind, PatternTemplate,
        RangeBound, Reference, TemplateKind, ValueKind, ValueRange,
    };
    use crate::types::{FieldDescriptor, PortType, TypeKind};
    use pretty_assertions::assert_eq;

    fn range(min: RangeBound, max: RangeBound) -> TemplateKind {
        TemplateKind::ValueRange(ValueRange {
            min,
            max,
            min_exclusive: false,
            max_exclusive: false,
        })
    }

    fn value_bound(unit: &mut CompilationUnit, kind: ValueKind) -> RangeBound {
        RangeBound::Value(unit.add_value(kind))
    }

    #[test]
    fn test_integer_ranges() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        let (ten, five) = (value_bound(&mut unit, ValueKind::Integer(10)), value_bound(&mut unit, ValueKind::Integer(5)));
        let inverted = unit.add_template(range(ten, five));
        let five = value_bound(&mut unit, ValueKind::Integer(5));
        let open_below = unit.add_template(range(RangeBound::Infinity { negative: true }, five));
        let five = value_bound(&mut unit, ValueKind::Integer(5));
        let open_above = unit.add_template(range(five, RangeBound::Infinity { negative: false }));
        let five = value_bound(&mut unit, ValueKind::Integer(5));
        let bad_lower = unit.add_template(range(RangeBound::Infinity { negative: false }, five));

        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_template(int, inverted, false, false, None);
            c.check_this_template(int, open_below, false, false, None);
            c.check_this_template(int, open_above, false, false, None);
            c.check_this_template(int, bad_lower, false, false, None);
        });
        assert_eq!(diags.error_count(), 2);
        assert!(diags.contains("incorrect boundaries"));
        assert!(diags.contains("cannot be lower boundary"));
        assert!(unit.template(inverted).is_erroneous);
        assert!(!unit.template(open_below).is_erroneous);
        assert!(!unit.template(open_above).is_erroneous);
    }

    #[test]
    fn test_negative_infinity_as_upper_bound() {
        let mut unit = CompilationUnit::new("M");
        let float = unit.define_type("F", TypeKind::Float);
        let lower = value_bound(&mut unit, ValueKind::Real(1.0));
        let upper = value_bound(&mut unit, ValueKind::Real(f64::NEG_INFINITY));
        let t = unit.add_template(range(lower, upper));
        let (_, diags) = with_checker(&mut unit, |c| c.check_this_template(float, t, false, false, None));
        assert!(diags.contains("cannot be upper boundary"));
    }

    #[test]
    fn test_boolean_rejects_ranges_and_length() {
        let mut unit = CompilationUnit::new("M");
        let b = unit.define_type("B", TypeKind::Boolean);
        let t = unit.add_template(TemplateKind::Pattern(PatternTemplate {
            text: "a*".into(),
            kind: PatternKind::Unchecked,
        }));
        let any = unit.add_template(TemplateKind::AnyValue);
        let one = unit.add_value(ValueKind::Integer(1));
        unit.template_mut(any).length_restriction = Some(LengthRestriction::Single(one));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_template(b, t, false, false, None);
            c.check_this_template(b, any, false, false, None);
        });
        assert!(diags.contains("Character string pattern cannot be used for type `B'"));
        assert!(diags.contains("Length restriction is not allowed for type `B'"));
    }

    #[test]
    fn test_string_templates() {
        let mut unit = CompilationUnit::new("M");
        let cs = unit.define_type("S", TypeKind::CharString);
        let ucs = unit.define_type("U", TypeKind::UniversalCharString);
        let a = value_bound(&mut unit, ValueKind::CharString("a".into()));
        let z = value_bound(&mut unit, ValueKind::CharString("z".into()));
        let ok_range = unit.add_template(range(a, z));
        let z = value_bound(&mut unit, ValueKind::CharString("z".into()));
        let a = value_bound(&mut unit, ValueKind::CharString("a".into()));
        let inverted = unit.add_template(range(z, a));
        let a = value_bound(&mut unit, ValueKind::CharString("a".into()));
        let long = value_bound(&mut unit, ValueKind::CharString("xy".into()));
        let too_long = unit.add_template(range(a, long));
        let pattern = unit.add_template(TemplateKind::Pattern(PatternTemplate {
            text: "ab?".into(),
            kind: PatternKind::Unchecked,
        }));

        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_template(cs, ok_range, false, false, None);
            c.check_this_template(cs, inverted, false, false, None);
            c.check_this_template(cs, too_long, false, false, None);
            c.check_this_template(ucs, pattern, false, false, None);
        });
        assert_eq!(diags.error_count(), 2);
        assert!(diags.contains("incorrect boundaries"));
        assert!(diags.contains("must be a single character"));
        assert!(matches!(
            &unit.template(pattern).kind,
            TemplateKind::Pattern(p) if p.kind == PatternKind::UniversalCharString
        ));
    }

    #[test]
    fn test_decode_match_encoding() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        let cs = unit.define_type("S", TypeKind::CharString);
        let ucs = unit.define_type("U", TypeKind::UniversalCharString);
        let inner = unit.add_template(TemplateKind::AnyValue);
        let utf8 = unit.add_value(ValueKind::CharString("UTF-8".into()));
        let ok = unit.add_template(TemplateKind::DecodeMatch(DecodeMatch {
            target_type: int,
            target: inner,
            encoding: Some(utf8),
        }));
        let inner2 = unit.add_template(TemplateKind::AnyValue);
        let utf8_again = unit.add_value(ValueKind::CharString("UTF-8".into()));
        let narrow = unit.add_template(TemplateKind::DecodeMatch(DecodeMatch {
            target_type: int,
            target: inner2,
            encoding: Some(utf8_again),
        }));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_template(ucs, ok, false, false, None);
            c.check_this_template(cs, narrow, false, false, None);
        });
        assert_eq!(diags.error_count(), 1);
        assert!(diags.contains("only be used with universal charstring templates"));
    }

    #[test]
    fn test_port_rejects_every_template() {
        let mut unit = CompilationUnit::new("M");
        let port = unit.define_type("P", TypeKind::Port(PortType::default()));
        let any = unit.add_template(TemplateKind::AnyValue);
        let (_, diags) = with_checker(&mut unit, |c| c.check_this_template(port, any, false, false, None));
        assert!(diags.contains("Any value cannot be used for type `P'"));
    }

    #[test]
    fn test_referenced_type_delegates() {
        let mut unit = CompilationUnit::new("M");
        unit.define_type("I", TypeKind::Integer);
        let alias = unit.reference_type("I");
        unit.add_assignment("Alias", crate::frontend::AssignmentKind::Type(alias));
        let pattern = unit.add_template(TemplateKind::Pattern(PatternTemplate {
            text: "x".into(),
            kind: PatternKind::Unchecked,
        }));
        let (_, diags) = with_checker(&mut unit, |c| c.check_this_template(alias, pattern, false, false, None));
        assert!(diags.contains("cannot be used for type `I'"));
        assert_eq!(unit.template(pattern).governor, Some(alias));
    }

    #[test]
    fn test_record_template_fields() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let cs = unit.add_type(TypeKind::CharString);
        let rec = record(
            &mut unit,
            "R",
            vec![FieldDescriptor::new("a", int), FieldDescriptor::new("b", cs).optional()],
        );
        let omit = unit.add_template(TemplateKind::Omit);
        let any = unit.add_template(TemplateKind::AnyOrOmit);
        let bad = unit.add_template(TemplateKind::NamedTemplateList(vec![NamedTemplate {
            name: Identifier::new("a"),
            template: omit,
        }]));
        let ok = unit.add_template(TemplateKind::NamedTemplateList(vec![
            NamedTemplate { name: Identifier::new("a"), template: any },
        ]));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_this_template(rec, bad, false, true, None);
            c.check_this_template(rec, ok, false, true, None);
        });
        assert_eq!(diags.error_count(), 1);
        assert!(diags.contains("`omit' cannot be used for mandatory field `a'"));
        assert_eq!(diags.warnings().count(), 1);
    }

    #[test]
    fn test_union_template_needs_one_alternative() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let int2 = unit.add_type(TypeKind::Integer);
        let u = union(&mut unit, "U", vec![FieldDescriptor::new("a", int), FieldDescriptor::new("b", int2)]);
        let t1 = unit.add_template(TemplateKind::AnyValue);
        let t2 = unit.add_template(TemplateKind::AnyValue);
        let both = unit.add_template(TemplateKind::NamedTemplateList(vec![
            NamedTemplate { name: Identifier::new("a"), template: t1 },
            NamedTemplate { name: Identifier::new("b"), template: t2 },
        ]));
        let (_, diags) = with_checker(&mut unit, |c| c.check_this_template(u, both, false, false, None));
        assert!(diags.contains("exactly one selected alternative"));
    }

    #[test]
    fn test_template_reference_resolves_in_nested_scope() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        let (_, any) = unit.define_template("t_any", int, TemplateKind::AnyValue);
        unit.define_template("t_alias", int, TemplateKind::TemplateRefd(Reference::named("t_any")));
        let inner = nest_in_scope(&mut unit, &["t_any", "t_alias"]);
        unit.ty_mut(int).scope = Some(inner);

        let t = unit.add_template(TemplateKind::TemplateRefd(Reference::named("t_alias")));
        let (last, diags) = with_checker(&mut unit, |c| {
            c.check_this_template(int, t, false, false, None);
            c.template_refd_last(t)
        });
        assert!(diags.is_empty(), "{:?}", diags.items());
        assert_eq!(last, any);
    }

    #[test]
    fn test_template_reference_cycle() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        let (_, t1) = unit.define_template("t1", int, TemplateKind::TemplateRefd(Reference::named("t2")));
        unit.define_template("t2", int, TemplateKind::TemplateRefd(Reference::named("t1")));
        let (_, diags) = with_checker(&mut unit, |c| c.check_this_template(int, t1, false, false, None));
        assert!(diags.contains("Circular reference in template"));
    }
}
