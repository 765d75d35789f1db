//! Variant attributes and RAW encoding checks

use super::TypeChecker;
use crate::frontend::ast::TypeId;
use crate::types::{parse_raw_variants, TypeKind};

impl<'a> TypeChecker<'a> {
    /// Parse the `variant` attributes of a type into its RAW attributes
    pub(super) fn parse_attributes(&mut self, id: TypeId) {
        let (raw, problems) = parse_raw_variants(&self.unit.ty(id).attributes);
        self.unit.ty_mut(id).raw = if raw.is_empty() { None } else { Some(raw) };
        for (location, message) in problems {
            self.warning(location, message);
        }
    }

    /// Validate the parsed RAW attributes against the type category
    pub(super) fn check_encodings(&mut self, id: TypeId) {
        let Some(raw) = self.unit.ty(id).raw else {
            return;
        };
        let type_name = self.type_name(id);
        let location = self
            .unit
            .ty(id)
            .attributes
            .first()
            .map(|a| a.location)
            .unwrap_or(self.unit.ty(id).location);

        let is_integer = matches!(self.unit.ty(id).kind, TypeKind::Integer);
        if raw.comp.is_some() && !is_integer {
            self.error(
                location,
                format!("COMP is only applicable to integer types, `{}' is not an integer type", type_name),
            );
        }

        match &self.unit.ty(id).kind {
            TypeKind::Boolean => {
                if raw.fieldlength == Some(0) {
                    self.error(location, format!("FIELDLENGTH of boolean type `{}' must be positive", type_name));
                }
            }
            TypeKind::Float => {
                if let Some(length) = raw.fieldlength {
                    if length != 32 && length != 64 {
                        self.error(
                            location,
                            format!(
                                "Invalid length ({}) specified in parameter FIELDLENGTH for float type `{}'. \
                                 The FIELDLENGTH must be single (32) or double (64)",
                                length, type_name
                            ),
                        );
                    }
                }
            }
            TypeKind::Enumerated(enumerated) => {
                if let Some(length) = raw.fieldlength {
                    let needed = enumerated
                        .items
                        .iter()
                        .filter_map(|i| i.value)
                        .map(bits_needed)
                        .max()
                        .unwrap_or(1);
                    if length != 0 && length < needed {
                        self.error(
                            location,
                            format!(
                                "FIELDLENGTH ({}) is too small to encode enumerated type `{}', at least {} bits are needed",
                                length, type_name, needed
                            ),
                        );
                    }
                }
            }
            TypeKind::Class(_) | TypeKind::Port(_) => {
                let keyword = self.unit.ty(id).category().keyword();
                self.error(
                    location,
                    format!("RAW encoding attributes are not applicable to {} type `{}'", keyword, type_name),
                );
            }
            TypeKind::Integer
            | TypeKind::CharString
            | TypeKind::UniversalCharString
            | TypeKind::Asn1String(_)
            | TypeKind::RecordSet(_)
            | TypeKind::Union(_)
            | TypeKind::Referenced(_) => {}
        }
    }
}

/// Bits of a two's complement encoding of `value`
fn bits_needed(value: i64) -> u32 {
    if value >= 0 {
        (64 - value.leading_zeros()).max(1)
    } else {
        65 - (!value).leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::bits_needed;
    use crate::frontend::CompilationUnit;
    use crate::types::{EnumItem, EnumeratedType, TypeKind, WithAttribute};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bits_needed() {
        assert_eq!(bits_needed(0), 1);
        assert_eq!(bits_needed(1), 1);
        assert_eq!(bits_needed(5), 3);
        assert_eq!(bits_needed(255), 8);
        assert_eq!(bits_needed(-1), 1);
        assert_eq!(bits_needed(-128), 8);
    }

    #[test]
    fn test_unknown_variant_is_a_warning() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("I", TypeKind::Integer);
        unit.ty_mut(int).attributes.push(WithAttribute::variant("FOO"));
        let (_, diags) = with_checker(&mut unit, |c| c.check_type(int));
        assert_eq!(diags.error_count(), 0);
        assert_eq!(diags.warnings().count(), 1);
    }

    #[test]
    fn test_float_fieldlength() {
        let mut unit = CompilationUnit::new("M");
        let ok = unit.define_type("F64", TypeKind::Float);
        unit.ty_mut(ok).attributes.push(WithAttribute::variant("FIELDLENGTH(64)"));
        let bad = unit.define_type("F16", TypeKind::Float);
        unit.ty_mut(bad).attributes.push(WithAttribute::variant("FIELDLENGTH(16)"));
        let (_, diags) = with_checker(&mut unit, |c| {
            c.check_type(ok);
            c.check_type(bad);
        });
        assert_eq!(diags.error_count(), 1);
        assert!(diags.contains("float type `F16'"));
    }

    #[test]
    fn test_comp_only_for_integers() {
        let mut unit = CompilationUnit::new("M");
        let b = unit.define_type("B", TypeKind::Boolean);
        unit.ty_mut(b).attributes.push(WithAttribute::variant("COMP(2scompl)"));
        let (_, diags) = with_checker(&mut unit, |c| c.check_type(b));
        assert!(diags.contains("COMP is only applicable to integer types"));
    }

    #[test]
    fn test_enumerated_fieldlength_width() {
        let mut unit = CompilationUnit::new("M");
        let e = unit.define_type(
            "E",
            TypeKind::Enumerated(EnumeratedType::new(vec![EnumItem::new("a", Some(0)), EnumItem::new("b", Some(9))])),
        );
        unit.ty_mut(e).attributes.push(WithAttribute::variant("FIELDLENGTH(3)"));
        let (_, diags) = with_checker(&mut unit, |c| c.check_type(e));
        assert!(diags.contains("at least 4 bits"));
    }

    #[test]
    fn test_unscoped_types_skip_encoding_checks() {
        let mut unit = CompilationUnit::new("M");
        let f = unit.add_type(TypeKind::Float);
        unit.ty_mut(f).attributes.push(WithAttribute::variant("FIELDLENGTH(16)"));
        let (_, diags) = with_checker(&mut unit, |c| c.check_type(f));
        assert!(diags.is_empty());
        assert!(unit.ty(f).raw.is_some());
    }
}
