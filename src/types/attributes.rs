//! `with` attributes and RAW encoding variants

use serde::{Deserialize, Serialize};

use crate::utils::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    Encode,
    Variant,
    Display,
    Extension,
}

/// One entry of a `with { ... }` block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithAttribute {
    pub kind: AttributeKind,
    pub spec: String,
    #[serde(default)]
    pub location: Location,
}

impl WithAttribute {
    pub fn variant(spec: &str) -> Self {
        Self {
            kind: AttributeKind::Variant,
            spec: spec.to_string(),
            location: Location::dummy(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comp {
    NoSign,
    TwosComplement,
    SignBit,
}

/// Parsed RAW encoder settings of a type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawEncodingAttributes {
    pub fieldlength: Option<u32>,
    pub byteorder: Option<ByteOrder>,
    pub comp: Option<Comp>,
    pub padding: Option<bool>,
}

impl RawEncodingAttributes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse the variant attributes of a type. Problems come back as messages;
/// they are warnings for the caller to report.
pub fn parse_raw_variants<'a>(
    attributes: impl IntoIterator<Item = &'a WithAttribute>,
) -> (RawEncodingAttributes, Vec<(Location, String)>) {
    let mut raw = RawEncodingAttributes::default();
    let mut problems = Vec::new();

    for attribute in attributes {
        if attribute.kind != AttributeKind::Variant {
            continue;
        }
        for item in attribute.spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Err(message) = parse_variant_item(item, &mut raw) {
                problems.push((attribute.location, message));
            }
        }
    }
    (raw, problems)
}

fn parse_variant_item(item: &str, raw: &mut RawEncodingAttributes) -> std::result::Result<(), String> {
    let (name, argument) = match item.find('(') {
        Some(open) => {
            let close = item
                .rfind(')')
                .filter(|close| *close > open)
                .ok_or_else(|| format!("Missing `)' in variant `{}'", item))?;
            (item[..open].trim(), item[open + 1..close].trim())
        }
        None => (item, ""),
    };

    match name.to_ascii_uppercase().as_str() {
        "FIELDLENGTH" => {
            let length = argument
                .parse::<u32>()
                .map_err(|_| format!("Invalid FIELDLENGTH argument `{}'", argument))?;
            raw.fieldlength = Some(length);
        }
        "BYTEORDER" => {
            raw.byteorder = Some(match argument {
                "first" => ByteOrder::First,
                "last" => ByteOrder::Last,
                _ => return Err(format!("Invalid BYTEORDER argument `{}'", argument)),
            });
        }
        "COMP" => {
            raw.comp = Some(match argument {
                "nosign" => Comp::NoSign,
                "2scompl" => Comp::TwosComplement,
                "signbit" => Comp::SignBit,
                _ => return Err(format!("Invalid COMP argument `{}'", argument)),
            });
        }
        "PADDING" => {
            raw.padding = Some(match argument {
                "yes" => true,
                "no" => false,
                _ => return Err(format!("Invalid PADDING argument `{}'", argument)),
            });
        }
        _ => return Err(format!("Unrecognized RAW variant `{}'", item)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        let attrs = vec![WithAttribute::variant("FIELDLENGTH(8), BYTEORDER(last)"), WithAttribute::variant("COMP(2scompl)")];
        let (raw, problems) = parse_raw_variants(&attrs);
        assert!(problems.is_empty());
        assert_eq!(raw.fieldlength, Some(8));
        assert_eq!(raw.byteorder, Some(ByteOrder::Last));
        assert_eq!(raw.comp, Some(Comp::TwosComplement));
    }

    #[test]
    fn test_unknown_and_malformed_variants() {
        let attrs = vec![WithAttribute::variant("FOO(1), FIELDLENGTH(x), PADDING(yes")];
        let (raw, problems) = parse_raw_variants(&attrs);
        assert_eq!(problems.len(), 3);
        assert!(raw.is_empty());
    }

    #[test]
    fn test_non_variant_attributes_are_ignored() {
        let attrs = vec![WithAttribute {
            kind: AttributeKind::Encode,
            spec: "RAW".to_string(),
            location: Location::dummy(),
        }];
        let (raw, problems) = parse_raw_variants(&attrs);
        assert!(problems.is_empty());
        assert!(raw.is_empty());
    }
}
