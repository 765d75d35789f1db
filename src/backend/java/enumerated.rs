//! Enumerated classes
//!
//! The nested `enum_type` carries every declared item plus two sentinels,
//! UNKNOWN_VALUE and UNBOUND_VALUE, numbered with the two smallest
//! non-negative integers no item uses.

use super::fragment::*;
use super::record_set::polymorphic;
use super::template;
use crate::types::EnumeratedType;

pub const UNKNOWN_VALUE: &str = "UNKNOWN_VALUE";
pub const UNBOUND_VALUE: &str = "UNBOUND_VALUE";

/// An item as emitted
pub(super) struct EnumConstant {
    pub name: String,
    pub value: i64,
}

/// Items with their values plus the sentinel values
pub(super) fn constants(enumerated: &mut EnumeratedType) -> (Vec<EnumConstant>, (i64, i64)) {
    let sentinels = enumerated.sentinel_values();
    let items = enumerated
        .items
        .iter()
        .filter_map(|item| {
            item.value.map(|value| EnumConstant {
                name: item.name.target_name(),
                value,
            })
        })
        .collect();
    (items, sentinels)
}

pub(super) fn generate(
    module: &mut GeneratedModule,
    name: &str,
    items: &[EnumConstant],
    sentinels: (i64, i64),
    templates: bool,
) {
    module.import("Base_Type");
    module.import("TtcnError");
    module.add_class(value_class(name, items, sentinels));
    if templates {
        template::import_runtime(module);
        module.add_class(template_class(name));
    }
}

fn value_class(name: &str, items: &[EnumConstant], (unknown, unbound): (i64, i64)) -> ClassDef {
    let mut class = ClassDef::new(name, "Base_Type").documented(format!("Value class of enumerated type `{}'", name));

    let mut constants: Vec<String> = items.iter().map(|i| format!("{}({})", i.name, i.value)).collect();
    constants.push(format!("{}({})", UNKNOWN_VALUE, unknown));
    constants.push(format!("{}({})", UNBOUND_VALUE, unbound));
    let mut lookup: Vec<Case> = items
        .iter()
        .map(|i| case(&[i.value.to_string().as_str()], vec![line(format!("return {};", i.name))]))
        .collect();
    lookup.push(case(&[unknown.to_string().as_str()], vec![line(format!("return {};", UNKNOWN_VALUE))]));
    lookup.push(case(&[unbound.to_string().as_str()], vec![line(format!("return {};", UNBOUND_VALUE))]));
    lookup.push(default_case(vec![line("return null;")]));
    class.members.push(Member::Enum(EnumDef {
        name: "enum_type".to_string(),
        constants,
        members: vec![
            Member::Field(FieldDef {
                modifiers: "private final".to_string(),
                ty: "int".to_string(),
                name: "enum_num".to_string(),
                init: None,
            }),
            Member::Method(
                MethodDef::constructor("enum_type")
                    .param("int", "num")
                    .body(vec![line("this.enum_num = num;")])
                    .as_enum_constructor(),
            ),
            Member::Method(MethodDef::new("public", "int", "getInt").body(vec![line("return enum_num;")])),
            Member::Method(
                MethodDef::new("public static", "enum_type", "getValue")
                    .param("int", "index")
                    .body(vec![switch("index", lookup)]),
            ),
        ],
    }));
    class.field("public", "enum_type", "enum_value", None);

    let unbound_value = format!("enum_type.{}", UNBOUND_VALUE);
    class.method(MethodDef::constructor(name).body(vec![line(format!("enum_value = {};", unbound_value))]));
    class.method(MethodDef::constructor(name).param("enum_type", "otherValue").body(vec![line("enum_value = otherValue;")]));
    class.method(MethodDef::constructor(name).param(name, "otherValue").body(vec![
        if_(
            format!("otherValue.enum_value == {}", unbound_value),
            vec![throw(&format!("Copying an unbound value of enumerated type {}.", name))],
        ),
        line("enum_value = otherValue.enum_value;"),
    ]));
    class.method(MethodDef::constructor(name).param("int", "otherValue").body(vec![
        if_(
            "!isValidEnum(otherValue)",
            vec![throw_expr(&format!(
                "{} + otherValue + \".\"",
                java_string(&format!(
                    "Initializing a variable of enumerated type {} with invalid numeric value ",
                    name
                ))
            ))],
        ),
        line("enum_value = enum_type.getValue(otherValue);"),
    ]));

    let mut valid: Vec<Case> = Vec::new();
    if !items.is_empty() {
        let labels: Vec<String> = items.iter().map(|i| i.value.to_string()).collect();
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        valid.push(case(&labels, vec![line("return true;")]));
    }
    valid.push(default_case(vec![line("return false;")]));
    class.method(
        MethodDef::new("public static", "boolean", "isValidEnum")
            .param("int", "otherValue")
            .body(vec![switch("otherValue", valid)]),
    );

    let mut names: Vec<Case> = items
        .iter()
        .map(|i| case(&[i.name.as_str()], vec![line(format!("return {};", java_string(&i.name)))]))
        .collect();
    names.push(default_case(vec![line(format!("return {};", java_string("<unknown>")))]));
    class.method(
        MethodDef::new("public static", "String", "enum2str")
            .param("enum_type", "enumPar")
            .body(vec![switch("enumPar", names)]),
    );

    class.method(MethodDef::new("public", name, "assign").param("enum_type", "otherValue").body(vec![
        line("enum_value = otherValue;"),
        line("return this;"),
    ]));
    class.method(MethodDef::new("public", name, "assign").param(name, "otherValue").body(vec![
        if_(
            format!("otherValue.enum_value == {}", unbound_value),
            vec![throw(&format!("assignment of unbound value of enumerated type {}", name))],
        ),
        line("enum_value = otherValue.enum_value;"),
        line("return this;"),
    ]));
    class.method(polymorphic(name, name, "assign", "Base_Type"));

    class.method(
        MethodDef::new("public", "void", "cleanUp")
            .annotated("@Override")
            .body(vec![line(format!("enum_value = {};", unbound_value))]),
    );
    let bound = format!("return enum_value != {};", unbound_value);
    class.method(MethodDef::new("public", "boolean", "isBound").annotated("@Override").body(vec![line(bound.clone())]));
    class.method(MethodDef::new("public", "boolean", "isPresent").annotated("@Override").body(vec![line(bound.clone())]));
    class.method(MethodDef::new("public", "boolean", "isValue").annotated("@Override").body(vec![line(bound)]));

    class.method(MethodDef::new("public", "boolean", "operatorEquals").param("enum_type", "otherValue").body(vec![
        if_(
            format!("enum_value == {}", unbound_value),
            vec![throw(&format!(
                "The left operand of comparison is an unbound value of enumerated type {}.",
                name
            ))],
        ),
        line("return enum_value == otherValue;"),
    ]));
    class.method(MethodDef::new("public", "boolean", "operatorEquals").param(name, "otherValue").body(vec![
        if_(
            format!("otherValue.enum_value == {}", unbound_value),
            vec![throw(&format!(
                "The right operand of comparison is an unbound value of enumerated type {}.",
                name
            ))],
        ),
        line("return operatorEquals(otherValue.enum_value);"),
    ]));
    class.method(polymorphic(name, "boolean", "operatorEquals", "Base_Type"));
    class
}

fn template_class(value: &str) -> ClassDef {
    let name = format!("{}{}", value, super::names::TEMPLATE_SUFFIX);
    let enum_type = format!("{}.enum_type", value);
    let mut class =
        ClassDef::new(&name, "Base_Template").documented(format!("Template class of enumerated type `{}'", value));
    class.field("private", &enum_type, "single_value", None);
    template::list_field(&mut class, &name);

    class.method(MethodDef::constructor(&name));
    class.method(template::selection_constructor(&name));
    class.method(MethodDef::constructor(&name).param(&enum_type, "otherValue").body(vec![
        line("super(template_sel.SPECIFIC_VALUE);"),
        line("single_value = otherValue;"),
    ]));
    class.method(MethodDef::constructor(&name).param(value, "otherValue").body(vec![
        line("super(template_sel.SPECIFIC_VALUE);"),
        if_(
            format!("otherValue.enum_value == {}.{}", enum_type, UNBOUND_VALUE),
            vec![throw(&format!(
                "Creating a template from an unbound value of enumerated type {}.",
                value
            ))],
        ),
        line("single_value = otherValue.enum_value;"),
    ]));
    class.method(MethodDef::constructor(&name).param(&name, "otherValue").body(vec![line("copyTemplate(otherValue);")]));

    class.method(MethodDef::new("private", "void", "copyTemplate").param(&name, "otherValue").body(vec![
        switch(
            "otherValue.template_selection",
            vec![
                case(&["SPECIFIC_VALUE"], vec![line("single_value = otherValue.single_value;"), line("break;")]),
                case(&["OMIT_VALUE", "ANY_VALUE", "ANY_OR_OMIT"], vec![line("break;")]),
                template::copy_list_case(&name),
                default_case(vec![throw(&format!(
                    "Copying an uninitialized/unsupported template of enumerated type {}.",
                    value
                ))]),
            ],
        ),
        line("set_selection(otherValue);"),
    ]));

    class.method(template::assign_selection(&name));
    class.method(MethodDef::new("public", &name, "assign").param(&enum_type, "otherValue").body(vec![
        line("cleanUp();"),
        line("set_selection(template_sel.SPECIFIC_VALUE);"),
        line("single_value = otherValue;"),
        line("return this;"),
    ]));
    class.method(MethodDef::new("public", &name, "assign").param(&name, "otherValue").body(vec![
        if_("otherValue != this", vec![line("cleanUp();"), line("copyTemplate(otherValue);")]),
        line("return this;"),
    ]));
    class.method(template::set_type(&name));
    class.method(template::list_item(&name));

    let mut cases = vec![case(&["SPECIFIC_VALUE"], vec![line("return single_value == otherValue;")])];
    cases.extend(template::match_generic_cases("otherValue", value));
    class.method(
        MethodDef::new("public", "boolean", "match")
            .param(&enum_type, "otherValue")
            .param("boolean", "legacy")
            .body(vec![switch("template_selection", cases)]),
    );
    class.method(
        MethodDef::new("public", "boolean", "match")
            .param(value, "otherValue")
            .param("boolean", "legacy")
            .body(vec![
                if_(
                    format!("otherValue.enum_value == {}.{}", enum_type, UNBOUND_VALUE),
                    vec![line("return false;")],
                ),
                line("return match(otherValue.enum_value, legacy);"),
            ]),
    );
    class.method(template::clean_up(Vec::new()));
    class
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::java::JavaPrinter;
    use crate::types::{EnumItem, EnumeratedType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sentinels_skip_used_values() {
        let mut enumerated = EnumeratedType::new(vec![
            EnumItem::new("a", Some(0)),
            EnumItem::new("b", Some(1)),
            EnumItem::new("c", Some(2)),
            EnumItem::new("d", Some(5)),
        ]);
        let (items, sentinels) = constants(&mut enumerated);
        assert_eq!(items.len(), 4);
        assert_eq!(sentinels, (3, 4));

        let mut module = GeneratedModule::new("gen", "M");
        generate(&mut module, "E", &items, sentinels, true);
        let class = module.class("E").map(|c| JavaPrinter::new().print_class(c)).expect("class is generated");
        assert!(class.contains("\t\td(5),\n\t\tUNKNOWN_VALUE(3),\n\t\tUNBOUND_VALUE(4);\n"));
        assert!(class.contains("\t\tenum_type(final int num) {"));
        assert!(class.contains("case 0:\n\t\tcase 1:\n\t\tcase 2:\n\t\tcase 5:\n\t\t\treturn true;"));
        assert!(module.class("E_template").is_some());
    }
}
