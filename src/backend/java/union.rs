//! Union and choice classes
//!
//! A selector enum with one constant per alternative plus UNBOUND_VALUE and a
//! single slot holding the chosen alternative.

use super::fragment::*;
use super::record_set::polymorphic;
use super::{template, GenField};

pub const SELECTION_TYPE: &str = "union_selection_type";
pub const UNBOUND_SELECTION: &str = "UNBOUND_VALUE";

pub(super) fn generate(module: &mut GeneratedModule, name: &str, keyword: &str, fields: &[GenField], templates: bool) {
    module.import("Base_Type");
    module.import("TtcnError");
    module.add_class(value_class(name, keyword, fields));
    if templates {
        template::import_runtime(module);
        module.add_class(template_class(name, keyword, fields));
    }
}

fn selector(name: &str, field: &GenField) -> String {
    format!("{}.{}.{}", name, SELECTION_TYPE, field.selection())
}

fn value_class(name: &str, keyword: &str, fields: &[GenField]) -> ClassDef {
    let mut class = ClassDef::new(name, "Base_Type").documented(format!("Value class of {} type `{}'", keyword, name));
    let mut constants = vec![UNBOUND_SELECTION.to_string()];
    constants.extend(fields.iter().map(|f| f.selection()));
    class.members.push(Member::Enum(EnumDef {
        name: SELECTION_TYPE.to_string(),
        constants,
        members: Vec::new(),
    }));
    class.field("private", SELECTION_TYPE, "union_selection", None);
    class.field("private", "Base_Type", "field", None);

    let unbound = format!("{}.{}", SELECTION_TYPE, UNBOUND_SELECTION);
    class.method(MethodDef::constructor(name).body(vec![line(format!("union_selection = {};", unbound))]));
    class.method(MethodDef::constructor(name).param(name, "otherValue").body(vec![line("copyValue(otherValue);")]));

    // copyValue
    let mut cases: Vec<Case> = fields
        .iter()
        .map(|f| {
            case(
                &[f.selection().as_str()],
                vec![
                    line(format!("field = new {0}(({0}) otherValue.field);", f.value_type)),
                    line("break;"),
                ],
            )
        })
        .collect();
    cases.push(default_case(vec![throw(&format!(
        "Assignment of an unbound union value of type {}.",
        name
    ))]));
    class.method(
        MethodDef::new("private", "void", "copyValue")
            .param(name, "otherValue")
            .body(vec![switch("otherValue.union_selection", cases), line("union_selection = otherValue.union_selection;")]),
    );

    class.method(MethodDef::new("public", name, "assign").param(name, "otherValue").body(vec![
        if_("otherValue != this", vec![line("cleanUp();"), line("copyValue(otherValue);")]),
        line("return this;"),
    ]));
    class.method(polymorphic(name, name, "assign", "Base_Type"));

    class.method(
        MethodDef::new("public", "void", "cleanUp")
            .annotated("@Override")
            .body(vec![line("field = null;"), line(format!("union_selection = {};", unbound))]),
    );

    class.method(MethodDef::new("public", SELECTION_TYPE, "get_selection").body(vec![line("return union_selection;")]));

    class.method(
        MethodDef::new("public", "boolean", "isChosen")
            .param(SELECTION_TYPE, "checked_selection")
            .body(vec![
                if_(
                    format!("checked_selection == {}", unbound),
                    vec![throw(&format!(
                        "performing ischosen on invalid union value: an invalid field of union type {} was requested",
                        name
                    ))],
                ),
                if_(
                    format!("union_selection == {}", unbound),
                    vec![throw(&format!("performing ischosen on unbound union value of type {}", name))],
                ),
                line("return union_selection == checked_selection;"),
            ]),
    );

    let bound = format!("return union_selection != {};", unbound);
    class.method(MethodDef::new("public", "boolean", "isBound").annotated("@Override").body(vec![line(bound.clone())]));
    class.method(MethodDef::new("public", "boolean", "isPresent").annotated("@Override").body(vec![line(bound)]));
    class.method(MethodDef::new("public", "boolean", "isValue").annotated("@Override").body(vec![
        if_(
            format!("union_selection == {}", unbound),
            vec![throw(&format!("Checking the value of an unbound union value of type {}.", name))],
        ),
        line("return field.isValue();"),
    ]));

    // operatorEquals
    let mut cases: Vec<Case> = fields
        .iter()
        .map(|f| {
            case(
                &[f.selection().as_str()],
                vec![line(format!(
                    "return (({0}) field).operatorEquals(({0}) otherValue.field);",
                    f.value_type
                ))],
            )
        })
        .collect();
    cases.push(default_case(vec![line("return false;")]));
    class.method(MethodDef::new("public", "boolean", "operatorEquals").param(name, "otherValue").body(vec![
        if_(
            format!("union_selection == {}", unbound),
            vec![throw(&format!(
                "The left operand of comparison is an unbound value of union type {}.",
                name
            ))],
        ),
        if_(
            format!("otherValue.union_selection == {}", unbound),
            vec![throw(&format!(
                "The right operand of comparison is an unbound value of union type {}.",
                name
            ))],
        ),
        if_("union_selection != otherValue.union_selection", vec![line("return false;")]),
        switch("union_selection", cases),
    ]));
    class.method(polymorphic(name, "boolean", "operatorEquals", "Base_Type"));

    for field in fields {
        let selection = format!("{}.{}", SELECTION_TYPE, field.selection());
        class.method(MethodDef::new("public", &field.value_type, &field.accessor()).body(vec![
            if_(
                format!("union_selection != {}", selection),
                vec![
                    line("cleanUp();"),
                    line(format!("field = new {}();", field.value_type)),
                    line(format!("union_selection = {};", selection)),
                ],
            ),
            line(format!("return ({}) field;", field.value_type)),
        ]));
        class.method(MethodDef::new("public", &field.value_type, &field.const_accessor()).body(vec![
            if_(
                format!("union_selection != {}", selection),
                vec![throw(&format!(
                    "using non-selected field in union: {} of type {}",
                    field.ident, name
                ))],
            ),
            line(format!("return ({}) field;", field.value_type)),
        ]));
    }
    class
}

fn template_class(value: &str, keyword: &str, fields: &[GenField]) -> ClassDef {
    let name = format!("{}{}", value, super::names::TEMPLATE_SUFFIX);
    let selection_type = format!("{}.{}", value, SELECTION_TYPE);
    let unbound = format!("{}.{}", selection_type, UNBOUND_SELECTION);
    let mut class =
        ClassDef::new(&name, "Base_Template").documented(format!("Template class of {} type `{}'", keyword, value));
    class.field("private", &selection_type, "single_value_union_selection", None);
    class.field("private", "Base_Template", "single_value", None);
    template::list_field(&mut class, &name);

    class.method(MethodDef::constructor(&name));
    class.method(template::selection_constructor(&name));
    class.method(MethodDef::constructor(&name).param(value, "otherValue").body(vec![line("copyValue(otherValue);")]));
    class.method(MethodDef::constructor(&name).param(&name, "otherValue").body(vec![line("copyTemplate(otherValue);")]));

    // copyValue
    let mut cases: Vec<Case> = fields
        .iter()
        .map(|f| {
            case(
                &[f.selection().as_str()],
                vec![
                    line(format!("single_value = new {}(otherValue.{}());", f.template_type, f.const_accessor())),
                    line("break;"),
                ],
            )
        })
        .collect();
    cases.push(default_case(vec![throw(&format!(
        "Initializing a template with an unbound value of type {}.",
        value
    ))]));
    class.method(MethodDef::new("private", "void", "copyValue").param(value, "otherValue").body(vec![
        switch("otherValue.get_selection()", cases),
        line("single_value_union_selection = otherValue.get_selection();"),
        line("set_selection(template_sel.SPECIFIC_VALUE);"),
    ]));

    // copyTemplate
    let mut specific: Vec<Stmt> = vec![line("single_value_union_selection = otherValue.single_value_union_selection;")];
    let mut by_selection: Vec<Case> = fields
        .iter()
        .map(|f| {
            case(
                &[f.selection().as_str()],
                vec![
                    line(format!("single_value = new {0}(({0}) otherValue.single_value);", f.template_type)),
                    line("break;"),
                ],
            )
        })
        .collect();
    by_selection.push(default_case(vec![throw(&format!(
        "Internal error: Invalid union selector in a specific value when copying a template of type {}.",
        value
    ))]));
    specific.push(switch("otherValue.single_value_union_selection", by_selection));
    specific.push(line("break;"));
    class.method(MethodDef::new("private", "void", "copyTemplate").param(&name, "otherValue").body(vec![
        switch(
            "otherValue.template_selection",
            vec![
                case(&["SPECIFIC_VALUE"], specific),
                case(&["OMIT_VALUE", "ANY_VALUE", "ANY_OR_OMIT"], vec![line("break;")]),
                template::copy_list_case(&name),
                default_case(vec![throw(&format!(
                    "Copying an uninitialized template of union type {}.",
                    value
                ))]),
            ],
        ),
        line("set_selection(otherValue);"),
    ]));

    class.method(template::assign_selection(&name));
    class.method(MethodDef::new("public", &name, "assign").param(value, "otherValue").body(vec![
        line("cleanUp();"),
        line("copyValue(otherValue);"),
        line("return this;"),
    ]));
    class.method(MethodDef::new("public", &name, "assign").param(&name, "otherValue").body(vec![
        if_("otherValue != this", vec![line("cleanUp();"), line("copyTemplate(otherValue);")]),
        line("return this;"),
    ]));
    class.method(template::set_type(&name));
    class.method(template::list_item(&name));

    for field in fields {
        let selection = selector(value, field);
        class.method(MethodDef::new("public", &field.template_type, &field.accessor()).body(vec![
            if_(
                format!(
                    "template_selection != template_sel.SPECIFIC_VALUE || single_value_union_selection != {}",
                    selection
                ),
                vec![
                    line("final template_sel old_selection = template_selection;"),
                    line("cleanUp();"),
                    if_(
                        "old_selection == template_sel.ANY_VALUE || old_selection == template_sel.ANY_OR_OMIT",
                        vec![line(format!("single_value = new {}(template_sel.ANY_VALUE);", field.template_type))],
                    ),
                    block("else", vec![line(format!("single_value = new {}();", field.template_type))]),
                    line(format!("single_value_union_selection = {};", selection)),
                    line("set_selection(template_sel.SPECIFIC_VALUE);"),
                ],
            ),
            line(format!("return ({}) single_value;", field.template_type)),
        ]));
        class.method(MethodDef::new("public", &field.template_type, &field.const_accessor()).body(vec![
            if_(
                "template_selection != template_sel.SPECIFIC_VALUE",
                vec![throw(&format!(
                    "Accessing field {} in a non-specific template of union type {}.",
                    field.ident, value
                ))],
            ),
            if_(
                format!("single_value_union_selection != {}", selection),
                vec![throw(&format!(
                    "Accessing non-selected field {} in a template of union type {}.",
                    field.ident, value
                ))],
            ),
            line(format!("return ({}) single_value;", field.template_type)),
        ]));
    }

    // match
    let mut by_selection: Vec<Case> = fields
        .iter()
        .map(|f| {
            case(
                &[f.selection().as_str()],
                vec![line(format!(
                    "return (({}) single_value).match(otherValue.{}(), legacy);",
                    f.template_type,
                    f.const_accessor()
                ))],
            )
        })
        .collect();
    by_selection.push(default_case(vec![throw(&format!(
        "Internal error: Invalid selector in a specific value when matching a template of union type {}.",
        value
    ))]));
    let mut cases = vec![case(
        &["SPECIFIC_VALUE"],
        vec![
            line(format!("final {} value_selection = otherValue.get_selection();", selection_type)),
            if_(format!("value_selection == {}", unbound), vec![line("return false;")]),
            if_("value_selection != single_value_union_selection", vec![line("return false;")]),
            switch("value_selection", by_selection),
        ],
    )];
    cases.extend(template::match_generic_cases("otherValue", value));
    class.method(
        MethodDef::new("public", "boolean", "match")
            .param(value, "otherValue")
            .param("boolean", "legacy")
            .body(vec![
                if_("!otherValue.isBound()", vec![line("return false;")]),
                switch("template_selection", cases),
            ]),
    );

    class.method(template::clean_up(vec![
        line("single_value = null;"),
        line(format!("single_value_union_selection = {};", unbound)),
    ]));
    class
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::java::JavaPrinter;
    use crate::frontend::Identifier;

    fn printed(module: &GeneratedModule, name: &str) -> String {
        module.class(name).map(|c| JavaPrinter::new().print_class(c)).expect("class is generated")
    }

    #[test]
    fn test_union_accessors() {
        let mut module = GeneratedModule::new("gen", "M");
        let fields = vec![
            GenField::new(Identifier::new("i"), "TitanInteger".to_string()),
            GenField::new(Identifier::new("s"), "TitanCharString".to_string()),
        ];
        generate(&mut module, "U", "union", &fields, true);
        let class = printed(&module, "U");

        assert!(class.contains("public enum union_selection_type {\n\t\tUNBOUND_VALUE,\n\t\tALT_i,\n\t\tALT_s;\n\t}"));
        // get switches lazily, constGet refuses
        assert!(class.contains(
            "\tpublic TitanInteger get_field_i() {\n\
             \t\tif (union_selection != union_selection_type.ALT_i) {\n\
             \t\t\tcleanUp();\n\
             \t\t\tfield = new TitanInteger();\n\
             \t\t\tunion_selection = union_selection_type.ALT_i;\n\
             \t\t}\n\
             \t\treturn (TitanInteger) field;\n\
             \t}"
        ));
        assert!(class.contains("throw new TtcnError(\"using non-selected field in union: s of type U\");"));
        assert!(class.contains("performing ischosen on unbound union value of type U"));
        assert!(class.contains("performing ischosen on invalid union value"));
        assert!(class.contains("Assignment of an unbound union value of type U."));
        assert!(class.contains("return ((TitanCharString) field).operatorEquals((TitanCharString) otherValue.field);"));

        let template = printed(&module, "U_template");
        assert!(template.contains("private U.union_selection_type single_value_union_selection;"));
        assert!(template.contains("public void setType(final template_sel template_type, final int list_length) {"));
        assert!(template.contains("return ((TitanInteger_template) single_value).match(otherValue.constGet_field_i(), legacy);"));
    }
}
