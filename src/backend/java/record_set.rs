//! Record and set classes
//!
//! Both share one strategy: a slot per field (wrapped in `Optional` when the
//! field is optional), field-wise assignment, and field-wise comparison in
//! declaration order.

use super::fragment::*;
use super::{template, GenField};

pub(super) fn generate(module: &mut GeneratedModule, name: &str, keyword: &str, fields: &[GenField], templates: bool) {
    module.import("Base_Type");
    module.import("TtcnError");
    if fields.iter().any(|f| f.optional) {
        module.import("Optional");
    }
    module.add_class(value_class(name, keyword, fields));
    if templates {
        template::import_runtime(module);
        module.add_class(template_class(name, keyword, fields));
    }
}

/// Polymorphic `assign` and `operatorEquals` delegate to the typed overloads
pub(super) fn cast_error(name: &str) -> Stmt {
    throw_expr(&format!(
        "{} + otherValue.getClass().getSimpleName()",
        java_string(&format!("internal error: value cannot be cast to {} from ", name))
    ))
}

pub(super) fn polymorphic(name: &str, ret: &str, method: &str, base: &str) -> MethodDef {
    MethodDef::new("public", ret, method)
        .annotated("@Override")
        .param(base, "otherValue")
        .body(vec![
            if_(
                format!("otherValue instanceof {}", name),
                vec![line(format!("return {}(({}) otherValue);", method, name))],
            ),
            cast_error(name),
        ])
}

fn value_class(name: &str, keyword: &str, fields: &[GenField]) -> ClassDef {
    let mut class = ClassDef::new(name, "Base_Type").documented(format!("Value class of {} type `{}'", keyword, name));
    for field in fields {
        class.field("private final", &field.storage_type(), &field.java, Some(field.storage_init()));
    }

    class.method(MethodDef::constructor(name));
    if !fields.is_empty() {
        let mut all_fields = MethodDef::constructor(name);
        let mut body = Vec::new();
        for field in fields {
            all_fields = all_fields.param(&field.storage_type(), &field.java);
            body.push(line(format!("this.{0}.assign({0});", field.java)));
        }
        class.method(all_fields.body(body));
    }
    class.method(MethodDef::constructor(name).param(name, "otherValue").body(vec![line("assign(otherValue);")]));

    // assign
    let mut copy = Vec::new();
    for field in fields {
        copy.push(if_(
            format!("otherValue.{}.isBound()", field.java),
            vec![line(format!("this.{0}.assign(otherValue.{0});", field.java))],
        ));
        copy.push(block("else", vec![line(format!("this.{}.cleanUp();", field.java))]));
    }
    class.method(MethodDef::new("public", name, "assign").param(name, "otherValue").body(vec![
        if_(
            "!otherValue.isBound()",
            vec![throw(&format!("assignment of unbound value of type {}", name))],
        ),
        if_("otherValue != this", copy),
        line("return this;"),
    ]));
    class.method(polymorphic(name, name, "assign", "Base_Type"));

    let clean: Vec<Stmt> = fields.iter().map(|f| line(format!("{}.cleanUp();", f.java))).collect();
    class.method(MethodDef::new("public", "void", "cleanUp").annotated("@Override").body(clean));

    let is_bound = if fields.is_empty() {
        "return true;".to_string()
    } else {
        let any: Vec<String> = fields.iter().map(|f| format!("{}.isBound()", f.java)).collect();
        format!("return {};", any.join(" || "))
    };
    class.method(MethodDef::new("public", "boolean", "isBound").annotated("@Override").body(vec![line(is_bound)]));
    class.method(
        MethodDef::new("public", "boolean", "isPresent")
            .annotated("@Override")
            .body(vec![line("return isBound();")]),
    );

    // true as soon as one present field is a value
    let mut is_value: Vec<Stmt> = fields
        .iter()
        .map(|f| {
            let condition = if f.optional {
                format!("{0}.isPresent() && {0}.isValue()", f.java)
            } else {
                format!("{}.isValue()", f.java)
            };
            if_(condition, vec![line("return true;")])
        })
        .collect();
    is_value.push(line(if fields.is_empty() { "return true;" } else { "return false;" }));
    class.method(MethodDef::new("public", "boolean", "isValue").annotated("@Override").body(is_value));

    let equals = if fields.is_empty() {
        "return true;".to_string()
    } else {
        let all: Vec<String> = fields.iter().map(|f| format!("{0}.operatorEquals(otherValue.{0})", f.java)).collect();
        format!("return {};", all.join(" && "))
    };
    class.method(MethodDef::new("public", "boolean", "operatorEquals").param(name, "otherValue").body(vec![line(equals)]));
    class.method(polymorphic(name, "boolean", "operatorEquals", "Base_Type"));

    for field in fields {
        let getter = vec![line(format!("return {};", field.java))];
        class.method(MethodDef::new("public", &field.storage_type(), &field.accessor()).body(getter.clone()));
        class.method(MethodDef::new("public", &field.storage_type(), &field.const_accessor()).body(getter));
    }
    class
}

fn template_class(value: &str, keyword: &str, fields: &[GenField]) -> ClassDef {
    let name = format!("{}{}", value, super::names::TEMPLATE_SUFFIX);
    let mut class =
        ClassDef::new(&name, "Base_Template").documented(format!("Template class of {} type `{}'", keyword, value));
    for field in fields {
        class.field("private", &field.template_type, &field.java, None);
    }
    template::list_field(&mut class, &name);

    class.method(MethodDef::constructor(&name));
    class.method(template::selection_constructor(&name));
    class.method(MethodDef::constructor(&name).param(value, "otherValue").body(vec![line("copyValue(otherValue);")]));
    class.method(MethodDef::constructor(&name).param(&name, "otherValue").body(vec![line("copyTemplate(otherValue);")]));

    // setSpecific
    let mut fresh: Vec<Stmt> = vec![line("cleanUp();"), line("set_selection(template_sel.SPECIFIC_VALUE);")];
    fresh.extend(fields.iter().map(|f| line(format!("{} = new {}();", f.java, f.template_type))));
    class.method(
        MethodDef::new("private", "void", "setSpecific")
            .body(vec![if_("template_selection != template_sel.SPECIFIC_VALUE", fresh)]),
    );

    // copyValue
    let mut copy_value = Vec::new();
    for field in fields {
        let source = format!("otherValue.{}()", field.const_accessor());
        if field.optional {
            copy_value.push(if_(
                format!("{}.isPresent()", source),
                vec![line(format!("{} = new {}({}.constGet());", field.java, field.template_type, source))],
            ));
            copy_value.push(block(
                format!("else if ({}.isOmit())", source),
                vec![line(format!("{} = new {}(template_sel.OMIT_VALUE);", field.java, field.template_type))],
            ));
        } else {
            copy_value.push(if_(
                format!("{}.isBound()", source),
                vec![line(format!("{} = new {}({});", field.java, field.template_type, source))],
            ));
        }
        copy_value.push(block("else", vec![line(format!("{} = new {}();", field.java, field.template_type))]));
    }
    copy_value.push(line("set_selection(template_sel.SPECIFIC_VALUE);"));
    class.method(MethodDef::new("private", "void", "copyValue").param(value, "otherValue").body(copy_value));

    // copyTemplate
    let mut specific: Vec<Stmt> = fields
        .iter()
        .map(|f| line(format!("{0} = new {1}(otherValue.{0});", f.java, f.template_type)))
        .collect();
    specific.push(line("break;"));
    class.method(MethodDef::new("private", "void", "copyTemplate").param(&name, "otherValue").body(vec![
        switch(
            "otherValue.template_selection",
            vec![
                case(&["SPECIFIC_VALUE"], specific),
                case(&["OMIT_VALUE", "ANY_VALUE", "ANY_OR_OMIT"], vec![line("break;")]),
                template::copy_list_case(&name),
                default_case(vec![throw(&format!(
                    "Copying an uninitialized/unsupported template of type {}.",
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
        class.method(
            MethodDef::new("public", &field.template_type, &field.accessor())
                .body(vec![line("setSpecific();"), line(format!("return {};", field.java))]),
        );
        class.method(MethodDef::new("public", &field.template_type, &field.const_accessor()).body(vec![
            if_(
                "template_selection != template_sel.SPECIFIC_VALUE",
                vec![throw(&format!(
                    "Accessing field {} of a non-specific template of type {}.",
                    field.ident, value
                ))],
            ),
            line(format!("return {};", field.java)),
        ]));
    }

    // match
    let mut specific_match = Vec::new();
    for field in fields {
        let source = format!("otherValue.{}()", field.const_accessor());
        let condition = if field.optional {
            format!(
                "{0}.isPresent() ? !{1}.match({0}.constGet(), legacy) : !{1}.match_omit(legacy)",
                source, field.java
            )
        } else {
            format!("!{}.match({}, legacy)", field.java, source)
        };
        specific_match.push(if_(condition, vec![line("return false;")]));
    }
    specific_match.push(line("return true;"));
    let mut cases = vec![case(&["SPECIFIC_VALUE"], specific_match)];
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

    let release: Vec<Stmt> = fields.iter().map(|f| line(format!("{} = null;", f.java))).collect();
    class.method(template::clean_up(release));
    class
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::java::JavaPrinter;
    use crate::frontend::Identifier;

    fn fields() -> Vec<GenField> {
        vec![
            GenField::new(Identifier::new("a"), "TitanInteger".to_string()),
            GenField::new(Identifier::new("b"), "TitanCharString".to_string()).optional(),
        ]
    }

    #[test]
    fn test_record_value_class() {
        let mut module = GeneratedModule::new("gen", "M");
        generate(&mut module, "R", "record", &fields(), false);
        assert!(module.imports.contains("ttcn.runtime.Optional"));
        let class = module.class("R").map(|c| JavaPrinter::new().print_class(c)).expect("class is generated");

        assert!(class.contains("private final TitanInteger a = new TitanInteger();"));
        assert!(class.contains(
            "private final Optional<TitanCharString> b = new Optional<TitanCharString>(TitanCharString.class);"
        ));
        assert!(class.contains("public R(final TitanInteger a, final Optional<TitanCharString> b) {"));
        assert!(class.contains("throw new TtcnError(\"assignment of unbound value of type R\");"));
        assert!(class.contains("\"internal error: value cannot be cast to R from \" + otherValue.getClass().getSimpleName()"));
        assert!(class.contains("return a.isBound() || b.isBound();"));
        assert!(class.contains("if (b.isPresent() && b.isValue()) {"));
        assert!(class.contains("return a.operatorEquals(otherValue.a) && b.operatorEquals(otherValue.b);"));
        assert!(class.contains("public Optional<TitanCharString> constGet_field_b() {"));
        assert!(module.class("R_template").is_none());
    }

    #[test]
    fn test_record_template_class() {
        let mut module = GeneratedModule::new("gen", "M");
        generate(&mut module, "R", "record", &fields(), true);
        let template = module.class("R_template").map(|c| JavaPrinter::new().print_class(c)).expect("class is generated");
        assert!(template.contains("private TitanInteger_template a;"));
        assert!(template.contains("public void setType(final template_sel template_type, final int list_length) {"));
        assert!(template.contains("public TitanCharString_template get_field_b() {"));
        assert!(template.contains(
            "if (otherValue.constGet_field_b().isPresent() ? !b.match(otherValue.constGet_field_b().constGet(), legacy) : !b.match_omit(legacy)) {"
        ));
    }

    #[test]
    fn test_empty_record() {
        let mut module = GeneratedModule::new("gen", "M");
        generate(&mut module, "Empty", "record", &[], false);
        let class = module.class("Empty").map(|c| JavaPrinter::new().print_class(c)).expect("class is generated");
        assert!(!module.imports.contains("ttcn.runtime.Optional"));
        assert!(!class.contains("public Empty(final TitanInteger"));
        assert!(class.contains("return true;"));
    }
}
