//! Classes for named builtin types and type references
//!
//! `type integer Small (0..10)` and `type Small Tiny` both become thin
//! subclasses of the class that holds their values.

use super::fragment::*;
use super::names::TEMPLATE_SUFFIX;

pub(super) fn generate(module: &mut GeneratedModule, name: &str, target: &str, templates: bool, runtime: bool) {
    if runtime {
        module.import(target);
    }
    module.add_class(alias_class(name, target, "value"));
    if templates {
        let target_template = format!("{}{}", target, TEMPLATE_SUFFIX);
        if runtime {
            module.import(&target_template);
        }
        module.import("Base_Template.template_sel");
        let template_name = format!("{}{}", name, TEMPLATE_SUFFIX);
        let mut class = alias_class(&template_name, &target_template, "template");
        class.method(
            MethodDef::constructor(&template_name)
                .param("template_sel", "otherValue")
                .body(vec![line("super(otherValue);")]),
        );
        class.method(
            MethodDef::constructor(&template_name)
                .param(target, "otherValue")
                .body(vec![line("super(otherValue);")]),
        );
        module.add_class(class);
    }
}

fn alias_class(name: &str, target: &str, what: &str) -> ClassDef {
    let mut class = ClassDef::new(name, target).documented(format!("{} class of `{}', an alias of `{}'", capital(what), name, target));
    class.method(MethodDef::constructor(name).body(vec![line("super();")]));
    class.method(
        MethodDef::constructor(name)
            .param(target, "otherValue")
            .body(vec![line("super(otherValue);")]),
    );
    class
}

fn capital(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::java::JavaPrinter;

    #[test]
    fn test_builtin_alias() {
        let mut module = GeneratedModule::new("gen", "M");
        generate(&mut module, "Small", "TitanInteger", true, true);
        assert!(module.imports.contains("ttcn.runtime.TitanInteger"));
        assert!(module.imports.contains("ttcn.runtime.TitanInteger_template"));

        let value = module.class("Small").map(|c| JavaPrinter::new().print_class(c)).expect("class is generated");
        assert!(value.contains("public static class Small extends TitanInteger {"));
        assert!(value.contains("public Small(final TitanInteger otherValue) {"));

        let template = module.class("Small_template").map(|c| JavaPrinter::new().print_class(c)).expect("class is generated");
        assert!(template.contains("public static class Small_template extends TitanInteger_template {"));
        assert!(template.contains("public Small_template(final template_sel otherValue) {"));
        assert!(template.contains("public Small_template(final TitanInteger otherValue) {"));
    }

    #[test]
    fn test_reference_alias_imports_nothing() {
        let mut module = GeneratedModule::new("gen", "M");
        generate(&mut module, "Tiny", "Small", false, false);
        assert!(module.imports.is_empty());
        generate(&mut module, "Tiny2", "Small", true, false);
        assert!(!module.imports.contains("ttcn.runtime.Small_template"));
        assert!(module.class("Tiny").is_some());
    }
}
