//! Members shared by the generated template classes

use super::fragment::*;

const LIST_SELECTIONS: &[&str] = &["VALUE_LIST", "COMPLEMENTED_LIST"];

pub(super) fn import_runtime(module: &mut GeneratedModule) {
    module.import("Base_Template");
    module.import("Base_Template.template_sel");
    module.import("TtcnError");
    module.import_java("java.util.ArrayList");
    module.import_java("java.util.List");
}

pub(super) fn list_field(class: &mut ClassDef, name: &str) {
    class.field("private", &format!("List<{}>", name), "list_value", None);
}

/// `Name(template_sel)`: `?`, `*` and `omit`
pub(super) fn selection_constructor(name: &str) -> MethodDef {
    MethodDef::constructor(name)
        .param("template_sel", "otherValue")
        .body(vec![line("super(otherValue);"), line("checkSingleSelection(otherValue);")])
}

pub(super) fn assign_selection(name: &str) -> MethodDef {
    MethodDef::new("public", name, "assign").param("template_sel", "otherValue").body(vec![
        line("checkSingleSelection(otherValue);"),
        line("cleanUp();"),
        line("set_selection(otherValue);"),
        line("return this;"),
    ])
}

/// Turn the template into a value list or complemented list of
/// `list_length` uninitialized elements
pub(super) fn set_type(name: &str) -> MethodDef {
    MethodDef::new("public", "void", "setType")
        .param("template_sel", "template_type")
        .param("int", "list_length")
        .body(vec![
            if_(
                "template_type != template_sel.VALUE_LIST && template_type != template_sel.COMPLEMENTED_LIST",
                vec![throw(&format!("Setting an invalid list type for a template of type {}.", name))],
            ),
            line("cleanUp();"),
            line("set_selection(template_type);"),
            line(format!("list_value = new ArrayList<{}>(list_length);", name)),
            block(
                "for (int i = 0; i < list_length; i++)",
                vec![line(format!("list_value.add(new {}());", name))],
            ),
        ])
}

pub(super) fn list_item(name: &str) -> MethodDef {
    MethodDef::new("public", name, "listItem").param("int", "list_index").body(vec![
        if_(
            "template_selection != template_sel.VALUE_LIST && template_selection != template_sel.COMPLEMENTED_LIST",
            vec![throw(&format!("Accessing a list element of a non-list template of type {}.", name))],
        ),
        if_(
            "list_index < 0 || list_index >= list_value.size()",
            vec![throw(&format!("Index overflow in a value list template of type {}.", name))],
        ),
        line("return list_value.get(list_index);"),
    ])
}

/// `case VALUE_LIST/COMPLEMENTED_LIST` of a `copyTemplate` switch
pub(super) fn copy_list_case(name: &str) -> Case {
    case(
        LIST_SELECTIONS,
        vec![
            line(format!("list_value = new ArrayList<{}>(otherValue.list_value.size());", name)),
            block(
                "for (int i = 0; i < otherValue.list_value.size(); i++)",
                vec![line(format!("list_value.add(new {}(otherValue.list_value.get(i)));", name))],
            ),
            line("break;"),
        ],
    )
}

/// `case`s of a `match` switch that do not look at the specific value
pub(super) fn match_generic_cases(argument: &str, name: &str) -> Vec<Case> {
    vec![
        case(&["ANY_VALUE", "ANY_OR_OMIT"], vec![line("return true;")]),
        case(&["OMIT_VALUE"], vec![line("return false;")]),
        case(
            LIST_SELECTIONS,
            vec![
                block(
                    "for (int i = 0; i < list_value.size(); i++)",
                    vec![if_(
                        format!("list_value.get(i).match({}, legacy)", argument),
                        vec![line("return template_selection == template_sel.VALUE_LIST;")],
                    )],
                ),
                line("return template_selection == template_sel.COMPLEMENTED_LIST;"),
            ],
        ),
        default_case(vec![throw(&format!(
            "Matching with an uninitialized/unsupported template of type {}.",
            name
        ))]),
    ]
}

pub(super) fn clean_list_case() -> Case {
    case(
        LIST_SELECTIONS,
        vec![line("list_value.clear();"), line("list_value = null;"), line("break;")],
    )
}

/// `cleanUp` releasing the specific value through `specific`
pub(super) fn clean_up(specific: Vec<Stmt>) -> MethodDef {
    let mut specific = specific;
    specific.push(line("break;"));
    MethodDef::new("public", "void", "cleanUp").annotated("@Override").body(vec![
        switch(
            "template_selection",
            vec![
                case(&["SPECIFIC_VALUE"], specific),
                clean_list_case(),
                default_case(vec![line("break;")]),
            ],
        ),
        line("template_selection = template_sel.UNINITIALIZED_TEMPLATE;"),
    ])
}
