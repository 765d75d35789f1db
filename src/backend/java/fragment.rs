//! Structured pieces of a generated Java module
//!
//! Generators build these; [`JavaPrinter`](super::JavaPrinter) renders them.

use std::collections::BTreeSet;

/// Package of the runtime classes the generated code builds on
pub const RUNTIME_PACKAGE: &str = "ttcn.runtime";

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Line(String),
    /// `head { body }`
    Block { head: String, body: Vec<Stmt> },
    Switch { subject: String, cases: Vec<Case> },
}

/// A `case` group; no labels means `default`
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub labels: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub modifiers: String,
    pub ty: String,
    pub name: String,
    pub init: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    pub annotations: Vec<String>,
    pub modifiers: String,
    /// `None` for constructors
    pub ret: Option<String>,
    pub name: String,
    pub params: Vec<(String, String)>,
    /// `None` for abstract methods
    pub body: Option<Vec<Stmt>>,
}

impl MethodDef {
    pub fn new(modifiers: &str, ret: &str, name: &str) -> Self {
        Self {
            annotations: Vec::new(),
            modifiers: modifiers.to_string(),
            ret: Some(ret.to_string()),
            name: name.to_string(),
            params: Vec::new(),
            body: Some(Vec::new()),
        }
    }

    pub fn constructor(class: &str) -> Self {
        Self {
            annotations: Vec::new(),
            modifiers: "public".to_string(),
            ret: None,
            name: class.to_string(),
            params: Vec::new(),
            body: Some(Vec::new()),
        }
    }

    pub fn param(mut self, ty: &str, name: &str) -> Self {
        self.params.push((format!("final {}", ty), name.to_string()));
        self
    }

    pub fn annotated(mut self, annotation: &str) -> Self {
        self.annotations.push(annotation.to_string());
        self
    }

    pub fn body(mut self, body: Vec<Stmt>) -> Self {
        self.body = Some(body);
        self
    }

    /// Constructor of a Java `enum`, which takes no modifiers
    pub fn as_enum_constructor(mut self) -> Self {
        self.modifiers.clear();
        self.ret = None;
        self
    }

    pub fn abstract_method(mut self) -> Self {
        self.body = None;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    /// Rendered constants, e.g. `red(0)`
    pub constants: Vec<String>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub doc: Option<String>,
    pub modifiers: String,
    pub name: String,
    pub extends: Option<String>,
    pub members: Vec<Member>,
}

impl ClassDef {
    pub fn new(name: &str, extends: &str) -> Self {
        Self {
            doc: None,
            modifiers: "public static".to_string(),
            name: name.to_string(),
            extends: Some(extends.to_string()),
            members: Vec::new(),
        }
    }

    pub fn documented(mut self, doc: String) -> Self {
        self.doc = Some(doc);
        self
    }

    pub fn field(&mut self, modifiers: &str, ty: &str, name: &str, init: Option<String>) {
        self.members.push(Member::Field(FieldDef {
            modifiers: modifiers.to_string(),
            ty: ty.to_string(),
            name: name.to_string(),
            init,
        }));
    }

    pub fn method(&mut self, method: MethodDef) {
        self.members.push(Member::Method(method));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(FieldDef),
    Method(MethodDef),
    Enum(EnumDef),
    Class(ClassDef),
    /// Marker that stops the Java compiler on a type that could not be generated
    FatalError(String),
}

/// One generated Java file: a module class holding a nested class per type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedModule {
    pub package: String,
    pub name: String,
    pub imports: BTreeSet<String>,
    pub members: Vec<Member>,
}

impl GeneratedModule {
    pub fn new(package: &str, name: &str) -> Self {
        Self {
            package: package.to_string(),
            name: name.to_string(),
            imports: BTreeSet::new(),
            members: Vec::new(),
        }
    }

    /// Import a runtime class
    pub fn import(&mut self, class: &str) {
        self.imports.insert(format!("{}.{}", RUNTIME_PACKAGE, class));
    }

    pub fn import_java(&mut self, path: &str) {
        self.imports.insert(path.to_string());
    }

    pub fn add_class(&mut self, class: ClassDef) {
        self.members.push(Member::Class(class));
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.members.iter().filter_map(|m| match m {
            Member::Class(class) => Some(class),
            _ => None,
        })
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes().find(|c| c.name == name)
    }

    pub fn fatal_errors(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|m| match m {
            Member::FatalError(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

// ==================== Statement helpers ====================

pub fn line(text: impl Into<String>) -> Stmt {
    Stmt::Line(text.into())
}

pub fn block(head: impl Into<String>, body: Vec<Stmt>) -> Stmt {
    Stmt::Block { head: head.into(), body }
}

pub fn if_(condition: impl AsRef<str>, body: Vec<Stmt>) -> Stmt {
    block(format!("if ({})", condition.as_ref()), body)
}

pub fn case(labels: &[&str], body: Vec<Stmt>) -> Case {
    Case {
        labels: labels.iter().map(|l| l.to_string()).collect(),
        body,
    }
}

pub fn default_case(body: Vec<Stmt>) -> Case {
    Case { labels: Vec::new(), body }
}

pub fn switch(subject: impl Into<String>, cases: Vec<Case>) -> Stmt {
    Stmt::Switch { subject: subject.into(), cases }
}

/// `throw new TtcnError(...)` with a literal message
pub fn throw(message: &str) -> Stmt {
    Stmt::Line(format!("throw new TtcnError({});", java_string(message)))
}

/// `throw new TtcnError(...)` with a message expression
pub fn throw_expr(expression: &str) -> Stmt {
    Stmt::Line(format!("throw new TtcnError({});", expression))
}

/// Java string literal for `text`
pub fn java_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_java_string_escapes() {
        assert_eq!(java_string("a \"b\""), "\"a \\\"b\\\"\"");
        assert_eq!(java_string("x\\y"), "\"x\\\\y\"");
        assert_eq!(java_string("é"), "\"\\u00e9\"");
        assert_eq!(java_string("\u{1f600}"), "\"\\ud83d\\ude00\"");
    }

    #[test]
    fn test_imports_are_sorted_and_unique() {
        let mut module = GeneratedModule::new("p", "M");
        module.import("TtcnError");
        module.import("Base_Type");
        module.import("TtcnError");
        let imports: Vec<&str> = module.imports.iter().map(|s| s.as_str()).collect();
        assert_eq!(imports, vec!["ttcn.runtime.Base_Type", "ttcn.runtime.TtcnError"]);
    }
}
