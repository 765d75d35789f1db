//! Java Printer - render generated fragments as source text

use super::fragment::*;

/// Pretty printer for generated modules
pub struct JavaPrinter {
    output: String,
    indent: usize,
}

impl JavaPrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Print a module to string
    pub fn print_module(&mut self, module: &GeneratedModule) -> String {
        self.output.clear();
        self.indent = 0;

        self.writeln("// This Java file was generated by ttcnc. Do not edit.");
        if !module.package.is_empty() {
            self.writeln(&format!("package {};", module.package));
        }
        self.blank();
        if !module.imports.is_empty() {
            for import in &module.imports {
                self.writeln(&format!("import {};", import));
            }
            self.blank();
        }

        self.writeln(&format!("public final class {} {{", module.name));
        self.indent += 1;
        self.print_members(&module.members);
        self.indent -= 1;
        self.writeln("}");

        std::mem::take(&mut self.output)
    }

    /// Print a single class, used by the tests
    pub fn print_class(&mut self, class: &ClassDef) -> String {
        self.output.clear();
        self.indent = 0;
        self.print_class_def(class);
        std::mem::take(&mut self.output)
    }

    fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push('\t');
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn blank(&mut self) {
        self.output.push('\n');
    }

    fn print_members(&mut self, members: &[Member]) {
        for (i, member) in members.iter().enumerate() {
            // fields stay packed together
            let field_run = matches!(member, Member::Field(_)) && matches!(members.get(i + 1), Some(Member::Field(_)));
            match member {
                Member::Field(field) => self.print_field(field),
                Member::Method(method) => self.print_method(method),
                Member::Enum(def) => self.print_enum(def),
                Member::Class(class) => self.print_class_def(class),
                Member::FatalError(name) => {
                    self.writeln(&format!("FATAL_ERROR encountered while processing `{}'", name));
                }
            }
            if !field_run && i + 1 < members.len() {
                self.blank();
            }
        }
    }

    fn print_field(&mut self, field: &FieldDef) {
        let mut text = format!("{} {} {}", field.modifiers, field.ty, field.name);
        if let Some(init) = &field.init {
            text.push_str(" = ");
            text.push_str(init);
        }
        text.push(';');
        self.writeln(text.trim_start());
    }

    fn print_class_def(&mut self, class: &ClassDef) {
        if let Some(doc) = &class.doc {
            self.writeln("/**");
            for line in doc.lines() {
                self.writeln(&format!(" * {}", line));
            }
            self.writeln(" */");
        }
        let mut head = format!("{} class {}", class.modifiers, class.name);
        if let Some(base) = &class.extends {
            head.push_str(" extends ");
            head.push_str(base);
        }
        self.writeln(&format!("{} {{", head.trim_start()));
        self.indent += 1;
        self.print_members(&class.members);
        self.indent -= 1;
        self.writeln("}");
    }

    fn print_enum(&mut self, def: &EnumDef) {
        self.writeln(&format!("public enum {} {{", def.name));
        self.indent += 1;
        let count = def.constants.len();
        for (i, constant) in def.constants.iter().enumerate() {
            let end = if i + 1 == count { ";" } else { "," };
            self.writeln(&format!("{}{}", constant, end));
        }
        if !def.members.is_empty() {
            self.blank();
            self.print_members(&def.members);
        }
        self.indent -= 1;
        self.writeln("}");
    }

    fn print_method(&mut self, method: &MethodDef) {
        for annotation in &method.annotations {
            self.writeln(annotation);
        }
        let params: Vec<String> = method.params.iter().map(|(ty, name)| format!("{} {}", ty, name)).collect();
        let mut head = method.modifiers.clone();
        if let Some(ret) = &method.ret {
            head.push(' ');
            head.push_str(ret);
        }
        head.push(' ');
        head.push_str(&method.name);
        head.push('(');
        head.push_str(&params.join(", "));
        head.push(')');
        let head = head.trim_start().to_string();
        match &method.body {
            None => self.writeln(&format!("{};", head)),
            Some(body) => {
                self.writeln(&format!("{} {{", head));
                self.indent += 1;
                self.print_stmts(body);
                self.indent -= 1;
                self.writeln("}");
            }
        }
    }

    fn print_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.print_stmt(stmt);
        }
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Line(text) => self.writeln(text),
            Stmt::Block { head, body } => {
                self.writeln(&format!("{} {{", head));
                self.indent += 1;
                self.print_stmts(body);
                self.indent -= 1;
                self.writeln("}");
            }
            Stmt::Switch { subject, cases } => {
                self.writeln(&format!("switch ({}) {{", subject));
                for case in cases {
                    if case.labels.is_empty() {
                        self.writeln("default:");
                    }
                    for label in &case.labels {
                        self.writeln(&format!("case {}:", label));
                    }
                    self.indent += 1;
                    self.print_stmts(&case.body);
                    self.indent -= 1;
                }
                self.writeln("}");
            }
        }
    }
}

impl Default for JavaPrinter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_print_class_with_switch() {
        let mut class = ClassDef::new("E", "Base_Type");
        class.field("private", "int", "x", Some("0".to_string()));
        class.method(MethodDef::new("public", "boolean", "isZero").body(vec![switch(
            "x",
            vec![case(&["0"], vec![line("return true;")]), default_case(vec![line("return false;")])],
        )]));
        let text = JavaPrinter::new().print_class(&class);
        let expected = "\
public static class E extends Base_Type {
\tprivate int x = 0;

\tpublic boolean isZero() {
\t\tswitch (x) {
\t\tcase 0:
\t\t\treturn true;
\t\tdefault:
\t\t\treturn false;
\t\t}
\t}
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_fatal_error_marker() {
        let mut module = GeneratedModule::new("gen", "M");
        module.members.push(Member::FatalError("M.T".to_string()));
        let text = JavaPrinter::new().print_module(&module);
        assert!(text.contains("package gen;"));
        assert!(text.contains("\tFATAL_ERROR encountered while processing `M.T'\n"));
    }

    #[test]
    fn test_abstract_method() {
        let mut class = ClassDef::new("C", "TitanObject");
        class.modifiers = "public static abstract".to_string();
        class.method(MethodDef::new("public abstract", "TitanInteger", "get_area").abstract_method());
        let text = JavaPrinter::new().print_class(&class);
        assert!(text.contains("public static abstract class C extends TitanObject {"));
        assert!(text.contains("\tpublic abstract TitanInteger get_area();"));
    }
}
