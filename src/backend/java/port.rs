//! Message port classes
//!
//! A `send` overload per outgoing type delegating to an abstract
//! `outgoing_send`, and an incoming queue fed by `incoming_message`.

use super::fragment::*;

pub const PORT_BASE: &str = "TitanPort";

pub(super) fn generate(module: &mut GeneratedModule, name: &str, incoming: &[String], outgoing: &[String]) {
    module.import(PORT_BASE);
    module.import("Base_Type");
    module.import("TtcnError");
    module.import_java("java.util.LinkedList");

    let mut class = ClassDef::new(name, PORT_BASE).documented(format!("Message port type `{}'", name));
    class.modifiers.push_str(" abstract");
    class.field(
        "private final",
        "LinkedList<Base_Type>",
        "message_queue",
        Some("new LinkedList<Base_Type>()".to_string()),
    );
    class.method(
        MethodDef::constructor(name)
            .param("String", "port_name")
            .body(vec![line("super(port_name);")]),
    );

    for message in outgoing {
        class.method(MethodDef::new("public", "void", "send").param(message, "send_par").body(vec![
            if_(
                "!is_started",
                vec![throw_expr(&format!(
                    "{} + get_name() + {}",
                    java_string("Sending a message on port "),
                    java_string(", which is not started.")
                ))],
            ),
            line("outgoing_send(send_par);"),
        ]));
        class.method(
            MethodDef::new("protected abstract", "void", "outgoing_send")
                .param(message, "send_par")
                .abstract_method(),
        );
    }

    for message in incoming {
        class.method(
            MethodDef::new("public", "void", "incoming_message")
                .param(message, "incoming_par")
                .body(vec![line(format!("message_queue.addLast(new {}(incoming_par));", message))]),
        );
    }

    class.method(
        MethodDef::new("public", "boolean", "has_message").body(vec![line("return !message_queue.isEmpty();")]),
    );
    class.method(MethodDef::new("public", "Base_Type", "peek_message").body(vec![
        if_(
            "message_queue.isEmpty()",
            vec![throw_expr(&format!(
                "{} + get_name() + {}",
                java_string("Port "),
                java_string(" has no message in its queue.")
            ))],
        ),
        line("return message_queue.getFirst();"),
    ]));
    class.method(MethodDef::new("public", "void", "remove_msg_queue_head").body(vec![
        if_("!message_queue.isEmpty()", vec![line("message_queue.removeFirst();")]),
    ]));
    class.method(
        MethodDef::new("public", "void", "clear_queue")
            .annotated("@Override")
            .body(vec![line("message_queue.clear();")]),
    );
    module.add_class(class);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::java::JavaPrinter;

    #[test]
    fn test_port_class() {
        let mut module = GeneratedModule::new("gen", "M");
        generate(
            &mut module,
            "P",
            &["Msg".to_string()],
            &["TitanInteger".to_string(), "Msg".to_string()],
        );
        let class = module.class("P").map(|c| JavaPrinter::new().print_class(c)).expect("class is generated");
        assert!(class.contains("public static abstract class P extends TitanPort {"));
        assert!(class.contains("public void send(final TitanInteger send_par) {"));
        assert!(class.contains("protected abstract void outgoing_send(final Msg send_par);"));
        assert!(class.contains("message_queue.addLast(new Msg(incoming_par));"));
        assert!(module.imports.contains("java.util.LinkedList"));
    }
}
