//! Java-flavoured value and template class generator
//!
//! Each checked type becomes a value class (and, unless disabled, a template
//! class) nested in one class per module. Generators build
//! [`fragment`]s; [`JavaPrinter`] renders them.

pub mod fragment;
pub mod names;
mod printer;
mod template;
mod alias;
mod class;
mod enumerated;
mod port;
mod record_set;
mod union;
mod driver;

pub use driver::{generate_code, generate_module, BuildContext, GeneratorOptions, JavaCodeGen};
pub use fragment::GeneratedModule;
pub use printer::JavaPrinter;

use crate::frontend::Identifier;

/// A field, alternative or class member as the generators see it
#[derive(Debug, Clone)]
pub(crate) struct GenField {
    pub ident: Identifier,
    /// Java spelling of the name
    pub java: String,
    pub value_type: String,
    pub template_type: String,
    pub optional: bool,
    pub is_abstract: bool,
    pub public: bool,
    /// Implements an inherited abstract member
    pub overrides: bool,
}

impl GenField {
    pub fn new(ident: Identifier, value_type: String) -> Self {
        Self {
            java: ident.target_name(),
            template_type: format!("{}{}", value_type, names::TEMPLATE_SUFFIX),
            ident,
            value_type,
            optional: false,
            is_abstract: false,
            public: false,
            overrides: false,
        }
    }

    #[cfg(test)]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[cfg(test)]
    pub fn abstract_member(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[cfg(test)]
    pub fn overriding(mut self) -> Self {
        self.overrides = true;
        self
    }

    /// Type of the slot holding the field
    pub fn storage_type(&self) -> String {
        if self.optional {
            format!("Optional<{}>", self.value_type)
        } else {
            self.value_type.clone()
        }
    }

    pub fn storage_init(&self) -> String {
        if self.optional {
            format!("new Optional<{0}>({0}.class)", self.value_type)
        } else {
            format!("new {}()", self.value_type)
        }
    }

    pub fn accessor(&self) -> String {
        names::accessor(&self.ident)
    }

    pub fn const_accessor(&self) -> String {
        names::const_accessor(&self.ident)
    }

    pub fn selection(&self) -> String {
        names::selection_name(&self.ident)
    }
}
