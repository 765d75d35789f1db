//! Code generation driver
//!
//! Walks the checked type graph and hands each type to the generator of its
//! category. Every type is emitted at most once per build timestamp.

use log::{debug, error, trace};

use super::class::ClassShape;
use super::fragment::{GeneratedModule, Member};
use super::names::{gen_name, generates_class, runtime_name, value_type_name};
use super::printer::JavaPrinter;
use super::{alias, class, enumerated, port, record_set, union, GenField};
use crate::backend::CodeGen;
use crate::frontend::ast::{AssignmentKind, CompilationUnit, TypeId};
use crate::types::{TypeKind, TypeOwner, Visibility};
use crate::utils::{CompilationTimestamp, Error, Result};

/// Package used when none is configured
pub const DEFAULT_PACKAGE: &str = "generated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub package: String,
    /// Emit a template class next to every value class
    pub generate_templates: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            generate_templates: true,
        }
    }
}

/// What one build generates with
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub timestamp: CompilationTimestamp,
    pub options: GeneratorOptions,
}

impl BuildContext {
    pub fn new(timestamp: CompilationTimestamp, options: GeneratorOptions) -> Self {
        Self { timestamp, options }
    }
}

/// Java code generator
pub struct JavaCodeGen {
    context: BuildContext,
}

impl JavaCodeGen {
    pub fn new(context: BuildContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }
}

impl CodeGen for JavaCodeGen {
    fn generate(&mut self, unit: &mut CompilationUnit) -> Result<String> {
        let module = generate_module(unit, &self.context)?;
        Ok(JavaPrinter::new().print_module(&module))
    }

    fn target(&self) -> &str {
        "java"
    }

    fn name(&self) -> &str {
        "Java"
    }
}

/// Generate every type assignment of a checked unit
pub fn generate_module(unit: &mut CompilationUnit, context: &BuildContext) -> Result<GeneratedModule> {
    let mut module = GeneratedModule::new(&context.options.package, &unit.name.target_name());
    let types: Vec<TypeId> = unit
        .assignment_ids()
        .filter_map(|a| match unit.assignment(a).kind {
            AssignmentKind::Type(ty) => Some(ty),
            _ => None,
        })
        .collect();
    if let Some(unchecked) = types.iter().find(|ty| unit.ty(**ty).last_checked.is_none()) {
        return Err(Error::CodeGen(format!(
            "type `{}' of module {} has not been checked",
            unit.type_name(*unchecked),
            unit.name
        )));
    }

    for ty in types {
        generate_code(unit, ty, context, &mut module);
    }
    debug!(
        "generated {} classes for module {} ({} fatal)",
        module.classes().count(),
        unit.name,
        module.fatal_errors().count()
    );
    Ok(module)
}

/// Generate the classes of `ty` into `module`, at most once per build
pub fn generate_code(unit: &mut CompilationUnit, ty: TypeId, context: &BuildContext, module: &mut GeneratedModule) {
    {
        let node = unit.ty_mut(ty);
        if !context.timestamp.is_newer_than(node.last_generated) {
            trace!("type {} already generated at {}", ty.0, context.timestamp);
            return;
        }
        node.last_generated = Some(context.timestamp);
    }

    let name = gen_name(unit, ty);
    if !is_generable(unit, ty) {
        fatal(module, &name, "the type is erroneous or unresolved");
        return;
    }
    debug!("generating code for type `{}'", name);
    let templates = context.options.generate_templates;
    let keyword = unit.ty(ty).category().keyword();

    if let TypeKind::Enumerated(enum_type) = &mut unit.ty_mut(ty).kind {
        let (items, sentinels) = enumerated::constants(enum_type);
        if items.len() != enum_type.items.len() {
            fatal(module, &name, "an enumeration item has no value");
            return;
        }
        enumerated::generate(module, &name, &items, sentinels, templates);
        return;
    }

    let kind = unit.ty(ty).kind.clone();
    match &kind {
        TypeKind::Boolean
        | TypeKind::Integer
        | TypeKind::Float
        | TypeKind::CharString
        | TypeKind::UniversalCharString
        | TypeKind::Asn1String(_) => {
            if let (true, Some(target)) = (generates_class(unit, ty), runtime_name(&kind)) {
                alias::generate(module, &name, target, templates, true);
            }
        }
        TypeKind::Referenced(reference) => {
            if !generates_class(unit, ty) {
                return;
            }
            let target = reference.refd.and_then(|refd| value_type_name(unit, refd).map(|n| (refd, n)));
            match target {
                Some((refd, target)) => {
                    let runtime = !generates_class(unit, refd);
                    alias::generate(module, &name, &target, templates, runtime);
                }
                None => fatal(module, &name, "the referenced type has no generated name"),
            }
        }
        TypeKind::Enumerated(_) => {}
        TypeKind::RecordSet(_) | TypeKind::Union(_) => {
            let Some(fields) = gen_fields(unit, ty, false) else {
                fatal(module, &name, "a field type is unresolved");
                return;
            };
            if matches!(kind, TypeKind::Union(_)) {
                union::generate(module, &name, keyword, &fields, templates);
            } else {
                record_set::generate(module, &name, keyword, &fields, templates);
            }
            generate_nested(unit, ty, context, module);
        }
        TypeKind::Class(class_type) => {
            let base = match class_type.base {
                Some(base) => match value_type_name(unit, base) {
                    Some(base_name) => Some(base_name),
                    None => {
                        fatal(module, &name, "the base class is unresolved");
                        return;
                    }
                },
                None => None,
            };
            let Some(members) = gen_fields(unit, ty, true) else {
                fatal(module, &name, "a member type is unresolved");
                return;
            };
            class::generate(
                module,
                ClassShape {
                    name: &name,
                    base,
                    is_abstract: class_type.is_abstract,
                    is_final: class_type.is_final,
                    members: &members,
                },
            );
            generate_nested(unit, ty, context, module);
        }
        TypeKind::Port(port_type) => {
            let incoming = message_names(unit, port_type.incoming());
            let outgoing = message_names(unit, port_type.outgoing());
            match (incoming, outgoing) {
                (Some(incoming), Some(outgoing)) => port::generate(module, &name, &incoming, &outgoing),
                _ => {
                    fatal(module, &name, "a message type is unresolved");
                    return;
                }
            }
            generate_nested(unit, ty, context, module);
        }
    }
}

fn is_generable(unit: &CompilationUnit, ty: TypeId) -> bool {
    let node = unit.ty(ty);
    if node.is_erroneous || node.last_checked.is_none() {
        return false;
    }
    match &node.kind {
        TypeKind::Referenced(reference) => reference.refd.is_some(),
        _ => true,
    }
}

fn fatal(module: &mut GeneratedModule, name: &str, reason: &str) {
    error!("INTERNAL_ERROR: cannot generate code for type `{}': {}", name, reason);
    module.members.push(Member::FatalError(name.to_string()));
}

/// Fields of a record, set or union; for classes only the members the class
/// declares itself
fn gen_fields(unit: &CompilationUnit, ty: TypeId, own_only: bool) -> Option<Vec<GenField>> {
    let fields = unit.ty(ty).fields()?;
    fields
        .iter()
        .filter(|f| !own_only || f.inherited_from.is_none())
        .map(|f| {
            let mut field = GenField::new(f.name.clone(), value_type_name(unit, f.ty)?);
            field.optional = f.optional;
            field.is_abstract = f.is_abstract;
            field.public = f.visibility == Visibility::Public;
            field.overrides = f.is_inherited;
            Some(field)
        })
        .collect()
}

/// Distinct Java classes of a port's message types
fn message_names(unit: &CompilationUnit, types: impl Iterator<Item = TypeId>) -> Option<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for ty in types {
        let name = value_type_name(unit, ty)?;
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Some(names)
}

/// Inline structured types declared inside `parent` get classes of their own
fn generate_nested(unit: &mut CompilationUnit, parent: TypeId, context: &BuildContext, module: &mut GeneratedModule) {
    let children: Vec<TypeId> = unit
        .type_ids()
        .filter(|child| match &unit.ty(*child).owner {
            Some(TypeOwner::Field { parent: p, .. }) | Some(TypeOwner::Anonymous { parent: p, .. }) => *p == parent,
            _ => false,
        })
        .filter(|child| generates_class(unit, *child))
        .collect();
    for child in children {
        generate_code(unit, child, context, module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::semantic::TypeChecker;
    use crate::types::{EnumItem, EnumeratedType, FieldDescriptor, FieldMap, RecordSetType, UnionType};
    use crate::utils::Diagnostics;
    use pretty_assertions::assert_eq;

    fn check(unit: &mut CompilationUnit, timestamp: CompilationTimestamp) -> Diagnostics {
        let mut sink = Diagnostics::new();
        TypeChecker::new(unit, &mut sink, timestamp).check_unit();
        sink
    }

    /// enumerated E, record R { integer a, E b optional, record { boolean x } c },
    /// union U, integer Small and Tiny (an alias of Small)
    fn sample_unit() -> CompilationUnit {
        let mut unit = CompilationUnit::new("Sample-Types");
        unit.define_type(
            "E",
            TypeKind::Enumerated(EnumeratedType::new(vec![
                EnumItem::new("red", None),
                EnumItem::new("green", Some(5)),
            ])),
        );
        let int = unit.add_type(TypeKind::Integer);
        let e = unit.reference_type("E");
        let flag = unit.add_type(TypeKind::Boolean);
        let inner = unit.add_type(TypeKind::RecordSet(RecordSetType {
            is_set: false,
            fields: FieldMap::from(vec![FieldDescriptor::new("x", flag)]),
        }));
        unit.define_type(
            "R",
            TypeKind::RecordSet(RecordSetType {
                is_set: false,
                fields: FieldMap::from(vec![
                    FieldDescriptor::new("a", int),
                    FieldDescriptor::new("b", e).optional(),
                    FieldDescriptor::new("c", inner),
                ]),
            }),
        );
        let alt = unit.add_type(TypeKind::CharString);
        unit.define_type(
            "U",
            TypeKind::Union(UnionType {
                fields: FieldMap::from(vec![FieldDescriptor::new("s", alt)]),
            }),
        );
        unit.define_type("Small", TypeKind::Integer);
        let tiny = unit.reference_type("Small");
        unit.add_assignment("Tiny", AssignmentKind::Type(tiny));
        unit
    }

    fn type_named(unit: &CompilationUnit, name: &str) -> TypeId {
        unit.resolve(None, name)
            .map(|a| unit.assignment(a).ty())
            .unwrap_or(TypeId(usize::MAX))
    }

    #[test]
    fn test_generate_twice_emits_once() {
        let mut unit = sample_unit();
        let first = CompilationTimestamp::first();
        assert!(check(&mut unit, first).is_empty());
        let r = type_named(&unit, "R");
        let context = BuildContext::new(first, GeneratorOptions::default());

        let mut module = GeneratedModule::new("gen", "M");
        generate_code(&mut unit, r, &context, &mut module);
        let once = module.members.len();
        generate_code(&mut unit, r, &context, &mut module);
        assert_eq!(module.members.len(), once);
        // R, R_template, R_c, R_c_template
        assert_eq!(once, 4);

        let next = BuildContext::new(first.next(), GeneratorOptions::default());
        generate_code(&mut unit, r, &next, &mut module);
        assert_eq!(module.members.len(), 2 * once);
    }

    #[test]
    fn test_generate_module() {
        let mut unit = sample_unit();
        let timestamp = CompilationTimestamp::first();
        assert!(check(&mut unit, timestamp).is_empty());
        let options = GeneratorOptions {
            package: "org.example".to_string(),
            generate_templates: false,
        };
        let mut generator = JavaCodeGen::new(BuildContext::new(timestamp, options));
        let text = generator.generate(&mut unit).expect("unit is generated");

        assert!(text.contains("package org.example;"));
        assert!(text.contains("public final class Sample_Types {"));
        assert!(text.contains("\t\t\tred(0),\n\t\t\tgreen(5),\n\t\t\tUNKNOWN_VALUE(1),\n\t\t\tUNBOUND_VALUE(2);"));
        assert!(text.contains("private final Optional<E> b = new Optional<E>(E.class);"));
        assert!(text.contains("private final R_c c = new R_c();"));
        assert!(text.contains("public static class R_c extends Base_Type {"));
        assert!(text.contains("public static class Small extends TitanInteger {"));
        assert!(text.contains("public static class Tiny extends Small {"));
        assert!(text.contains("public TitanCharString constGet_field_s() {"));
        assert!(!text.contains("_template"));
        assert!(!text.contains("FATAL_ERROR"));
    }

    #[test]
    fn test_erroneous_type_gets_fatal_marker() {
        let mut unit = CompilationUnit::new("M");
        let a = unit.reference_type("B");
        unit.add_assignment("A", AssignmentKind::Type(a));
        let b = unit.reference_type("A");
        unit.add_assignment("B", AssignmentKind::Type(b));
        unit.define_type("Fine", TypeKind::Boolean);
        let timestamp = CompilationTimestamp::first();
        let diagnostics = check(&mut unit, timestamp);
        assert!(diagnostics.contains("Circular type reference"));

        let module = generate_module(&mut unit, &BuildContext::new(timestamp, GeneratorOptions::default()));
        let module = module.expect("module is generated");
        assert!(module.fatal_errors().any(|name| name == "A"));
        assert!(module.class("Fine").is_some());
        let text = JavaPrinter::new().print_module(&module);
        assert!(text.contains("FATAL_ERROR encountered while processing `A'"));
    }

    #[test]
    fn test_unchecked_unit_is_rejected() {
        let mut unit = sample_unit();
        let context = BuildContext::new(CompilationTimestamp::first(), GeneratorOptions::default());
        let result = generate_module(&mut unit, &context);
        assert!(matches!(result, Err(Error::CodeGen(_))));
    }
}
