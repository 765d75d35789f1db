//! Compilation unit arena
//!
//! The parser hands over a [`CompilationUnit`] owning every type, value,
//! template, assignment and scope node. Nodes refer to each other through the
//! index newtypes below; nothing holds an owning pointer to another node.
//! Units are loaded from the JSON interchange document or assembled with the
//! `add_*`/`define_*` builders.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::frontend::template::{LengthRestriction, RangeBound, TemplateKind, TemplateNode};
use crate::frontend::value::{ValueKind, ValueNode};
use crate::frontend::{Identifier, Reference, SubReference};
use crate::types::{FieldDescriptor, TypeKind, TypeNode, TypeOwner};
use crate::utils::{Error, Location, Result};

macro_rules! node_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);
    };
}

node_id!(
    /// Index of a [`TypeNode`]
    TypeId
);
node_id!(
    /// Index of a [`ValueNode`]
    ValueId
);
node_id!(
    /// Index of a [`TemplateNode`]
    TemplateId
);
node_id!(AssignmentId);
node_id!(ScopeId);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssignmentKind {
    Type(TypeId),
    Constant { ty: TypeId, value: ValueId },
    Template { ty: TypeId, template: TemplateId },
    ModulePar { ty: TypeId, value: Option<ValueId> },
}

/// A named definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub identifier: Identifier,
    pub kind: AssignmentKind,
    #[serde(default)]
    pub location: Location,
}

impl Assignment {
    /// Type of the defined entity (the type itself for type assignments)
    pub fn ty(&self) -> TypeId {
        match self.kind {
            AssignmentKind::Type(ty)
            | AssignmentKind::Constant { ty, .. }
            | AssignmentKind::Template { ty, .. }
            | AssignmentKind::ModulePar { ty, .. } => ty,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self.kind {
            AssignmentKind::Type(_) => "type",
            AssignmentKind::Constant { .. } => "constant",
            AssignmentKind::Template { .. } => "template",
            AssignmentKind::ModulePar { .. } => "module parameter",
        }
    }
}

/// Named definitions visible at some point; parents are searched outward
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default)]
    pub parent: Option<ScopeId>,
    #[serde(default)]
    pub assignments: IndexMap<String, AssignmentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Module name
    pub name: Identifier,
    #[serde(default)]
    pub asn1: bool,
    #[serde(default)]
    pub types: Vec<TypeNode>,
    #[serde(default)]
    pub values: Vec<ValueNode>,
    #[serde(default)]
    pub templates: Vec<TemplateNode>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    /// Scope 0 is the module scope
    #[serde(default)]
    pub scopes: Vec<Scope>,
}

impl CompilationUnit {
    pub fn new(name: &str) -> Self {
        Self {
            name: Identifier::new(name),
            asn1: false,
            types: Vec::new(),
            values: Vec::new(),
            templates: Vec::new(),
            assignments: Vec::new(),
            scopes: vec![Scope::default()],
        }
    }

    /// Load a unit from its JSON interchange form
    pub fn from_json(source: &str) -> Result<Self> {
        let mut unit: CompilationUnit = serde_json::from_str(source)?;
        unit.validate()?;
        unit.link();
        log::debug!(
            "loaded module {}: {} types, {} values, {} templates, {} assignments",
            unit.name,
            unit.types.len(),
            unit.values.len(),
            unit.templates.len(),
            unit.assignments.len()
        );
        Ok(unit)
    }

    // ==================== Node access ====================

    pub fn ty(&self, id: TypeId) -> &TypeNode {
        &self.types[id.0]
    }

    pub fn ty_mut(&mut self, id: TypeId) -> &mut TypeNode {
        &mut self.types[id.0]
    }

    pub fn value(&self, id: ValueId) -> &ValueNode {
        &self.values[id.0]
    }

    pub fn value_mut(&mut self, id: ValueId) -> &mut ValueNode {
        &mut self.values[id.0]
    }

    pub fn template(&self, id: TemplateId) -> &TemplateNode {
        &self.templates[id.0]
    }

    pub fn template_mut(&mut self, id: TemplateId) -> &mut TemplateNode {
        &mut self.templates[id.0]
    }

    pub fn assignment(&self, id: AssignmentId) -> &Assignment {
        &self.assignments[id.0]
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> {
        (0..self.types.len()).map(TypeId)
    }

    pub fn assignment_ids(&self) -> impl Iterator<Item = AssignmentId> {
        (0..self.assignments.len()).map(AssignmentId)
    }

    /// Type assignment defining `id`, if the type is named
    pub fn defining_assignment(&self, id: TypeId) -> Option<AssignmentId> {
        match self.ty(id).owner {
            Some(TypeOwner::Assignment(a)) => Some(a),
            _ => None,
        }
    }

    /// Name of a type as shown in diagnostics
    pub fn type_name(&self, id: TypeId) -> String {
        if let Some(assignment) = self.defining_assignment(id) {
            return self.assignment(assignment).identifier.name.clone();
        }
        let node = self.ty(id);
        match &node.kind {
            TypeKind::Referenced(r) => r.reference.to_string(),
            _ => node.category().keyword().to_string(),
        }
    }

    // ==================== Scope resolution ====================

    /// Look a name up starting at `scope`, searching parents outward
    pub fn resolve(&self, scope: Option<ScopeId>, name: &str) -> Option<AssignmentId> {
        let mut current = scope.or(if self.scopes.is_empty() { None } else { Some(ScopeId(0)) });
        while let Some(id) = current {
            let scope = self.scopes.get(id.0)?;
            if let Some(found) = scope.assignments.get(name) {
                return Some(*found);
            }
            current = scope.parent;
        }
        None
    }

    // ==================== Builders ====================

    pub fn add_type(&mut self, kind: TypeKind) -> TypeId {
        let mut node = TypeNode::new(kind);
        node.asn1 = self.asn1;
        self.types.push(node);
        let id = TypeId(self.types.len() - 1);
        self.link_children(id);
        id
    }

    pub fn add_value(&mut self, kind: ValueKind) -> ValueId {
        let mut node = ValueNode::new(kind);
        node.asn1 = self.asn1;
        self.values.push(node);
        ValueId(self.values.len() - 1)
    }

    pub fn add_template(&mut self, kind: TemplateKind) -> TemplateId {
        self.templates.push(TemplateNode::new(kind));
        TemplateId(self.templates.len() - 1)
    }

    /// Register a named definition in the module scope
    pub fn add_assignment(&mut self, name: &str, kind: AssignmentKind) -> AssignmentId {
        let id = AssignmentId(self.assignments.len());
        if let AssignmentKind::Type(ty) = kind {
            let node = self.ty_mut(ty);
            if node.owner.is_none() {
                node.owner = Some(TypeOwner::Assignment(id));
            }
            if node.scope.is_none() {
                node.scope = Some(ScopeId(0));
            }
        }
        self.assignments.push(Assignment {
            identifier: Identifier::new(name),
            kind,
            location: Location::dummy(),
        });
        if self.scopes.is_empty() {
            self.scopes.push(Scope::default());
        }
        self.scopes[0].assignments.entry(name.to_string()).or_insert(id);
        id
    }

    /// `type <kind> name`
    pub fn define_type(&mut self, name: &str, kind: TypeKind) -> TypeId {
        let ty = self.add_type(kind);
        self.add_assignment(name, AssignmentKind::Type(ty));
        ty
    }

    /// Type node referring to the assignment `name`
    pub fn reference_type(&mut self, name: &str) -> TypeId {
        self.add_type(TypeKind::Referenced(crate::types::ReferencedType {
            reference: Reference::named(name),
            refd: None,
        }))
    }

    pub fn define_constant(&mut self, name: &str, ty: TypeId, value: ValueKind) -> (AssignmentId, ValueId) {
        let value = self.add_value(value);
        let id = self.add_assignment(name, AssignmentKind::Constant { ty, value });
        (id, value)
    }

    pub fn define_template(&mut self, name: &str, ty: TypeId, template: TemplateKind) -> (AssignmentId, TemplateId) {
        let template = self.add_template(template);
        let id = self.add_assignment(name, AssignmentKind::Template { ty, template });
        (id, template)
    }

    // ==================== Loading ====================

    /// Record the owner of inline types nested in `parent`
    fn link_children(&mut self, parent: TypeId) {
        let mut owned: Vec<(TypeId, TypeOwner)> = Vec::new();
        match &self.ty(parent).kind {
            TypeKind::RecordSet(_) | TypeKind::Union(_) | TypeKind::Class(_) => {
                if let Some(fields) = self.ty(parent).fields() {
                    for field in fields.iter().chain(fields.duplicates()) {
                        owned.push((
                            field.ty,
                            TypeOwner::Field {
                                parent,
                                name: field.name.clone(),
                            },
                        ));
                    }
                }
                if let TypeKind::Class(class) = &self.ty(parent).kind {
                    if let Some(base) = class.base {
                        owned.push((base, TypeOwner::Anonymous { parent, index: 0 }));
                    }
                }
            }
            TypeKind::Port(port) => {
                let messages: Vec<TypeId> = port
                    .in_messages
                    .iter()
                    .chain(&port.out_messages)
                    .chain(&port.inout_messages)
                    .copied()
                    .collect();
                for (index, ty) in messages.into_iter().enumerate() {
                    owned.push((ty, TypeOwner::Anonymous { parent, index }));
                }
            }
            _ => {}
        }
        let scope = self.ty(parent).scope;
        for (child, owner) in owned {
            if let Some(node) = self.types.get_mut(child.0) {
                if node.owner.is_none() {
                    node.owner = Some(owner);
                }
                if node.scope.is_none() {
                    node.scope = scope;
                }
            }
        }
    }

    /// Fill in owners and the module scope after deserialization
    fn link(&mut self) {
        if self.scopes.is_empty() {
            let mut module = Scope::default();
            for (i, assignment) in self.assignments.iter().enumerate() {
                module
                    .assignments
                    .entry(assignment.identifier.name.clone())
                    .or_insert(AssignmentId(i));
            }
            self.scopes.push(module);
        }
        for i in 0..self.assignments.len() {
            if let AssignmentKind::Type(ty) = self.assignments[i].kind {
                let node = self.ty_mut(ty);
                if node.owner.is_none() {
                    node.owner = Some(TypeOwner::Assignment(AssignmentId(i)));
                }
                if node.scope.is_none() {
                    node.scope = Some(ScopeId(0));
                }
            }
        }
        // parents before children so inline types inherit the scope
        for id in self.type_ids().collect::<Vec<_>>() {
            self.link_children(id);
        }
    }

    /// Reject documents whose indices point outside the arena
    fn validate(&self) -> Result<()> {
        let types = self.types.len();
        let values = self.values.len();
        let templates = self.templates.len();

        let check = |what: &'static str, index: usize, len: usize| -> Result<()> {
            if index < len {
                Ok(())
            } else {
                Err(Error::DanglingId { what, index, len })
            }
        };
        let check_reference = |reference: &Reference| -> Result<()> {
            for subref in &reference.subrefs {
                match subref {
                    SubReference::Array { index, .. } => check("value", index.0, values)?,
                    SubReference::Parameterised { parameters, .. } => {
                        for p in parameters {
                            check("value", p.0, values)?;
                        }
                    }
                    SubReference::Field { .. } => {}
                }
            }
            Ok(())
        };

        for node in &self.types {
            let fields: Vec<&FieldDescriptor> = node
                .fields()
                .map(|f| f.iter().chain(f.duplicates()).collect())
                .unwrap_or_default();
            for field in fields {
                check("type", field.ty.0, types)?;
            }
            match &node.kind {
                TypeKind::Class(class) => {
                    if let Some(base) = class.base {
                        check("type", base.0, types)?;
                    }
                }
                TypeKind::Port(port) => {
                    for ty in port.incoming().chain(port.out_messages.iter().copied()) {
                        check("type", ty.0, types)?;
                    }
                }
                TypeKind::Referenced(r) => check_reference(&r.reference)?,
                _ => {}
            }
            if let Some(scope) = node.scope {
                check("scope", scope.0, self.scopes.len().max(1))?;
            }
        }

        for node in &self.values {
            match &node.kind {
                ValueKind::Sequence(items) => {
                    for item in items {
                        check("value", item.value.0, values)?;
                    }
                }
                ValueKind::Choice { value, .. } => check("value", value.0, values)?,
                ValueKind::Expression { operands, .. } => {
                    for operand in operands {
                        check("value", operand.0, values)?;
                    }
                }
                ValueKind::Referenced(reference) => check_reference(reference)?,
                _ => {}
            }
        }

        for node in &self.templates {
            match &node.kind {
                TemplateKind::SpecificValue(v) => check("value", v.0, values)?,
                TemplateKind::TemplateRefd(reference) => check_reference(reference)?,
                TemplateKind::ValueList(list) | TemplateKind::ComplementedList(list) => {
                    for t in list {
                        check("template", t.0, templates)?;
                    }
                }
                TemplateKind::ValueRange(range) => {
                    for bound in [&range.min, &range.max] {
                        if let RangeBound::Value(v) = bound {
                            check("value", v.0, values)?;
                        }
                    }
                }
                TemplateKind::DecodeMatch(dm) => {
                    check("type", dm.target_type.0, types)?;
                    check("template", dm.target.0, templates)?;
                    if let Some(encoding) = dm.encoding {
                        check("value", encoding.0, values)?;
                    }
                }
                TemplateKind::NamedTemplateList(items) => {
                    for item in items {
                        check("template", item.template.0, templates)?;
                    }
                }
                TemplateKind::Pattern(_) | TemplateKind::AnyValue | TemplateKind::AnyOrOmit | TemplateKind::Omit => {}
            }
            match &node.length_restriction {
                Some(LengthRestriction::Single(v)) => check("value", v.0, values)?,
                Some(LengthRestriction::Range { lower, upper }) => {
                    check("value", lower.0, values)?;
                    if let Some(upper) = upper {
                        check("value", upper.0, values)?;
                    }
                }
                None => {}
            }
        }

        for assignment in &self.assignments {
            match assignment.kind {
                AssignmentKind::Type(ty) => check("type", ty.0, types)?,
                AssignmentKind::Constant { ty, value } => {
                    check("type", ty.0, types)?;
                    check("value", value.0, values)?;
                }
                AssignmentKind::Template { ty, template } => {
                    check("type", ty.0, types)?;
                    check("template", template.0, templates)?;
                }
                AssignmentKind::ModulePar { ty, value } => {
                    check("type", ty.0, types)?;
                    if let Some(value) = value {
                        check("value", value.0, values)?;
                    }
                }
            }
        }

        for scope in &self.scopes {
            if let Some(parent) = scope.parent {
                check("scope", parent.0, self.scopes.len())?;
            }
            for id in scope.assignments.values() {
                check("assignment", id.0, self.assignments.len())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RecordSetType, FieldMap};

    #[test]
    fn test_resolve_through_parent_scopes() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.define_type("MyInt", TypeKind::Integer);
        unit.scopes.push(Scope {
            parent: Some(ScopeId(0)),
            assignments: IndexMap::new(),
        });
        let found = unit.resolve(Some(ScopeId(1)), "MyInt");
        assert_eq!(found.map(|a| unit.assignment(a).ty()), Some(int));
        assert_eq!(unit.resolve(Some(ScopeId(1)), "Missing"), None);
    }

    #[test]
    fn test_field_types_get_owners() {
        let mut unit = CompilationUnit::new("M");
        let int = unit.add_type(TypeKind::Integer);
        let rec = unit.define_type(
            "R",
            TypeKind::RecordSet(RecordSetType {
                is_set: false,
                fields: FieldMap::from(vec![FieldDescriptor::new("a", int)]),
            }),
        );
        assert!(matches!(
            unit.ty(int).owner,
            Some(TypeOwner::Field { parent, .. }) if parent == rec
        ));
        assert!(matches!(unit.ty(rec).owner, Some(TypeOwner::Assignment(_))));
    }

    #[test]
    fn test_from_json_links_and_validates() {
        let source = r#"{
            "name": { "name": "M" },
            "types": [
                { "kind": "Integer" },
                { "kind": { "RecordSet": { "fields": [ { "name": { "name": "a" }, "ty": 0 } ] } } }
            ],
            "assignments": [
                { "identifier": { "name": "R" }, "kind": { "Type": 1 } }
            ]
        }"#;
        let unit = CompilationUnit::from_json(source).expect("valid unit");
        assert_eq!(unit.resolve(None, "R"), Some(AssignmentId(0)));
        assert!(matches!(unit.ty(TypeId(0)).owner, Some(TypeOwner::Field { .. })));
    }

    #[test]
    fn test_from_json_rejects_dangling_ids() {
        let source = r#"{
            "name": { "name": "M" },
            "types": [ { "kind": { "Union": { "fields": [ { "name": { "name": "a" }, "ty": 5 } ] } } } ]
        }"#;
        let err = CompilationUnit::from_json(source).unwrap_err();
        assert!(matches!(err, Error::DanglingId { what: "type", index: 5, .. }));
    }
}
