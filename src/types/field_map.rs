//! Composite field map
//!
//! Ordered name → field descriptor mapping shared by records, sets, unions
//! and classes. Declaration order is the wire order, so insertion order is
//! kept while lookups stay O(1).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::frontend::ast::TypeId;
use crate::frontend::Identifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: Identifier,
    pub ty: TypeId,
    #[serde(default)]
    pub optional: bool,
    /// Class members only
    #[serde(default)]
    pub is_abstract: bool,
    /// Class members only
    #[serde(default)]
    pub visibility: Visibility,
    /// Set on copies merged in from a base class, or by the declaration to
    /// acknowledge that it overrides an inherited member
    #[serde(default)]
    pub is_inherited: bool,
    /// Class the merged copy came from
    #[serde(skip)]
    pub inherited_from: Option<TypeId>,
}

impl FieldDescriptor {
    pub fn new(name: &str, ty: TypeId) -> Self {
        Self {
            name: Identifier::new(name),
            ty,
            optional: false,
            is_abstract: false,
            visibility: Visibility::default(),
            is_inherited: false,
            inherited_from: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn abstract_member(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn public(mut self) -> Self {
        self.visibility = Visibility::Public;
        self
    }

    pub fn inherited(mut self) -> Self {
        self.is_inherited = true;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<FieldDescriptor>", into = "Vec<FieldDescriptor>")]
pub struct FieldMap {
    fields: IndexMap<String, FieldDescriptor>,
    /// Declarations whose name was already taken, reported by the check
    duplicates: Vec<FieldDescriptor>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field; a clash keeps the first declaration
    pub fn add(&mut self, field: FieldDescriptor) {
        if self.fields.contains_key(&field.name.name) {
            self.duplicates.push(field);
        } else {
            self.fields.insert(field.name.name.clone(), field);
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get_index(index).map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn duplicates(&self) -> &[FieldDescriptor] {
        &self.duplicates
    }

    /// Drop the copies a previous inheritance merge added
    pub fn remove_inherited(&mut self) {
        self.fields.retain(|_, f| f.inherited_from.is_none());
    }

    /// Add a copy of a base class member
    pub fn insert_inherited(&mut self, mut field: FieldDescriptor, from: TypeId) {
        field.is_inherited = true;
        field.inherited_from = Some(from);
        self.fields.insert(field.name.name.clone(), field);
    }
}

impl From<Vec<FieldDescriptor>> for FieldMap {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        let mut map = FieldMap::new();
        for field in fields {
            map.add(field);
        }
        map
    }
}

impl From<FieldMap> for Vec<FieldDescriptor> {
    fn from(map: FieldMap) -> Self {
        map.fields
            .into_values()
            .filter(|f| f.inherited_from.is_none())
            .chain(map.duplicates)
            .collect()
    }
}
