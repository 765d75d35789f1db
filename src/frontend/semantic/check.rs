//! The `check` protocol and type reference resolution

use std::collections::{BTreeSet, HashMap, HashSet};

use super::{Expected, TypeChecker};
use crate::frontend::ast::{AssignmentKind, TypeId};
use crate::frontend::{ChainLink, ReferenceChain};
use crate::types::{first_free_value, TypeCategory, TypeKind};
use crate::utils::Location;

impl<'a> TypeChecker<'a> {
    /// Check a type once per timestamp.
    ///
    /// Order: variant attributes, sub-type declaration, structure, encodings.
    /// Encodings are checked only for types that have a scope.
    pub fn check_type(&mut self, id: TypeId) {
        let timestamp = self.timestamp;
        {
            let node = self.unit.ty_mut(id);
            if !timestamp.is_newer_than(node.last_checked) {
                log::trace!("type #{} already checked at {}", id.0, timestamp);
                return;
            }
            node.last_checked = Some(timestamp);
            node.is_erroneous = false;
        }
        log::trace!("checking type {} (#{})", self.type_name(id), id.0);

        self.parse_attributes(id);
        self.check_sub_type_declaration(id);

        match &self.unit.ty(id).kind {
            TypeKind::Boolean
            | TypeKind::Integer
            | TypeKind::Float
            | TypeKind::CharString
            | TypeKind::UniversalCharString
            | TypeKind::Asn1String(_) => {}
            TypeKind::Enumerated(_) => self.check_enumerated(id),
            TypeKind::RecordSet(_) => self.check_record_set(id),
            TypeKind::Union(_) => self.check_union(id),
            TypeKind::Class(_) => self.check_class(id),
            TypeKind::Port(_) => self.check_port(id),
            TypeKind::Referenced(_) => self.check_referenced(id),
        }

        if self.unit.ty(id).scope.is_some() {
            self.check_encodings(id);
        }
    }

    /// Resolve one step of a type reference; other kinds return themselves
    pub fn type_refd(&mut self, id: TypeId) -> Option<TypeId> {
        let reference = match &self.unit.ty(id).kind {
            TypeKind::Referenced(r) => match r.refd {
                Some(refd) => return Some(refd),
                None => r.reference.clone(),
            },
            _ => return Some(id),
        };
        if self.unit.ty(id).is_erroneous {
            return None;
        }

        let Some(name) = reference.id().map(|i| i.name.clone()) else {
            self.error(reference.location, "Invalid type reference".to_string());
            self.mark_type_erroneous(id);
            return None;
        };
        let scope = self.unit.ty(id).scope;
        let Some(assignment) = self.unit.resolve(scope, &name) else {
            self.error(
                reference.location,
                format!("There is no local or imported definition with name `{}'", name),
            );
            self.mark_type_erroneous(id);
            return None;
        };

        let target = match self.unit.assignment(assignment).kind {
            AssignmentKind::Type(target) => target,
            _ => {
                let what = self.unit.assignment(assignment).describe();
                self.error(
                    reference.location,
                    format!("Type reference expected instead of {} `{}'", what, name),
                );
                self.mark_type_erroneous(id);
                return None;
            }
        };

        let refd = if reference.subrefs.len() > 1 {
            self.get_field_type(target, &reference, 1, Expected::DynamicValue, false)
        } else {
            Some(target)
        };
        match refd {
            Some(refd) => {
                if let TypeKind::Referenced(r) = &mut self.unit.ty_mut(id).kind {
                    r.refd = Some(refd);
                }
                Some(refd)
            }
            None => {
                self.mark_type_erroneous(id);
                None
            }
        }
    }

    /// Follow references to the first non-reference type.
    ///
    /// Returns `None` when the chain is broken or circular; the types involved
    /// are then erroneous.
    pub fn type_refd_last(&mut self, id: TypeId) -> Option<TypeId> {
        let mut chain = ReferenceChain::new("Circular type reference");
        self.type_refd_last_in(id, &mut chain)
    }

    pub(super) fn type_refd_last_in(&mut self, id: TypeId, chain: &mut ReferenceChain) -> Option<TypeId> {
        let mut current = id;
        loop {
            if self.unit.ty(current).is_erroneous {
                return None;
            }
            if !matches!(self.unit.ty(current).kind, TypeKind::Referenced(_)) {
                return Some(current);
            }
            let location = self.unit.ty(current).location;
            if !chain.add(ChainLink::Type(current.0), &location, &mut *self.sink) {
                self.mark_type_erroneous(current);
                self.mark_type_erroneous(id);
                return None;
            }
            current = self.type_refd(current)?;
        }
    }

    fn check_referenced(&mut self, id: TypeId) {
        if let Some(refd) = self.type_refd(id) {
            self.check_type(refd);
        }
        if self.type_refd_last(id).is_none() {
            self.mark_type_erroneous(id);
        }
    }

    fn check_enumerated(&mut self, id: TypeId) {
        let type_name = self.type_name(id);
        let TypeKind::Enumerated(enumerated) = &mut self.unit.ty_mut(id).kind else {
            return;
        };
        // implicit values are recomputed on every check
        for item in enumerated.items.iter_mut().filter(|i| i.implicit) {
            item.value = None;
            item.implicit = false;
        }
        enumerated.reset_sentinels();
        let items = enumerated.items.clone();

        let mut problems: Vec<(Location, String)> = Vec::new();
        let mut names: HashMap<&str, Location> = HashMap::new();
        let mut used = BTreeSet::new();
        for item in &items {
            if let Some(first) = names.insert(item.name.name.as_str(), item.name.location) {
                problems.push((
                    item.name.location,
                    format!(
                        "Duplicate enumeration identifier `{}' in type `{}', first declared at {}",
                        item.name, type_name, first
                    ),
                ));
            }
            if let Some(value) = item.value {
                if !used.insert(value) {
                    problems.push((
                        item.name.location,
                        format!(
                            "Duplicate numeric value {} for enumeration `{}' in type `{}'",
                            value, item.name, type_name
                        ),
                    ));
                }
            }
        }

        if let TypeKind::Enumerated(enumerated) = &mut self.unit.ty_mut(id).kind {
            for item in enumerated.items.iter_mut().filter(|i| i.value.is_none()) {
                let value = first_free_value(&used);
                used.insert(value);
                item.value = Some(value);
                item.implicit = true;
            }
        }
        for (location, message) in problems {
            self.error(location, message);
        }
    }

    /// Field duplicates, nested checks and embedding of the field types
    pub(super) fn check_field_types(&mut self, id: TypeId, what: &str) {
        let type_name = self.type_name(id);
        let Some(fields) = self.unit.ty(id).fields() else {
            return;
        };
        let duplicates: Vec<_> = fields.duplicates().to_vec();
        let fields: Vec<_> = fields.iter().cloned().collect();

        for duplicate in duplicates {
            self.error(
                duplicate.name.location,
                format!("Duplicate {} name `{}' in type `{}'", what, duplicate.name, type_name),
            );
        }
        for field in fields.iter().filter(|f| f.inherited_from.is_none()) {
            self.check_type(field.ty);
            if let Some(last) = self.type_refd_last(field.ty) {
                if matches!(self.unit.ty(last).kind, TypeKind::Port(_)) {
                    let port_name = self.type_name(last);
                    self.error(
                        field.name.location,
                        format!("Port type `{}' cannot be embedded into type `{}'", port_name, type_name),
                    );
                }
            }
        }
    }

    fn check_record_set(&mut self, id: TypeId) {
        self.check_field_types(id, "field");
    }

    fn check_union(&mut self, id: TypeId) {
        self.check_field_types(id, "alternative");
        let type_name = self.type_name(id);
        let Some(fields) = self.unit.ty(id).fields() else {
            return;
        };
        let location = self.unit.ty(id).location;
        if fields.is_empty() {
            self.error(location, format!("Union type `{}' must have at least one alternative", type_name));
            return;
        }
        let optional: Vec<_> = fields.iter().filter(|f| f.optional).map(|f| f.name.clone()).collect();
        for name in optional {
            self.error(
                name.location,
                format!("Alternative `{}' of union type `{}' cannot be optional", name, type_name),
            );
        }
    }

    fn check_port(&mut self, id: TypeId) {
        let TypeKind::Port(port) = &self.unit.ty(id).kind else {
            return;
        };
        let incoming: Vec<TypeId> = port.incoming().collect();
        let outgoing: Vec<TypeId> = port.outgoing().collect();
        let type_name = self.type_name(id);

        for (direction, messages) in [("incoming", incoming), ("outgoing", outgoing)] {
            let mut seen = HashSet::new();
            for message in messages {
                self.check_type(message);
                let Some(last) = self.type_refd_last(message) else {
                    continue;
                };
                let location = self.unit.ty(message).location;
                let message_name = self.type_name(message);
                match self.unit.ty(last).category() {
                    TypeCategory::Port | TypeCategory::Class => {
                        let keyword = self.unit.ty(last).category().keyword();
                        self.error(
                            location,
                            format!(
                                "Type `{}' of {} kind cannot be a message type of port type `{}'",
                                message_name, keyword, type_name
                            ),
                        );
                    }
                    _ => {
                        if !seen.insert(last) {
                            self.error(
                                location,
                                format!(
                                    "Duplicate {} message type `{}' in port type `{}'",
                                    direction, message_name, type_name
                                ),
                            );
                        }
                    }
                }
            }
        }
    }
}
