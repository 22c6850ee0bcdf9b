use std::collections::{BTreeMap, BTreeSet};
use crate::{
    types::{Layer, Object},
    utils::sanitize_result,
};

/// An object paired with the names it is emitted under.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration<'a> {
    pub object:     &'a Object,
    pub class_name: String,
    /// Sanitized result type, which is also the abstract base class.
    pub base_name:  String,
}

impl<'a> Declaration<'a> {
    pub fn new(object: &'a Object) -> Self {
        Declaration {
            object,
            class_name: object.class_name(),
            base_name:  sanitize_result(object.result()),
        }
    }
}

/// Declarations of one namespace; `None` is the unqualified bucket.
pub type NamespaceGroups<'a> = BTreeMap<Option<String>, Vec<Declaration<'a>>>;

/// Everything one generated file contains.
#[derive(Debug, Default, PartialEq)]
pub struct Artifact<'a> {
    pub layers:    BTreeMap<Layer, NamespaceGroups<'a>>,
    pub abstracts: BTreeMap<Layer, BTreeSet<String>>,
}

impl<'a> Artifact<'a> {
    fn insert(&mut self, declaration: Declaration<'a>) {
        let layer = declaration.object.layer();
        self.abstracts
            .entry(layer)
            .or_default()
            .insert(declaration.base_name.clone());
        self.layers
            .entry(layer)
            .or_default()
            .entry(declaration.object.namespace().map(str::to_string))
            .or_default()
            .push(declaration);
    }

    fn sort(&mut self) {
        for namespaces in self.layers.values_mut() {
            for declarations in namespaces.values_mut() {
                declarations.sort_by(|a, b| a.object.name().cmp(b.object.name()));
            }
        }
    }

    pub fn object_count(&self) -> usize {
        self.layers
            .values()
            .flat_map(|namespaces| namespaces.values())
            .map(Vec::len)
            .sum()
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Grouped<'a> {
    pub functions: Artifact<'a>,
    pub types:     Artifact<'a>,
}

/// Splits objects into functions and types, then by layer and namespace.
pub fn group_objects(objects: &[Object]) -> Grouped<'_> {
    let mut grouped = Grouped::default();
    for object in objects {
        let declaration = Declaration::new(object);
        if object.is_function() {
            grouped.functions.insert(declaration);
        } else {
            grouped.types.insert(declaration);
        }
    }
    grouped.functions.sort();
    grouped.types.sort();
    grouped
}
