//! The operation document produced by synthesis.
//!
//! Documents are plain data: they can be inspected field by field, and their `Display`
//! implementation renders executable GraphQL text.

mod render;

use std::fmt;

use crate::TypeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document holding exactly one operation definition.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDocument {
    pub operation: OperationDefinition,
}

impl OperationDocument {
    pub fn kind(&self) -> OperationKind {
        self.operation.kind
    }

    pub fn operation_name(&self) -> &str {
        &self.operation.name
    }

    pub fn variables(&self) -> &[VariableDefinition] {
        &self.operation.variables
    }

    pub fn root_field(&self) -> &FieldSelection {
        &self.operation.root_field
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationDefinition {
    pub kind: OperationKind,
    pub name: String,
    pub variables: Vec<VariableDefinition>,
    /// The single field selected on the root type.
    pub root_field: FieldSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    pub items: Vec<Selection>,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSelection> {
        self.items.iter().filter_map(|selection| match selection {
            Selection::Field(field) => Some(field),
            Selection::InlineFragment(_) => None,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSelection> {
        self.fields().find(|field| field.name == name)
    }

    pub fn fragment(&self, type_condition: &str) -> Option<&InlineFragment> {
        self.items.iter().find_map(|selection| match selection {
            Selection::InlineFragment(fragment) if fragment.type_condition == type_condition => Some(fragment),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(FieldSelection),
    InlineFragment(InlineFragment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelection {
    pub name: String,
    pub arguments: Vec<Argument>,
    /// `None` for scalar and enum leaves.
    pub selection_set: Option<SelectionSet>,
}

impl FieldSelection {
    pub fn leaf(name: impl Into<String>) -> Self {
        FieldSelection {
            name: name.into(),
            arguments: Vec::new(),
            selection_set: None,
        }
    }
}

/// An argument bound to an operation variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub variable: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub type_condition: String,
    pub selection_set: SelectionSet,
}
