//! A read-only view of a GraphQL schema's type graph.
//!
//! The graph is built once, usually from SDL with [`Schema::from_sdl`], and never mutated
//! afterwards. Types keep their declaration order so that everything derived from the graph
//! (selection sets, variable lists) is deterministic.

mod from_sdl;
mod ty;

use indexmap::IndexMap;

use crate::OperationKind;

pub use self::ty::TypeRef;

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    types: IndexMap<String, TypeDefinition>,
    query_type: Option<String>,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

impl Schema {
    pub fn definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn definitions(&self) -> impl ExactSizeIterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn object(&self, name: &str) -> Option<&ObjectDefinition> {
        match self.types.get(name)? {
            TypeDefinition::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The root object type for the given operation kind, if the schema defines one.
    pub fn root_type(&self, kind: OperationKind) -> Option<&ObjectDefinition> {
        let name = match kind {
            OperationKind::Query => self.query_type.as_deref(),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }?;

        self.object(name)
    }

    pub fn subscription_type(&self) -> Option<&ObjectDefinition> {
        self.root_type(OperationKind::Subscription)
    }

    /// Object types implementing the given interface, in declaration order.
    pub fn implementors<'a>(&'a self, interface: &'a str) -> impl Iterator<Item = &'a ObjectDefinition> + 'a {
        self.types.values().filter_map(move |definition| match definition {
            TypeDefinition::Object(object) if object.implements.iter().any(|name| name == interface) => Some(object),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinition {
    Scalar(ScalarDefinition),
    Object(ObjectDefinition),
    Interface(InterfaceDefinition),
    Union(UnionDefinition),
    Enum(EnumDefinition),
    InputObject(InputObjectDefinition),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(scalar) => &scalar.name,
            TypeDefinition::Object(object) => &object.name,
            TypeDefinition::Interface(interface) => &interface.name,
            TypeDefinition::Union(union) => &union.name,
            TypeDefinition::Enum(r#enum) => &r#enum.name,
            TypeDefinition::InputObject(input_object) => &input_object.name,
        }
    }

    /// Scalars and enums: the types selected without a nested selection set.
    pub fn is_leaf(&self) -> bool {
        matches!(self, TypeDefinition::Scalar(_) | TypeDefinition::Enum(_))
    }

    pub fn is_input(&self) -> bool {
        matches!(
            self,
            TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) | TypeDefinition::InputObject(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarDefinition {
    pub name: String,
}

impl ScalarDefinition {
    pub fn is_builtin(&self) -> bool {
        BUILTIN_SCALARS.contains(&self.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDefinition {
    pub name: String,
    pub implements: Vec<String>,
    pub fields: Vec<FieldDefinition>,
}

impl ObjectDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDefinition {
    pub name: String,
    pub implements: Vec<String>,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionDefinition {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDefinition {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputObjectDefinition {
    pub name: String,
    pub fields: Vec<InputValueDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub arguments: Vec<InputValueDefinition>,
    pub ty: TypeRef,
}

/// An argument or an input object field.
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<serde_json::Value>,
}
