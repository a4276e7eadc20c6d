//! Synthesizes executable GraphQL operations from a schema.
//!
//! Given a root field, [`build_operation`] produces a document that selects everything
//! reachable from it, binds every argument to a variable and stays finite on cyclic schemas.

mod document;
mod error;
mod schema;
mod synthesis;

pub use self::{
    document::{
        Argument, FieldSelection, InlineFragment, OperationDefinition, OperationDocument, OperationKind, Selection,
        SelectionSet, VariableDefinition,
    },
    error::{SchemaError, SynthesisError},
    schema::{
        EnumDefinition, FieldDefinition, InputObjectDefinition, InputValueDefinition, InterfaceDefinition,
        ObjectDefinition, ScalarDefinition, Schema, TypeDefinition, TypeRef, UnionDefinition,
    },
    synthesis::{build_operation, build_root_operations, SynthesisOptions, DEFAULT_IDENTIFIER_FIELD},
};
