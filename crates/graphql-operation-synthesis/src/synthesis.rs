//! Builds a complete operation for a single root field by walking the schema's type graph.
//!
//! The walk expands every reachable field, with three rules keeping the result finite and
//! small:
//!
//! - a composite type already being expanded on the current path is never entered again,
//! - object types listed as models collapse to their identifier field below the root, unless
//!   the type (or the `Parent.field` leading to it) is listed in the ignore set,
//! - an optional depth limit drops composite fields nested too deep.
//!
//! Each argument is bound to its own variable. Root field arguments keep their name; nested
//! ones are named after their full field path, e.g. `feed.items(first:)` becomes
//! `$feedItemsFirst`.

mod context;

use std::collections::HashSet;

use self::context::SynthesisContext;
use crate::{OperationDefinition, OperationDocument, OperationKind, Schema, SynthesisError};

pub const DEFAULT_IDENTIFIER_FIELD: &str = "id";

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOptions {
    /// Object types collapsed to their identifier field when referenced below the root.
    pub models: HashSet<String>,
    /// Type names or `Parent.field` paths exempted from collapsing.
    pub ignore: HashSet<String>,
    pub identifier_field: String,
    pub depth_limit: Option<usize>,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            models: HashSet::new(),
            ignore: HashSet::new(),
            identifier_field: DEFAULT_IDENTIFIER_FIELD.to_owned(),
            depth_limit: None,
        }
    }
}

impl SynthesisOptions {
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models.extend(models.into_iter().map(Into::into));
        self
    }

    pub fn with_ignore<I, S>(mut self, ignore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(ignore.into_iter().map(Into::into));
        self
    }

    pub fn with_identifier_field(mut self, name: impl Into<String>) -> Self {
        self.identifier_field = name.into();
        self
    }

    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = Some(limit);
        self
    }
}

/// Synthesizes the operation selecting `field_name` on the root type of `kind`.
///
/// Every call starts from fresh traversal state, so the same inputs always produce the same
/// document.
pub fn build_operation(
    schema: &Schema,
    kind: OperationKind,
    field_name: &str,
    options: &SynthesisOptions,
) -> Result<OperationDocument, SynthesisError> {
    let root_type = schema
        .root_type(kind)
        .ok_or(SynthesisError::MissingRootType(kind))?;

    let field = root_type
        .field(field_name)
        .ok_or_else(|| SynthesisError::UnknownRootField {
            kind,
            field: field_name.to_owned(),
        })?;

    let mut ctx = SynthesisContext::new(schema, options);
    let root_field = ctx.resolve_root_field(&root_type.name, field)?;
    let variables = ctx.into_variables();

    tracing::debug!(
        field = field_name,
        %kind,
        variables = variables.len(),
        "synthesized operation"
    );

    Ok(OperationDocument {
        operation: OperationDefinition {
            kind,
            name: format!("{field_name}_{kind}"),
            variables,
            root_field,
        },
    })
}

/// Synthesizes one operation per field of the root type of `kind`, in field order.
pub fn build_root_operations(
    schema: &Schema,
    kind: OperationKind,
    options: &SynthesisOptions,
) -> Result<Vec<OperationDocument>, SynthesisError> {
    let root_type = schema
        .root_type(kind)
        .ok_or(SynthesisError::MissingRootType(kind))?;

    root_type
        .fields
        .iter()
        .map(|field| build_operation(schema, kind, &field.name, options))
        .collect()
}
