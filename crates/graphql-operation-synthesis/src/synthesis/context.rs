use std::collections::HashSet;

use heck::ToLowerCamelCase;
use itertools::Itertools;

use super::SynthesisOptions;
use crate::{
    Argument, FieldDefinition, FieldSelection, InlineFragment, ObjectDefinition, Schema, Selection, SelectionSet,
    SynthesisError, TypeDefinition, TypeRef, VariableDefinition,
};

const TYPENAME_FIELD: &str = "__typename";

/// Traversal state for a single synthesis call.
pub(super) struct SynthesisContext<'a> {
    schema: &'a Schema,
    options: &'a SynthesisOptions,
    variables: Vec<VariableDefinition>,
    variable_names: HashSet<String>,
    /// Composite types currently being expanded, outermost first.
    visited: Vec<&'a str>,
    /// Field names from the root field down to the field being resolved.
    path: Vec<&'a str>,
}

/// The field through which a composite type is reached, as `(parent type, field name)`.
type Via<'a> = (&'a str, &'a str);

impl<'a> SynthesisContext<'a> {
    pub(super) fn new(schema: &'a Schema, options: &'a SynthesisOptions) -> Self {
        Self {
            schema,
            options,
            variables: Vec::new(),
            variable_names: HashSet::new(),
            visited: Vec::new(),
            path: Vec::new(),
        }
    }

    pub(super) fn into_variables(self) -> Vec<VariableDefinition> {
        self.variables
    }

    pub(super) fn resolve_root_field(
        &mut self,
        root_type: &'a str,
        field: &'a FieldDefinition,
    ) -> Result<FieldSelection, SynthesisError> {
        self.resolve_field(root_type, field, true).map(|selection| {
            // The root field is never dropped by the depth limit.
            selection.unwrap_or_else(|| FieldSelection::leaf(&field.name))
        })
    }

    fn resolve_field(
        &mut self,
        parent: &'a str,
        field: &'a FieldDefinition,
        first_call: bool,
    ) -> Result<Option<FieldSelection>, SynthesisError> {
        let named_type = field.ty.named_type();
        let definition = self
            .schema
            .definition(named_type)
            .ok_or_else(|| SynthesisError::UnknownType(named_type.to_owned()))?;

        let is_leaf = definition.is_leaf() || matches!(definition, TypeDefinition::InputObject(_));
        let depth = self.path.len();
        if !first_call && !is_leaf && self.options.depth_limit.is_some_and(|limit| depth > limit) {
            return Ok(None);
        }

        let arguments = field
            .arguments
            .iter()
            .map(|argument| {
                let name = if first_call {
                    argument.name.clone()
                } else {
                    self.path
                        .iter()
                        .copied()
                        .chain([field.name.as_str(), argument.name.as_str()])
                        .join("_")
                        .to_lower_camel_case()
                };
                let variable = self.declare_variable(name, argument.ty.clone());

                Argument {
                    name: argument.name.clone(),
                    variable,
                }
            })
            .collect();

        if is_leaf {
            return Ok(Some(FieldSelection {
                name: field.name.clone(),
                arguments,
                selection_set: None,
            }));
        }

        self.path.push(field.name.as_str());
        let selection_set = self.resolve_selection_set(definition, (parent, field.name.as_str()), first_call);
        self.path.pop();

        Ok(Some(FieldSelection {
            name: field.name.clone(),
            arguments,
            selection_set: Some(selection_set?),
        }))
    }

    fn resolve_selection_set(
        &mut self,
        definition: &'a TypeDefinition,
        via: Via<'a>,
        first_call: bool,
    ) -> Result<SelectionSet, SynthesisError> {
        match definition {
            TypeDefinition::Object(object) => self.resolve_object(&object.name, &object.fields, via, first_call),
            TypeDefinition::Interface(interface) => {
                let implementors = self.schema.implementors(&interface.name).collect::<Vec<_>>();
                if implementors.is_empty() {
                    return self.resolve_object(&interface.name, &interface.fields, via, first_call);
                }
                self.resolve_fragments(&interface.name, implementors, via, first_call)
            }
            TypeDefinition::Union(union) => {
                let members = union
                    .members
                    .iter()
                    .map(|member| {
                        self.schema
                            .object(member)
                            .ok_or_else(|| SynthesisError::UnknownType(member.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.resolve_fragments(&union.name, members, via, first_call)
            }
            TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) | TypeDefinition::InputObject(_) => {
                Ok(SelectionSet::default())
            }
        }
    }

    /// One inline fragment per possible type. Each branch is expanded on its own, so sibling
    /// branches never see each other's types as visited.
    fn resolve_fragments(
        &mut self,
        abstract_type: &'a str,
        possible_types: Vec<&'a ObjectDefinition>,
        via: Via<'a>,
        first_call: bool,
    ) -> Result<SelectionSet, SynthesisError> {
        self.visited.push(abstract_type);

        let mut items = Vec::with_capacity(possible_types.len());
        for object in possible_types {
            if self.is_visited(&object.name) {
                continue;
            }

            let selection_set = match self.resolve_object(&object.name, &object.fields, via, first_call) {
                Ok(selection_set) => selection_set,
                Err(err) => {
                    self.visited.pop();
                    return Err(err);
                }
            };

            items.push(Selection::InlineFragment(InlineFragment {
                type_condition: object.name.clone(),
                selection_set,
            }));
        }

        self.visited.pop();

        Ok(non_empty(SelectionSet { items }))
    }

    fn resolve_object(
        &mut self,
        name: &'a str,
        fields: &'a [FieldDefinition],
        via: Via<'a>,
        first_call: bool,
    ) -> Result<SelectionSet, SynthesisError> {
        if !first_call && self.is_collapsed(name, via) {
            return Ok(SelectionSet {
                items: vec![Selection::Field(FieldSelection::leaf(&self.options.identifier_field))],
            });
        }

        self.visited.push(name);

        let mut items = Vec::with_capacity(fields.len());
        let mut result = Ok(());
        for field in fields {
            if self.is_visited(field.ty.named_type()) {
                continue;
            }

            match self.resolve_field(name, field, false) {
                Ok(Some(selection)) => items.push(Selection::Field(selection)),
                Ok(None) => (),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        self.visited.pop();
        result?;

        Ok(non_empty(SelectionSet { items }))
    }

    fn is_visited(&self, name: &str) -> bool {
        self.visited.contains(&name)
    }

    fn is_collapsed(&self, name: &str, (parent, field): Via<'_>) -> bool {
        let ignore = &self.options.ignore;

        self.options.models.contains(name) && !ignore.contains(name) && !ignore.contains(&format!("{parent}.{field}"))
    }

    /// Registers a variable, suffixing the name when an earlier occurrence already took it.
    fn declare_variable(&mut self, base: String, ty: TypeRef) -> String {
        let mut name = base.clone();
        let mut suffix = 2;
        while self.variable_names.contains(&name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }

        self.variable_names.insert(name.clone());
        self.variables.push(VariableDefinition { name: name.clone(), ty });

        name
    }
}

/// GraphQL forbids empty selection sets, `__typename` is always selectable.
fn non_empty(mut selection_set: SelectionSet) -> SelectionSet {
    if selection_set.is_empty() {
        selection_set
            .items
            .push(Selection::Field(FieldSelection::leaf(TYPENAME_FIELD)));
    }
    selection_set
}
