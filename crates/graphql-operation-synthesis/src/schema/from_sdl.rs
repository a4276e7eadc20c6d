use async_graphql_parser::{Positioned, types as ast};
use indexmap::IndexMap;

use super::*;
use crate::SchemaError;

impl Schema {
    /// Builds the type graph from a GraphQL SDL document.
    ///
    /// Type extensions are merged into their base definition, the built-in scalars are added
    /// when the document does not declare them, and every type reference is checked.
    pub fn from_sdl(sdl: &str) -> Result<Schema, SchemaError> {
        let parsed = async_graphql_parser::parse_schema(sdl).map_err(|err| SchemaError::Parse(err.to_string()))?;

        let mut state = State::default();
        ingest_definitions(&parsed, &mut state)?;
        ingest_extensions(&parsed, &mut state)?;
        ingest_schema_definitions(&parsed, &mut state);

        for name in BUILTIN_SCALARS {
            state
                .types
                .entry(name.to_owned())
                .or_insert_with(|| TypeDefinition::Scalar(ScalarDefinition { name: name.to_owned() }));
        }

        let schema = state.into_schema()?;
        validate(&schema)?;

        tracing::debug!(types = schema.types.len(), "built schema graph from SDL");

        Ok(schema)
    }
}

#[derive(Default)]
struct State {
    types: IndexMap<String, TypeDefinition>,
    query_type_name: Option<String>,
    mutation_type_name: Option<String>,
    subscription_type_name: Option<String>,
}

impl State {
    fn root_type_name(&self, explicit: Option<&String>, default: &str) -> Result<Option<String>, SchemaError> {
        match explicit {
            Some(name) => match self.types.get(name) {
                Some(TypeDefinition::Object(_)) => Ok(Some(name.clone())),
                Some(_) => Err(SchemaError::RootTypeNotObject(name.clone())),
                None => Err(SchemaError::UnknownType {
                    name: name.clone(),
                    location: "schema definition".to_owned(),
                }),
            },
            None => Ok(matches!(self.types.get(default), Some(TypeDefinition::Object(_))).then(|| default.to_owned())),
        }
    }

    fn into_schema(self) -> Result<Schema, SchemaError> {
        let query_type = self.root_type_name(self.query_type_name.as_ref(), "Query")?;
        let mutation_type = self.root_type_name(self.mutation_type_name.as_ref(), "Mutation")?;
        let subscription_type = self.root_type_name(self.subscription_type_name.as_ref(), "Subscription")?;

        Ok(Schema {
            types: self.types,
            query_type,
            mutation_type,
            subscription_type,
        })
    }
}

fn type_definitions(parsed: &ast::ServiceDocument) -> impl Iterator<Item = &ast::TypeDefinition> {
    parsed.definitions.iter().filter_map(|definition| match definition {
        ast::TypeSystemDefinition::Type(Positioned { node, .. }) => Some(node),
        _ => None,
    })
}

fn ingest_definitions(parsed: &ast::ServiceDocument, state: &mut State) -> Result<(), SchemaError> {
    for typedef in type_definitions(parsed).filter(|typedef| !typedef.extend) {
        let name = typedef.name.node.to_string();

        let definition = match &typedef.kind {
            ast::TypeKind::Scalar => TypeDefinition::Scalar(ScalarDefinition { name: name.clone() }),
            ast::TypeKind::Object(object) => TypeDefinition::Object(ObjectDefinition {
                name: name.clone(),
                implements: names(&object.implements),
                fields: fields(&object.fields)?,
            }),
            ast::TypeKind::Interface(interface) => TypeDefinition::Interface(InterfaceDefinition {
                name: name.clone(),
                implements: names(&interface.implements),
                fields: fields(&interface.fields)?,
            }),
            ast::TypeKind::Union(union) => TypeDefinition::Union(UnionDefinition {
                name: name.clone(),
                members: names(&union.members),
            }),
            ast::TypeKind::Enum(r#enum) => TypeDefinition::Enum(EnumDefinition {
                name: name.clone(),
                values: enum_values(&r#enum.values),
            }),
            ast::TypeKind::InputObject(input_object) => TypeDefinition::InputObject(InputObjectDefinition {
                name: name.clone(),
                fields: input_values(&input_object.fields)?,
            }),
        };

        if state.types.insert(name.clone(), definition).is_some() {
            return Err(SchemaError::DuplicateType(name));
        }
    }

    Ok(())
}

fn ingest_extensions(parsed: &ast::ServiceDocument, state: &mut State) -> Result<(), SchemaError> {
    for typedef in type_definitions(parsed).filter(|typedef| typedef.extend) {
        let name = typedef.name.node.as_str();
        let Some(definition) = state.types.get_mut(name) else {
            return Err(SchemaError::UnknownType {
                name: name.to_owned(),
                location: format!("extend {name}"),
            });
        };

        match (definition, &typedef.kind) {
            (TypeDefinition::Scalar(_), ast::TypeKind::Scalar) => (),
            (TypeDefinition::Object(object), ast::TypeKind::Object(extension)) => {
                object.implements.extend(names(&extension.implements));
                object.fields.extend(fields(&extension.fields)?);
            }
            (TypeDefinition::Interface(interface), ast::TypeKind::Interface(extension)) => {
                interface.implements.extend(names(&extension.implements));
                interface.fields.extend(fields(&extension.fields)?);
            }
            (TypeDefinition::Union(union), ast::TypeKind::Union(extension)) => {
                union.members.extend(names(&extension.members));
            }
            (TypeDefinition::Enum(r#enum), ast::TypeKind::Enum(extension)) => {
                r#enum.values.extend(enum_values(&extension.values));
            }
            (TypeDefinition::InputObject(input_object), ast::TypeKind::InputObject(extension)) => {
                input_object.fields.extend(input_values(&extension.fields)?);
            }
            _ => return Err(SchemaError::MismatchedExtension(name.to_owned())),
        }
    }

    Ok(())
}

fn ingest_schema_definitions(parsed: &ast::ServiceDocument, state: &mut State) {
    for definition in &parsed.definitions {
        let ast::TypeSystemDefinition::Schema(Positioned { node: schema, .. }) = definition else {
            continue;
        };

        if let Some(Positioned { node: name, .. }) = &schema.query {
            state.query_type_name = Some(name.to_string());
        }
        if let Some(Positioned { node: name, .. }) = &schema.mutation {
            state.mutation_type_name = Some(name.to_string());
        }
        if let Some(Positioned { node: name, .. }) = &schema.subscription {
            state.subscription_type_name = Some(name.to_string());
        }
    }
}

fn names(names: &[Positioned<async_graphql_value::Name>]) -> Vec<String> {
    names.iter().map(|name| name.node.to_string()).collect()
}

fn enum_values(values: &[Positioned<ast::EnumValueDefinition>]) -> Vec<String> {
    values.iter().map(|value| value.node.value.node.to_string()).collect()
}

fn fields(fields: &[Positioned<ast::FieldDefinition>]) -> Result<Vec<FieldDefinition>, SchemaError> {
    fields
        .iter()
        .map(|Positioned { node: field, .. }| {
            Ok(FieldDefinition {
                name: field.name.node.to_string(),
                arguments: input_values(&field.arguments)?,
                ty: TypeRef::from(&field.ty.node),
            })
        })
        .collect()
}

fn input_values(values: &[Positioned<ast::InputValueDefinition>]) -> Result<Vec<InputValueDefinition>, SchemaError> {
    values
        .iter()
        .map(|Positioned { node: value, .. }| {
            let default_value = value
                .default_value
                .as_ref()
                .map(|default| default.node.clone().into_json())
                .transpose()
                .map_err(|err| SchemaError::InvalidDefaultValue {
                    name: value.name.node.to_string(),
                    message: err.to_string(),
                })?;

            Ok(InputValueDefinition {
                name: value.name.node.to_string(),
                ty: TypeRef::from(&value.ty.node),
                default_value,
            })
        })
        .collect()
}

fn validate(schema: &Schema) -> Result<(), SchemaError> {
    let expect_type = |name: &str, location: String| {
        schema.definition(name).ok_or_else(|| SchemaError::UnknownType {
            name: name.to_owned(),
            location,
        })
    };

    let validate_fields = |parent: &str, fields: &[FieldDefinition]| -> Result<(), SchemaError> {
        for field in fields {
            let location = format!("{parent}.{}", field.name);
            if let TypeDefinition::InputObject(_) = expect_type(field.ty.named_type(), location.clone())? {
                return Err(SchemaError::NotAnOutputType {
                    name: field.ty.named_type().to_owned(),
                    location,
                });
            }

            for argument in &field.arguments {
                let location = format!("{parent}.{}({}:)", field.name, argument.name);
                if !expect_type(argument.ty.named_type(), location.clone())?.is_input() {
                    return Err(SchemaError::NotAnInputType {
                        name: argument.ty.named_type().to_owned(),
                        location,
                    });
                }
            }
        }
        Ok(())
    };

    for definition in schema.definitions() {
        match definition {
            TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) => (),
            TypeDefinition::Object(ObjectDefinition {
                name,
                implements,
                fields,
            })
            | TypeDefinition::Interface(InterfaceDefinition {
                name,
                implements,
                fields,
            }) => {
                validate_fields(name, fields)?;
                for interface in implements {
                    if !matches!(
                        expect_type(interface, format!("{name} implements"))?,
                        TypeDefinition::Interface(_)
                    ) {
                        return Err(SchemaError::NotAnInterface {
                            name: interface.clone(),
                            implementor: name.clone(),
                        });
                    }
                }
            }
            TypeDefinition::Union(union) => {
                for member in &union.members {
                    if !matches!(
                        expect_type(member, format!("union {}", union.name))?,
                        TypeDefinition::Object(_)
                    ) {
                        return Err(SchemaError::UnionMemberNotObject {
                            union: union.name.clone(),
                            member: member.clone(),
                        });
                    }
                }
            }
            TypeDefinition::InputObject(input_object) => {
                for field in &input_object.fields {
                    let location = format!("{}.{}", input_object.name, field.name);
                    if !expect_type(field.ty.named_type(), location.clone())?.is_input() {
                        return Err(SchemaError::NotAnInputType {
                            name: field.ty.named_type().to_owned(),
                            location,
                        });
                    }
                }
            }
        }
    }

    Ok(())
}
