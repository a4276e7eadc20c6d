//! Binds caller-supplied variable values to an operation's variable definitions.

use std::fmt;

use graphql_operation_synthesis::{
    EnumDefinition, InputObjectDefinition, ScalarDefinition, Schema, TypeDefinition, TypeRef, VariableDefinition,
};
use serde_json::{Map, Value};

use crate::GraphqlError;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InputValueError {
    #[error("Variable ${name} of required type {ty} was not provided")]
    MissingVariable { name: String, ty: String },
    #[error("Found a null where we expected a {expected}{path}")]
    UnexpectedNull { expected: String, path: String },
    #[error("Found a {actual} value where we expected a '{name}' input object{path}")]
    MissingObject {
        name: String,
        actual: ValueKind,
        path: String,
    },
    #[error("Found a {actual} value where we expected a {expected} scalar{path}")]
    IncorrectScalarType {
        actual: ValueKind,
        expected: String,
        path: String,
    },
    #[error("Found value {actual} which cannot be coerced into a {expected} scalar{path}")]
    IncorrectScalarValue {
        actual: String,
        expected: String,
        path: String,
    },
    #[error("Found a {actual} value where we expected a {r#enum} enum value{path}")]
    IncorrectEnumValueType {
        r#enum: String,
        actual: ValueKind,
        path: String,
    },
    #[error("Unknown enum value '{value}' for enum {r#enum}{path}")]
    UnknownEnumValue {
        r#enum: String,
        value: String,
        path: String,
    },
    #[error("Input object {input_object} does not have a field named '{name}'{path}")]
    UnknownInputField {
        input_object: String,
        name: String,
        path: String,
    },
    #[error("Type {name} cannot be used as an input{path}")]
    NotAnInputType { name: String, path: String },
}

impl From<InputValueError> for GraphqlError {
    fn from(error: InputValueError) -> Self {
        GraphqlError::new(error.to_string()).with_code("BAD_USER_INPUT")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Object,
    Boolean,
    List,
    Null,
}

impl From<&Value> for ValueKind {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Number(number) if number.is_f64() => ValueKind::Float,
            Value::Number(_) => ValueKind::Integer,
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Array(_) => ValueKind::List,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::String => "String",
            ValueKind::Integer => "Integer",
            ValueKind::Float => "Float",
            ValueKind::Object => "Object",
            ValueKind::Boolean => "Boolean",
            ValueKind::List => "List",
            ValueKind::Null => "Null",
        })
    }
}

/// Coerces `supplied` against `definitions`.
///
/// Values for undeclared variables are dropped, absent nullable variables are left out and
/// every failure is collected rather than stopping at the first one.
pub fn bind_variables(
    schema: &Schema,
    definitions: &[VariableDefinition],
    supplied: &Map<String, Value>,
) -> Result<Map<String, Value>, Vec<InputValueError>> {
    let mut variables = Map::new();
    let mut errors = Vec::new();

    for definition in definitions {
        let Some(value) = supplied.get(&definition.name) else {
            if definition.ty.is_non_null() {
                errors.push(InputValueError::MissingVariable {
                    name: definition.name.clone(),
                    ty: definition.ty.to_string(),
                });
            }
            continue;
        };

        match coerce_variable(schema, &definition.ty, value.clone()) {
            Ok(value) => {
                variables.insert(definition.name.clone(), value);
            }
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(variables)
    } else {
        Err(errors)
    }
}

pub fn coerce_variable(schema: &Schema, ty: &TypeRef, value: Value) -> Result<Value, InputValueError> {
    let mut ctx = VariableCoercionContext {
        schema,
        value_path: Vec::new(),
    };
    ctx.coerce_input_value(ty, value)
}

enum ValuePathSegment {
    Index(usize),
    Field(String),
}

struct VariableCoercionContext<'a> {
    schema: &'a Schema,
    value_path: Vec<ValuePathSegment>,
}

impl VariableCoercionContext<'_> {
    fn coerce_input_value(&mut self, ty: &TypeRef, value: Value) -> Result<Value, InputValueError> {
        match ty {
            TypeRef::NonNull(inner) => {
                if value.is_null() {
                    return Err(InputValueError::UnexpectedNull {
                        expected: ty.to_string(),
                        path: self.path(),
                    });
                }
                self.coerce_input_value(inner, value)
            }
            _ if value.is_null() => Ok(Value::Null),
            TypeRef::List(inner) => match value {
                Value::Array(items) => {
                    let mut coerced = Vec::with_capacity(items.len());
                    for (idx, item) in items.into_iter().enumerate() {
                        self.value_path.push(ValuePathSegment::Index(idx));
                        coerced.push(self.coerce_input_value(inner, item)?);
                        self.value_path.pop();
                    }
                    Ok(Value::Array(coerced))
                }
                // A single value where a list is expected is a list of one.
                value => Ok(Value::Array(vec![self.coerce_input_value(inner, value)?])),
            },
            TypeRef::Named(name) => self.coerce_named_type(name, value),
        }
    }

    fn coerce_named_type(&mut self, name: &str, value: Value) -> Result<Value, InputValueError> {
        match self.schema.definition(name) {
            Some(TypeDefinition::Scalar(scalar)) => self.coerce_scalar(scalar, value),
            Some(TypeDefinition::Enum(r#enum)) => self.coerce_enum(r#enum, value),
            Some(TypeDefinition::InputObject(input_object)) => self.coerce_input_object(input_object, value),
            _ => Err(InputValueError::NotAnInputType {
                name: name.to_owned(),
                path: self.path(),
            }),
        }
    }

    fn coerce_input_object(
        &mut self,
        input_object: &InputObjectDefinition,
        value: Value,
    ) -> Result<Value, InputValueError> {
        let Value::Object(mut fields) = value else {
            return Err(InputValueError::MissingObject {
                name: input_object.name.clone(),
                actual: (&value).into(),
                path: self.path(),
            });
        };

        let mut coerced = Map::with_capacity(input_object.fields.len());
        for input_field in &input_object.fields {
            match fields.remove(&input_field.name) {
                None => {
                    if let Some(default_value) = &input_field.default_value {
                        coerced.insert(input_field.name.clone(), default_value.clone());
                    } else if input_field.ty.is_non_null() {
                        self.value_path.push(ValuePathSegment::Field(input_field.name.clone()));
                        return Err(InputValueError::UnexpectedNull {
                            expected: input_field.ty.to_string(),
                            path: self.path(),
                        });
                    }
                }
                Some(value) => {
                    self.value_path.push(ValuePathSegment::Field(input_field.name.clone()));
                    let value = self.coerce_input_value(&input_field.ty, value)?;
                    coerced.insert(input_field.name.clone(), value);
                    self.value_path.pop();
                }
            }
        }

        if let Some(name) = fields.keys().next() {
            return Err(InputValueError::UnknownInputField {
                input_object: input_object.name.clone(),
                name: name.clone(),
                path: self.path(),
            });
        }

        Ok(Value::Object(coerced))
    }

    fn coerce_enum(&mut self, r#enum: &EnumDefinition, value: Value) -> Result<Value, InputValueError> {
        let name = match &value {
            Value::String(value) => value.as_str(),
            value => {
                return Err(InputValueError::IncorrectEnumValueType {
                    r#enum: r#enum.name.clone(),
                    actual: value.into(),
                    path: self.path(),
                });
            }
        };

        if !r#enum.values.iter().any(|candidate| candidate == name) {
            return Err(InputValueError::UnknownEnumValue {
                r#enum: r#enum.name.clone(),
                value: name.to_owned(),
                path: self.path(),
            });
        }

        Ok(value)
    }

    fn coerce_scalar(&mut self, scalar: &ScalarDefinition, value: Value) -> Result<Value, InputValueError> {
        match (value, scalar.name.as_str()) {
            // Custom scalars are validated by the executor.
            (value, _) if !scalar.is_builtin() => Ok(value),
            (Value::Number(number), "Int") => {
                let int = match number.as_i64() {
                    Some(int) => Some(int),
                    None => number.as_f64().filter(|float| can_coerce_to_int(*float)).map(|float| float as i64),
                };

                match int.and_then(|int| i32::try_from(int).ok()) {
                    Some(int) => Ok(Value::from(int)),
                    None => Err(InputValueError::IncorrectScalarValue {
                        actual: number.to_string(),
                        expected: scalar.name.clone(),
                        path: self.path(),
                    }),
                }
            }
            (Value::Number(number), "Float") => Ok(Value::Number(number)),
            (Value::Number(number), "ID") if number.is_i64() || number.is_u64() => Ok(Value::String(number.to_string())),
            (value @ Value::String(_), "String" | "ID") => Ok(value),
            (value @ Value::Bool(_), "Boolean") => Ok(value),
            (actual, _) => Err(InputValueError::IncorrectScalarType {
                actual: (&actual).into(),
                expected: scalar.name.clone(),
                path: self.path(),
            }),
        }
    }

    fn path(&self) -> String {
        if self.value_path.is_empty() {
            return String::new();
        }

        let mut path = String::from(" at path '");
        for segment in &self.value_path {
            match segment {
                ValuePathSegment::Index(idx) => path.push_str(&format!(".{idx}")),
                ValuePathSegment::Field(name) => path.push_str(&format!(".{name}")),
            }
        }
        path.push('\'');
        path
    }
}

fn can_coerce_to_int(float: f64) -> bool {
    float.floor() == float && float < (i32::MAX as f64) && float > (i32::MIN as f64)
}
