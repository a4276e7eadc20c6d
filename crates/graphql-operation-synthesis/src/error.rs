use crate::OperationKind;

/// Errors raised while building a [`Schema`](crate::Schema) from SDL.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchemaError {
    #[error("failed to parse SDL: {0}")]
    Parse(String),
    #[error("type `{0}` is defined more than once")]
    DuplicateType(String),
    #[error("unknown type `{name}` referenced by {location}")]
    UnknownType { name: String, location: String },
    #[error("`{0}` is extended with a different kind of definition")]
    MismatchedExtension(String),
    #[error("root operation type `{0}` must be an object type")]
    RootTypeNotObject(String),
    #[error("union `{union}` contains `{member}`, which is not an object type")]
    UnionMemberNotObject { union: String, member: String },
    #[error("`{implementor}` implements `{name}`, which is not an interface")]
    NotAnInterface { name: String, implementor: String },
    #[error("`{name}` is used as an input at {location} but is an output type")]
    NotAnInputType { name: String, location: String },
    #[error("`{name}` is used as an output at {location} but is an input object")]
    NotAnOutputType { name: String, location: String },
    #[error("invalid default value for `{name}`: {message}")]
    InvalidDefaultValue { name: String, message: String },
}

/// Errors raised while synthesizing an operation document.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SynthesisError {
    #[error("the schema does not define a {0} root type")]
    MissingRootType(OperationKind),
    #[error("the {kind} root type has no field named `{field}`")]
    UnknownRootField { kind: OperationKind, field: String },
    #[error("unknown type `{0}`")]
    UnknownType(String),
}
