use serde_json::{Map, Value};

/// A GraphQL execution result in the usual `{ data, errors, extensions }` shape.
///
/// This is both the payload pushed to callbacks and the inline result returned when a
/// subscription ends before producing a stream.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Response {
    /// `None` when execution never started, `Some(Value::Null)` when it did but produced no data.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl Response {
    pub fn data(data: Value) -> Self {
        Response {
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn from_errors(errors: impl IntoIterator<Item = GraphqlError>) -> Self {
        Response {
            errors: errors.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::from_errors([GraphqlError::new(message)])
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <Value as serde::Deserialize>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        GraphqlError {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: Map::new(),
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.extensions.insert("code".to_owned(), Value::String(code.to_owned()));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_in_graphql_shape() {
        let response = Response::data(json!({ "messageAdded": { "id": "1" } }));
        insta::assert_json_snapshot!(response, @r###"
        {
          "data": {
            "messageAdded": {
              "id": "1"
            }
          }
        }
        "###);

        let response = Response::from_errors([GraphqlError::new("boom").with_code("BAD_REQUEST")]);
        insta::assert_json_snapshot!(response, @r###"
        {
          "errors": [
            {
              "message": "boom",
              "extensions": {
                "code": "BAD_REQUEST"
              }
            }
          ]
        }
        "###);
        assert!(!response.is_ok());
    }

    #[test]
    fn deserializes_executor_output() {
        let response: Response = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "nope", "locations": [{ "line": 1, "column": 2 }], "path": ["a", 0] }]
        }))
        .unwrap();

        assert_eq!(response.data, Some(Value::Null));
        assert_eq!(response.errors[0].locations, vec![Location { line: 1, column: 2 }]);
        assert_eq!(response.errors[0].path, vec![json!("a"), json!(0)]);

        let response: Response = serde_json::from_value(json!({ "errors": [{ "message": "nope" }] })).unwrap();
        assert_eq!(response.data, None);
    }

    #[test]
    fn null_data_is_kept() {
        let response: Response = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "boom" }]
        }))
        .unwrap();

        insta::assert_json_snapshot!(response, @r###"
        {
          "data": null,
          "errors": [
            {
              "message": "boom"
            }
          ]
        }
        "###);
    }
}
