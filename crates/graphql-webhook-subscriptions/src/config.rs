use std::{collections::BTreeMap, path::Path, time::Duration};

use duration_str::deserialize_duration;
use graphql_operation_synthesis::{SynthesisOptions, DEFAULT_IDENTIFIER_FIELD};
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::delivery::{DeliverySink, HttpDelivery, DEFAULT_DELIVERY_TIMEOUT};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid delivery header `{0}`")]
    InvalidHeader(String),
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Object types collapsed to their identifier when referenced below a subscription field.
    pub models: Vec<String>,
    /// Type names or `Parent.field` paths that are never collapsed.
    pub ignore: Vec<String>,
    /// The field selected on collapsed models, `id` by default.
    pub identifier_field: String,
    /// How deep composite fields are expanded. Unlimited by default.
    pub depth_limit: Option<usize>,
    pub delivery: DeliveryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            ignore: Vec::new(),
            identifier_field: DEFAULT_IDENTIFIER_FIELD.to_owned(),
            depth_limit: None,
            delivery: DeliveryConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&input)
    }

    pub fn synthesis_options(&self) -> SynthesisOptions {
        let options = SynthesisOptions::default()
            .with_models(self.models.iter().cloned())
            .with_ignore(self.ignore.iter().cloned())
            .with_identifier_field(&self.identifier_field);

        match self.depth_limit {
            Some(limit) => options.with_depth_limit(limit),
            None => options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Upper bound for a single push, e.g. `"5s"`.
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Extra headers sent with every push.
    pub headers: BTreeMap<String, String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_DELIVERY_TIMEOUT,
            headers: BTreeMap::new(),
        }
    }
}

impl DeliveryConfig {
    /// An HTTP sink sending the configured headers, bounded by the configured timeout.
    pub fn sink(&self) -> Result<DeliverySink, ConfigError> {
        Ok(HttpDelivery::sink(self.header_map()?).with_timeout(self.timeout))
    }

    pub fn header_map(&self) -> Result<HeaderMap, ConfigError> {
        self.headers
            .iter()
            .map(|(name, value)| {
                let invalid = || ConfigError::InvalidHeader(name.clone());
                let header_name = HeaderName::try_from(name.as_str()).map_err(|_| invalid())?;
                let header_value = HeaderValue::try_from(value.as_str()).map_err(|_| invalid())?;
                Ok((header_name, header_value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.identifier_field, "id");
        assert_eq!(config.delivery.timeout, Duration::from_secs(10));
        assert_eq!(config.synthesis_options(), SynthesisOptions::default());
    }

    #[test]
    fn full() {
        let config = Config::from_toml_str(indoc! {r#"
            models = ["User", "Post"]
            ignore = ["Comment.author"]
            identifier_field = "uuid"
            depth_limit = 4

            [delivery]
            timeout = "2s"
            headers = { "x-webhook-secret" = "s3cr3t" }
        "#})
        .unwrap();

        let options = config.synthesis_options();
        assert!(options.models.contains("User"));
        assert!(options.models.contains("Post"));
        assert!(options.ignore.contains("Comment.author"));
        assert_eq!(options.identifier_field, "uuid");
        assert_eq!(options.depth_limit, Some(4));

        assert_eq!(config.delivery.timeout, Duration::from_secs(2));
        let headers = config.delivery.header_map().unwrap();
        assert_eq!(headers["x-webhook-secret"], "s3cr3t");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = Config::from_toml_str("modles = []").unwrap_err();

        insta::assert_snapshot!(error, @r###"
        invalid configuration: TOML parse error at line 1, column 1
          |
        1 | modles = []
          | ^^^^^^
        unknown field `modles`, expected one of `models`, `ignore`, `identifier_field`, `depth_limit`, `delivery`
        "###);
    }

    #[test]
    fn invalid_header_name() {
        let config = Config::from_toml_str(indoc! {r#"
            [delivery.headers]
            "bad header" = "value"
        "#})
        .unwrap();

        assert_eq!(
            config.delivery.header_map().unwrap_err().to_string(),
            "invalid delivery header `bad header`"
        );
    }
}
