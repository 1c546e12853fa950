//! # Scenario Collections
//!
//! A scenario is one endpoint plus the partitioned parameters it accepts.
//! Each parameter is bound into the request at a fixed location: a `{{name}}`
//! path segment, a query pair, or a field of the JSON body.

mod builtin;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::environment::{self, Variables};
use crate::equivalence;
use crate::error::{Error, Result};
use crate::generator::ParameterSpec;
use crate::http::method::HttpMethod;
use crate::http::request::RequestInput;

pub use builtin::builtin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
}

/// Where a parameter's partition comes from: the field table or inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterSource {
    Field { field: String },
    Inline(ParameterSpec<Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameter {
    pub name: String,
    pub location: ParameterLocation,
    #[serde(flatten)]
    pub source: ParameterSource,
}

impl ScenarioParameter {
    pub fn spec(&self) -> Result<ParameterSpec<Value>> {
        match &self.source {
            ParameterSource::Field { field } => equivalence::lookup(field),
            ParameterSource::Inline(spec) => Ok(spec.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub method: HttpMethod,
    pub path: String,
    pub parameters: Vec<ScenarioParameter>,
}

impl Scenario {
    pub fn specs(&self) -> Result<Vec<ParameterSpec<Value>>> {
        self.parameters.iter().map(ScenarioParameter::spec).collect()
    }

    /// Check that every parameter can actually be placed in a request.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for parameter in &self.parameters {
            if !seen.insert(parameter.name.as_str()) {
                return Err(Error::Config(format!(
                    "scenario `{}` declares parameter `{}` twice",
                    self.name, parameter.name
                )));
            }

            match parameter.location {
                ParameterLocation::Path if !self.path.contains(&placeholder(&parameter.name)) => {
                    return Err(Error::Config(format!(
                        "scenario `{}`: path `{}` has no `{}` segment",
                        self.name,
                        self.path,
                        placeholder(&parameter.name)
                    )));
                }
                ParameterLocation::Body if !self.method.carries_body() => {
                    return Err(Error::Config(format!(
                        "scenario `{}`: {} requests carry no body for `{}`",
                        self.name, self.method, parameter.name
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Build the request for one generated case. `values` are in parameter
    /// order; placeholders inside them are filled from `variables` first.
    /// Path values are percent-encoded as single segments, so a value
    /// containing `/`, `?` or `#` stays inside its own segment.
    pub fn bind(&self, base_url: &str, values: &[Value], variables: &Variables) -> Result<RequestInput> {
        let mut path_values = Vec::new();
        let mut query = Vec::new();
        let mut body = Map::new();

        for (parameter, value) in self.parameters.iter().zip(values) {
            let value = environment::interpolate_value(value, variables);
            match parameter.location {
                ParameterLocation::Path => {
                    path_values.push((placeholder(&parameter.name), render(&value)));
                }
                ParameterLocation::Query => query.push((parameter.name.clone(), render(&value))),
                ParameterLocation::Body => {
                    body.insert(parameter.name.clone(), value);
                }
            }
        }

        let segments: Vec<String> = self
            .path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| {
                let segment = path_values
                    .iter()
                    .fold(segment.to_string(), |segment, (slot, value)| segment.replace(slot, value));
                environment::interpolate(&segment, variables)
            })
            .collect();

        ensure_resolved(&format!("/{}", segments.join("/")))?;
        for (_, value) in &query {
            ensure_resolved(value)?;
        }

        let body = if body.is_empty() {
            None
        } else {
            let body = Value::Object(body);
            ensure_resolved(&body.to_string())?;
            Some(body)
        };

        Ok(RequestInput {
            method: self.method,
            url: join_url(base_url, &segments)?,
            query,
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub variables: Variables,
    pub scenarios: Vec<Scenario>,
}

impl Collection {
    pub fn find(&self, name: &str) -> Result<&Scenario> {
        self.scenarios
            .iter()
            .find(|scenario| scenario.name == name)
            .ok_or_else(|| Error::UnknownScenario(name.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.scenarios.iter().try_for_each(Scenario::validate)
    }
}

fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Text form of a value inside a URL. Strings lose their JSON quotes.
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Append `segments` to the path of `base_url`, percent-encoding each one.
fn join_url(base_url: &str, segments: &[String]) -> Result<String> {
    let mut url = reqwest::Url::parse(base_url)
        .map_err(|e| Error::Config(format!("Invalid base URL `{base_url}`: {e}")))?;

    url.path_segments_mut()
        .map_err(|()| Error::Config(format!("Base URL `{base_url}` cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);

    Ok(url.into())
}

fn ensure_resolved(text: &str) -> Result<()> {
    match environment::unresolved(text).into_iter().next() {
        Some(name) => Err(Error::UnresolvedVariable(name, text.to_string())),
        None => Ok(()),
    }
}
