use serde_json::Value;

use super::method::HttpMethod;

#[derive(Debug, Clone, PartialEq)]
pub struct RequestInput {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}
