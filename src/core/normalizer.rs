//! Reconciles the response bodies of heterogeneous inference spaces into a
//! single [`CanonicalResult`].
//!
//! Each known body layout is a [`ResponseShape`]; [`SHAPE_PRIORITY`] fixes the
//! order in which they are tried and the first match wins.

use crate::core::text::excerpt;
use crate::models::CanonicalResult;
use serde_json::Value;
use thiserror::Error;

/// Length of the body excerpt carried by [`UnrecognizedFormat`]
pub const FORMAT_EXCERPT_CHARS: usize = 200;

/// An upstream answered successfully but in a layout we cannot read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized response format ({content_type}): {body_excerpt}")]
pub struct UnrecognizedFormat {
    pub content_type: String,
    pub body_excerpt: String,
}

/// Known upstream response layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{"data": [<url | data-uri | {"url": ...}>, ...]}` (Gradio predict)
    DataSequence,
    /// `{"image": <url | data-uri>}`
    ImageField,
    /// `{"<key>": <url | data-uri>}` for a generic output key
    OutputField(&'static str),
}

/// Shapes in the order they are tried
pub const SHAPE_PRIORITY: [ResponseShape; 5] = [
    ResponseShape::DataSequence,
    ResponseShape::ImageField,
    ResponseShape::OutputField("output"),
    ResponseShape::OutputField("result"),
    ResponseShape::OutputField("generated_image"),
];

impl ResponseShape {
    /// Try to read `body` as this shape
    pub fn extract(self, body: &Value) -> Option<CanonicalResult> {
        match self {
            ResponseShape::DataSequence => {
                let first = body.get("data")?.as_array()?.first()?;
                match first {
                    Value::String(s) => classify(s),
                    Value::Object(obj) => obj
                        .get("url")
                        .and_then(Value::as_str)
                        .filter(|url| !url.is_empty())
                        .map(|url| CanonicalResult::ImageUrl(url.to_string())),
                    _ => None,
                }
            }
            ResponseShape::ImageField => classify(body.get("image")?.as_str()?),
            ResponseShape::OutputField(key) => classify(body.get(key)?.as_str()?),
        }
    }
}

/// Split an image reference into a URL or a bare base64 payload
fn classify(value: &str) -> Option<CanonicalResult> {
    if value.starts_with("http") {
        return Some(CanonicalResult::ImageUrl(value.to_string()));
    }
    if value.starts_with("data:image") {
        let (_, payload) = value.split_once(',')?;
        if payload.is_empty() {
            return None;
        }
        return Some(CanonicalResult::ImageBase64(payload.to_string()));
    }
    None
}

/// Match `body` against [`SHAPE_PRIORITY`], returning the first shape that fits
pub fn match_shape(body: &Value) -> Option<(ResponseShape, CanonicalResult)> {
    SHAPE_PRIORITY
        .iter()
        .find_map(|shape| shape.extract(body).map(|result| (*shape, result)))
}

/// Normalize a parsed JSON body
pub fn normalize(body: &Value) -> Result<CanonicalResult, UnrecognizedFormat> {
    match match_shape(body) {
        Some((_, result)) => Ok(result),
        None => Err(UnrecognizedFormat {
            content_type: "application/json".to_string(),
            body_excerpt: excerpt(&body.to_string(), FORMAT_EXCERPT_CHARS),
        }),
    }
}
