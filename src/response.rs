use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Success envelope for a single value: `{success, data?, message?}`.
pub struct ApiSuccess<T> {
    status: StatusCode,
    data: Option<T>,
    message: Option<String>,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data: Some(data),
            message: None,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiSuccess<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            success: true,
            data: self.data.as_ref(),
            message: self.message.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Success envelope for collections: `{success, count, data, ...extras}`.
pub struct ApiList<T> {
    items: Vec<T>,
    extras: Vec<(&'static str, Value)>,
}

impl<T: Serialize> ApiList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            extras: Vec::new(),
        }
    }

    /// Adds a top-level field next to `data`, e.g. a summary block.
    pub fn with(mut self, key: &'static str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => self.extras.push((key, v)),
            Err(e) => tracing::error!(error = %e, key, "dropping unserializable list extra"),
        }
        self
    }

    fn into_body(self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(true));
        body.insert("count".into(), Value::from(self.items.len()));
        body.insert("data".into(), serde_json::to_value(&self.items)?);
        for (key, value) in self.extras {
            body.insert(key.into(), value);
        }
        Ok(body)
    }
}

impl<T: Serialize> IntoResponse for ApiList<T> {
    fn into_response(self) -> Response {
        match self.into_body() {
            Ok(body) => Json(Value::Object(body)).into_response(),
            Err(e) => ApiError::internal(e).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_body_carries_count_and_extras() {
        let body = ApiList::new(vec![1, 2, 3])
            .with("averageEnergy", 4)
            .into_body()
            .unwrap();
        assert_eq!(
            Value::Object(body),
            json!({"success": true, "count": 3, "data": [1, 2, 3], "averageEnergy": 4})
        );
    }

    #[test]
    fn empty_list_still_has_data_array() {
        let body = ApiList::<u8>::new(vec![]).into_body().unwrap();
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["count"], json!(0));
    }

    #[test]
    fn success_envelope_skips_missing_fields() {
        let env = Envelope::<u8> {
            success: true,
            data: None,
            message: Some("done"),
        };
        assert_eq!(
            serde_json::to_value(env).unwrap(),
            json!({"success": true, "message": "done"})
        );
    }
}
