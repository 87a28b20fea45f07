//! JSON array file exposed through GET/POST/PUT/DELETE-style handlers.
//!
//! # Responsibility
//! - Give the planner's request handlers their read-modify-write semantics
//!   without binding to any HTTP framework.
//! - Translate every outcome into a status code plus JSON body.
//!
//! # Invariants
//! - Mutations rewrite the whole file, pretty-printed with two-space indent.
//! - Mutations from one resource value are serialized by an internal lock;
//!   writers in other processes remain last-write-wins.
//! - `get` never fails: unreadable or malformed files read as `[]`.

use crate::store::backend::{BackendError, JsonFileBackend, StorageBackend};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Number, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Mutex;

/// Status code and JSON body returned by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn json(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn success() -> Self {
        Self::json(json!({ "success": true }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug)]
enum ApiError {
    Storage(BackendError),
    Malformed(String),
    BadRequest(&'static str),
    NotFound,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Malformed(message) => write!(f, "malformed resource file: {message}"),
            Self::BadRequest(message) => write!(f, "bad request: {message}"),
            Self::NotFound => write!(f, "element not found"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(value: BackendError) -> Self {
        Self::Storage(value)
    }
}

impl From<ApiError> for ApiResponse {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Storage(_) | ApiError::Malformed(_) => Self {
                status: 500,
                body: json!({ "error": "Failed" }),
            },
            ApiError::BadRequest(message) => Self {
                status: 400,
                body: json!({ "error": message }),
            },
            ApiError::NotFound => Self {
                status: 404,
                body: json!({ "error": "Not found" }),
            },
        }
    }
}

/// PUT body: either a numeric adjustment or a full replacement element.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PutBody {
    Adjust(Adjustment),
    Replace(Value),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Adjustment {
    id: Value,
    field: String,
    delta: Number,
}

pub struct JsonArrayResource {
    name: &'static str,
    backend: JsonFileBackend,
    id_field: String,
    write_lock: Mutex<()>,
}

impl JsonArrayResource {
    /// `name` labels log events (`schedule`, `inventory`); elements are
    /// matched on their `id` field.
    pub fn new(name: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::with_id_field(name, path, "id")
    }

    pub fn with_id_field(
        name: &'static str,
        path: impl Into<PathBuf>,
        id_field: impl Into<String>,
    ) -> Self {
        Self {
            name,
            backend: JsonFileBackend::new(path),
            id_field: id_field.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// GET: the stored array, or `[]` on any read or parse error.
    pub fn get(&self) -> ApiResponse {
        match self.read_array() {
            Ok(elements) => ApiResponse::json(Value::Array(elements)),
            Err(err) => {
                warn!(
                    "event=resource_get module=api status=warn resource={} error={err}",
                    self.name
                );
                ApiResponse::json(Value::Array(Vec::new()))
            }
        }
    }

    /// POST: appends `element`.
    pub fn post(&self, element: Value) -> ApiResponse {
        self.mutate("post", |elements| {
            elements.push(element);
            Ok(())
        })
    }

    /// PUT: replaces every element whose id matches `body`'s id, or applies
    /// `{id, field, delta}` to a numeric field.
    pub fn put(&self, body: Value) -> ApiResponse {
        let id_field = self.id_field.clone();
        let body = match serde_json::from_value::<PutBody>(body) {
            Ok(body) => body,
            Err(_) => return ApiError::BadRequest("invalid body").into(),
        };

        self.mutate("put", move |elements| match body {
            PutBody::Adjust(adjustment) => adjust(elements, &id_field, adjustment),
            PutBody::Replace(replacement) => {
                let id = replacement
                    .get(&id_field)
                    .cloned()
                    .ok_or(ApiError::BadRequest("missing id"))?;
                let mut matched = false;
                for element in elements.iter_mut().filter(|e| e.get(&id_field) == Some(&id)) {
                    *element = replacement.clone();
                    matched = true;
                }
                if matched {
                    Ok(())
                } else {
                    Err(ApiError::NotFound)
                }
            }
        })
    }

    /// DELETE: removes every element whose id matches `body.id`.
    pub fn delete(&self, body: Value) -> ApiResponse {
        let id = match body.get(&self.id_field) {
            Some(id) => id.clone(),
            None => return ApiError::BadRequest("missing id").into(),
        };
        let id_field = self.id_field.clone();

        self.mutate("delete", move |elements| {
            let before = elements.len();
            elements.retain(|element| element.get(&id_field) != Some(&id));
            if elements.len() == before {
                return Err(ApiError::NotFound);
            }
            Ok(())
        })
    }

    fn mutate<F>(&self, op: &'static str, apply: F) -> ApiResponse
    where
        F: FnOnce(&mut Vec<Value>) -> Result<(), ApiError>,
    {
        let result = match self.write_lock.lock() {
            Ok(_guard) => self.read_modify_write(apply),
            Err(_) => Err(ApiError::Malformed("write lock poisoned".to_string())),
        };

        match result {
            Ok(()) => {
                info!(
                    "event=resource_write module=api status=ok resource={} op={op}",
                    self.name
                );
                ApiResponse::success()
            }
            Err(err) => {
                warn!(
                    "event=resource_write module=api status=error resource={} op={op} error={err}",
                    self.name
                );
                err.into()
            }
        }
    }

    fn read_modify_write<F>(&self, apply: F) -> Result<(), ApiError>
    where
        F: FnOnce(&mut Vec<Value>) -> Result<(), ApiError>,
    {
        let mut elements = self.read_array()?;
        apply(&mut elements)?;
        let bytes = serde_json::to_vec_pretty(&elements).map_err(BackendError::Encode)?;
        self.backend.write(&bytes)?;
        Ok(())
    }

    /// Missing file reads as an empty array.
    fn read_array(&self) -> Result<Vec<Value>, ApiError> {
        let Some(bytes) = self.backend.read()? else {
            return Ok(Vec::new());
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(elements)) => Ok(elements),
            Ok(_) => Err(ApiError::Malformed("top-level value is not an array".to_string())),
            Err(err) => Err(ApiError::Malformed(err.to_string())),
        }
    }
}

fn adjust(elements: &mut [Value], id_field: &str, adjustment: Adjustment) -> Result<(), ApiError> {
    let element = elements
        .iter_mut()
        .find(|element| element.get(id_field) == Some(&adjustment.id))
        .ok_or(ApiError::NotFound)?;
    let slot = element
        .get_mut(&adjustment.field)
        .ok_or(ApiError::BadRequest("unknown field"))?;
    let current = match slot {
        Value::Number(number) => number.clone(),
        _ => return Err(ApiError::BadRequest("field is not numeric")),
    };

    *slot = match (current.as_i64(), adjustment.delta.as_i64()) {
        (Some(value), Some(delta)) => value
            .checked_add(delta)
            .map(Value::from)
            .ok_or(ApiError::BadRequest("numeric overflow"))?,
        _ => {
            let value = current.as_f64().unwrap_or_default()
                + adjustment.delta.as_f64().unwrap_or_default();
            Number::from_f64(value)
                .map(Value::Number)
                .ok_or(ApiError::BadRequest("numeric overflow"))?
        }
    };
    Ok(())
}
