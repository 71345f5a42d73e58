//! Request and response bodies of the JSON hash protocol.
//!
//! | Operation | Request | Response |
//! |---|---|---|
//! | get all | `GET /{key}` | object of strings, 404 when absent |
//! | get one | `GET /{key}/{field}` | string, 404 when absent |
//! | get many | `POST /{key}/_mget` + [`FieldsRequest`] | array of string-or-null |
//! | set one | `PUT /{key}/{field}` + string | any 2xx |
//! | set many | `PATCH /{key}` + object of strings | any 2xx |
//! | set if absent | `POST /{key}/{field}/_setnx` + string | [`SetIfAbsentResponse`] |

use serde::{Deserialize, Serialize};

/// Path segment of the get-many endpoint.
pub const MGET_SEGMENT: &str = "_mget";

/// Path segment of the set-if-absent endpoint.
pub const SETNX_SEGMENT: &str = "_setnx";

/// Body of a get-many request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldsRequest {
    pub fields: Vec<String>,
}

/// Body of a set-if-absent response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetIfAbsentResponse {
    /// Whether the value was written.
    pub set: bool,
}
