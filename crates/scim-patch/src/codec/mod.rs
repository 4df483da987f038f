//! Wire formats for PATCH requests and error responses.

pub mod json;

pub use json::{
    error_to_json, from_json, from_json_request, parse_request, to_json, to_json_request,
    PatchRequest, ERROR_SCHEMA, PATCH_OP_SCHEMA,
};
