//! SCIM schema model (RFC 7643).
//!
//! Attribute descriptors carry the characteristics a PATCH engine consults:
//! multi-valuedness, sub-attributes and mutability. Schemas deserialize from
//! the RFC 7643 §7 JSON representation.
//!
//! ```
//! use scim_schema::{core_user_schema, Mutability};
//!
//! let user = core_user_schema();
//! let groups = user.contains_attribute("groups").unwrap();
//! assert!(groups.multi_valued());
//! assert_eq!(groups.mutability(), Mutability::ReadOnly);
//! ```

mod attribute;
pub use attribute::{Attribute, AttributeType, Mutability, Returned, Uniqueness};

mod schema;
pub use schema::{Schema, SchemaError};

mod builtin;
pub use builtin::{
    core_group_schema, core_user_schema, enterprise_user_extension, external_id,
    ENTERPRISE_USER_SCHEMA, GROUP_SCHEMA, USER_SCHEMA,
};
