//! Resource schemas defined by RFC 7643 §4 and §8.7.1.

use crate::attribute::{Attribute, AttributeType, Mutability, Returned, Uniqueness};
use crate::schema::Schema;

pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const GROUP_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
pub const ENTERPRISE_USER_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

/// `externalId` is common to every resource type but belongs to no schema.
pub fn external_id() -> Attribute {
    Attribute::string("externalId")
        .with_case_exact(true)
        .with_description(
            "A String that is an identifier for the resource as defined by the provisioning client.",
        )
}

/// The `urn:ietf:params:scim:schemas:core:2.0:User` schema.
pub fn core_user_schema() -> Schema {
    Schema::new(USER_SCHEMA)
        .with_name("User")
        .with_description("User Account")
        .with_attribute(
            Attribute::string("userName")
                .with_required(true)
                .with_uniqueness(Uniqueness::Server)
                .with_description("Unique identifier for the User, typically used by the user to directly authenticate to the service provider."),
        )
        .with_attribute(Attribute::complex(
            "name",
            vec![
                Attribute::string("formatted"),
                Attribute::string("familyName"),
                Attribute::string("givenName"),
                Attribute::string("middleName"),
                Attribute::string("honorificPrefix"),
                Attribute::string("honorificSuffix"),
            ],
        ))
        .with_attribute(Attribute::string("displayName"))
        .with_attribute(Attribute::string("nickName"))
        .with_attribute(Attribute::reference("profileUrl", &["external"]))
        .with_attribute(Attribute::string("title"))
        .with_attribute(Attribute::string("userType"))
        .with_attribute(Attribute::string("preferredLanguage"))
        .with_attribute(Attribute::string("locale"))
        .with_attribute(Attribute::string("timezone"))
        .with_attribute(Attribute::boolean("active"))
        .with_attribute(
            Attribute::string("password")
                .with_mutability(Mutability::WriteOnly)
                .with_returned(Returned::Never),
        )
        .with_attribute(multi_valued_complex(
            "emails",
            Attribute::string("value"),
            &["work", "home", "other"],
        ))
        .with_attribute(multi_valued_complex(
            "phoneNumbers",
            Attribute::string("value"),
            &["work", "home", "mobile", "fax", "pager", "other"],
        ))
        .with_attribute(multi_valued_complex(
            "ims",
            Attribute::string("value"),
            &["aim", "gtalk", "icq", "xmpp", "msn", "skype", "qq", "yahoo"],
        ))
        .with_attribute(multi_valued_complex(
            "photos",
            Attribute::reference("value", &["external"]),
            &["photo", "thumbnail"],
        ))
        .with_attribute(
            Attribute::complex(
                "addresses",
                vec![
                    Attribute::string("formatted"),
                    Attribute::string("streetAddress"),
                    Attribute::string("locality"),
                    Attribute::string("region"),
                    Attribute::string("postalCode"),
                    Attribute::string("country"),
                    Attribute::string("type").with_canonical_values(&["work", "home", "other"]),
                    Attribute::boolean("primary"),
                ],
            )
            .multi(),
        )
        .with_attribute(
            Attribute::complex(
                "groups",
                vec![
                    Attribute::string("value").with_mutability(Mutability::ReadOnly),
                    Attribute::reference("$ref", &["User", "Group"])
                        .with_mutability(Mutability::ReadOnly),
                    Attribute::string("display").with_mutability(Mutability::ReadOnly),
                    Attribute::string("type")
                        .with_canonical_values(&["direct", "indirect"])
                        .with_mutability(Mutability::ReadOnly),
                ],
            )
            .multi()
            .with_mutability(Mutability::ReadOnly),
        )
        .with_attribute(multi_valued_complex(
            "entitlements",
            Attribute::string("value"),
            &[],
        ))
        .with_attribute(multi_valued_complex("roles", Attribute::string("value"), &[]))
        .with_attribute(multi_valued_complex(
            "x509Certificates",
            Attribute::simple("value", AttributeType::Binary),
            &[],
        ))
}

/// The `urn:ietf:params:scim:schemas:core:2.0:Group` schema.
pub fn core_group_schema() -> Schema {
    Schema::new(GROUP_SCHEMA)
        .with_name("Group")
        .with_description("Group")
        .with_attribute(Attribute::string("displayName").with_required(true))
        .with_attribute(
            Attribute::complex(
                "members",
                vec![
                    Attribute::string("value").with_mutability(Mutability::Immutable),
                    Attribute::reference("$ref", &["User", "Group"])
                        .with_mutability(Mutability::Immutable),
                    Attribute::string("display").with_mutability(Mutability::ReadOnly),
                    Attribute::string("type")
                        .with_canonical_values(&["User", "Group"])
                        .with_mutability(Mutability::Immutable),
                ],
            )
            .multi(),
        )
}

/// The `urn:ietf:params:scim:schemas:extension:enterprise:2.0:User` extension.
pub fn enterprise_user_extension() -> Schema {
    Schema::new(ENTERPRISE_USER_SCHEMA)
        .with_name("EnterpriseUser")
        .with_description("Enterprise User")
        .with_attribute(Attribute::string("employeeNumber"))
        .with_attribute(Attribute::string("costCenter"))
        .with_attribute(Attribute::string("organization"))
        .with_attribute(Attribute::string("division"))
        .with_attribute(Attribute::string("department"))
        .with_attribute(Attribute::complex(
            "manager",
            vec![
                Attribute::string("value"),
                Attribute::reference("$ref", &["User"]),
                Attribute::string("displayName").with_mutability(Mutability::ReadOnly),
            ],
        ))
}

/// `value`, `display`, `type`, `primary`: the common shape of RFC 7643
/// multi-valued attributes.
fn multi_valued_complex(name: &str, value: Attribute, types: &[&str]) -> Attribute {
    let mut kind = Attribute::string("type");
    if !types.is_empty() {
        kind = kind.with_canonical_values(types);
    }
    Attribute::complex(
        name,
        vec![
            value,
            Attribute::string("display"),
            kind,
            Attribute::boolean("primary"),
        ],
    )
    .multi()
}
