//! Field name shapes

use serde::{Deserialize, Serialize};

use crate::impl_wire_keyword_conversions;

/// Naming convention a field identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldShape {
    /// `*` or `UF_*`.
    Wildcard,
    /// `ASSIGNED_BY_ID`.
    SystemUpperSnake,
    /// `UF_CRM_1_ABC`.
    UserField,
    /// `assignedById`, `ufCrm_1_ABC`, `ufCrmColor`.
    DynamicCamel,
    /// Anything else; translated as the identity.
    Other,
}

impl_wire_keyword_conversions!(FieldShape {
    Wildcard => "WILDCARD",
    SystemUpperSnake => "SYSTEM_UPPER_SNAKE",
    UserField => "USER_FIELD",
    DynamicCamel => "DYNAMIC_CAMEL",
    Other => "OTHER",
});

/// Which side of the wire a field name is translated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldDirection {
    Request,
    Response,
}

/// How user fields are spelled in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UserFieldNames {
    /// `UF_CRM_1_ABC` is sent as is (`useOriginalUfNames=Y`).
    Original,
    /// `UF_CRM_1_ABC` is rewritten to `ufCrm_1_ABC` (`useOriginalUfNames=N`).
    #[default]
    Dynamic,
}

impl UserFieldNames {
    pub const fn is_original(self) -> bool {
        matches!(self, Self::Original)
    }

    /// Value of the `useOriginalUfNames` request flag.
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Original => "Y",
            Self::Dynamic => "N",
        }
    }
}
