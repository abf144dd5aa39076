//! Bidirectional field-name translation
//!
//! Three naming conventions meet on the wire:
//! - system fields in upper snake case (`ASSIGNED_BY_ID`)
//! - user fields with the `UF_` prefix (`UF_CRM_1_ABC`)
//! - camelCase dynamic codes (`assignedById`, `ufCrm_1_ABC`, `ufCrmColor`)
//!
//! Requests speak the dynamic dialect, responses are read back in upper
//! snake case. Names that fit none of the shapes pass through unchanged.

use b24rest_domain::constants::{
    CRM_USER_FIELD_PREFIX, DYNAMIC_REQUEST_PREFIX, DYNAMIC_RESPONSE_PREFIX, FILTER_OPERATOR_CHARS,
    USER_FIELD_PREFIX, WILDCARD_ALL, WILDCARD_USER_FIELDS,
};
use b24rest_domain::{FieldDirection, FieldShape, UserFieldNames};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UPPER_SNAKE: Regex =
        Regex::new(r"^[A-Z0-9_]+$").expect("UPPER_SNAKE should compile - this is a bug");
    static ref LOWER_CAMEL: Regex = Regex::new(r"^[a-z0-9]+(?:[A-Z][a-z0-9]*)*$")
        .expect("LOWER_CAMEL should compile - this is a bug");
}

/// Field-name translator for one request.
///
/// The only state is how user fields are spelled on the request side;
/// response-side translation does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldNameCodec {
    user_fields: UserFieldNames,
}

impl FieldNameCodec {
    pub const fn new(user_fields: UserFieldNames) -> Self {
        Self { user_fields }
    }

    pub const fn user_fields(&self) -> UserFieldNames {
        self.user_fields
    }

    /// Translate `name` for the given side of the wire.
    pub fn translate(&self, name: &str, direction: FieldDirection) -> String {
        match direction {
            FieldDirection::Request => self.to_request_name(name),
            FieldDirection::Response => Self::to_response_name(name),
        }
    }

    /// Name to use in `select`, `order`, `filter` and `fields` of a request.
    pub fn to_request_name(&self, name: &str) -> String {
        match Self::classify(name) {
            FieldShape::Wildcard | FieldShape::Other | FieldShape::DynamicCamel => name.to_string(),
            FieldShape::UserField if self.user_fields.is_original() => name.to_string(),
            FieldShape::UserField => user_field_request_name(name),
            FieldShape::SystemUpperSnake => lower_camel(name),
        }
    }

    /// Name under which a response field is exposed to callers.
    pub fn to_response_name(name: &str) -> String {
        if name.is_empty() || is_wildcard(name) || name.starts_with(USER_FIELD_PREFIX) {
            return name.to_string();
        }

        if let Some(suffix) = name.strip_prefix(DYNAMIC_RESPONSE_PREFIX) {
            return format!("{CRM_USER_FIELD_PREFIX}{}", suffix.to_uppercase());
        }

        if !LOWER_CAMEL.is_match(name) {
            return name.to_string();
        }

        let mut snake = String::with_capacity(name.len() + 4);
        for (index, ch) in name.chars().enumerate() {
            if index > 0 && ch.is_ascii_uppercase() {
                snake.push('_');
            }
            snake.push(ch.to_ascii_uppercase());
        }
        snake
    }

    /// Request-side name of a filter key, keeping its operator prefix.
    pub fn to_request_filter_key(&self, key: &str) -> String {
        match split_operator(key) {
            Some((operator, field)) => format!("{operator}{}", self.to_request_name(field.trim())),
            None => key.to_string(),
        }
    }

    /// Shape of a field identifier.
    ///
    /// User fields are checked before the upper-snake pattern, so
    /// `UF_CRM_1_ABC` is a [`FieldShape::UserField`].
    pub fn classify(name: &str) -> FieldShape {
        if is_wildcard(name) {
            FieldShape::Wildcard
        } else if name.starts_with(DYNAMIC_REQUEST_PREFIX) {
            FieldShape::DynamicCamel
        } else if name.starts_with(USER_FIELD_PREFIX) {
            FieldShape::UserField
        } else if UPPER_SNAKE.is_match(name) {
            FieldShape::SystemUpperSnake
        } else if LOWER_CAMEL.is_match(name) {
            FieldShape::DynamicCamel
        } else {
            FieldShape::Other
        }
    }
}

/// Split a filter key into its comparison-operator prefix and field part.
///
/// The field part is never empty: a key made only of operator characters
/// keeps its last character as the field. Returns `None` for an empty key.
pub fn split_operator(key: &str) -> Option<(&str, &str)> {
    if key.is_empty() {
        return None;
    }

    let prefix_len = key.chars().take_while(|ch| FILTER_OPERATOR_CHARS.contains(ch)).count();
    let prefix_len = if prefix_len == key.len() { prefix_len - 1 } else { prefix_len };
    Some(key.split_at(prefix_len))
}

fn is_wildcard(name: &str) -> bool {
    name == WILDCARD_ALL || name == WILDCARD_USER_FIELDS
}

fn user_field_request_name(name: &str) -> String {
    let Some(suffix) = name.strip_prefix(CRM_USER_FIELD_PREFIX) else {
        return name.to_string();
    };
    if suffix.is_empty() {
        return name.to_string();
    }

    // The remote side only accepts the underscore form once a digit appears.
    if suffix.chars().any(|ch| ch.is_ascii_digit()) {
        format!("{DYNAMIC_RESPONSE_PREFIX}{}", suffix.to_uppercase())
    } else {
        format!("{DYNAMIC_REQUEST_PREFIX}{}", pascal_words(suffix))
    }
}

fn lower_camel(name: &str) -> String {
    let pascal = pascal_words(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn pascal_words(snake: &str) -> String {
    snake
        .split('_')
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic() -> FieldNameCodec {
        FieldNameCodec::new(UserFieldNames::Dynamic)
    }

    #[test]
    fn wildcards_and_dynamic_codes_pass_through() {
        let codec = dynamic();
        assert_eq!(codec.to_request_name("*"), "*");
        assert_eq!(codec.to_request_name("UF_*"), "UF_*");
        assert_eq!(codec.to_request_name("ufCrm_5_TITLE"), "ufCrm_5_TITLE");
        assert_eq!(codec.to_request_name("ufCrmColor"), "ufCrmColor");
    }

    #[test]
    fn system_fields_become_lower_camel() {
        let codec = dynamic();
        assert_eq!(codec.to_request_name("ASSIGNED_BY_ID"), "assignedById");
        assert_eq!(codec.to_request_name("ID"), "id");
        assert_eq!(codec.to_request_name("STAGE_ID"), "stageId");
    }

    #[test]
    fn user_fields_with_digits_keep_upper_suffix() {
        let codec = dynamic();
        assert_eq!(codec.to_request_name("UF_CRM_1_ABC"), "ufCrm_1_ABC");
        assert_eq!(codec.to_request_name("UF_CRM_1700000000"), "ufCrm_1700000000");
        assert_eq!(codec.to_request_name("UF_CRM_5_abc"), "ufCrm_5_ABC");
    }

    #[test]
    fn user_fields_without_digits_are_camelized() {
        let codec = dynamic();
        assert_eq!(codec.to_request_name("UF_CRM_DELIVERY_DATE"), "ufCrmDeliveryDate");
        assert_eq!(codec.to_request_name("UF_CRM_COLOR"), "ufCrmColor");
    }

    #[test]
    fn original_user_field_names_are_kept() {
        let codec = FieldNameCodec::new(UserFieldNames::Original);
        assert_eq!(codec.to_request_name("UF_CRM_1_ABC"), "UF_CRM_1_ABC");
        assert_eq!(codec.to_request_name("TITLE"), "title");
    }

    #[test]
    fn non_crm_user_fields_are_untouched() {
        assert_eq!(dynamic().to_request_name("UF_DEPARTMENT"), "UF_DEPARTMENT");
        assert_eq!(dynamic().to_request_name("UF_CRM_"), "UF_CRM_");
    }

    #[test]
    fn response_names_are_upper_snake() {
        assert_eq!(FieldNameCodec::to_response_name("assignedById"), "ASSIGNED_BY_ID");
        assert_eq!(FieldNameCodec::to_response_name("id"), "ID");
        assert_eq!(FieldNameCodec::to_response_name("ufCrm_1_abc"), "UF_CRM_1_ABC");
        assert_eq!(FieldNameCodec::to_response_name("ufCrmColor"), "UF_CRM_COLOR");
        assert_eq!(FieldNameCodec::to_response_name("UF_CRM_1_ABC"), "UF_CRM_1_ABC");
        assert_eq!(FieldNameCodec::to_response_name("already_snake"), "already_snake");
        assert_eq!(FieldNameCodec::to_response_name(""), "");
    }

    #[test]
    fn system_names_round_trip() {
        let codec = dynamic();
        for name in ["ID", "TITLE", "ASSIGNED_BY_ID", "DATE_CREATE", "OPPORTUNITY", "UF_CRM_1_ABC"] {
            let request = codec.to_request_name(name);
            assert_eq!(FieldNameCodec::to_response_name(&request), name, "via {request}");
        }
    }

    #[test]
    fn filter_keys_keep_operator_prefix() {
        let codec = dynamic();
        assert_eq!(codec.to_request_filter_key(">=DATE_CREATE"), ">=dateCreate");
        assert_eq!(codec.to_request_filter_key("!UF_CRM_1_ABC"), "!ufCrm_1_ABC");
        assert_eq!(codec.to_request_filter_key("%TITLE"), "%title");
        assert_eq!(codec.to_request_filter_key("STAGE_ID"), "stageId");
        assert_eq!(codec.to_request_filter_key("="), "=");
        assert_eq!(codec.to_request_filter_key(""), "");
    }

    #[test]
    fn split_operator_never_returns_empty_field() {
        assert_eq!(split_operator("<id"), Some(("<", "id")));
        assert_eq!(split_operator("!="), Some(("!", "=")));
        assert_eq!(split_operator("ID"), Some(("", "ID")));
        assert_eq!(split_operator(""), None);
    }

    #[test]
    fn classification_covers_all_shapes() {
        assert_eq!(FieldNameCodec::classify("*"), FieldShape::Wildcard);
        assert_eq!(FieldNameCodec::classify("ASSIGNED_BY_ID"), FieldShape::SystemUpperSnake);
        assert_eq!(FieldNameCodec::classify("UF_CRM_1_ABC"), FieldShape::UserField);
        assert_eq!(FieldNameCodec::classify("assignedById"), FieldShape::DynamicCamel);
        assert_eq!(FieldNameCodec::classify("ufCrm_1_ABC"), FieldShape::DynamicCamel);
        assert_eq!(FieldNameCodec::classify("Mixed-Case"), FieldShape::Other);
    }

    #[test]
    fn translate_dispatches_on_direction() {
        let codec = dynamic();
        assert_eq!(codec.translate("STAGE_ID", FieldDirection::Request), "stageId");
        assert_eq!(codec.translate("stageId", FieldDirection::Response), "STAGE_ID");
    }
}
