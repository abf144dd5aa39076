//! Request builders layered on the field codec
//!
//! `select`, `order`, `filter` and write payloads are rewritten key by key.
//! Nested filter groups are objects under numeric keys; their structural
//! `logic` key is normalized but never translated as a field.

use b24rest_domain::constants::{
    FILTER_LOGIC_KEY, USER_FIELD_PREFIX, WILDCARD_ALL, WILDCARD_USER_FIELDS,
};
use b24rest_domain::{Record, SortDirection, SortKey, UserFieldNames};
use serde_json::{Map, Value};

use super::codec::{split_operator, FieldNameCodec};

/// Pick the user-field spelling for a list request.
///
/// Asking for original user-field names together with system fields makes
/// the remote list method return empty items, so original names are only
/// used when the select is empty or made of wildcards and `UF_` fields.
pub fn user_field_names_for_select(select: Option<&Value>) -> UserFieldNames {
    let Some(Value::Array(fields)) = select else {
        return UserFieldNames::Original;
    };

    let only_user_fields = fields.iter().filter_map(Value::as_str).map(str::trim).all(|field| {
        field.is_empty()
            || field == WILDCARD_ALL
            || field == WILDCARD_USER_FIELDS
            || field.starts_with(USER_FIELD_PREFIX)
    });

    if only_user_fields {
        UserFieldNames::Original
    } else {
        UserFieldNames::Dynamic
    }
}

/// Translate a `select` list; non-string and blank entries are dropped.
pub fn normalize_select(codec: &FieldNameCodec, select: &Value) -> Vec<Value> {
    let Value::Array(fields) = select else {
        return Vec::new();
    };

    fields
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| Value::String(codec.to_request_name(field)))
        .collect()
}

/// Translate an `order` map; directions collapse to `ASC`/`DESC`.
pub fn normalize_order(codec: &FieldNameCodec, order: &Map<String, Value>) -> Map<String, Value> {
    parse_order(order)
        .into_iter()
        .map(|key| {
            (codec.to_request_name(&key.field), Value::String(key.direction.as_str().into()))
        })
        .collect()
}

/// Read an `order` map as sort keys, keeping caller priority.
pub fn parse_order(order: &Map<String, Value>) -> Vec<SortKey> {
    order
        .iter()
        .filter(|(field, _)| !field.trim().is_empty())
        .map(|(field, direction)| SortKey::new(field.trim(), SortDirection::from_value(direction)))
        .collect()
}

/// Translate a filter recursively, preserving operator prefixes.
pub fn normalize_filter(codec: &FieldNameCodec, filter: &Map<String, Value>) -> Map<String, Value> {
    let mut normalized = Map::with_capacity(filter.len());
    for (key, value) in filter {
        if is_group_key(key) {
            normalized.insert(key.clone(), normalize_filter_value(codec, value));
        } else if key.eq_ignore_ascii_case(FILTER_LOGIC_KEY) {
            normalized.insert(FILTER_LOGIC_KEY.to_string(), value.clone());
        } else {
            normalized.insert(codec.to_request_filter_key(key), normalize_filter_value(codec, value));
        }
    }
    normalized
}

fn normalize_filter_value(codec: &FieldNameCodec, value: &Value) -> Value {
    match value {
        Value::Object(group) => Value::Object(normalize_filter(codec, group)),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| normalize_filter_value(codec, item)).collect())
        }
        scalar => scalar.clone(),
    }
}

/// Translate the keys of a write payload.
pub fn normalize_fields(codec: &FieldNameCodec, fields: &Map<String, Value>) -> Map<String, Value> {
    fields.iter().map(|(key, value)| (codec.to_request_name(key), value.clone())).collect()
}

/// Expose a response record under upper-snake names.
pub fn normalize_record(record: Record) -> Record {
    record.into_iter().map(|(key, value)| (FieldNameCodec::to_response_name(&key), value)).collect()
}

/// Whether any filter condition, at any nesting depth, targets one of
/// `fields` (case-insensitive, operator prefix ignored).
pub fn filter_mentions_field(filter: &Map<String, Value>, fields: &[&str]) -> bool {
    filter.iter().any(|(key, value)| {
        if key.eq_ignore_ascii_case(FILTER_LOGIC_KEY) {
            return false;
        }

        let targets_field = !is_group_key(key)
            && split_operator(key.trim()).is_some_and(|(_, field)| {
                fields.iter().any(|candidate| field.eq_ignore_ascii_case(candidate))
            });

        targets_field || value_mentions_field(value, fields)
    })
}

fn value_mentions_field(value: &Value, fields: &[&str]) -> bool {
    match value {
        Value::Object(group) => filter_mentions_field(group, fields),
        Value::Array(items) => items.iter().any(|item| value_mentions_field(item, fields)),
        _ => false,
    }
}

/// Whether an order list sorts by `field` in any case variant.
pub fn order_mentions_field(order: &[SortKey], field: &str) -> bool {
    order.iter().any(|key| key.field.trim().eq_ignore_ascii_case(field))
}

fn is_group_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn select_of_system_fields_switches_to_dynamic_names() {
        assert_eq!(user_field_names_for_select(None), UserFieldNames::Original);
        assert_eq!(user_field_names_for_select(Some(&json!([]))), UserFieldNames::Original);
        assert_eq!(
            user_field_names_for_select(Some(&json!(["*", "UF_*", "UF_CRM_1_ABC"]))),
            UserFieldNames::Original
        );
        assert_eq!(
            user_field_names_for_select(Some(&json!(["ID", "UF_CRM_1_ABC"]))),
            UserFieldNames::Dynamic
        );
    }

    #[test]
    fn select_is_trimmed_and_translated() {
        let codec = FieldNameCodec::new(UserFieldNames::Dynamic);
        let select = normalize_select(&codec, &json!([" TITLE ", "", 5, "UF_CRM_1_ABC"]));
        assert_eq!(select, vec![json!("title"), json!("ufCrm_1_ABC")]);
    }

    #[test]
    fn order_directions_are_normalized() {
        let codec = FieldNameCodec::default();
        let order = normalize_order(
            &codec,
            &object(json!({"DATE_CREATE": "desc", "TITLE": "sideways", " ": "ASC"})),
        );
        assert_eq!(Value::Object(order), json!({"dateCreate": "DESC", "title": "ASC"}));
    }

    #[test]
    fn nested_filter_groups_are_translated() {
        let codec = FieldNameCodec::default();
        let filter = object(json!({
            ">=OPPORTUNITY": 100,
            "@STAGE_ID": ["NEW", "WON"],
            "0": {
                "LOGIC": "OR",
                "0": {"=ASSIGNED_BY_ID": 1},
                "1": {"%TITLE": "acme"}
            }
        }));

        let normalized = normalize_filter(&codec, &filter);
        assert_eq!(
            Value::Object(normalized),
            json!({
                ">=opportunity": 100,
                "@stageId": ["NEW", "WON"],
                "0": {
                    "logic": "OR",
                    "0": {"=assignedById": 1},
                    "1": {"%title": "acme"}
                }
            })
        );
    }

    #[test]
    fn record_keys_are_exposed_in_upper_snake() {
        let record = object(json!({"id": 7, "assignedById": 1, "ufCrm_1_abc": "x"}));
        let normalized = normalize_record(record);
        let keys: Vec<&str> = normalized.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ID", "ASSIGNED_BY_ID", "UF_CRM_1_ABC"]);
    }

    #[test]
    fn detects_cursor_field_in_nested_filter() {
        let nested = object(json!({"0": {"logic": "AND", ">id": 5}}));
        assert!(filter_mentions_field(&nested, &["ID"]));

        let plain = object(json!({"!=Id": 3}));
        assert!(filter_mentions_field(&plain, &["ID"]));

        let unrelated = object(json!({"ASSIGNED_BY_ID": 3, "logic": "OR"}));
        assert!(!filter_mentions_field(&unrelated, &["ID"]));
    }

    #[test]
    fn detects_owner_fields() {
        let filter = object(json!({"=ownerType": "D"}));
        assert!(filter_mentions_field(&filter, &["ownerType", "ownerId"]));
    }

    #[test]
    fn order_conflict_is_case_insensitive() {
        let order = parse_order(&object(json!({"id": "ASC", "TITLE": "DESC"})));
        assert!(order_mentions_field(&order, "ID"));
        assert!(!order_mentions_field(&order, "STAGE_ID"));
    }
}
