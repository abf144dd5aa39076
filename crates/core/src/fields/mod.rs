//! Field-name normalization between request and response dialects

pub mod codec;
pub mod query;

pub use codec::{split_operator, FieldNameCodec};
pub use query::{
    filter_mentions_field, normalize_fields, normalize_filter, normalize_order, normalize_record,
    normalize_select, order_mentions_field, parse_order, user_field_names_for_select,
};
