//! Response envelope readers

pub mod extractor;
pub mod shape;

pub use extractor::{
    acknowledge, coerce_bool, coerce_int, extract_acknowledgement, extract_boolean, extract_by_path,
    extract_created_id, extract_list, extract_list_response, extract_next, extract_scalar_id,
    extract_total,
};
pub use shape::ResultShape;
