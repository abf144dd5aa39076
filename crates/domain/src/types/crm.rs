//! CRM entity type identifiers
//!
//! System types carry fixed ids and abbreviations. Smart-process types are
//! allocated dynamically: active ids live in `128..=191` or are even and at
//! least `1030`; their abbreviation is `T` followed by the lowercase hex id.

use serde::{Deserialize, Serialize};

use crate::{RestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemEntityType {
    Lead,
    Deal,
    Contact,
    Company,
    /// Legacy invoice.
    Invoice,
    Quote,
    Requisite,
    Order,
    SmartInvoice,
}

impl SystemEntityType {
    pub const ALL: [Self; 9] = [
        Self::Lead,
        Self::Deal,
        Self::Contact,
        Self::Company,
        Self::Invoice,
        Self::Quote,
        Self::Requisite,
        Self::Order,
        Self::SmartInvoice,
    ];

    pub const fn id(self) -> i64 {
        match self {
            Self::Lead => 1,
            Self::Deal => 2,
            Self::Contact => 3,
            Self::Company => 4,
            Self::Invoice => 5,
            Self::Quote => 7,
            Self::Requisite => 8,
            Self::Order => 14,
            Self::SmartInvoice => 31,
        }
    }

    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Lead => "L",
            Self::Deal => "D",
            Self::Contact => "C",
            Self::Company => "CO",
            Self::Invoice => "I",
            Self::Quote => "Q",
            Self::Requisite => "RQ",
            Self::Order => "O",
            Self::SmartInvoice => "SI",
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

pub const DYNAMIC_ACTIVE_MIN: i64 = 128;
pub const DYNAMIC_ACTIVE_MAX: i64 = 191;
pub const DYNAMIC_EXTENDED_MIN: i64 = 1030;

/// Whether `entity_type_id` denotes an active smart-process type.
pub const fn is_dynamic_entity_type(entity_type_id: i64) -> bool {
    (entity_type_id >= DYNAMIC_ACTIVE_MIN && entity_type_id <= DYNAMIC_ACTIVE_MAX)
        || (entity_type_id >= DYNAMIC_EXTENDED_MIN && entity_type_id % 2 == 0)
}

/// Short symbolic code (`entityTypeAbbr`) of an entity type.
///
/// # Errors
/// Returns `RestError::InvalidInput` for ids that are neither system nor
/// active dynamic types.
pub fn entity_type_abbreviation(entity_type_id: i64) -> Result<String> {
    if let Some(kind) = SystemEntityType::from_id(entity_type_id) {
        return Ok(kind.abbreviation().to_string());
    }

    if is_dynamic_entity_type(entity_type_id) {
        return Ok(format!("T{entity_type_id:x}"));
    }

    Err(RestError::InvalidInput(format!("unknown entityTypeId: {entity_type_id}")))
}
