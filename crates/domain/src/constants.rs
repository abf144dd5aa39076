//! Client constants
//!
//! Centralized location for limits, prefixes and well-known keys shared by
//! the request builders, the cursor and the batch multiplexer.

// Limits imposed by the remote API
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

// Transport defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1;

// Disables server-side offset counting on list methods
pub const START_WITHOUT_COUNT: i64 = -1;

// Field name namespaces
pub const WILDCARD_ALL: &str = "*";
pub const WILDCARD_USER_FIELDS: &str = "UF_*";
pub const USER_FIELD_PREFIX: &str = "UF_";
pub const CRM_USER_FIELD_PREFIX: &str = "UF_CRM_";
pub const DYNAMIC_REQUEST_PREFIX: &str = "ufCrm";
pub const DYNAMIC_RESPONSE_PREFIX: &str = "ufCrm_";

/// Characters that may prefix a filter key as a comparison operator.
pub const FILTER_OPERATOR_CHARS: &[char] = &['!', '<', '>', '=', '@', '%', '~'];

/// Structural key of nested filter groups.
pub const FILTER_LOGIC_KEY: &str = "logic";

/// Keys probed, in order, when a list payload is wrapped in an object.
pub const DEFAULT_LIST_KEYS: &[&str] = &[
    "items",
    "list",
    "tasks",
    "categories",
    "task_templates",
    "checklist",
    "checkList",
    "checklistItems",
    "elapsedItems",
    "comments",
    "productRows",
];

/// Strings accepted as a truthy acknowledgement.
pub const TRUTHY_STRINGS: &[&str] = &["1", "true", "y", "yes"];
