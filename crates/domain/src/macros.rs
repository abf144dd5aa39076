//! Macro for implementing Display and FromStr for wire keyword enums
//!
//! Several enums travel over the wire as upper-case keywords (`ASC`,
//! `DESC`, field shape tags). The macro keeps their textual form in one
//! place and parses case-insensitively, trimming surrounding whitespace.
//!
//! # Example
//!
//! ```rust
//! use b24rest_domain::impl_wire_keyword_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Halt {
//!     Continue,
//!     Stop,
//! }
//!
//! impl_wire_keyword_conversions!(Halt {
//!     Continue => "CONTINUE",
//!     Stop => "STOP",
//! });
//!
//! assert_eq!(" stop ".parse::<Halt>().unwrap(), Halt::Stop);
//! ```

/// Implements Display and FromStr traits for wire keyword enums
///
/// This macro generates:
/// - Display trait: writes the upper-case keyword
/// - FromStr trait: parses case-insensitive, whitespace-trimmed keywords
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their upper-case
///   keyword
#[macro_export]
macro_rules! impl_wire_keyword_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestKeyword {
        Asc,
        Desc,
    }

    impl_wire_keyword_conversions!(TestKeyword {
        Asc => "ASC",
        Desc => "DESC",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(TestKeyword::Asc.to_string(), "ASC");
        assert_eq!(TestKeyword::Desc.to_string(), "DESC");
    }

    #[test]
    fn test_fromstr_mixed_case_and_whitespace() {
        assert_eq!(TestKeyword::from_str("asc").unwrap(), TestKeyword::Asc);
        assert_eq!(TestKeyword::from_str(" Desc ").unwrap(), TestKeyword::Desc);
        assert_eq!(TestKeyword::from_str("DESC").unwrap(), TestKeyword::Desc);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = TestKeyword::from_str("sideways");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid TestKeyword"));
    }
}
