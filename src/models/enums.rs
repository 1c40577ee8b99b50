use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a string-backed enum receives a value outside its vocabulary.
/// Only surfaces at deserialization seams, never inside the parsing pipeline.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AbnormalDirection {
    None => "none",
    Below => "below",
    Above => "above",
});

str_enum!(Trend {
    Stable => "stable",
    Increased => "increased",
    Decreased => "decreased",
    Improved => "improved",
    Worsened => "worsened",
    Indeterminate => "indeterminate",
});
