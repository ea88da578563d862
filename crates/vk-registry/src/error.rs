// crates/vk-registry/src/error.rs

use alloc::fmt;
use alloc::string::String;
use core::num::ParseIntError;
use quick_xml::errors::serialize::DeError;

/// Errors that can occur while parsing the registry into the type model.
///
/// Every variant is fatal: the parser never falls back to a default when the
/// document violates one of the dialect's structural preconditions.
#[derive(Debug)]
pub enum RegistryError {
    /// An error from the underlying `quick-xml` deserializer.
    XmlParsing(DeError),

    /// A required child element was missing (e.g. `<name>` inside a handle).
    MissingElement {
        element: &'static str,
        context: String,
    },

    /// A required attribute was missing (e.g. `@name` on an `<enums>` block).
    MissingAttribute {
        attribute: &'static str,
        context: String,
    },

    /// An attribute had a value that could not be interpreted.
    InvalidAttributeFormat {
        attribute: &'static str,
        value: String,
    },

    /// A `<type>` element declared a `category` the parser does not know.
    UnknownCategory { name: String, category: String },

    /// An `<enums>` block declared a `type` other than `enum` or `bitmask`.
    UnknownEnumsType { name: String, kind: String },

    /// An `<enums>` block declared a `bitwidth` other than 32 or 64.
    UnsupportedBitWidth { name: String, bitwidth: String },

    /// An element was present but its content violated the dialect.
    InvalidElement { element: String, reason: &'static str },

    /// The same name was declared twice within one category mapping.
    DuplicateName { category: &'static str, name: String },

    /// An alias pointed at another alias instead of a canonical entity.
    AliasChain { alias: String, target: String },

    /// A type, enum or command was referenced but never declared.
    UnresolvedReference { name: String, referenced_by: String },

    /// Two declarations gave the same enum field different values.
    ConflictingEnumValue {
        enum_name: String,
        field: String,
        existing: i64,
        new: i64,
    },

    /// A field alias reused the name of a primary field of the same enum.
    EnumAliasCollision { enum_name: String, name: String },
}

impl From<DeError> for RegistryError {
    fn from(e: DeError) -> Self {
        RegistryError::XmlParsing(e)
    }
}

/// Converts `ParseIntError` (typically from numeric attributes) into a user-friendly error.
impl From<ParseIntError> for RegistryError {
    fn from(e: ParseIntError) -> Self {
        RegistryError::InvalidAttributeFormat {
            attribute: "numeric attribute",
            value: alloc::format!("{}", e),
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::XmlParsing(e) => write!(f, "XML parsing error: {}", e),
            RegistryError::MissingElement { element, context } => {
                write!(f, "Missing required XML element <{}> in {}", element, context)
            }
            RegistryError::MissingAttribute { attribute, context } => {
                write!(f, "Missing required attribute @{} in {}", attribute, context)
            }
            RegistryError::InvalidAttributeFormat { attribute, value } => {
                write!(f, "Invalid format for attribute @{}: {:?}", attribute, value)
            }
            RegistryError::UnknownCategory { name, category } => {
                write!(f, "Unknown type category {:?} on type {}", category, name)
            }
            RegistryError::UnknownEnumsType { name, kind } => {
                write!(f, "Unknown enums type {:?} on enums {}", kind, name)
            }
            RegistryError::UnsupportedBitWidth { name, bitwidth } => {
                write!(f, "Unsupported bitwidth {:?} on enums {}", bitwidth, name)
            }
            RegistryError::InvalidElement { element, reason } => {
                write!(f, "Invalid element {}: {}", element, reason)
            }
            RegistryError::DuplicateName { category, name } => {
                write!(f, "Duplicate {} name: {}", category, name)
            }
            RegistryError::AliasChain { alias, target } => write!(
                f,
                "Alias {} points at {}, which is itself an alias",
                alias, target
            ),
            RegistryError::UnresolvedReference {
                name,
                referenced_by,
            } => write!(
                f,
                "Unresolved reference to {} from {}",
                name, referenced_by
            ),
            RegistryError::ConflictingEnumValue {
                enum_name,
                field,
                existing,
                new,
            } => write!(
                f,
                "Enum field {}::{} declared with value {} and {}",
                enum_name, field, existing, new
            ),
            RegistryError::EnumAliasCollision { enum_name, name } => write!(
                f,
                "Enum {} declares {} both as a field and as an alias",
                enum_name, name
            ),
        }
    }
}

impl core::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            RegistryError::XmlParsing(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RegistryError;
    use alloc::string::ToString;

    #[test]
    fn test_from_de_error() {
        // Mismatched end tag inside the registry document.
        let xml_err = quick_xml::de::from_str::<crate::model::RegistryXml>(
            "<registry><types><type></registry>",
        )
        .unwrap_err();
        let err: RegistryError = xml_err.into();
        assert!(matches!(err, RegistryError::XmlParsing(_)));
    }

    #[test]
    fn test_from_parse_int_error() {
        let parse_err = "not a number".parse::<u32>().unwrap_err();
        let err: RegistryError = parse_err.into();
        assert!(matches!(
            err,
            RegistryError::InvalidAttributeFormat {
                attribute: "numeric attribute",
                ..
            }
        ));
    }

    #[test]
    fn test_display_names_offending_entity() {
        let err = RegistryError::AliasChain {
            alias: "VkFooKHR".to_string(),
            target: "VkFooEXT".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Alias VkFooKHR points at VkFooEXT, which is itself an alias"
        );

        let err = RegistryError::UnsupportedBitWidth {
            name: "VkAccessFlagBits2".to_string(),
            bitwidth: "16".to_string(),
        };
        assert!(err.to_string().contains("VkAccessFlagBits2"));
    }
}
