// crates/vk-registry/src/lexical.rs

//! Stateless text helpers for the C-like type syntax scattered across the
//! registry's element text, tag text and tail text.
//!
//! Every type string stored in the model passes through [`canonical_type`],
//! so later stages can tokenize it with [`type_atoms`] without caring about
//! the whitespace the XML happened to carry.

use crate::error::RegistryError;
use crate::types::ArraySize;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

// --- Tokenizer ---

/// A single lexical unit of C-like declaration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// An identifier or keyword (`const`, `uint32_t`, `pNext`, `VK_UUID_SIZE`, `24`).
    Ident(&'a str),
    /// One pointer level.
    Star,
    /// Any other non-whitespace character (`,`, `(`, `)`, `;`, `[`, `]`, `:`).
    Punct(char),
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits `raw` into identifiers, pointer stars and punctuation. Whitespace and
/// line separators never produce tokens.
pub fn tokenize(raw: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in raw.char_indices() {
        if is_ident_char(c) {
            if start.is_none() {
                start = Some(i);
            }
            continue;
        }
        if let Some(s) = start.take() {
            tokens.push(Token::Ident(&raw[s..i]));
        }
        if c == '*' {
            tokens.push(Token::Star);
        } else if !c.is_whitespace() {
            tokens.push(Token::Punct(c));
        }
    }
    if let Some(s) = start {
        tokens.push(Token::Ident(&raw[s..]));
    }
    tokens
}

// --- Type strings ---

/// Renders identifier and star tokens in the canonical `word word*` form:
/// words separated by one space, each `*` glued to the token before it.
fn render_type<'a>(tokens: impl IntoIterator<Item = Token<'a>>) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Ident(word) => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(word);
            }
            Token::Star => out.push('*'),
            Token::Punct(_) => {}
        }
    }
    out
}

/// The single canonicalization routine for type strings.
///
/// Strips line separators, whitespace runs and stray `,` `(` `)` `;`
/// fragments, e.g. `"const char *  const*"` becomes `"const char* const*"`.
pub fn canonical_type(raw: &str) -> String {
    render_type(tokenize(raw))
}

/// Reassembles a declaration split as element text, `<type>` text and the
/// `<type>` tail, in that order.
pub fn assemble_type(text: &str, base: &str, tail: &str) -> String {
    canonical_type(&format!("{} {} {}", text, base, tail))
}

/// Tokenizes a canonical type into identifiers and one `*` atom per pointer level.
///
/// `"const char* const*"` yields `["const", "char", "*", "const", "*"]`.
pub fn type_atoms(ty: &str) -> Vec<&str> {
    tokenize(ty)
        .into_iter()
        .filter_map(|t| match t {
            Token::Ident(word) => Some(word),
            Token::Star => Some("*"),
            Token::Punct(_) => None,
        })
        .collect()
}

/// Drops `const`, `struct` and pointer stars, leaving the referenced type name.
pub fn plain_typename(ty: &str) -> String {
    let words: Vec<&str> = tokenize(ty)
        .into_iter()
        .filter_map(|t| match t {
            Token::Ident(w) if w != "const" && w != "struct" => Some(w),
            _ => None,
        })
        .collect();
    words.join(" ")
}

/// Parses the static array suffix of a member name: `[3]`, `[3][4]` or
/// `[VK_UUID_SIZE]`. Returns an empty list when there is no suffix.
pub fn parse_array_sizes(fragment: &str) -> Result<Vec<ArraySize>, RegistryError> {
    let mut sizes = Vec::new();
    let mut rest = fragment.trim();

    while let Some(open) = rest.strip_prefix('[') {
        let close = open
            .find(']')
            .ok_or_else(|| RegistryError::InvalidAttributeFormat {
                attribute: "array size",
                value: fragment.to_string(),
            })?;
        let inner = open[..close].trim();
        if inner.is_empty() || !inner.chars().all(is_ident_char) {
            return Err(RegistryError::InvalidAttributeFormat {
                attribute: "array size",
                value: fragment.to_string(),
            });
        }
        sizes.push(match inner.parse::<u32>() {
            Ok(n) => ArraySize::Literal(n),
            Err(_) => ArraySize::Constant(inner.to_string()),
        });
        rest = open[close + 1..].trim_start();
    }
    Ok(sizes)
}

/// Splits a comma separated attribute list, dropping empty entries.
pub fn split_list(attr: &str) -> Vec<&str> {
    attr.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

// --- Enum value decoding ---

/// A decoded enum field value plus the literal form to emit for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub value: i64,
    pub representation: String,
}

/// Decodes a `value="..."` literal: decimal, negative decimal or `0x` hex,
/// with optional C integer suffixes. The representation keeps the literal as written.
pub fn enum_value_from_literal(literal: &str) -> Result<EnumValue, RegistryError> {
    let invalid = || RegistryError::InvalidAttributeFormat {
        attribute: "value",
        value: literal.to_string(),
    };

    let trimmed = literal
        .trim()
        .trim_end_matches(|c| matches!(c, 'u' | 'U' | 'l' | 'L'));
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(d) => (true, d),
        None => (false, trimmed),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).map_err(|_| invalid())?,
        None => digits.parse::<u64>().map_err(|_| invalid())?,
    };
    // Hex literals above i64::MAX are bit patterns and wrap intentionally.
    let value = if negative {
        i64::try_from(magnitude).map_err(|_| invalid())?.wrapping_neg()
    } else {
        magnitude as i64
    };

    Ok(EnumValue {
        value,
        representation: literal.trim().to_string(),
    })
}

/// Decodes a `bitpos="..."` field. 32-bit enums accept positions 0..=31 and
/// 64-bit enums 0..=63; the representation is `0x%08x`, suffixed with `ULL`
/// for 64-bit enums.
pub fn enum_value_from_bitpos(bitpos: u32, bit64: bool) -> Result<EnumValue, RegistryError> {
    let width = if bit64 { 64 } else { 32 };
    if bitpos >= width {
        return Err(RegistryError::InvalidAttributeFormat {
            attribute: "bitpos",
            value: format!("{} (enum is {}-bit)", bitpos, width),
        });
    }
    let bits: u64 = 1u64 << bitpos;
    let mut representation = format!("0x{:08x}", bits);
    if bit64 {
        representation.push_str("ULL");
    }
    Ok(EnumValue {
        value: bits as i64,
        representation,
    })
}

/// Decodes an extension-assigned value: `1000000000 + (extnumber - 1) * 1000 + offset`,
/// negated when the field declares `dir="-"`.
pub fn enum_value_from_offset(
    extnumber: u32,
    offset: u32,
    negative: bool,
) -> Result<EnumValue, RegistryError> {
    if extnumber == 0 {
        return Err(RegistryError::InvalidAttributeFormat {
            attribute: "extnumber",
            value: "0".to_string(),
        });
    }
    let magnitude = 1_000_000_000i64 + (i64::from(extnumber) - 1) * 1000 + i64::from(offset);
    let value = if negative { -magnitude } else { magnitude };
    Ok(EnumValue {
        value,
        representation: format!("{}", value),
    })
}
