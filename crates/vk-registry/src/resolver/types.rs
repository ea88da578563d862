// crates/vk-registry/src/resolver/types.rs

//! Resolves the `<types>` section: category dispatch plus the per-category
//! extraction of handles, structs, unions, bitmasks, function pointers,
//! defines, base types and external C types.

use super::utils::{
    all_text, first_is_true, fragments_of, insert_unique, is_true, list, parse_u32, required,
    supports_vulkan, Declaration,
};
use crate::error::RegistryError;
use crate::lexical::{self, Token};
use crate::model::commands::{ParamXml, ProtoXml};
use crate::model::types::MemberXml;
use crate::model::{Fragment, TypeContent, TypeXml, TypesXml};
use crate::types::{
    Alias, BaseType, Bitmask, Define, ExternalType, FunctionArgument, FunctionPointer, Handle,
    Include, Registry, Struct, StructMember, Union, VulkanType,
};
use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use log::trace;

/// Resolves every `<type>` into `registry.types` / `registry.includes`.
///
/// Returns the names declared with `category="enum"`; their fields arrive
/// later from the `<enums>` blocks.
pub(super) fn resolve_types(
    xml: &TypesXml,
    registry: &mut Registry,
) -> Result<BTreeSet<String>, RegistryError> {
    let mut declared_enums = BTreeSet::new();

    for ty in &xml.types {
        if !supports_vulkan(ty.api.as_deref()) {
            trace!(
                "[resolver] Skipping type {:?} for api {:?}",
                ty.name,
                ty.api
            );
            continue;
        }

        let resolved = match ty.category.as_deref() {
            None => resolve_external(ty)?,
            Some("include") => {
                let include = resolve_include(ty)?;
                insert_unique(
                    &mut registry.includes,
                    "include",
                    include.name.clone(),
                    include,
                )?;
                continue;
            }
            Some("define") => VulkanType::Define(resolve_define(ty)?),
            Some("basetype") => VulkanType::BaseType(resolve_basetype(ty)?),
            Some("bitmask") => match alias_of(ty)? {
                Some(alias) => VulkanType::BitmaskAlias(alias),
                None => VulkanType::Bitmask(resolve_bitmask(ty)?),
            },
            Some("enum") => match alias_of(ty)? {
                Some(alias) => VulkanType::EnumAlias(alias),
                None => {
                    declared_enums.insert(required(&ty.name, "name", "enum type")?.to_string());
                    continue;
                }
            },
            Some("handle") => match alias_of(ty)? {
                Some(alias) => VulkanType::HandleAlias(alias),
                None => VulkanType::Handle(resolve_handle(ty)?),
            },
            Some("struct") => match alias_of(ty)? {
                Some(alias) => VulkanType::StructAlias(alias),
                None => VulkanType::Struct(resolve_struct(ty)?),
            },
            Some("union") => VulkanType::Union(resolve_union(ty)?),
            Some("funcpointer") => VulkanType::FunctionPointer(resolve_funcpointer(ty)?),
            Some(other) => {
                return Err(RegistryError::UnknownCategory {
                    name: ty.name.clone().unwrap_or_default(),
                    category: other.to_string(),
                });
            }
        };

        insert_unique(
            &mut registry.types,
            "type",
            resolved.name().to_string(),
            resolved,
        )?;
    }

    Ok(declared_enums)
}

/// Alias elements never carry structure, so parsing stops at the attributes.
fn alias_of(ty: &TypeXml) -> Result<Option<Alias>, RegistryError> {
    match &ty.alias {
        Some(target) => Ok(Some(Alias {
            name: required(&ty.name, "name", "alias type")?.to_string(),
            target: target.clone(),
        })),
        None => Ok(None),
    }
}

/// The `<name>` tag text, or the `@name` attribute when the tag is absent.
fn name_of(ty: &TypeXml, fragments: &[Fragment], context: &str) -> Result<String, RegistryError> {
    fragments
        .iter()
        .find_map(|f| match f {
            Fragment::Name(n) => Some(n.trim().to_string()),
            _ => None,
        })
        .or_else(|| ty.name.clone())
        .ok_or_else(|| RegistryError::MissingElement {
            element: "name",
            context: context.to_string(),
        })
}

// --- Simple categories ---

/// `<type requires="vk_platform" name="uint32_t"/>` or `<type name="int"/>`.
fn resolve_external(ty: &TypeXml) -> Result<VulkanType, RegistryError> {
    let name = required(&ty.name, "name", "external type")?.to_string();
    let header = ty.requires.clone();
    let c_type = header.as_deref().is_none_or(|h| h == "vk_platform");
    Ok(VulkanType::External(ExternalType {
        name,
        header,
        c_type,
    }))
}

/// `<type category="include" name="vk_platform">#include "vk_platform.h"</type>`
fn resolve_include(ty: &TypeXml) -> Result<Include, RegistryError> {
    let fragments = fragments_of(&ty.content);
    let name = name_of(ty, &fragments, "include")?;
    let directive = all_text(&fragments).trim().to_string();
    Ok(Include {
        name,
        directive: (!directive.is_empty()).then_some(directive),
    })
}

/// Parses a `category="define"` type.
///
/// With a `@name` attribute the whole text is the definition (preprocessor
/// logic). Otherwise the value is everything after `<name>`; a value opening
/// with `(` makes the define a function-like macro.
fn resolve_define(ty: &TypeXml) -> Result<Define, RegistryError> {
    let fragments = fragments_of(&ty.content);

    if let Some(name) = &ty.name {
        return Ok(Define {
            name: name.clone(),
            signature: None,
            value: all_text(&fragments).trim().to_string(),
            extension: false,
        });
    }

    let name_pos = fragments
        .iter()
        .position(|f| matches!(f, Fragment::Name(_)))
        .ok_or_else(|| RegistryError::MissingElement {
            element: "name",
            context: "define".to_string(),
        })?;
    let name = match &fragments[name_pos] {
        Fragment::Name(n) => n.trim().to_string(),
        _ => String::new(),
    };
    let mut value = all_text(&fragments[name_pos + 1..]);

    let mut signature = None;
    if value.starts_with('(') {
        if let Some(close) = value.find(')') {
            signature = Some(alloc::format!("{}{}", name, &value[..=close]));
            value = value[close + 1..].to_string();
        }
    }
    if let Some(comment) = value.find("//") {
        value.truncate(comment);
    }

    Ok(Define {
        name,
        signature,
        value: value.trim().to_string(),
        extension: false,
    })
}

/// `typedef <type>uint32_t</type> <name>VkSampleMask</name>;` or the forward
/// declaration `struct <name>ANativeWindow</name>;`.
fn resolve_basetype(ty: &TypeXml) -> Result<BaseType, RegistryError> {
    let fragments = fragments_of(&ty.content);
    let decl = Declaration::from_fragments(&fragments);
    let name = decl.name.clone().ok_or_else(|| RegistryError::MissingElement {
        element: "name",
        context: "basetype".to_string(),
    })?;
    // The prefix holds `typedef`, not part of the aliased type.
    let base = decl
        .base
        .as_deref()
        .map(|b| lexical::assemble_type("", b, &decl.tail));
    Ok(BaseType { name, base })
}

/// `<type requires="VkFramebufferCreateFlagBits" category="bitmask">typedef
/// <type>VkFlags</type> <name>VkFramebufferCreateFlags</name>;</type>`
fn resolve_bitmask(ty: &TypeXml) -> Result<Bitmask, RegistryError> {
    let fragments = fragments_of(&ty.content);
    let decl = Declaration::from_fragments(&fragments);
    let name = decl.name.ok_or_else(|| RegistryError::MissingElement {
        element: "name",
        context: "bitmask".to_string(),
    })?;
    let base_type = decl.base.ok_or_else(|| RegistryError::MissingElement {
        element: "type",
        context: name.clone(),
    })?;
    Ok(Bitmask {
        name,
        base_type,
        field_enum: ty.requires.clone().or_else(|| ty.bitvalues.clone()),
    })
}

/// `<type category="handle" parent="VkDevice" objtypeenum="VK_OBJECT_TYPE_QUEUE">
/// <type>VK_DEFINE_HANDLE</type>(<name>VkQueue</name>)</type>`
fn resolve_handle(ty: &TypeXml) -> Result<Handle, RegistryError> {
    let fragments = fragments_of(&ty.content);
    let decl = Declaration::from_fragments(&fragments);
    let name = decl.name.ok_or_else(|| RegistryError::MissingElement {
        element: "name",
        context: "handle".to_string(),
    })?;
    let dispatchable = match decl.base.as_deref() {
        Some("VK_DEFINE_HANDLE") => true,
        Some("VK_DEFINE_NON_DISPATCHABLE_HANDLE") => false,
        Some(_) => {
            return Err(RegistryError::InvalidElement {
                element: name,
                reason: "unknown handle definer",
            });
        }
        None => {
            return Err(RegistryError::MissingElement {
                element: "type",
                context: name,
            });
        }
    };
    Ok(Handle {
        name,
        dispatchable,
        parent: ty.parent.clone(),
        object_type: ty.objtypeenum.clone(),
    })
}

// --- Structs and Unions ---

fn resolve_members(ty: &TypeXml, owner: &str) -> Result<Vec<StructMember>, RegistryError> {
    ty.content
        .iter()
        .filter_map(|c| match c {
            TypeContent::Member(m) if supports_vulkan(m.api.as_deref()) => Some(m),
            _ => None,
        })
        .map(|m| resolve_member(m, owner))
        .collect()
}

/// Reassembles a `<member>` such as
/// `<member optional="true">const <type>void</type>* <name>pNext</name></member>`.
fn resolve_member(member: &MemberXml, owner: &str) -> Result<StructMember, RegistryError> {
    let decl = Declaration::from_fragments(&member.content);
    let name = decl.name.clone().ok_or_else(|| RegistryError::MissingElement {
        element: "name",
        context: owner.to_string(),
    })?;
    let type_name = decl
        .type_string()
        .ok_or_else(|| RegistryError::MissingElement {
            element: "type",
            context: alloc::format!("{}::{}", owner, name),
        })?;

    let suffix = decl.suffix.trim();
    let (array_sizes, bitfield_width) = match suffix.strip_prefix(':') {
        Some(width) => (Vec::new(), Some(parse_u32("bitfield width", width)?)),
        None => (lexical::parse_array_sizes(suffix)?, None),
    };

    let len_entries = list(&member.len);
    let null_terminated = len_entries.iter().any(|l| l == "null-terminated");
    let len = len_entries.into_iter().find(|l| l != "null-terminated");

    Ok(StructMember {
        type_name,
        name,
        array_sizes,
        expected_value: member.values.clone(),
        len,
        null_terminated,
        no_auto_validity: is_true(&member.noautovalidity),
        optional: first_is_true(&member.optional),
        bitfield_width,
        selection: member.selection.clone(),
    })
}

fn resolve_struct(ty: &TypeXml) -> Result<Struct, RegistryError> {
    let name = required(&ty.name, "name", "struct")?.to_string();
    let members = resolve_members(ty, &name)?;
    Ok(Struct {
        members,
        extends: list(&ty.structextends),
        returned_only: is_true(&ty.returnedonly),
        name,
    })
}

fn resolve_union(ty: &TypeXml) -> Result<Union, RegistryError> {
    let name = required(&ty.name, "name", "union")?.to_string();
    let members = resolve_members(ty, &name)?;
    Ok(Union {
        members,
        returned_only: is_true(&ty.returnedonly),
        name,
    })
}

// --- Function Pointers ---

/// Parses a `category="funcpointer"` type in either of its two spellings.
///
/// Legacy form, where argument names sit in `<type>` tails:
/// ```xml
/// <type category="funcpointer">typedef void (VKAPI_PTR *<name>PFN_vkFree</name>)(
///     <type>void</type>* pUserData,
///     <type>void</type>* pMemory);</type>
/// ```
/// Tagged form: `<proto><type>void</type> <name>PFN_vkFree</name></proto><param>...</param>`.
fn resolve_funcpointer(ty: &TypeXml) -> Result<FunctionPointer, RegistryError> {
    let proto = ty.content.iter().find_map(|c| match c {
        TypeContent::Proto(p) => Some(p),
        _ => None,
    });
    match proto {
        Some(proto) => {
            let params = ty.content.iter().filter_map(|c| match c {
                TypeContent::Param(p) if supports_vulkan(p.api.as_deref()) => Some(p),
                _ => None,
            });
            resolve_tagged_funcpointer(proto, params)
        }
        None => resolve_legacy_funcpointer(&fragments_of(&ty.content)),
    }
}

fn resolve_tagged_funcpointer<'a>(
    proto: &ProtoXml,
    params: impl Iterator<Item = &'a ParamXml>,
) -> Result<FunctionPointer, RegistryError> {
    let decl = Declaration::from_fragments(&proto.content);
    let name = decl.name.clone().ok_or_else(|| RegistryError::MissingElement {
        element: "name",
        context: "funcpointer proto".to_string(),
    })?;
    // `<type>void</type>* (VKAPI_PTR *<name>` -> `void*`
    let return_type = decl
        .base
        .as_deref()
        .map(|base| {
            let prefix = decl.prefix.replace("typedef", " ");
            let tail = decl.tail.split('(').next().unwrap_or_default();
            lexical::assemble_type(&prefix, base, tail)
        })
        .ok_or_else(|| RegistryError::MissingElement {
            element: "type",
            context: name.clone(),
        })?;

    let mut arguments = Vec::new();
    for param in params {
        let decl = Declaration::from_fragments(&param.content);
        let arg_name = decl.name.clone().ok_or_else(|| RegistryError::MissingElement {
            element: "name",
            context: name.clone(),
        })?;
        let type_name = decl
            .type_string()
            .ok_or_else(|| RegistryError::MissingElement {
                element: "type",
                context: alloc::format!("{}({})", name, arg_name),
            })?;
        check_argument(&name, &lexical::tokenize(&type_name))?;
        arguments.push(FunctionArgument {
            type_name,
            name: arg_name,
        });
    }

    Ok(FunctionPointer {
        name,
        return_type,
        arguments,
    })
}

/// A token of the legacy argument list: plain declaration text or a `<type>` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgToken<'a> {
    Lex(Token<'a>),
    Type(&'a str),
}

fn resolve_legacy_funcpointer(fragments: &[Fragment]) -> Result<FunctionPointer, RegistryError> {
    let name_pos = fragments
        .iter()
        .position(|f| matches!(f, Fragment::Name(_)))
        .ok_or_else(|| RegistryError::MissingElement {
            element: "name",
            context: "funcpointer".to_string(),
        })?;
    let name = match &fragments[name_pos] {
        Fragment::Name(n) => n.trim().to_string(),
        _ => String::new(),
    };

    // `typedef VkBool32 (VKAPI_PTR *` -> `VkBool32`
    let head: Vec<&str> = fragments[..name_pos]
        .iter()
        .filter_map(|f| match f {
            Fragment::Text(t) | Fragment::Type(t) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    let head = head.join(" ");
    let head = head.split('(').next().unwrap_or_default();
    let return_type = lexical::canonical_type(&head.replace("typedef", " "));
    if return_type.is_empty() {
        return Err(RegistryError::MissingElement {
            element: "type",
            context: name,
        });
    }

    let mut tokens: Vec<ArgToken<'_>> = Vec::new();
    for fragment in &fragments[name_pos + 1..] {
        match fragment {
            Fragment::Type(t) => tokens.push(ArgToken::Type(t.trim())),
            Fragment::Text(t) => tokens.extend(lexical::tokenize(t).into_iter().map(ArgToken::Lex)),
            _ => {}
        }
    }

    // Skip the `)(` between the name and the argument list.
    let start = tokens
        .iter()
        .position(|t| !matches!(t, ArgToken::Lex(Token::Punct('(' | ')'))))
        .unwrap_or(tokens.len());

    let mut arguments = Vec::new();
    for group in tokens[start..].split(|t| {
        matches!(t, ArgToken::Lex(Token::Punct(',' | ')')))
    }) {
        if let Some(argument) = legacy_argument(&name, group)? {
            arguments.push(argument);
        }
    }

    Ok(FunctionPointer {
        name,
        return_type,
        arguments,
    })
}

/// Builds one argument from its tokens, e.g. `const <type>char</type> * pLayerPrefix`.
/// A `*` written on the name moves to the type.
fn legacy_argument(
    function: &str,
    group: &[ArgToken<'_>],
) -> Result<Option<FunctionArgument>, RegistryError> {
    let group: Vec<ArgToken<'_>> = group
        .iter()
        .copied()
        .filter(|t| !matches!(t, ArgToken::Lex(Token::Punct(';'))))
        .collect();

    let Some(type_pos) = group.iter().position(|t| matches!(t, ArgToken::Type(_))) else {
        // `(void)` and the trailing `;` declare no argument.
        return match group.as_slice() {
            [] | [ArgToken::Lex(Token::Ident("void"))] => Ok(None),
            _ => Err(RegistryError::MissingElement {
                element: "type",
                context: function.to_string(),
            }),
        };
    };
    let ArgToken::Type(base) = group[type_pos] else {
        return Ok(None);
    };

    let lex: Vec<Token<'_>> = group
        .iter()
        .filter_map(|t| match t {
            ArgToken::Lex(l) => Some(*l),
            ArgToken::Type(_) => None,
        })
        .collect();
    check_argument(function, &lex)?;

    let arg_name = group[type_pos + 1..]
        .iter()
        .rev()
        .find_map(|t| match t {
            ArgToken::Lex(Token::Ident(w)) if *w != "const" => Some(*w),
            _ => None,
        })
        .ok_or_else(|| RegistryError::MissingElement {
            element: "name",
            context: function.to_string(),
        })?;

    let is_const = lex.contains(&Token::Ident("const"));
    let is_pointer = lex.contains(&Token::Star);
    let type_name = lexical::canonical_type(&alloc::format!(
        "{} {} {}",
        if is_const { "const" } else { "" },
        base,
        if is_pointer { "*" } else { "" }
    ));

    Ok(Some(FunctionArgument {
        type_name,
        name: arg_name.to_string(),
    }))
}

/// The dialect guarantees at most one `const` and one pointer level per
/// function pointer argument, and never a `const` pointer.
fn check_argument(function: &str, tokens: &[Token<'_>]) -> Result<(), RegistryError> {
    let consts = tokens
        .iter()
        .filter(|t| **t == Token::Ident("const"))
        .count();
    let stars = tokens.iter().filter(|t| **t == Token::Star).count();

    let reason = if consts > 1 {
        Some("more than one const on a function pointer argument")
    } else if stars > 1 {
        Some("more than one pointer level on a function pointer argument")
    } else if tokens
        .iter()
        .skip_while(|t| **t != Token::Star)
        .any(|t| *t == Token::Ident("const"))
    {
        Some("const pointer function pointer arguments are not supported")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(RegistryError::InvalidElement {
            element: function.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
