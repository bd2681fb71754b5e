//! Procedural macros for moonbind type registration.
//!
//! `#[derive(LuaTyped)]` implements the `moonbind::typeinfo::LuaTyped`
//! introspection trait for a struct with named fields. It honors the serde
//! attributes the value translator obeys (`rename`, `rename_all`, `skip`,
//! `skip_serializing`), so registered field names always match the wire
//! names, and skipped fields never reach the registry.
//!
//! # Example
//!
//! ```ignore
//! use moonbind::LuaTyped;
//!
//! #[derive(serde::Serialize, serde::Deserialize, LuaTyped)]
//! #[serde(rename_all = "camelCase")]
//! struct Deployment {
//!     display_name: String,
//!     #[serde(skip)]
//!     internal_rev: u64,
//!     replicas: i32,
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Derive the `LuaTyped` introspection trait for a struct.
#[proc_macro_derive(LuaTyped)]
pub fn derive_lua_typed(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_lua_typed_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_lua_typed_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(LuaTyped)] does not support generic types",
        ));
    }

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            ident,
            "#[derive(LuaTyped)] only supports structs with named fields",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            ident,
            "#[derive(LuaTyped)] only supports structs with named fields",
        ));
    };

    let rename_all = container_rename_all(&input.attrs)?;

    let mut field_tokens = Vec::new();
    for field in &fields.named {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let field_ident = field.ident.as_ref().expect("named field");
        let name = attrs
            .rename
            .unwrap_or_else(|| apply_rename(rename_all, &field_ident.to_string()));
        let ty = &field.ty;

        field_tokens.push(quote! {
            ::moonbind::typeinfo::Field {
                name: #name,
                info: <#ty as ::moonbind::typeinfo::LuaTyped>::type_info,
            }
        });
    }

    let name_str = ident.to_string();

    Ok(quote! {
        impl ::moonbind::typeinfo::LuaTyped for #ident {
            fn type_info() -> ::moonbind::typeinfo::TypeInfo {
                ::moonbind::typeinfo::TypeInfo::Record(::moonbind::typeinfo::RecordInfo {
                    id: concat!(module_path!(), "::", #name_str),
                    name: #name_str,
                    module_path: module_path!(),
                    fields: || ::std::vec![#(#field_tokens),*],
                })
            }
        }
    })
}

/// Field-level serde attributes the registry cares about.
#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if !attr.path().is_ident("serde") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    out.rename = Some(value.value());
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    out.skip = true;
                } else {
                    consume_unknown(&meta)?;
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

/// The container-level `rename_all` rule, if any.
fn container_rename_all(attrs: &[syn::Attribute]) -> syn::Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") && meta.input.peek(syn::Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                rule = Some(RenameRule::from_name(&value.value()).ok_or_else(|| {
                    syn::Error::new(value.span(), format!("unknown rename_all rule: {}", value.value()))
                })?);
            } else {
                consume_unknown(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(rule)
}

/// Consume an unrelated serde attribute so nested-meta parsing can continue.
fn consume_unknown(meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: TokenStream2 = content.parse()?;
    }
    Ok(())
}

/// Subset of serde's rename_all rules; field idents are assumed snake_case,
/// as rustc enforces for struct fields.
#[derive(Clone, Copy)]
enum RenameRule {
    Lowercase,
    Uppercase,
    PascalCase,
    CamelCase,
    SnakeCase,
    ScreamingSnakeCase,
    KebabCase,
    ScreamingKebabCase,
}

impl RenameRule {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "lowercase" => Some(Self::Lowercase),
            "UPPERCASE" => Some(Self::Uppercase),
            "PascalCase" => Some(Self::PascalCase),
            "camelCase" => Some(Self::CamelCase),
            "snake_case" => Some(Self::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Some(Self::ScreamingSnakeCase),
            "kebab-case" => Some(Self::KebabCase),
            "SCREAMING-KEBAB-CASE" => Some(Self::ScreamingKebabCase),
            _ => None,
        }
    }
}

fn apply_rename(rule: Option<RenameRule>, snake: &str) -> String {
    let Some(rule) = rule else {
        return snake.to_string();
    };
    match rule {
        RenameRule::Lowercase => snake.replace('_', ""),
        RenameRule::Uppercase => snake.replace('_', "").to_uppercase(),
        RenameRule::PascalCase => capitalize_words(snake, true),
        RenameRule::CamelCase => capitalize_words(snake, false),
        RenameRule::SnakeCase => snake.to_string(),
        RenameRule::ScreamingSnakeCase => snake.to_uppercase(),
        RenameRule::KebabCase => snake.replace('_', "-"),
        RenameRule::ScreamingKebabCase => snake.replace('_', "-").to_uppercase(),
    }
}

fn capitalize_words(snake: &str, capitalize_first: bool) -> String {
    let mut out = String::with_capacity(snake.len());
    for (i, word) in snake.split('_').enumerate() {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) if i > 0 || capitalize_first => {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
            Some(first) => {
                out.push(first);
                out.push_str(chars.as_str());
            }
            None => {}
        }
    }
    out
}
