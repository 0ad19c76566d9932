#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the herald workspace.
//!
//! * [`macro@herald_error`] turns an enum into a context-carrying error type.
//! * [`macro@Event`] implements `herald_bus::Event` for a struct with a cancel flag.
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its own
//! output; `infra/derive/tests` compiles them for real.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining error enums with optional context.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to `Result<T, Self>` and to results of every wrapped source error.
/// * **Conversions**: Implements `From<Source>` for variants with a `source` field
///   (or a field marked `#[source]`/`#[from]`), so `?` works on upstream errors.
/// * **Formatting**: Emits a module-level `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants.
/// 2. A variant wrapping a source error must also carry
///    `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use herald_derive::herald_error;
/// use std::borrow::Cow;
///
/// #[herald_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Corrupted record{}: {message}", format_context(.context))]
///     Corrupted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &str) -> Result<Vec<u8>, StoreError> {
///     std::fs::read(path).context("Reading snapshot")
/// }
/// ```
#[proc_macro_attribute]
pub fn herald_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Derives `herald_bus::Event` for a struct with named fields.
///
/// The cancel flag is the `bool` field named `canceled`, or the field marked
/// with `#[event(canceled)]` when it is named differently.
///
/// # Example
///
/// ```rust,ignore
/// use herald_bus::Event;
///
/// #[derive(Debug, Event)]
/// struct DoorOpened {
///     door: u32,
///     #[event(canceled)]
///     vetoed: bool,
/// }
/// ```
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::event::expand_derive(input).into()
}
