//! Derive macro for huginn's action formatter.
//!
//! `#[derive(DebugCase)]` describes a type's structure to
//! `huginn_middleware::debug_case`, so actions render as `.case(payload)`
//! in trace messages without hand-written impls.
//!
//! # Example
//!
//! ```ignore
//! use huginn_middleware::{DebugCase, debug_case};
//!
//! #[derive(DebugCase)]
//! enum AuthAction {
//!     #[debug_case(rename = "login")]
//!     Login { user: String },
//!     LoggedOut,
//! }
//!
//! assert_eq!(
//!     debug_case(&AuthAction::Login { user: "ada".into() }),
//!     ".login(user: ada)"
//! );
//! assert_eq!(debug_case(&AuthAction::LoggedOut), ".LoggedOut");
//! ```
//!
//! # Attributes
//!
//! - container `#[debug_case(display)]`: render the whole value with `Display`
//! - variant `#[debug_case(rename = "name")]`: label the case `name`
//! - field `#[debug_case(skip)]`: leave the field out
//! - field `#[debug_case(display)]` / `#[debug_case(debug)]`: render the
//!   field with `Display` / `Debug` instead of `DebugCase`

use proc_macro::TokenStream;

mod attrs;
mod expand;

/// Derive `huginn_middleware::DebugCase`.
#[proc_macro_derive(DebugCase, attributes(debug_case))]
pub fn derive_debug_case(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    match expand::expand(input) {
        Ok(output) => output.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
