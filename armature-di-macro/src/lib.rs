// Procedural macros for armature-di
// Generates the constructor metadata the injection resolver reads

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod injectable;

/// Derives `Injectable`, describing the struct's fields as constructor
/// parameters.
///
/// Field handling:
///
/// - `Arc<T>` is looked up by the type name of `T`
/// - `Option<Arc<T>>` is looked up the same way and becomes `None` when
///   nothing is registered
/// - any other `T: Clone` is looked up by its type name and cloned out
///
/// Field attributes:
///
/// - `#[inject(name = "id")]` looks the field up by service id instead of type
/// - `#[inject(default = expr)]` is used when nothing is registered
///
/// Struct attributes:
///
/// - `#[injectable(name = "id")]` registers the type under a custom name
/// - `#[injectable(factory)]` marks instances as service factories
/// - `#[injectable(private)]` makes the constructor inaccessible to auto-wiring
/// - `#[injectable(crate = "path")]` overrides the path to the runtime crate
///
/// ```ignore
/// #[derive(Injectable)]
/// struct Mailer {
///     transport: Arc<SmtpTransport>,
///     #[inject(name = "mailer.sender", default = String::from("noreply@example.com"))]
///     sender: Arc<String>,
///     audit: Option<Arc<AuditLog>>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject, injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
