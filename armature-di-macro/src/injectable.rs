use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, LitStr, Path, PathArguments,
    Type,
};

#[derive(Default)]
struct StructOptions {
    name: Option<LitStr>,
    factory: bool,
    private: bool,
    krate: Option<Path>,
}

#[derive(Default)]
struct FieldOptions {
    name: Option<LitStr>,
    default: Option<Expr>,
}

/// How a field's value is taken out of the resolved arguments
enum FieldKind {
    Arc(Type),
    OptionArc(Type),
    Option(Type),
    Plain(Type),
}

impl FieldKind {
    fn of(ty: &Type) -> Self {
        if let Some(inner) = generic_argument(ty, "Arc") {
            return FieldKind::Arc(inner.clone());
        }
        if let Some(inner) = generic_argument(ty, "Option") {
            return match generic_argument(inner, "Arc") {
                Some(arc_inner) => FieldKind::OptionArc(arc_inner.clone()),
                None => FieldKind::Option(inner.clone()),
            };
        }
        FieldKind::Plain(ty.clone())
    }

    fn inner(&self) -> &Type {
        match self {
            FieldKind::Arc(ty)
            | FieldKind::OptionArc(ty)
            | FieldKind::Option(ty)
            | FieldKind::Plain(ty) => ty,
        }
    }

    fn nullable(&self) -> bool {
        matches!(self, FieldKind::OptionArc(_) | FieldKind::Option(_))
    }

    fn extract(&self, index: usize) -> TokenStream {
        match self {
            FieldKind::Arc(ty) => quote! { args.get::<#ty>(#index)? },
            FieldKind::OptionArc(ty) => quote! { args.optional::<#ty>(#index)? },
            FieldKind::Option(ty) => quote! {
                args.optional::<#ty>(#index)?.map(|value| <#ty as ::core::clone::Clone>::clone(&value))
            },
            FieldKind::Plain(ty) => quote! { args.cloned::<#ty>(#index)? },
        }
    }
}

/// The single generic argument of `ty` when its last path segment is `wrapper`
fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first() {
        Some(GenericArgument::Type(inner)) if arguments.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn struct_options(attrs: &[Attribute]) -> syn::Result<StructOptions> {
    let mut options = StructOptions::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("injectable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                options.name = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("factory") {
                options.factory = true;
            } else if meta.path.is_ident("private") {
                options.private = true;
            } else if meta.path.is_ident("crate") {
                let path: LitStr = meta.value()?.parse()?;
                options.krate = Some(path.parse()?);
            } else {
                return Err(meta.error("unsupported injectable option"));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

fn field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("inject")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                options.name = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("default") {
                options.default = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("unsupported inject option"));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Injectable can only be derived for structs",
        ));
    };

    let options = struct_options(&input.attrs)?;
    let krate = options
        .krate
        .clone()
        .unwrap_or_else(|| syn::parse_quote!(::armature_di));

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut parameters = Vec::new();
    let mut values = Vec::new();
    for (index, field) in data.fields.iter().enumerate() {
        let field_opts = field_options(&field.attrs)?;
        let kind = FieldKind::of(&field.ty);
        let inner = kind.inner();

        let param_name = field
            .ident
            .as_ref()
            .map(|i| i.to_string())
            .unwrap_or_else(|| index.to_string());

        let mut parameter = match &field_opts.name {
            Some(name) => quote! { #krate::ParameterDescriptor::named(#name) },
            None => quote! { #krate::ParameterDescriptor::typed::<#inner>(#param_name) },
        };
        if let Some(default) = &field_opts.default {
            parameter = quote! { #parameter.with_default::<#inner>(#default) };
        }
        if kind.nullable() {
            parameter = quote! { #parameter.nullable() };
        }
        parameters.push(parameter);
        values.push((field.ident.clone(), kind.extract(index)));
    }

    let construct_self = match &data.fields {
        Fields::Named(_) => {
            let assignments = values
                .iter()
                .filter_map(|(name, value)| name.as_ref().map(|name| quote! { #name: #value }));
            quote! { Self { #(#assignments),* } }
        }
        Fields::Unnamed(_) => {
            let positional = values.iter().map(|(_, value)| value);
            quote! { Self(#(#positional),*) }
        }
        Fields::Unit => quote! { Self },
    };

    let named = options.name.as_ref().map(|name| quote! { .named(#name) });
    let private = options.private.then(|| quote! { .private() });
    let factory = options.factory.then(|| quote! { .factory() });

    let args = if data.fields.is_empty() {
        quote! { _ }
    } else {
        quote! { args }
    };
    let finish = if matches!(data.fields, Fields::Unit) && !options.private {
        quote! { .instantiate(|| Self) }
    } else {
        quote! {
            .construct(|#args: #krate::Arguments| {
                ::core::result::Result::Ok(#construct_self)
            })
        }
    };

    Ok(quote! {
        impl #impl_generics #krate::Injectable for #ident #ty_generics #where_clause {
            fn descriptor() -> #krate::TypeDescriptor {
                #krate::TypeDescriptor::builder::<Self>()
                    #named
                    #private
                    #factory
                    #(.parameter(#parameters))*
                    #finish
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expanded(input: DeriveInput) -> String {
        expand(input).unwrap().to_string()
    }

    #[test]
    fn test_arc_and_option_fields() {
        let output = expanded(parse_quote! {
            struct Mailer {
                transport: Arc<Transport>,
                audit: Option<Arc<AuditLog>>,
                retries: u32,
            }
        });

        assert!(output.contains("typed :: < Transport > (\"transport\")"));
        assert!(output.contains("args . get :: < Transport > (0usize)"));
        assert!(output.contains("args . optional :: < AuditLog > (1usize)"));
        assert!(output.contains(". nullable ()"));
        assert!(output.contains("args . cloned :: < u32 > (2usize)"));
    }

    #[test]
    fn test_inject_attributes() {
        let output = expanded(parse_quote! {
            struct Params {
                #[inject(name = "notClassService")]
                a: Arc<String>,
                #[inject(name = "b", default = String::from("B"))]
                b: Arc<String>,
            }
        });

        assert!(output.contains("named (\"notClassService\")"));
        assert!(output.contains("with_default :: < String > (String :: from (\"B\"))"));
    }

    #[test]
    fn test_unit_struct_without_constructor() {
        let output = expanded(parse_quote! {
            #[injectable(factory, crate = "armature_di_core")]
            struct TestFactory;
        });

        assert!(output.contains("armature_di_core :: Injectable"));
        assert!(output.contains(". factory ()"));
        assert!(output.contains(". instantiate"));
        assert!(!output.contains(". construct"));
    }

    #[test]
    fn test_private_unit_struct_gets_constructor() {
        let output = expanded(parse_quote! {
            #[injectable(private, name = "app::Hidden")]
            struct Hidden;
        });

        assert!(output.contains(". private ()"));
        assert!(output.contains(". named (\"app::Hidden\")"));
        assert!(output.contains(". construct"));
    }

    #[test]
    fn test_rejects_enums_and_unknown_options() {
        assert!(expand(parse_quote! { enum Choice { A, B } }).is_err());
        assert!(expand(parse_quote! {
            #[injectable(scoped)]
            struct Scoped;
        })
        .is_err());
    }
}
