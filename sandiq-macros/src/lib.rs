//! Procedural macros for Sandiq.
//!
//! `#[derive(Autowire)]` writes the `Autowire` impl of a struct from its
//! fields and submits the type for link-time discovery, so
//! `ContainerBuilder::discover` finds it without a manual `register_type`.
//!
//! Field mapping:
//! - `Arc<T>` is a service parameter resolved under `T`'s type name, or
//!   under `#[sandiq(service = "id")]` when given
//! - anything else is a scalar parameter; `#[sandiq(default = expr)]`
//!   declares its default, bare `#[sandiq(default)]` uses `Default::default()`
//!
//! ```rust,ignore
//! #[derive(Autowire)]
//! struct Mailer {
//!     transport: Arc<dyn Transport>,
//!     #[sandiq(service = "mail.config")]
//!     config: Arc<MailConfig>,
//!     #[sandiq(default = 3)]
//!     retries: u32,
//! }
//! ```

use darling::ast::{Data, Fields, Style};
use darling::util::Ignored;
use darling::{Error, FromDeriveInput, FromField, FromMeta};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Expr, GenericArgument, Generics, Ident, PathArguments, Type, parse_macro_input};

#[derive(FromDeriveInput)]
#[darling(attributes(sandiq), supports(struct_named, struct_unit))]
struct AutowireInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, AutowireField>,
}

#[derive(FromField)]
#[darling(attributes(sandiq))]
struct AutowireField {
    ident: Option<Ident>,
    ty: Type,
    #[darling(default)]
    default: Option<DefaultValue>,
    #[darling(default)]
    service: Option<String>,
}

/// `default` keeps its expression as written, string literals included.
struct DefaultValue(Option<Expr>);

impl FromMeta for DefaultValue {
    fn from_word() -> darling::Result<Self> {
        Ok(DefaultValue(None))
    }

    fn from_expr(expr: &Expr) -> darling::Result<Self> {
        Ok(DefaultValue(Some(expr.clone())))
    }
}

#[proc_macro_derive(Autowire, attributes(sandiq))]
pub fn derive_autowire(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = AutowireInput::from_derive_input(&input).and_then(|input| expand(&input));
    match expanded {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(input: &AutowireInput) -> darling::Result<TokenStream2> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(Error::custom("Autowire cannot be derived for generic types")
            .with_span(&input.generics));
    }

    let fields = match &input.data {
        Data::Struct(fields) => fields,
        Data::Enum(_) => return Err(Error::unsupported_shape("enum").with_span(ident)),
    };

    let mut errors = Error::accumulator();
    let mut parameters = Vec::new();
    let mut arguments = Vec::new();

    for field in fields.iter() {
        if let Some((parameter, argument)) = errors.handle(expand_field(field)) {
            parameters.push(parameter);
            arguments.push(argument);
        }
    }
    errors.finish()?;

    let construct = construct_body(fields, &arguments);

    Ok(quote! {
        impl ::sandiq::Autowire for #ident {
            fn parameters() -> ::std::vec::Vec<::sandiq::Parameter> {
                ::std::vec![#(#parameters),*]
            }

            fn construct(args: &mut ::sandiq::Arguments) -> ::sandiq::Result<Self> {
                #construct
            }
        }

        const _: () = {
            fn __sandiq_register(catalog: &mut ::sandiq::TypeCatalog) {
                catalog.register::<#ident>();
            }

            ::sandiq::inventory::submit! {
                ::sandiq::Discovered::new(__sandiq_register)
            }
        };
    })
}

fn construct_body(fields: &Fields<AutowireField>, arguments: &[TokenStream2]) -> TokenStream2 {
    match fields.style {
        Style::Unit => quote! {
            let _ = args;
            ::std::result::Result::Ok(Self)
        },
        _ => {
            let names = fields.iter().filter_map(|f| f.ident.as_ref());
            quote! {
                ::std::result::Result::Ok(Self {
                    #(#names: #arguments,)*
                })
            }
        }
    }
}

/// Parameter declaration and argument extraction of one field.
fn expand_field(field: &AutowireField) -> darling::Result<(TokenStream2, TokenStream2)> {
    let Some(ident) = &field.ident else {
        return Err(Error::unsupported_shape("tuple struct"));
    };
    let name = ident.to_string();
    let ty = &field.ty;

    if let Some(inner) = arc_inner(ty) {
        if field.default.is_some() {
            return Err(Error::custom("service fields cannot have a default").with_span(ident));
        }

        let parameter = match &field.service {
            Some(id) => quote! { ::sandiq::Parameter::service_id(#name, #id) },
            None => quote! { ::sandiq::Parameter::service::<#inner>(#name) },
        };
        return Ok((parameter, quote! { args.object::<#inner>()? }));
    }

    if field.service.is_some() {
        return Err(Error::custom("`service` requires an `Arc<T>` field").with_span(ident));
    }

    let parameter = match &field.default {
        Some(DefaultValue(Some(expr))) => quote! {
            ::sandiq::Parameter::scalar(#name).with_default(::sandiq::Value::from(#expr))
        },
        Some(DefaultValue(None)) => quote! {
            ::sandiq::Parameter::scalar(#name)
                .with_default(::sandiq::Value::from(<#ty as ::std::default::Default>::default()))
        },
        None => quote! { ::sandiq::Parameter::scalar(#name) },
    };
    Ok((parameter, quote! { args.value::<#ty>()? }))
}

/// `T` when `ty` is written `Arc<T>` (any path ending in `Arc`).
fn arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }

    let segment = path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }

    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
