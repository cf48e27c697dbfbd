//! polyglue-macros - Derive macro for reflectable classes
//!
//! `#[derive(Reflect)]` emits everything a class needs to be driven through
//! `polyglue-reflect`:
//! - a lazily built singleton `ClassDescriptor`
//! - `Reflect` field accessors that clone on read and downcast on write
//! - `Reflectable::describe()` and `Typed` as `Class(name)`

use darling::ast::Data;
use darling::{FromDeriveInput, FromField, FromMeta};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashSet;
use syn::{DeriveInput, parse_macro_input};

/// A `#[reflect(method(name = "...", call = "path"))]` entry
#[derive(Debug, FromMeta)]
struct MethodOpts {
    name: String,
    /// `fn(&mut dyn Reflect, Vec<Value>) -> GlueResult<Value>`
    call: syn::Path,
}

#[derive(Debug, FromField)]
#[darling(attributes(reflect))]
struct FieldOpts {
    ident: Option<syn::Ident>,
    ty: syn::Type,

    /// Taken positionally by the constructor
    #[darling(default)]
    param: bool,

    /// Not exposed; filled with `Default` by the generated constructor
    #[darling(default)]
    skip: bool,

    #[darling(default)]
    rename: Option<String>,
}

impl FieldOpts {
    fn exposed_name(&self) -> Option<String> {
        match (&self.rename, &self.ident) {
            (Some(name), _) => Some(name.clone()),
            (None, Some(ident)) => Some(ident.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(reflect), supports(struct_named))]
struct ReflectOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<(), FieldOpts>,

    /// Qualified class name; defaults to the type name
    #[darling(default)]
    name: Option<String>,

    #[darling(default)]
    extends: Option<String>,

    /// Function taking the `param` fields in order and returning `Self`
    #[darling(default)]
    constructor: Option<syn::Path>,

    /// Publish no constructor at all
    #[darling(default)]
    no_constructor: bool,

    #[darling(multiple, rename = "method")]
    methods: Vec<MethodOpts>,

    /// Path to the reflection crate, for callers that only see a re-export
    #[darling(default, rename = "crate")]
    krate: Option<syn::Path>,
}

/// Derive `Reflect`, `Reflectable` and `Typed` for a named struct
///
/// # Example
///
/// ```ignore
/// #[derive(Reflect, Default, Clone)]
/// #[reflect(name = "chat.event.Message", extends = "chat.event.ChatEvent")]
/// #[reflect(method(name = "reply", call = "Message::reply_thunk"))]
/// pub struct Message {
///     #[reflect(rename = "type")]
///     pub kind: String,
///     pub text: String,
///     #[reflect(skip)]
///     cache: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_reflect(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => TokenStream::from(e.write_errors()),
    }
}

fn expand_reflect(input: &DeriveInput) -> darling::Result<TokenStream2> {
    let opts = ReflectOpts::from_derive_input(input)?;

    if !opts.generics.params.is_empty() {
        return Err(darling::Error::custom(
            "reflectable classes cannot be generic; each class owns one descriptor",
        )
        .with_span(&opts.generics));
    }
    if opts.constructor.is_some() && opts.no_constructor {
        return Err(darling::Error::custom(
            "`constructor` and `no_constructor` cannot be combined",
        ));
    }

    let ident = &opts.ident;
    let krate = opts
        .krate
        .clone()
        .unwrap_or_else(|| syn::parse_quote!(::polyglue_reflect));
    let class_name = opts.name.clone().unwrap_or_else(|| ident.to_string());

    let fields = match &opts.data {
        Data::Struct(fields) => fields.fields.iter().collect::<Vec<_>>(),
        Data::Enum(_) => return Err(darling::Error::unsupported_shape("enum")),
    };
    check_unique_names(&fields)?;

    let exposed: Vec<_> = fields.iter().filter(|f| !f.skip).collect();
    let params: Vec<_> = fields.iter().filter(|f| f.param).collect();
    if let Some(field) = params.iter().find(|f| f.skip) {
        return Err(darling::Error::custom("a `param` field cannot be `skip`")
            .with_span(&field.ident));
    }

    let exposed_names: Vec<String> = exposed.iter().filter_map(|f| f.exposed_name()).collect();
    let exposed_idents: Vec<_> = exposed.iter().map(|f| &f.ident).collect();
    let exposed_types: Vec<_> = exposed.iter().map(|f| &f.ty).collect();
    let param_types: Vec<_> = params.iter().map(|f| &f.ty).collect();

    let extends = opts
        .extends
        .as_ref()
        .map(|parent| quote! { .extends(#parent) });

    let method_names: Vec<_> = opts.methods.iter().map(|m| &m.name).collect();
    let method_calls: Vec<_> = opts.methods.iter().map(|m| &m.call).collect();

    let constructor = if opts.no_constructor {
        None
    } else {
        let body = match &opts.constructor {
            Some(path) => quote! {
                #path(#(args.take::<#param_types>()?),*)
            },
            None => {
                let inits = fields.iter().map(|f| {
                    let field_ident = &f.ident;
                    if f.param {
                        let ty = &f.ty;
                        quote! { #field_ident: args.take::<#ty>()? }
                    } else {
                        quote! { #field_ident: ::core::default::Default::default() }
                    }
                });
                quote! { #ident { #(#inits),* } }
            }
        };
        Some(quote! {
            .constructor(|args| {
                #[allow(unused_mut)]
                let mut args = #krate::Args::new(#class_name, args);
                let object: #ident = #body;
                ::core::result::Result::Ok(::std::boxed::Box::new(object))
            })
        })
    };

    let unknown_field = quote! {
        #krate::__private::GlueError::UnknownField {
            class: ::std::string::ToString::to_string(#class_name),
            field: ::std::string::ToString::to_string(name),
        }
    };

    Ok(quote! {
        impl #krate::Reflect for #ident {
            fn class(&self) -> &'static #krate::ClassDescriptor {
                <Self as #krate::Reflectable>::describe()
            }

            fn get_field(&self, name: &str) -> #krate::__private::GlueResult<#krate::Value> {
                match name {
                    #(#exposed_names => ::core::result::Result::Ok(
                        #krate::Value::new(::core::clone::Clone::clone(&self.#exposed_idents))
                    ),)*
                    _ => ::core::result::Result::Err(#unknown_field),
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: #krate::Value,
            ) -> #krate::__private::GlueResult<()> {
                match name {
                    #(#exposed_names => {
                        self.#exposed_idents = value.take::<#exposed_types>(name)?;
                        ::core::result::Result::Ok(())
                    })*
                    _ => ::core::result::Result::Err(#unknown_field),
                }
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn into_any(
                self: ::std::boxed::Box<Self>,
            ) -> ::std::boxed::Box<
                dyn ::std::any::Any + ::core::marker::Send + ::core::marker::Sync,
            > {
                self
            }
        }

        impl #krate::Reflectable for #ident {
            fn describe() -> &'static #krate::ClassDescriptor {
                static DESCRIPTOR: #krate::__private::OnceCell<#krate::ClassDescriptor> =
                    #krate::__private::OnceCell::new();
                DESCRIPTOR.get_or_init(|| {
                    #krate::ClassDescriptor::builder(#class_name)
                        #extends
                        #(.param(<#param_types as #krate::Typed>::type_tag()))*
                        #(.field(#exposed_names, <#exposed_types as #krate::Typed>::type_tag()))*
                        #(.method(#method_names, #method_calls))*
                        #constructor
                        .embedding(#krate::Embedding::of::<#ident>())
                        .finish()
                })
            }
        }

        impl #krate::Typed for #ident {
            fn type_tag() -> #krate::TypeTag {
                #krate::TypeTag::class(#class_name)
            }
        }
    })
}

/// Exposed names must be unique after `rename`
fn check_unique_names(fields: &[&FieldOpts]) -> darling::Result<()> {
    let mut seen = HashSet::new();
    for field in fields.iter().filter(|f| !f.skip) {
        if let Some(name) = field.exposed_name()
            && !seen.insert(name.clone())
        {
            return Err(
                darling::Error::custom(format!("field name `{}` is declared twice", name))
                    .with_span(&field.ident),
            );
        }
    }
    Ok(())
}
