use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DataEnum, DataStruct, DeriveInput, Fields, Ident, Index, Result, Variant};

use crate::attrs::{self, FieldMode};

pub fn expand(mut input: DeriveInput) -> Result<TokenStream> {
    let name = input.ident.clone();

    for param in input.generics.type_params_mut() {
        param
            .bounds
            .push(syn::parse_quote!(::huginn_middleware::DebugCase));
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = if attrs::container_display(&input.attrs)? {
        quote! {
            ::huginn_middleware::Shape::Leaf(
                ::std::borrow::Cow::Owned(::std::string::ToString::to_string(self))
            )
        }
    } else {
        match &input.data {
            Data::Enum(data) => enum_body(&name, data)?,
            Data::Struct(data) => struct_body(&name, data)?,
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span,
                    "DebugCase cannot be derived for unions",
                ));
            }
        }
    };

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::huginn_middleware::DebugCase for #name #ty_generics #where_clause {
            fn shape(&self) -> ::huginn_middleware::Shape<'_> {
                #body
            }
        }
    })
}

fn enum_body(name: &Ident, data: &DataEnum) -> Result<TokenStream> {
    if data.variants.is_empty() {
        return Ok(quote! { match *self {} });
    }

    let type_name = name.to_string();
    let arms = data
        .variants
        .iter()
        .map(|variant| variant_arm(&type_name, variant))
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        match self {
            #(#arms)*
        }
    })
}

fn variant_arm(type_name: &str, variant: &Variant) -> Result<TokenStream> {
    let ident = &variant.ident;
    let label = match attrs::variant_rename(&variant.attrs)? {
        Some(rename) => rename.value(),
        None => ident.to_string(),
    };
    let unit = quote! {
        ::huginn_middleware::Shape::Unit { text: #label, type_name: #type_name }
    };

    match &variant.fields {
        Fields::Unit => Ok(quote! { Self::#ident => #unit, }),
        Fields::Unnamed(fields) => {
            let mut bindings = Vec::new();
            let mut children = Vec::new();
            for (index, field) in fields.unnamed.iter().enumerate() {
                let mode = attrs::field_mode(&field.attrs)?;
                if mode == FieldMode::Skip {
                    bindings.push(quote! { _ });
                    continue;
                }
                let binding = format_ident!("__field{}", index);
                children.push(child(mode, &quote! { #binding }));
                bindings.push(quote! { #binding });
            }

            let shape = match children.as_slice() {
                [] => unit,
                [only] => quote! {
                    ::huginn_middleware::Shape::Case {
                        label: #label,
                        payload: ::huginn_middleware::Payload::Single(#only),
                    }
                },
                _ => {
                    let fields = children.iter().map(|child| {
                        quote! { ::huginn_middleware::Field { label: ::std::option::Option::None, child: #child } }
                    });
                    quote! {
                        ::huginn_middleware::Shape::Case {
                            label: #label,
                            payload: ::huginn_middleware::Payload::Fields(::std::vec![#(#fields),*]),
                        }
                    }
                }
            };

            Ok(quote! { Self::#ident(#(#bindings),*) => #shape, })
        }
        Fields::Named(named) => {
            let mut bindings = Vec::new();
            let mut fields = Vec::new();
            for (index, field) in named.named.iter().enumerate() {
                let Some(field_ident) = &field.ident else {
                    continue;
                };
                let mode = attrs::field_mode(&field.attrs)?;
                if mode == FieldMode::Skip {
                    bindings.push(quote! { #field_ident: _ });
                    continue;
                }
                let binding = format_ident!("__field{}", index);
                let field_label = field_ident.to_string();
                let child = child(mode, &quote! { #binding });
                fields.push(quote! {
                    ::huginn_middleware::Field { label: ::std::option::Option::Some(#field_label), child: #child }
                });
                bindings.push(quote! { #field_ident: #binding });
            }

            let shape = if fields.is_empty() {
                unit
            } else {
                quote! {
                    ::huginn_middleware::Shape::Case {
                        label: #label,
                        payload: ::huginn_middleware::Payload::Fields(::std::vec![#(#fields),*]),
                    }
                }
            };

            Ok(quote! { Self::#ident { #(#bindings),* } => #shape, })
        }
    }
}

fn struct_body(name: &Ident, data: &DataStruct) -> Result<TokenStream> {
    let mut fields = Vec::new();
    match &data.fields {
        Fields::Unit => {
            let text = name.to_string();
            return Ok(quote! {
                ::huginn_middleware::Shape::Leaf(::std::borrow::Cow::Borrowed(#text))
            });
        }
        Fields::Named(named) => {
            for field in &named.named {
                let Some(field_ident) = &field.ident else {
                    continue;
                };
                let mode = attrs::field_mode(&field.attrs)?;
                if mode == FieldMode::Skip {
                    continue;
                }
                let field_label = field_ident.to_string();
                let child = child(mode, &quote! { &self.#field_ident });
                fields.push(quote! {
                    ::huginn_middleware::Field { label: ::std::option::Option::Some(#field_label), child: #child }
                });
            }
        }
        Fields::Unnamed(unnamed) => {
            for (index, field) in unnamed.unnamed.iter().enumerate() {
                let mode = attrs::field_mode(&field.attrs)?;
                if mode == FieldMode::Skip {
                    continue;
                }
                let index = Index::from(index);
                let child = child(mode, &quote! { &self.#index });
                fields.push(quote! {
                    ::huginn_middleware::Field { label: ::std::option::Option::None, child: #child }
                });
            }
        }
    }

    Ok(quote! {
        ::huginn_middleware::Shape::Tuple(::std::vec![#(#fields),*])
    })
}

/// A `Child` expression for a field reference.
fn child(mode: FieldMode, value: &TokenStream) -> TokenStream {
    match mode {
        FieldMode::Display => quote! {
            ::huginn_middleware::Child::Text(
                ::std::borrow::Cow::Owned(::std::string::ToString::to_string(#value))
            )
        },
        FieldMode::Debug => quote! {
            ::huginn_middleware::Child::Text(
                ::std::borrow::Cow::Owned(::std::format!("{:?}", #value))
            )
        },
        FieldMode::Describe | FieldMode::Skip => quote! {
            ::huginn_middleware::Child::Value(#value)
        },
    }
}
