use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::{
    parse_macro_input, Data, DeriveInput, Field, Fields, GenericArgument, Generics, Ident,
    PathArguments, Type,
};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_injectable_impl(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "#[derive(Injectable)] can only be applied to structs",
            ))
        }
    };
    injectable_impl(&input.ident, &input.generics, fields)
}

/// `impl Injectable` resolving every `Arc<...>` field from the container
pub(crate) fn injectable_impl(
    struct_name: &Ident,
    generics: &Generics,
    fields: &Fields,
) -> syn::Result<TokenStream2> {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields: &Punctuated<Field, Comma> = match fields {
        Fields::Named(fields) => &fields.named,
        Fields::Unit => {
            return Ok(quote! {
                impl #impl_generics ::product_poc::Injectable for #struct_name #ty_generics #where_clause {
                    fn inject(_container: &::product_poc::Container) -> ::product_poc::Result<Self> {
                        Ok(Self)
                    }
                }
            });
        }
        other => {
            return Err(syn::Error::new(
                other.span(),
                "#[derive(Injectable)] requires named fields",
            ))
        }
    };

    let mut field_injections = Vec::with_capacity(fields.len());
    for field in fields {
        let field_name = &field.ident;
        let inner = arc_inner_type(&field.ty).ok_or_else(|| {
            syn::Error::new(field.ty.span(), "injected fields must be wrapped in Arc<...>")
        })?;

        let resolve_method = match inner {
            Type::TraitObject(_) => quote!(resolve_trait),
            _ => quote!(resolve),
        };

        field_injections.push(quote! {
            #field_name: container.#resolve_method::<#inner>()?
        });
    }

    Ok(quote! {
        impl #impl_generics ::product_poc::Injectable for #struct_name #ty_generics #where_clause {
            fn inject(container: &::product_poc::Container) -> ::product_poc::Result<Self> {
                Ok(Self {
                    #(#field_injections),*
                })
            }
        }
    })
}

/// `Arc<T>` -> `T`
fn arc_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
