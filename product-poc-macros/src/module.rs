use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{parse_macro_input, Attribute, Ident, ItemStruct, Path, Token, Type};

struct ModuleItem {
    attrs: Vec<Attribute>,
    path: Path,
}

impl Parse for ModuleItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let path = input.parse()?;
        Ok(ModuleItem { attrs, path })
    }
}

/// `(dyn Trait => Impl)`
struct BindingItem {
    trait_type: Type,
    impl_type: Path,
}

impl Parse for BindingItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        syn::parenthesized!(content in input);

        let trait_type: Type = content.parse()?;
        content.parse::<Token![=>]>()?;
        let impl_type: Path = content.parse()?;

        Ok(BindingItem {
            trait_type,
            impl_type,
        })
    }
}

#[derive(Default)]
struct ModuleArgs {
    imports: Vec<ModuleItem>,
    controllers: Vec<ModuleItem>,
    providers: Vec<ModuleItem>,
    bindings: Vec<BindingItem>,
}

impl Parse for ModuleArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ModuleArgs::default();

        while !input.is_empty() {
            let name: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            let content;
            syn::bracketed!(content in input);

            if name == "imports" {
                args.imports = content
                    .parse_terminated(ModuleItem::parse, Token![,])?
                    .into_iter()
                    .collect();
            } else if name == "controllers" {
                args.controllers = content
                    .parse_terminated(ModuleItem::parse, Token![,])?
                    .into_iter()
                    .collect();
            } else if name == "providers" {
                args.providers = content
                    .parse_terminated(ModuleItem::parse, Token![,])?
                    .into_iter()
                    .collect();
            } else if name == "bindings" {
                args.bindings = content
                    .parse_terminated(BindingItem::parse, Token![,])?
                    .into_iter()
                    .collect();
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    format!("unknown module argument `{name}`"),
                ));
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

pub fn module_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ModuleArgs);
    let input = parse_macro_input!(item as ItemStruct);

    TokenStream::from(generate_module_impl(&args, &input))
}

fn generate_module_impl(args: &ModuleArgs, input: &ItemStruct) -> TokenStream2 {
    let module_name = &input.ident;

    let binding_registrations = args.bindings.iter().map(|binding| {
        let trait_type = &binding.trait_type;
        let impl_type = &binding.impl_type;
        quote! {
            container.register_trait::<#trait_type, #impl_type, _>(|i| {
                i as ::std::sync::Arc<#trait_type>
            });
        }
    });

    let import_registrations = args.imports.iter().map(|item| {
        let path = &item.path;
        let attrs = &item.attrs;
        quote! {
            #(#attrs)*
            <#path as ::product_poc::Module>::register(container)?;
        }
    });

    // Providers and controllers are built in listed order, so a component
    // may only depend on those listed before it.
    let component_registrations = args
        .providers
        .iter()
        .chain(args.controllers.iter())
        .map(|item| {
            let path = &item.path;
            let attrs = &item.attrs;
            quote! {
                #(#attrs)*
                {
                    let instance = <#path as ::product_poc::Injectable>::inject(container)?;
                    container.register(instance);
                }
            }
        });

    quote! {
        #input

        impl ::product_poc::Module for #module_name {
            fn register(container: &mut ::product_poc::Container) -> ::product_poc::Result<()> {
                // 1. Trait bindings
                #(#binding_registrations)*

                // 2. Imported modules
                #(#import_registrations)*

                // 3. Providers, then controllers
                #(#component_registrations)*

                Ok(())
            }
        }

        impl #module_name {
            /// Register this module into a container already holding its
            /// infrastructure
            pub fn create_container(
                mut container: ::product_poc::Container,
            ) -> ::product_poc::Result<::product_poc::Container> {
                <Self as ::product_poc::Module>::register(&mut container)?;
                Ok(container)
            }
        }
    }
}
