use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{
    parse_macro_input, Attribute, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, ItemStruct,
    LitStr, Meta, Token, Type,
};

use crate::injectable::injectable_impl;

const HTTP_METHODS: [&str; 5] = ["get", "post", "put", "delete", "patch"];
const PARAM_ATTRS: [&str; 3] = ["body", "param", "query"];

struct ControllerArgs {
    path: LitStr,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut path = None;
        while !input.is_empty() {
            let name: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            if name == "path" {
                path = Some(input.parse::<LitStr>()?);
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    format!("unknown controller argument `{name}`"),
                ));
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        let path = path.unwrap_or_else(|| LitStr::new("/", Span::call_site()));
        if !path.value().starts_with('/') {
            return Err(syn::Error::new(path.span(), "controller path must start with `/`"));
        }
        Ok(ControllerArgs { path })
    }
}

pub fn controller_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let input = parse_macro_input!(item as ItemStruct);

    match generate_controller_impl(&args, &input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn generate_controller_impl(args: &ControllerArgs, input: &ItemStruct) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let base_path = &args.path;
    let injectable = injectable_impl(struct_name, &input.generics, &input.fields)?;

    Ok(quote! {
        #input

        #injectable

        impl #impl_generics #struct_name #ty_generics #where_clause {
            pub const BASE_PATH: &'static str = #base_path;

            pub fn base_path() -> &'static str {
                Self::BASE_PATH
            }
        }
    })
}

enum ParamKind {
    Body,
    Param,
    Query,
    Raw,
}

struct ParamInfo {
    ty: Type,
    kind: ParamKind,
}

struct RouteInfo {
    method: Ident,
    path: String,
    fn_name: Ident,
    params: Vec<ParamInfo>,
}

pub fn routes_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);

    match generate_routes_impl(input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn generate_routes_impl(mut input: ItemImpl) -> syn::Result<TokenStream2> {
    let mut routes: Vec<RouteInfo> = Vec::new();

    for item in input.items.iter_mut() {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let Some(route) = extract_route_info(method)? else {
            continue;
        };

        if routes
            .iter()
            .any(|r| r.path == route.path && r.method == route.method)
        {
            return Err(syn::Error::new(
                method.sig.ident.span(),
                format!(
                    "duplicate route {} {}",
                    route.method.to_string().to_uppercase(),
                    route.path
                ),
            ));
        }
        routes.push(route);

        method.attrs.retain(|attr| !is_http_method_attr(attr));
        for arg in method.sig.inputs.iter_mut() {
            if let FnArg::Typed(pat_type) = arg {
                pat_type.attrs.retain(|attr| !is_param_attr(attr));
            }
        }
    }

    // One axum route per path, methods chained in declaration order.
    let mut by_path: Vec<(&str, Vec<&RouteInfo>)> = Vec::new();
    for route in &routes {
        match by_path.iter().position(|(path, _)| *path == route.path) {
            Some(i) => by_path[i].1.push(route),
            None => by_path.push((route.path.as_str(), vec![route])),
        }
    }

    let route_registrations = by_path.iter().map(|(path, group)| {
        let method_router = group.iter().enumerate().map(|(i, route)| {
            let method = &route.method;
            let handler = route_handler(route);
            if i == 0 {
                quote! { ::product_poc::axum::routing::#method(#handler) }
            } else {
                quote! { .#method(#handler) }
            }
        });
        quote! {
            .route(#path, #(#method_router)*)
        }
    });

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics #self_ty #where_clause {
            /// Routes relative to [`Self::BASE_PATH`]
            pub fn router<S>(controller: ::std::sync::Arc<Self>) -> ::product_poc::axum::Router<S>
            where
                S: Clone + Send + Sync + 'static,
            {
                ::product_poc::axum::Router::new() #(#route_registrations)*
            }
        }
    })
}

fn route_handler(route: &RouteInfo) -> TokenStream2 {
    let fn_name = &route.fn_name;

    let extractor_patterns = route.params.iter().enumerate().map(|(i, p)| {
        let temp_ident = format_ident!("__p_{}", i);
        let ty = &p.ty;
        match p.kind {
            ParamKind::Body => {
                quote! { ::product_poc::axum::Json(#temp_ident): ::product_poc::axum::Json<#ty> }
            }
            ParamKind::Param => quote! {
                ::product_poc::axum::extract::Path(#temp_ident): ::product_poc::axum::extract::Path<#ty>
            },
            ParamKind::Query => quote! {
                ::product_poc::axum::extract::Query(#temp_ident): ::product_poc::axum::extract::Query<#ty>
            },
            ParamKind::Raw => quote! { #temp_ident: #ty },
        }
    });

    let internal_args = (0..route.params.len()).map(|i| format_ident!("__p_{}", i));

    quote! {{
        let controller = ::std::sync::Arc::clone(&controller);
        move |#(#extractor_patterns),*| {
            let controller = ::std::sync::Arc::clone(&controller);
            async move {
                use ::product_poc::axum::response::IntoResponse;
                controller.#fn_name(#(#internal_args),*).await.into_response()
            }
        }
    }}
}

fn extract_route_info(method: &ImplItemFn) -> syn::Result<Option<RouteInfo>> {
    let mut route = None;

    for attr in &method.attrs {
        let Some(ident) = attr.path().get_ident() else {
            continue;
        };
        if !HTTP_METHODS.contains(&ident.to_string().as_str()) {
            continue;
        }
        if route.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "a handler takes exactly one HTTP method attribute",
            ));
        }
        let path = match &attr.meta {
            Meta::Path(_) => "/".to_string(),
            _ => attr.parse_args::<LitStr>()?.value(),
        };
        route = Some((ident.clone(), path));
    }

    let Some((http_method, path)) = route else {
        return Ok(None);
    };

    if method.sig.receiver().is_none() {
        return Err(syn::Error::new(
            method.sig.span(),
            "route handlers must take `&self`",
        ));
    }

    let mut params = Vec::new();
    for input in method.sig.inputs.iter() {
        if let FnArg::Typed(pat_type) = input {
            params.push(ParamInfo {
                ty: (*pat_type.ty).clone(),
                kind: get_param_kind(&pat_type.attrs),
            });
        }
    }

    let body_count = params
        .iter()
        .filter(|p| matches!(p.kind, ParamKind::Body))
        .count();
    let body_is_last = params
        .last()
        .is_some_and(|p| matches!(p.kind, ParamKind::Body));
    if body_count > 1 || (body_count == 1 && !body_is_last) {
        return Err(syn::Error::new(
            method.sig.span(),
            "`#[body]` may appear once and must be the last parameter",
        ));
    }

    Ok(Some(RouteInfo {
        method: http_method,
        path,
        fn_name: method.sig.ident.clone(),
        params,
    }))
}

fn get_param_kind(attrs: &[Attribute]) -> ParamKind {
    for attr in attrs {
        if attr.path().is_ident("body") {
            return ParamKind::Body;
        }
        if attr.path().is_ident("param") {
            return ParamKind::Param;
        }
        if attr.path().is_ident("query") {
            return ParamKind::Query;
        }
    }
    ParamKind::Raw
}

fn is_http_method_attr(attr: &Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| HTTP_METHODS.contains(&ident.to_string().as_str()))
}

fn is_param_attr(attr: &Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| PARAM_ATTRS.contains(&ident.to_string().as_str()))
}
