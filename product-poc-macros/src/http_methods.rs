use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;

/// Route attributes are read and stripped by `#[routes]`; on their own they
/// leave the method untouched.
pub fn http_method_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as syn::ImplItemFn);

    TokenStream::from(quote! {
        #input
    })
}
