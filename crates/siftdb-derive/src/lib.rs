use proc_macro::TokenStream;

mod model;

#[proc_macro_derive(Model)]
pub fn derive_model(input: TokenStream) -> TokenStream {
    model::derive_model(input.into()).into()
}
