extern crate proc_macro;
extern crate quote;
extern crate syn;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derives the `Identifiable`, `Positioned` and `StatTracked` capabilities
/// for a struct that embeds a `core: ComponentCore` field.  The traits and
/// the `Position`/`Statistic` types must be in scope where the derive is
/// used.
#[proc_macro_derive(Component)]
pub fn component(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let name = input.ident;
    let has_core = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .any(|field| field.ident.as_ref().map_or(false, |ident| ident == "core")),
            _ => false,
        },
        _ => false,
    };
    if !has_core {
        return syn::Error::new_spanned(
            &name,
            "Component can only be derived for structs with a `core: ComponentCore` field",
        )
        .to_compile_error()
        .into();
    }
    let tokens = quote! {
        impl Identifiable for #name {
            fn name(&self) -> &str {
                self.core.name()
            }
        }
        impl Positioned for #name {
            fn position(&self) -> &Position {
                self.core.position()
            }
        }
        impl StatTracked for #name {
            fn tally(&mut self, value: f64) {
                self.core.tally(value)
            }
            fn init_stats(&mut self, name: &str) {
                self.core.init_stats(name)
            }
            fn statistic(&self) -> &Statistic {
                self.core.statistic()
            }
        }
    };
    tokens.into()
}
