/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

#![forbid(unsafe_code)]

//! Transit Macro Library
//!
//! Attribute macros for types that cross node boundaries during a move.
//!
//! # Message Macro
//!
//! [`mobility_message`] marks a protocol message exchanged between nodes:
//!
//! ```ignore
//! #[mobility_message]
//! pub struct Heartbeat {
//!     pub node: MessageAddress,
//! }
//! ```
//!
//! # State Macro
//!
//! [`mobility_state`] marks the application state an agent carries with it:
//!
//! ```ignore
//! #[mobility_state]
//! pub struct Counter {
//!     count: u64,
//! }
//!
//! let state = AgentState::capture(&Counter { count: 3 })?;
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, parse_quote, DeriveInput, Path};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name)
                    || meta
                        .path
                        .segments
                        .last()
                        .is_some_and(|segment| segment.ident == trait_name)
                {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Adds the derives in `wanted` that the item does not already carry, plus a
/// compile-time `Send + Sync + 'static` check.
fn expand(input: DeriveInput, wanted: Vec<(&str, Path)>, kind: &str) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let traits: Vec<_> = wanted
        .into_iter()
        .filter(|(ident, _)| !has_derive(&input, ident))
        .map(|(_, path)| path)
        .collect();
    let derives = if traits.is_empty() {
        quote!()
    } else {
        quote!(#[derive(#(#traits),*)])
    };

    let assert_ident = quote::format_ident!("_Assert{}_{}", kind, name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}

/// Marks a type as a message exchanged between nodes.
///
/// Expands to `#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]`,
/// skipping any of these the type already derives, and asserts at compile
/// time that the type is `Send + Sync + 'static`.
///
/// The crate using the macro must depend on `serde`.
#[proc_macro_attribute]
pub fn mobility_message(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    expand(
        input,
        vec![
            ("Clone", parse_quote!(Clone)),
            ("Debug", parse_quote!(Debug)),
            ("Serialize", parse_quote!(::serde::Serialize)),
            ("Deserialize", parse_quote!(::serde::Deserialize)),
        ],
        "MobilityMessage",
    )
}

/// Marks a type as application state an agent carries between nodes.
///
/// Derives everything [`mobility_message`] does plus `PartialEq`, so a test
/// move can check that the state survives a codec round trip unchanged.
#[proc_macro_attribute]
pub fn mobility_state(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    expand(
        input,
        vec![
            ("Clone", parse_quote!(Clone)),
            ("Debug", parse_quote!(Debug)),
            ("PartialEq", parse_quote!(PartialEq)),
            ("Serialize", parse_quote!(::serde::Serialize)),
            ("Deserialize", parse_quote!(::serde::Deserialize)),
        ],
        "MobilityState",
    )
}
