//! `#[test]` for the facet-fixture suites: a regular test that runs
//! `facet_fixture_testhelpers::setup()` before its body.

use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    struct Prelude {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    struct Signature {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct TestFn {
        prelude: Prelude, _fn: KFn, name: Ident,
        signature: Signature, body: BraceGroup
    }
}

/// Marks a test. The signature is kept as written, so a test returning
/// `eyre::Result<()>` can use `?` throughout.
#[proc_macro_attribute]
pub fn test(
    _attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut tokens = item.to_token_iter();
    let TestFn {
        prelude,
        _fn,
        name,
        signature,
        body,
    } = match tokens.parse::<TestFn>() {
        Ok(test_fn) => test_fn,
        Err(e) => {
            let message = format!("#[test] expects a function: {e:?}");
            return quote::quote! { ::core::compile_error!(#message); }.into();
        }
    };

    let mut attributes = TokenStream::new();
    prelude.items.to_tokens(&mut attributes);
    let mut header = TokenStream::new();
    signature.items.to_tokens(&mut header);
    let body = body.0.stream();

    quote::quote! {
        #[::core::prelude::rust_2024::test]
        #attributes fn #name #header {
            ::facet_fixture_testhelpers::setup();
            #body
        }
    }
    .into()
}
