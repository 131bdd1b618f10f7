use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ImplItem, ImplItemFn, ItemImpl, LitStr, Visibility};

#[derive(Default)]
struct ControllerArgs {
    name: Option<LitStr>,
    default_action: Option<LitStr>,
}

/// Methods with these names are lifecycle hooks, never actions.
const HOOKS: [&str; 2] = ["prepare", "finish"];

fn is_action_shaped(f: &ImplItemFn) -> bool {
    let inputs = &f.sig.inputs;
    if inputs.len() != 2 {
        return false;
    }
    match inputs.first() {
        Some(FnArg::Receiver(r)) => r.reference.is_some() && r.mutability.is_none(),
        _ => false,
    }
}

/// Generate an `nsrouter::controller::Controller` impl from an inherent impl block.
///
/// Every `pub fn name(&self, ctx: &mut Context)` becomes an action named after
/// the method. Private methods are not reachable. `prepare` and `finish` with
/// the same shape become the lifecycle hooks.
///
/// ```rust,ignore
/// #[controller(default_action = "index")]
/// impl UserController {
///     pub fn index(&self, ctx: &mut Context) { ctx.write("users") }
///     pub fn list(&self, ctx: &mut Context) { ctx.write("i am list") }
/// }
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = ControllerArgs::default();
    let arg_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            args.name = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("default_action") {
            args.default_action = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("expected `name` or `default_action`"))
        }
    });
    parse_macro_input!(attr with arg_parser);

    let input = parse_macro_input!(item as ItemImpl);
    if input.trait_.is_some() {
        return syn::Error::new_spanned(
            &input.self_ty,
            "#[controller] goes on an inherent impl block, not a trait impl",
        )
        .to_compile_error()
        .into();
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _ty_generics, where_clause) = input.generics.split_for_impl();

    let name = match &args.name {
        Some(lit) => lit.value(),
        None => match self_ty.as_ref() {
            syn::Type::Path(p) => p
                .path
                .segments
                .last()
                .map(|s| s.ident.to_string())
                .unwrap_or_default(),
            other => {
                return syn::Error::new_spanned(
                    other,
                    "cannot derive a controller name; use #[controller(name = \"...\")]",
                )
                .to_compile_error()
                .into()
            }
        },
    };

    let mut actions = Vec::new();
    let mut hooks = Vec::new();
    for item in &input.items {
        let ImplItem::Fn(f) = item else { continue };
        if !is_action_shaped(f) {
            continue;
        }
        let ident = &f.sig.ident;
        let method_name = ident.to_string();
        if HOOKS.contains(&method_name.as_str()) {
            hooks.push(quote! {
                fn #ident(&self, ctx: &mut ::nsrouter::Context) {
                    <#self_ty>::#ident(self, ctx)
                }
            });
            continue;
        }
        if !matches!(f.vis, Visibility::Public(_)) {
            continue;
        }
        actions.push(quote! {
            (#method_name, <#self_ty>::#ident as ::nsrouter::controller::ActionMethod<Self>)
        });
    }

    let default_action = match &args.default_action {
        Some(lit) => quote! {
            fn default_action(&self) -> ::std::option::Option<&'static str> {
                ::std::option::Option::Some(#lit)
            }
        },
        None => quote! {},
    };

    let expanded = quote! {
        #input

        impl #impl_generics ::nsrouter::controller::Controller for #self_ty #where_clause {
            fn controller_name(&self) -> &'static str {
                #name
            }

            fn actions(&self) -> ::std::vec::Vec<(&'static str, ::nsrouter::controller::ActionMethod<Self>)> {
                ::std::vec![#(#actions),*]
            }

            #default_action

            #(#hooks)*
        }
    };
    TokenStream::from(expanded)
}
