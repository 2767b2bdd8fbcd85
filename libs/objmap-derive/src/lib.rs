use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, GenericParam, Generics,
    Ident, LitStr, Type,
};

/// Derive macro implementing `objmap::Reflect` (and `objmap::Struct` for
/// structs with named fields).
///
/// Container attributes:
///
/// - `#[reflect(accessors(get_a, get_b))]`: zero-argument `&self` methods the
///   mapper may read when a source field is missing.
/// - `#[reflect(mutators(set_a))]`: single-argument `&mut self` methods the
///   mapper calls after the field pass.
/// - `#[reflect(opaque)]`: copied only between identical types.
///
/// Field attribute `#[reflect(skip)]` hides a field from the mapper.
///
/// The type must implement `Clone` and `Default` and be `Send + Sync`.
/// Enums, tuple structs and unit structs are always opaque.
///
/// # Example
///
/// ```ignore
/// #[derive(Reflect, Clone, Default)]
/// #[reflect(accessors(get_full_name), mutators(set_age))]
/// pub struct Person {
///     pub name: String,
///     #[reflect(skip)]
///     pub cache: Vec<u8>,
///     age: u32,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

#[derive(Default)]
struct ContainerAttrs {
    opaque: bool,
    accessors: Vec<Ident>,
    mutators: Vec<Ident>,
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let attrs = container_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) if !attrs.opaque => Some(&fields.named),
            _ => None,
        },
        Data::Enum(_) => None,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Reflect cannot be derived for unions",
            ));
        }
    };

    let Some(fields) = fields else {
        if !attrs.accessors.is_empty() || !attrs.mutators.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "accessors and mutators need a struct with named fields",
            ));
        }
        let generics = with_bounds(&input.generics, &[]);
        return Ok(opaque_impl(&input.ident, &generics));
    };

    let mut names = Vec::new();
    let mut idents = Vec::new();
    let mut types = Vec::new();
    for field in fields {
        if field_skipped(&field.attrs)? {
            continue;
        }
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        names.push(LitStr::new(&unraw(ident), ident.span()));
        idents.push(ident);
        types.push(&field.ty);
    }

    let generics = with_bounds(&input.generics, &types);
    Ok(struct_impl(&input.ident, &generics, &names, &idents, &attrs))
}

fn container_attrs(attrs: &[Attribute]) -> Result<ContainerAttrs, syn::Error> {
    let mut out = ContainerAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("opaque") {
                out.opaque = true;
                Ok(())
            } else if meta.path.is_ident("accessors") {
                meta.parse_nested_meta(|method| {
                    out.accessors.push(method_ident(&method.path)?);
                    Ok(())
                })
            } else if meta.path.is_ident("mutators") {
                meta.parse_nested_meta(|method| {
                    out.mutators.push(method_ident(&method.path)?);
                    Ok(())
                })
            } else {
                Err(meta.error("unknown reflect attribute (expected opaque, accessors or mutators)"))
            }
        })?;
    }
    Ok(out)
}

fn field_skipped(attrs: &[Attribute]) -> Result<bool, syn::Error> {
    let mut skip = false;
    for attr in attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown reflect field attribute (expected skip)"))
            }
        })?;
    }
    Ok(skip)
}

fn method_ident(path: &syn::Path) -> Result<Ident, syn::Error> {
    path.get_ident()
        .cloned()
        .ok_or_else(|| syn::Error::new_spanned(path, "expected a method name"))
}

/// Identifier text without a raw `r#` prefix.
fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Add `'static` to every type parameter and `Clone + Default` on the type
/// itself. Generic types also bound each mapped field type by `Reflect`;
/// concrete types do not, so self-referential fields stay legal.
fn with_bounds(generics: &Generics, field_types: &[&Type]) -> Generics {
    let mut generics = generics.clone();
    let mut has_type_params = false;
    for param in &mut generics.params {
        if let GenericParam::Type(param) = param {
            param.bounds.push(parse_quote!('static));
            has_type_params = true;
        }
    }
    let where_clause = generics.make_where_clause();
    where_clause
        .predicates
        .push(parse_quote!(Self: ::core::clone::Clone + ::core::default::Default));
    if !has_type_params {
        return generics;
    }
    for ty in field_types {
        where_clause
            .predicates
            .push(parse_quote!(#ty: ::objmap::Reflect));
    }
    generics
}

fn opaque_impl(name: &Ident, generics: &Generics) -> TokenStream2 {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    quote! {
        impl #impl_generics ::objmap::Reflect for #name #ty_generics #where_clause {
            ::objmap::__reflect_value!();

            fn reflect_ref(&self) -> ::objmap::ReflectRef<'_> {
                ::objmap::ReflectRef::Opaque
            }

            fn reflect_mut(&mut self) -> ::objmap::ReflectMut<'_> {
                ::objmap::ReflectMut::Opaque
            }
        }
    }
}

fn struct_impl(
    name: &Ident,
    generics: &Generics,
    names: &[LitStr],
    idents: &[&Ident],
    attrs: &ContainerAttrs,
) -> TokenStream2 {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let accessor_names: Vec<LitStr> = attrs
        .accessors
        .iter()
        .map(|ident| LitStr::new(&unraw(ident), ident.span()))
        .collect();
    let accessors = &attrs.accessors;

    let mutator_names: Vec<LitStr> = attrs
        .mutators
        .iter()
        .map(|ident| LitStr::new(&unraw(ident), ident.span()))
        .collect();
    let mutators = &attrs.mutators;

    quote! {
        impl #impl_generics ::objmap::Reflect for #name #ty_generics #where_clause {
            ::objmap::__reflect_value!();

            fn reflect_ref(&self) -> ::objmap::ReflectRef<'_> {
                ::objmap::ReflectRef::Struct(self)
            }

            fn reflect_mut(&mut self) -> ::objmap::ReflectMut<'_> {
                ::objmap::ReflectMut::Struct(self)
            }
        }

        impl #impl_generics ::objmap::Struct for #name #ty_generics #where_clause {
            fn field_names(&self) -> &'static [&'static str] {
                &[#(#names),*]
            }

            fn field(&self, __name: &str) -> ::core::option::Option<&dyn ::objmap::Reflect> {
                match __name {
                    #(#names => ::core::option::Option::Some(&self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                __name: &str,
            ) -> ::core::option::Option<&mut dyn ::objmap::Reflect> {
                match __name {
                    #(#names => ::core::option::Option::Some(&mut self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn accessor(
                &self,
                __method: &str,
            ) -> ::core::option::Option<::std::boxed::Box<dyn ::objmap::Reflect>> {
                match __method {
                    #(#accessor_names => ::core::option::Option::Some(
                        ::objmap::reflect::call_accessor(self, Self::#accessors),
                    ),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn mutator_names(&self) -> &'static [&'static str] {
                &[#(#mutator_names),*]
            }

            fn mutator_param(
                &self,
                __method: &str,
            ) -> ::core::option::Option<::std::boxed::Box<dyn ::objmap::Reflect>> {
                match __method {
                    #(#mutator_names => ::core::option::Option::Some(
                        ::objmap::reflect::mutator_param::<Self, _, _>(Self::#mutators),
                    ),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn call_mutator(
                &mut self,
                __method: &str,
                __value: ::std::boxed::Box<dyn ::objmap::Reflect>,
            ) -> ::core::result::Result<(), ::objmap::MapError> {
                match __method {
                    #(#mutator_names => ::objmap::reflect::call_mutator(self, Self::#mutators, __value),)*
                    _ => ::core::result::Result::Err(
                        ::objmap::MapError::FieldNotFound(::std::string::ToString::to_string(__method)),
                    ),
                }
            }
        }
    }
}
