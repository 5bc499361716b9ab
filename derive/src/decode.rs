use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Error, Field, Fields, GenericParam, Ident, LitStr, Result,
    Token,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    parse_quote,
};

pub(crate) fn expand_decode(input: &DeriveInput) -> Result<TokenStream> {
    if let Some(param) = input.generics.lifetimes().next() {
        Err(Error::new_spanned(
            param,
            "`Decode` may not be derived on types with lifetime parameters.",
        ))?
    }

    let ContainerAttribute { from_str } = match find_attribute(&input.attrs) {
        Some(attr) => attr.meta.require_list()?.parse_args()?,
        None => ContainerAttribute::default(),
    };

    let (zero, shape) = if from_str {
        (
            quote! { ::core::default::Default::default() },
            quote! { ::decant::Shape::text() },
        )
    } else {
        expand_struct(input)?
    };

    let mut generics = input.generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(param) = param {
            param.bounds.push(parse_quote!(::decant::Decode));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let name = &input.ident;

    let expanded = quote! {
        impl #impl_generics ::decant::Decode for #name #ty_generics #where_clause {
            fn zero() -> Self {
                #zero
            }

            fn shape() -> ::decant::Shape<Self> {
                #shape
            }
        }
    };

    Ok(expanded.into())
}

fn expand_struct(input: &DeriveInput) -> Result<(TokenStream2, TokenStream2)> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`Decode` may only be derived on structs, unless `#[decode(from_str)]` is given.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`Decode` may only be derived on structs with named fields, unless `#[decode(from_str)]` is given.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .collect::<Result<Vec<_>>>()?;

    let zeros = fields.iter().map(|field| {
        let ident = &field.ident;
        if field.skip {
            quote! { #ident: ::core::default::Default::default() }
        } else {
            quote! { #ident: ::decant::Decode::zero() }
        }
    });

    let descriptions = fields.iter().map(|field| {
        let FieldMetadata {
            ident,
            name,
            rename,
            skip,
            flatten,
        } = field;

        if *skip {
            return quote! { .field(::decant::Field::skipped(#name)) };
        }

        let rename = rename.as_ref().map(|rename| quote! { .rename(#rename) });
        let flatten = flatten.then(|| quote! { .flatten() });

        quote! {
            .field(
                ::decant::Field::new(#name, |this: &mut Self| &mut this.#ident)
                    #rename
                    #flatten
            )
        }
    });

    let zero = quote! {
        Self {
            #(#zeros,)*
        }
    };

    let shape = quote! {
        ::decant::Shape::Struct(
            ::decant::StructShape::new()
                #(#descriptions)*
        )
    };

    Ok((zero, shape))
}

fn find_attribute(attrs: &[Attribute]) -> Option<&Attribute> {
    attrs.iter().find(|a| a.path().is_ident("decode"))
}

#[derive(Debug)]
struct FieldMetadata {
    ident: Ident,
    /// Declared name, without any `r#` prefix.
    name: LitStr,
    rename: Option<LitStr>,
    skip: bool,
    flatten: bool,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Self> {
        let Some(ident) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let name = LitStr::new(&ident.unraw().to_string(), ident.span());

        let FieldAttribute {
            rename,
            skip,
            flatten,
        } = match find_attribute(&field.attrs) {
            Some(attr) => attr.meta.require_list()?.parse_args()?,
            None => FieldAttribute::default(),
        };

        if skip && (rename.is_some() || flatten) {
            Err(Error::new_spanned(
                field,
                "`skip` may not be combined with `rename` or `flatten`.",
            ))?
        }

        Ok(Self {
            ident,
            name,
            rename,
            skip,
            flatten,
        })
    }
}

#[derive(Debug, Default)]
struct FieldAttribute {
    rename: Option<LitStr>,
    skip: bool,
    flatten: bool,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attribute = Self::default();

        while !input.is_empty() {
            let ident = input.parse::<Ident>()?;

            if ident == "rename" {
                input.parse::<Token![=]>()?;
                let rename = input.parse::<LitStr>()?;

                if rename.value().is_empty() {
                    Err(Error::new_spanned(&rename, "Field name must not be empty."))?
                }

                if attribute.rename.replace(rename).is_some() {
                    Err(Error::new_spanned(ident, "Duplicate `rename`."))?
                }
            } else if ident == "skip" {
                attribute.skip = true;
            } else if ident == "flatten" {
                attribute.flatten = true;
            } else {
                Err(Error::new_spanned(
                    ident,
                    "Expected `rename = \"...\"`, `skip` or `flatten`.",
                ))?
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(attribute)
    }
}

#[derive(Debug, Default)]
struct ContainerAttribute {
    from_str: bool,
}

impl Parse for ContainerAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let ident = input.parse::<Ident>()?;

        if ident != "from_str" {
            Err(Error::new_spanned(ident, "Expected `from_str`."))?
        }

        Ok(Self { from_str: true })
    }
}
