use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Type};

// derive_model
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let ident = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        let err = Error::new_spanned(&input.generics, "Model cannot be derived for generic types");
        return err.to_compile_error();
    }

    let fields = if let Data::Struct(data) = &input.data {
        if let Fields::Named(named) = &data.fields {
            &named.named
        } else {
            let err = Error::new_spanned(
                &data.fields,
                "Model can only be derived for structs with named fields",
            );
            return err.to_compile_error();
        }
    } else {
        let err = Error::new_spanned(
            &input.ident,
            "Model can only be derived for structs with named fields",
        );
        return err.to_compile_error();
    };

    let model_name = ident.to_string();
    let fields_ident = format_ident!("{ident}Fields");

    let get_value_arms = fields.iter().map(|field| {
        let field_ident = field.ident.as_ref().expect("named field");
        let field_name = field_ident.to_string();

        quote! {
            #field_name => Some(FieldValue::to_value(&self.#field_ident)),
        }
    });

    let to_value_inserts = fields.iter().map(|field| {
        let field_ident = field.ident.as_ref().expect("named field");
        let field_name = field_ident.to_string();

        quote! {
            entries.insert(#field_name.to_string(), FieldValue::to_value(&self.#field_ident));
        }
    });

    // Missing keys read as Null so optional fields decode; extra keys are ignored.
    let from_value_fields = fields.iter().map(|field| {
        let field_ident = field.ident.as_ref().expect("named field");
        let field_name = field_ident.to_string();

        quote! {
            #field_ident: FieldValue::from_value(entries.get(#field_name).unwrap_or(&Value::Null))?,
        }
    });

    let schema_fields = fields.iter().map(|field| {
        let field_name = field.ident.as_ref().expect("named field").to_string();
        let field_ty = &field.ty;

        quote! {
            ::siftdb::schema::FieldSchema {
                name: #field_name,
                ty: <#field_ty as ::siftdb::traits::FieldValue>::field_type(),
            }
        }
    });

    let accessors = fields.iter().map(|field| {
        let field_ident = field.ident.as_ref().expect("named field");
        let field_name = field_ident.to_string();
        let field_ty = &field.ty;

        match classify_field(field_ty) {
            FieldShape::Leaf => quote! {
                #vis fn #field_ident(&self) -> ::siftdb::field::Field<R, #field_ty> {
                    ::siftdb::field::Field::new(self.prefix.child(#field_name))
                }
            },
            FieldShape::Record(path) => {
                let fields_path = fields_path(path);

                quote! {
                    #vis fn #field_ident(&self) -> #fields_path<R> {
                        #fields_path::from_prefix(self.prefix.child(#field_name))
                    }
                }
            }
            FieldShape::OptionalRecord(path) => {
                let fields_path = fields_path(path);

                quote! {
                    #vis fn #field_ident(&self) -> #fields_path<R> {
                        #fields_path::from_prefix(self.prefix.child(#field_name).some())
                    }
                }
            }
        }
    });

    quote! {
        impl ::siftdb::traits::FieldValues for #ident {
            fn get_value(&self, field: &str) -> Option<::siftdb::value::Value> {
                use ::siftdb::traits::FieldValue;

                match field {
                    #(#get_value_arms)*
                    _ => None,
                }
            }
        }

        impl ::siftdb::traits::FieldValue for #ident {
            fn field_type() -> ::siftdb::schema::FieldType {
                ::siftdb::schema::FieldType::Struct(<Self as ::siftdb::traits::Model>::schema)
            }

            fn to_value(&self) -> ::siftdb::value::Value {
                use ::siftdb::{traits::FieldValue, value::Value};

                let mut entries = ::std::collections::BTreeMap::new();
                #(#to_value_inserts)*

                Value::Map(entries)
            }

            fn from_value(value: &::siftdb::value::Value) -> Option<Self> {
                use ::siftdb::{traits::FieldValue, value::Value};

                let Value::Map(entries) = value else {
                    return None;
                };

                Some(Self {
                    #(#from_value_fields)*
                })
            }
        }

        impl ::siftdb::traits::Model for #ident {
            const MODEL_NAME: &'static str = #model_name;

            fn schema() -> &'static ::siftdb::schema::ModelSchema {
                static SCHEMA: ::std::sync::LazyLock<::siftdb::schema::ModelSchema> =
                    ::std::sync::LazyLock::new(|| ::siftdb::schema::ModelSchema {
                        name: #model_name,
                        fields: Vec::from([#(#schema_fields),*]),
                    });

                &SCHEMA
            }
        }

        impl #ident {
            #vis fn fields() -> #fields_ident<#ident> {
                #fields_ident::from_prefix(::siftdb::path::FieldPath::root())
            }
        }

        #vis struct #fields_ident<R> {
            prefix: ::siftdb::path::FieldPath,
            _marker: ::std::marker::PhantomData<fn() -> R>,
        }

        impl<R> #fields_ident<R> {
            #vis fn from_prefix(prefix: ::siftdb::path::FieldPath) -> Self {
                Self {
                    prefix,
                    _marker: ::std::marker::PhantomData,
                }
            }

            #(#accessors)*
        }
    }
}

///
/// FieldShape
///
/// How a field surfaces on the generated accessor struct: leaf fields get a
/// typed `Field` handle, nested records get the record's own accessor struct,
/// unwrapped through `?` when the field is optional.
///

enum FieldShape<'a> {
    Leaf,
    Record(&'a syn::Path),
    OptionalRecord(&'a syn::Path),
}

const LEAF_IDENTS: &[&str] = &[
    "bool", "i64", "u64", "Float64", "String", "Bytes", "Vec", "BTreeMap",
];

fn classify_field(ty: &Type) -> FieldShape<'_> {
    let Type::Path(path) = ty else {
        return FieldShape::Leaf;
    };
    let Some(segment) = path.path.segments.last() else {
        return FieldShape::Leaf;
    };

    if segment.ident == "Option" {
        if let Some(inner) = option_inner(&segment.arguments)
            && let Type::Path(inner_path) = inner
            && !is_leaf_path(&inner_path.path)
        {
            return FieldShape::OptionalRecord(&inner_path.path);
        }

        FieldShape::Leaf
    } else if is_leaf_path(&path.path) {
        FieldShape::Leaf
    } else {
        FieldShape::Record(&path.path)
    }
}

fn option_inner(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };

    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn is_leaf_path(path: &syn::Path) -> bool {
    path.segments.last().is_some_and(|segment| {
        LEAF_IDENTS.contains(&segment.ident.to_string().as_str()) || segment.ident == "Option"
    })
}

// The accessor struct lives next to the record it was derived for, so a
// qualified field type maps to the same path with `Fields` appended.
fn fields_path(path: &syn::Path) -> syn::Path {
    let mut path = path.clone();

    if let Some(segment) = path.segments.last_mut() {
        segment.ident = format_ident!("{}Fields", segment.ident);
        segment.arguments = PathArguments::None;
    }

    path
}
