use darling::FromDeriveInput;
use darling::FromField;
use darling::ast::Style;
use proc_macro2::Ident;
use proc_macro2::TokenStream as TokenStream2;
use quote::ToTokens;
use quote::quote;
use syn::DeriveInput;
use syn::Type;

#[derive(Debug, FromField)]
#[darling(forward_attrs(morm))]
struct FieldReceiver {
    pub ident: Option<Ident>,
    pub ty:    Type,
    pub attrs: Vec<syn::Attribute>,
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(morm), supports(struct_any))]
struct EntityReceiver {
    pub ident:    Ident,
    pub generics: syn::Generics,
    pub data:     darling::ast::Data<(), FieldReceiver>,

    #[darling(default)]
    pub custom_table_name: bool,
}

#[derive(Debug)]
struct FieldInfo {
    pub field_name:  Ident,
    pub field_type:  Type,
    pub tag:         Option<String>,
    pub is_optional: bool,
}

#[derive(Debug)]
struct EntityInfo {
    pub struct_name:       Ident,
    pub shape:             TokenStream2,
    pub custom_table_name: bool,
    pub fields:            Vec<FieldInfo>,
}

impl FieldReceiver {
    fn to_field_info(self) -> syn::Result<Option<FieldInfo>> {
        let Some(field_name) = self.ident else {
            return Ok(None);
        };

        Ok(Some(FieldInfo {
            field_name,
            is_optional: is_option_type(&self.ty),
            tag: tag_of(&self.attrs)?,
            field_type: self.ty,
        }))
    }
}

impl EntityReceiver {
    fn to_entity_info(self) -> syn::Result<EntityInfo> {
        if !self.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(&self.generics, "morm entities cannot be generic"));
        }

        let data = self
            .data
            .take_struct()
            .ok_or_else(|| syn::Error::new_spanned(&self.ident, "morm entities must be structs"))?;

        let shape = match data.style {
            Style::Struct => quote! { morm::EntityShape::NamedStruct },
            Style::Tuple => quote! { morm::EntityShape::TupleStruct },
            Style::Unit => quote! { morm::EntityShape::UnitStruct },
        };

        let mut fields = Vec::new();
        for field in data.fields {
            if let Some(info) = field.to_field_info()? {
                fields.push(info);
            }
        }

        Ok(EntityInfo { struct_name: self.ident, shape, custom_table_name: self.custom_table_name, fields })
    }
}

/// Reads `#[morm = "column=name"]` off a field.
fn tag_of(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    for attr in attrs.iter().filter(|a| a.path().is_ident("morm")) {
        if let syn::Meta::NameValue(nv) = &attr.meta {
            if let syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Str(s), .. }) = &nv.value {
                return Ok(Some(s.value()));
            }
        }
        return Err(syn::Error::new_spanned(attr, "expected #[morm = \"key=value\"]"));
    }
    Ok(None)
}

#[proc_macro_derive(Entity, attributes(morm))]
pub fn derive_entity(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    let receiver = match EntityReceiver::from_derive_input(&input) {
        Ok(r) => r,
        Err(e) => return e.write_errors().into(),
    };

    match receiver.to_entity_info() {
        Ok(entity_info) => impl_entity(&entity_info).into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn impl_entity(entity_info: &EntityInfo) -> TokenStream2 {
    let name = &entity_info.struct_name;
    let type_name = name.to_string();
    let shape = &entity_info.shape;

    let descriptors: Vec<_> = entity_info
        .fields
        .iter()
        .map(|f| {
            let field_name = &f.field_name;
            let field_type = &f.field_type;
            let field_str = field_name.to_string();
            let type_str = field_type.to_token_stream().to_string().replace(' ', "");
            let column_type = rust_type_to_column_type(field_type, f.is_optional);
            let tag = match &f.tag {
                Some(tag) => quote! { Some(#tag) },
                None => quote! { None },
            };

            quote! {
                morm::FieldDescriptor {
                    name: #field_str,
                    tag: #tag,
                    offset: ::core::mem::offset_of!(#name, #field_name),
                    type_name: #type_str,
                    column_type: #column_type,
                    accessor: {
                        unsafe fn read(field: *const u8) -> morm::Value {
                            let field = unsafe { &*field.cast::<#field_type>() };
                            morm::IntoValue::into_value(::core::clone::Clone::clone(field))
                        }

                        unsafe fn write(field: *mut u8, value: morm::Value) -> morm::Result<()> {
                            let decoded: #field_type = morm::FromValue::from_value(value)?;
                            unsafe { *field.cast::<#field_type>() = decoded };
                            Ok(())
                        }

                        unsafe { morm::RawAccessor::new(read, write) }
                    },
                }
            }
        })
        .collect();

    let field_value_arms: Vec<_> = entity_info
        .fields
        .iter()
        .map(|f| {
            let field_name = &f.field_name;
            let field_str = field_name.to_string();
            quote! {
                #field_str => Some(morm::IntoValue::into_value(::core::clone::Clone::clone(&self.#field_name)))
            }
        })
        .collect();

    let set_field_arms: Vec<_> = entity_info
        .fields
        .iter()
        .map(|f| {
            let field_name = &f.field_name;
            let field_str = field_name.to_string();
            quote! {
                #field_str => {
                    self.#field_name = morm::FromValue::from_value(value)?;
                    Ok(())
                }
            }
        })
        .collect();

    let custom_table_name = if entity_info.custom_table_name {
        quote! {
            fn custom_table_name() -> Option<String> {
                Some(morm::TableName::table_name(&<Self as ::core::default::Default>::default()))
            }
        }
    } else {
        quote! {}
    };

    quote! {
        impl morm::Entity for #name {
            fn descriptor() -> morm::EntityDescriptor {
                morm::EntityDescriptor {
                    type_name: #type_name,
                    shape: #shape,
                    fields: vec![#(#descriptors),*],
                }
            }

            #custom_table_name

            #[allow(unused_variables)]
            fn field_value(&self, field: &str) -> Option<morm::Value> {
                match field {
                    #(#field_value_arms,)*
                    _ => None,
                }
            }

            #[allow(unused_variables, unreachable_code)]
            fn set_field(&mut self, field: &str, value: morm::Value) -> morm::Result<()> {
                match field {
                    #(#set_field_arms)*
                    _ => Err(morm::Error::UnknownField { name: field.to_string() }),
                }
            }
        }
    }
}

fn rust_type_to_column_type(ty: &Type, is_optional: bool) -> TokenStream2 {
    let inner_type = if is_optional { extract_option_inner_type(ty).unwrap_or(ty) } else { ty };

    let Type::Path(type_path) = inner_type else {
        return quote! { morm::ColumnType::Text };
    };
    let Some(segment) = type_path.path.segments.last() else {
        return quote! { morm::ColumnType::Text };
    };

    match segment.ident.to_string().as_str() {
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "bool" => quote! { morm::ColumnType::Integer },
        "f32" | "f64" => quote! { morm::ColumnType::Float },
        "Vec" if is_byte_vec(inner_type) => quote! { morm::ColumnType::Blob },
        "Value" => quote! { morm::ColumnType::Null },
        _ => quote! { morm::ColumnType::Text },
    }
}

fn first_generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first()? {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn extract_option_inner_type(ty: &Type) -> Option<&Type> {
    first_generic_argument(ty, "Option")
}

fn is_byte_vec(ty: &Type) -> bool {
    matches!(
        first_generic_argument(ty, "Vec"),
        Some(Type::Path(inner)) if inner.path.segments.last().is_some_and(|seg| seg.ident == "u8")
    )
}

fn is_option_type(ty: &Type) -> bool {
    extract_option_inner_type(ty).is_some()
}
