/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

#[macro_use]
extern crate quote;
extern crate darling;

use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Ident, Path, Type};

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(writer))]
struct DataWriterOptions {
    name: Option<String>,
    table: String,
    #[darling(default)]
    impl_full_request: bool,
}

#[derive(Debug, FromField)]
#[darling(attributes(writer), forward_attrs(validate))]
struct DataWriterFieldOptions {
    ident: Option<Ident>,
    ty: Type,
    attrs: Vec<Attribute>,
    #[darling(default)]
    skip: bool,
    #[darling(default)]
    skip_full: bool,
    full: Option<Path>,
    #[darling(default)]
    editable: bool,
}

/// Derives a `Write<Name>` builder which creates a record in the configured table or, with a
/// target set, merges the present fields into it. `impl_full_request` additionally derives a
/// `Write<Name>Request` body for creation (fields marked `full = "path::to::fn"` are filled by
/// calling that function instead), `editable` fields end up in an `Edit<Name>` body.
/// `#[validate(..)]` attributes of the fields are forwarded to both bodies.
#[proc_macro_derive(DataWriter, attributes(writer, validate))]
pub fn data_writer_macro_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let input_ident = &input.ident;
    let options = match DataWriterOptions::from_derive_input(&input) {
        Ok(options) => options,
        Err(error) => return error.write_errors().into(),
    };
    let table = &options.table;

    let writer_ident = match options.name {
        Some(name) => format_ident!("{}", name),
        None => format_ident!("Write{}", input_ident),
    };

    let fields = match input.data {
        Data::Struct(data) => data.fields,
        _ => {
            return syn::Error::new_spanned(input_ident, "DataWriter expects a struct")
                .to_compile_error()
                .into()
        }
    };

    let mut field_names = Vec::<Ident>::new();
    let mut field_types = Vec::<Type>::new();

    let mut full_field_names = Vec::<Ident>::new();
    let mut full_field_types = Vec::<Type>::new();
    let mut full_field_attrs = Vec::<Vec<Attribute>>::new();

    let mut full_field_default_names = Vec::<Ident>::new();
    let mut full_field_default_path = Vec::<Path>::new();

    let mut editable_field_names = Vec::<Ident>::new();
    let mut editable_field_types = Vec::<Type>::new();
    let mut editable_field_attrs = Vec::<Vec<Attribute>>::new();
    let mut editable_field_setter = Vec::<Ident>::new();

    for field in fields.iter() {
        let options = match DataWriterFieldOptions::from_field(field) {
            Ok(options) => options,
            Err(error) => return error.write_errors().into(),
        };
        if options.skip {
            continue;
        }
        let ident = match options.ident {
            Some(ident) => ident,
            None => {
                return syn::Error::new_spanned(input_ident, "DataWriter expects named fields")
                    .to_compile_error()
                    .into()
            }
        };

        field_names.push(ident.clone());
        field_types.push(options.ty.clone());

        if !options.skip_full {
            if let Some(path) = options.full {
                full_field_default_names.push(ident.clone());
                full_field_default_path.push(path);
            } else {
                full_field_names.push(ident.clone());
                full_field_types.push(options.ty.clone());
                full_field_attrs.push(options.attrs.clone());
            }
        }

        if options.editable {
            editable_field_setter.push(format_ident!("set_{}", ident));
            editable_field_names.push(ident);
            editable_field_types.push(options.ty);
            editable_field_attrs.push(options.attrs);
        }
    }

    let full_request = if options.impl_full_request && !full_field_names.is_empty() {
        let full_request = format_ident!("{}Request", &writer_ident);

        quote! {
            #[derive(Deserialize, Clone, Debug, ::validator::Validate)]
            #[serde(rename_all = "camelCase")]
            pub struct #full_request {
                #(
                    #(#full_field_attrs)*
                    pub #full_field_names: #full_field_types,
                )*
            }

            impl<'a> #writer_ident<'a> {
                pub fn with_request(&mut self, request: #full_request) -> &mut Self {
                    #(
                        self.#full_field_names = Some(request.#full_field_names);
                    )*

                    #(
                        self.#full_field_default_names = Some(#full_field_default_path());
                    )*

                    self
                }
            }
        }
    } else {
        quote! {}
    };

    let editable = if !editable_field_names.is_empty() {
        let editable_ident = format_ident!("Edit{}", input_ident);

        quote! {
            #[derive(Deserialize, Debug, Clone, Default, ::validator::Validate)]
            #[serde(rename_all = "camelCase")]
            pub struct #editable_ident {
                #(
                    #(#editable_field_attrs)*
                    #[serde(default)]
                    pub #editable_field_names: Option<#editable_field_types>,
                )*
            }

            impl #editable_ident {
                pub fn to_writer<'a>(
                    self,
                    connection: &'a crate::prelude::DatabaseConnection,
                ) -> #writer_ident<'a> {
                    #writer_ident::from(connection)
                        #(
                            .#editable_field_setter(self.#editable_field_names)
                        )*
                        .to_owned()
                }
            }
        }
    } else {
        quote! {}
    };

    let expanded = quote! {
        #[derive(Clone, Serialize, Setters)]
        #[serde(rename_all = "camelCase")]
        #[set = "pub"]
        pub struct #writer_ident<'a> {
            #(
                #[serde(skip_serializing_if = "Option::is_none")]
                #field_names: Option<#field_types>,
            )*
            #[serde(skip)]
            connection: &'a crate::prelude::DatabaseConnection,
            #[serde(skip)]
            target: Option<&'a crate::prelude::Id>,
        }

        impl<'a> From<&'a crate::prelude::DatabaseConnection> for #writer_ident<'a> {
            fn from(connection: &'a crate::prelude::DatabaseConnection) -> Self {
                Self {
                    connection,
                    target: None,
                    #(
                        #field_names: None,
                    )*
                }
            }
        }

        impl<'a> ::std::future::IntoFuture for #writer_ident<'a> {
            type Output = crate::error::Result<#input_ident>;
            type IntoFuture = ::std::pin::Pin<
                Box<dyn ::std::future::Future<Output = Self::Output> + Send + Sync + 'a>,
            >;

            fn into_future(self) -> Self::IntoFuture {
                Box::pin(async move {
                    let connection = self.connection;

                    let result: Option<#input_ident> = match self.target {
                        Some(target) => crate::sql_span!(
                            connection.update(target.to_thing()).merge(self).await?,
                            concat!("update ", #table)
                        ),
                        None => crate::sql_span!(
                            connection
                                .create(#table)
                                .content(self)
                                .await?
                                .into_iter()
                                .next(),
                            concat!("create ", #table)
                        ),
                    };

                    result.ok_or_else(|| {
                        crate::error::ApplicationError::NotFound(
                            concat!(#table, " not found").to_owned(),
                        )
                    })
                })
            }
        }

        #full_request

        #editable
    };

    expanded.into()
}
