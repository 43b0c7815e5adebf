//! Declarative helper for the error enums the port traits expose.
//!
//! Every port error in this crate is a braced enum whose variants carry one
//! descriptive field. `define_port_error!` turns that shape into a
//! [`thiserror::Error`] enum plus snake_case constructors accepting any
//! `impl Into` of the field type, so adapters write
//! `UserPersistenceError::query(text)` rather than spelling out the braces.

/// Declares a port error enum together with its constructor shorthands.
///
/// Each variant is written `Name { field: Type } => "display message"`; the
/// message may interpolate the field by name.
macro_rules! define_port_error {
    (
        $(#[$enum_meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $field:ident: $field_ty:ty } => $message:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $field: $field_ty },
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = concat!(
                        "Shorthand constructor for [`",
                        stringify!($name), "::", stringify!($variant),
                        "`].",
                    )]
                    pub fn [<$variant:snake>]($field: impl Into<$field_ty>) -> Self {
                        Self::$variant { $field: $field.into() }
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;
