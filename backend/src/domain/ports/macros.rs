//! Generates port error enums together with their domain error mapping.
//!
//! Each variant names the [`ErrorCode`](crate::domain::ErrorCode) it surfaces
//! as, so adapters never hand-roll the conversion into
//! [`Error`](crate::domain::Error).

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (@pattern $variant:ident) => { Self::$variant };
    (@pattern $variant:ident { $($field:ident : $ty:ty),* }) => { Self::$variant { .. } };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )?
                    => $code:ident : $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Domain error code this failure surfaces as.
            pub fn code(&self) -> $crate::domain::ErrorCode {
                match self {
                    $(
                        define_port_error!(@pattern $variant $( { $($field : $ty),* } )?)
                            => $crate::domain::ErrorCode::$code,
                    )*
                }
            }
        }

        impl From<$name> for $crate::domain::Error {
            fn from(value: $name) -> Self {
                $crate::domain::Error::new(value.code(), value.to_string())
            }
        }
    };
}

pub(crate) use define_port_error;
