//! Helper macro for generating domain port error enums.

/// Define a port error enum with `thiserror` display strings and
/// snake_case convenience constructors accepting `impl Into<T>` fields.
macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
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

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($( $($field: impl Into<$ty>),* )?) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        /// Example error for macro coverage.
        pub enum ExamplePortError {
            /// Carries a message.
            Failed { message: String } => "failed: {message}",
            /// Unit variant.
            Missing => "missing",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExamplePortError::failed("boom");
        assert_eq!(err.to_string(), "failed: boom");
    }

    #[test]
    fn unit_variants_get_constructors_too() {
        let err = ExamplePortError::missing();
        assert_eq!(err.to_string(), "missing");
    }
}
