//! Helper macro for port error enums.
//!
//! Every variant carries one adapter-supplied `message` and displays as
//! `"<summary>: <message>"`. A snake_case constructor taking
//! `impl Into<String>` is generated for each variant.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $summary:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error("{}: {}", $summary, .message)]
                $variant {
                    /// Adapter-supplied detail.
                    message: String,
                },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                        Self::$variant {
                            message: message.into(),
                        }
                    }
                }
            )*
        }
    };
}

pub(crate) use define_port_error;
