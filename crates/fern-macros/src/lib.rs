/// String newtype usable across FFI, serde and as a borrowed `&str` lookup key
#[macro_export]
macro_rules! new_type {
    ($name:ident, String) => {
        uniffi::custom_newtype!($name, String);

        #[derive(
            Clone,
            Debug,
            PartialEq,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::derive_more::Deref,
            ::derive_more::Display,
            ::derive_more::From,
            ::derive_more::Into,
            Hash,
            Eq,
            Ord,
            PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}
