/// A text value that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} value {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of kebab-case string values stored as TEXT.
///
/// The generated enum round-trips through serde, `FromStr` and
/// `TryFrom<String>` (used by `#[sqlx(try_from = "String")]`).
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
        default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::macros::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::macros::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::macros::UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    text_enum! {
        pub enum Shade {
            Light => "light",
            DeepDark => "deep-dark",
        }
        default Light
    }

    #[test]
    fn parses_and_prints_kebab_case() {
        assert_eq!("deep-dark".parse::<Shade>().unwrap(), Shade::DeepDark);
        assert_eq!(Shade::DeepDark.to_string(), "deep-dark");
        assert_eq!(Shade::default(), Shade::Light);
        assert_eq!(Shade::ALL.len(), 2);
    }

    #[test]
    fn unknown_text_is_rejected() {
        let err = Shade::try_from("DeepDark".to_string()).unwrap_err();
        assert_eq!(err.kind, "Shade");
        assert_eq!(err.value, "DeepDark");
    }

    #[test]
    fn serde_uses_the_same_text() {
        let json = serde_json::to_string(&Shade::DeepDark).unwrap();
        assert_eq!(json, "\"deep-dark\"");
        let back: Shade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Shade::DeepDark);
    }
}
