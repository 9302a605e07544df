/// Declare a config section with its defaults inline
///
/// ```ignore
/// config_struct! {
///     /// HTTP settings
///     pub struct ApiConfig {
///         base_url: String = "https://api.ston.fi".to_string(),
///         timeout_secs: u64 = 10,
///     }
/// }
/// ```
///
/// expands to a struct with public fields, a `Default` impl built from the
/// given expressions, and serde support where every missing key falls back
/// to its default (`#[serde(default)]`).
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
