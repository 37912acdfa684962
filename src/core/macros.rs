//! Macros for declaring closed lifecycle vocabularies.

/// Generate a closed, copyable enum with stable display names.
///
/// Each variant maps to the label used in logs and serialized forms. The
/// generated type gets `ALL` (every variant, in declaration order), `name()`
/// and a `Display` implementation.
///
/// # Example
///
/// ```
/// use lifecycle_machines::closed_enum;
///
/// closed_enum! {
///     pub enum Phase {
///         Warmup => "warmup",
///         Running => "running",
///     }
/// }
///
/// assert_eq!(Phase::Running.name(), "running");
/// assert_eq!(Phase::ALL.len(), 2);
/// ```
#[macro_export]
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug,
            serde::Serialize, serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $label)]
                $variant
            ),*
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Stable label for display and logging.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),*
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}
