// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros shared by the kiln crates.

/// `Display` for a fieldless enum, one fixed string per variant.
///
/// ```ignore
/// crate::simple_display! {
///     JobPhase {
///         Created => "created",
///         Building => "building",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ident { $( $variant:ident => $text:literal ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let text = match self {
                    $( $enum::$variant => $text, )+
                };
                f.write_str(text)
            }
        }
    };
}

/// Test builder for a model struct.
///
/// The builder wraps a fully-populated value. Every field must be listed
/// with its default; each gets an `impl Into` setter. Only compiled for
/// tests and the `test-support` feature.
///
/// ```ignore
/// crate::builder! {
///     BuildJob => BuildJobBuilder {
///         id: BuildId = BuildId::from_string("bld-test"),
///         phase: JobPhase = JobPhase::Created,
///     }
/// }
/// ```
#[macro_export]
macro_rules! builder {
    ($target:ident => $builder:ident { $( $field:ident : $ty:ty = $default:expr ),+ $(,)? }) => {
        #[cfg(any(test, feature = "test-support"))]
        pub struct $builder($target);

        #[cfg(any(test, feature = "test-support"))]
        impl $builder {
            $(
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.0.$field = value.into();
                    self
                }
            )+

            pub fn build(self) -> $target {
                self.0
            }
        }

        #[cfg(any(test, feature = "test-support"))]
        impl $target {
            pub fn builder() -> $builder {
                $builder($target { $( $field: $default, )+ })
            }
        }
    };
}

/// Chained by-value setters for config structs, taking the exact field type.
///
/// ```ignore
/// impl CoordinatorConfig {
///     kiln_core::setters! { progress_timeout: Duration, max_jobs: usize }
/// }
/// ```
#[macro_export]
macro_rules! setters {
    ($( $field:ident : $ty:ty ),+ $(,)?) => {
        $(
            pub fn $field(mut self, $field: $ty) -> Self {
                self.$field = $field;
                self
            }
        )+
    };
}
