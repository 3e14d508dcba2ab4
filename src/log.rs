//  LOG.rs
//    by Lut99
//
//  Created:
//    22 Mar 2024, 16:09:22
//  Last edited:
//    18 Feb 2025, 10:41:12
//  Auto updated?
//    Yes
//
//  Description:
//!   Provides [`log`]-macro counterparts that only log if the `log`-feature is given.
//!
//!   Every shim is generated by [`shim!`], which emits two definitions of the same macro: one that
//!   forwards to the [`log`](https://github.com/rust-lang/log)-crate, and one that only type-checks
//!   its input when the feature is disabled. Arguments are never evaluated in the latter case, so
//!   don't put side effects in log statements.
//


/***** HELPER MACROS *****/
/// Generates a conditional logging macro.
///
/// # Arguments
/// - `$name`: The name of the macro to generate.
/// - `$target`: The name of the macro in the `log`-crate to forward to.
/// - `$dollar`: A literal `$`, which is needed to write the generated macro's own matcher.
macro_rules! shim {
    ($dollar:tt $name:ident => $target:ident) => {
        #[doc = concat!("Mirrors the `", stringify!($target), "!()`-macro from the [`log`](https://github.com/rust-lang/log)-crate.\n\nWith the `log`-feature enabled, this macro has exactly the same behaviour.")]
        #[cfg(feature = "log")]
        #[allow(unused)]
        macro_rules! $name {
            ($dollar($dollar t:tt)*) => {
                ::log::$target!($dollar($dollar t)*)
            };
        }
        #[doc = concat!("Mirrors the `", stringify!($target), "!()`-macro from the [`log`](https://github.com/rust-lang/log)-crate.\n\nWith the `log`-feature disabled, this macro does nothing at runtime.")]
        #[cfg(not(feature = "log"))]
        #[allow(unused)]
        macro_rules! $name {
            ($dollar($dollar t:tt)*) => {
                if false {
                    let _ = ::std::format_args!($dollar($dollar t)*);
                }
            };
        }
        #[allow(unused)]
        pub(crate) use $name;
    };
}





/***** LIBRARY *****/
shim!($ warning => warn);
#[allow(unused)]
pub(crate) use warning as warn;

shim!($ info => info);
shim!($ debug => debug);
shim!($ trace => trace);
