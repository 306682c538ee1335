/// Diagnostic narration, compiled out unless the `diagnostics` feature is on.
/// Arguments are still type checked but never evaluated in production builds.
macro_rules! diag {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "diagnostics")]
        log::$level!($($arg)+);
        #[cfg(not(feature = "diagnostics"))]
        if false {
            let _ = format_args!($($arg)+);
        }
    };
}
