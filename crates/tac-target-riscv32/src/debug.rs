//! Debug logging infrastructure for register allocation.
//!
//! Feature-gated logging that compiles to nothing when the `debug-regalloc`
//! feature is disabled, so release builds carry no cost.

/// Debug logging macro that compiles to nothing when the `debug-regalloc`
/// feature is disabled.
///
/// # Examples
///
/// ```ignore
/// debug_regalloc!("sweep {}: {} stack objects", sweeps, self.stack_objects.len());
/// ```
#[cfg(feature = "debug-regalloc")]
#[macro_export]
macro_rules! debug_regalloc {
    ($($arg:tt)*) => {
        {
            #[cfg(test)]
            {
                extern crate std;
                std::eprintln!("[regalloc] {}", core::format_args!($($arg)*));
            }
            #[cfg(not(test))]
            {
                let _ = core::format_args!($($arg)*);
            }
        }
    };
}

/// Debug logging macro that compiles to nothing when the `debug-regalloc`
/// feature is disabled.
#[cfg(not(feature = "debug-regalloc"))]
#[macro_export]
macro_rules! debug_regalloc {
    ($($arg:tt)*) => {};
}
