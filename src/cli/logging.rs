// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::sync::atomic::{AtomicU8, Ordering};

/// How much the CLI prints to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Verbosity {
    /// Only warnings and errors (stdout is reserved for machine output).
    Quiet = 0,
    /// Results and warnings.
    Normal = 1,
    /// Everything, including per-stage details.
    Verbose = 2,
}

/// Global verbosity level.
static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

/// Set the global verbosity level.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Current global verbosity level.
pub fn verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        1 => Verbosity::Normal,
        _ => Verbosity::Verbose,
    }
}

/// Check if verbose output is enabled.
pub fn is_verbose() -> bool {
    verbosity() >= Verbosity::Verbose
}

/// Check if regular output is enabled.
pub fn is_enabled() -> bool {
    verbosity() >= Verbosity::Normal
}

/// Macro for standard info messages.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        if $crate::cli::logging::is_enabled() {
            println!("{}", format!($($arg)*));
        }
    }
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        use colored::Colorize;
        eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
    }
}

/// Macro for error messages.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), format!($($arg)*));
    }
}

/// Macro for success messages.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        use colored::Colorize;
        if $crate::cli::logging::is_enabled() {
            println!("{} {}", "✅".green(), format!($($arg)*));
        }
    }
}

/// Macro for verbose messages.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::cli::logging::is_verbose() {
            println!("{}", format!($($arg)*));
        }
    }
}

/// Macro for section headers.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {
        use colored::Colorize;
        if $crate::cli::logging::is_enabled() {
            println!();
            println!("{}", format!($($arg)*).cyan().bold());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        set_verbosity(Verbosity::Verbose);
        assert!(is_verbose());
        assert!(is_enabled());

        set_verbosity(Verbosity::Normal);
        assert!(!is_verbose());
        assert!(is_enabled());

        set_verbosity(Verbosity::Quiet);
        assert!(!is_enabled());
        assert_eq!(verbosity(), Verbosity::Quiet);

        set_verbosity(Verbosity::Normal);
    }
}
