use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn set_debug(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Prints only when `--debug` was passed.
#[macro_export]
macro_rules! debug_println {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            println!("[debug] {}", format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! debug_eprintln {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            eprintln!("[debug] {}", format!($($arg)*));
        }
    };
}

/// Always printed. Used for page failures and skipped listings, which must
/// never go unreported.
#[macro_export]
macro_rules! warn_eprintln {
    ($($arg:tt)*) => {
        eprintln!("⚠ {}", format!($($arg)*))
    };
}
