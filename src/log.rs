use std::sync::Mutex;

use lazy_static::lazy_static;

lazy_static! {
    static ref VERBOSE: Mutex<bool> = Mutex::new(false);
}

pub fn set_verbose(verb: bool) {
    if let Ok(mut var) = VERBOSE.lock() {
        *var = verb;
    }
}

pub fn get_verbose() -> bool {
    VERBOSE.lock().map(|v| *v).unwrap_or(false)
}

// tt - TokenTree
// ($($arg:tt)*) Variable number of tts
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {{
        if $crate::log::get_verbose() {
            eprint!($($arg)*);
        }
    }};
}

#[macro_export]
macro_rules! verboseln {
    ($($arg:tt)*) => {{
        if $crate::log::get_verbose() {
            eprintln!($($arg)*);
        }
    }};
}
