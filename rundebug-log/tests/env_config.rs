//! Environment configuration without an explicit `init()`.
//!
//! Kept in its own test binary so no other test reads the level first.

use rundebug_log::{Level, current_level, is_debug_enabled, set_debug, set_level, warn};

#[test]
fn test_env_level_applies_without_init() {
    unsafe {
        std::env::set_var("RUNDEBUG_LOG_LEVEL", "debug");
        std::env::remove_var("RUNDEBUG_LOG_DEBUG");
    }

    assert!(is_debug_enabled());
    assert_eq!(current_level(), Level::Debug);

    // An override sticks once the environment has been read.
    set_level(Level::Error);
    warn!("not shown");
    assert_eq!(current_level(), Level::Error);
    assert!(!is_debug_enabled());

    set_debug(true);
    assert_eq!(current_level(), Level::Debug);
    set_debug(false);
    assert_eq!(current_level(), Level::Info);
}
