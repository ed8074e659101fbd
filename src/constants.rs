//! Shared constants for givenspec
//!
//! Bowling rules and default file locations live here.

// =============================================================================
// BOWLING RULES
// =============================================================================

pub const ALL_PINS: u32 = 10;
pub const FRAMES_PER_GAME: usize = 10;
pub const STRIKE_BONUS_ROLLS: usize = 2;
pub const SPARE_BONUS_ROLLS: usize = 1;

// =============================================================================
// DEFAULT PATHS
// =============================================================================

/// Default path for TOML scenario files
pub const SCENARIOS_DIR: &str = "tests/scenarios";

/// Template runner settings (checked into git)
pub const RUNNER_SETTINGS_TEMPLATE: &str = "config/runner_settings.template.json";
/// Local runner settings (gitignored, user's custom settings)
pub const RUNNER_SETTINGS_FILE: &str = "config/runner_settings.json";

pub const LOG_SETTINGS_FILE: &str = "config/logging.json";

// =============================================================================
// REPORT FORMATTING
// =============================================================================

pub const REPORT_NAME_WIDTH: usize = 48;

/// Stored runs shown by `--history`
pub const HISTORY_LIMIT: u32 = 10;
