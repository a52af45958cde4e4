//! Canonical default values shared by the client and the CLI.

pub const DEFAULT_BASE_URL: &str = "https://api.systeminit.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SCHEMA_COLOR: &str = "#3B82F6";
pub const DEFAULT_SCHEMA_CATEGORY: &str = "Digital Ocean";
pub const DEFAULT_KEY_FILE: &str = "key";
pub const SCHEMA_GENERATING_STATUS: &str = "generating";
pub const SCHEMA_GENERATING_MESSAGE: &str = "Schema data is being generated from cached modules";

pub const ENV_API_KEY: &str = "SI_API_KEY";
pub const ENV_BASE_URL: &str = "SI_BASE_URL";
pub const ENV_HOME: &str = "SI_HOME";
