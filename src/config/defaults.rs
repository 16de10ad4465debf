//! Configuration default values

// Output references
pub const DEFAULT_BASE_URL: &str = "https://example.com";
pub const DEFAULT_GENERATOR_NAME: &str = "Custom EPG Merger";

// Input and output files, relative names resolve against base_dir
pub const DEFAULT_BASE_DIR: &str = ".";
pub const DEFAULT_MAPPING_FILENAME: &str = "mapping.json";
pub const DEFAULT_EPG_SOURCES_FILENAME: &str = "epg_sources.json";
pub const DEFAULT_LOCAL_EPG_FILENAME: &str = "epg.xml";
pub const DEFAULT_LOCAL_M3U_FILENAME: &str = "index.m3u";

// Fetching
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 120;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 1;

// Config file and environment
pub const DEFAULT_CONFIG_FILE: &str = "epg-merge.toml";
pub const ENV_PREFIX: &str = "EPG_MERGE_";
