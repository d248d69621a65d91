//! Shared constants for end-to-end tests
//!
//! When the seeded catalog or engagement changes, update only this file
//! and the expected scores below.

// ============================================================================
// Test Users
// ============================================================================

/// The user whose session token the authenticated client carries
pub const TEST_USER: &str = "testuser";

/// Listeners that seed the catalog engagement
pub const LISTENERS: [&str; 4] = ["listener-1", "listener-2", "listener-3", "listener-4"];

// ============================================================================
// Test Catalog
// ============================================================================

pub const QUIET_HARBOR_ID: usize = 1;
pub const QUIET_HARBOR_TITLE: &str = "Quiet Harbor";
pub const QUIET_HARBOR_SLUG: &str = "quiet-harbor";
pub const QUIET_HARBOR_ALBUM: &str = "Low Tide";
pub const QUIET_HARBOR_ARTIST: &str = "The Driftwood";
pub const QUIET_HARBOR_LINK: &str = "https://listen.example.com/quiet-harbor";

pub const PAPER_LANTERNS_ID: usize = 2;
pub const PAPER_LANTERNS_TITLE: &str = "Paper Lanterns";
pub const PAPER_LANTERNS_ALBUM: &str = "Festival";
pub const PAPER_LANTERNS_ARTIST: &str = "Kite Parade";

pub const NORTHERN_LIGHTS_ID: usize = 3;
pub const NORTHERN_LIGHTS_TITLE: &str = "Northern Lights";
pub const NORTHERN_LIGHTS_ALBUM: &str = "Aurora";
pub const NORTHERN_LIGHTS_ARTIST: &str = "Polar Drift";

/// Id no seeded item has
pub const UNKNOWN_MUSIC_ID: usize = 999;

// ============================================================================
// Expected Scores
// ============================================================================

/// 2 never heard it, 1 heard without rating, 1 rated 6.
pub const QUIET_HARBOR_SCORE: f64 = 55.0;

/// 2 ratings, 9 and 7.
pub const PAPER_LANTERNS_SCORE: f64 = 20.0;

/// No engagement.
pub const NORTHERN_LIGHTS_SCORE: f64 = 0.0;

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Share links are built on this host
pub const SHARE_BASE_URL: &str = "undervalued.test";

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
