//! Application constants for Client Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Remote sources for the manifest, libraries and the object store
pub mod sources {
    /// Version id of the default manifest (also its cache key on disk)
    pub const DEFAULT_VERSION_ID: &str = "1.21.5";

    /// Default manifest URL
    pub const DEFAULT_MANIFEST_URL: &str = "https://piston-meta.mojang.com/v1/packages/a0645da8cf4e89da6baaab8e08b7ca64b7f4b0cf/1.21.5.json";

    /// Base URL of the content-addressed asset object store
    pub const RESOURCES_BASE_URL: &str = "https://resources.download.minecraft.net";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "Client-Fetcher/0.1.0 (Game Bootstrapper)";

    /// Default request timeout (covers streaming the whole body)
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 20;
}

/// Retry configuration
pub mod limits {
    /// Maximum retry attempts for failed requests
    pub const MAX_RETRIES: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 500;

    /// Jitter factor for randomizing delays (0.0-1.0)
    pub const BACKOFF_JITTER_FACTOR: f64 = 0.1;
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic downloads
    pub const TEMP_FILE_SUFFIX: &str = ".part";

    /// Read chunk size for streaming hash computation (8KB)
    pub const HASH_CHUNK_SIZE: usize = 8 * 1024;

    /// Entries under this prefix in native archives are metadata only
    pub const ARCHIVE_METADATA_PREFIX: &str = "META-INF/";

    /// Concurrent local digest checks during task collection
    pub const PRECHECK_CONCURRENCY: usize = 16;
}

/// On-disk layout below the base directory
pub mod layout {
    /// Default base directory (relative to the working directory)
    pub const DEFAULT_BASE_DIR: &str = "llauncher";

    /// Game directory below the base directory
    pub const GAME_DIR: &str = ".minecraft";

    /// Cached manifests, keyed by version id
    pub const MANIFEST_DIR: &str = "manifest";

    /// Library root
    pub const LIBRARIES_DIR: &str = "libraries";

    /// Asset root
    pub const ASSETS_DIR: &str = "assets";

    /// Asset index cache below the asset root
    pub const INDEXES_DIR: &str = "indexes";

    /// Content-addressed object store below the asset root
    pub const OBJECTS_DIR: &str = "objects";

    /// Extracted native libraries
    pub const NATIVES_DIR: &str = "natives";

    /// Client binary file name
    pub const CLIENT_JAR: &str = "client.jar";
}

/// Worker and concurrency configuration
pub mod workers {
    /// Default number of concurrent fetches
    pub const DEFAULT_PARALLELISM: usize = 10;

    /// Lowest parallelism accepted from settings
    pub const MIN_PARALLELISM: usize = 3;

    /// Highest parallelism accepted from settings
    pub const MAX_PARALLELISM: usize = 20;
}

/// Progress reporting and monitoring
pub mod progress {
    use super::Duration;

    /// Observer polling cadence
    pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Bounded wait when joining the observer at run end
    pub const OBSERVER_JOIN_TIMEOUT: Duration = Duration::from_millis(500);

    /// Maximum width for file names in the progress line
    pub const MAX_FILENAME_WIDTH: usize = 48;
}

/// Asset filtering heuristics
pub mod assets {
    /// Average object size used to estimate space saved by skipped assets
    pub const AVERAGE_ASSET_SIZE_BYTES: u64 = 15 * 1024;
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

// Re-export commonly used constants for convenience
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use limits::MAX_RETRIES;
pub use workers::DEFAULT_PARALLELISM;
