//! Shared constants for test infrastructure

// Version constants
pub const VERSION_1_0_0: &str = "1.0.0";
pub const VERSION_1_2_0: &str = "1.2.0";
pub const VERSION_DEV: &str = "dev";

// Tag constants (with 'v' prefix)
pub const TAG_V1_0_0: &str = "v1.0.0";
pub const TAG_V1_2_0: &str = "v1.2.0";

// Repository used by the mock release host
pub const TEST_OWNER: &str = "test";
pub const TEST_REPO: &str = "test";
pub const LATEST_RELEASE_PATH: &str = "/repos/test/test/releases/latest";

// Asset names for the fixed test platform
pub const TEST_OS: &str = "linux";
pub const TEST_ARCH: &str = "amd64";
pub const ASSET_LINUX_AMD64: &str = "core-linux-amd64";
pub const ASSET_DARWIN_ARM64: &str = "core-darwin-arm64";
pub const ASSET_WINDOWS_AMD64: &str = "core-windows-amd64.exe";
pub const ASSET_CHECKSUMS: &str = "checksums.txt";

// Paths served by the mock host
pub const BINARY_PATH: &str = "/download/core-linux-amd64";
pub const CHECKSUMS_PATH: &str = "/download/checksums.txt";

// Binary content for testing
pub const FAKE_BINARY_CONTENT: &[u8] = b"updated binary content v1.2.0";
pub const ORIGINAL_CONTENT: &[u8] = b"original binary content v1.0.0";

pub const RELEASE_NOTES: &str = "## Version 1.2.0\n- New features\n- Bug fixes";

// Checksum constants
pub const WRONG_CHECKSUM: &str = "0000000000000000000000000000000000000000000000000000000000000000";
