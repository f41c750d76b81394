//! Build metadata embedded at compile time.

/// Identifier answered for `VERSION`: `<package version>+<short commit>`.
pub const BUILD_ID: &str = env!("BEACON_BUILD_ID");

/// Short git commit the binary was built from, or `unknown`.
pub(crate) const GIT_COMMIT: &str = env!("BEACON_GIT_COMMIT");
