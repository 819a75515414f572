//! Build metadata for the core binary

use core_update::version::DEV_VERSION;
use core_update::BuildInfo;

/// Build info stamped at compile time
///
/// `CORE_VERSION` is set by the release pipeline; anything else is a `dev`
/// build, which the update checker always treats as out of date.
pub fn build_info() -> BuildInfo {
    BuildInfo::new(
        stamped(option_env!("CORE_VERSION")).unwrap_or(DEV_VERSION),
        stamped(option_env!("GIT_SHA")).unwrap_or("unknown"),
        stamped(option_env!("BUILD_DATE")).unwrap_or("unknown"),
    )
}

fn stamped(value: Option<&'static str>) -> Option<&'static str> {
    value.filter(|v| !v.trim().is_empty())
}
