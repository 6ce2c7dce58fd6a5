pub const SOCKET_ADDRESS: &str = "/run/docker/plugins/local-mapping.sock";

pub const STATE_DIR: &str = "/mnt/state/";

/// Environment flag that turns on verbose diagnostics.
pub const DEBUG_ENV: &str = "DEBUG";

/// Parse a boolean flag the way the docker tooling does: `1`, `t`, `true`
/// (any of the usual casings) and their negative counterparts.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

pub fn debug_enabled(value: Option<&str>) -> bool {
    value.and_then(parse_bool).unwrap_or(false)
}
