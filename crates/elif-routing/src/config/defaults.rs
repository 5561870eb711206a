//! Default configuration values

pub struct RoutingDefaults;

impl RoutingDefaults {
    pub const LOWERCASE_URLS: bool = false;
    pub const LOWERCASE_QUERY_STRINGS: bool = false;
    pub const APPEND_TRAILING_SLASH: bool = false;
    /// No limit on the number of request path segments
    pub const MAX_PATH_SEGMENTS: Option<usize> = None;
}
