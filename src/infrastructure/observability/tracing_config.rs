/// Configuration for tracing initialization.
pub struct TracingConfig {
    pub environment: String,
    /// Filter directive used when `RUST_LOG` is not set, e.g. `info`.
    pub default_level: String,
    pub json_format: bool,
}
