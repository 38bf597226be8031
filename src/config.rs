#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub redis_url: Option<String>,
    pub session_ttl_seconds: u64,
    pub session_key_prefix: String,
    pub cookie_secure: bool,
    pub cookie_domain: Option<String>,

    // Plan assigned to every new account at registration.
    pub default_plan_name: String,

    pub change_feed_capacity: usize,
    pub lease_expiry_warning_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3333,
            redis_url: None,
            session_ttl_seconds: 60 * 60 * 24 * 7,
            session_key_prefix: "landlord-api".to_string(),
            cookie_secure: false,
            cookie_domain: None,
            default_plan_name: "Free".to_string(),
            change_feed_capacity: 256,
            lease_expiry_warning_days: 30,
        }
    }
}
