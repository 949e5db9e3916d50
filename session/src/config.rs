use std::time::Duration;

/// Think-time budgets handed to the engine, per kind of request.
#[derive(Debug, Clone)]
pub struct PlayConfig {
    /// Interactive games started with `start_game`.
    pub move_time: Duration,
    /// Anonymous solo games.
    pub solo_move_time: Duration,
    /// `analyze` requests.
    pub analysis_move_time: Duration,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            move_time: Duration::from_millis(500),
            solo_move_time: Duration::from_millis(2000),
            analysis_move_time: Duration::from_millis(2000),
        }
    }
}

/// Bounds on how many sessions the registry keeps alive.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of live sessions. The least recently used one is evicted
    /// to make room for a new one.
    pub capacity: usize,
    /// Sessions untouched for this long are evicted.
    pub idle_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            idle_timeout: Duration::from_secs(60 * 60),
        }
    }
}
