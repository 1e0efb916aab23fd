//! Systèmes sans API de loupe plein écran (Linux, macOS, ...)
//! Systems without a full-screen magnification API (Linux, macOS, ...)
//!
//! Le démarrage échoue avec `ServiceUnavailable`.
//! Startup fails with `ServiceUnavailable`.

use crate::config::RunOptions;
use crate::error::{MagnifierError, Result};
use crate::service::DisplayGeometry;

fn unavailable() -> MagnifierError {
    MagnifierError::ServiceUnavailable(format!(
        "full-screen magnification is not supported on {}",
        std::env::consts::OS
    ))
}

pub fn screen_size() -> Result<DisplayGeometry> {
    Err(unavailable())
}

pub fn run(_options: &RunOptions) -> Result<()> {
    Err(unavailable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MagnifierConfig;
    use std::time::Duration;

    #[test]
    fn test_run_fails_fast() {
        let options = RunOptions {
            magnifier: MagnifierConfig::default(),
            hotkey: "M-1".parse().unwrap(),
            tick_interval: Duration::from_millis(8),
            cooldown: Duration::ZERO,
        };
        let err = run(&options).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(screen_size(), Err(MagnifierError::ServiceUnavailable(_))));
    }
}
