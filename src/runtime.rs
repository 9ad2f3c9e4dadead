//! Runtime abstraction over the process environment.
//!
//! Configuration reads environment variables through this trait so tests can
//! inject values without touching the real process environment.

use std::env;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    fn env_var(&self, key: &str) -> Result<String, env::VarError>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    #[tracing::instrument(skip(self))]
    fn env_var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_runtime_reads_process_env() {
        let runtime = RealRuntime;
        // PATH exists on every platform the tests run on
        assert!(runtime.env_var("PATH").is_ok());
        assert!(
            runtime
                .env_var("WALDUR_CLIENT_SURELY_UNSET_VARIABLE")
                .is_err()
        );
    }
}
