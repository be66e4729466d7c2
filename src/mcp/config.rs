//! Configuration resolution for the SSH diagnostics server.
//!
//! This module handles configuration values with a three-tier priority system:
//!
//! 1. **Parameter** - Explicitly provided tool argument (highest priority)
//! 2. **Environment Variable** - Value from environment variable
//! 3. **Default** - Built-in default value (lowest priority)
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SSH_DIAG_PROBE_TIMEOUT` | 5s | TCP probe / connection check timeout in seconds |
//! | `SSH_DIAG_COMMAND_TIMEOUT` | 10s | Subprocess execution timeout in seconds |
//! | `SSH_DIAG_SCAN_CONCURRENCY` | 16 | Maximum in-flight probes during a port scan |
//! | `SSH_DIAG_OUTPUT_CAP` | 65536 | Captured subprocess output cap in bytes |
//! | `SSH_DIAG_KEY_DIR` | `~/.ssh` | Default key directory for inventory and audit |

use std::env;
use std::path::PathBuf;

/// Default TCP probe timeout in seconds
pub(crate) const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Default subprocess execution timeout in seconds
pub(crate) const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 10;

/// Default maximum number of in-flight probes during a port scan
pub(crate) const DEFAULT_SCAN_CONCURRENCY: usize = 16;

/// Upper bound on scan concurrency regardless of configuration
pub(crate) const MAX_SCAN_CONCURRENCY: usize = 128;

/// Default cap on captured subprocess output (per stream) in bytes
pub(crate) const DEFAULT_OUTPUT_CAP_BYTES: usize = 64 * 1024;

/// Environment variable name for the probe timeout
pub(crate) const PROBE_TIMEOUT_ENV_VAR: &str = "SSH_DIAG_PROBE_TIMEOUT";

/// Environment variable name for the subprocess timeout
pub(crate) const COMMAND_TIMEOUT_ENV_VAR: &str = "SSH_DIAG_COMMAND_TIMEOUT";

/// Environment variable name for the port scan concurrency cap
pub(crate) const SCAN_CONCURRENCY_ENV_VAR: &str = "SSH_DIAG_SCAN_CONCURRENCY";

/// Environment variable name for the output capture cap
pub(crate) const OUTPUT_CAP_ENV_VAR: &str = "SSH_DIAG_OUTPUT_CAP";

/// Environment variable name for the default key directory
pub(crate) const KEY_DIR_ENV_VAR: &str = "SSH_DIAG_KEY_DIR";

/// Resolve the probe timeout in seconds with priority: parameter -> env var -> default
pub(crate) fn resolve_probe_timeout(timeout_param: Option<u64>) -> u64 {
    // Priority 1: Use parameter if provided
    if let Some(timeout) = timeout_param {
        return timeout.max(1);
    }

    // Priority 2: Use environment variable if set
    if let Ok(env_timeout) = env::var(PROBE_TIMEOUT_ENV_VAR)
        && let Ok(timeout) = env_timeout.parse::<u64>()
    {
        return timeout.max(1);
    }

    // Priority 3: Default value
    DEFAULT_PROBE_TIMEOUT_SECS
}

/// Resolve the subprocess timeout in seconds with priority: parameter -> env var -> default
pub(crate) fn resolve_command_timeout(timeout_param: Option<u64>) -> u64 {
    // Priority 1: Use parameter if provided
    if let Some(timeout) = timeout_param {
        return timeout.max(1);
    }

    // Priority 2: Use environment variable if set
    if let Ok(env_timeout) = env::var(COMMAND_TIMEOUT_ENV_VAR)
        && let Ok(timeout) = env_timeout.parse::<u64>()
    {
        return timeout.max(1);
    }

    // Priority 3: Default value
    DEFAULT_COMMAND_TIMEOUT_SECS
}

/// Resolve the port scan concurrency cap with priority: parameter -> env var -> default
///
/// Always at least 1 and never above [`MAX_SCAN_CONCURRENCY`]; an unbounded
/// fan-out is never allowed.
pub(crate) fn resolve_scan_concurrency(concurrency_param: Option<u64>) -> usize {
    // Priority 1: Use parameter if provided
    if let Some(concurrency) = concurrency_param {
        return (concurrency as usize).clamp(1, MAX_SCAN_CONCURRENCY);
    }

    // Priority 2: Use environment variable if set
    if let Ok(env_concurrency) = env::var(SCAN_CONCURRENCY_ENV_VAR)
        && let Ok(concurrency) = env_concurrency.parse::<usize>()
    {
        return concurrency.clamp(1, MAX_SCAN_CONCURRENCY);
    }

    // Priority 3: Default value
    DEFAULT_SCAN_CONCURRENCY
}

/// Resolve the captured-output cap in bytes with priority: env var -> default
pub(crate) fn resolve_output_cap() -> usize {
    if let Ok(env_cap) = env::var(OUTPUT_CAP_ENV_VAR)
        && let Ok(cap) = env_cap.parse::<usize>()
    {
        return cap.max(1);
    }

    DEFAULT_OUTPUT_CAP_BYTES
}

/// Resolve the key directory with priority: parameter -> env var -> `$HOME/.ssh`
pub(crate) fn resolve_key_dir(dir_param: Option<String>) -> PathBuf {
    // Priority 1: Use parameter if provided
    if let Some(dir) = dir_param
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }

    // Priority 2: Use environment variable if set
    if let Ok(env_dir) = env::var(KEY_DIR_ENV_VAR)
        && !env_dir.is_empty()
    {
        return PathBuf::from(env_dir);
    }

    // Priority 3: Default under the user's home directory
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".ssh")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // Use a mutex to serialize env var tests to avoid race conditions
    // SAFETY: Tests are serialized via ENV_TEST_MUTEX to prevent data races
    static ENV_TEST_MUTEX: once_cell::sync::Lazy<StdMutex<()>> =
        once_cell::sync::Lazy::new(|| StdMutex::new(()));

    /// Helper to set an environment variable safely within tests.
    /// SAFETY: Must be called while holding ENV_TEST_MUTEX to prevent data races.
    unsafe fn set_env(key: &str, value: &str) {
        // SAFETY: Caller ensures ENV_TEST_MUTEX is held
        unsafe { env::set_var(key, value) };
    }

    /// Helper to remove an environment variable safely within tests.
    /// SAFETY: Must be called while holding ENV_TEST_MUTEX to prevent data races.
    unsafe fn remove_env(key: &str) {
        // SAFETY: Caller ensures ENV_TEST_MUTEX is held
        unsafe { env::remove_var(key) };
    }

    mod probe_timeout {
        use super::*;

        #[test]
        fn test_uses_param_when_provided() {
            assert_eq!(resolve_probe_timeout(Some(2)), 2);
        }

        #[test]
        fn test_param_takes_priority_over_env() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                set_env(PROBE_TIMEOUT_ENV_VAR, "30");
            }
            let result = resolve_probe_timeout(Some(3));
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(PROBE_TIMEOUT_ENV_VAR);
            }
            assert_eq!(result, 3);
        }

        #[test]
        fn test_uses_env_var_when_no_param() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                set_env(PROBE_TIMEOUT_ENV_VAR, "9");
            }
            let result = resolve_probe_timeout(None);
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(PROBE_TIMEOUT_ENV_VAR);
            }
            assert_eq!(result, 9);
        }

        #[test]
        fn test_uses_default_when_no_param_or_env() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(PROBE_TIMEOUT_ENV_VAR);
            }
            assert_eq!(resolve_probe_timeout(None), DEFAULT_PROBE_TIMEOUT_SECS);
        }

        #[test]
        fn test_ignores_invalid_env_var() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                set_env(PROBE_TIMEOUT_ENV_VAR, "not_a_number");
            }
            let result = resolve_probe_timeout(None);
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(PROBE_TIMEOUT_ENV_VAR);
            }
            assert_eq!(result, DEFAULT_PROBE_TIMEOUT_SECS);
        }

        #[test]
        fn test_zero_param_is_raised_to_one() {
            assert_eq!(resolve_probe_timeout(Some(0)), 1);
        }
    }

    mod command_timeout {
        use super::*;

        #[test]
        fn test_uses_param_when_provided() {
            assert_eq!(resolve_command_timeout(Some(42)), 42);
        }

        #[test]
        fn test_uses_env_var_when_no_param() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                set_env(COMMAND_TIMEOUT_ENV_VAR, "25");
            }
            let result = resolve_command_timeout(None);
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(COMMAND_TIMEOUT_ENV_VAR);
            }
            assert_eq!(result, 25);
        }

        #[test]
        fn test_uses_default_when_no_param_or_env() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(COMMAND_TIMEOUT_ENV_VAR);
            }
            assert_eq!(resolve_command_timeout(None), DEFAULT_COMMAND_TIMEOUT_SECS);
        }
    }

    mod scan_concurrency {
        use super::*;

        #[test]
        fn test_uses_param_when_provided() {
            assert_eq!(resolve_scan_concurrency(Some(8)), 8);
        }

        #[test]
        fn test_zero_is_clamped_to_one() {
            assert_eq!(resolve_scan_concurrency(Some(0)), 1);
        }

        #[test]
        fn test_large_value_is_clamped_to_cap() {
            assert_eq!(resolve_scan_concurrency(Some(100_000)), MAX_SCAN_CONCURRENCY);
        }

        #[test]
        fn test_uses_env_var_when_no_param() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                set_env(SCAN_CONCURRENCY_ENV_VAR, "32");
            }
            let result = resolve_scan_concurrency(None);
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(SCAN_CONCURRENCY_ENV_VAR);
            }
            assert_eq!(result, 32);
        }

        #[test]
        fn test_uses_default_when_no_param_or_env() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(SCAN_CONCURRENCY_ENV_VAR);
            }
            assert_eq!(resolve_scan_concurrency(None), DEFAULT_SCAN_CONCURRENCY);
        }
    }

    mod output_cap {
        use super::*;

        #[test]
        fn test_uses_env_var_when_set() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                set_env(OUTPUT_CAP_ENV_VAR, "1024");
            }
            let result = resolve_output_cap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(OUTPUT_CAP_ENV_VAR);
            }
            assert_eq!(result, 1024);
        }

        #[test]
        fn test_uses_default_when_no_env() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(OUTPUT_CAP_ENV_VAR);
            }
            assert_eq!(resolve_output_cap(), DEFAULT_OUTPUT_CAP_BYTES);
        }
    }

    mod key_dir {
        use super::*;

        #[test]
        fn test_uses_param_when_provided() {
            let dir = resolve_key_dir(Some("/tmp/keys".to_string()));
            assert_eq!(dir, PathBuf::from("/tmp/keys"));
        }

        #[test]
        fn test_empty_param_falls_through() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(KEY_DIR_ENV_VAR);
            }
            let dir = resolve_key_dir(Some(String::new()));
            assert!(dir.ends_with(".ssh"));
        }

        #[test]
        fn test_uses_env_var_when_no_param() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                set_env(KEY_DIR_ENV_VAR, "/opt/keys");
            }
            let result = resolve_key_dir(None);
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(KEY_DIR_ENV_VAR);
            }
            assert_eq!(result, PathBuf::from("/opt/keys"));
        }

        #[test]
        fn test_defaults_to_home_ssh() {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            // SAFETY: Holding ENV_TEST_MUTEX, no concurrent env access
            unsafe {
                remove_env(KEY_DIR_ENV_VAR);
            }
            let dir = resolve_key_dir(None);
            assert!(dir.ends_with(".ssh"));
        }
    }
}
