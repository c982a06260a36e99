//! Environment isolation for tests that touch `CHARTSRV_*` variables.

use std::env;
use std::sync::Mutex;

/// Serializes tests that read or write process environment variables.
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Restores an environment variable to its previous value on drop.
pub struct EnvVarGuard {
    key: String,
    previous: Option<String>,
}

impl EnvVarGuard {
    #[allow(unsafe_code)]
    pub fn set(key: &str, value: &str) -> Self {
        let previous = env::var(key).ok();
        unsafe {
            env::set_var(key, value);
        }
        Self {
            key: key.to_string(),
            previous,
        }
    }

    #[allow(unsafe_code)]
    pub fn remove(key: &str) -> Self {
        let previous = env::var(key).ok();
        unsafe {
            env::remove_var(key);
        }
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvVarGuard {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        unsafe {
            match self.previous {
                Some(ref value) => env::set_var(&self.key, value),
                None => env::remove_var(&self.key),
            }
        }
    }
}
