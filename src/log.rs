/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Logging and terminal output macros.
//!
//! The shim lives inside somebody else's process, so output goes through the
//! [log](::log) facade rather than straight to stderr. If the host application
//! hasn't installed a logger of its own, [init] installs `env_logger`.

use crate::options::Options;
use std::sync::Once;

/// Install the fallback logger. Safe to call any number of times; only the
/// first call does anything, and a logger installed by the host wins.
/// `RUST_LOG` overrides the filter picked from `options`.
pub fn init(options: &Options) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(default_filter(options.debug)),
        )
        .format_timestamp(None)
        .try_init();
    });
}

/// [log_dbg] output is sent at debug level, so it has to get past the filter
/// whenever the macro's own gate can be open.
fn default_filter(debug: bool) -> &'static str {
    if debug || !ENABLED_MODULES.is_empty() {
        "es3shim=debug"
    } else {
        "es3shim=info"
    }
}

/// Prints a log message unconditionally. Use this for errors or warnings.
///
/// The message is prefixed with the module path, so it is clear where it comes
/// from.
macro_rules! log {
    ($($arg:tt)+) => {
        ::log::warn!(target: module_path!(), "{}: {}", module_path!(), format_args!($($arg)+))
    }
}

/// Like [log], but prints the message only if debugging is enabled for the
/// module where it is used, or globally with `LTW_DEBUG=1`. This can be used
/// for verbose things only needed when debugging.
macro_rules! log_dbg {
    ($($arg:tt)+) => {
        if $crate::log::ENABLED_MODULES.contains(&module_path!())
            || $crate::options::Options::global().debug
        {
            ::log::debug!(target: module_path!(), "{}: {}", module_path!(), format_args!($($arg)+));
        }
    }
}

/// Like [log], but only prints the first time this particular call site is
/// reached. Use this for warnings that would otherwise fire on every draw.
macro_rules! log_once {
    ($($arg:tt)+) => {
        {
            static ONCE: ::std::sync::Once = ::std::sync::Once::new();
            ONCE.call_once(|| log!($($arg)+));
        }
    }
}

/// Print a message. This should be used for informational output that isn't a
/// warning, e.g. the configuration summary printed at startup.
///
/// Prefer [log] or [log_dbg] for errors and warnings.
macro_rules! echo {
    ($($arg:tt)+) => {
        ::log::info!(target: "es3shim", $($arg)+)
    };
}

/// Put modules to enable [log_dbg] for here, e.g. "es3shim::shader::cache" to
/// see every shader cache hit and miss.
pub const ENABLED_MODULES: &[&str] = &[];

#[cfg(test)]
mod tests {
    use super::*;
    use ::log::{Level, Log, Metadata};

    fn passes(filter: &str, level: Level, target: &str) -> bool {
        let logger = env_logger::Builder::new().parse_filters(filter).build();
        logger.enabled(&Metadata::builder().level(level).target(target).build())
    }

    #[test]
    fn debug_option_lets_debug_records_through() {
        let filter = default_filter(true);
        assert!(passes(filter, Level::Debug, "es3shim::shader::cache"));
        assert!(!passes(filter, Level::Trace, "es3shim::shader::cache"));
        assert!(!passes(filter, Level::Debug, "some_other_crate"));
    }

    #[test]
    fn default_filter_is_info() {
        let filter = default_filter(false);
        assert!(passes(filter, Level::Warn, "es3shim::draw::ring"));
        assert!(passes(filter, Level::Info, "es3shim"));
        assert_eq!(
            passes(filter, Level::Debug, "es3shim::draw::ring"),
            !ENABLED_MODULES.is_empty()
        );
    }
}
