/* Logger initialization and the injectable log sink */
use std::{panic, sync::Arc, thread};

use tracing::{Level, debug, error, info, level_filters::LevelFilter, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::CargoEnv;

pub type DynLogSink = Arc<dyn LogSink + Send + Sync>;

/// where request level pipeline messages go, the embed pipeline only ever talks to this so it can
/// be swapped in tests or pointed somewhere else without touching the handlers
pub trait LogSink {
    fn log(&self, level: Level, message: &str);
}

/// default sink, forwards into whatever subscriber `Logger::init` installed
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: Level, message: &str) {
        // tracing macros want a const level so we match it out
        match level {
            Level::ERROR => error!(target: "embed", "{}", message),
            Level::WARN => warn!(target: "embed", "{}", message),
            Level::INFO => info!(target: "embed", "{}", message),
            Level::DEBUG => debug!(target: "embed", "{}", message),
            Level::TRACE => trace!(target: "embed", "{}", message),
        }
    }
}

pub struct LoggerGuards {
    pub _tracing_guard: WorkerGuard,
    // option because it can be loaded without this if wanted
    pub _sentry_guard: Option<sentry::ClientInitGuard>,
}

pub struct Logger {}

impl Logger {
    pub fn init(cargo_env: CargoEnv, sentry_dsn: Option<String>) -> LoggerGuards {
        // debug is where the per request embed trail lives, production keeps it in files so
        // stdout stays readable
        let max_level = match cargo_env {
            CargoEnv::Development => LevelFilter::INFO,
            CargoEnv::Production => LevelFilter::DEBUG,
        };

        let (non_blocking, guard) = match cargo_env {
            CargoEnv::Development => tracing_appender::non_blocking(std::io::stdout()),
            CargoEnv::Production => {
                tracing_appender::non_blocking(tracing_appender::rolling::daily("logs", "daily.log"))
            }
        };

        // this will just be a none type if it's not in the config
        let sentry_guard = sentry_dsn.map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    environment: Some(match cargo_env {
                        CargoEnv::Development => "development".into(),
                        CargoEnv::Production => "production".into(),
                    }),
                    attach_stacktrace: true,
                    ..Default::default()
                },
            ))
        });

        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);

        let registry = tracing_subscriber::registry()
            .with(max_level)
            .with(fmt_layer);

        if sentry_guard.is_some() {
            registry.with(sentry_tracing::layer()).init();
        } else {
            registry.init();
        }

        panic::set_hook(Box::new(|info| {
            let thread = thread::current();
            let thread = thread.name().unwrap_or("unknown");

            let msg = match info.payload().downcast_ref::<&'static str>() {
                Some(s) => *s,
                None => match info.payload().downcast_ref::<String>() {
                    Some(s) => &**s,
                    None => "Box<Any>",
                },
            };

            let location = info
                .location()
                .map(|l| format!(": {}:{}", l.file(), l.line()))
                .unwrap_or_default();

            // "notrace - " panics are expected enough that a backtrace is just noise
            match msg.strip_prefix("notrace - ") {
                Some(short) => error!(
                    target: "panic", "thread '{}' panicked at '{}'{}",
                    thread, short, location
                ),
                None => error!(
                    target: "panic", "thread '{}' panicked at '{}'{}\n{:?}",
                    thread,
                    msg,
                    location,
                    backtrace::Backtrace::new()
                ),
            }
        }));

        // return both guards so they're not dropped
        LoggerGuards {
            _tracing_guard: guard,
            _sentry_guard: sentry_guard,
        }
    }
}
