#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use color_eyre::eyre;
pub use facet_fixture_testhelpers_macros::test;

use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::{OwoColorize, Style};
use std::io::Write;
use std::sync::Once;

/// Environment variable read by [`seed`] to replay a failing run.
pub const SEED_VAR: &str = "FACET_FIXTURE_SEED";

/// Seed used by [`seed`] when [`SEED_VAR`] is unset.
pub const DEFAULT_SEED: u64 = 0x5eed_f1c7_u64;

struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let level_style = match record.level() {
            Level::Error => Style::new().fg_rgb::<243, 139, 168>(),
            Level::Warn => Style::new().fg_rgb::<249, 226, 175>(),
            Level::Info => Style::new().fg_rgb::<166, 227, 161>(),
            Level::Debug => Style::new().fg_rgb::<137, 180, 250>(),
            Level::Trace => Style::new().fg_rgb::<148, 226, 213>(),
        };

        eprintln!(
            "{} - {}: {}",
            record.level().style(level_style),
            record
                .target()
                .style(Style::new().fg_rgb::<137, 180, 250>()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static SETUP: Once = Once::new();

/// Installs color-eyre and a simple stderr logger.
///
/// Every `#[test]` calls this; only the first call in a test binary does any work,
/// so tests running on parallel threads of one process don't fight over the
/// global logger.
pub fn setup() {
    SETUP.call_once(|| {
        #[cfg(not(miri))]
        {
            use color_eyre::config::HookBuilder;
            use regex::Regex;
            use std::sync::LazyLock;

            /// Frames from the panic machinery and the test harness.
            static IGNORE_FRAMES: LazyLock<Option<Regex>> = LazyLock::new(|| {
                Regex::new(r"^(std::panic|core::panic|test::run_test|__pthread_cond_wait|std::sys::(pal|backtrace)|std::thread::Builder|core::ops::function|test::__rust_begin_short_backtrace)")
                    .ok()
            });

            let eyre_filter = move |frames: &mut Vec<&color_eyre::config::Frame>| {
                let Some(ignore) = IGNORE_FRAMES.as_ref() else {
                    return;
                };
                frames.retain(|frame| {
                    frame
                        .name
                        .as_ref()
                        .map(|n| !ignore.is_match(&n.to_string()))
                        .unwrap_or(true)
                });
            };

            // another harness may already own the hook
            let _ = HookBuilder::default()
                .add_frame_filter(Box::new(eyre_filter))
                .install();
        }

        if log::set_boxed_logger(Box::new(SimpleLogger)).is_ok() {
            log::set_max_level(max_level());
        }
    });
}

/// Log level for test runs, taken from `RUST_LOG` (`trace` when unset or
/// unrecognized).
fn max_level() -> LevelFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Trace)
}

/// Seed for randomized tests: the value of [`SEED_VAR`] if it parses,
/// [`DEFAULT_SEED`] otherwise. The seed is logged so a failure can be
/// replayed.
pub fn seed() -> u64 {
    let seed = std::env::var(SEED_VAR)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(DEFAULT_SEED);
    log::info!("using seed {} (set {} to override)", seed.yellow(), SEED_VAR);
    seed
}
