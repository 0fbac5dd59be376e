//! Ambient logging setup, in the style of a small CLI/demo binary rather
//! than a library default — the kernel itself only calls `log::warn!` on
//! the degenerate-prior path (see `adjust::normalize_or_uniform`) and never
//! initializes a logger itself, leaving that to whatever embeds it.

use fern::Dispatch;
use log::LevelFilter;

/// Installs a `fern` logger writing to stderr with a timestamped line
/// format. Intended for the demo binary and benchmarks, not for library
/// consumers, who should configure their own logger.
pub fn init_logging(level: LevelFilter) -> Result<(), fern::InitError> {
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
