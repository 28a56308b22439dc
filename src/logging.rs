//! env_logger output that stays clear of an active progress bar

use anyhow::Result;
use env_logger::Env;
use indicatif::ProgressBar;
use log::{Log, Metadata, Record};
use std::sync::Mutex;

/// Bar currently drawn on the terminal, if any
struct ActiveBar(Mutex<Option<ProgressBar>>);

impl ActiveBar {
    const fn new() -> Self {
        Self(Mutex::new(None))
    }

    fn current(&self) -> Option<ProgressBar> {
        self.0.lock().ok().and_then(|bar| bar.clone())
    }

    fn set(&self, pb: Option<ProgressBar>) {
        if let Ok(mut bar) = self.0.lock() {
            *bar = pb;
        }
    }

    fn attach(&self, pb: &ProgressBar) -> BarGuard<'_> {
        self.set(Some(pb.clone()));
        BarGuard(self)
    }
}

static ACTIVE_BAR: ActiveBar = ActiveBar::new();

struct BarAwareLogger {
    inner: env_logger::Logger,
}

impl Log for BarAwareLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.inner.matches(record) {
            return;
        }
        // Clone out so the lock is not held while the bar redraws
        match ACTIVE_BAR.current() {
            Some(pb) => pb.suspend(|| self.inner.log(record)),
            None => self.inner.log(record),
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the logger: `info` by default, overridable with `RUST_LOG`
pub fn init() -> Result<()> {
    let inner = env_logger::Builder::from_env(Env::default().default_filter_or("info")).build();
    let level = inner.filter();
    log::set_boxed_logger(Box::new(BarAwareLogger { inner }))?;
    log::set_max_level(level);
    Ok(())
}

/// Log lines are printed above `pb` until the guard is dropped
pub struct BarGuard<'a>(&'a ActiveBar);

pub fn attach(pb: &ProgressBar) -> BarGuard<'static> {
    ACTIVE_BAR.attach(pb)
}

impl Drop for BarGuard<'_> {
    fn drop(&mut self) {
        self.0.set(None);
    }
}
