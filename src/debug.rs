//! A module-scoped debug channel, the Rust-side equivalent of
//! `FIRM_DBG_REGISTER`/`DEBUG_ONLY` in the original pass: one call at
//! `init()` time registers where diagnostics for this pass go, and every
//! fatal error is logged through it before being returned to the caller.

/// A named logging target, registered once per process via `init()`.
#[derive(Debug, Clone, Copy)]
pub struct DebugChannel {
    target: &'static str,
}

impl DebugChannel {
    pub const fn register(target: &'static str) -> Self {
        Self { target }
    }

    pub fn trace(&self, msg: &str) {
        log::log!(target: self.target, log::Level::Trace, "{msg}");
    }

    pub fn error(&self, msg: &str) {
        log::log!(target: self.target, log::Level::Error, "{msg}");
    }
}

/// The channel this pass's diagnostics are written to.
pub static CHANNEL: DebugChannel = DebugChannel::register("sparc::transform");
