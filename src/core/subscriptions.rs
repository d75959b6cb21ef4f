//! # Upstream connection management.
//!
//! [`disconnect`] releases every upstream handle of an instance's proxies;
//! [`connect`] installs the stream channels of a (new) sink into the same
//! proxies.
//!
//! ## Ordering contract
//! A reload pass runs, per instance:
//! ```text
//! disconnect(all proxies) ──► producer(inputs, extra) ──► connect(proxies, new sink)
//! ```
//! so no feed ever receives values from the old and the new producer at once.
//!
//! ## Reported, never raised
//! - `NoSubscription`: a proxy had no handle to release (second disconnect,
//!   passthrough proxy nobody listened to).
//! - `UnknownChannel`: the new sink has a stream channel no proxy exists for.
//! - `ChannelRetired`: a proxy's channel is missing from the new sink; the proxy
//!   stays quiescent until a later sink brings the channel back.

use std::collections::BTreeSet;

use crate::core::proxy::Proxies;
use crate::core::report::Reporter;
use crate::core::sink::Sink;
use crate::events::EventKind;

/// Connects each stream channel of `sink` into the matching proxy's feed.
///
/// A handle still held by a proxy is replaced and released.
pub(crate) fn connect<T, V>(proxies: &Proxies<T>, sink: &Sink<T, V>, report: &Reporter)
where
    T: Clone + Send + 'static,
{
    let mut seen = BTreeSet::new();

    for (key, stream) in sink.stream_channels() {
        match proxies.get(key) {
            Some(proxy) => {
                seen.insert(key);
                if let Some(previous) = proxy.replace_upstream(Some(stream.clone())) {
                    previous.dispose();
                }
            }
            None => report.channel(EventKind::UnknownChannel, key),
        }
    }

    for key in proxies.keys() {
        if !seen.contains(key.as_str()) {
            report.channel(EventKind::ChannelRetired, key);
        }
    }
}

/// Releases every upstream handle held by `proxies`.
///
/// Returns how many handles were released.
pub(crate) fn disconnect<T>(proxies: &Proxies<T>, report: &Reporter) -> usize
where
    T: Clone + Send + 'static,
{
    let mut released = 0;
    for (key, proxy) in proxies {
        match proxy.take_upstream() {
            Some(handle) => {
                if handle.dispose() {
                    released += 1;
                }
            }
            None => report.channel(EventKind::NoSubscription, key),
        }
    }
    released
}
