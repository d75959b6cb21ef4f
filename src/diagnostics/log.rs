//! # Simple logging sink for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [created] slot=counter
//! [execute] slot=counter
//! [reload] slot=counter instance=0
//! [reloaded] slot=counter instances=2
//! [no-subscription] slot=counter instance=1 sink=dom
//! [retired] slot=counter instance=0 sink=http
//! ```

use crate::events::{Event, EventKind};

use super::Diagnostics;

/// Simple stdout logging sink.
///
/// Enabled via the `logging` feature. Not intended for production use -
/// use [`TracingWriter`](super::TracingWriter) for structured logging.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

impl Diagnostics for LogWriter {
    fn on_event(&self, e: &Event) {
        let slot = e.slot.as_deref().unwrap_or("-");
        let sink = e.channel.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let instance = e
            .instance
            .map_or_else(|| "-".to_string(), |i| i.to_string());
        match e.kind {
            EventKind::Created => println!("[created] slot={slot}"),
            EventKind::Executed => println!("[execute] slot={slot}"),
            EventKind::InstanceRegistered => {
                println!("[registered] slot={slot} instance={instance}")
            }
            EventKind::Reloading => println!("[reload] slot={slot} instance={instance}"),
            EventKind::Reloaded => println!("[reloaded] slot={slot} instances={reason}"),
            EventKind::ReloadFailed => {
                println!("[reload-failed] slot={slot} instance={instance} err={reason}")
            }
            EventKind::NoSubscription => {
                println!("[no-subscription] slot={slot} instance={instance} sink={sink}")
            }
            EventKind::NoProxyStream => println!("[no-proxy-stream] slot={slot} sink={sink}"),
            EventKind::NotStreamResult => println!("[not-stream] slot={slot}"),
            EventKind::ChannelRetired => {
                println!("[retired] slot={slot} instance={instance} sink={sink}")
            }
            EventKind::UnknownChannel => {
                println!("[unknown-sink] slot={slot} instance={instance} sink={sink}")
            }
            EventKind::SinkPanicked => println!("[sink-panicked] {reason}"),
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
