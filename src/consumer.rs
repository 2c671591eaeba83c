//! Outbound consumer: drains the accept loop's `mpsc` queue and forwards
//! each completed transfer to whichever sinks are configured, generalized
//! from `original_source/cli.py`'s `consume`/`dispatch_astm_message`.

use tokio::sync::mpsc;

use crate::lims::LimsClient;
use crate::session::MessageBundle;

pub struct ConsumerConfig {
    pub consumer_name: String,
    pub lims: Option<LimsClient>,
}

/// Consumes bundles until the channel is closed, logging each delivery and
/// forwarding to the LIMS poster when configured. A LIMS failure is logged
/// and the message dropped: consumer-side errors never affect the
/// protocol path.
pub async fn run(mut rx: mpsc::Receiver<MessageBundle>, config: ConsumerConfig) {
    while let Some(bundle) = rx.recv().await {
        log::info!(
            "dispatching completed transfer ({} bytes, format {:?})",
            bundle.queue_payload.len(),
            bundle.format
        );
        if let Some(lims) = &config.lims {
            if let Err(e) = lims.push(&config.consumer_name, &bundle.queue_payload).await {
                log::error!("dropping message after delivery failure: {e}");
            }
        }
    }
    log::info!("consumer channel closed, shutting down");
}
