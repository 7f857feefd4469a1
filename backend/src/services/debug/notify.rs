use common::jobs::TaskState;
use std::time::Duration;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs the final task state to the caller's notification URL.
///
/// Delivery is attempted once; the outcome is only logged.
pub async fn deliver(url: &str, state: &TaskState) {
    let client = match reqwest::Client::builder().timeout(DELIVERY_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            log::error!("could not build notification client: {}", e);
            return;
        }
    };

    match client.post(url).json(state).send().await {
        Ok(resp) if resp.status().is_success() => {
            log::info!("delivered task {} to {}", state.task_id, url);
        }
        Ok(resp) => {
            log::warn!(
                "notification target {} answered {} for task {}",
                url,
                resp.status(),
                state.task_id
            );
        }
        Err(e) => {
            log::warn!("delivering task {} to {} failed: {}", state.task_id, url, e);
        }
    }
}
