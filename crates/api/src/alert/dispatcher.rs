use community_alerts_domain::{AlertMessage, Member};
use community_alerts_infra::{AlertsContext, DeliveryError};
use futures::{stream, StreamExt};
use std::future::Future;
use tokio::time::timeout;
use tracing::{debug, error};

/// Outcome of sending one message to many members
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub unreachable: usize,
    pub failed: usize,
}

/// Bounds a call to the messaging channel by the configured send timeout
pub async fn with_send_timeout<F>(ctx: &AlertsContext, call: F) -> Result<(), DeliveryError>
where
    F: Future<Output = Result<(), DeliveryError>>,
{
    match timeout(ctx.config.message_send_timeout, call).await {
        Ok(res) => res,
        Err(_) => Err(DeliveryError::Timeout),
    }
}

/// Sends `message` to one chat
pub async fn send_alert(
    ctx: &AlertsContext,
    chat_id: i64,
    message: &AlertMessage,
) -> Result<(), DeliveryError> {
    with_send_timeout(
        ctx,
        ctx.messenger
            .send_message(chat_id, &message.text, &message.buttons),
    )
    .await
}

/// Sends `message` to every member with a linked chat, at most
/// `alert_dispatch_concurrency` at a time. Failures are logged and skipped.
/// Returns each member together with the delivery result.
pub async fn dispatch<'a>(
    ctx: &AlertsContext,
    members: &'a [Member],
    message: &AlertMessage,
) -> (DispatchReport, Vec<(&'a Member, Result<(), DeliveryError>)>) {
    let results = stream::iter(members.iter().filter(|m| m.has_linked_chat()))
        .map(|member| async move {
            let res = send_alert(ctx, member.telegram_id, message).await;
            (member, res)
        })
        .buffer_unordered(ctx.config.alert_dispatch_concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    let mut report = DispatchReport::default();
    for (member, res) in &results {
        match res {
            Ok(_) => report.delivered += 1,
            Err(DeliveryError::RecipientUnreachable(reason)) => {
                debug!(
                    "Member: {} with chat: {} is unreachable: {}",
                    member.id, member.telegram_id, reason
                );
                report.unreachable += 1;
            }
            Err(e) => {
                error!(
                    "Unable to send alert to member: {} with chat: {}. Error: {:?}",
                    member.id, member.telegram_id, e
                );
                report.failed += 1;
            }
        }
    }

    (report, results)
}
