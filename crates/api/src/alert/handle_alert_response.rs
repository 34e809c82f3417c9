use crate::shared::usecase::UseCase;
use community_alerts_domain::{AlertResponse, EventAlertSubscription, ID};
use community_alerts_infra::AlertsContext;
use tracing::info;

/// A member pressed one of the buttons of an initial alert
#[derive(Debug)]
pub struct HandleAlertResponseUseCase {
    pub telegram_id: i64,
    pub event_id: ID,
    pub response: AlertResponse,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    MemberNotFound(i64),
    SubscriptionNotFound(ID),
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for HandleAlertResponseUseCase {
    type Response = EventAlertSubscription;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &AlertsContext) -> Result<Self::Response, Self::Errors> {
        let member = match ctx.repos.members.find_by_telegram_id(self.telegram_id).await {
            Some(member) => member,
            None => return Err(UseCaseErrors::MemberNotFound(self.telegram_id)),
        };

        let subscription = ctx
            .repos
            .event_alert_subscriptions
            .respond(
                &self.event_id,
                &member.id,
                self.response,
                ctx.sys.now(),
            )
            .await
            .map_err(|_| UseCaseErrors::StorageError)?
            .ok_or_else(|| UseCaseErrors::SubscriptionNotFound(self.event_id.clone()))?;

        info!(
            "Member: {} answered {:?} for event: {}",
            member.id, self.response, self.event_id
        );
        Ok(subscription)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{insert_members, setup_context};
    use crate::shared::usecase::execute;
    use chrono::{TimeZone, Utc};
    use community_alerts_domain::{Member, SubscriptionStatus};

    #[actix_web::main]
    #[test]
    async fn applies_answers_from_any_state() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let (ctx, _) = setup_context(now);
        let alice = Member::new(1, "alice");
        insert_members(&ctx, &[alice.clone()]).await;
        let event_id = ID::new();
        let mut s = EventAlertSubscription::new(event_id.clone(), alice.id.clone(), now);
        s.status = SubscriptionStatus::Unsubscribed;
        ctx.repos.event_alert_subscriptions.insert(&s).await.unwrap();

        for (response, status) in [
            (AlertResponse::Attend, SubscriptionStatus::Subscribed),
            (AlertResponse::Decline, SubscriptionStatus::Unsubscribed),
        ] {
            let usecase = HandleAlertResponseUseCase {
                telegram_id: 1,
                event_id: event_id.clone(),
                response,
            };
            let res = execute(usecase, &ctx).await.unwrap();
            assert_eq!(res.status, status);
        }
    }

    #[actix_web::main]
    #[test]
    async fn unknown_member_or_subscription() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let (ctx, _) = setup_context(now);
        insert_members(&ctx, &[Member::new(1, "alice")]).await;

        let usecase = HandleAlertResponseUseCase {
            telegram_id: 99,
            event_id: ID::new(),
            response: AlertResponse::Attend,
        };
        assert!(matches!(
            execute(usecase, &ctx).await,
            Err(UseCaseErrors::MemberNotFound(99))
        ));

        let usecase = HandleAlertResponseUseCase {
            telegram_id: 1,
            event_id: ID::new(),
            response: AlertResponse::Attend,
        };
        assert!(matches!(
            execute(usecase, &ctx).await,
            Err(UseCaseErrors::SubscriptionNotFound(_))
        ));
    }
}
