use crate::alert::send_alert;
use crate::shared::usecase::UseCase;
use chrono::Datelike;
use community_alerts_domain::{AlertMessage, Member};
use community_alerts_infra::AlertsContext;
use rand::seq::SliceRandom;
use tracing::{debug, info};

const CONGRATULATIONS: &[&str] = &[
    "🎉 Happy birthday! The whole community wishes you a fantastic year ahead!",
    "🎂 Happy birthday! May all your builds be green and all your bugs be shallow.",
    "🥳 It is your day! Happy birthday from all of us, have a wonderful celebration!",
    "🎈 Happy birthday! Thank you for being part of the community, we are glad you are here.",
    "🎁 Wishing you a very happy birthday full of joy, good people and new ideas!",
];

/// Congratulates every member whose birthday is today in the community
/// timezone with one message in the main community chat
#[derive(Debug)]
pub struct SendBirthdayGreetingsUseCase {}

#[derive(Debug)]
pub enum UseCaseErrors {
    StorageError,
    DeliveryFailed,
}

fn greeting(members: &[Member], congratulation: &str) -> String {
    let mentions = members
        .iter()
        .map(|member| format!("@{}", member.username))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}\n{}", mentions, congratulation)
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendBirthdayGreetingsUseCase {
    /// Number of members that were congratulated
    type Response = usize;

    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &AlertsContext) -> Result<Self::Response, Self::Errors> {
        let chat_id = ctx.config.telegram_main_chat_id;
        if chat_id == 0 {
            debug!("No main chat configured, skipping the birthday broadcast");
            return Ok(0);
        }

        let today = ctx
            .sys
            .now()
            .with_timezone(&ctx.config.alert_schedule.timezone)
            .date_naive();
        let members = ctx
            .repos
            .members
            .find_by_birthday(today.month(), today.day())
            .await
            .map_err(|_| UseCaseErrors::StorageError)?
            .into_iter()
            .filter(|member| !member.username.trim().is_empty())
            .collect::<Vec<_>>();
        if members.is_empty() {
            debug!("Nobody has a birthday on {}", today);
            return Ok(0);
        }

        let congratulation = CONGRATULATIONS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CONGRATULATIONS[0]);
        let message = AlertMessage {
            text: greeting(&members, congratulation),
            buttons: Vec::new(),
        };
        send_alert(ctx, chat_id, &message)
            .await
            .map_err(|_| UseCaseErrors::DeliveryFailed)?;

        info!("Congratulated {} members on their birthday", members.len());
        Ok(members.len())
    }
}
