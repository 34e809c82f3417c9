use super::IMemberRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::Datelike;
use community_alerts_domain::{Member, ID};

pub struct InMemoryMemberRepo {
    members: std::sync::Mutex<Vec<Member>>,
}

impl InMemoryMemberRepo {
    pub fn new() -> Self {
        Self {
            members: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IMemberRepo for InMemoryMemberRepo {
    async fn insert(&self, member: &Member) -> anyhow::Result<()> {
        insert(member, &self.members);
        Ok(())
    }

    async fn find(&self, member_id: &ID) -> Option<Member> {
        find(member_id, &self.members)
    }

    async fn find_many(&self, member_ids: &[ID]) -> anyhow::Result<Vec<Member>> {
        Ok(find_by(&self.members, |m| member_ids.contains(&m.id)))
    }

    async fn find_by_telegram_id(&self, telegram_id: i64) -> Option<Member> {
        if telegram_id == 0 {
            return None;
        }
        find_by(&self.members, |m| m.telegram_id == telegram_id)
            .into_iter()
            .next()
    }

    async fn find_community_subscribers(&self) -> anyhow::Result<Vec<Member>> {
        Ok(find_by(&self.members, |m| m.is_community_subscriber()))
    }

    async fn find_by_birthday(&self, month: u32, day: u32) -> anyhow::Result<Vec<Member>> {
        Ok(find_by(&self.members, |m| match m.birthday {
            Some(birthday) => birthday.month() == month && birthday.day() == day,
            None => false,
        }))
    }
}
