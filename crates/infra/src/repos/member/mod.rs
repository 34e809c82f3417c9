mod inmemory;
mod postgres;

use community_alerts_domain::{Member, ID};
pub use inmemory::InMemoryMemberRepo;
pub use postgres::PostgresMemberRepo;

#[async_trait::async_trait]
pub trait IMemberRepo: Send + Sync {
    async fn insert(&self, member: &Member) -> anyhow::Result<()>;
    async fn find(&self, member_id: &ID) -> Option<Member>;
    async fn find_many(&self, member_ids: &[ID]) -> anyhow::Result<Vec<Member>>;
    async fn find_by_telegram_id(&self, telegram_id: i64) -> Option<Member>;
    /// Members with a linked chat and any role except unsubscriber
    async fn find_community_subscribers(&self) -> anyhow::Result<Vec<Member>>;
    async fn find_by_birthday(&self, month: u32, day: u32) -> anyhow::Result<Vec<Member>>;
}
