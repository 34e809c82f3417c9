use super::IMemberRepo;
use chrono::NaiveDate;
use community_alerts_domain::{Member, MemberRole, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::{error, warn};

pub struct PostgresMemberRepo {
    pool: PgPool,
}

impl PostgresMemberRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MemberRaw {
    member_uid: Uuid,
    telegram_id: i64,
    username: String,
    first_name: String,
    last_name: String,
    role: String,
    birthday: Option<NaiveDate>,
}

impl From<MemberRaw> for Member {
    fn from(raw: MemberRaw) -> Self {
        let role = raw.role.parse().unwrap_or_else(|_| {
            warn!(
                "Member: {} has unknown role: {}, reading it as unsubscriber",
                raw.member_uid, raw.role
            );
            MemberRole::Unsubscriber
        });
        Member {
            id: raw.member_uid.into(),
            telegram_id: raw.telegram_id,
            username: raw.username,
            first_name: raw.first_name,
            last_name: raw.last_name,
            role,
            birthday: raw.birthday,
        }
    }
}

#[async_trait::async_trait]
impl IMemberRepo for PostgresMemberRepo {
    async fn insert(&self, member: &Member) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO members(member_uid, telegram_id, username, first_name, last_name, role, birthday)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(member.id.inner_ref())
        .bind(member.telegram_id)
        .bind(&member.username)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(member.role.as_str())
        .bind(member.birthday)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, member_id: &ID) -> Option<Member> {
        match sqlx::query_as::<_, MemberRaw>(
            r#"
            SELECT * FROM members AS m
            WHERE m.member_uid = $1
            "#,
        )
        .bind(member_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        {
            Ok(member) => member.map(|m| m.into()),
            Err(e) => {
                error!("Unable to find member: {}. Error: {:?}", member_id, e);
                None
            }
        }
    }

    async fn find_many(&self, member_ids: &[ID]) -> anyhow::Result<Vec<Member>> {
        let ids = member_ids.iter().map(|id| *id.inner_ref()).collect::<Vec<_>>();
        let members = sqlx::query_as::<_, MemberRaw>(
            r#"
            SELECT * FROM members AS m
            WHERE m.member_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(members.into_iter().map(|m| m.into()).collect())
    }

    async fn find_by_telegram_id(&self, telegram_id: i64) -> Option<Member> {
        if telegram_id == 0 {
            return None;
        }
        match sqlx::query_as::<_, MemberRaw>(
            r#"
            SELECT * FROM members AS m
            WHERE m.telegram_id = $1
            LIMIT 1
            "#,
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await
        {
            Ok(member) => member.map(|m| m.into()),
            Err(e) => {
                error!(
                    "Unable to find member with telegram id: {}. Error: {:?}",
                    telegram_id, e
                );
                None
            }
        }
    }

    async fn find_community_subscribers(&self) -> anyhow::Result<Vec<Member>> {
        let members = sqlx::query_as::<_, MemberRaw>(
            r#"
            SELECT * FROM members AS m
            WHERE m.telegram_id <> 0 AND m.role <> 'UNSUBSCRIBER'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(members.into_iter().map(|m| m.into()).collect())
    }

    async fn find_by_birthday(&self, month: u32, day: u32) -> anyhow::Result<Vec<Member>> {
        let members = sqlx::query_as::<_, MemberRaw>(
            r#"
            SELECT * FROM members AS m
            WHERE EXTRACT(MONTH FROM m.birthday) = $1
            AND EXTRACT(DAY FROM m.birthday) = $2
            "#,
        )
        .bind(month as i32)
        .bind(day as i32)
        .fetch_all(&self.pool)
        .await?;

        Ok(members.into_iter().map(|m| m.into()).collect())
    }
}
