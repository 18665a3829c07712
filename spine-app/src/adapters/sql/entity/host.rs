//! `SeaORM` entity for the `hosts` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "hosts")]
/// A user's claim on a hostname.
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Empty for a root-only claim
    pub sub: String,
    pub root: String,
    pub user_id: String,
    pub dns_record_id: Option<String>,
    /// RFC 3339
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dns_record::Entity",
        from = "Column::DnsRecordId",
        to = "super::dns_record::Column::Id",
        on_delete = "SetNull"
    )]
    DnsRecord,
}

impl Related<super::dns_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DnsRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
