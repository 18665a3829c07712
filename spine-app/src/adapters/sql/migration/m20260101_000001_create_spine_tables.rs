use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // dns_records 表
        manager
            .create_table(
                Table::create()
                    .table(DnsRecord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DnsRecord::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DnsRecord::ZoneId).string().not_null())
                    .col(
                        ColumnDef::new(DnsRecord::Hostname)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // hosts 表：删除 DNS 记录时引用置空
        manager
            .create_table(
                Table::create()
                    .table(Host::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Host::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Host::Sub).string().not_null())
                    .col(ColumnDef::new(Host::Root).string().not_null())
                    .col(ColumnDef::new(Host::UserId).string().not_null())
                    .col(ColumnDef::new(Host::DnsRecordId).string().null())
                    .col(ColumnDef::new(Host::CreatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hosts_dns_record_id")
                            .from(Host::Table, Host::DnsRecordId)
                            .to(DnsRecord::Table, DnsRecord::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 一个 CNAME 只属于一条子域名声明；根域名每个用户只能声明一次
        manager
            .create_index(
                Index::create()
                    .name("idx_hosts_dns_record_id")
                    .table(Host::Table)
                    .col(Host::DnsRecordId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_hosts_sub_root_user")
                    .table(Host::Table)
                    .col(Host::Sub)
                    .col(Host::Root)
                    .col(Host::UserId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_hosts_user_id")
                    .table(Host::Table)
                    .col(Host::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // reconciliation_events 表
        manager
            .create_table(
                Table::create()
                    .table(ReconciliationEvent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReconciliationEvent::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReconciliationEvent::Hostname)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReconciliationEvent::ZoneId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReconciliationEvent::RecordId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReconciliationEvent::Detail).text().not_null())
                    .col(
                        ColumnDef::new(ReconciliationEvent::OccurredAt)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReconciliationEvent::ResolvedAt)
                            .string()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReconciliationEvent::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Host::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DnsRecord::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum DnsRecord {
    #[sea_orm(iden = "dns_records")]
    Table,
    Id,
    ZoneId,
    Hostname,
}

#[derive(DeriveIden)]
enum Host {
    #[sea_orm(iden = "hosts")]
    Table,
    Id,
    Sub,
    Root,
    UserId,
    DnsRecordId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ReconciliationEvent {
    #[sea_orm(iden = "reconciliation_events")]
    Table,
    Id,
    Hostname,
    ZoneId,
    RecordId,
    Detail,
    OccurredAt,
    ResolvedAt,
}
