//! Static descriptions of how each entity kind is stored.
//!
//! The engine knows nothing about offices or users; everything
//! kind-specific lives in these tables.

use domain::{EntityKind, ROLE_ADMIN};

/// Soft-delete flag of a table and the value it holds when deleted.
#[derive(Debug, Clone, Copy)]
pub struct DeletionFlag {
    pub column: &'static str,
    pub deleted_value: bool,
}

impl DeletionFlag {
    /// `is_deleted = true` marks a deleted row.
    pub const fn is_deleted() -> Self {
        Self { column: "is_deleted", deleted_value: true }
    }

    /// `is_active = false` marks a deleted row.
    pub const fn is_active() -> Self {
        Self { column: "is_active", deleted_value: false }
    }

    pub const fn active_value(&self) -> bool {
        !self.deleted_value
    }
}

/// Child rows whose flag follows the parent on soft delete and restore.
#[derive(Debug, Clone, Copy)]
pub struct CascadeChild {
    pub table: &'static str,
    pub foreign_key: &'static str,
    pub flag: DeletionFlag,
}

/// One delete statement run before the row itself is removed.
#[derive(Debug, Clone, Copy)]
pub enum PurgeStep {
    /// `DELETE FROM table WHERE column = :id`
    Direct {
        table: &'static str,
        column: &'static str,
    },
    /// `DELETE FROM table WHERE column IN (SELECT id FROM parent WHERE parent_fk = :id)`
    Through {
        table: &'static str,
        column: &'static str,
        parent_table: &'static str,
        parent_fk: &'static str,
    },
}

impl PurgeStep {
    pub fn table(&self) -> &'static str {
        match self {
            PurgeStep::Direct { table, .. } | PurgeStep::Through { table, .. } => table,
        }
    }
}

/// Rows that may never be permanently deleted: `column = value`.
#[derive(Debug, Clone, Copy)]
pub struct ProtectedRow {
    pub column: &'static str,
    pub value: &'static str,
}

/// Everything the lifecycle engine needs to know about one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub table: &'static str,
    pub flag: DeletionFlag,
    pub deleted_at: Option<&'static str>,
    pub updated_at: Option<&'static str>,
    /// Column shown in purge summaries
    pub display_column: &'static str,
    pub cascade: &'static [CascadeChild],
    /// Statements run in order before the row is deleted
    pub purge_order: &'static [PurgeStep],
    pub protected: Option<ProtectedRow>,
    /// Whether the acting user is forbidden from deleting this row when it is their own
    pub self_guarded: bool,
}

pub static OFFICE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Office,
    table: "offices",
    flag: DeletionFlag::is_deleted(),
    deleted_at: Some("deleted_at"),
    updated_at: Some("updated_at"),
    display_column: "name",
    cascade: &[CascadeChild {
        table: "devices",
        foreign_key: "office_id",
        flag: DeletionFlag::is_deleted(),
    }],
    purge_order: &[
        PurgeStep::Through {
            table: "usage_records",
            column: "device_id",
            parent_table: "devices",
            parent_fk: "office_id",
        },
        PurgeStep::Direct { table: "payment_intents", column: "office_id" },
        PurgeStep::Direct { table: "invoices", column: "office_id" },
        PurgeStep::Direct { table: "devices", column: "office_id" },
    ],
    protected: None,
    self_guarded: false,
};

pub static DEVICE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Device,
    table: "devices",
    flag: DeletionFlag::is_deleted(),
    deleted_at: None,
    updated_at: Some("updated_at"),
    display_column: "serial_number",
    cascade: &[],
    purge_order: &[PurgeStep::Direct { table: "usage_records", column: "device_id" }],
    protected: None,
    self_guarded: false,
};

pub static INVOICE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Invoice,
    table: "invoices",
    flag: DeletionFlag::is_deleted(),
    deleted_at: Some("deleted_at"),
    updated_at: None,
    display_column: "invoice_number",
    cascade: &[],
    purge_order: &[PurgeStep::Direct { table: "payment_intents", column: "invoice_id" }],
    protected: None,
    self_guarded: false,
};

/// `payment_intents.user_id` is `ON DELETE SET NULL`, so users purge alone.
pub static USER: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::User,
    table: "users",
    flag: DeletionFlag::is_active(),
    deleted_at: None,
    updated_at: Some("updated_at"),
    display_column: "username",
    cascade: &[],
    purge_order: &[],
    protected: Some(ProtectedRow { column: "role", value: ROLE_ADMIN }),
    self_guarded: true,
};

/// Descriptor for an entity kind.
pub fn descriptor(kind: EntityKind) -> &'static EntityDescriptor {
    match kind {
        EntityKind::Office => &OFFICE,
        EntityKind::Device => &DEVICE,
        EntityKind::Invoice => &INVOICE,
        EntityKind::User => &USER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_lookup_matches_kind() {
        for kind in [EntityKind::Office, EntityKind::Device, EntityKind::Invoice, EntityKind::User] {
            assert_eq!(descriptor(kind).kind, kind);
        }
    }

    #[test]
    fn test_office_purge_removes_children_before_parents() {
        let tables: Vec<_> = OFFICE.purge_order.iter().map(PurgeStep::table).collect();
        assert_eq!(tables, vec!["usage_records", "payment_intents", "invoices", "devices"]);
    }

    #[test]
    fn test_user_flag_is_inverted() {
        assert!(!USER.flag.deleted_value);
        assert!(USER.flag.active_value());
        assert!(OFFICE.flag.deleted_value);
    }

    #[test]
    fn test_only_users_are_guarded() {
        assert!(USER.self_guarded && USER.protected.is_some());
        assert!(!OFFICE.self_guarded && OFFICE.protected.is_none());
    }
}
