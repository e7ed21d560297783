use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum::text_enum;

text_enum! {
    /// A member's standing in the organization
    pub enum Role {
        Admin => "admin",
        /// Committee board member
        Board => "board",
        /// Resident or student member
        Member => "member",
        Guest => "guest",
    }
}

text_enum! {
    /// A single capability checked by the API
    pub enum Permission {
        InventoryRead => "inventory:read",
        InventoryWrite => "inventory:write",
        TreasuryRead => "treasury:read",
        TreasuryWrite => "treasury:write",
        MailRead => "mail:read",
        MailWrite => "mail:write",
        FaqRead => "faq:read",
        FaqWrite => "faq:write",
        PollsVote => "polls:vote",
        PollsManage => "polls:manage",
        UsersManage => "users:manage",
    }
}

impl Role {
    /// The permissions granted to this role
    pub fn permissions(&self) -> Vec<Permission> {
        use Permission::*;
        match self {
            Role::Admin => Permission::ALL.to_vec(),
            Role::Board => Permission::ALL
                .iter()
                .copied()
                .filter(|p| *p != UsersManage)
                .collect(),
            Role::Member => vec![InventoryRead, TreasuryRead, FaqRead, PollsVote],
            Role::Guest => vec![FaqRead],
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

/// A person known to the portal
///
/// Authentication happens upstream; the portal only stores identity and
/// role.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    id: String,
    name: String,
    email: String,
    role: Role,
    created_at: NaiveDateTime,
}

impl User {
    pub fn new(name: String, email: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            role,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub fn get_role(&self) -> Role {
        self.role
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
