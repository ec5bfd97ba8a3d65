use super::Role;

/// One capability flag, used to ask about a single column of [`Capabilities`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
pub enum Capability {
    /// Create and edit catalog entries (categories, products, variants)
    Create,
    /// Storage administration (locations, shelves, levels)
    Storage,
    /// Recording and viewing sales
    Sales,
    /// The audit log
    Audits,
}

/// Flags derived from the role. Never stored, always recomputed from the role
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_create: bool,
    pub can_access_storage: bool,
    pub can_access_sales: bool,
    pub can_access_audits: bool,
}

impl Capabilities {
    /// No capabilities at all, used for no role and anything unknown
    pub const NONE: Self = Self {
        can_create: false,
        can_access_storage: false,
        can_access_sales: false,
        can_access_audits: false,
    };

    pub fn for_role(role: Option<Role>) -> Self {
        let Some(role) = role else {
            return Self::NONE;
        };
        match role {
            Role::Owner => Self {
                can_create: true,
                can_access_storage: true,
                can_access_sales: true,
                can_access_audits: true,
            },
            Role::Admin => Self {
                can_create: true,
                can_access_storage: true,
                can_access_sales: true,
                can_access_audits: false,
            },
            Role::Seller => Self::NONE,
            Role::Editor => Self {
                can_create: true,
                ..Self::NONE
            },
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Create => self.can_create,
            Capability::Storage => self.can_access_storage,
            Capability::Sales => self.can_access_sales,
            Capability::Audits => self.can_access_audits,
        }
    }
}

impl From<Option<Role>> for Capabilities {
    fn from(value: Option<Role>) -> Self {
        Self::for_role(value)
    }
}
