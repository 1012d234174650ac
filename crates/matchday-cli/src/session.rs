// Administrator session: the shared-code gate in front of mutations.
//
// This is a convenience switch, not a security boundary. The code lives in
// the same local config file the user can read.

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Guest,
    Admin,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    admin_code: String,
    role: Role,
}

impl Session {
    /// Start a guest session that unlocks with `admin_code`.
    pub fn new(admin_code: impl Into<String>) -> Self {
        Session {
            admin_code: admin_code.into(),
            role: Role::Guest,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Switch to admin if `code` matches. Returns whether the session is now
    /// admin. A wrong code leaves the current role unchanged.
    pub fn login(&mut self, code: &str) -> bool {
        if code == self.admin_code {
            self.role = Role::Admin;
            info!("Admin login");
            true
        } else {
            warn!("Rejected admin login attempt");
            self.is_admin()
        }
    }

    pub fn logout(&mut self) {
        if self.is_admin() {
            info!("Admin logout");
        }
        self.role = Role::Guest;
    }
}
