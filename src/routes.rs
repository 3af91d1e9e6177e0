//! Fixed route table.
//!
//! Every page exists twice: under its production path, gated and backed by
//! live data, and under [`DEMO_PREFIX`] with static sample data.

use crate::backend::Role;

pub const LOGIN: &str = "/login";
pub const LOGOUT: &str = "/logout";
pub const DASHBOARD: &str = "/dashboard";
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
pub const DEMO_PREFIX: &str = "/demo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    AdminDashboard,
    Inventory,
    Devices,
    Suppliers,
    Billing,
    Patients,
    Tickets,
    Analytics,
    Maintenance,
}

impl Page {
    pub const ALL: [Self; 10] = [
        Self::Dashboard,
        Self::AdminDashboard,
        Self::Inventory,
        Self::Devices,
        Self::Suppliers,
        Self::Billing,
        Self::Patients,
        Self::Tickets,
        Self::Analytics,
        Self::Maintenance,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Dashboard => DASHBOARD,
            Self::AdminDashboard => ADMIN_DASHBOARD,
            Self::Inventory => "/inventory",
            Self::Devices => "/devices",
            Self::Suppliers => "/suppliers",
            Self::Billing => "/billing",
            Self::Patients => "/patients",
            Self::Tickets => "/tickets",
            Self::Analytics => "/analytics",
            Self::Maintenance => "/maintenance",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::AdminDashboard => "Admin Dashboard",
            Self::Inventory => "Inventory",
            Self::Devices => "Devices",
            Self::Suppliers => "Suppliers",
            Self::Billing => "Billing",
            Self::Patients => "Patients",
            Self::Tickets => "Tickets",
            Self::Analytics => "Analytics",
            Self::Maintenance => "Maintenance",
        }
    }

    pub fn admin_only(self) -> bool {
        self == Self::AdminDashboard
    }

    /// Resolve a production path; demo paths are resolved after stripping
    /// the prefix.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.strip_prefix(DEMO_PREFIX).unwrap_or(path);
        Self::ALL.into_iter().find(|page| page.path() == path)
    }
}

/// Which half of the route table a page is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Live,
    Demo,
}

impl Namespace {
    pub fn href(self, page: Page) -> String {
        match self {
            Self::Live => page.path().to_string(),
            Self::Demo => demo_path(page.path()),
        }
    }

    pub fn is_demo(self) -> bool {
        self == Self::Demo
    }
}

/// Mirror a production path into the demo namespace.
pub fn demo_path(path: &str) -> String {
    format!("{DEMO_PREFIX}{path}")
}

/// Where a freshly signed-in user lands.
pub fn landing_route(role: Role) -> &'static str {
    if role.is_admin() {
        ADMIN_DASHBOARD
    } else {
        DASHBOARD
    }
}
