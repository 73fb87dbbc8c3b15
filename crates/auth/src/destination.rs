use serde::{Serialize, Serializer};

/// Every place the gateway can send a browser.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    SignIn,
    /// Sign-in page with the `access_denied` indicator.
    AccessDenied,
    StoreDashboard,
    RestaurantDashboard,
    Callback,
}

impl Destination {
    pub fn path(self) -> &'static str {
        match self {
            Self::SignIn => "/sign-in",
            Self::AccessDenied => "/sign-in?error=access_denied",
            Self::StoreDashboard => "/store/dashboard",
            Self::RestaurantDashboard => "/restaurant/dashboard",
            Self::Callback => "/callback",
        }
    }
}

impl core::fmt::Display for Destination {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.path())
    }
}

impl Serialize for Destination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}
