// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Staff roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AuthError;

// =============================================================================
// Role
// =============================================================================

/// Closed set of staff roles carried in the `role` token claim.
///
/// Roles are flat: no role implies another. Broader access is expressed in the
/// rule table as a role-set predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Builds itineraries and handles consultant bookings.
    SeniorTravelConsultant,
    /// Handles reservations and customer support.
    CustomerServiceExecutive,
    /// Runs promotions and campaigns.
    MarketingManager,
    /// Oversees the agency.
    GeneralManager,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [
        Role::SeniorTravelConsultant,
        Role::CustomerServiceExecutive,
        Role::MarketingManager,
        Role::GeneralManager,
    ];

    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SeniorTravelConsultant => "SENIOR_TRAVEL_CONSULTANT",
            Role::CustomerServiceExecutive => "CUSTOMER_SERVICE_EXECUTIVE",
            Role::MarketingManager => "MARKETING_MANAGER",
            Role::GeneralManager => "GENERAL_MANAGER",
        }
    }

    /// Parses a role from its wire name.
    ///
    /// Matching is case-insensitive and tolerates the `ROLE_` authority prefix.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        Role::ALL.into_iter().find(|role| role.as_str() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| AuthError::configuration(format!("unknown role '{}'", s)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("GENERAL_MANAGER"), Some(Role::GeneralManager));
        assert_eq!(Role::parse("marketing_manager"), Some(Role::MarketingManager));
        assert_eq!(
            Role::parse("ROLE_SENIOR_TRAVEL_CONSULTANT"),
            Some(Role::SeniorTravelConsultant)
        );
        assert_eq!(Role::parse("ADMIN"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_wire_name_matches_serde() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn test_role_from_str_error() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert!(err.is_configuration());
    }
}
