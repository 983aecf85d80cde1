use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed role hierarchy. Ordering matters: capability grants are monotonic
/// in rank, with the single exception of role assignment (see
/// [`has_permission`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    BeginnerFighter,
    EliteFighter,
    TribeLeader,
    Admin,
    SiteAdmin,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::User,
        Role::BeginnerFighter,
        Role::EliteFighter,
        Role::TribeLeader,
        Role::Admin,
        Role::SiteAdmin,
    ];

    /// Parses a stored role string. Anything unrecognized resolves to the
    /// lowest role, so a corrupted or stale value can never widen access.
    pub fn parse(s: &str) -> Role {
        match s {
            "user" => Role::User,
            "beginner_fighter" => Role::BeginnerFighter,
            "elite_fighter" => Role::EliteFighter,
            "tribe_leader" => Role::TribeLeader,
            "admin" => Role::Admin,
            "site_admin" => Role::SiteAdmin,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::BeginnerFighter => "beginner_fighter",
            Role::EliteFighter => "elite_fighter",
            Role::TribeLeader => "tribe_leader",
            Role::Admin => "admin",
            Role::SiteAdmin => "site_admin",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Role::User => 0,
            Role::BeginnerFighter => 1,
            Role::EliteFighter => 2,
            Role::TribeLeader => 3,
            Role::Admin => 4,
            Role::SiteAdmin => 5,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "مستخدم",
            Role::BeginnerFighter => "مقاتل مبتدئ",
            Role::EliteFighter => "مقاتل نخبة",
            Role::TribeLeader => "زعيم قبيلة",
            Role::Admin => "مشرف",
            Role::SiteAdmin => "مدير الموقع",
        }
    }

    pub fn color_tag(&self) -> &'static str {
        match self {
            Role::User => "#95a5a6",
            Role::BeginnerFighter => "#2ecc71",
            Role::EliteFighter => "#3498db",
            Role::TribeLeader => "#9b59b6",
            Role::Admin => "#e67e22",
            Role::SiteAdmin => "#e74c3c",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::BeginnerFighter => "sword",
            Role::EliteFighter => "crossed-swords",
            Role::TribeLeader => "banner",
            Role::Admin => "shield",
            Role::SiteAdmin => "crown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CanSubmitContent,
    CanModerateComments,
    CanDeleteAnyComment,
    CanViewReports,
    CanEditAnyComment,
    CanPinComments,
    CanResolveReports,
    CanPublishDirectly,
    CanBanUsers,
    CanManageUsers,
    CanAssignRoles,
}

impl Capability {
    pub const ALL: [Capability; 11] = [
        Capability::CanSubmitContent,
        Capability::CanModerateComments,
        Capability::CanDeleteAnyComment,
        Capability::CanViewReports,
        Capability::CanEditAnyComment,
        Capability::CanPinComments,
        Capability::CanResolveReports,
        Capability::CanPublishDirectly,
        Capability::CanBanUsers,
        Capability::CanManageUsers,
        Capability::CanAssignRoles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CanSubmitContent => "can_submit_content",
            Capability::CanModerateComments => "can_moderate_comments",
            Capability::CanDeleteAnyComment => "can_delete_any_comment",
            Capability::CanViewReports => "can_view_reports",
            Capability::CanEditAnyComment => "can_edit_any_comment",
            Capability::CanPinComments => "can_pin_comments",
            Capability::CanResolveReports => "can_resolve_reports",
            Capability::CanPublishDirectly => "can_publish_directly",
            Capability::CanBanUsers => "can_ban_users",
            Capability::CanManageUsers => "can_manage_users",
            Capability::CanAssignRoles => "can_assign_roles",
        }
    }

    pub fn parse(s: &str) -> Option<Capability> {
        match s {
            "can_submit_content" => Some(Capability::CanSubmitContent),
            "can_moderate_comments" => Some(Capability::CanModerateComments),
            "can_delete_any_comment" => Some(Capability::CanDeleteAnyComment),
            "can_view_reports" => Some(Capability::CanViewReports),
            "can_edit_any_comment" => Some(Capability::CanEditAnyComment),
            "can_pin_comments" => Some(Capability::CanPinComments),
            "can_resolve_reports" => Some(Capability::CanResolveReports),
            "can_publish_directly" => Some(Capability::CanPublishDirectly),
            "can_ban_users" => Some(Capability::CanBanUsers),
            "can_manage_users" => Some(Capability::CanManageUsers),
            "can_assign_roles" => Some(Capability::CanAssignRoles),
            _ => None,
        }
    }
}

/// Static grant matrix. Grants are monotonic in rank: a capability held at
/// some rank is held by every higher rank. `can_assign_roles` deliberately
/// breaks monotonicity — it belongs to `site_admin` alone, so no lower rank
/// can promote itself.
pub fn has_permission(role: Role, capability: Capability) -> bool {
    use Capability::*;
    match capability {
        CanAssignRoles => role == Role::SiteAdmin,
        CanSubmitContent => role.rank() >= Role::BeginnerFighter.rank(),
        CanModerateComments | CanDeleteAnyComment | CanViewReports => {
            role.rank() >= Role::EliteFighter.rank()
        }
        CanEditAnyComment | CanPinComments | CanResolveReports => {
            role.rank() >= Role::TribeLeader.rank()
        }
        CanPublishDirectly | CanBanUsers | CanManageUsers => role.rank() >= Role::Admin.rank(),
    }
}

/// String-keyed lookup for callers that hold a capability name rather than
/// the enum. Unknown names resolve to `false`: permission checks gate
/// sensitive actions and must fail closed, never open.
pub fn has_permission_named(role: Role, capability: &str) -> bool {
    Capability::parse(capability).is_some_and(|cap| has_permission(role, cap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_are_monotonic_in_rank() {
        for cap in Capability::ALL {
            if cap == Capability::CanAssignRoles {
                continue;
            }
            for pair in Role::ALL.windows(2) {
                let (lower, higher) = (pair[0], pair[1]);
                if has_permission(lower, cap) {
                    assert!(
                        has_permission(higher, cap),
                        "{:?} grants {:?} but {:?} does not",
                        lower,
                        cap,
                        higher
                    );
                }
            }
        }
    }

    #[test]
    fn assign_roles_is_site_admin_only() {
        for role in Role::ALL {
            assert_eq!(
                has_permission(role, Capability::CanAssignRoles),
                role == Role::SiteAdmin
            );
        }
    }

    #[test]
    fn unknown_role_string_falls_back_to_user() {
        let role = Role::parse("super_mega_admin");
        assert_eq!(role, Role::User);
        assert!(!has_permission(role, Capability::CanModerateComments));
    }

    #[test]
    fn unknown_capability_name_is_denied() {
        assert!(!has_permission_named(Role::SiteAdmin, "can_do_anything"));
    }

    #[test]
    fn elite_fighter_moderates_but_cannot_ban() {
        assert!(has_permission(
            Role::EliteFighter,
            Capability::CanModerateComments
        ));
        assert!(!has_permission(Role::EliteFighter, Capability::CanBanUsers));
    }

    #[test]
    fn presentation_accessors_are_total() {
        for role in Role::ALL {
            assert!(!role.display_name().is_empty());
            assert!(role.color_tag().starts_with('#'));
            assert!(!role.icon().is_empty());
        }
    }
}
