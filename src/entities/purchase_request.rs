use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub request_type: String,
    pub request_date: DateTime<Utc>,
    pub status: String,
    pub buyer: Option<String>,
    pub department_id: i64,
    pub purchase_reason: Option<String>,
    pub purchase_reason_detail: Option<String>,
    pub total_items: i32,
    pub notes: Option<String>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub followed_by: Option<String>,
    pub update_status_by: Option<String>,
    pub update_status_reason: Option<String>,
    pub approval_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_request_item::Entity")]
    PurchaseRequestItems,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
}

impl Related<super::purchase_request_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequestItems.def()
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Lifecycle states of a purchase request. `Pending` is the only state with
/// outgoing transitions; the other three are terminal.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PurchaseRequestStatus {
    Pending,
    Approved,
    Revised,
    Rejected,
}

impl PurchaseRequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Revised | Self::Rejected)
        )
    }

    /// Revised and rejected transitions must carry a reason.
    pub fn requires_reason(self) -> bool {
        matches!(self, Self::Revised | Self::Rejected)
    }

    /// Audit-log description for the row written when entering this state.
    pub fn audit_description(self) -> &'static str {
        match self {
            Self::Pending => "Waiting for Approval",
            Self::Approved => "Approved",
            Self::Revised => "Revised",
            Self::Rejected => "Rejected",
        }
    }
}

/// Whether a request covers physical material or services/non-material goods.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RequestType {
    Material,
    NonMaterial,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pending_transitions_to_every_terminal_state() {
        let pending = PurchaseRequestStatus::Pending;
        assert!(pending.can_transition_to(PurchaseRequestStatus::Approved));
        assert!(pending.can_transition_to(PurchaseRequestStatus::Revised));
        assert!(pending.can_transition_to(PurchaseRequestStatus::Rejected));
        assert!(!pending.can_transition_to(PurchaseRequestStatus::Pending));
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        for terminal in [
            PurchaseRequestStatus::Approved,
            PurchaseRequestStatus::Revised,
            PurchaseRequestStatus::Rejected,
        ] {
            assert!(terminal.is_terminal());
            for next in [
                PurchaseRequestStatus::Pending,
                PurchaseRequestStatus::Approved,
                PurchaseRequestStatus::Revised,
                PurchaseRequestStatus::Rejected,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn reason_required_only_for_revised_and_rejected() {
        assert!(PurchaseRequestStatus::Revised.requires_reason());
        assert!(PurchaseRequestStatus::Rejected.requires_reason());
        assert!(!PurchaseRequestStatus::Approved.requires_reason());
        assert!(!PurchaseRequestStatus::Pending.requires_reason());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            PurchaseRequestStatus::Pending,
            PurchaseRequestStatus::Approved,
            PurchaseRequestStatus::Revised,
            PurchaseRequestStatus::Rejected,
        ] {
            let parsed = PurchaseRequestStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
        assert!(PurchaseRequestStatus::from_str("cancelled").is_err());
    }

    #[test]
    fn request_type_uses_kebab_case() {
        assert_eq!(RequestType::NonMaterial.to_string(), "non-material");
        assert_eq!(
            RequestType::from_str("material").unwrap(),
            RequestType::Material
        );
        assert!(RequestType::from_str("Material ").is_err());
    }
}
