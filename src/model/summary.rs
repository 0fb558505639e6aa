use serde::Serialize;
use utoipa::ToSchema;

/// Headline counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Summary {
    #[schema(example = 42)]
    pub employees: i64,
    #[schema(example = 120)]
    pub incoming: i64,
    #[schema(example = 87)]
    pub outgoing: i64,
    #[schema(example = 31)]
    pub attendance_today: i64,
}
