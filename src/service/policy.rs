//! Policy reads and writes.
//!
//! [`PolicySnapshot`] is the request-scoped cache: built once at the start of
//! an operation and dropped with it, so a run never sees a policy older than
//! its own start. [`PolicyService`] is the write path and the only place the
//! legal floors are enforced.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::PolicySet;
use crate::error::EngineResult;

use super::repository::{PolicyDocument, PolicyProvider};

/// Every policy of one company, captured at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySnapshot {
    /// Company the policies belong to.
    pub company_id: String,
    /// The six fully-defaulted configs.
    pub policies: PolicySet,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
}

impl PolicySnapshot {
    /// Reads all six domains for `company_id`.
    pub async fn capture(provider: &dyn PolicyProvider, company_id: &str) -> EngineResult<Self> {
        let captured_at = Utc::now();
        let (attendance, breaks, overtime, payroll, allowance, deduction) = tokio::try_join!(
            provider.attendance_config(company_id),
            provider.break_config(company_id),
            provider.overtime_config(company_id),
            provider.payroll_config(company_id),
            provider.allowance_config(company_id),
            provider.deduction_config(company_id),
        )?;
        Ok(Self {
            company_id: company_id.to_string(),
            policies: PolicySet {
                attendance,
                breaks,
                overtime,
                payroll,
                allowance,
                deduction,
            },
            captured_at,
        })
    }
}

/// Validated policy updates.
#[derive(Clone)]
pub struct PolicyService {
    provider: Arc<dyn PolicyProvider>,
}

impl PolicyService {
    /// Creates a service writing through `provider`.
    pub fn new(provider: Arc<dyn PolicyProvider>) -> Self {
        Self { provider }
    }

    /// Validates and stores one policy document.
    ///
    /// The document is merged with defaults and checked before anything is
    /// written. Break and overtime documents are checked against the locale of
    /// the company's current attendance policy; a new attendance policy
    /// re-checks the stored break and overtime policies against its locale.
    ///
    /// # Errors
    ///
    /// `PolicyViolation` when a value is below the jurisdiction's legal
    /// floor, `Validation` when the document is internally inconsistent.
    pub async fn update(&self, company_id: &str, document: PolicyDocument) -> EngineResult<()> {
        match &document {
            PolicyDocument::Attendance(doc) => {
                let attendance = doc.clone().merge_with_defaults();
                let breaks = self.provider.break_config(company_id).await?;
                let overtime = self.provider.overtime_config(company_id).await?;
                breaks.validate(&attendance.locale)?;
                overtime.validate(&attendance.locale)?;
            }
            PolicyDocument::Break(doc) => {
                let locale = self.current_locale(company_id).await?;
                doc.clone().merge_with_defaults().validate(&locale)?;
            }
            PolicyDocument::Overtime(doc) => {
                let locale = self.current_locale(company_id).await?;
                doc.clone().merge_with_defaults().validate(&locale)?;
            }
            PolicyDocument::Payroll(doc) => {
                doc.clone().merge_with_defaults().validate()?;
            }
            PolicyDocument::Allowance(_) | PolicyDocument::Deduction(_) => {}
        }

        self.provider.save_policy(company_id, document).await?;
        tracing::info!(company_id, "policy updated");
        Ok(())
    }

    async fn current_locale(&self, company_id: &str) -> EngineResult<String> {
        Ok(self.provider.attendance_config(company_id).await?.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AttendanceConfigDocument, BreakConfigDocument, OvertimeConfigDocument};
    use crate::error::EngineError;
    use crate::service::InMemoryStore;
    use rust_decimal::Decimal;

    fn service() -> (PolicyService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (PolicyService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_snapshot_reflects_saved_documents() {
        let (service, store) = service();
        service
            .update(
                "acme",
                PolicyDocument::Attendance(AttendanceConfigDocument {
                    late_grace_minutes: Some(5),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();

        let snapshot = PolicySnapshot::capture(store.as_ref(), "acme").await.unwrap();
        assert_eq!(snapshot.company_id, "acme");
        assert_eq!(snapshot.policies.attendance.late_grace_minutes, 5);
        assert_eq!(snapshot.policies.breaks.maximum_break_minutes, Some(90));
    }

    #[tokio::test]
    async fn test_break_below_legal_minimum_is_rejected_and_not_stored() {
        let (service, store) = service();
        let err = service
            .update(
                "acme",
                PolicyDocument::Break(BreakConfigDocument {
                    minimum_break_minutes: Some(30),
                    use_legal_minimum: Some(true),
                    ..Default::default()
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PolicyViolation { .. }));
        assert_eq!(
            store.break_config("acme").await.unwrap().minimum_break_minutes,
            45
        );
    }

    #[tokio::test]
    async fn test_overtime_below_legal_multiplier_is_rejected() {
        let (service, _) = service();
        let err = service
            .update(
                "acme",
                PolicyDocument::Overtime(OvertimeConfigDocument {
                    regular_multiplier: Some(Decimal::new(110, 2)),
                    use_legal_minimum: Some(true),
                    ..Default::default()
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PolicyViolation { .. }));
    }

    #[tokio::test]
    async fn test_locale_change_revalidates_stored_policies() {
        let (service, _) = service();
        // 1.25 satisfies ja-JP but not ko-KR (1.5).
        service
            .update(
                "acme",
                PolicyDocument::Overtime(OvertimeConfigDocument {
                    use_legal_minimum: Some(true),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();

        let err = service
            .update(
                "acme",
                PolicyDocument::Attendance(AttendanceConfigDocument {
                    locale: Some("ko-KR".to_string()),
                    ..Default::default()
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PolicyViolation { .. }));
    }
}
