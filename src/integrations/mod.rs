use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::domain::{Announcement, Application, Assignment, MaintenanceRequest, MaintenanceStatus};
use crate::error::Result;

pub mod webhook;

pub use webhook::WebhookIntegration;

/// Things that happened in the residence which outside systems may care about.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum HousingEvent {
    ApplicationSubmitted(Application),
    ApplicationApproved { application: Application, assignment: Assignment },
    ApplicationDenied(Application),
    StudentCheckedOut(Assignment),
    MaintenanceSubmitted(MaintenanceRequest),
    MaintenanceStatusChanged { previous: MaintenanceStatus, request: MaintenanceRequest },
    AnnouncementPublished(Announcement),
}

impl HousingEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            HousingEvent::ApplicationSubmitted(_) => "application_submitted",
            HousingEvent::ApplicationApproved { .. } => "application_approved",
            HousingEvent::ApplicationDenied(_) => "application_denied",
            HousingEvent::StudentCheckedOut(_) => "student_checked_out",
            HousingEvent::MaintenanceSubmitted(_) => "maintenance_submitted",
            HousingEvent::MaintenanceStatusChanged { .. } => "maintenance_status_changed",
            HousingEvent::AnnouncementPublished(_) => "announcement_published",
        }
    }
}

#[async_trait]
pub trait Integration: Send + Sync {
    fn name(&self) -> &str;
    fn is_enabled(&self) -> bool;
    async fn health_check(&self) -> Result<()>;
    async fn handle_event(&self, event: &HousingEvent) -> Result<()>;
}

pub struct IntegrationManager {
    integrations: RwLock<Vec<Arc<dyn Integration>>>,
}

impl Default for IntegrationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrationManager {
    pub fn new() -> Self {
        Self {
            integrations: RwLock::new(Vec::new()),
        }
    }

    pub async fn register(&self, integration: Arc<dyn Integration>) {
        if integration.is_enabled() {
            tracing::info!("Registered integration: {}", integration.name());
            self.integrations.write().await.push(integration);
        }
    }

    pub async fn len(&self) -> usize {
        self.integrations.read().await.len()
    }

    /// Fans the event out to every enabled integration. Failures are logged
    /// and never reach the caller.
    pub async fn handle_event(&self, event: HousingEvent) {
        let integrations = self.integrations.read().await;

        for integration in integrations.iter() {
            if !integration.is_enabled() {
                continue;
            }

            match integration.handle_event(&event).await {
                Ok(_) => {
                    tracing::debug!(
                        "Integration {} handled {} event",
                        integration.name(),
                        event.kind()
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "Integration {} failed to handle {} event: {:?}",
                        integration.name(),
                        event.kind(),
                        e
                    );
                }
            }
        }
    }

    pub async fn health_check_all(&self) -> Vec<(String, Result<()>)> {
        let integrations = self.integrations.read().await;
        let mut results = Vec::new();

        for integration in integrations.iter() {
            let name = integration.name().to_string();
            let result = integration.health_check().await;
            results.push((name, result));
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Integration for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn is_enabled(&self) -> bool {
            true
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }

        async fn handle_event(&self, _event: &HousingEvent) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Integration("boom".to_string()));
            }
            Ok(())
        }
    }

    fn sample_event() -> HousingEvent {
        use crate::domain::{AssignmentStatus};
        use chrono::Utc;
        use uuid::Uuid;

        HousingEvent::StudentCheckedOut(Assignment {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            check_in_date: Utc::now().date_naive(),
            check_out_date: Some(Utc::now().date_naive()),
            status: AssignmentStatus::Completed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_failing_integration_does_not_stop_others() {
        let manager = IntegrationManager::new();
        let failing = Arc::new(Counting { calls: AtomicUsize::new(0), fail: true });
        let working = Arc::new(Counting { calls: AtomicUsize::new(0), fail: false });
        manager.register(failing.clone()).await;
        manager.register(working.clone()).await;

        manager.handle_event(sample_event()).await;

        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(working.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let json = serde_json::to_value(sample_event()).unwrap();
        assert_eq!(json["event"], "student_checked_out");
        assert_eq!(json["data"]["status"], "completed");
    }
}
