use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, TimeZone};

use crate::features::devices::DeviceTokenStore;
use crate::features::reports::models::Report;
use crate::modules::mail::{MailClient, MailError, MailMessage};
use crate::modules::push::{DeliveryResult, FcmClient, PushError, PushMessage};
use crate::shared::constants::MISSING_FIELD_PLACEHOLDER;
use crate::shared::datetime::display_timestamp;

/// Fans a newly stored report out to push and email channels.
///
/// Every channel runs as a detached task: a failed or slow delivery never
/// reaches the submitting client, and nothing is retried.
pub struct AlertService {
    device_tokens: Arc<dyn DeviceTokenStore>,
    push: Option<Arc<FcmClient>>,
    mail: Option<Arc<MailClient>>,
}

impl AlertService {
    pub fn new(
        device_tokens: Arc<dyn DeviceTokenStore>,
        push: Option<Arc<FcmClient>>,
        mail: Option<Arc<MailClient>>,
    ) -> Self {
        if push.is_none() {
            tracing::warn!("Push notifications disabled (FCM credentials not configured)");
        }
        if mail.is_none() {
            tracing::warn!("Email alerts disabled (mail API not configured)");
        }

        Self {
            device_tokens,
            push,
            mail,
        }
    }

    /// Spawn the push and email alerts for `report` and return immediately
    pub fn dispatch(&self, report: &Report) {
        if let Some(push) = &self.push {
            let push = Arc::clone(push);
            let device_tokens = Arc::clone(&self.device_tokens);
            let report = report.clone();

            tokio::spawn(async move {
                let tokens = match device_tokens.all_tokens().await {
                    Ok(tokens) => tokens,
                    Err(e) => {
                        tracing::error!(
                            "Skipping push for report {}: failed to load device tokens: {}",
                            report.id,
                            e
                        );
                        return;
                    }
                };

                match notify(&push, &report, &tokens).await {
                    Ok(result) => tracing::info!(
                        "Push for report {}: {} delivered, {} failed",
                        report.id,
                        result.success_count,
                        result.failure_count
                    ),
                    Err(e) => tracing::error!("Push for report {} failed: {}", report.id, e),
                }
            });
        }

        if let Some(mail) = &self.mail {
            let mail = Arc::clone(mail);
            let report = report.clone();

            tokio::spawn(async move {
                match send_alert(&mail, &report).await {
                    Ok(()) => tracing::info!("Email alert sent for report {}", report.id),
                    Err(e) => {
                        tracing::error!("Email alert for report {} failed: {}", report.id, e)
                    }
                }
            });
        }
    }
}

/// Push `report` to every device; no devices means nothing to do
pub async fn notify(
    client: &FcmClient,
    report: &Report,
    tokens: &[String],
) -> Result<DeliveryResult, PushError> {
    if tokens.is_empty() {
        tracing::debug!("No registered devices, skipping push for {}", report.id);
        return Ok(DeliveryResult::default());
    }

    client
        .send_multicast(&build_push_message(report), tokens)
        .await
}

/// Email the report summary to the configured recipient
pub async fn send_alert(client: &MailClient, report: &Report) -> Result<(), MailError> {
    client.send(&compose_alert_email(report, &Local)).await
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(MISSING_FIELD_PLACEHOLDER)
}

pub fn build_push_message(report: &Report) -> PushMessage {
    let severity = field(&report.severity);

    PushMessage {
        title: format!("{} Emergency!", severity),
        body: format!(
            "{} - {} at {}",
            field(&report.patient_name),
            field(&report.incident),
            field(&report.location)
        ),
        data: HashMap::from([
            ("reportId".to_string(), report.id.to_string()),
            ("severity".to_string(), severity.to_string()),
        ]),
    }
}

pub fn compose_alert_email<Tz>(report: &Report, tz: &Tz) -> MailMessage
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let text = format!(
        "A new emergency report has been submitted.\n\
         \n\
         Role: {}\n\
         Patient Name: {}\n\
         Location: {}\n\
         Incident: {}\n\
         Severity: {}\n\
         Symptoms: {}\n\
         Reported At: {}\n\
         Report ID: {}\n",
        field(&report.role),
        field(&report.patient_name),
        field(&report.location),
        field(&report.incident),
        field(&report.severity),
        field(&report.symptoms),
        display_timestamp(&report.created_at, tz),
        report.id,
    );

    MailMessage {
        subject: format!("New Emergency Report: {}", field(&report.severity)),
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{MailConfig, PushConfig};
    use crate::shared::test_helpers::{report_at, spawn_stub, InMemoryDeviceTokenStore};
    use axum::{routing::post, Json, Router};
    use chrono::Utc;
    use serde_json::Value;
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// FCM client whose token exchange can never succeed
    fn unreachable_fcm() -> Arc<FcmClient> {
        let config = PushConfig {
            project_id: "clinick".to_string(),
            client_email: "push@clinick.iam.gserviceaccount.com".to_string(),
            private_key: include_str!("../../../modules/push/testdata/service_account_key.pem")
                .to_string(),
            // Nothing listens on the discard port
            token_uri: "http://127.0.0.1:9/token".to_string(),
        };
        Arc::new(FcmClient::new(&config).unwrap())
    }

    fn jane_report() -> Report {
        let mut report = report_at(Utc.with_ymd_and_hms(2025, 3, 14, 15, 4, 5).unwrap());
        report.role = Some("reporter".to_string());
        report.patient_name = Some("Jane".to_string());
        report.location = Some("Zone A".to_string());
        report.incident = Some("fall".to_string());
        report.severity = Some("high".to_string());
        report.symptoms = Some("dizzy".to_string());
        report
    }

    #[test]
    fn test_push_message_content() {
        let report = jane_report();
        let message = build_push_message(&report);

        assert_eq!(message.title, "high Emergency!");
        assert_eq!(message.body, "Jane - fall at Zone A");
        assert_eq!(message.data["reportId"], report.id.to_string());
        assert_eq!(message.data["severity"], "high");
    }

    #[test]
    fn test_push_message_missing_fields() {
        let message = build_push_message(&report_at(Utc::now()));
        assert_eq!(message.title, "Unknown Emergency!");
        assert_eq!(message.body, "Unknown - Unknown at Unknown");
    }

    #[test]
    fn test_alert_email_lists_every_field() {
        let report = jane_report();
        let mail = compose_alert_email(&report, &Utc);

        assert_eq!(mail.subject, "New Emergency Report: high");
        for line in [
            "Role: reporter",
            "Patient Name: Jane",
            "Location: Zone A",
            "Incident: fall",
            "Severity: high",
            "Symptoms: dizzy",
            "Reported At: 3/14/2025, 3:04:05 PM",
        ] {
            assert!(mail.text.contains(line), "missing line: {}", line);
        }
        assert!(mail.text.contains(&report.id.to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_without_channels_is_noop() {
        let service = AlertService::new(Arc::new(InMemoryDeviceTokenStore::default()), None, None);
        service.dispatch(&jane_report());
    }

    #[tokio::test]
    async fn test_notify_without_devices_skips_fcm() {
        // Any request would fail on the dead token endpoint
        let result = notify(&unreachable_fcm(), &jane_report(), &[]).await.unwrap();
        assert_eq!(result, DeliveryResult::default());
    }

    #[tokio::test]
    async fn test_notify_surfaces_auth_failure() {
        let result = notify(&unreachable_fcm(), &jane_report(), &["dev-1".to_string()]).await;
        assert!(matches!(result, Err(PushError::Auth(_))));
    }

    #[tokio::test]
    async fn test_dispatch_mails_even_when_push_fails() {
        let subjects = Arc::new(Mutex::new(Vec::<String>::new()));
        let recorded = Arc::clone(&subjects);
        let base = spawn_stub(Router::new().route(
            "/send",
            post(move |Json(body): Json<Value>| {
                let recorded = Arc::clone(&recorded);
                async move {
                    let subject = body["subject"].as_str().unwrap_or_default().to_string();
                    recorded.lock().await.push(subject);
                }
            }),
        ))
        .await;

        let device_tokens = Arc::new(InMemoryDeviceTokenStore::default());
        device_tokens.register_if_absent("dev-1").await.unwrap();
        let mail = MailClient::new(MailConfig {
            api_url: format!("{}/send", base),
            api_key: "mail-key".to_string(),
            from: "alerts@clinick.test".to_string(),
            to: "dispatch@clinick.test".to_string(),
        });
        let service = AlertService::new(device_tokens, Some(unreachable_fcm()), Some(Arc::new(mail)));

        service.dispatch(&jane_report());

        for _ in 0..100 {
            if !subjects.lock().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(*subjects.lock().await, vec!["New Emergency Report: high"]);
    }
}
