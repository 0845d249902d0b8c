//! Domain ownership verification service.
//!
//! A verification issues a challenge (TXT record, well-known HTTP path,
//! or emailed code) and later checks the proof. Lifecycle is one-way:
//! `PENDING` moves to `VERIFIED` or `FAILED` exactly once, and expired
//! challenges fail closed.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{
    AuditEvent, DomainVerification, VerificationChallenge, VerificationMethod, VerificationStatus,
    VerifyOutcome,
};
use crate::utils::{generate_email_code, generate_verification_token, http_challenge_path, txt_record_name};

use super::{check_dns_txt, validate_domain, ServiceContext};

const RESOURCE: &str = "verification";
const CHALLENGE_TTL_HOURS: i64 = 24;

/// Domain ownership verification operations.
pub struct VerificationService {
    ctx: Arc<ServiceContext>,
}

impl VerificationService {
    /// Create the service.
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Issue a new challenge for `domain`.
    ///
    /// `email` is required for [`VerificationMethod::Email`] and ignored
    /// otherwise. Email challenges send the code before the verification
    /// is persisted; a mailer failure aborts creation.
    pub async fn create_verification(
        &self,
        user_id: &str,
        domain: &str,
        method: VerificationMethod,
        email: Option<&str>,
    ) -> CoreResult<DomainVerification> {
        validate_domain(domain)?;

        let challenge = match method {
            VerificationMethod::DnsTxt => VerificationChallenge::DnsTxt {
                record_name: txt_record_name(domain),
                record_value: generate_verification_token(),
            },
            VerificationMethod::Http => {
                let token = generate_verification_token();
                VerificationChallenge::Http {
                    path: http_challenge_path(&token),
                    expected_body: token,
                }
            }
            VerificationMethod::Email => {
                let Some(email) = email else {
                    return Err(CoreError::ValidationError(
                        "email is required for EMAIL verification".to_string(),
                    ));
                };
                let code = generate_email_code();
                self.ctx
                    .mailer
                    .send_verification_code(email, domain, &code)
                    .await?;
                VerificationChallenge::Email {
                    email: email.to_string(),
                    code,
                }
            }
        };

        let now = Utc::now();
        let verification = DomainVerification {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            domain: domain.to_string(),
            method,
            challenge,
            status: VerificationStatus::Pending,
            error: None,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::hours(CHALLENGE_TTL_HOURS),
            verified_at: None,
        };

        self.ctx.verification_repository.save(&verification).await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                user_id,
                "verification.create",
                RESOURCE,
                &verification.id,
            ))
            .await;

        Ok(verification)
    }

    /// Check the proof for a pending verification.
    ///
    /// `confirmation_code` is the user-supplied code for EMAIL challenges
    /// and ignored otherwise. The first check that observes the proof (or
    /// a definite mismatch, or expiry) moves the verification to its
    /// terminal status; further calls return
    /// [`CoreError::InvalidState`].
    pub async fn verify(
        &self,
        id: &str,
        confirmation_code: Option<&str>,
    ) -> CoreResult<VerifyOutcome> {
        let mut verification = self.require(id).await?;

        if verification.status.is_terminal() {
            return Err(CoreError::InvalidState {
                operation: "verify".to_string(),
                current: verification.status.to_string(),
            });
        }

        if Utc::now() > verification.expires_at {
            let outcome = VerifyOutcome {
                success: false,
                error: Some("verification challenge expired".to_string()),
            };
            self.finish(&mut verification, &outcome).await?;
            return Ok(outcome);
        }

        let outcome = match &verification.challenge {
            VerificationChallenge::DnsTxt {
                record_name,
                record_value,
            } => check_dns_txt(self.ctx.resolver.as_ref(), record_name, record_value).await,
            VerificationChallenge::Http {
                path,
                expected_body,
            } => self.check_http(&verification.domain, path, expected_body).await,
            VerificationChallenge::Email { code, .. } => {
                let Some(supplied) = confirmation_code else {
                    return Err(CoreError::ValidationError(
                        "confirmation code is required for EMAIL verification".to_string(),
                    ));
                };
                if supplied.trim() == code {
                    VerifyOutcome {
                        success: true,
                        error: None,
                    }
                } else {
                    VerifyOutcome {
                        success: false,
                        error: Some("confirmation code does not match".to_string()),
                    }
                }
            }
        };

        self.finish(&mut verification, &outcome).await?;
        Ok(outcome)
    }

    /// Fetch a verification by id.
    pub async fn get_verification(&self, id: &str) -> CoreResult<DomainVerification> {
        self.require(id).await
    }

    /// All verifications belonging to a user.
    pub async fn get_verifications_for_user(
        &self,
        user_id: &str,
    ) -> CoreResult<Vec<DomainVerification>> {
        self.ctx.verification_repository.find_by_user(user_id).await
    }

    /// All verifications for a domain, across users.
    pub async fn get_verifications_for_domain(
        &self,
        domain: &str,
    ) -> CoreResult<Vec<DomainVerification>> {
        self.ctx.verification_repository.find_by_domain(domain).await
    }

    /// Delete a verification in any state.
    pub async fn delete_verification(&self, id: &str) -> CoreResult<()> {
        let verification = self.require(id).await?;
        self.ctx.verification_repository.delete(id).await?;
        self.ctx
            .audit
            .send(AuditEvent::success(
                &verification.user_id,
                "verification.delete",
                RESOURCE,
                id,
            ))
            .await;
        Ok(())
    }

    async fn check_http(&self, domain: &str, path: &str, expected_body: &str) -> VerifyOutcome {
        // Plain HTTP: the challenge may be checked before the domain has a
        // certificate on the new infrastructure.
        let url = format!("http://{domain}{path}");
        match self.ctx.fetcher.fetch_body(&url).await {
            Ok(body) => {
                if body.trim() == expected_body {
                    VerifyOutcome {
                        success: true,
                        error: None,
                    }
                } else {
                    VerifyOutcome {
                        success: false,
                        error: Some(format!("{url} does not serve the expected token")),
                    }
                }
            }
            Err(e) => VerifyOutcome {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }

    /// Persist the terminal status for a finished check and audit it.
    async fn finish(
        &self,
        verification: &mut DomainVerification,
        outcome: &VerifyOutcome,
    ) -> CoreResult<()> {
        let now = Utc::now();
        verification.updated_at = now;
        if outcome.success {
            verification.status = VerificationStatus::Verified;
            verification.verified_at = Some(now);
            verification.error = None;
        } else {
            verification.status = VerificationStatus::Failed;
            verification.error = outcome.error.clone();
        }
        self.ctx.verification_repository.save(verification).await?;

        let event = if outcome.success {
            AuditEvent::success(
                &verification.user_id,
                "verification.verify",
                RESOURCE,
                &verification.id,
            )
        } else {
            AuditEvent::failure(
                &verification.user_id,
                "verification.verify",
                RESOURCE,
                &verification.id,
                outcome.error.as_deref().unwrap_or("verification failed"),
            )
        };
        self.ctx.audit.send(event).await;
        Ok(())
    }

    async fn require(&self, id: &str) -> CoreResult<DomainVerification> {
        self.ctx
            .verification_repository
            .get(id)
            .await?
            .ok_or_else(|| CoreError::VerificationNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_context;

    #[tokio::test]
    async fn dns_txt_challenge_verifies_when_token_published() {
        let (ctx, handles) = create_test_context();
        let service = VerificationService::new(ctx);

        let verification = service
            .create_verification("u1", "example.com", VerificationMethod::DnsTxt, None)
            .await
            .unwrap();
        let VerificationChallenge::DnsTxt {
            record_name,
            record_value,
        } = verification.challenge.clone()
        else {
            panic!("expected a DNS TXT challenge");
        };
        assert_eq!(record_name, "_orbithost-verify.example.com");

        handles.resolver.set_txt(&record_name, vec![record_value]).await;

        let outcome = service.verify(&verification.id, None).await.unwrap();
        assert!(outcome.success);

        let stored = service.get_verification(&verification.id).await.unwrap();
        assert_eq!(stored.status, VerificationStatus::Verified);
        assert!(stored.verified_at.is_some());
    }

    #[tokio::test]
    async fn dns_txt_mismatch_fails_closed() {
        let (ctx, handles) = create_test_context();
        let service = VerificationService::new(ctx);

        let verification = service
            .create_verification("u1", "example.com", VerificationMethod::DnsTxt, None)
            .await
            .unwrap();
        handles
            .resolver
            .set_txt(
                "_orbithost-verify.example.com",
                vec!["some-other-token".to_string()],
            )
            .await;

        let outcome = service.verify(&verification.id, None).await.unwrap();
        assert!(!outcome.success);

        let stored = service.get_verification(&verification.id).await.unwrap();
        assert_eq!(stored.status, VerificationStatus::Failed);
        assert!(stored.error.is_some());
    }

    #[tokio::test]
    async fn terminal_verification_rejects_reverify() {
        let (ctx, _handles) = create_test_context();
        let service = VerificationService::new(ctx);

        let verification = service
            .create_verification("u1", "example.com", VerificationMethod::DnsTxt, None)
            .await
            .unwrap();
        // No TXT record published, first check fails terminally.
        service.verify(&verification.id, None).await.unwrap();

        let result = service.verify(&verification.id, None).await;
        assert!(matches!(result, Err(CoreError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn expired_challenge_fails_closed() {
        let (ctx, handles) = create_test_context();
        let service = VerificationService::new(ctx.clone());

        let verification = service
            .create_verification("u1", "example.com", VerificationMethod::DnsTxt, None)
            .await
            .unwrap();

        // Force expiry, then publish the correct token anyway.
        let mut stored = ctx
            .verification_repository
            .get(&verification.id)
            .await
            .unwrap()
            .unwrap();
        stored.expires_at = Utc::now() - Duration::hours(1);
        let VerificationChallenge::DnsTxt {
            record_name,
            record_value,
        } = stored.challenge.clone()
        else {
            panic!("expected a DNS TXT challenge");
        };
        ctx.verification_repository.save(&stored).await.unwrap();
        handles.resolver.set_txt(&record_name, vec![record_value]).await;

        let outcome = service.verify(&verification.id, None).await.unwrap();
        assert!(!outcome.success);
        let stored = service.get_verification(&verification.id).await.unwrap();
        assert_eq!(stored.status, VerificationStatus::Failed);
    }

    #[tokio::test]
    async fn http_challenge_compares_trimmed_body() {
        let (ctx, handles) = create_test_context();
        let service = VerificationService::new(ctx);

        let verification = service
            .create_verification("u1", "example.com", VerificationMethod::Http, None)
            .await
            .unwrap();
        let VerificationChallenge::Http {
            path,
            expected_body,
        } = verification.challenge.clone()
        else {
            panic!("expected an HTTP challenge");
        };

        handles
            .fetcher
            .set_body(
                &format!("http://example.com{path}"),
                &format!("{expected_body}\n"),
            )
            .await;

        let outcome = service.verify(&verification.id, None).await.unwrap();
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn email_challenge_requires_address_and_code() {
        let (ctx, handles) = create_test_context();
        let service = VerificationService::new(ctx);

        let missing_email = service
            .create_verification("u1", "example.com", VerificationMethod::Email, None)
            .await;
        assert!(matches!(missing_email, Err(CoreError::ValidationError(_))));

        let verification = service
            .create_verification(
                "u1",
                "example.com",
                VerificationMethod::Email,
                Some("owner@example.com"),
            )
            .await
            .unwrap();
        let sent = handles.mailer.sent().await;
        assert_eq!(sent.len(), 1);

        let missing_code = service.verify(&verification.id, None).await;
        assert!(matches!(missing_code, Err(CoreError::ValidationError(_))));

        let code = sent[0].code.clone();
        let outcome = service.verify(&verification.id, Some(&code)).await.unwrap();
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn domain_accessors() {
        let (ctx, _handles) = create_test_context();
        let service = VerificationService::new(ctx);

        service
            .create_verification("u1", "example.com", VerificationMethod::DnsTxt, None)
            .await
            .unwrap();
        service
            .create_verification("u2", "example.com", VerificationMethod::DnsTxt, None)
            .await
            .unwrap();
        service
            .create_verification("u1", "other.org", VerificationMethod::DnsTxt, None)
            .await
            .unwrap();

        assert_eq!(
            service
                .get_verifications_for_user("u1")
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            service
                .get_verifications_for_domain("example.com")
                .await
                .unwrap()
                .len(),
            2
        );
    }
}
