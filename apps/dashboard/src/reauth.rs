use client_core::ClientError;

/// Whether `err` means the stored token is dead. Walks the whole source
/// chain, so a backend rejection wrapped by the wizard still counts.
pub fn clears_session(err: &anyhow::Error) -> bool {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ClientError>())
        .is_some_and(ClientError::requires_reauth)
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use campaign_wizard::WizardError;
    use shared::error::{ApiError, ErrorCode};

    use super::*;

    fn http(status: u16) -> ClientError {
        ClientError::Http {
            status,
            error: ApiError::new(ErrorCode::from_status(status), "rejected"),
        }
    }

    #[test]
    fn backend_rejection_clears() {
        assert!(clears_session(&anyhow::Error::new(http(401))));
        assert!(clears_session(&anyhow::Error::new(http(403))));
    }

    #[test]
    fn rejection_inside_wizard_submission_clears() {
        let err = anyhow::Error::new(WizardError::Submission {
            source: anyhow::Error::new(http(401)),
        });
        assert!(clears_session(&err));

        let err = Err::<(), _>(err)
            .context("campaign create failed")
            .expect_err("wrapped");
        assert!(clears_session(&err));
    }

    #[test]
    fn server_failure_keeps_session() {
        assert!(!clears_session(&anyhow::Error::new(http(500))));
        let err = anyhow::Error::new(WizardError::Submission {
            source: anyhow::Error::new(http(502)),
        });
        assert!(!clears_session(&err));
    }

    #[test]
    fn company_less_session_is_kept() {
        assert!(!clears_session(&anyhow::Error::new(ClientError::NoCompany)));
    }

    #[test]
    fn undecodable_token_clears() {
        let err = anyhow::Error::new(ClientError::InvalidToken("not base64".into()));
        assert!(clears_session(&err));
    }

    #[test]
    fn unrelated_errors_keep_session() {
        assert!(!clears_session(&anyhow::anyhow!("disk full")));
    }
}
