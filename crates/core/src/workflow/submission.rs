//! Receipt submission intake.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::audit::AuditEvent;
use crate::chat::{ActionButton, AttachmentRef, ButtonStyle, DecisionAction, DecisionContext};
use crate::order::Plan;
use crate::receipt::receipt_file_name;

use super::{messages, OrderWorkflow, SubmissionRequest, WorkflowError};

impl OrderWorkflow {
    /// Handle a `pago` submission.
    ///
    /// All validation happens before any remote call; a refused submission
    /// performs zero store writes and zero chat sends. The returned
    /// `Validation` error carries the refusal text for the dispatcher to
    /// deliver.
    pub async fn handle_submission(&self, req: SubmissionRequest) -> Result<(), WorkflowError> {
        let config = self.config();

        if req.channel_id != config.receipts_channel_id {
            self.refuse_submission(&req.author.id, "wrong_channel").await;
            return Err(WorkflowError::Validation(
                messages::WRONG_CHANNEL.to_string(),
            ));
        }

        let (Some(order_id), Some(plan_raw)) = (req.order_id.clone(), req.plan.clone()) else {
            self.refuse_submission(&req.author.id, "missing_arguments").await;
            return Err(WorkflowError::Validation(messages::pago_usage(
                &config.command_prefix,
            )));
        };

        // The id ends up in button custom_ids and in the receipt file name,
        // so it is restricted to a filesystem- and delimiter-safe alphabet.
        if !is_safe_order_id(&order_id) {
            self.refuse_submission(&req.author.id, "invalid_order_id").await;
            return Err(WorkflowError::Validation(
                messages::INVALID_ORDER_ID.to_string(),
            ));
        }

        let Some(plan) = Plan::parse(&plan_raw) else {
            self.refuse_submission(&req.author.id, "invalid_plan").await;
            return Err(WorkflowError::Validation(
                messages::INVALID_PLAN.to_string(),
            ));
        };

        let Some(attachment) = req.attachments.first().cloned() else {
            self.refuse_submission(&req.author.id, "missing_attachment").await;
            return Err(WorkflowError::Validation(
                messages::MISSING_ATTACHMENT.to_string(),
            ));
        };

        // Validation passed. Acknowledge, then run the remote steps.
        let ack_id = self
            .chat()
            .send_message(&req.channel_id, Some(messages::SUBMISSION_ACK), None, &[])
            .await?;

        let result = self
            .submit_inner(&req, &order_id, plan, &attachment)
            .await;

        match result {
            Ok(()) => {
                self.schedule_cleanup(&req.channel_id, vec![req.message_id.clone(), ack_id]);
                Ok(())
            }
            Err(e) => {
                if let Err(send_err) = self
                    .chat()
                    .send_message(
                        &req.channel_id,
                        Some(&messages::submission_error(&e)),
                        None,
                        &[],
                    )
                    .await
                {
                    warn!("Failed to report submission error: {}", send_err);
                }
                Err(e)
            }
        }
    }

    async fn submit_inner(
        &self,
        req: &SubmissionRequest,
        order_id: &str,
        plan: Plan,
        attachment: &AttachmentRef,
    ) -> Result<(), WorkflowError> {
        let bytes = self.chat().fetch_attachment(&attachment.url).await?;

        let file_name = receipt_file_name(
            order_id,
            &req.author.id,
            Utc::now().timestamp(),
            &attachment.filename,
        );
        let receipt_path = self.receipts().save(&file_name, &bytes).await?;
        debug!("Receipt stored at {}", receipt_path);

        let card = messages::decision_card(
            order_id,
            &req.author.id,
            &req.author.display_name,
            plan,
            req.note.as_deref(),
            &attachment.url,
            Utc::now(),
        );

        let approve = DecisionContext::new(
            DecisionAction::Approve,
            order_id,
            &req.author.id,
            plan,
            &receipt_path,
        );
        let reject = DecisionContext::new(
            DecisionAction::Reject,
            order_id,
            &req.author.id,
            plan,
            &receipt_path,
        );
        let buttons = [
            ActionButton::new("✅ Aceitar", ButtonStyle::Success, approve.encode()),
            ActionButton::new("❌ Recusar", ButtonStyle::Danger, reject.encode()),
        ];

        self.chat()
            .send_message(&self.config().mod_channel_id, None, Some(card), &buttons)
            .await?;

        info!("Receipt for order {} forwarded to moderators", order_id);

        self.audit()
            .emit(AuditEvent::ReceiptSubmitted {
                order_id: order_id.to_string(),
                user_id: req.author.id.clone(),
                plan: plan.as_str().to_string(),
                receipt_path,
            })
            .await;

        Ok(())
    }

    /// Delete the submission and its acknowledgement after the
    /// confidentiality delay. Best-effort on every message.
    fn schedule_cleanup(&self, channel_id: &str, message_ids: Vec<String>) {
        let chat = self.chat().clone();
        let channel_id = channel_id.to_string();
        let delay = self.config().cleanup_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            for message_id in message_ids {
                let target = crate::chat::MessageRef {
                    channel_id: channel_id.clone(),
                    message_id,
                };
                if let Err(e) = chat.delete_message(&target).await {
                    debug!("Cleanup delete failed: {}", e);
                }
            }
        });
    }

    async fn refuse_submission(&self, user_id: &str, reason: &str) {
        self.audit()
            .emit(AuditEvent::SubmissionRefused {
                user_id: user_id.to_string(),
                reason: reason.to_string(),
            })
            .await;
    }
}

fn is_safe_order_id(order_id: &str) -> bool {
    !order_id.is_empty()
        && order_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
