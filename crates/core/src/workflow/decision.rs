//! Moderator decisions on submitted receipts.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::audit::AuditEvent;
use crate::auth::Caller;
use crate::chat::{DecisionContext, InteractionRef, MessageRef, NotificationResult};
use crate::order::NewOrder;

use super::{messages, OrderWorkflow, WorkflowError};

impl OrderWorkflow {
    /// Approve a submission: assign the next sequence number, open the
    /// private order channel, record the order, and notify everyone.
    ///
    /// The counter handling is read-then-write with no atomicity; two
    /// concurrent approvals can observe the same value.
    pub async fn approve(
        &self,
        ctx: &DecisionContext,
        interaction: &InteractionRef,
        card: &MessageRef,
        moderator: &Caller,
    ) -> Result<(), WorkflowError> {
        if !self.is_moderator(moderator) {
            self.refuse_decision(interaction, moderator, "approve", messages::NOT_MOD_APPROVE)
                .await;
            return Err(WorkflowError::Unauthorized);
        }

        match self.approve_inner(ctx, interaction, card, moderator).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if let Err(send_err) = self
                    .chat()
                    .reply_ephemeral(interaction, &messages::approve_error(&e))
                    .await
                {
                    warn!("Failed to report approval error: {}", send_err);
                }
                Err(e)
            }
        }
    }

    async fn approve_inner(
        &self,
        ctx: &DecisionContext,
        interaction: &InteractionRef,
        card: &MessageRef,
        moderator: &Caller,
    ) -> Result<(), WorkflowError> {
        let config = self.config();

        // 1. Next sequence number. First approval ever creates the counter
        //    row instead of updating it.
        let number = match self.store().read_counter().await? {
            Some(last) => {
                let next = last + 1;
                self.store().write_counter(next, false).await?;
                next
            }
            None => {
                self.store().write_counter(1, true).await?;
                1
            }
        };

        // 2. Private order channel.
        let channel_name = format!("pedido-cliente-{number}");
        let channel_id = self
            .chat()
            .create_private_channel(
                &config.guild_id,
                &config.orders_category_id,
                &channel_name,
                &config.mod_role_id,
                &ctx.user_id,
            )
            .await?;

        // 3. Order row.
        let now = Utc::now();
        self.store()
            .insert(NewOrder::accepted(
                &ctx.order_id,
                &ctx.user_id,
                number,
                ctx.plan,
                &moderator.id,
                &moderator.display_name,
                &channel_id,
                &ctx.receipt_path,
                now,
            ))
            .await?;

        // 4. Welcome message in the new channel.
        let welcome = messages::welcome(
            number,
            ctx.plan,
            &ctx.user_id,
            &ctx.order_id,
            &moderator.display_name,
            now,
        );
        self.chat()
            .send_message(&channel_id, None, Some(welcome), &[])
            .await?;

        // 5. Best-effort DM. Suppressed or failed delivery never blocks the
        //    approval.
        match self
            .chat()
            .send_dm(&ctx.user_id, messages::dm_approved(ctx.plan, &channel_id, number))
            .await
        {
            Ok(NotificationResult::Delivered) => {}
            Ok(NotificationResult::Suppressed(reason)) => {
                debug!("Approval DM to {} suppressed: {}", ctx.user_id, reason);
            }
            Err(e) => {
                warn!("Approval DM to {} failed: {}", ctx.user_id, e);
            }
        }

        // 6. Log channel.
        if let Some(log_channel) = &config.log_channel_id {
            let log = messages::log_approved(
                &ctx.order_id,
                number,
                &ctx.user_id,
                ctx.plan,
                &moderator.id,
                &channel_id,
                now,
            );
            self.chat()
                .send_message(log_channel, None, Some(log), &[])
                .await?;
        }

        // 7. Rewrite the decision card and confirm to the moderator.
        let updated = messages::approved_card(
            &ctx.order_id,
            number,
            &ctx.user_id,
            ctx.plan,
            &moderator.id,
            &channel_id,
        );
        self.chat().edit_message(card, updated, true).await?;

        self.chat()
            .reply_ephemeral(interaction, &messages::approve_done(&channel_id))
            .await?;

        info!("Order {} approved as #{}", ctx.order_id, number);

        self.audit()
            .emit(AuditEvent::OrderApproved {
                order_id: ctx.order_id.clone(),
                number,
                user_id: ctx.user_id.clone(),
                moderator_id: moderator.id.clone(),
                channel_id,
                plan: ctx.plan.as_str().to_string(),
            })
            .await;

        Ok(())
    }

    /// Answer a reject button click by opening the reason modal. No state
    /// changes until the reason is submitted.
    pub async fn reject_prompt(
        &self,
        ctx: &DecisionContext,
        interaction: &InteractionRef,
        moderator: &Caller,
    ) -> Result<(), WorkflowError> {
        if !self.is_moderator(moderator) {
            self.refuse_decision(interaction, moderator, "reject", messages::NOT_MOD_REJECT)
                .await;
            return Err(WorkflowError::Unauthorized);
        }

        self.chat()
            .open_reason_prompt(
                interaction,
                &ctx.encode_reason_modal(),
                messages::REASON_PROMPT_TITLE,
                messages::REASON_PROMPT_LABEL,
                self.config().reason_max_len as u16,
            )
            .await?;

        Ok(())
    }

    /// Reject a submission with the moderator's reason, collected via the
    /// modal. The reason is bounded but stored verbatim.
    pub async fn reject(
        &self,
        ctx: &DecisionContext,
        interaction: &InteractionRef,
        card: &MessageRef,
        moderator: &Caller,
        reason: &str,
    ) -> Result<(), WorkflowError> {
        if !self.is_moderator(moderator) {
            self.refuse_decision(interaction, moderator, "reject", messages::NOT_MOD_REJECT)
                .await;
            return Err(WorkflowError::Unauthorized);
        }

        let max_len = self.config().reason_max_len;
        if reason.trim().is_empty() || reason.chars().count() > max_len {
            let text = messages::invalid_reason(max_len);
            if let Err(e) = self.chat().reply_ephemeral(interaction, &text).await {
                warn!("Failed to report invalid reason: {}", e);
            }
            return Err(WorkflowError::Validation(text));
        }

        match self.reject_inner(ctx, interaction, card, moderator, reason).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if let Err(send_err) = self
                    .chat()
                    .reply_ephemeral(interaction, &messages::reject_error(&e))
                    .await
                {
                    warn!("Failed to report rejection error: {}", send_err);
                }
                Err(e)
            }
        }
    }

    async fn reject_inner(
        &self,
        ctx: &DecisionContext,
        interaction: &InteractionRef,
        card: &MessageRef,
        moderator: &Caller,
        reason: &str,
    ) -> Result<(), WorkflowError> {
        let now = Utc::now();

        // 1. Order row. No number is ever assigned to a rejected order.
        self.store()
            .insert(NewOrder::rejected(
                &ctx.order_id,
                &ctx.user_id,
                ctx.plan,
                &moderator.id,
                &moderator.display_name,
                reason,
                &ctx.receipt_path,
                now,
            ))
            .await?;

        // 2. Best-effort DM with the reason. Suppressed or failed delivery
        //    never blocks the rejection.
        match self
            .chat()
            .send_dm(&ctx.user_id, messages::dm_rejected(ctx.plan, reason))
            .await
        {
            Ok(NotificationResult::Delivered) => {}
            Ok(NotificationResult::Suppressed(suppressed)) => {
                debug!("Rejection DM to {} suppressed: {}", ctx.user_id, suppressed);
            }
            Err(e) => {
                warn!("Rejection DM to {} failed: {}", ctx.user_id, e);
            }
        }

        // 3. Log channel.
        if let Some(log_channel) = &self.config().log_channel_id {
            let log = messages::log_rejected(
                &ctx.order_id,
                &ctx.user_id,
                ctx.plan,
                &moderator.id,
                reason,
                now,
            );
            self.chat()
                .send_message(log_channel, None, Some(log), &[])
                .await?;
        }

        // 4. Rewrite the decision card and confirm to the moderator.
        let updated =
            messages::rejected_card(&ctx.order_id, &ctx.user_id, ctx.plan, &moderator.id, reason);
        self.chat().edit_message(card, updated, true).await?;

        self.chat()
            .reply_ephemeral(interaction, messages::REJECT_DONE)
            .await?;

        info!("Order {} rejected", ctx.order_id);

        self.audit()
            .emit(AuditEvent::OrderRejected {
                order_id: ctx.order_id.clone(),
                user_id: ctx.user_id.clone(),
                moderator_id: moderator.id.clone(),
                reason: reason.to_string(),
                plan: ctx.plan.as_str().to_string(),
            })
            .await;

        Ok(())
    }

    async fn refuse_decision(
        &self,
        interaction: &InteractionRef,
        caller: &Caller,
        action: &str,
        text: &str,
    ) {
        if let Err(e) = self.chat().reply_ephemeral(interaction, text).await {
            warn!("Failed to send authorization refusal: {}", e);
        }
        self.audit()
            .emit(AuditEvent::AuthorizationRefused {
                user_id: caller.id.clone(),
                action: action.to_string(),
            })
            .await;
    }
}
