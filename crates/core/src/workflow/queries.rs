//! Query and maintenance commands: status, close, counter, listing, help,
//! and the startup instruction post.

use chrono::Utc;
use tracing::{info, warn};

use crate::audit::AuditEvent;
use crate::auth::Caller;
use crate::chat::Embed;
use crate::order::{OrderFilter, OrderStatus};

use super::{messages, OrderWorkflow, WorkflowError};

/// How many of the bot's own messages get swept before reposting the
/// instruction embed.
const INSTRUCTION_SWEEP_LIMIT: u32 = 100;

impl OrderWorkflow {
    /// `statuspag`: report the latest decision on an order. Open to everyone.
    pub async fn status(
        &self,
        channel_id: &str,
        caller: &Caller,
        order_id: Option<&str>,
    ) -> Result<(), WorkflowError> {
        let Some(order_id) = order_id else {
            let usage = messages::status_usage(&self.config().command_prefix);
            self.send_embed(channel_id, usage).await;
            return Err(WorkflowError::Validation("missing order id".to_string()));
        };

        let Some(order) = self.store().find(order_id).await? else {
            self.send_embed(channel_id, messages::not_found(order_id)).await;
            return Err(WorkflowError::NotFound(order_id.to_string()));
        };

        let embed = messages::order_status(&order, &caller.display_name);
        self.chat()
            .send_message(channel_id, None, Some(embed), &[])
            .await?;
        Ok(())
    }

    /// `fecharpedido`: close an accepted order and archive its channel.
    /// Moderators only.
    pub async fn close_order(
        &self,
        channel_id: &str,
        caller: &Caller,
        order_id: Option<&str>,
    ) -> Result<(), WorkflowError> {
        self.require_moderator(channel_id, caller, "close").await?;

        let Some(order_id) = order_id else {
            let usage = messages::close_usage(&self.config().command_prefix);
            self.send_embed(channel_id, usage).await;
            return Err(WorkflowError::Validation("missing order id".to_string()));
        };

        let Some(order) = self.store().find(order_id).await? else {
            self.send_embed(channel_id, messages::not_found(order_id)).await;
            return Err(WorkflowError::NotFound(order_id.to_string()));
        };

        if order.status != OrderStatus::Accepted {
            self.send_embed(channel_id, messages::close_guard(order.status)).await;
            return Err(WorkflowError::Guard {
                order_id: order_id.to_string(),
                status: order.status,
            });
        }

        let now = Utc::now();
        self.store().close(order_id, &caller.id, now).await?;

        let number = order.number.unwrap_or_default();

        // Archive the order channel. Rename failures are logged, never fatal.
        if let Some(order_channel) = &order.channel_id {
            let archived = format!("arquivado-pedido-cliente-{number}");
            if let Err(e) = self.chat().rename_channel(order_channel, &archived).await {
                warn!("Failed to archive channel {}: {}", order_channel, e);
            }
            if let Err(e) = self
                .chat()
                .send_message(
                    order_channel,
                    None,
                    Some(messages::closing_notice(&caller.id, now)),
                    &[],
                )
                .await
            {
                warn!("Failed to post closing notice: {}", e);
            }
        }

        if let Some(log_channel) = &self.config().log_channel_id {
            let log = messages::log_closed(order_id, number, order.plan, &caller.id, now);
            self.chat()
                .send_message(log_channel, None, Some(log), &[])
                .await?;
        }

        let confirmation = messages::close_success(order_id, number, order.plan);
        self.chat()
            .send_message(channel_id, None, Some(confirmation), &[])
            .await?;

        info!("Order {} closed", order_id);

        self.audit()
            .emit(AuditEvent::OrderClosed {
                order_id: order_id.to_string(),
                number,
                closed_by: caller.id.clone(),
            })
            .await;

        Ok(())
    }

    /// `ultimonumero`: show the last assigned sequence number. Moderators only.
    pub async fn counter(&self, channel_id: &str, caller: &Caller) -> Result<(), WorkflowError> {
        self.require_moderator(channel_id, caller, "counter").await?;

        let last = self.store().read_counter().await?;
        let embed = messages::counter(last, &caller.display_name);
        self.chat()
            .send_message(channel_id, None, Some(embed), &[])
            .await?;
        Ok(())
    }

    /// `listarpedidos`: list recent orders, optionally by status. Moderators only.
    pub async fn list_orders(
        &self,
        channel_id: &str,
        caller: &Caller,
        status: Option<&str>,
    ) -> Result<(), WorkflowError> {
        self.require_moderator(channel_id, caller, "list").await?;

        let status_filter = match status {
            Some(raw) => match OrderStatus::parse(raw) {
                Some(status) => Some(status),
                None => {
                    self.send_embed(channel_id, messages::invalid_list_status()).await;
                    return Err(WorkflowError::Validation(format!(
                        "invalid status filter: {raw}"
                    )));
                }
            },
            None => None,
        };

        let mut filter = OrderFilter::new().with_limit(self.config().list_limit);
        if let Some(status) = status_filter {
            filter = filter.with_status(status);
        }

        let orders = self.store().list(&filter).await?;
        let embed = messages::order_list(
            &orders,
            status_filter,
            &caller.display_name,
            self.config().list_limit,
        );
        self.chat()
            .send_message(channel_id, None, Some(embed), &[])
            .await?;
        Ok(())
    }

    /// `ajuda`: role-sensitive command reference.
    pub async fn help(&self, channel_id: &str, caller: &Caller) -> Result<(), WorkflowError> {
        let embed = messages::help(
            self.is_moderator(caller),
            &self.config().command_prefix,
            &caller.display_name,
        );
        self.chat()
            .send_message(channel_id, None, Some(embed), &[])
            .await?;
        Ok(())
    }

    /// Post the pinned how-to-submit message into the submission channel,
    /// sweeping the bot's previous messages there first.
    pub async fn post_instructions(&self) -> Result<(), WorkflowError> {
        let channel_id = self.config().receipts_channel_id.clone();

        if let Err(e) = self
            .chat()
            .purge_own_messages(&channel_id, INSTRUCTION_SWEEP_LIMIT)
            .await
        {
            warn!("Failed to sweep old instruction messages: {}", e);
        }

        let embed = messages::instructions(&self.config().command_prefix);
        self.chat()
            .send_message(&channel_id, None, Some(embed), &[])
            .await?;

        info!("Instruction message posted");
        Ok(())
    }

    async fn require_moderator(
        &self,
        channel_id: &str,
        caller: &Caller,
        action: &str,
    ) -> Result<(), WorkflowError> {
        if self.is_moderator(caller) {
            return Ok(());
        }

        self.send_embed(channel_id, messages::no_permission()).await;
        self.audit()
            .emit(AuditEvent::AuthorizationRefused {
                user_id: caller.id.clone(),
                action: action.to_string(),
            })
            .await;
        Err(WorkflowError::Unauthorized)
    }

    /// Best-effort delivery of a refusal or usage embed.
    async fn send_embed(&self, channel_id: &str, embed: Embed) {
        if let Err(e) = self
            .chat()
            .send_message(channel_id, None, Some(embed), &[])
            .await
        {
            warn!("Failed to send refusal message: {}", e);
        }
    }
}
