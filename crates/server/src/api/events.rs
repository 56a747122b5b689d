//! Inbound chat-event dispatch.
//!
//! The gateway connector posts normalized events here; this module turns
//! them into workflow calls. Submission refusals come back as validation
//! errors carrying the user-facing text, which the dispatcher delivers to
//! the originating channel. Every other flow does its own messaging.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pagbot_core::chat::{AttachmentRef, DecisionAction, DecisionContext, InteractionRef, MessageRef};
use pagbot_core::workflow::SubmissionRequest;
use pagbot_core::{parse_command, Caller, Command, WorkflowError};

use crate::state::AppState;

/// A normalized inbound chat event.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message posted in a channel the bot can read.
    MessageCommand {
        channel_id: String,
        message_id: String,
        author: EventAuthor,
        content: String,
        #[serde(default)]
        attachments: Vec<AttachmentRef>,
    },
    /// A click on one of the decision card's buttons.
    ButtonClick {
        custom_id: String,
        interaction_id: String,
        interaction_token: String,
        channel_id: String,
        message_id: String,
        author: EventAuthor,
    },
    /// A submitted rejection-reason modal.
    ModalSubmit {
        custom_id: String,
        value: String,
        interaction_id: String,
        interaction_token: String,
        channel_id: String,
        message_id: String,
        author: EventAuthor,
    },
}

#[derive(Debug, Deserialize)]
pub struct EventAuthor {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl From<EventAuthor> for Caller {
    fn from(author: EventAuthor) -> Self {
        Caller::new(author.id, author.display_name, author.roles)
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// Whether the event mapped to a workflow operation.
    pub handled: bool,
}

pub async fn handle_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<ChatEvent>,
) -> (StatusCode, Json<EventResponse>) {
    let handled = match event {
        ChatEvent::MessageCommand {
            channel_id,
            message_id,
            author,
            content,
            attachments,
        } => {
            dispatch_command(&state, channel_id, message_id, author.into(), &content, attachments)
                .await
        }
        ChatEvent::ButtonClick {
            custom_id,
            interaction_id,
            interaction_token,
            channel_id,
            message_id,
            author,
        } => {
            let interaction = InteractionRef {
                id: interaction_id,
                token: interaction_token,
            };
            let card = MessageRef {
                channel_id,
                message_id,
            };
            dispatch_button(&state, &custom_id, &interaction, &card, author.into()).await
        }
        ChatEvent::ModalSubmit {
            custom_id,
            value,
            interaction_id,
            interaction_token,
            channel_id,
            message_id,
            author,
        } => {
            let interaction = InteractionRef {
                id: interaction_id,
                token: interaction_token,
            };
            let card = MessageRef {
                channel_id,
                message_id,
            };
            dispatch_modal(&state, &custom_id, &value, &interaction, &card, author.into()).await
        }
    };

    (StatusCode::ACCEPTED, Json(EventResponse { handled }))
}

async fn dispatch_command(
    state: &AppState,
    channel_id: String,
    message_id: String,
    author: Caller,
    content: &str,
    attachments: Vec<AttachmentRef>,
) -> bool {
    let Some(command) = parse_command(state.command_prefix(), content) else {
        return false;
    };

    let workflow = state.workflow();
    let result = match command {
        Command::Pago {
            order_id,
            plan,
            note,
        } => {
            let request = SubmissionRequest {
                channel_id: channel_id.clone(),
                message_id,
                author,
                order_id,
                plan,
                note,
                attachments,
            };
            match workflow.handle_submission(request).await {
                // Refusal text goes back to where the command was posted.
                Err(WorkflowError::Validation(text)) => {
                    if let Err(e) = state
                        .chat()
                        .send_message(&channel_id, Some(&text), None, &[])
                        .await
                    {
                        warn!("Failed to deliver submission refusal: {}", e);
                    }
                    Ok(())
                }
                other => other,
            }
        }
        Command::Status { order_id } => {
            workflow.status(&channel_id, &author, order_id.as_deref()).await
        }
        Command::Close { order_id } => {
            workflow
                .close_order(&channel_id, &author, order_id.as_deref())
                .await
        }
        Command::LastNumber => workflow.counter(&channel_id, &author).await,
        Command::List { status } => {
            workflow
                .list_orders(&channel_id, &author, status.as_deref())
                .await
        }
        Command::Help => workflow.help(&channel_id, &author).await,
    };

    if let Err(e) = result {
        // The workflow already surfaced feedback to the caller.
        debug!("Command ended with error: {}", e);
    }
    true
}

async fn dispatch_button(
    state: &AppState,
    custom_id: &str,
    interaction: &InteractionRef,
    card: &MessageRef,
    author: Caller,
) -> bool {
    let (ctx, is_modal) = match DecisionContext::decode(custom_id) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Unrecognized button custom_id: {}", e);
            return false;
        }
    };
    if is_modal {
        warn!("Modal custom_id arrived as a button click");
        return false;
    }

    let result = match ctx.action {
        DecisionAction::Approve => {
            state
                .workflow()
                .approve(&ctx, interaction, card, &author)
                .await
        }
        DecisionAction::Reject => state.workflow().reject_prompt(&ctx, interaction, &author).await,
    };

    if let Err(e) = result {
        debug!("Decision ended with error: {}", e);
    }
    true
}

async fn dispatch_modal(
    state: &AppState,
    custom_id: &str,
    value: &str,
    interaction: &InteractionRef,
    card: &MessageRef,
    author: Caller,
) -> bool {
    let (ctx, is_modal) = match DecisionContext::decode(custom_id) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Unrecognized modal custom_id: {}", e);
            return false;
        }
    };
    if !is_modal {
        warn!("Button custom_id arrived as a modal submit");
        return false;
    }

    if let Err(e) = state
        .workflow()
        .reject(&ctx, interaction, card, &author, value)
        .await
    {
        debug!("Rejection ended with error: {}", e);
    }
    true
}
