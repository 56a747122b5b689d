//! End-to-end workflow tests over mock collaborators: submission intake,
//! moderator decisions, numbering, and the close flow.

use std::sync::Arc;
use std::time::Duration;

use pagbot_core::audit::{create_audit_system, SqliteAuditStore};
use pagbot_core::chat::{ChatError, DecisionContext, InteractionRef, MessageRef};
use pagbot_core::order::OrderStatus;
use pagbot_core::testing::{
    fixtures, MemoryOrderStore, MemoryReceiptStore, MockChatClient, RecordedChatCall,
};
use pagbot_core::workflow::{OrderWorkflow, WorkflowError};

struct Harness {
    workflow: OrderWorkflow,
    store: Arc<MemoryOrderStore>,
    chat: Arc<MockChatClient>,
    receipts: Arc<MemoryReceiptStore>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryOrderStore::new());
    let chat = Arc::new(MockChatClient::new());
    let receipts = Arc::new(MemoryReceiptStore::new());

    let audit_store = Arc::new(SqliteAuditStore::in_memory().unwrap());
    let (audit, writer) = create_audit_system(audit_store, 64);
    tokio::spawn(writer.run());

    let workflow = OrderWorkflow::new(
        store.clone(),
        chat.clone(),
        receipts.clone(),
        audit,
        fixtures::test_workflow_config(),
    );

    Harness {
        workflow,
        store,
        chat,
        receipts,
    }
}

fn interaction() -> InteractionRef {
    InteractionRef {
        id: "interaction-1".to_string(),
        token: "token-1".to_string(),
    }
}

/// Submit a valid receipt and return the decision contexts carried by the
/// card's buttons, plus a reference to the card itself.
async fn submit(h: &Harness, order_id: &str) -> (DecisionContext, DecisionContext, MessageRef) {
    h.workflow
        .handle_submission(fixtures::submission(fixtures::customer("42"), order_id))
        .await
        .unwrap();

    let cards = h.chat.messages_to(fixtures::MOD_CHANNEL).await;
    let RecordedChatCall::SendMessage {
        buttons,
        message_id,
        ..
    } = cards.last().unwrap().clone()
    else {
        panic!("expected a card message");
    };
    assert_eq!(buttons.len(), 2);

    let (approve_ctx, approve_modal) = DecisionContext::decode(&buttons[0].custom_id).unwrap();
    let (reject_ctx, reject_modal) = DecisionContext::decode(&buttons[1].custom_id).unwrap();
    assert!(!approve_modal);
    assert!(!reject_modal);

    (
        approve_ctx,
        reject_ctx,
        MessageRef {
            channel_id: fixtures::MOD_CHANNEL.to_string(),
            message_id,
        },
    )
}

#[tokio::test]
async fn test_approval_assigns_number_and_opens_channel() {
    let h = harness();
    let (approve, _, card) = submit(&h, "1234").await;

    let moderator = fixtures::moderator("99");
    h.workflow
        .approve(&approve, &interaction(), &card, &moderator)
        .await
        .unwrap();

    let orders = h.store.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, "1234");
    assert_eq!(orders[0].status, OrderStatus::Accepted);
    assert_eq!(orders[0].number, Some(1));
    assert_eq!(h.store.counter_value().await, Some(1));

    let created: Vec<String> = h
        .chat
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            RecordedChatCall::CreatePrivateChannel { name, .. } => Some(name),
            _ => None,
        })
        .collect();
    assert_eq!(created, vec!["pedido-cliente-1".to_string()]);

    // Receipt was downloaded and stored before the card went out.
    assert_eq!(h.receipts.saved().await.len(), 1);

    // Welcome lands in the new private channel.
    let channel_id = orders[0].channel_id.clone().unwrap();
    assert_eq!(h.chat.messages_to(&channel_id).await.len(), 1);

    // The card gets rewritten with its buttons removed.
    let edits: Vec<bool> = h
        .chat
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            RecordedChatCall::EditMessage {
                cleared_buttons, ..
            } => Some(cleared_buttons),
            _ => None,
        })
        .collect();
    assert_eq!(edits, vec![true]);
}

#[tokio::test]
async fn test_sequential_approvals_number_without_gaps() {
    let h = harness();
    let moderator = fixtures::moderator("99");

    for (i, order_id) in ["111", "222", "333"].iter().enumerate() {
        let (approve, _, card) = submit(&h, order_id).await;
        h.workflow
            .approve(&approve, &interaction(), &card, &moderator)
            .await
            .unwrap();

        let orders = h.store.orders().await;
        assert_eq!(orders[i].number, Some(i as i64 + 1));
    }

    assert_eq!(h.store.counter_value().await, Some(3));
}

/// The counter is read and written in separate steps. Two approvals that
/// interleave between the read and the write both observe the same value and
/// assign the same number.
#[tokio::test(start_paused = true)]
async fn test_concurrent_approvals_can_assign_duplicate_numbers() {
    let h = harness();
    let moderator = fixtures::moderator("99");

    let (first, _, first_card) = submit(&h, "111").await;
    let (second, _, second_card) = submit(&h, "222").await;

    h.store.set_counter(5).await;
    h.store
        .set_read_counter_delay(Duration::from_millis(100))
        .await;

    let ix_a = interaction();
    let ix_b = interaction();
    let (a, b) = tokio::join!(
        h.workflow.approve(&first, &ix_a, &first_card, &moderator),
        h.workflow.approve(&second, &ix_b, &second_card, &moderator),
    );
    a.unwrap();
    b.unwrap();

    let orders = h.store.orders().await;
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].number, Some(6));
    assert_eq!(orders[1].number, Some(6));
    assert_eq!(h.store.counter_value().await, Some(6));
}

#[tokio::test]
async fn test_refused_submission_touches_nothing() {
    let h = harness();

    // Wrong channel.
    let mut req = fixtures::submission(fixtures::customer("42"), "1234");
    req.channel_id = "somewhere-else".to_string();
    let err = h.workflow.handle_submission(req).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    // Unknown plan.
    let mut req = fixtures::submission(fixtures::customer("42"), "1234");
    req.plan = Some("premium".to_string());
    let err = h.workflow.handle_submission(req).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    // Missing attachment.
    let mut req = fixtures::submission(fixtures::customer("42"), "1234");
    req.attachments.clear();
    let err = h.workflow.handle_submission(req).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    // Missing arguments; refusal text carries the usage string.
    let mut req = fixtures::submission(fixtures::customer("42"), "1234");
    req.order_id = None;
    let err = h.workflow.handle_submission(req).await.unwrap_err();
    match err {
        WorkflowError::Validation(text) => assert!(text.contains("!pago")),
        other => panic!("unexpected error: {other}"),
    }

    assert!(h.store.orders().await.is_empty());
    assert!(h.receipts.saved().await.is_empty());
    assert!(h.chat.calls().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_submission_messages_deleted_after_delay() {
    let h = harness();
    submit(&h, "1234").await;

    // Past the confidentiality delay.
    tokio::time::sleep(Duration::from_secs(4)).await;

    let deleted: Vec<String> = h
        .chat
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            RecordedChatCall::DeleteMessage { message_id, .. } => Some(message_id),
            _ => None,
        })
        .collect();
    assert_eq!(deleted.len(), 2);
    assert!(deleted.contains(&"submission-msg".to_string()));
}

#[tokio::test]
async fn test_non_moderator_cannot_decide() {
    let h = harness();
    let (approve, reject, card) = submit(&h, "1234").await;
    let outsider = fixtures::customer("66");

    let err = h
        .workflow
        .approve(&approve, &interaction(), &card, &outsider)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized));

    let err = h
        .workflow
        .reject(&reject, &interaction(), &card, &outsider, "motivo")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized));

    assert!(h.store.orders().await.is_empty());
    assert_eq!(h.store.counter_value().await, None);
    assert_eq!(h.chat.ephemeral_replies().await.len(), 2);
}

#[tokio::test]
async fn test_rejection_stores_reason_verbatim_without_number() {
    let h = harness();
    let (_, reject, card) = submit(&h, "1234").await;
    let moderator = fixtures::moderator("99");

    let reason = "Comprovante ilegível, reenvie com  espaços  preservados";
    h.workflow
        .reject(&reject, &interaction(), &card, &moderator, reason)
        .await
        .unwrap();

    let orders = h.store.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Rejected);
    assert!(orders[0].number.is_none());
    assert_eq!(orders[0].rejection_reason.as_deref(), Some(reason));
    assert_eq!(h.store.counter_value().await, None);
}

#[tokio::test]
async fn test_invalid_rejection_reasons_store_nothing() {
    let h = harness();
    let (_, reject, card) = submit(&h, "1234").await;
    let moderator = fixtures::moderator("99");

    let err = h
        .workflow
        .reject(&reject, &interaction(), &card, &moderator, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    let too_long = "a".repeat(501);
    let err = h
        .workflow
        .reject(&reject, &interaction(), &card, &moderator, &too_long)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    assert!(h.store.orders().await.is_empty());
}

#[tokio::test]
async fn test_suppressed_dm_does_not_fail_approval() {
    let h = harness();
    let (approve, _, card) = submit(&h, "1234").await;
    h.chat.set_dm_suppressed("closed inbox").await;

    h.workflow
        .approve(&approve, &interaction(), &card, &fixtures::moderator("99"))
        .await
        .unwrap();

    assert_eq!(h.store.orders().await[0].status, OrderStatus::Accepted);
}

#[tokio::test]
async fn test_dm_failure_does_not_abort_approval() {
    let h = harness();
    let (approve, _, card) = submit(&h, "1234").await;
    h.chat
        .set_dm_error(ChatError::Network("timeout".to_string()))
        .await;

    h.workflow
        .approve(&approve, &interaction(), &card, &fixtures::moderator("99"))
        .await
        .unwrap();

    let orders = h.store.orders().await;
    assert_eq!(orders[0].status, OrderStatus::Accepted);
    assert_eq!(orders[0].number, Some(1));

    // The card still gets rewritten with its buttons removed.
    let edits = h
        .chat
        .calls()
        .await
        .into_iter()
        .filter(|call| matches!(call, RecordedChatCall::EditMessage { .. }))
        .count();
    assert_eq!(edits, 1);
}

#[tokio::test]
async fn test_dm_failure_does_not_abort_rejection() {
    let h = harness();
    let (_, reject, card) = submit(&h, "1234").await;
    h.chat
        .set_dm_error(ChatError::Network("timeout".to_string()))
        .await;

    h.workflow
        .reject(
            &reject,
            &interaction(),
            &card,
            &fixtures::moderator("99"),
            "Comprovante ilegível",
        )
        .await
        .unwrap();

    let orders = h.store.orders().await;
    assert_eq!(orders[0].status, OrderStatus::Rejected);
    assert_eq!(orders[0].rejection_reason.as_deref(), Some("Comprovante ilegível"));

    let edits = h
        .chat
        .calls()
        .await
        .into_iter()
        .filter(|call| matches!(call, RecordedChatCall::EditMessage { .. }))
        .count();
    assert_eq!(edits, 1);
}

/// Order ids reach button custom_ids and receipt file names, so ids carrying
/// the component delimiter or path fragments are refused up front.
#[tokio::test]
async fn test_unsafe_order_id_is_refused() {
    let h = harness();

    for order_id in ["AB|123", "../../x", "a/b"] {
        let req = fixtures::submission(fixtures::customer("42"), order_id);
        let err = h.workflow.handle_submission(req).await.unwrap_err();
        match err {
            WorkflowError::Validation(text) => assert!(text.contains("ID do pedido inválido")),
            other => panic!("unexpected error: {other}"),
        }
    }

    assert!(h.store.orders().await.is_empty());
    assert!(h.receipts.saved().await.is_empty());
    assert!(h.chat.calls().await.is_empty());
}

#[tokio::test]
async fn test_close_archives_accepted_order() {
    let h = harness();
    let moderator = fixtures::moderator("99");
    let (approve, _, card) = submit(&h, "1234").await;
    h.workflow
        .approve(&approve, &interaction(), &card, &moderator)
        .await
        .unwrap();

    h.workflow
        .close_order("anywhere", &moderator, Some("1234"))
        .await
        .unwrap();

    let order = find_order(&h.store, "1234").await;
    assert_eq!(order.status, OrderStatus::Closed);
    assert_eq!(order.closed_by.as_deref(), Some("99"));

    let renames: Vec<String> = h
        .chat
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            RecordedChatCall::RenameChannel { name, .. } => Some(name),
            _ => None,
        })
        .collect();
    assert_eq!(renames, vec!["arquivado-pedido-cliente-1".to_string()]);
}

#[tokio::test]
async fn test_close_guard_rejects_non_accepted_orders() {
    let h = harness();
    let moderator = fixtures::moderator("99");
    let (_, reject, card) = submit(&h, "1234").await;
    h.workflow
        .reject(&reject, &interaction(), &card, &moderator, "motivo")
        .await
        .unwrap();

    let err = h
        .workflow
        .close_order("anywhere", &moderator, Some("1234"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Guard { .. }));

    let order = find_order(&h.store, "1234").await;
    assert_eq!(order.status, OrderStatus::Rejected);
    assert!(order.closed_at.is_none());
}

#[tokio::test]
async fn test_query_commands_require_moderator() {
    let h = harness();
    let outsider = fixtures::customer("66");

    let err = h.workflow.counter("chan", &outsider).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized));

    let err = h
        .workflow
        .list_orders("chan", &outsider, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized));

    // Status is open to everyone.
    let err = h
        .workflow
        .status("chan", &outsider, Some("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
}

async fn find_order(store: &MemoryOrderStore, order_id: &str) -> pagbot_core::order::Order {
    use pagbot_core::order::OrderStore;
    store.find(order_id).await.unwrap().unwrap()
}
