//! Customer- and moderator-facing message texts.
//!
//! Everything the bot says lives here, in Portuguese, so the flow code stays
//! free of copy.

use chrono::{DateTime, Utc};

use crate::chat::{color, Embed};
use crate::order::{Order, OrderStatus, Plan};

pub fn user_mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

pub fn channel_mention(channel_id: &str) -> String {
    format!("<#{channel_id}>")
}

// Submission refusals and acknowledgement.

pub const WRONG_CHANNEL: &str = "❌ Use este comando apenas no canal de comprovantes.";

pub fn pago_usage(prefix: &str) -> String {
    format!(
        "❌ Uso correto: `{prefix}pago <ID-pedido> <Plano>`\nPlano: **Starter** ou **Profissional**"
    )
}

pub const INVALID_ORDER_ID: &str =
    "❌ ID do pedido inválido. Use apenas letras, números, hífen e underline.";

pub const INVALID_PLAN: &str = "❌ Plano inválido. Use: **Starter** ou **Profissional**";

pub const MISSING_ATTACHMENT: &str = "❌ Você precisa anexar o comprovante (imagem).";

pub const SUBMISSION_ACK: &str = "📥 Comprovante recebido! Aguardando verificação dos moderadores. Em até 10 min–2h vamos checar. Não finalize o pedido até receber confirmação.";

pub fn submission_error(err: &impl std::fmt::Display) -> String {
    format!("❌ Erro ao processar comprovante: {err}")
}

// Moderator decision surface.

pub const NOT_MOD_APPROVE: &str = "❌ Apenas moderadores podem aprovar pedidos.";
pub const NOT_MOD_REJECT: &str = "❌ Apenas moderadores podem reprovar pedidos.";

pub const REASON_PROMPT_TITLE: &str = "Motivo da Reprovação";
pub const REASON_PROMPT_LABEL: &str = "Motivo da Reprovação";

pub fn invalid_reason(max_len: usize) -> String {
    format!("❌ Motivo inválido. Informe um motivo com até {max_len} caracteres.")
}

pub fn approve_done(channel_id: &str) -> String {
    format!("✅ Pedido aprovado! Canal {} criado.", channel_mention(channel_id))
}

pub const REJECT_DONE: &str = "❌ Pedido reprovado e cliente notificado.";

pub fn approve_error(err: &impl std::fmt::Display) -> String {
    format!("❌ Erro ao processar aprovação: {err}")
}

pub fn reject_error(err: &impl std::fmt::Display) -> String {
    format!("❌ Erro ao processar reprovação: {err}")
}

/// Card posted to the moderation channel when a receipt arrives.
#[allow(clippy::too_many_arguments)]
pub fn decision_card(
    order_id: &str,
    submitter_id: &str,
    submitter_name: &str,
    plan: Plan,
    note: Option<&str>,
    image_url: &str,
    now: DateTime<Utc>,
) -> Embed {
    let mut embed = Embed::new("🔔 Novo Comprovante Recebido")
        .with_color(color::GOLD)
        .with_field("Pedido ID", order_id, true)
        .with_field(
            "Usuário",
            format!("{} ({})", user_mention(submitter_id), submitter_id),
            true,
        )
        .with_field("Serviço", plan.as_str(), true);

    if let Some(note) = note {
        embed = embed.with_field("Mensagem", note, false);
    }

    embed
        .with_image(image_url)
        .with_footer(format!("Enviado por {submitter_name}"))
        .with_timestamp(now)
}

/// Welcome message inside the freshly created private order channel.
pub fn welcome(
    number: i64,
    plan: Plan,
    submitter_id: &str,
    order_id: &str,
    moderator_name: &str,
    now: DateTime<Utc>,
) -> Embed {
    Embed::new(format!("🎯 Pedido #{number} - {plan}"))
        .with_description(format!(
            "Bem-vindo(a) ao seu pedido, {}!\n\n\
             **Plano:** {plan}\n\
             **ID do Pedido:** {order_id}\n\
             **Status:** ✅ Aprovado\n\n\
             Os moderadores irão orientá-lo sobre os próximos passos.",
            user_mention(submitter_id)
        ))
        .with_color(color::GREEN)
        .with_timestamp(now)
        .with_footer(format!("Aprovado por {moderator_name}"))
}

pub fn dm_approved(plan: Plan, channel_id: &str, number: i64) -> Embed {
    Embed::new("✅ Pedido Aprovado!")
        .with_description(format!(
            "Seu pedido ({plan}) foi aprovado!\n\n\
             **Canal privado criado:** {}\n\
             **Número do Pedido:** #{number}\n\n\
             Entre no canal privado para combinar os próximos passos.",
            channel_mention(channel_id)
        ))
        .with_color(color::GREEN)
}

pub fn dm_rejected(plan: Plan, reason: &str) -> Embed {
    Embed::new("❌ Pedido Não Aprovado")
        .with_description(format!(
            "Seu pedido ({plan}) não foi aprovado.\n\n\
             **Motivo:** {reason}\n\n\
             Se achar que houve erro, contate os moderadores."
        ))
        .with_color(color::RED)
}

pub fn log_approved(
    order_id: &str,
    number: i64,
    submitter_id: &str,
    plan: Plan,
    moderator_id: &str,
    channel_id: &str,
    now: DateTime<Utc>,
) -> Embed {
    Embed::new("✅ Pedido Aprovado")
        .with_color(color::GREEN)
        .with_timestamp(now)
        .with_field("Pedido ID", order_id, true)
        .with_field("Número", format!("#{number}"), true)
        .with_field("Cliente", user_mention(submitter_id), true)
        .with_field("Plano", plan.as_str(), true)
        .with_field("Moderador", user_mention(moderator_id), true)
        .with_field("Canal", channel_mention(channel_id), true)
}

pub fn log_rejected(
    order_id: &str,
    submitter_id: &str,
    plan: Plan,
    moderator_id: &str,
    reason: &str,
    now: DateTime<Utc>,
) -> Embed {
    Embed::new("❌ Pedido Reprovado")
        .with_color(color::RED)
        .with_timestamp(now)
        .with_field("Pedido ID", order_id, true)
        .with_field("Cliente", user_mention(submitter_id), true)
        .with_field("Plano", plan.as_str(), true)
        .with_field("Moderador", user_mention(moderator_id), true)
        .with_field("Motivo", reason, false)
}

pub fn log_closed(
    order_id: &str,
    number: i64,
    plan: Plan,
    closed_by: &str,
    now: DateTime<Utc>,
) -> Embed {
    Embed::new("🔒 Pedido Fechado")
        .with_color(color::ORANGE)
        .with_timestamp(now)
        .with_field("Pedido ID", order_id, true)
        .with_field("Número", format!("#{number}"), true)
        .with_field("Plano", plan.as_str(), true)
        .with_field("Fechado por", user_mention(closed_by), true)
}

/// Decision card rewritten after approval (controls removed by the caller).
pub fn approved_card(
    order_id: &str,
    number: i64,
    submitter_id: &str,
    plan: Plan,
    moderator_id: &str,
    channel_id: &str,
) -> Embed {
    Embed::new(format!("✅ APROVADO - Pedido #{number}"))
        .with_color(color::GREEN)
        .with_field("Pedido ID", order_id, true)
        .with_field(
            "Usuário",
            format!("{} ({})", user_mention(submitter_id), submitter_id),
            true,
        )
        .with_field("Serviço", plan.as_str(), true)
        .with_field(
            "Status",
            format!("Aprovado por {}", user_mention(moderator_id)),
            false,
        )
        .with_field("Canal", channel_mention(channel_id), false)
}

/// Decision card rewritten after rejection.
pub fn rejected_card(
    order_id: &str,
    submitter_id: &str,
    plan: Plan,
    moderator_id: &str,
    reason: &str,
) -> Embed {
    Embed::new("❌ REPROVADO")
        .with_color(color::RED)
        .with_field("Pedido ID", order_id, true)
        .with_field(
            "Usuário",
            format!("{} ({})", user_mention(submitter_id), submitter_id),
            true,
        )
        .with_field("Serviço", plan.as_str(), true)
        .with_field(
            "Status",
            format!("Reprovado por {}", user_mention(moderator_id)),
            false,
        )
        .with_field("Motivo", reason, false)
}

// Query command embeds.

pub fn status_usage(prefix: &str) -> Embed {
    Embed::new("❌ Erro")
        .with_description(format!(
            "**Uso correto:**\n```{prefix}statuspag <ID-pedido>```\n\n**Exemplo:**\n```{prefix}statuspag 1234```"
        ))
        .with_color(color::RED)
}

pub fn close_usage(prefix: &str) -> Embed {
    Embed::new("❌ Erro")
        .with_description(format!(
            "**Uso correto:**\n```{prefix}fecharpedido <ID-pedido>```\n\n**Exemplo:**\n```{prefix}fecharpedido 1234```"
        ))
        .with_color(color::RED)
}

pub fn not_found(order_id: &str) -> Embed {
    Embed::new("❌ Pedido Não Encontrado")
        .with_description(format!("Nenhum pedido encontrado com ID: `{order_id}`"))
        .with_color(color::RED)
}

pub fn no_permission() -> Embed {
    Embed::new("❌ Sem Permissão")
        .with_description("Você não tem permissão para usar este comando!")
        .with_color(color::RED)
}

fn status_color(status: OrderStatus) -> u32 {
    match status {
        OrderStatus::Accepted => color::GREEN,
        OrderStatus::Rejected => color::RED,
        OrderStatus::Closed => color::ORANGE,
    }
}

pub fn order_status(order: &Order, caller_name: &str) -> Embed {
    let mut embed = Embed::new(format!("📊 Status do Pedido {}", order.order_id))
        .with_color(status_color(order.status))
        .with_timestamp(order.timestamp)
        .with_field(
            "Status",
            format!(
                "{} **{}**",
                order.status.emoji(),
                order.status.as_str().to_uppercase()
            ),
            true,
        )
        .with_field("Plano", format!("**{}**", order.plan), true);

    if let Some(number) = order.number {
        embed = embed.with_field("Número", format!("**#{number}**"), true);
        if let Some(channel_id) = &order.channel_id {
            embed = embed.with_field("Canal", channel_mention(channel_id), true);
        }
    }

    if order.status == OrderStatus::Rejected {
        if let Some(reason) = &order.rejection_reason {
            embed = embed.with_field("Motivo da Reprovação", reason, false);
        }
    }

    embed = embed.with_field("Moderador Responsável", &order.moderator_name, true);

    embed.with_footer(format!("Consultado por {caller_name}"))
}

pub fn close_guard(status: OrderStatus) -> Embed {
    Embed::new("❌ Erro")
        .with_description(format!(
            "Apenas pedidos **aceitos** podem ser fechados.\n\nStatus atual: **{}**",
            status.as_str().to_uppercase()
        ))
        .with_color(color::RED)
}

pub fn close_success(order_id: &str, number: i64, plan: Plan) -> Embed {
    Embed::new("✅ Pedido Fechado")
        .with_description(format!("Pedido `{order_id}` fechado com sucesso!"))
        .with_color(color::GREEN)
        .with_field("Número", format!("#{number}"), true)
        .with_field("Plano", plan.as_str(), true)
}

/// Notice posted inside the order channel when it is archived.
pub fn closing_notice(closed_by: &str, now: DateTime<Utc>) -> Embed {
    Embed::new("🔒 Pedido Fechado")
        .with_description(format!(
            "Este pedido foi fechado por {}.\n\nO canal ficará arquivado para registro.",
            user_mention(closed_by)
        ))
        .with_color(color::ORANGE)
        .with_timestamp(now)
}

pub fn counter(last_number: Option<i64>, caller_name: &str) -> Embed {
    let description = match last_number {
        Some(n) => format!(
            "**Último número usado:** {n}\n**Próximo pedido será:** #{}",
            n + 1
        ),
        None => "Nenhum pedido aprovado ainda.\n**Próximo pedido será:** #1".to_string(),
    };

    Embed::new("🔢 Contador de Pedidos")
        .with_description(description)
        .with_color(color::BLUE)
        .with_footer(format!("Consultado por {caller_name}"))
}

pub fn invalid_list_status() -> Embed {
    Embed::new("❌ Status Inválido")
        .with_description("Status válidos: **aceito**, **reprovado**, **fechado**")
        .with_color(color::RED)
}

pub fn order_list(
    orders: &[Order],
    status_filter: Option<OrderStatus>,
    caller_name: &str,
    list_limit: i64,
) -> Embed {
    if orders.is_empty() {
        return Embed::new("📋 Lista de Pedidos")
            .with_description("Nenhum pedido encontrado.")
            .with_color(color::BLUE);
    }

    let mut embed = Embed::new(format!("📋 Lista de Pedidos ({})", orders.len()))
        .with_color(color::BLUE);

    if let Some(status) = status_filter {
        embed = embed.with_description(format!(
            "Filtro: **{}**",
            status.as_str().to_uppercase()
        ));
    }

    for order in orders {
        let number = order
            .number
            .map(|n| format!("#{n}"))
            .unwrap_or_else(|| "N/A".to_string());

        let mut value = format!(
            "{} **{}** | {}\n",
            order.status.emoji(),
            order.status.as_str().to_uppercase(),
            number
        );
        value.push_str(&format!("Cliente: {}\n", user_mention(&order.user_id)));
        value.push_str(&format!("Plano: **{}**\n", order.plan));
        if let Some(channel_id) = &order.channel_id {
            value.push_str(&format!("Canal: {}\n", channel_mention(channel_id)));
        }
        value.push_str(&format!(
            "Data: {}",
            order.timestamp.format("%d/%m/%Y %H:%M")
        ));

        embed = embed.with_field(format!("Pedido {}", order.order_id), value, false);
    }

    embed.with_footer(format!(
        "Consultado por {caller_name} | Mostrando últimos {list_limit} pedidos"
    ))
}

pub fn help(is_moderator: bool, prefix: &str, caller_name: &str) -> Embed {
    let mut embed = Embed::new("📖 Central de Ajuda - Unibot Pagamentos")
        .with_description("Lista completa de comandos disponíveis")
        .with_color(color::BLUE)
        .with_field(
            "👥 Comandos para Clientes",
            format!(
                "`{prefix}pago <ID-pedido> <Plano>` - Enviar comprovante de pagamento\n\
                 `{prefix}statuspag <ID-pedido>` - Verificar status do seu pedido\n\
                 `{prefix}ajuda` - Mostrar esta mensagem de ajuda"
            ),
            false,
        );

    if is_moderator {
        embed = embed.with_field(
            "🛡️ Comandos para Moderadores",
            format!(
                "`{prefix}fecharpedido <ID-pedido>` - Fechar e arquivar um pedido\n\
                 `{prefix}ultimonumero` - Ver último número sequencial usado\n\
                 `{prefix}listarpedidos [status]` - Listar pedidos (aceito/reprovado/fechado)\n\
                 **Obs:** Aprovação/reprovação é feita via botões no canal de moderação"
            ),
            false,
        );
    }

    embed
        .with_field(
            "📝 Como Enviar Comprovante",
            format!(
                "**1.** Use o comando no canal de comprovantes:\n\
                 ```{prefix}pago <ID-do-pedido> <Plano>```\n\
                 **2.** Informe os dados na mensagem:\n\
                 \u{2003}• Valor: R$X,XX\n\
                 \u{2003}• PIX TXID (opcional)\n\
                 **3.** Anexe o print do comprovante\n\n\
                 **Planos disponíveis:** `Starter` ou `Profissional`"
            ),
            false,
        )
        .with_field(
            "💡 Exemplo de Uso",
            format!(
                "```{prefix}pago 1234 Starter | Valor: R$150,00 | TXID: ABCD1234```\n\
                 (anexe a imagem do comprovante)"
            ),
            false,
        )
        .with_field(
            "⚠️ Importante",
            "• Após enviar, suas mensagens serão **removidas automaticamente** para segurança\n\
             • Aguarde de **10 minutos a 2 horas** para verificação\n\
             • Você receberá uma **DM** com a resposta da análise\n\
             • **Não finalize** o pedido até receber confirmação!",
            false,
        )
        .with_footer(format!("Solicitado por {caller_name}"))
}

/// Pinned how-to-submit message posted into the submission channel at startup.
pub fn instructions(prefix: &str) -> Embed {
    Embed::new("📋 Como Enviar Comprovante (OBRIGATÓRIO)")
        .with_description(format!(
            "**1) Use o comando:**\n\
             ```{prefix}pago <ID-do-pedido> <Plano>```\n\
             \u{2003}- Plano: **Starter** ou **Profissional**\n\n\
             **2) Valor:** R$X,XX\n\n\
             **3) PIX TXID** (se houver)\n\n\
             **4) Anexe o print do comprovante**\n\n\
             **Exemplo:**\n\
             ```{prefix}pago 1234 Starter | Valor: R$150,00 | TXID: ABCD1234```\n\
             (anexe imagem)\n\n\
             ⏱️ Após enviar, aguarde confirmação. Sua mensagem será removida para segurança."
        ))
        .with_color(color::BLUE)
        .with_footer(
            "Em até 10 min–2h iremos verificar. Não finalize o pedido até receber confirmação.",
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pago_usage_carries_prefix() {
        assert!(pago_usage("!").contains("`!pago <ID-pedido> <Plano>`"));
        assert!(pago_usage("?").contains("`?pago"));
    }

    #[test]
    fn test_decision_card_fields() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let embed = decision_card(
            "1234",
            "42",
            "cliente#1",
            Plan::Starter,
            Some("Valor: R$150,00"),
            "https://cdn.example/receipt.png",
            now,
        );
        assert_eq!(embed.title.as_deref(), Some("🔔 Novo Comprovante Recebido"));
        assert_eq!(embed.fields.len(), 4);
        assert_eq!(embed.fields[3].name, "Mensagem");
        assert_eq!(embed.image_url.as_deref(), Some("https://cdn.example/receipt.png"));
        assert_eq!(embed.footer.as_deref(), Some("Enviado por cliente#1"));
    }

    #[test]
    fn test_decision_card_without_note_omits_field() {
        let embed = decision_card(
            "1234",
            "42",
            "cliente#1",
            Plan::Starter,
            None,
            "https://cdn.example/receipt.png",
            Utc::now(),
        );
        assert_eq!(embed.fields.len(), 3);
    }

    #[test]
    fn test_counter_with_and_without_value() {
        let embed = counter(Some(7), "mod#1");
        let description = embed.description.unwrap();
        assert!(description.contains("**Último número usado:** 7"));
        assert!(description.contains("**Próximo pedido será:** #8"));

        let embed = counter(None, "mod#1");
        let description = embed.description.unwrap();
        assert!(description.contains("Nenhum pedido aprovado ainda."));
        assert!(description.contains("#1"));
    }

    #[test]
    fn test_close_guard_names_status() {
        let embed = close_guard(OrderStatus::Rejected);
        assert!(embed
            .description
            .unwrap()
            .contains("Status atual: **REPROVADO**"));
    }

    #[test]
    fn test_help_hides_moderator_section() {
        let embed = help(false, "!", "cliente#1");
        assert!(!embed
            .fields
            .iter()
            .any(|f| f.name.contains("Moderadores")));

        let embed = help(true, "!", "mod#1");
        assert!(embed.fields.iter().any(|f| f.name.contains("Moderadores")));
    }

    #[test]
    fn test_approved_card_title_carries_number() {
        let embed = approved_card("1234", 7, "42", Plan::Starter, "99", "777");
        assert_eq!(embed.title.as_deref(), Some("✅ APROVADO - Pedido #7"));
        assert!(embed
            .fields
            .iter()
            .any(|f| f.name == "Canal" && f.value == "<#777>"));
    }
}
