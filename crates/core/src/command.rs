//! Prefix command parsing.
//!
//! Turns raw message content into a [`Command`]. Parsing is deliberately
//! permissive about arguments: a recognized command with missing or bad
//! arguments still parses, so the workflow can answer with the proper usage
//! message instead of silently ignoring the message. Unrecognized commands
//! return `None` and are ignored.

use regex_lite::Regex;

/// A parsed prefix command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `pago <orderId> <plan> [note...]`
    Pago {
        order_id: Option<String>,
        plan: Option<String>,
        note: Option<String>,
    },
    /// `statuspag <orderId>`
    Status { order_id: Option<String> },
    /// `fecharpedido <orderId>`
    Close { order_id: Option<String> },
    /// `ultimonumero`
    LastNumber,
    /// `listarpedidos [status]`
    List { status: Option<String> },
    /// `ajuda`
    Help,
}

/// Parse a message into a command, if it starts with the prefix and names a
/// known command.
pub fn parse_command(prefix: &str, content: &str) -> Option<Command> {
    let content = content.trim();
    let rest = content.strip_prefix(prefix)?;

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name.to_lowercase().as_str() {
        "pago" => Some(parse_pago(args)),
        "statuspag" | "status" => Some(Command::Status {
            order_id: first_word(args),
        }),
        "fecharpedido" | "fechar" => Some(Command::Close {
            order_id: first_word(args),
        }),
        "ultimonumero" => Some(Command::LastNumber),
        "listarpedidos" | "pedidos" | "listar" => Some(Command::List {
            status: first_word(args),
        }),
        "ajuda" | "help" | "comandos" => Some(Command::Help),
        _ => None,
    }
}

fn parse_pago(args: &str) -> Command {
    // Order id and plan are single tokens, anything after is a free-form note.
    let re = Regex::new(r"^(\S+)(?:\s+(\S+))?(?:\s+(.+))?$").unwrap();

    match re.captures(args) {
        Some(caps) => Command::Pago {
            order_id: caps.get(1).map(|m| m.as_str().to_string()),
            plan: caps.get(2).map(|m| m.as_str().to_string()),
            note: caps.get(3).map(|m| m.as_str().trim().to_string()),
        },
        None => Command::Pago {
            order_id: None,
            plan: None,
            note: None,
        },
    }
}

fn first_word(args: &str) -> Option<String> {
    args.split_whitespace().next().map(String::from)
}
