//! Basic usage example for chat-history
//!
//! Run with `RUST_LOG=debug` to see trimming diagnostics.

use chat_history::*;

fn main() -> Result<()> {
    logging::init_tracing(None, false);

    let config = HistoryConfig::load(None)?;
    let config = if config.limit().is_bounded() {
        config
    } else {
        HistoryConfig::new(6)
    };
    let store = ConversationStore::from_config(&config);
    let session = "demo-session";

    store.add(session, vec![Message::system("You are a weather assistant.")]);

    for city in ["London", "Paris", "Tokyo"] {
        let call_id = format!("call_{}", city.to_lowercase());
        let outcome = store.add(
            session,
            vec![
                Message::user(format!("What's the weather in {}?", city)),
                Message::assistant_tool_calls(vec![ToolCall::function(
                    call_id.clone(),
                    "get_weather",
                    format!(r#"{{"location":"{}"}}"#, city),
                )]),
                Message::tool(call_id, r#"{"temperature":"20C"}"#),
            ],
        );
        println!("{}: admitted {}, skipped {}", city, outcome.admitted, outcome.rejected());
    }

    // A tool result without a correlation id is skipped and reported.
    let outcome = store.add(session, vec![Message::new("tool").with_content("orphan result")]);
    for skipped in &outcome.skipped {
        println!("skipped #{} ({}): {}", skipped.index, skipped.reason.code(), skipped.reason);
    }

    println!("\nHistory ({} of max {:?}):", store.session_len(session), store.limit().max_len());
    for message in store.get(session) {
        println!("  {}", message.to_json()?);
    }

    Ok(())
}
