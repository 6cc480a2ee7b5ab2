//! Update a gateway session with test card details
//!
//! Usage: cargo run --example update_session -- <base-url> <merchant-id> <session-id>

use gateway_sdk::{CallbackQueue, Gateway, GatewayError, UpdateSessionResponse};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [base_url, merchant_id, session_id] = args.as_slice() else {
        eprintln!("usage: update_session <base-url> <merchant-id> <session-id>");
        std::process::exit(2);
    };

    let mut gateway = Gateway::new();
    gateway.set_base_url(base_url)?.set_merchant_id(merchant_id.as_str())?;

    // Single result: await the call directly
    match gateway
        .update_session_with_card_info(session_id, "Jane Doe", "5123450000000008", "100", "05", "29")?
        .await
    {
        Ok(response) => println!("updated session {:?}", response.session_id()),
        Err(GatewayError::Gateway { status_code, explanation, .. }) => {
            println!("gateway rejected update ({}): {:?}", status_code, explanation)
        }
        Err(e) => println!("update failed: {}", e),
    }

    // Callback: outcome is handed back through a queue owned by this task
    let mut queue = CallbackQueue::new();
    gateway
        .update_session_with_card_info(session_id, "Jane Doe", "5123450000000008", "100", "05", "29")?
        .deliver(&queue, |outcome: gateway_sdk::Result<UpdateSessionResponse>| match outcome {
            Ok(response) => println!("callback: updated session {:?}", response.session_id()),
            Err(e) => println!("callback: update failed: {}", e),
        })?;
    queue.dispatch_next().await;

    Ok(())
}
