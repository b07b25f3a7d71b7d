//! Console walk-through of the Imprenta session lifecycle.
//!
//! Restores the stored session (or logs in), routes to the clients page
//! and prints the client and work-order lists.
//!
//! ```text
//! cargo run -p imprenta-console             # against IMPRENTA_API_URL
//! cargo run -p imprenta-console -- --offline # built-in dev account
//! ```
//!
//! Credentials come from `IMPRENTA_EMAIL` / `IMPRENTA_PASSWORD`, falling
//! back to the dev account.

use std::time::Duration;

use imprenta::prelude::*;
use imprenta::session::{DEV_EMAIL, DEV_PASSWORD};

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

fn client_line(client: &Client) -> String {
    let company = if client.company.is_empty() { "-" } else { client.company.as_str() };
    format!("{:>6}  {:<20} {:<16} {}", client.id, client.name, company, client.email)
}

fn work_order_line(order: &WorkOrder) -> String {
    format!(
        "{:>6}  {:<16} x{:<6} {:<12} pago: {}",
        order.id, order.job_type, order.quantity, order.status, order.payment_status
    )
}

fn credentials() -> Credentials {
    let email = std::env::var("IMPRENTA_EMAIL").unwrap_or_else(|_| DEV_EMAIL.to_string());
    let password =
        std::env::var("IMPRENTA_PASSWORD").unwrap_or_else(|_| DEV_PASSWORD.to_string());
    Credentials::new(email, password)
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

/// Runs the walk-through on an already built app, then disposes it.
async fn run<T, S, E>(app: ImprentaApp<T, S, E>) -> Result<(), ImprentaError>
where
    T: Transport,
    S: TokenStore,
    E: CredentialExchange,
{
    let mut navigator = app.navigator();
    app.init().await;
    navigator.ready().await;

    if navigator.resolve(Route::Clients) == Navigation::Redirect(Route::Login) {
        println!("no stored session, logging in");
        if let Err(e) = app.session().login(&credentials()).await {
            println!("login failed: {e}");
            app.dispose();
            return Err(e.into());
        }
    }

    if let Some(identity) = app.session().identity() {
        println!("logged in as {} <{}> ({})", identity.name, identity.email, identity.role);
    }
    println!("{} -> {:?}", Route::Clients, navigator.resolve(Route::Clients));

    match app.clients().refresh().await {
        Ok(count) => {
            println!("\n{count} clients");
            for client in app.clients().list().filtered() {
                println!("{}", client_line(client));
            }
        }
        Err(e) => println!("\nclients unavailable: {e}"),
    }

    match app.work_orders().refresh().await {
        Ok(count) => {
            println!("\n{count} work orders");
            for order in app.work_orders().list().filtered() {
                println!("{}", work_order_line(order));
            }
        }
        Err(e) => println!("\nwork orders unavailable: {e}"),
    }

    // A 401 above logs the session out; the navigator follows.
    println!("\n{} -> {:?}", Route::Clients, navigator.resolve(Route::Clients));
    app.dispose();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ImprentaError> {
    imprenta::telemetry::init_tracing("imprenta=info,imprenta_console=info");

    let offline = std::env::args().any(|arg| arg == "--offline");
    let config = ClientConfig::from_env()?;
    tracing::info!(api_url = %config.api_url, offline, "starting console");

    if offline {
        let store = AppStore::from_config(&config);
        let app = ImprentaAppBuilder::new().config(config).build(
            HttpTransport::new()?,
            store,
            DevExchange::with_latency(Duration::from_millis(300)),
        )?;
        run(app).await
    } else {
        run(ImprentaApp::builder().config(config).connect()?).await
    }
}
