use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use tracing::info;
use tracing_subscriber::EnvFilter;

use loan_net::config::AppConfig;
use loan_net::db::Database;
use loan_net::{configure_api, AppState};

#[get("/")]
async fn index() -> impl Responder {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Loan Net API</title>
        <style>
            body {
                background-color: #0d0d0d;
                color: #00ffcc;
                font-family: monospace;
                padding: 40px;
            }
            h1 {
                color: #ff00ff;
            }
            ul {
                list-style-type: square;
            }
            li {
                margin-bottom: 10px;
            }
            code {
                background: #1a1a1a;
                padding: 2px 6px;
                border-radius: 4px;
                color: #00ffcc;
            }
        </style>
    </head>
    <body>
        <h1>Loan Net API</h1>
        <p>Welcome to the API hub. Here are the available endpoints:</p>
        <ul>
            <li><code>GET /</code> – This help page</li>
            <li><code>GET /health</code> – Health check (returns OK)</li>
            <li><code>POST /api/users/register</code> – Register a new user</li>
            <li><code>POST /api/users/login</code> – Login and receive a token</li>
            <li><code>POST /api/loans/calculate</code> – Quote monthly payment and total repayment</li>
            <li><code>POST /api/loans</code> – Create a loan</li>
            <li><code>GET /api/loans</code> – List your loans</li>
            <li><code>GET /api/loans/{id}</code> – Fetch one loan</li>
            <li><code>PATCH /api/loans/{id}</code> – Update loan fields</li>
            <li><code>PATCH /api/loans/{id}/status</code> – Set loan status</li>
            <li><code>DELETE /api/loans/{id}</code> – Delete a loan</li>
        </ul>
        <p>Loan routes require <code>Authorization: Bearer &lt;token&gt;</code>.</p>
        <p style="margin-top: 40px; font-size: 12px;">Loan Net - powered by Rust + Actix Web</p>
    </body>
    </html>
    "#;

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

/// Simple health check
#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env();
    let addr = format!("0.0.0.0:{}", config.port);
    info!(%addr, "listening");

    let state = web::Data::new(AppState {
        config,
        db: Database::new(),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(index)
            .service(health)
            .configure(configure_api)
    })
    .bind(addr)?
    .run()
    .await
}
