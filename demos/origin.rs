//! A tiny origin site to put behind the injector.
//!
//! ```text
//! cargo run --example origin
//! cargo run -- --upstream 127.0.0.1:3000 --bind 127.0.0.1:8080 \
//!     --site-slug demo --integration-url https://d2jjzw81hqbuqv.cloudfront.net/integration/demo.min.js
//! ```

use axum::{http::header, response::Html, routing::get, Router};
use std::net::SocketAddr;

const PAGE: &str = "<!DOCTYPE html>
<html>
  <head>
    <title>Demo store</title>
  </head>
  <body class=\"store\">
    <h1>Welcome</h1>
  </body>
</html>
";

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/", get(|| async { Html(PAGE) }))
        .route(
            "/api/status",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{\"ok\":true}") }),
        )
        .route(
            "/invoice.html",
            get(|| async {
                (
                    [
                        (header::CONTENT_TYPE, "text/html"),
                        (header::CONTENT_DISPOSITION, "attachment; filename=invoice.html"),
                    ],
                    PAGE,
                )
            }),
        );

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    println!("Demo origin listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
