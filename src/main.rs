//! taskboard binary — wires the in-memory collaborators and serves.
//!
//! Run with:
//!   RUST_LOG=info cargo run
//!
//! Try:
//!   curl -v http://127.0.0.1:8000/users/signup
//!   curl -v -X POST http://127.0.0.1:8000/users/signup \
//!        -H 'content-type: application/json' \
//!        -d '{"firstName":"Ada","lastName":"Lovelace","username":"ada","password":"s3cret"}'
//!   curl -v http://127.0.0.1:8000/tasks -H 'cookie: sid=<from the Set-Cookie above>'

use std::sync::Arc;

use taskboard::{
    App, Assets, AssetsController, Config, MemorySessionStore, MemoryTaskStore,
    MemoryUserStore, Server, Sessions, TaskController, UserController,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let sessions = Sessions::new(Arc::new(MemorySessionStore::new()));
    let assets = Arc::new(Assets::new(&config.assets_dir));

    let app = App::new(
        Arc::new(UserController::new(
            Arc::new(MemoryUserStore::new()),
            sessions.clone(),
            Arc::clone(&assets),
        )),
        Arc::new(TaskController::new(Arc::new(MemoryTaskStore::new()))),
        Arc::new(AssetsController::new(assets)),
        sessions,
    );

    Server::bind(&config.addr)
        .serve(app)
        .await
        .expect("server error");
}
