#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Serves `router` on an ephemeral local port for the rest of the test.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    addr
}

pub fn post_json(id: u64) -> Value {
    json!({
        "id": id,
        "title": format!("Post {id}"),
        "body": format!("Body of post {id}"),
        "userId": 1,
        "tags": ["history"],
    })
}

pub fn posts_json(ids: impl IntoIterator<Item = u64>) -> Value {
    let posts: Vec<Value> = ids.into_iter().map(post_json).collect();
    let count = posts.len();
    json!({ "posts": posts, "total": 150, "skip": 0, "limit": count })
}
