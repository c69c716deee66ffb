use axum::Router;
use std::net::TcpListener;

/// Serve `router` on an ephemeral localhost port from a background thread.
/// Returns the base URL, e.g. `http://127.0.0.1:49152`.
pub fn serve_on_thread(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router).await.unwrap();
        });
    });

    format!("http://{}", addr)
}

/// A localhost URL nothing is listening on.
#[allow(dead_code)]
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
