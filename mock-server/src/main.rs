use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::TcpListener;

/// Sky's default port.
const DEFAULT_PORT: u16 = 8585;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = match std::env::var("PORT") {
        Ok(value) => value.parse().map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("invalid PORT: {value}"))
        })?,
        Err(_) => DEFAULT_PORT,
    };
    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, port))).await?;
    println!("mock Sky server listening on {}", listener.local_addr()?);
    mock_server::run(listener).await
}
