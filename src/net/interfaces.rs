//! Local address discovery for operator-facing URLs.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::config::Protocol;

/// Best-effort primary local IP address.
///
/// Connecting a UDP socket sends no packets; it only asks the OS which
/// interface would route outbound traffic. Falls back to loopback.
pub async fn local_ip() -> IpAddr {
    async fn discover() -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).await?;
        Ok(socket.local_addr()?.ip())
    }

    match discover().await {
        Ok(ip) if !ip.is_unspecified() => ip,
        Ok(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
        Err(e) => {
            tracing::debug!(error = %e, "Local IP discovery failed, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// URLs printed once the listener is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerUrls {
    /// URL on the machine's network address.
    pub network: String,
    /// URL on `localhost`.
    pub local: String,
    /// Documentation endpoint, if registered.
    pub docs: Option<String>,
}

impl ServerUrls {
    /// Build the URLs for a listener bound to `bound`.
    ///
    /// `network_ip` replaces an unspecified bind address.
    pub fn new(
        protocol: Protocol,
        bound: SocketAddr,
        network_ip: IpAddr,
        docs_path: Option<&str>,
    ) -> Self {
        let scheme = protocol.scheme();
        let port = bound.port();
        let host = if bound.ip().is_unspecified() {
            network_ip
        } else {
            bound.ip()
        };
        let network = match host {
            IpAddr::V4(ip) => format!("{}://{}:{}", scheme, ip, port),
            IpAddr::V6(ip) => format!("{}://[{}]:{}", scheme, ip, port),
        };
        Self {
            network,
            local: format!("{}://localhost:{}", scheme, port),
            docs: docs_path.map(|path| format!("{}://localhost:{}{}", scheme, port, path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_for_unspecified_bind() {
        let urls = ServerUrls::new(
            Protocol::Https,
            "0.0.0.0:5001".parse().unwrap(),
            "192.168.1.20".parse().unwrap(),
            Some("/docs"),
        );
        assert_eq!(urls.network, "https://192.168.1.20:5001");
        assert_eq!(urls.local, "https://localhost:5001");
        assert_eq!(urls.docs.as_deref(), Some("https://localhost:5001/docs"));
    }

    #[test]
    fn test_urls_for_specific_bind() {
        let urls = ServerUrls::new(
            Protocol::Http,
            "[::1]:8080".parse().unwrap(),
            "10.0.0.1".parse().unwrap(),
            None,
        );
        assert_eq!(urls.network, "http://[::1]:8080");
        assert_eq!(urls.local, "http://localhost:8080");
        assert!(urls.docs.is_none());
    }

    #[tokio::test]
    async fn test_local_ip_is_specified() {
        assert!(!local_ip().await.is_unspecified());
    }
}
