use axum::extract::ConnectInfo;
use axum::http::Request;
use std::net::SocketAddr;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

// Key used when neither a forwarded header nor the peer address is known
pub const UNKNOWN_CLIENT: &str = "unknown";

// Client identity for rate limiting and geolocation: first X-Forwarded-For
// entry, else the peer address from connect info, else UNKNOWN_CLIENT
pub fn client_ip<B>(req: &Request<B>) -> String {
    let forwarded = req
        .headers()
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    if let Some(first) = forwarded {
        return first.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> axum::http::request::Builder {
        Request::builder().uri("/weather")
    }

    #[test]
    fn takes_first_forwarded_entry() {
        let req = request()
            .header(X_FORWARDED_FOR, "203.0.113.9, 10.0.0.1, 10.0.0.2")
            .body(())
            .unwrap();

        assert_eq!(client_ip(&req), "203.0.113.9");
    }

    #[test]
    fn forwarded_header_wins_over_peer_address() {
        let mut req = request()
            .header(X_FORWARDED_FOR, "198.51.100.4")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("127.0.0.1:5000".parse::<SocketAddr>().unwrap()));

        assert_eq!(client_ip(&req), "198.51.100.4");
    }

    #[test]
    fn falls_back_to_peer_address() {
        let mut req = request().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("[::1]:5000".parse::<SocketAddr>().unwrap()));

        assert_eq!(client_ip(&req), "::1");
    }

    #[test]
    fn empty_forwarded_header_is_ignored() {
        let mut req = request().header(X_FORWARDED_FOR, " ").body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.1:80".parse::<SocketAddr>().unwrap()));

        assert_eq!(client_ip(&req), "192.0.2.1");
    }

    #[test]
    fn unknown_without_any_source() {
        let req = request().body(()).unwrap();
        assert_eq!(client_ip(&req), UNKNOWN_CLIENT);
    }
}
