//! Request metadata used by the admission layers.
//!
//! # Responsibilities
//! - Expose the client's remote address as a `host:port` string
//! - Tag each request with an `x-request-id` for log correlation

use axum::{extract::ConnectInfo, http::Request};
use std::net::SocketAddr;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Remote address supplied by an outer layer, as `host:port`.
///
/// Takes precedence over the socket peer address when present, for servers
/// that terminate connections elsewhere and pass the address along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

/// The client's remote address, if the request carries one.
pub fn remote_addr<B>(request: &Request<B>) -> Option<String> {
    let extensions = request.extensions();
    if let Some(RemoteAddr(addr)) = extensions.get::<RemoteAddr>() {
        return Some(addr.clone());
    }
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
}

/// The request ID assigned by [`set_request_id_layer`], for span fields.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
}

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn explicit_remote_addr_wins() {
        let mut request = Request::new(Body::empty());
        request
            .extensions_mut()
            .insert(ConnectInfo("127.0.0.1:9000".parse::<SocketAddr>().unwrap()));
        request
            .extensions_mut()
            .insert(RemoteAddr("10.1.2.3:4444".to_string()));

        assert_eq!(remote_addr(&request).as_deref(), Some("10.1.2.3:4444"));
    }

    #[test]
    fn falls_back_to_connect_info() {
        let mut request = Request::new(Body::empty());
        request
            .extensions_mut()
            .insert(ConnectInfo("[::1]:9000".parse::<SocketAddr>().unwrap()));

        assert_eq!(remote_addr(&request).as_deref(), Some("[::1]:9000"));
    }

    #[test]
    fn no_address_and_no_id() {
        let request = Request::new(Body::empty());
        assert_eq!(remote_addr(&request), None);
        assert_eq!(request_id(&request), "unknown");
    }
}
