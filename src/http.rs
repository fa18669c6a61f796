//! Minimal HTTP capability
//!
//! The crate never opens sockets itself. Platforms implement [`HttpClient`]
//! on top of their network stack; the client is expected to enforce its own
//! request timeout and report it as [`TransportError::Timeout`].

use alloc::vec::Vec;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Outgoing request
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub method: Method,
    pub url: &'a str,
    /// Header name/value pairs
    pub headers: &'a [(&'a str, &'a str)],
    pub body: &'a [u8],
}

impl<'a> Request<'a> {
    pub const fn get(url: &'a str, headers: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            method: Method::Get,
            url,
            headers,
            body: &[],
        }
    }

    pub const fn post(url: &'a str, headers: &'a [(&'a str, &'a str)], body: &'a [u8]) -> Self {
        Self {
            method: Method::Post,
            url,
            headers,
            body,
        }
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }
}

/// Response with a fully buffered body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure below the HTTP layer
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("network unreachable")]
    Unreachable,
    #[error("connection failed")]
    Connection,
    #[error("tls handshake failed")]
    Tls,
    #[error("request timed out")]
    Timeout,
}

/// Perform one HTTP request
pub trait HttpClient {
    fn request(&mut self, request: &Request<'_>) -> Result<Response, TransportError>;
}

impl<T: HttpClient + ?Sized> HttpClient for &mut T {
    fn request(&mut self, request: &Request<'_>) -> Result<Response, TransportError> {
        (**self).request(request)
    }
}
