//! Client that builds mget requests and hands them to a transport.
//!
//! # Design
//! `Client` holds only its transport and carries no mutable state between
//! calls. `build_mget` is the pure half and can be used on its own by hosts
//! that execute requests themselves. `mget` builds, delegates to the
//! transport, and maps the returned status against the request's `ignore`
//! list. Connection handling, retries and node selection all live behind the
//! `Transport` trait.

use log::debug;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::mget::build_mget;
use crate::params::Params;

/// Executes a request against a cluster. Implementations own the base URL.
pub trait Transport {
    fn request(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn request(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).request(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn request(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).request(request)
    }
}

#[derive(Debug, Clone)]
pub struct Client<T> {
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_mget(&self, params: &Params) -> Result<HttpRequest, ApiError> {
        build_mget(params)
    }

    /// Perform a multi-get. Invalid parameters fail before the transport is
    /// called.
    pub fn mget(&self, params: &Params) -> Result<HttpResponse, ApiError> {
        let request = build_mget(params)?;
        let ignore = request.ignore.clone();
        let response = self.transport.request(request)?;
        check_status(response, &ignore)
    }
}

/// 2xx and ignored statuses are returned as-is; anything else is an error.
fn check_status(response: HttpResponse, ignore: &[u16]) -> Result<HttpResponse, ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(response);
    }
    if ignore.contains(&response.status) {
        debug!("mget: status {} ignored by request", response.status);
        return Ok(response);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body,
    })
}
