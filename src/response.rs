use std::fmt;

/// Server result code accompanying a read, passed through from the transport layer.
///
/// Transcoders accept the status as part of the decode signature but never branch on it; the
/// transport decides whether a response is worth decoding at all. It rides along so a decoded
/// document and its outcome stay together at the call boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseStatus {
    Success,
    NotFound,
    Exists,
    TooBig,
    TemporaryFailure,
    ServerError,
    Failure,
}

impl ResponseStatus {
    pub fn is_success(self) -> bool {
        matches!(self, ResponseStatus::Success)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ResponseStatus::Success => f.write_str("success"),
            ResponseStatus::NotFound => f.write_str("not found"),
            ResponseStatus::Exists => f.write_str("exists"),
            ResponseStatus::TooBig => f.write_str("too big"),
            ResponseStatus::TemporaryFailure => f.write_str("temporary failure"),
            ResponseStatus::ServerError => f.write_str("server error"),
            ResponseStatus::Failure => f.write_str("failure"),
        }
    }
}
