/// The kind of error that occurred at the gateway boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request was rejected for authentication reasons.
    Auth,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The transport to the provider failed.
    Transport,
    /// Any other errors.
    Other,
}
