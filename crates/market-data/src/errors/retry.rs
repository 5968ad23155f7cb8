/// Classification for retry policy.
///
/// Used by callers to decide how to react to a failed price fetch.
///
/// | Class | Retry same call later? | Try another endpoint? |
/// |-------|------------------------|-----------------------|
/// | `Never` | No | No |
/// | `WithBackoff` | Yes | No |
/// | `NextProvider` | No | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - bad symbol, missing credentials, or malformed data.
    Never,

    /// Transient failure such as rate limiting or a timeout.
    /// Retrying after a pause is expected to succeed.
    WithBackoff,

    /// This endpoint or provider can't serve the request, another one might.
    NextProvider,
}
