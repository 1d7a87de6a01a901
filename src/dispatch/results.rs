use serde::Serialize;

use crate::http::TransportResponse;

/// One completed send.
///
/// `index` is the payload's position in the original bundle and is only set
/// in protected mode, where results may be reordered by the resend pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub response: TransportResponse,
    pub index: Option<usize>,
}

/// Flat, serializable view of a result used for exports.
#[derive(Debug, Serialize)]
pub struct ResultRecord<'a> {
    pub index: Option<usize>,
    pub status: Option<u16>,
    pub ok: bool,
    pub elapsed_ms: u128,
    pub attempts: u64,
    pub error: Option<&'a str>,
    pub body: &'a str,
}

impl<'a> From<&'a DispatchResult> for ResultRecord<'a> {
    fn from(result: &'a DispatchResult) -> Self {
        let response = &result.response;
        Self {
            index: result.index,
            status: response.status(),
            ok: response.is_ok(),
            elapsed_ms: response.elapsed().as_millis(),
            attempts: response.attempts(),
            error: response.error(),
            body: response.body(),
        }
    }
}
