use anyhow::anyhow;
use std::error::Error as StdError;
use std::io::ErrorKind;

/// Walks the source chain looking for an io error of `kind`, or any layer
/// whose message mentions `needle`.
fn error_chain_matches(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_matches(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_matches(err, ErrorKind::TimedOut, "timed out")
}

pub(crate) fn model_api_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> anyhow::Error {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return anyhow!(
            "Model request timed out after {}s while calling '{}'. \
             Increase MODEL_TIMEOUT_SECS or try again later.",
            timeout_secs,
            api_url
        );
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return anyhow!(
                "Connection refused by model API at '{}'. \
                 Check MODEL_BASE_URL.",
                api_url
            );
        }

        return anyhow!(
            "Failed to connect to model API at '{}'. \
             Check MODEL_BASE_URL and network connectivity.",
            api_url
        );
    }

    anyhow!("Failed to call model API at '{}': {}", api_url, err)
}
