pub mod gemini;
pub(crate) mod http_errors;

#[cfg(test)]
pub(crate) mod test_support;
