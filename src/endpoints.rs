//! The API endpoint URIs.

/// The root route, which returns a welcome message.
pub const ROOT: &str = "/";
/// The route for creating an income record, optionally with an invoice file.
pub const INCOME: &str = "/income";
/// The route for creating an expense record, optionally with a receipt file.
pub const EXPENSES: &str = "/expenses";
/// The route for listing every stored record.
pub const INVOICES: &str = "/invoices";

// These tests are here so that we know the routes will not panic when parsed
// as URIs.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::INCOME);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES);
        assert_endpoint_is_valid_uri(endpoints::INVOICES);
    }
}
