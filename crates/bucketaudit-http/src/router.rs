//! Audit request router.
//!
//! All audit routes are `GET` with parameters in the query string:
//!
//! ```text
//! GET /scan?bucket=NAME      single bucket, detailed
//! GET /?bucket=NAME          single bucket, detailed
//! GET /?buckets=A,B,C        explicit list, dashboard
//! GET /?filter=SUBSTRING     account scan, dashboard
//! GET /                      account scan, dashboard
//! GET /info                  service descriptor
//! GET /health                liveness
//! ```
//!
//! On `/` the selectors are checked in the order `bucket`, `buckets`,
//! `filter`; an empty value counts as absent.

use std::collections::HashMap;

use bucketaudit_model::{AuditError, AuditRequest, parse_bucket_list};

/// Usage hint returned with a missing `bucket` parameter.
pub const SCAN_USAGE: &str = "/scan?bucket=target-bucket";

/// A resolved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Liveness probe.
    Health,
    /// Service descriptor.
    Info,
    /// An audit to run.
    Audit(AuditRequest),
}

/// Resolve the route for a request.
pub fn resolve_route(method: &http::Method, uri: &http::Uri) -> Result<Route, AuditError> {
    if method != http::Method::GET {
        return Err(AuditError::method_not_allowed(method));
    }

    let params = query_params(uri.query().unwrap_or_default());
    match uri.path() {
        "/health" | "/_health" => Ok(Route::Health),
        "/info" => Ok(Route::Info),
        "/scan" => {
            let bucket = non_empty(&params, "bucket")
                .ok_or_else(|| AuditError::missing_parameter("bucket", SCAN_USAGE))?;
            Ok(Route::Audit(AuditRequest::Single {
                bucket: bucket.to_owned(),
            }))
        }
        "/" | "" => resolve_root(&params).map(Route::Audit),
        path => Err(AuditError::route_not_found(path)),
    }
}

fn resolve_root(params: &HashMap<String, String>) -> Result<AuditRequest, AuditError> {
    if let Some(bucket) = non_empty(params, "bucket") {
        return Ok(AuditRequest::Single {
            bucket: bucket.to_owned(),
        });
    }

    if let Some(raw) = non_empty(params, "buckets") {
        let buckets = parse_bucket_list(raw);
        if buckets.is_empty() {
            return Err(AuditError::invalid_parameter(
                "'buckets' must name at least one bucket, e.g. /?buckets=a,b",
            ));
        }
        return Ok(AuditRequest::Batch { buckets });
    }

    Ok(AuditRequest::Account {
        filter: non_empty(params, "filter").map(ToOwned::to_owned),
    })
}

/// Decode the query string. A repeated key keeps its first value.
fn query_params(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use bucketaudit_model::AuditErrorCode;

    use super::*;

    fn route(uri: &str) -> Result<Route, AuditError> {
        resolve_route(&http::Method::GET, &uri.parse().unwrap())
    }

    #[test]
    fn test_should_route_scan_with_bucket() {
        assert_eq!(
            route("/scan?bucket=target-bucket").unwrap(),
            Route::Audit(AuditRequest::Single {
                bucket: "target-bucket".to_owned()
            })
        );
    }

    #[test]
    fn test_should_reject_scan_without_bucket() {
        for uri in ["/scan", "/scan?bucket=", "/scan?bucket=%20", "/scan?buckets=a"] {
            let err = route(uri).unwrap_err();
            assert_eq!(err.code, AuditErrorCode::MissingParameter, "uri {uri}");
            assert!(err.message.contains(SCAN_USAGE));
        }
    }

    #[test]
    fn test_should_dispatch_root_selectors_in_order() {
        assert_eq!(
            route("/?bucket=one&buckets=a,b&filter=x").unwrap(),
            Route::Audit(AuditRequest::Single {
                bucket: "one".to_owned()
            })
        );
        assert_eq!(
            route("/?buckets=good-bucket,%20missing-bucket&filter=x").unwrap(),
            Route::Audit(AuditRequest::Batch {
                buckets: vec!["good-bucket".to_owned(), "missing-bucket".to_owned()]
            })
        );
        assert_eq!(
            route("/?filter=cyb611").unwrap(),
            Route::Audit(AuditRequest::Account {
                filter: Some("cyb611".to_owned())
            })
        );
        assert_eq!(
            route("/").unwrap(),
            Route::Audit(AuditRequest::Account { filter: None })
        );
    }

    #[test]
    fn test_should_treat_empty_selectors_as_absent() {
        assert_eq!(
            route("/?bucket=&buckets=&filter=").unwrap(),
            Route::Audit(AuditRequest::Account { filter: None })
        );
    }

    #[test]
    fn test_should_reject_bucket_list_without_names() {
        let err = route("/?buckets=,,").unwrap_err();
        assert_eq!(err.code, AuditErrorCode::InvalidParameter);
    }

    #[test]
    fn test_should_route_health_and_info() {
        assert_eq!(route("/health").unwrap(), Route::Health);
        assert_eq!(route("/_health").unwrap(), Route::Health);
        assert_eq!(route("/info").unwrap(), Route::Info);
    }

    #[test]
    fn test_should_reject_unknown_path_and_method() {
        assert_eq!(
            route("/admin").unwrap_err().code,
            AuditErrorCode::RouteNotFound
        );
        let err = resolve_route(&http::Method::POST, &"/scan?bucket=b".parse().unwrap())
            .unwrap_err();
        assert_eq!(err.code, AuditErrorCode::MethodNotAllowed);
    }
}
