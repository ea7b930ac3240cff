//! Declarative routing from content paths to view handlers.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use smallvec::SmallVec;

/// View handlers a content path can resolve to. The overview is the
/// caller's empty-path special case and has no pattern here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    ServiceListing,
    NewServiceForm,
    ServiceDetail,
    /// `/…/revisions` collection paths redirect to the owner's detail view.
    RevisionListRedirect,
    RevisionDetail,
    ConfigurationListing,
    ConfigurationDetail,
    RouteListing,
    RouteDetail,
}

/// Parameters bound by `:name` pattern segments.
pub type Params = BTreeMap<String, String>;

enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

struct RouteEntry {
    segments: Vec<Segment>,
    handler: Handler,
}

// Registration order is the tie-breaker: the first matching pattern wins.
const PATTERNS: &[(&str, Handler)] = &[
    ("/services", Handler::ServiceListing),
    ("/services/_new", Handler::NewServiceForm),
    ("/services/:serviceName", Handler::ServiceDetail),
    ("/services/:serviceName/revisions", Handler::RevisionListRedirect),
    (
        "/services/:serviceName/revisions/:revisionName",
        Handler::RevisionDetail,
    ),
    ("/configurations", Handler::ConfigurationListing),
    ("/configurations/:configurationName", Handler::ConfigurationDetail),
    (
        "/configurations/:configurationName/revisions",
        Handler::RevisionListRedirect,
    ),
    (
        "/configurations/:configurationName/revisions/:revisionName",
        Handler::RevisionDetail,
    ),
    ("/routes", Handler::RouteListing),
    ("/routes/:routeName", Handler::RouteDetail),
];

static ROUTES: Lazy<Vec<RouteEntry>> = Lazy::new(|| {
    PATTERNS
        .iter()
        .map(|&(pattern, handler)| RouteEntry {
            segments: compile(pattern),
            handler,
        })
        .collect()
});

fn compile(pattern: &'static str) -> Vec<Segment> {
    pattern
        .trim_start_matches('/')
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => Segment::Param(name),
            None => Segment::Literal(segment),
        })
        .collect()
}

/// Resolve a content path against the route table. `None` means no pattern
/// matched; the caller renders its not-found view. The empty path is the
/// caller's overview special case and never reaches a pattern here.
pub fn resolve(path: &str) -> Option<(Handler, Params)> {
    let segments: SmallVec<[&str; 8]> = path.trim_start_matches('/').split('/').collect();
    ROUTES
        .iter()
        .find_map(|route| match_route(route, &segments).map(|params| (route.handler, params)))
}

fn match_route(route: &RouteEntry, segments: &[&str]) -> Option<Params> {
    if route.segments.len() != segments.len() {
        return None;
    }
    let mut params = Params::new();
    for (expected, actual) in route.segments.iter().zip(segments) {
        match expected {
            Segment::Literal(literal) => {
                if literal != actual {
                    return None;
                }
            }
            Segment::Param(name) => {
                let decoded = percent_decode_str(actual).decode_utf8_lossy();
                params.insert((*name).to_string(), decoded.into_owned());
            }
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linker::Linker;
    use crate::reference::{Kind, ObjectRef};

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn literal_paths_resolve() {
        assert_eq!(
            resolve("/services"),
            Some((Handler::ServiceListing, Params::new()))
        );
        assert_eq!(
            resolve("/routes"),
            Some((Handler::RouteListing, Params::new()))
        );
    }

    #[test]
    fn parameters_bind_by_name() {
        assert_eq!(
            resolve("/services/greeter"),
            Some((Handler::ServiceDetail, params(&[("serviceName", "greeter")])))
        );
        assert_eq!(
            resolve("/configurations/greeter/revisions/greeter-00002"),
            Some((
                Handler::RevisionDetail,
                params(&[
                    ("configurationName", "greeter"),
                    ("revisionName", "greeter-00002"),
                ])
            ))
        );
    }

    #[test]
    fn first_registered_pattern_wins() {
        // `/services/_new` matches both the literal form route and the
        // `:serviceName` detail route; the literal is registered first.
        assert_eq!(
            resolve("/services/_new"),
            Some((Handler::NewServiceForm, Params::new()))
        );
        assert_eq!(PATTERNS[1].0, "/services/_new");
    }

    #[test]
    fn unmatched_paths_are_none() {
        assert_eq!(resolve("/bogus/path"), None);
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("/services/greeter/pods"), None);
    }

    #[test]
    fn encoded_parameters_are_decoded() {
        assert_eq!(
            resolve("/services/a%2Fb%20c"),
            Some((Handler::ServiceDetail, params(&[("serviceName", "a/b c")])))
        );
    }

    #[test]
    fn linker_paths_round_trip_over_the_table() {
        let linker = Linker::new("");
        let service = ObjectRef::named(Kind::Service, "greeter");
        let configuration = ObjectRef::named(Kind::Configuration, "greeter");
        let cases: Vec<(String, Handler)> = vec![
            (
                linker.path(&ObjectRef::collection(Kind::Service), None),
                Handler::ServiceListing,
            ),
            (linker.path(&service, None), Handler::ServiceDetail),
            (
                linker.path(&ObjectRef::collection(Kind::Revision), Some(&service)),
                Handler::RevisionListRedirect,
            ),
            (
                linker.path(&ObjectRef::named(Kind::Revision, "greeter-00001"), Some(&service)),
                Handler::RevisionDetail,
            ),
            (
                linker.path(&ObjectRef::collection(Kind::Configuration), None),
                Handler::ConfigurationListing,
            ),
            (linker.path(&configuration, None), Handler::ConfigurationDetail),
            (
                linker.path(
                    &ObjectRef::named(Kind::Revision, "greeter-00001"),
                    Some(&configuration),
                ),
                Handler::RevisionDetail,
            ),
            (
                linker.path(&ObjectRef::collection(Kind::Route), None),
                Handler::RouteListing,
            ),
            (
                linker.path(&ObjectRef::named(Kind::Route, "greeter"), None),
                Handler::RouteDetail,
            ),
        ];
        for (path, expected) in cases {
            let (handler, _) = resolve(&path).unwrap_or_else(|| panic!("no route for {path}"));
            assert_eq!(handler, expected, "path {path}");
        }
    }

    #[test]
    fn round_trip_preserves_identity() {
        let linker = Linker::new("");
        let target = ObjectRef::named(Kind::Revision, "greeter-00003");
        let context = ObjectRef::named(Kind::Service, "greeter");
        let path = linker.path(&target, Some(&context));
        let (handler, params) = resolve(&path).unwrap();
        assert_eq!(handler, Handler::RevisionDetail);
        assert_eq!(params["serviceName"], "greeter");
        assert_eq!(params["revisionName"], "greeter-00003");
        // and back again
        let rebuilt = linker.path(
            &ObjectRef::named(Kind::Revision, params["revisionName"].clone()),
            Some(&ObjectRef::named(Kind::Service, params["serviceName"].clone())),
        );
        assert_eq!(rebuilt, path);
    }
}
