//! Route matching module
//!
//! Picks the route for a method + decoded path out of the ordered table.

use hyper::Method;

use super::table::Route;

/// A matched route together with its captured placeholder values
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub captures: Vec<(String, String)>,
}

/// Find the most specific matching route for a method and path
///
/// Matching priority:
/// 1. Method must match (`HEAD` is served by `GET` routes)
/// 2. Among path matches, the most specific segment profile wins
///    (literal before placeholder before rest-of-path, position by position)
/// 3. Equal profiles: first registered wins
pub fn match_route<'a>(method: &Method, path: &str, routes: &'a [Route]) -> Option<RouteMatch<'a>> {
    routes
        .iter()
        .filter(|route| method_matches(&route.method, method))
        .filter_map(|route| {
            route
                .pattern
                .captures(path)
                .map(|captures| RouteMatch { route, captures })
        })
        .min_by(|a, b| a.route.pattern.rank().cmp(b.route.pattern.rank()))
}

fn method_matches(route_method: &Method, request_method: &Method) -> bool {
    route_method == request_method
        || (*request_method == Method::HEAD && *route_method == Method::GET)
}
