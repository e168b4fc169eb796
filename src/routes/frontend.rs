//! Public site routes. No middleware is enforced here.

use crate::routing::{Route, RouteGroup};

pub const PREFIX: &str = "/";
pub const NAMESPACE: &str = "frontend";
pub const NAME_PREFIX: &str = "frontend_";

pub fn frontend_group() -> RouteGroup {
    RouteGroup::new(PREFIX)
        .namespace(NAMESPACE)
        .name_prefix(NAME_PREFIX)
        .route(Route::get("/", "HomeController@index").name("index"))
        .route(Route::get("page/{slug}", "HomeController@page").name("page"))
}
