//! Admin panel routes.
//!
//! Everything here sits behind `auth` and `admin`. Post types and taxonomies
//! are dynamic: `{type}` selects the post type (`post`, `page`, ...) and
//! `{taxonomy}` the term taxonomy (`category`, `tag`, ...).

use crate::middleware::{ADMIN, AUTH};
use crate::routing::{Route, RouteGroup};

pub const PREFIX: &str = "admin/";
pub const NAMESPACE: &str = "admin";
pub const NAME_PREFIX: &str = "admin_";

/// Post type routes live under this segment
const POST_TYPE: &str = "term_type={type}";
/// Taxonomy routes live under this path
const TAXONOMY: &str = "term_type={type}/taxonomy={taxonomy}";
// Published URLs; the spelling is part of the public surface
const SETTINGS: &str = "seetings/fronend";

pub fn admin_group() -> RouteGroup {
    let group = RouteGroup::new(PREFIX)
        .namespace(NAMESPACE)
        .name_prefix(NAME_PREFIX)
        .middleware([AUTH, ADMIN])
        .route(Route::get("dashboard", "DashboardController@index").name("dashboard"))
        .route(Route::get("adminMenu", "DashboardController@menu").name("adminMenu"));

    [media_routes(), post_type_routes(), taxonomy_routes(), settings_routes()]
        .into_iter()
        .flatten()
        .fold(group, RouteGroup::route)
}

fn media_routes() -> Vec<Route> {
    vec![
        Route::get("media/all", "MediaController@index").name("media_index"),
        Route::post("media/store", "MediaController@store").name("media_store"),
        // Plain form post, for clients without async upload
        Route::post("media/store/noajax", "MediaController@storeMedia").name("media_store_noajax"),
        Route::get("media/get", "MediaController@getMedia").name("media_get"),
        Route::get("media/delete/{id}", "MediaController@destroy").name("media_delete"),
    ]
}

fn post_type_routes() -> Vec<Route> {
    let path = |rest: &str| format!("{}/{}", POST_TYPE, rest);
    vec![
        Route::get(path("all"), "PostController@index").name("term_type_index"),
        Route::get(path("create"), "PostController@form").name("term_type_form"),
        Route::post(path("store"), "PostController@store").name("term_type_store"),
        Route::get(path("edit/{id}"), "PostController@form").name("term_type_edit"),
        Route::post(path("update"), "PostController@update").name("term_type_update"),
        Route::get(path("delete/{id}"), "PostController@destroy").name("term_type_delete"),
    ]
}

fn taxonomy_routes() -> Vec<Route> {
    let path = |rest: &str| format!("{}/{}", TAXONOMY, rest);
    vec![
        Route::get(path("all"), "CategoryController@index").name("taxonomy_type_index"),
        Route::post(path("store"), "CategoryController@store").name("taxonomy_type_store"),
        // Edit renders the listing with the selected term loaded
        Route::get(path("edit/{id}"), "CategoryController@index").name("taxonomy_type_edit"),
        Route::post(path("update"), "CategoryController@update").name("taxonomy_type_update"),
        Route::get(path("delete/{id}"), "CategoryController@destroy").name("taxonomy_type_delete"),
    ]
}

fn settings_routes() -> Vec<Route> {
    let path = |rest: &str| format!("{}/{}", SETTINGS, rest);
    vec![
        Route::get(path("view"), "FrontendSettingsController@index").name("frontend_settings_index"),
        Route::post(path("update"), "FrontendSettingsController@update")
            .name("frontend_settings_update"),
    ]
}
