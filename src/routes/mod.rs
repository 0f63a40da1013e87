pub mod admin;
pub mod auth;
pub mod companies;
pub mod entries;
pub mod profile;
pub mod replies;
pub mod sitemap;
pub mod stream;
