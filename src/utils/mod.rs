pub mod cookie_utils;
pub mod html;
pub mod logging;
pub mod redirect;
pub mod response_builder;
