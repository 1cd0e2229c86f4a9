pub mod common;

mod http_token_route;
