use micro_message::protocol::{BasicAuthHeader, HttpMessage, Method, Request, Response, Uri};
use serde::Serialize;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Serialize, Debug)]
struct User {
    name: String,
    zip: String,
}

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let uri = match Uri::parse("https://api.example.com/users?page=1") {
        Ok(uri) => uri,
        Err(e) => {
            error!(cause = %e, "invalid uri");
            return;
        }
    };

    // GET: parameters go to the query
    let listing = Request::new(Method::GET, uri.clone()).with_parameters([("page", "2"), ("per_page", "50")]).unwrap();
    info!(request_target = %listing.request_target(), host = %listing.header_line("host"), "list users");

    // POST: parameters become a form body
    let form = Request::new(Method::POST, uri.with_query("")).with_parameters([("name", "hello"), ("zip", "world")]).unwrap();
    info!(body = %form.body(), content_type = %form.header_line("content-type"), "create user from form");

    let user = User { name: "hello".to_owned(), zip: "world".to_owned() };
    let json = form.with_json(&user).unwrap().with_basic_auth("admin", "secret").unwrap();
    info!(body = %json.body(), authorization = %json.header_line("authorization"), "create user from json");

    match BasicAuthHeader::from_header_value(&json.header_line("authorization")) {
        Ok(credentials) => info!(user = credentials.user(), "decoded credentials"),
        Err(e) => error!(cause = %e, "failed to decode credentials"),
    }

    let http_request = match json.to_http() {
        Ok(http_request) => http_request,
        Err(e) => {
            error!(cause = %e, "failed to convert request");
            return;
        }
    };
    info!(method = %http_request.method(), uri = %http_request.uri(), "converted to http::Request");

    let response = Response::builder().status(201).header("Location", "/users/1").build().with_status(429, "");
    info!(status = %response.status(), retry = response.status().should_retry(), "received response");
}
