//! Print the OpenAPI document as JSON.
#![expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "CLI output goes to the standard streams"
)]

use buspass_backend::doc::ApiDoc;
use utoipa::OpenApi;

fn main() {
    match ApiDoc::openapi().to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("failed to serialise OpenAPI document: {e}");
            std::process::exit(1);
        }
    }
}
