//! Print the maintenance API OpenAPI document as JSON.

use std::io::Write as _;

use switchgear_pm::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> std::io::Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .map_err(std::io::Error::other)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")
}
