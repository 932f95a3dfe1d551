use anyhow::Result;

// Emit the OpenAPI document on stdout for offline tooling.
fn main() -> Result<()> {
    let json = serde_json::to_string_pretty(&lulus::api::openapi())?;
    println!("{json}");
    Ok(())
}
